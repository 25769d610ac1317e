use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

const TICK: Duration = Duration::from_millis(100);

/// Stderr indicator for one resolution: the domain, the race deadline and the
/// time spent so far. Nothing is drawn when stderr is not a terminal.
pub struct Spinner {
    bar: ProgressBar,
}

impl Spinner {
    pub fn resolving(domain: &str, deadline: Duration) -> Self {
        let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());
        let style =
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold} {msg} {elapsed:.dim}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["◐", "◓", "◑", "◒", "●"]);
        bar.set_style(style);
        bar.set_prefix(domain.to_string());
        bar.set_message(format!(
            "racing RDAP and WHOIS (gives up after {}s)",
            deadline.as_secs()
        ));
        bar.enable_steady_tick(TICK);

        Self { bar }
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
    }
}
