//! Terminal colors for human-readable output.
//!
//! Plain ANSI colors only, so output stays legible on any terminal theme.

use colored::{ColoredString, Colorize};

/// Semantic color roles used by the human formatter.
pub trait Palette {
    fn heading(&self) -> ColoredString;
    fn label(&self) -> ColoredString;
    fn value(&self) -> ColoredString;
    fn good(&self) -> ColoredString;
    fn caution(&self) -> ColoredString;
    fn alarm(&self) -> ColoredString;
    fn muted(&self) -> ColoredString;
}

impl<S: AsRef<str>> Palette for S {
    fn heading(&self) -> ColoredString {
        self.as_ref().bright_purple().bold()
    }

    fn label(&self) -> ColoredString {
        self.as_ref().bright_cyan().bold()
    }

    fn value(&self) -> ColoredString {
        self.as_ref().bright_white()
    }

    fn good(&self) -> ColoredString {
        self.as_ref().bright_green().bold()
    }

    fn caution(&self) -> ColoredString {
        self.as_ref().bright_yellow().bold()
    }

    fn alarm(&self) -> ColoredString {
        self.as_ref().bright_red().bold()
    }

    fn muted(&self) -> ColoredString {
        self.as_ref().bright_black()
    }
}
