use chrono::{DateTime, Utc};

use super::OutputFormatter;
use crate::record::{DomainRecord, ExpiryCountdown};
use crate::style::Palette;

const BAR_WIDTH: usize = 20;

pub struct HumanFormatter {
    use_colors: bool,
}

impl Default for HumanFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl HumanFormatter {
    pub fn new() -> Self {
        Self { use_colors: true }
    }

    pub fn without_colors(mut self) -> Self {
        self.use_colors = false;
        self
    }

    fn paint(&self, text: &str, color: fn(&str) -> colored::ColoredString) -> String {
        if self.use_colors {
            color(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn header(&self, text: &str) -> String {
        let rule = "-".repeat(text.chars().count());
        format!(
            "\n{}\n{}",
            self.paint(text, |t| t.heading()),
            self.paint(&rule, |t| t.muted())
        )
    }

    fn field(&self, label: &str, value: &str) -> String {
        format!(
            "  {}: {}",
            self.paint(label, |t| t.label()),
            self.paint(value, |t| t.value())
        )
    }

    fn list(&self, output: &mut Vec<String>, label: &str, items: &[String]) {
        if items.is_empty() {
            return;
        }
        output.push(format!("  {}:", self.paint(label, |t| t.label())));
        for item in items {
            output.push(format!("    - {}", self.paint(item, |t| t.value())));
        }
    }

    fn expiry(&self, record: &DomainRecord, now: DateTime<Utc>) -> Option<String> {
        let expires = record.expires_at?;
        let date = expires.format("%Y-%m-%d").to_string();
        let countdown = record.expiry_countdown(now);
        let text = format!("{} ({})", date, countdown);

        let colored = match countdown {
            ExpiryCountdown::Expired | ExpiryCountdown::ExpiresToday => {
                self.paint(&text, |t| t.alarm())
            }
            ExpiryCountdown::DaysLeft(days) if days < 30 => self.paint(&text, |t| t.alarm()),
            ExpiryCountdown::DaysLeft(days) if days < 90 => self.paint(&text, |t| t.caution()),
            _ => self.paint(&text, |t| t.value()),
        };
        Some(format!("  {}: {}", self.paint("Expires", |t| t.label()), colored))
    }

    /// Registration progress bar. A `|` marks the last update when it sits
    /// meaningfully between creation and expiry.
    fn lifetime(&self, record: &DomainRecord, now: DateTime<Utc>) -> Option<String> {
        let percent = record.lifetime_progress(now)?;
        let filled = cells(percent);
        let mut bar: Vec<char> = "#"
            .repeat(filled)
            .chars()
            .chain(".".repeat(BAR_WIDTH - filled).chars())
            .collect();

        let mut text = String::new();
        if let (Some(mark), Some(updated)) = (record.update_milestone(), record.updated_at) {
            bar[cells(mark).min(BAR_WIDTH - 1)] = '|';
            text = format!(" (updated {})", updated.format("%Y-%m-%d"));
        }

        let bar: String = bar.into_iter().collect();
        Some(self.field("Lifetime", &format!("[{}] {:.1}%{}", bar, percent, text)))
    }
}

fn cells(percent: f64) -> usize {
    ((percent / 100.0) * BAR_WIDTH as f64).round() as usize
}

impl OutputFormatter for HumanFormatter {
    fn format_record(&self, record: &DomainRecord, now: DateTime<Utc>) -> String {
        let mut output = Vec::new();

        output.push(self.header(&format!("{} (via {})", record.domain, record.source)));

        let registrar = if record.registrar.is_empty() {
            "Unknown"
        } else {
            record.registrar.as_str()
        };
        output.push(self.field("Registrar", registrar));

        if let Some(created) = record.created_at {
            output.push(self.field("Created", &created.format("%Y-%m-%d").to_string()));
        }
        if let Some(updated) = record.updated_at {
            output.push(self.field("Updated", &updated.format("%Y-%m-%d").to_string()));
        }
        match self.expiry(record, now) {
            Some(line) => output.push(line),
            None => output.push(self.field("Expires", "Unknown")),
        }
        if let Some(line) = self.lifetime(record, now) {
            output.push(line);
        }

        self.list(&mut output, "Status", &record.status);
        self.list(&mut output, "Nameservers", &record.nameservers);

        let dnssec = if record.dnssec_enabled {
            self.paint("signed", |t| t.good())
        } else {
            self.paint("unsigned", |t| t.caution())
        };
        output.push(format!("  {}: {}", self.paint("DNSSEC", |t| t.label()), dnssec));

        self.list(&mut output, "A", &record.dns_records.a);
        self.list(&mut output, "MX", &record.dns_records.mx);
        self.list(&mut output, "TXT", &record.dns_records.txt);

        output.push(format!(
            "  {}",
            self.paint(
                &format!("Resolved {}", record.resolved_at.format("%Y-%m-%d %H:%M:%S UTC")),
                |t| t.muted()
            )
        ));

        output.join("\n")
    }
}
