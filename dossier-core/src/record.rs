use std::fmt;

use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dns::DnsRecords;

/// Registration and DNS metadata for one domain, merged from whichever
/// lookup source answered first plus live DNS.
///
/// Dates are `None` when the source did not report them or reported
/// something unparsable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DomainRecord {
    pub domain: String,
    /// Empty when unknown.
    pub registrar: String,
    pub nameservers: Vec<String>,
    pub dnssec_enabled: bool,
    pub status: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub dns_records: DnsRecords,
    pub resolved_at: DateTime<Utc>,
    /// Tag of the lookup source that produced the registration fields.
    pub source: String,
}

/// Time left until a registration lapses, as shown to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "days", rename_all = "snake_case")]
pub enum ExpiryCountdown {
    Unknown,
    Expired,
    ExpiresToday,
    DaysLeft(i64),
}

impl fmt::Display for ExpiryCountdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpiryCountdown::Unknown => write!(f, "Unknown"),
            ExpiryCountdown::Expired => write!(f, "Expired"),
            ExpiryCountdown::ExpiresToday => write!(f, "Expires today"),
            ExpiryCountdown::DaysLeft(1) => write!(f, "1 day left"),
            ExpiryCountdown::DaysLeft(days) => write!(f, "{} days left", days),
        }
    }
}

impl DomainRecord {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            ..Default::default()
        }
    }

    /// Days until `expires_at`, counted from the start of the current UTC day
    /// and rounding partial days up, so an expiry later today is one day left.
    pub fn expiry_countdown(&self, now: DateTime<Utc>) -> ExpiryCountdown {
        let Some(expires) = self.expires_at else {
            return ExpiryCountdown::Unknown;
        };

        let today = now.date_naive().and_time(NaiveTime::MIN).and_utc();
        let day = Duration::days(1).num_milliseconds();
        let remaining = (expires - today).num_milliseconds();
        let days = remaining.div_euclid(day) + i64::from(remaining.rem_euclid(day) != 0);

        if expires < now {
            ExpiryCountdown::Expired
        } else if days >= 1 {
            ExpiryCountdown::DaysLeft(days)
        } else if expires.date_naive() == now.date_naive() {
            ExpiryCountdown::ExpiresToday
        } else {
            ExpiryCountdown::Expired
        }
    }

    /// Percentage of the registration period elapsed at `now`, clamped to
    /// `0.0..=100.0`.
    pub fn lifetime_progress(&self, now: DateTime<Utc>) -> Option<f64> {
        let (created, expires) = (self.created_at?, self.expires_at?);
        let total = (expires - created).num_seconds();
        if total <= 0 {
            return None;
        }
        let elapsed = (now - created).num_seconds();
        Some((elapsed as f64 / total as f64 * 100.0).clamp(0.0, 100.0))
    }

    /// Where `updated_at` falls on the registration period, as a percentage.
    ///
    /// Only reported when the update is at least a day after creation and
    /// lies before expiry; an update stamped at creation time says nothing.
    pub fn update_milestone(&self) -> Option<f64> {
        let (created, updated, expires) = (self.created_at?, self.updated_at?, self.expires_at?);
        let total = (expires - created).num_seconds();
        if total <= 0 || updated < created || updated >= expires {
            return None;
        }
        if (updated - created) < Duration::days(1) {
            return None;
        }
        let elapsed = (updated - created).num_seconds();
        Some((elapsed as f64 / total as f64 * 100.0).clamp(0.1, 99.9))
    }
}
