//! Short-lived record cache keyed by domain.
//!
//! Entries live for a fixed TTL measured from the record's `resolved_at`,
//! read from an injected [`Clock`] so expiry can be driven by tests. Expired
//! entries are dropped lazily on the next read; there is no sweeper and no
//! capacity bound.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::record::DomainRecord;

/// Default time a resolved record is served from cache.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

/// Source of "now" for resolution timestamps and cache expiry.
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        let mut guard = match self.now.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = now;
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut guard = match self.now.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        match self.now.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// Thread-safe map from domain to its last resolved record.
pub struct RecordCache {
    entries: RwLock<HashMap<String, DomainRecord>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for RecordCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordCache")
            .field("ttl", &self.ttl)
            .field("len", &self.len())
            .finish()
    }
}

impl RecordCache {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn is_fresh(&self, record: &DomainRecord) -> bool {
        // A record stamped in the future counts as brand new.
        let age = (self.clock.now() - record.resolved_at)
            .to_std()
            .unwrap_or_default();
        age < self.ttl
    }

    /// Returns the cached record for `domain` if it is younger than the TTL.
    ///
    /// An expired entry is removed before reporting a miss.
    pub fn get(&self, domain: &str) -> Option<DomainRecord> {
        {
            let entries = match self.entries.read() {
                Ok(guard) => guard,
                Err(poisoned) => {
                    warn!("Cache read lock poisoned, recovering");
                    poisoned.into_inner()
                }
            };
            let record = entries.get(domain)?;
            if self.is_fresh(record) {
                return Some(record.clone());
            }
        }

        let mut entries = match self.entries.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("Cache write lock poisoned, recovering");
                poisoned.into_inner()
            }
        };
        // Another writer may have refreshed the entry between the two locks.
        match entries.get(domain) {
            Some(record) if self.is_fresh(record) => Some(record.clone()),
            Some(record) => {
                debug!(
                    domain = %domain,
                    resolved_at = %record.resolved_at,
                    "Evicting expired cache entry"
                );
                entries.remove(domain);
                None
            }
            None => None,
        }
    }

    /// Stores `record` under `domain`, replacing any previous entry.
    pub fn put(&self, domain: &str, record: DomainRecord) {
        let mut entries = match self.entries.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("Cache write lock poisoned, recovering");
                poisoned.into_inner()
            }
        };
        debug!(domain = %domain, "Inserting cache entry");
        entries.insert(domain.to_string(), record);
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        match self.entries.read() {
            Ok(entries) => entries.len(),
            Err(poisoned) => {
                warn!("Cache read lock poisoned, recovering");
                poisoned.into_inner().len()
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
