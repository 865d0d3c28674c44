//! Injectable sources of nondeterminism.
//!
//! The transformer is a pure function of its input plus these three hooks.
//! Tests pin them to make output byte-for-byte reproducible.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;
pub type UuidSource = Arc<dyn Fn() -> String + Send + Sync>;
/// Orders the original keys of an object before flattening. Later keys win
/// when several normalize to the same column.
pub type KeySorter = Arc<dyn Fn(&mut [String]) + Send + Sync>;

#[derive(Clone)]
pub struct Hooks {
    pub now: Clock,
    pub uuid: UuidSource,
    pub sorter: KeySorter,
}

impl Default for Hooks {
    fn default() -> Self {
        Self {
            now: Arc::new(Utc::now),
            uuid: Arc::new(|| Uuid::new_v4().to_string()),
            sorter: Arc::new(|keys: &mut [String]| keys.sort()),
        }
    }
}

impl Hooks {
    pub fn with_clock(mut self, now: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.now = Arc::new(now);
        self
    }

    pub fn with_uuid(mut self, uuid: impl Fn() -> String + Send + Sync + 'static) -> Self {
        self.uuid = Arc::new(uuid);
        self
    }

    pub fn with_sorter(mut self, sorter: impl Fn(&mut [String]) + Send + Sync + 'static) -> Self {
        self.sorter = Arc::new(sorter);
        self
    }

    /// Current time as an ISO-8601 string with millisecond precision.
    pub fn now_string(&self) -> String {
        (self.now)().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks").finish_non_exhaustive()
    }
}
