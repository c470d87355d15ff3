use std::fmt;
use serde::{Deserialize, Serialize};
use crate::cache::AccessOutcome;

/// The result of a simulation. Can be serialised to JSON
///
/// Every classified access bumps exactly one of hits or misses, an eviction also bumps misses,
/// so `evictions <= misses` always holds
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, Eq, PartialEq)]
pub struct Statistics {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

impl Statistics {
    pub fn record(&mut self, outcome: AccessOutcome) {
        match outcome {
            AccessOutcome::Hit => self.hits += 1,
            AccessOutcome::Miss => self.misses += 1,
            AccessOutcome::MissWithEviction => {
                self.misses += 1;
                self.evictions += 1;
            }
        }
    }

    /// Total cache accesses classified so far. A modify counts twice
    pub fn accesses(&self) -> u64 {
        self.hits + self.misses
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hits:{} misses:{} evictions:{}", self.hits, self.misses, self.evictions)
    }
}
