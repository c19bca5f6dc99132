use std::fmt;
use serde::{Deserialize, Serialize};

/// Counters accumulated over one simulation run. Only ever incremented.
///
/// Can be serialised to JSON, and `Display` renders the classic seven line report
#[derive(Debug, Default, Copy, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct Statistics {
    pub total_loads: u64,
    pub total_stores: u64,
    pub load_hits: u64,
    pub load_misses: u64,
    pub store_hits: u64,
    pub store_misses: u64,
    pub total_cycles: u64,
}

impl Statistics {
    pub fn hits(&self) -> u64 {
        self.load_hits + self.store_hits
    }

    pub fn misses(&self) -> u64 {
        self.load_misses + self.store_misses
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total loads: {}", self.total_loads)?;
        writeln!(f, "Total stores: {}", self.total_stores)?;
        writeln!(f, "Load hits: {}", self.load_hits)?;
        writeln!(f, "Load misses: {}", self.load_misses)?;
        writeln!(f, "Store hits: {}", self.store_hits)?;
        writeln!(f, "Store misses: {}", self.store_misses)?;
        write!(f, "Total cycles: {}", self.total_cycles)
    }
}
