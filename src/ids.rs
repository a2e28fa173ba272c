//! Block id allocation.
//!
//! Generated ids combine a prefix with a per-prefix counter, e.g. `AND.0`,
//! `AND.1`, `RS-FF.0`. Each circuit owns its own allocator.

use std::collections::HashMap;

/// Per-prefix counter for generated block ids.
#[derive(Clone, Debug, Default)]
pub struct IdAllocator {
    counters: HashMap<String, u64>,
}

impl IdAllocator {
    /// Creates an allocator with every counter at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next id for `prefix` and advances its counter.
    pub fn next(&mut self, prefix: &str) -> String {
        let counter = self.counters.entry(prefix.to_string()).or_insert(0);
        let id = format!("{}.{}", prefix, counter);
        *counter += 1;
        id
    }

    /// Returns the next id for `prefix` that `taken` does not reject.
    pub fn next_free(&mut self, prefix: &str, taken: impl Fn(&str) -> bool) -> String {
        loop {
            let id = self.next(prefix);
            if !taken(&id) {
                return id;
            }
        }
    }

    /// Number of ids handed out so far for `prefix`.
    pub fn issued(&self, prefix: &str) -> u64 {
        self.counters.get(prefix).copied().unwrap_or(0)
    }
}
