//! Staleness guard for asynchronous validators.
//!
//! Async and HTTP validators resolve outside the engine, possibly out of
//! order. The guard hands out a generation number per field path when a
//! check starts; a result is only accepted if it still carries the latest
//! generation for its path, so a slow earlier check can never overwrite a
//! newer one.

use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct AsyncValidationGuard {
    generations: HashMap<String, u64>,
}

impl AsyncValidationGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the start of an async check and returns its generation.
    pub fn begin(&mut self, path: &str) -> u64 {
        let counter = self.generations.entry(path.to_string()).or_insert(0);
        *counter += 1;
        *counter
    }

    /// True while `generation` is still the newest check for `path`.
    pub fn is_current(&self, path: &str, generation: u64) -> bool {
        self.generations.get(path).copied() == Some(generation)
    }

    /// Accepts a completed check. Returns false when a newer check has
    /// started since; stale results must be discarded by the caller.
    #[must_use]
    pub fn accept(&self, path: &str, generation: u64) -> bool {
        self.is_current(path, generation)
    }
}
