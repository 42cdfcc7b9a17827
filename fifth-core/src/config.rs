//! Session configuration
//!
//! Defaults match the interactive front end: a 1024-phrase hand-off buffer
//! between parser and evaluator, and evaluation bounds generous enough for
//! real programs while still stopping a runaway macro.

pub const DEFAULT_PHRASE_CAPACITY: usize = 1024;
pub const DEFAULT_MAX_DEPTH: usize = 1024;
pub const DEFAULT_MAX_STEPS: u64 = 1_000_000;

/// Bounds applied to the evaluation of one top-level phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalLimits {
    /// Maximum number of nested expansions (macros and `eval`) in flight.
    pub max_depth: usize,
    /// Maximum phrases dispatched per top-level phrase; `None` is unbounded.
    pub max_steps: Option<u64>,
}

impl Default for EvalLimits {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_steps: Some(DEFAULT_MAX_STEPS),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Capacity of the bounded parser -> evaluator channel. Must be non-zero.
    pub phrase_capacity: usize,
    pub limits: EvalLimits,
}

impl SessionConfig {
    pub fn with_phrase_capacity(mut self, capacity: usize) -> Self {
        // tokio rejects zero-capacity channels
        self.phrase_capacity = capacity.max(1);
        self
    }

    pub fn with_limits(mut self, limits: EvalLimits) -> Self {
        self.limits = limits;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            phrase_capacity: DEFAULT_PHRASE_CAPACITY,
            limits: EvalLimits::default(),
        }
    }
}
