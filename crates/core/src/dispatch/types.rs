//! Dispatch run results.

/// Aggregate result of one pass over one source directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Ready pairs found by discovery.
    pub discovered: usize,
    /// Pairs delivered to every configured destination.
    pub delivered: usize,
    /// Pairs whose sentinel was deleted after delivery.
    pub consumed: usize,
    /// Pairs with at least one failed destination, left for the next
    /// invocation.
    pub failed: usize,
}

impl RunSummary {
    /// Fold another entry's summary into a process-wide total.
    pub fn merge(&mut self, other: RunSummary) {
        self.discovered += other.discovered;
        self.delivered += other.delivered;
        self.consumed += other.consumed;
        self.failed += other.failed;
    }
}
