//! Per-run summaries reported by the workers

/// Result of one retry scan
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RetryRunSummary {
    /// Due tasks found by the scan
    pub scanned: usize,
    pub delivered: usize,
    pub rescheduled: usize,
    pub abandoned: usize,
    pub dropped: usize,
    /// Tasks whose queue bookkeeping failed; they stay due for the next tick
    pub failed: usize,
}

impl RetryRunSummary {
    pub fn is_idle(&self) -> bool {
        self.scanned == 0
    }
}

/// Result of one proactive refresh run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RefreshRunSummary {
    pub refreshed: usize,
    /// Credentials still valid beyond the refresh-ahead window
    pub skipped: usize,
    pub failed: usize,
}
