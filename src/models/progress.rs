use serde::{Deserialize, Serialize};

use super::ShowId;

/// Derived watch-progress view for one show. Rebuilt on every request,
/// never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub show_id: ShowId,
    /// Distinct watched episodes counted against the released set
    pub watched_count: u32,
    /// Canonical released-episode total, floored at 1
    pub released_total: u32,
    /// Rounded percentage, clamped to 0..=100
    pub percentage: u8,
    pub is_complete: bool,
}
