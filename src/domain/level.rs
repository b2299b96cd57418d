use serde::{Deserialize, Serialize};

/// Level, bounding thresholds and progress for a total portfolio value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelInfo {
    pub level: u32,
    pub current_threshold: f64,
    pub next_threshold: f64,
    pub progress_pct: f64,
    pub total_value: f64,
}
