//! Geometric level thresholds: level 1 starts at $100, each next level at 1.5x.

use crate::domain::LevelInfo;

pub const BASE_THRESHOLD: f64 = 100.0;
pub const GROWTH: f64 = 1.5;

/// Level reached by `total_value`. Anything below the base threshold is level 0.
///
/// NaN and negative values are level 0. An infinite value stops once the
/// threshold itself overflows.
pub fn level(total_value: f64) -> u32 {
    if total_value.is_nan() || total_value < BASE_THRESHOLD {
        return 0;
    }

    let mut level = 0;
    let mut threshold = BASE_THRESHOLD;
    while total_value >= threshold && threshold.is_finite() {
        level += 1;
        threshold *= GROWTH;
    }
    level
}

/// Lowest total value that reaches `level`.
pub fn threshold_for(level: u32) -> f64 {
    match level {
        0 => 0.0,
        1 => BASE_THRESHOLD,
        n => BASE_THRESHOLD * GROWTH.powi(i32::try_from(n - 1).unwrap_or(i32::MAX)),
    }
}

pub fn next_threshold_for(level: u32) -> f64 {
    threshold_for(level.saturating_add(1))
}

/// Percent of the way from the current level's threshold to the next one, in [0, 100].
pub fn progress(total_value: f64, level: u32) -> f64 {
    let current = threshold_for(level);
    let next = next_threshold_for(level);

    if next == current || total_value.is_nan() || total_value < current {
        return 0.0;
    }

    let pct = (total_value - current) / (next - current) * 100.0;
    if pct.is_nan() {
        return 0.0;
    }
    pct.clamp(0.0, 100.0)
}

pub fn level_info(total_value: f64) -> LevelInfo {
    let level = level(total_value);
    LevelInfo {
        level,
        current_threshold: threshold_for(level),
        next_threshold: next_threshold_for(level),
        progress_pct: progress(total_value, level),
        total_value,
    }
}
