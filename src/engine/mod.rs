//! Pure computation engine(s) for portfolio gamification.

pub mod level;

pub use level::{level, level_info, next_threshold_for, progress, threshold_for};
