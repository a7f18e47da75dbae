//! Scoring module - line-clear reward, leveling and gravity schedule
//!
//! - Clearing `n` rows at level `L` awards `n² × 100 × L`, using the level in
//!   effect before the clear.
//! - `level = lines / 10 + 1`.
//! - Gravity starts at 1000ms and speeds up 100ms per level, never below 100ms.

use crate::types::{
    BASE_DROP_MS, DROP_INTERVAL_MIN_MS, DROP_STEP_MS, LINES_PER_LEVEL, LINE_CLEAR_BASE,
};

/// Score for clearing `cleared` rows at `level`
pub fn line_clear_score(cleared: u32, level: u32) -> u32 {
    cleared
        .saturating_mul(cleared)
        .saturating_mul(LINE_CLEAR_BASE)
        .saturating_mul(level)
}

/// Level reached after `lines` total cleared rows (1-based)
pub fn level_for_lines(lines: u32) -> u32 {
    lines / LINES_PER_LEVEL + 1
}

/// Level-derived gravity interval in milliseconds
pub fn drop_interval_ms(level: u32) -> u32 {
    let step = level.saturating_sub(1).saturating_mul(DROP_STEP_MS);
    BASE_DROP_MS
        .saturating_sub(step)
        .max(DROP_INTERVAL_MIN_MS)
}
