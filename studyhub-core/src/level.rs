//! Level curve: geometric XP requirements with cumulative thresholds.
//!
//! Level 1 needs 1000 XP to advance; each following level needs 1.5x the
//! previous requirement (rounded). Reaching level N takes the sum of the
//! requirements of levels 1..N.

use serde::{Deserialize, Serialize};

pub const BASE_LEVEL_XP: f64 = 1000.0;
pub const LEVEL_MULTIPLIER: f64 = 1.5;

/// Upper bound on the level walk. XP beyond the cap is banked.
pub const DEFAULT_MAX_LEVEL: u32 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelInfo {
    /// >= 1
    pub level: u32,
    /// XP accrued inside the current level, always below `next_level_xp`.
    pub current_xp: u64,
    /// XP span of the current level.
    pub next_level_xp: u64,
    /// The walk stopped at the configured cap.
    pub max_level_reached: bool,
}

impl LevelInfo {
    pub fn is_max_level(&self) -> bool {
        self.max_level_reached
    }

    /// Progress through the current level, 0..=100. Always 100 at the cap.
    pub fn progress_percent(&self) -> f64 {
        if self.max_level_reached {
            return 100.0;
        }
        if self.next_level_xp == 0 {
            return 0.0;
        }
        (self.current_xp as f64 / self.next_level_xp as f64 * 100.0).clamp(0.0, 100.0)
    }

    /// XP still missing to reach the next level; 0 at the cap.
    pub fn xp_to_next(&self) -> u64 {
        if self.max_level_reached {
            return 0;
        }
        self.next_level_xp.saturating_sub(self.current_xp)
    }
}

/// XP needed to advance out of `level`. Saturates at `u64::MAX`.
pub fn xp_required_for_level(level: u32) -> u64 {
    let exponent = level.max(1) - 1;
    // `as` saturates, so huge curves clamp to u64::MAX.
    (BASE_LEVEL_XP * LEVEL_MULTIPLIER.powi(exponent.min(i32::MAX as u32) as i32)).round() as u64
}

/// Total XP needed to reach `level` from zero.
pub fn cumulative_xp_for_level(level: u32) -> u64 {
    (1..level.max(1)).fold(0u64, |acc, l| acc.saturating_add(xp_required_for_level(l)))
}

/// Resolve lifetime XP into a level with the default cap.
pub fn resolve_level(total_xp: u64) -> LevelInfo {
    resolve_level_capped(total_xp, DEFAULT_MAX_LEVEL)
}

/// Resolve lifetime XP into a level, stopping at `max_level`.
pub fn resolve_level_capped(total_xp: u64, max_level: u32) -> LevelInfo {
    let max_level = max_level.max(1);
    let mut level = 1u32;
    let mut floor = 0u64;

    loop {
        let span = xp_required_for_level(level);

        if level >= max_level {
            return LevelInfo {
                level,
                // Excess stays in total_xp; current_xp keeps below the span.
                current_xp: (total_xp - floor).min(span.saturating_sub(1)),
                next_level_xp: span,
                max_level_reached: true,
            };
        }

        let next = floor.saturating_add(span);
        if total_xp < next {
            return LevelInfo {
                level,
                current_xp: total_xp - floor,
                next_level_xp: span,
                max_level_reached: false,
            };
        }

        floor = next;
        level += 1;
    }
}
