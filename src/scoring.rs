//! Line-clear scoring and level/speed progression.

/// Points per simultaneous clear, indexed by line count (index 0 unused).
pub const LINE_SCORES: [u32; 5] = [0, 40, 100, 300, 1200];
pub const LINES_PER_LEVEL: u32 = 10;

// Timing (in milliseconds)
pub const BASE_DROP_INTERVAL_MS: u32 = 1000;
pub const MIN_DROP_INTERVAL_MS: u32 = 100;
pub const DROP_INTERVAL_STEP_MS: u32 = 50;
/// Levels past this one no longer speed up gravity.
pub const MAX_SPEED_LEVEL: u32 = 20;

/// Points for clearing `lines` rows in one lock at `level` (the level before any level-up).
pub fn line_clear_score(lines: u32, level: u32) -> u32 {
    match lines {
        1..=4 => LINE_SCORES[lines as usize].saturating_mul(level),
        _ => 0,
    }
}

pub fn level_for_lines(total_lines: u32) -> u32 {
    total_lines / LINES_PER_LEVEL + 1
}

pub fn drop_interval_for_level(level: u32) -> u32 {
    let steps = level.clamp(1, MAX_SPEED_LEVEL) - 1;
    BASE_DROP_INTERVAL_MS
        .saturating_sub(steps * DROP_INTERVAL_STEP_MS)
        .max(MIN_DROP_INTERVAL_MS)
}

/// Outcome of applying one lock's clears to the running totals.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Progress {
    pub score: u32,
    pub lines_cleared: u32,
    pub level: u32,
    pub drop_interval_ms: u32,
}

impl Progress {
    pub fn new() -> Self {
        Self {
            score: 0,
            lines_cleared: 0,
            level: 1,
            drop_interval_ms: BASE_DROP_INTERVAL_MS,
        }
    }

    /// Applies a clear of `lines` rows. Returns the new level if it went up.
    pub fn record_clear(&mut self, lines: u32) -> Option<u32> {
        if lines == 0 {
            return None;
        }

        self.score = self.score.saturating_add(line_clear_score(lines, self.level));
        self.lines_cleared = self.lines_cleared.saturating_add(lines);

        let new_level = level_for_lines(self.lines_cleared);
        if new_level > self.level {
            self.level = new_level;
            self.drop_interval_ms = drop_interval_for_level(new_level);
            Some(new_level)
        } else {
            None
        }
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::new()
    }
}
