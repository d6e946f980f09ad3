use crate::{CaseError, PlayerSnapshot, ProgressionConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XpProgress {
    /// Signed: negative when experience sits below the level's band.
    pub current_in_level: i64,
    pub needed_for_level: u64,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Progression {
    base_xp: u64,
    growth: f64,
}

impl Progression {
    pub fn new(config: &ProgressionConfig) -> Self {
        Self {
            base_xp: config.base_xp,
            growth: config.growth,
        }
    }

    /// Level 1 is the base; every later level floors before feeding the next,
    /// so rounding matches level-by-level accumulation rather than a closed form.
    pub fn xp_threshold(&self, level: u32) -> Result<u64, CaseError> {
        if level < 1 {
            return Err(CaseError::InvalidLevel(level));
        }
        let mut threshold = self.base_xp;
        for _ in 1..level {
            // `as` saturates, so oversized products pin at u64::MAX.
            let next = (threshold as f64 * self.growth).floor() as u64;
            if next == threshold {
                // Fixed point: every later level floors to the same value.
                break;
            }
            threshold = next;
        }
        Ok(threshold)
    }

    fn band_start(&self, level: u32) -> Result<u64, CaseError> {
        if level == 1 {
            return Ok(0);
        }
        self.xp_threshold(level)
    }

    pub fn progress_ratio(&self, snapshot: &PlayerSnapshot) -> Result<XpProgress, CaseError> {
        let level = snapshot.level;
        let start = self.band_start(level)?;
        let end = self.xp_threshold(level.saturating_add(1))?;
        let needed_for_level = end.saturating_sub(start);
        let current_in_level = clamp_i64(snapshot.experience as i128 - start as i128);
        let percent = if needed_for_level == 0 {
            100.0
        } else {
            (100.0 * current_in_level as f64 / needed_for_level as f64).clamp(0.0, 100.0)
        };
        Ok(XpProgress {
            current_in_level,
            needed_for_level,
            percent,
        })
    }
}

impl Default for Progression {
    fn default() -> Self {
        Self::new(&ProgressionConfig::default())
    }
}

fn clamp_i64(value: i128) -> i64 {
    value.clamp(i64::MIN as i128, i64::MAX as i128) as i64
}
