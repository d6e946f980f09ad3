use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_XP: u64 = 1000;
pub const DEFAULT_XP_GROWTH: f64 = 1.5;
pub const DEFAULT_REEL_LENGTH: usize = 35;
pub const DEFAULT_WINNING_INDEX: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionConfig {
    pub base_xp: u64,
    pub growth: f64,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            base_xp: DEFAULT_BASE_XP,
            growth: DEFAULT_XP_GROWTH,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReelConfig {
    pub length: usize,
    pub winning_index: usize,
}

impl ReelConfig {
    /// Stop slot, clamped into the strip.
    pub fn stop_index(&self) -> usize {
        self.winning_index.min(self.length.saturating_sub(1))
    }
}

impl Default for ReelConfig {
    fn default() -> Self {
        Self {
            length: DEFAULT_REEL_LENGTH,
            winning_index: DEFAULT_WINNING_INDEX,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub progression: ProgressionConfig,
    pub reel: ReelConfig,
    /// Fixed seed for reproducible reels; entropy when absent.
    pub seed: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"reel":{"length":10},"seed":5}"#).expect("parse");
        assert_eq!(config.reel.length, 10);
        assert_eq!(config.reel.winning_index, DEFAULT_WINNING_INDEX);
        assert_eq!(config.reel.stop_index(), 9);
        assert_eq!(config.progression, ProgressionConfig::default());
        assert_eq!(config.seed, Some(5));
    }

    #[test]
    fn stop_index_on_empty_reel_is_zero() {
        let reel = ReelConfig {
            length: 0,
            winning_index: 20,
        };
        assert_eq!(reel.stop_index(), 0);
    }
}
