use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;

/// Parameters of a headless two-colony battle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    /// Edge length of the square arena.
    pub grid_size: usize,
    /// Distance from opposite corners at which the two colonies are seeded.
    pub start_offset: usize,
    /// Upper bound on ticks before the battle is scored.
    pub max_steps: usize,
    /// Population share past which a colony is declared the winner.
    pub win_ratio: f64,
    /// Record population counts every this many ticks (0 disables sampling).
    pub sample_every: usize,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            grid_size: 41,
            start_offset: 10,
            max_steps: 1000,
            win_ratio: 0.7,
            sample_every: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BattleConfigError {
    InvalidGridSize,
    InvalidStartOffset {
        grid_size: usize,
        start_offset: usize,
    },
    InvalidMaxSteps,
    InvalidWinRatio,
}

impl fmt::Display for BattleConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BattleConfigError::InvalidGridSize => {
                write!(f, "grid_size must be at least 5 to leave an interior")
            }
            BattleConfigError::InvalidStartOffset {
                grid_size,
                start_offset,
            } => write!(
                f,
                "start_offset ({start_offset}) must place both seeds inside a {grid_size}-cell interior"
            ),
            BattleConfigError::InvalidMaxSteps => write!(f, "max_steps must be positive"),
            BattleConfigError::InvalidWinRatio => {
                write!(f, "win_ratio must be finite and within [0.5, 1]")
            }
        }
    }
}

impl Error for BattleConfigError {}

impl BattleConfig {
    pub fn validate(&self) -> Result<(), BattleConfigError> {
        if self.grid_size < 5 {
            return Err(BattleConfigError::InvalidGridSize);
        }
        // Both (o, o) and (size - o, size - o) must keep their seed cross
        // inside the interior, which pins the offset to [2, size - 2].
        if self.start_offset < 2 || self.start_offset + 2 > self.grid_size {
            return Err(BattleConfigError::InvalidStartOffset {
                grid_size: self.grid_size,
                start_offset: self.start_offset,
            });
        }
        if self.max_steps == 0 {
            return Err(BattleConfigError::InvalidMaxSteps);
        }
        if !self.win_ratio.is_finite() || !(0.5..=1.0).contains(&self.win_ratio) {
            return Err(BattleConfigError::InvalidWinRatio);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        BattleConfig::default().validate().expect("default config");
    }

    #[test]
    fn undersized_grid_is_rejected() {
        let config = BattleConfig {
            grid_size: 4,
            ..BattleConfig::default()
        };
        assert_eq!(config.validate(), Err(BattleConfigError::InvalidGridSize));
    }

    #[test]
    fn offsets_outside_the_interior_are_rejected() {
        for start_offset in [0, 1, 40, 41] {
            let config = BattleConfig {
                start_offset,
                ..BattleConfig::default()
            };
            assert_eq!(
                config.validate(),
                Err(BattleConfigError::InvalidStartOffset {
                    grid_size: 41,
                    start_offset,
                }),
                "offset {start_offset}"
            );
        }
    }

    #[test]
    fn degenerate_win_ratio_is_rejected() {
        for win_ratio in [0.4, 1.1, f64::NAN] {
            let config = BattleConfig {
                win_ratio,
                ..BattleConfig::default()
            };
            assert_eq!(config.validate(), Err(BattleConfigError::InvalidWinRatio));
        }
    }

    #[test]
    fn partial_json_deserializes_with_defaults() {
        let config: BattleConfig =
            serde_json::from_str(r#"{"grid_size": 61, "max_steps": 200}"#).unwrap();
        assert_eq!(config.grid_size, 61);
        assert_eq!(config.max_steps, 200);
        assert_eq!(config.start_offset, 10);
        assert_eq!(config.win_ratio, 0.7);
        assert_eq!(config.sample_every, 0);
    }
}
