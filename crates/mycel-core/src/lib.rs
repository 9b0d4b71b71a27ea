pub mod battle;
pub mod canonical;
pub mod codec;
pub mod config;
pub mod constants;
pub mod generator;
pub mod grid;
pub mod metrics;
pub mod rng;
pub mod rule;

pub use config::{BattleConfig, BattleConfigError};
pub use constants::{DEFAULT_DIE_AGE, DEFAULT_WOOD_AGE};
pub use grid::{AgingPolicy, Cell, CellOwner, Colony, Grid, GridError};
pub use metrics::{BattleOutcome, BattleRecord, MatrixSummary, PopulationSample};
pub use rng::{Lcg, SeedValue};
pub use rule::{Rule, RuleSet};
