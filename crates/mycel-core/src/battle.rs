//! Headless battle driver: seed two colonies in opposite corners, tick the
//! arena until one side is wiped out or the step budget runs dry, then
//! score the populations.

use std::error::Error;
use std::fmt;

use crate::canonical;
use crate::config::{BattleConfig, BattleConfigError};
use crate::grid::{Grid, GridError};
use crate::metrics::{BattleOutcome, BattleRecord, MatrixSummary, PopulationSample};
use crate::rule::RuleSet;

#[derive(Debug, Clone, PartialEq)]
pub enum BattleError {
    Config(BattleConfigError),
    Grid(GridError),
}

impl fmt::Display for BattleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BattleError::Config(e) => write!(f, "{e}"),
            BattleError::Grid(e) => write!(f, "{e}"),
        }
    }
}

impl Error for BattleError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            BattleError::Config(e) => Some(e),
            BattleError::Grid(e) => Some(e),
        }
    }
}

impl From<BattleConfigError> for BattleError {
    fn from(err: BattleConfigError) -> Self {
        BattleError::Config(err)
    }
}

impl From<GridError> for BattleError {
    fn from(err: GridError) -> Self {
        BattleError::Grid(err)
    }
}

/// Run one battle between two rule sets. Colors are irrelevant to a
/// headless run and stay blank.
pub fn run_battle(
    rules_a: RuleSet,
    rules_b: RuleSet,
    config: &BattleConfig,
) -> Result<BattleOutcome, BattleError> {
    config.validate()?;
    let size = config.grid_size;
    let mut grid = Grid::new(size, size, vec![rules_a, rules_b], vec![String::new(); 2])?;
    let near = config.start_offset;
    let far = size - config.start_offset;
    grid.place_seeds(&[(near, near), (far, far)])?;

    let mut samples = Vec::new();
    let mut evolve_count = 0;
    let mut counts = grid.population_counts();
    for step in 1..=config.max_steps {
        grid.evolve_all(1);
        evolve_count = step;
        counts = grid.population_counts();
        if config.sample_every > 0 && step % config.sample_every == 0 {
            samples.push(PopulationSample {
                step,
                counts: counts.clone(),
            });
        }
        // Either share hitting 0 or 1 settles the battle.
        if counts[0] == 0 || counts[1] == 0 {
            break;
        }
    }

    let total = counts[0] + counts[1];
    let ratio = if total == 0 {
        0.5
    } else {
        counts[0] as f64 / total as f64
    };
    let winner = if ratio >= config.win_ratio {
        Some(0)
    } else if ratio <= 1.0 - config.win_ratio {
        Some(1)
    } else {
        None
    };
    Ok(BattleOutcome {
        ratio,
        winner,
        evolve_count,
        counts,
        samples,
    })
}

/// Battle two canonical table indices and produce the persistable record.
pub fn run_indexed_battle(
    id1: u16,
    id2: u16,
    config: &BattleConfig,
) -> Result<BattleRecord, BattleError> {
    let outcome = run_battle(
        canonical::rule_set_from_index(id1),
        canonical::rule_set_from_index(id2),
        config,
    )?;
    Ok(BattleRecord {
        id1,
        id2,
        ratio: outcome.ratio,
        winner_id: outcome.winner.map(|w| if w == 0 { id1 } else { id2 }),
        evolve_count: outcome.evolve_count,
        genome1: canonical::to_binary16(id1),
        genome2: canonical::to_binary16(id2),
    })
}

/// Round-robin every unordered pair of indices once. Consumers derive the
/// mirrored half via [`BattleRecord::mirrored`].
pub fn run_matrix(indices: &[u16], config: &BattleConfig) -> Result<MatrixSummary, BattleError> {
    let pair_count = indices.len() * indices.len().saturating_sub(1) / 2;
    let mut records = Vec::with_capacity(pair_count);
    for (i, &a) in indices.iter().enumerate() {
        for &b in &indices[i + 1..] {
            records.push(run_indexed_battle(a, b, config)?);
        }
    }
    Ok(MatrixSummary {
        indices: indices.to_vec(),
        records,
    })
}
