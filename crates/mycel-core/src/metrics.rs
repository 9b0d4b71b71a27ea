//! Serializable records produced by the battle runner. External
//! collaborators (catalogs, result stores) consume these snapshots; nothing
//! here feeds back into the simulation.

use serde::{Deserialize, Serialize};

/// Population counts captured at one tick.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationSample {
    pub step: usize,
    pub counts: Vec<u64>,
}

/// Scored outcome of one battle. `ratio` is the first colony's share of the
/// combined population (0.5 when both are gone).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BattleOutcome {
    pub ratio: f64,
    /// Winning colony index, if either share passed the threshold.
    pub winner: Option<u16>,
    /// Ticks actually simulated (early stop on extinction).
    pub evolve_count: usize,
    pub counts: Vec<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub samples: Vec<PopulationSample>,
}

/// Persistable record of a battle between two canonical table indices,
/// genomes carried as 16-bit binary strings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BattleRecord {
    pub id1: u16,
    pub id2: u16,
    pub ratio: f64,
    pub winner_id: Option<u16>,
    pub evolve_count: usize,
    pub genome1: String,
    pub genome2: String,
}

impl BattleRecord {
    /// The same battle viewed from the second colony's side.
    pub fn mirrored(&self) -> BattleRecord {
        BattleRecord {
            id1: self.id2,
            id2: self.id1,
            ratio: 1.0 - self.ratio,
            winner_id: self.winner_id,
            evolve_count: self.evolve_count,
            genome1: self.genome2.clone(),
            genome2: self.genome1.clone(),
        }
    }
}

/// Round-robin results over a set of canonical indices. Each unordered pair
/// is simulated once; the mirrored view is derived, not re-run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatrixSummary {
    pub indices: Vec<u16>,
    pub records: Vec<BattleRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> BattleRecord {
        BattleRecord {
            id1: 513,
            id2: 44_000,
            ratio: 0.75,
            winner_id: Some(513),
            evolve_count: 240,
            genome1: "0000001000000001".to_owned(),
            genome2: "1010101111100000".to_owned(),
        }
    }

    #[test]
    fn mirroring_is_an_involution() {
        let original = record();
        let mirrored = original.mirrored();
        assert_eq!(mirrored.id1, original.id2);
        assert_eq!(mirrored.genome1, original.genome2);
        assert_eq!(mirrored.ratio, 0.25);
        assert_eq!(mirrored.winner_id, original.winner_id);
        assert_eq!(mirrored.mirrored(), original);
    }

    #[test]
    fn records_round_trip_through_json() {
        let original = record();
        let json = serde_json::to_string(&original).unwrap();
        let back: BattleRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, original);
    }

    #[test]
    fn empty_samples_are_skipped_in_json() {
        let outcome = BattleOutcome {
            ratio: 0.5,
            winner: None,
            evolve_count: 10,
            counts: vec![4, 4],
            samples: Vec::new(),
        };
        let json = serde_json::to_string(&outcome).unwrap();
        assert!(!json.contains("samples"));
    }
}
