//! Persisted loop state for resume-after-interruption.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{CheckpointId, PersistError};

/// The externally visible state of the self-improvement loop.
///
/// Everything needed to resume an interrupted run without repeating
/// completed iterations: the next iteration index, the reigning champion,
/// the rejection streak, and the last challenger produced (the warm-start
/// base for the next training call).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopState {
    pub iteration: u64,
    pub champion: CheckpointId,
    pub rejection_streak: u64,
    pub last_challenger: Option<CheckpointId>,
}

impl LoopState {
    /// Fresh state pointing at the seed model.
    #[must_use]
    pub const fn seeded(seed: CheckpointId) -> Self {
        Self {
            iteration: 0,
            champion: seed,
            rejection_streak: 0,
            last_challenger: None,
        }
    }

    pub fn load(path: &Path) -> Result<Self, PersistError> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Loads persisted state, falling back to a fresh seeded state when no
    /// file exists yet.
    pub fn load_or_seeded(path: &Path, seed: CheckpointId) -> Result<Self, PersistError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::seeded(seed))
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), PersistError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("hexzero-{}-{name}.json", std::process::id()))
    }

    #[test]
    fn seeded_state_starts_at_iteration_zero() {
        let state = LoopState::seeded(CheckpointId::from("seed"));
        assert_eq!(state.iteration, 0);
        assert_eq!(state.champion.as_str(), "seed");
        assert_eq!(state.rejection_streak, 0);
        assert_eq!(state.last_challenger, None);
    }

    #[test]
    fn save_then_load_round_trips() {
        let path = scratch_path("state-round-trip");
        let state = LoopState {
            iteration: 12,
            champion: CheckpointId::from("gen-9"),
            rejection_streak: 2,
            last_challenger: Some(CheckpointId::from("gen-11")),
        };
        state.save(&path).unwrap();
        let loaded = LoopState::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, state);
    }

    #[test]
    fn load_or_seeded_falls_back_when_missing() {
        let path = scratch_path("state-missing");
        std::fs::remove_file(&path).ok();
        let state = LoopState::load_or_seeded(&path, CheckpointId::from("seed")).unwrap();
        assert_eq!(state, LoopState::seeded(CheckpointId::from("seed")));
    }
}
