use hexzero_policy::SharedPolicy;
use hexzero_selfplay::GameTrace;
use serde::{Deserialize, Serialize};

use crate::{PolicyLoadError, TrainerFailure};

/// Opaque identifier of a stored model checkpoint.
///
/// The loop only requires that loading by identifier is idempotent: the same
/// identifier always yields the same policy behavior.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(transparent)]
pub struct CheckpointId(String);

impl CheckpointId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CheckpointId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

/// Produces a challenger checkpoint from recorded self-play games.
///
/// Opaque to the core: the traces go in, a loadable checkpoint identifier
/// comes out. `base` is the warm-start checkpoint — the previous challenger,
/// or the seed model on the first iteration.
pub trait Trainer {
    fn train(
        &mut self,
        dataset: &[GameTrace],
        base: &CheckpointId,
    ) -> Result<CheckpointId, TrainerFailure>;
}

/// Loads checkpoints as read-only policy handles.
pub trait PolicyStore {
    fn load(&self, id: &CheckpointId) -> Result<SharedPolicy, PolicyLoadError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkpoint_id_serializes_as_a_bare_string() {
        let id = CheckpointId::from("champion-7");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"champion-7\"");
        let back: CheckpointId = serde_json::from_str("\"champion-7\"").unwrap();
        assert_eq!(back, id);
        assert_eq!(back.as_str(), "champion-7");
    }
}
