pub use self::{chain::*, checkpoint::*, improvement::*, state::*};

pub mod chain;
pub mod checkpoint;
pub mod improvement;
pub mod state;

use hexzero_selfplay::DriverError;

/// Failure loading a checkpoint into a usable policy.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("failed to load checkpoint {id}: {reason}")]
pub struct PolicyLoadError {
    pub id: CheckpointId,
    pub reason: String,
}

/// Failure producing a challenger checkpoint.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("trainer failed: {reason}")]
pub struct TrainerFailure {
    pub reason: String,
}

/// Loop-state persistence failures.
#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum PersistError {
    #[display("loop state io error: {_0}")]
    Io(std::io::Error),
    #[display("loop state is not valid JSON: {_0}")]
    Json(serde_json::Error),
}

/// Failure of a single improvement iteration.
///
/// The loop state and champion chain are untouched whenever one of these is
/// returned, so the same iteration index can safely be retried.
#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum IterationError {
    #[display("game simulation failed: {_0}")]
    Driver(DriverError),
    #[display("{_0}")]
    PolicyLoad(PolicyLoadError),
    #[display("{_0}")]
    Trainer(TrainerFailure),
    #[display("{_0}")]
    Persist(PersistError),
}
