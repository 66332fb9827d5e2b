pub use self::{batch::*, driver::*, seed::*, trace::*};

pub mod batch;
pub mod driver;
pub mod seed;
pub mod trace;

use hexzero_engine::IllegalMoveError;
use hexzero_policy::PolicyError;

/// Fatal failures while advancing a batch of games.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum DriverError {
    /// A legal move always exists until the board is full, so running out of
    /// rounds signals a bug in the driver or a policy, not a valid end
    /// state. Never retried automatically.
    #[display("batch failed to finish within {round_cap} rounds")]
    RoundCapExceeded { round_cap: usize },
    #[display("policy contract violation: {_0}")]
    Policy(PolicyError),
    /// The selected move was rejected by the board: move selection or
    /// masking is broken somewhere between the policy and the driver.
    #[display("selected an illegal move: {_0}")]
    IllegalMove(IllegalMoveError),
    #[display("no probability mass on any legal cell")]
    DegenerateDistribution,
}
