pub use self::{policy::*, reference::*};

pub mod policy;
pub mod reference;

/// Contract violations reported by or detected around a policy invocation.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum PolicyError {
    #[display("policy returned {actual} distributions for a batch of {expected} boards")]
    BatchSizeMismatch { expected: usize, actual: usize },
    #[display("distribution has {actual} entries for a board of {expected} cells")]
    DistributionSizeMismatch { expected: usize, actual: usize },
}
