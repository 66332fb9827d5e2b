use std::sync::Arc;

use chrono::{DateTime, Utc};
use hexzero_policy::{HighestCellPolicy, LowestCellPolicy, SharedPolicy, UniformRandomPolicy};
use hexzero_selfplay::GameTrace;
use serde::Serialize;

/// Built-in policies addressable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::FromStr)]
pub enum PolicyKind {
    Uniform,
    Lowest,
    Highest,
}

impl PolicyKind {
    pub fn instantiate(self) -> SharedPolicy {
        match self {
            Self::Uniform => Arc::new(UniformRandomPolicy),
            Self::Lowest => Arc::new(LowestCellPolicy),
            Self::Highest => Arc::new(HighestCellPolicy),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Uniform => "uniform",
            Self::Lowest => "lowest",
            Self::Highest => "highest",
        }
    }
}

/// JSON artifact written by `hexzero evaluate`.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationArtifact {
    pub generated_at: DateTime<Utc>,
    pub board_size: usize,
    pub challenger: String,
    pub incumbent: String,
    pub games_per_pass: usize,
    pub counts: [[u64; 2]; 2],
    pub challenger_win_rate: f64,
    pub signed_chi_squared: f64,
}

/// JSON artifact written by `hexzero compare`.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonArtifact {
    pub generated_at: DateTime<Utc>,
    pub board_size: usize,
    pub policies: Vec<String>,
    /// `signed_chi_squared[i][j]` compares row policy `i` against column
    /// policy `j`; the matrix is antisymmetric with a zero diagonal.
    pub signed_chi_squared: Vec<Vec<f64>>,
}

/// JSON artifact written by `hexzero generate-data`.
#[derive(Debug, Clone, Serialize)]
pub struct DatasetArtifact {
    pub generated_at: DateTime<Utc>,
    pub board_size: usize,
    pub policy: String,
    pub games: Vec<GameTrace>,
}
