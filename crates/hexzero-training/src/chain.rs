use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::CheckpointId;

/// One promotion in the champion chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChampionRecord {
    pub id: CheckpointId,
    /// Iteration whose challenger was promoted; `None` for the seed model.
    pub iteration: Option<u64>,
    pub promoted_at: DateTime<Utc>,
}

/// Append-only, monotonically growing chain of promoted checkpoints.
///
/// The head is the only checkpoint ever loaded for self-play generation and
/// for the incumbent side of the next evaluation. Records are never removed;
/// historical checkpoints live on as external artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChampionChain {
    records: Vec<ChampionRecord>,
}

impl ChampionChain {
    /// Starts a chain at the seed model.
    #[must_use]
    pub fn new(seed: CheckpointId) -> Self {
        Self {
            records: vec![ChampionRecord {
                id: seed,
                iteration: None,
                promoted_at: Utc::now(),
            }],
        }
    }

    /// The reigning champion.
    #[must_use]
    pub fn head(&self) -> &CheckpointId {
        &self
            .records
            .last()
            .expect("the champion chain is never empty")
            .id
    }

    #[must_use]
    pub fn records(&self) -> &[ChampionRecord] {
        &self.records
    }

    pub(crate) fn promote(&mut self, id: CheckpointId, iteration: u64) {
        self.records.push(ChampionRecord {
            id,
            iteration: Some(iteration),
            promoted_at: Utc::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn promotion_appends_and_moves_the_head() {
        let mut chain = ChampionChain::new(CheckpointId::from("seed"));
        assert_eq!(chain.head().as_str(), "seed");
        assert_eq!(chain.records().len(), 1);

        chain.promote(CheckpointId::from("gen-3"), 3);
        assert_eq!(chain.head().as_str(), "gen-3");
        assert_eq!(chain.records().len(), 2);
        assert_eq!(chain.records()[0].id.as_str(), "seed");
        assert_eq!(chain.records()[1].iteration, Some(3));
    }
}
