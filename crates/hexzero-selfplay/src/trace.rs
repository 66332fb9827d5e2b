use hexzero_engine::{BoardEncoding, Cell, Player};
use serde::{Deserialize, Serialize};

/// One recorded decision inside a self-play game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveRecord {
    /// The board snapshot the policy saw.
    pub encoding: BoardEncoding,
    /// The distribution the move was sampled from (legal-renormalized, noise
    /// mixed), scattered back over all cells in row-major order.
    pub distribution: Vec<f32>,
    pub mover: Player,
    pub chosen: Cell,
}

/// The full record of one self-play game: every encountered state, the
/// sampled move distributions, and the eventual outcome.
///
/// This is the payload handed to an external trainer; the core records it
/// and does not process it further.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameTrace {
    moves: Vec<MoveRecord>,
    winner: Option<Player>,
}

impl GameTrace {
    pub(crate) fn push(&mut self, record: MoveRecord) {
        self.moves.push(record);
    }

    pub(crate) fn set_winner(&mut self, winner: Option<Player>) {
        self.winner = winner;
    }

    #[must_use]
    pub fn moves(&self) -> &[MoveRecord] {
        &self.moves
    }

    #[must_use]
    pub fn winner(&self) -> Option<Player> {
        self.winner
    }
}
