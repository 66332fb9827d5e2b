use serde::{Deserialize, Serialize};

use crate::Player;

/// Immutable snapshot of a board, shaped as policy input.
///
/// Two boolean occupancy planes (one per player) in row-major order plus the
/// player to move. This is the only view of a board the core hands to a
/// policy, and the state payload stored in self-play traces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardEncoding {
    size: usize,
    stones: [Vec<bool>; 2],
    to_move: Player,
}

impl BoardEncoding {
    /// # Panics
    ///
    /// Panics if the planes do not match the board size.
    #[must_use]
    pub fn new(size: usize, stones: [Vec<bool>; 2], to_move: Player) -> Self {
        assert!(
            stones.iter().all(|plane| plane.len() == size * size),
            "occupancy planes do not match the board size"
        );
        Self {
            size,
            stones,
            to_move,
        }
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.size * self.size
    }

    #[must_use]
    pub fn to_move(&self) -> Player {
        self.to_move
    }

    /// Occupancy plane for one player, row-major.
    #[must_use]
    pub fn plane(&self, player: Player) -> &[bool] {
        &self.stones[player.index()]
    }

    /// True when neither player owns the cell at `index`.
    #[must_use]
    pub fn is_unowned(&self, index: usize) -> bool {
        !self.stones[0][index] && !self.stones[1][index]
    }

    /// Row-major indices of every unowned cell.
    pub fn unowned_indices(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.cell_count()).filter(|&index| self.is_unowned(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_round_trip() {
        let encoding = BoardEncoding::new(
            2,
            [vec![true, false, false, false], vec![false, false, true, false]],
            Player::First,
        );
        let json = serde_json::to_string(&encoding).unwrap();
        let back: BoardEncoding = serde_json::from_str(&json).unwrap();
        assert_eq!(back, encoding);
    }

    #[test]
    #[should_panic(expected = "occupancy planes do not match")]
    fn mismatched_planes_are_rejected() {
        let _ = BoardEncoding::new(3, [vec![false; 4], vec![false; 9]], Player::First);
    }
}
