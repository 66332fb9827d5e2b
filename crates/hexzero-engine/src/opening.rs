//! Fixed openings: pre-played move sequences used to de-bias evaluation.

use serde::{Deserialize, Serialize};

use crate::Cell;

/// A fixed ordered sequence of moves identifying a deterministic starting
/// position. Moves are applied alternately from an empty board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opening {
    moves: Vec<Cell>,
}

impl Opening {
    #[must_use]
    pub fn new(moves: Vec<Cell>) -> Self {
        Self { moves }
    }

    #[must_use]
    pub fn moves(&self) -> &[Cell] {
        &self.moves
    }

    /// Number of pre-played plies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }
}

/// Enumerates every opening of exactly `plies` distinct moves on a board of
/// the given size.
///
/// The count grows as the falling factorial of the cell count, so this is
/// only practical for small `plies` (one or two in practice).
#[must_use]
pub fn first_k_moves(size: usize, plies: usize) -> Vec<Opening> {
    let cells: Vec<Cell> = (0..size * size)
        .map(|index| Cell::from_index(index, size))
        .collect();
    let mut openings = Vec::new();
    let mut current = Vec::with_capacity(plies);
    extend_openings(&cells, plies, &mut current, &mut openings);
    openings
}

fn extend_openings(
    cells: &[Cell],
    plies: usize,
    current: &mut Vec<Cell>,
    openings: &mut Vec<Opening>,
) {
    if current.len() == plies {
        openings.push(Opening::new(current.clone()));
        return;
    }
    for &cell in cells {
        if current.contains(&cell) {
            continue;
        }
        current.push(cell);
        extend_openings(cells, plies, current, openings);
        current.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Board, Player};

    #[test]
    fn enumeration_counts_follow_the_falling_factorial() {
        assert_eq!(first_k_moves(3, 1).len(), 9);
        assert_eq!(first_k_moves(3, 2).len(), 9 * 8);
        assert_eq!(first_k_moves(2, 3).len(), 4 * 3 * 2);
    }

    #[test]
    fn openings_never_repeat_a_cell() {
        for opening in first_k_moves(3, 2) {
            assert_ne!(opening.moves()[0], opening.moves()[1]);
        }
    }

    #[test]
    fn opening_replay_alternates_players() {
        let opening = Opening::new(vec![Cell::new(0, 0), Cell::new(2, 2)]);
        let board = Board::with_opening(3, &opening).unwrap();
        assert_eq!(board.move_count(), 2);
        assert_eq!(board.to_move(), Player::First);
        assert_eq!(board.owner(Cell::new(0, 0)), Some(Player::First));
        assert_eq!(board.owner(Cell::new(2, 2)), Some(Player::Second));
    }

    #[test]
    fn odd_opening_leaves_second_to_move() {
        let opening = Opening::new(vec![Cell::new(1, 1)]);
        let board = Board::with_opening(3, &opening).unwrap();
        assert_eq!(board.to_move(), Player::Second);
    }

    #[test]
    fn serde_round_trip() {
        let opening = Opening::new(vec![Cell::new(0, 1), Cell::new(1, 0)]);
        let json = serde_json::to_string(&opening).unwrap();
        let back: Opening = serde_json::from_str(&json).unwrap();
        assert_eq!(back, opening);
    }
}
