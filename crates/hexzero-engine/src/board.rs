use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::{BoardEncoding, IllegalMoveError, Opening};

/// A single cell on the board, addressed as (row, column).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[display("({row}, {col})")]
pub struct Cell {
    pub row: u8,
    pub col: u8,
}

impl Cell {
    #[must_use]
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// Row-major index of this cell on a board of the given size.
    #[must_use]
    pub const fn index(self, size: usize) -> usize {
        self.row as usize * size + self.col as usize
    }

    /// Inverse of [`Self::index`].
    #[must_use]
    #[expect(clippy::cast_possible_truncation)]
    pub const fn from_index(index: usize, size: usize) -> Self {
        Self {
            row: (index / size) as u8,
            col: (index % size) as u8,
        }
    }
}

/// One of the two players.
///
/// `First` owns the top and bottom edges and moves first on an empty board;
/// `Second` owns the left and right edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    First,
    Second,
}

impl Player {
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::First => Self::Second,
            Self::Second => Self::First,
        }
    }

    /// 0 for `First`, 1 for `Second`; indexes encoding planes and win tables.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::First => 0,
            Self::Second => 1,
        }
    }
}

/// Hexagonal adjacency on the rhombus grid: six neighbours per cell.
const NEIGHBOUR_OFFSETS: [(i8, i8); 6] = [(-1, 0), (-1, 1), (0, -1), (0, 1), (1, -1), (1, 0)];

/// Game state for one in-progress or finished match of Hex.
///
/// `First` wins by linking the top edge to the bottom edge with a chain of
/// adjacent own stones; `Second` wins left to right. Stones are never moved
/// or captured, and winner state only changes inside [`Self::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    size: usize,
    cells: Vec<Option<Player>>,
    to_move: Player,
    move_count: usize,
    winner: Option<Player>,
}

impl Board {
    /// Creates an empty board of `size` × `size` cells.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero or does not fit cell coordinates.
    #[must_use]
    pub fn new(size: usize) -> Self {
        assert!(
            size > 0 && size <= usize::from(u8::MAX),
            "unsupported board size {size}"
        );
        Self {
            size,
            cells: vec![None; size * size],
            to_move: Player::First,
            move_count: 0,
            winner: None,
        }
    }

    /// Creates a board with a fixed opening already played.
    pub fn with_opening(size: usize, opening: &Opening) -> Result<Self, IllegalMoveError> {
        let mut board = Self::new(size);
        for &cell in opening.moves() {
            board.apply(cell)?;
        }
        Ok(board)
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    #[must_use]
    pub fn to_move(&self) -> Player {
        self.to_move
    }

    #[must_use]
    pub fn move_count(&self) -> usize {
        self.move_count
    }

    /// The winning player, absent until a connection exists.
    #[must_use]
    pub fn winner(&self) -> Option<Player> {
        self.winner
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.winner.is_some() || self.move_count == self.cells.len()
    }

    /// Owner of a cell; `None` for unowned or out-of-range cells.
    #[must_use]
    pub fn owner(&self, cell: Cell) -> Option<Player> {
        self.cell_index(cell).ok().and_then(|index| self.cells[index])
    }

    /// Every unowned cell in row-major order; empty iff the board is full.
    #[must_use]
    pub fn legal_moves(&self) -> Vec<Cell> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, owner)| owner.is_none())
            .map(|(index, _)| Cell::from_index(index, self.size))
            .collect()
    }

    /// Places a stone for the current mover, switches the mover, and
    /// re-evaluates termination.
    ///
    /// Fails without touching the board when the cell is out of range or
    /// already owned, or when the game is over.
    pub fn apply(&mut self, cell: Cell) -> Result<(), IllegalMoveError> {
        if self.is_terminal() {
            return Err(IllegalMoveError::GameOver);
        }
        let index = self.cell_index(cell)?;
        if self.cells[index].is_some() {
            return Err(IllegalMoveError::Occupied { cell });
        }

        let mover = self.to_move;
        self.cells[index] = Some(mover);
        self.move_count += 1;
        self.to_move = mover.opponent();

        // Only the mover can complete a new connection, and both players
        // holding one at once means the state is corrupt.
        if self.has_connection(mover) {
            self.winner = Some(mover);
            assert!(
                !self.has_connection(mover.opponent()),
                "both players hold a winning connection"
            );
        }
        Ok(())
    }

    /// Immutable snapshot shaped as policy input.
    #[must_use]
    pub fn encode(&self) -> BoardEncoding {
        let mut stones = [
            vec![false; self.cells.len()],
            vec![false; self.cells.len()],
        ];
        for (index, owner) in self.cells.iter().enumerate() {
            if let Some(player) = owner {
                stones[player.index()][index] = true;
            }
        }
        BoardEncoding::new(self.size, stones, self.to_move)
    }

    fn cell_index(&self, cell: Cell) -> Result<usize, IllegalMoveError> {
        if usize::from(cell.row) < self.size && usize::from(cell.col) < self.size {
            Ok(cell.index(self.size))
        } else {
            Err(IllegalMoveError::OutOfBounds {
                cell,
                size: self.size,
            })
        }
    }

    fn neighbours(&self, cell: Cell) -> ArrayVec<Cell, 6> {
        let mut neighbours = ArrayVec::new();
        for (row_offset, col_offset) in NEIGHBOUR_OFFSETS {
            let Some(row) = cell.row.checked_add_signed(row_offset) else {
                continue;
            };
            let Some(col) = cell.col.checked_add_signed(col_offset) else {
                continue;
            };
            if usize::from(row) < self.size && usize::from(col) < self.size {
                neighbours.push(Cell::new(row, col));
            }
        }
        neighbours
    }

    /// Flood fill over same-owner cells seeded from the player's starting
    /// edge, looking for any cell on the opposite edge.
    #[expect(clippy::cast_possible_truncation)]
    fn has_connection(&self, player: Player) -> bool {
        let mut visited = vec![false; self.cells.len()];
        let mut stack = Vec::new();
        for i in 0..self.size {
            let cell = match player {
                Player::First => Cell::new(0, i as u8),
                Player::Second => Cell::new(i as u8, 0),
            };
            let index = cell.index(self.size);
            if self.cells[index] == Some(player) {
                visited[index] = true;
                stack.push(cell);
            }
        }

        let far_edge = self.size - 1;
        while let Some(cell) = stack.pop() {
            let reached = match player {
                Player::First => usize::from(cell.row) == far_edge,
                Player::Second => usize::from(cell.col) == far_edge,
            };
            if reached {
                return true;
            }
            for neighbour in self.neighbours(cell) {
                let index = neighbour.index(self.size);
                if !visited[index] && self.cells[index] == Some(player) {
                    visited[index] = true;
                    stack.push(neighbour);
                }
            }
        }
        false
    }
}
