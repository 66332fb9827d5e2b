pub use self::{board::*, encoding::*, opening::*};

pub mod board;
pub mod encoding;
pub mod opening;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum IllegalMoveError {
    #[display("cell {cell} is outside a board of size {size}")]
    OutOfBounds { cell: Cell, size: usize },
    #[display("cell {cell} is already owned")]
    Occupied { cell: Cell },
    #[display("the game is already over")]
    GameOver,
}
