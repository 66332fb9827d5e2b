pub use self::{paired::*, win_table::*};

pub mod paired;
pub mod win_table;
