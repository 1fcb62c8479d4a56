pub mod fragments;
mod statement;

pub use fragments::{columns_block, parameters_block, parameters_block_with, to_assignment};
pub use statement::Statement;
