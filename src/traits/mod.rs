mod column;
mod driver;
mod key;
mod table;

pub use column::ColumnRef;
pub use driver::{ConnectionFactory, DatabaseConnection};
pub use key::StoreKey;
pub use table::TableDescriptor;
