mod store;
mod table;
mod types;

pub use store::TableStore;
pub use table::{parse_signed, Table};
pub use types::TableError;
