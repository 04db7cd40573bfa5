pub mod merge;
pub mod record;
pub mod store;

pub use record::{MasterRecord, COLUMNS};
pub use store::MasterStore;
