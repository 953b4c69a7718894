pub mod classifier;
pub mod report;

pub use report::{ActionUsage, InventoryReport};
