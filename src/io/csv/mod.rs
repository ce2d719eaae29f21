//! CSV format reading and writing operations.

mod read;
mod write;

pub use read::read_csv_parcels;
pub use write::{write_report_csv, write_table_csv};
