//! Excel workbook reading and report writing.

mod read;
mod write;

pub use read::read_xlsx_parcels;
pub use write::{report_file_name, write_report_xlsx};
