//! Uploading a CSV or Excel file of sales records.

mod upload_dataset;
mod upload_page;

pub use upload_dataset::upload_dataset;
pub use upload_page::get_upload_page;
