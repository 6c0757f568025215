pub mod document;
pub mod error;
pub mod export;
pub mod pdf;
pub mod report;
pub mod summary;

pub use error::ReportError;
pub use export::{export_all, read_csv, write_csv, write_json};
pub use pdf::{render_pdf, write_pdf};
pub use report::{Report, ReportBuilder, ReportRow, build};
pub use summary::OutcomeSummary;
