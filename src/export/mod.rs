/// Export layer: filtered rows as CSV, descriptive summary as PDF.
pub mod csv;
pub mod pdf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no table loaded")]
    NoTable,
    #[error("CSV write error: {0}")]
    Csv(#[from] ::csv::Error),
    #[error("PDF write error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
