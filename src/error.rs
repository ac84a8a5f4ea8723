use std::path::PathBuf;
use thiserror::Error;

/// Reasons an input table could not be produced at all.
#[derive(Error, Debug)]
pub enum MissingSource {
    #[error("the input file \"{0}\" was not found")]
    FileNotFound(PathBuf),
    #[error("the workbook has no sheets")]
    NoSheets,
    #[error("the sheet is empty")]
    EmptySheet,
    #[error("unsupported file extension: {0}")]
    UnsupportedExtension(String),
}

#[derive(Error, Debug)]
pub enum Error {
    /// The expected schema and the actual sheet have diverged.
    #[error("configuration error: header starting with \"{header}\" not found")]
    Configuration { header: String },

    #[error(transparent)]
    MissingSource(#[from] MissingSource),

    #[error("no record is selected")]
    NoRecordSelected,
    #[error("record {index} is out of range ({len} records loaded)")]
    RecordOutOfRange { index: usize, len: usize },
    #[error("link is empty")]
    EmptyLink,
    #[error("link already exists: {0}")]
    DuplicateLink(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid schema file: {0}")]
    Json(#[from] serde_json::Error),
    #[cfg(feature = "excel")]
    #[error("failed to read workbook: {0}")]
    Workbook(#[from] calamine::Error),
    #[cfg(feature = "excel")]
    #[error("failed to write workbook: {0}")]
    XlsxWrite(#[from] rust_xlsxwriter::XlsxError),
}

pub type Result<T> = std::result::Result<T, Error>;
