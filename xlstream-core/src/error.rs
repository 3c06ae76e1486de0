//! Error types shared across the crate.

use thiserror::Error;

/// Errors raised while building or serializing a workbook.
#[derive(Error, Debug)]
pub enum XlstreamError {
    /// I/O failure on the underlying stream.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP container failure.
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// A cell reference string could not be parsed.
    #[error("invalid cell reference: {0}")]
    InvalidCellRef(String),

    /// A row was addressed behind the sheet writer's cursor.
    #[error("cannot start a row out of order: row {requested} is behind row {current}")]
    RowOutOfOrder { requested: u32, current: u32 },

    /// A cell was addressed behind the sheet writer's cursor.
    #[error("cannot write a cell out of order: column {requested} is behind column {current}")]
    CellOutOfOrder { requested: u32, current: u32 },

    /// The workbook default style left an attribute unset.
    #[error("default workbook style must set {0}")]
    IncompleteDefaultStyle(&'static str),

    /// The workbook default style asked for something the format cannot
    /// express at workbook scope.
    #[error("{0} is not supported in the default workbook style")]
    UnsupportedDefaultStyle(&'static str),

    /// Free-form error, mostly for sheet callbacks that fail for reasons of
    /// their own.
    #[error("{0}")]
    Custom(String),
}

impl XlstreamError {
    /// Build a free-form error from any message.
    pub fn custom<S: Into<String>>(msg: S) -> Self {
        XlstreamError::Custom(msg.into())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, XlstreamError>;
