use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanGoError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Workbook error: {0}")]
    Workbook(String),

    #[error("Missing sheet: {0}")]
    MissingSheet(String),

    #[error("Sheet '{sheet}' has no column '{column}'")]
    MissingColumn { sheet: String, column: String },

    #[error("Sheet '{sheet}', row {row}, column '{column}': cannot read {value:?}")]
    InvalidValue {
        sheet: String,
        row: usize,
        column: String,
        value: String,
    },

    #[error("Unsupported data source: {0}")]
    UnsupportedSource(String),

    #[error("No workbook configured. Pass --workbook, set SCANGO_WORKBOOK, or run `scango load <path>`.")]
    NoWorkbook,

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Settings error: {0}")]
    Settings(String),
}

pub type Result<T> = std::result::Result<T, ScanGoError>;
