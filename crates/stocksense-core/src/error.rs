use std::fmt;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StockSenseError {
    #[error("inventory is missing required columns: {}", missing.join(", "))]
    Schema { missing: Vec<String> },

    #[error("path traversal attempt blocked: {} resolves outside {}", path.display(), root.display())]
    PathTraversal { path: PathBuf, root: PathBuf },

    #[error("could not load inventory data from {}: {reason}", path.display())]
    SourceNotFound { path: PathBuf, reason: String },

    #[error("malformed inventory data in {}: {reason}", path.display())]
    SourceFormat { path: PathBuf, reason: String },

    #[error("failed to write recommendations to {}: {reason}", path.display())]
    WriteFailure { path: PathBuf, reason: String },

    #[error("failed to load rule config from {}: {reason}", path.display())]
    ConfigLoad { path: PathBuf, reason: String },

    #[error("invalid rule config: {0}")]
    ConfigInvalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Inventory column a record field is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordField {
    Name,
    Stock,
    ExpiryDate,
    DailySales,
}

impl RecordField {
    pub fn column(&self) -> &'static str {
        match self {
            RecordField::Name => "name",
            RecordField::Stock => "stock",
            RecordField::ExpiryDate => "expiry_date",
            RecordField::DailySales => "daily_sales",
        }
    }
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// A single inventory row failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {field}: {reason}")]
pub struct InvalidRecord {
    pub field: RecordField,
    pub reason: String,
}

impl InvalidRecord {
    pub fn new(field: RecordField, reason: impl Into<String>) -> Self {
        InvalidRecord {
            field,
            reason: reason.into(),
        }
    }
}
