//! Error types for the beejak-core library.

use thiserror::Error;

/// Main error type for the beejak library.
#[derive(Error, Debug)]
pub enum BeejakError {
    /// Template layout validation or maintenance error.
    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    /// Amount-in-words conversion error.
    #[error("words error: {0}")]
    Words(#[from] WordsError),

    /// Invoice form editing error.
    #[error("form error: {0}")]
    Form(#[from] FormError),

    /// Session storage or token error.
    #[error("session error: {0}")]
    Session(#[from] SessionError),

    /// JSON encoding or decoding error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to template layout validation and maintenance.
#[derive(Error, Debug)]
pub enum TemplateError {
    /// A component with this id already exists in the layout.
    #[error("duplicate component id: {0}")]
    DuplicateId(String),

    /// No component with this id exists in the layout.
    #[error("unknown component id: {0}")]
    UnknownId(String),

    /// A position or size value is outside the 0-100 percentage range.
    #[error("{field} out of range for component {id}: {value}")]
    OutOfRange {
        id: String,
        field: &'static str,
        value: f64,
    },

    /// An items-table column is not in the allowed set.
    #[error("unknown column for component {id}: {column}")]
    UnknownColumn { id: String, column: String },

    /// An items-table component declares no columns.
    #[error("items-table component {0} has no columns")]
    EmptyColumns(String),

    /// Z-order index is out of bounds.
    #[error("index {index} out of bounds for layout of {len} components")]
    IndexOutOfBounds { index: usize, len: usize },
}

/// Errors from invoice form edits.
#[derive(Error, Debug)]
pub enum FormError {
    /// The referenced line item does not exist.
    #[error("no line item at index {index} (invoice has {len})")]
    NoSuchItem { index: usize, len: usize },
}

/// Errors related to amount-in-words conversion.
#[derive(Error, Debug)]
pub enum WordsError {
    /// Negative amounts cannot be spelled out.
    #[error("cannot convert negative amount to words: {0}")]
    NegativeAmount(rust_decimal::Decimal),

    /// The rupee part exceeds the supported range.
    #[error("amount too large to convert to words: {0}")]
    AmountTooLarge(rust_decimal::Decimal),
}

/// Errors related to session and token storage.
#[derive(Error, Debug)]
pub enum SessionError {
    /// The bearer token is not a decodable JWT.
    #[error("malformed token")]
    MalformedToken,

    /// The underlying storage capability failed.
    #[error("storage failure: {0}")]
    Storage(String),

    /// The stored user profile could not be decoded.
    #[error("corrupt user profile: {0}")]
    CorruptProfile(String),
}

/// Result type for the beejak library.
pub type Result<T> = std::result::Result<T, BeejakError>;
