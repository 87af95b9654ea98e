//! Error types for the marginsim-core library.

use rust_decimal::Decimal;
use thiserror::Error;

/// Main error type for the marginsim library.
#[derive(Error, Debug)]
pub enum SimError {
    /// Quote text extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Line item validation error.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to quote line extraction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// The input contained no text at all.
    #[error("input is empty")]
    EmptyInput,

    /// Text was present but not a single line item could be parsed.
    #[error("could not parse any line items from {lines} line(s) of input")]
    NoLineItems { lines: usize },

    /// A numeric column could not be read.
    #[error("failed to parse {field}: {value}")]
    Parse { field: String, value: String },
}

/// Errors raised when a line item breaks the quote invariants.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Quantity, cost or price below zero.
    #[error("{field} must not be negative (got {value})")]
    Negative { field: &'static str, value: Decimal },

    /// A negative markup is only valid on an item sold below cost.
    #[error("markup {markup}% is negative but price {price} is not below cost {cost}")]
    NegativeMarkup {
        markup: Decimal,
        cost: Decimal,
        price: Decimal,
    },

    /// Amount or percentage too large to price safely.
    #[error("{field} is out of range (got {value})")]
    OutOfRange { field: &'static str, value: Decimal },

    /// Required field is missing.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Category string that is neither labour nor material.
    #[error("unknown category: {0}")]
    UnknownCategory(String),
}

/// Result type for the marginsim library.
pub type Result<T> = std::result::Result<T, SimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_line_items_message() {
        let err = SimError::from(ExtractionError::NoLineItems { lines: 3 });
        assert_eq!(
            err.to_string(),
            "extraction error: could not parse any line items from 3 line(s) of input"
        );
    }

    #[test]
    fn test_negative_message() {
        let err = ValidationError::Negative {
            field: "cost",
            value: Decimal::new(-5, 0),
        };
        assert_eq!(err.to_string(), "cost must not be negative (got -5)");
    }
}
