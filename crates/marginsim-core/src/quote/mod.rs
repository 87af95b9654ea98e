//! Quote line extraction module.

mod import;
mod parser;
pub mod rules;

pub use import::{import_json, import_json_with, RawId, RawLineItem};
pub use parser::{LineItemParser, LineOutcome, ParseResult, QuoteParser, SkipReason, SkippedLine};

use crate::error::ExtractionError;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;
