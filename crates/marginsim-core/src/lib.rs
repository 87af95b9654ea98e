//! Core library for quote margin simulation.
//!
//! This crate provides:
//! - Line item extraction from pasted quote text and structured JSON
//! - Labour, material and big-ticket margin recalculation
//! - Quote totals, per-group breakdowns and markup warnings
//! - Simulator configuration and a bundled sample quote

pub mod error;
pub mod margin;
pub mod models;
pub mod quote;
pub mod sample;

pub use error::{ExtractionError, Result, SimError, ValidationError};
pub use margin::{recalculate, AdjustedLineItem, Breakdown, MarkupWarning, Recalculation};
pub use models::config::SimConfig;
pub use models::quote::{CalculatedResults, Category, LineItem, MarginSettings, Quote};
pub use quote::rules::{format_currency, format_currency_with, format_percent};
pub use quote::{import_json, LineItemParser, ParseResult, QuoteParser};
pub use sample::{sample_margin_settings, sample_quote};
