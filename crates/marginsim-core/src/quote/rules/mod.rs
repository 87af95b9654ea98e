//! Rule-based column extraction for quote lines.

pub mod amounts;
pub mod category;
pub mod patterns;

pub use amounts::{
    format_currency, format_currency_with, format_percent, parse_amount, parse_percent,
};
pub use category::ItemClassifier;
pub use patterns::*;

use regex::Regex;

/// Column layout a row was recognised with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowShape {
    /// quantity, cost, price, markup%, tax%, discount%, total
    Full,
    /// quantity, cost, price, markup% and optional trailing columns
    MarkupOnly,
    /// quantity, cost, price
    Bare,
}

impl RowShape {
    /// All shapes, most specific first.
    pub const ALL: [RowShape; 3] = [RowShape::Full, RowShape::MarkupOnly, RowShape::Bare];

    fn pattern(&self) -> &'static Regex {
        match self {
            RowShape::Full => &*FULL_ROW,
            RowShape::MarkupOnly => &*MARKUP_ROW,
            RowShape::Bare => &*BARE_ROW,
        }
    }
}

/// Raw column text captured from one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowMatch<'a> {
    pub shape: RowShape,
    pub name: &'a str,
    pub quantity: &'a str,
    pub cost: &'a str,
    pub price: &'a str,
    pub markup: Option<&'a str>,
    pub tax: Option<&'a str>,
    pub discount: Option<&'a str>,
    pub total: Option<&'a str>,
}

/// Match a line against each row shape in turn; the first match wins.
pub fn match_row(line: &str) -> Option<RowMatch<'_>> {
    RowShape::ALL.iter().find_map(|shape| {
        let caps = shape.pattern().captures(line)?;
        let get = |name: &str| caps.name(name).map(|m| m.as_str());
        Some(RowMatch {
            shape: *shape,
            name: get("name")?.trim(),
            quantity: get("quantity")?,
            cost: get("cost")?,
            price: get("price")?,
            markup: get("markup"),
            tax: get("tax"),
            discount: get("discount"),
            total: get("total"),
        })
    })
}

/// Header row: mentions both a name column and a quantity column.
pub fn is_header(line: &str) -> bool {
    HEADER_NAME.is_match(line) && HEADER_QUANTITY.is_match(line)
}

/// Summary row: subtotal, GST or total followed by an amount.
pub fn is_summary(line: &str) -> bool {
    SUMMARY_ROW.is_match(line)
}
