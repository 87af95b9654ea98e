//! Line-by-line quote text parser.

use std::fmt;
use std::time::Instant;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ExtractionError;
use crate::models::config::ParsingConfig;
use crate::models::quote::LineItem;

use super::rules::{
    amounts::{parse_amount, parse_percent},
    is_header, is_summary, match_row, ItemClassifier, RowMatch,
};
use super::Result;

/// Why a line did not produce an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    /// Empty line.
    Blank,
    /// Column header row.
    Header,
    /// Subtotal, GST or total row.
    Summary,
    /// No row pattern matched.
    Unmatched,
    /// A numeric column could not be read.
    Malformed(String),
    /// The row broke a line item invariant.
    Invalid(String),
}

impl SkipReason {
    /// True for lines that looked like data but were discarded.
    pub fn is_dropped(&self) -> bool {
        matches!(
            self,
            SkipReason::Unmatched | SkipReason::Malformed(_) | SkipReason::Invalid(_)
        )
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Blank => write!(f, "blank line"),
            SkipReason::Header => write!(f, "header row"),
            SkipReason::Summary => write!(f, "summary row"),
            SkipReason::Unmatched => write!(f, "no row pattern matched"),
            SkipReason::Malformed(detail) => write!(f, "malformed number ({})", detail),
            SkipReason::Invalid(detail) => write!(f, "invalid item ({})", detail),
        }
    }
}

/// A line that produced no item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedLine {
    /// 1-based line number in the input.
    pub line_number: usize,
    /// Trimmed line text.
    pub text: String,
    /// Why it was skipped.
    pub reason: SkipReason,
}

/// Result of parsing a block of quote text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseResult {
    /// Parsed line items, ids assigned in order.
    pub items: Vec<LineItem>,
    /// Lines that produced no item.
    pub skipped: Vec<SkippedLine>,
    /// Number of non-blank input lines.
    pub line_count: usize,
    /// Raw input text.
    pub raw_text: String,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

impl ParseResult {
    /// Lines that looked like data but were discarded.
    pub fn dropped(&self) -> impl Iterator<Item = &SkippedLine> {
        self.skipped.iter().filter(|s| s.reason.is_dropped())
    }

    /// Human readable warnings, one per dropped line.
    pub fn warnings(&self) -> Vec<String> {
        self.dropped()
            .map(|s| format!("line {}: {} ({})", s.line_number, s.reason, s.text))
            .collect()
    }
}

/// Outcome of parsing a single line.
#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    Item(LineItem),
    Skipped(SkipReason),
}

/// Trait for quote text parsing.
pub trait QuoteParser {
    /// Parse quote text into line items.
    ///
    /// Fails with [`ExtractionError::NoLineItems`] when nothing could be
    /// parsed, so an unreadable paste is never mistaken for an empty quote.
    fn parse(&self, text: &str) -> Result<ParseResult>;
}

/// Regex-driven parser for tabular quote text.
#[derive(Debug, Clone)]
pub struct LineItemParser {
    classifier: ItemClassifier,
    default_tax_percent: Decimal,
}

impl LineItemParser {
    /// Create a parser with default settings.
    pub fn new() -> Self {
        Self::from_config(&ParsingConfig::default())
    }

    /// Create a parser from parsing configuration.
    pub fn from_config(config: &ParsingConfig) -> Self {
        Self {
            classifier: ItemClassifier::from_config(config),
            default_tax_percent: config.default_tax_percent,
        }
    }

    /// Set the cost above which items are big-ticket.
    pub fn with_high_value_threshold(mut self, threshold: Decimal) -> Self {
        self.classifier = self.classifier.with_high_value_threshold(threshold);
        self
    }

    /// Set the tax percent used when a line has no tax column.
    pub fn with_default_tax_percent(mut self, percent: Decimal) -> Self {
        self.default_tax_percent = percent;
        self
    }

    /// Parse one line into an item with id "1", or `None` if it is skipped.
    pub fn parse_line(&self, line: &str) -> Option<LineItem> {
        match self.classify_line(line.trim(), "1") {
            LineOutcome::Item(item) => Some(item),
            LineOutcome::Skipped(_) => None,
        }
    }

    /// Parse one trimmed line, reporting why it was skipped if it was.
    pub fn classify_line(&self, line: &str, id: &str) -> LineOutcome {
        if line.is_empty() {
            return LineOutcome::Skipped(SkipReason::Blank);
        }
        if is_header(line) {
            return LineOutcome::Skipped(SkipReason::Header);
        }
        if is_summary(line) {
            return LineOutcome::Skipped(SkipReason::Summary);
        }

        let Some(row) = match_row(line) else {
            return LineOutcome::Skipped(SkipReason::Unmatched);
        };

        match self.build_item(&row, id) {
            Ok(item) => LineOutcome::Item(item),
            Err(reason) => LineOutcome::Skipped(reason),
        }
    }

    /// Parse every line, keeping whatever could be read.
    ///
    /// The result may hold zero items; [`QuoteParser::parse`] turns that into
    /// an error.
    pub fn parse_lenient(&self, text: &str) -> ParseResult {
        let start = Instant::now();

        info!("Parsing quote from {} characters of text", text.len());

        let mut items = Vec::new();
        let mut skipped = Vec::new();
        let mut line_count = 0;

        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if !line.is_empty() {
                line_count += 1;
            }

            let id = (items.len() + 1).to_string();
            match self.classify_line(line, &id) {
                LineOutcome::Item(item) => items.push(item),
                LineOutcome::Skipped(reason) => {
                    if reason.is_dropped() {
                        debug!("Dropped line {}: {} ({})", index + 1, reason, line);
                    }
                    skipped.push(SkippedLine {
                        line_number: index + 1,
                        text: line.to_string(),
                        reason,
                    });
                }
            }
        }

        let result = ParseResult {
            items,
            skipped,
            line_count,
            raw_text: text.to_string(),
            processing_time_ms: start.elapsed().as_millis() as u64,
        };

        debug!(
            "Parsed {} items from {} lines ({} dropped)",
            result.items.len(),
            result.line_count,
            result.dropped().count()
        );

        result
    }

    fn build_item(
        &self,
        row: &RowMatch<'_>,
        id: &str,
    ) -> std::result::Result<LineItem, SkipReason> {
        let malformed = |field: &str, value: &str| {
            SkipReason::Malformed(
                ExtractionError::Parse {
                    field: field.to_string(),
                    value: value.to_string(),
                }
                .to_string(),
            )
        };
        let amount = |field: &str, value: &str| {
            parse_amount(value).ok_or_else(|| malformed(field, value))
        };
        let percent = |field: &str, value: &str| {
            parse_percent(value).ok_or_else(|| malformed(field, value))
        };

        let quantity = amount("quantity", row.quantity)?;
        let cost = amount("cost", row.cost)?;
        let price = amount("price", row.price)?;

        let markup_percent = match row.markup {
            Some(markup) => percent("markup", markup)?,
            None => LineItem::markup_from_prices(cost, price).ok_or_else(|| {
                malformed("markup", &format!("{} over {}", row.price, row.cost))
            })?,
        };
        let tax_percent = match row.tax {
            Some(tax) => percent("tax", tax)?,
            None => self.default_tax_percent,
        };
        let discount_percent = match row.discount {
            Some(discount) => percent("discount", discount)?,
            None => Decimal::ZERO,
        };
        let line_total = row.total.map(|total| amount("total", total)).transpose()?;

        let is_high_value = self.classifier.is_high_value(row.name, cost);

        let item = LineItem {
            id: id.to_string(),
            name: row.name.to_string(),
            category: self.classifier.category(row.name),
            quantity,
            cost,
            price,
            markup_percent,
            tax_percent,
            discount_percent,
            line_total,
            is_high_value,
            max_markup_percent: is_high_value.then(|| self.classifier.max_markup()),
        };

        item.validate()
            .map_err(|e| SkipReason::Invalid(e.to_string()))?;

        Ok(item)
    }
}

impl Default for LineItemParser {
    fn default() -> Self {
        Self::new()
    }
}

impl QuoteParser for LineItemParser {
    fn parse(&self, text: &str) -> Result<ParseResult> {
        if text.trim().is_empty() {
            return Err(ExtractionError::EmptyInput);
        }

        let result = self.parse_lenient(text);
        if result.items.is_empty() {
            return Err(ExtractionError::NoLineItems {
                lines: result.line_count,
            });
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::quote::Category;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_full_labour_row() {
        let parser = LineItemParser::new();
        let item = parser
            .parse_line("Labour - Dave 8.00 $58.00 $95.00 63.79% 15% 0% $760.00")
            .unwrap();

        assert_eq!(item.name, "Labour - Dave");
        assert_eq!(item.quantity, Decimal::new(800, 2));
        assert_eq!(item.cost, Decimal::new(5800, 2));
        assert_eq!(item.price, Decimal::new(9500, 2));
        assert_eq!(item.markup_percent, Decimal::new(6379, 2));
        assert_eq!(item.tax_percent, Decimal::from(15));
        assert_eq!(item.discount_percent, Decimal::ZERO);
        assert_eq!(item.line_total, Some(Decimal::new(76000, 2)));
        assert_eq!(item.category, Category::Labour);
        assert!(!item.is_high_value);
        assert_eq!(item.max_markup_percent, None);
    }

    #[test]
    fn test_parse_high_value_material() {
        let parser = LineItemParser::new();
        let item = parser
            .parse_line("Daikin FTXM35U 1.00 1120.00 1344.00 20.00% 15% 0% 1344.00")
            .unwrap();

        assert!(item.is_high_value);
        assert_eq!(item.category, Category::Material);
        assert_eq!(item.max_markup_percent, Some(Decimal::from(25)));
        assert_eq!(item.markup_percent, Decimal::new(2000, 2));
    }

    #[test]
    fn test_header_line_produces_nothing() {
        let parser = LineItemParser::new();
        assert_eq!(
            parser.parse_line("Name Quantity Cost Price Markup Tax Discount Total"),
            None
        );
        assert_eq!(
            parser.classify_line("Name Quantity Cost Price Markup Tax Discount Total", "1"),
            LineOutcome::Skipped(SkipReason::Header)
        );
    }

    #[test]
    fn test_derived_markup_for_bare_row() {
        let parser = LineItemParser::new();
        let item = parser.parse_line("Wall cap 80mm 1 $9.68 $18.17").unwrap();

        assert_eq!(item.markup_percent, Decimal::new(8771, 2));
        assert_eq!(item.tax_percent, Decimal::from(15));
        assert_eq!(item.line_total, None);
    }

    #[test]
    fn test_zero_cost_markup_is_zero() {
        let parser = LineItemParser::new();
        let item = parser.parse_line("Freebie sticker 3 0.00 2.00").unwrap();
        assert_eq!(item.markup_percent, Decimal::ZERO);
    }

    #[test]
    fn test_negative_markup_above_cost_is_invalid() {
        let parser = LineItemParser::new();
        let outcome = parser.classify_line("Duct 1.00 20.00 30.00 -10%", "1");
        assert!(matches!(outcome, LineOutcome::Skipped(SkipReason::Invalid(_))));

        // Sold below cost: a negative markup is fine
        let item = parser.parse_line("Duct 1.00 20.00 18.00 -10%").unwrap();
        assert_eq!(item.markup_percent, Decimal::from(-10));
    }

    #[test]
    fn test_malformed_number_drops_line() {
        let parser = LineItemParser::new();
        let outcome =
            parser.classify_line("Huge 1 99999999999999999999999999999999 2.00", "1");
        assert!(matches!(outcome, LineOutcome::Skipped(SkipReason::Malformed(_))));
    }

    #[test]
    fn test_total_in_item_name_is_not_a_summary() {
        let parser = LineItemParser::new();
        let item = parser.parse_line("Labour total 8.00 58.00 95.00").unwrap();
        assert_eq!(item.name, "Labour total");
        assert_eq!(item.category, Category::Labour);
        assert_eq!(
            parser.classify_line("Subtotal $2,278.17", "1"),
            LineOutcome::Skipped(SkipReason::Summary)
        );
    }

    #[test]
    fn test_overflowing_derived_markup_drops_line() {
        let parser = LineItemParser::new();
        let outcome =
            parser.classify_line("Widget 1 0.01 1000000000000000000000000000", "1");
        assert!(matches!(outcome, LineOutcome::Skipped(SkipReason::Malformed(_))));

        let text = "Widget 1 0.01 1000000000000000000000000000\nDuct 1 20.27 38.11";
        let result = parser.parse(text).unwrap();
        assert_eq!(result.items.len(), 1);
        assert_eq!(result.items[0].name, "Duct");
        assert_eq!(result.dropped().count(), 1);
    }

    #[test]
    fn test_out_of_range_amount_is_invalid() {
        let parser = LineItemParser::new();
        let outcome = parser.classify_line(
            "Widget 1000 1000000000000000000000000000 1000000000000000000000000000",
            "1",
        );
        assert!(matches!(outcome, LineOutcome::Skipped(SkipReason::Invalid(_))));
    }

    #[test]
    fn test_parse_document() {
        let text = "
            Name\tQuantity\tCost\tPrice\tMarkup\tTax\tDiscount\tTotal
            Labour - Dave\t6.00\t$58.00\t$95.00\t63.79%\t15%\t0%\t$570.00
            33006820 Wall cap 80mm PVC GY EWC80 Ezyduct\t1.00\t$9.68\t$18.17\t88.10%\t15%\t0%\t$18.17
            see attached drawings
            FTXV50U\t1.00\t$1,352.00\t$1,690.00\t25.00%\t15%\t0%\t$1,690.00

            Subtotal $2,278.17
            GST Amount $341.73
            Total $2,619.90
        ";

        let parser = LineItemParser::new();
        let result = parser.parse(text).unwrap();

        let ids: Vec<&str> = result.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert_eq!(result.items[1].name, "33006820 Wall cap 80mm PVC GY EWC80 Ezyduct");
        assert_eq!(result.items[2].cost, Decimal::new(135200, 2));
        assert!(result.items[2].is_high_value);

        let dropped: Vec<usize> = result.dropped().map(|s| s.line_number).collect();
        assert_eq!(dropped, vec![5]);
        assert_eq!(result.warnings().len(), 1);

        let summaries = result
            .skipped
            .iter()
            .filter(|s| s.reason == SkipReason::Summary)
            .count();
        assert_eq!(summaries, 3);
    }

    #[test]
    fn test_unparseable_text_is_an_error() {
        let parser = LineItemParser::new();
        assert_eq!(
            parser.parse("hello\nworld").unwrap_err(),
            ExtractionError::NoLineItems { lines: 2 }
        );
        assert_eq!(parser.parse("   \n  ").unwrap_err(), ExtractionError::EmptyInput);

        let lenient = parser.parse_lenient("hello\nworld");
        assert!(lenient.items.is_empty());
        assert_eq!(lenient.dropped().count(), 2);
    }

    #[test]
    fn test_custom_config() {
        let config = ParsingConfig {
            labour_keywords: vec!["sparky".to_string()],
            ..ParsingConfig::default()
        };
        let parser = LineItemParser::from_config(&config)
            .with_high_value_threshold(Decimal::from(100))
            .with_default_tax_percent(Decimal::from(10));

        let item = parser.parse_line("Sparky hours 2 60 90").unwrap();
        assert_eq!(item.category, Category::Labour);
        assert_eq!(item.tax_percent, Decimal::from(10));

        let item = parser.parse_line("Labour - Dave 2 160 190").unwrap();
        assert_eq!(item.category, Category::Material);
        assert!(item.is_high_value);
    }
}
