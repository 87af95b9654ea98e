//! Import of structured line items (JSON as produced by an external
//! text-to-JSON step), validated at the boundary.

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{ExtractionError, Result, ValidationError};
use crate::models::config::ParsingConfig;
use crate::models::quote::{default_gst_rate, Category, LineItem, Quote};

use super::rules::ItemClassifier;

/// Identifier as it may appear in JSON: string or number.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Text(String),
    Number(u64),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Text(s) => s,
            RawId::Number(n) => n.to_string(),
        }
    }
}

/// An unvalidated line item row.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLineItem {
    pub id: Option<RawId>,
    pub name: Option<String>,
    #[serde(rename = "type", alias = "category")]
    pub kind: Option<String>,
    pub quantity: Option<Decimal>,
    pub cost: Option<Decimal>,
    pub price: Option<Decimal>,
    #[serde(alias = "markupPercent")]
    pub markup: Option<Decimal>,
    #[serde(alias = "taxPercent")]
    pub tax: Option<Decimal>,
    #[serde(alias = "discountPercent")]
    pub discount: Option<Decimal>,
    pub total: Option<Decimal>,
    #[serde(alias = "isHighValue")]
    pub is_big_ticket: Option<bool>,
    #[serde(alias = "maxMarkupPercent")]
    pub max_markup: Option<Decimal>,
}

impl RawLineItem {
    /// Validate into a [`LineItem`], filling derivable fields.
    pub fn into_line_item(
        self,
        classifier: &ItemClassifier,
        default_tax_percent: Decimal,
    ) -> std::result::Result<LineItem, ValidationError> {
        let id = self
            .id
            .map(RawId::into_string)
            .ok_or(ValidationError::MissingField("id"))?;
        let name = self
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .ok_or(ValidationError::MissingField("name"))?;
        let quantity = self.quantity.ok_or(ValidationError::MissingField("quantity"))?;
        let cost = self.cost.ok_or(ValidationError::MissingField("cost"))?;
        let price = self.price.ok_or(ValidationError::MissingField("price"))?;

        let category = match self.kind {
            Some(kind) => Category::from_str(&kind).ok_or(ValidationError::UnknownCategory(kind))?,
            None => classifier.category(&name),
        };

        let is_high_value = self
            .is_big_ticket
            .unwrap_or_else(|| classifier.is_high_value(&name, cost));
        let max_markup_percent = match self.max_markup {
            Some(max) => Some(max),
            None if is_high_value => Some(classifier.max_markup()),
            None => None,
        };

        let markup_percent = match self.markup {
            Some(markup) => markup,
            None => LineItem::markup_from_prices(cost, price).ok_or(
                ValidationError::OutOfRange {
                    field: "price",
                    value: price,
                },
            )?,
        };

        let item = LineItem {
            id,
            markup_percent,
            tax_percent: self.tax.unwrap_or(default_tax_percent),
            discount_percent: self.discount.unwrap_or(Decimal::ZERO),
            line_total: self.total,
            name,
            category,
            quantity,
            cost,
            price,
            is_high_value,
            max_markup_percent,
        };

        item.validate()?;
        Ok(item)
    }
}

impl TryFrom<RawLineItem> for LineItem {
    type Error = ValidationError;

    fn try_from(raw: RawLineItem) -> std::result::Result<Self, Self::Error> {
        let config = ParsingConfig::default();
        raw.into_line_item(&ItemClassifier::from_config(&config), config.default_tax_percent)
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawDocument {
    Wrapped {
        #[serde(rename = "lineItems", alias = "line_items")]
        line_items: Vec<RawLineItem>,
        #[serde(rename = "gstRate", alias = "gst_rate", default)]
        gst_rate: Option<Decimal>,
    },
    Bare(Vec<RawLineItem>),
}

/// Strip a surrounding Markdown code fence, if any.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening fence line
    let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Import a quote from JSON with default parsing settings.
pub fn import_json(text: &str) -> Result<Quote> {
    import_json_with(text, &ParsingConfig::default())
}

/// Import a quote from JSON.
///
/// Accepts `{"lineItems": [...], "gstRate": 0.15}` or a bare array. Rows
/// without an id get sequential ids. The first invalid row rejects the
/// whole document.
pub fn import_json_with(text: &str, config: &ParsingConfig) -> Result<Quote> {
    let body = strip_code_fence(text);
    if body.is_empty() {
        return Err(ExtractionError::EmptyInput.into());
    }

    let (rows, gst_rate) = match serde_json::from_str::<RawDocument>(body)? {
        RawDocument::Wrapped {
            line_items,
            gst_rate,
        } => (line_items, gst_rate.unwrap_or_else(default_gst_rate)),
        RawDocument::Bare(rows) => (rows, default_gst_rate()),
    };

    if rows.is_empty() {
        return Err(ExtractionError::NoLineItems { lines: 0 }.into());
    }

    let classifier = ItemClassifier::from_config(config);
    let mut items = Vec::with_capacity(rows.len());

    for (index, mut row) in rows.into_iter().enumerate() {
        row.id.get_or_insert_with(|| RawId::Text((index + 1).to_string()));
        let item = row
            .into_line_item(&classifier, config.default_tax_percent)
            .inspect_err(|e| warn!("Rejected imported row {}: {}", index + 1, e))?;
        items.push(item);
    }

    info!("Imported {} line items from JSON", items.len());

    Ok(Quote::new(items).with_gst_rate(gst_rate))
}
