//! Quote data models: line items, margin settings and calculated results.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// GST rate applied when a quote does not specify one (15%).
pub fn default_gst_rate() -> Decimal {
    Decimal::new(15, 2)
}

/// A quote: the line items plus the single GST rate applied to the subtotal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Line items on the quote.
    pub line_items: Vec<LineItem>,

    /// GST as a fraction (0.15 for 15%).
    #[serde(default = "default_gst_rate")]
    pub gst_rate: Decimal,
}

impl Quote {
    /// Create a quote with the default GST rate.
    pub fn new(line_items: Vec<LineItem>) -> Self {
        Self {
            line_items,
            gst_rate: default_gst_rate(),
        }
    }

    /// Override the GST rate.
    pub fn with_gst_rate(mut self, gst_rate: Decimal) -> Self {
        self.gst_rate = gst_rate;
        self
    }

    /// Items flagged as big-ticket.
    pub fn high_value_items(&self) -> impl Iterator<Item = &LineItem> {
        self.line_items.iter().filter(|i| i.is_high_value)
    }

    /// Look up an item by id.
    pub fn item(&self, id: &str) -> Option<&LineItem> {
        self.line_items.iter().find(|i| i.id == id)
    }

    /// Recalculate prices and totals for the given margin settings.
    pub fn recalculate(&self, settings: &MarginSettings) -> crate::margin::Recalculation {
        crate::margin::recalculate(&self.line_items, settings, self.gst_rate)
    }
}

/// Line item category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Labour (hours of a tradesperson).
    #[serde(alias = "labor")]
    Labour,
    /// Materials and equipment.
    Material,
}

impl Category {
    /// Parse a category name.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "labour" | "labor" => Some(Category::Labour),
            "material" | "materials" => Some(Category::Material),
            _ => None,
        }
    }

    /// Lowercase name used in output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Labour => "labour",
            Category::Material => "material",
        }
    }
}

/// A single priced line on a quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Identifier, unique within a quote.
    pub id: String,

    /// Description as it appeared on the quote.
    pub name: String,

    /// Labour or material.
    pub category: Category,

    /// Quantity (hours for labour).
    pub quantity: Decimal,

    /// Unit cost to the business.
    pub cost: Decimal,

    /// Unit sell price on the quote.
    pub price: Decimal,

    /// Markup over cost, in percent.
    pub markup_percent: Decimal,

    /// Tax rate on the line, in percent.
    pub tax_percent: Decimal,

    /// Discount on the line, in percent.
    pub discount_percent: Decimal,

    /// Line total as printed on the quote, if present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_total: Option<Decimal>,

    /// Big-ticket item with a capped recommended markup.
    #[serde(default)]
    pub is_high_value: bool,

    /// Maximum recommended markup, in percent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_markup_percent: Option<Decimal>,
}

impl LineItem {
    /// Largest quantity, cost or price accepted on a line.
    pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

    /// Largest markup, tax or discount magnitude accepted, in percent.
    pub const MAX_PERCENT: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

    /// Markup implied by a cost and a price, rounded to two places.
    ///
    /// Zero when the cost is zero; `None` when the ratio overflows.
    pub fn markup_from_prices(cost: Decimal, price: Decimal) -> Option<Decimal> {
        if cost.is_zero() {
            return Some(Decimal::ZERO);
        }
        let markup = price
            .checked_sub(cost)?
            .checked_div(cost)?
            .checked_mul(Decimal::ONE_HUNDRED)?;
        Some(markup.round_dp(2))
    }

    /// Cost of the whole line (cost × quantity).
    pub fn extended_cost(&self) -> Decimal {
        self.cost * self.quantity
    }

    /// Check the line against the quote invariants.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [
            ("quantity", self.quantity),
            ("cost", self.cost),
            ("price", self.price),
        ] {
            if value < Decimal::ZERO {
                return Err(ValidationError::Negative { field, value });
            }
            if value > Self::MAX_AMOUNT {
                return Err(ValidationError::OutOfRange { field, value });
            }
        }

        for (field, value) in [
            ("markup", self.markup_percent),
            ("tax", self.tax_percent),
            ("discount", self.discount_percent),
        ] {
            if value.abs() > Self::MAX_PERCENT {
                return Err(ValidationError::OutOfRange { field, value });
            }
        }

        if self.markup_percent < -Decimal::ONE_HUNDRED {
            return Err(ValidationError::OutOfRange {
                field: "markup",
                value: self.markup_percent,
            });
        }

        if self.markup_percent < Decimal::ZERO && self.price >= self.cost {
            return Err(ValidationError::NegativeMarkup {
                markup: self.markup_percent,
                cost: self.cost,
                price: self.price,
            });
        }

        Ok(())
    }
}

/// User-adjustable margins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarginSettings {
    /// Margin applied to every labour line.
    pub labour_margin_percent: Decimal,

    /// Margin applied to every ordinary material line.
    pub material_margin_percent: Decimal,

    /// Per-item margins for big-ticket lines, keyed by line item id.
    pub high_value_overrides: BTreeMap<String, Decimal>,
}

impl Default for MarginSettings {
    fn default() -> Self {
        Self {
            labour_margin_percent: Decimal::new(6379, 2),
            material_margin_percent: Decimal::new(880, 1),
            high_value_overrides: BTreeMap::new(),
        }
    }
}

impl MarginSettings {
    /// Create settings with the given category margins and no overrides.
    pub fn new(labour_margin_percent: Decimal, material_margin_percent: Decimal) -> Self {
        Self {
            labour_margin_percent,
            material_margin_percent,
            high_value_overrides: BTreeMap::new(),
        }
    }

    /// Add a big-ticket override.
    pub fn with_override(mut self, item_id: impl Into<String>, percent: Decimal) -> Self {
        self.high_value_overrides.insert(item_id.into(), percent);
        self
    }

    /// Set the labour margin.
    pub fn set_labour_margin(&mut self, percent: Decimal) {
        self.labour_margin_percent = percent;
    }

    /// Set the material margin.
    pub fn set_material_margin(&mut self, percent: Decimal) {
        self.material_margin_percent = percent;
    }

    /// Set the margin for one big-ticket item.
    pub fn set_override(&mut self, item_id: impl Into<String>, percent: Decimal) {
        self.high_value_overrides.insert(item_id.into(), percent);
    }

    /// Remove the override for one item; returns the previous value.
    pub fn clear_override(&mut self, item_id: &str) -> Option<Decimal> {
        self.high_value_overrides.remove(item_id)
    }

    /// Override for an item, if one is set.
    pub fn override_for(&self, item_id: &str) -> Option<Decimal> {
        self.high_value_overrides.get(item_id).copied()
    }

    /// Margin shown for a big-ticket item: its override, else its own markup.
    pub fn effective_high_value_margin(&self, item: &LineItem) -> Decimal {
        self.override_for(&item.id).unwrap_or(item.markup_percent)
    }

    /// Clamp every margin into `[min, max]`.
    pub fn clamp(&mut self, min: Decimal, max: Decimal) {
        self.labour_margin_percent = self.labour_margin_percent.clamp(min, max);
        self.material_margin_percent = self.material_margin_percent.clamp(min, max);
        for value in self.high_value_overrides.values_mut() {
            *value = (*value).clamp(min, max);
        }
    }
}

/// Aggregates derived from line items and margin settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculatedResults {
    /// Σ adjusted price × quantity (before GST).
    pub subtotal: Decimal,

    /// GST on the subtotal.
    pub tax_amount: Decimal,

    /// Subtotal plus GST.
    pub total: Decimal,

    /// Σ cost × quantity.
    pub total_cost: Decimal,

    /// Subtotal minus total cost.
    pub gross_profit: Decimal,

    /// Gross profit as a percentage of the subtotal (0 when the subtotal is 0).
    pub gross_profit_percent: Decimal,
}
