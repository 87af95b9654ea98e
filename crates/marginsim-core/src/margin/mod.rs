//! Margin recalculation.
//!
//! Everything here is a pure function of (line items, margin settings, GST
//! rate). Results are recomputed in full on every change; nothing is cached
//! or patched incrementally.

mod breakdown;

pub use breakdown::{markup_warnings, Breakdown, Group, GroupTotals, MarkupWarning};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::quote::{CalculatedResults, Category, LineItem, MarginSettings};

/// Where an item's applied margin came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarginSource {
    /// Per-item override for a big-ticket line.
    Override,
    /// The labour margin.
    Labour,
    /// The material margin.
    Material,
    /// The item's own markup (big-ticket material without an override).
    ItemMarkup,
}

/// A line item priced at its applied margin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustedLineItem {
    /// The item as quoted.
    #[serde(flatten)]
    pub item: LineItem,

    /// Margin used to price the item, in percent.
    pub applied_margin_percent: Decimal,

    /// Which setting the margin came from.
    pub margin_source: MarginSource,

    /// cost × (1 + margin / 100).
    pub adjusted_price: Decimal,

    /// adjusted price × quantity.
    pub extended_price: Decimal,

    /// cost × quantity.
    pub extended_cost: Decimal,
}

/// Full output of a recalculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recalculation {
    /// Items at their adjusted prices, in input order.
    pub items: Vec<AdjustedLineItem>,

    /// Quote totals.
    pub results: CalculatedResults,

    /// Totals per group.
    pub breakdown: Breakdown,

    /// Big-ticket items priced above their recommended cap.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<MarkupWarning>,
}

/// Choose the margin for one item.
///
/// A big-ticket item with an override uses the override; otherwise labour
/// uses the labour margin and ordinary materials the material margin. A
/// big-ticket material without an override keeps its own markup.
pub fn applied_margin(item: &LineItem, settings: &MarginSettings) -> (Decimal, MarginSource) {
    if item.is_high_value {
        if let Some(percent) = settings.override_for(&item.id) {
            return (percent, MarginSource::Override);
        }
    }

    match item.category {
        Category::Labour => (settings.labour_margin_percent, MarginSource::Labour),
        Category::Material if !item.is_high_value => {
            (settings.material_margin_percent, MarginSource::Material)
        }
        Category::Material => (item.markup_percent, MarginSource::ItemMarkup),
    }
}

/// Price at a given margin over cost.
pub fn adjusted_price(cost: Decimal, margin_percent: Decimal) -> Decimal {
    cost * (Decimal::ONE + margin_percent / Decimal::ONE_HUNDRED)
}

/// Price one item under the given settings.
pub fn adjust_item(item: &LineItem, settings: &MarginSettings) -> AdjustedLineItem {
    let (applied_margin_percent, margin_source) = applied_margin(item, settings);
    let adjusted_price = adjusted_price(item.cost, applied_margin_percent);

    AdjustedLineItem {
        applied_margin_percent,
        margin_source,
        adjusted_price,
        extended_price: adjusted_price * item.quantity,
        extended_cost: item.extended_cost(),
        item: item.clone(),
    }
}

/// Quote totals from adjusted items.
pub fn calculate_results(items: &[AdjustedLineItem], gst_rate: Decimal) -> CalculatedResults {
    let subtotal: Decimal = items.iter().map(|i| i.extended_price).sum();
    let total_cost: Decimal = items.iter().map(|i| i.extended_cost).sum();
    let tax_amount = subtotal * gst_rate;
    let gross_profit = subtotal - total_cost;
    // Saturates when a loss dwarfs a near-zero subtotal
    let gross_profit_percent = if subtotal.is_zero() {
        Decimal::ZERO
    } else {
        gross_profit
            .checked_div(subtotal)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .unwrap_or(if gross_profit < Decimal::ZERO {
                Decimal::MIN
            } else {
                Decimal::MAX
            })
    };

    CalculatedResults {
        subtotal,
        tax_amount,
        total: subtotal + tax_amount,
        total_cost,
        gross_profit,
        gross_profit_percent,
    }
}

/// Recalculate every item and the quote totals.
pub fn recalculate(
    items: &[LineItem],
    settings: &MarginSettings,
    gst_rate: Decimal,
) -> Recalculation {
    let adjusted: Vec<AdjustedLineItem> = items.iter().map(|i| adjust_item(i, settings)).collect();
    let results = calculate_results(&adjusted, gst_rate);
    let breakdown = Breakdown::from_items(&adjusted);
    let warnings = markup_warnings(&adjusted);

    debug!(
        "Recalculated {} items: subtotal {}, gross profit {} ({}%)",
        adjusted.len(),
        results.subtotal,
        results.gross_profit,
        results.gross_profit_percent.round_dp(2)
    );

    Recalculation {
        items: adjusted,
        results,
        breakdown,
        warnings,
    }
}


#[cfg(test)]
mod props;
