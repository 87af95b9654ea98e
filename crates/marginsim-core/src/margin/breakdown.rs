//! Per-group totals and big-ticket markup warnings.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::quote::{Category, LineItem};

use super::AdjustedLineItem;

/// Markup cap assumed for big-ticket items that do not carry one.
pub fn default_max_markup() -> Decimal {
    Decimal::from(25)
}

/// Display group of a line item. Groups are disjoint: big-ticket items are
/// never counted under labour or materials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Group {
    Labour,
    Materials,
    BigTicket,
}

impl Group {
    /// Group an item belongs to.
    pub fn of(item: &LineItem) -> Self {
        if item.is_high_value {
            Group::BigTicket
        } else if item.category == Category::Labour {
            Group::Labour
        } else {
            Group::Materials
        }
    }

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            Group::Labour => "Labour",
            Group::Materials => "Materials",
            Group::BigTicket => "Big-ticket",
        }
    }
}

/// Cost and price totals for one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupTotals {
    pub group: Group,
    pub item_count: usize,
    /// Σ cost × quantity.
    pub total_cost: Decimal,
    /// Σ adjusted price × quantity.
    pub total_price: Decimal,
}

impl GroupTotals {
    fn empty(group: Group) -> Self {
        Self {
            group,
            item_count: 0,
            total_cost: Decimal::ZERO,
            total_price: Decimal::ZERO,
        }
    }

    /// Price minus cost.
    pub fn profit(&self) -> Decimal {
        self.total_price - self.total_cost
    }

    /// Markup realised over the whole group (0 when the group has no cost).
    pub fn markup_percent(&self) -> Decimal {
        if self.total_cost.is_zero() {
            Decimal::ZERO
        } else {
            self.profit() / self.total_cost * Decimal::ONE_HUNDRED
        }
    }
}

/// Totals for labour, ordinary materials and big-ticket items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakdown {
    pub labour: GroupTotals,
    pub materials: GroupTotals,
    pub big_ticket: GroupTotals,
}

impl Breakdown {
    /// Sum adjusted items into their groups.
    pub fn from_items(items: &[AdjustedLineItem]) -> Self {
        let mut breakdown = Self {
            labour: GroupTotals::empty(Group::Labour),
            materials: GroupTotals::empty(Group::Materials),
            big_ticket: GroupTotals::empty(Group::BigTicket),
        };

        for adjusted in items {
            let totals = breakdown.group_mut(Group::of(&adjusted.item));
            totals.item_count += 1;
            totals.total_cost += adjusted.extended_cost;
            totals.total_price += adjusted.extended_price;
        }

        breakdown
    }

    /// Totals for one group.
    pub fn group(&self, group: Group) -> &GroupTotals {
        match group {
            Group::Labour => &self.labour,
            Group::Materials => &self.materials,
            Group::BigTicket => &self.big_ticket,
        }
    }

    fn group_mut(&mut self, group: Group) -> &mut GroupTotals {
        match group {
            Group::Labour => &mut self.labour,
            Group::Materials => &mut self.materials,
            Group::BigTicket => &mut self.big_ticket,
        }
    }

    /// Groups in display order.
    pub fn iter(&self) -> impl Iterator<Item = &GroupTotals> {
        [&self.labour, &self.materials, &self.big_ticket].into_iter()
    }
}

/// A big-ticket item priced above its recommended markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkupWarning {
    pub item_id: String,
    pub name: String,
    pub applied_margin_percent: Decimal,
    pub max_markup_percent: Decimal,
}

/// Warnings for every big-ticket item whose applied margin exceeds its cap.
pub fn markup_warnings(items: &[AdjustedLineItem]) -> Vec<MarkupWarning> {
    items
        .iter()
        .filter(|a| a.item.is_high_value)
        .filter_map(|a| {
            let max = a.item.max_markup_percent.unwrap_or_else(default_max_markup);
            (a.applied_margin_percent > max).then(|| MarkupWarning {
                item_id: a.item.id.clone(),
                name: a.item.name.clone(),
                applied_margin_percent: a.applied_margin_percent,
                max_markup_percent: max,
            })
        })
        .collect()
}
