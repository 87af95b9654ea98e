//! Property-based tests for margin recalculation.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::{adjust_item, recalculate};
use crate::models::quote::{Category, LineItem, MarginSettings};

/// Cost from 0.00 to 10,000.00.
fn cost() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Quantity from 0.00 to 100.00.
fn quantity() -> impl Strategy<Value = Decimal> {
    (0i64..10_000i64).prop_map(|v| Decimal::new(v, 2))
}

/// Margin from 0 to 150 in 0.5 steps.
fn margin() -> impl Strategy<Value = Decimal> {
    (0i64..=300i64).prop_map(|halves| Decimal::new(halves * 5, 1))
}

fn line_item() -> impl Strategy<Value = LineItem> {
    (any::<bool>(), any::<bool>(), quantity(), cost(), margin()).prop_map(
        |(labour, big_ticket, quantity, cost, markup)| LineItem {
            id: String::new(),
            name: "Item".to_string(),
            category: if labour { Category::Labour } else { Category::Material },
            quantity,
            cost,
            price: super::adjusted_price(cost, markup),
            markup_percent: markup,
            tax_percent: Decimal::from(15),
            discount_percent: Decimal::ZERO,
            line_total: None,
            is_high_value: big_ticket,
            max_markup_percent: big_ticket.then(|| Decimal::from(25)),
        },
    )
}

fn line_items() -> impl Strategy<Value = Vec<LineItem>> {
    prop::collection::vec(line_item(), 0..20).prop_map(|mut items| {
        for (index, item) in items.iter_mut().enumerate() {
            item.id = (index + 1).to_string();
        }
        items
    })
}

fn settings() -> impl Strategy<Value = MarginSettings> {
    (margin(), margin(), prop::collection::btree_map(1u32..20, margin(), 0..5)).prop_map(
        |(labour, material, overrides)| {
            let mut settings = MarginSettings::new(labour, material);
            for (id, percent) in overrides {
                settings.set_override(id.to_string(), percent);
            }
            settings
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Gross profit is always subtotal minus total cost.
    #[test]
    fn prop_gross_profit_identity(items in line_items(), settings in settings()) {
        let results = recalculate(&items, &settings, Decimal::new(15, 2)).results;
        prop_assert_eq!(results.gross_profit, results.subtotal - results.total_cost);
        prop_assert_eq!(results.total, results.subtotal + results.tax_amount);
    }

    /// Non-negative margins never price below cost.
    #[test]
    fn prop_non_negative_margin_never_loses(items in line_items(), settings in settings()) {
        let results = recalculate(&items, &settings, Decimal::new(15, 2)).results;
        prop_assert!(results.subtotal >= results.total_cost);
        prop_assert!(results.gross_profit_percent >= Decimal::ZERO);
    }

    /// Gross profit percent is zero whenever the subtotal is.
    #[test]
    fn prop_zero_subtotal_has_zero_percent(items in line_items(), settings in settings()) {
        let results = recalculate(&items, &settings, Decimal::new(15, 2)).results;
        if results.subtotal.is_zero() {
            prop_assert_eq!(results.gross_profit_percent, Decimal::ZERO);
        }
    }

    /// Recalculating twice with the same inputs gives the same output.
    #[test]
    fn prop_recalculate_is_idempotent(items in line_items(), settings in settings()) {
        let first = recalculate(&items, &settings, Decimal::new(15, 2));
        let second = recalculate(&items, &settings, Decimal::new(15, 2));
        prop_assert_eq!(first, second);
    }

    /// Overrides only ever touch big-ticket items.
    #[test]
    fn prop_override_only_applies_to_big_ticket(item in line_item(), percent in margin()) {
        let settings = MarginSettings::default().with_override(item.id.clone(), percent);
        let with = adjust_item(&item, &settings);
        let without = adjust_item(&item, &MarginSettings::default());
        if !item.is_high_value {
            prop_assert_eq!(with, without);
        } else {
            prop_assert_eq!(with.applied_margin_percent, percent);
        }
    }

    /// A zero-cost item has zero derived markup.
    #[test]
    fn prop_zero_cost_markup_is_zero(price in cost()) {
        prop_assert_eq!(LineItem::markup_from_prices(Decimal::ZERO, price), Some(Decimal::ZERO));
    }
}
