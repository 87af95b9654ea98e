//! Bundled sample quote: a heat pump installation.
//!
//! Used as fallback data when pasted text cannot be parsed.

use rust_decimal::Decimal;

use crate::models::quote::Category::{Labour, Material};
use crate::models::quote::{Category, LineItem, MarginSettings, Quote};

struct SampleLine {
    name: &'static str,
    category: Category,
    quantity: i64,
    cost: i64,
    price: i64,
    markup: i64,
}

const fn line(
    name: &'static str,
    category: Category,
    quantity: i64,
    cost: i64,
    price: i64,
    markup: i64,
) -> SampleLine {
    SampleLine { name, category, quantity, cost, price, markup }
}

// Quantities, costs, prices and markups are in hundredths.
const SAMPLE_LINES: &[SampleLine] = &[
    line("Labour - Dave", Labour, 600, 5800, 9500, 6379),
    line("33006820 Wall cap 80mm PVC GY EWC80 Ezyduct", Material, 100, 968, 1817, 8810),
    line("33000900 Drain hose flex 16mmx50m FDP16 Ezyduct", Material, 10, 9359, 17595, 8803),
    line(
        "37100020 Slab poly 465x885x51mm medium PSAC-MED Polyslab",
        Material,
        100,
        4190,
        7877,
        8800,
    ),
    line("33000320 Duct 80x66mmx2m PVC GY ECD80 Ezyduct", Material, 100, 2027, 3811, 8801),
    line("33000370 Condenser mount PVC 500mm GY ECM500 Ezyduct", Material, 200, 1451, 2728, 8801),
    line(
        "55650320 Switch isolator 20A 2P IP66 small NL120S N-line",
        Material,
        100,
        1215,
        2284,
        8798,
    ),
    line("30800040 Conduit flex 25mm uPVC GY prm 25m 30.25G Marley", Material, 500, 217, 408, 8802),
    line(
        "41412000 Anchor wall dog 35mm SQ pk26 ELWDSA35SD Elmark",
        Material,
        100,
        1587,
        2984,
        8803,
    ),
    line(
        "49142020 Tape duct 48mmx30m utility BK 33023024 Tkt Tape",
        Material,
        100,
        1082,
        2034,
        8799,
    ),
    line(
        "44320220 Cable tie std 280x4.8mm NAT pk100 EL3004 Elmark",
        Material,
        10,
        1646,
        3094,
        8727,
    ),
    line("48450040 Silicone industrial 300ml CL 30804311 Bostik", Material, 50, 1808, 3399, 8805),
    line("FTXV50U", Material, 100, 135200, 169000, 2500),
];

/// Id of the big-ticket line in the sample quote.
pub const SAMPLE_BIG_TICKET_ID: &str = "13";

/// The sample quote at 15% GST.
pub fn sample_quote() -> Quote {
    let line_items = SAMPLE_LINES
        .iter()
        .enumerate()
        .map(|(index, line)| {
            let id = (index + 1).to_string();
            let is_high_value = id == SAMPLE_BIG_TICKET_ID;
            LineItem {
                id,
                name: line.name.to_string(),
                category: line.category,
                quantity: Decimal::new(line.quantity, 2),
                cost: Decimal::new(line.cost, 2),
                price: Decimal::new(line.price, 2),
                markup_percent: Decimal::new(line.markup, 2),
                tax_percent: Decimal::from(15),
                discount_percent: Decimal::ZERO,
                line_total: None,
                is_high_value,
                max_markup_percent: is_high_value.then(|| Decimal::from(25)),
            }
        })
        .collect();

    Quote::new(line_items)
}

/// Starting margins for the sample quote.
pub fn sample_margin_settings() -> MarginSettings {
    MarginSettings::default().with_override(SAMPLE_BIG_TICKET_ID, Decimal::from(25))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_items_are_valid() {
        let quote = sample_quote();
        assert_eq!(quote.line_items.len(), 13);
        for item in &quote.line_items {
            assert!(item.validate().is_ok(), "{} should be valid", item.name);
        }
        assert_eq!(quote.high_value_items().count(), 1);
    }

    #[test]
    fn test_sample_totals() {
        let quote = sample_quote();
        let results = quote.recalculate(&sample_margin_settings()).results;

        // 6 h labour at 58.00 + 63.79% and the heat pump at 1352.00 + 25%
        let labour = Decimal::new(348, 0) * Decimal::new(16379, 4);
        let heat_pump = Decimal::new(1690, 0);
        assert!(results.subtotal > labour + heat_pump);
        assert_eq!(results.subtotal, Decimal::new(25807266, 4));
        assert_eq!(results.total_cost, Decimal::new(1870605, 3));
        assert_eq!(results.gross_profit, Decimal::new(7101216, 4));
        assert_eq!(results.gross_profit, results.subtotal - results.total_cost);
        assert_eq!(results.tax_amount, results.subtotal * Decimal::new(15, 2));
    }
}
