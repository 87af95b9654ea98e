//! Regex patterns for quote line extraction.

use lazy_static::lazy_static;
use regex::Regex;

/// One numeric column: optional sign and `$`, comma thousands or plain digits,
/// optional fraction.
pub const NUMBER: &str = r"-?\$?(?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d+)?";

lazy_static! {
    // Column header row, e.g. "Name Quantity Cost Price Markup Tax Discount Total"
    pub static ref HEADER_NAME: Regex = Regex::new(r"(?i)\bname\b").unwrap();

    pub static ref HEADER_QUANTITY: Regex = Regex::new(r"(?i)\b(?:quantity|qty)\b").unwrap();

    // Summary rows lead with the keyword: "Subtotal $1,234.00", "GST Amount $185.10",
    // "GST (15%) 185.10", "Grand Total $1,419.10"
    pub static ref SUMMARY_ROW: Regex = Regex::new(
        r"(?i)^(?:grand\s+)?(?:sub[\s-]?total|gst(?:\s+amount)?|total)\b[\s:=()]*\$?\s*\d"
    ).unwrap();

    // Name, quantity, cost, price, markup%, tax%, discount%, line total
    pub static ref FULL_ROW: Regex = Regex::new(&format!(
        r"^(?P<name>.+?)\s+(?P<quantity>{n})\s+(?P<cost>{n})\s+(?P<price>{n})\s+(?P<markup>{n})\s?%\s+(?P<tax>{n})\s?%\s+(?P<discount>{n})\s?%\s+(?P<total>{n})$",
        n = NUMBER
    )).unwrap();

    // Name, quantity, cost, price, markup%, then anything numeric
    pub static ref MARKUP_ROW: Regex = Regex::new(&format!(
        r"^(?P<name>.+?)\s+(?P<quantity>{n})\s+(?P<cost>{n})\s+(?P<price>{n})\s+(?P<markup>{n})\s?%(?:\s+{n}\s?%?)*$",
        n = NUMBER
    )).unwrap();

    // Name, quantity, cost, price
    pub static ref BARE_ROW: Regex = Regex::new(&format!(
        r"^(?P<name>.+?)\s+(?P<quantity>{n})\s+(?P<cost>{n})\s+(?P<price>{n})$",
        n = NUMBER
    )).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_fragment() {
        let token = Regex::new(&format!(r"^{}%?$", NUMBER)).unwrap();
        for t in ["8.00", "$58.00", "1,120.00", "$1,352.00", "63.79%", "0%", "-12.50"] {
            assert!(token.is_match(t), "{t} should match");
        }
        for t in ["FTXM35U", "80mm", "1,12.00", "$", "12.5.1"] {
            assert!(!token.is_match(t), "{t} should not match");
        }
    }

    #[test]
    fn test_summary_row() {
        assert!(SUMMARY_ROW.is_match("Subtotal $1,234.00"));
        assert!(SUMMARY_ROW.is_match("GST Amount $185.10"));
        assert!(SUMMARY_ROW.is_match("GST (15%) 185.10"));
        assert!(SUMMARY_ROW.is_match("Total: $1,419.10"));
        assert!(SUMMARY_ROW.is_match("Grand Total $1,419.10"));
        assert!(!SUMMARY_ROW.is_match("Total rewire labour 8.00 58.00 95.00"));
        assert!(!SUMMARY_ROW.is_match("Labour total 8.00 58.00 95.00"));
        assert!(!SUMMARY_ROW.is_match("Switch GST 2 12.15 22.84"));
        assert!(!SUMMARY_ROW.is_match("Name Quantity Cost Price Markup Tax Discount Total"));
    }

    #[test]
    fn test_full_row_captures() {
        let caps = FULL_ROW
            .captures("Labour - Dave 8.00 $58.00 $95.00 63.79% 15% 0% $760.00")
            .unwrap();
        assert_eq!(&caps["name"], "Labour - Dave");
        assert_eq!(&caps["quantity"], "8.00");
        assert_eq!(&caps["cost"], "$58.00");
        assert_eq!(&caps["markup"], "63.79");
        assert_eq!(&caps["total"], "$760.00");
    }

    #[test]
    fn test_bare_row_keeps_codes_in_name() {
        let caps = BARE_ROW
            .captures("33006820 Wall cap 80mm PVC GY EWC80 Ezyduct 1.00 9.68 18.17")
            .unwrap();
        assert_eq!(&caps["name"], "33006820 Wall cap 80mm PVC GY EWC80 Ezyduct");
        assert_eq!(&caps["price"], "18.17");
    }
}
