//! Category and big-ticket classification of line item names.

use rust_decimal::Decimal;

use crate::models::config::ParsingConfig;
use crate::models::quote::Category;

/// Keyword and threshold based classifier.
#[derive(Debug, Clone)]
pub struct ItemClassifier {
    labour_keywords: Vec<String>,
    high_value_keywords: Vec<String>,
    high_value_threshold: Decimal,
    high_value_max_markup: Decimal,
}

impl ItemClassifier {
    pub fn new() -> Self {
        Self::from_config(&ParsingConfig::default())
    }

    /// Build a classifier from parsing configuration.
    pub fn from_config(config: &ParsingConfig) -> Self {
        Self {
            labour_keywords: lowercase_all(&config.labour_keywords),
            high_value_keywords: lowercase_all(&config.high_value_keywords),
            high_value_threshold: config.high_value_threshold,
            high_value_max_markup: config.high_value_max_markup_percent,
        }
    }

    pub fn with_high_value_threshold(mut self, threshold: Decimal) -> Self {
        self.high_value_threshold = threshold;
        self
    }

    /// Labour if the name mentions a labour keyword, otherwise material.
    pub fn category(&self, name: &str) -> Category {
        let name = name.to_lowercase();
        if self.labour_keywords.iter().any(|k| name.contains(k.as_str())) {
            Category::Labour
        } else {
            Category::Material
        }
    }

    /// Big-ticket if the unit cost is above the threshold or the name
    /// mentions major equipment.
    pub fn is_high_value(&self, name: &str, cost: Decimal) -> bool {
        if cost > self.high_value_threshold {
            return true;
        }
        let name = name.to_lowercase();
        self.high_value_keywords
            .iter()
            .any(|k| name.contains(k.as_str()))
    }

    /// Markup cap recommended for big-ticket items.
    pub fn max_markup(&self) -> Decimal {
        self.high_value_max_markup
    }
}

impl Default for ItemClassifier {
    fn default() -> Self {
        Self::new()
    }
}

fn lowercase_all(words: &[String]) -> Vec<String> {
    words
        .iter()
        .map(|w| w.trim().to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}
