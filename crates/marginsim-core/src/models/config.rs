//! Configuration structures for parsing and pricing.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::models::quote::{LineItem, MarginSettings};

/// Main configuration for marginsim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Margin and tax configuration.
    pub pricing: PricingConfig,

    /// Quote text parsing configuration.
    pub parsing: ParsingConfig,

    /// Display configuration.
    pub display: DisplayConfig,
}

/// Margin and tax configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// GST as a fraction of the subtotal.
    pub gst_rate: Decimal,

    /// Starting labour margin, in percent.
    pub labour_margin_percent: Decimal,

    /// Starting material margin, in percent.
    pub material_margin_percent: Decimal,

    /// Lowest margin a user may select.
    pub min_margin_percent: Decimal,

    /// Highest margin a user may select.
    pub max_margin_percent: Decimal,

    /// Slider increment.
    pub margin_step: Decimal,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            gst_rate: Decimal::new(15, 2),
            labour_margin_percent: Decimal::new(6379, 2),
            material_margin_percent: Decimal::new(880, 1),
            min_margin_percent: Decimal::ZERO,
            max_margin_percent: Decimal::from(150),
            margin_step: Decimal::new(5, 1),
        }
    }
}

impl PricingConfig {
    /// Starting margin settings, clamped to the allowed range.
    pub fn margin_settings(&self) -> MarginSettings {
        let mut settings =
            MarginSettings::new(self.labour_margin_percent, self.material_margin_percent);
        settings.clamp(self.min_margin_percent, self.max_margin_percent);
        settings
    }

    /// Snap a requested margin to the slider step and clamp it to the range.
    pub fn snap_margin(&self, percent: Decimal) -> Decimal {
        let clamped = percent.clamp(self.min_margin_percent, self.max_margin_percent);
        if self.margin_step <= Decimal::ZERO {
            return clamped;
        }
        clamped
            .checked_div(self.margin_step)
            .and_then(|steps| steps.round().checked_mul(self.margin_step))
            .map_or(clamped, |snapped| {
                snapped.clamp(self.min_margin_percent, self.max_margin_percent)
            })
    }
}

/// Quote text parsing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsingConfig {
    /// Unit cost above which an item counts as big-ticket.
    pub high_value_threshold: Decimal,

    /// Recommended markup cap for big-ticket items, in percent.
    pub high_value_max_markup_percent: Decimal,

    /// Tax percent assumed when a line does not carry one.
    pub default_tax_percent: Decimal,

    /// Name keywords that mark a line as labour.
    pub labour_keywords: Vec<String>,

    /// Name keywords (brands, equipment) that mark a line as big-ticket.
    pub high_value_keywords: Vec<String>,
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            high_value_threshold: Decimal::from(500),
            high_value_max_markup_percent: Decimal::from(25),
            default_tax_percent: Decimal::from(15),
            labour_keywords: [
                "labour",
                "labor",
                "electrician",
                "installer",
                "technician",
                "apprentice",
                "plumber",
                "call out",
                "callout",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            high_value_keywords: [
                "daikin",
                "mitsubishi",
                "fujitsu",
                "panasonic",
                "toshiba",
                "hitachi",
                "heat pump",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// Display configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Currency code shown next to totals.
    pub currency: String,

    /// Currency symbol prefix.
    pub currency_symbol: String,

    /// Fraction digits for amounts.
    pub fraction_digits: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            currency: "NZD".to_string(),
            currency_symbol: "$".to_string(),
            fraction_digits: 2,
        }
    }
}

impl SimConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.check()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject settings that would make recalculation meaningless.
    pub fn check(&self) -> Result<()> {
        let pricing = &self.pricing;
        if pricing.gst_rate < Decimal::ZERO {
            return Err(SimError::Config(format!(
                "gst_rate must not be negative (got {})",
                pricing.gst_rate
            )));
        }
        if pricing.gst_rate > Decimal::ONE {
            return Err(SimError::Config(format!(
                "gst_rate is a fraction and must not exceed 1 (got {})",
                pricing.gst_rate
            )));
        }
        if pricing.min_margin_percent < -Decimal::ONE_HUNDRED
            || pricing.max_margin_percent > LineItem::MAX_PERCENT
        {
            return Err(SimError::Config(format!(
                "margin range must lie within -100..={}",
                LineItem::MAX_PERCENT
            )));
        }
        if pricing.min_margin_percent > pricing.max_margin_percent {
            return Err(SimError::Config(format!(
                "min_margin_percent {} exceeds max_margin_percent {}",
                pricing.min_margin_percent, pricing.max_margin_percent
            )));
        }
        if self.parsing.high_value_threshold < Decimal::ZERO {
            return Err(SimError::Config(
                "high_value_threshold must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}
