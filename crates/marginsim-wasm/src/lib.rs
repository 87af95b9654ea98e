//! WASM bindings for quote margin simulation.
//!
//! This crate provides WebAssembly bindings for use in browsers and Node.js.
//! Money crosses the boundary as decimal strings; margins and rates are
//! accepted as numbers.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use marginsim_core::margin::Recalculation;
use marginsim_core::models::config::{ParsingConfig, PricingConfig};
use marginsim_core::quote::{import_json, LineItemParser, QuoteParser};
use marginsim_core::{LineItem, MarginSettings, Quote};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn from_js<T: serde::de::DeserializeOwned>(value: JsValue) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn to_decimal(value: f64, what: &str) -> Result<Decimal, String> {
    Decimal::try_from(value).map_err(|_| format!("{} is not a finite number: {}", what, value))
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Parse pasted quote text into line items.
///
/// Returns the items plus the lines that were skipped and why. Throws when
/// no line item could be read.
#[wasm_bindgen]
pub fn parse_quote_text(text: &str) -> Result<JsValue, JsValue> {
    let result = LineItemParser::new()
        .parse(text)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    #[derive(Serialize)]
    struct ParseOutput {
        items: Vec<LineItem>,
        warnings: Vec<String>,
        line_count: usize,
        processing_time_ms: u64,
    }

    to_js(&ParseOutput {
        warnings: result.warnings(),
        items: result.items,
        line_count: result.line_count,
        processing_time_ms: result.processing_time_ms,
    })
}

/// Import a quote from JSON line items.
#[wasm_bindgen]
pub fn parse_quote_json(text: &str) -> Result<JsValue, JsValue> {
    let quote = import_json(text).map_err(|e| JsValue::from_str(&e.to_string()))?;
    to_js(&quote)
}

/// Recalculate line items under the given margin settings.
///
/// Items are validated and margins clamped to the slider range first.
#[wasm_bindgen]
pub fn recalculate(items: JsValue, settings: JsValue, gst_rate: f64) -> Result<JsValue, JsValue> {
    let items: Vec<LineItem> = from_js(items)?;
    let settings: MarginSettings = from_js(settings)?;
    let gst_rate = to_decimal(gst_rate, "GST rate").map_err(|e| JsValue::from_str(&e))?;

    let recalculation = checked_recalculate(&items, settings, gst_rate, &PricingConfig::default())
        .map_err(|e| JsValue::from_str(&e))?;
    to_js(&recalculation)
}

fn checked_recalculate(
    items: &[LineItem],
    mut settings: MarginSettings,
    gst_rate: Decimal,
    pricing: &PricingConfig,
) -> Result<Recalculation, String> {
    if gst_rate < Decimal::ZERO || gst_rate > Decimal::ONE {
        return Err(format!("GST rate must be between 0 and 1: {}", gst_rate));
    }
    for item in items {
        item.validate()
            .map_err(|e| format!("item {}: {}", item.id, e))?;
    }
    settings.clamp(pricing.min_margin_percent, pricing.max_margin_percent);

    Ok(marginsim_core::recalculate(items, &settings, gst_rate))
}

/// The bundled sample quote.
#[wasm_bindgen]
pub fn sample_quote() -> Result<JsValue, JsValue> {
    to_js(&marginsim_core::sample_quote())
}

/// Starting margins for the sample quote.
#[wasm_bindgen]
pub fn default_margin_settings() -> Result<JsValue, JsValue> {
    to_js(&marginsim_core::sample_margin_settings())
}

/// Format an amount as currency ($1,234.56).
#[wasm_bindgen]
pub fn format_currency(amount: f64, fraction_digits: u32) -> Result<String, JsValue> {
    let amount = to_decimal(amount, "amount").map_err(|e| JsValue::from_str(&e))?;
    Ok(marginsim_core::format_currency(amount, fraction_digits))
}

/// Holds a quote and its margin settings for interactive use.
///
/// Every setter snaps the margin to the slider step and clamps it to the
/// allowed range; results are recomputed in full on each call.
#[wasm_bindgen]
pub struct MarginSimulator {
    quote: Quote,
    settings: MarginSettings,
    pricing: PricingConfig,
}

#[wasm_bindgen]
impl MarginSimulator {
    /// Create a simulator loaded with the sample quote.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            quote: marginsim_core::sample_quote(),
            settings: marginsim_core::sample_margin_settings(),
            pricing: PricingConfig::default(),
        }
    }

    /// Create a simulator from pasted quote text.
    pub fn from_text(text: &str) -> Result<MarginSimulator, JsValue> {
        Self::from_text_with(text, &ParsingConfig::default()).map_err(|e| JsValue::from_str(&e))
    }

    /// Create a simulator from JSON line items.
    pub fn from_json(text: &str) -> Result<MarginSimulator, JsValue> {
        let quote = import_json(text).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Self::with_quote(quote))
    }

    /// Number of line items.
    pub fn item_count(&self) -> usize {
        self.quote.line_items.len()
    }

    /// Set the labour margin; returns the value actually applied.
    pub fn set_labour_margin(&mut self, percent: f64) -> Result<f64, JsValue> {
        let applied = self.snap(percent)?;
        self.settings.set_labour_margin(applied);
        decimal_to_f64(applied)
    }

    /// Set the material margin; returns the value actually applied.
    pub fn set_material_margin(&mut self, percent: f64) -> Result<f64, JsValue> {
        let applied = self.snap(percent)?;
        self.settings.set_material_margin(applied);
        decimal_to_f64(applied)
    }

    /// Set the margin for one big-ticket item; returns the value applied.
    pub fn set_override(&mut self, item_id: &str, percent: f64) -> Result<f64, JsValue> {
        let applied = self.snap(percent)?;
        self.settings.set_override(item_id, applied);
        decimal_to_f64(applied)
    }

    /// Remove the override for one item.
    pub fn clear_override(&mut self, item_id: &str) {
        self.settings.clear_override(item_id);
    }

    /// Set the GST rate as a fraction.
    pub fn set_gst_rate(&mut self, rate: f64) -> Result<(), JsValue> {
        let rate = to_decimal(rate, "GST rate").map_err(|e| JsValue::from_str(&e))?;
        if rate < Decimal::ZERO || rate > Decimal::ONE {
            return Err(JsValue::from_str("GST rate must be between 0 and 1"));
        }
        self.quote.gst_rate = rate;
        Ok(())
    }

    /// Current margin settings.
    pub fn settings(&self) -> Result<JsValue, JsValue> {
        to_js(&self.settings)
    }

    /// Line items.
    pub fn items(&self) -> Result<JsValue, JsValue> {
        to_js(&self.quote.line_items)
    }

    /// Recalculated items, totals, breakdown and warnings.
    pub fn results(&self) -> Result<JsValue, JsValue> {
        to_js(&self.recalculation())
    }
}

impl MarginSimulator {
    fn with_quote(quote: Quote) -> Self {
        let pricing = PricingConfig::default();
        Self {
            settings: pricing.margin_settings(),
            quote,
            pricing,
        }
    }

    fn from_text_with(text: &str, config: &ParsingConfig) -> Result<Self, String> {
        let result = LineItemParser::from_config(config)
            .parse(text)
            .map_err(|e| e.to_string())?;
        Ok(Self::with_quote(Quote::new(result.items)))
    }

    fn snap(&self, percent: f64) -> Result<Decimal, JsValue> {
        let percent = to_decimal(percent, "margin").map_err(|e| JsValue::from_str(&e))?;
        Ok(self.pricing.snap_margin(percent))
    }

    /// Recalculate without crossing the JS boundary.
    pub fn recalculation(&self) -> Recalculation {
        self.quote.recalculate(&self.settings)
    }
}

impl Default for MarginSimulator {
    fn default() -> Self {
        Self::new()
    }
}

fn decimal_to_f64(value: Decimal) -> Result<f64, JsValue> {
    value
        .to_f64()
        .ok_or_else(|| JsValue::from_str(&format!("{} is not representable as a number", value)))
}
