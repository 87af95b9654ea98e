//! Parse command - extract line items from quote text or JSON.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use serde::Serialize;
use tracing::{debug, info, warn};

use marginsim_core::models::config::SimConfig;
use marginsim_core::quote::{import_json_with, LineItemParser, QuoteParser};
use marginsim_core::{format_currency_with, sample_quote, LineItem, Quote};

use super::{load_config, read_input, InputFormat, OutputFormat};

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// Input file, or `-` for stdin
    #[arg(required = true)]
    input: PathBuf,

    /// How to read the input (default: from the file extension)
    #[arg(short, long, value_enum)]
    input_format: Option<InputFormat>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Use the bundled sample quote when nothing can be parsed
    #[arg(long)]
    fallback_sample: bool,
}

/// Where a loaded quote came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteSource {
    Text,
    Json,
    Sample,
}

/// A quote plus the parse warnings collected on the way.
#[derive(Debug, Serialize)]
pub struct LoadedQuote {
    pub source: QuoteSource,
    #[serde(flatten)]
    pub quote: Quote,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

pub async fn run(args: ParseArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let input_format = args
        .input_format
        .unwrap_or_else(|| InputFormat::from_path(&args.input));
    let text = read_input(&args.input)?;

    info!("Parsing {} as {:?}", args.input.display(), input_format);

    let loaded = load_quote(&text, input_format, &config, args.fallback_sample)?;

    for warning in &loaded.warnings {
        eprintln!("{} {}", style("⚠").yellow(), warning);
    }

    let output = format_quote(&loaded, args.format, &config)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Parse quote input, falling back to the sample quote when allowed.
pub fn load_quote(
    text: &str,
    input_format: InputFormat,
    config: &SimConfig,
    fallback_sample: bool,
) -> anyhow::Result<LoadedQuote> {
    let parsed = match input_format {
        InputFormat::Text => {
            let parser = LineItemParser::from_config(&config.parsing);
            parser.parse(text).map_err(anyhow::Error::from).map(|result| {
                let warnings = result.warnings();
                let quote = Quote::new(result.items).with_gst_rate(config.pricing.gst_rate);
                LoadedQuote {
                    source: QuoteSource::Text,
                    quote,
                    warnings,
                }
            })
        }
        InputFormat::Json => import_json_with(text, &config.parsing)
            .map_err(anyhow::Error::from)
            .map(|quote| LoadedQuote {
                source: QuoteSource::Json,
                quote,
                warnings: Vec::new(),
            }),
    };

    match parsed {
        Ok(loaded) => Ok(loaded),
        Err(e) if fallback_sample => {
            warn!("Could not parse quote ({}), using sample data", e);
            Ok(LoadedQuote {
                source: QuoteSource::Sample,
                quote: sample_quote(),
                warnings: vec![format!("could not parse quote ({}), showing sample data", e)],
            })
        }
        Err(e) => Err(e),
    }
}

/// Read a quote from a path, choosing the input format by extension.
pub fn load_quote_file(path: &Path, config: &SimConfig) -> anyhow::Result<LoadedQuote> {
    let text = read_input(path)?;
    load_quote(&text, InputFormat::from_path(path), config, false)
}

pub fn format_quote(
    loaded: &LoadedQuote,
    format: OutputFormat,
    config: &SimConfig,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(loaded)?),
        OutputFormat::Csv => format_csv(&loaded.quote.line_items),
        OutputFormat::Text => Ok(format_text(loaded, config)),
    }
}

fn format_csv(items: &[LineItem]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "id",
        "name",
        "category",
        "quantity",
        "cost",
        "price",
        "markup_percent",
        "tax_percent",
        "discount_percent",
        "total",
        "big_ticket",
    ])?;

    for item in items {
        wtr.write_record([
            item.id.as_str(),
            item.name.as_str(),
            item.category.as_str(),
            &item.quantity.to_string(),
            &item.cost.to_string(),
            &item.price.to_string(),
            &item.markup_percent.to_string(),
            &item.tax_percent.to_string(),
            &item.discount_percent.to_string(),
            &item.line_total.map(|t| t.to_string()).unwrap_or_default(),
            if item.is_high_value { "yes" } else { "no" },
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(loaded: &LoadedQuote, config: &SimConfig) -> String {
    let display = &config.display;
    let money =
        |amount| format_currency_with(amount, &display.currency_symbol, display.fraction_digits);

    let mut output = String::new();
    output.push_str(&format!(
        "Quote: {} line items ({:?})\n\n",
        loaded.quote.line_items.len(),
        loaded.source
    ));

    for item in &loaded.quote.line_items {
        output.push_str(&format!(
            "{:>3}  {:<8} {:<50} {:>8} x {:>12} -> {:>12}  {:>7}%{}\n",
            item.id,
            item.category.as_str(),
            item.name,
            item.quantity,
            money(item.cost),
            money(item.price),
            item.markup_percent,
            if item.is_high_value { "  [big-ticket]" } else { "" }
        ));
    }

    output.push_str(&format!(
        "\nGST rate: {}%\n",
        (loaded.quote.gst_rate * rust_decimal::Decimal::ONE_HUNDRED).normalize()
    ));

    output
}
