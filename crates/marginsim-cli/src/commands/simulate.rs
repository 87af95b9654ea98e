//! Simulate command - recalculate a quote at chosen margins.

use std::path::PathBuf;
use std::str::FromStr;

use clap::Args;
use console::style;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info};

use marginsim_core::models::config::SimConfig;
use marginsim_core::sample::SAMPLE_BIG_TICKET_ID;
use marginsim_core::{
    format_currency_with, format_percent, sample_quote, MarginSettings, Recalculation,
};

use super::parse::{load_quote, LoadedQuote, QuoteSource};
use super::{load_config, read_input, InputFormat, OutputFormat};

/// Arguments for the simulate command.
#[derive(Args)]
pub struct SimulateArgs {
    /// Input file, or `-` for stdin
    input: Option<PathBuf>,

    /// How to read the input (default: from the file extension)
    #[arg(short, long, value_enum)]
    input_format: Option<InputFormat>,

    /// Use the bundled sample quote
    #[arg(long, conflicts_with = "input")]
    sample: bool,

    /// Labour margin in percent
    #[arg(short, long)]
    labour: Option<Decimal>,

    /// Material margin in percent
    #[arg(short, long)]
    material: Option<Decimal>,

    /// Big-ticket margin for one item, as ID=PCT
    #[arg(long = "override", value_parser = parse_override)]
    overrides: Vec<(String, Decimal)>,

    /// GST rate as a fraction (e.g. 0.15)
    #[arg(long)]
    gst_rate: Option<Decimal>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Serialize)]
struct SimulationReport<'a> {
    source: QuoteSource,
    gst_rate: Decimal,
    settings: &'a MarginSettings,
    #[serde(flatten)]
    recalculation: &'a Recalculation,
}

fn parse_override(s: &str) -> Result<(String, Decimal), String> {
    let (id, percent) = s
        .split_once('=')
        .ok_or_else(|| format!("expected ID=PCT, got '{}'", s))?;
    let id = id.trim();
    if id.is_empty() {
        return Err(format!("missing item id in '{}'", s));
    }
    let percent = Decimal::from_str(percent.trim().trim_end_matches('%'))
        .map_err(|e| format!("invalid percent in '{}': {}", s, e))?;
    Ok((id.to_string(), percent))
}

pub async fn run(args: SimulateArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    let mut loaded = match (&args.input, args.sample) {
        (_, true) => LoadedQuote {
            source: QuoteSource::Sample,
            quote: sample_quote(),
            warnings: Vec::new(),
        },
        (Some(input), false) => {
            let input_format = args
                .input_format
                .unwrap_or_else(|| InputFormat::from_path(input));
            let text = read_input(input)?;
            load_quote(&text, input_format, &config, false)?
        }
        (None, false) => anyhow::bail!("Give an input file, `-` for stdin, or --sample"),
    };

    if let Some(gst_rate) = args.gst_rate {
        if gst_rate < Decimal::ZERO || gst_rate > Decimal::ONE {
            anyhow::bail!("GST rate must be a fraction between 0 and 1: {}", gst_rate);
        }
        loaded.quote.gst_rate = gst_rate;
    }

    let settings = build_settings(&args, &config, loaded.source);
    info!(
        "Simulating {} items at labour {}%, material {}%",
        loaded.quote.line_items.len(),
        settings.labour_margin_percent,
        settings.material_margin_percent
    );

    for warning in &loaded.warnings {
        eprintln!("{} {}", style("⚠").yellow(), warning);
    }
    for id in settings.high_value_overrides.keys() {
        match loaded.quote.item(id) {
            Some(item) if item.is_high_value => {}
            Some(_) => eprintln!(
                "{} Item {} is not big-ticket; its override is ignored",
                style("⚠").yellow(),
                id
            ),
            None => eprintln!("{} No item with id {}", style("⚠").yellow(), id),
        }
    }

    let recalculation = loaded.quote.recalculate(&settings);
    debug!("Warnings: {}", recalculation.warnings.len());

    let output = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&SimulationReport {
            source: loaded.source,
            gst_rate: loaded.quote.gst_rate,
            settings: &settings,
            recalculation: &recalculation,
        })?,
        OutputFormat::Csv => format_csv(&recalculation)?,
        OutputFormat::Text => format_text(&recalculation, &settings, &config),
    };

    println!("{}", output);

    Ok(())
}

/// Start from the configured margins, then apply command-line choices
/// snapped to the slider step.
fn build_settings(args: &SimulateArgs, config: &SimConfig, source: QuoteSource) -> MarginSettings {
    let pricing = &config.pricing;
    let mut settings = pricing.margin_settings();

    if source == QuoteSource::Sample {
        settings.set_override(SAMPLE_BIG_TICKET_ID, Decimal::from(25));
    }
    if let Some(labour) = args.labour {
        settings.set_labour_margin(pricing.snap_margin(labour));
    }
    if let Some(material) = args.material {
        settings.set_material_margin(pricing.snap_margin(material));
    }
    for (id, percent) in &args.overrides {
        settings.set_override(id.clone(), pricing.snap_margin(*percent));
    }

    settings
}

fn format_csv(recalculation: &Recalculation) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "id",
        "name",
        "category",
        "quantity",
        "cost",
        "applied_margin_percent",
        "margin_source",
        "adjusted_price",
        "extended_price",
    ])?;

    for adjusted in &recalculation.items {
        let source = serde_json::to_value(adjusted.margin_source)?;
        wtr.write_record([
            adjusted.item.id.as_str(),
            adjusted.item.name.as_str(),
            adjusted.item.category.as_str(),
            &adjusted.item.quantity.to_string(),
            &adjusted.item.cost.to_string(),
            &adjusted.applied_margin_percent.to_string(),
            source.as_str().unwrap_or_default(),
            &adjusted.adjusted_price.round_dp(2).to_string(),
            &adjusted.extended_price.round_dp(2).to_string(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(
    recalculation: &Recalculation,
    settings: &MarginSettings,
    config: &SimConfig,
) -> String {
    let display = &config.display;
    let money =
        |amount| format_currency_with(amount, &display.currency_symbol, display.fraction_digits);
    let results = &recalculation.results;

    let mut output = String::new();

    output.push_str("Margins:\n");
    output.push_str(&format!("  Labour:    {}%\n", settings.labour_margin_percent));
    output.push_str(&format!("  Materials: {}%\n", settings.material_margin_percent));
    for (id, percent) in &settings.high_value_overrides {
        output.push_str(&format!("  Item {}:   {}%\n", id, percent));
    }
    output.push('\n');

    output.push_str("Items:\n");
    for adjusted in &recalculation.items {
        output.push_str(&format!(
            "  {:>3}  {:<50} {:>8} x {:>12}  {:>7}\n",
            adjusted.item.id,
            adjusted.item.name,
            adjusted.item.quantity,
            money(adjusted.adjusted_price),
            format_percent(adjusted.applied_margin_percent),
        ));
    }
    output.push('\n');

    output.push_str("Breakdown:\n");
    for group in recalculation.breakdown.iter() {
        if group.item_count == 0 {
            continue;
        }
        output.push_str(&format!(
            "  {:<11} {:>3} items  cost {:>12}  price {:>12}  markup {}\n",
            group.group.label(),
            group.item_count,
            money(group.total_cost),
            money(group.total_price),
            format_percent(group.markup_percent()),
        ));
    }
    output.push('\n');

    output.push_str("Summary:\n");
    output.push_str(&format!("  Subtotal:     {}\n", money(results.subtotal)));
    output.push_str(&format!("  GST:          {}\n", money(results.tax_amount)));
    output.push_str(&format!("  Total:        {} {}\n", money(results.total), display.currency));
    output.push_str(&format!("  Cost:         {}\n", money(results.total_cost)));
    output.push_str(&format!(
        "  Gross profit: {} ({})\n",
        money(results.gross_profit),
        format_percent(results.gross_profit_percent)
    ));

    for warning in &recalculation.warnings {
        output.push_str(&format!(
            "\n{} {} is at {}%, above the recommended {}% markup",
            style("⚠").yellow(),
            warning.name,
            warning.applied_margin_percent,
            warning.max_markup_percent
        ));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_override() {
        assert_eq!(
            parse_override("13=22.5").unwrap(),
            ("13".to_string(), Decimal::new(225, 1))
        );
        assert_eq!(
            parse_override(" 7 = 30% ").unwrap(),
            ("7".to_string(), Decimal::from(30))
        );
        assert!(parse_override("13").is_err());
        assert!(parse_override("=5").is_err());
        assert!(parse_override("13=lots").is_err());
    }
}
