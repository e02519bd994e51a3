use super::ui;
use crate::core::config::AppConfig;
use crate::core::input;
use crate::core::performance::{BruteYield, PerformanceData, PerformanceInput, PerformanceReport};
use anyhow::{Context, Result};
use comfy_table::{Attribute, Cell};
use std::path::Path;
use tracing::info;

pub fn run(data_path: &Path, config: &AppConfig) -> Result<()> {
    let report = analyze(data_path)?;
    println!("{}", render(&report, config));
    Ok(())
}

/// Loads and validates the performance file, then solves for the MWRR.
pub fn analyze(data_path: &Path) -> Result<PerformanceReport> {
    let data: PerformanceData = input::read_json(data_path)?;
    let input = PerformanceInput::from_records(&data)
        .with_context(|| format!("Invalid performance file: {}", data_path.display()))?;

    info!(
        deposits = input.deposits.len(),
        values = data.values.len(),
        "Calculating money-weighted return"
    );
    Ok(PerformanceReport::compute(&input))
}

pub fn render(report: &PerformanceReport, config: &AppConfig) -> String {
    let money = |v: f64| ui::format_money(v, &config.currency, &config.number_format);
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Metric"), ui::header_cell("Value")]);

    table.add_row(vec![
        Cell::new("Last date"),
        ui::value_cell(report.last_date.format("%Y-%m-%d").to_string()),
    ]);
    table.add_row(vec![Cell::new("Invested"), ui::value_cell(money(report.invested))]);
    table.add_row(vec![
        Cell::new("Last value"),
        ui::value_cell(money(report.last_value)),
    ]);
    table.add_row(vec![Cell::new("Earned"), ui::value_cell(money(report.earned))]);

    let brute_yield = match report.brute_yield {
        BruteYield::Ratio(_) => ui::value_cell(report.brute_yield.to_string()),
        BruteYield::Undefined => ui::na_cell(&report.brute_yield.to_string()),
    };
    table.add_row(vec![Cell::new("Brute yield"), brute_yield]);
    table.add_row(vec![
        Cell::new("MWRR (factor)").add_attribute(Attribute::Bold),
        ui::value_cell(ui::format_number(
            report.rate_factor,
            4,
            &config.number_format,
        )),
    ]);
    table.add_row(vec![
        Cell::new("MWRR (per year)").add_attribute(Attribute::Bold),
        ui::change_cell(report.percentage, &config.number_format),
    ]);

    format!(
        "{}\n\n{table}",
        ui::style_text("PORTFOLIO PERFORMANCE", ui::StyleType::Title)
    )
}
