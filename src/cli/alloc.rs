use super::ui;
use crate::core::allocation::{self, AllocationSummary, CategoryDistribution, Position};
use crate::core::catalog::{
    ContinentRecord, FundCatalogIndex, FundComposition, GeographyLookup, StatusLookup,
    StatusRecord,
};
use crate::core::config::AppConfig;
use crate::core::input;
use anyhow::{Context, Result};
use comfy_table::Cell;
use std::path::Path;
use tracing::info;

pub fn run(assets_path: &Path, config: &AppConfig) -> Result<()> {
    let summary = analyze(assets_path, config)?;
    println!("{}", render(&summary, config));
    Ok(())
}

/// Loads the portfolio and metadata tables and aggregates the allocation.
pub fn analyze(assets_path: &Path, config: &AppConfig) -> Result<AllocationSummary> {
    let positions: Vec<Position> = input::read_json(assets_path)?;
    allocation::validate_positions(&positions)
        .with_context(|| format!("Invalid portfolio file: {}", assets_path.display()))?;

    let catalog: Vec<FundComposition> = input::read_optional_list(&config.data.catalog)?;
    let continents: Vec<ContinentRecord> = input::read_optional_list(&config.data.geography)?;
    let statuses: Vec<StatusRecord> = input::read_optional_list(&config.data.market_status)?;

    let catalog = FundCatalogIndex::build(catalog);
    let geography = GeographyLookup::build(continents);
    let status = StatusLookup::build(statuses);
    info!(
        positions = positions.len(),
        funds = catalog.len(),
        "Analyzing portfolio allocation"
    );

    Ok(allocation::aggregate(
        &positions, &catalog, &geography, &status,
    ))
}

pub fn render(summary: &AllocationSummary, config: &AppConfig) -> String {
    let total = ui::format_money(summary.total_value, &config.currency, &config.number_format);
    let mut output = format!(
        "{}\n\n{} {}\n{} {}\n",
        ui::style_text("PORTFOLIO ANALYSIS", ui::StyleType::Title),
        ui::style_text("Total Value:", ui::StyleType::TotalLabel),
        ui::style_text(&total, ui::StyleType::TotalValue),
        ui::style_text("Asset Count:", ui::StyleType::TotalLabel),
        summary.position_count,
    );

    let report = &summary.report;
    let sections = [
        ("MARKET STATUS".to_string(), &report.market_status, None),
        ("CONTINENT ALLOCATION".to_string(), &report.continent, None),
        ("SECTOR ALLOCATION".to_string(), &report.sector, None),
        (
            format!("COUNTRY ALLOCATION (Top {})", config.top_countries),
            &report.country,
            Some(config.top_countries),
        ),
    ];

    for (title, distribution, limit) in sections {
        output.push('\n');
        output.push_str(&category_table(
            &title,
            distribution,
            summary.total_value,
            limit,
            config,
        ));
        output.push('\n');
    }
    output
}

fn category_table(
    title: &str,
    distribution: &CategoryDistribution,
    total_value: f64,
    limit: Option<usize>,
    config: &AppConfig,
) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Category"),
        ui::header_cell("% Port"),
        ui::header_cell("Value"),
    ]);

    let rows = match limit {
        Some(n) => distribution.top(n),
        None => distribution.sorted(),
    };

    for (label, value) in rows {
        let share = if total_value > 0.0 {
            value / total_value * 100.0
        } else {
            0.0
        };
        table.add_row(vec![
            Cell::new(label),
            ui::value_cell(format!(
                "{}%",
                ui::format_number(share, 2, &config.number_format)
            )),
            ui::value_cell(ui::format_money(
                value,
                &config.currency,
                &config.number_format,
            )),
        ]);
    }

    format!(
        "{}\n{table}",
        ui::style_text(title, ui::StyleType::TotalLabel)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::allocation::UNKNOWN_CATEGORY;
    use crate::core::config::{DataConfig, NumberFormat};
    use approx::assert_relative_eq;
    use std::fs;
    use tempfile::TempDir;

    fn config_in(dir: &Path) -> AppConfig {
        AppConfig {
            data: DataConfig {
                catalog: dir.join("etfs.json"),
                geography: dir.join("continents.json"),
                market_status: dir.join("status.json"),
            },
            currency: "EUR".to_string(),
            number_format: NumberFormat::default(),
            top_countries: 1,
        }
    }

    #[test]
    fn test_analyze_with_metadata_files() -> Result<()> {
        let dir = TempDir::new()?;
        let config = config_in(dir.path());
        fs::write(
            &config.data.catalog,
            r#"[{"isin": "IE000X", "ticker": "X", "countries": {"USA": 60, "Germany": 40}, "sectors": {"Tech": 100}},]"#,
        )?;
        fs::write(
            &config.data.geography,
            r#"[{"country": "USA", "continent": "NorthAmerica"}, {"country": "Germany", "continent": "Europe"}]"#,
        )?;
        let assets = dir.path().join("assets.json");
        fs::write(
            &assets,
            r#"[{"isin": "IE000X", "shares": 10, "price": 100}, {"ticker": "Y", "shares": 1, "price": 5},]"#,
        )?;

        let summary = analyze(&assets, &config)?;

        assert_eq!(summary.total_value, 1005.0);
        assert_eq!(summary.position_count, 2);
        assert_relative_eq!(summary.report.continent.get("Europe").unwrap(), 400.0);
        assert_eq!(summary.report.sector.get(UNKNOWN_CATEGORY), Some(5.0));
        // Status table file is absent, every country is unclassified
        assert_relative_eq!(
            summary.report.market_status.get("Unclassified Status").unwrap(),
            1000.0
        );
        Ok(())
    }

    #[test]
    fn test_analyze_rejects_position_without_identifier() -> Result<()> {
        let dir = TempDir::new()?;
        let config = config_in(dir.path());
        let assets = dir.path().join("assets.json");
        fs::write(&assets, r#"[{"shares": 1, "price": 5}]"#)?;

        let err = analyze(&assets, &config).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("Invalid portfolio file"));
        assert!(message.contains("assets[0]"));
        Ok(())
    }

    #[test]
    fn test_render_collapses_countries() {
        let mut report = allocation::CategoryReport::default();
        report.country.add("USA", 600.0);
        report.country.add("Germany", 300.0);
        report.country.add("Japan", 100.0);
        report.sector.add("Tech", 1000.0);
        let summary = AllocationSummary {
            total_value: 1000.0,
            position_count: 1,
            report,
        };
        let config = AppConfig {
            top_countries: 1,
            ..AppConfig::default()
        };

        let output = render(&summary, &config);

        assert!(output.contains("COUNTRY ALLOCATION (Top 1)"));
        assert!(output.contains("USA"));
        assert!(output.contains("... 2 others ..."));
        assert!(!output.contains("Germany"));
        assert!(output.contains("1.000,00 EUR"));
        assert!(output.contains("60,00%"));
    }
}
