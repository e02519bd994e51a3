use approx::{assert_abs_diff_eq, assert_relative_eq};
use std::fs;
use std::path::Path;
use tracing::info;

mod test_utils {
    use std::fs;
    use std::path::{Path, PathBuf};

    /// Writes catalog, classification tables and a config pointing at them.
    pub fn write_environment(dir: &Path) -> PathBuf {
        fs::write(
            dir.join("etfs.json"),
            r#"[
                {"ticker": "X", "countries": {"USA": 60, "Germany": 40}, "sectors": {"Tech": 100}},
                {"isin": "IE00WORLD", "ticker": "WRLD",
                 "countries": {"USA": 70, "Japan": 20, "Other": 10},
                 "sectors": {"Tech": 25, "Financials": 25}},
            ]"#,
        )
        .expect("Failed to write catalog");
        fs::write(
            dir.join("continents.json"),
            r#"[
                {"country": "USA", "continent": "NorthAmerica"},
                {"country": "Germany", "continent": "Europe"},
                {"country": "Japan", "continent": "Asia"},
                {"country": "Other", "continent": "Europe"},
            ]"#,
        )
        .expect("Failed to write geography table");
        fs::write(
            dir.join("status.json"),
            r#"[
                {"country": "USA", "status": "Developed"},
                {"country": "Germany", "status": "Developed"},
            ]"#,
        )
        .expect("Failed to write status table");

        let config_path = dir.join("config.yaml");
        let config = format!(
            r#"
data:
  catalog: "{}"
  geography: "{}"
  market_status: "{}"
currency: "EUR"
top_countries: 2
"#,
            dir.join("etfs.json").display(),
            dir.join("continents.json").display(),
            dir.join("status.json").display(),
        );
        fs::write(&config_path, config).expect("Failed to write config file");
        config_path
    }
}

fn load_config(path: &Path) -> fundscope::config::AppConfig {
    fundscope::config::AppConfig::load_from_path(path).expect("Failed to load config")
}

#[test_log::test]
fn test_allocation_single_fund_scenario() {
    let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let config_path = test_utils::write_environment(dir.path());
    let assets = dir.path().join("assets.json");
    fs::write(&assets, r#"[{"ticker": "X", "shares": 10, "price": 100}]"#).unwrap();

    let summary = fundscope::cli::alloc::analyze(&assets, &load_config(&config_path))
        .expect("Allocation failed");
    info!(?summary, "Allocation computed");

    let report = &summary.report;
    assert_eq!(summary.total_value, 1000.0);
    assert_relative_eq!(report.country.get("USA").unwrap(), 600.0);
    assert_relative_eq!(report.country.get("Germany").unwrap(), 400.0);
    assert_relative_eq!(report.continent.get("NorthAmerica").unwrap(), 600.0);
    assert_relative_eq!(report.continent.get("Europe").unwrap(), 400.0);
    assert_relative_eq!(report.sector.get("Tech").unwrap(), 1000.0);
    assert_eq!(report.country.len(), 2);
    assert_eq!(report.continent.len(), 2);
    assert_eq!(report.sector.len(), 1);
}

#[test_log::test]
fn test_allocation_mixed_portfolio() {
    let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let config_path = test_utils::write_environment(dir.path());
    let assets = dir.path().join("assets.json");
    fs::write(
        &assets,
        r#"[
            {"isin": "IE00WORLD", "shares": 4, "price": 250},
            {"ticker": "NOPE", "shares": 3, "price": 100},
        ]"#,
    )
    .unwrap();

    let summary = fundscope::cli::alloc::analyze(&assets, &load_config(&config_path))
        .expect("Allocation failed");
    let report = &summary.report;

    assert_eq!(summary.total_value, 1300.0);
    assert_eq!(summary.position_count, 2);

    // Unresolved fund lands in "Unknown" everywhere
    for distribution in [
        &report.country,
        &report.continent,
        &report.sector,
        &report.market_status,
    ] {
        assert_eq!(distribution.get("Unknown"), Some(300.0));
    }

    // "Other" ignores the table mapping it to Europe
    assert_relative_eq!(report.continent.get("Other/Unclassified").unwrap(), 100.0);
    assert!(report.continent.get("Europe").is_none());
    assert_relative_eq!(report.market_status.get("Other/Unclassified").unwrap(), 100.0);
    assert_relative_eq!(report.market_status.get("Unclassified Status").unwrap(), 200.0);
    assert_relative_eq!(report.market_status.get("Developed").unwrap(), 700.0);

    // Countries sum to 100, sectors only to 50 and stay under-allocated
    assert_relative_eq!(report.country.total(), 1300.0);
    assert_relative_eq!(report.sector.total(), 800.0);
    assert!(report.sector.total() < summary.total_value);
}

#[test_log::test]
fn test_alloc_command_with_missing_metadata_files() {
    let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let config_path = dir.path().join("config.yaml");
    fs::write(
        &config_path,
        format!(
            "data:\n  catalog: \"{0}/none1.json\"\n  geography: \"{0}/none2.json\"\n  market_status: \"{0}/none3.json\"\n",
            dir.path().display()
        ),
    )
    .unwrap();
    let assets = dir.path().join("assets.json");
    fs::write(&assets, r#"[{"ticker": "X", "shares": 1, "price": 1}]"#).unwrap();

    let result = fundscope::run_command(
        fundscope::AppCommand::Allocation {
            assets_path: assets,
        },
        Some(config_path.to_str().unwrap()),
    );
    assert!(result.is_ok(), "Allocation failed with: {:?}", result.err());
}

#[test_log::test]
fn test_alloc_command_missing_assets_file_fails() {
    let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let config_path = test_utils::write_environment(dir.path());

    let result = fundscope::run_command(
        fundscope::AppCommand::Allocation {
            assets_path: dir.path().join("missing.json"),
        },
        Some(config_path.to_str().unwrap()),
    );
    assert!(result.is_err());
}

#[test_log::test]
fn test_performance_one_year_scenario() {
    let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let data = dir.path().join("performance.json");
    fs::write(
        &data,
        r#"{
            "transactions": [{"date": "2020-01-01", "amount": 1000}],
            "values": [{"date": "2021-01-01", "value": 1100}]
        }"#,
    )
    .unwrap();

    let report = fundscope::cli::performance::analyze(&data).expect("Performance failed");
    info!(?report, "Performance computed");

    assert_abs_diff_eq!(report.rate_factor, 1.10, epsilon = 0.001);
    assert_abs_diff_eq!(report.percentage, 10.0, epsilon = 0.1);
    assert_eq!(report.invested, 1000.0);
    assert_eq!(report.earned, 100.0);
}

#[test_log::test]
fn test_perf_command_end_to_end() {
    let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let config_path = test_utils::write_environment(dir.path());
    let data = dir.path().join("performance.json");
    fs::write(
        &data,
        r#"{
            "transactions": [
                {"date": "2019-01-01", "amount": 1000},
                {"date": "2020-01-01", "amount": 1000},
                {"date": "2020-07-01T12:00:00Z", "amount": -200},
            ],
            "values": [{"date": "2021-01-01", "value": 2100}]
        }"#,
    )
    .unwrap();

    let result = fundscope::run_command(
        fundscope::AppCommand::Performance { data_path: data },
        Some(config_path.to_str().unwrap()),
    );
    assert!(result.is_ok(), "Performance failed with: {:?}", result.err());
}

#[test_log::test]
fn test_perf_command_rejects_invalid_amount_type() {
    let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let config_path = test_utils::write_environment(dir.path());
    let data = dir.path().join("performance.json");
    fs::write(
        &data,
        r#"{"transactions": [{"date": "2020-01-01", "amount": "lots"}], "values": [{"date": "2021-01-01", "value": 1}]}"#,
    )
    .unwrap();

    let result = fundscope::run_command(
        fundscope::AppCommand::Performance { data_path: data },
        Some(config_path.to_str().unwrap()),
    );
    assert!(result.is_err());
}
