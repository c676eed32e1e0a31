//! End-to-end tests for the estimate pipeline
//!
//! Uses a mocked price cache for error handling and a price file on disk
//! for the full asset export → report path.

mod common;

use common::project_records;
use costctl::assets::build;
use costctl::billing::TierSchedule;
use costctl::config::Config;
use costctl::error::CostctlError;
use costctl::pricing::{PriceCache, PriceQuery, StaticPriceCache};
use costctl::records::{load_records, records_to_json};
use costctl::report::{estimate, CSV_HEADER};
use costctl::{BuildOptions, ResourceGraph};
use mockall::mock;
use std::collections::BTreeMap;
use std::fs;
use tempfile::TempDir;

mock! {
    Cache {}
    impl PriceCache for Cache {
        fn schedules(&self, query: &PriceQuery) -> costctl::Result<BTreeMap<String, TierSchedule>>;
    }
}

const PRICES: &str = r#"
[[rates]]
rate_id = "CPU-E2-US"
family = "Compute"
region = "us-east1"
discriminator = "e2-small OnDemand"
tiers = [{ start_usage_amount = 0, unit_price = 0.0167, currency = "USD" }]

[[rates]]
rate_id = "CPU-N2-EU-PVM"
family = "Compute"
region = "europe-west1"
discriminator = "n2-standard-4 Preemptible"
tiers = [{ start_usage_amount = 0, unit_price = 0.05, currency = "USD" }]

[[rates]]
rate_id = "LIC-WIN"
family = "License"
region = "global"
discriminator = "Windows"
tiers = [{ start_usage_amount = 0, unit_price = 0.046, currency = "USD" }]

[[rates]]
rate_id = "PD-BAL-REGIONAL"
family = "Storage"
region = "us-east1"
discriminator = "regional pd-balanced"
tiers = [{ start_usage_amount = 0, unit_price = 0.2, currency = "USD" }]

[[rates]]
rate_id = "PD-BAL"
family = "Storage"
region = "us-east1"
discriminator = "pd-balanced"
tiers = [{ start_usage_amount = 0, unit_price = 0.1, currency = "USD" }]

[[rates]]
rate_id = "IMAGE"
family = "Storage"
region = "global"
discriminator = "image"
tiers = [{ start_usage_amount = 0, unit_price = 0.05, currency = "USD" }]

[[rates]]
rate_id = "EGRESS-PREMIUM"
family = "Network"
region = "global"
discriminator = "egress PREMIUM"
tiers = [
    { start_usage_amount = 0, unit_price = 0.0, currency = "USD" },
    { start_usage_amount = 1, unit_price = 0.12, currency = "USD" },
]
"#;

fn project_graph() -> ResourceGraph {
    build(&project_records(), &BuildOptions::default()).unwrap()
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {}, got {}",
        expected,
        actual
    );
}

#[test]
fn test_missing_pricing_omits_group_with_warning() {
    let mut cache = MockCache::new();
    cache.expect_schedules().returning(|query: &PriceQuery| {
        let mut found = BTreeMap::new();
        let priced = match query.family.as_str() {
            "Storage" => query.discriminator != "image",
            "License" => query.discriminator == "Windows",
            _ => true,
        };
        if priced {
            found.insert("RATE".to_string(), TierSchedule::flat(1.0, "USD"));
        }
        Ok(found)
    });

    let report = estimate(&project_graph(), &cache, &Config::default()).unwrap();

    // Two image groups (us and eu) have no schedule
    assert_eq!(report.warnings.len(), 2);
    assert!(report
        .warnings
        .iter()
        .all(|w| w.resource.contains("/images/") && w.count == 1));
    assert!(report.lines.iter().all(|l| l.resource_type != "Image"));

    // batch and its license, web, regional disk, disk, two egress groups
    assert_eq!(report.lines.len(), 7);
    let license = report
        .lines
        .iter()
        .find(|l| l.resource_type == "License")
        .unwrap();
    assert_eq!(license.spec, "Windows on n2-standard-4");
}

#[test]
fn test_fatal_cache_error_aborts_estimate() {
    let mut cache = MockCache::new();
    cache.expect_schedules().returning(|_| {
        Err(CostctlError::Validation {
            field: "price cache".to_string(),
            reason: "unavailable".to_string(),
        })
    });

    let result = estimate(&project_graph(), &cache, &Config::default());
    assert!(matches!(result, Err(CostctlError::Validation { .. })));
}

#[test]
fn test_first_rate_id_wins() {
    let mut cache = MockCache::new();
    cache.expect_schedules().returning(|_| {
        let mut found = BTreeMap::new();
        found.insert("B".to_string(), TierSchedule::flat(100.0, "USD"));
        found.insert("A".to_string(), TierSchedule::flat(1.0, "USD"));
        Ok(found)
    });

    let report = estimate(&project_graph(), &cache, &Config::default()).unwrap();
    let disks = report
        .lines
        .iter()
        .find(|l| l.resource_type == "Disk")
        .unwrap();
    // Two 20GB disks at 1.0
    assert_close(disks.max_cost, 40.0);
}

#[test]
fn test_estimate_from_price_file() {
    let dir = TempDir::new().unwrap();
    let prices = dir.path().join("prices.toml");
    fs::write(&prices, PRICES).unwrap();

    let cache = StaticPriceCache::load(&prices).unwrap();
    assert_eq!(cache.len(), 7);

    let report = estimate(&project_graph(), &cache, &Config::default()).unwrap();
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    assert_eq!(report.currency, "USD");
    assert_eq!(report.lines.len(), 9);

    let web = report
        .lines
        .iter()
        .find(|l| l.spec.starts_with("e2-small"))
        .unwrap();
    assert_eq!(web.count, 2);
    assert_eq!(web.max_usage.amount, 1440);
    assert_eq!(web.max_usage.unit, "h");
    assert_close(web.max_cost, 24.048);

    let regional = report
        .lines
        .iter()
        .find(|l| l.resource_type == "RegionalDisk")
        .unwrap();
    assert_close(regional.max_cost, 20.0);

    // First GiB free, the rest at 0.12
    let egress: Vec<_> = report
        .lines
        .iter()
        .filter(|l| l.resource_type == "Egress")
        .collect();
    assert_eq!(egress.len(), 2);
    for line in egress {
        assert_close(line.max_cost, 1023.0 * 0.12);
        assert_close(line.projected_cost, 99.0 * 0.12);
    }
}

#[test]
fn test_conversion_rate_applies_to_report() {
    let cache = StaticPriceCache::parse(PRICES, false).unwrap();
    let mut config = Config::default();
    config.currency.code = "EUR".to_string();
    config.currency.conversion_rate = 2.0;

    let usd = estimate(&project_graph(), &cache, &Config::default()).unwrap();
    let eur = estimate(&project_graph(), &cache, &config).unwrap();
    assert_eq!(eur.currency, "EUR");
    assert_close(eur.total_max_cost() * 2.0, usd.total_max_cost());
}

#[test]
fn test_asset_export_to_csv_report() {
    let dir = TempDir::new().unwrap();
    let assets = dir.path().join("assets.json");
    fs::write(&assets, records_to_json(&project_records()).unwrap()).unwrap();

    let records = load_records(&assets).unwrap();
    let graph = build(&records, &BuildOptions::default()).unwrap();
    assert_eq!(graph, project_graph());

    let cache = StaticPriceCache::parse(PRICES, false).unwrap();
    let report = estimate(&graph, &cache, &Config::default()).unwrap();

    let csv_path = dir.path().join("report.csv");
    report.export("csv", Some(csv_path.as_path())).unwrap();
    let csv = fs::read_to_string(&csv_path).unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next().unwrap(), CSV_HEADER.join(","));
    assert_eq!(lines.count(), report.lines.len());
    assert!(csv.contains("License,1,Windows on n2-standard-4,720 h,33.12,720 h,33.12"));
}

#[test]
fn test_missing_asset_file() {
    let dir = TempDir::new().unwrap();
    let err = load_records(&dir.path().join("missing.json")).unwrap_err();
    assert!(err.to_string().contains("missing.json"));
}
