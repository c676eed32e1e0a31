//! Integration tests for the tiered billing engine

use costctl::billing::{cost, Tier, TierSchedule};

fn usd(tiers: &[(u64, f64)]) -> TierSchedule {
    TierSchedule::new(
        tiers
            .iter()
            .map(|&(start, price)| Tier::new(start, price, "USD"))
            .collect(),
    )
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {}, got {}",
        expected,
        actual
    );
}

#[test]
fn test_two_tiers_beyond_boundary() {
    // 100 units at 10, 50 at 5
    let result = cost(&usd(&[(0, 10.0), (100, 5.0)]), 150, 150, 1.0);
    assert_close(result.ceiling_cost, 1250.0);
    assert_close(result.projected_cost, 1250.0);
}

#[test]
fn test_two_tiers_within_first() {
    let result = cost(&usd(&[(0, 10.0), (100, 5.0)]), 50, 50, 1.0);
    assert_close(result.ceiling_cost, 500.0);
}

#[test]
fn test_ceiling_and_projected_billed_independently() {
    let result = cost(&usd(&[(0, 10.0), (100, 5.0)]), 150, 50, 1.0);
    assert_close(result.ceiling_cost, 1250.0);
    assert_close(result.projected_cost, 500.0);
}

#[test]
fn test_zero_usage_costs_nothing() {
    let result = cost(&usd(&[(0, 10.0), (100, 5.0)]), 0, 0, 1.0);
    assert_close(result.ceiling_cost, 0.0);
    assert_close(result.projected_cost, 0.0);
}

#[test]
fn test_free_allotment_consumes_capacity() {
    let schedule = usd(&[(0, 0.0), (10, 2.0)]);
    assert_close(cost(&schedule, 5, 5, 1.0).ceiling_cost, 0.0);
    assert_close(cost(&schedule, 15, 15, 1.0).ceiling_cost, 10.0);
}

#[test]
fn test_free_tier() {
    let schedule = usd(&[(0, 0.0), (1, 0.12)]);
    let within = cost(&schedule, 1, 1, 1.0);
    assert_close(within.ceiling_cost, 0.0);

    let beyond = cost(&schedule, 101, 11, 1.0);
    assert_close(beyond.ceiling_cost, 12.0);
    assert_close(beyond.projected_cost, 1.2);
}

#[test]
fn test_flat_rate() {
    let result = cost(&TierSchedule::flat(0.04, "USD"), 720, 360, 1.0);
    assert_close(result.ceiling_cost, 28.8);
    assert_close(result.projected_cost, 14.4);
}

#[test]
fn test_conversion_rate_divides_totals() {
    let result = cost(&usd(&[(0, 10.0), (100, 5.0)]), 150, 50, 1.25);
    assert_close(result.ceiling_cost, 1000.0);
    assert_close(result.projected_cost, 400.0);
}

#[test]
fn test_tiers_sorted_by_start() {
    let shuffled = usd(&[(100, 5.0), (0, 10.0)]);
    let result = cost(&shuffled, 150, 150, 1.0);
    assert_close(result.ceiling_cost, 1250.0);
}

#[test]
fn test_schedule_deserializes_from_tier_list() {
    let json = r#"[
        {"start_usage_amount": 0, "unit_price": 10.0, "currency": "USD"},
        {"start_usage_amount": 100, "unit_price": 5.0, "currency": "USD"}
    ]"#;
    let schedule: TierSchedule = serde_json::from_str(json).unwrap();
    assert_eq!(schedule.tiers().len(), 2);
    assert_eq!(schedule.currency(), Some("USD"));
    assert_close(cost(&schedule, 150, 0, 1.0).ceiling_cost, 1250.0);
}
