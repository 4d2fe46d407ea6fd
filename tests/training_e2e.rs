//! End-to-end training scenario over a small synthetic record table.

use ltc_trading::{normalize_records, FinancialRecord, Trainer, TrainerConfig};

/// Build one monthly record with flat filler features.
fn record(symbol: &str, date: &str, price: f64, next_period_price: f64) -> FinancialRecord {
    FinancialRecord {
        date: date.to_string(),
        symbol: symbol.to_string(),
        price,
        next_period_price,
        interest_rate: 0.5,
        unemployment_rate: 0.4,
        inflation: 0.3,
        growth_rate: 0.2,
        consumer_sentiment: 0.6,
        sales_figures: 1.0,
        gross_margin: 0.4,
        self_financing_capacity: 0.8,
        net_income: 0.5,
        profit_per_share: 0.3,
        free_cash_flow: 0.7,
        net_debt_to_equity: 0.9,
        roa: 0.2,
        ebitda: 1.1,
        sector_sentiment: 0.1,
        pricing_dcf: 0.5,
        sharpe_ratio: 0.8,
        cagr: 0.15,
        var: -0.05,
        cvar: -0.08,
        beta: 1.05,
        dividend_yield: 0.02,
    }
}

/// 3 symbols x 4 months: RISE gains 10% a month, FALL loses 10% a
/// month, FLAT never moves. Labels are pre-chained the way the loader
/// produces them (last record keeps its own price).
fn scenario() -> Vec<FinancialRecord> {
    let mut records = Vec::new();

    let rise = [100.0, 110.0, 121.0, 133.1];
    let fall = [100.0, 90.0, 81.0, 72.9];
    let dates = ["202401", "202402", "202403", "202404"];

    for i in 0..4 {
        let next = |path: &[f64; 4]| if i + 1 < 4 { path[i + 1] } else { path[i] };
        records.push(record("RISE", dates[i], rise[i], next(&rise)));
        records.push(record("FALL", dates[i], fall[i], next(&fall)));
        records.push(record("FLAT", dates[i], 100.0, 100.0));
    }
    records
}

#[test]
fn cumulative_reward_tracks_price_direction() {
    let records = scenario();

    let config = TrainerConfig {
        epochs: 20,
        seed: Some(1234),
        ..Default::default()
    };
    let mut trainer = Trainer::new(config).unwrap();
    trainer.train(&records, |_| {}).unwrap();

    let totals = trainer.cumulative_reward();
    assert_eq!(totals.len(), 3);

    let rise = totals["RISE"];
    let fall = totals["FALL"];
    let flat = totals["FLAT"];

    assert!(rise > 0.0, "rising symbol earned {rise}");
    assert!(fall < 0.0, "falling symbol earned {fall}");
    assert!(flat.abs() < 1e-12, "flat symbol earned {flat}");

    // three +10% months per epoch, cubed
    let expected_rise = 20.0 * 3.0 * 0.001;
    assert!((rise - expected_rise).abs() < 1e-9);
}

#[test]
fn epoch_reports_expose_a_monotone_epsilon_schedule() {
    let records = scenario();

    let config = TrainerConfig {
        epochs: 15,
        seed: Some(99),
        epsilon_start: 0.5,
        epsilon_decay: 0.9,
        ..Default::default()
    };
    let mut trainer = Trainer::new(config).unwrap();

    let mut epsilons = Vec::new();
    trainer
        .train(&records, |report| epsilons.push(report.epsilon))
        .unwrap();

    assert_eq!(epsilons.len(), 15);
    for pair in epsilons.windows(2) {
        assert!(pair[1] < pair[0], "epsilon must decay every epoch");
    }
    assert!((epsilons[0] - 0.45).abs() < 1e-12);
}

#[test]
fn normalized_table_trains_without_incident() {
    let mut records = scenario();
    normalize_records(&mut records);

    let config = TrainerConfig {
        epochs: 5,
        seed: Some(7),
        ..Default::default()
    };
    let mut trainer = Trainer::new(config).unwrap();
    trainer
        .train(&records, |report| {
            assert!(report.mean_reward.is_finite());
        })
        .unwrap();

    for total in trainer.cumulative_reward().values() {
        assert!(total.is_finite());
    }
}

#[test]
fn decoupled_carryover_modes_also_train() {
    let records = scenario();

    // input-ignoring cells, state carried across symbol boundaries
    let config = TrainerConfig {
        epochs: 5,
        seed: Some(21),
        sensory_coupling: false,
        reset_state_on_symbol_change: false,
        ..Default::default()
    };
    let mut trainer = Trainer::new(config).unwrap();
    trainer.train(&records, |_| {}).unwrap();

    assert!(trainer.cumulative_reward()["RISE"] > 0.0);
    assert!(trainer.cumulative_reward()["FALL"] < 0.0);
}
