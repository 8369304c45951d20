use chrono::{Days, NaiveDate};
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use stockchart_rs::api::Panel;
use stockchart_rs::core::indicators::{self, macd, rsi};
use stockchart_rs::{Dataset, IndicatorConfig, IndicatorKind, StockDataPoint};

fn daily_bars(count: usize) -> Vec<StockDataPoint> {
    let start = NaiveDate::from_ymd_opt(2015, 1, 1).expect("valid date");
    (0..count)
        .map(|i| {
            let date = start.checked_add_days(Days::new(i as u64)).expect("valid date");
            let close = 100.0 + (i as f64 / 9.0).sin() * 12.0 + (i % 17) as f64 * 0.3;
            StockDataPoint::new(date, close, close + 1.5, close - 1.5, close, 10_000)
        })
        .collect()
}

fn bench_rsi_5k(c: &mut Criterion) {
    let closes: Vec<f64> = daily_bars(5_000).iter().map(|bar| bar.close).collect();
    c.bench_function("rsi_5k", |b| {
        b.iter(|| rsi(black_box(&closes), black_box(14)))
    });
}

fn bench_macd_5k(c: &mut Criterion) {
    let closes: Vec<f64> = daily_bars(5_000).iter().map(|bar| bar.close).collect();
    c.bench_function("macd_5k", |b| {
        b.iter(|| macd(black_box(&closes), black_box(12), black_box(26), black_box(9)))
    });
}

fn bench_enrich_full_config_5k(c: &mut Criterion) {
    let bars = daily_bars(5_000);
    let mut config = IndicatorConfig::default();
    for kind in IndicatorKind::ALL {
        config.set_enabled(kind, true);
    }
    c.bench_function("enrich_full_config_5k", |b| {
        b.iter(|| indicators::enrich(black_box(&bars), black_box(&config)))
    });
}

fn bench_price_dataset_5k(c: &mut Criterion) {
    let bars = daily_bars(5_000);
    let mut config = IndicatorConfig::default();
    config.set_enabled(IndicatorKind::Sma, true);
    config.set_enabled(IndicatorKind::BollingerBands, true);
    c.bench_function("price_dataset_5k", |b| {
        b.iter(|| Dataset::build(black_box(Panel::Price), black_box(&bars), black_box(&config)))
    });
}

criterion_group!(
    benches,
    bench_rsi_5k,
    bench_macd_5k,
    bench_enrich_full_config_5k,
    bench_price_dataset_5k
);
criterion_main!(benches);
