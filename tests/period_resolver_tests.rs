use chrono::{Days, Months, NaiveDate};
use stockchart_rs::core::period::IndexWindow;
use stockchart_rs::{PeriodSelection, PeriodToken, StockDataPoint, StockSeries};

fn daily_series(days: usize, start: NaiveDate) -> StockSeries {
    let points = (0..days)
        .map(|i| {
            let date = start.checked_add_days(Days::new(i as u64)).expect("valid date");
            StockDataPoint::new(date, 100.0, 102.0, 98.0, 100.0, 1000)
        })
        .collect();
    StockSeries::from_points(points)
}

#[test]
fn one_month_over_forty_days_ends_at_last_index() {
    let start = NaiveDate::from_ymd_opt(2023, 3, 1).expect("valid date");
    let series = daily_series(40, start);
    let last_date = series.last_date().expect("non-empty");

    let window = PeriodSelection::Preset(PeriodToken::OneMonth)
        .resolve(&series)
        .expect("non-empty series");

    assert_eq!(window.end, 39);
    let cutoff = last_date
        .checked_sub_months(Months::new(1))
        .expect("valid date");
    assert!(series.points()[window.start].time >= cutoff);
}

#[test]
fn every_preset_yields_a_non_empty_in_bounds_window() {
    let start = NaiveDate::from_ymd_opt(2015, 6, 15).expect("valid date");
    for len in [1_usize, 2, 40, 400, 2200] {
        let series = daily_series(len, start);
        for token in [
            PeriodToken::OneMonth,
            PeriodToken::ThreeMonths,
            PeriodToken::SixMonths,
            PeriodToken::OneYear,
            PeriodToken::FiveYears,
            PeriodToken::All,
        ] {
            let window = PeriodSelection::Preset(token)
                .resolve(&series)
                .expect("non-empty series");
            assert!(window.start <= window.end);
            assert_eq!(window.end, len - 1);
            assert!(window.len() >= 1);
        }
    }
}

#[test]
fn custom_bounds_reorder_and_clamp() {
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).expect("valid date");
    let series = daily_series(10, start);

    assert_eq!(
        PeriodSelection::Custom { start: 5, end: 2 }.resolve(&series),
        Some(IndexWindow { start: 2, end: 5 })
    );
    assert_eq!(
        PeriodSelection::Custom { start: -3, end: 999 }.resolve(&series),
        Some(IndexWindow { start: 0, end: 9 })
    );
}

#[test]
fn five_year_preset_trims_a_decade_of_data() {
    let start = NaiveDate::from_ymd_opt(2013, 1, 1).expect("valid date");
    let series = daily_series(3650, start);
    let window = PeriodSelection::Preset(PeriodToken::FiveYears)
        .resolve(&series)
        .expect("non-empty series");

    assert!(window.start > 0);
    let cutoff = series
        .last_date()
        .expect("non-empty")
        .checked_sub_months(Months::new(60))
        .expect("valid date");
    assert!(series.points()[window.start].time >= cutoff);
    assert!(series.points()[window.start - 1].time < cutoff);
}
