//! Integration tests for indicators, derived series and study requests.

use chrono::{Days, NaiveDate};
use trendkit::indicators::{Ema, Sma};
use trendkit::prelude::*;
use trendkit::table;

/// Simple test bar structure
#[derive(Debug, Clone, Copy)]
struct TestBar {
    d: NaiveDate,
    o: f64,
    h: f64,
    l: f64,
    c: f64,
}

impl TestBar {
    fn new(day: u64, o: f64, h: f64, l: f64, c: f64) -> Self {
        let d = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap() + Days::new(day);
        Self { d, o, h, l, c }
    }
}

impl Ohlc for TestBar {
    fn date(&self) -> NaiveDate {
        self.d
    }

    fn open(&self) -> f64 {
        self.o
    }

    fn high(&self) -> f64 {
        self.h
    }

    fn low(&self) -> f64 {
        self.l
    }

    fn close(&self) -> f64 {
        self.c
    }
}

/// Closes 100, 101, ... one per day
fn make_uptrend(n: usize) -> Vec<TestBar> {
    (0..n)
        .map(|i| {
            let c = 100.0 + i as f64;
            TestBar::new(i as u64, c - 0.5, c + 1.0, c - 1.0, c)
        })
        .collect()
}

/// Deterministic zig-zag around 100
fn make_choppy(n: usize) -> Vec<TestBar> {
    (0..n)
        .map(|i| {
            let c = 100.0 + ((i * 7 + 3) % 11) as f64 - 5.0;
            TestBar::new(i as u64, c, c + 2.0, c - 2.0, c)
        })
        .collect()
}

// ============================================================
// MOVING AVERAGES
// ============================================================

#[test]
fn test_sma_rising_closes() {
    let bars = make_uptrend(20);
    let out = sma(&bars, 5);

    assert_eq!(out.len(), 16);
    assert_eq!(out[0].date, bars[4].d);
    let last = out.last().unwrap();
    assert_eq!(last.date, bars[19].d);
    assert!((last.value - 117.0).abs() < 1e-12);
}

#[test]
fn test_short_input_is_empty() {
    let bars = make_uptrend(4);
    assert!(sma(&bars, 5).is_empty());
    assert!(ema(&bars, 5).is_empty());
    assert!(rsi(&bars, 4).is_empty());
    assert!(detrended_price_oscillator(&bars, 5).is_empty());
    assert!(macd(&bars, 1, 2, 3).is_empty());
}

#[test]
fn test_zero_period_is_empty() {
    let bars = make_uptrend(10);
    assert!(sma(&bars, 0).is_empty());
    assert!(ema(&bars, 0).is_empty());
    assert!(rsi(&bars, 0).is_empty());
    assert!(macd(&bars, 0, 3, 2).is_empty());
}

#[test]
fn test_ema_seeded_with_sma() {
    let bars = make_uptrend(10);
    let out = ema(&bars, 3);
    assert_eq!(out.len(), 8);
    // seed = mean(100, 101, 102); a linear series keeps the EMA one bar behind
    assert!((out[0].value - 101.0).abs() < 1e-12);
    for (p, bar) in out.iter().zip(&bars[2..]) {
        assert!((p.value - (bar.c - 1.0)).abs() < 1e-9);
    }
}

#[test]
fn test_lazy_iterators_match_eager() {
    let bars = make_choppy(40);
    let lazy: Vec<IndicatorPoint> = Sma::new(&bars, 7).collect();
    assert_eq!(lazy, sma(&bars, 7));
    assert_eq!(Sma::new(&bars, 7).len(), 34);

    let lazy: Vec<IndicatorPoint> = Ema::new(&bars, 7).collect();
    assert_eq!(lazy, ema(&bars, 7));
}

// ============================================================
// MOMENTUM
// ============================================================

#[test]
fn test_rsi_rising_closes() {
    let bars = make_uptrend(20);
    let out = rsi(&bars, 14);
    assert_eq!(out.len(), 6);
    assert_eq!(out[0].date, bars[14].d);
    assert!(out.iter().all(|p| p.value == 100.0));
}

#[test]
fn test_rsi_choppy_in_bounds() {
    let out = rsi(&make_choppy(60), 14);
    assert_eq!(out.len(), 46);
    assert!(out.iter().all(|p| (0.0..=100.0).contains(&p.value)));
    assert!(out.iter().any(|p| p.value < 100.0));
}

#[test]
fn test_macd_default_periods() {
    let bars = make_choppy(60);
    let out = macd(&bars, 12, 26, 9);

    // first signal value needs 26 + 9 - 1 bars
    assert_eq!(out.len(), 60 - 33);
    assert_eq!(out[0].date, bars[33].d);
    assert!(out.iter().all(|p| p.histogram == p.macd - p.signal));
    assert!(macd(&bars[..34], 12, 26, 9).is_empty());
}

// ============================================================
// DETRENDED PRICE OSCILLATOR
// ============================================================

#[test]
fn test_dpo_aligned_to_sma() {
    let bars = make_choppy(30);
    let averages = sma(&bars, 10);
    let out = detrended_price_oscillator(&bars, 10);

    assert_eq!(out.len(), averages.len());
    for ((p, avg), bar) in out.iter().zip(&averages).zip(&bars[9..]) {
        assert_eq!(p.date, avg.date);
        assert!((p.value - (bar.c - avg.value)).abs() < 1e-12);
    }
}

// ============================================================
// DERIVED SERIES
// ============================================================

#[test]
fn test_ratio_of_two_tickers() {
    let num = make_uptrend(5);
    let den: Vec<TestBar> = (0..5).filter(|&i| i != 2).map(|i| TestBar::new(i, 50.0, 50.0, 50.0, 50.0)).collect();

    let ratio = ratio_series(&num, &den);
    assert_eq!(ratio.len(), 4);
    assert!(ratio.iter().all(|b| b.date != num[2].d));
    assert!((ratio[0].close - 2.0).abs() < 1e-12);

    let returns = percent_returns(&ratio);
    assert_eq!(returns[0].value, 1.0);
    assert!((returns[1].value - 101.0 / 100.0).abs() < 1e-12);
}

#[test]
fn test_ratio_symbol_parsing() {
    let symbol: RatioSymbol = "XLE/XLK".parse().unwrap();
    assert_eq!(symbol.numerator, "XLE");
    assert!(matches!("XLE".parse::<RatioSymbol>(), Err(AnalysisError::InvalidRatioSymbol(_))));
}

// ============================================================
// REQUESTS, ENGINE AND TABLES
// ============================================================

#[test]
fn test_requests_drive_engine() {
    let engine = EngineBuilder::new()
        .with_requests("SMA:5:overlay, RSI:14:panel, DETRENDED:5, MACD")
        .unwrap()
        .validate_data(true)
        .build()
        .unwrap();

    let report = engine.run(&make_choppy(50)).unwrap();
    let labels: Vec<&str> = report.studies.iter().map(|s| s.label.as_str()).collect();
    assert_eq!(labels, vec!["SMA(5)", "RSI(14)", "DPO(5)", "MACD(12,26,9)"]);
    assert_eq!(report.studies[1].display, Pane::Panel);
    assert_eq!(report.studies[2].display, Pane::Overlay);

    match report.get("MACD(12,26,9)") {
        Some(StudyOutput::Macd(points)) => assert_eq!(points.len(), 17),
        other => panic!("unexpected output: {other:?}"),
    }
}

#[test]
fn test_unknown_request_rejected() {
    let err = StudyRequest::parse_list("SMA:5,BOLLINGER:20").unwrap_err();
    assert_eq!(err, AnalysisError::UnsupportedIndicator("BOLLINGER".to_string()));
}

#[test]
fn test_tables() {
    let bars = make_uptrend(6);
    let text = table::indicator_table("SMA(5)", &sma(&bars, 5));
    assert_eq!(text.lines().nth(2), Some("2024-05-05 | 102.0000"));

    let text = table::ohlc_table(&bars);
    assert_eq!(text.lines().count(), 8);
    assert!(text.lines().nth(3).unwrap().ends_with("1.00%"));
}

#[test]
fn test_parallel_across_tickers() {
    let engine = EngineBuilder::new().with_indicator_defaults().with_trend_defaults().build().unwrap();

    let a = make_uptrend(80);
    let b = make_choppy(80);
    let c = make_choppy(10);
    let instruments: Vec<(&str, &[TestBar])> = vec![("UP", &a), ("CHOP", &b), ("SHORT", &c)];

    let (results, failures) = analyze_parallel(&engine, instruments);
    assert_eq!(results.len(), 3);
    assert!(failures.is_empty());

    let short = results.iter().find(|r| r.symbol == "SHORT").unwrap();
    assert_eq!(short.report.bar_count, 10);
    // every indicator and the Fibonacci engine need more history than 10 bars
    assert!(short.report.studies.iter().filter(|s| s.label != "HULL").all(|s| s.output.is_empty()));
}
