//! Plain-text tables for indicator and bar series
//!
//! Rows read `Date | value...` with values at four decimals. Nothing here
//! feeds back into the numeric code.

use crate::indicators::{IndicatorPoint, MacdPoint};
use crate::series::percent_returns;
use crate::Ohlc;

/// Two-column table, `title` heads the value column (e.g. `SMA(20)`)
pub fn indicator_table(title: &str, points: &[IndicatorPoint]) -> String {
    let mut out = format!("Date       | {title}\n-----------|-----------\n");
    for p in points {
        out.push_str(&format!("{:<10} | {:.4}\n", p.date, p.value));
    }
    out
}

pub fn macd_table(points: &[MacdPoint]) -> String {
    let mut out = String::from("Date       | MACD     | Signal   | Hist\n-----------|----------|----------|----------\n");
    for p in points {
        out.push_str(&format!("{:<10} | {:.4} | {:.4} | {:.4}\n", p.date, p.macd, p.signal, p.histogram));
    }
    out
}

/// Bars with a percent-change column derived from [`percent_returns`]
pub fn ohlc_table<T: Ohlc>(bars: &[T]) -> String {
    let mut out = String::from(
        "Date       | Open     | High     | Low      | Close    | % Return\n\
         -----------|----------|----------|----------|----------|----------\n",
    );
    for (bar, ret) in bars.iter().zip(percent_returns(bars)) {
        out.push_str(&format!(
            "{:<10} | {:8.4} | {:8.4} | {:8.4} | {:8.4} | {:8.2}%\n",
            bar.date(),
            bar.open(),
            bar.high(),
            bar.low(),
            bar.close(),
            (ret.value - 1.0) * 100.0
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Bar;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    #[test]
    fn test_indicator_table() {
        let points = [
            IndicatorPoint { date: day(2), value: 101.23456 },
            IndicatorPoint { date: day(3), value: 7.0 },
        ];
        let table = indicator_table("SMA(2)", &points);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines[0], "Date       | SMA(2)");
        assert_eq!(lines[2], "2025-06-02 | 101.2346");
        assert_eq!(lines[3], "2025-06-03 | 7.0000");
    }

    #[test]
    fn test_macd_table() {
        let points = [MacdPoint { date: day(2), macd: 1.5, signal: 1.0, histogram: 0.5 }];
        let table = macd_table(&points);
        assert!(table.ends_with("2025-06-02 | 1.5000 | 1.0000 | 0.5000\n"));
    }

    #[test]
    fn test_ohlc_table_returns_column() {
        let bars = [
            Bar::new(day(2), 10.0, 11.0, 9.0, 10.0),
            Bar::new(day(3), 10.0, 12.0, 9.5, 11.0),
        ];
        let table = ohlc_table(&bars);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with("-----------|"));
        assert_eq!(lines[2], "2025-06-02 |  10.0000 |  11.0000 |   9.0000 |  10.0000 |     0.00%");
        assert_eq!(lines[3], "2025-06-03 |  10.0000 |  12.0000 |   9.5000 |  11.0000 |    10.00%");
    }

    #[test]
    fn test_empty_tables_keep_header() {
        assert_eq!(indicator_table("RSI(14)", &[]).lines().count(), 2);
        assert_eq!(macd_table(&[]).lines().count(), 2);
    }
}
