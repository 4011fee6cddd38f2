use crate::domain::market::DailyBar;
use serde::{Deserialize, Serialize};

const SHORT_WINDOW: usize = 7;
const LONG_WINDOW: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Up,
    Down,
    Sideways,
    Undetermined,
}

impl Trend {
    pub fn label_pt(self) -> &'static str {
        match self {
            Trend::Up => "Alta",
            Trend::Down => "Baixa",
            Trend::Sideways => "Lateral",
            Trend::Undetermined => "Indeterminada",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalSummary {
    pub symbol: String,
    pub first_date: chrono::NaiveDate,
    pub last_date: chrono::NaiveDate,
    pub days: usize,
    pub last_close: f64,
    /// Percent change of the latest close against the previous one, two decimals.
    pub change_pct: f64,
    pub mean_7d: Option<f64>,
    pub mean_30d: Option<f64>,
    pub high_30d: Option<f64>,
    pub low_30d: Option<f64>,
    pub mean_volume_30d: Option<u64>,
    pub trend: Trend,
}

impl TechnicalSummary {
    /// Needs at least two bars; order of `bars` does not matter.
    pub fn from_bars(symbol: &str, bars: &[DailyBar]) -> Option<Self> {
        if bars.len() < 2 {
            return None;
        }

        let mut sorted: Vec<&DailyBar> = bars.iter().collect();
        sorted.sort_by(|a, b| b.date.cmp(&a.date));

        let last = sorted[0];
        let prev = sorted[1];
        let change_pct = if prev.close != 0.0 {
            round2((last.close - prev.close) / prev.close * 100.0)
        } else {
            0.0
        };

        let closes: Vec<f64> = sorted.iter().map(|b| b.close).collect();

        let mean_7d = (sorted.len() >= SHORT_WINDOW).then(|| round2(mean(&closes[..SHORT_WINDOW])));

        let long = (sorted.len() >= LONG_WINDOW).then(|| &sorted[..LONG_WINDOW]);
        let mean_30d = long.map(|_| round2(mean(&closes[..LONG_WINDOW])));
        let high_30d = long.map(|w| round2(w.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max)));
        let low_30d = long.map(|w| round2(w.iter().map(|b| b.low).fold(f64::INFINITY, f64::min)));
        let mean_volume_30d =
            long.map(|w| w.iter().map(|b| b.volume).sum::<u64>() / LONG_WINDOW as u64);

        let trend = match (mean_7d, mean_30d) {
            (Some(m7), Some(m30)) if last.close > m7 && last.close > m30 => Trend::Up,
            (Some(m7), Some(m30)) if last.close < m7 && last.close < m30 => Trend::Down,
            (Some(_), Some(_)) => Trend::Sideways,
            _ => Trend::Undetermined,
        };

        Some(Self {
            symbol: symbol.to_string(),
            first_date: sorted[sorted.len() - 1].date,
            last_date: last.date,
            days: sorted.len(),
            last_close: last.close,
            change_pct,
            mean_7d,
            mean_30d,
            high_30d,
            low_30d,
            mean_volume_30d,
            trend,
        })
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    // Oldest first, one bar per day, closes given in chronological order.
    fn bars(closes: &[f64]) -> Vec<DailyBar> {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| DailyBar {
                date: start + chrono::Duration::days(i as i64),
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 100,
            })
            .collect()
    }

    #[test]
    fn needs_two_bars() {
        assert!(TechnicalSummary::from_bars("AAPL", &bars(&[1.0])).is_none());
        assert!(TechnicalSummary::from_bars("AAPL", &[]).is_none());
    }

    #[test]
    fn short_history_is_undetermined() {
        let s = TechnicalSummary::from_bars("AAPL", &bars(&[100.0, 102.0])).unwrap();
        assert_eq!(s.last_close, 102.0);
        assert_eq!(s.change_pct, 2.0);
        assert_eq!(s.mean_7d, None);
        assert_eq!(s.trend, Trend::Undetermined);
        assert_eq!(s.days, 2);
    }

    #[test]
    fn rising_series_trends_up() {
        let closes: Vec<f64> = (1..=30).map(|i| i as f64).collect();
        let s = TechnicalSummary::from_bars("NVDA", &bars(&closes)).unwrap();

        assert_eq!(s.mean_7d, Some(27.0));
        assert_eq!(s.mean_30d, Some(15.5));
        assert_eq!(s.high_30d, Some(31.0));
        assert_eq!(s.low_30d, Some(0.0));
        assert_eq!(s.mean_volume_30d, Some(100));
        assert_eq!(s.trend, Trend::Up);
        assert_eq!(s.first_date, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    }

    #[test]
    fn falling_series_trends_down() {
        let closes: Vec<f64> = (1..=30).rev().map(|i| i as f64).collect();
        let s = TechnicalSummary::from_bars("INTC", &bars(&closes)).unwrap();
        assert_eq!(s.trend, Trend::Down);
        assert_eq!(s.trend.label_pt(), "Baixa");
    }

    #[test]
    fn input_order_does_not_matter() {
        let mut b = bars(&[10.0, 11.0]);
        b.reverse();
        let s = TechnicalSummary::from_bars("X", &b).unwrap();
        assert_eq!(s.last_close, 11.0);
    }
}
