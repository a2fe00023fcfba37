//! Bounded P&L history
//!
//! Append-only, time-ordered samples for one agent. Once the cap is exceeded
//! the oldest samples are evicted first.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;

use crate::domain::PnlData;

/// Maximum retained samples per agent
pub const DEFAULT_HISTORY_CAP: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PnlHistory {
    points: VecDeque<PnlData>,
    #[serde(skip)]
    cap: usize,
}

impl PnlHistory {
    /// History holding the single zero point at `now`
    pub fn new(cap: usize, now: DateTime<Utc>) -> Self {
        let cap = cap.max(1);
        let mut points = VecDeque::with_capacity(cap);
        points.push_back(PnlData::zero(now));
        Self { points, cap }
    }

    /// Append a sample, evicting from the front past the cap.
    ///
    /// A sample stamped earlier than the newest retained one is clamped to
    /// that timestamp so the sequence stays non-decreasing in time.
    pub fn push(&mut self, mut point: PnlData) {
        if let Some(last) = self.points.back() {
            if point.time < last.time {
                point.time = last.time;
            }
        }
        self.points.push_back(point);
        while self.points.len() > self.cap {
            self.points.pop_front();
        }
    }

    /// Replace everything with a single zero point at `now`
    pub fn reset(&mut self, now: DateTime<Utc>) {
        self.points.clear();
        self.points.push_back(PnlData::zero(now));
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn latest(&self) -> Option<&PnlData> {
        self.points.back()
    }

    /// Oldest first
    pub fn iter(&self) -> impl Iterator<Item = &PnlData> + '_ {
        self.points.iter()
    }

    pub fn to_vec(&self) -> Vec<PnlData> {
        self.points.iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal::Decimal;

    fn point(base: DateTime<Utc>, offset_ms: i64, value: i64) -> PnlData {
        PnlData::new(base + Duration::milliseconds(offset_ms), Decimal::from(value))
    }

    #[test]
    fn test_starts_with_zero_point() {
        let now = Utc::now();
        let history = PnlHistory::new(DEFAULT_HISTORY_CAP, now);
        assert_eq!(history.to_vec(), vec![PnlData::zero(now)]);
    }

    #[test]
    fn test_cap_evicts_oldest_first() {
        let base = Utc::now();
        let mut history = PnlHistory::new(DEFAULT_HISTORY_CAP, base);
        for i in 1..=250 {
            history.push(point(base, i * 500, i));
        }

        assert_eq!(history.len(), 100);
        let values: Vec<Decimal> = history.iter().map(|p| p.value).collect();
        assert_eq!(values.first(), Some(&Decimal::from(151)));
        assert_eq!(values.last(), Some(&Decimal::from(250)));
    }

    #[test]
    fn test_times_stay_non_decreasing() {
        let base = Utc::now();
        let mut history = PnlHistory::new(10, base);
        history.push(point(base, 1_000, 1));
        history.push(point(base, 500, 2)); // clock stepped back

        let times: Vec<_> = history.iter().map(|p| p.time).collect();
        assert!(times.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(history.latest().unwrap().value, Decimal::from(2));
    }

    #[test]
    fn test_reset_replaces_everything() {
        let base = Utc::now();
        let mut history = PnlHistory::new(10, base);
        for i in 1..=5 {
            history.push(point(base, i * 10, i));
        }
        let later = base + Duration::seconds(5);
        history.reset(later);

        assert_eq!(history.to_vec(), vec![PnlData::zero(later)]);
    }

    #[test]
    fn test_zero_cap_is_clamped() {
        let base = Utc::now();
        let mut history = PnlHistory::new(0, base);
        history.push(point(base, 10, 7));
        assert_eq!(history.len(), 1);
        assert_eq!(history.cap(), 1);
    }
}
