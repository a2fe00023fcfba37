use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One sample of an agent's cumulative simulated P&L
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PnlData {
    pub time: DateTime<Utc>,
    pub value: Decimal,
}

impl PnlData {
    pub fn new(time: DateTime<Utc>, value: Decimal) -> Self {
        Self { time, value }
    }

    /// The zero point every fresh or reset history starts from
    pub fn zero(time: DateTime<Utc>) -> Self {
        Self {
            time,
            value: Decimal::ZERO,
        }
    }
}
