//! P&L generator
//!
//! Pure mapping from `(previous pnl, balance, risk level, uniform draw)` to
//! the next P&L sample. Randomness and time are injected so runs can be
//! replayed exactly.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::domain::{AgentId, PnlData, RiskLevel};

/// Random-walk parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PnlModel {
    /// Subtracted from the uniform draw; below 0.5 gives a positive drift
    pub drift_bias: Decimal,
    /// Fraction of balance moved per unit of (draw - bias)
    pub volatility_scale: Decimal,
}

impl Default for PnlModel {
    fn default() -> Self {
        Self {
            drift_bias: dec!(0.48),
            volatility_scale: dec!(0.0005),
        }
    }
}

impl PnlModel {
    /// Unrounded change for one tick: `(U - b) * balance * k * multiplier`.
    ///
    /// Draws outside `[0, 1]` are clamped; a non-finite draw yields zero.
    /// The draw is quantized to 12 places so the product keeps full precision.
    /// Saturates at `Decimal::MAX` / `Decimal::MIN` instead of overflowing.
    pub fn delta(&self, balance: Decimal, risk: RiskLevel, draw: f64) -> Decimal {
        let draw = Decimal::from_f64(draw.clamp(0.0, 1.0))
            .map(|d| d.round_dp(12))
            .unwrap_or(self.drift_bias);
        (draw - self.drift_bias)
            .saturating_mul(balance)
            .saturating_mul(self.volatility_scale)
            .saturating_mul(risk.multiplier())
    }

    /// Next sample, rounded to cents
    pub fn next_point(
        &self,
        previous: Decimal,
        balance: Decimal,
        risk: RiskLevel,
        draw: f64,
        time: DateTime<Utc>,
    ) -> PnlData {
        let value = round_cents(previous.saturating_add(self.delta(balance, risk, draw)));
        PnlData::new(time, value)
    }
}

/// True once a value has been pinned to the representable range
pub fn is_saturated(value: Decimal) -> bool {
    value == Decimal::MAX || value == Decimal::MIN
}

pub fn round_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Source of uniform draws in `[0, 1)`
pub trait RandomSource: Send {
    fn next_unit(&mut self) -> f64;
}

/// `StdRng`-backed source, reproducible when seeded
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// Replays a fixed list of draws, cycling when exhausted
#[derive(Debug, Clone)]
pub struct SequenceSource {
    draws: Vec<f64>,
    cursor: usize,
}

impl SequenceSource {
    pub fn new(draws: Vec<f64>) -> Self {
        Self { draws, cursor: 0 }
    }

    pub fn constant(draw: f64) -> Self {
        Self::new(vec![draw])
    }
}

impl RandomSource for SequenceSource {
    fn next_unit(&mut self) -> f64 {
        if self.draws.is_empty() {
            return 0.5;
        }
        let draw = self.draws[self.cursor % self.draws.len()];
        self.cursor += 1;
        draw
    }
}

/// Hands every started simulation run its own random source
pub trait RandomSourceFactory: Send + Sync {
    fn source_for(&self, agent_id: &AgentId) -> Box<dyn RandomSource>;
}

/// One `StdRng` per run. With a base seed the streams are reproducible
/// (derived from the seed and the order in which runs start); without one
/// each run is seeded from OS entropy.
#[derive(Debug, Default)]
pub struct SeededRandomFactory {
    base_seed: Option<u64>,
    issued: AtomicU64,
}

impl SeededRandomFactory {
    pub fn new(base_seed: Option<u64>) -> Self {
        Self {
            base_seed,
            issued: AtomicU64::new(0),
        }
    }
}

impl RandomSourceFactory for SeededRandomFactory {
    fn source_for(&self, _agent_id: &AgentId) -> Box<dyn RandomSource> {
        match self.base_seed {
            Some(base) => {
                let n = self.issued.fetch_add(1, Ordering::Relaxed);
                Box::new(SeededRandom::from_seed(
                    base.wrapping_add(n.wrapping_mul(0x9E37_79B9_7F4A_7C15)),
                ))
            }
            None => Box::new(SeededRandom::from_entropy()),
        }
    }
}

/// Every run replays the same fixed draws
#[derive(Debug, Clone)]
pub struct SequenceSourceFactory {
    draws: Vec<f64>,
}

impl SequenceSourceFactory {
    pub fn new(draws: Vec<f64>) -> Self {
        Self { draws }
    }

    pub fn constant(draw: f64) -> Self {
        Self::new(vec![draw])
    }
}

impl RandomSourceFactory for SequenceSourceFactory {
    fn source_for(&self, _agent_id: &AgentId) -> Box<dyn RandomSource> {
        Box::new(SequenceSource::new(self.draws.clone()))
    }
}

/// Timestamp source for samples and resets
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
