//! Trading simulation
//!
//! - `generator`: the stochastic P&L step plus injectable randomness and clock
//! - `history`: bounded per-agent sample buffer
//! - `scheduler`: one cancellable periodic run per active agent

pub mod generator;
pub mod history;
pub mod scheduler;

pub use generator::{
    is_saturated, round_cents, Clock, PnlModel, RandomSource, RandomSourceFactory, SeededRandom,
    SeededRandomFactory, SequenceSource, SequenceSourceFactory, SystemClock,
};
pub use history::{PnlHistory, DEFAULT_HISTORY_CAP};
pub use scheduler::{RunId, SchedulerConfig, SimulationScheduler, StartOutcome, TickEvent};
