pub mod agent;
pub mod pnl;
pub mod strategy;

pub use agent::*;
pub use pnl::*;
pub use strategy::*;
