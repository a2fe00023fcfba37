//! Strategy Provider
//!
//! Predefined catalog, the `StrategyProvider` seam with a Gemini backend and
//! an offline template fallback, and cancellable generation requests.

pub mod catalog;
pub mod gemini;
pub mod provider;
pub mod request;

pub use catalog::{find_strategy, predefined_strategies};
pub use gemini::GeminiStrategyProvider;
pub use provider::{provider_from_config, StrategyProvider, TemplateStrategyProvider};
pub use request::GenerationRequest;
