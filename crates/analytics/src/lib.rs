//! # Cadence Analytics Engine
//!
//! This crate derives performance metrics from a simulated
//! dollar-cost-averaging run. It acts as the "unbiased judge" of the system.
//!
//! ## Architectural Principles
//!
//! - **Pure logic crate:** it has no knowledge of price retrieval or
//!   simulation. It depends only on `core-types` and `schedule`.
//! - **Stateless calculation:** the `AnalyticsEngine` takes the simulated
//!   daily state as input and produces a `BacktestReport` as output. This
//!   makes it highly reliable and easy to test.
//!
//! ## Public API
//!
//! - `AnalyticsEngine`: the struct that contains the calculation logic.
//! - `BacktestReport`: the standardized result record for one asset.
//! - `AnalyticsError`: the specific error types this crate can return.

pub mod engine;
pub mod error;
pub mod report;

// Re-export the key components to create a clean, public-facing API.
pub use engine::AnalyticsEngine;
pub use error::AnalyticsError;
pub use report::{BacktestReport, StrategyStats};
