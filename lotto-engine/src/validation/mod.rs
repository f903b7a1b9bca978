//! Validation a posteriori : rejeu historique du score et simulation de tirages.

pub mod backtest;
pub mod simulation;

pub use backtest::{backtest, backtest_steps, backtest_with_progress, replay_pool, BacktestReport};
pub use simulation::{hit4_plus_probability, hypergeometric_probability, simulate, SimulationReport};
