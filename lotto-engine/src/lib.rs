pub mod cache;
pub mod config;
pub mod error;
pub mod features;
pub mod generator;
pub mod history;
pub mod recommender;
pub mod scorer;
pub mod validation;

pub use config::{load_config, save_config, EngineConfig, ScoreWeights};
pub use error::{EngineError, Result};
pub use history::History;
