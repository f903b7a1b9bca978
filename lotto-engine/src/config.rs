use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Poids des contributions additives du score. Chaque terme est borné par `poids × 100` ;
/// la somme n'a pas besoin de faire 1, la normalisation finale ramène tout sur [0, 100].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub gap: f64,
    pub recent: f64,
    pub trend: f64,
    pub frequency: f64,
    pub pair: f64,
    pub cycle_due: f64,
    pub prize: f64,
    /// Bonus fixe (en points bruts) pour chaque numéro du tout dernier tirage.
    pub carryover_bonus: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            gap: 0.25,
            recent: 0.20,
            trend: 0.15,
            frequency: 0.15,
            pair: 0.10,
            cycle_due: 0.10,
            prize: 0.15,
            carryover_bonus: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub weights: ScoreWeights,
    /// Fenêtre « récente » pour la fréquence HOT.
    pub recent_window: usize,
    /// Taille de chacune des deux fenêtres comparées pour la tendance.
    pub trend_window: usize,
    pub max_rising: usize,
    pub pool_size: usize,
    pub backtest_warmup: usize,
    pub cache_ttl_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            recent_window: 50,
            trend_window: 20,
            max_rising: 5,
            pool_size: 20,
            backtest_warmup: 50,
            cache_ttl_secs: 600,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        let w = &self.weights;
        let all = [
            ("gap", w.gap),
            ("recent", w.recent),
            ("trend", w.trend),
            ("frequency", w.frequency),
            ("pair", w.pair),
            ("cycle_due", w.cycle_due),
            ("prize", w.prize),
            ("carryover_bonus", w.carryover_bonus),
        ];
        for (name, value) in all {
            if !value.is_finite() {
                return Err(EngineError::InvalidConfig(format!("poids {name} non fini")));
            }
        }
        if self.pool_size < 6 || self.pool_size > 45 {
            return Err(EngineError::InvalidConfig(format!(
                "pool_size {} hors de [6, 45]",
                self.pool_size
            )));
        }
        if self.recent_window == 0 || self.trend_window == 0 {
            return Err(EngineError::InvalidConfig("fenêtre nulle".into()));
        }
        Ok(())
    }
}

pub fn save_config(config: &EngineConfig, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(path, json)?;
    Ok(())
}

pub fn load_config(path: &Path) -> Result<EngineConfig> {
    let json = std::fs::read_to_string(path)?;
    let config: EngineConfig = serde_json::from_str(&json)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.recent_window, 50);
        assert_eq!(config.pool_size, 20);
        assert!((config.weights.gap - 0.25).abs() < 1e-12);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{ "weights": { "gap": 1.2 }, "pool_size": 18 }"#;
        let config: EngineConfig = serde_json::from_str(json).unwrap();
        assert!((config.weights.gap - 1.2).abs() < 1e-12);
        assert!((config.weights.recent - 0.20).abs() < 1e-12);
        assert_eq!(config.pool_size, 18);
        assert_eq!(config.trend_window, 20);
    }

    #[test]
    fn test_invalid_pool_size_rejected() {
        let config = EngineConfig { pool_size: 3, ..EngineConfig::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.json");

        let mut config = EngineConfig::default();
        config.weights.prize = 0.0;
        save_config(&config, &path).unwrap();

        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config(&dir.path().join("absent.json"));
        assert!(matches!(result, Err(EngineError::ConfigIo(_))));
    }
}
