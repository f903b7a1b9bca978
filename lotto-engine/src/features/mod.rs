pub mod compute;
pub mod metrics;
pub mod report;

use lotto_db::models::{Draw, MAX_NUMBER};

use crate::config::EngineConfig;
use crate::history::latest_round;

/// Statistiques dérivées d'un numéro, recalculées à chaque appel.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct NumberStat {
    pub number: u8,
    pub frequency_overall: u32,
    pub frequency_recent: u32,
    pub gap_since_last_seen: u32,
    /// Cycle moyen ; `AVG_CYCLE_FALLBACK` si moins de deux apparitions.
    pub avg_cycle: f64,
    pub has_cycle: bool,
    pub trend_delta: i32,
    pub rising: bool,
    pub pair_bonus: u32,
}

/// Toutes les caractéristiques consommées par le score, pour les 45 numéros.
#[derive(Debug, Clone)]
pub struct FeatureSet {
    pub total_draws: usize,
    pub latest_round: u32,
    pub expected_frequency: f64,
    pub stats: Vec<NumberStat>,
    /// Numéros du tirage le plus récent (vide si historique vide).
    pub last_draw: Vec<u8>,
}

impl FeatureSet {
    /// `draws` du plus récent au plus ancien.
    pub fn extract(draws: &[Draw], config: &EngineConfig) -> Self {
        let frequency = compute::frequency(draws);
        let recent = compute::recent_frequency(draws, config.recent_window);
        let gaps = compute::last_seen_gaps(draws);
        let cycles = compute::cycle_means(draws);
        let trend = compute::trend_deltas(draws, config.trend_window);
        let rising = compute::rising_numbers(draws, config.trend_window, config.max_rising);
        let pairs = compute::pair_bonus(draws);

        let stats = (1..=MAX_NUMBER)
            .map(|number| {
                let i = (number - 1) as usize;
                NumberStat {
                    number,
                    frequency_overall: frequency[i],
                    frequency_recent: recent[i],
                    gap_since_last_seen: gaps[i],
                    avg_cycle: cycles[i].unwrap_or(compute::AVG_CYCLE_FALLBACK),
                    has_cycle: cycles[i].is_some(),
                    trend_delta: trend[i],
                    rising: rising.contains(&number),
                    pair_bonus: pairs[i],
                }
            })
            .collect();

        Self {
            total_draws: draws.len(),
            latest_round: latest_round(draws),
            expected_frequency: compute::expected_frequency(draws.len()),
            stats,
            last_draw: draws
                .first()
                .map(|d| metrics::distinct_numbers(&d.numbers))
                .unwrap_or_default(),
        }
    }

    pub fn stat(&self, number: u8) -> Option<&NumberStat> {
        self.stats.get((number as usize).checked_sub(1)?)
    }
}
