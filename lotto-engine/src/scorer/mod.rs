pub mod prize;

use serde::Serialize;
use tracing::debug;

use lotto_db::models::{Draw, MAX_NUMBER};

use crate::config::EngineConfig;
use crate::features::FeatureSet;
use crate::history::History;
use prize::{BirthdayAvoidance, PrizeAdjustment};

/// Score attribué quand tous les scores bruts sont égaux (ou historique vide).
pub const NEUTRAL_SCORE: f64 = 50.0;
/// Un numéro est « dû » quand son écart atteint cette fraction de son cycle moyen.
pub const CYCLE_DUE_RATIO: f64 = 0.8;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumberScore {
    pub number: u8,
    /// Score normalisé dans [0, 100].
    pub score: f64,
    pub raw_score: f64,
    pub frequency: u32,
    pub recent_frequency: u32,
    pub last_appeared_gap: u32,
    pub avg_cycle: f64,
    pub trend_delta: i32,
    pub pair_bonus: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PoolEntry {
    pub number: u8,
    pub score: f64,
}

/// Scores des 45 numéros, triés par score décroissant puis numéro croissant.
pub fn compute_scores(history: &History, config: &EngineConfig) -> Vec<NumberScore> {
    let prize = BirthdayAvoidance::new(config.weights.prize);
    score_draws(history.draws(), config, &prize)
}

/// Variante avec un ajustement de gains fourni par l'appelant.
pub fn compute_scores_with(
    history: &History,
    config: &EngineConfig,
    prize: &dyn PrizeAdjustment,
) -> Vec<NumberScore> {
    score_draws(history.draws(), config, prize)
}

/// `draws` du plus récent au plus ancien ; utilisé directement par le back-test
/// sur des sous-tranches de l'historique.
pub(crate) fn score_draws(
    draws: &[Draw],
    config: &EngineConfig,
    prize: &dyn PrizeAdjustment,
) -> Vec<NumberScore> {
    let features = FeatureSet::extract(draws, config);

    if draws.is_empty() {
        debug!("historique vide, scores neutres");
        return features
            .stats
            .iter()
            .map(|s| NumberScore {
                number: s.number,
                score: NEUTRAL_SCORE,
                raw_score: 0.0,
                frequency: 0,
                recent_frequency: 0,
                last_appeared_gap: 0,
                avg_cycle: s.avg_cycle,
                trend_delta: 0,
                pair_bonus: 0,
            })
            .collect();
    }

    let w = &config.weights;
    let max_gap = features.stats.iter().map(|s| s.gap_since_last_seen).max().unwrap_or(0);
    let max_recent = features.stats.iter().map(|s| s.frequency_recent).max().unwrap_or(0);
    let max_pair = features.stats.iter().map(|s| s.pair_bonus).max().unwrap_or(0);
    let expected = features.expected_frequency;

    let raw: Vec<f64> = features
        .stats
        .iter()
        .map(|s| {
            let mut total = 0.0;
            total += w.gap * 100.0 * ratio(s.gap_since_last_seen, max_gap);
            total += w.recent * 100.0 * ratio(s.frequency_recent, max_recent);
            if s.rising {
                total += w.trend * 100.0;
            }
            total += w.frequency * 100.0 * closeness(s.frequency_overall as f64, expected);
            total += w.pair * 100.0 * ratio(s.pair_bonus, max_pair);
            if s.has_cycle && s.gap_since_last_seen as f64 >= CYCLE_DUE_RATIO * s.avg_cycle {
                total += w.cycle_due * 100.0;
            }
            total += prize.adjust(s.number);
            if features.last_draw.contains(&s.number) {
                total += w.carryover_bonus;
            }
            total
        })
        .collect();

    let normalized = normalize(&raw);

    let mut scores: Vec<NumberScore> = features
        .stats
        .iter()
        .zip(raw.iter().zip(normalized))
        .map(|(s, (&raw_score, score))| NumberScore {
            number: s.number,
            score,
            raw_score,
            frequency: s.frequency_overall,
            recent_frequency: s.frequency_recent,
            last_appeared_gap: s.gap_since_last_seen,
            avg_cycle: s.avg_cycle,
            trend_delta: s.trend_delta,
            pair_bonus: s.pair_bonus,
        })
        .collect();

    sort_scores(&mut scores);
    debug!(
        draws = draws.len(),
        prize = prize.name(),
        best = scores.first().map(|s| s.number),
        "scores calculés"
    );
    scores
}

fn ratio(value: u32, max: u32) -> f64 {
    if max == 0 {
        0.0
    } else {
        value as f64 / max as f64
    }
}

/// Proximité de la fréquence observée à la fréquence attendue, dans [0, 1].
pub fn closeness(frequency: f64, expected: f64) -> f64 {
    if expected <= 0.0 {
        return 0.0;
    }
    (1.0 - (frequency - expected).abs() / expected).max(0.0)
}

/// Min-max vers [0, 100] ; tout à 50 si l'étendue est nulle.
fn normalize(raw: &[f64]) -> Vec<f64> {
    let min = raw.iter().copied().fold(f64::INFINITY, f64::min);
    let max = raw.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    if !range.is_finite() || range <= f64::EPSILON {
        return vec![NEUTRAL_SCORE; raw.len()];
    }
    raw.iter().map(|&r| (r - min) / range * 100.0).collect()
}

fn sort_scores(scores: &mut [NumberScore]) {
    scores.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.number.cmp(&b.number)));
}

/// Les `size` premiers numéros du classement.
pub fn top_pool(scores: &[NumberScore], size: usize) -> Vec<PoolEntry> {
    scores
        .iter()
        .take(size.min(MAX_NUMBER as usize))
        .map(|s| PoolEntry { number: s.number, score: s.score })
        .collect()
}

pub fn pool_numbers(pool: &[PoolEntry]) -> Vec<u8> {
    pool.iter().map(|p| p.number).collect()
}
