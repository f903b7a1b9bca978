use serde::Serialize;
use tracing::{debug, info};

use lotto_db::models::{Draw, PICK_COUNT};

use crate::config::EngineConfig;
use crate::history::History;
use crate::scorer::prize::{BirthdayAvoidance, PrizeAdjustment};
use crate::scorer::{pool_numbers, score_draws, top_pool};

/// Bilan des correspondances entre un pool et des tirages réels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestReport {
    /// `hit_distribution[h]` = nombre de tirages avec exactement `h` numéros dans le pool.
    pub hit_distribution: [u32; PICK_COUNT + 1],
    pub avg_hits: f64,
    pub hit4_plus_rate: f64,
    pub checked: usize,
    pub pool_size: usize,
}

impl BacktestReport {
    fn from_distribution(hit_distribution: [u32; PICK_COUNT + 1], pool_size: usize) -> Self {
        let checked: u32 = hit_distribution.iter().sum();
        let (avg_hits, hit4_plus_rate) = if checked == 0 {
            (0.0, 0.0)
        } else {
            let total: u32 = hit_distribution
                .iter()
                .enumerate()
                .map(|(h, &c)| h as u32 * c)
                .sum();
            let four_plus: u32 = hit_distribution[4..].iter().sum();
            (
                total as f64 / checked as f64,
                four_plus as f64 / checked as f64,
            )
        };
        Self {
            hit_distribution,
            avg_hits,
            hit4_plus_rate,
            checked: checked as usize,
            pool_size,
        }
    }
}

/// Nombre de points de coupe évalués par `backtest` pour cet historique.
pub fn backtest_steps(history: &History, warmup: usize) -> usize {
    history.len().saturating_sub(warmup.max(1))
}

pub fn backtest(history: &History, config: &EngineConfig) -> BacktestReport {
    backtest_with_progress(history, config, |_, _| {})
}

/// Rejoue le score à chaque point de coupe `i` (de `warmup` à la fin) en ne voyant que
/// `draws[i..]`, puis compte les numéros du tirage suivant (`draws[i - 1]`) présents dans
/// le pool. `on_step(fait, total)` est appelé après chaque point de coupe.
pub fn backtest_with_progress<F>(history: &History, config: &EngineConfig, mut on_step: F) -> BacktestReport
where
    F: FnMut(usize, usize),
{
    let prize = BirthdayAvoidance::new(config.weights.prize);
    backtest_draws(history.draws(), config, &prize, &mut on_step)
}

fn backtest_draws(
    draws: &[Draw],
    config: &EngineConfig,
    prize: &dyn PrizeAdjustment,
    on_step: &mut dyn FnMut(usize, usize),
) -> BacktestReport {
    let start = config.backtest_warmup.max(1);
    let total = draws.len().saturating_sub(start);
    let mut distribution = [0u32; PICK_COUNT + 1];

    for (step, i) in (start..draws.len()).enumerate() {
        let past = &draws[i..];
        if past.is_empty() {
            continue;
        }
        let scores = score_draws(past, config, prize);
        let pool = pool_numbers(&top_pool(&scores, config.pool_size));
        let hits = count_hits(&draws[i - 1].numbers, &pool);
        distribution[hits] += 1;
        on_step(step + 1, total);
    }

    let report = BacktestReport::from_distribution(distribution, config.pool_size);
    info!(
        checked = report.checked,
        avg_hits = report.avg_hits,
        hit4_plus = report.hit4_plus_rate,
        "back-test terminé"
    );
    report
}

/// Distribution des correspondances d'un pool fixe contre chaque tirage de l'historique.
pub fn replay_pool(history: &History, pool: &[u8]) -> BacktestReport {
    let mut distribution = [0u32; PICK_COUNT + 1];
    for draw in history.draws() {
        distribution[count_hits(&draw.numbers, pool)] += 1;
    }
    debug!(draws = history.len(), pool = pool.len(), "pool rejoué");
    BacktestReport::from_distribution(distribution, pool.len())
}

fn count_hits(numbers: &[u8; PICK_COUNT], pool: &[u8]) -> usize {
    numbers.iter().filter(|n| pool.contains(n)).count()
}
