use lotto_db::models::{Draw, MAX_NUMBER, PICK_COUNT};

use super::metrics::{distinct_numbers, range_bucket, RANGE_BUCKETS};
use crate::history::latest_round;

/// Cycle moyen théorique d'un tirage 6/45, utilisé quand un numéro est sorti moins de deux fois.
pub const AVG_CYCLE_FALLBACK: f64 = 7.5;

const SIZE: usize = MAX_NUMBER as usize;

// Toutes les fonctions attendent des tirages du plus récent au plus ancien (ordre de `History`)
// et renvoient des vecteurs de 45 cases : l'indice i correspond au numéro i + 1.

fn index_of(number: u8) -> usize {
    (number - 1) as usize
}

pub fn frequency(draws: &[Draw]) -> Vec<u32> {
    let mut counts = vec![0u32; SIZE];
    for draw in draws {
        for n in distinct_numbers(&draw.numbers) {
            counts[index_of(n)] += 1;
        }
    }
    counts
}

/// Fréquence sur les `window` tirages les plus récents, fenêtre tronquée sans erreur.
pub fn recent_frequency(draws: &[Draw], window: usize) -> Vec<u32> {
    frequency(&draws[..window.min(draws.len())])
}

/// Fréquence moyenne attendue par numéro : `tirages × 6 / 45`.
pub fn expected_frequency(total_draws: usize) -> f64 {
    (total_draws * PICK_COUNT) as f64 / SIZE as f64
}

/// Tours écoulés depuis la dernière sortie. Un numéro jamais sorti reçoit la sentinelle
/// `dernier tour − 0`, soit le dernier tour lui-même.
pub fn last_seen_gaps(draws: &[Draw]) -> Vec<u32> {
    let latest = latest_round(draws);
    let mut gaps: Vec<Option<u32>> = vec![None; SIZE];
    for draw in draws {
        for n in distinct_numbers(&draw.numbers) {
            let slot = &mut gaps[index_of(n)];
            if slot.is_none() {
                *slot = Some(latest.saturating_sub(draw.round));
            }
        }
    }
    gaps.into_iter().map(|g| g.unwrap_or(latest)).collect()
}

/// Moyenne des écarts entre apparitions successives (ordre chronologique).
/// `None` pour un numéro apparu 0 ou 1 fois.
pub fn cycle_means(draws: &[Draw]) -> Vec<Option<f64>> {
    let mut last_round: Vec<Option<u32>> = vec![None; SIZE];
    let mut total = vec![0u64; SIZE];
    let mut count = vec![0u32; SIZE];

    for draw in draws.iter().rev() {
        for n in distinct_numbers(&draw.numbers) {
            let idx = index_of(n);
            if let Some(prev) = last_round[idx] {
                total[idx] += draw.round.saturating_sub(prev) as u64;
                count[idx] += 1;
            }
            last_round[idx] = Some(draw.round);
        }
    }

    (0..SIZE)
        .map(|i| {
            if count[i] > 0 {
                Some(total[i] as f64 / count[i] as f64)
            } else {
                None
            }
        })
        .collect()
}

pub fn average_cycles(draws: &[Draw]) -> Vec<f64> {
    cycle_means(draws)
        .into_iter()
        .map(|c| c.unwrap_or(AVG_CYCLE_FALLBACK))
        .collect()
}

/// Cycle moyen tous numéros confondus.
pub fn global_average_cycle(draws: &[Draw]) -> f64 {
    let mut last_round: Vec<Option<u32>> = vec![None; SIZE];
    let mut total = 0u64;
    let mut count = 0u64;
    for draw in draws.iter().rev() {
        for n in distinct_numbers(&draw.numbers) {
            let idx = index_of(n);
            if let Some(prev) = last_round[idx] {
                total += draw.round.saturating_sub(prev) as u64;
                count += 1;
            }
            last_round[idx] = Some(draw.round);
        }
    }
    if count > 0 {
        total as f64 / count as f64
    } else {
        AVG_CYCLE_FALLBACK
    }
}

/// Fréquences sur la fenêtre récente et sur la fenêtre qui la précède immédiatement.
pub fn window_pair_frequency(draws: &[Draw], window: usize) -> (Vec<u32>, Vec<u32>) {
    let recent_end = window.min(draws.len());
    let previous_end = (2 * window).min(draws.len());
    (
        frequency(&draws[..recent_end]),
        frequency(&draws[recent_end..previous_end]),
    )
}

/// `récent − précédent` pour chaque numéro.
pub fn trend_deltas(draws: &[Draw], window: usize) -> Vec<i32> {
    let (recent, previous) = window_pair_frequency(draws, window);
    recent
        .iter()
        .zip(previous.iter())
        .map(|(&r, &p)| r as i32 - p as i32)
        .collect()
}

/// Numéros en hausse (`récent > précédent + 1`), parcourus dans l'ordre croissant,
/// au plus `max_rising` : le premier trouvé l'emporte.
pub fn rising_numbers(draws: &[Draw], window: usize, max_rising: usize) -> Vec<u8> {
    let (recent, previous) = window_pair_frequency(draws, window);
    (1..=MAX_NUMBER)
        .filter(|&n| recent[index_of(n)] > previous[index_of(n)] + 1)
        .take(max_rising)
        .collect()
}

/// Matrice triangulaire des co-apparitions.
#[derive(Debug, Clone)]
pub struct PairCounts {
    counts: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct PairCount {
    pub pair: (u8, u8),
    pub count: u32,
}

impl PairCounts {
    pub fn from_draws(draws: &[Draw]) -> Self {
        let mut counts = vec![0u32; SIZE * SIZE];
        for draw in draws {
            let numbers = distinct_numbers(&draw.numbers);
            for i in 0..numbers.len() {
                for j in (i + 1)..numbers.len() {
                    counts[index_of(numbers[i]) * SIZE + index_of(numbers[j])] += 1;
                }
            }
        }
        Self { counts }
    }

    pub fn get(&self, a: u8, b: u8) -> u32 {
        if a == b || a < 1 || b < 1 || a > MAX_NUMBER || b > MAX_NUMBER {
            return 0;
        }
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        self.counts[index_of(lo) * SIZE + index_of(hi)]
    }

    /// Somme des co-apparitions de chaque numéro avec tous les autres.
    pub fn bonus(&self) -> Vec<u32> {
        (1..=MAX_NUMBER)
            .map(|n| (1..=MAX_NUMBER).map(|m| self.get(n, m)).sum())
            .collect()
    }

    /// Paires les plus fréquentes, à égalité par paire croissante.
    pub fn top(&self, limit: usize) -> Vec<PairCount> {
        let mut pairs: Vec<PairCount> = Vec::new();
        for a in 1..=MAX_NUMBER {
            for b in (a + 1)..=MAX_NUMBER {
                let count = self.get(a, b);
                if count > 0 {
                    pairs.push(PairCount { pair: (a, b), count });
                }
            }
        }
        pairs.sort_by(|x, y| y.count.cmp(&x.count).then(x.pair.cmp(&y.pair)));
        pairs.truncate(limit);
        pairs
    }
}

pub fn pair_bonus(draws: &[Draw]) -> Vec<u32> {
    PairCounts::from_draws(draws).bonus()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct ParityDistribution {
    pub odd: u32,
    pub even: u32,
}

pub fn parity_distribution(draws: &[Draw]) -> ParityDistribution {
    let mut dist = ParityDistribution { odd: 0, even: 0 };
    for draw in draws {
        for n in distinct_numbers(&draw.numbers) {
            if n % 2 == 1 {
                dist.odd += 1;
            } else {
                dist.even += 1;
            }
        }
    }
    dist
}

pub fn range_distribution(draws: &[Draw]) -> [u32; RANGE_BUCKETS] {
    let mut ranges = [0u32; RANGE_BUCKETS];
    for draw in draws {
        for n in distinct_numbers(&draw.numbers) {
            ranges[range_bucket(n)] += 1;
        }
    }
    ranges
}

/// Couleurs des boules, calées sur les tranches de 10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum BallColor {
    Yellow,
    Blue,
    Red,
    Gray,
    Green,
}

impl BallColor {
    pub const ALL: [BallColor; 5] = [
        BallColor::Yellow,
        BallColor::Blue,
        BallColor::Red,
        BallColor::Gray,
        BallColor::Green,
    ];

    pub fn of(number: u8) -> Self {
        Self::ALL[range_bucket(number)]
    }
}

impl std::fmt::Display for BallColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BallColor::Yellow => write!(f, "jaune"),
            BallColor::Blue => write!(f, "bleu"),
            BallColor::Red => write!(f, "rouge"),
            BallColor::Gray => write!(f, "gris"),
            BallColor::Green => write!(f, "vert"),
        }
    }
}

pub fn color_distribution(draws: &[Draw]) -> Vec<(BallColor, u32)> {
    let ranges = range_distribution(draws);
    BallColor::ALL
        .iter()
        .zip(ranges.iter())
        .map(|(&c, &n)| (c, n))
        .collect()
}

pub fn end_digit_distribution(draws: &[Draw]) -> [u32; 10] {
    let mut digits = [0u32; 10];
    for draw in draws {
        for n in distinct_numbers(&draw.numbers) {
            digits[(n % 10) as usize] += 1;
        }
    }
    digits
}

/// Numéros repris d'un tirage au précédent, pour chaque couple de tirages consécutifs
/// (du plus récent au plus ancien).
pub fn carryover_series(draws: &[Draw]) -> Vec<usize> {
    draws
        .windows(2)
        .map(|w| super::metrics::carryover(&w[0].numbers, &w[1].numbers))
        .collect()
}
