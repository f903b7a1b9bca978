//! Rapport statistique complet sur un historique (fréquences, motifs, tendances…).

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use lotto_db::models::{Draw, MAX_NUMBER, PICK_COUNT};

use super::compute::{self, BallColor, PairCount};
use super::metrics;
use crate::history::History;

const TOP_N: usize = 5;
const HOT_COLD_WINDOW: usize = 50;
const TREND_REPORT_WINDOW: usize = 50;
/// Demi-largeur de la fourchette de somme conseillée autour de la moyenne.
const SUM_BAND: f64 = 23.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumberCount {
    pub number: u8,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumberGap {
    pub number: u8,
    pub gap: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SumStats {
    pub average: f64,
    pub min: u32,
    pub max: u32,
    pub recommended_min: u32,
    pub recommended_max: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AcStats {
    pub average: f64,
    pub distribution: BTreeMap<i32, u32>,
    pub current: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CarryoverStats {
    pub zero: f64,
    pub one: f64,
    pub two_plus: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub latest_round: u32,
    pub total_rounds: usize,
    pub most_frequent: Vec<NumberCount>,
    pub least_frequent: Vec<NumberCount>,
    pub hot: Vec<u8>,
    pub cold: Vec<u8>,
    pub not_appeared: Vec<NumberGap>,
    pub avg_cycle: f64,
    pub odd_ratio: f64,
    pub odd_even_patterns: BTreeMap<String, u32>,
    pub most_common_odd_even: String,
    pub low_ratio: f64,
    pub high_ratio: f64,
    pub most_common_low_high: String,
    pub sum: SumStats,
    pub ac: AcStats,
    pub consecutive_ratio: f64,
    pub avg_consecutive: f64,
    pub top_pairs: Vec<PairCount>,
    pub prime_average: f64,
    pub end_digit_most: u8,
    pub end_digit_least: u8,
    pub carryover: CarryoverStats,
    pub rising: Vec<u8>,
    pub falling: Vec<u8>,
    pub mean_spacing: f64,
    pub colors: Vec<(BallColor, f64)>,
    /// Tirages contenant au moins un doublé (11, 22, 33, 44).
    pub double_draws: u32,
    /// Tirages contenant au moins une paire de somme 46.
    pub symmetric_draws: u32,
}

/// Analyse complète ; `None` pour un historique vide.
pub fn analyze(history: &History) -> Option<AnalysisReport> {
    let draws = history.draws();
    if draws.is_empty() {
        return None;
    }
    let n = draws.len() as f64;
    debug!(draws = draws.len(), "analyse complète");

    let frequency = compute::frequency(draws);
    let by_count = ranked_counts(&frequency);
    let most_frequent = by_count.iter().take(TOP_N).cloned().collect();
    let least_frequent = by_count.iter().rev().take(TOP_N).cloned().collect();

    let recent = ranked_counts(&compute::recent_frequency(draws, HOT_COLD_WINDOW));
    let hot = recent.iter().take(TOP_N).map(|c| c.number).collect();
    let cold = recent.iter().rev().take(TOP_N).map(|c| c.number).collect();

    let mut not_appeared: Vec<NumberGap> = compute::last_seen_gaps(draws)
        .into_iter()
        .enumerate()
        .map(|(i, gap)| NumberGap { number: (i + 1) as u8, gap })
        .collect();
    not_appeared.sort_by(|a, b| b.gap.cmp(&a.gap).then(a.number.cmp(&b.number)));
    not_appeared.truncate(10);

    let parity = compute::parity_distribution(draws);
    let mut odd_even_patterns = BTreeMap::new();
    let mut low_high_patterns = BTreeMap::new();
    let mut high_total = 0usize;
    for draw in draws {
        let odd = metrics::odd_count(&draw.numbers);
        let high = metrics::high_count(&draw.numbers);
        high_total += high;
        *odd_even_patterns
            .entry(format!("{}:{}", odd, PICK_COUNT - odd))
            .or_insert(0u32) += 1;
        *low_high_patterns
            .entry(format!("{}:{}", PICK_COUNT - high, high))
            .or_insert(0u32) += 1;
    }
    let total_numbers = (parity.odd + parity.even).max(1) as f64;

    let (end_digit_most, end_digit_least) = end_digit_extremes(&compute::end_digit_distribution(draws));

    let (rising, falling) = trend_report(draws);

    let colors = compute::color_distribution(draws)
        .into_iter()
        .map(|(c, count)| (c, count as f64 / total_numbers))
        .collect();

    let consecutive: Vec<usize> = draws.iter().map(|d| metrics::consecutive_pairs(&d.numbers)).collect();

    let spacing = draws.iter().map(|d| metrics::mean_spacing(&d.numbers)).sum::<f64>() / n;

    let double_draws = draws
        .iter()
        .filter(|d| d.numbers.iter().any(|x| metrics::DOUBLE_NUMBERS.contains(x)))
        .count() as u32;
    let symmetric_draws = draws.iter().filter(|d| has_symmetric_pair(&d.numbers)).count() as u32;

    Some(AnalysisReport {
        latest_round: history.latest_round(),
        total_rounds: draws.len(),
        most_frequent,
        least_frequent,
        hot,
        cold,
        not_appeared,
        avg_cycle: compute::global_average_cycle(draws),
        odd_ratio: parity.odd as f64 / total_numbers,
        most_common_odd_even: most_common(&odd_even_patterns),
        odd_even_patterns,
        low_ratio: 1.0 - high_total as f64 / total_numbers,
        high_ratio: high_total as f64 / total_numbers,
        most_common_low_high: most_common(&low_high_patterns),
        sum: sum_stats(draws),
        ac: ac_stats(draws),
        consecutive_ratio: consecutive.iter().filter(|&&c| c > 0).count() as f64 / n,
        avg_consecutive: consecutive.iter().sum::<usize>() as f64 / n,
        top_pairs: compute::PairCounts::from_draws(draws).top(10),
        prime_average: draws.iter().map(|d| metrics::prime_count(&d.numbers)).sum::<usize>() as f64 / n,
        end_digit_most,
        end_digit_least,
        carryover: carryover_stats(draws),
        rising,
        falling,
        mean_spacing: spacing,
        colors,
        double_draws,
        symmetric_draws,
    })
}

/// Décompte trié par fréquence décroissante, à égalité par numéro croissant.
fn ranked_counts(counts: &[u32]) -> Vec<NumberCount> {
    let mut ranked: Vec<NumberCount> = counts
        .iter()
        .enumerate()
        .map(|(i, &count)| NumberCount { number: (i + 1) as u8, count })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then(a.number.cmp(&b.number)));
    ranked
}

fn most_common(patterns: &BTreeMap<String, u32>) -> String {
    let mut best: Option<(&String, u32)> = None;
    for (pattern, &count) in patterns {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((pattern, count));
        }
    }
    best.map(|(p, _)| p.clone()).unwrap_or_else(|| "3:3".to_string())
}

fn end_digit_extremes(digits: &[u32; 10]) -> (u8, u8) {
    let mut most = 0usize;
    let mut least = 0usize;
    for d in 1..10 {
        if digits[d] > digits[most] {
            most = d;
        }
        if digits[d] < digits[least] {
            least = d;
        }
    }
    (most as u8, least as u8)
}

fn sum_stats(draws: &[Draw]) -> SumStats {
    let sums: Vec<u32> = draws.iter().map(|d| metrics::number_sum(&d.numbers)).collect();
    let average = sums.iter().sum::<u32>() as f64 / sums.len().max(1) as f64;
    SumStats {
        average: average.round(),
        min: sums.iter().copied().min().unwrap_or(0),
        max: sums.iter().copied().max().unwrap_or(0),
        recommended_min: (average - SUM_BAND).round().max(0.0) as u32,
        recommended_max: (average + SUM_BAND).round() as u32,
    }
}

fn ac_stats(draws: &[Draw]) -> AcStats {
    let mut distribution = BTreeMap::new();
    let mut total = 0i64;
    for draw in draws {
        let ac = metrics::ac_value(&draw.numbers);
        *distribution.entry(ac).or_insert(0u32) += 1;
        total += ac as i64;
    }
    AcStats {
        average: total as f64 / draws.len().max(1) as f64,
        distribution,
        current: draws.first().map(|d| metrics::ac_value(&d.numbers)).unwrap_or(0),
    }
}

fn carryover_stats(draws: &[Draw]) -> CarryoverStats {
    let series = compute::carryover_series(draws);
    if series.is_empty() {
        return CarryoverStats { zero: 0.0, one: 0.0, two_plus: 0.0 };
    }
    let total = series.len() as f64;
    CarryoverStats {
        zero: series.iter().filter(|&&c| c == 0).count() as f64 / total,
        one: series.iter().filter(|&&c| c == 1).count() as f64 / total,
        two_plus: series.iter().filter(|&&c| c >= 2).count() as f64 / total,
    }
}

/// Hausses et baisses les plus fortes entre les 50 derniers tirages et les 50 précédents.
fn trend_report(draws: &[Draw]) -> (Vec<u8>, Vec<u8>) {
    let deltas = compute::trend_deltas(draws, TREND_REPORT_WINDOW);
    let mut changes: Vec<(u8, i32)> = (1..=MAX_NUMBER).zip(deltas).collect();
    changes.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    let rising = changes.iter().take(TOP_N).map(|c| c.0).collect();
    changes.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)));
    let falling = changes.iter().take(TOP_N).map(|c| c.0).collect();
    (rising, falling)
}

fn has_symmetric_pair(numbers: &[u8]) -> bool {
    let distinct = metrics::distinct_numbers(numbers);
    distinct
        .iter()
        .any(|&a| distinct.iter().any(|&b| a < b && a as u16 + b as u16 == 46))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::make_test_draws;

    #[test]
    fn test_empty_history_has_no_report() {
        assert!(analyze(&History::default()).is_none());
    }

    #[test]
    fn test_report_shapes() {
        let history = History::from_vec(make_test_draws(120));
        let report = analyze(&history).unwrap();
        assert_eq!(report.total_rounds, 120);
        assert_eq!(report.latest_round, 120);
        assert_eq!(report.most_frequent.len(), 5);
        assert_eq!(report.least_frequent.len(), 5);
        assert_eq!(report.hot.len(), 5);
        assert_eq!(report.cold.len(), 5);
        assert_eq!(report.rising.len(), 5);
        assert_eq!(report.not_appeared.len(), 10);
        assert!(report.most_frequent[0].count >= report.least_frequent[0].count);
        assert!(report.odd_ratio > 0.0 && report.odd_ratio < 1.0);
        assert!((report.low_ratio + report.high_ratio - 1.0).abs() < 1e-12);
        let color_total: f64 = report.colors.iter().map(|(_, r)| r).sum();
        assert!((color_total - 1.0).abs() < 1e-9);
        let pattern_total: u32 = report.odd_even_patterns.values().sum();
        assert_eq!(pattern_total, 120);
        assert!(report.sum.min <= report.sum.max);
        assert!(report.sum.recommended_min < report.sum.recommended_max);
    }

    #[test]
    fn test_single_draw_report() {
        let history = History::from_vec(vec![Draw::new(7, [1, 2, 3, 22, 24, 45], 9)]);
        let report = analyze(&history).unwrap();
        assert_eq!(report.sum.min, 97);
        assert_eq!(report.sum.max, 97);
        assert_eq!(report.ac.current, metrics::ac_value(&[1, 2, 3, 22, 24, 45]));
        assert_eq!(report.carryover, CarryoverStats { zero: 0.0, one: 0.0, two_plus: 0.0 });
        assert!((report.consecutive_ratio - 1.0).abs() < 1e-12);
        assert!((report.avg_consecutive - 2.0).abs() < 1e-12);
        assert_eq!(report.double_draws, 1);
        assert_eq!(report.symmetric_draws, 1); // 1 + 45
        assert_eq!(report.most_common_odd_even, "3:3");
        assert_eq!(report.most_common_low_high, "4:2");
    }

    #[test]
    fn test_end_digit_extremes() {
        let mut digits = [5u32; 10];
        digits[3] = 9;
        digits[7] = 1;
        assert_eq!(end_digit_extremes(&digits), (3, 7));
    }
}
