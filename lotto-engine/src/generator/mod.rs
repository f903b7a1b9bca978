//! Sélection de grilles : filtres de validité, énumération exhaustive du pool et
//! choix glouton de grilles diversifiées.

pub mod combinations;
pub mod incremental;

use serde::Serialize;
use tracing::{debug, info};

use lotto_db::models::{MAX_NUMBER, PICK_COUNT};

use crate::error::{EngineError, Result};
use crate::features::metrics;
use crate::scorer::{top_pool, NumberScore, PoolEntry};
use combinations::IndexCombinations;

/// Taille du pool exigée par l'énumération exhaustive.
pub const POOL_SIZE: usize = 20;
pub const SUM_RANGE_WIDE: (u32, u32) = (100, 180);
pub const SUM_RANGE_RECOMMENDED: (u32, u32) = (115, 160);
pub const MIN_AC: i32 = 7;
pub const ODD_RANGE: (usize, usize) = (2, 4);
pub const HIGH_RANGE: (usize, usize) = (2, 4);
/// Strictement moins de paires consécutives que cette valeur.
pub const MAX_CONSECUTIVE_PAIRS: usize = 3;
/// Strictement moins de répétitions d'un même chiffre des unités que cette valeur.
pub const MAX_END_DIGIT_REPEAT: usize = 3;
/// Nombre maximal de numéros communs entre deux grilles retenues.
pub const MAX_SHARED: usize = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum SumRange {
    #[default]
    Wide,
    Recommended,
}

impl SumRange {
    pub fn bounds(self) -> (u32, u32) {
        match self {
            SumRange::Wide => SUM_RANGE_WIDE,
            SumRange::Recommended => SUM_RANGE_RECOMMENDED,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateSet {
    pub numbers: [u8; PICK_COUNT],
    pub sum: u32,
    pub odd_count: usize,
    pub high_count: usize,
    pub ac_value: i32,
    pub score_total: f64,
    pub avg_score: f64,
    /// Issue du remplissage de secours, sans contrôle de diversité.
    pub relaxed: bool,
}

impl CandidateSet {
    pub fn new(mut numbers: [u8; PICK_COUNT], score_total: f64, relaxed: bool) -> Self {
        numbers.sort_unstable();
        Self {
            numbers,
            sum: metrics::number_sum(&numbers),
            odd_count: metrics::odd_count(&numbers),
            high_count: metrics::high_count(&numbers),
            ac_value: metrics::ac_value(&numbers),
            score_total,
            avg_score: score_total / PICK_COUNT as f64,
            relaxed,
        }
    }

    pub fn shared_with(&self, other: &[u8]) -> usize {
        self.numbers.iter().filter(|n| other.contains(n)).count()
    }
}

pub fn is_valid_combination(numbers: &[u8], sum_range: SumRange) -> bool {
    let distinct = metrics::distinct_numbers(numbers);
    if distinct.len() != PICK_COUNT || distinct.len() != numbers.len() {
        return false;
    }
    let (min_sum, max_sum) = sum_range.bounds();
    let sum = metrics::number_sum(&distinct);
    if sum < min_sum || sum > max_sum {
        return false;
    }
    if metrics::ac_value(&distinct) < MIN_AC {
        return false;
    }
    let odd = metrics::odd_count(&distinct);
    if odd < ODD_RANGE.0 || odd > ODD_RANGE.1 {
        return false;
    }
    let high = metrics::high_count(&distinct);
    if high < HIGH_RANGE.0 || high > HIGH_RANGE.1 {
        return false;
    }
    metrics::consecutive_pairs(&distinct) < MAX_CONSECUTIVE_PAIRS
        && metrics::max_end_digit_repeat(&distinct) < MAX_END_DIGIT_REPEAT
}

/// Vérifie taille, bornes et unicité d'un pool.
pub fn validate_pool(pool: &[PoolEntry], expected: usize) -> Result<()> {
    if pool.len() != expected {
        return Err(EngineError::PoolSize {
            expected,
            actual: pool.len(),
        });
    }
    let mut seen = [false; MAX_NUMBER as usize + 1];
    for entry in pool {
        if entry.number < 1 || entry.number > MAX_NUMBER {
            return Err(EngineError::NumberOutOfRange(entry.number));
        }
        if seen[entry.number as usize] {
            return Err(EngineError::DuplicateNumber(entry.number));
        }
        seen[entry.number as usize] = true;
    }
    Ok(())
}

/// Énumère les C(20, 6) grilles du pool, garde les valides, les classe par score cumulé
/// et retient au plus `k` grilles partageant au plus 3 numéros deux à deux. Si la
/// diversité ne suffit pas, complète avec les meilleures grilles valides restantes
/// (marquées `relaxed`).
pub fn generate_sets(pool: &[PoolEntry], k: usize, sum_range: SumRange) -> Result<Vec<CandidateSet>> {
    validate_pool(pool, POOL_SIZE)?;
    if k == 0 {
        return Ok(Vec::new());
    }

    let mut valid: Vec<([u8; PICK_COUNT], f64)> = Vec::new();
    let mut enumerated = 0usize;
    for idx in IndexCombinations::new(pool.len()) {
        enumerated += 1;
        let mut numbers = [0u8; PICK_COUNT];
        let mut total = 0.0;
        for (slot, &i) in numbers.iter_mut().zip(idx.iter()) {
            *slot = pool[i].number;
            total += pool[i].score;
        }
        numbers.sort_unstable();
        if is_valid_combination(&numbers, sum_range) {
            valid.push((numbers, total));
        }
    }
    // Tri stable : à score égal, l'ordre d'énumération est conservé.
    valid.sort_by(|a, b| b.1.total_cmp(&a.1));
    debug!(enumerated, valid = valid.len(), ?sum_range, "combinaisons filtrées");

    let mut chosen: Vec<usize> = Vec::with_capacity(k);
    for (i, (numbers, _)) in valid.iter().enumerate() {
        if chosen.len() >= k {
            break;
        }
        let diverse = chosen
            .iter()
            .all(|&j| shared(&valid[j].0, numbers) <= MAX_SHARED);
        if diverse {
            chosen.push(i);
        }
    }

    let mut sets: Vec<CandidateSet> = chosen
        .iter()
        .map(|&i| CandidateSet::new(valid[i].0, valid[i].1, false))
        .collect();

    if sets.len() < k {
        for (i, (numbers, total)) in valid.iter().enumerate() {
            if sets.len() >= k {
                break;
            }
            if !chosen.contains(&i) {
                sets.push(CandidateSet::new(*numbers, *total, true));
            }
        }
    }

    info!(
        requested = k,
        returned = sets.len(),
        relaxed = sets.iter().filter(|s| s.relaxed).count(),
        "grilles générées"
    );
    Ok(sets)
}

fn shared(a: &[u8; PICK_COUNT], b: &[u8; PICK_COUNT]) -> usize {
    a.iter().filter(|n| b.contains(n)).count()
}

/// Stratégie de construction des grilles à partir du classement complet des 45 numéros.
pub trait SetGenerator: Send + Sync {
    fn name(&self) -> &str;
    /// `scores` triés par score décroissant (sortie de `compute_scores`).
    fn generate(&self, scores: &[NumberScore], k: usize) -> Result<Vec<CandidateSet>>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ExhaustiveGenerator {
    pub sum_range: SumRange,
}

impl SetGenerator for ExhaustiveGenerator {
    fn name(&self) -> &str {
        "exhaustive"
    }

    fn generate(&self, scores: &[NumberScore], k: usize) -> Result<Vec<CandidateSet>> {
        generate_sets(&top_pool(scores, POOL_SIZE), k, self.sum_range)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Strategy {
    #[default]
    Exhaustive,
    Incremental,
}

impl Strategy {
    pub fn generator(self, sum_range: SumRange) -> Box<dyn SetGenerator> {
        match self {
            Strategy::Exhaustive => Box::new(ExhaustiveGenerator { sum_range }),
            Strategy::Incremental => Box::new(incremental::IncrementalGenerator),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SPREAD_POOL: [u8; 20] = [
        2, 4, 7, 9, 11, 13, 15, 17, 19, 21, 23, 25, 27, 29, 31, 33, 35, 38, 41, 44,
    ];

    fn make_pool(numbers: &[u8]) -> Vec<PoolEntry> {
        numbers
            .iter()
            .enumerate()
            .map(|(i, &number)| PoolEntry {
                number,
                score: 100.0 - 5.0 * i as f64,
            })
            .collect()
    }

    #[test]
    fn test_validity_rules() {
        assert!(is_valid_combination(&[2, 7, 9, 11, 27, 44], SumRange::Wide));
        // somme 21
        assert!(!is_valid_combination(&[1, 2, 3, 4, 5, 6], SumRange::Wide));
        // 5 impairs
        assert!(!is_valid_combination(&[3, 9, 15, 23, 31, 42], SumRange::Wide));
        // un seul numéro haut
        assert!(!is_valid_combination(&[4, 9, 13, 18, 21, 40], SumRange::Wide));
        // trois numéros finissant par 1
        assert!(!is_valid_combination(&[1, 11, 21, 24, 38, 40], SumRange::Wide));
        // doublon
        assert!(!is_valid_combination(&[2, 2, 9, 11, 27, 44], SumRange::Wide));
        // somme 100 acceptée en large, refusée en resserré
        assert!(is_valid_combination(&[2, 4, 7, 9, 33, 45], SumRange::Wide));
        assert!(!is_valid_combination(&[2, 4, 7, 9, 33, 45], SumRange::Recommended));
    }

    #[test]
    fn test_consecutive_limit() {
        // 3 paires consécutives
        assert!(!is_valid_combination(&[10, 11, 12, 13, 34, 42], SumRange::Wide));
    }

    #[test]
    fn test_generate_diverse_sets() {
        let sets = generate_sets(&make_pool(&SPREAD_POOL), 5, SumRange::Wide).unwrap();
        assert_eq!(sets.len(), 5);
        assert_eq!(sets[0].numbers, [2, 7, 9, 11, 27, 44]);
        assert!((sets[0].score_total - 400.0).abs() < 1e-9);
        assert!((sets[0].avg_score - 400.0 / 6.0).abs() < 1e-9);
        for (i, a) in sets.iter().enumerate() {
            assert!(!a.relaxed);
            assert!(is_valid_combination(&a.numbers, SumRange::Wide));
            assert!(a.numbers.windows(2).all(|w| w[0] < w[1]));
            assert!(a.numbers.iter().all(|n| SPREAD_POOL.contains(n)));
            for b in &sets[i + 1..] {
                assert!(a.shared_with(&b.numbers) <= MAX_SHARED);
            }
        }
    }

    #[test]
    fn test_tight_sum_range() {
        let sets = generate_sets(&make_pool(&SPREAD_POOL), 5, SumRange::Recommended).unwrap();
        assert_eq!(sets.len(), 5);
        assert!(sets.iter().all(|s| s.sum >= 115 && s.sum <= 160));
    }

    #[test]
    fn test_relaxed_fill_when_diversity_runs_out() {
        let sets = generate_sets(&make_pool(&SPREAD_POOL), 500, SumRange::Wide).unwrap();
        assert_eq!(sets.len(), 500);
        let strict: Vec<&CandidateSet> = sets.iter().filter(|s| !s.relaxed).collect();
        assert!(!strict.is_empty() && strict.len() < 500);
        // les grilles strictes viennent d'abord
        assert!(sets[..strict.len()].iter().all(|s| !s.relaxed));
        for (i, a) in strict.iter().enumerate() {
            for b in &strict[i + 1..] {
                assert!(a.shared_with(&b.numbers) <= MAX_SHARED);
            }
        }
        let mut all: Vec<[u8; 6]> = sets.iter().map(|s| s.numbers).collect();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), 500);
    }

    #[test]
    fn test_no_valid_combination_returns_empty() {
        let low: Vec<u8> = (1..=20).collect();
        let sets = generate_sets(&make_pool(&low), 3, SumRange::Wide).unwrap();
        assert!(sets.is_empty());
    }

    #[test]
    fn test_pool_contract() {
        let short = make_pool(&SPREAD_POOL[..19]);
        assert!(matches!(
            generate_sets(&short, 5, SumRange::Wide),
            Err(EngineError::PoolSize { expected: 20, actual: 19 })
        ));
        let mut dup = make_pool(&SPREAD_POOL);
        dup[3].number = 2;
        assert!(matches!(
            generate_sets(&dup, 5, SumRange::Wide),
            Err(EngineError::DuplicateNumber(2))
        ));
        let mut out = make_pool(&SPREAD_POOL);
        out[0].number = 46;
        assert!(matches!(
            generate_sets(&out, 5, SumRange::Wide),
            Err(EngineError::NumberOutOfRange(46))
        ));
    }

    #[test]
    fn test_zero_sets_requested() {
        assert!(generate_sets(&make_pool(&SPREAD_POOL), 0, SumRange::Wide).unwrap().is_empty());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_sets_are_valid(
            numbers in proptest::sample::subsequence((1..=45u8).collect::<Vec<_>>(), 20),
            k in 1usize..8,
        ) {
            let sets = generate_sets(&make_pool(&numbers), k, SumRange::Wide).unwrap();
            prop_assert!(sets.len() <= k);
            for s in &sets {
                prop_assert!(s.numbers.windows(2).all(|w| w[0] < w[1]));
                prop_assert!(s.numbers.iter().all(|n| numbers.contains(n)));
                prop_assert!(is_valid_combination(&s.numbers, SumRange::Wide));
            }
            let strict: Vec<_> = sets.iter().filter(|s| !s.relaxed).collect();
            for (i, a) in strict.iter().enumerate() {
                for b in &strict[i + 1..] {
                    prop_assert!(a.shared_with(&b.numbers) <= MAX_SHARED);
                }
            }
        }
    }
}
