use tracing::debug;

use lotto_db::models::{MAX_NUMBER, PICK_COUNT};

use super::{CandidateSet, SetGenerator};
use crate::error::{EngineError, Result};
use crate::features::metrics::{range_bucket, RANGE_BUCKETS};
use crate::scorer::NumberScore;

/// Au plus 2 numéros par tranche de dizaine.
pub const MAX_PER_BUCKET: usize = 2;
/// Au plus 4 impairs et 4 pairs.
pub const MAX_PER_PARITY: usize = 4;
/// Le curseur repart du début du classement une fois cet indice dépassé.
pub const WRAP_AFTER: usize = 35;
const MAX_WRAPS: usize = 2;

/// Construction numéro par numéro le long du classement, sans énumération.
#[derive(Debug, Clone, Copy, Default)]
pub struct IncrementalGenerator;

impl SetGenerator for IncrementalGenerator {
    fn name(&self) -> &str {
        "incremental"
    }

    fn generate(&self, scores: &[NumberScore], k: usize) -> Result<Vec<CandidateSet>> {
        generate_incremental(scores, k)
    }
}

/// La grille `i` part de l'indice `2 × i` du classement et ajoute chaque numéro qui
/// respecte les plafonds par tranche et par parité.
pub fn generate_incremental(scores: &[NumberScore], k: usize) -> Result<Vec<CandidateSet>> {
    if scores.len() != MAX_NUMBER as usize {
        return Err(EngineError::PoolSize {
            expected: MAX_NUMBER as usize,
            actual: scores.len(),
        });
    }

    let sets: Vec<CandidateSet> = (0..k).map(|set_index| build_set(scores, set_index)).collect();
    debug!(
        sets = sets.len(),
        relaxed = sets.iter().filter(|s| s.relaxed).count(),
        "grilles incrémentales"
    );
    Ok(sets)
}

fn build_set(scores: &[NumberScore], set_index: usize) -> CandidateSet {
    let mut selected: Vec<&NumberScore> = Vec::with_capacity(PICK_COUNT);
    let mut buckets = [0usize; RANGE_BUCKETS];
    let mut odd = 0usize;
    let mut cursor = 2 * set_index;
    let mut wraps = 0usize;

    while selected.len() < PICK_COUNT {
        if cursor >= scores.len() {
            if wraps >= MAX_WRAPS {
                break;
            }
            wraps += 1;
            cursor = 0;
        }
        let candidate = &scores[cursor];
        let n = candidate.number;
        let is_odd = n % 2 == 1;
        let parity_full = if is_odd {
            odd >= MAX_PER_PARITY
        } else {
            selected.len() - odd >= MAX_PER_PARITY
        };
        if !selected.iter().any(|s| s.number == n)
            && buckets[range_bucket(n)] < MAX_PER_BUCKET
            && !parity_full
        {
            buckets[range_bucket(n)] += 1;
            if is_odd {
                odd += 1;
            }
            selected.push(candidate);
        }

        cursor += 1;
        if cursor > WRAP_AFTER && selected.len() < PICK_COUNT {
            if wraps >= MAX_WRAPS {
                break;
            }
            wraps += 1;
            cursor = 0;
        }
    }

    // Plafonds intenables : on complète dans l'ordre du classement.
    let relaxed = selected.len() < PICK_COUNT;
    for candidate in scores {
        if selected.len() >= PICK_COUNT {
            break;
        }
        if !selected.iter().any(|s| s.number == candidate.number) {
            selected.push(candidate);
        }
    }

    let mut numbers = [0u8; PICK_COUNT];
    for (slot, s) in numbers.iter_mut().zip(&selected) {
        *slot = s.number;
    }
    let total = selected.iter().map(|s| s.score).sum();
    CandidateSet::new(numbers, total, relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::history::{make_test_draws, History};
    use crate::scorer::compute_scores;

    fn ranked() -> Vec<NumberScore> {
        compute_scores(&History::from_vec(make_test_draws(90)), &EngineConfig::default())
    }

    #[test]
    fn test_sets_respect_caps() {
        let scores = ranked();
        let sets = generate_incremental(&scores, 5).unwrap();
        assert_eq!(sets.len(), 5);
        for set in &sets {
            assert!(!set.relaxed);
            assert!(set.numbers.windows(2).all(|w| w[0] < w[1]));
            let mut buckets = [0usize; RANGE_BUCKETS];
            for &n in &set.numbers {
                buckets[range_bucket(n)] += 1;
            }
            assert!(buckets.iter().all(|&b| b <= MAX_PER_BUCKET));
            assert!(set.odd_count <= MAX_PER_PARITY);
            assert!(PICK_COUNT - set.odd_count <= MAX_PER_PARITY);
        }
    }

    #[test]
    fn test_first_set_starts_at_top() {
        let scores = ranked();
        let sets = generate_incremental(&scores, 2).unwrap();
        assert!(sets[0].numbers.contains(&scores[0].number));
        assert!(sets[1].numbers.contains(&scores[2].number));
    }

    #[test]
    fn test_neutral_scores_are_ascending_numbers() {
        // Historique vide : classement 1..45, tous à 50.
        let scores = compute_scores(&History::default(), &EngineConfig::default());
        let sets = generate_incremental(&scores, 1).unwrap();
        // 1, 2 (tranche 1-10 pleine), 11, 12, 21, 22
        assert_eq!(sets[0].numbers, [1, 2, 11, 12, 21, 22]);
        assert!((sets[0].score_total - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_requires_full_ranking() {
        let scores = ranked();
        assert!(matches!(
            generate_incremental(&scores[..20], 3),
            Err(EngineError::PoolSize { expected: 45, actual: 20 })
        ));
    }
}
