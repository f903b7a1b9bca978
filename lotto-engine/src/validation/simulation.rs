use rand::seq::index;
use rand::Rng;
use serde::Serialize;
use tracing::info;

use lotto_db::models::{MAX_NUMBER, PICK_COUNT};

use crate::error::{EngineError, Result};
use crate::generator::combinations::binomial;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    pub iterations: u64,
    pub hit_distribution: [u64; PICK_COUNT + 1],
    /// Fréquences empiriques correspondantes.
    pub probabilities: [f64; PICK_COUNT + 1],
    pub avg_hits: f64,
    pub hit4_plus_rate: f64,
}

/// Tire `iterations` fois 6 numéros distincts uniformes dans 1..=45 et compte les
/// correspondances avec `pool`. Le générateur est fourni par l'appelant.
pub fn simulate<R: Rng + ?Sized>(pool: &[u8], iterations: u64, rng: &mut R) -> Result<SimulationReport> {
    let mut in_pool = [false; MAX_NUMBER as usize + 1];
    for &n in pool {
        if n < 1 || n > MAX_NUMBER {
            return Err(EngineError::NumberOutOfRange(n));
        }
        if in_pool[n as usize] {
            return Err(EngineError::DuplicateNumber(n));
        }
        in_pool[n as usize] = true;
    }

    let mut hit_distribution = [0u64; PICK_COUNT + 1];
    for _ in 0..iterations {
        let hits = index::sample(rng, MAX_NUMBER as usize, PICK_COUNT)
            .iter()
            .filter(|&i| in_pool[i + 1])
            .count();
        hit_distribution[hits] += 1;
    }

    let mut probabilities = [0.0; PICK_COUNT + 1];
    let (mut avg_hits, mut hit4_plus_rate) = (0.0, 0.0);
    if iterations > 0 {
        let n = iterations as f64;
        for (p, &c) in probabilities.iter_mut().zip(&hit_distribution) {
            *p = c as f64 / n;
        }
        avg_hits = hit_distribution
            .iter()
            .enumerate()
            .map(|(h, &c)| h as f64 * c as f64)
            .sum::<f64>()
            / n;
        hit4_plus_rate = hit_distribution[4..].iter().sum::<u64>() as f64 / n;
    }

    info!(iterations, pool = pool.len(), avg_hits, hit4_plus_rate, "simulation terminée");
    Ok(SimulationReport {
        iterations,
        hit_distribution,
        probabilities,
        avg_hits,
        hit4_plus_rate,
    })
}

/// Probabilité exacte (hypergéométrique) d'avoir `hits` numéros d'un pool de
/// `pool_size` dans un tirage de 6 parmi 45.
pub fn hypergeometric_probability(pool_size: usize, hits: usize) -> f64 {
    let total = MAX_NUMBER as u64;
    let pool = pool_size as u64;
    let hits = hits as u64;
    let pick = PICK_COUNT as u64;
    if pool > total || hits > pick || hits > pool || pick - hits > total - pool {
        return 0.0;
    }
    (binomial(pool, hits) * binomial(total - pool, pick - hits)) as f64 / binomial(total, pick) as f64
}

/// Probabilité théorique de 4 correspondances ou plus.
pub fn hit4_plus_probability(pool_size: usize) -> f64 {
    (4..=PICK_COUNT)
        .map(|h| hypergeometric_probability(pool_size, h))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_zero_iterations() {
        let mut rng = StdRng::seed_from_u64(1);
        let report = simulate(&[1, 2, 3], 0, &mut rng).unwrap();
        assert_eq!(report.iterations, 0);
        assert_eq!(report.hit_distribution, [0; 7]);
        assert_eq!(report.avg_hits, 0.0);
        assert_eq!(report.hit4_plus_rate, 0.0);
    }

    #[test]
    fn test_same_seed_same_report() {
        let pool: Vec<u8> = (1..=20).collect();
        let a = simulate(&pool, 5_000, &mut StdRng::seed_from_u64(7)).unwrap();
        let b = simulate(&pool, 5_000, &mut StdRng::seed_from_u64(7)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.hit_distribution.iter().sum::<u64>(), 5_000);
    }

    #[test]
    fn test_full_pool_always_six() {
        let pool: Vec<u8> = (1..=45).collect();
        let report = simulate(&pool, 100, &mut StdRng::seed_from_u64(3)).unwrap();
        assert_eq!(report.hit_distribution[6], 100);
        assert_eq!(report.probabilities[6], 1.0);
    }

    #[test]
    fn test_rejects_bad_pool() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(simulate(&[0, 5], 10, &mut rng), Err(EngineError::NumberOutOfRange(0))));
        assert!(matches!(simulate(&[5, 5], 10, &mut rng), Err(EngineError::DuplicateNumber(5))));
    }

    #[test]
    fn test_hypergeometric_sums_to_one() {
        for pool in [0usize, 6, 20, 45] {
            let total: f64 = (0..=6).map(|h| hypergeometric_probability(pool, h)).sum();
            assert!((total - 1.0).abs() < 1e-12, "pool {pool}: {total}");
        }
        assert_eq!(hypergeometric_probability(45, 6), 1.0);
        assert!((hit4_plus_probability(20) - 1_879_860.0 / 8_145_060.0).abs() < 1e-12);
    }

    #[test]
    fn test_convergence_to_hypergeometric() {
        let pool: Vec<u8> = (1..=20).collect();
        let mut rng = StdRng::seed_from_u64(20_240_601);
        let report = simulate(&pool, 1_000_000, &mut rng).unwrap();
        let expected = hit4_plus_probability(20);
        assert!(
            (report.hit4_plus_rate - expected).abs() < 0.005,
            "empirique {} vs théorique {}",
            report.hit4_plus_rate,
            expected
        );
    }
}
