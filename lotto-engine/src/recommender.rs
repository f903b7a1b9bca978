use std::time::Duration;

use serde::Serialize;
use tracing::info;

use crate::cache::{InMemoryTtlCache, ResultCache};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::generator::{CandidateSet, Strategy, SumRange, POOL_SIZE};
use crate::history::History;
use crate::scorer::{compute_scores, top_pool, NumberScore, PoolEntry};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub latest_round: u32,
    /// Tour visé : le suivant du dernier tour connu.
    pub target_round: u32,
    pub scores: Vec<NumberScore>,
    pub pool: Vec<PoolEntry>,
    pub sets: Vec<CandidateSet>,
    pub strategy: Strategy,
    pub sum_range: SumRange,
    /// Vrai si la recommandation sort du cache.
    pub from_cache: bool,
}

/// Point d'entrée score → pool → grilles, avec un cache injecté indexé par l'empreinte
/// de l'historique.
pub struct Recommender<C = InMemoryTtlCache<Recommendation>>
where
    C: ResultCache<Recommendation>,
{
    config: EngineConfig,
    cache: C,
}

impl<C: ResultCache<Recommendation>> Recommender<C> {
    pub fn new(config: EngineConfig, cache: C) -> Self {
        Self { config, cache }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn recommend(
        &mut self,
        history: &History,
        sets: usize,
        strategy: Strategy,
        sum_range: SumRange,
    ) -> Result<Recommendation> {
        let key = format!(
            "{}:{}:{:?}:{:?}",
            history.fingerprint(),
            sets,
            strategy,
            sum_range
        );
        if let Some(mut cached) = self.cache.get(&key) {
            cached.from_cache = true;
            return Ok(cached);
        }

        let scores = compute_scores(history, &self.config);
        let pool = top_pool(&scores, POOL_SIZE);
        let candidate_sets = if history.is_empty() {
            Vec::new()
        } else {
            strategy.generator(sum_range).generate(&scores, sets)?
        };

        let latest_round = history.latest_round();
        let recommendation = Recommendation {
            latest_round,
            target_round: latest_round + 1,
            scores,
            pool,
            sets: candidate_sets,
            strategy,
            sum_range,
            from_cache: false,
        };
        info!(
            target_round = recommendation.target_round,
            sets = recommendation.sets.len(),
            ?strategy,
            "recommandation calculée"
        );
        self.cache.set(
            key,
            recommendation.clone(),
            Duration::from_secs(self.config.cache_ttl_secs),
        );
        Ok(recommendation)
    }

    /// Vide le cache, par exemple après l'ajout d'un tirage.
    pub fn invalidate_all(&self) {
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::MAX_SHARED;
    use crate::history::make_test_draws;
    use lotto_db::models::Draw;

    fn recommender() -> Recommender {
        Recommender::new(EngineConfig::default(), InMemoryTtlCache::new())
    }

    #[test]
    fn test_empty_history_has_no_sets() {
        let mut rec = recommender();
        let out = rec
            .recommend(&History::default(), 5, Strategy::Exhaustive, SumRange::Wide)
            .unwrap();
        assert!(out.sets.is_empty());
        assert_eq!(out.target_round, 1);
        assert_eq!(out.scores.len(), 45);
        assert_eq!(out.pool.len(), 20);
    }

    #[test]
    fn test_cached_until_invalidated() {
        let mut rec = recommender();
        let history = History::from_vec(make_test_draws(80));

        let first = rec.recommend(&history, 3, Strategy::Incremental, SumRange::Wide).unwrap();
        assert!(!first.from_cache);
        let second = rec.recommend(&history, 3, Strategy::Incremental, SumRange::Wide).unwrap();
        assert!(second.from_cache);
        assert_eq!(first.sets, second.sets);

        rec.invalidate_all();
        let third = rec.recommend(&history, 3, Strategy::Incremental, SumRange::Wide).unwrap();
        assert!(!third.from_cache);
        assert_eq!(first.sets, third.sets);
    }

    #[test]
    fn test_cache_expires_with_configured_ttl() {
        let config = EngineConfig {
            cache_ttl_secs: 1,
            ..EngineConfig::default()
        };
        let mut rec = Recommender::new(config, InMemoryTtlCache::new());
        let history = History::from_vec(make_test_draws(60));

        rec.recommend(&history, 2, Strategy::Incremental, SumRange::Wide).unwrap();
        std::thread::sleep(Duration::from_millis(1_300));
        let out = rec.recommend(&history, 2, Strategy::Incremental, SumRange::Wide).unwrap();
        assert!(!out.from_cache);
    }

    #[test]
    fn test_new_draw_misses_cache() {
        let mut rec = recommender();
        let mut draws = make_test_draws(80);
        let history = History::new(&draws);
        rec.recommend(&history, 2, Strategy::Incremental, SumRange::Wide).unwrap();

        draws.push(Draw::new(81, [3, 9, 17, 26, 34, 41], 12));
        let updated = History::new(&draws);
        let out = rec.recommend(&updated, 2, Strategy::Incremental, SumRange::Wide).unwrap();
        assert!(!out.from_cache);
        assert_eq!(out.target_round, 82);
    }

    #[test]
    fn test_exhaustive_sets_are_diverse() {
        let mut rec = recommender();
        let history = History::from_vec(make_test_draws(120));
        let out = rec.recommend(&history, 5, Strategy::Exhaustive, SumRange::Wide).unwrap();
        assert!(out.sets.len() <= 5);
        let pool: Vec<u8> = out.pool.iter().map(|p| p.number).collect();
        let strict: Vec<_> = out.sets.iter().filter(|s| !s.relaxed).collect();
        for (i, a) in strict.iter().enumerate() {
            assert!(a.numbers.iter().all(|n| pool.contains(n)));
            for b in &strict[i + 1..] {
                assert!(a.shared_with(&b.numbers) <= MAX_SHARED);
            }
        }
    }
}
