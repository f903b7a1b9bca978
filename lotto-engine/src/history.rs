use sha2::{Digest, Sha256};

use lotto_db::models::Draw;

/// Historique trié du plus récent au plus ancien : `draws()[0]` a le plus grand `round`.
/// L'ordre d'entrée est indifférent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    draws: Vec<Draw>,
}

impl History {
    pub fn new(draws: &[Draw]) -> Self {
        Self::from_vec(draws.to_vec())
    }

    pub fn from_vec(mut draws: Vec<Draw>) -> Self {
        draws.sort_by(|a, b| b.round.cmp(&a.round));
        Self { draws }
    }

    pub fn draws(&self) -> &[Draw] {
        &self.draws
    }

    pub fn len(&self) -> usize {
        self.draws.len()
    }

    pub fn is_empty(&self) -> bool {
        self.draws.is_empty()
    }

    /// Dernier tour connu, 0 pour un historique vide.
    pub fn latest_round(&self) -> u32 {
        latest_round(&self.draws)
    }

    /// Les `window` tirages les plus récents (fenêtre tronquée si l'historique est plus court).
    pub fn recent(&self, window: usize) -> &[Draw] {
        &self.draws[..window.min(self.draws.len())]
    }

    /// Empreinte SHA-256 du contenu, utilisée comme clé de cache.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for draw in &self.draws {
            hasher.update(draw.round.to_le_bytes());
            hasher.update(draw.sorted_numbers());
            hasher.update([draw.bonus]);
        }
        hex::encode(hasher.finalize())
    }
}

impl From<Vec<Draw>> for History {
    fn from(draws: Vec<Draw>) -> Self {
        Self::from_vec(draws)
    }
}

pub(crate) fn latest_round(draws: &[Draw]) -> u32 {
    draws.first().map(|d| d.round).unwrap_or(0)
}

#[cfg(test)]
pub(crate) fn make_test_draws(n: usize) -> Vec<Draw> {
    // Tirages déterministes, du plus récent (tour n) au plus ancien (tour 1).
    (0..n)
        .map(|i| {
            let round = (n - i) as u32;
            let base = (i % 7) as u8 * 6;
            Draw {
                round,
                draw_date: String::new(),
                numbers: [
                    base + 1,
                    base + 2 + (i % 3) as u8,
                    base + 5,
                    (base + 14) % 45 + 1,
                    (base + 27) % 45 + 1,
                    (base + 38) % 45 + 1,
                ],
                bonus: (i % 45) as u8 + 1,
            }
        })
        .collect()
}
