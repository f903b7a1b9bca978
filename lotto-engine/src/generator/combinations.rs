use lotto_db::models::PICK_COUNT;

/// Combinaisons de 6 indices parmi `n`, en ordre lexicographique.
#[derive(Debug, Clone)]
pub struct IndexCombinations {
    n: usize,
    indices: [usize; PICK_COUNT],
    done: bool,
}

impl IndexCombinations {
    pub fn new(n: usize) -> Self {
        let mut indices = [0usize; PICK_COUNT];
        for (i, slot) in indices.iter_mut().enumerate() {
            *slot = i;
        }
        Self {
            n,
            indices,
            done: n < PICK_COUNT,
        }
    }
}

impl Iterator for IndexCombinations {
    type Item = [usize; PICK_COUNT];

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let current = self.indices;

        // Indice le plus à droite encore incrémentable.
        let mut i = PICK_COUNT;
        loop {
            if i == 0 {
                self.done = true;
                break;
            }
            i -= 1;
            if self.indices[i] < self.n - PICK_COUNT + i {
                self.indices[i] += 1;
                for j in (i + 1)..PICK_COUNT {
                    self.indices[j] = self.indices[j - 1] + 1;
                }
                break;
            }
        }
        Some(current)
    }
}

/// Coefficient binomial C(n, k).
pub fn binomial(n: u64, k: u64) -> u64 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    (0..k).fold(1u64, |acc, i| acc * (n - i) / (i + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_matches_binomial() {
        assert_eq!(IndexCombinations::new(20).count(), 38_760);
        assert_eq!(binomial(20, 6), 38_760);
        assert_eq!(binomial(45, 6), 8_145_060);
        assert_eq!(IndexCombinations::new(6).count(), 1);
        assert_eq!(IndexCombinations::new(5).count(), 0);
    }

    #[test]
    fn test_lexicographic_order() {
        let all: Vec<_> = IndexCombinations::new(8).collect();
        assert_eq!(all[0], [0, 1, 2, 3, 4, 5]);
        assert_eq!(all[1], [0, 1, 2, 3, 4, 6]);
        assert_eq!(all[all.len() - 1], [2, 3, 4, 5, 6, 7]);
        assert!(all.windows(2).all(|w| w[0] < w[1]));
    }
}
