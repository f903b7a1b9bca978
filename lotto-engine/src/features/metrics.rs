//! Mesures sur un seul ensemble de numéros (tirage ou grille candidate).
//!
//! Toutes les fonctions dédoublonnent et ignorent les valeurs hors de 1..=45 avant de compter,
//! pour qu'un tirage mal formé ne fausse pas l'AC ou la parité.

use lotto_db::models::MAX_NUMBER;

/// Seuil des numéros « hauts » (23-45).
pub const HIGH_THRESHOLD: u8 = 23;

/// Nombre minimal de différences distinctes pour 6 numéros sur une plage linéaire.
const MIN_DISTINCT_DIFFERENCES: i32 = 5;

pub const PRIME_NUMBERS: [u8; 14] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43];

pub const DOUBLE_NUMBERS: [u8; 4] = [11, 22, 33, 44];

/// Tranches 1-10, 11-20, 21-30, 31-40, 41-45.
pub const RANGE_BUCKETS: usize = 5;

pub fn distinct_numbers(numbers: &[u8]) -> Vec<u8> {
    let mut v: Vec<u8> = numbers
        .iter()
        .copied()
        .filter(|&n| (1..=MAX_NUMBER).contains(&n))
        .collect();
    v.sort_unstable();
    v.dedup();
    v
}

/// Valeur AC : nombre de différences absolues distinctes entre paires, moins 5.
pub fn ac_value(numbers: &[u8]) -> i32 {
    let sorted = distinct_numbers(numbers);
    let mut seen = [false; MAX_NUMBER as usize];
    let mut distinct = 0i32;
    for i in 0..sorted.len() {
        for j in (i + 1)..sorted.len() {
            let diff = (sorted[j] - sorted[i]) as usize;
            if !seen[diff] {
                seen[diff] = true;
                distinct += 1;
            }
        }
    }
    distinct - MIN_DISTINCT_DIFFERENCES
}

pub fn odd_count(numbers: &[u8]) -> usize {
    distinct_numbers(numbers).iter().filter(|&&n| n % 2 == 1).count()
}

pub fn high_count(numbers: &[u8]) -> usize {
    distinct_numbers(numbers)
        .iter()
        .filter(|&&n| n >= HIGH_THRESHOLD)
        .count()
}

pub fn number_sum(numbers: &[u8]) -> u32 {
    distinct_numbers(numbers).iter().map(|&n| n as u32).sum()
}

/// Nombre de paires adjacentes (après tri) dont l'écart vaut 1.
pub fn consecutive_pairs(numbers: &[u8]) -> usize {
    distinct_numbers(numbers)
        .windows(2)
        .filter(|w| w[1] - w[0] == 1)
        .count()
}

pub fn end_digit_counts(numbers: &[u8]) -> [usize; 10] {
    let mut counts = [0usize; 10];
    for n in distinct_numbers(numbers) {
        counts[(n % 10) as usize] += 1;
    }
    counts
}

/// Plus grande répétition d'un même chiffre des unités.
pub fn max_end_digit_repeat(numbers: &[u8]) -> usize {
    end_digit_counts(numbers).into_iter().max().unwrap_or(0)
}

pub fn prime_count(numbers: &[u8]) -> usize {
    distinct_numbers(numbers)
        .iter()
        .filter(|n| PRIME_NUMBERS.contains(n))
        .count()
}

/// Numéros communs entre deux tirages.
pub fn carryover(current: &[u8], previous: &[u8]) -> usize {
    let previous = distinct_numbers(previous);
    distinct_numbers(current)
        .iter()
        .filter(|n| previous.contains(n))
        .count()
}

/// Écart moyen entre numéros adjacents une fois triés.
pub fn mean_spacing(numbers: &[u8]) -> f64 {
    let sorted = distinct_numbers(numbers);
    if sorted.len() < 2 {
        return 0.0;
    }
    let total: u32 = sorted.windows(2).map(|w| (w[1] - w[0]) as u32).sum();
    total as f64 / (sorted.len() - 1) as f64
}

/// Indice de tranche (0..5) pour un numéro 1..=45.
pub fn range_bucket(number: u8) -> usize {
    match number {
        0..=10 => 0,
        11..=20 => 1,
        21..=30 => 2,
        31..=40 => 3,
        _ => 4,
    }
}
