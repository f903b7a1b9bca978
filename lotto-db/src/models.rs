use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Plus grand numéro tirable.
pub const MAX_NUMBER: u8 = 45;
/// Nombre de numéros principaux par tirage.
pub const PICK_COUNT: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draw {
    pub round: u32,
    pub draw_date: String,
    pub numbers: [u8; 6],
    pub bonus: u8,
}

impl Draw {
    pub fn new(round: u32, numbers: [u8; 6], bonus: u8) -> Self {
        Self {
            round,
            draw_date: String::new(),
            numbers,
            bonus,
        }
    }

    pub fn sorted_numbers(&self) -> [u8; 6] {
        let mut sorted = self.numbers;
        sorted.sort();
        sorted
    }
}

pub fn validate_draw(numbers: &[u8], bonus: u8) -> Result<()> {
    if numbers.len() != PICK_COUNT {
        bail!("Attendu {} numéros, reçu {}", PICK_COUNT, numbers.len());
    }
    for &n in numbers {
        if n < 1 || n > MAX_NUMBER {
            bail!("Numéro {} hors limites (1-{})", n, MAX_NUMBER);
        }
    }
    if bonus < 1 || bonus > MAX_NUMBER {
        bail!("Bonus {} hors limites (1-{})", bonus, MAX_NUMBER);
    }
    for i in 0..numbers.len() {
        for j in (i + 1)..numbers.len() {
            if numbers[i] == numbers[j] {
                bail!("Numéro en double : {}", numbers[i]);
            }
        }
    }
    Ok(())
}
