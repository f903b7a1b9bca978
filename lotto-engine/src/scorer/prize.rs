/// Ajustement du score brut lié au partage des gains, indépendant de l'historique.
pub trait PrizeAdjustment: Send + Sync {
    fn name(&self) -> &str;
    /// Points bruts ajoutés (ou retirés) au numéro.
    fn adjust(&self, number: u8) -> f64;
}

/// Favorise les numéros au-delà des dates de naissance (32-45), pénalise 1-12.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BirthdayAvoidance {
    pub weight: f64,
}

impl BirthdayAvoidance {
    pub const HIGH_FROM: u8 = 32;
    pub const LOW_UPTO: u8 = 12;

    pub fn new(weight: f64) -> Self {
        Self { weight }
    }
}

impl PrizeAdjustment for BirthdayAvoidance {
    fn name(&self) -> &str {
        "birthday-avoidance"
    }

    fn adjust(&self, number: u8) -> f64 {
        if number >= Self::HIGH_FROM {
            self.weight * 100.0
        } else if number <= Self::LOW_UPTO {
            -self.weight * 50.0
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NoPrizeAdjustment;

impl PrizeAdjustment for NoPrizeAdjustment {
    fn name(&self) -> &str {
        "none"
    }

    fn adjust(&self, _number: u8) -> f64 {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_birthday_avoidance_bands() {
        let prize = BirthdayAvoidance::new(0.15);
        assert!((prize.adjust(32) - 15.0).abs() < 1e-12);
        assert!((prize.adjust(45) - 15.0).abs() < 1e-12);
        assert!((prize.adjust(12) + 7.5).abs() < 1e-12);
        assert!((prize.adjust(1) + 7.5).abs() < 1e-12);
        assert_eq!(prize.adjust(13), 0.0);
        assert_eq!(prize.adjust(31), 0.0);
    }

    #[test]
    fn test_no_adjustment() {
        let prize: Box<dyn PrizeAdjustment> = Box::new(NoPrizeAdjustment);
        assert!((1..=45).all(|n| prize.adjust(n) == 0.0));
        assert_eq!(prize.name(), "none");
    }
}
