//! # Fort Stock
//!
//! Weapon shop inventories for forts: one combat weapon of every tier.

use crate::{
    GenerationConfig, Generator, WayfarerError, WayfarerResult, Weapon, WeaponTier, WeaponType,
};
use rand::rngs::StdRng;
use rand::Rng;

/// Generates the five-weapon stock of a fort.
#[derive(Debug, Clone, Default)]
pub struct FortStockGenerator;

impl FortStockGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Forges a replacement for a sold weapon.
    pub fn restock<R: Rng + ?Sized>(&self, tier: WeaponTier, rng: &mut R) -> Weapon {
        Weapon::new(WeaponType::Combat, tier, rng)
    }
}

impl Generator<Vec<Weapon>> for FortStockGenerator {
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> WayfarerResult<Vec<Weapon>> {
        let stock: Vec<Weapon> = WeaponTier::all()
            .map(|tier| self.restock(tier, rng))
            .collect();
        self.validate(&stock, config)?;
        Ok(stock)
    }

    fn validate(&self, stock: &Vec<Weapon>, _config: &GenerationConfig) -> WayfarerResult<()> {
        let mut tiers: Vec<u8> = stock.iter().map(|weapon| weapon.tier.get()).collect();
        tiers.sort_unstable();
        if tiers != [1, 2, 3, 4, 5] {
            return Err(WayfarerError::InvalidState(format!(
                "fort stock must hold one weapon per tier, found tiers {tiers:?}"
            )));
        }
        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "FortStockGenerator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_rng, WeaponCategory};

    #[test]
    fn test_stock_has_one_weapon_per_tier() {
        let config = GenerationConfig::for_testing(3);
        let mut rng = create_rng(&config);
        let stock = FortStockGenerator::new().generate(&config, &mut rng).unwrap();

        assert_eq!(stock.len(), 5);
        for (index, weapon) in stock.iter().enumerate() {
            assert_eq!(usize::from(weapon.tier.get()), index + 1);
            assert_eq!(weapon.category(), WeaponCategory::Combat);
        }
    }

    #[test]
    fn test_validation_rejects_duplicate_tiers() {
        let config = GenerationConfig::for_testing(3);
        let mut rng = create_rng(&config);
        let generator = FortStockGenerator::new();
        let mut stock = generator.generate(&config, &mut rng).unwrap();
        stock[4] = generator.restock(WeaponTier::new(1).unwrap(), &mut rng);
        assert!(generator.validate(&stock, &config).is_err());
    }
}
