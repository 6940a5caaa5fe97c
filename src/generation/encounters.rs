//! # Encounter Generation
//!
//! Picks the enemy guarding a stronghold from the terrain around it.

use crate::{Enemy, EnemyPool, GenerationConfig, Generator, TerrainCode, WayfarerError, WayfarerResult};
use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

/// Chooses a stronghold's enemy.
///
/// One of the surrounding tiles is drawn uniformly, so each terrain is picked
/// in proportion to how often it appears; its pool supplies the enemy of the
/// stronghold's tier.
#[derive(Debug, Clone)]
pub struct EncounterGenerator {
    pub tier: u8,
    pub surroundings: Vec<TerrainCode>,
}

impl EncounterGenerator {
    pub fn new(tier: u8, surroundings: Vec<TerrainCode>) -> Self {
        Self { tier, surroundings }
    }

    /// Draws the pool the enemy comes from.
    pub fn choose_pool<R: Rng + ?Sized>(&self, rng: &mut R) -> EnemyPool {
        self.surroundings
            .choose(rng)
            .map_or(EnemyPool::City, |terrain| EnemyPool::for_terrain(*terrain))
    }

    pub fn choose_enemy<R: Rng + ?Sized>(&self, rng: &mut R) -> Enemy {
        let pool = self.choose_pool(rng);
        let kind = pool.enemy_for_tier(self.tier);
        debug!("stronghold tier {} draws {:?} from {:?}", self.tier, kind, pool);
        Enemy::new(kind)
    }
}

impl Generator<Enemy> for EncounterGenerator {
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> WayfarerResult<Enemy> {
        let enemy = self.choose_enemy(rng);
        self.validate(&enemy, config)?;
        Ok(enemy)
    }

    fn validate(&self, enemy: &Enemy, _config: &GenerationConfig) -> WayfarerResult<()> {
        if enemy.tier() != self.tier.clamp(1, 3) {
            return Err(WayfarerError::InvalidState(format!(
                "{} is tier {}, stronghold is tier {}",
                enemy.name(),
                enemy.tier(),
                self.tier
            )));
        }
        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "EncounterGenerator"
    }
}
