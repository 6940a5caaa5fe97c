//! Property-based tests for dice, terrain and the player ledger.

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use wayfarer::{
    Command, DiceConfig, GenerationConfig, Ledger, NoiseField, PlayerState, Position, WeaponTier,
    WorldState, TIER_TABLE,
};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    /// Every roll lands between the configuration's minimum and maximum.
    #[test]
    fn prop_roll_within_bounds(
        count in 0u32..12,
        sides in 1u32..20,
        modifier in 0u32..50,
        seed in any::<u64>()
    ) {
        let dice = DiceConfig::new(count, sides, modifier);
        let mut rng = StdRng::seed_from_u64(seed);
        for _ in 0..32 {
            let roll = dice.roll(&mut rng);
            prop_assert!(roll >= dice.min_roll());
            prop_assert!(roll <= dice.max_roll());
        }
    }

    /// Upgrading never lowers expected damage.
    #[test]
    fn prop_upgrade_never_weakens(
        count in 0u32..12,
        sides in 1u32..20,
        modifier in 0u32..50,
        level in 0u32..6
    ) {
        let dice = DiceConfig::new(count, sides, modifier);
        prop_assert!(dice.upgraded(level).average() >= dice.average());
    }

    #[test]
    fn prop_noise_in_unit_range(
        seed in any::<u32>(),
        x in -100_000i32..100_000,
        y in -100_000i32..100_000
    ) {
        let field = NoiseField::new(&GenerationConfig::new(seed));
        let value = field.sample(x, y);
        prop_assert!((-1.0..=1.0).contains(&value));
        prop_assert_eq!(value, field.sample(x, y));
    }

    /// Once a tile has been looked at it never changes by looking again.
    #[test]
    fn prop_terrain_lookup_is_stable(
        seed in any::<u32>(),
        x in -10_000i32..10_000,
        y in -10_000i32..10_000
    ) {
        let mut world = WorldState::new(seed);
        let pos = Position::new(x, y);
        let first = world.terrain_at(pos);
        world.ensure_area(pos, 1);
        prop_assert_eq!(world.terrain_at(pos), first);
        prop_assert_eq!(world.known_terrain(pos), Some(first));
    }

    /// Failed removals leave the ledger as it was.
    #[test]
    fn prop_ledger_removal_is_atomic(
        coins in 0u64..1_000,
        take_coins in 0u64..2_000,
        wood in 0u32..50,
        take_wood in 0u32..100
    ) {
        let mut player = PlayerState::empty();
        player.add_coins(coins);
        player.add_item("wood", wood);

        match player.remove_coins(take_coins) {
            Ok(()) => prop_assert_eq!(player.coins(), coins - take_coins),
            Err(_) => {
                prop_assert!(take_coins > coins);
                prop_assert_eq!(player.coins(), coins);
            }
        }
        match player.remove_item("wood", take_wood) {
            Ok(()) => prop_assert_eq!(player.item_count("wood"), wood - take_wood),
            Err(_) => {
                prop_assert!(take_wood > wood);
                prop_assert_eq!(player.item_count("wood"), wood);
            }
        }
    }

    /// The command parser rejects junk instead of panicking.
    #[test]
    fn prop_command_parsing_never_panics(line in "\\PC{0,40}") {
        let _ = line.parse::<Command>();
    }
}

#[test]
fn test_tier_averages_increase() {
    let averages: Vec<f64> = TIER_TABLE.iter().map(|stats| stats.expected_average()).collect();
    for pair in averages.windows(2) {
        assert!(pair[0] < pair[1], "tier averages not increasing: {averages:?}");
    }
    for tier in WeaponTier::all() {
        assert!(!tier.stats().dice_options.is_empty());
    }
}
