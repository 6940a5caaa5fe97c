//! # Game Mathematics
//!
//! Numeric helpers shared by the weapon and player models.

/// Rounds to one decimal place.
///
/// # Examples
///
/// ```
/// use wayfarer::round_to_tenth;
///
/// assert_eq!(round_to_tenth(17.55), 17.6);
/// assert_eq!(round_to_tenth(9.0), 9.0);
/// ```
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Adds `amount` to a stat, capping at `max`.
pub fn add_capped(value: u32, amount: u32, max: u32) -> u32 {
    value.saturating_add(amount).min(max)
}
