//! # Utilities Module
//!
//! Small numeric helpers and the clock collaborator used for cooldowns.

pub mod clock;
pub mod math;

pub use clock::*;
pub use math::*;
