//! # Rendering Module
//!
//! Plain-text output for the terminal front end: the ASCII map, town
//! interiors and information panels.

pub mod display;
pub mod ui;

pub use display::*;
pub use ui::*;
