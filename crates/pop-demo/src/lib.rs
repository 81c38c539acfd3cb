//! Corridor: a small deterministic game for the replay sandbox
//!
//! The player walks down a corridor picking up armor and wading through
//! nukage. It reads input only through DOM key events and time only through
//! the host, so a replay of the same input reproduces the same stats.

pub mod canvas;
pub mod corridor;
pub mod game;

pub use canvas::{Canvas, Color};
pub use corridor::{Corridor, CorridorSettings};
pub use game::{Controls, GameState, Happening};
