//! HRM Tuner - keyboard log timing analyzer
//!
//! Reconstructs per-key hold intervals from captured press/release logs,
//! classifies modifier-candidate holds as taps vs modifier use, and derives
//! home row modifier timing parameters from the distributions.

pub mod analysis;
pub mod config;
pub mod events;
pub mod report;

pub use config::Config;
