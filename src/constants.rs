//! Centralized balance and tuning constants for the tracker simulation.
//!
//! These values define the deterministic math for the donation engine and
//! the change reporting layer. Keeping them together ensures that the
//! simulation can only be adjusted via code changes reviewed in version
//! control, rather than through external assets.

// Donation tuning ----------------------------------------------------------
pub(crate) const UNLOCK_CHARACTER_THRESHOLD: f64 = 125.0;
pub(crate) const GAME_SPILLOVER_RATIO: f64 = 0.2;

// Donation-log parsing -----------------------------------------------------
pub(crate) const DONATION_LOG_SCALE: f64 = 1.42;

// Trait selection ----------------------------------------------------------
pub(crate) const RARE_TRAIT_LOTTERY_BOUND: usize = 10;

// Change reporting ---------------------------------------------------------
pub(crate) const INSIGNIFICANT_CHANGE_THRESHOLD_LBS: f64 = 1.0;
