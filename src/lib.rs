//! Gaintrack Engine
//!
//! Platform-agnostic core logic for the donation-driven weight-gain
//! tracker. This crate provides the full simulation - donation
//! application, unlock progression, trait assignment, snapshot diffing and
//! narration - without UI or platform-specific dependencies.

pub mod change;
pub mod constants;
pub mod donation;
pub mod donation_log;
pub mod metadata;
pub mod narrate;
pub mod rng;
pub mod state;
pub mod stats;
pub mod traits;

// Re-export commonly used types
pub use change::{
    CharacterChange, OutfitChange, character_weight_gained_lbs, diff_character, diff_outfit,
    diff_sequence, diff_states,
};
pub use donation::{Donation, UNDECLARED_OUTFIT, apply_donation, apply_donations};
pub use donation_log::{
    RawDonation, parse_donation_line, parse_donation_log, parse_raw_line, parse_raw_log,
};
pub use metadata::{
    Build, CharacterGroup, CharacterMetadata, GameMetadata, OutfitMetadata, Roster, Shape,
};
pub use narrate::{format_weight, narrate_report, narrate_sequence};
pub use rng::hash_index;
pub use state::{
    BROKEN_OUTFIT_SLUG, BrokenOutfitState, CharacterState, GameState, LookupError, OutfitState,
    OutfitStateMut, OutfitStateRef, RosterState,
};
pub use stats::{
    CharacterStats, average, bigger_than_the_x_smallest_combined, character_totals, gini, median,
    sum,
};
pub use traits::{
    RARE_TRAITS, is_rare_trait, select_trait_for, select_trait_for_broken,
    select_trait_for_initial, trait_display_name,
};

/// Trait for abstracting roster loading operations
/// Platform-specific implementations should provide this
pub trait RosterSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the roster metadata from the platform-specific source
    ///
    /// # Errors
    ///
    /// Returns an error if the roster cannot be loaded.
    fn load_roster(&self) -> Result<Roster, Self::Error>;
}

/// Everything a full replay produces: the parsed donations, the snapshot
/// chain (initial state first) and the rendered narration.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayOutcome {
    pub donations: Vec<Donation>,
    pub snapshots: Vec<RosterState>,
    pub narration: Vec<String>,
}

/// Main engine for driving tracker sessions from a roster source.
pub struct TrackerEngine<S>
where
    S: RosterSource,
{
    source: S,
}

impl<S> TrackerEngine<S>
where
    S: RosterSource,
{
    /// Create a new engine with the provided roster source
    pub const fn new(source: S) -> Self {
        Self { source }
    }

    /// Build the initial snapshot from the source's roster.
    ///
    /// # Errors
    ///
    /// Returns an error if the roster cannot be loaded.
    pub fn initial_state(&self) -> Result<RosterState, S::Error> {
        Ok(RosterState::init(&self.source.load_roster()?))
    }

    /// Replay a donation list from a fresh initial state.
    ///
    /// # Errors
    ///
    /// Returns an error if the roster cannot be loaded or a donation
    /// targets an unknown character or outfit.
    pub fn replay(&self, donations: &[Donation]) -> Result<Vec<RosterState>, anyhow::Error>
    where
        S::Error: Into<anyhow::Error>,
    {
        let roster = self.source.load_roster().map_err(Into::into)?;
        let snapshots = apply_donations(&roster, RosterState::init(&roster), donations)?;
        Ok(snapshots)
    }

    /// Parse a comma-separated donation log, replay it and narrate the net
    /// result.
    ///
    /// # Errors
    ///
    /// Returns an error if the roster cannot be loaded or a donation
    /// targets an unknown character or outfit.
    pub fn replay_log(&self, log: &str) -> Result<ReplayOutcome, anyhow::Error>
    where
        S::Error: Into<anyhow::Error>,
    {
        let roster = self.source.load_roster().map_err(Into::into)?;
        let donations = parse_donation_log(log);
        let snapshots = apply_donations(&roster, RosterState::init(&roster), &donations)?;
        let narration = narrate_sequence(&roster, &snapshots);
        Ok(ReplayOutcome {
            donations,
            snapshots,
            narration,
        })
    }
}
