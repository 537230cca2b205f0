//! Before/after snapshot diffing and significance ranking.
//!
//! Diffs are total functions: they either produce a change record or an
//! explicit "nothing significant", never an error. Pairing is positional
//! (games and characters by index, outfits by progression slot), which the
//! append-only state tree guarantees to be stable.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::constants::INSIGNIFICANT_CHANGE_THRESHOLD_LBS;
use crate::state::{CharacterState, OutfitState, RosterState};

/// What happened to one outfit between two snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutfitChange {
    pub slug: String,
    /// True when the outfit went from locked to unlocked.
    pub unlocked: bool,
    /// Donation delta (after minus before).
    pub donation_received: f64,
    /// Trait, surfaced only on the unlock event itself.
    #[serde(default, rename = "trait")]
    pub trait_slug: Option<String>,
    pub weight_gained_lbs: f64,
    /// True when the outgrown state flipped.
    pub outgrown: bool,
    /// After-state, kept for rendering.
    pub new_state: OutfitState,
}

/// What happened to one character between two snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterChange {
    pub slug: String,
    /// Read off the first outfit change before sorting, not "any outfit
    /// unlocked".
    pub unlocked: bool,
    /// Borrowed slug, surfaced only when the broken slot was claimed
    /// between the snapshots.
    pub broken_unlock_slug: Option<String>,
    pub broken_unlock_trait: Option<String>,
    pub broken_donation_received: f64,
    pub broken_weight_gain_lbs: f64,
    /// Outfit changes, most significant first.
    pub outfit_changes: Vec<OutfitChange>,
    /// After-state, kept for rendering.
    pub new_state: CharacterState,
}

/// Total weight a character gained, across all outfit changes and the
/// broken slot.
#[must_use]
pub fn character_weight_gained_lbs(change: &CharacterChange) -> f64 {
    change
        .outfit_changes
        .iter()
        .map(|c| c.weight_gained_lbs)
        .sum::<f64>()
        + change.broken_weight_gain_lbs
}

/// Diff one outfit slot. `None` means nothing worth reporting: the outfit
/// stayed locked without receiving money, or nothing moved past the
/// significance threshold.
#[must_use]
pub fn diff_outfit(before: &OutfitState, after: &OutfitState) -> Option<OutfitChange> {
    let donation_delta = after.donation_received - before.donation_received;
    if !after.unlocked && donation_delta == 0.0 {
        return None;
    }

    let weight_delta = after.weight_lbs - before.weight_lbs;
    let outgrown_changed = before.is_outgrown() != after.is_outgrown();
    if donation_delta == 0.0
        && before.unlocked == after.unlocked
        && weight_delta < INSIGNIFICANT_CHANGE_THRESHOLD_LBS
        && !outgrown_changed
    {
        return None;
    }

    Some(OutfitChange {
        slug: before.slug.clone(),
        unlocked: before.unlocked != after.unlocked,
        donation_received: donation_delta,
        trait_slug: if before.unlocked {
            None
        } else {
            after.trait_slug.clone()
        },
        weight_gained_lbs: weight_delta,
        outgrown: outgrown_changed,
        new_state: after.clone(),
    })
}

/// Diff one character. `None` when no outfit changed and the broken slot
/// moved less than the significance threshold.
#[must_use]
pub fn diff_character(before: &CharacterState, after: &CharacterState) -> Option<CharacterChange> {
    let mut outfit_changes: Vec<OutfitChange> = before
        .outfits
        .iter()
        .zip(&after.outfits)
        .filter_map(|(b, a)| diff_outfit(b, a))
        .collect();

    let broken_weight_gain = after.broken_outfit.weight_lbs - before.broken_outfit.weight_lbs;
    if outfit_changes.is_empty() && broken_weight_gain < INSIGNIFICANT_CHANGE_THRESHOLD_LBS {
        return None;
    }

    let unlocked = outfit_changes.first().is_some_and(|c| c.unlocked);
    let broken_claimed = before.broken_outfit.slug.is_none() && after.broken_outfit.slug.is_some();

    sort_by_significance(&mut outfit_changes, |c| c.weight_gained_lbs, |c| c.slug.as_str());

    Some(CharacterChange {
        slug: before.slug.clone(),
        unlocked,
        broken_unlock_slug: if broken_claimed {
            after.broken_outfit.slug.clone()
        } else {
            None
        },
        broken_unlock_trait: if broken_claimed {
            after.broken_outfit.trait_slug.clone()
        } else {
            None
        },
        broken_donation_received: after.broken_outfit.donation_received
            - before.broken_outfit.donation_received,
        broken_weight_gain_lbs: broken_weight_gain,
        outfit_changes,
        new_state: after.clone(),
    })
}

/// Diff two full snapshots, pairing games and characters by position, and
/// rank the resulting character changes by significance.
#[must_use]
pub fn diff_states(before: &RosterState, after: &RosterState) -> Vec<CharacterChange> {
    let mut changes: Vec<CharacterChange> = before
        .games
        .iter()
        .zip(&after.games)
        .flat_map(|(b, a)| b.characters.iter().zip(&a.characters))
        .filter_map(|(b, a)| diff_character(b, a))
        .collect();
    sort_by_significance(&mut changes, character_weight_gained_lbs, |c| c.slug.as_str());
    changes
}

/// Diff a snapshot chain: only the first and last snapshots are compared,
/// so deltas are net of every intermediate step. One snapshot or fewer
/// yields nothing.
#[must_use]
pub fn diff_sequence(snapshots: &[RosterState]) -> Vec<CharacterChange> {
    let (Some(first), Some(last)) = (snapshots.first(), snapshots.last()) else {
        return Vec::new();
    };
    if snapshots.len() <= 1 {
        return Vec::new();
    }
    diff_states(first, last)
}

/// Sort ascending by (weight, slug) and reverse. Not equivalent to sorting
/// descending: the reverse also flips the alphabetical tie-break, and the
/// reference behavior depends on that.
fn sort_by_significance<T>(
    changes: &mut [T],
    weight: impl Fn(&T) -> f64,
    slug: impl Fn(&T) -> &str,
) {
    changes.sort_by(|a, b| {
        match weight(a).total_cmp(&weight(b)) {
            Ordering::Equal => slug(a).cmp(slug(b)),
            ordering => ordering,
        }
    });
    changes.reverse();
}
