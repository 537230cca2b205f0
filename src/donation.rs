//! Donation application: the core state machine.
//!
//! A donation is applied to a deep copy of the snapshot, never in place.
//! The order of operations is fixed: primary application (declared outfit
//! or undeclared cascade), the unconditional broken-outfit add, then the
//! cross-character spillover pass which also drives the unlock state
//! machine for every character of the same game.

use serde::{Deserialize, Serialize};

use crate::constants::{GAME_SPILLOVER_RATIO, UNLOCK_CHARACTER_THRESHOLD};
use crate::metadata::Roster;
use crate::state::{CharacterState, LookupError, OutfitStateMut, RosterState};
use crate::traits::{select_trait_for, select_trait_for_broken};

/// Outfit slug sentinel for donations that name no outfit.
pub const UNDECLARED_OUTFIT: &str = "undeclared";

/// One donation record: target character, target outfit (or
/// [`UNDECLARED_OUTFIT`]) and a non-negative amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Donation {
    pub character: String,
    pub outfit: String,
    pub amount: f64,
}

/// Apply a single donation and return the resulting snapshot.
///
/// The input snapshot is never mutated; a validation failure aborts the
/// whole operation with no partial state change observable to the caller.
///
/// # Errors
///
/// Returns [`LookupError::UnknownCharacter`] when the donation targets an
/// absent character, [`LookupError::UnknownOutfit`] when it names an outfit
/// the character does not have.
pub fn apply_donation(
    roster: &Roster,
    state: &RosterState,
    donation: &Donation,
) -> Result<RosterState, LookupError> {
    let mut next = state.clone();

    {
        let character = next.character_mut(&donation.character)?;
        if donation.outfit == UNDECLARED_OUTFIT {
            character.donation_received += donation.amount;
            add_weight_to_character(character, donation.amount);
        } else {
            match character.outfit_state_mut(&donation.outfit)? {
                OutfitStateMut::Outfit(outfit) => {
                    outfit.donation_received += donation.amount;
                    outfit.weight_lbs += donation.amount;
                }
                OutfitStateMut::Broken(broken) => {
                    broken.donation_received += donation.amount;
                    broken.weight_lbs += donation.amount;
                }
            }
        }
        // The broken slot accumulates the full amount of every donation to
        // the character, even before it is claimed.
        character.broken_outfit.weight_lbs += donation.amount;
    }

    let Some(game_index) = next.game_index_of(&donation.character) else {
        return Ok(next);
    };
    let spillover = donation.amount * GAME_SPILLOVER_RATIO;
    for character in &mut next.games[game_index].characters {
        add_weight_to_character(character, spillover);
        character.broken_outfit.weight_lbs += spillover;
        update_character_unlock(roster, character);
    }

    Ok(next)
}

/// Fold a donation list into a snapshot sequence. The first element is the
/// initial state; each donation appends one snapshot. Roster entries gated
/// on a donation count are introduced as the count is reached.
///
/// # Errors
///
/// Propagates the first lookup failure; snapshots up to that point are
/// discarded with the error.
pub fn apply_donations(
    roster: &Roster,
    initial: RosterState,
    donations: &[Donation],
) -> Result<Vec<RosterState>, LookupError> {
    let mut snapshots = Vec::with_capacity(donations.len() + 1);
    snapshots.push(initial);
    for (index, donation) in donations.iter().enumerate() {
        let donation_number = u32::try_from(index + 1).unwrap_or(u32::MAX);
        let mut next = apply_donation(roster, &snapshots[index], donation)?;
        next.extend_roster(roster, donation_number);
        snapshots.push(next);
    }
    Ok(snapshots)
}

/// Weight-spillover cascade: fill each outfit's remaining room in
/// progression order, stop once the amount is spent, and hand any leftover
/// to the broken slot.
pub(crate) fn add_weight_to_character(character: &mut CharacterState, amount: f64) {
    let mut remaining = amount;
    for outfit in &mut character.outfits {
        if remaining <= 0.0 {
            break;
        }
        let to_outfit = remaining.min(outfit.room_lbs());
        outfit.weight_lbs += to_outfit;
        remaining -= to_outfit;
    }
    character.broken_outfit.weight_lbs += remaining;
}

/// Unlock state machine, run once per character per donation.
///
/// A character unlocks when cumulative donations reach the threshold.
/// Outfits then unlock strictly in sequence: each outgrown outfit opens at
/// most the next one. Once the last outfit is unlocked and outgrown the
/// broken slot is claimed, permanently, borrowing the most-donated outfit's
/// skin.
pub(crate) fn update_character_unlock(roster: &Roster, character: &mut CharacterState) {
    let unlocked = character.total_donations() >= UNLOCK_CHARACTER_THRESHOLD
        || character.is_unlocked();
    if !unlocked || character.broken_outfit.slug.is_some() || character.outfits.is_empty() {
        return;
    }

    character.outfits[0].unlocked = true;
    if character.outfits[0].trait_slug.is_none() {
        assign_trait(roster, character, 0);
    }

    for i in 0..character.outfits.len() - 1 {
        if !character.outfits[i].is_outgrown() {
            break;
        }
        character.outfits[i + 1].unlocked = true;
        if character.outfits[i + 1].trait_slug.is_none() {
            assign_trait(roster, character, i + 1);
        }
    }

    let last = character.outfits.len() - 1;
    if character.outfits[last].unlocked && character.outfits[last].is_outgrown() {
        character.broken_outfit.slug = character.most_donated_outfit().map(str::to_string);
        character.broken_outfit.trait_slug =
            select_trait_for_broken(roster, character).map(str::to_string);
    }
}

fn assign_trait(roster: &Roster, character: &mut CharacterState, index: usize) {
    let outfit_slug = character.outfits[index].slug.clone();
    let chosen = select_trait_for(roster, character, &outfit_slug).map(str::to_string);
    character.outfits[index].trait_slug = chosen;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::fixtures::sample_state;
    use crate::state::{BrokenOutfitState, OutfitState};

    fn donation(character: &str, outfit: &str, amount: f64) -> Donation {
        Donation {
            character: character.to_string(),
            outfit: outfit.to_string(),
            amount,
        }
    }

    #[test]
    fn apply_donation_works_on_a_copy_of_the_input() {
        let roster = Roster::sample();
        let input = sample_state();
        let output =
            apply_donation(&roster, &input, &donation("edelgard", "undeclared", 100.0)).unwrap();
        assert_ne!(output, input);
        assert_eq!(input, sample_state());
    }

    #[test]
    fn apply_donation_rejects_unknown_character() {
        let roster = Roster::sample();
        let err = apply_donation(
            &roster,
            &sample_state(),
            &donation("marcille", "undeclared", 100.0),
        )
        .unwrap_err();
        assert_eq!(err, LookupError::UnknownCharacter("marcille".to_string()));
    }

    #[test]
    fn apply_donation_rejects_unknown_outfit() {
        let roster = Roster::sample();
        let err = apply_donation(
            &roster,
            &sample_state(),
            &donation("edelgard", "winter", 100.0),
        )
        .unwrap_err();
        assert_eq!(
            err,
            LookupError::UnknownOutfit {
                character: "edelgard".to_string(),
                outfit: "winter".to_string(),
            }
        );
    }

    #[test]
    fn undeclared_donation_unlocks_character_past_threshold() {
        let roster = Roster::sample();
        let output = apply_donation(
            &roster,
            &sample_state(),
            &donation("chloe", "undeclared", 200.0),
        )
        .unwrap();

        let chloe = output.character("chloe").unwrap();
        assert!(chloe.is_unlocked());
        assert!(chloe.outfits[0].trait_slug.is_some());
        assert_eq!(chloe.total_donations(), 250.0);
        // 200 baseline + 200 cascade + 40 self-spillover.
        assert_eq!(chloe.outfits[0].weight_lbs, 440.0);
        assert_eq!(chloe.broken_outfit.weight_lbs, 440.0);

        // Siblings in the same game absorb 20% through their own cascade.
        let timerra = output.character("timerra").unwrap();
        assert!(!timerra.is_unlocked());
        assert_eq!(timerra.outfits[0].weight_lbs, 210.0);
        assert_eq!(timerra.outfits[1].weight_lbs, 230.0);
        assert_eq!(timerra.broken_outfit.weight_lbs, 240.0);
    }

    #[test]
    fn declared_donation_skips_the_cascade_and_cascades_siblings() {
        let roster = Roster::sample();
        let output =
            apply_donation(&roster, &sample_state(), &donation("edelgard", "base", 2000.0))
                .unwrap();

        let edelgard = output.character("edelgard").unwrap();
        assert_eq!(edelgard.outfits[0].donation_received, 2020.0);
        assert_eq!(edelgard.outfits[0].weight_lbs, 2400.0);
        assert_eq!(edelgard.total_donations(), 2190.0);
        // The spillover pass filled summer to its threshold and unlocked it.
        assert!(edelgard.outfits[1].unlocked);
        assert_eq!(edelgard.outfits[1].weight_lbs, 500.0);
        assert!(edelgard.outfits[1].trait_slug.is_some());
        // Last outfit outgrown: the broken slot is claimed from the
        // most-donated outfit.
        assert_eq!(edelgard.broken_outfit.slug.as_deref(), Some("base"));
        assert!(edelgard.broken_outfit.trait_slug.is_some());
        assert_eq!(edelgard.broken_outfit.weight_lbs, 2920.0);

        let annette = output.character("annette").unwrap();
        assert_eq!(annette.outfits[0].weight_lbs, 200.0);
        assert_eq!(annette.broken_outfit.weight_lbs, 2720.0);
        assert_eq!(annette.broken_outfit.slug.as_deref(), Some("christmas"));

        let kronya = output.character("kronya").unwrap();
        assert_eq!(kronya.outfits[0].weight_lbs, 1500.0);
        assert_eq!(kronya.broken_outfit.weight_lbs, 2800.0);

        // The other game is untouched.
        let chloe = output.character("chloe").unwrap();
        assert_eq!(chloe.outfits[0].weight_lbs, 200.0);
    }

    #[test]
    fn donation_past_every_threshold_lands_in_broken() {
        let roster = Roster::sample();
        let output = apply_donation(
            &roster,
            &sample_state(),
            &donation("kronya", "undeclared", 1000.0),
        )
        .unwrap();

        let kronya = output.character("kronya").unwrap();
        // 2000 + 1000 cascade overflow + 1000 unconditional + 200 + 200.
        assert_eq!(kronya.broken_outfit.weight_lbs, 4400.0);
    }

    #[test]
    fn broken_outfit_can_be_donated_to_directly() {
        let roster = Roster::sample();
        let output =
            apply_donation(&roster, &sample_state(), &donation("kronya", "broken", 100.0))
                .unwrap();

        let kronya = output.character("kronya").unwrap();
        assert_eq!(kronya.broken_outfit.donation_received, 400.0);
        // 100 direct + 100 unconditional + 20 cascade overflow + 20 spill.
        assert_eq!(kronya.broken_outfit.weight_lbs, 2240.0);
        // The claim is one-way: the borrowed slug never changes.
        assert_eq!(kronya.broken_outfit.slug.as_deref(), Some("base"));
    }

    #[test]
    fn unlock_happens_on_the_exact_threshold_donation() {
        let roster = Roster::sample();
        let state = sample_state();

        let short = apply_donation(&roster, &state, &donation("timerra", "undeclared", 74.0))
            .unwrap();
        let timerra = short.character("timerra").unwrap();
        assert_eq!(timerra.total_donations(), 124.0);
        assert!(!timerra.is_unlocked());
        assert!(timerra.outfits[0].trait_slug.is_none());

        let exact = apply_donation(&roster, &state, &donation("timerra", "undeclared", 75.0))
            .unwrap();
        let timerra = exact.character("timerra").unwrap();
        assert_eq!(timerra.total_donations(), 125.0);
        assert!(timerra.is_unlocked());
        assert!(timerra.outfits[0].trait_slug.is_some());
        // The first outfit filled to its threshold, so the next one opened
        // in the same pass.
        assert!(timerra.outfits[0].is_outgrown());
        assert!(timerra.outfits[1].unlocked);
        assert!(!timerra.outfits[1].is_outgrown());
        assert!(timerra.broken_outfit.slug.is_none());
    }

    #[test]
    fn cascade_conserves_weight_until_thresholds_fill() {
        let mut state = sample_state();
        let timerra = state.character_mut("timerra").unwrap();

        add_weight_to_character(timerra, 5.0);
        assert_eq!(timerra.outfits[0].weight_lbs, 205.0);
        assert_eq!(timerra.outfits[1].weight_lbs, 200.0);
        assert_eq!(timerra.broken_outfit.weight_lbs, 200.0);

        // Room left: 5 in base, 400 in harvest; the excess 95 overflows.
        add_weight_to_character(timerra, 500.0);
        assert_eq!(timerra.outfits[0].weight_lbs, 210.0);
        assert_eq!(timerra.outfits[1].weight_lbs, 600.0);
        assert_eq!(timerra.broken_outfit.weight_lbs, 295.0);
    }

    #[test]
    fn unlock_walk_never_skips_a_gate() {
        fn outfit(slug: &str, unlocked: bool, weight: f64) -> OutfitState {
            OutfitState {
                slug: slug.to_string(),
                unlocked,
                donation_received: 0.0,
                weight_lbs: weight,
                threshold_lbs: 320.0,
                trait_slug: None,
            }
        }
        let roster = Roster::sample();
        let mut petra = CharacterState {
            slug: "petra".to_string(),
            donation_received: 200.0,
            outfits: vec![
                outfit("base", true, 320.0),
                outfit("winter", false, 200.0),
                outfit("summer", false, 200.0),
            ],
            broken_outfit: BrokenOutfitState::default(),
        };

        update_character_unlock(&roster, &mut petra);
        assert!(petra.outfits[1].unlocked);
        assert!(!petra.outfits[2].unlocked);
        assert!(petra.broken_outfit.slug.is_none());

        petra.outfits[1].weight_lbs = 400.0;
        update_character_unlock(&roster, &mut petra);
        assert!(petra.outfits[2].unlocked);
        assert!(petra.broken_outfit.slug.is_none());

        petra.outfits[2].weight_lbs = 400.0;
        update_character_unlock(&roster, &mut petra);
        // All donations tie at zero, so the earliest outfit is borrowed.
        assert_eq!(petra.broken_outfit.slug.as_deref(), Some("base"));
    }

    #[test]
    fn apply_donations_builds_the_snapshot_chain() {
        let roster = Roster::sample();
        let initial = RosterState::init(&roster);
        let snapshots = apply_donations(
            &roster,
            initial.clone(),
            &[
                donation("chloe", "undeclared", 10.0),
                donation("edelgard", "base", 5.0),
            ],
        )
        .unwrap();

        assert_eq!(snapshots.len(), 3);
        assert_eq!(snapshots[0], initial);
        // veyle's whole kit is gated on the second donation.
        assert!(snapshots[1].character("veyle").is_err());
        assert!(snapshots[2].character("veyle").is_ok());
    }
}
