//! Mutable snapshot tree of simulated progress.
//!
//! A [`RosterState`] is a value: the donation engine clones it, mutates the
//! clone and hands it back, so callers can keep every prior snapshot for
//! diffing and replay.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::metadata::{CharacterMetadata, GameMetadata, Roster};
use crate::traits;

/// Outfit slug sentinel routing lookups to the broken outfit.
pub const BROKEN_OUTFIT_SLUG: &str = "broken";

/// Lookup failures surfaced by state queries and donation targeting.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("unknown character {0}")]
    UnknownCharacter(String),
    #[error("unknown outfit {outfit} for character {character}")]
    UnknownOutfit { character: String, outfit: String },
}

/// Progress of a single outfit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutfitState {
    pub slug: String,
    pub unlocked: bool,
    pub donation_received: f64,
    pub weight_lbs: f64,
    pub threshold_lbs: f64,
    /// Flavor trait, assigned once on unlock.
    #[serde(default, rename = "trait")]
    pub trait_slug: Option<String>,
}

impl OutfitState {
    /// An outfit is outgrown once its weight reaches the threshold.
    #[must_use]
    pub fn is_outgrown(&self) -> bool {
        self.weight_lbs >= self.threshold_lbs
    }

    /// Weight still missing before the outfit is outgrown.
    #[must_use]
    pub fn room_lbs(&self) -> f64 {
        (self.threshold_lbs - self.weight_lbs).max(0.0)
    }
}

/// Terminal overflow slot reached once every regular outfit is outgrown.
/// `slug` stays empty until claimed and is immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BrokenOutfitState {
    #[serde(default)]
    pub slug: Option<String>,
    pub donation_received: f64,
    pub weight_lbs: f64,
    #[serde(default, rename = "trait")]
    pub trait_slug: Option<String>,
}

/// Shared-reference view over a regular or broken outfit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutfitStateRef<'a> {
    Outfit(&'a OutfitState),
    Broken(&'a BrokenOutfitState),
}

/// Mutable view over a regular or broken outfit.
#[derive(Debug, PartialEq)]
pub enum OutfitStateMut<'a> {
    Outfit(&'a mut OutfitState),
    Broken(&'a mut BrokenOutfitState),
}

/// Progress of a single character: undeclared donations, the ordered
/// unlock progression and the broken-outfit slot. The outfit list is
/// append-only and never reordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterState {
    pub slug: String,
    /// Money donated to the character without naming an outfit.
    pub donation_received: f64,
    pub outfits: Vec<OutfitState>,
    pub broken_outfit: BrokenOutfitState,
}

impl CharacterState {
    /// A character is unlocked when its first outfit is.
    #[must_use]
    pub fn is_unlocked(&self) -> bool {
        self.outfits.first().is_some_and(|o| o.unlocked)
    }

    /// Cumulative donations: undeclared + every outfit + broken.
    #[must_use]
    pub fn total_donations(&self) -> f64 {
        self.donation_received
            + self
                .outfits
                .iter()
                .map(|o| o.donation_received)
                .sum::<f64>()
            + self.broken_outfit.donation_received
    }

    /// Slug of the outfit that received the most donations. Ties keep the
    /// earliest outfit in progression order.
    #[must_use]
    pub fn most_donated_outfit(&self) -> Option<&str> {
        let mut best: Option<&OutfitState> = None;
        for outfit in &self.outfits {
            if best.is_none_or(|b| outfit.donation_received > b.donation_received) {
                best = Some(outfit);
            }
        }
        best.map(|o| o.slug.as_str())
    }

    /// Look up an outfit by slug; `"broken"` routes to the broken outfit.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::UnknownOutfit`] when no outfit matches.
    pub fn outfit_state(&self, outfit_slug: &str) -> Result<OutfitStateRef<'_>, LookupError> {
        if outfit_slug == BROKEN_OUTFIT_SLUG {
            return Ok(OutfitStateRef::Broken(&self.broken_outfit));
        }
        self.outfits
            .iter()
            .find(|o| o.slug == outfit_slug)
            .map(OutfitStateRef::Outfit)
            .ok_or_else(|| LookupError::UnknownOutfit {
                character: self.slug.clone(),
                outfit: outfit_slug.to_string(),
            })
    }

    /// Mutable variant of [`Self::outfit_state`].
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::UnknownOutfit`] when no outfit matches.
    pub fn outfit_state_mut(
        &mut self,
        outfit_slug: &str,
    ) -> Result<OutfitStateMut<'_>, LookupError> {
        if outfit_slug == BROKEN_OUTFIT_SLUG {
            return Ok(OutfitStateMut::Broken(&mut self.broken_outfit));
        }
        let character = self.slug.clone();
        self.outfits
            .iter_mut()
            .find(|o| o.slug == outfit_slug)
            .map(OutfitStateMut::Outfit)
            .ok_or(LookupError::UnknownOutfit {
                character,
                outfit: outfit_slug.to_string(),
            })
    }
}

/// Progress of one game's cast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub slug: String,
    pub characters: Vec<CharacterState>,
}

/// The full snapshot: every game, in roster order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RosterState {
    pub games: Vec<GameState>,
}

impl RosterState {
    /// Build the initial snapshot from roster metadata.
    ///
    /// Characters whose outfits are all introduced later are left out
    /// entirely; outfits with an introduction gate are skipped. Only the
    /// first outfit of an initial-roster character starts unlocked, and it
    /// receives its bootstrap trait.
    #[must_use]
    pub fn init(roster: &Roster) -> Self {
        Self {
            games: roster.games.iter().map(Self::init_game).collect(),
        }
    }

    fn init_game(game: &GameMetadata) -> GameState {
        GameState {
            slug: game.slug.clone(),
            characters: game
                .characters
                .iter()
                .filter_map(Self::init_character)
                .collect(),
        }
    }

    fn init_character(character: &CharacterMetadata) -> Option<CharacterState> {
        let all_outfits_added_later = character
            .outfits
            .iter()
            .all(|o| o.introduced_after_donation.is_some());
        if all_outfits_added_later {
            return None;
        }

        let baseline = character.build.initial_weight_lbs();
        let outfits = character
            .outfits
            .iter()
            .enumerate()
            .filter(|(_, o)| o.introduced_after_donation.is_none())
            .map(|(i, o)| {
                let unlocked = i == 0 && character.initial_roster;
                OutfitState {
                    slug: o.slug.clone(),
                    unlocked,
                    donation_received: 0.0,
                    weight_lbs: baseline,
                    threshold_lbs: o.threshold_lbs,
                    trait_slug: if unlocked {
                        traits::select_trait_for_initial(character).map(str::to_string)
                    } else {
                        None
                    },
                }
            })
            .collect();

        Some(CharacterState {
            slug: character.slug.clone(),
            donation_received: 0.0,
            outfits,
            broken_outfit: BrokenOutfitState::default(),
        })
    }

    /// Find a character across all games.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::UnknownCharacter`] when the slug is absent.
    pub fn character(&self, slug: &str) -> Result<&CharacterState, LookupError> {
        self.games
            .iter()
            .flat_map(|g| &g.characters)
            .find(|c| c.slug == slug)
            .ok_or_else(|| LookupError::UnknownCharacter(slug.to_string()))
    }

    /// Mutable variant of [`Self::character`].
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::UnknownCharacter`] when the slug is absent.
    pub fn character_mut(&mut self, slug: &str) -> Result<&mut CharacterState, LookupError> {
        self.games
            .iter_mut()
            .flat_map(|g| &mut g.characters)
            .find(|c| c.slug == slug)
            .ok_or_else(|| LookupError::UnknownCharacter(slug.to_string()))
    }

    /// Index of the game a character belongs to.
    #[must_use]
    pub fn game_index_of(&self, character_slug: &str) -> Option<usize> {
        self.games
            .iter()
            .position(|g| g.characters.iter().any(|c| c.slug == character_slug))
    }

    /// Cumulative donations for a character, `0.0` when absent.
    #[must_use]
    pub fn total_donations_for(&self, slug: &str) -> f64 {
        self.character(slug)
            .map_or(0.0, CharacterState::total_donations)
    }

    /// Grow the tree with characters and outfits introduced at exactly
    /// `donation_number`. Additive and idempotent: existing entries are
    /// never altered, and re-invoking with the same count is a no-op.
    pub fn extend_roster(&mut self, roster: &Roster, donation_number: u32) {
        for game_meta in &roster.games {
            let Some(game) = self.games.iter_mut().find(|g| g.slug == game_meta.slug) else {
                continue;
            };

            for character_meta in &game_meta.characters {
                let introduced_now = character_meta
                    .outfits
                    .first()
                    .and_then(|o| o.introduced_after_donation)
                    == Some(donation_number);
                let already_present = game
                    .characters
                    .iter()
                    .any(|c| c.slug == character_meta.slug);
                if introduced_now && !already_present {
                    game.characters.push(CharacterState {
                        slug: character_meta.slug.clone(),
                        donation_received: 0.0,
                        outfits: Vec::new(),
                        broken_outfit: BrokenOutfitState::default(),
                    });
                }
            }

            for character in &mut game.characters {
                let Some(character_meta) = game_meta
                    .characters
                    .iter()
                    .find(|c| c.slug == character.slug)
                else {
                    continue;
                };
                for outfit_meta in &character_meta.outfits {
                    if outfit_meta.introduced_after_donation != Some(donation_number) {
                        continue;
                    }
                    if character.outfits.iter().any(|o| o.slug == outfit_meta.slug) {
                        continue;
                    }
                    // A late outfit opens up immediately when the character
                    // has already outgrown everything else.
                    let unlocked = !character.outfits.is_empty()
                        && character.outfits.iter().all(OutfitState::is_outgrown);
                    character.outfits.push(OutfitState {
                        slug: outfit_meta.slug.clone(),
                        unlocked,
                        donation_received: 0.0,
                        weight_lbs: character_meta.build.initial_weight_lbs(),
                        threshold_lbs: outfit_meta.threshold_lbs,
                        trait_slug: None,
                    });
                    if unlocked {
                        let chosen = traits::select_trait_for(roster, character, &outfit_meta.slug)
                            .map(str::to_string);
                        if let Some(outfit) = character
                            .outfits
                            .iter_mut()
                            .find(|o| o.slug == outfit_meta.slug)
                        {
                            outfit.trait_slug = chosen;
                        }
                    }
                }
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::sample_state;
    use super::*;

    #[test]
    fn total_donations_include_character_outfits_and_broken() {
        let state = sample_state();
        assert_eq!(state.total_donations_for("edelgard"), 190.0);
        assert_eq!(state.total_donations_for("kronya"), 1450.0);
        assert_eq!(state.total_donations_for("marcille"), 0.0);
    }

    #[test]
    fn init_unlocks_only_initial_roster_bootstrap_outfits() {
        let roster = Roster::sample();
        let state = RosterState::init(&roster);

        let edelgard = state.character("edelgard").unwrap();
        assert_eq!(edelgard.donation_received, 0.0);
        assert_eq!(edelgard.broken_outfit.weight_lbs, 0.0);
        assert!(edelgard.broken_outfit.slug.is_none());
        // "fallen" is gated behind a later donation count.
        assert_eq!(edelgard.outfits.len(), 2);
        assert!(edelgard.outfits[0].unlocked);
        assert!(edelgard.outfits[0].trait_slug.is_some());
        assert_eq!(edelgard.outfits[0].weight_lbs, 120.0);
        assert!(!edelgard.outfits[1].unlocked);
        assert!(edelgard.outfits[1].trait_slug.is_none());

        let annette = state.character("annette").unwrap();
        assert!(annette.outfits[0].unlocked);
        assert_eq!(annette.outfits[0].weight_lbs, 100.0);

        let kronya = state.character("kronya").unwrap();
        assert!(!kronya.outfits[0].unlocked);
        assert!(kronya.outfits[0].trait_slug.is_none());

        // Every outfit of veyle is introduced later, so she is absent.
        assert!(state.character("veyle").is_err());
    }

    #[test]
    fn character_lookup_reports_unknown_slug() {
        let state = sample_state();
        assert_eq!(
            state.character("marcille").unwrap_err(),
            LookupError::UnknownCharacter("marcille".to_string())
        );
    }

    #[test]
    fn outfit_lookup_routes_broken_sentinel() {
        let state = sample_state();
        let kronya = state.character("kronya").unwrap();
        match kronya.outfit_state("broken").unwrap() {
            OutfitStateRef::Broken(broken) => assert_eq!(broken.weight_lbs, 2000.0),
            OutfitStateRef::Outfit(_) => panic!("expected the broken slot"),
        }
        assert_eq!(
            kronya.outfit_state("winter").unwrap_err(),
            LookupError::UnknownOutfit {
                character: "kronya".to_string(),
                outfit: "winter".to_string(),
            }
        );
    }

    #[test]
    fn most_donated_outfit_keeps_earliest_on_ties() {
        let state = sample_state();
        let edelgard = state.character("edelgard").unwrap();
        // base and summer both sit at 20; base comes first.
        assert_eq!(edelgard.most_donated_outfit(), Some("base"));
    }

    #[test]
    fn extend_roster_adds_gated_entries_once() {
        let roster = Roster::sample();
        let mut state = RosterState::init(&roster);
        assert!(state.character("veyle").is_err());

        state.extend_roster(&roster, 2);
        let veyle = state.character("veyle").unwrap();
        assert_eq!(veyle.outfits.len(), 1);
        assert!(!veyle.outfits[0].unlocked);
        assert_eq!(veyle.outfits[0].weight_lbs, 100.0);

        let snapshot = state.clone();
        state.extend_roster(&roster, 2);
        assert_eq!(state, snapshot);
    }

    #[test]
    fn extend_roster_leaves_existing_entries_untouched() {
        let roster = Roster::sample();
        let mut state = RosterState::init(&roster);
        let edelgard_before = state.character("edelgard").unwrap().clone();

        state.extend_roster(&roster, 3);
        let edelgard = state.character("edelgard").unwrap();
        assert_eq!(edelgard.outfits.len(), 3);
        assert_eq!(edelgard.outfits[..2], edelgard_before.outfits[..]);
        // Nothing outgrown yet, so the late outfit stays locked.
        assert!(!edelgard.outfits[2].unlocked);
    }
}
