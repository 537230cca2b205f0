//! Rendering change reports as natural-language lines.
//!
//! Thin layer over the diff engine and the hash RNG: each sentence bucket
//! holds a few phrasings and the rendered one is picked with a
//! [`hash_index`] over a stable semantic key, so the same report always
//! narrates identically.

use crate::change::{CharacterChange, OutfitChange, character_weight_gained_lbs, diff_sequence};
use crate::constants::INSIGNIFICANT_CHANGE_THRESHOLD_LBS;
use crate::metadata::Roster;
use crate::rng::hash_index;
use crate::state::RosterState;

const UNLOCKED_AND_BROKEN_TEMPLATES: [&str; 2] = [
    "{character} has just been unlocked and has already outgrown all her outfits.",
    "{character} joined the roster and blew through every outfit she has.",
];

const BROKEN_NAME_TEMPLATES: [&str; 2] = [
    "Her broken outfit is '{broken}'.",
    "She now falls back on her broken '{broken}' outfit.",
];

const UNLOCKED_TEMPLATES: [&str; 3] = [
    "{character} has just been unlocked and is ready to outgrow her outfits.",
    "{character} has joined the roster and is ready to start growing.",
    "{character} is unlocked at last, outfits at the ready.",
];

const BROKEN_ONLY_TEMPLATES: [&str; 2] = [
    "{character} has outgrown all her outfits.",
    "{character} has no outfit left that fits.",
];

const BROKEN_GAIN_TEMPLATES: [&str; 2] = [
    "{character} has gained {gain}lbs in her broken outfit.",
    "{character} put another {gain}lbs onto her broken outfit.",
];

const OUTFIT_UNLOCKED_OUTGROWN_TEMPLATES: [&str; 2] = [
    "{character}'s {outfit} outfit has been unlocked and already outgrown (weight: {weight}lbs).",
    "{character} unlocked her {outfit} outfit only to outgrow it on the spot (weight: {weight}lbs).",
];

const OUTFIT_UNLOCKED_TEMPLATES: [&str; 2] = [
    "{character}'s {outfit} outfit has been unlocked (weight: {weight}lbs).",
    "{character} just unlocked her {outfit} outfit (weight: {weight}lbs).",
];

const OUTFIT_OUTGROWN_TEMPLATES: [&str; 2] = [
    "{character} has outgrown her {outfit} outfit (+{gain}lbs, new weight {weight}lbs).",
    "{character} finally split out of her {outfit} outfit (+{gain}lbs, new weight {weight}lbs).",
];

const OUTFIT_STRETCH_TEMPLATES: [&str; 3] = [
    "{character} is stretching her {outfit} outfit (+{gain}lbs, new weight {weight}lbs).",
    "{character}'s {outfit} outfit is getting tighter (+{gain}lbs, new weight {weight}lbs).",
    "{character} keeps filling out her {outfit} outfit (+{gain}lbs, new weight {weight}lbs).",
];

/// Render a weight as a whole number of pounds, half rounding away from
/// zero, no grouping separators.
#[must_use]
pub fn format_weight(weight: f64) -> String {
    format!("{:.0}", weight.round())
}

fn pick<'a>(templates: &'a [&'a str], seed: &str) -> &'a str {
    templates[hash_index(seed, templates.len())]
}

/// Narrate a snapshot chain: diff the first and last snapshots and render
/// every character's block, separated by blank lines (none before the
/// first block).
#[must_use]
pub fn narrate_sequence(roster: &Roster, snapshots: &[RosterState]) -> Vec<String> {
    narrate_report(roster, &diff_sequence(snapshots))
}

/// Render an already-computed change report.
#[must_use]
pub fn narrate_report(roster: &Roster, changes: &[CharacterChange]) -> Vec<String> {
    let mut lines = Vec::new();
    for change in changes {
        let block = narrate_character(roster, change);
        if block.is_empty() {
            continue;
        }
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.extend(block);
    }
    lines
}

fn narrate_character(roster: &Roster, change: &CharacterChange) -> Vec<String> {
    let name = roster.character_display_name(&change.slug);
    let gain = format_weight(character_weight_gained_lbs(change));
    let seed = format!("{}-{gain}", change.slug);

    let mut sentences = Vec::new();
    if change.unlocked && change.broken_unlock_slug.is_some() {
        sentences.push(pick(&UNLOCKED_AND_BROKEN_TEMPLATES, &seed).replace("{character}", name));
        if let Some(slug) = &change.broken_unlock_slug {
            sentences.push(broken_name_line(roster, change, slug, &seed));
        }
    } else if change.unlocked {
        sentences.push(pick(&UNLOCKED_TEMPLATES, &seed).replace("{character}", name));
    } else if let Some(slug) = &change.broken_unlock_slug {
        sentences.push(pick(&BROKEN_ONLY_TEMPLATES, &seed).replace("{character}", name));
        sentences.push(broken_name_line(roster, change, slug, &seed));
    } else if change.new_state.broken_outfit.slug.is_some()
        && change.broken_weight_gain_lbs >= INSIGNIFICANT_CHANGE_THRESHOLD_LBS
    {
        sentences.push(
            pick(&BROKEN_GAIN_TEMPLATES, &seed)
                .replace("{character}", name)
                .replace("{gain}", &format_weight(change.broken_weight_gain_lbs)),
        );
    }

    for outfit_change in &change.outfit_changes {
        sentences.push(narrate_outfit(roster, &change.slug, name, outfit_change));
    }
    sentences
}

fn broken_name_line(
    roster: &Roster,
    change: &CharacterChange,
    broken_slug: &str,
    seed: &str,
) -> String {
    pick(&BROKEN_NAME_TEMPLATES, seed).replace(
        "{broken}",
        roster.outfit_display_name(&change.slug, broken_slug),
    )
}

fn narrate_outfit(
    roster: &Roster,
    character_slug: &str,
    character_name: &str,
    change: &OutfitChange,
) -> String {
    let outfit_name = roster
        .outfit_display_name(character_slug, &change.slug)
        .to_lowercase();
    let gain = format_weight(change.weight_gained_lbs);
    let seed = format!("{character_slug}-{}-{gain}", change.slug);

    let templates: &[&str] = if change.unlocked && change.outgrown {
        &OUTFIT_UNLOCKED_OUTGROWN_TEMPLATES
    } else if change.unlocked {
        &OUTFIT_UNLOCKED_TEMPLATES
    } else if change.outgrown {
        &OUTFIT_OUTGROWN_TEMPLATES
    } else {
        &OUTFIT_STRETCH_TEMPLATES
    };

    pick(templates, &seed)
        .replace("{character}", character_name)
        .replace("{outfit}", &outfit_name)
        .replace("{gain}", &gain)
        .replace("{weight}", &format_weight(change.new_state.weight_lbs))
}
