//! Flavor-trait pools and deterministic selection.
//!
//! Traits are assigned exactly once, when an outfit (or the broken slot)
//! unlocks. The eligible pool is derived from the outfit's shapes and the
//! character's build, the pick is a [`hash_index`] into the
//! lexicographically sorted pool, and a rare-trait lottery may preempt the
//! common pool at most once per character.

use smallvec::SmallVec;

use crate::constants::RARE_TRAIT_LOTTERY_BOUND;
use crate::metadata::{Build, CharacterMetadata, Roster, Shape};
use crate::rng::hash_index;
use crate::state::CharacterState;

pub(crate) type TraitPool = SmallVec<[&'static str; 32]>;

const BASE_TRAITS: [&str; 13] = [
    "Active",
    "Cellulite",
    "Extra_Plush",
    "Fat_Face",
    "Fat_Forearms",
    "Fat_Hands",
    "Rolly",
    "Sedentary",
    "Slob",
    "Stretch_Marks",
    "Thick_Fupa",
    "Thin_Face",
    "Thin_Forearms",
];

const PEAR_TRAITS: [&str; 4] = ["All_Ass", "All_Hips", "All_Thighs", "Huge_Calves"];

const APPLE_TRAITS: [&str; 5] = [
    "Beer_Gut",
    "Front_Butt",
    "Mega_Muffin",
    "Quad_Boobs",
    "Triple_Belly",
];

const HOURGLASS_OR_TOP_HEAVY_TRAITS: [&str; 3] = ["Dangling_Melons", "Huge_Arms", "Perky_Melons"];

const NOT_ROUND_TOP_HEAVY_OR_APPLE_TRAITS: [&str; 1] = ["Small_Belly"];

const NOT_HOURGLASS_OR_PEAR_TRAITS: [&str; 1] = ["Thinnish_Legs"];

const NOT_HOURGLASS_OR_TOP_HEAVY_TRAITS: [&str; 2] = ["No_Boobs", "Small_Boobs"];

const NO_SECONDARY_SHAPE_TRAITS: [&str; 1] = ["Extreme"];

const STRONG_TRAITS: [&str; 1] = ["Strongfat"];

/// Characters whose build is not Strong but who still roll the strength
/// pool.
const STRONG_EXCEPTION_SLUG: &str = "etie";

/// Rare traits, kept lexicographically sorted so the lottery draw indexes a
/// stable list.
pub const RARE_TRAITS: [&str; 7] = [
    "Blob_Bound",
    "Bound_Feeder",
    "Chaos_Feeder",
    "Generous",
    "Greedy_Guts",
    "Mutual_Gainer",
    "Self_Feeder",
];

/// Whether a trait slug belongs to the rare list.
#[must_use]
pub fn is_rare_trait(slug: &str) -> bool {
    RARE_TRAITS.contains(&slug)
}

/// Human-readable name for a trait slug; unknown slugs fall back to
/// themselves.
#[must_use]
pub fn trait_display_name(slug: &str) -> &str {
    match slug {
        "Active" => "Active",
        "All_Ass" => "All ass",
        "All_Hips" => "All hips",
        "All_Thighs" => "All thighs",
        "Beer_Gut" => "Beer gut",
        "Blob_Bound" => "Blob bound",
        "Bound_Feeder" => "Bound feeder",
        "Cellulite" => "Cellulite",
        "Chaos_Feeder" => "Chaos feeder",
        "Dangling_Melons" => "Dangling melons",
        "Extra_Plush" => "Extra plush",
        "Extreme" => "Extreme",
        "Fat_Face" => "Fat face",
        "Fat_Forearms" => "Fat forearms",
        "Fat_Hands" => "Fat hands",
        "Front_Butt" => "Front butt",
        "Generous" => "Generous",
        "Greedy_Guts" => "Greedy guts",
        "Huge_Arms" => "Huge arms",
        "Huge_Calves" => "Huge calves",
        "Mega_Muffin" => "Mega muffin",
        "Mutual_Gainer" => "Mutual gainer",
        "No_Boobs" => "No boobs",
        "Perky_Melons" => "Perky melons",
        "Quad_Boobs" => "Quad boobs",
        "Rolly" => "Rolly",
        "Sedentary" => "Sedentary",
        "Self_Feeder" => "Self feeder",
        "Slob" => "Slob",
        "Small_Belly" => "Small belly",
        "Small_Boobs" => "Small boobs",
        "Stretch_Marks" => "Stretch marks",
        "Strongfat" => "Strongfat",
        "Thick_Fupa" => "Thick fupa",
        "Thin_Face" => "Thin face",
        "Thin_Forearms" => "Thin forearms",
        "Thinnish_Legs" => "Thinnish legs",
        "Triple_Belly" => "Triple belly",
        other => other,
    }
}

/// Assemble the common pool for a shape/build combination. The three
/// exclusion rules are independent: a shape can add from several of them.
pub(crate) fn common_pool(
    character_slug: &str,
    build: Build,
    main_shape: Shape,
    secondary_shape: Option<Shape>,
) -> TraitPool {
    let mut pool = TraitPool::from_slice(&BASE_TRAITS);
    match main_shape {
        Shape::Pear => pool.extend_from_slice(&PEAR_TRAITS),
        Shape::Apple => pool.extend_from_slice(&APPLE_TRAITS),
        Shape::Hourglass | Shape::TopHeavy => {
            pool.extend_from_slice(&HOURGLASS_OR_TOP_HEAVY_TRAITS);
        }
        Shape::Round => {}
    }
    if !matches!(main_shape, Shape::Round | Shape::TopHeavy | Shape::Apple) {
        pool.extend_from_slice(&NOT_ROUND_TOP_HEAVY_OR_APPLE_TRAITS);
    }
    if !matches!(main_shape, Shape::Hourglass | Shape::Pear) {
        pool.extend_from_slice(&NOT_HOURGLASS_OR_PEAR_TRAITS);
    }
    if !matches!(main_shape, Shape::Hourglass | Shape::TopHeavy) {
        pool.extend_from_slice(&NOT_HOURGLASS_OR_TOP_HEAVY_TRAITS);
    }
    if secondary_shape.is_none() {
        pool.extend_from_slice(&NO_SECONDARY_SHAPE_TRAITS);
    }
    if character_slug == STRONG_EXCEPTION_SLUG || build == Build::Strong {
        pool.extend_from_slice(&STRONG_TRAITS);
    }
    pool
}

fn assigned_traits(character: &CharacterState) -> SmallVec<[&str; 8]> {
    character
        .outfits
        .iter()
        .filter_map(|o| o.trait_slug.as_deref())
        .collect()
}

/// Pick a trait for an outfit that just unlocked.
///
/// Traits already worn by the character's other outfits are excluded. The
/// rare lottery runs first: outside the bootstrap outfit of an
/// initial-roster character, a character with more than one outfit and no
/// rare trait yet has a deterministic 1-in-10 draw on an independently
/// salted seed. Returns `None` when the roster has no metadata for the
/// outfit or the pool comes up empty.
#[must_use]
pub fn select_trait_for(
    roster: &Roster,
    character: &CharacterState,
    outfit_slug: &str,
) -> Option<&'static str> {
    let character_meta = roster.character(&character.slug)?;
    let outfit_meta = roster.outfit(&character.slug, outfit_slug)?;
    let seed = format!("{}-{}", character.slug, outfit_slug);

    let assigned = assigned_traits(character);
    let mut pool = common_pool(
        &character.slug,
        character_meta.build,
        outfit_meta.main_shape,
        outfit_meta.secondary_shape,
    );
    pool.retain(|slug| !assigned.iter().any(|assigned| assigned == slug));

    let is_bootstrap = character_meta.initial_roster
        && character_meta
            .outfits
            .first()
            .is_some_and(|o| o.slug == outfit_slug);
    let rare_selected = !is_bootstrap
        && character_meta.outfits.len() > 1
        && !assigned.iter().any(|slug| is_rare_trait(slug))
        && hash_index(&format!("{seed}-rare"), RARE_TRAIT_LOTTERY_BOUND) == 0;
    if rare_selected {
        return Some(RARE_TRAITS[hash_index(&seed, RARE_TRAITS.len())]);
    }

    pool.sort_unstable();
    if pool.is_empty() {
        return None;
    }
    Some(pool[hash_index(&seed, pool.len())])
}

/// Pick the bootstrap trait for the first outfit of an initial-roster
/// character. No prior state exists, so no reuse-exclusion and no rare
/// lottery apply.
#[must_use]
pub fn select_trait_for_initial(character: &CharacterMetadata) -> Option<&'static str> {
    let outfit = character.outfits.first()?;
    let seed = format!("{}-{}", character.slug, outfit.slug);
    let mut pool = common_pool(
        &character.slug,
        character.build,
        outfit.main_shape,
        outfit.secondary_shape,
    );
    pool.sort_unstable();
    if pool.is_empty() {
        return None;
    }
    Some(pool[hash_index(&seed, pool.len())])
}

/// Pick a trait for a freshly claimed broken outfit, drawing from the
/// borrowed outfit's shape pool and seeding with the character slug alone.
#[must_use]
pub fn select_trait_for_broken(roster: &Roster, character: &CharacterState) -> Option<&'static str> {
    let character_meta = roster.character(&character.slug)?;
    let borrowed_slug = character.broken_outfit.slug.as_deref()?;
    let outfit_meta = roster.outfit(&character.slug, borrowed_slug)?;

    let assigned = assigned_traits(character);
    let mut pool = common_pool(
        &character.slug,
        character_meta.build,
        outfit_meta.main_shape,
        outfit_meta.secondary_shape,
    );
    pool.retain(|slug| !assigned.iter().any(|assigned| assigned == slug));
    pool.sort_unstable();
    if pool.is_empty() {
        return None;
    }
    Some(pool[hash_index(&character.slug, pool.len())])
}
