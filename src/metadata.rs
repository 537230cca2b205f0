use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Silhouette classification of an outfit. Gates which trait pools apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    Pear,
    Apple,
    Hourglass,
    TopHeavy,
    Round,
}

impl Shape {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pear => "pear",
            Self::Apple => "apple",
            Self::Hourglass => "hourglass",
            Self::TopHeavy => "top_heavy",
            Self::Round => "round",
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Shape {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pear" => Ok(Self::Pear),
            "apple" => Ok(Self::Apple),
            "hourglass" => Ok(Self::Hourglass),
            "top_heavy" => Ok(Self::TopHeavy),
            "round" => Ok(Self::Round),
            _ => Err(()),
        }
    }
}

/// Body-frame classification of a character. Fixes the baseline outfit
/// weight and feeds the strength-gated trait pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Build {
    Petite,
    #[default]
    Regular,
    Strong,
    Giant,
}

impl Build {
    /// Baseline weight every outfit of a character starts at, regardless of
    /// its threshold.
    #[must_use]
    pub const fn initial_weight_lbs(self) -> f64 {
        match self {
            Self::Petite => 100.0,
            Self::Regular => 120.0,
            Self::Strong => 160.0,
            Self::Giant => 300.0,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Petite => "petite",
            Self::Regular => "regular",
            Self::Strong => "strong",
            Self::Giant => "giant",
        }
    }
}

impl fmt::Display for Build {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static description of one outfit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutfitMetadata {
    pub name: String,
    pub slug: String,
    pub threshold_lbs: f64,
    pub main_shape: Shape,
    #[serde(default)]
    pub secondary_shape: Option<Shape>,
    /// When set, the outfit (and possibly its character) only joins the
    /// roster once this many donations have been applied.
    #[serde(default)]
    pub introduced_after_donation: Option<u32>,
}

/// Named sub-cast a character belongs to (display grouping only).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterGroup {
    pub name: String,
    pub slug: String,
}

/// Static description of one character and their unlock progression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterMetadata {
    pub name: String,
    pub slug: String,
    pub build: Build,
    #[serde(default)]
    pub initial_roster: bool,
    #[serde(default)]
    pub group: Option<CharacterGroup>,
    pub outfits: Vec<OutfitMetadata>,
}

/// Static description of one game and its cast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameMetadata {
    pub name: String,
    pub slug: String,
    pub characters: Vec<CharacterMetadata>,
}

/// Read-only roster store: games, characters, outfits. Fully loaded before
/// any state exists and never written afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Roster {
    pub games: Vec<GameMetadata>,
}

impl Roster {
    /// Create an empty roster (useful for tests)
    #[must_use]
    pub const fn empty() -> Self {
        Self { games: Vec::new() }
    }

    /// Load a roster from a JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into valid roster data.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Create a roster from pre-built game metadata
    #[must_use]
    pub fn from_games(games: Vec<GameMetadata>) -> Self {
        Self { games }
    }

    #[must_use]
    pub fn game(&self, slug: &str) -> Option<&GameMetadata> {
        self.games.iter().find(|g| g.slug == slug)
    }

    /// Find a character's metadata across all games.
    #[must_use]
    pub fn character(&self, slug: &str) -> Option<&CharacterMetadata> {
        self.games
            .iter()
            .flat_map(|g| &g.characters)
            .find(|c| c.slug == slug)
    }

    /// Find an outfit's metadata within a character.
    #[must_use]
    pub fn outfit(&self, character_slug: &str, outfit_slug: &str) -> Option<&OutfitMetadata> {
        self.character(character_slug)?
            .outfits
            .iter()
            .find(|o| o.slug == outfit_slug)
    }

    /// Display name for a character, falling back to the slug.
    #[must_use]
    pub fn character_display_name<'a>(&'a self, slug: &'a str) -> &'a str {
        self.character(slug).map_or(slug, |c| c.name.as_str())
    }

    /// Display name for an outfit within a character. The `"broken"`
    /// sentinel maps to "Broken"; unknown slugs fall back to themselves.
    #[must_use]
    pub fn outfit_display_name<'a>(&'a self, character_slug: &str, outfit_slug: &'a str) -> &'a str {
        if outfit_slug == "broken" {
            return "Broken";
        }
        self.outfit(character_slug, outfit_slug)
            .map_or(outfit_slug, |o| o.name.as_str())
    }

    /// Compact built-in roster covering both games of the reference cast.
    /// Used by the test suites and as a demo fixture.
    #[must_use]
    pub fn sample() -> Self {
        fn outfit(name: &str, slug: &str, threshold: f64, main: Shape) -> OutfitMetadata {
            OutfitMetadata {
                name: name.to_string(),
                slug: slug.to_string(),
                threshold_lbs: threshold,
                main_shape: main,
                secondary_shape: None,
                introduced_after_donation: None,
            }
        }

        Self {
            games: vec![
                GameMetadata {
                    name: "Three Houses".to_string(),
                    slug: "three_houses".to_string(),
                    characters: vec![
                        CharacterMetadata {
                            name: "Edelgard".to_string(),
                            slug: "edelgard".to_string(),
                            build: Build::Regular,
                            initial_roster: true,
                            group: Some(CharacterGroup {
                                name: "Students".to_string(),
                                slug: "students".to_string(),
                            }),
                            outfits: vec![
                                OutfitMetadata {
                                    secondary_shape: Some(Shape::Pear),
                                    ..outfit("Base", "base", 500.0, Shape::Hourglass)
                                },
                                outfit("Summer", "summer", 500.0, Shape::Apple),
                                OutfitMetadata {
                                    secondary_shape: Some(Shape::Apple),
                                    introduced_after_donation: Some(3),
                                    ..outfit("Fallen", "fallen", 800.0, Shape::TopHeavy)
                                },
                            ],
                        },
                        CharacterMetadata {
                            name: "Kronya".to_string(),
                            slug: "kronya".to_string(),
                            build: Build::Regular,
                            initial_roster: false,
                            group: Some(CharacterGroup {
                                name: "Professionals".to_string(),
                                slug: "professionals".to_string(),
                            }),
                            outfits: vec![OutfitMetadata {
                                secondary_shape: Some(Shape::Apple),
                                ..outfit("Base", "base", 500.0, Shape::Round)
                            }],
                        },
                        CharacterMetadata {
                            name: "Annette".to_string(),
                            slug: "annette".to_string(),
                            build: Build::Petite,
                            initial_roster: true,
                            group: Some(CharacterGroup {
                                name: "Students".to_string(),
                                slug: "students".to_string(),
                            }),
                            outfits: vec![outfit("Christmas", "christmas", 200.0, Shape::Pear)],
                        },
                    ],
                },
                GameMetadata {
                    name: "Engage".to_string(),
                    slug: "engage".to_string(),
                    characters: vec![
                        CharacterMetadata {
                            name: "Chloe".to_string(),
                            slug: "chloe".to_string(),
                            build: Build::Regular,
                            initial_roster: false,
                            group: None,
                            outfits: vec![OutfitMetadata {
                                secondary_shape: Some(Shape::Hourglass),
                                ..outfit("Spring", "spring", 600.0, Shape::Pear)
                            }],
                        },
                        CharacterMetadata {
                            name: "Timerra".to_string(),
                            slug: "timerra".to_string(),
                            build: Build::Regular,
                            initial_roster: false,
                            group: None,
                            outfits: vec![
                                outfit("Base", "base", 210.0, Shape::Apple),
                                outfit("Harvest", "harvest", 600.0, Shape::Hourglass),
                            ],
                        },
                        CharacterMetadata {
                            name: "Veyle".to_string(),
                            slug: "veyle".to_string(),
                            build: Build::Petite,
                            initial_roster: false,
                            group: None,
                            outfits: vec![OutfitMetadata {
                                introduced_after_donation: Some(2),
                                ..outfit("Base", "base", 400.0, Shape::Round)
                            }],
                        },
                    ],
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roster_from_json_parses_nested_structure() {
        let json = r#"{
            "games": [
                {
                    "name": "Three Houses",
                    "slug": "three_houses",
                    "characters": [
                        {
                            "name": "Edelgard",
                            "slug": "edelgard",
                            "build": "regular",
                            "initial_roster": true,
                            "outfits": [
                                {
                                    "name": "Base",
                                    "slug": "base",
                                    "threshold_lbs": 500,
                                    "main_shape": "hourglass",
                                    "secondary_shape": "pear"
                                }
                            ]
                        }
                    ]
                }
            ]
        }"#;

        let roster = Roster::from_json(json).unwrap();
        assert_eq!(roster.games.len(), 1);
        let edelgard = roster.character("edelgard").unwrap();
        assert!(edelgard.initial_roster);
        assert_eq!(edelgard.build, Build::Regular);
        let base = roster.outfit("edelgard", "base").unwrap();
        assert_eq!(base.main_shape, Shape::Hourglass);
        assert_eq!(base.secondary_shape, Some(Shape::Pear));
        assert!(base.introduced_after_donation.is_none());
    }

    #[test]
    fn lookups_resolve_across_games() {
        let roster = Roster::sample();
        assert!(roster.character("timerra").is_some());
        assert!(roster.character("marcille").is_none());
        assert!(roster.outfit("timerra", "harvest").is_some());
        assert!(roster.outfit("timerra", "winter").is_none());
        assert!(roster.game("engage").is_some());
    }

    #[test]
    fn display_names_fall_back_to_slugs() {
        let roster = Roster::sample();
        assert_eq!(roster.character_display_name("edelgard"), "Edelgard");
        assert_eq!(roster.character_display_name("nobody"), "nobody");
        assert_eq!(roster.outfit_display_name("edelgard", "base"), "Base");
        assert_eq!(roster.outfit_display_name("edelgard", "broken"), "Broken");
        assert_eq!(roster.outfit_display_name("edelgard", "mystery"), "mystery");
    }

    #[test]
    fn build_baselines_match_reference_table() {
        assert_eq!(Build::Petite.initial_weight_lbs(), 100.0);
        assert_eq!(Build::Regular.initial_weight_lbs(), 120.0);
        assert_eq!(Build::Strong.initial_weight_lbs(), 160.0);
        assert_eq!(Build::Giant.initial_weight_lbs(), 300.0);
    }

    #[test]
    fn shape_round_trips_through_str() {
        for shape in [
            Shape::Pear,
            Shape::Apple,
            Shape::Hourglass,
            Shape::TopHeavy,
            Shape::Round,
        ] {
            assert_eq!(shape.as_str().parse::<Shape>(), Ok(shape));
        }
        assert!("diamond".parse::<Shape>().is_err());
    }
}
