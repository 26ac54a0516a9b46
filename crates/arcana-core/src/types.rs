//! Core types for Arcana readings.
//!
//! Reference data (cards, spreads) is immutable once loaded. Everything the
//! engine derives for a single reading lives in [`ReadingResult`], never in
//! the reference records themselves.
//!
//! All string-valued classifications (strata, polarity, flags, scale, era
//! state, output mode, bias) are closed enumerations. Parsing is
//! case-insensitive and happens once, at the loading boundary.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a string does not name a known variant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind}: '{value}'")]
pub struct ParseEnumError {
    /// Which enumeration was being parsed (e.g. "stratum")
    pub kind: &'static str,

    /// The rejected input
    pub value: String,
}

macro_rules! closed_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Canonical spelling.
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                let trimmed = value.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|variant| variant.as_str().eq_ignore_ascii_case(trimmed))
                    .ok_or_else(|| ParseEnumError {
                        kind: $kind,
                        value: value.to_string(),
                    })
            }
        }

        impl TryFrom<String> for $name {
            type Error = ParseEnumError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.as_str().to_string()
            }
        }
    };
}

closed_enum! {
    /// A card's classification tier.
    ///
    /// Variants are declared alphabetically so that ordered maps keyed by
    /// stratum list them in display order.
    Stratum, "stratum" {
        Calamity => "Calamity",
        Court => "Court",
        Crystal => "Crystal",
        Divine => "Divine",
        Element => "Element",
        Persona => "Persona",
        Primal => "Primal",
        Shard => "Shard",
    }
}

impl Stratum {
    /// Strata that make up the manifest layer (dominant element, Manifestation).
    pub fn is_manifest(self) -> bool {
        matches!(self, Stratum::Court | Stratum::Element)
    }

    /// Strata reported under "Amplification & Distortion".
    pub fn is_amplifying_layer(self) -> bool {
        matches!(self, Stratum::Primal | Stratum::Shard)
    }
}

closed_enum! {
    /// Polarity tag carried by a card.
    Polarity, "polarity" {
        Astral => "Astral",
        Umbral => "Umbral",
        Balanced => "Balanced",
    }
}

closed_enum! {
    /// Flag tags a card may carry.
    CardFlag, "card flag" {
        Override => "Override",
        Amplify => "Amplify",
        Distort => "Distort",
        Moderate => "Moderate",
    }
}

closed_enum! {
    /// Reading magnitude, in ascending significance.
    Scale, "scale" {
        Minor => "Minor",
        Major => "Major",
        Era => "Era",
    }
}

closed_enum! {
    /// Polarity-derived mood of a reading.
    EraState, "era state" {
        Astral => "Astral",
        Umbral => "Umbral",
        Transitional => "Transitional",
    }
}

closed_enum! {
    /// Which narrative formatter renders a reading.
    OutputMode, "output mode" {
        Concise => "concise",
        Layered => "layered",
        Scholarly => "scholarly",
    }
}

impl OutputMode {
    /// Total mapping from a selector string. Unknown values fall back to
    /// [`OutputMode::Concise`].
    pub fn from_id(value: &str) -> Self {
        value.parse().unwrap_or_else(|_| {
            tracing::warn!(value, "Unknown output mode, using concise");
            OutputMode::Concise
        })
    }
}

impl Default for OutputMode {
    fn default() -> Self {
        OutputMode::Concise
    }
}

closed_enum! {
    /// Meaning-selection policy applied when formatting phrases.
    InterpretationBias, "interpretation bias" {
        /// Shadow on polarity mismatch or calamity pressure
        Auto => "Auto",
        /// Core text unless it is blank
        PreferCore => "PreferCore",
        /// Shadow text unless it is blank
        PreferShadow => "PreferShadow",
        /// Shadow on polarity mismatch only
        StrictAuto => "StrictAuto",
    }
}

impl InterpretationBias {
    /// Total mapping from a selector string. Unknown values fall back to
    /// [`InterpretationBias::Auto`].
    pub fn from_id(value: &str) -> Self {
        value.parse().unwrap_or_else(|_| {
            tracing::warn!(value, "Unknown interpretation bias, using Auto");
            InterpretationBias::Auto
        })
    }
}

impl Default for InterpretationBias {
    fn default() -> Self {
        InterpretationBias::Auto
    }
}

/// A single card of the deck.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    /// Stable slug (e.g. "fire-i")
    pub id: String,

    /// Display name
    pub name: String,

    /// Classification tier
    pub stratum: Stratum,

    /// Elemental affinity, if any
    #[serde(default)]
    pub element: Option<String>,

    /// Rank within the stratum ("1".."10" or a court rank)
    #[serde(default)]
    pub rank: Option<String>,

    /// Polarity tag
    pub polarity: Polarity,

    /// Signed contribution to the polarity sum
    #[serde(default)]
    pub polarity_weight: i32,

    /// Upright meaning
    #[serde(default)]
    pub core: String,

    /// Shadow meaning
    #[serde(default)]
    pub shadow: String,

    #[serde(default)]
    pub astral_note: String,

    #[serde(default)]
    pub umbral_note: String,

    #[serde(default)]
    pub flags: Vec<CardFlag>,
}

impl Card {
    /// The card's element, treating blank text as absent.
    pub fn element(&self) -> Option<&str> {
        self.element
            .as_deref()
            .map(str::trim)
            .filter(|element| !element.is_empty())
    }

    pub fn has_flag(&self, flag: CardFlag) -> bool {
        self.flags.contains(&flag)
    }
}

/// One position of a spread.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PositionDefinition {
    /// 1-based index
    pub index: u32,

    pub name: String,

    #[serde(default)]
    pub description: String,
}

/// A named layout of positions with one designated axis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SpreadDefinition {
    pub id: String,

    pub name: String,

    /// Declared number of cards
    pub card_count: u32,

    /// Presentation hint ("row", "grid3x3")
    #[serde(default)]
    pub layout: String,

    /// Index of the pivotal position
    pub axis_index: u32,

    pub positions: Vec<PositionDefinition>,
}

impl SpreadDefinition {
    /// Positions sorted by index.
    pub fn ordered_positions(&self) -> Vec<&PositionDefinition> {
        let mut positions: Vec<&PositionDefinition> = self.positions.iter().collect();
        positions.sort_by_key(|position| position.index);
        positions
    }
}

/// A card assigned to a spread position.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DrawnCard {
    pub position: PositionDefinition,
    pub card: Card,
}

/// A spread with one card per position.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Draw {
    pub spread: SpreadDefinition,

    /// Card assignments, one per spread position
    pub cards: Vec<DrawnCard>,

    /// Seed used for sampling, if any
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Draw {
    /// The card occupying the spread's axis position.
    pub fn axis(&self) -> Option<&DrawnCard> {
        self.cards
            .iter()
            .find(|drawn| drawn.position.index == self.spread.axis_index)
    }

    /// Card ids ordered by position index.
    pub fn card_ids(&self) -> Vec<String> {
        let mut ordered: Vec<&DrawnCard> = self.cards.iter().collect();
        ordered.sort_by_key(|drawn| drawn.position.index);
        ordered.into_iter().map(|drawn| drawn.card.id.clone()).collect()
    }
}

/// Per-card meaning selection derived during interpretation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CardAnnotation {
    /// Position index this annotation belongs to
    pub position: u32,

    pub used_shadow: bool,

    pub selected_meaning: String,

    pub selected_note: String,
}

/// A drawn card together with its annotation, as carried by a result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReadingCard {
    pub position: PositionDefinition,
    pub card: Card,
    pub annotation: CardAnnotation,
}

/// Headline classification of a reading.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReadingHeader {
    pub scale: Scale,

    pub era_state: EraState,

    /// Majority element among manifest cards, absent on ties
    pub dominant_element: Option<String>,

    pub escalation: bool,

    pub escalation_reasons: Vec<String>,

    pub moderation: bool,

    pub moderation_reasons: Vec<String>,
}

/// The five fixed narrative layers of a breakdown, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BreakdownLayer {
    CosmicAuthority,
    AmplificationDistortion,
    PersonalLens,
    Manifestation,
    Recommendation,
}

impl BreakdownLayer {
    pub const ALL: [BreakdownLayer; 5] = [
        BreakdownLayer::CosmicAuthority,
        BreakdownLayer::AmplificationDistortion,
        BreakdownLayer::PersonalLens,
        BreakdownLayer::Manifestation,
        BreakdownLayer::Recommendation,
    ];

    pub fn title(self) -> &'static str {
        match self {
            BreakdownLayer::CosmicAuthority => "Cosmic Authority",
            BreakdownLayer::AmplificationDistortion => "Amplification & Distortion",
            BreakdownLayer::PersonalLens => "Personal Lens",
            BreakdownLayer::Manifestation => "Manifestation",
            BreakdownLayer::Recommendation => "Recommendation",
        }
    }
}

/// One section of the breakdown.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BreakdownSection {
    pub layer: BreakdownLayer,
    pub summary: String,
}

impl BreakdownSection {
    pub fn title(&self) -> &'static str {
        self.layer.title()
    }
}

/// Raw numbers behind a classification.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Diagnostics {
    pub polarity_sum: i32,

    pub counts_by_stratum: BTreeMap<Stratum, usize>,

    /// Keyed by the first-seen spelling of each element
    pub counts_by_element: BTreeMap<String, usize>,

    /// Descriptions of the scale conditions that matched, with group label
    pub matched_scale_conditions: Vec<String>,
}

impl Diagnostics {
    /// Count for a stratum; missing strata count as zero.
    pub fn count(&self, stratum: Stratum) -> usize {
        self.counts_by_stratum.get(&stratum).copied().unwrap_or(0)
    }
}

/// Everything derived from one interpretation call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReadingResult {
    pub spread_name: String,

    pub output_mode: OutputMode,

    #[serde(default)]
    pub question: Option<String>,

    pub header: ReadingHeader,

    /// Axis position index of the spread
    pub axis_index: u32,

    /// Annotated cards in draw order
    pub cards: Vec<ReadingCard>,

    pub breakdown: Vec<BreakdownSection>,

    pub diagnostics: Diagnostics,

    /// Rendered text; empty until a formatter has run
    #[serde(default)]
    pub narrative: String,

    #[serde(default)]
    pub seed: Option<u64>,
}

impl ReadingResult {
    /// The card at the axis position.
    pub fn axis_card(&self) -> Option<&ReadingCard> {
        self.cards
            .iter()
            .find(|reading| reading.position.index == self.axis_index)
    }

    /// Cards ordered by position index.
    pub fn ordered_cards(&self) -> Vec<&ReadingCard> {
        let mut ordered: Vec<&ReadingCard> = self.cards.iter().collect();
        ordered.sort_by_key(|reading| reading.position.index);
        ordered
    }

    /// Card ids ordered by position index.
    pub fn card_ids(&self) -> Vec<String> {
        self.ordered_cards()
            .into_iter()
            .map(|reading| reading.card.id.clone())
            .collect()
    }
}
