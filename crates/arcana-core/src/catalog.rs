//! Reference data loading and validation.
//!
//! A data root looks like:
//!
//! ```text
//! data/
//!   rules/doctrine.json
//!   rules/spreads.json
//!   rules/output_modes.json
//!   strata/*.json          (each an array of cards)
//! ```
//!
//! Everything is validated up front; a [`Catalog`] that loaded is safe to
//! draw from and interpret against.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::doctrine::{Doctrine, DoctrineError};
use crate::types::{Card, SpreadDefinition, Stratum};

lazy_static! {
    /// Lowercase kebab-case slug ("fire-i", "aether-pulse")
    static ref SLUG_PATTERN: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();
}

const COURT_RANKS: [&str; 4] = ["Initiate", "Vanguard", "Conduit", "Sovereign"];

/// Errors that can occur when loading reference data.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Required data file missing: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("Failed to read {}: {source}", path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", path.display())]
    JsonError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid doctrine: {0}")]
    Doctrine(#[from] DoctrineError),

    #[error("Data validation failed: {}", .0.join("; "))]
    ValidationError(Vec<String>),
}

/// A selectable output mode as listed in `output_modes.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutputModeDefinition {
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub description: String,
}

/// Validated reference data.
#[derive(Debug, Clone)]
pub struct Catalog {
    cards: Vec<Card>,
    spreads: Vec<SpreadDefinition>,
    output_modes: Vec<OutputModeDefinition>,
    doctrine: Doctrine,
}

impl Catalog {
    /// Load and validate a data root.
    pub fn load(root: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let root = root.as_ref();
        let rules = root.join("rules");

        let doctrine_path = require(rules.join("doctrine.json"))?;
        let doctrine = Doctrine::from_json_file(&doctrine_path)?;
        let spreads: Vec<SpreadDefinition> = read_json(&require(rules.join("spreads.json"))?)?;
        let output_modes: Vec<OutputModeDefinition> = read_json(&require(rules.join("output_modes.json"))?)?;

        let mut cards = Vec::new();
        for path in strata_files(&require(root.join("strata"))?)? {
            let mut file_cards: Vec<Card> = read_json(&path)?;
            tracing::debug!(path = %path.display(), count = file_cards.len(), "Loaded strata file");
            cards.append(&mut file_cards);
        }

        let catalog = Self::from_parts(doctrine, spreads, output_modes, cards)?;
        tracing::info!(
            root = %root.display(),
            cards = catalog.cards.len(),
            spreads = catalog.spreads.len(),
            output_modes = catalog.output_modes.len(),
            "Catalog loaded"
        );
        Ok(catalog)
    }

    /// Assemble a catalog from already-parsed parts, running every check
    /// [`Catalog::load`] runs.
    pub fn from_parts(
        doctrine: Doctrine,
        spreads: Vec<SpreadDefinition>,
        output_modes: Vec<OutputModeDefinition>,
        cards: Vec<Card>,
    ) -> Result<Self, CatalogError> {
        let mut errors = Vec::new();

        validate_spreads(&spreads, &mut errors);
        if output_modes.is_empty() {
            errors.push("At least one output mode is required.".to_string());
        }
        validate_cards(&cards, &mut errors);

        if !errors.is_empty() {
            return Err(CatalogError::ValidationError(errors));
        }

        Ok(Self {
            cards,
            spreads,
            output_modes,
            doctrine,
        })
    }

    /// All cards in load order.
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn spreads(&self) -> &[SpreadDefinition] {
        &self.spreads
    }

    /// Spread by id, compared case-insensitively.
    pub fn spread(&self, id: &str) -> Option<&SpreadDefinition> {
        self.spreads
            .iter()
            .find(|spread| spread.id.eq_ignore_ascii_case(id.trim()))
    }

    pub fn output_modes(&self) -> &[OutputModeDefinition] {
        &self.output_modes
    }

    pub fn doctrine(&self) -> &Doctrine {
        &self.doctrine
    }
}

fn require(path: PathBuf) -> Result<PathBuf, CatalogError> {
    if path.exists() {
        Ok(path)
    } else {
        Err(CatalogError::MissingFile(path))
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, CatalogError> {
    let content = fs::read_to_string(path).map_err(|source| CatalogError::IoError {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| CatalogError::JsonError {
        path: path.to_path_buf(),
        source,
    })
}

/// `*.json` files directly under `dir`, ordered case-insensitively.
fn strata_files(dir: &Path) -> Result<Vec<PathBuf>, CatalogError> {
    let io_error = |source| CatalogError::IoError {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if path.is_file() && is_json {
            files.push(path);
        }
    }

    files.sort_by_key(|path| path.to_string_lossy().to_lowercase());
    Ok(files)
}

fn validate_spreads(spreads: &[SpreadDefinition], errors: &mut Vec<String>) {
    if spreads.is_empty() {
        errors.push("At least one spread is required.".to_string());
    }

    let mut seen: HashMap<String, &str> = HashMap::new();
    for spread in spreads {
        let id = spread.id.trim();
        if id.is_empty() || spread.name.trim().is_empty() {
            errors.push("Each spread requires id and name.".to_string());
            continue;
        }
        if !SLUG_PATTERN.is_match(id) {
            errors.push(format!("Spread id '{}' is not a lowercase kebab-case slug.", id));
        }
        if let Some(first) = seen.insert(id.to_lowercase(), id) {
            errors.push(format!("Duplicate spread id '{}' (first defined as '{}').", id, first));
        }

        let count = spread.card_count;
        if count == 0 || spread.positions.len() != count as usize {
            errors.push(format!(
                "Spread {} has invalid cardCount/positions: cardCount {}, {} positions.",
                id,
                count,
                spread.positions.len()
            ));
        }
        if spread.axis_index < 1 || spread.axis_index > count {
            errors.push(format!(
                "Spread {} has invalid axisIndex {} for {} cards.",
                id, spread.axis_index, count
            ));
        }

        let mut indexes: Vec<u32> = spread.positions.iter().map(|position| position.index).collect();
        indexes.sort_unstable();
        if !indexes.iter().copied().eq(1..=indexes.len() as u32) {
            errors.push(format!(
                "Spread {} positions must be numbered 1..={} without gaps or repeats.",
                id,
                spread.positions.len()
            ));
        }
    }
}

fn validate_cards(cards: &[Card], errors: &mut Vec<String>) {
    if cards.is_empty() {
        errors.push("At least one card is required.".to_string());
    }

    let mut seen: HashMap<String, &str> = HashMap::new();
    for card in cards {
        let id = card.id.trim();
        let required = [
            ("id", &card.id),
            ("name", &card.name),
            ("core", &card.core),
            ("shadow", &card.shadow),
            ("astralNote", &card.astral_note),
            ("umbralNote", &card.umbral_note),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                errors.push(format!("Card [{}]: missing required field '{}'.", id, field));
            }
        }

        if !id.is_empty() {
            if !SLUG_PATTERN.is_match(id) {
                errors.push(format!("Card [{}]: id is not a lowercase kebab-case slug.", id));
            }
            if let Some(first) = seen.insert(id.to_lowercase(), id) {
                errors.push(format!("Card [{}]: duplicate id (first defined as '{}').", id, first));
            }
        }

        if !(-2..=2).contains(&card.polarity_weight) {
            errors.push(format!(
                "Card [{}]: polarityWeight {} is outside [-2..2].",
                id, card.polarity_weight
            ));
        }

        let rank = card.rank.as_deref().map(str::trim).unwrap_or("");
        match card.stratum {
            Stratum::Element => {
                if card.element().is_none() {
                    errors.push(format!("Card [{}]: Element cards require an element.", id));
                }
                if !(1..=10).any(|value: u8| value.to_string() == rank) {
                    errors.push(format!(
                        "Card [{}]: Element cards require rank in '1'..'10', found '{}'.",
                        id, rank
                    ));
                }
            }
            Stratum::Court => {
                if card.element().is_none() {
                    errors.push(format!("Card [{}]: Court cards require an element.", id));
                }
                if !COURT_RANKS.iter().any(|court| court.eq_ignore_ascii_case(rank)) {
                    errors.push(format!(
                        "Card [{}]: Court cards require rank Initiate/Vanguard/Conduit/Sovereign, found '{}'.",
                        id, rank
                    ));
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::fixtures;
    use crate::types::{Polarity, PositionDefinition};

    fn valid_card(id: &str) -> Card {
        fixtures::card(id, Stratum::Crystal, Polarity::Balanced, 0)
    }

    fn mode() -> OutputModeDefinition {
        OutputModeDefinition {
            id: "concise".to_string(),
            name: "Concise".to_string(),
            description: String::new(),
        }
    }

    fn build(spreads: Vec<SpreadDefinition>, cards: Vec<Card>) -> Result<Catalog, CatalogError> {
        Catalog::from_parts(fixtures::doctrine(), spreads, vec![mode()], cards)
    }

    fn validation_errors(result: Result<Catalog, CatalogError>) -> Vec<String> {
        match result {
            Err(CatalogError::ValidationError(errors)) => errors,
            other => panic!("expected validation error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_valid_parts() {
        let catalog = build(
            vec![fixtures::spread("aether-pulse", 3, 2)],
            vec![valid_card("crystal-a"), valid_card("crystal-b")],
        )
        .unwrap();

        assert_eq!(catalog.cards().len(), 2);
        assert_eq!(catalog.spread("AETHER-PULSE").unwrap().card_count, 3);
        assert!(catalog.spread("missing").is_none());
    }

    #[test]
    fn test_empty_collections_rejected() {
        let errors = validation_errors(Catalog::from_parts(fixtures::doctrine(), vec![], vec![], vec![]));
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_spread_shape_checks() {
        let mut short = fixtures::spread("short", 3, 2);
        short.positions.pop();
        let mut bad_axis = fixtures::spread("bad-axis", 3, 2);
        bad_axis.axis_index = 4;
        let mut gap = fixtures::spread("gap", 3, 2);
        gap.positions[2] = PositionDefinition {
            index: 5,
            name: "Five".to_string(),
            description: String::new(),
        };

        let errors = validation_errors(build(vec![short, bad_axis, gap], vec![valid_card("a")]));
        assert!(errors.iter().any(|e| e.contains("Spread short has invalid cardCount/positions")));
        assert!(errors.iter().any(|e| e.contains("Spread bad-axis has invalid axisIndex 4")));
        assert!(errors.iter().any(|e| e.contains("Spread gap positions must be numbered")));
    }

    #[test]
    fn test_card_field_checks() {
        let mut blank = valid_card("blank-core");
        blank.core = "  ".to_string();
        let mut heavy = valid_card("heavy");
        heavy.polarity_weight = 3;

        let errors = validation_errors(build(vec![fixtures::spread("s", 1, 1)], vec![blank, heavy]));
        assert!(errors.iter().any(|e| e.contains("[blank-core]: missing required field 'core'")));
        assert!(errors.iter().any(|e| e.contains("[heavy]: polarityWeight 3")));
    }

    #[test]
    fn test_duplicate_ids_case_insensitive() {
        let mut upper = valid_card("dup");
        upper.id = "DUP".to_string();

        let errors = validation_errors(build(vec![fixtures::spread("s", 1, 1)], vec![valid_card("dup"), upper]));
        assert!(errors.iter().any(|e| e.contains("duplicate id")));
        assert!(errors.iter().any(|e| e.contains("[DUP]: id is not a lowercase kebab-case slug")));
    }

    #[test]
    fn test_element_and_court_rank_rules() {
        let mut element = fixtures::element_card("fire-i", Stratum::Element, Polarity::Astral, 1, "Fire");
        element.rank = Some("10".to_string());
        let mut bad_element = fixtures::element_card("fire-x", Stratum::Element, Polarity::Astral, 1, "Fire");
        bad_element.rank = Some("11".to_string());
        let mut court = fixtures::element_card("court-fire-initiate", Stratum::Court, Polarity::Astral, 1, "Fire");
        court.rank = Some("Initiate".to_string());
        let mut bad_court = fixtures::card("court-none", Stratum::Court, Polarity::Astral, 1);
        bad_court.rank = Some("King".to_string());

        let errors = validation_errors(build(
            vec![fixtures::spread("s", 1, 1)],
            vec![element, bad_element, court, bad_court],
        ));
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().any(|e| e.contains("[fire-x]: Element cards require rank")));
        assert!(errors.iter().any(|e| e.contains("[court-none]: Court cards require an element")));
        assert!(errors.iter().any(|e| e.contains("[court-none]: Court cards require rank")));
    }

    #[test]
    fn test_load_reports_missing_file() {
        let root = std::env::temp_dir().join(format!("arcana-missing-{}", std::process::id()));
        let err = Catalog::load(&root).unwrap_err();
        assert!(matches!(err, CatalogError::MissingFile(path) if path.ends_with("doctrine.json")));
    }
}
