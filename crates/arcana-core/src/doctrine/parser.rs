//! Doctrine parsing from YAML/JSON.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;

use super::schema::validate_doctrine_schema;
use crate::types::Stratum;

/// Errors that can occur when parsing doctrines.
#[derive(Error, Debug)]
pub enum DoctrineError {
    #[error("Failed to read doctrine file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Doctrine does not match schema: {}", .0.join("; "))]
    SchemaError(Vec<String>),

    #[error("Doctrine validation failed: {0}")]
    ValidationError(String),
}

/// Per-stratum count thresholds, kept in the order the doctrine lists them.
///
/// Serialized as a map. A stratum listed twice keeps its first position and
/// its last threshold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StratumThresholds(Vec<(Stratum, u32)>);

impl StratumThresholds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, stratum: Stratum, threshold: u32) {
        match self.0.iter_mut().find(|(own, _)| *own == stratum) {
            Some(entry) => entry.1 = threshold,
            None => self.0.push((stratum, threshold)),
        }
    }

    pub fn get(&self, stratum: Stratum) -> Option<u32> {
        self.iter().find(|(own, _)| *own == stratum).map(|(_, threshold)| threshold)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Stratum, u32)> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(Stratum, u32)> for StratumThresholds {
    fn from_iter<I: IntoIterator<Item = (Stratum, u32)>>(iter: I) -> Self {
        let mut thresholds = Self::new();
        for (stratum, threshold) in iter {
            thresholds.insert(stratum, threshold);
        }
        thresholds
    }
}

impl<const N: usize> From<[(Stratum, u32); N]> for StratumThresholds {
    fn from(entries: [(Stratum, u32); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl Serialize for StratumThresholds {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (stratum, threshold) in &self.0 {
            map.serialize_entry(stratum, threshold)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for StratumThresholds {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ThresholdsVisitor;

        impl<'de> Visitor<'de> for ThresholdsVisitor {
            type Value = StratumThresholds;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map from stratum to count")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut thresholds = StratumThresholds::new();
                while let Some((stratum, threshold)) = access.next_entry::<Stratum, u32>()? {
                    thresholds.insert(stratum, threshold);
                }
                Ok(thresholds)
            }
        }

        deserializer.deserialize_map(ThresholdsVisitor)
    }
}

/// One predicate of a scale condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionClause {
    /// The axis card's stratum must equal this one
    AxisIs(Stratum),

    /// The axis card's stratum must differ from this one
    AxisNot(Stratum),

    /// At least one drawn card has this stratum
    StratumPresent(Stratum),

    /// No drawn card has this stratum
    StratumAbsent(Stratum),

    /// Every listed stratum reaches its minimum count
    MinCount(StratumThresholds),

    /// No listed stratum exceeds its maximum count
    MaxCount(StratumThresholds),
}

impl ConditionClause {
    /// Stable human-readable description, matching the on-disk field names.
    pub fn describe(&self) -> String {
        match self {
            ConditionClause::AxisIs(stratum) => format!("axisIsStratum={}", stratum),
            ConditionClause::AxisNot(stratum) => format!("axisNotStratum={}", stratum),
            ConditionClause::StratumPresent(stratum) => format!("stratumPresent={}", stratum),
            ConditionClause::StratumAbsent(stratum) => format!("stratumAbsent={}", stratum),
            ConditionClause::MinCount(thresholds) => thresholds
                .iter()
                .map(|(stratum, min)| format!("minCountByStratum.{}>={}", stratum, min))
                .collect::<Vec<_>>()
                .join(", "),
            ConditionClause::MaxCount(thresholds) => thresholds
                .iter()
                .map(|(stratum, max)| format!("maxCountByStratum.{}<={}", stratum, max))
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

/// A conjunction of clauses. An empty condition always passes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "RawScaleCondition", into = "RawScaleCondition")]
pub struct ScaleCondition {
    pub clauses: Vec<ConditionClause>,
}

impl ScaleCondition {
    pub fn new(clauses: Vec<ConditionClause>) -> Self {
        Self { clauses }
    }

    /// Clauses joined by ", ".
    pub fn describe(&self) -> String {
        self.clauses
            .iter()
            .map(ConditionClause::describe)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// On-disk shape of a scale condition: one optional field per clause kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawScaleCondition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    axis_is_stratum: Option<Stratum>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    axis_not_stratum: Option<Stratum>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    stratum_present: Option<Stratum>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    stratum_absent: Option<Stratum>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    min_count_by_stratum: Option<StratumThresholds>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_count_by_stratum: Option<StratumThresholds>,
}

impl From<RawScaleCondition> for ScaleCondition {
    fn from(raw: RawScaleCondition) -> Self {
        let clauses = [
            raw.axis_is_stratum.map(ConditionClause::AxisIs),
            raw.axis_not_stratum.map(ConditionClause::AxisNot),
            raw.stratum_present.map(ConditionClause::StratumPresent),
            raw.stratum_absent.map(ConditionClause::StratumAbsent),
            raw.min_count_by_stratum.map(ConditionClause::MinCount),
            raw.max_count_by_stratum.map(ConditionClause::MaxCount),
        ]
        .into_iter()
        .flatten()
        .collect();

        ScaleCondition { clauses }
    }
}

impl From<ScaleCondition> for RawScaleCondition {
    fn from(condition: ScaleCondition) -> Self {
        let mut raw = RawScaleCondition::default();
        for clause in condition.clauses {
            match clause {
                ConditionClause::AxisIs(stratum) => raw.axis_is_stratum = Some(stratum),
                ConditionClause::AxisNot(stratum) => raw.axis_not_stratum = Some(stratum),
                ConditionClause::StratumPresent(stratum) => raw.stratum_present = Some(stratum),
                ConditionClause::StratumAbsent(stratum) => raw.stratum_absent = Some(stratum),
                ConditionClause::MinCount(map) => raw.min_count_by_stratum = Some(map),
                ConditionClause::MaxCount(map) => raw.max_count_by_stratum = Some(map),
            }
        }
        raw
    }
}

/// Conditions for one scale.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScaleRuleSet {
    /// All-of conditions
    #[serde(default)]
    pub conditions: Vec<ScaleCondition>,

    /// Any-of conditions
    #[serde(default)]
    pub conditions_any: Vec<ScaleCondition>,
}

/// Scale conditions, checked Era, then Major, then Minor.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScaleRules {
    #[serde(default)]
    pub minor: ScaleRuleSet,

    #[serde(default)]
    pub major: ScaleRuleSet,

    #[serde(default)]
    pub era: ScaleRuleSet,
}

/// Polarity thresholds and the stabilization override.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PolarityRules {
    /// Sums at or above this are Astral
    pub astral_threshold: i32,

    /// Sums at or below this are Umbral
    pub umbral_threshold: i32,

    /// Cards whose presence clamps the era state to Transitional
    #[serde(default)]
    pub divine_balance_card_ids: Vec<String>,

    #[serde(default, rename = "stabilizeByOneTierIfBalancePresent")]
    pub stabilize_on_balance: bool,
}

impl PolarityRules {
    /// Whether `card_id` is a registered divine-balance card.
    pub fn is_divine_balance(&self, card_id: &str) -> bool {
        self.divine_balance_card_ids
            .iter()
            .any(|id| id.eq_ignore_ascii_case(card_id))
    }
}

/// The rule set governing interpretation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Doctrine {
    /// Strata in descending authority
    pub authority_order: Vec<Stratum>,

    #[serde(default)]
    pub scale_rules: ScaleRules,

    pub polarity: PolarityRules,
}

impl Doctrine {
    /// Parse a doctrine from JSON string.
    pub fn from_json(json: &str) -> Result<Self, DoctrineError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        validate_doctrine_schema(&value).map_err(DoctrineError::SchemaError)?;
        Self::validated(serde_json::from_str(json)?)
    }

    /// Parse a doctrine from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, DoctrineError> {
        let value: serde_json::Value = serde_yaml::from_str(yaml)?;
        validate_doctrine_schema(&value).map_err(DoctrineError::SchemaError)?;
        Self::validated(serde_yaml::from_str(yaml)?)
    }

    /// Parse a doctrine from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, DoctrineError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Parse a doctrine from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, DoctrineError> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    // Typed parsing reads the source text again: a `Value` map does not keep
    // key order, and threshold order shows up in condition descriptions.
    fn validated(doctrine: Doctrine) -> Result<Self, DoctrineError> {
        doctrine.validate()?;
        Ok(doctrine)
    }

    /// Validate semantic constraints the schema cannot express.
    fn validate(&self) -> Result<(), DoctrineError> {
        if self.authority_order.is_empty() {
            return Err(DoctrineError::ValidationError(
                "authorityOrder must not be empty".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for stratum in &self.authority_order {
            if !seen.insert(stratum) {
                return Err(DoctrineError::ValidationError(format!(
                    "Duplicate stratum in authorityOrder: {}",
                    stratum
                )));
            }
        }

        if self.polarity.astral_threshold <= self.polarity.umbral_threshold {
            return Err(DoctrineError::ValidationError(format!(
                "astralThreshold ({}) must be greater than umbralThreshold ({})",
                self.polarity.astral_threshold, self.polarity.umbral_threshold
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCTRINE_YAML: &str = r#"
authorityOrder: [Calamity, Crystal, Divine, Primal, Shard, Persona, Court, Element]
scaleRules:
  minor:
    conditions:
      - stratumAbsent: Calamity
      - axisNotStratum: Crystal
      - maxCountByStratum: { Primal: 1 }
  major:
    conditionsAny:
      - axisIsStratum: Crystal
      - minCountByStratum: { Primal: 2 }
  era:
    conditionsAny:
      - axisIsStratum: Calamity
polarity:
  astralThreshold: 2
  umbralThreshold: -2
  divineBalanceCardIds: [divine-radiant-balance]
  stabilizeByOneTierIfBalancePresent: true
"#;

    #[test]
    fn test_parse_valid_doctrine() {
        let doctrine = Doctrine::from_yaml(DOCTRINE_YAML).unwrap();
        assert_eq!(doctrine.authority_order.len(), 8);
        assert_eq!(doctrine.authority_order[0], Stratum::Calamity);
        assert_eq!(doctrine.scale_rules.minor.conditions.len(), 3);
        assert_eq!(doctrine.scale_rules.major.conditions_any.len(), 2);
        assert!(doctrine.polarity.stabilize_on_balance);
        assert!(doctrine.polarity.is_divine_balance("Divine-Radiant-Balance"));
    }

    #[test]
    fn test_conditions_become_clause_lists() {
        let doctrine = Doctrine::from_yaml(DOCTRINE_YAML).unwrap();
        let major = &doctrine.scale_rules.major.conditions_any;
        assert_eq!(major[0].clauses, vec![ConditionClause::AxisIs(Stratum::Crystal)]);
        assert_eq!(
            major[1].clauses,
            vec![ConditionClause::MinCount(StratumThresholds::from([(Stratum::Primal, 2)]))]
        );
    }

    #[test]
    fn test_condition_description() {
        let condition = ScaleCondition::new(vec![
            ConditionClause::AxisNot(Stratum::Crystal),
            ConditionClause::MaxCount(StratumThresholds::from([(Stratum::Primal, 1), (Stratum::Calamity, 0)])),
        ]);
        assert_eq!(
            condition.describe(),
            "axisNotStratum=Crystal, maxCountByStratum.Primal<=1, maxCountByStratum.Calamity<=0"
        );
    }

    #[test]
    fn test_thresholds_keep_document_order() {
        let json = r#"{
            "authorityOrder": ["Calamity", "Primal"],
            "scaleRules": { "era": { "conditions": [ { "minCountByStratum": { "Primal": 2, "Calamity": 1 } } ] } },
            "polarity": { "astralThreshold": 2, "umbralThreshold": -2 }
        }"#;
        let yaml = r#"
authorityOrder: [Calamity, Primal]
scaleRules:
  era:
    conditions:
      - minCountByStratum: { Primal: 2, Calamity: 1 }
polarity: { astralThreshold: 2, umbralThreshold: -2 }
"#;

        for doctrine in [Doctrine::from_json(json).unwrap(), Doctrine::from_yaml(yaml).unwrap()] {
            let condition = &doctrine.scale_rules.era.conditions[0];
            assert_eq!(
                condition.describe(),
                "minCountByStratum.Primal>=2, minCountByStratum.Calamity>=1"
            );

            let reparsed = Doctrine::from_json(&serde_json::to_string(&doctrine).unwrap()).unwrap();
            assert_eq!(reparsed.scale_rules.era.conditions[0].describe(), condition.describe());
        }
    }

    #[test]
    fn test_repeated_threshold_keeps_first_position() {
        let mut thresholds = StratumThresholds::from([(Stratum::Shard, 1), (Stratum::Primal, 2)]);
        thresholds.insert(Stratum::Shard, 3);

        assert_eq!(thresholds.len(), 2);
        assert_eq!(thresholds.get(Stratum::Shard), Some(3));
        assert_eq!(
            thresholds.iter().collect::<Vec<_>>(),
            vec![(Stratum::Shard, 3), (Stratum::Primal, 2)]
        );
    }

    #[test]
    fn test_json_and_yaml_agree() {
        let from_yaml = Doctrine::from_yaml(DOCTRINE_YAML).unwrap();
        let json = serde_json::to_string(&from_yaml).unwrap();
        let from_json = Doctrine::from_json(&json).unwrap();
        assert_eq!(from_yaml, from_json);
    }

    #[test]
    fn test_duplicate_authority_rejected() {
        let yaml = r#"
authorityOrder: [Crystal, crystal]
scaleRules: {}
polarity: { astralThreshold: 2, umbralThreshold: -2 }
"#;
        assert!(matches!(
            Doctrine::from_yaml(yaml),
            Err(DoctrineError::ValidationError(_))
        ));
    }

    #[test]
    fn test_inverted_thresholds_rejected() {
        let yaml = r#"
authorityOrder: [Crystal]
polarity: { astralThreshold: -1, umbralThreshold: 1 }
scaleRules: {}
"#;
        assert!(matches!(
            Doctrine::from_yaml(yaml),
            Err(DoctrineError::ValidationError(_))
        ));
    }

    #[test]
    fn test_unknown_stratum_rejected() {
        let yaml = r#"
authorityOrder: [Crystal, Aether]
scaleRules: {}
polarity: { astralThreshold: 2, umbralThreshold: -2 }
"#;
        assert!(matches!(
            Doctrine::from_yaml(yaml),
            Err(DoctrineError::YamlError(_))
        ));
    }

    #[test]
    fn test_schema_violation_reported() {
        let json = r#"{ "authorityOrder": ["Crystal"], "scaleRules": {} }"#;
        assert!(matches!(
            Doctrine::from_json(json),
            Err(DoctrineError::SchemaError(_))
        ));
    }
}
