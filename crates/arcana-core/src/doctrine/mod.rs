//! Doctrine parsing and validation.
//!
//! A doctrine is the data-driven rule set behind every reading: the
//! authority order of strata, the scale conditions, and the polarity
//! thresholds. This module parses doctrines from JSON or YAML, validates
//! them against the embedded schema, and converts the on-disk condition
//! records into clause lists.

mod parser;
mod schema;

pub use parser::{
    ConditionClause, Doctrine, DoctrineError, PolarityRules, ScaleCondition, ScaleRuleSet,
    ScaleRules, StratumThresholds,
};
pub use schema::validate_doctrine_schema;
