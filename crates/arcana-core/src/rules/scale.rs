//! Scale classification.
//!
//! Precedence is strict, first match wins:
//! 1. Any Era condition matches → Era
//! 2. Else any Major condition matches → Major
//! 3. Else Minor. When every Minor all-of condition holds (and there is at
//!    least one), they are all recorded as matched; otherwise Minor is the
//!    doctrinal default and nothing is recorded.

use crate::doctrine::{Doctrine, ScaleCondition};
use crate::types::Scale;

use super::condition::evaluate;
use super::DrawContext;

/// Outcome of scale classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaleClassification {
    pub scale: Scale,

    /// "Label: description" for each condition that decided the scale
    pub matched_conditions: Vec<String>,
}

/// Classify the scale of a draw.
pub fn classify(doctrine: &Doctrine, ctx: &DrawContext<'_>) -> ScaleClassification {
    let rules = &doctrine.scale_rules;

    if let Some(matched) = match_any(Scale::Era, &rules.era.conditions_any, ctx) {
        return ScaleClassification {
            scale: Scale::Era,
            matched_conditions: vec![matched],
        };
    }

    if let Some(matched) = match_any(Scale::Major, &rules.major.conditions_any, ctx) {
        return ScaleClassification {
            scale: Scale::Major,
            matched_conditions: vec![matched],
        };
    }

    let matched_conditions = match_all(Scale::Minor, &rules.minor.conditions, ctx).unwrap_or_default();
    if matched_conditions.is_empty() {
        tracing::debug!("No Minor conditions matched, Minor used as doctrinal default");
    }

    ScaleClassification {
        scale: Scale::Minor,
        matched_conditions,
    }
}

/// First passing condition, described with its label.
fn match_any(label: Scale, conditions: &[ScaleCondition], ctx: &DrawContext<'_>) -> Option<String> {
    let matched = conditions
        .iter()
        .find(|condition| evaluate(condition, ctx))
        .map(|condition| describe(label, condition));

    if let Some(description) = &matched {
        tracing::debug!(scale = %label, condition = %description, "Scale condition matched");
    }

    matched
}

/// All conditions described, if the list is non-empty and every one passes.
fn match_all(label: Scale, conditions: &[ScaleCondition], ctx: &DrawContext<'_>) -> Option<Vec<String>> {
    if conditions.is_empty() || !conditions.iter().all(|condition| evaluate(condition, ctx)) {
        return None;
    }

    Some(
        conditions
            .iter()
            .map(|condition| describe(label, condition))
            .collect(),
    )
}

fn describe(label: Scale, condition: &ScaleCondition) -> String {
    format!("{}: {}", label, condition.describe())
}
