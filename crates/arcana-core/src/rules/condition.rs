//! Doctrine condition evaluation.
//!
//! A condition passes iff every clause it carries passes. Clauses that are
//! not present are simply not in the list, so they never fail.

use crate::doctrine::{ConditionClause, ScaleCondition};

use super::DrawContext;

/// Evaluate one condition against a draw.
pub fn evaluate(condition: &ScaleCondition, ctx: &DrawContext<'_>) -> bool {
    condition.clauses.iter().all(|clause| clause_holds(clause, ctx))
}

fn clause_holds(clause: &ConditionClause, ctx: &DrawContext<'_>) -> bool {
    let axis_stratum = ctx.axis.card.stratum;

    match clause {
        ConditionClause::AxisIs(stratum) => axis_stratum == *stratum,
        ConditionClause::AxisNot(stratum) => axis_stratum != *stratum,
        ConditionClause::StratumPresent(stratum) => ctx.is_present(*stratum),
        ConditionClause::StratumAbsent(stratum) => !ctx.is_present(*stratum),
        ConditionClause::MinCount(thresholds) => thresholds
            .iter()
            .all(|(stratum, min)| ctx.count(stratum) >= min as usize),
        ConditionClause::MaxCount(thresholds) => thresholds
            .iter()
            .all(|(stratum, max)| ctx.count(stratum) <= max as usize),
    }
}
