//! Escalation and moderation signals.

use crate::types::CardFlag;

use super::{DrawContext, AMPLIFYING_STRATUM, BALANCING_STRATUM, CALAMITY_STRATUM};

pub const REASON_PRIMAL_PAIR: &str = "Two or more Primal cards are present.";
pub const REASON_CALAMITY: &str = "A Calamity card is present.";
pub const REASON_DIVINE_PAIR: &str = "Two or more Divine cards are present.";
pub const REASON_DIVINE_BALANCE: &str = "A divine balance card is present.";
pub const REASON_MODERATE_FLAG: &str = "Moderating flags are present in the draw.";

/// Reasons the reading escalates, in fixed order.
pub fn escalation_reasons(ctx: &DrawContext<'_>) -> Vec<String> {
    let mut reasons = Vec::new();

    if ctx.count(AMPLIFYING_STRATUM) >= 2 {
        reasons.push(REASON_PRIMAL_PAIR.to_string());
    }
    if ctx.count(CALAMITY_STRATUM) > 0 {
        reasons.push(REASON_CALAMITY.to_string());
    }

    reasons
}

/// Reasons the reading is moderated, in fixed order.
pub fn moderation_reasons(ctx: &DrawContext<'_>) -> Vec<String> {
    let mut reasons = Vec::new();

    if ctx.count(BALANCING_STRATUM) >= 2 {
        reasons.push(REASON_DIVINE_PAIR.to_string());
    }
    if ctx.has_divine_balance {
        reasons.push(REASON_DIVINE_BALANCE.to_string());
    }
    if ctx.cards().iter().any(|drawn| drawn.card.has_flag(CardFlag::Moderate)) {
        reasons.push(REASON_MODERATE_FLAG.to_string());
    }

    reasons
}
