//! Era state resolution.
//!
//! The polarity sum is thresholded into Astral / Umbral / Transitional.
//! When a divine-balance card is drawn and the doctrine enables
//! stabilization, the result is clamped to Transitional no matter what the
//! raw state was.

use crate::doctrine::PolarityRules;
use crate::types::{DrawnCard, EraState};

/// Sum of polarity weights over all drawn cards.
pub fn polarity_sum(cards: &[DrawnCard]) -> i32 {
    cards.iter().map(|drawn| drawn.card.polarity_weight).sum()
}

/// Threshold the polarity sum without any override.
pub fn raw_state(polarity_sum: i32, rules: &PolarityRules) -> EraState {
    if polarity_sum >= rules.astral_threshold {
        EraState::Astral
    } else if polarity_sum <= rules.umbral_threshold {
        EraState::Umbral
    } else {
        EraState::Transitional
    }
}

/// Resolve the era state, applying the stabilization clamp.
pub fn resolve(polarity_sum: i32, rules: &PolarityRules, has_divine_balance: bool) -> EraState {
    let raw = raw_state(polarity_sum, rules);

    if has_divine_balance && rules.stabilize_on_balance {
        if raw != EraState::Transitional {
            tracing::debug!(raw = %raw, "Divine balance present, era state clamped to Transitional");
        }
        return EraState::Transitional;
    }

    raw
}
