//! Per-card meaning and note selection.
//!
//! The engine records one [`CardAnnotation`] per drawn card; the cards
//! themselves are reference data and stay untouched.

use crate::types::{Card, CardAnnotation, EraState, Polarity};

use super::{DrawContext, BALANCING_STRATUM};

/// Whether the card's polarity opposes the era state.
pub(crate) fn polarity_mismatch(card: &Card, era: EraState) -> bool {
    matches!(
        (era, card.polarity),
        (EraState::Umbral, Polarity::Astral) | (EraState::Astral, Polarity::Umbral)
    )
}

/// Shadow on polarity mismatch, or under calamity pressure for any
/// non-divine card.
pub fn should_use_shadow(card: &Card, era: EraState, has_calamity: bool) -> bool {
    polarity_mismatch(card, era) || (has_calamity && card.stratum != BALANCING_STRATUM)
}

/// The note matching the era state; Transitional joins both.
pub fn era_note(card: &Card, era: EraState) -> String {
    match era {
        EraState::Astral => card.astral_note.clone(),
        EraState::Umbral => card.umbral_note.clone(),
        EraState::Transitional => format!("{} {}", card.astral_note, card.umbral_note)
            .trim()
            .to_string(),
    }
}

/// Annotate every drawn card, in draw order.
pub fn annotate(ctx: &DrawContext<'_>, era: EraState) -> Vec<CardAnnotation> {
    let has_calamity = ctx.has_calamity();

    ctx.cards()
        .iter()
        .map(|drawn| {
            let used_shadow = should_use_shadow(&drawn.card, era, has_calamity);
            let selected_meaning = if used_shadow {
                drawn.card.shadow.clone()
            } else {
                drawn.card.core.clone()
            };

            CardAnnotation {
                position: drawn.position.index,
                used_shadow,
                selected_meaning,
                selected_note: era_note(&drawn.card, era),
            }
        })
        .collect()
}
