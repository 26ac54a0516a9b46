//! Bias-aware meaning and note selection for phrase building.
//!
//! This is independent of the engine's own per-card annotation: formatters
//! re-decide core vs shadow under the configured [`InterpretationBias`] and
//! never return blank text when the card has anything to say.

use crate::rules::annotate::polarity_mismatch;
use crate::rules::{BALANCING_STRATUM, CALAMITY_STRATUM};
use crate::types::{EraState, InterpretationBias, ReadingCard, ReadingResult};

use super::first_non_blank;

/// Pick the meaning text for a card under a bias.
///
/// Falls back to the other meaning, then the card name, when the chosen
/// text is blank.
pub fn select_meaning(result: &ReadingResult, reading: &ReadingCard, bias: InterpretationBias) -> String {
    let card = &reading.card;
    let era = result.header.era_state;

    let use_shadow = match bias {
        InterpretationBias::PreferShadow => true,
        InterpretationBias::PreferCore => false,
        InterpretationBias::StrictAuto => polarity_mismatch(card, era),
        InterpretationBias::Auto => {
            polarity_mismatch(card, era)
                || (result.diagnostics.count(CALAMITY_STRATUM) > 0 && card.stratum != BALANCING_STRATUM)
        }
    };

    let (primary, fallback) = if use_shadow {
        (card.shadow.as_str(), card.core.as_str())
    } else {
        (card.core.as_str(), card.shadow.as_str())
    };

    first_non_blank(&[primary, fallback, card.name.as_str()]).to_string()
}

/// Pick the era note for a card, falling back through the other texts.
pub fn select_note(result: &ReadingResult, reading: &ReadingCard) -> String {
    let card = &reading.card;

    match result.header.era_state {
        EraState::Astral => first_non_blank(&[
            &card.astral_note,
            &card.umbral_note,
            &card.core,
            &card.shadow,
        ])
        .to_string(),
        EraState::Umbral => first_non_blank(&[
            &card.umbral_note,
            &card.astral_note,
            &card.shadow,
            &card.core,
        ])
        .to_string(),
        EraState::Transitional => {
            let combined = [card.astral_note.trim(), card.umbral_note.trim()]
                .into_iter()
                .filter(|note| !note.is_empty())
                .collect::<Vec<_>>()
                .join(" ");

            if combined.is_empty() {
                first_non_blank(&[&card.core, &card.shadow, &card.name]).to_string()
            } else {
                combined
            }
        }
    }
}
