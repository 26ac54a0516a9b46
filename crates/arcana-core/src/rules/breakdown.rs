//! The five-layer breakdown.
//!
//! Always exactly five sections, in [`BreakdownLayer::ALL`] order, each with
//! a non-empty summary.

use crate::types::{BreakdownLayer, BreakdownSection, Card, EraState, Stratum};

use super::DrawContext;

/// First stratum in authority order that has cards, with those cards in
/// draw order.
pub fn highest_authority<'a>(order: &[Stratum], cards: &[&'a Card]) -> Option<(Stratum, Vec<&'a Card>)> {
    order.iter().find_map(|stratum| {
        let matching: Vec<&'a Card> = cards
            .iter()
            .copied()
            .filter(|card| card.stratum == *stratum)
            .collect();
        (!matching.is_empty()).then_some((*stratum, matching))
    })
}

/// Card names joined for prose.
pub fn join_names<'a, I>(cards: I) -> String
where
    I: IntoIterator<Item = &'a Card>,
{
    cards
        .into_iter()
        .map(|card| card.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Build the breakdown for a classified draw.
pub fn build(
    ctx: &DrawContext<'_>,
    authority_order: &[Stratum],
    era: EraState,
    dominant_element: Option<&str>,
) -> Vec<BreakdownSection> {
    let cards: Vec<&Card> = ctx.cards().iter().map(|drawn| &drawn.card).collect();

    BreakdownLayer::ALL
        .iter()
        .map(|layer| {
            let summary = match layer {
                BreakdownLayer::CosmicAuthority => cosmic_authority(authority_order, &cards, &ctx.axis.card),
                BreakdownLayer::AmplificationDistortion => amplification(&cards),
                BreakdownLayer::PersonalLens => personal_lens(&cards),
                BreakdownLayer::Manifestation => manifestation(&cards, dominant_element),
                BreakdownLayer::Recommendation => recommendation(era).to_string(),
            };
            BreakdownSection { layer: *layer, summary }
        })
        .collect()
}

fn cosmic_authority(order: &[Stratum], cards: &[&Card], axis: &Card) -> String {
    let authority = match highest_authority(order, cards) {
        Some((stratum, holders)) => format!(
            "{} holds the highest authority in this draw, with {} shaping the reading.",
            stratum,
            join_names(holders)
        ),
        None => "No higher authority stratum is present beyond the elemental layer.".to_string(),
    };

    format!(
        "{} The axis card is {}, which suggests the core tension is being named directly.",
        authority, axis.name
    )
}

fn amplification(cards: &[&Card]) -> String {
    let layer: Vec<&Card> = cards
        .iter()
        .copied()
        .filter(|card| card.stratum.is_amplifying_layer())
        .collect();

    if layer.is_empty() {
        return "No Primal or Shard layer is present, indicating amplification and distortion are limited."
            .to_string();
    }

    format!(
        "Primal and Shard pressures appear through {}, indicating amplification is part of the pattern.",
        join_names(layer)
    )
}

fn personal_lens(cards: &[&Card]) -> String {
    let personas: Vec<&Card> = cards
        .iter()
        .copied()
        .filter(|card| card.stratum == Stratum::Persona)
        .collect();

    if personas.is_empty() {
        return "No Persona card is present, suggesting the reading remains less personalized than usual."
            .to_string();
    }

    format!(
        "Persona cards {} indicate the reading passes through a defined personal lens.",
        join_names(personas)
    )
}

fn manifestation(cards: &[&Card], dominant_element: Option<&str>) -> String {
    let manifest: Vec<&Card> = cards
        .iter()
        .copied()
        .filter(|card| card.stratum.is_manifest())
        .collect();

    if manifest.is_empty() {
        return "The manifest layer is limited in this draw.".to_string();
    }

    let tail = match dominant_element {
        Some(element) => format!(", with {} acting as the dominant element.", element),
        None => ".".to_string(),
    };
    format!("The manifest layer appears through {}{}", join_names(manifest), tail)
}

fn recommendation(era: EraState) -> &'static str {
    match era {
        EraState::Astral => {
            "The era state suggests action, but action should remain proportionate to the strongest authority cards."
        }
        EraState::Umbral => {
            "The era state suggests reflection, conservation, and a measured pace before commitment."
        }
        EraState::Transitional => {
            "The era state suggests balancing action with reflection until the pattern clarifies further."
        }
    }
}
