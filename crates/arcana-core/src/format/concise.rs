//! Concise formatter.
//!
//! Three-card spreads read as Pressure / Axis / Direction. Everything else
//! reads as three rows over positions 1-3, 4-6 and 7-9.

use crate::doctrine::Doctrine;
use crate::rules::breakdown::{highest_authority, join_names};
use crate::types::{Card, EraState, InterpretationBias, ReadingCard, ReadingResult};

use super::{push_section, select_meaning, select_note, ReadingFormatter};

pub const CORE_NARRATIVE: &str = "Core Narrative";
pub const PRESSURE: &str = "Pressure";
pub const AXIS: &str = "Axis";
pub const DIRECTION: &str = "Direction";
pub const ROWS: [(&str, u32, u32); 3] = [("First Row", 1, 3), ("Second Row", 4, 6), ("Third Row", 7, 9)];

/// Every header the concise formatter can emit.
pub const HEADERS: [&str; 7] = [
    CORE_NARRATIVE,
    PRESSURE,
    AXIS,
    DIRECTION,
    ROWS[0].0,
    ROWS[1].0,
    ROWS[2].0,
];

#[derive(Debug, Clone, Copy, Default)]
pub struct ConciseFormatter {
    bias: InterpretationBias,
}

impl ConciseFormatter {
    pub fn new(bias: InterpretationBias) -> Self {
        Self { bias }
    }

    fn pressure(&self, result: &ReadingResult, doctrine: &Doctrine) -> String {
        let Some(first) = result.ordered_cards().into_iter().next() else {
            return String::new();
        };

        format!(
            "{} frames the immediate pressure. {} {}",
            first.card.name,
            select_meaning(result, first, self.bias),
            authority(result, doctrine)
        )
        .trim()
        .to_string()
    }

    fn axis(&self, result: &ReadingResult) -> String {
        let Some(axis) = result.axis_card() else {
            return String::new();
        };

        format!(
            "{} occupies the axis, and its selected meaning points toward this emphasis: {} {}",
            axis.card.name,
            select_meaning(result, axis, self.bias),
            select_note(result, axis)
        )
        .trim()
        .to_string()
    }

    fn row(&self, result: &ReadingResult, start: u32, end: u32) -> String {
        let row: Vec<&ReadingCard> = result
            .ordered_cards()
            .into_iter()
            .filter(|reading| (start..=end).contains(&reading.position.index))
            .collect();

        if row.is_empty() {
            return "No row data is present.".to_string();
        }

        let emphasis = row
            .iter()
            .map(|reading| select_meaning(result, reading, self.bias))
            .collect::<Vec<_>>()
            .join(" ");

        format!(
            "{} suggest a shared row emphasis. {}",
            join_names(row.iter().map(|reading| &reading.card)),
            emphasis
        )
        .trim()
        .to_string()
    }
}

impl ReadingFormatter for ConciseFormatter {
    fn format(&self, result: &ReadingResult, doctrine: &Doctrine) -> String {
        let mut out = String::new();
        push_section(&mut out, CORE_NARRATIVE, &core_narrative(result, doctrine));

        if result.cards.len() == 3 {
            push_section(&mut out, PRESSURE, &self.pressure(result, doctrine));
            push_section(&mut out, AXIS, &self.axis(result));
            push_section(&mut out, DIRECTION, &direction(result));
        } else {
            for (header, start, end) in ROWS {
                push_section(&mut out, header, &self.row(result, start, end));
            }
        }

        out.trim_end().to_string()
    }
}

fn core_narrative(result: &ReadingResult, doctrine: &Doctrine) -> String {
    format!(
        "This reading suggests a {} scale pattern in a {} era state. {} {}",
        result.header.scale.as_str().to_lowercase(),
        result.header.era_state.as_str().to_lowercase(),
        authority(result, doctrine),
        direction(result)
    )
    .trim()
    .to_string()
}

fn authority(result: &ReadingResult, doctrine: &Doctrine) -> String {
    let cards: Vec<&Card> = result.cards.iter().map(|reading| &reading.card).collect();

    match highest_authority(&doctrine.authority_order, &cards) {
        Some((stratum, holders)) => format!(
            "{} appears as the highest active authority through {}, which indicates the reading should be weighed from that layer first.",
            stratum,
            join_names(holders)
        ),
        None => "The draw remains concentrated in the lower manifest layers, which suggests practical conditions deserve the closest attention."
            .to_string(),
    }
}

fn direction(result: &ReadingResult) -> String {
    let recommendation = match result.header.era_state {
        EraState::Astral => "The pattern points toward measured action rather than delay.",
        EraState::Umbral => "The pattern points toward reflection, protection, and reduced velocity.",
        EraState::Transitional => "The pattern points toward balance, revision, and careful pacing.",
    };

    match &result.header.dominant_element {
        Some(element) => format!("{} The dominant elemental influence is {}.", recommendation, element),
        None => recommendation.to_string(),
    }
}
