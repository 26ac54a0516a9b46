//! Shareable plain-text renderings of a finished reading.
//!
//! The summary is always built from a concise rendering regardless of the
//! reading's own output mode; the export carries whatever narrative the
//! reading already has.

use std::collections::HashMap;

use chrono::{DateTime, Local, SecondsFormat, Utc};

use crate::doctrine::Doctrine;
use crate::types::{InterpretationBias, OutputMode, ReadingResult};

use super::concise::{AXIS, CORE_NARRATIVE, DIRECTION, HEADERS, PRESSURE, ROWS};
use super::{ConciseFormatter, ReadingFormatter};

/// Default preview length, in characters.
pub const DEFAULT_PREVIEW_LEN: usize = 60;

/// The "Core Narrative" section of a concise rendering, truncated to
/// `max_len` characters with a trailing "..." when longer.
pub fn core_narrative_preview(narrative: &str, max_len: usize) -> String {
    let sections = parse_concise_sections(narrative);
    let preview = sections.get(CORE_NARRATIVE).map(String::as_str).unwrap_or("");

    if preview.chars().count() <= max_len {
        return preview.to_string();
    }

    let kept: String = preview.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept.trim_end())
}

/// A compact summary: header facts and the concise sections, without
/// diagnostics or the breakdown.
pub fn summary_text(
    result: &ReadingResult,
    doctrine: &Doctrine,
    bias: InterpretationBias,
    timestamp: DateTime<Utc>,
) -> String {
    let concise = ConciseFormatter::new(bias).format(result, doctrine);
    let sections = parse_concise_sections(&concise);
    let section = |header: &str| sections.get(header).cloned().unwrap_or_default();
    let header = &result.header;

    let mut lines = vec![
        "Reading Summary".to_string(),
        String::new(),
        format!(
            "Timestamp: {}",
            timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
        ),
        String::new(),
        format!(
            "Spread: {} | Output: {} | Bias: {}",
            result.spread_name, result.output_mode, bias
        ),
    ];

    if let Some(question) = &result.question {
        lines.push(String::new());
        lines.push(format!("Question: {}", question));
    }

    lines.push(String::new());
    lines.push(format!(
        "Scale: {} | Era: {} | Dominant: {} | Escalation: {} | Moderation: {}",
        header.scale,
        header.era_state,
        header.dominant_element.as_deref().unwrap_or("None"),
        yes_no(header.escalation),
        yes_no(header.moderation)
    ));
    lines.push(String::new());
    lines.push(format!("{}: {}", CORE_NARRATIVE, section(CORE_NARRATIVE)));

    let labels: Vec<&str> = if result.cards.len() == 3 {
        vec![PRESSURE, AXIS, DIRECTION]
    } else {
        ROWS.iter().map(|(label, _, _)| *label).collect()
    };
    for label in labels {
        lines.push(String::new());
        lines.push(format!("{}: {}", label, section(label)));
    }

    lines.push(String::new());
    lines.push("— End —".to_string());
    lines.join("\n")
}

/// A full export: metadata, positions, narrative, and diagnostics for
/// scholarly readings.
pub fn export_text(result: &ReadingResult, timestamp: DateTime<Utc>) -> String {
    let header = &result.header;
    let mut lines = vec![
        format!("Question: {}", result.question.as_deref().unwrap_or("(none)")),
        format!(
            "Date/Time: {}",
            timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
        ),
        format!("Spread: {}", result.spread_name),
        format!("Output Mode: {}", result.output_mode),
        format!("Scale: {}", header.scale),
        format!("Era State: {}", header.era_state),
        format!(
            "Dominant Element: {}",
            header.dominant_element.as_deref().unwrap_or("None")
        ),
        format!(
            "Escalation: {} - {}",
            yes_no(header.escalation),
            join_or_none(&header.escalation_reasons)
        ),
        format!(
            "Moderation: {} - {}",
            yes_no(header.moderation),
            join_or_none(&header.moderation_reasons)
        ),
        String::new(),
        "Positions".to_string(),
    ];

    for reading in result.ordered_cards() {
        lines.push(format!("{}: {}", reading.position.name, reading.card.name));
    }

    lines.push(String::new());
    lines.push("Output".to_string());
    lines.push(result.narrative.clone());

    if result.output_mode == OutputMode::Scholarly {
        let diagnostics = &result.diagnostics;
        let strata: Vec<(String, usize)> = diagnostics
            .counts_by_stratum
            .iter()
            .map(|(stratum, count)| (stratum.to_string(), *count))
            .collect();
        let elements: Vec<(String, usize)> = diagnostics
            .counts_by_element
            .iter()
            .map(|(element, count)| (element.clone(), *count))
            .collect();

        lines.push(String::new());
        lines.push("Diagnostics".to_string());
        lines.push(format!("Polarity Sum: {}", diagnostics.polarity_sum));
        lines.push(format!("Counts By Stratum: {}", join_pairs(strata)));
        lines.push(format!("Counts By Element: {}", join_pairs(elements)));
    }

    lines.join("\n").trim_end().to_string()
}

/// Split a concise rendering into header → body, joining wrapped lines.
fn parse_concise_sections(narrative: &str) -> HashMap<&'static str, String> {
    let mut sections = HashMap::new();
    let mut current: Option<(&'static str, Vec<&str>)> = None;

    for line in narrative.lines().map(str::trim).filter(|line| !line.is_empty()) {
        if let Some(header) = HEADERS.iter().find(|header| header.eq_ignore_ascii_case(line)) {
            if let Some((previous, body)) = current.take() {
                sections.insert(previous, body.join(" "));
            }
            current = Some((*header, Vec::new()));
        } else if let Some((_, body)) = current.as_mut() {
            body.push(line);
        }
    }

    if let Some((previous, body)) = current {
        sections.insert(previous, body.join(" "));
    }

    sections
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

fn join_or_none(values: &[String]) -> String {
    if values.is_empty() {
        "None".to_string()
    } else {
        values.join("; ")
    }
}

fn join_pairs(mut pairs: Vec<(String, usize)>) -> String {
    if pairs.is_empty() {
        return "None".to_string();
    }

    pairs.sort_by_key(|(key, _)| key.to_lowercase());
    pairs
        .into_iter()
        .map(|(key, count)| format!("{}={}", key, count))
        .collect::<Vec<_>>()
        .join(", ")
}
