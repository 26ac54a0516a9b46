//! Scholarly formatter: the layered text plus the reasoning behind it.

use crate::doctrine::Doctrine;
use crate::types::ReadingResult;

use super::{push_section, LayeredFormatter, ReadingFormatter};

#[derive(Debug, Clone, Copy, Default)]
pub struct ScholarlyFormatter;

impl ScholarlyFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl ReadingFormatter for ScholarlyFormatter {
    fn format(&self, result: &ReadingResult, doctrine: &Doctrine) -> String {
        let diagnostics = &result.diagnostics;
        let mut out = LayeredFormatter::new().format(result, doctrine);
        out.push_str("\n\n");

        let order = doctrine
            .authority_order
            .iter()
            .map(|stratum| stratum.as_str())
            .collect::<Vec<_>>()
            .join(" > ");
        push_section(&mut out, "Authority Order Used", &order);

        let matched = if diagnostics.matched_scale_conditions.is_empty() {
            "No explicit scale conditions matched; Minor was used as the doctrinal fallback.".to_string()
        } else {
            diagnostics.matched_scale_conditions.join("\n")
        };
        push_section(&mut out, "Scale Conditions Matched", &matched);

        out.push_str("Diagnostics\n");
        push_section(
            &mut out,
            "Polarity Sum and Thresholds",
            &format!(
                "Sum: {}; Astral >= {}; Umbral <= {}",
                diagnostics.polarity_sum, doctrine.polarity.astral_threshold, doctrine.polarity.umbral_threshold
            ),
        );

        // Stratum variants are declared alphabetically, so map order is display order.
        let strata = diagnostics
            .counts_by_stratum
            .iter()
            .map(|(stratum, count)| format!("{}: {}", stratum, count))
            .collect::<Vec<_>>()
            .join("\n");
        push_section(&mut out, "Counts By Stratum", &strata);

        let mut elements: Vec<(&String, &usize)> = diagnostics.counts_by_element.iter().collect();
        elements.sort_by_key(|(element, _)| element.to_lowercase());
        let elements = if elements.is_empty() {
            "None".to_string()
        } else {
            elements
                .into_iter()
                .map(|(element, count)| format!("{}: {}", element, count))
                .collect::<Vec<_>>()
                .join("\n")
        };
        push_section(&mut out, "Counts By Element", &elements);

        out.trim_end().to_string()
    }
}
