//! Narrative formatters.
//!
//! Each output mode has one formatter. They read a [`ReadingResult`] and the
//! doctrine it was classified under and produce plain text; none of them
//! changes the result.

mod bias;
mod concise;
mod layered;
mod scholarly;
pub mod summary;

pub use bias::{select_meaning, select_note};
pub use concise::ConciseFormatter;
pub use layered::LayeredFormatter;
pub use scholarly::ScholarlyFormatter;

use crate::doctrine::Doctrine;
use crate::types::{InterpretationBias, OutputMode, ReadingResult};

/// Renders a reading as text.
pub trait ReadingFormatter {
    fn format(&self, result: &ReadingResult, doctrine: &Doctrine) -> String;
}

/// Formatter for an output mode. Only the concise formatter selects
/// meanings, so only it consults the bias.
pub fn formatter_for(mode: OutputMode, bias: InterpretationBias) -> Box<dyn ReadingFormatter> {
    match mode {
        OutputMode::Concise => Box::new(ConciseFormatter::new(bias)),
        OutputMode::Layered => Box::new(LayeredFormatter::new()),
        OutputMode::Scholarly => Box::new(ScholarlyFormatter::new()),
    }
}

/// Render with the formatter for `mode`.
pub fn render(result: &ReadingResult, doctrine: &Doctrine, mode: OutputMode, bias: InterpretationBias) -> String {
    formatter_for(mode, bias).format(result, doctrine)
}

/// First candidate that is not blank, or empty.
pub(crate) fn first_non_blank<'a>(candidates: &[&'a str]) -> &'a str {
    candidates
        .iter()
        .copied()
        .find(|candidate| !candidate.trim().is_empty())
        .unwrap_or("")
}

/// Append a header, its body, and a blank separator line.
pub(crate) fn push_section(out: &mut String, header: &str, body: &str) {
    out.push_str(header);
    out.push('\n');
    out.push_str(body);
    out.push_str("\n\n");
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::engine::InterpretationEngine;
    use crate::rules::fixtures;
    use crate::types::{Card, OutputMode, ReadingResult};

    /// Interpret cards under the fixture doctrine without rendering.
    pub fn interpret(cards: Vec<Card>, axis_index: u32, mode: OutputMode) -> ReadingResult {
        InterpretationEngine::new()
            .interpret(&fixtures::draw(cards, axis_index), &fixtures::doctrine(), mode, None)
            .unwrap()
    }
}
