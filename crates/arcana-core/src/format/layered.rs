//! Layered formatter: the five breakdown sections under their titles.

use crate::doctrine::Doctrine;
use crate::types::{BreakdownLayer, ReadingResult};

use super::{push_section, ReadingFormatter};

#[derive(Debug, Clone, Copy, Default)]
pub struct LayeredFormatter;

impl LayeredFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl ReadingFormatter for LayeredFormatter {
    fn format(&self, result: &ReadingResult, _doctrine: &Doctrine) -> String {
        let mut out = String::new();

        for layer in BreakdownLayer::ALL {
            let summary = result
                .breakdown
                .iter()
                .find(|section| section.layer == layer)
                .map(|section| section.summary.as_str())
                .unwrap_or("No summary is available for this layer.");
            push_section(&mut out, layer.title(), summary);
        }

        out.trim_end().to_string()
    }
}
