//! Interpretation engine: turns a draw into a classified reading.
//!
//! Pipeline, all deterministic:
//! 1. Scale from the doctrine's condition groups
//! 2. Era state from the polarity sum (with divine-balance stabilization)
//! 3. Dominant element among manifest cards
//! 4. Escalation and moderation reasons
//! 5. Per-card meaning and note
//! 6. Five-layer breakdown
//!
//! The narrative is left empty; a formatter fills it in.

use crate::doctrine::Doctrine;
use crate::rules::{annotate, breakdown, era, scale, signals, theme, DrawContext};
use crate::types::{Diagnostics, Draw, OutputMode, ReadingCard, ReadingHeader, ReadingResult};
use crate::InterpretError;

/// Stateless interpreter over a doctrine.
#[derive(Debug, Clone, Copy, Default)]
pub struct InterpretationEngine;

impl InterpretationEngine {
    pub fn new() -> Self {
        Self
    }

    /// Interpret a draw under a doctrine.
    ///
    /// The question is carried into the result as given.
    ///
    /// # Errors
    ///
    /// [`InterpretError::MissingAxisCard`] when no drawn card occupies the
    /// spread's axis position.
    pub fn interpret(
        &self,
        draw: &Draw,
        doctrine: &Doctrine,
        output_mode: OutputMode,
        question: Option<&str>,
    ) -> Result<ReadingResult, InterpretError> {
        let ctx = DrawContext::new(draw, doctrine)?;

        let classification = scale::classify(doctrine, &ctx);
        let polarity_sum = era::polarity_sum(ctx.cards());
        let era_state = era::resolve(polarity_sum, &doctrine.polarity, ctx.has_divine_balance);
        let dominant_element = theme::dominant_element(ctx.cards());
        let escalation_reasons = signals::escalation_reasons(&ctx);
        let moderation_reasons = signals::moderation_reasons(&ctx);

        tracing::debug!(
            spread = %draw.spread.id,
            scale = %classification.scale,
            era = %era_state,
            polarity_sum,
            dominant = ?dominant_element,
            "Draw classified"
        );

        let cards = ctx
            .cards()
            .iter()
            .zip(annotate::annotate(&ctx, era_state))
            .map(|(drawn, annotation)| ReadingCard {
                position: drawn.position.clone(),
                card: drawn.card.clone(),
                annotation,
            })
            .collect();

        let sections = breakdown::build(
            &ctx,
            &doctrine.authority_order,
            era_state,
            dominant_element.as_deref(),
        );

        let diagnostics = Diagnostics {
            polarity_sum,
            counts_by_stratum: ctx.counts_by_stratum.clone(),
            counts_by_element: theme::element_counts(ctx.cards()).into_iter().collect(),
            matched_scale_conditions: classification.matched_conditions,
        };

        Ok(ReadingResult {
            spread_name: draw.spread.name.clone(),
            output_mode,
            question: question.map(str::to_string),
            header: ReadingHeader {
                scale: classification.scale,
                era_state,
                dominant_element,
                escalation: !escalation_reasons.is_empty(),
                escalation_reasons,
                moderation: !moderation_reasons.is_empty(),
                moderation_reasons,
            },
            axis_index: draw.spread.axis_index,
            cards,
            breakdown: sections,
            diagnostics,
            narrative: String::new(),
            seed: draw.seed,
        })
    }
}
