//! Reading service: the façade the CLI talks to.

use crate::catalog::{Catalog, OutputModeDefinition};
use crate::deck::Deck;
use crate::doctrine::Doctrine;
use crate::draw::{DrawError, DrawService};
use crate::engine::InterpretationEngine;
use crate::format;
use crate::history::HistoryEntry;
use crate::types::{Card, Draw, DrawnCard, InterpretationBias, OutputMode, ReadingResult, SpreadDefinition};
use crate::InterpretError;

/// Owns the reference data and the services built on it.
#[derive(Debug, Clone)]
pub struct ReadingService {
    catalog: Catalog,
    deck: Deck,
    draws: DrawService,
    engine: InterpretationEngine,
    bias: InterpretationBias,
}

impl ReadingService {
    pub fn new(catalog: Catalog) -> Self {
        let deck = Deck::new(catalog.cards().to_vec());
        Self {
            catalog,
            deck,
            draws: DrawService::new(),
            engine: InterpretationEngine::new(),
            bias: InterpretationBias::default(),
        }
    }

    pub fn with_bias(mut self, bias: InterpretationBias) -> Self {
        self.bias = bias;
        self
    }

    pub fn bias(&self) -> InterpretationBias {
        self.bias
    }

    pub fn set_bias(&mut self, bias: InterpretationBias) {
        self.bias = bias;
    }

    /// Spreads ordered by card count.
    pub fn spreads(&self) -> Vec<&SpreadDefinition> {
        let mut spreads: Vec<&SpreadDefinition> = self.catalog.spreads().iter().collect();
        spreads.sort_by_key(|spread| spread.card_count);
        spreads
    }

    pub fn spread(&self, id: &str) -> Result<&SpreadDefinition, DrawError> {
        self.catalog
            .spread(id)
            .ok_or_else(|| DrawError::UnknownSpread(id.to_string()))
    }

    pub fn output_modes(&self) -> &[OutputModeDefinition] {
        self.catalog.output_modes()
    }

    /// Deck cards, sorted by stratum then name.
    pub fn cards(&self) -> &[Card] {
        self.deck.cards()
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn doctrine(&self) -> &Doctrine {
        self.catalog.doctrine()
    }

    pub fn draw(&self, spread_id: &str, allow_repeats: bool, seed: Option<u64>) -> Result<Draw, DrawError> {
        let spread = self.spread(spread_id)?;
        self.draws.draw(spread, self.deck.cards(), allow_repeats, seed)
    }

    /// Rebuild a draw from card ids ordered by position index.
    pub fn restore_draw(&self, spread_id: &str, card_ids: &[String], seed: Option<u64>) -> Result<Draw, DrawError> {
        let spread = self.spread(spread_id)?;
        let positions = spread.ordered_positions();

        if card_ids.len() != positions.len() {
            return Err(DrawError::CardCountMismatch {
                spread: spread_id.to_string(),
                expected: positions.len(),
                actual: card_ids.len(),
            });
        }

        let cards = positions
            .into_iter()
            .zip(card_ids)
            .map(|(position, id)| {
                Ok(DrawnCard {
                    position: position.clone(),
                    card: self.deck.get(id)?.clone(),
                })
            })
            .collect::<Result<Vec<_>, DrawError>>()?;

        tracing::debug!(spread = %spread.id, "Draw restored");

        Ok(Draw {
            spread: spread.clone(),
            cards,
            seed,
        })
    }

    /// Rebuild the draw a history entry was recorded from.
    pub fn restore_entry(&self, entry: &HistoryEntry) -> Result<Draw, DrawError> {
        self.restore_draw(&entry.spread_id, &entry.card_ids, entry.seed)
    }

    /// Interpret a draw and render its narrative with the current bias.
    pub fn interpret(
        &self,
        draw: &Draw,
        output_mode: OutputMode,
        question: Option<&str>,
    ) -> Result<ReadingResult, InterpretError> {
        let doctrine = self.doctrine();
        let mut result = self.engine.interpret(draw, doctrine, output_mode, question)?;
        result.narrative = format::render(&result, doctrine, output_mode, self.bias);
        Ok(result)
    }
}
