//! Random sampling of cards into spread positions.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::types::{Card, Draw, DrawnCard, SpreadDefinition};

/// Errors that can occur when drawing or restoring a spread.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DrawError {
    #[error("Not enough cards to draw spread '{spread}' without repeats: need {required}, have {available}")]
    InsufficientCards {
        spread: String,
        required: usize,
        available: usize,
    },

    #[error("Unknown spread id: {0}")]
    UnknownSpread(String),

    #[error("Unknown card id: {0}")]
    UnknownCard(String),

    #[error("Cannot restore spread '{spread}' with {actual} cards; expected {expected}")]
    CardCountMismatch {
        spread: String,
        expected: usize,
        actual: usize,
    },
}

/// Draws one card per spread position.
#[derive(Debug, Clone, Copy, Default)]
pub struct DrawService;

impl DrawService {
    pub fn new() -> Self {
        Self
    }

    /// Fill every position of `spread` in index order.
    ///
    /// Without repeats a drawn card leaves the pool. A seed makes the draw
    /// reproducible and is carried into the returned [`Draw`].
    pub fn draw(
        &self,
        spread: &SpreadDefinition,
        cards: &[Card],
        allow_repeats: bool,
        seed: Option<u64>,
    ) -> Result<Draw, DrawError> {
        let positions = spread.ordered_positions();
        if cards.is_empty() || (!allow_repeats && cards.len() < positions.len()) {
            return Err(DrawError::InsufficientCards {
                spread: spread.id.clone(),
                required: positions.len(),
                available: cards.len(),
            });
        }

        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut pool: Vec<&Card> = cards.iter().collect();
        let drawn = positions
            .into_iter()
            .map(|position| {
                let card = if allow_repeats {
                    &cards[rng.gen_range(0..cards.len())]
                } else {
                    pool.remove(rng.gen_range(0..pool.len()))
                };
                DrawnCard {
                    position: position.clone(),
                    card: card.clone(),
                }
            })
            .collect();

        tracing::info!(spread = %spread.id, allow_repeats, seed = ?seed, "Spread drawn");

        Ok(Draw {
            spread: spread.clone(),
            cards: drawn,
            seed,
        })
    }
}
