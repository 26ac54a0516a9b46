//! # arcana-core
//!
//! Deterministic interpretation engine for the Arcana card system.
//!
//! Given a spread of drawn cards and a doctrine, this crate answers:
//! - How significant is the reading? (Minor, Major, Era)
//! - What is its mood? (Astral, Umbral, Transitional)
//! - Which element dominates, and what escalates or moderates it?
//! - What does each card say in this context?
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: Same draw and doctrine always produce the same reading
//! 2. **Pure**: Reference data is never mutated by interpretation
//! 3. **Traceable**: Every scale decision records the conditions that matched
//! 4. **Replayable**: A reading is rebuilt from its spread id, card ids and seed
//!
//! ## Example
//!
//! ```rust,ignore
//! use arcana_core::{Catalog, ReadingService, OutputMode};
//!
//! let catalog = Catalog::load("data")?;
//! let service = ReadingService::new(catalog);
//! let draw = service.draw("aether-pulse", false, Some(7))?;
//! let result = service.interpret(&draw, OutputMode::Concise, Some("What now?"))?;
//! println!("{}", result.narrative);
//! ```

pub mod catalog;
pub mod deck;
pub mod doctrine;
pub mod draw;
pub mod engine;
pub mod format;
pub mod history;
pub mod rules;
pub mod service;
pub mod types;

// Re-export main types at crate root
pub use catalog::{Catalog, CatalogError, OutputModeDefinition};
pub use deck::Deck;
pub use doctrine::{Doctrine, DoctrineError};
pub use draw::{DrawError, DrawService};
pub use engine::InterpretationEngine;
pub use format::summary::{core_narrative_preview, export_text, summary_text};
pub use format::{formatter_for, ReadingFormatter};
pub use history::{HistoryEntry, PersistedHistoryEntry, ReadingHistory};
pub use service::ReadingService;
pub use types::{
    BreakdownLayer, BreakdownSection, Card, CardAnnotation, CardFlag, Diagnostics, Draw,
    DrawnCard, EraState, InterpretationBias, OutputMode, Polarity, PositionDefinition,
    ReadingCard, ReadingHeader, ReadingResult, Scale, SpreadDefinition, Stratum,
};

use thiserror::Error;

/// Errors raised while interpreting a draw.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InterpretError {
    #[error("spread '{spread}' has no drawn card at axis position {axis_index}")]
    MissingAxisCard { spread: String, axis_index: u32 },
}

/// Any error this crate can produce.
#[derive(Error, Debug)]
pub enum ArcanaError {
    #[error("Doctrine error: {0}")]
    Doctrine(#[from] DoctrineError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Draw error: {0}")]
    Draw(#[from] DrawError),

    #[error("Interpretation error: {0}")]
    Interpret(#[from] InterpretError),
}

/// Interpret a draw and render its narrative in one step.
///
/// This is the main entry point when no [`ReadingService`] is needed.
pub fn interpret(
    draw: &Draw,
    doctrine: &Doctrine,
    output_mode: OutputMode,
    bias: InterpretationBias,
    question: Option<&str>,
) -> Result<ReadingResult, InterpretError> {
    let mut result = InterpretationEngine::new().interpret(draw, doctrine, output_mode, question)?;
    result.narrative = format::render(&result, doctrine, output_mode, bias);
    Ok(result)
}
