//! Classification rules applied to a draw.
//!
//! Each submodule answers one question about the draw:
//!
//! | Module | Question |
//! |--------|----------|
//! | `condition` | Does this doctrine condition hold? |
//! | `scale` | Is this a Minor, Major or Era reading? |
//! | `era` | Is the mood Astral, Umbral or Transitional? |
//! | `theme` | Which element dominates the manifest layer? |
//! | `signals` | What escalates or moderates the reading? |
//! | `annotate` | Which meaning and note does each card carry? |
//! | `breakdown` | What do the five narrative layers say? |
//!
//! All of them are pure functions over a [`DrawContext`].

pub mod annotate;
pub mod breakdown;
pub mod condition;
pub mod era;
pub mod scale;
pub mod signals;
pub mod theme;

use std::collections::BTreeMap;

use crate::doctrine::Doctrine;
use crate::types::{Draw, DrawnCard, Stratum};
use crate::InterpretError;

/// Stratum whose repeated presence escalates a reading.
pub const AMPLIFYING_STRATUM: Stratum = Stratum::Primal;

/// Stratum whose presence escalates a reading and darkens non-divine cards.
pub const CALAMITY_STRATUM: Stratum = Stratum::Calamity;

/// Highest-authority balancing stratum; immune to calamity bias.
pub const BALANCING_STRATUM: Stratum = Stratum::Divine;

/// Precomputed facts about a draw, shared by every rule.
#[derive(Debug)]
pub struct DrawContext<'a> {
    pub draw: &'a Draw,

    /// The card at the spread's axis position
    pub axis: &'a DrawnCard,

    /// Drawn card count per stratum; strata with no cards are absent
    pub counts_by_stratum: BTreeMap<Stratum, usize>,

    /// Whether any drawn card is a registered divine-balance card
    pub has_divine_balance: bool,
}

impl<'a> DrawContext<'a> {
    /// Build the context for a draw.
    ///
    /// Fails when no drawn card occupies the spread's axis position; the draw
    /// is malformed and cannot be interpreted.
    pub fn new(draw: &'a Draw, doctrine: &Doctrine) -> Result<Self, InterpretError> {
        let axis = draw.axis().ok_or_else(|| InterpretError::MissingAxisCard {
            spread: draw.spread.id.clone(),
            axis_index: draw.spread.axis_index,
        })?;

        let mut counts_by_stratum = BTreeMap::new();
        for drawn in &draw.cards {
            *counts_by_stratum.entry(drawn.card.stratum).or_insert(0) += 1;
        }

        let has_divine_balance = draw
            .cards
            .iter()
            .any(|drawn| doctrine.polarity.is_divine_balance(&drawn.card.id));

        Ok(Self {
            draw,
            axis,
            counts_by_stratum,
            has_divine_balance,
        })
    }

    /// Drawn cards of a stratum; missing strata count as zero.
    pub fn count(&self, stratum: Stratum) -> usize {
        self.counts_by_stratum.get(&stratum).copied().unwrap_or(0)
    }

    /// Whether the stratum appears at all.
    pub fn is_present(&self, stratum: Stratum) -> bool {
        self.counts_by_stratum.contains_key(&stratum)
    }

    /// Whether the draw contains at least one calamity card.
    pub fn has_calamity(&self) -> bool {
        self.count(CALAMITY_STRATUM) > 0
    }

    pub fn cards(&self) -> &'a [DrawnCard] {
        &self.draw.cards
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Builders shared by rule, engine and formatter tests.

    use crate::doctrine::{
        ConditionClause, Doctrine, PolarityRules, ScaleCondition, ScaleRuleSet, ScaleRules, StratumThresholds,
    };
    use crate::types::{Card, CardFlag, Draw, DrawnCard, Polarity, PositionDefinition, SpreadDefinition, Stratum};

    pub fn card(id: &str, stratum: Stratum, polarity: Polarity, weight: i32) -> Card {
        Card {
            id: id.to_string(),
            name: id.to_string(),
            stratum,
            element: None,
            rank: None,
            polarity,
            polarity_weight: weight,
            core: format!("{} core", id),
            shadow: format!("{} shadow", id),
            astral_note: format!("{} astral note", id),
            umbral_note: format!("{} umbral note", id),
            flags: vec![],
        }
    }

    pub fn element_card(id: &str, stratum: Stratum, polarity: Polarity, weight: i32, element: &str) -> Card {
        Card {
            element: Some(element.to_string()),
            ..card(id, stratum, polarity, weight)
        }
    }

    pub fn flagged(mut card: Card, flag: CardFlag) -> Card {
        card.flags.push(flag);
        card
    }

    pub fn spread(id: &str, count: u32, axis_index: u32) -> SpreadDefinition {
        SpreadDefinition {
            id: id.to_string(),
            name: id.to_string(),
            card_count: count,
            layout: if count == 9 { "grid3x3".to_string() } else { "row".to_string() },
            axis_index,
            positions: (1..=count)
                .map(|index| PositionDefinition {
                    index,
                    name: if index == axis_index {
                        "Axis".to_string()
                    } else {
                        format!("Position {}", index)
                    },
                    description: format!("Position {}", index),
                })
                .collect(),
        }
    }

    /// Lay cards into a fresh spread with the given axis.
    pub fn draw(cards: Vec<Card>, axis_index: u32) -> Draw {
        let spread = spread("test", cards.len() as u32, axis_index);
        let cards = spread
            .positions
            .iter()
            .cloned()
            .zip(cards)
            .map(|(position, card)| DrawnCard { position, card })
            .collect();
        Draw {
            spread,
            cards,
            seed: None,
        }
    }

    /// The reference doctrine used throughout the tests.
    pub fn doctrine() -> Doctrine {
        Doctrine {
            authority_order: vec![
                Stratum::Calamity,
                Stratum::Crystal,
                Stratum::Divine,
                Stratum::Primal,
                Stratum::Shard,
                Stratum::Persona,
                Stratum::Court,
                Stratum::Element,
            ],
            scale_rules: ScaleRules {
                minor: ScaleRuleSet {
                    conditions: vec![
                        ScaleCondition::new(vec![ConditionClause::StratumAbsent(Stratum::Calamity)]),
                        ScaleCondition::new(vec![ConditionClause::AxisNot(Stratum::Crystal)]),
                        ScaleCondition::new(vec![ConditionClause::MaxCount(StratumThresholds::from([(
                            Stratum::Primal,
                            1,
                        )]))]),
                    ],
                    conditions_any: vec![],
                },
                major: ScaleRuleSet {
                    conditions: vec![],
                    conditions_any: vec![
                        ScaleCondition::new(vec![ConditionClause::AxisIs(Stratum::Crystal)]),
                        ScaleCondition::new(vec![ConditionClause::MinCount(StratumThresholds::from([(
                            Stratum::Primal,
                            2,
                        )]))]),
                    ],
                },
                era: ScaleRuleSet {
                    conditions: vec![],
                    conditions_any: vec![ScaleCondition::new(vec![ConditionClause::AxisIs(
                        Stratum::Calamity,
                    )])],
                },
            },
            polarity: PolarityRules {
                astral_threshold: 2,
                umbral_threshold: -2,
                divine_balance_card_ids: vec!["divine-radiant-balance".to_string()],
                stabilize_on_balance: true,
            },
        }
    }
}
