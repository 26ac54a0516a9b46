//! The browsable deck.

use std::collections::{BTreeMap, HashMap};

use crate::draw::DrawError;
use crate::types::{Card, Stratum};

/// All cards, sorted by stratum then name, with id lookup.
#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
    by_id: HashMap<String, usize>,
}

impl Deck {
    pub fn new(mut cards: Vec<Card>) -> Self {
        cards.sort_by(|a, b| {
            a.stratum
                .cmp(&b.stratum)
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
                .then_with(|| a.name.cmp(&b.name))
        });

        let by_id = cards
            .iter()
            .enumerate()
            .map(|(index, card)| (card.id.to_lowercase(), index))
            .collect();

        Self { cards, by_id }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Card by id, compared case-insensitively.
    pub fn get(&self, id: &str) -> Result<&Card, DrawError> {
        self.by_id
            .get(&id.trim().to_lowercase())
            .map(|index| &self.cards[*index])
            .ok_or_else(|| DrawError::UnknownCard(id.to_string()))
    }

    pub fn by_stratum(&self, stratum: Stratum) -> Vec<&Card> {
        self.cards.iter().filter(|card| card.stratum == stratum).collect()
    }

    /// Cards whose element matches, case-insensitively.
    pub fn by_element(&self, element: &str) -> Vec<&Card> {
        let element = element.trim();
        self.cards
            .iter()
            .filter(|card| card.element().is_some_and(|own| own.eq_ignore_ascii_case(element)))
            .collect()
    }

    pub fn counts_by_stratum(&self) -> BTreeMap<Stratum, usize> {
        let mut counts = BTreeMap::new();
        for card in &self.cards {
            *counts.entry(card.stratum).or_insert(0) += 1;
        }
        counts
    }

    /// Counts keyed by the first-seen spelling of each element.
    pub fn counts_by_element(&self) -> BTreeMap<String, usize> {
        let mut spellings: HashMap<String, String> = HashMap::new();
        let mut counts = BTreeMap::new();

        for element in self.cards.iter().filter_map(Card::element) {
            let key = spellings
                .entry(element.to_lowercase())
                .or_insert_with(|| element.to_string())
                .clone();
            *counts.entry(key).or_insert(0) += 1;
        }

        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::fixtures::*;
    use crate::types::Polarity;

    fn deck() -> Deck {
        Deck::new(vec![
            element_card("water-i", Stratum::Element, Polarity::Umbral, -1, "Water"),
            card("primal-titan", Stratum::Primal, Polarity::Astral, 1),
            element_card("fire-i", Stratum::Element, Polarity::Astral, 1, "Fire"),
            element_card("court-fire-initiate", Stratum::Court, Polarity::Astral, 1, "fire"),
            card("calamity-end", Stratum::Calamity, Polarity::Umbral, -2),
        ])
    }

    #[test]
    fn test_sorted_by_stratum_then_name() {
        let deck = deck();
        let ids: Vec<&str> = deck.cards().iter().map(|card| card.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["calamity-end", "court-fire-initiate", "fire-i", "water-i", "primal-titan"]
        );
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let deck = deck();
        assert_eq!(deck.get("FIRE-I").unwrap().id, "fire-i");
        assert!(matches!(deck.get("nope"), Err(DrawError::UnknownCard(id)) if id == "nope"));
    }

    #[test]
    fn test_filters() {
        let deck = deck();
        assert_eq!(deck.by_stratum(Stratum::Element).len(), 2);
        assert_eq!(deck.by_element("FIRE").len(), 2);
        assert!(deck.by_element("Ice").is_empty());
    }

    #[test]
    fn test_counts() {
        let deck = deck();
        assert_eq!(deck.counts_by_stratum().get(&Stratum::Element), Some(&2));
        let elements = deck.counts_by_element();
        // Court sorts before Element, so its spelling is seen first.
        assert_eq!(elements.get("fire"), Some(&2));
        assert_eq!(elements.get("Water"), Some(&1));
    }
}
