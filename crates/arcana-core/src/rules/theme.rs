//! Dominant theme resolution.
//!
//! Only manifest cards (Element, Court) with a non-blank element vote. A
//! single highest count wins; any tie at the top yields no dominant element.

use crate::types::DrawnCard;

/// Count elements case-insensitively, keeping the first-seen spelling.
///
/// Sorted by count descending, then element name ascending
/// (case-insensitive). The ordering is only for determinism in logs and
/// diagnostics; tie detection compares counts alone.
pub fn element_counts<'a, I>(cards: I) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = &'a DrawnCard>,
{
    let mut counts: Vec<(String, usize)> = Vec::new();

    for element in cards.into_iter().filter_map(|drawn| drawn.card.element()) {
        match counts
            .iter_mut()
            .find(|(seen, _)| seen.eq_ignore_ascii_case(element))
        {
            Some((_, count)) => *count += 1,
            None => counts.push((element.to_string(), 1)),
        }
    }

    counts.sort_by(|(a_name, a_count), (b_name, b_count)| {
        b_count
            .cmp(a_count)
            .then_with(|| a_name.to_lowercase().cmp(&b_name.to_lowercase()))
    });
    counts
}

/// The dominant element among manifest cards, if there is a unique leader.
pub fn dominant_element(cards: &[DrawnCard]) -> Option<String> {
    let counts = element_counts(cards.iter().filter(|drawn| drawn.card.stratum.is_manifest()));

    let (leader, top) = counts.first()?;
    let tied = counts.iter().filter(|(_, count)| count == top).count() > 1;

    if tied {
        tracing::debug!(counts = ?counts, "Dominant element tied");
        return None;
    }

    Some(leader.clone())
}
