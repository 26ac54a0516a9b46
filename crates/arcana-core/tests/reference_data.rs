//! End-to-end checks against the bundled reference data in `data/`.

use std::path::PathBuf;

use arcana_core::{
    export_text, summary_text, Catalog, EraState, HistoryEntry, InterpretationBias, OutputMode, PersistedHistoryEntry,
    ReadingHistory, ReadingService, Scale, Stratum,
};
use chrono::{TimeZone, Utc};

fn data_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data")
}

fn service() -> ReadingService {
    ReadingService::new(Catalog::load(data_root()).unwrap())
}

fn ids(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|id| id.to_string()).collect()
}

#[test]
fn test_reference_data_loads() {
    let catalog = Catalog::load(data_root()).unwrap();

    assert_eq!(catalog.output_modes().len(), 3);
    assert!(catalog.spread("aether-pulse").is_some());
    assert!(catalog.spread("convergence-of-the-star").is_some());
    assert!(catalog.cards().len() >= 9);
    assert!(catalog
        .doctrine()
        .polarity
        .is_divine_balance("divine-radiant-balance"));

    for stratum in Stratum::ALL {
        assert!(
            catalog.cards().iter().any(|card| card.stratum == *stratum),
            "no {} card in reference data",
            stratum
        );
    }
}

#[test]
fn test_spreads_listed_smallest_first() {
    let service = service();
    let counts: Vec<u32> = service.spreads().iter().map(|spread| spread.card_count).collect();
    assert_eq!(counts, vec![3, 9]);
}

#[test]
fn test_seeded_draws_are_deterministic() {
    let service = service();

    for spread in ["aether-pulse", "convergence-of-the-star"] {
        let first = service.draw(spread, false, Some(2024)).unwrap();
        let second = service.draw(spread, false, Some(2024)).unwrap();
        assert_eq!(first.card_ids(), second.card_ids());

        let a = service.interpret(&first, OutputMode::Scholarly, Some("Where next?")).unwrap();
        let b = service.interpret(&second, OutputMode::Scholarly, Some("Where next?")).unwrap();
        assert_eq!(a, b);
    }
}

#[test]
fn test_restore_reproduces_reading() {
    let service = service();
    let draw = service.draw("convergence-of-the-star", false, Some(77)).unwrap();
    let restored = service
        .restore_draw("convergence-of-the-star", &draw.card_ids(), draw.seed)
        .unwrap();

    for mode in [OutputMode::Concise, OutputMode::Layered, OutputMode::Scholarly] {
        let original = service.interpret(&draw, mode, Some("q")).unwrap();
        let again = service.interpret(&restored, mode, Some("q")).unwrap();
        assert_eq!(original.narrative, again.narrative);
        assert_eq!(original.header, again.header);
    }
}

#[test]
fn test_scale_coverage() {
    let service = service();
    let read = |cards: &[&str]| {
        let draw = service.restore_draw("aether-pulse", &ids(cards), None).unwrap();
        service.interpret(&draw, OutputMode::Concise, None).unwrap()
    };

    let minor = read(&["fire-i", "persona-the-witness", "earth-i"]);
    assert_eq!(minor.header.scale, Scale::Minor);
    assert_eq!(minor.diagnostics.matched_scale_conditions.len(), 3);

    let major = read(&["fire-i", "crystal-ii", "ice-i"]);
    assert_eq!(major.header.scale, Scale::Major);

    let primal_major = read(&["primal-ifrit-of-flame", "earth-i", "primal-titan-of-earth"]);
    assert_eq!(primal_major.header.scale, Scale::Major);
    assert!(primal_major.header.escalation);

    let era = read(&["fire-i", "calamity-world-rewritten", "persona-the-witness"]);
    assert_eq!(era.header.scale, Scale::Era);
    assert_eq!(era.header.era_state, EraState::Transitional);
}

#[test]
fn test_divine_balance_stabilizes_astral_draw() {
    let service = service();
    let draw = service
        .restore_draw(
            "aether-pulse",
            &ids(&["primal-ifrit-of-flame", "divine-radiant-balance", "lightning-i"]),
            None,
        )
        .unwrap();
    let result = service.interpret(&draw, OutputMode::Layered, None).unwrap();

    assert_eq!(result.diagnostics.polarity_sum, 4);
    assert_eq!(result.header.era_state, EraState::Transitional);
    assert!(result.header.moderation);
    assert_eq!(result.header.moderation_reasons.len(), 2);
}

#[test]
fn test_three_card_example_reading() {
    let service = service();
    let draw = service
        .restore_draw("aether-pulse", &ids(&["persona-the-witness", "crystal-i", "fire-i"]), None)
        .unwrap();
    let result = service.interpret(&draw, OutputMode::Concise, None).unwrap();

    assert_eq!(result.header.scale, Scale::Major);
    assert_eq!(result.header.era_state, EraState::Astral);
    assert_eq!(result.header.dominant_element.as_deref(), Some("Fire"));
    for header in ["Core Narrative", "Pressure", "Axis", "Direction"] {
        assert!(result.narrative.lines().any(|line| line == header), "missing {}", header);
    }
}

#[test]
fn test_summary_and_export_render() {
    let service = service().with_bias(InterpretationBias::StrictAuto);
    let draw = service.draw("convergence-of-the-star", false, Some(5)).unwrap();
    let result = service.interpret(&draw, OutputMode::Scholarly, Some("What is shifting?")).unwrap();
    let at = Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap();

    let summary = summary_text(&result, service.doctrine(), service.bias(), at);
    assert!(summary.contains("Bias: StrictAuto"));
    assert!(summary.contains("First Row: "));
    assert!(summary.ends_with("— End —"));

    let export = export_text(&result, at);
    assert!(export.starts_with("Question: What is shifting?\nDate/Time: 2026-03-01T09:30:00.000Z"));
    assert!(export.contains("\nPositions\nOrigin: "));
    assert!(export.contains("\nDiagnostics\nPolarity Sum: "));
}

#[test]
fn test_history_entry_restores_reading() {
    let service = service();
    let draw = service.draw("aether-pulse", false, Some(77)).unwrap();
    let reading = service
        .interpret(&draw, OutputMode::Layered, Some("What pressure surrounds this choice?"))
        .unwrap();
    let entry = HistoryEntry::from_reading(&draw, &reading, false, Utc::now());

    let restored = service.restore_draw(&entry.spread_id, &entry.card_ids, entry.seed).unwrap();
    let again = service
        .interpret(&restored, entry.output_mode, entry.question.as_deref())
        .unwrap();

    assert_eq!(restored.card_ids(), entry.card_ids);
    assert_eq!(again.narrative, reading.narrative);
    assert!(!again.narrative.trim().is_empty());
}

#[test]
fn test_persisted_history_keeps_lightweight_data_only() {
    let service = service();
    let draw = service.draw("aether-pulse", false, Some(91)).unwrap();
    let reading = service.interpret(&draw, OutputMode::Concise, Some("What holds steady?")).unwrap();

    let mut history = ReadingHistory::new();
    history.push(HistoryEntry::from_reading(&draw, &reading, false, Utc::now()));

    let json = serde_json::to_string(&history.to_persisted()).unwrap();
    let stored: Vec<PersistedHistoryEntry> = serde_json::from_str(&json).unwrap();
    let restored_history = ReadingHistory::from_persisted(stored);

    assert_eq!(restored_history.len(), 1);
    let entry = &restored_history.entries()[0];
    assert!(entry.reading.is_none());
    assert_eq!(entry.card_ids, draw.card_ids());
    assert!(!entry.core_narrative_preview.is_empty());

    let restored = service.restore_entry(entry).unwrap();
    let again = service.interpret(&restored, entry.output_mode, entry.question.as_deref()).unwrap();
    assert!(!again.narrative.trim().is_empty());
}
