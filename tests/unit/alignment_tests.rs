/*!
 * Tests for narration and audio matching through the alignment engine
 */

use dmate::alignment::{AlignmentEngine, Slot};
use dmate::app_config::{AlignmentConfig, SlotRule};
use dmate::document::{DocumentTree, Section, Step};
use dmate::errors::{AlignmentError, MismatchError};
use dmate::sources::{Audio, Script, Soundbite};

use crate::common::tree_from_layout;

fn audio_of(labels: &[&str]) -> Audio {
    Audio::from_soundbites(labels.iter().filter_map(|l| Soundbite::from_label(l, "a")).collect())
}

fn script_of_len(len: usize) -> Script {
    Script::from_pairs((0..len).map(|i| (format!("Click {}", i), format!("Talk {}", i))))
}

/// Non-strict validation passes exactly when the counts agree
#[test]
fn test_validateNarration_nonStrict_shouldDependOnCountOnly() {
    let engine = AlignmentEngine::default();
    let tree = tree_from_layout(&[("A", &["", ""]), ("B", &["", "", ""])]);

    for len in 0..8 {
        let result = engine.validate_narration(&tree, &script_of_len(len));
        assert_eq!(result.is_ok(), len == 5, "script length {}", len);
    }
}

/// Two sections of two steps against three entries reports "4 steps vs 3"
#[test]
fn test_validateNarration_fourStepsVsThree_shouldReportCounts() {
    let engine = AlignmentEngine::default();
    let tree = tree_from_layout(&[("A", &["", ""]), ("B", &["", ""])]);

    let error = engine.validate_narration(&tree, &script_of_len(3)).unwrap_err();

    assert!(error.to_string().contains("4 steps vs 3"));
}

/// Applying the same script twice gives the same text as applying it once
#[test]
fn test_applyNarration_twice_shouldBeIdempotent() {
    let engine = AlignmentEngine::default();
    let mut tree = tree_from_layout(&[("A", &["old", ""]), ("B", &["old"])]);
    let script = script_of_len(3);

    engine.apply_narration(&mut tree, &script).unwrap();
    let first: Vec<(String, String)> = tree.steps().map(|s| (s.instruction.clone(), s.narration.clone())).collect();
    engine.apply_narration(&mut tree, &script).unwrap();
    let second: Vec<(String, String)> = tree.steps().map(|s| (s.instruction.clone(), s.narration.clone())).collect();

    assert_eq!(first, second);
    assert_eq!(second[2], ("Click 2".to_string(), "Talk 2".to_string()));
}

/// Sections of 1, 3 and 1 steps with an "intro narrated" middle section take 3 slots
#[test]
fn test_expectedAudioSlots_oneThreeOne_shouldBeThree() {
    let engine = AlignmentEngine::default();
    let tree = tree_from_layout(&[("A", &["Hi"]), ("B", &["Intro", "", ""]), ("C", &["Bye"])]);

    assert_eq!(engine.expected_audio_slots(&tree), 3);
}

/// A special section followed by an "intro narrated" section takes a single slot
#[test]
fn test_expectedAudioSlots_specialThenNormal_shouldBeOne() {
    let engine = AlignmentEngine::default();
    let tree = DocumentTree::new(
        "Special",
        vec![
            Section::new("Title", vec![Step::new("t", "Title card")]).special(),
            Section::new(
                "Body",
                vec![Step::new("a", "Click").with_narration("Talk"), Step::new("b", "Click")],
            ),
        ],
    );

    assert_eq!(engine.expected_audio_slots(&tree), 1);
    assert_eq!(engine.slots(&tree), vec![Slot::Section(1)]);
}

/// Alternate takes are skipped without advancing the slot
#[test]
fn test_applyAudio_withAlternateTake_shouldConsumeFourForThreeSlots() {
    let engine = AlignmentEngine::default();
    let mut tree = tree_from_layout(&[("A", &["Hi"]), ("B", &["Intro", "", ""]), ("C", &["Bye"])]);

    let outcome = engine.apply_audio(&mut tree, &audio_of(&["01", "02a", "02", "03"])).unwrap();

    assert_eq!(outcome.consumed, 4);
    assert_eq!(outcome.slots_filled, 3);
    let second_slot = tree.section(1).unwrap().audio.as_ref().unwrap();
    assert_eq!(second_slot.label(), "02");
    assert!(!second_slot.is_alternate());
}

/// Alternates count toward the diagnostic but not toward the match
#[test]
fn test_validateAudio_shouldCompareAgainstPrimaryTakes() {
    let engine = AlignmentEngine::default();
    let tree = tree_from_layout(&[("A", &["Hi"]), ("B", &["Intro", "", ""]), ("C", &["Bye"])]);

    assert!(engine.validate_audio(&tree, &audio_of(&["01", "02a", "02", "03"])).is_ok());
    assert_eq!(
        engine.validate_audio(&tree, &audio_of(&["01", "02", "03", "04", "04a"])),
        Err(AlignmentError::Mismatch(MismatchError::AudioSlots { expected_slots: 3, primary_takes: 4, alternates: 1 }))
    );
}

/// The per-step rule gives every non-special step its own slot, labelled as on disk
#[test]
fn test_applyAudio_perStepRule_shouldAttachToEveryStep() {
    let engine = AlignmentEngine::new(AlignmentConfig { slot_rule: SlotRule::PerStep, ..AlignmentConfig::default() });
    let mut tree = tree_from_layout(&[("A", &["Hi", ""]), ("B", &[""])]);

    engine.apply_audio(&mut tree, &audio_of(&["1", "2", "3"])).unwrap();

    let labels: Vec<String> = tree.steps().filter_map(|s| s.audio.as_ref().map(Soundbite::label)).collect();
    assert_eq!(labels, vec!["1", "2", "3"]);
    assert!(tree.sections().all(|s| s.audio.is_none()));
}

/// A ranged attach leaves the tree open for a later full attach
#[test]
fn test_applyAudioRange_partial_shouldNotMarkAttached() {
    let engine = AlignmentEngine::default();
    let mut tree = tree_from_layout(&[("A", &["Hi"]), ("B", &["Intro", "", ""]), ("C", &["Bye"])]);
    let audio = audio_of(&["01", "02", "03"]);

    let outcome = engine.apply_audio_range(&mut tree, &audio, 0..1).unwrap();
    assert_eq!(outcome.slots_filled, 1);
    assert!(!tree.audio_attached());

    let outcome = engine.apply_audio(&mut tree, &audio).unwrap();
    assert_eq!(outcome.slots_filled, 3);
    assert!(tree.audio_attached());
}

/// Validation gates application: nothing is written on a mismatch
#[test]
fn test_applyAudio_mismatch_shouldReportBeforeMutating() {
    let engine = AlignmentEngine::default();
    let mut tree = tree_from_layout(&[("A", &["Hi"]), ("B", &["Bye"])]);
    let before = tree.clone();

    let result = engine.apply_audio(&mut tree, &audio_of(&["01"]));

    assert!(matches!(result, Err(AlignmentError::Mismatch(MismatchError::AudioSlots { .. }))));
    assert_eq!(tree, before);
}

/// Corrective sectioning followed by audio uses the regrouped sections
#[test]
fn test_correctSections_thenAudio_shouldUseNewGrouping() {
    let engine = AlignmentEngine::default();
    let mut tree = tree_from_layout(&[("A", &["Intro", "", "Second topic", ""])]);
    assert_eq!(engine.slots(&tree), vec![Slot::Section(0)]);

    let report = engine.correct_sections(&mut tree).unwrap();

    assert_eq!(report.splits, 1);
    assert_eq!(engine.expected_audio_slots(&tree), 2);
    assert_eq!(engine.slots(&tree), vec![Slot::Section(0), Slot::Section(1)]);
}
