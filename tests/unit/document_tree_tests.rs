/*!
 * Tests for tree addressing, iteration and queries
 */

use dmate::document::{ClearTarget, DocumentTree, Section, Step};
use dmate::errors::IndexError;

use crate::common::tree_from_layout;

/// Sum of section lengths equals the cached step count for assorted layouts
#[test]
fn test_totalStepCount_withAssortedLayouts_shouldEqualSectionSum() {
    let layouts: [&[(&str, &[&str])]; 4] = [
        &[],
        &[("A", &[])],
        &[("A", &["x"]), ("B", &[]), ("C", &["x", "", "y"])],
        &[("A", &["", ""]), ("B", &["x", "y", "z", ""])],
    ];
    for layout in layouts {
        let tree = tree_from_layout(layout);
        let sum: usize = tree.sections().map(Section::len).sum();
        assert_eq!(tree.total_step_count(), sum);
        assert_eq!(tree.steps().count(), sum);
    }
}

/// Flat and nested addressing resolve to the same step object
#[test]
fn test_flatGet_forEveryIndex_shouldMatchNestedGet() {
    let tree = tree_from_layout(&[("A", &["1"]), ("B", &[]), ("C", &["2", "3"]), ("D", &["4", "", "5"])]);

    for k in 0..tree.total_step_count() {
        let (section, local) = tree.locate(k).unwrap();
        let flat = tree.flat_get(k).unwrap();
        assert!(std::ptr::eq(flat, tree.nested_get(section, local).unwrap()));
        assert_eq!(flat.section_index(), section);
        assert_eq!(flat.local_index(), local);
    }
    assert_eq!(
        tree.flat_get(6).unwrap_err(),
        IndexError::Flat { index: 6, len: 6 }
    );
}

/// Section start offsets form prefix sums of the section lengths
#[test]
fn test_globalStartIndex_shouldBePrefixSums() {
    let tree = tree_from_layout(&[("A", &["1", "2"]), ("B", &[]), ("C", &["3"]), ("D", &["4", "5", "6"])]);
    let starts: Vec<usize> = tree.sections().map(Section::global_start_index).collect();
    assert_eq!(starts, vec![0, 2, 2, 3]);
}

/// Filtered iteration admits a step when either flagged field has text
#[test]
fn test_filteredSteps_withBothFlags_shouldUseOrSemantics() {
    let tree = DocumentTree::new(
        "Filter",
        vec![Section::new(
            "Only",
            vec![
                Step::new("both", "Click").with_narration("Talk"),
                Step::new("instruction", "Click"),
                Step::new("narration", "").with_narration("Talk"),
                Step::new("neither", "  "),
            ],
        )],
    );

    let ids: Vec<&str> = tree.filtered_steps(true, true).map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["both", "instruction", "narration"]);

    let ids: Vec<&str> = tree.filtered_steps(true, false).map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["both", "instruction"]);
}

/// Clearing narration of a section leaves instructions intact
#[test]
fn test_clearText_section_shouldOnlyClearRequestedFields() {
    let mut tree = tree_from_layout(&[("A", &["keep"]), ("B", &["one", "two"])]);

    assert_eq!(tree.clear_text(ClearTarget::Section(1), false, true).unwrap(), 2);

    assert!(tree.flat_get(0).unwrap().has_narration());
    assert!(!tree.flat_get(1).unwrap().has_narration());
    assert!(tree.flat_get(2).unwrap().has_instruction());
    assert!(tree.clear_text(ClearTarget::Section(5), true, true).is_err());
}

/// Word frequency counts spoken words only
#[test]
fn test_wordFrequency_shouldSkipProductionNotes() {
    let tree = tree_from_layout(&[("A", &["Reports, reports everywhere [pacing step]", "", "Everywhere!"])]);
    let words = tree.word_frequency();

    assert_eq!(words.get("reports"), Some(&2));
    assert_eq!(words.get("everywhere"), Some(&2));
    assert!(!words.contains_key("pacing"));
}
