/*!
 * Tests for structural edits keeping the tree indices consistent
 */

use dmate::document::{DocumentTree, Section, Step};
use dmate::errors::{MergeDirection, StructuralEditError};

use crate::common::tree_from_layout;

fn assert_consistent(tree: &DocumentTree) {
    let mut expected = 0;
    for (i, section) in tree.sections().enumerate() {
        assert_eq!(section.index(), i);
        assert_eq!(section.global_start_index(), expected);
        for (local, step) in section.steps().iter().enumerate() {
            assert_eq!(step.section_index(), i);
            assert_eq!(step.local_index(), local);
            assert_eq!(step.global_index(), expected + local);
        }
        expected += section.len();
    }
    assert_eq!(tree.total_step_count(), expected);
}

/// Inserting a section shifts only the steps at or after the insertion point
#[test]
fn test_insertSection_atEveryPosition_shouldShiftDownstreamByInsertedLength() {
    let base = tree_from_layout(&[("A", &["1", "2"]), ("B", &["3"]), ("C", &["4", "5", "6"])]);

    for at in 0..=base.section_count() {
        let mut tree = base.clone();
        let boundary = base.section(at).map(Section::global_start_index).unwrap_or(base.total_step_count());
        let inserted = Section::new("New", vec![Step::new("n0", ""), Step::new("n1", ""), Step::new("n2", "")]);

        tree.insert_section(at, inserted).unwrap();

        assert_consistent(&tree);
        for step in base.steps() {
            let moved = tree.steps().find(|s| s.id == step.id).unwrap();
            if step.global_index() < boundary {
                assert_eq!(moved.global_index(), step.global_index());
            } else {
                assert_eq!(moved.global_index(), step.global_index() + 3);
            }
        }
    }
}

/// A refused edit leaves the tree exactly as it was
#[test]
fn test_refusedEdits_shouldLeaveTreeUnchanged() {
    let mut tree = DocumentTree::new(
        "Refused",
        vec![
            Section::new("Title", vec![Step::new("t", "")]).special(),
            Section::new("Body", vec![Step::new("a", ""), Step::new("b", "")]),
        ],
    );
    let before = tree.clone();

    assert_eq!(tree.merge_section(1, MergeDirection::Prev), Err(StructuralEditError::SpecialSection(0)));
    assert!(matches!(tree.merge_section(1, MergeDirection::Next), Err(StructuralEditError::NoNeighbor { .. })));
    assert_eq!(tree.split_section(1, ""), Err(StructuralEditError::AlreadyBoundary(1)));
    assert!(tree.insert_section(3, Section::new("X", vec![])).is_err());
    assert!(tree.duplicate_step(3, true, false).is_err());
    assert!(tree.delete_step(3).is_err());

    assert_eq!(tree, before);
}

/// A sequence of mixed edits keeps every derived index consistent
#[test]
fn test_mixedEdits_shouldKeepIndicesConsistent() {
    let mut tree = tree_from_layout(&[("A", &["1", "", "2"]), ("B", &["3"]), ("C", &["", "4"])]);

    tree.split_section(2, " (cont.)").unwrap();
    assert_consistent(&tree);
    tree.duplicate_step(0, true, false).unwrap();
    assert_consistent(&tree);
    tree.merge_section(2, MergeDirection::Next).unwrap();
    assert_consistent(&tree);
    tree.delete_step(4).unwrap();
    assert_consistent(&tree);
    tree.insert_section(0, Section::new("Intro", vec![Step::new("i", "")])).unwrap();
    assert_consistent(&tree);

    assert_eq!(tree.total_step_count(), 7);
    assert_eq!(tree.flat_get(0).unwrap().id, "i");
}

/// Deleting every step of a section removes the section
#[test]
fn test_deleteStep_lastStepOfSection_shouldDropSection() {
    let mut tree = tree_from_layout(&[("A", &["1"]), ("B", &["2"]), ("C", &["3"])]);

    let removed = tree.delete_step(1).unwrap();

    assert_eq!(removed.id, "B-0");
    assert_eq!(tree.section_count(), 2);
    assert_eq!(tree.section(1).unwrap().title, "C");
    assert_consistent(&tree);
}
