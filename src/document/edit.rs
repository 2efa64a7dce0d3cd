/*!
 * Structural edits on the demo tree.
 *
 * Every edit validates its arguments before touching the tree, so a
 * refused edit leaves the tree exactly as it was. An unloaded tree refuses
 * every edit. Successful edits end with a full reindex.
 */

use log::debug;
use uuid::Uuid;

use crate::document::model::{Section, Step};
use crate::document::tree::DocumentTree;
use crate::errors::{IndexError, MergeDirection, StructuralEditError};

impl DocumentTree {
    fn ensure_editable(&self) -> Result<(), StructuralEditError> {
        if self.is_loaded() {
            Ok(())
        } else {
            Err(StructuralEditError::NotLoaded)
        }
    }

    /// Merge section `at` with its neighbour. The earlier of the two sections
    /// survives with its title and flags and receives the later one's steps.
    /// Returns the index of the surviving section.
    pub fn merge_section(&mut self, at: usize, direction: MergeDirection) -> Result<usize, StructuralEditError> {
        self.ensure_editable()?;
        let len = self.section_count();
        if at >= len {
            return Err(IndexError::Section { index: at, len }.into());
        }
        let (keep, absorb) = match direction {
            MergeDirection::Prev if at > 0 => (at - 1, at),
            MergeDirection::Next if at + 1 < len => (at, at + 1),
            _ => return Err(StructuralEditError::NoNeighbor { at, direction }),
        };
        for index in [keep, absorb] {
            if self.sections().nth(index).is_some_and(|s| s.is_special) {
                return Err(StructuralEditError::SpecialSection(index));
            }
        }

        let sections = self.sections_vec();
        let absorbed = sections.remove(absorb);
        let survivor = &mut sections[keep];
        if survivor.audio.is_none() {
            survivor.audio = absorbed.audio.clone();
        }
        debug!("Merging section {} ({}) into section {} ({})", absorb, absorbed.title, keep, survivor.title);
        survivor.steps_vec().extend(absorbed.into_steps());

        self.reindex();
        Ok(keep)
    }

    /// Insert a whole section at position `at` (0..=section_count). Steps at
    /// or after the insertion point shift by the new section's step count.
    pub fn insert_section(&mut self, at: usize, section: Section) -> Result<(), StructuralEditError> {
        self.ensure_editable()?;
        let len = self.section_count();
        if at > len {
            return Err(StructuralEditError::InsertOutOfRange { at, len });
        }
        debug!("Inserting section '{}' with {} steps at {}", section.title, section.len(), at);
        self.sections_vec().insert(at, section);
        self.reindex();
        Ok(())
    }

    /// Start a new section at the step with flat index `flat`. The step and
    /// everything after it in its section move into the new section, which
    /// inherits the title (with `suffix` appended) and the special flag.
    /// Flat indices are unchanged. Returns the new section's index.
    pub fn split_section(&mut self, flat: usize, suffix: &str) -> Result<usize, StructuralEditError> {
        self.ensure_editable()?;
        let (section_index, local) = self.locate(flat)?;
        if local == 0 {
            return Err(StructuralEditError::AlreadyBoundary(flat));
        }

        let sections = self.sections_vec();
        let source = &mut sections[section_index];
        let tail = source.steps_vec().split_off(local);
        let mut section = Section::new(format!("{}{}", source.title, suffix), tail);
        section.is_special = source.is_special;
        debug!("Splitting section {} at step {} into '{}'", section_index, flat, section.title);
        sections.insert(section_index + 1, section);

        self.reindex();
        Ok(section_index + 1)
    }

    /// Clone the step at `flat` next to itself with a fresh id. A pacing clone
    /// is animated and carries no narration or audio. Returns the clone's
    /// flat index.
    pub fn duplicate_step(&mut self, flat: usize, as_pacing: bool, before: bool) -> Result<usize, StructuralEditError> {
        self.ensure_editable()?;
        let (section_index, local) = self.locate(flat)?;

        let sections = self.sections_vec();
        let steps = sections[section_index].steps_vec();
        let mut clone = steps[local].clone();
        clone.id = Uuid::new_v4().to_string();
        if as_pacing {
            clone.is_animated = true;
            clone.narration.clear();
            clone.audio = None;
        }
        let (insert_at, clone_flat) = if before { (local, flat) } else { (local + 1, flat + 1) };
        steps.insert(insert_at, clone);

        self.reindex();
        Ok(clone_flat)
    }

    /// Remove the step at `flat`. A section left without steps is removed
    /// as well. Returns the removed step.
    pub fn delete_step(&mut self, flat: usize) -> Result<Step, StructuralEditError> {
        self.ensure_editable()?;
        let (section_index, local) = self.locate(flat)?;

        let sections = self.sections_vec();
        let removed = sections[section_index].steps_vec().remove(local);
        if sections[section_index].is_empty() {
            let section = sections.remove(section_index);
            debug!("Section {} ({}) emptied by deletion and removed", section_index, section.title);
        }

        self.reindex();
        Ok(removed)
    }

    /// Mark or unmark a step as a pacing-only animation step.
    pub fn set_animated(&mut self, flat: usize, animated: bool) -> Result<(), StructuralEditError> {
        self.ensure_editable()?;
        self.flat_get_mut(flat)?.is_animated = animated;
        Ok(())
    }
}
