/*!
 * Corrective sectioning.
 *
 * Regroups sections so that every run of consecutive narrated steps (a
 * talking-point streak) opens its own section, followed by the click-only
 * steps that belong to it. Production notes in the narration are acted on
 * during the same pass.
 *
 * The pass is a single forward walk over flat step indices with explicit
 * streak state. A deleted step does not advance the cursor, so the step
 * that slides into its place is visited next. Animated pacing steps are
 * transparent to streaks, and special sections reset the state and are
 * never merged or split.
 */

use log::{debug, info};

use crate::app_config::ProductionNoteConfig;
use crate::document::model::Step;
use crate::document::tree::DocumentTree;
use crate::errors::{AlignmentError, MergeDirection};

/// What the production notes of a step ask for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoteActions {
    pub delete: bool,
    pub duplicate: bool,
    pub animate: bool,
    pub section: bool,
}

impl NoteActions {
    /// Classify a step's production notes against the configured keywords.
    pub fn for_step(step: &Step, keywords: &ProductionNoteConfig) -> Self {
        let notes = step.production_notes();
        let matches = |words: &[String]| {
            notes
                .iter()
                .any(|note| words.iter().any(|word| !word.is_empty() && note.contains(&word.to_lowercase())))
        };
        Self {
            delete: matches(&keywords.delete),
            duplicate: matches(&keywords.duplicate),
            animate: matches(&keywords.animate),
            section: matches(&keywords.section),
        }
    }

    /// Whether the step will vanish from the streak walk.
    fn is_transparent(&self) -> bool {
        self.delete || self.animate
    }
}

/// Counters describing what a sectioning pass changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectioningReport {
    /// Section boundaries inserted before a streak start or around a section step
    pub splits: usize,
    /// Sections merged into their predecessor
    pub merges: usize,
    /// Steps deleted by a production note
    pub deleted: usize,
    /// Pacing duplicates inserted
    pub duplicated: usize,
    /// Steps marked animated by a production note
    pub animated: usize,
    /// Multi-line talking points moved into a section of their own
    pub multiline_splits: usize,
    /// Talking-point streaks found
    pub streaks: usize,
    /// The tree had already been sectioned and was left alone
    pub already_sectioned: bool,
}

impl SectioningReport {
    /// Whether the pass changed the tree.
    pub fn is_unchanged(&self) -> bool {
        self.splits == 0
            && self.merges == 0
            && self.deleted == 0
            && self.duplicated == 0
            && self.animated == 0
            && self.multiline_splits == 0
    }
}

#[derive(Debug, Default)]
struct StreakState {
    /// Narrated steps seen in the current streak
    streak_len: usize,
    /// Narrated steps still expected in the current streak
    remaining: usize,
    /// Flat index of the previous narrated step
    prev_tp: Option<usize>,
}

impl StreakState {
    fn reset(&mut self) {
        *self = Self::default();
    }

    fn in_streak(&self) -> bool {
        self.remaining > 0
    }
}

/// Length of the streak that would start at `from`: consecutive narrated
/// steps, looking through animated and to-be-removed steps, stopping at a
/// special section, a click-only step, a section step, or a further
/// multi-line talking point.
fn streak_length(tree: &DocumentTree, from: usize, keywords: &ProductionNoteConfig) -> usize {
    let mut count = 0;
    let mut flat = from;
    while let Ok(step) = tree.flat_get(flat) {
        if tree.section(step.section_index()).is_ok_and(|s| s.is_special) {
            break;
        }
        flat += 1;
        if step.is_animated {
            continue;
        }
        let actions = NoteActions::for_step(step, keywords);
        if actions.is_transparent() {
            continue;
        }
        if actions.section || !step.has_spoken_narration() {
            break;
        }
        if count > 0 && step.narration_lines() > 1 {
            break;
        }
        count += 1;
    }
    count
}

struct Pass<'a> {
    tree: &'a mut DocumentTree,
    keywords: &'a ProductionNoteConfig,
    suffix: &'a str,
    state: StreakState,
    /// Section holding a step that must stay alone
    isolated: Option<usize>,
    report: SectioningReport,
}

impl Pass<'_> {
    fn can_merge_prev(&self, section: usize) -> bool {
        section > 0
            && self.isolated != Some(section - 1)
            && self.tree.section(section - 1).is_ok_and(|s| !s.is_special)
    }

    fn merge_prev(&mut self, section: usize) -> Result<(), AlignmentError> {
        self.tree.merge_section(section, MergeDirection::Prev)?;
        self.report.merges += 1;
        Ok(())
    }

    fn split(&mut self, flat: usize) -> Result<usize, AlignmentError> {
        let index = self.tree.split_section(flat, self.suffix)?;
        self.report.splits += 1;
        Ok(index)
    }

    /// Give the step at `flat`, and any pacing steps directly after it, a
    /// section of their own.
    fn isolate(&mut self, flat: usize) -> Result<(), AlignmentError> {
        let (mut section, local) = self.tree.locate(flat)?;
        if local > 0 {
            section = self.split(flat)?;
        }
        let mut end = flat + 1;
        while let Ok(step) = self.tree.flat_get(end) {
            if step.section_index() != section || !step.is_animated {
                break;
            }
            end += 1;
        }
        if self.tree.flat_get(end).is_ok_and(|s| s.section_index() == section) {
            self.split(end)?;
        }
        self.isolated = Some(section);
        self.state.reset();
        Ok(())
    }

    /// A multi-line talking point opens a section and gets a pacing
    /// duplicate after it; it forms a streak of its own.
    fn split_multiline(&mut self, flat: usize, local: usize) -> Result<(), AlignmentError> {
        if local > 0 {
            self.split(flat)?;
        }
        self.tree.duplicate_step(flat, true, false)?;
        self.report.duplicated += 1;
        self.report.multiline_splits += 1;
        self.report.streaks += 1;
        self.state = StreakState { streak_len: 1, remaining: 0, prev_tp: Some(flat) };
        Ok(())
    }

    fn narrated(&mut self, flat: usize, section: usize, local: usize) -> Result<(), AlignmentError> {
        if self.state.in_streak() {
            if local == 0 && self.can_merge_prev(section) {
                debug!("Step {} continues the streak from step {:?}; merging its section back", flat, self.state.prev_tp);
                self.merge_prev(section)?;
            }
            self.state.streak_len += 1;
        } else {
            self.state.remaining = streak_length(self.tree, flat, self.keywords);
            self.state.streak_len = 1;
            self.report.streaks += 1;
            debug!("Streak of {} talking points starts at step {}", self.state.remaining, flat);
            if local > 0 {
                self.split(flat)?;
            }
        }
        self.state.remaining = self.state.remaining.saturating_sub(1);
        self.state.prev_tp = Some(flat);
        Ok(())
    }

    fn click_only(&mut self, section: usize, local: usize) -> Result<(), AlignmentError> {
        self.state.remaining = 0;
        self.state.streak_len = 0;
        if local == 0 && self.can_merge_prev(section) {
            debug!("Section {} opens without a talking point; merging it back", section);
            self.merge_prev(section)?;
        }
        Ok(())
    }

    fn run(mut self) -> Result<SectioningReport, AlignmentError> {
        let mut cursor = 0;
        while cursor < self.tree.total_step_count() {
            let (section, local) = self.tree.locate(cursor)?;
            if self.tree.section(section)?.is_special {
                self.state.reset();
                cursor += 1;
                continue;
            }

            let step = self.tree.flat_get(cursor)?;
            if step.is_animated {
                cursor += 1;
                continue;
            }
            let actions = NoteActions::for_step(step, self.keywords);
            let spoken = step.has_spoken_narration();
            let multiline = spoken && step.narration_lines() > 1 && !actions.section;

            if actions.delete {
                let removed = self.tree.delete_step(cursor)?;
                debug!("Deleted step {} ({}) by production note", cursor, removed.id);
                self.report.deleted += 1;
                continue;
            }
            if actions.animate {
                self.tree.set_animated(cursor, true)?;
                self.report.animated += 1;
                cursor += 1;
                continue;
            }
            // A multi-line talking point gets its pacing duplicate below.
            if actions.duplicate && !multiline {
                self.tree.duplicate_step(cursor, true, false)?;
                self.report.duplicated += 1;
            }

            if actions.section {
                self.isolate(cursor)?;
                if spoken {
                    self.report.streaks += 1;
                }
            } else if multiline {
                self.split_multiline(cursor, local)?;
            } else if spoken {
                self.narrated(cursor, section, local)?;
            } else {
                self.click_only(section, local)?;
            }
            cursor += 1;
        }

        self.tree.set_sectioned(true);
        Ok(self.report)
    }
}

/// Run corrective sectioning over the whole tree.
pub fn correct_sections(
    tree: &mut DocumentTree,
    keywords: &ProductionNoteConfig,
    continuation_suffix: &str,
) -> Result<SectioningReport, AlignmentError> {
    if !tree.is_loaded() {
        return Err(AlignmentError::NotLoaded("Demo"));
    }
    if tree.is_sectioned() {
        debug!("Demo already sectioned, skipping");
        return Ok(SectioningReport { already_sectioned: true, ..SectioningReport::default() });
    }
    let pass = Pass {
        tree,
        keywords,
        suffix: continuation_suffix,
        state: StreakState::default(),
        isolated: None,
        report: SectioningReport::default(),
    };
    let report = pass.run()?;
    info!(
        "Sectioning finished: {} streaks, {} splits, {} merges, {} deleted, {} duplicated.",
        report.streaks, report.splits, report.merges, report.deleted, report.duplicated
    );
    Ok(report)
}
