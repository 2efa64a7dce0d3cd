/*!
 * The demo document tree.
 *
 * `DocumentTree` owns its sections, which own their steps. Every step's
 * flat `global_index` and every section's `global_start_index` are cached
 * and recomputed after each structural edit, so flat index `k` always
 * resolves to exactly one (section, local) pair by prefix-sum lookup.
 */

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use log::{error, info};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::document::model::{Section, Step};
use crate::errors::IndexError;
use crate::sources::structure::{LoadedDemo, StructureSource};

static WORD_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\p{L}\p{N}']+").expect("Invalid word regex")
});

/// What `clear_text` should clear
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearTarget {
    /// A single step, by flat index
    Step(usize),
    /// Every step of a section
    Section(usize),
}

/// Ordered collection of sections making up one demo.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentTree {
    id: String,
    title: String,
    path: Option<PathBuf>,
    assets_dir: Option<PathBuf>,
    sections: Vec<Section>,
    total_step_count: usize,
    loaded: bool,
    is_sectioned: bool,
    audio_attached: bool,
}

impl DocumentTree {
    /// Build a loaded tree from sections.
    pub fn new(title: impl Into<String>, sections: Vec<Section>) -> Self {
        let mut tree = Self {
            id: String::new(),
            title: title.into(),
            path: None,
            assets_dir: None,
            sections,
            total_step_count: 0,
            loaded: true,
            is_sectioned: false,
            audio_attached: false,
        };
        tree.reindex();
        tree
    }

    /// An empty tree standing in for a demo that failed to load.
    pub fn not_loaded(path: Option<PathBuf>) -> Self {
        Self {
            id: String::new(),
            title: String::new(),
            path,
            assets_dir: None,
            sections: Vec::new(),
            total_step_count: 0,
            loaded: false,
            is_sectioned: false,
            audio_attached: false,
        }
    }

    /// Load a demo through a structural source. Never fails: a load error is
    /// logged and yields a tree with `is_loaded() == false`.
    pub fn open<S: StructureSource + ?Sized>(source: &S, path: &Path) -> Self {
        match source.load(path) {
            Ok(loaded) => {
                let tree = Self::from_loaded(loaded);
                info!(
                    "Imported demo with {} sections and {} steps.",
                    tree.section_count(),
                    tree.total_step_count()
                );
                tree
            }
            Err(e) => {
                error!("Demo failed to import. {}", e);
                Self::not_loaded(Some(path.to_path_buf()))
            }
        }
    }

    /// Derive a tree from a completed load.
    pub fn from_loaded(loaded: LoadedDemo) -> Self {
        let LoadedDemo { path, assets_dir, descriptor } = loaded;
        let id = descriptor.id.clone();
        let mut tree = descriptor.into_tree();
        tree.id = id;
        tree.path = Some(path);
        tree.assets_dir = Some(assets_dir);
        tree
    }

    /// Builder: set the demo identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Demo identifier from the source.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Demo title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Path the demo was loaded from or last saved to.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Asset directory accompanying the demo file.
    pub fn assets_dir(&self) -> Option<&Path> {
        self.assets_dir.as_deref()
    }

    pub(crate) fn set_location(&mut self, path: PathBuf, assets_dir: PathBuf) {
        self.path = Some(path);
        self.assets_dir = Some(assets_dir);
    }

    /// Whether the structural source parsed successfully.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Whether corrective sectioning has run.
    pub fn is_sectioned(&self) -> bool {
        self.is_sectioned
    }

    pub(crate) fn set_sectioned(&mut self, sectioned: bool) {
        self.is_sectioned = sectioned;
    }

    /// Whether audio has been attached; further attachment is a no-op.
    pub fn audio_attached(&self) -> bool {
        self.audio_attached
    }

    pub(crate) fn set_audio_attached(&mut self, attached: bool) {
        self.audio_attached = attached;
    }

    /// Total number of steps, cached.
    pub fn total_step_count(&self) -> usize {
        self.total_step_count
    }

    /// Number of sections.
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Whether the tree has no steps.
    pub fn is_empty(&self) -> bool {
        self.total_step_count == 0
    }

    /// Resolve a flat index to its (section, local) address.
    pub fn locate(&self, flat: usize) -> Result<(usize, usize), IndexError> {
        if flat >= self.total_step_count {
            return Err(IndexError::Flat { index: flat, len: self.total_step_count });
        }
        // Last section whose first step is at or before `flat`; empty sections
        // share their start with the next one and are skipped by this search.
        let section = self
            .sections
            .partition_point(|s| s.global_start_index() <= flat)
            - 1;
        Ok((section, flat - self.sections[section].global_start_index()))
    }

    /// Step at a flat index.
    pub fn flat_get(&self, flat: usize) -> Result<&Step, IndexError> {
        let (section, local) = self.locate(flat)?;
        Ok(&self.sections[section].steps()[local])
    }

    /// Mutable step at a flat index.
    pub fn flat_get_mut(&mut self, flat: usize) -> Result<&mut Step, IndexError> {
        let (section, local) = self.locate(flat)?;
        Ok(&mut self.sections[section].steps_mut()[local])
    }

    /// Step at a (section, local) address.
    pub fn nested_get(&self, section: usize, step: usize) -> Result<&Step, IndexError> {
        let owner = self.section(section)?;
        owner.step(step).ok_or(IndexError::Step { section, index: step, len: owner.len() })
    }

    /// Section at an index.
    pub fn section(&self, index: usize) -> Result<&Section, IndexError> {
        let len = self.sections.len();
        self.sections.get(index).ok_or(IndexError::Section { index, len })
    }

    /// Mutable section at an index.
    pub fn section_mut(&mut self, index: usize) -> Result<&mut Section, IndexError> {
        let len = self.sections.len();
        self.sections.get_mut(index).ok_or(IndexError::Section { index, len })
    }

    /// Sections in document order.
    pub fn sections(&self) -> std::slice::Iter<'_, Section> {
        self.sections.iter()
    }

    /// Steps in flat document order.
    pub fn steps(&self) -> impl Iterator<Item = &Step> + '_ {
        self.sections.iter().flat_map(|section| section.steps().iter())
    }

    /// Mutable steps in flat document order.
    pub fn steps_mut(&mut self) -> impl Iterator<Item = &mut Step> + '_ {
        self.sections.iter_mut().flat_map(|section| section.steps_mut().iter_mut())
    }

    /// Steps admitted when the flagged fields have text: with both flags set a
    /// step passes if either its instruction or its narration is non-empty.
    pub fn filtered_steps(&self, instruction: bool, narration: bool) -> impl Iterator<Item = &Step> + '_ {
        self.steps().filter(move |step| {
            (narration && step.has_narration()) || (instruction && step.has_instruction())
        })
    }

    /// Flat indices of steps containing `phrase` (case-insensitive).
    pub fn search(&self, phrase: &str, instructions_only: bool) -> Vec<usize> {
        let needle = phrase.to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.steps()
            .filter(|step| {
                step.instruction.to_lowercase().contains(&needle)
                    || (!instructions_only && step.narration.to_lowercase().contains(&needle))
            })
            .map(Step::global_index)
            .collect()
    }

    /// Lowercase word counts across spoken narration.
    pub fn word_frequency(&self) -> HashMap<String, usize> {
        let mut words: HashMap<String, usize> = HashMap::new();
        for step in self.steps().filter(|s| s.has_narration()) {
            let spoken = step.spoken_narration();
            for word in WORD_REGEX.find_iter(&spoken) {
                *words.entry(word.as_str().to_lowercase()).or_insert(0) += 1;
            }
        }
        words
    }

    /// Clear instruction and/or narration text. Returns the number of steps touched.
    pub fn clear_text(&mut self, target: ClearTarget, instruction: bool, narration: bool) -> Result<usize, IndexError> {
        let clear = |step: &mut Step| {
            if instruction {
                step.instruction.clear();
            }
            if narration {
                step.narration.clear();
            }
        };
        match target {
            ClearTarget::Step(flat) => {
                clear(self.flat_get_mut(flat)?);
                Ok(1)
            }
            ClearTarget::Section(index) => {
                let section = self.section_mut(index)?;
                section.steps_mut().iter_mut().for_each(clear);
                Ok(section.len())
            }
        }
    }

    pub(crate) fn sections_vec(&mut self) -> &mut Vec<Section> {
        &mut self.sections
    }

    /// Recompute every derived index and the cached step count.
    pub(crate) fn reindex(&mut self) {
        let mut next = 0;
        for (index, section) in self.sections.iter_mut().enumerate() {
            next = section.reindex(index, next);
        }
        self.total_step_count = next;
    }
}

impl fmt::Display for DocumentTree {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Demo: {}", self.title)?;
        if let Some(path) = &self.path {
            writeln!(f, "Source: {}", path.display())?;
        }
        writeln!(f, "Sections: {}", self.sections.len())?;
        writeln!(f, "Steps: {}", self.total_step_count)?;
        for section in &self.sections {
            writeln!(
                f,
                "  [{}] {} ({} steps{})",
                section.index(),
                section.title,
                section.len(),
                if section.is_special { ", special" } else { "" }
            )?;
        }
        Ok(())
    }
}
