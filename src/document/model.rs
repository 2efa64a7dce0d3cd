/*!
 * Leaf types of the demo tree: steps and sections.
 *
 * Index fields (`section_index`, `local_index`, `global_index`,
 * `global_start_index`) are derived by the owning tree and only writable
 * from inside the crate, so callers can never break the prefix-sum layout.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::sources::audio::Soundbite;

/// Bracketed production notes embedded in narration, e.g. `[duplicate this step]`
static PRODUCTION_NOTE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[([^\[\]]*)\]").expect("Invalid production note regex")
});

/// One click/navigation action of the demo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Identifier carried over from the structural source
    pub id: String,

    /// Click instruction text
    #[serde(default)]
    pub instruction: String,

    /// Talking-point text, possibly with production notes
    #[serde(default)]
    pub narration: String,

    /// Soundbite attached to this step
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<Soundbite>,

    /// Asset (screenshot) reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset: Option<String>,

    /// Playback delay in milliseconds
    #[serde(default)]
    pub delay_ms: u64,

    /// Whether the step is active in playback
    #[serde(default = "default_true")]
    pub active: bool,

    /// Pacing-only duplicate
    #[serde(default)]
    pub is_animated: bool,

    #[serde(skip)]
    section_index: usize,

    #[serde(skip)]
    local_index: usize,

    #[serde(skip)]
    global_index: usize,
}

fn default_true() -> bool {
    true
}

impl Step {
    /// Create an active, un-narrated step.
    pub fn new(id: impl Into<String>, instruction: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            instruction: instruction.into(),
            narration: String::new(),
            audio: None,
            asset: None,
            delay_ms: 0,
            active: true,
            is_animated: false,
            section_index: 0,
            local_index: 0,
            global_index: 0,
        }
    }

    /// Builder: set narration text.
    pub fn with_narration(mut self, narration: impl Into<String>) -> Self {
        self.narration = narration.into();
        self
    }

    /// Section this step belongs to.
    pub fn section_index(&self) -> usize {
        self.section_index
    }

    /// Position within its section.
    pub fn local_index(&self) -> usize {
        self.local_index
    }

    /// Flat position across the whole demo.
    pub fn global_index(&self) -> usize {
        self.global_index
    }

    pub(crate) fn set_position(&mut self, section_index: usize, local_index: usize, global_index: usize) {
        self.section_index = section_index;
        self.local_index = local_index;
        self.global_index = global_index;
    }

    /// Overwrite instruction and narration text.
    pub fn set_text(&mut self, instruction: &str, narration: &str) {
        self.instruction = instruction.to_string();
        self.narration = narration.to_string();
    }

    /// Attach a soundbite, replacing any previous one.
    pub fn set_audio(&mut self, soundbite: Soundbite) {
        self.audio = Some(soundbite);
    }

    /// Whether the instruction text is non-empty.
    pub fn has_instruction(&self) -> bool {
        !self.instruction.trim().is_empty()
    }

    /// Whether the narration text is non-empty (production notes included).
    pub fn has_narration(&self) -> bool {
        !self.narration.trim().is_empty()
    }

    /// Narration with production notes removed and whitespace trimmed.
    pub fn spoken_narration(&self) -> String {
        PRODUCTION_NOTE_REGEX
            .replace_all(&self.narration, "")
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Whether anything would actually be read aloud for this step.
    pub fn has_spoken_narration(&self) -> bool {
        !self.spoken_narration().is_empty()
    }

    /// Number of non-empty spoken narration lines.
    pub fn narration_lines(&self) -> usize {
        self.spoken_narration().lines().count()
    }

    /// Production notes found in the narration, trimmed and lowercased.
    pub fn production_notes(&self) -> Vec<String> {
        PRODUCTION_NOTE_REGEX
            .captures_iter(&self.narration)
            .filter_map(|cap| cap.get(1))
            .map(|m| m.as_str().trim().to_lowercase())
            .filter(|note| !note.is_empty())
            .collect()
    }
}

/// An ordered group of steps sharing a title and an optional soundbite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Section (chapter) title
    pub title: String,

    /// No narration expected (title card, divider)
    #[serde(default)]
    pub is_special: bool,

    /// Soundbite covering the whole section
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<Soundbite>,

    steps: Vec<Step>,

    #[serde(skip)]
    index: usize,

    #[serde(skip)]
    global_start_index: usize,
}

impl Section {
    /// Create a section from its steps. Indices are assigned once the
    /// section is placed in a tree.
    pub fn new(title: impl Into<String>, steps: Vec<Step>) -> Self {
        Self {
            title: title.into(),
            is_special: false,
            audio: None,
            steps,
            index: 0,
            global_start_index: 0,
        }
    }

    /// Builder: mark as a special (non-narrated) section.
    pub fn special(mut self) -> Self {
        self.is_special = true;
        self
    }

    /// Position of this section in the tree.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Flat index of the first step.
    pub fn global_start_index(&self) -> usize {
        self.global_start_index
    }

    /// Steps in order.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Mutable access to step content; the slice cannot change length.
    pub fn steps_mut(&mut self) -> &mut [Step] {
        &mut self.steps
    }

    /// Step at a local index.
    pub fn step(&self, local: usize) -> Option<&Step> {
        self.steps.get(local)
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the section has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Attach a section-level soundbite.
    pub fn set_audio(&mut self, soundbite: Soundbite) {
        self.audio = Some(soundbite);
    }

    pub(crate) fn steps_vec(&mut self) -> &mut Vec<Step> {
        &mut self.steps
    }

    pub(crate) fn into_steps(self) -> Vec<Step> {
        self.steps
    }

    /// Reassign this section's indices and those of its steps.
    /// Returns the flat index following the last step.
    pub(crate) fn reindex(&mut self, index: usize, global_start_index: usize) -> usize {
        self.index = index;
        self.global_start_index = global_start_index;
        for (local, step) in self.steps.iter_mut().enumerate() {
            step.set_position(index, local, global_start_index + local);
        }
        global_start_index + self.steps.len()
    }
}
