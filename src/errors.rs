/*!
 * Error types for the dmate library.
 *
 * Each stage of alignment has its own error family, defined with the
 * thiserror crate so they compose through `#[from]` conversions:
 * - `LoadError`: a source document could not be read or parsed
 * - `MismatchError`: the demo and a narration/audio source disagree
 * - `IndexError`: flat or nested addressing outside the tree
 * - `StructuralEditError`: a merge/insert/split/duplicate/delete was refused
 */

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading a structural, narration or audio source
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoadError {
    /// The file or directory does not exist
    #[error("Source not found: {}", .0.display())]
    Missing(PathBuf),

    /// The file exists but could not be read (locked, permissions, ...)
    #[error("Failed to read {}: {message}", path.display())]
    Unreadable {
        /// Path that failed
        path: PathBuf,
        /// Underlying IO message
        message: String,
    },

    /// The content could not be parsed
    #[error("Failed to parse {}: {message}", path.display())]
    Parse {
        /// Path that failed
        path: PathBuf,
        /// Parser message
        message: String,
    },

    /// The source parsed but contained nothing usable
    #[error("Source is empty: {}", .0.display())]
    Empty(PathBuf),
}

/// Disagreements between the demo tree and a narration or audio source
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MismatchError {
    /// Total step count differs from the number of narration entries
    #[error("Script does not match demo: {demo_steps} steps vs {script_steps}")]
    StepCount {
        /// Steps in the demo
        demo_steps: usize,
        /// Entries in the script
        script_steps: usize,
    },

    /// Section count differs (strict mode only)
    #[error("Script does not match demo: {demo_sections} sections vs {script_sections}")]
    SectionCount {
        /// Sections in the demo
        demo_sections: usize,
        /// Sections declared by the script
        script_sections: usize,
    },

    /// A section's step count differs from the script grouping (strict mode only)
    #[error("Section {section_index} ({title}) does not match script: {demo_steps} steps vs {script_steps}")]
    SectionLength {
        /// Index of the first offending section
        section_index: usize,
        /// Title of the offending section
        title: String,
        /// Steps in the demo section
        demo_steps: usize,
        /// Entries in the matching script section
        script_steps: usize,
    },

    /// Expected audio slots differ from the available primary takes
    #[error("Audio does not match demo: {expected_slots} slots vs {primary_takes} soundbites ({alternates} alternate takes)")]
    AudioSlots {
        /// Slots implied by the slot rule
        expected_slots: usize,
        /// Soundbites that are not alternate takes
        primary_takes: usize,
        /// Alternate takes present in the source
        alternates: usize,
    },

    /// The audio source ran out before every slot was filled
    #[error("Audio exhausted at slot {slot} after consuming {consumed} soundbites")]
    AudioExhausted {
        /// Slot that could not be filled
        slot: usize,
        /// Soundbites consumed so far
        consumed: usize,
    },
}

/// Out-of-range addressing into the tree
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    /// Flat step index outside [0, total_step_count)
    #[error("Step index {index} out of range for demo with {len} steps")]
    Flat {
        /// Requested index
        index: usize,
        /// Total step count
        len: usize,
    },

    /// Section index outside [0, section_count)
    #[error("Section index {index} out of range for demo with {len} sections")]
    Section {
        /// Requested index
        index: usize,
        /// Section count
        len: usize,
    },

    /// Step index outside its section
    #[error("Step index {index} out of range for section {section} with {len} steps")]
    Step {
        /// Section addressed
        section: usize,
        /// Requested step index
        index: usize,
        /// Steps in that section
        len: usize,
    },
}

/// Direction of a section merge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeDirection {
    /// Merge into the preceding section
    Prev,
    /// Absorb the following section
    Next,
}

impl std::fmt::Display for MergeDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Prev => write!(f, "previous"),
            Self::Next => write!(f, "next"),
        }
    }
}

/// Structural edits that were refused; the tree is left unchanged
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructuralEditError {
    /// The tree failed to load; it has no structure to edit
    #[error("Demo is not loaded")]
    NotLoaded,

    /// The addressed step or section does not exist
    #[error(transparent)]
    Index(#[from] IndexError),

    /// Merge requested with a neighbour that does not exist
    #[error("Section {at} has no {direction} section to merge with")]
    NoNeighbor {
        /// Section addressed
        at: usize,
        /// Requested direction
        direction: MergeDirection,
    },

    /// Special (non-narrated) sections cannot be merged
    #[error("Section {0} is a special section and cannot be merged")]
    SpecialSection(usize),

    /// Split requested at a step that already starts its section
    #[error("Step {0} already starts a section")]
    AlreadyBoundary(usize),

    /// Insert position past the end of the section list
    #[error("Cannot insert section at {at}: demo has {len} sections")]
    InsertOutOfRange {
        /// Requested position
        at: usize,
        /// Section count
        len: usize,
    },
}

/// Errors raised by the alignment engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AlignmentError {
    /// The tree or a source is not loaded; derived operations are suppressed
    #[error("{0} is not loaded")]
    NotLoaded(&'static str),

    /// Source loading failed
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// Counts or grouping disagree
    #[error("Mismatch: {0}")]
    Mismatch(#[from] MismatchError),

    /// Addressing failed
    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    /// A corrective edit was refused
    #[error("Structural edit error: {0}")]
    Structural(#[from] StructuralEditError),
}
