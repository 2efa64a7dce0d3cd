/*!
 * Narration source: the talking-point script.
 *
 * A script is an ordered list of (instruction, talking point) pairs grouped
 * into sections. Its total length and per-section grouping are what the
 * alignment engine checks against the demo tree.
 */

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, error, info};
use serde::{Deserialize, Serialize};

use crate::errors::LoadError;

/// Reads a narration script.
pub trait ScriptSource {
    /// Parse the script at `path`.
    fn load(&self, path: &Path) -> Result<Script, LoadError>;
}

/// One script row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptEntry {
    /// Click instruction as written in the script
    #[serde(default)]
    pub instruction: String,

    /// Talking point
    #[serde(default)]
    pub talking_point: String,
}

impl ScriptEntry {
    /// Create an entry.
    pub fn new(instruction: impl Into<String>, talking_point: impl Into<String>) -> Self {
        Self {
            instruction: instruction.into(),
            talking_point: talking_point.into(),
        }
    }
}

/// A group of script rows sharing a heading.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptSection {
    /// Section heading
    #[serde(default)]
    pub title: String,

    /// Rows in order
    #[serde(default)]
    pub entries: Vec<ScriptEntry>,
}

/// A loaded narration script. Read-only once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    #[serde(skip)]
    path: Option<PathBuf>,

    sections: Vec<ScriptSection>,

    #[serde(skip, default = "default_true")]
    loaded: bool,
}

fn default_true() -> bool {
    true
}

impl Script {
    /// Build a script from sections.
    pub fn from_sections(sections: Vec<ScriptSection>) -> Self {
        Self { path: None, sections, loaded: true }
    }

    /// Build a single-section script from (instruction, talking point) pairs.
    pub fn from_pairs<I, S1, S2>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S1, S2)>,
        S1: Into<String>,
        S2: Into<String>,
    {
        let entries = pairs
            .into_iter()
            .map(|(instruction, talking_point)| ScriptEntry::new(instruction, talking_point))
            .collect();
        Self::from_sections(vec![ScriptSection { title: String::new(), entries }])
    }

    /// A script standing in for one that failed to load.
    pub fn not_loaded(path: Option<PathBuf>) -> Self {
        Self { path, sections: Vec::new(), loaded: false }
    }

    /// Load a script. Never fails: errors are logged and produce an
    /// unloaded script.
    pub fn open<S: ScriptSource + ?Sized>(source: &S, path: &Path) -> Self {
        match source.load(path) {
            Ok(script) => {
                info!("Imported script with {} sections and {} entries.", script.num_sections(), script.len());
                script
            }
            Err(e) => {
                error!("Script failed to import. {}", e);
                Self::not_loaded(Some(path.to_path_buf()))
            }
        }
    }

    /// Path the script was loaded from.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Whether the script parsed successfully.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Total number of entries.
    pub fn len(&self) -> usize {
        self.sections.iter().map(|s| s.entries.len()).sum()
    }

    /// Whether the script has no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Declared section count.
    pub fn num_sections(&self) -> usize {
        self.sections.len()
    }

    /// Sections in order.
    pub fn sections(&self) -> &[ScriptSection] {
        &self.sections
    }

    /// Entry count of each section.
    pub fn section_lengths(&self) -> Vec<usize> {
        self.sections.iter().map(|s| s.entries.len()).collect()
    }

    /// All entries in document order.
    pub fn entries(&self) -> impl Iterator<Item = &ScriptEntry> + '_ {
        self.sections.iter().flat_map(|s| s.entries.iter())
    }
}

/// JSON implementation of the script source.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonScriptSource;

impl ScriptSource for JsonScriptSource {
    fn load(&self, path: &Path) -> Result<Script, LoadError> {
        if !path.is_file() {
            return Err(LoadError::Missing(path.to_path_buf()));
        }
        let content = fs::read_to_string(path).map_err(|e| LoadError::Unreadable {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let mut script: Script = serde_json::from_str(&content).map_err(|e| LoadError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        if script.is_empty() {
            return Err(LoadError::Empty(path.to_path_buf()));
        }
        debug!("Parsed script with section lengths {:?}", script.section_lengths());
        script.path = Some(path.to_path_buf());
        script.loaded = true;
        Ok(script)
    }
}
