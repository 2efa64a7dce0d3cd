use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::file_utils::FileManager;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Config {
    /// Alignment behaviour
    #[serde(default)]
    pub alignment: AlignmentConfig,

    /// Soundbite discovery
    #[serde(default)]
    pub audio: AudioConfig,

    /// File naming conventions
    #[serde(default)]
    pub files: FileConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// How audio slots are derived from a section
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SlotRule {
    /// Once per section when the intro step is narrated and the next is not,
    /// otherwise once per step
    #[default]
    Narration,
    /// Once per step in every non-special section
    PerStep,
    /// Once per section that already carries section audio, otherwise per step
    Existing,
}

impl std::fmt::Display for SlotRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Narration => write!(f, "narration"),
            Self::PerStep => write!(f, "per_step"),
            Self::Existing => write!(f, "existing"),
        }
    }
}

impl std::str::FromStr for SlotRule {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "narration" => Ok(Self::Narration),
            "per_step" => Ok(Self::PerStep),
            "existing" => Ok(Self::Existing),
            _ => Err(anyhow!("Invalid slot rule: {}", s)),
        }
    }
}

/// Alignment engine configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AlignmentConfig {
    /// Also compare section count and per-section grouping with the script
    #[serde(default)]
    pub strict_narration: bool,

    /// Audio slot rule
    #[serde(default)]
    pub slot_rule: SlotRule,

    /// Run corrective sectioning before audio is attached
    #[serde(default)]
    pub corrective_sectioning: bool,

    /// Title suffix for sections created by splitting
    #[serde(default = "default_continuation_suffix")]
    pub continuation_suffix: String,

    /// Production note keywords
    #[serde(default)]
    pub notes: ProductionNoteConfig,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            strict_narration: false,
            slot_rule: SlotRule::default(),
            corrective_sectioning: false,
            continuation_suffix: default_continuation_suffix(),
            notes: ProductionNoteConfig::default(),
        }
    }
}

/// Keywords that, found inside a `[...]` production note, trigger an edit
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ProductionNoteConfig {
    /// Remove the step
    #[serde(default = "default_delete_keywords")]
    pub delete: Vec<String>,

    /// Insert a pacing duplicate after the step
    #[serde(default = "default_duplicate_keywords")]
    pub duplicate: Vec<String>,

    /// Mark the step as animated
    #[serde(default = "default_animate_keywords")]
    pub animate: Vec<String>,

    /// Give the step a section of its own
    #[serde(default = "default_section_keywords")]
    pub section: Vec<String>,
}

impl Default for ProductionNoteConfig {
    fn default() -> Self {
        Self {
            delete: default_delete_keywords(),
            duplicate: default_duplicate_keywords(),
            animate: default_animate_keywords(),
            section: default_section_keywords(),
        }
    }
}

/// Soundbite discovery configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AudioConfig {
    /// Recognised audio file extensions
    #[serde(default = "default_audio_extensions")]
    pub extensions: Vec<String>,

    /// Take-suffix characters that mark an alternate take
    #[serde(default = "default_alternate_markers")]
    pub alternate_markers: String,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            extensions: default_audio_extensions(),
            alternate_markers: default_alternate_markers(),
        }
    }
}

/// File naming conventions around a demo file
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FileConfig {
    /// Extension of demo files
    #[serde(default = "default_demo_extension")]
    pub demo_extension: String,

    /// Extension of the sibling script file
    #[serde(default = "default_script_extension")]
    pub script_extension: String,

    /// Suffix of the sibling soundbite directory
    #[serde(default = "default_audio_dir_suffix")]
    pub audio_dir_suffix: String,

    /// Suffix of the sibling asset directory
    #[serde(default = "default_assets_dir_suffix")]
    pub assets_dir_suffix: String,

    /// Suffix appended when saving a copy
    #[serde(default = "default_copy_suffix")]
    pub copy_suffix: String,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            demo_extension: default_demo_extension(),
            script_extension: default_script_extension(),
            audio_dir_suffix: default_audio_dir_suffix(),
            assets_dir_suffix: default_assets_dir_suffix(),
            copy_suffix: default_copy_suffix(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Matching `log` filter
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_continuation_suffix() -> String {
    " (cont.)".to_string()
}

fn default_delete_keywords() -> Vec<String> {
    vec!["delete".to_string(), "remove step".to_string()]
}

fn default_duplicate_keywords() -> Vec<String> {
    vec!["duplicate".to_string(), "objectives".to_string()]
}

fn default_animate_keywords() -> Vec<String> {
    vec!["animate".to_string(), "pacing".to_string()]
}

fn default_section_keywords() -> Vec<String> {
    vec!["section step".to_string(), "own section".to_string()]
}

fn default_audio_extensions() -> Vec<String> {
    ["wav", "mp3", "m4a", "ogg", "flac"].iter().map(|e| e.to_string()).collect()
}

fn default_alternate_markers() -> String {
    "a".to_string()
}

fn default_demo_extension() -> String {
    "demo".to_string()
}

fn default_script_extension() -> String {
    "script".to_string()
}

fn default_audio_dir_suffix() -> String {
    "_Audio".to_string()
}

fn default_assets_dir_suffix() -> String {
    "_Assets".to_string()
}

fn default_copy_suffix() -> String {
    "_aligned".to_string()
}

impl Config {
    /// Load a configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = FileManager::read_to_string(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Write the configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.audio.extensions.iter().all(|e| e.trim().trim_start_matches('.').is_empty()) {
            return Err(anyhow!("At least one audio extension is required"));
        }

        if self.audio.alternate_markers.is_empty()
            || !self.audio.alternate_markers.chars().all(|c| c.is_ascii_alphabetic())
        {
            return Err(anyhow!(
                "Alternate markers must be ASCII letters, got '{}'",
                self.audio.alternate_markers
            ));
        }

        let files = &self.files;
        for (name, value) in [
            ("demo_extension", &files.demo_extension),
            ("script_extension", &files.script_extension),
            ("audio_dir_suffix", &files.audio_dir_suffix),
            ("assets_dir_suffix", &files.assets_dir_suffix),
            ("copy_suffix", &files.copy_suffix),
        ] {
            if value.trim().is_empty() {
                return Err(anyhow!("File setting '{}' must not be empty", name));
            }
        }

        if files.demo_extension == files.script_extension {
            return Err(anyhow!("Demo and script extensions must differ"));
        }

        Ok(())
    }
}
