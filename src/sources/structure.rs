/*!
 * Structural source: the section/step layout of a demo.
 *
 * A structural source turns a demo file into a `LoadedDemo`, the single
 * immutable load result from which the tree is derived. It also serializes
 * a tree back into the same format for persistence.
 */

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::document::model::{Section, Step};
use crate::document::tree::DocumentTree;
use crate::errors::LoadError;
use crate::sources::audio::Soundbite;

/// Reads and writes the structural demo document.
pub trait StructureSource {
    /// Parse the demo at `path`. Never returns a partial result.
    fn load(&self, path: &Path) -> Result<LoadedDemo, LoadError>;

    /// Serialize a descriptor into this source's format.
    fn serialize(&self, descriptor: &DemoDescriptor) -> Result<Vec<u8>, LoadError>;
}

/// Result of loading a demo file.
#[derive(Debug, Clone)]
pub struct LoadedDemo {
    /// Demo file
    pub path: PathBuf,
    /// `<file name>_Assets` next to the demo file
    pub assets_dir: PathBuf,
    /// Parsed content
    pub descriptor: DemoDescriptor,
}

/// Serialized form of a demo.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DemoDescriptor {
    /// Demo identifier
    #[serde(default)]
    pub id: String,

    /// Demo name
    #[serde(default)]
    pub title: String,

    /// Sections ("chapters") in order
    #[serde(default)]
    pub chapters: Vec<SectionDescriptor>,
}

/// Serialized form of a section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionDescriptor {
    /// Chapter title
    #[serde(default)]
    pub title: String,

    /// Title card / divider without narration
    #[serde(default)]
    pub special: bool,

    /// Section-level soundbite
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<Soundbite>,

    /// Steps in order
    #[serde(default)]
    pub steps: Vec<StepDescriptor>,
}

/// Serialized form of a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDescriptor {
    /// Step identifier; generated when absent
    #[serde(default)]
    pub id: String,

    /// Click instruction placeholder
    #[serde(default)]
    pub instruction: String,

    /// Talking point
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub narration: String,

    /// Asset reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset: Option<String>,

    /// Delay in milliseconds
    #[serde(default)]
    pub delay_ms: u64,

    /// Active flag
    #[serde(default = "default_true")]
    pub active: bool,

    /// Pacing duplicate
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub animated: bool,

    /// Step-level soundbite
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<Soundbite>,
}

fn default_true() -> bool {
    true
}

impl From<StepDescriptor> for Step {
    fn from(descriptor: StepDescriptor) -> Self {
        let id = if descriptor.id.is_empty() {
            Uuid::new_v4().to_string()
        } else {
            descriptor.id
        };
        let mut step = Step::new(id, descriptor.instruction).with_narration(descriptor.narration);
        step.asset = descriptor.asset;
        step.delay_ms = descriptor.delay_ms;
        step.active = descriptor.active;
        step.is_animated = descriptor.animated;
        step.audio = descriptor.audio;
        step
    }
}

impl From<&Step> for StepDescriptor {
    fn from(step: &Step) -> Self {
        Self {
            id: step.id.clone(),
            instruction: step.instruction.clone(),
            narration: step.narration.clone(),
            asset: step.asset.clone(),
            delay_ms: step.delay_ms,
            active: step.active,
            animated: step.is_animated,
            audio: step.audio.clone(),
        }
    }
}

impl DemoDescriptor {
    /// Build the tree described by this descriptor.
    pub fn into_tree(self) -> DocumentTree {
        let sections = self
            .chapters
            .into_iter()
            .map(|chapter| {
                let steps = chapter.steps.into_iter().map(Step::from).collect();
                let mut section = Section::new(chapter.title, steps);
                section.is_special = chapter.special;
                section.audio = chapter.audio;
                section
            })
            .collect();
        DocumentTree::new(self.title, sections).with_id(self.id)
    }

    /// Capture the current state of a tree.
    pub fn from_tree(tree: &DocumentTree) -> Self {
        Self {
            id: tree.id().to_string(),
            title: tree.title().to_string(),
            chapters: tree
                .sections()
                .map(|section| SectionDescriptor {
                    title: section.title.clone(),
                    special: section.is_special,
                    audio: section.audio.clone(),
                    steps: section.steps().iter().map(StepDescriptor::from).collect(),
                })
                .collect(),
        }
    }
}

/// Asset directory paired with a demo file: `<file name>_Assets`.
pub fn assets_dir_for(path: &Path, assets_suffix: &str) -> PathBuf {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();
    path.with_file_name(format!("{}{}", name, assets_suffix))
}

/// JSON implementation of the structural source.
#[derive(Debug, Clone)]
pub struct JsonStructureSource {
    assets_suffix: String,
}

impl JsonStructureSource {
    /// Create a source pairing demos with `<file name><assets_suffix>` directories.
    pub fn new(assets_suffix: impl Into<String>) -> Self {
        Self { assets_suffix: assets_suffix.into() }
    }
}

impl Default for JsonStructureSource {
    fn default() -> Self {
        Self::new("_Assets")
    }
}

impl StructureSource for JsonStructureSource {
    fn load(&self, path: &Path) -> Result<LoadedDemo, LoadError> {
        if !path.is_file() {
            return Err(LoadError::Missing(path.to_path_buf()));
        }
        let content = fs::read_to_string(path).map_err(|e| LoadError::Unreadable {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let descriptor: DemoDescriptor = serde_json::from_str(&content).map_err(|e| LoadError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        debug!("Parsed demo '{}' with {} chapters", descriptor.title, descriptor.chapters.len());

        Ok(LoadedDemo {
            path: path.to_path_buf(),
            assets_dir: assets_dir_for(path, &self.assets_suffix),
            descriptor,
        })
    }

    fn serialize(&self, descriptor: &DemoDescriptor) -> Result<Vec<u8>, LoadError> {
        serde_json::to_vec_pretty(descriptor).map_err(|e| LoadError::Parse {
            path: PathBuf::new(),
            message: e.to_string(),
        })
    }
}
