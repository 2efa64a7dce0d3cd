/*!
 * Audio source: recorded soundbites for a demo.
 *
 * Soundbite files are named `<anything>_<ordinal><take>.<ext>`, e.g.
 * `reports_02.wav` or `reports_02a.wav`. The ordinal orders them; a take
 * suffix containing an alternate marker flags an alternate recording that
 * the engine skips rather than assigns.
 */

use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::errors::LoadError;

static ORDINAL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+)([A-Za-z]*)$").expect("Invalid soundbite ordinal regex")
});

/// Reads the soundbites of a demo.
pub trait AudioSource {
    /// Discover and order the soundbites in `dir`.
    fn load(&self, dir: &Path) -> Result<Vec<Soundbite>, LoadError>;
}

/// One recorded clip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Soundbite {
    /// File on disk
    pub path: PathBuf,

    /// Ordinal parsed from the file name
    pub ordinal: u32,

    /// Take suffix following the ordinal, e.g. `a`
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub take: String,

    /// Ordinal and take exactly as they appear in the file name
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub raw_label: String,

    /// Whether this is an alternate take
    #[serde(default)]
    pub alternate: bool,
}

impl Soundbite {
    /// Parse a soundbite from a file path. Returns `None` when the file name
    /// carries no ordinal.
    pub fn from_path(path: &Path, alternate_markers: &str) -> Option<Self> {
        let stem = path.file_stem()?.to_string_lossy();
        let label = stem.rsplit('_').next().unwrap_or(&*stem);
        let mut soundbite = Self::from_label(label, alternate_markers)?;
        soundbite.path = path.to_path_buf();
        Some(soundbite)
    }

    /// Parse an ordinal label such as `02` or `02a`.
    pub fn from_label(label: &str, alternate_markers: &str) -> Option<Self> {
        let caps = ORDINAL_REGEX.captures(label)?;
        let ordinal = caps.get(1)?.as_str().parse().ok()?;
        let take = caps.get(2).map(|m| m.as_str().to_string()).unwrap_or_default();
        let alternate = take
            .chars()
            .any(|c| alternate_markers.contains(c.to_ascii_lowercase()));
        Some(Self {
            path: PathBuf::from(label),
            ordinal,
            take,
            raw_label: label.to_string(),
            alternate,
        })
    }

    /// Whether this is an alternate take.
    pub fn is_alternate(&self) -> bool {
        self.alternate
    }

    /// Ordinal and take as written in the file name, e.g. `02a` or `002`.
    ///
    /// Soundbites deserialized without a recorded label fall back to the
    /// ordinal zero-padded to two digits.
    pub fn label(&self) -> String {
        if self.raw_label.is_empty() {
            format!("{:02}{}", self.ordinal, self.take)
        } else {
            self.raw_label.clone()
        }
    }
}

/// The ordered soundbites of a demo. Read-only once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Audio {
    dir: Option<PathBuf>,
    soundbites: Vec<Soundbite>,
    loaded: bool,
}

impl Audio {
    /// Wrap an already ordered list of soundbites.
    pub fn from_soundbites(soundbites: Vec<Soundbite>) -> Self {
        Self { dir: None, soundbites, loaded: true }
    }

    /// An audio set standing in for one that failed to load.
    pub fn not_loaded(dir: Option<PathBuf>) -> Self {
        Self { dir, soundbites: Vec::new(), loaded: false }
    }

    /// Load audio. Never fails: errors are logged and produce an unloaded set.
    pub fn open<S: AudioSource + ?Sized>(source: &S, dir: &Path) -> Self {
        match source.load(dir) {
            Ok(soundbites) => {
                let audio = Self {
                    dir: Some(dir.to_path_buf()),
                    soundbites,
                    loaded: true,
                };
                info!(
                    "Imported {} soundbites ({} alternate takes).",
                    audio.len(),
                    audio.alternate_count()
                );
                audio
            }
            Err(e) => {
                error!("Audio failed to import. {}", e);
                Self::not_loaded(Some(dir.to_path_buf()))
            }
        }
    }

    /// Directory the soundbites were read from.
    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Whether the directory was read successfully.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Number of soundbites, alternates included.
    pub fn len(&self) -> usize {
        self.soundbites.len()
    }

    /// Whether there are no soundbites.
    pub fn is_empty(&self) -> bool {
        self.soundbites.is_empty()
    }

    /// Soundbite at a position.
    pub fn get(&self, index: usize) -> Option<&Soundbite> {
        self.soundbites.get(index)
    }

    /// Soundbites in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Soundbite> {
        self.soundbites.iter()
    }

    /// Number of alternate takes.
    pub fn alternate_count(&self) -> usize {
        self.iter().filter(|s| s.is_alternate()).count()
    }

    /// Number of soundbites that are not alternate takes.
    pub fn primary_count(&self) -> usize {
        self.len() - self.alternate_count()
    }
}

/// Scans a directory for soundbite files.
#[derive(Debug, Clone)]
pub struct DirectoryAudioSource {
    extensions: Vec<String>,
    alternate_markers: String,
}

impl DirectoryAudioSource {
    /// Create a scanner for the given extensions and alternate markers.
    pub fn new(extensions: Vec<String>, alternate_markers: impl Into<String>) -> Self {
        Self {
            extensions: extensions.into_iter().map(|e| e.trim_start_matches('.').to_lowercase()).collect(),
            alternate_markers: alternate_markers.into().to_lowercase(),
        }
    }

    fn has_audio_extension(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .is_some_and(|ext| self.extensions.iter().any(|e| *e == ext))
    }
}

impl AudioSource for DirectoryAudioSource {
    fn load(&self, dir: &Path) -> Result<Vec<Soundbite>, LoadError> {
        if !dir.is_dir() {
            return Err(LoadError::Missing(dir.to_path_buf()));
        }

        let mut soundbites = Vec::new();
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| LoadError::Unreadable {
                path: dir.to_path_buf(),
                message: e.to_string(),
            })?;
            let path = entry.path();
            if !path.is_file() || !self.has_audio_extension(path) {
                continue;
            }
            match Soundbite::from_path(path, &self.alternate_markers) {
                Some(soundbite) => soundbites.push(soundbite),
                None => warn!("Skipping audio file without an ordinal: {:?}", path),
            }
        }

        if soundbites.is_empty() {
            return Err(LoadError::Empty(dir.to_path_buf()));
        }

        // Alternates sort ahead of the primary take sharing their ordinal.
        soundbites.sort_by(|a, b| {
            a.ordinal
                .cmp(&b.ordinal)
                .then_with(|| b.alternate.cmp(&a.alternate))
                .then_with(|| a.take.cmp(&b.take))
        });
        debug!(
            "Soundbite order: {:?}",
            soundbites.iter().map(Soundbite::label).collect::<Vec<_>>()
        );
        Ok(soundbites)
    }
}
