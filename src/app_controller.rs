use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::alignment::{AlignmentEngine, AudioOutcome, SectioningReport};
use crate::app_config::Config;
use crate::document::tree::DocumentTree;
use crate::errors::AlignmentError;
use crate::file_utils::FileManager;
use crate::persistence::{self, SaveTarget};
use crate::sources::audio::{Audio, DirectoryAudioSource};
use crate::sources::script::{JsonScriptSource, Script};
use crate::sources::structure::JsonStructureSource;

// @module: Application controller for demo alignment sessions

/// How one stage of a session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageStatus {
    /// The stage ran and changed the tree
    Applied,
    /// The stage was not requested
    Skipped,
    /// Its source (or the demo) could not be loaded
    NotLoaded,
    /// Counts or grouping disagreed; nothing was applied
    Mismatch(String),
    /// Any other failure
    Failed(String),
}

impl StageStatus {
    fn from_error(error: AlignmentError) -> Self {
        match error {
            AlignmentError::NotLoaded(_) | AlignmentError::Load(_) => Self::NotLoaded,
            AlignmentError::Mismatch(e) => Self::Mismatch(e.to_string()),
            other => Self::Failed(other.to_string()),
        }
    }
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Applied => write!(f, "applied"),
            Self::Skipped => write!(f, "skipped"),
            Self::NotLoaded => write!(f, "not loaded"),
            Self::Mismatch(message) => write!(f, "mismatch ({})", message),
            Self::Failed(message) => write!(f, "failed ({})", message),
        }
    }
}

/// Outcome of aligning one demo
#[derive(Debug, Clone)]
pub struct AlignmentSummary {
    pub demo: PathBuf,
    pub loaded: bool,
    pub sections: usize,
    pub steps: usize,
    pub narration: StageStatus,
    pub narrated_steps: usize,
    pub sectioning: StageStatus,
    pub sectioning_report: Option<SectioningReport>,
    pub audio: StageStatus,
    pub audio_outcome: Option<AudioOutcome>,
    pub saved_to: Option<PathBuf>,
    pub duration: Duration,
}

impl AlignmentSummary {
    fn new(demo: &Path) -> Self {
        Self {
            demo: demo.to_path_buf(),
            loaded: false,
            sections: 0,
            steps: 0,
            narration: StageStatus::NotLoaded,
            narrated_steps: 0,
            sectioning: StageStatus::Skipped,
            sectioning_report: None,
            audio: StageStatus::NotLoaded,
            audio_outcome: None,
            saved_to: None,
            duration: Duration::ZERO,
        }
    }

    /// Whether narration and audio were both applied
    pub fn is_complete(&self) -> bool {
        self.narration == StageStatus::Applied && self.audio == StageStatus::Applied
    }
}

impl fmt::Display for AlignmentSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Demo: {}", self.demo.display())?;
        if !self.loaded {
            return writeln!(f, "  not loaded");
        }
        writeln!(f, "  {} sections, {} steps", self.sections, self.steps)?;
        writeln!(f, "  narration: {} ({} steps)", self.narration, self.narrated_steps)?;
        if let Some(report) = &self.sectioning_report {
            writeln!(
                f,
                "  sectioning: {} ({} streaks, {} splits, {} merges)",
                self.sectioning, report.streaks, report.splits, report.merges
            )?;
        }
        match &self.audio_outcome {
            Some(outcome) => writeln!(
                f,
                "  audio: {} ({} slots, {} alternates skipped)",
                self.audio, outcome.slots_filled, outcome.skipped_alternates
            )?,
            None => writeln!(f, "  audio: {}", self.audio)?,
        }
        if let Some(path) = &self.saved_to {
            writeln!(f, "  saved to {}", path.display())?;
        }
        writeln!(f, "  took {}", Controller::format_duration(self.duration))
    }
}

/// Main application controller for demo alignment
pub struct Controller {
    // @field: App configuration
    config: Config,
    engine: AlignmentEngine,
    structure: JsonStructureSource,
    audio_source: DirectoryAudioSource,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Invalid configuration")?;
        let engine = AlignmentEngine::new(config.alignment.clone());
        let structure = JsonStructureSource::new(config.files.assets_dir_suffix.clone());
        let audio_source = DirectoryAudioSource::new(
            config.audio.extensions.clone(),
            config.audio.alternate_markers.clone(),
        );
        Ok(Self { config, engine, structure, audio_source })
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Load a demo tree; a load failure yields an unloaded tree
    pub fn load_demo(&self, demo: &Path) -> DocumentTree {
        DocumentTree::open(&self.structure, demo)
    }

    /// Align one demo: narration, optional corrective sectioning, audio, optional save.
    ///
    /// The script defaults to the sibling `<stem>.<script extension>` and the
    /// audio directory to `<stem><audio dir suffix>`. Load and mismatch
    /// failures only downgrade their stage.
    pub fn run(
        &self,
        demo: &Path,
        script: Option<&Path>,
        audio: Option<&Path>,
        save: Option<&SaveTarget>,
    ) -> Result<AlignmentSummary> {
        let start_time = Instant::now();

        if !FileManager::file_exists(demo) {
            return Err(anyhow!("Demo file does not exist: {:?}", demo));
        }

        let mut summary = AlignmentSummary::new(demo);
        let mut tree = self.load_demo(demo);
        summary.loaded = tree.is_loaded();
        if !tree.is_loaded() {
            summary.duration = start_time.elapsed();
            return Ok(summary);
        }

        let files = &self.config.files;
        let script_path = script
            .map(Path::to_path_buf)
            .unwrap_or_else(|| FileManager::sibling_with_extension(demo, &files.script_extension));
        let script = Script::open(&JsonScriptSource, &script_path);
        match self.engine.apply_narration(&mut tree, &script) {
            Ok(written) => {
                summary.narration = StageStatus::Applied;
                summary.narrated_steps = written;
            }
            Err(e) => summary.narration = StageStatus::from_error(e),
        }

        if self.config.alignment.corrective_sectioning {
            match self.engine.correct_sections(&mut tree) {
                Ok(report) => {
                    summary.sectioning = StageStatus::Applied;
                    summary.sectioning_report = Some(report);
                }
                Err(e) => {
                    error!("Sectioning failed: {}", e);
                    summary.sectioning = StageStatus::from_error(e);
                }
            }
        }

        let audio_dir = audio
            .map(Path::to_path_buf)
            .unwrap_or_else(|| FileManager::sibling_dir(demo, &files.audio_dir_suffix));
        let audio = Audio::open(&self.audio_source, &audio_dir);
        match self.engine.apply_audio(&mut tree, &audio) {
            Ok(outcome) => {
                summary.audio = StageStatus::Applied;
                summary.audio_outcome = Some(outcome);
            }
            Err(e) => summary.audio = StageStatus::from_error(e),
        }

        summary.sections = tree.section_count();
        summary.steps = tree.total_step_count();

        if let Some(target) = save {
            let path = persistence::save(&mut tree, &self.structure, target, &files.assets_dir_suffix)
                .with_context(|| format!("Failed to save demo {:?}", demo))?;
            summary.saved_to = Some(path);
        }

        summary.duration = start_time.elapsed();
        info!(
            "Finished {:?} in {}: narration {}, audio {}",
            demo,
            Self::format_duration(summary.duration),
            summary.narration,
            summary.audio
        );
        Ok(summary)
    }

    /// Run the workflow in folder mode, aligning every demo file below a directory
    pub fn run_folder(&self, input_dir: &Path, save: Option<&SaveTarget>) -> Result<Vec<AlignmentSummary>> {
        let start_time = Instant::now();

        if !input_dir.is_dir() {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let demos = FileManager::find_files(input_dir, &self.config.files.demo_extension)?;
        if demos.is_empty() {
            return Err(anyhow!("No demo files found in directory: {:?}", input_dir));
        }

        let folder_pb = ProgressBar::new(demos.len() as u64);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} demos ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        folder_pb.set_style(template_result.progress_chars("=>-"));

        let mut summaries = Vec::with_capacity(demos.len());
        let mut error_count = 0;
        for demo in &demos {
            let file_name = demo
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            folder_pb.set_message(format!("Aligning: {}", file_name));

            match self.run(demo, None, None, save) {
                Ok(summary) => {
                    if !summary.is_complete() {
                        warn!("{} was only partially aligned", file_name);
                    }
                    summaries.push(summary);
                }
                Err(e) => {
                    error!("Error processing file {}: {:#}", file_name, e);
                    error_count += 1;
                }
            }
            folder_pb.inc(1);
        }
        folder_pb.finish_with_message("Folder processing complete");

        let complete = summaries.iter().filter(|s| s.is_complete()).count();
        info!(
            "Folder processing completed in {}: {} fully aligned, {} partial, {} errors",
            Self::format_duration(start_time.elapsed()),
            complete,
            summaries.len() - complete,
            error_count
        );
        Ok(summaries)
    }

    // Format duration in a human-readable format
    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let minutes = total_seconds / 60;
        let seconds = total_seconds % 60;

        if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
