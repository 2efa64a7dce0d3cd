/*!
 * The alignment engine.
 *
 * `AlignmentEngine` carries the alignment configuration and exposes the
 * validate/apply operations for narration and audio plus the corrective
 * sectioning pass. Validation is read-only; every `apply_*` validates
 * before it mutates.
 */

use std::ops::Range;

use crate::app_config::{AlignmentConfig, SlotRule};
use crate::document::tree::DocumentTree;
use crate::errors::AlignmentError;
use crate::sources::audio::Audio;
use crate::sources::script::Script;

use super::audio::{self as audio_matching, AudioOutcome, Slot};
use super::narration;
use super::sectioning::{self, SectioningReport};

/// Aligns narration and audio onto a demo tree
#[derive(Debug, Clone, Default)]
pub struct AlignmentEngine {
    config: AlignmentConfig,
}

impl AlignmentEngine {
    /// Create an engine with the given configuration
    pub fn new(config: AlignmentConfig) -> Self {
        Self { config }
    }

    /// Get the configuration
    pub fn config(&self) -> &AlignmentConfig {
        &self.config
    }

    /// Configured audio slot rule
    pub fn slot_rule(&self) -> SlotRule {
        self.config.slot_rule
    }

    /// Check the script against the tree, strictly if configured.
    pub fn validate_narration(&self, tree: &DocumentTree, script: &Script) -> Result<(), AlignmentError> {
        narration::validate_narration(tree, script, self.config.strict_narration)
    }

    /// Validate (strictly if configured) and write the script onto the tree.
    pub fn apply_narration(&self, tree: &mut DocumentTree, script: &Script) -> Result<usize, AlignmentError> {
        narration::apply_narration(tree, script, self.config.strict_narration)
    }

    /// Slots under the configured rule
    pub fn slots(&self, tree: &DocumentTree) -> Vec<Slot> {
        audio_matching::slots(tree, self.config.slot_rule)
    }

    /// Number of soundbites the tree expects
    pub fn expected_audio_slots(&self, tree: &DocumentTree) -> usize {
        audio_matching::expected_audio_slots(tree, self.config.slot_rule)
    }

    /// Check the soundbites against the expected slots.
    pub fn validate_audio(&self, tree: &DocumentTree, audio: &Audio) -> Result<(), AlignmentError> {
        audio_matching::validate_audio(tree, audio, self.config.slot_rule)
    }

    /// Attach soundbites to every slot.
    pub fn apply_audio(&self, tree: &mut DocumentTree, audio: &Audio) -> Result<AudioOutcome, AlignmentError> {
        audio_matching::apply_audio(tree, audio, self.config.slot_rule)
    }

    /// Attach soundbites to the slots at positions inside `range`.
    pub fn apply_audio_range(
        &self,
        tree: &mut DocumentTree,
        audio: &Audio,
        range: Range<usize>,
    ) -> Result<AudioOutcome, AlignmentError> {
        audio_matching::apply_audio_range(tree, audio, self.config.slot_rule, range)
    }

    /// Run corrective sectioning.
    pub fn correct_sections(&self, tree: &mut DocumentTree) -> Result<SectioningReport, AlignmentError> {
        sectioning::correct_sections(tree, &self.config.notes, &self.config.continuation_suffix)
    }
}
