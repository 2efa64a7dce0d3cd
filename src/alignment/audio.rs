/*!
 * Audio matching.
 *
 * A slot is one place a soundbite attaches: a single step or a whole
 * section. Slots are derived fresh from the tree each time by a pure
 * function of section attributes, so edits can never leave a stale
 * classification behind. Soundbites are then streamed onto the slots in
 * document order, skipping alternate takes.
 */

use std::ops::Range;

use log::{debug, info, warn};

use crate::app_config::SlotRule;
use crate::document::model::{Section, Step};
use crate::document::tree::DocumentTree;
use crate::errors::{AlignmentError, MismatchError};
use crate::sources::audio::{Audio, Soundbite};

/// Where a soundbite attaches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// A step, by flat index
    Step(usize),
    /// A section's own audio, by section index
    Section(usize),
}

/// Result of streaming soundbites onto the tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AudioOutcome {
    /// Slots that received a soundbite
    pub slots_filled: usize,
    /// Soundbites consumed from the source, alternates included
    pub consumed: usize,
    /// Alternate takes passed over
    pub skipped_alternates: usize,
    /// Audio was already attached and nothing was done
    pub already_attached: bool,
}

/// Slots of one section. Special sections take none; animated pacing steps
/// never take a slot.
fn section_slots(section: &Section, rule: SlotRule, out: &mut Vec<Slot>) {
    if section.is_special {
        return;
    }
    let voiced: Vec<&Step> = section.steps().iter().filter(|s| !s.is_animated).collect();
    let per_step = |out: &mut Vec<Slot>| out.extend(voiced.iter().map(|s| Slot::Step(s.global_index())));

    match rule {
        SlotRule::PerStep => per_step(out),
        SlotRule::Existing => {
            if section.audio.is_some() && !voiced.is_empty() {
                out.push(Slot::Section(section.index()));
            } else {
                per_step(out);
            }
        }
        SlotRule::Narration => match voiced.as_slice() {
            [] => {}
            [only] => out.push(Slot::Step(only.global_index())),
            [first, second, ..] if first.has_narration() && !second.has_narration() => {
                out.push(Slot::Section(section.index()));
            }
            _ => per_step(out),
        },
    }
}

/// Every slot of the tree in document order.
pub fn slots(tree: &DocumentTree, rule: SlotRule) -> Vec<Slot> {
    let mut out = Vec::new();
    for section in tree.sections() {
        section_slots(section, rule, &mut out);
    }
    out
}

/// Number of soundbites the tree expects under `rule`.
pub fn expected_audio_slots(tree: &DocumentTree, rule: SlotRule) -> usize {
    slots(tree, rule).len()
}

fn ensure_loaded(tree: &DocumentTree, audio: &Audio) -> Result<(), AlignmentError> {
    if !tree.is_loaded() {
        return Err(AlignmentError::NotLoaded("Demo"));
    }
    if !audio.is_loaded() {
        return Err(AlignmentError::NotLoaded("Audio"));
    }
    Ok(())
}

/// Check the slot count against the primary (non-alternate) takes.
pub fn validate_audio(tree: &DocumentTree, audio: &Audio, rule: SlotRule) -> Result<(), AlignmentError> {
    ensure_loaded(tree, audio)?;

    let expected_slots = expected_audio_slots(tree, rule);
    let primary_takes = audio.primary_count();
    if expected_slots != primary_takes {
        let error = MismatchError::AudioSlots {
            expected_slots,
            primary_takes,
            alternates: audio.alternate_count(),
        };
        warn!("{}", error);
        return Err(error.into());
    }
    info!(
        "Audio matches demo ({} slots, {} alternate takes).",
        expected_slots,
        audio.alternate_count()
    );
    Ok(())
}

/// Attach soundbites to every slot.
pub fn apply_audio(tree: &mut DocumentTree, audio: &Audio, rule: SlotRule) -> Result<AudioOutcome, AlignmentError> {
    apply_audio_range(tree, audio, rule, 0..usize::MAX)
}

/// Attach soundbites to the slots whose position falls inside `range`.
///
/// Slots outside the range still consume their soundbite so the ones inside
/// line up with the same takes a full run would give them. The tree is only
/// marked as having audio when the range covered every slot; while it is
/// marked, further calls do nothing.
pub fn apply_audio_range(
    tree: &mut DocumentTree,
    audio: &Audio,
    rule: SlotRule,
    range: Range<usize>,
) -> Result<AudioOutcome, AlignmentError> {
    ensure_loaded(tree, audio)?;
    if tree.audio_attached() {
        debug!("Audio already attached, skipping");
        return Ok(AudioOutcome { already_attached: true, ..AudioOutcome::default() });
    }
    validate_audio(tree, audio, rule)?;

    let slots = slots(tree, rule);
    let mut planned: Vec<(Slot, &Soundbite)> = Vec::new();
    let mut outcome = AudioOutcome::default();
    let mut next = 0;
    for (position, slot) in slots.iter().enumerate() {
        while audio.get(next).is_some_and(Soundbite::is_alternate) {
            debug!("Skipping alternate take {}", audio.get(next).map(Soundbite::label).unwrap_or_default());
            outcome.skipped_alternates += 1;
            next += 1;
        }
        let soundbite = audio.get(next).ok_or(MismatchError::AudioExhausted { slot: position, consumed: next })?;
        next += 1;
        if range.contains(&position) {
            planned.push((*slot, soundbite));
        }
    }
    outcome.consumed = next;

    for (slot, soundbite) in planned {
        debug!("Attaching soundbite {} to {:?}", soundbite.label(), slot);
        match slot {
            Slot::Step(flat) => tree.flat_get_mut(flat)?.set_audio(soundbite.clone()),
            Slot::Section(index) => tree.section_mut(index)?.set_audio(soundbite.clone()),
        }
        outcome.slots_filled += 1;
    }

    if range.start == 0 && range.end >= slots.len() {
        tree.set_audio_attached(true);
    }
    info!(
        "Attached {} soundbites from {} ({} alternate takes skipped).",
        outcome.slots_filled,
        audio.dir().map_or_else(|| "memory".to_string(), |d| d.display().to_string()),
        outcome.skipped_alternates
    );
    Ok(outcome)
}
