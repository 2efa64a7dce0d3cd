/*!
 * Narration matching.
 *
 * Validation is a read-only gate comparing the demo's step layout with the
 * script; application zips the step-major sequence against the script
 * entries and overwrites instruction and talking-point text.
 */

use log::{debug, info, warn};

use crate::document::tree::DocumentTree;
use crate::errors::{AlignmentError, MismatchError};
use crate::sources::script::Script;

fn ensure_loaded(tree: &DocumentTree, script: &Script) -> Result<(), AlignmentError> {
    if !tree.is_loaded() {
        return Err(AlignmentError::NotLoaded("Demo"));
    }
    if !script.is_loaded() {
        return Err(AlignmentError::NotLoaded("Script"));
    }
    Ok(())
}

/// Check that `script` can be zipped onto `tree`.
///
/// Unloaded inputs are reported before any counting. Always compares the
/// total step count with the number of entries. In strict mode the section
/// count and then each section's length must also match the script
/// grouping; the first offending section is reported.
pub fn validate_narration(tree: &DocumentTree, script: &Script, strict: bool) -> Result<(), AlignmentError> {
    ensure_loaded(tree, script)?;

    let demo_steps = tree.total_step_count();
    let script_steps = script.len();
    if demo_steps != script_steps {
        let error = MismatchError::StepCount { demo_steps, script_steps };
        warn!("{}", error);
        return Err(error.into());
    }

    if strict {
        let demo_sections = tree.section_count();
        let script_sections = script.num_sections();
        if demo_sections != script_sections {
            let error = MismatchError::SectionCount { demo_sections, script_sections };
            warn!("{}", error);
            return Err(error.into());
        }

        for (section, script_section) in tree.sections().zip(script.sections()) {
            if section.len() != script_section.entries.len() {
                let error = MismatchError::SectionLength {
                    section_index: section.index(),
                    title: section.title.clone(),
                    demo_steps: section.len(),
                    script_steps: script_section.entries.len(),
                };
                warn!("{}", error);
                return Err(error.into());
            }
        }
    }

    info!("Script matches demo ({} steps).", demo_steps);
    Ok(())
}

/// Write every script entry onto its step. Returns the number of steps written.
///
/// The script is validated first (with grouping checks when `strict`): on a
/// mismatch nothing is written.
pub fn apply_narration(tree: &mut DocumentTree, script: &Script, strict: bool) -> Result<usize, AlignmentError> {
    validate_narration(tree, script, strict)?;

    let mut written = 0;
    for (step, entry) in tree.steps_mut().zip(script.entries()) {
        step.set_text(&entry.instruction, &entry.talking_point);
        written += 1;
    }
    debug!("Narration written onto {} steps", written);
    Ok(written)
}
