/*!
 * Alignment of narration and audio onto the demo tree.
 *
 * - `narration`: count/grouping validation and zip-assignment of talking points
 * - `audio`: slot derivation and alternate-take aware soundbite streaming
 * - `sectioning`: the corrective sectioning pass driven by talking-point streaks
 * - `engine`: `AlignmentEngine`, the configured entry point to all of the above
 */

pub mod audio;
pub mod engine;
pub mod narration;
pub mod sectioning;

pub use audio::{AudioOutcome, Slot};
pub use engine::AlignmentEngine;
pub use sectioning::{NoteActions, SectioningReport};
