/*!
 * Collaborators that feed the alignment engine.
 *
 * Each source is a trait with one bundled implementation:
 * - `structure`: the section/step layout of the demo (`JsonStructureSource`)
 * - `script`: the narration script (`JsonScriptSource`)
 * - `audio`: the recorded soundbites (`DirectoryAudioSource`)
 *
 * Loading is a one-shot scoped acquisition: open, parse fully, close.
 */

pub mod structure;
pub mod script;
pub mod audio;

// Re-export main types
pub use structure::{DemoDescriptor, JsonStructureSource, LoadedDemo, StructureSource};
pub use script::{JsonScriptSource, Script, ScriptEntry, ScriptSection, ScriptSource};
pub use audio::{Audio, AudioSource, DirectoryAudioSource, Soundbite};
