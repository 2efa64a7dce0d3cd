/*!
 * # dmate - demo script / narration / audio alignment
 *
 * A Rust library that aligns the three independently authored parts of a
 * guided product demo into one addressable document tree.
 *
 * ## Features
 *
 * - Load a demo's section/step structure, its talking-point script and its
 *   recorded soundbites
 * - Validate the script against the demo (step count, optionally grouping)
 *   and write talking points onto steps
 * - Derive audio slots per step or per section and stream soundbites onto
 *   them, skipping alternate takes
 * - Corrective sectioning driven by talking-point streaks and production notes
 * - Structural edits: merge, insert, split, duplicate and delete
 * - Save back in place, to a new path, or as a suffixed copy with assets
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `document`: The demo tree:
 *   - `document::model`: Steps and sections
 *   - `document::tree`: Addressing, iteration and queries
 *   - `document::edit`: Structural edits
 * - `sources`: Collaborators that load each part of a demo:
 *   - `sources::structure`: Demo structure and serialization
 *   - `sources::script`: Talking-point script
 *   - `sources::audio`: Soundbite discovery
 * - `alignment`: Narration and audio matching, corrective sectioning
 * - `persistence`: Writing a tree back to disk
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod alignment;
pub mod app_config;
pub mod app_controller;
pub mod document;
pub mod errors;
pub mod file_utils;
pub mod persistence;
pub mod sources;

// Re-export main types for easier usage
pub use alignment::{AlignmentEngine, AudioOutcome, SectioningReport, Slot};
pub use app_config::{Config, SlotRule};
pub use document::{ClearTarget, DocumentTree, Section, Step};
pub use errors::{AlignmentError, IndexError, LoadError, MismatchError, StructuralEditError};
pub use persistence::SaveTarget;
pub use sources::{Audio, Script, Soundbite};
