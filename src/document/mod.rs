/*!
 * Hierarchical demo document model.
 *
 * - `model`: steps and sections
 * - `tree`: the owning tree with flat/nested addressing and iteration
 * - `edit`: structural edits that keep the prefix-sum indices consistent
 */

pub mod model;
pub mod tree;
pub mod edit;

// Re-export types used by other modules
pub use model::{Section, Step};
pub use tree::{ClearTarget, DocumentTree};
