/*!
 * Writing a demo tree back to disk.
 *
 * Serialization itself belongs to the structural source; this module picks
 * the destination and, for suffixed copies, carries the asset directory
 * along.
 */

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use log::{info, warn};

use crate::document::tree::DocumentTree;
use crate::file_utils::FileManager;
use crate::sources::structure::{assets_dir_for, DemoDescriptor, StructureSource};

/// Where to save a tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveTarget {
    /// Overwrite the file the tree was loaded from
    Original,
    /// Write to another path; the tree keeps pointing at its original file
    Path(PathBuf),
    /// Write `<file name><suffix>` next to the original and copy the asset
    /// directory to `<new file name><assets suffix>`
    Suffix(String),
}

/// Serialize `tree` through `source` and write it to `target`.
/// Returns the path written.
///
/// For a suffixed copy the tree is moved to the new file and asset
/// directory only when the assets were copied; if the copy fails a warning
/// is logged and the tree keeps its previous location.
pub fn save<S: StructureSource + ?Sized>(
    tree: &mut DocumentTree,
    source: &S,
    target: &SaveTarget,
    assets_suffix: &str,
) -> Result<PathBuf> {
    if !tree.is_loaded() {
        return Err(anyhow!("Demo is not loaded, refusing to save"));
    }
    let bytes = source
        .serialize(&DemoDescriptor::from_tree(tree))
        .context("Failed to serialize demo")?;

    let original = || {
        tree.path()
            .map(Path::to_path_buf)
            .ok_or_else(|| anyhow!("Demo has no source path"))
    };

    match target {
        SaveTarget::Original => {
            let path = original()?;
            FileManager::write_to_file(&path, &bytes)?;
            info!("Saved demo to {:?}", path);
            Ok(path)
        }
        SaveTarget::Path(path) => {
            FileManager::write_to_file(path, &bytes)?;
            info!("Saved demo copy to {:?}", path);
            Ok(path.clone())
        }
        SaveTarget::Suffix(suffix) => {
            let path = FileManager::appended_path(original()?, suffix);
            FileManager::write_to_file(&path, &bytes)?;
            info!("Saved demo copy to {:?}", path);

            let new_assets = assets_dir_for(&path, assets_suffix);
            let copied = match tree.assets_dir() {
                Some(assets) if FileManager::dir_exists(assets) => {
                    FileManager::copy_dir_recursive(assets, &new_assets)
                }
                _ => FileManager::ensure_dir(&new_assets).map(|_| 0),
            };
            match copied {
                Ok(files) => {
                    info!("Copied {} asset files to {:?}", files, new_assets);
                    tree.set_location(path.clone(), new_assets);
                }
                Err(e) => warn!("Couldn't copy assets to {:?}: {:#}", new_assets, e),
            }
            Ok(path)
        }
    }
}
