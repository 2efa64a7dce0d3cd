/*!
 * Common test utilities for the dmate test suite
 */

use anyhow::Result;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Once;
use tempfile::TempDir;

use dmate::document::{DocumentTree, Section, Step};

static LOGGER: Once = Once::new();

/// Routes library logs through env_logger in test mode
pub fn init_test_logger() {
    LOGGER.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Paths of a demo written to disk with its sibling script, audio and assets
pub struct DemoFixture {
    pub demo: PathBuf,
    pub script: PathBuf,
    pub audio_dir: PathBuf,
    pub assets_dir: PathBuf,
}

/// Writes `reports.demo` with a special title section, a two-step login
/// section and a three-step reports section (6 steps), plus a matching
/// script and five soundbites including one alternate take.
pub fn create_reports_demo(dir: &Path) -> Result<DemoFixture> {
    let demo = json!({
        "id": "reports-demo",
        "title": "Quarterly Reports",
        "chapters": [
            { "title": "Title", "special": true, "steps": [ { "id": "t1", "instruction": "Title card" } ] },
            { "title": "Login", "steps": [
                { "id": "s1", "instruction": "Click username", "asset": "img/s1.png" },
                { "id": "s2", "instruction": "Type password", "delay_ms": 250 }
            ] },
            { "title": "Reports", "steps": [
                { "id": "s3", "instruction": "Open reports" },
                { "id": "s4", "instruction": "Click Q3" },
                { "id": "s5", "instruction": "Export" }
            ] }
        ]
    });
    let script = json!({
        "sections": [
            { "title": "Title", "entries": [ { "instruction": "Title card", "talking_point": "" } ] },
            { "title": "Login", "entries": [
                { "instruction": "Click username", "talking_point": "Sign in with your account." },
                { "instruction": "Type password", "talking_point": "" }
            ] },
            { "title": "Reports", "entries": [
                { "instruction": "Open reports", "talking_point": "Quarterly reports live here." },
                { "instruction": "Click Q3", "talking_point": "Pick the quarter." },
                { "instruction": "Export", "talking_point": "Export it for the board." }
            ] }
        ]
    });

    let demo_path = create_test_file(dir, "reports.demo", &serde_json::to_string_pretty(&demo)?)?;
    let script_path = create_test_file(dir, "reports.script", &serde_json::to_string_pretty(&script)?)?;

    let audio_dir = dir.join("reports_Audio");
    fs::create_dir_all(&audio_dir)?;
    for name in ["reports_01.wav", "reports_02a.wav", "reports_02.wav", "reports_03.wav", "reports_04.wav"] {
        fs::write(audio_dir.join(name), b"RIFF")?;
    }

    let assets_dir = dir.join("reports.demo_Assets");
    fs::create_dir_all(assets_dir.join("img"))?;
    fs::write(assets_dir.join("img/s1.png"), b"png")?;

    Ok(DemoFixture {
        demo: demo_path,
        script: script_path,
        audio_dir,
        assets_dir,
    })
}

/// Builds an in-memory tree; each section is (title, narrations), one step per narration
pub fn tree_from_layout(layout: &[(&str, &[&str])]) -> DocumentTree {
    let sections = layout
        .iter()
        .map(|(title, narrations)| {
            let steps = narrations
                .iter()
                .enumerate()
                .map(|(i, narration)| Step::new(format!("{}-{}", title, i), format!("Click {}", i)).with_narration(*narration))
                .collect();
            Section::new(*title, steps)
        })
        .collect();
    DocumentTree::new("Layout", sections)
}
