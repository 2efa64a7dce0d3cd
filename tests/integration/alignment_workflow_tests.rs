/*!
 * End-to-end tests for aligning a demo on disk
 */

use std::fs;

use anyhow::Result;

use dmate::app_config::Config;
use dmate::app_controller::{Controller, StageStatus};
use dmate::persistence::SaveTarget;

use crate::common::{create_reports_demo, create_temp_dir, create_test_file, init_test_logger};

/// Narration and audio are applied to the fixture and survive a suffixed save
#[test]
fn test_run_reportsDemo_shouldAlignAndSaveCopy() -> Result<()> {
    init_test_logger();
    let temp_dir = create_temp_dir()?;
    let fixture = create_reports_demo(temp_dir.path())?;
    let controller = Controller::with_config(Config::default())?;

    let summary = controller.run(
        &fixture.demo,
        None,
        None,
        Some(&SaveTarget::Suffix("_aligned".to_string())),
    )?;

    assert!(summary.loaded);
    assert!(summary.is_complete());
    assert_eq!(summary.narrated_steps, 6);
    assert_eq!(summary.sectioning, StageStatus::Skipped);
    let outcome = summary.audio_outcome.clone().expect("audio outcome");
    assert_eq!(outcome.slots_filled, 4);
    assert_eq!(outcome.consumed, 5);
    assert_eq!(outcome.skipped_alternates, 1);

    let saved = summary.saved_to.clone().expect("saved path");
    assert_eq!(saved, temp_dir.path().join("reports.demo_aligned"));
    assert!(temp_dir.path().join("reports.demo_aligned_Assets/img/s1.png").is_file());

    let reloaded = controller.load_demo(&saved);
    assert!(reloaded.is_loaded());
    assert_eq!(reloaded.flat_get(1)?.narration, "Sign in with your account.");
    assert_eq!(reloaded.section(1)?.audio.as_ref().map(|s| s.label()).as_deref(), Some("01"));
    assert_eq!(reloaded.flat_get(3)?.audio.as_ref().map(|s| s.label()).as_deref(), Some("02"));
    assert!(reloaded.flat_get(0)?.audio.is_none());
    Ok(())
}

/// Without a script the audio stage sees unnarrated steps and reports the mismatch
#[test]
fn test_run_missingScript_shouldDowngradeStages() -> Result<()> {
    init_test_logger();
    let temp_dir = create_temp_dir()?;
    let fixture = create_reports_demo(temp_dir.path())?;
    fs::remove_file(&fixture.script)?;
    let controller = Controller::with_config(Config::default())?;

    let summary = controller.run(&fixture.demo, None, None, None)?;

    assert!(summary.loaded);
    assert_eq!(summary.narration, StageStatus::NotLoaded);
    assert!(matches!(&summary.audio, StageStatus::Mismatch(m) if m.contains("5 slots vs 4")));
    assert!(summary.saved_to.is_none());
    Ok(())
}

/// Explicit script and audio paths override the sibling defaults
#[test]
fn test_run_explicitSources_shouldBeUsed() -> Result<()> {
    init_test_logger();
    let temp_dir = create_temp_dir()?;
    let fixture = create_reports_demo(temp_dir.path())?;
    let moved_script = temp_dir.path().join("elsewhere.script");
    let moved_audio = temp_dir.path().join("takes");
    fs::rename(&fixture.script, &moved_script)?;
    fs::rename(&fixture.audio_dir, &moved_audio)?;
    let controller = Controller::with_config(Config::default())?;

    let summary = controller.run(&fixture.demo, Some(&moved_script), Some(&moved_audio), None)?;

    assert!(summary.is_complete());
    Ok(())
}

/// Strict narration rejects a script whose grouping differs from the demo
#[test]
fn test_run_strictNarrationWithRegroupedScript_shouldMismatch() -> Result<()> {
    init_test_logger();
    let temp_dir = create_temp_dir()?;
    let fixture = create_reports_demo(temp_dir.path())?;
    let script = create_test_file(
        temp_dir.path(),
        "flat.script",
        r#"{ "sections": [ { "title": "All", "entries": [
            { "instruction": "a" }, { "instruction": "b" }, { "instruction": "c" },
            { "instruction": "d" }, { "instruction": "e" }, { "instruction": "f" }
        ] } ] }"#,
    )?;
    let mut config = Config::default();
    config.alignment.strict_narration = true;
    let controller = Controller::with_config(config)?;

    let summary = controller.run(&fixture.demo, Some(&script), None, None)?;

    assert!(matches!(&summary.narration, StageStatus::Mismatch(m) if m.contains("3 sections vs 1")));
    Ok(())
}

/// Corrective sectioning runs between narration and audio when enabled
#[test]
fn test_run_withSectioning_shouldReportPass() -> Result<()> {
    init_test_logger();
    let temp_dir = create_temp_dir()?;
    let fixture = create_reports_demo(temp_dir.path())?;
    let mut config = Config::default();
    config.alignment.corrective_sectioning = true;
    let controller = Controller::with_config(config)?;

    let summary = controller.run(&fixture.demo, None, None, None)?;

    assert_eq!(summary.sectioning, StageStatus::Applied);
    let report = summary.sectioning_report.clone().expect("sectioning report");
    assert!(report.is_unchanged());
    assert_eq!(report.streaks, 2);
    assert!(summary.is_complete());
    Ok(())
}

/// A demo that fails to parse is reported as not loaded
#[test]
fn test_run_corruptDemo_shouldReportNotLoaded() -> Result<()> {
    init_test_logger();
    let temp_dir = create_temp_dir()?;
    let demo = create_test_file(temp_dir.path(), "broken.demo", "not json")?;
    let controller = Controller::with_config(Config::default())?;

    let summary = controller.run(&demo, None, None, Some(&SaveTarget::Original))?;

    assert!(!summary.loaded);
    assert!(summary.saved_to.is_none());
    assert_eq!(fs::read_to_string(&demo)?, "not json");
    Ok(())
}
