/*!
 * Tests for the full application lifecycle: configuration, folder runs
 */

use std::fs;

use anyhow::Result;

use dmate::app_config::{Config, SlotRule};
use dmate::app_controller::{Controller, StageStatus};

use crate::common::{create_reports_demo, create_temp_dir, init_test_logger};

/// Test that a configuration written to disk drives a controller
#[test]
fn test_controller_fromSavedConfig_shouldUseItsSettings() -> Result<()> {
    let temp_dir = create_temp_dir()?;
    let path = temp_dir.path().join("conf.json");
    let mut config = Config::default();
    config.alignment.slot_rule = SlotRule::PerStep;
    config.save(&path)?;

    let controller = Controller::with_config(Config::from_file(&path)?)?;

    assert_eq!(controller.config().alignment.slot_rule, SlotRule::PerStep);
    Ok(())
}

/// Test folder mode over two demos, one of them without audio
#[test]
fn test_runFolder_twoDemos_shouldSummarizeEach() -> Result<()> {
    init_test_logger();
    let temp_dir = create_temp_dir()?;
    let first = temp_dir.path().join("first");
    let second = temp_dir.path().join("second");
    fs::create_dir(&first)?;
    fs::create_dir(&second)?;
    create_reports_demo(&first)?;
    let partial = create_reports_demo(&second)?;
    fs::remove_dir_all(&partial.audio_dir)?;
    let controller = Controller::with_config(Config::default())?;

    let summaries = controller.run_folder(temp_dir.path(), None)?;

    assert_eq!(summaries.len(), 2);
    assert!(summaries[0].is_complete());
    assert_eq!(summaries[1].narration, StageStatus::Applied);
    assert_eq!(summaries[1].audio, StageStatus::NotLoaded);
    assert!(summaries[1].to_string().contains("audio: not loaded"));
    Ok(())
}

/// Test folder mode without any demo files
#[test]
fn test_runFolder_noDemos_shouldFail() -> Result<()> {
    let temp_dir = create_temp_dir()?;
    let controller = Controller::with_config(Config::default())?;

    assert!(controller.run_folder(temp_dir.path(), None).is_err());
    assert!(controller.run_folder(&temp_dir.path().join("absent"), None).is_err());
    Ok(())
}

/// Test that a nonexistent demo is an error rather than a summary
#[test]
fn test_run_nonexistentDemo_shouldFail() -> Result<()> {
    let temp_dir = create_temp_dir()?;
    let controller = Controller::with_config(Config::default())?;

    assert!(controller.run(&temp_dir.path().join("absent.demo"), None, None, None).is_err());
    Ok(())
}
