// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Loading session configurations from files.

use anyhow::Result;
use ember_core::backend::{ColorFormat, PresentMode};
use ember_core::{ConfigError, SchedulingMode, SessionConfig};
use tempfile::tempdir;

#[test]
fn test_from_file_reads_a_full_configuration() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("full.json");
    std::fs::write(
        &path,
        r#"{
            "title": "Triangle",
            "dimensions": { "width": 640, "height": 480 },
            "clear_color": { "r": 0.0, "g": 0.0, "b": 0.0, "a": 1.0 },
            "present_mode": "immediate",
            "color_format": "rgba8_unorm_srgb",
            "canvas_selector": "canvas#main",
            "scheduling": "blocking"
        }"#,
    )?;

    let config = SessionConfig::from_file(&path)?;

    assert_eq!(config.title, "Triangle");
    assert_eq!(config.dimensions.width, 640);
    assert_eq!(config.present_mode, PresentMode::Immediate);
    assert_eq!(config.color_format, ColorFormat::Rgba8UnormSrgb);
    assert_eq!(config.canvas_selector, "canvas#main");
    assert_eq!(config.scheduling, SchedulingMode::Blocking);
    Ok(())
}

#[test]
fn test_to_json_output_loads_back_unchanged() -> Result<()> {
    let original = SessionConfig {
        title: "Saved".to_string(),
        escalate_uncaptured_errors: true,
        ..Default::default()
    };
    let dir = tempdir()?;
    let path = dir.path().join("saved.json");
    std::fs::write(&path, original.to_json()?)?;

    let loaded = SessionConfig::from_file(&path)?;

    assert_eq!(loaded, original);
    Ok(())
}

#[test]
fn test_missing_file_is_an_io_error() -> Result<()> {
    // Nothing is ever written to a fresh directory.
    let dir = tempdir()?;
    let path = dir.path().join("absent.json");

    assert!(matches!(
        SessionConfig::from_file(&path),
        Err(ConfigError::Io(_))
    ));
    Ok(())
}

#[test]
fn test_invalid_file_is_rejected() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("invalid.json");
    std::fs::write(
        &path,
        serde_json::json!({ "clear_color": { "r": 2.0, "g": 0.0, "b": 0.0, "a": 1.0 } })
            .to_string(),
    )?;

    let result = SessionConfig::from_file(&path);

    assert!(matches!(result, Err(ConfigError::Invalid(_))));
    Ok(())
}
