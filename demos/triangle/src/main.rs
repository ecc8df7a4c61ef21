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

//! Presents a red triangle on a dark gray background until the window closes.
//!
//! An optional JSON session configuration is read from the first argument or
//! from the `EMBER_CONFIG` environment variable. The process exits with 0 when
//! the window is closed and 1 when the device could not be brought up.

use anyhow::{Context, Result};
use ember_sdk::{ExitStatus, SessionConfig};

/// Environment variable naming a JSON configuration file.
const CONFIG_ENV: &str = "EMBER_CONFIG";

fn load_config(path: Option<String>) -> Result<SessionConfig> {
    match path {
        Some(path) => SessionConfig::from_file(&path)
            .with_context(|| format!("Failed to load configuration from '{path}'")),
        None => Ok(SessionConfig::default()),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    use env_logger::{Builder, Env};
    use std::process::ExitCode;

    Builder::from_env(Env::default().default_filter_or("info"))
        .filter_module("wgpu_hal", log::LevelFilter::Error)
        .filter_module("wgpu_core", log::LevelFilter::Warn)
        .init();

    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var(CONFIG_ENV).ok());

    let status = load_config(path).and_then(ember_sdk::run);
    match status {
        Ok(ExitStatus::Closed) => {
            log::info!("Window closed, exiting.");
            ExitCode::SUCCESS
        }
        Ok(status) => ExitCode::from(status.code()),
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    console_error_panic_hook::set_once();
    // Without a logger there is nowhere to report anything else either.
    let _ = console_log::init_with_level(log::Level::Info);

    match load_config(None).and_then(ember_sdk::run) {
        Ok(ExitStatus::Failed(e)) => log::error!("{e}"),
        Ok(ExitStatus::Closed) => {}
        Err(e) => log::error!("{e:#}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_path_means_default_config() {
        let config = load_config(None).unwrap();
        assert_eq!(config, SessionConfig::default());
    }

    #[test]
    fn missing_file_error_names_the_path() {
        let err = load_config(Some("does/not/exist.json".to_string())).unwrap_err();
        assert!(format!("{err:#}").contains("does/not/exist.json"));
    }
}
