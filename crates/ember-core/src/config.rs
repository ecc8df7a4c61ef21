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

//! Session configuration, loadable from JSON.

use crate::backend::{
    AdapterOptions, ClearColor, ColorFormat, DeviceDescriptor, FrameChainDescriptor,
    PowerPreference, PresentMode,
};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How the present loop is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulingMode {
    /// The loop owns the thread and runs until the window closes.
    Blocking,
    /// The host's scheduler calls one loop iteration per turn.
    Cooperative,
}

impl Default for SchedulingMode {
    fn default() -> Self {
        if cfg!(target_arch = "wasm32") {
            SchedulingMode::Cooperative
        } else {
            SchedulingMode::Blocking
        }
    }
}

/// Output size in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Default for Dimensions {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }
}

/// Everything that parameterizes a session: the window, the device request and
/// the frame chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Window title.
    pub title: String,
    /// Fixed output size, also used for the frame chain.
    pub dimensions: Dimensions,
    /// Color the frame target is cleared to.
    pub clear_color: ClearColor,
    /// Requested present mode, `Fifo` when the surface does not support it.
    pub present_mode: PresentMode,
    /// Preferred frame chain format, used if the surface supports it.
    pub color_format: ColorFormat,
    /// Adapter selection hint.
    pub power_preference: PowerPreference,
    /// Request a software adapter.
    pub force_fallback_adapter: bool,
    /// Debug label of the logical device.
    pub device_label: String,
    /// Debug label of the default queue.
    pub queue_label: String,
    /// CSS selector of the canvas to render into (web only).
    pub canvas_selector: String,
    /// How the present loop is driven.
    pub scheduling: SchedulingMode,
    /// End the present loop with a failure on the first uncaptured backend error.
    pub escalate_uncaptured_errors: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            title: "Ember".to_string(),
            dimensions: Dimensions::default(),
            clear_color: ClearColor::default(),
            present_mode: PresentMode::Fifo,
            color_format: ColorFormat::Bgra8Unorm,
            power_preference: PowerPreference::None,
            force_fallback_adapter: false,
            device_label: "Device".to_string(),
            queue_label: "Default queue".to_string(),
            canvas_selector: "#canvas".to_string(),
            scheduling: SchedulingMode::default(),
            escalate_uncaptured_errors: false,
        }
    }
}

impl SessionConfig {
    /// Parses and validates a configuration from a JSON string.
    /// Missing fields take their default value.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        log::debug!("Loading session configuration from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Serializes the configuration as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Rejects configurations no session could be built from.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dimensions.width == 0 || self.dimensions.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "dimensions must be non-zero, got {}x{}",
                self.dimensions.width, self.dimensions.height
            )));
        }
        if self.device_label.trim().is_empty() {
            return Err(ConfigError::Invalid("device_label is empty".to_string()));
        }
        if self.queue_label.trim().is_empty() {
            return Err(ConfigError::Invalid("queue_label is empty".to_string()));
        }
        let channels = [
            self.clear_color.r,
            self.clear_color.g,
            self.clear_color.b,
            self.clear_color.a,
        ];
        if channels.iter().any(|c| !(0.0..=1.0).contains(c)) {
            return Err(ConfigError::Invalid(format!(
                "clear_color channels must be within [0, 1], got {:?}",
                self.clear_color
            )));
        }
        Ok(())
    }

    /// Options for the adapter request.
    pub fn adapter_options(&self) -> AdapterOptions {
        AdapterOptions {
            power_preference: self.power_preference,
            force_fallback_adapter: self.force_fallback_adapter,
        }
    }

    /// Options for the device request.
    pub fn device_descriptor(&self) -> DeviceDescriptor {
        DeviceDescriptor {
            label: self.device_label.clone(),
            default_queue_label: self.queue_label.clone(),
        }
    }

    /// Surface configuration at the configured dimensions.
    pub fn frame_chain_descriptor(&self) -> FrameChainDescriptor {
        FrameChainDescriptor {
            width: self.dimensions.width,
            height: self.dimensions.height,
            preferred_format: self.color_format,
            present_mode: self.present_mode,
        }
    }
}
