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

//! Backend-agnostic descriptors and reports exchanged with a [`super::GraphicsBackend`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// An RGBA color used to clear the frame target at the start of the render pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClearColor {
    /// Red channel.
    pub r: f64,
    /// Green channel.
    pub g: f64,
    /// Blue channel.
    pub b: f64,
    /// Alpha channel.
    pub a: f64,
}

impl ClearColor {
    /// The dark gray the triangle is drawn over.
    pub const DARK_GRAY: Self = Self {
        r: 0.1,
        g: 0.1,
        b: 0.1,
        a: 1.0,
    };
}

impl Default for ClearColor {
    fn default() -> Self {
        Self::DARK_GRAY
    }
}

/// Color formats a frame chain may be configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorFormat {
    /// 8-bit BGRA, linear.
    #[default]
    Bgra8Unorm,
    /// 8-bit BGRA, sRGB encoded.
    Bgra8UnormSrgb,
    /// 8-bit RGBA, linear.
    Rgba8Unorm,
    /// 8-bit RGBA, sRGB encoded.
    Rgba8UnormSrgb,
}

/// Presentation modes for the frame chain. `Fifo` is always supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresentMode {
    /// Vertical sync with a queue of frames.
    #[default]
    Fifo,
    /// Like `Fifo`, but late frames are presented immediately.
    FifoRelaxed,
    /// Vertical sync, newest frame replaces the queued one.
    Mailbox,
    /// No synchronization, may tear.
    Immediate,
}

/// Hint for which kind of adapter to prefer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerPreference {
    /// Let the backend decide.
    #[default]
    None,
    /// Prefer an integrated or otherwise power-efficient adapter.
    LowPower,
    /// Prefer a discrete, high-performance adapter.
    HighPerformance,
}

/// Options for the adapter request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AdapterOptions {
    /// Which kind of adapter to prefer.
    pub power_preference: PowerPreference,
    /// Only accept a software (fallback) adapter.
    pub force_fallback_adapter: bool,
}

/// Options for the device request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    /// Debug label of the logical device.
    pub label: String,
    /// Debug label of the device's default queue.
    pub default_queue_label: String,
}

/// How the presentation surface should be configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameChainDescriptor {
    /// Width of the frame targets, in pixels.
    pub width: u32,
    /// Height of the frame targets, in pixels.
    pub height: u32,
    /// Used when the surface supports it, otherwise the first supported format wins.
    pub preferred_format: ColorFormat,
    /// Falls back to [`PresentMode::Fifo`] when unsupported.
    pub present_mode: PresentMode,
}

/// Describes the single render pipeline: one shader module with a vertex and a
/// fragment entry point, a triangle list and one alpha-blended color target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineDescriptor<'a> {
    /// Debug label of the pipeline.
    pub label: &'a str,
    /// Debug label of the shader module.
    pub shader_label: &'a str,
    /// WGSL source of the shader module.
    pub shader_source: &'a str,
    /// Name of the vertex stage entry point.
    pub vertex_entry_point: &'a str,
    /// Name of the fragment stage entry point.
    pub fragment_entry_point: &'a str,
}

impl PipelineDescriptor<'static> {
    /// The pipeline drawing the fixed triangle.
    pub fn triangle() -> Self {
        Self {
            label: "Triangle Pipeline",
            shader_label: "Triangle Shader",
            shader_source: crate::shader::TRIANGLE_WGSL,
            vertex_entry_point: crate::shader::VERTEX_ENTRY_POINT,
            fragment_entry_point: crate::shader::FRAGMENT_ENTRY_POINT,
        }
    }
}

/// Informational properties of the selected adapter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdapterReport {
    /// Human readable adapter name.
    pub name: String,
    /// PCI vendor id.
    pub vendor_id: u32,
    /// PCI device id.
    pub device_id: u32,
    /// Integrated, discrete, virtual, CPU...
    pub device_type: String,
    /// The graphics API the adapter runs on.
    pub backend: String,
    /// Driver name, empty when unknown.
    pub driver: String,
    /// Driver version string.
    pub driver_info: String,
}

impl fmt::Display for AdapterReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "\"{}\" (vendor {:#06x}, device {:#06x}, type {}, backend {}",
            self.name, self.vendor_id, self.device_id, self.device_type, self.backend
        )?;
        if !self.driver.is_empty() {
            write!(f, ", driver {} {}", self.driver, self.driver_info)?;
        }
        write!(f, ")")
    }
}

/// Informational limits of the acquired device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceReport {
    /// `maxTextureDimension1D`.
    pub max_texture_dimension_1d: u32,
    /// `maxTextureDimension2D`.
    pub max_texture_dimension_2d: u32,
    /// `maxTextureDimension3D`.
    pub max_texture_dimension_3d: u32,
    /// `maxBindGroups`.
    pub max_bind_groups: u32,
}

impl fmt::Display for DeviceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "maxTextureDimension1D={}, maxTextureDimension2D={}, maxTextureDimension3D={}, maxBindGroups={}",
            self.max_texture_dimension_1d,
            self.max_texture_dimension_2d,
            self.max_texture_dimension_3d,
            self.max_bind_groups
        )
    }
}
