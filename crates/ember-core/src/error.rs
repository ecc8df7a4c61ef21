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

//! Defines the hierarchy of error types for device acquisition and presentation.

use std::fmt;

/// The asynchronous acquisition step a request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AcquireStage {
    /// Selection of a physical adapter compatible with the surface.
    Adapter,
    /// Creation of the logical device from the selected adapter.
    Device,
}

impl fmt::Display for AcquireStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AcquireStage::Adapter => write!(f, "adapter"),
            AcquireStage::Device => write!(f, "device"),
        }
    }
}

/// A failed adapter or device request, carrying the backend's diagnostic message.
///
/// Acquisition failures are fatal: there is no fallback adapter or device policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquireError {
    /// The step that failed.
    pub stage: AcquireStage,
    /// The message supplied by the backend.
    pub message: String,
}

impl AcquireError {
    /// Creates a new acquisition error for the given stage.
    pub fn new(stage: AcquireStage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
        }
    }
}

impl fmt::Display for AcquireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Request for {} failed: {}", self.stage, self.message)
    }
}

impl std::error::Error for AcquireError {}

/// An error raised synchronously by a graphics backend operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The backend context could not be created.
    InstanceCreation(String),
    /// The presentation surface could not be created for the window.
    SurfaceCreation(String),
    /// The surface could not be configured into a presentable frame chain.
    FrameChainCreation(String),
    /// The shader source failed to compile into a backend module.
    ShaderCompilation {
        /// A descriptive label for the shader.
        label: String,
        /// Detailed error messages from the compiler.
        details: String,
    },
    /// The backend failed to build the render pipeline.
    PipelineCreation {
        /// A descriptive label for the pipeline.
        label: String,
        /// Detailed error messages from the backend.
        details: String,
    },
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::InstanceCreation(msg) => {
                write!(f, "Failed to create graphics instance: {msg}")
            }
            BackendError::SurfaceCreation(msg) => {
                write!(f, "Failed to create presentation surface: {msg}")
            }
            BackendError::FrameChainCreation(msg) => {
                write!(f, "Failed to configure frame chain: {msg}")
            }
            BackendError::ShaderCompilation { label, details } => {
                write!(f, "Shader compilation failed for '{label}': {details}")
            }
            BackendError::PipelineCreation { label, details } => {
                write!(f, "Pipeline creation failed for '{label}': {details}")
            }
        }
    }
}

impl std::error::Error for BackendError {}

/// A failure while producing a single frame in the steady phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// A frame was requested before the session reached `Ready`.
    NotReady,
    /// The frame chain did not hand out a target in time. The frame is skipped.
    Timeout,
    /// The frame chain was lost or outdated and has been reconfigured. The frame is skipped.
    Outdated,
    /// The frame target could not be acquired and the chain cannot recover.
    AcquisitionFailed(String),
}

impl FrameError {
    /// Returns `true` if the driver may skip this frame and carry on.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, FrameError::Timeout | FrameError::Outdated)
    }
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::NotReady => write!(f, "The session is not ready to render."),
            FrameError::Timeout => write!(f, "Timed out acquiring the next frame target."),
            FrameError::Outdated => {
                write!(f, "The frame chain was outdated and has been reconfigured.")
            }
            FrameError::AcquisitionFailed(msg) => {
                write!(f, "Failed to acquire the next frame target: {msg}")
            }
        }
    }
}

impl std::error::Error for FrameError {}

/// The reason a session ended up in the `Error` state, or a loop ended in failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// An adapter or device request failed.
    Acquire(AcquireError),
    /// A synchronous backend step failed.
    Backend(BackendError),
    /// A frame could not be produced.
    Frame(FrameError),
    /// The backend reported an uncaptured error and escalation is enabled.
    Uncaptured(String),
    /// A contract between the session and its backend was broken.
    Internal(String),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Acquire(err) => write!(f, "Device acquisition failed: {err}"),
            SessionError::Backend(err) => write!(f, "Graphics backend error: {err}"),
            SessionError::Frame(err) => write!(f, "Presentation failed: {err}"),
            SessionError::Uncaptured(msg) => write!(f, "Uncaptured backend error: {msg}"),
            SessionError::Internal(msg) => {
                write!(f, "An internal or unexpected error occurred: {msg}")
            }
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Acquire(err) => Some(err),
            SessionError::Backend(err) => Some(err),
            SessionError::Frame(err) => Some(err),
            _ => None,
        }
    }
}

impl From<AcquireError> for SessionError {
    fn from(err: AcquireError) -> Self {
        SessionError::Acquire(err)
    }
}

impl From<BackendError> for SessionError {
    fn from(err: BackendError) -> Self {
        SessionError::Backend(err)
    }
}

impl From<FrameError> for SessionError {
    fn from(err: FrameError) -> Self {
        SessionError::Frame(err)
    }
}

/// An error raised while loading or validating a [`crate::SessionConfig`].
#[derive(Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    Io(std::io::Error),
    /// The configuration text is not valid JSON for the schema.
    Parse(serde_json::Error),
    /// The configuration parsed but describes an unusable session.
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "Failed to read configuration: {err}"),
            ConfigError::Parse(err) => write!(f, "Failed to parse configuration: {err}"),
            ConfigError::Invalid(msg) => write!(f, "Invalid configuration: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(err) => Some(err),
            ConfigError::Parse(err) => Some(err),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err)
    }
}
