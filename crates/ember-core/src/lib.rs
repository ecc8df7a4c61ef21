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

//! # Ember Core
//!
//! The device acquisition state machine and the present loop that drives it,
//! together with the contracts an opaque graphics backend and a windowing host
//! must fulfil.
//!
//! - [`session`]: the [`Session`] record and its poll-driven `advance` step.
//! - [`driver`]: the two-phase [`PresentLoop`].
//! - [`backend`]: the [`GraphicsBackend`] and [`FrameRecorder`] traits.
//! - [`diagnostics`]: the observer channel backends report into.

#![warn(missing_docs)]

pub mod backend;
pub mod config;
pub mod diagnostics;
pub mod driver;
pub mod error;
pub mod platform;
pub mod session;
pub mod shader;

pub use backend::{FrameRecorder, GraphicsBackend};
pub use config::{SchedulingMode, SessionConfig};
pub use driver::{ExitStatus, LoopControl, PresentLoop};
pub use error::{AcquireError, AcquireStage, BackendError, ConfigError, FrameError, SessionError};
pub use platform::window::{EmberWindowHandle, WindowHost};
pub use session::{Completion, InitState, Session};
