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

//! Window handles and the host contract of the present loop.

use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use std::sync::Arc;

/// Combines the raw handle traits a backend needs to create a surface,
/// so they can be used together as one trait object.
pub trait WindowHandle: HasWindowHandle + HasDisplayHandle {}

impl<T: HasWindowHandle + HasDisplayHandle> WindowHandle for T {}

/// A shared, thread-safe handle to the window a surface is created for.
pub type EmberWindowHandle = Arc<dyn WindowHandle + Send + Sync>;

/// The windowing side of the present loop.
///
/// The driver calls [`WindowHost::poll_events`] once per iteration, then
/// checks [`WindowHost::close_requested`] before doing any other work.
pub trait WindowHost {
    /// Processes the pending window events without blocking.
    fn poll_events(&mut self);

    /// Returns `true` once the user asked to close the window.
    fn close_requested(&self) -> bool;
}
