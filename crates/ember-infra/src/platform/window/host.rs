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

//! A window host for desktop platforms that owns its event loop and pumps it
//! without blocking, once per present loop iteration.

use anyhow::{bail, Result};
use ember_core::WindowHost;
use std::time::Duration;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    platform::pump_events::{EventLoopExtPumpEvents, PumpStatus},
    window::WindowId,
};

use super::winit::{is_close_event, WinitWindow, WinitWindowBuilder};

#[derive(Default)]
struct PumpState {
    builder: Option<WinitWindowBuilder>,
    window: Option<WinitWindow>,
    build_error: Option<anyhow::Error>,
    close_requested: bool,
}

impl ApplicationHandler for PumpState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let Some(builder) = self.builder.take() else {
            return;
        };
        match builder.build(event_loop) {
            Ok(window) => self.window = Some(window),
            Err(e) => self.build_error = Some(e),
        }
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if is_close_event(&event) {
            log::info!("Window close requested.");
            self.close_requested = true;
        }
    }
}

/// A [`WindowHost`] that pumps a `winit` event loop with a zero timeout.
///
/// Used with [`ember_core::PresentLoop::run_blocking`]: the present loop keeps
/// the thread and FIFO presentation paces it.
pub struct PumpedHost {
    event_loop: EventLoop<()>,
    state: PumpState,
    window: WinitWindow,
}

impl PumpedHost {
    /// Creates the event loop and pumps it until the window exists.
    pub fn new(builder: WinitWindowBuilder) -> Result<Self> {
        let mut event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut state = PumpState {
            builder: Some(builder),
            ..Default::default()
        };

        // Windows can only be created once the loop has been resumed.
        let window = loop {
            if let PumpStatus::Exit(code) =
                event_loop.pump_app_events(Some(Duration::ZERO), &mut state)
            {
                bail!("Event loop exited with code {code} before the window was created");
            }
            if let Some(e) = state.build_error.take() {
                return Err(e.context("Failed to create the window"));
            }
            if let Some(window) = state.window.clone() {
                break window;
            }
        };

        Ok(Self {
            event_loop,
            state,
            window,
        })
    }

    pub fn window(&self) -> &WinitWindow {
        &self.window
    }
}

impl WindowHost for PumpedHost {
    fn poll_events(&mut self) {
        if let PumpStatus::Exit(code) = self
            .event_loop
            .pump_app_events(Some(Duration::ZERO), &mut self.state)
        {
            log::debug!("Event loop exited with code {code}.");
            self.state.close_requested = true;
        }
    }

    fn close_requested(&self) -> bool {
        self.state.close_requested
    }
}
