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

//! # Ember SDK
//!
//! [`run`] opens the window, starts the session on the `wgpu` backend and
//! drives the present loop with the scheduling model chosen in the
//! [`SessionConfig`].

use anyhow::{anyhow, Result};
use ember_core::{PresentLoop, Session, WindowHost};
use ember_infra::{is_close_event, WgpuBackend, WinitWindow, WinitWindowBuilder};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::WindowId;

pub use ember_core::{ExitStatus, SchedulingMode, SessionConfig};

/// Runs a session until its window closes or it fails.
///
/// On the web the cooperative loop is handed to the browser and this returns
/// immediately with [`ExitStatus::Closed`]; the outcome is only logged.
pub fn run(config: SessionConfig) -> Result<ExitStatus> {
    config.validate()?;
    log::info!(
        "Starting \"{}\" ({}x{}, {:?} scheduling)",
        config.title,
        config.dimensions.width,
        config.dimensions.height,
        config.scheduling
    );
    match config.scheduling {
        SchedulingMode::Blocking => run_blocking(config),
        SchedulingMode::Cooperative => run_cooperative(config),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn run_blocking(config: SessionConfig) -> Result<ExitStatus> {
    let mut host = ember_infra::PumpedHost::new(WinitWindowBuilder::from_config(&config))?;
    let handle = host.window().handle();
    let session = Session::start(WgpuBackend::new(), config, &handle);
    let mut present_loop = PresentLoop::new(session);
    Ok(present_loop.run_blocking(&mut host))
}

#[cfg(target_arch = "wasm32")]
fn run_blocking(config: SessionConfig) -> Result<ExitStatus> {
    log::warn!("The browser cannot be blocked, running cooperatively instead.");
    run_cooperative(config)
}

#[cfg(not(target_arch = "wasm32"))]
fn run_cooperative(config: SessionConfig) -> Result<ExitStatus> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);
    let mut app = EmberApp::new(config);
    event_loop.run_app(&mut app)?;
    app.into_status()
}

#[cfg(target_arch = "wasm32")]
fn run_cooperative(config: SessionConfig) -> Result<ExitStatus> {
    use winit::platform::web::EventLoopExtWebSys;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);
    event_loop.spawn_app(EmberApp::new(config));
    Ok(ExitStatus::Closed)
}

/// Close requests observed by the application handler, read by the present loop.
#[derive(Debug, Default)]
struct FlagHost {
    close_requested: bool,
}

impl WindowHost for FlagHost {
    fn poll_events(&mut self) {
        // Events are delivered to `EmberApp` by the event loop itself.
    }

    fn close_requested(&self) -> bool {
        self.close_requested
    }
}

/// The application state managed by the winit event loop: one present loop
/// tick per scheduler turn.
struct EmberApp {
    config: SessionConfig,
    window: Option<WinitWindow>,
    present_loop: Option<PresentLoop<WgpuBackend>>,
    host: FlagHost,
    status: Option<ExitStatus>,
    startup_error: Option<anyhow::Error>,
}

impl EmberApp {
    fn new(config: SessionConfig) -> Self {
        Self {
            config,
            window: None,
            present_loop: None,
            host: FlagHost::default(),
            status: None,
            startup_error: None,
        }
    }

    fn handle_window_event(&mut self, event: &WindowEvent) {
        if is_close_event(event) {
            log::info!("Shutdown requested.");
            self.host.close_requested = true;
        }
    }

    #[cfg_attr(target_arch = "wasm32", allow(dead_code))]
    fn into_status(self) -> Result<ExitStatus> {
        if let Some(e) = self.startup_error {
            return Err(e);
        }
        self.status
            .ok_or_else(|| anyhow!("The event loop stopped before the session finished"))
    }
}

impl ApplicationHandler for EmberApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return; // Avoid re-initializing if the app is resumed multiple times.
        }

        let window = match WinitWindowBuilder::from_config(&self.config).build(event_loop) {
            Ok(window) => window,
            Err(e) => {
                log::error!("Failed to create the window: {e:#}");
                self.startup_error = Some(e);
                event_loop.exit();
                return;
            }
        };

        let session = Session::start(WgpuBackend::new(), self.config.clone(), &window.handle());
        self.present_loop = Some(PresentLoop::new(session));
        self.window = Some(window);
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        if self.window.as_ref().map(WinitWindow::id) != Some(id) {
            return;
        }
        self.handle_window_event(&event);
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(present_loop) = self.present_loop.as_mut() else {
            return;
        };
        if let ember_core::LoopControl::Exit(status) = present_loop.tick(&mut self.host) {
            self.status = Some(status);
            // Release GPU resources before the window goes away.
            self.present_loop = None;
            event_loop.exit();
        }
    }
}
