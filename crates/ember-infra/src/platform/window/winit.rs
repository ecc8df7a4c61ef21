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

//! A `winit`-backed window providing the handle surfaces are created from.

use anyhow::Result;
use ember_core::{EmberWindowHandle, SessionConfig};
use raw_window_handle::{
    DisplayHandle, HandleError, HasDisplayHandle, HasWindowHandle, WindowHandle,
};
use std::sync::Arc;
use winit::{
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::ActiveEventLoop,
    window::{Window, WindowId},
};

/// A wrapper around a `winit::window::Window`.
///
/// It uses an `Arc` internally to allow for cheap cloning and shared ownership
/// with the surface created from it.
#[derive(Debug, Clone)]
pub struct WinitWindow {
    inner: Arc<Window>,
}

/// A builder for creating `WinitWindow` instances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WinitWindowBuilder {
    title: String,
    width: u32,
    height: u32,
    canvas_selector: String,
}

impl WinitWindowBuilder {
    /// Creates a new `WinitWindowBuilder` with default settings.
    pub fn new() -> Self {
        Self::from_config(&SessionConfig::default())
    }

    /// Takes the title, size and canvas selector from a session configuration.
    pub fn from_config(config: &SessionConfig) -> Self {
        Self {
            title: config.title.clone(),
            width: config.dimensions.width,
            height: config.dimensions.height,
            canvas_selector: config.canvas_selector.clone(),
        }
    }

    /// Sets the title of the window to be built.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the fixed inner size of the window, in physical pixels.
    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Sets the CSS selector of the canvas used on the web.
    pub fn with_canvas_selector(mut self, selector: impl Into<String>) -> Self {
        self.canvas_selector = selector.into();
        self
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn canvas_selector(&self) -> &str {
        &self.canvas_selector
    }

    /// Builds the window. The window is not resizable: the frame chain is
    /// configured once at this size.
    pub fn build(self, event_loop: &ActiveEventLoop) -> Result<WinitWindow> {
        log::info!(
            "Building window with title: '{}' and size: {}x{}",
            self.title,
            self.width,
            self.height
        );

        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes()
            .with_title(self.title)
            .with_inner_size(PhysicalSize::new(self.width, self.height))
            .with_resizable(false)
            .with_visible(true);

        #[cfg(target_arch = "wasm32")]
        {
            use winit::platform::web::WindowAttributesExtWebSys;
            let canvas = find_canvas(&self.canvas_selector)?;
            window_attributes = window_attributes.with_canvas(Some(canvas));
        }

        let window = event_loop.create_window(window_attributes)?;

        log::info!("Winit window created successfully (id: {:?}).", window.id());
        Ok(WinitWindow {
            inner: Arc::new(window),
        })
    }
}

impl Default for WinitWindowBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Looks up the canvas element the surface renders into.
#[cfg(target_arch = "wasm32")]
fn find_canvas(selector: &str) -> Result<web_sys::HtmlCanvasElement> {
    use anyhow::anyhow;
    use wasm_bindgen::JsCast;

    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| anyhow!("No document found"))?;
    let element = document
        .query_selector(selector)
        .map_err(|e| anyhow!("Invalid canvas selector '{selector}': {e:?}"))?
        .ok_or_else(|| anyhow!("No element matches '{selector}'"))?;
    element
        .dyn_into::<web_sys::HtmlCanvasElement>()
        .map_err(|_| anyhow!("Element '{selector}' is not a canvas"))
}

impl WinitWindow {
    /// Clones a thread-safe, reference-counted handle to the window.
    pub fn handle(&self) -> EmberWindowHandle {
        self.inner.clone()
    }

    pub fn id(&self) -> WindowId {
        self.inner.id()
    }

    /// Returns the physical dimensions (width, height) of the window's inner area.
    pub fn inner_size(&self) -> (u32, u32) {
        let size = self.inner.inner_size();
        (size.width, size.height)
    }

    pub fn request_redraw(&self) {
        self.inner.request_redraw();
    }
}

/// Returns `true` for the events that end the present loop: a close request
/// or the window being destroyed.
pub fn is_close_event(event: &WindowEvent) -> bool {
    matches!(event, WindowEvent::CloseRequested | WindowEvent::Destroyed)
}

impl HasWindowHandle for WinitWindow {
    fn window_handle(&self) -> Result<WindowHandle<'_>, HandleError> {
        self.inner.window_handle()
    }
}

impl HasDisplayHandle for WinitWindow {
    fn display_handle(&self) -> Result<DisplayHandle<'_>, HandleError> {
        self.inner.display_handle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults_follow_the_session_defaults() {
        let builder = WinitWindowBuilder::new();
        assert_eq!(builder.dimensions(), (800, 600));
        assert_eq!(builder, WinitWindowBuilder::from_config(&SessionConfig::default()));
    }

    #[test]
    fn builder_overrides() {
        let builder = WinitWindowBuilder::new()
            .with_title("Ember Triangle")
            .with_dimensions(320, 240)
            .with_canvas_selector("#viewport");
        assert_eq!(builder.dimensions(), (320, 240));
        assert_eq!(builder.title, "Ember Triangle");
        assert_eq!(builder.canvas_selector(), "#viewport");
    }

    #[test]
    fn close_and_destroy_both_end_the_loop() {
        assert!(is_close_event(&WindowEvent::CloseRequested));
        assert!(is_close_event(&WindowEvent::Destroyed));
        assert!(!is_close_event(&WindowEvent::Focused(true)));
        assert!(!is_close_event(&WindowEvent::RedrawRequested));
    }
}
