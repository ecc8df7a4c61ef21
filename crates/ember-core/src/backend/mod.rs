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

//! The graphics backend abstraction the session drives.
//!
//! Every handle the backend produces is an associated type, so the session can
//! own them without knowing the underlying graphics API. Asynchronous requests
//! are answered through a [`Completion`], which the backend may fulfil inside
//! the issuing call or at any later point.

mod descriptors;

pub use self::descriptors::*;

use crate::diagnostics::DiagnosticSender;
use crate::error::{BackendError, FrameError};
use crate::session::Completion;
use std::ops::Range;

/// Records the commands of a single frame.
pub trait FrameRecorder {
    /// The frame target a render pass draws into.
    type Frame;
    /// The pipeline bound before drawing.
    type Pipeline;
    /// The finished command buffer handed back to the backend for submission.
    type Commands;

    /// Opens a render pass that clears `target` to `clear` and stores the result.
    fn begin_render_pass(&mut self, target: &Self::Frame, label: &str, clear: ClearColor);

    /// Binds the render pipeline for the following draws.
    fn set_pipeline(&mut self, pipeline: &Self::Pipeline);

    /// Issues a non-indexed draw without vertex buffers.
    fn draw(&mut self, vertices: Range<u32>, instances: Range<u32>);

    /// Closes the open render pass.
    fn end_render_pass(&mut self);

    /// Consumes the recorder and returns the encoded commands.
    fn finish(self) -> Self::Commands;
}

/// A graphics API able to bring up a device and present frames to a window.
pub trait GraphicsBackend {
    /// What a surface is created from (a window handle, a canvas...).
    type Target: ?Sized;
    /// The API entry point surfaces and adapters are created from.
    type Instance;
    /// The presentation surface bound to the window.
    type Surface;
    /// A physical device able to present to the surface.
    type Adapter;
    /// The logical device together with its queue.
    type Device;
    /// A compiled render pipeline.
    type Pipeline;
    /// The configured surface (or swap chain) frames are acquired from.
    type FrameChain;
    /// One acquired frame target, consumed by [`GraphicsBackend::present`].
    type Frame;
    /// Encoded commands ready for submission.
    type Commands;
    /// The recorder handed out by [`GraphicsBackend::create_recorder`].
    type Recorder: FrameRecorder<
        Frame = Self::Frame,
        Pipeline = Self::Pipeline,
        Commands = Self::Commands,
    >;

    /// A short name used in logs.
    fn name(&self) -> &str;

    /// Creates the API instance. Synchronous.
    fn create_instance(&mut self) -> Result<Self::Instance, BackendError>;

    /// Creates the presentation surface for `target`. Synchronous.
    fn create_surface(
        &mut self,
        instance: &Self::Instance,
        target: &Self::Target,
    ) -> Result<Self::Surface, BackendError>;

    /// Starts the search for an adapter compatible with `surface`.
    ///
    /// The result must be delivered through `completion`. Dropping it unfulfilled
    /// is treated as a fatal error by the session.
    fn request_adapter(
        &mut self,
        instance: &Self::Instance,
        surface: &Self::Surface,
        options: &AdapterOptions,
        completion: Completion<Self::Adapter>,
    );

    /// Starts the creation of a logical device. Same delivery rules as
    /// [`GraphicsBackend::request_adapter`].
    fn request_device(
        &mut self,
        adapter: &Self::Adapter,
        descriptor: &DeviceDescriptor,
        completion: Completion<Self::Device>,
    );

    /// Describes the adapter (name, vendor, device type, backend) for logging.
    fn adapter_report(&self, adapter: &Self::Adapter) -> AdapterReport;

    /// Describes the device limits for logging.
    fn device_report(&self, device: &Self::Device) -> DeviceReport;

    /// Registers the uncaptured-error, log and queue-work-done observers.
    /// Called once per device.
    fn install_observers(&mut self, device: &Self::Device, diagnostics: DiagnosticSender);

    /// Configures the surface for presentation, negotiating the color format
    /// and the present mode against what the surface supports.
    fn create_frame_chain(
        &mut self,
        adapter: &Self::Adapter,
        device: &Self::Device,
        surface: &Self::Surface,
        descriptor: &FrameChainDescriptor,
    ) -> Result<Self::FrameChain, BackendError>;

    /// Compiles the shader module and builds the render pipeline targeting the
    /// color format of `chain`.
    fn create_pipeline(
        &mut self,
        device: &Self::Device,
        chain: &Self::FrameChain,
        descriptor: &PipelineDescriptor<'_>,
    ) -> Result<Self::Pipeline, BackendError>;

    /// Acquires the next frame target.
    ///
    /// Returns [`FrameError::Outdated`] after reconfiguring a lost or outdated
    /// chain, and [`FrameError::Timeout`] when no target became available.
    fn acquire_frame(
        &mut self,
        device: &Self::Device,
        chain: &mut Self::FrameChain,
    ) -> Result<Self::Frame, FrameError>;

    /// Creates a command recorder for one frame.
    fn create_recorder(&mut self, device: &Self::Device, label: &str) -> Self::Recorder;

    /// Submits `commands` to the device queue.
    fn submit(&mut self, device: &Self::Device, commands: Self::Commands);

    /// Presents an acquired frame.
    fn present(&mut self, frame: Self::Frame);

    /// Lets the backend process pending callbacks without blocking.
    fn tick(&mut self, device: &Self::Device);
}
