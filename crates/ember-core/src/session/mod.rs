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

//! The device acquisition state machine.
//!
//! A [`Session`] owns every handle the backend produces and sequences their
//! creation: instance and surface synchronously, then the adapter and the device
//! through asynchronous requests, then the frame chain and the render pipeline.
//! [`Session::advance`] makes at most one step of progress per call and never
//! blocks, so it can be driven from a cooperative scheduler.

mod completion;
mod state;

pub use self::completion::{channel, Completion, Delivery, Pending};
pub use self::state::InitState;

use crate::backend::{FrameRecorder, GraphicsBackend, PipelineDescriptor};
use crate::config::SessionConfig;
use crate::diagnostics::{self, DiagnosticReceiver, DiagnosticSender, DiagnosticSummary};
use crate::error::{AcquireStage, FrameError, SessionError};

/// The single record tying a window to a graphics device.
pub struct Session<B: GraphicsBackend> {
    backend: B,
    config: SessionConfig,
    state: InitState,
    failure: Option<SessionError>,

    instance: Option<B::Instance>,
    surface: Option<B::Surface>,
    adapter: Option<B::Adapter>,
    device: Option<B::Device>,
    frame_chain: Option<B::FrameChain>,
    pipeline: Option<B::Pipeline>,

    pending_adapter: Option<Pending<B::Adapter>>,
    pending_device: Option<Pending<B::Device>>,

    diagnostics: DiagnosticReceiver,
    // Taken when the observers are installed.
    observer_sender: Option<DiagnosticSender>,
}

impl<B: GraphicsBackend> Session<B> {
    /// Creates a session in the `None` state. Nothing is acquired until
    /// [`Session::acquire_instance`] is called.
    pub fn new(backend: B, config: SessionConfig) -> Self {
        let (sender, receiver) = diagnostics::channel();
        Self {
            backend,
            config,
            state: InitState::None,
            failure: None,
            instance: None,
            surface: None,
            adapter: None,
            device: None,
            frame_chain: None,
            pipeline: None,
            pending_adapter: None,
            pending_device: None,
            diagnostics: receiver,
            observer_sender: Some(sender),
        }
    }

    /// Creates a session and acquires its instance and surface for `target`.
    ///
    /// A failure is recorded in the session (state `Error`) rather than
    /// returned, so the driver handles it like any other acquisition failure.
    pub fn start(backend: B, config: SessionConfig, target: &B::Target) -> Self {
        let mut session = Self::new(backend, config);
        // Already recorded as the session failure.
        let _ = session.acquire_instance(target);
        session
    }

    /// Synchronously creates the backend instance and the surface for `target`.
    pub fn acquire_instance(&mut self, target: &B::Target) -> Result<(), SessionError> {
        if self.state != InitState::None {
            log::warn!("Instance already acquired (state {}), ignoring.", self.state);
            return Ok(());
        }
        match self.create_instance_and_surface(target) {
            Ok(()) => {
                self.set_state(InitState::InstanceAcquired);
                Ok(())
            }
            Err(err) => {
                self.fail(err.clone());
                Err(err)
            }
        }
    }

    fn create_instance_and_surface(&mut self, target: &B::Target) -> Result<(), SessionError> {
        log::info!("Creating {} instance...", self.backend.name());
        let instance = self.backend.create_instance()?;
        let surface = self.backend.create_surface(&instance, target)?;
        log::debug!("Presentation surface created.");
        self.instance = Some(instance);
        self.surface = Some(surface);
        Ok(())
    }

    /// Makes at most one step of progress and returns the resulting state.
    pub fn advance(&mut self) -> InitState {
        match self.state {
            InitState::None | InitState::Ready | InitState::Error => {}
            InitState::InstanceAcquired => self.request_adapter(),
            InitState::RequestingAdapter => self.poll_adapter(),
            InitState::AdapterAcquired => self.request_device(),
            InitState::RequestingDevice => self.poll_device(),
            InitState::DeviceAcquired => {
                if let Err(err) = self.finish_setup() {
                    self.fail(err);
                }
            }
        }
        self.state
    }

    fn request_adapter(&mut self) {
        let (completion, pending) = channel(AcquireStage::Adapter);
        let options = self.config.adapter_options();
        let (Some(instance), Some(surface)) = (&self.instance, &self.surface) else {
            return self.fail(SessionError::Internal(
                "adapter requested without an instance and a surface".to_string(),
            ));
        };
        log::info!("Requesting adapter ({:?})...", options.power_preference);
        // The backend may complete inside this call; the result waits in the channel.
        self.backend
            .request_adapter(instance, surface, &options, completion);
        self.pending_adapter = Some(pending);
        self.set_state(InitState::RequestingAdapter);
    }

    fn poll_adapter(&mut self) {
        let Some(pending) = &self.pending_adapter else {
            return self.fail(SessionError::Internal(
                "no adapter request outstanding".to_string(),
            ));
        };
        match pending.poll() {
            Delivery::Waiting => {}
            Delivery::Succeeded(adapter) => {
                self.pending_adapter = None;
                self.adapter = Some(adapter);
                self.set_state(InitState::AdapterAcquired);
            }
            Delivery::Failed(err) => {
                self.pending_adapter = None;
                self.fail(err.into());
            }
            Delivery::Abandoned => {
                self.pending_adapter = None;
                self.fail(SessionError::Internal(
                    "adapter completion dropped without being fulfilled".to_string(),
                ));
            }
        }
    }

    fn request_device(&mut self) {
        let (completion, pending) = channel(AcquireStage::Device);
        let descriptor = self.config.device_descriptor();
        let Some(adapter) = &self.adapter else {
            return self.fail(SessionError::Internal(
                "device requested without an adapter".to_string(),
            ));
        };
        log::info!("Requesting device \"{}\"...", descriptor.label);
        self.backend.request_device(adapter, &descriptor, completion);
        self.pending_device = Some(pending);
        self.set_state(InitState::RequestingDevice);
    }

    fn poll_device(&mut self) {
        let Some(pending) = &self.pending_device else {
            return self.fail(SessionError::Internal(
                "no device request outstanding".to_string(),
            ));
        };
        match pending.poll() {
            Delivery::Waiting => {}
            Delivery::Succeeded(device) => {
                self.pending_device = None;
                self.device = Some(device);
                self.set_state(InitState::DeviceAcquired);
            }
            Delivery::Failed(err) => {
                self.pending_device = None;
                self.fail(err.into());
            }
            Delivery::Abandoned => {
                self.pending_device = None;
                self.fail(SessionError::Internal(
                    "device completion dropped without being fulfilled".to_string(),
                ));
            }
        }
    }

    /// Observers, reports, frame chain, pipeline, then one tick.
    fn finish_setup(&mut self) -> Result<(), SessionError> {
        let Self {
            backend,
            config,
            adapter: Some(adapter),
            device: Some(device),
            surface: Some(surface),
            observer_sender,
            ..
        } = self
        else {
            return Err(SessionError::Internal(
                "setup reached without adapter, device and surface".to_string(),
            ));
        };

        if let Some(sender) = observer_sender.take() {
            backend.install_observers(device, sender);
            log::debug!("Backend observers installed.");
        }

        let adapter_report = backend.adapter_report(adapter);
        let device_report = backend.device_report(device);
        log::info!("Adapter: {adapter_report}");
        log::info!("Device limits: {device_report}");

        let chain = backend.create_frame_chain(
            adapter,
            device,
            surface,
            &config.frame_chain_descriptor(),
        )?;
        log::debug!(
            "Frame chain configured at {}x{}.",
            config.dimensions.width,
            config.dimensions.height
        );

        let pipeline = backend.create_pipeline(device, &chain, &PipelineDescriptor::triangle())?;
        log::debug!("Render pipeline created.");

        // Surfaces errors raised while building the pipeline.
        backend.tick(device);

        self.frame_chain = Some(chain);
        self.pipeline = Some(pipeline);
        self.set_state(InitState::Ready);
        Ok(())
    }

    /// Records, submits and presents one frame: a render pass clearing the
    /// target and drawing the triangle (3 vertices, 1 instance).
    pub fn render_frame(&mut self) -> Result<(), FrameError> {
        if self.state != InitState::Ready {
            return Err(FrameError::NotReady);
        }
        let Self {
            backend,
            config,
            device: Some(device),
            frame_chain: Some(chain),
            pipeline: Some(pipeline),
            ..
        } = self
        else {
            return Err(FrameError::NotReady);
        };

        let frame = backend.acquire_frame(device, chain)?;

        let mut recorder = backend.create_recorder(device, "Frame Encoder");
        recorder.begin_render_pass(&frame, "Triangle Pass", config.clear_color);
        recorder.set_pipeline(pipeline);
        recorder.draw(0..3, 0..1);
        recorder.end_render_pass();
        let commands = recorder.finish();

        backend.submit(device, commands);
        backend.present(frame);
        backend.tick(device);
        log::trace!("Frame presented.");
        Ok(())
    }

    /// Logs and counts the events the backend observers reported since the last drain.
    pub fn drain_diagnostics(&mut self) -> DiagnosticSummary {
        self.diagnostics.drain()
    }

    /// Moves the session to `Error`, keeping the first recorded failure.
    pub(crate) fn fail(&mut self, error: SessionError) {
        log::error!("{error}");
        if self.failure.is_none() {
            self.failure = Some(error);
        }
        self.set_state(InitState::Error);
    }

    fn set_state(&mut self, next: InitState) {
        if self.state == next {
            return;
        }
        if !self.state.can_transition_to(next) {
            log::warn!("Ignoring transition {} -> {next}.", self.state);
            return;
        }
        log::info!("Session state: {} -> {next}", self.state);
        self.state = next;
    }

    /// The current acquisition state.
    pub fn state(&self) -> InitState {
        self.state
    }

    /// Returns `true` once frames can be rendered.
    pub fn is_ready(&self) -> bool {
        self.state == InitState::Ready
    }

    /// The failure that moved the session to `Error`, if any.
    pub fn failure(&self) -> Option<&SessionError> {
        self.failure.as_ref()
    }

    /// The configuration the session was created with.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The backend driving this session.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Mutable access to the backend.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// The instance, once acquired.
    pub fn instance(&self) -> Option<&B::Instance> {
        self.instance.as_ref()
    }

    /// The presentation surface, once acquired.
    pub fn surface(&self) -> Option<&B::Surface> {
        self.surface.as_ref()
    }

    /// The adapter, once delivered.
    pub fn adapter(&self) -> Option<&B::Adapter> {
        self.adapter.as_ref()
    }

    /// The logical device, once delivered.
    pub fn device(&self) -> Option<&B::Device> {
        self.device.as_ref()
    }

    /// The configured frame chain, present from `Ready` on.
    pub fn frame_chain(&self) -> Option<&B::FrameChain> {
        self.frame_chain.as_ref()
    }

    /// The render pipeline, present from `Ready` on.
    pub fn pipeline(&self) -> Option<&B::Pipeline> {
        self.pipeline.as_ref()
    }
}

impl<B: GraphicsBackend> Drop for Session<B> {
    fn drop(&mut self) {
        // Reverse acquisition order.
        drop(self.pipeline.take());
        drop(self.frame_chain.take());
        drop(self.device.take());
        drop(self.adapter.take());
        drop(self.surface.take());
        drop(self.instance.take());
        log::debug!("Session resources released.");
    }
}
