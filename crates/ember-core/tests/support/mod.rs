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

//! Scripted collaborators shared by the behaviour tests.

#![allow(dead_code)]

use ember_core::backend::{
    AdapterOptions, AdapterReport, ClearColor, DeviceDescriptor, DeviceReport,
    FrameChainDescriptor, FrameRecorder, GraphicsBackend, PipelineDescriptor,
};
use ember_core::diagnostics::{BackendEvent, DiagnosticSender};
use ember_core::{BackendError, Completion, FrameError, Session, SessionConfig, WindowHost};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::ops::Range;
use std::rc::Rc;

/// Number of `advance` calls a synchronously completing backend needs to go
/// from `InstanceAcquired` to `Ready`.
pub const SYNC_INIT_STEPS: usize = 5;

/// Every call the scripted backend or its recorders received.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateInstance,
    CreateSurface(String),
    RequestAdapter,
    RequestDevice { label: String, queue_label: String },
    AdapterReport,
    DeviceReport,
    InstallObservers,
    CreateFrameChain { width: u32, height: u32 },
    CreatePipeline { label: String },
    AcquireFrame,
    CreateRecorder,
    BeginRenderPass { clear: ClearColor },
    SetPipeline,
    Draw { vertices: Range<u32>, instances: Range<u32> },
    EndRenderPass,
    Finish,
    Submit,
    Present,
    Tick,
}

/// How the backend answers a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// Completes successfully inside the request call.
    Succeed,
    /// Fails inside the request call with the given message.
    Fail(String),
    /// Keeps the completion until the test delivers it.
    Defer,
    /// Drops the completion unfulfilled.
    Abandon,
}

pub type CallLog = Rc<RefCell<Vec<Call>>>;

pub struct ScriptedBackend {
    pub calls: CallLog,
    pub adapter_answer: Answer,
    pub device_answer: Answer,
    pub fail_instance: bool,
    pub fail_pipeline: bool,
    /// Results handed out by `acquire_frame`, in order. Empty means success.
    pub frame_script: VecDeque<Result<(), FrameError>>,
    deferred_adapter: Option<Completion<String>>,
    deferred_device: Option<Completion<u32>>,
    observers: Option<DiagnosticSender>,
    next_frame: u64,
}

impl ScriptedBackend {
    pub fn succeeding() -> Self {
        Self {
            calls: Rc::new(RefCell::new(Vec::new())),
            adapter_answer: Answer::Succeed,
            device_answer: Answer::Succeed,
            fail_instance: false,
            fail_pipeline: false,
            frame_script: VecDeque::new(),
            deferred_adapter: None,
            deferred_device: None,
            observers: None,
            next_frame: 0,
        }
    }

    pub fn deferred() -> Self {
        Self {
            adapter_answer: Answer::Defer,
            device_answer: Answer::Defer,
            ..Self::succeeding()
        }
    }

    pub fn with_adapter_answer(mut self, answer: Answer) -> Self {
        self.adapter_answer = answer;
        self
    }

    pub fn with_device_answer(mut self, answer: Answer) -> Self {
        self.device_answer = answer;
        self
    }

    pub fn with_frames(mut self, frames: impl IntoIterator<Item = Result<(), FrameError>>) -> Self {
        self.frame_script = frames.into_iter().collect();
        self
    }

    /// Delivers a deferred adapter completion. Returns `false` if none is held.
    pub fn deliver_adapter(&mut self, result: Result<(), String>) -> bool {
        match self.deferred_adapter.take() {
            Some(completion) => {
                completion.complete(result.map(|()| "Scripted Adapter".to_string()));
                true
            }
            None => false,
        }
    }

    /// Delivers a deferred device completion. Returns `false` if none is held.
    pub fn deliver_device(&mut self, result: Result<(), String>) -> bool {
        match self.deferred_device.take() {
            Some(completion) => {
                completion.complete(result.map(|()| 1));
                true
            }
            None => false,
        }
    }

    /// Reports an event through the installed observers.
    pub fn emit(&self, event: BackendEvent) {
        if let Some(sender) = &self.observers {
            sender.report(event);
        }
    }

    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls.borrow().iter().filter(|c| predicate(c)).count()
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn snapshot(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    fn answer<T>(answer: &Answer, completion: Completion<T>, value: T) -> Option<Completion<T>> {
        match answer {
            Answer::Succeed => {
                completion.succeed(value);
                None
            }
            Answer::Fail(message) => {
                completion.fail(message.clone());
                None
            }
            Answer::Defer => Some(completion),
            Answer::Abandon => {
                drop(completion);
                None
            }
        }
    }
}

pub struct ScriptedChain {
    pub width: u32,
    pub height: u32,
}

pub struct ScriptedRecorder {
    calls: CallLog,
    pass_open: bool,
}

impl FrameRecorder for ScriptedRecorder {
    type Frame = u64;
    type Pipeline = String;
    type Commands = usize;

    fn begin_render_pass(&mut self, _target: &u64, _label: &str, clear: ClearColor) {
        assert!(!self.pass_open, "render pass already open");
        self.pass_open = true;
        self.calls.borrow_mut().push(Call::BeginRenderPass { clear });
    }

    fn set_pipeline(&mut self, _pipeline: &String) {
        assert!(self.pass_open, "pipeline bound outside a render pass");
        self.calls.borrow_mut().push(Call::SetPipeline);
    }

    fn draw(&mut self, vertices: Range<u32>, instances: Range<u32>) {
        assert!(self.pass_open, "draw outside a render pass");
        self.calls
            .borrow_mut()
            .push(Call::Draw { vertices, instances });
    }

    fn end_render_pass(&mut self) {
        assert!(self.pass_open, "no render pass to end");
        self.pass_open = false;
        self.calls.borrow_mut().push(Call::EndRenderPass);
    }

    fn finish(self) -> usize {
        assert!(!self.pass_open, "finished with an open render pass");
        self.calls.borrow_mut().push(Call::Finish);
        1
    }
}

impl GraphicsBackend for ScriptedBackend {
    type Target = str;
    type Instance = u32;
    type Surface = u32;
    type Adapter = String;
    type Device = u32;
    type Pipeline = String;
    type FrameChain = ScriptedChain;
    type Frame = u64;
    type Commands = usize;
    type Recorder = ScriptedRecorder;

    fn name(&self) -> &str {
        "Scripted"
    }

    fn create_instance(&mut self) -> Result<u32, BackendError> {
        self.record(Call::CreateInstance);
        if self.fail_instance {
            return Err(BackendError::InstanceCreation("no backend".to_string()));
        }
        Ok(1)
    }

    fn create_surface(&mut self, _instance: &u32, target: &str) -> Result<u32, BackendError> {
        self.record(Call::CreateSurface(target.to_string()));
        Ok(1)
    }

    fn request_adapter(
        &mut self,
        _instance: &u32,
        _surface: &u32,
        _options: &AdapterOptions,
        completion: Completion<String>,
    ) {
        self.record(Call::RequestAdapter);
        self.deferred_adapter =
            Self::answer(&self.adapter_answer, completion, "Scripted Adapter".to_string());
    }

    fn request_device(
        &mut self,
        _adapter: &String,
        descriptor: &DeviceDescriptor,
        completion: Completion<u32>,
    ) {
        self.record(Call::RequestDevice {
            label: descriptor.label.clone(),
            queue_label: descriptor.default_queue_label.clone(),
        });
        self.deferred_device = Self::answer(&self.device_answer, completion, 1);
    }

    fn adapter_report(&self, adapter: &String) -> AdapterReport {
        self.record(Call::AdapterReport);
        AdapterReport {
            name: adapter.clone(),
            ..Default::default()
        }
    }

    fn device_report(&self, _device: &u32) -> DeviceReport {
        self.record(Call::DeviceReport);
        DeviceReport {
            max_texture_dimension_2d: 8192,
            ..Default::default()
        }
    }

    fn install_observers(&mut self, _device: &u32, diagnostics: DiagnosticSender) {
        self.record(Call::InstallObservers);
        self.observers = Some(diagnostics);
    }

    fn create_frame_chain(
        &mut self,
        _adapter: &String,
        _device: &u32,
        _surface: &u32,
        descriptor: &FrameChainDescriptor,
    ) -> Result<ScriptedChain, BackendError> {
        self.record(Call::CreateFrameChain {
            width: descriptor.width,
            height: descriptor.height,
        });
        Ok(ScriptedChain {
            width: descriptor.width,
            height: descriptor.height,
        })
    }

    fn create_pipeline(
        &mut self,
        _device: &u32,
        _chain: &ScriptedChain,
        descriptor: &PipelineDescriptor<'_>,
    ) -> Result<String, BackendError> {
        self.record(Call::CreatePipeline {
            label: descriptor.label.to_string(),
        });
        if self.fail_pipeline {
            return Err(BackendError::PipelineCreation {
                label: descriptor.label.to_string(),
                details: "scripted failure".to_string(),
            });
        }
        Ok(descriptor.label.to_string())
    }

    fn acquire_frame(&mut self, _device: &u32, _chain: &mut ScriptedChain) -> Result<u64, FrameError> {
        self.record(Call::AcquireFrame);
        self.frame_script.pop_front().unwrap_or(Ok(()))?;
        self.next_frame += 1;
        Ok(self.next_frame)
    }

    fn create_recorder(&mut self, _device: &u32, _label: &str) -> ScriptedRecorder {
        self.record(Call::CreateRecorder);
        ScriptedRecorder {
            calls: Rc::clone(&self.calls),
            pass_open: false,
        }
    }

    fn submit(&mut self, _device: &u32, _commands: usize) {
        self.record(Call::Submit);
    }

    fn present(&mut self, _frame: u64) {
        self.record(Call::Present);
    }

    fn tick(&mut self, _device: &u32) {
        self.record(Call::Tick);
    }
}

/// A window that asks to close on a given poll.
#[derive(Debug, Default)]
pub struct ScriptedHost {
    pub polls: usize,
    close_on_poll: Option<usize>,
}

impl ScriptedHost {
    /// Never asks to close.
    pub fn open() -> Self {
        Self::default()
    }

    /// Asks to close once `poll_events` has been called `polls` times.
    pub fn closing_on_poll(polls: usize) -> Self {
        Self {
            polls: 0,
            close_on_poll: Some(polls),
        }
    }
}

impl WindowHost for ScriptedHost {
    fn poll_events(&mut self) {
        self.polls += 1;
    }

    fn close_requested(&self) -> bool {
        self.close_on_poll.is_some_and(|n| self.polls >= n)
    }
}

/// A session over `backend` with instance and surface acquired.
pub fn start(backend: ScriptedBackend) -> Session<ScriptedBackend> {
    Session::start(backend, SessionConfig::default(), "window")
}

pub fn start_with(backend: ScriptedBackend, config: SessionConfig) -> Session<ScriptedBackend> {
    Session::start(backend, config, "window")
}
