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

//! The present loop: drives a [`Session`] to `Ready`, then renders until the
//! window closes.
//!
//! One [`PresentLoop::tick`] is one loop iteration. Thread-owning hosts call
//! [`PresentLoop::run_blocking`]; cooperative hosts (a browser event loop, a
//! winit `ApplicationHandler`) call `tick` once per scheduler turn.

use crate::backend::GraphicsBackend;
use crate::error::SessionError;
use crate::platform::window::WindowHost;
use crate::session::{InitState, Session};

/// How the process should end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitStatus {
    /// The window was closed.
    Closed,
    /// The session reached `Error`.
    Failed(SessionError),
}

impl ExitStatus {
    /// The process exit code: 0 on a clean close, 1 on any failure.
    pub fn code(&self) -> u8 {
        match self {
            ExitStatus::Closed => 0,
            ExitStatus::Failed(_) => 1,
        }
    }

    /// Returns `true` for a clean close.
    pub fn is_success(&self) -> bool {
        matches!(self, ExitStatus::Closed)
    }
}

/// What the caller should do after a tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopControl {
    /// Call `tick` again on the next turn.
    Continue,
    /// The loop is over; end the process with this status.
    Exit(ExitStatus),
}

/// Frame counters kept by the steady phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Frames rendered and presented.
    pub frames_presented: u64,
    /// Frames dropped because the frame chain timed out or was reconfigured.
    pub frames_skipped: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Phase {
    Init,
    Steady,
    Finished(ExitStatus),
}

/// Drives a session through its init phase and then its steady phase.
pub struct PresentLoop<B: GraphicsBackend> {
    session: Session<B>,
    phase: Phase,
    stats: FrameStats,
}

impl<B: GraphicsBackend> PresentLoop<B> {
    /// Wraps `session`, starting in the init phase.
    pub fn new(session: Session<B>) -> Self {
        Self {
            session,
            phase: Phase::Init,
            stats: FrameStats::default(),
        }
    }

    /// Runs one loop iteration.
    ///
    /// Once an exit status has been returned, further ticks return it again
    /// without touching the window or the session.
    pub fn tick<H: WindowHost + ?Sized>(&mut self, host: &mut H) -> LoopControl {
        match self.phase.clone() {
            Phase::Init => self.init_tick(host),
            Phase::Steady => self.steady_tick(host),
            Phase::Finished(status) => LoopControl::Exit(status),
        }
    }

    /// Ticks until the loop exits.
    pub fn run_blocking<H: WindowHost + ?Sized>(&mut self, host: &mut H) -> ExitStatus {
        loop {
            if let LoopControl::Exit(status) = self.tick(host) {
                return status;
            }
        }
    }

    fn init_tick<H: WindowHost + ?Sized>(&mut self, host: &mut H) -> LoopControl {
        host.poll_events();
        if host.close_requested() {
            log::info!("Window closed during initialization.");
            return self.finish(ExitStatus::Closed);
        }

        let state = self.session.advance();
        if let Some(control) = self.check_diagnostics() {
            return control;
        }

        match state {
            InitState::Ready => {
                log::info!("Initialization complete, entering the present loop.");
                self.phase = Phase::Steady;
                LoopControl::Continue
            }
            InitState::Error => self.finish_with_session_failure(),
            _ => LoopControl::Continue,
        }
    }

    fn steady_tick<H: WindowHost + ?Sized>(&mut self, host: &mut H) -> LoopControl {
        host.poll_events();
        if host.close_requested() {
            log::info!("Window closed.");
            return self.finish(ExitStatus::Closed);
        }

        match self.session.render_frame() {
            Ok(()) => self.stats.frames_presented += 1,
            Err(err) if err.is_recoverable() => {
                log::debug!("Frame skipped: {err}");
                self.stats.frames_skipped += 1;
            }
            Err(err) => {
                self.session.fail(err.into());
                return self.finish_with_session_failure();
            }
        }

        self.check_diagnostics().unwrap_or(LoopControl::Continue)
    }

    fn check_diagnostics(&mut self) -> Option<LoopControl> {
        let summary = self.session.drain_diagnostics();
        if !self.session.config().escalate_uncaptured_errors {
            return None;
        }
        let message = summary.first_uncaptured?;
        self.session.fail(SessionError::Uncaptured(message));
        Some(self.finish_with_session_failure())
    }

    fn finish_with_session_failure(&mut self) -> LoopControl {
        let error = self.session.failure().cloned().unwrap_or_else(|| {
            SessionError::Internal("session entered the error state without a failure".into())
        });
        self.finish(ExitStatus::Failed(error))
    }

    fn finish(&mut self, status: ExitStatus) -> LoopControl {
        log::info!(
            "Present loop finished: {} frames presented, {} skipped.",
            self.stats.frames_presented,
            self.stats.frames_skipped
        );
        if let ExitStatus::Failed(err) = &status {
            log::error!("Exiting with failure: {err}");
        }
        self.phase = Phase::Finished(status.clone());
        LoopControl::Exit(status)
    }

    /// The driven session.
    pub fn session(&self) -> &Session<B> {
        &self.session
    }

    /// Mutable access to the driven session.
    pub fn session_mut(&mut self) -> &mut Session<B> {
        &mut self.session
    }

    /// Frame counters so far.
    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// Returns `true` once the init phase handed over to the steady phase.
    pub fn is_presenting(&self) -> bool {
        self.phase == Phase::Steady
    }

    /// Consumes the loop and returns its session.
    pub fn into_session(self) -> Session<B> {
        self.session
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes() {
        assert_eq!(ExitStatus::Closed.code(), 0);
        assert_eq!(
            ExitStatus::Failed(SessionError::Uncaptured("boom".into())).code(),
            1
        );
    }
}
