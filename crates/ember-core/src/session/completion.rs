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

//! One-shot delivery of asynchronous request results.
//!
//! A [`Completion`] is handed to the backend with each request. The session keeps
//! the matching [`Pending`] and checks it with a non-blocking poll on every
//! `advance`, so delivery may happen inside the request call or much later.

use crate::error::{AcquireError, AcquireStage};
use flume::{Receiver, Sender, TryRecvError};

/// The backend's side of an outstanding request.
#[must_use = "a completion dropped unfulfilled moves the session to the error state"]
#[derive(Debug)]
pub struct Completion<T> {
    stage: AcquireStage,
    sender: Sender<Result<T, String>>,
}

impl<T> Completion<T> {
    /// The request this completion answers.
    pub fn stage(&self) -> AcquireStage {
        self.stage
    }

    /// Delivers the outcome of the request. The error string is the backend's
    /// diagnostic message.
    pub fn complete(self, result: Result<T, String>) {
        if self.sender.send(result).is_err() {
            log::warn!(
                "The {} request completed after its session was dropped.",
                self.stage
            );
        }
    }

    /// Delivers the requested handle.
    pub fn succeed(self, value: T) {
        self.complete(Ok(value));
    }

    /// Reports that the request failed with `message`.
    pub fn fail(self, message: impl Into<String>) {
        self.complete(Err(message.into()));
    }
}

/// What polling a [`Pending`] request observed.
#[derive(Debug)]
pub enum Delivery<T> {
    /// Nothing delivered yet.
    Waiting,
    /// The request produced its handle.
    Succeeded(T),
    /// The backend reported a failure.
    Failed(AcquireError),
    /// The completion was dropped without being fulfilled.
    Abandoned,
}

/// The session's side of an outstanding request.
#[derive(Debug)]
pub struct Pending<T> {
    stage: AcquireStage,
    receiver: Receiver<Result<T, String>>,
}

impl<T> Pending<T> {
    /// Checks for a delivered result without blocking.
    pub fn poll(&self) -> Delivery<T> {
        match self.receiver.try_recv() {
            Ok(Ok(value)) => Delivery::Succeeded(value),
            Ok(Err(message)) => Delivery::Failed(AcquireError::new(self.stage, message)),
            Err(TryRecvError::Empty) => Delivery::Waiting,
            Err(TryRecvError::Disconnected) => Delivery::Abandoned,
        }
    }
}

/// Creates a connected completion/pending pair for a request of `stage`.
pub fn channel<T>(stage: AcquireStage) -> (Completion<T>, Pending<T>) {
    let (sender, receiver) = flume::bounded(1);
    (
        Completion { stage, sender },
        Pending { stage, receiver },
    )
}
