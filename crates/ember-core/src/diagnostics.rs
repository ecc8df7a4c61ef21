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

//! Backend observer events and the channel they travel through.
//!
//! Observers registered on the device may fire from inside backend calls or from
//! other threads, so they only push a [`BackendEvent`] into an unbounded channel.
//! The driver drains it once per tick and logs what it finds.

use flume::{Receiver, Sender};

/// Something a backend observer reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendEvent {
    /// An error no error scope captured.
    UncapturedError {
        /// The error category (validation, out of memory, internal...).
        kind: String,
        /// The backend's message.
        message: String,
    },
    /// A message from the backend's own logging.
    Log {
        /// The level the message is forwarded at.
        level: log::Level,
        /// The backend's message.
        message: String,
    },
    /// The queue finished the work submitted before the observer was registered.
    QueueWorkDone,
}

/// The sending half handed to the backend's observers.
#[derive(Debug, Clone)]
pub struct DiagnosticSender {
    sender: Sender<BackendEvent>,
}

impl DiagnosticSender {
    /// Queues an event for the next drain. Events sent after the session is
    /// gone are dropped.
    pub fn report(&self, event: BackendEvent) {
        if self.sender.send(event).is_err() {
            log::trace!("Diagnostic event dropped, the session is gone.");
        }
    }
}

/// The receiving half owned by the session.
#[derive(Debug)]
pub struct DiagnosticReceiver {
    receiver: Receiver<BackendEvent>,
}

/// Counts of the events seen during one drain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagnosticSummary {
    /// Uncaptured errors reported.
    pub uncaptured_errors: usize,
    /// Backend log messages forwarded.
    pub logs: usize,
    /// Queue-work-done notifications.
    pub queue_work_done: usize,
    /// Message of the first uncaptured error, if any.
    pub first_uncaptured: Option<String>,
}

impl DiagnosticSummary {
    /// Returns `true` if no event was drained.
    pub fn is_empty(&self) -> bool {
        self.uncaptured_errors == 0 && self.logs == 0 && self.queue_work_done == 0
    }
}

/// Creates a connected sender/receiver pair.
pub fn channel() -> (DiagnosticSender, DiagnosticReceiver) {
    let (sender, receiver) = flume::unbounded();
    (DiagnosticSender { sender }, DiagnosticReceiver { receiver })
}

impl DiagnosticReceiver {
    /// Logs and counts every pending event without blocking.
    pub fn drain(&self) -> DiagnosticSummary {
        let mut summary = DiagnosticSummary::default();
        for event in self.receiver.try_iter() {
            match event {
                BackendEvent::UncapturedError { kind, message } => {
                    log::error!("Uncaptured {kind} error: {message}");
                    summary.uncaptured_errors += 1;
                    if summary.first_uncaptured.is_none() {
                        summary.first_uncaptured = Some(format!("{kind}: {message}"));
                    }
                }
                BackendEvent::Log { level, message } => {
                    log::log!(level, "[backend] {message}");
                    summary.logs += 1;
                }
                BackendEvent::QueueWorkDone => {
                    log::debug!("Queued work finished.");
                    summary.queue_work_done += 1;
                }
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_counts_each_kind_of_event() {
        let (sender, receiver) = channel();
        sender.report(BackendEvent::QueueWorkDone);
        sender.report(BackendEvent::Log {
            level: log::Level::Info,
            message: "hello".to_string(),
        });
        sender.report(BackendEvent::UncapturedError {
            kind: "validation".to_string(),
            message: "bad bind group".to_string(),
        });
        sender.report(BackendEvent::UncapturedError {
            kind: "internal".to_string(),
            message: "second".to_string(),
        });

        let summary = receiver.drain();
        assert_eq!(summary.uncaptured_errors, 2);
        assert_eq!(summary.logs, 1);
        assert_eq!(summary.queue_work_done, 1);
        assert_eq!(
            summary.first_uncaptured.as_deref(),
            Some("validation: bad bind group")
        );
    }

    #[test]
    fn drain_on_empty_channel_is_empty() {
        let (_sender, receiver) = channel();
        assert!(receiver.drain().is_empty());
    }

    #[test]
    fn report_after_receiver_dropped_does_not_panic() {
        let (sender, receiver) = channel();
        drop(receiver);
        sender.report(BackendEvent::QueueWorkDone);
    }
}
