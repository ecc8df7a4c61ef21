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

use std::fmt;

/// The phases of device acquisition, in the order they are reached.
///
/// `Error` sorts last and is absorbing: once entered, the session never leaves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum InitState {
    /// Nothing acquired yet; waiting for the instance and surface.
    #[default]
    None,
    /// Instance and surface exist; the adapter request is issued next.
    InstanceAcquired,
    /// Waiting for the adapter request to complete.
    RequestingAdapter,
    /// An adapter was delivered; the device request is issued next.
    AdapterAcquired,
    /// Waiting for the device request to complete.
    RequestingDevice,
    /// A device was delivered; setup runs on the next step.
    DeviceAcquired,
    /// Pipeline and frame chain exist; frames can be rendered.
    Ready,
    /// Acquisition or setup failed.
    Error,
}

impl InitState {
    /// `Ready` and `Error` end the init phase.
    pub fn is_terminal(self) -> bool {
        matches!(self, InitState::Ready | InitState::Error)
    }

    /// Returns `true` while a request is outstanding.
    pub fn is_awaiting_completion(self) -> bool {
        matches!(
            self,
            InitState::RequestingAdapter | InitState::RequestingDevice
        )
    }

    /// Whether moving from `self` to `next` respects the acquisition order.
    pub fn can_transition_to(self, next: InitState) -> bool {
        match (self, next) {
            (InitState::Error, _) => false,
            (_, InitState::Error) => true,
            _ => next > self,
        }
    }
}

impl fmt::Display for InitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InitState::None => "None",
            InitState::InstanceAcquired => "InstanceAcquired",
            InitState::RequestingAdapter => "RequestingAdapter",
            InitState::AdapterAcquired => "AdapterAcquired",
            InitState::RequestingDevice => "RequestingDevice",
            InitState::DeviceAcquired => "DeviceAcquired",
            InitState::Ready => "Ready",
            InitState::Error => "Error",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn states_are_ordered_with_error_last() {
        assert!(InitState::None < InitState::InstanceAcquired);
        assert!(InitState::RequestingDevice < InitState::DeviceAcquired);
        assert!(InitState::Ready < InitState::Error);
    }

    #[test]
    fn error_is_absorbing() {
        assert!(!InitState::Error.can_transition_to(InitState::Ready));
        assert!(!InitState::Error.can_transition_to(InitState::Error));
        assert!(InitState::RequestingAdapter.can_transition_to(InitState::Error));
    }

    #[test]
    fn no_regression() {
        assert!(!InitState::AdapterAcquired.can_transition_to(InitState::RequestingAdapter));
        assert!(InitState::AdapterAcquired.can_transition_to(InitState::RequestingDevice));
    }
}
