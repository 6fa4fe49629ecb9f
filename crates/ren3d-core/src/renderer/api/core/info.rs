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

//! Descriptive device information and per-frame statistics.

use super::DeviceKind;

/// Information strings reported by the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    /// The kind the device was created as.
    pub kind: DeviceKind,
    /// Driver vendor string.
    pub vendor: String,
    /// Renderer (GPU) string.
    pub renderer: String,
    /// Full version string.
    pub version: String,
}

/// Counters of one presented frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// 1 for the first presented frame, then sequential.
    pub frame_number: u64,
    /// Commands replayed during the frame.
    pub commands_executed: u32,
    /// Indexed draws issued during the frame.
    pub draw_calls: u32,
    /// Indices submitted during the frame.
    pub indices_submitted: u64,
}
