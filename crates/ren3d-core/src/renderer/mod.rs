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

//! Public, backend-agnostic rendering contracts.
//!
//! This module defines the "common language" the game speaks to the renderer:
//! descriptors for every resource kind, the closed [`Command`] set recorded
//! into [`CommandBuffer`]s, the probed [`DeviceCapabilities`] record and the
//! [`RenderDevice`] trait. The 'how' lives in a backend crate (`ren3d-infra`
//! for OpenGL) which implements these traits.

pub mod api;
pub mod error;
pub mod traits;

pub use self::api::*;
pub use self::error::{
    AllocationError, DeviceError, LogicError, RenderError, ValidationError,
};
pub use self::traits::RenderDevice;
