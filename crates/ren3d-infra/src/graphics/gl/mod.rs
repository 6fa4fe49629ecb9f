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

//! The OpenGL 2.0 / 3.2 core / ES 2.0 backend.

pub mod api;
pub mod context;
pub mod conversions;
pub mod device;
pub mod factory;
pub mod glow_api;
pub mod headless;
pub mod msaa;
pub mod object;
pub mod probe;
pub mod recording;
pub mod resources;

pub use self::api::{GlApi, GlName, GlObjectKind, GlSurface, GlVersion};
pub use self::context::GlContext;
pub use self::device::GlDevice;
pub use self::factory::{DeviceSelection, GlContextProvider, GlDeviceFactory, NativeContext};
pub use self::glow_api::GlowApi;
pub use self::headless::{HeadlessContextProvider, HeadlessSurface};
pub use self::probe::probe;
pub use self::recording::{ErrorTrigger, GlCall, GlProfile, RecordingGl};
