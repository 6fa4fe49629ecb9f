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

//! # ren3d Infra
//!
//! Concrete implementation of the `ren3d-core` rendering contracts on top of
//! OpenGL 2.0, OpenGL 3.2 core and OpenGL ES 2.0.
//!
//! Native calls go through the [`graphics::gl::GlApi`] boundary. The
//! [`graphics::gl::GlowApi`] implementation forwards them to a live `glow`
//! context; [`graphics::gl::RecordingGl`] simulates a driver headlessly and
//! records every call, which is what the test suites replay against.

pub mod graphics;

pub use graphics::gl::{
    DeviceSelection, GlApi, GlContextProvider, GlDevice, GlDeviceFactory, GlSurface, GlowApi,
    HeadlessContextProvider, NativeContext, RecordingGl,
};
