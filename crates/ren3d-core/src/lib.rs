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

//! # ren3d Core
//!
//! Backend-agnostic contracts of the ren3d renderer: resource descriptors and
//! ids, the command buffer and queue, the device capability record, the error
//! hierarchy and the [`RenderDevice`] trait implemented by concrete backends.
//!
//! The worker [`tasks::TaskPool`] and the [`logging`] bootstrap live here too,
//! since every consumer of the renderer needs them.

#![warn(missing_docs)]

pub mod logging;
pub mod math;
pub mod renderer;
pub mod tasks;

pub use renderer::traits::RenderDevice;
