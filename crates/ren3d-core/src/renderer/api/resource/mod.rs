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

//! Creation descriptors and opaque ids for every resource kind.
//!
//! Resources are owned by the backend; game code and commands only ever hold
//! the `Copy` ids defined here.

macro_rules! resource_id {
    ($(#[$meta:meta])* $name:ident => $kind:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub usize);

        impl $crate::renderer::api::resource::ResourceId for $name {
            const KIND: $crate::renderer::api::resource::ResourceKind =
                $crate::renderer::api::resource::ResourceKind::$kind;

            fn from_raw(raw: usize) -> Self {
                Self(raw)
            }

            fn raw(self) -> usize {
                self.0
            }
        }
    };
}

pub mod buffer;
pub mod sampler;
pub mod shader;
pub mod texture;
pub mod vertex_input;

pub use self::buffer::*;
pub use self::sampler::*;
pub use self::shader::*;
pub use self::texture::*;
pub use self::vertex_input::*;

use std::fmt;
use std::hash::Hash;

/// The closed set of resource kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// A vertex or index buffer.
    Buffer,
    /// A two-dimensional texture.
    Texture2d,
    /// Texture sampling state.
    Sampler,
    /// A single compiled shader.
    Shader,
    /// A linked vertex + fragment shader pair.
    ShaderStage,
    /// Vertex attribute layout plus index buffer.
    VertexInput,
    /// A device-owned render target (MSAA offscreen framebuffer).
    Framebuffer,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::Buffer => "buffer",
            ResourceKind::Texture2d => "texture 2D",
            ResourceKind::Sampler => "sampler",
            ResourceKind::Shader => "shader",
            ResourceKind::ShaderStage => "shader stage",
            ResourceKind::VertexInput => "vertex input",
            ResourceKind::Framebuffer => "framebuffer",
        };
        f.write_str(name)
    }
}

/// Common behaviour of the typed resource ids.
///
/// Backends use it to store every resource kind in the same kind of map.
pub trait ResourceId: Copy + Eq + Hash + fmt::Debug {
    /// The resource kind this id refers to.
    const KIND: ResourceKind;

    /// Wraps a raw id value.
    fn from_raw(raw: usize) -> Self;

    /// Returns the raw id value.
    fn raw(self) -> usize;
}
