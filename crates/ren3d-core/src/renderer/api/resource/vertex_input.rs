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

//! Vertex input layouts: which buffer feeds which attribute location.

use super::buffer::BufferId;

/// Memory layout of one buffer-fed vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexAttributeFormat {
    /// Four normalized unsigned bytes (packed colors).
    Rgba8Unorm,
    /// Two 32-bit floats.
    Rg32Sfloat,
    /// Three 32-bit floats.
    Rgb32Sfloat,
    /// Four 32-bit floats.
    Rgba32Sfloat,
}

impl VertexAttributeFormat {
    /// Size of one element in bytes.
    pub const fn size(self) -> usize {
        match self {
            VertexAttributeFormat::Rgba8Unorm => 4,
            VertexAttributeFormat::Rg32Sfloat => 8,
            VertexAttributeFormat::Rgb32Sfloat => 12,
            VertexAttributeFormat::Rgba32Sfloat => 16,
        }
    }
}

/// Where the values of an attribute come from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VertexAttributeSource {
    /// Per-vertex values read from a vertex buffer.
    Buffer {
        /// Element layout.
        format: VertexAttributeFormat,
        /// A buffer of kind [`super::BufferKind::Vertex`].
        vertex_buffer: BufferId,
        /// Byte offset of the first element.
        offset: usize,
        /// Distance in bytes between consecutive elements. Zero means tightly packed.
        stride: usize,
    },
    /// The same value for every vertex.
    Constant([f32; 4]),
}

/// One attribute of a vertex input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexAttribute {
    /// The location the shader stage reads the attribute from.
    pub location: u32,
    /// Where its values come from.
    pub source: VertexAttributeSource,
}

/// A descriptor used to create a [`VertexInputId`].
#[derive(Debug, Clone)]
pub struct VertexInputDescriptor<'a> {
    /// A buffer of kind [`super::BufferKind::Index`], if the input is drawn indexed.
    pub index_buffer: Option<BufferId>,
    /// Attributes with unique locations.
    pub attributes: &'a [VertexAttribute],
}

resource_id! {
    /// An opaque handle to a vertex input.
    VertexInputId => VertexInput
}
