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

//! Defines data structures related to GPU buffer resources.

/// What a buffer holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferKind {
    /// Element indices.
    Index,
    /// Vertex attribute data.
    Vertex,
}

/// Update-frequency hint forwarded to the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferUsage {
    /// Written once, drawn a few times.
    StreamDraw,
    /// Written once, drawn many times.
    StaticDraw,
    /// Rewritten often, drawn many times.
    DynamicDraw,
}

/// A descriptor used to create a [`BufferId`].
#[derive(Debug, Clone)]
pub struct BufferDescriptor<'a> {
    /// What the buffer holds.
    pub kind: BufferKind,
    /// How often the contents change.
    pub usage: BufferUsage,
    /// The total size of the buffer in bytes. Must be greater than zero.
    pub size: usize,
    /// Optional initial contents, at most `size` bytes, written at offset 0.
    pub data: Option<&'a [u8]>,
}

resource_id! {
    /// An opaque handle to a GPU buffer resource.
    ///
    /// Returned by [`crate::RenderDevice::create_buffer`] and used to reference
    /// the buffer in vertex inputs and updates.
    BufferId => Buffer
}
