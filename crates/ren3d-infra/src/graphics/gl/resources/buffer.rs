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

use super::registry::Registry;
use super::{check_allocation, to_gl_size};
use crate::graphics::gl::api::{GlApi, GlName, GlObjectKind};
use crate::graphics::gl::conversions::{IntoGl, DYNAMIC_STORAGE_BIT};
use crate::graphics::gl::object::GlObject;
use ren3d_core::renderer::api::core::DeviceCapabilities;
use ren3d_core::renderer::api::resource::{
    BufferDescriptor, BufferId, BufferKind, BufferUsage, ResourceKind,
};
use ren3d_core::renderer::error::{LogicError, RenderError, ValidationError};
use std::rc::Rc;

/// A native buffer object plus its creation parameters.
#[derive(Debug)]
pub struct GlBuffer {
    object: GlObject,
    kind: BufferKind,
    usage: BufferUsage,
    size: usize,
}

impl GlBuffer {
    pub fn name(&self) -> GlName {
        self.object.name()
    }

    pub fn kind(&self) -> BufferKind {
        self.kind
    }

    pub fn usage(&self) -> BufferUsage {
        self.usage
    }

    /// Size in bytes, fixed at creation.
    pub fn size(&self) -> usize {
        self.size
    }
}

/// Owns every vertex and index buffer of a context.
///
/// With buffer storage available every buffer gets immutable storage flagged
/// for dynamic updates. Otherwise mutable storage is allocated with the usage
/// hint.
///
/// Binding an index buffer rewrites the element binding of the bound vertex
/// array. The context detaches vertex arrays before calling into this manager
/// for index buffers, except with direct state access: buffers are then
/// allocated through the copy-write target and updated by name.
#[derive(Debug)]
pub struct BufferManager {
    gl: Rc<dyn GlApi>,
    caps: DeviceCapabilities,
    buffers: Registry<BufferId, GlBuffer>,
}

impl BufferManager {
    pub fn new(gl: Rc<dyn GlApi>, caps: DeviceCapabilities) -> Self {
        Self {
            gl,
            caps,
            buffers: Registry::new(),
        }
    }

    fn upload_target(&self, kind: BufferKind) -> u32 {
        if self.caps.dsa_available {
            glow::COPY_WRITE_BUFFER
        } else {
            kind.into_gl()
        }
    }

    pub fn create(
        &mut self,
        descriptor: &BufferDescriptor<'_>,
    ) -> Result<BufferId, RenderError> {
        if descriptor.size == 0 {
            return Err(
                ValidationError::new(ResourceKind::Buffer, "size", "must be non-zero").into(),
            );
        }
        let size = to_gl_size(descriptor.size, ResourceKind::Buffer, "size")?;
        if let Some(data) = descriptor.data {
            if data.len() > descriptor.size {
                return Err(ValidationError::new(
                    ResourceKind::Buffer,
                    "data",
                    format!("{} bytes do not fit a {size}-byte buffer", data.len()),
                )
                .into());
            }
        }

        let object = GlObject::create(&self.gl, GlObjectKind::Buffer, ResourceKind::Buffer)?;
        let target = self.upload_target(descriptor.kind);
        self.gl.bind_buffer(target, Some(object.name()));
        if self.caps.buffer_storage_available {
            self.gl.buffer_storage(target, size, DYNAMIC_STORAGE_BIT);
        } else {
            self.gl.buffer_data_size(target, size, descriptor.usage.into_gl());
        }
        check_allocation(self.gl.as_ref(), ResourceKind::Buffer)?;

        if let Some(data) = descriptor.data.filter(|data| !data.is_empty()) {
            self.gl.buffer_sub_data(target, 0, data);
        }

        let id = self.buffers.insert(GlBuffer {
            object,
            kind: descriptor.kind,
            usage: descriptor.usage,
            size: descriptor.size,
        });
        log::debug!(
            "GlBufferManager: Created {:?} buffer {:?}, size: {} bytes",
            descriptor.kind,
            id,
            descriptor.size
        );
        Ok(id)
    }

    /// Writes `data` at `offset`. The range must lie inside the buffer.
    pub fn update(&mut self, id: BufferId, offset: usize, data: &[u8]) -> Result<(), RenderError> {
        let buffer = self.buffers.get(id)?;
        let end = offset.saturating_add(data.len());
        if end > buffer.size {
            return Err(LogicError::OutOfBounds {
                end,
                size: buffer.size,
            }
            .into());
        }
        if data.is_empty() {
            return Ok(());
        }

        let offset = to_gl_size(offset, ResourceKind::Buffer, "offset")?;
        if self.caps.dsa_available {
            self.gl.named_buffer_sub_data(buffer.name(), offset, data);
            return Ok(());
        }
        let target = self.upload_target(buffer.kind);
        self.gl.bind_buffer(target, Some(buffer.name()));
        self.gl.buffer_sub_data(target, offset, data);
        Ok(())
    }

    pub fn get(&self, id: BufferId) -> Result<&GlBuffer, LogicError> {
        self.buffers.get(id)
    }

    /// Releases a buffer. Returns `false` when the id was not alive.
    pub fn destroy(&mut self, id: BufferId) -> bool {
        match self.buffers.remove(id) {
            Some(buffer) => {
                log::debug!("GlBufferManager: Destroyed buffer {:?}", id);
                drop(buffer);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    pub fn clear(&mut self) {
        self.buffers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::gl::recording::{ErrorTrigger, GlCall, GlProfile, RecordingGl};
    use ren3d_core::renderer::api::core::ContextKind;

    fn manager_with(caps: DeviceCapabilities) -> (Rc<RecordingGl>, BufferManager) {
        let recording = Rc::new(RecordingGl::new(GlProfile::new(4, 5, false)));
        let gl: Rc<dyn GlApi> = recording.clone();
        (recording, BufferManager::new(gl, caps))
    }

    fn manager(storage: bool) -> (Rc<RecordingGl>, BufferManager) {
        let mut caps = DeviceCapabilities::baseline(ContextKind::Core);
        caps.buffer_storage_available = storage;
        manager_with(caps)
    }

    fn vertex(size: usize, data: Option<&[u8]>) -> BufferDescriptor<'_> {
        BufferDescriptor {
            kind: BufferKind::Vertex,
            usage: BufferUsage::StaticDraw,
            size,
            data,
        }
    }

    #[test]
    fn storage_path_uses_dynamic_storage_flag() {
        let (gl, mut buffers) = manager(true);
        buffers.create(&vertex(64, None)).unwrap();

        assert_eq!(
            gl.count(|call| matches!(
                call,
                GlCall::BufferStorage { size: 64, flags: DYNAMIC_STORAGE_BIT, .. }
            )),
            1
        );
        assert_eq!(gl.count(|call| matches!(call, GlCall::BufferData { .. })), 0);
    }

    #[test]
    fn mutable_path_carries_the_usage_hint() {
        let (gl, mut buffers) = manager(false);
        let data = [7_u8; 16];
        buffers.create(&vertex(32, Some(&data))).unwrap();

        assert_eq!(
            gl.count(|call| matches!(
                call,
                GlCall::BufferData {
                    target: glow::ARRAY_BUFFER,
                    size: 32,
                    usage: glow::STATIC_DRAW
                }
            )),
            1
        );
        assert_eq!(
            gl.count(|call| matches!(call, GlCall::BufferSubData { offset: 0, len: 16, .. })),
            1
        );
    }

    #[test]
    fn bad_descriptors_name_the_field() {
        let (gl, mut buffers) = manager(false);

        let zero = buffers.create(&vertex(0, None)).unwrap_err();
        assert!(matches!(zero, RenderError::Validation(ValidationError { field: "size", .. })));

        let data = [0_u8; 8];
        let overflow = buffers.create(&vertex(4, Some(&data))).unwrap_err();
        assert!(matches!(overflow, RenderError::Validation(ValidationError { field: "data", .. })));
        assert_eq!(gl.total_live_objects(), 0);
    }

    #[test]
    fn out_of_memory_releases_the_handle() {
        let (gl, mut buffers) = manager(false);
        gl.inject_error(ErrorTrigger::BufferAllocation, glow::OUT_OF_MEMORY);

        let err = buffers.create(&vertex(1 << 20, None)).unwrap_err();

        assert!(matches!(err, RenderError::Allocation(_)));
        assert_eq!(gl.live_objects(GlObjectKind::Buffer), 0);
        assert!(buffers.is_empty());
    }

    #[test]
    fn updates_are_bounds_checked() {
        let (_gl, mut buffers) = manager(false);
        let id = buffers.create(&vertex(16, None)).unwrap();

        assert!(buffers.update(id, 8, &[0; 8]).is_ok());
        assert_eq!(
            buffers.update(id, 12, &[0; 8]),
            Err(RenderError::Logic(LogicError::OutOfBounds { end: 20, size: 16 }))
        );
    }

    #[test]
    fn direct_state_access_never_binds_the_element_target() {
        // --- 1. ARRANGE ---
        let mut caps = DeviceCapabilities::baseline(ContextKind::Core);
        caps.dsa_available = true;
        let (gl, mut buffers) = manager_with(caps);
        let id = buffers
            .create(&BufferDescriptor {
                kind: BufferKind::Index,
                usage: BufferUsage::DynamicDraw,
                size: 12,
                data: None,
            })
            .unwrap();

        // --- 2. ACT ---
        buffers.update(id, 4, &[1; 8]).unwrap();

        // --- 3. ASSERT ---
        let name = buffers.get(id).unwrap().name();
        assert_eq!(
            gl.count(|call| matches!(call, GlCall::BindBuffer(glow::ELEMENT_ARRAY_BUFFER, _))),
            0
        );
        assert_eq!(
            gl.count(|call| *call == GlCall::BindBuffer(glow::COPY_WRITE_BUFFER, Some(name))),
            1
        );
        assert_eq!(
            gl.calls_matching(|call| matches!(
                call,
                GlCall::NamedBufferSubData { .. } | GlCall::BufferSubData { .. }
            )),
            vec![GlCall::NamedBufferSubData {
                buffer: name,
                offset: 4,
                len: 8
            }]
        );
    }

    #[test]
    fn destroy_is_idempotent() {
        let (gl, mut buffers) = manager(false);
        let id = buffers.create(&vertex(16, None)).unwrap();

        assert!(buffers.destroy(id));
        assert!(!buffers.destroy(id));
        assert_eq!(gl.live_objects(GlObjectKind::Buffer), 0);
    }
}
