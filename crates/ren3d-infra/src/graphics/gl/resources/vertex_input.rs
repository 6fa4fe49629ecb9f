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

//! Vertex inputs, natively as vertex array objects or emulated.
//!
//! Without VAOs a bind re-issues every attribute pointer, the constant
//! attribute values and the element buffer. Attribute arrays are toggled
//! against a [`LocationMask`] of the arrays currently enabled, so only the
//! locations whose state changes see an enable or disable call.

use super::buffer::BufferManager;
use super::registry::Registry;
use super::to_gl_size;
use crate::graphics::gl::api::{GlApi, GlName, GlObjectKind};
use crate::graphics::gl::conversions::{AttributeLayout, IntoGl};
use crate::graphics::gl::object::GlObject;
use ren3d_core::renderer::api::core::{ContextKind, DeviceCapabilities};
use ren3d_core::renderer::api::resource::{
    BufferId, BufferKind, ResourceKind, VertexAttribute, VertexAttributeSource,
    VertexInputDescriptor, VertexInputId,
};
use ren3d_core::renderer::error::{AllocationError, LogicError, RenderError, ValidationError};
use std::rc::Rc;

/// A set of attribute locations, one bit per location below 32.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct LocationMask(u32);

impl LocationMask {
    pub const EMPTY: Self = Self(0);

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, location: u32) -> bool {
        location < u32::BITS && self.0 & (1 << location) != 0
    }

    /// Adds `location`. Returns `false` if it was already present or is out of range.
    pub fn insert(&mut self, location: u32) -> bool {
        if location >= u32::BITS {
            return false;
        }
        let present = self.contains(location);
        self.0 |= 1 << location;
        !present
    }

    /// Locations in `self` but not in `other`, in ascending order.
    pub fn difference(self, other: Self) -> impl Iterator<Item = u32> {
        let bits = self.0 & !other.0;
        (0..u32::BITS).filter(move |location| bits & (1 << location) != 0)
    }
}

// A buffer-fed attribute with its native arguments resolved at creation.
#[derive(Debug, Clone, Copy)]
struct ResolvedAttribute {
    location: u32,
    buffer: BufferId,
    layout: AttributeLayout,
    stride: i32,
    offset: i32,
}

/// A validated vertex layout, plus its VAO when the context has them.
#[derive(Debug)]
pub struct GlVertexInput {
    vao: Option<GlObject>,
    index_buffer: Option<BufferId>,
    buffered: Vec<ResolvedAttribute>,
    constants: Vec<(u32, [f32; 4])>,
    enabled: LocationMask,
}

impl GlVertexInput {
    pub fn index_buffer(&self) -> Option<BufferId> {
        self.index_buffer
    }

    /// Locations fed from buffers.
    pub fn enabled_locations(&self) -> LocationMask {
        self.enabled
    }

    pub fn vertex_array(&self) -> Option<GlName> {
        self.vao.as_ref().map(GlObject::name)
    }
}

/// Owns vertex inputs and tracks what is natively bound.
#[derive(Debug)]
pub struct VertexInputManager {
    gl: Rc<dyn GlApi>,
    caps: DeviceCapabilities,
    inputs: Registry<VertexInputId, GlVertexInput>,
    // Core profiles cannot draw or bind element buffers without a VAO, so an
    // empty one stands in for "no vertex input".
    fallback_vao: Option<GlObject>,
    bound_vao: Option<GlName>,
    // Emulation only.
    enabled: LocationMask,
}

impl VertexInputManager {
    pub fn new(gl: Rc<dyn GlApi>, caps: DeviceCapabilities) -> Result<Self, AllocationError> {
        let fallback_vao = if caps.context_kind == ContextKind::Core {
            let vao = GlObject::create(&gl, GlObjectKind::VertexArray, ResourceKind::VertexInput)?;
            gl.bind_vertex_array(Some(vao.name()));
            Some(vao)
        } else {
            None
        };
        let bound_vao = fallback_vao.as_ref().map(GlObject::name);
        Ok(Self {
            gl,
            caps,
            inputs: Registry::new(),
            fallback_vao,
            bound_vao,
            enabled: LocationMask::EMPTY,
        })
    }

    /// Whether vertex inputs are native vertex array objects.
    pub fn is_native(&self) -> bool {
        self.caps.vao_available
    }

    fn validate(
        &self,
        descriptor: &VertexInputDescriptor<'_>,
        buffers: &BufferManager,
    ) -> Result<(Vec<ResolvedAttribute>, Vec<(u32, [f32; 4])>, LocationMask), ValidationError> {
        let invalid = |field: &'static str, reason: String| {
            ValidationError::new(ResourceKind::VertexInput, field, reason)
        };
        let max = self.caps.max_vertex_input_locations;

        if let Some(index_buffer) = descriptor.index_buffer {
            match buffers.get(index_buffer) {
                Ok(buffer) if buffer.kind() == BufferKind::Index => {}
                Ok(_) => {
                    return Err(invalid(
                        "index_buffer",
                        format!("{index_buffer:?} is not an index buffer"),
                    ))
                }
                Err(_) => {
                    return Err(invalid(
                        "index_buffer",
                        format!("{index_buffer:?} does not exist"),
                    ))
                }
            }
        }

        let mut seen = LocationMask::EMPTY;
        let mut enabled = LocationMask::EMPTY;
        let mut buffered = Vec::new();
        let mut constants = Vec::new();
        for VertexAttribute { location, source } in descriptor.attributes.iter().copied() {
            if location >= max {
                return Err(invalid(
                    "attributes",
                    format!("location {location} is not below {max}"),
                ));
            }
            if !seen.insert(location) {
                return Err(invalid(
                    "attributes",
                    format!("location {location} is used twice"),
                ));
            }
            match source {
                VertexAttributeSource::Buffer {
                    format,
                    vertex_buffer,
                    offset,
                    stride,
                } => {
                    match buffers.get(vertex_buffer) {
                        Ok(buffer) if buffer.kind() == BufferKind::Vertex => {}
                        Ok(_) => {
                            return Err(invalid(
                                "attributes",
                                format!(
                                    "{vertex_buffer:?} at location {location} is not a vertex \
                                     buffer"
                                ),
                            ))
                        }
                        Err(_) => {
                            return Err(invalid(
                                "attributes",
                                format!("{vertex_buffer:?} at location {location} does not exist"),
                            ))
                        }
                    }
                    buffered.push(ResolvedAttribute {
                        location,
                        buffer: vertex_buffer,
                        layout: format.into_gl(),
                        stride: to_gl_size(stride, ResourceKind::VertexInput, "attributes")?,
                        offset: to_gl_size(offset, ResourceKind::VertexInput, "attributes")?,
                    });
                    enabled.insert(location);
                }
                VertexAttributeSource::Constant(value) => constants.push((location, value)),
            }
        }
        Ok((buffered, constants, enabled))
    }

    fn buffer_name(buffers: &BufferManager, id: BufferId) -> Result<GlName, LogicError> {
        Ok(buffers.get(id)?.name())
    }

    fn index_buffer_name(
        buffers: &BufferManager,
        input: &GlVertexInput,
    ) -> Result<Option<GlName>, LogicError> {
        match input.index_buffer {
            Some(id) => Ok(Some(Self::buffer_name(buffers, id)?)),
            None => Ok(None),
        }
    }

    // Issues pointers for `buffered` and the constant values, toggling arrays
    // relative to `previously_enabled`.
    fn issue_attributes(
        gl: &dyn GlApi,
        input: &GlVertexInput,
        buffers: &BufferManager,
        previously_enabled: LocationMask,
    ) -> Result<(), LogicError> {
        for attribute in &input.buffered {
            gl.bind_buffer(
                glow::ARRAY_BUFFER,
                Some(Self::buffer_name(buffers, attribute.buffer)?),
            );
            gl.vertex_attrib_pointer(
                attribute.location,
                attribute.layout.components,
                attribute.layout.data_type,
                attribute.layout.normalized,
                attribute.stride,
                attribute.offset,
            );
        }
        for location in previously_enabled.difference(input.enabled) {
            gl.disable_vertex_attrib_array(location);
        }
        for location in input.enabled.difference(previously_enabled) {
            gl.enable_vertex_attrib_array(location);
        }
        for (location, value) in &input.constants {
            gl.vertex_attrib_4_f32(*location, *value);
        }
        Ok(())
    }

    fn bind_vao(&mut self, name: Option<GlName>) {
        if self.bound_vao != name {
            self.gl.bind_vertex_array(name);
            self.bound_vao = name;
        }
    }

    fn fallback_name(&self) -> Option<GlName> {
        self.fallback_vao.as_ref().map(GlObject::name)
    }

    pub fn create(
        &mut self,
        descriptor: &VertexInputDescriptor<'_>,
        buffers: &BufferManager,
    ) -> Result<VertexInputId, RenderError> {
        let (buffered, constants, enabled) = self.validate(descriptor, buffers)?;
        let mut input = GlVertexInput {
            vao: None,
            index_buffer: descriptor.index_buffer,
            buffered,
            constants,
            enabled,
        };

        if self.is_native() {
            let index_buffer = Self::index_buffer_name(buffers, &input)?;
            let vao =
                GlObject::create(&self.gl, GlObjectKind::VertexArray, ResourceKind::VertexInput)?;
            let restore = self.bound_vao;
            self.gl.bind_vertex_array(Some(vao.name()));
            let recorded =
                Self::issue_attributes(self.gl.as_ref(), &input, buffers, LocationMask::EMPTY);
            if !self.caps.dsa_available {
                self.gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, index_buffer);
            }
            self.gl.bind_vertex_array(restore);
            recorded?;
            if self.caps.dsa_available {
                self.gl.vertex_array_element_buffer(vao.name(), index_buffer);
            }
            input.vao = Some(vao);
        }

        let id = self.inputs.insert(input);
        log::debug!(
            "GlVertexInputManager: Created vertex input {:?} ({} attribute(s), {})",
            id,
            descriptor.attributes.len(),
            if self.is_native() { "vao" } else { "emulated" }
        );
        Ok(id)
    }

    /// Makes `id` (or no vertex input) the native vertex state.
    ///
    /// Native VAOs are only rebound when they differ from the bound one.
    /// Emulated inputs re-issue their full attribute state on every call.
    pub fn bind_native(
        &mut self,
        id: Option<VertexInputId>,
        buffers: &BufferManager,
    ) -> Result<(), LogicError> {
        if self.is_native() {
            let name = match id {
                Some(id) => self.inputs.get(id)?.vertex_array(),
                None => self.fallback_name(),
            };
            self.bind_vao(name);
            return Ok(());
        }

        match id {
            Some(id) => {
                let input = self.inputs.get(id)?;
                let index_buffer = Self::index_buffer_name(buffers, input)?;
                Self::issue_attributes(self.gl.as_ref(), input, buffers, self.enabled)?;
                self.gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, index_buffer);
                self.enabled = input.enabled;
            }
            None => {
                for location in self.enabled.difference(LocationMask::EMPTY) {
                    self.gl.disable_vertex_attrib_array(location);
                }
                self.enabled = LocationMask::EMPTY;
            }
        }
        Ok(())
    }

    /// Moves the native vertex state somewhere an element-buffer bind cannot
    /// corrupt a vertex input. Called before index buffers are bound, which
    /// never happens with direct state access.
    pub fn detach_for_index_update(&mut self) {
        if self.is_native() {
            let fallback = self.fallback_name();
            self.bind_vao(fallback);
        }
    }

    pub fn get(&self, id: VertexInputId) -> Result<&GlVertexInput, LogicError> {
        self.inputs.get(id)
    }

    pub fn destroy(&mut self, id: VertexInputId) -> bool {
        let Some(input) = self.inputs.remove(id) else {
            return false;
        };
        if input.vertex_array().is_some() && input.vertex_array() == self.bound_vao {
            // Deleting the bound VAO reverts to zero; restore the fallback.
            drop(input);
            self.bound_vao = None;
            let fallback = self.fallback_name();
            self.bind_vao(fallback);
        }
        log::debug!("GlVertexInputManager: Destroyed vertex input {:?}", id);
        true
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Releases every vertex input. The fallback VAO stays alive.
    pub fn clear(&mut self) {
        let fallback = self.fallback_name();
        self.bind_vao(fallback);
        self.inputs.clear();
    }
}
