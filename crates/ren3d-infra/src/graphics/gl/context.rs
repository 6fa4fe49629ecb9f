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

//! The aggregate of every manager for one rendering surface.
//!
//! The context keeps three layers of state apart:
//! - fixed-function state, cached so unchanged values never reach the driver;
//! - the logical bindings set by commands (texture, sampler, vertex input,
//!   shader stage), validated when set;
//! - the native bindings, owned by each manager and only brought in line with
//!   the logical ones right before a draw or a uniform upload.

use super::api::GlApi;
use super::conversions::{index_element_type, IntoGl};
use super::resources::{
    BufferManager, SamplerManager, ShaderManager, ShaderStageManager, TextureManager,
    VertexInputManager,
};
use ren3d_core::math::Rgba8;
use ren3d_core::renderer::api::command::{
    BlendFactor, CommandKind, DrawIndexedCommand, ScissorBoxCommand, ViewportCommand,
};
use ren3d_core::renderer::api::core::DeviceCapabilities;
use ren3d_core::renderer::api::resource::{
    BufferDescriptor, BufferId, BufferKind, SamplerDescriptor, SamplerId, ShaderDescriptor,
    ShaderId, ShaderStageDescriptor, ShaderStageId, Texture2dDescriptor, TextureId, UniformId,
    UniformKind, UniformValue, VertexInputDescriptor, VertexInputId,
};
use ren3d_core::renderer::error::{LogicError, RenderError};
use std::rc::Rc;

// `None` means "unknown": the next set always reaches the driver.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct FixedState {
    clear_color: Option<Rgba8>,
    viewport: Option<[i32; 4]>,
    depth_range: Option<(f32, f32)>,
    scissor_test: Option<bool>,
    scissor_box: Option<[i32; 4]>,
    culling: Option<bool>,
    depth_test: Option<bool>,
    depth_write: Option<bool>,
    blending: Option<bool>,
    blend_func: Option<(BlendFactor, BlendFactor)>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Bindings {
    texture: Option<TextureId>,
    sampler: Option<SamplerId>,
    vertex_input: Option<VertexInputId>,
    shader_stage: Option<ShaderStageId>,
    vertex_input_dirty: bool,
}

fn set_capability(gl: &dyn GlApi, capability: u32, enabled: bool, cached: &mut Option<bool>) {
    if *cached != Some(enabled) {
        if enabled {
            gl.enable(capability);
        } else {
            gl.disable(capability);
        }
        *cached = Some(enabled);
    }
}

/// Managers, fixed-function state and bindings of one native context.
///
/// Dropping the context releases resources in dependency order: vertex
/// inputs, shader stages, shaders, samplers, textures, buffers.
#[derive(Debug)]
pub struct GlContext {
    gl: Rc<dyn GlApi>,
    caps: DeviceCapabilities,
    vertex_inputs: VertexInputManager,
    shader_stages: ShaderStageManager,
    shaders: ShaderManager,
    samplers: SamplerManager,
    textures: TextureManager,
    buffers: BufferManager,
    state: FixedState,
    bindings: Bindings,
}

impl GlContext {
    /// Builds the managers and puts the native context in its initial state.
    ///
    /// Initial state: scissor, culling, depth test and blending disabled,
    /// depth writes enabled, blend function `One, Zero`, back faces culled
    /// when culling is enabled, counter-clockwise front faces.
    pub fn new(gl: Rc<dyn GlApi>, caps: DeviceCapabilities) -> Result<Self, RenderError> {
        let vertex_inputs = VertexInputManager::new(Rc::clone(&gl), caps)?;
        let mut context = Self {
            vertex_inputs,
            shader_stages: ShaderStageManager::new(Rc::clone(&gl), caps),
            shaders: ShaderManager::new(Rc::clone(&gl)),
            samplers: SamplerManager::new(Rc::clone(&gl), caps),
            textures: TextureManager::new(Rc::clone(&gl), caps),
            buffers: BufferManager::new(Rc::clone(&gl), caps),
            gl,
            caps,
            state: FixedState::default(),
            bindings: Bindings::default(),
        };

        context.gl.active_texture(glow::TEXTURE0);
        context.gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
        context.gl.front_face(glow::CCW);
        context.gl.cull_face(glow::BACK);
        context.set_scissor_enabled(false);
        context.set_culling(false);
        context.set_depth_test(false);
        context.set_depth_write(true);
        context.set_blending(false);
        context.set_blend_func(BlendFactor::One, BlendFactor::Zero);

        log::debug!("GlContext: Initialized for a {:?} context", caps.context_kind);
        Ok(context)
    }

    pub fn gl(&self) -> &Rc<dyn GlApi> {
        &self.gl
    }

    pub fn capabilities(&self) -> &DeviceCapabilities {
        &self.caps
    }

    // --- Buffers ---

    pub fn create_buffer(
        &mut self,
        descriptor: &BufferDescriptor<'_>,
    ) -> Result<BufferId, RenderError> {
        if descriptor.kind == BufferKind::Index {
            self.detach_vertex_input();
        }
        self.buffers.create(descriptor)
    }

    pub fn update_buffer(
        &mut self,
        id: BufferId,
        offset: usize,
        data: &[u8],
    ) -> Result<(), RenderError> {
        if self.buffers.get(id)?.kind() == BufferKind::Index {
            self.detach_vertex_input();
        }
        self.buffers.update(id, offset, data)
    }

    pub fn destroy_buffer(&mut self, id: BufferId) {
        self.buffers.destroy(id);
    }

    pub fn buffers(&self) -> &BufferManager {
        &self.buffers
    }

    // With direct state access, buffer uploads never bind an element buffer.
    fn detach_vertex_input(&mut self) {
        if !self.caps.dsa_available {
            self.vertex_inputs.detach_for_index_update();
            self.bindings.vertex_input_dirty = true;
        }
    }

    // --- Textures ---

    pub fn create_texture_2d(
        &mut self,
        descriptor: &Texture2dDescriptor<'_>,
    ) -> Result<TextureId, RenderError> {
        self.textures.create(descriptor)
    }

    pub fn update_texture_2d(
        &mut self,
        id: TextureId,
        mip_level: u32,
        data: &[u8],
    ) -> Result<(), RenderError> {
        self.textures.update(id, mip_level, data)
    }

    pub fn generate_mipmaps(&mut self, id: TextureId) -> Result<(), RenderError> {
        self.textures.generate_mipmaps(id)
    }

    pub fn destroy_texture_2d(&mut self, id: TextureId) {
        if self.textures.destroy(id) && self.bindings.texture == Some(id) {
            self.bindings.texture = None;
        }
    }

    pub fn textures(&self) -> &TextureManager {
        &self.textures
    }

    // --- Samplers ---

    pub fn create_sampler(
        &mut self,
        descriptor: &SamplerDescriptor,
    ) -> Result<SamplerId, RenderError> {
        self.samplers.create(descriptor)
    }

    pub fn update_sampler(
        &mut self,
        id: SamplerId,
        descriptor: &SamplerDescriptor,
    ) -> Result<(), RenderError> {
        self.samplers.update(id, descriptor)
    }

    pub fn destroy_sampler(&mut self, id: SamplerId) {
        if self.samplers.destroy(id) && self.bindings.sampler == Some(id) {
            self.bindings.sampler = None;
        }
    }

    pub fn samplers(&self) -> &SamplerManager {
        &self.samplers
    }

    // --- Shaders ---

    pub fn create_shader(
        &mut self,
        descriptor: &ShaderDescriptor<'_>,
    ) -> Result<ShaderId, RenderError> {
        self.shaders.create(descriptor)
    }

    pub fn destroy_shader(&mut self, id: ShaderId) {
        self.shaders.destroy(id);
    }

    pub fn create_shader_stage(
        &mut self,
        descriptor: &ShaderStageDescriptor<'_>,
    ) -> Result<ShaderStageId, RenderError> {
        self.shader_stages.create(descriptor, &self.shaders)
    }

    pub fn find_uniform(
        &self,
        stage: ShaderStageId,
        name: &str,
        kind: UniformKind,
    ) -> Result<UniformId, RenderError> {
        self.shader_stages.find_uniform(stage, name, kind)
    }

    pub fn destroy_shader_stage(&mut self, id: ShaderStageId) {
        if self.shader_stages.destroy(id) && self.bindings.shader_stage == Some(id) {
            self.bindings.shader_stage = None;
        }
    }

    // --- Vertex inputs ---

    pub fn create_vertex_input(
        &mut self,
        descriptor: &VertexInputDescriptor<'_>,
    ) -> Result<VertexInputId, RenderError> {
        self.vertex_inputs.create(descriptor, &self.buffers)
    }

    pub fn destroy_vertex_input(&mut self, id: VertexInputId) {
        if self.vertex_inputs.destroy(id) && self.bindings.vertex_input == Some(id) {
            self.bindings.vertex_input = None;
            self.bindings.vertex_input_dirty = true;
        }
    }

    pub fn vertex_inputs(&self) -> &VertexInputManager {
        &self.vertex_inputs
    }

    // --- Fixed-function state ---

    /// Clears color and depth. Depth writes are forced on for the clear.
    pub fn clear(&mut self, color: Rgba8) {
        if self.state.clear_color != Some(color) {
            let [red, green, blue, alpha] = color.to_normalized();
            self.gl.clear_color(red, green, blue, alpha);
            self.state.clear_color = Some(color);
        }
        let depth_masked = self.state.depth_write == Some(false);
        if depth_masked {
            self.gl.depth_mask(true);
        }
        self.gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        if depth_masked {
            self.gl.depth_mask(false);
        }
    }

    fn check_rectangle(
        &self,
        command: CommandKind,
        width: i32,
        height: i32,
    ) -> Result<(), LogicError> {
        let max = self.caps.max_viewport_size;
        let fits = |side: i32, limit: u32| u32::try_from(side).is_ok_and(|side| side <= limit);
        if fits(width, max.width) && fits(height, max.height) {
            Ok(())
        } else {
            Err(LogicError::RectangleOutOfRange {
                command,
                width,
                height,
                max,
            })
        }
    }

    /// Rejects negative sizes and sizes above the device's viewport limit.
    pub fn set_viewport(&mut self, viewport: &ViewportCommand) -> Result<(), LogicError> {
        self.check_rectangle(CommandKind::Viewport, viewport.width, viewport.height)?;
        let rect = [viewport.x, viewport.y, viewport.width, viewport.height];
        if self.state.viewport != Some(rect) {
            self.gl.viewport(rect[0], rect[1], rect[2], rect[3]);
            self.state.viewport = Some(rect);
        }
        let range = (viewport.min_depth, viewport.max_depth);
        if self.state.depth_range != Some(range) {
            self.gl.depth_range(range.0, range.1);
            self.state.depth_range = Some(range);
        }
        Ok(())
    }

    pub fn set_scissor_enabled(&mut self, enabled: bool) {
        set_capability(
            self.gl.as_ref(),
            glow::SCISSOR_TEST,
            enabled,
            &mut self.state.scissor_test,
        );
    }

    pub fn is_scissor_enabled(&self) -> bool {
        self.state.scissor_test == Some(true)
    }

    /// Same limits as [`GlContext::set_viewport`].
    pub fn set_scissor_box(&mut self, scissor: &ScissorBoxCommand) -> Result<(), LogicError> {
        self.check_rectangle(CommandKind::ScissorBox, scissor.width, scissor.height)?;
        let rect = [scissor.x, scissor.y, scissor.width, scissor.height];
        if self.state.scissor_box != Some(rect) {
            self.gl.scissor(rect[0], rect[1], rect[2], rect[3]);
            self.state.scissor_box = Some(rect);
        }
        Ok(())
    }

    pub fn set_culling(&mut self, enabled: bool) {
        set_capability(self.gl.as_ref(), glow::CULL_FACE, enabled, &mut self.state.culling);
    }

    pub fn set_depth_test(&mut self, enabled: bool) {
        set_capability(self.gl.as_ref(), glow::DEPTH_TEST, enabled, &mut self.state.depth_test);
    }

    pub fn set_depth_write(&mut self, enabled: bool) {
        if self.state.depth_write != Some(enabled) {
            self.gl.depth_mask(enabled);
            self.state.depth_write = Some(enabled);
        }
    }

    pub fn set_blending(&mut self, enabled: bool) {
        set_capability(self.gl.as_ref(), glow::BLEND, enabled, &mut self.state.blending);
    }

    pub fn set_blend_func(&mut self, src: BlendFactor, dst: BlendFactor) {
        if self.state.blend_func != Some((src, dst)) {
            self.gl.blend_func(src.into_gl(), dst.into_gl());
            self.state.blend_func = Some((src, dst));
        }
    }

    // --- Bindings ---

    pub fn bind_texture(&mut self, texture: Option<TextureId>) -> Result<(), LogicError> {
        if let Some(id) = texture {
            self.textures.get(id)?;
        }
        self.bindings.texture = texture;
        Ok(())
    }

    pub fn bind_sampler(&mut self, sampler: Option<SamplerId>) -> Result<(), LogicError> {
        if let Some(id) = sampler {
            self.samplers.get(id)?;
        }
        self.bindings.sampler = sampler;
        Ok(())
    }

    /// Every bind marks the vertex state for re-issue at the next draw.
    pub fn bind_vertex_input(
        &mut self,
        vertex_input: Option<VertexInputId>,
    ) -> Result<(), LogicError> {
        if let Some(id) = vertex_input {
            self.vertex_inputs.get(id)?;
        }
        self.bindings.vertex_input = vertex_input;
        self.bindings.vertex_input_dirty = true;
        Ok(())
    }

    pub fn bind_shader_stage(
        &mut self,
        shader_stage: Option<ShaderStageId>,
    ) -> Result<(), LogicError> {
        if let Some(id) = shader_stage {
            self.shader_stages.get(id)?;
        }
        self.bindings.shader_stage = shader_stage;
        Ok(())
    }

    /// Uploads a uniform of the bound shader stage.
    ///
    /// With separate shader objects the value goes straight to the program
    /// and the native program binding is left alone.
    pub fn set_uniform(
        &mut self,
        uniform: UniformId,
        value: UniformValue,
    ) -> Result<(), LogicError> {
        if self.bindings.shader_stage != Some(uniform.stage) {
            return Err(LogicError::UniformStageNotBound);
        }
        if value.kind() != uniform.kind {
            return Err(LogicError::UniformKindMismatch {
                expected: uniform.kind,
                actual: value.kind(),
            });
        }
        let location = uniform.location;
        if self.caps.sso_available {
            let program = self.shader_stages.get(uniform.stage)?.name();
            match value {
                UniformValue::Int32(v) | UniformValue::Sampler2d(v) => {
                    self.gl.program_uniform_1_i32(program, location, v)
                }
                UniformValue::Float32(v) => self.gl.program_uniform_1_f32(program, location, v),
                UniformValue::Vec2(v) => self.gl.program_uniform_2_f32(program, location, v),
                UniformValue::Vec4(v) => self.gl.program_uniform_4_f32(program, location, v),
                UniformValue::Mat4(v) => {
                    self.gl.program_uniform_matrix_4_f32(program, location, &v)
                }
            }
            return Ok(());
        }

        self.shader_stages.bind_native(Some(uniform.stage))?;
        match value {
            UniformValue::Int32(v) | UniformValue::Sampler2d(v) => {
                self.gl.uniform_1_i32(location, v)
            }
            UniformValue::Float32(v) => self.gl.uniform_1_f32(location, v),
            UniformValue::Vec2(v) => self.gl.uniform_2_f32(location, v),
            UniformValue::Vec4(v) => self.gl.uniform_4_f32(location, v),
            UniformValue::Mat4(v) => self.gl.uniform_matrix_4_f32(location, &v),
        }
        Ok(())
    }

    fn flush_bindings(&mut self) -> Result<(), LogicError> {
        self.textures.bind_native(self.bindings.texture)?;
        self.samplers.bind_native(self.bindings.sampler)?;
        if let (Some(texture), false) = (self.bindings.texture, self.samplers.is_native()) {
            let descriptor = match self.bindings.sampler {
                Some(sampler) => *self.samplers.get(sampler)?.descriptor(),
                None => SamplerDescriptor::default(),
            };
            self.textures.apply_sampling(texture, &descriptor)?;
        }
        if self.bindings.vertex_input_dirty {
            self.vertex_inputs
                .bind_native(self.bindings.vertex_input, &self.buffers)?;
            self.bindings.vertex_input_dirty = false;
        }
        self.shader_stages.bind_native(self.bindings.shader_stage)?;
        Ok(())
    }

    /// Validates and issues an indexed draw with the current bindings.
    ///
    /// Returns `false` when there was nothing to draw.
    pub fn draw_indexed(&mut self, draw: &DrawIndexedCommand) -> Result<bool, LogicError> {
        let vertex_input = self.bindings.vertex_input.ok_or(LogicError::NoVertexInput)?;
        if self.bindings.shader_stage.is_none() {
            return Err(LogicError::NoShaderStage);
        }
        let index_buffer = self
            .vertex_inputs
            .get(vertex_input)?
            .index_buffer()
            .ok_or(LogicError::NoIndexBuffer)?;
        let element_type = index_element_type(draw.index_byte_depth)?;
        if draw.index_byte_depth == 4 && !self.caps.uint32_index_available {
            return Err(LogicError::Uint32IndicesUnsupported);
        }

        let size = self.buffers.get(index_buffer)?.size();
        let range = draw
            .index_byte_range()
            .ok_or(LogicError::IndexRangeOutOfBounds {
                end: usize::MAX,
                size,
            })?;
        let out_of_bounds = LogicError::IndexRangeOutOfBounds {
            end: range.end,
            size,
        };
        if range.end > size {
            return Err(out_of_bounds);
        }
        if draw.vertex_count == 0 {
            return Ok(false);
        }

        let count = i32::try_from(draw.vertex_count).map_err(|_| out_of_bounds.clone())?;
        let offset = i32::try_from(range.start).map_err(|_| out_of_bounds)?;

        self.flush_bindings()?;
        self.gl
            .draw_elements(draw.topology.into_gl(), count, element_type, offset);
        Ok(true)
    }

    /// Releases every resource in dependency order.
    pub fn release_all(&mut self) {
        self.bindings = Bindings::default();
        self.vertex_inputs.clear();
        self.shader_stages.clear();
        self.shaders.clear();
        self.samplers.clear();
        self.textures.clear();
        self.buffers.clear();
    }
}

impl Drop for GlContext {
    fn drop(&mut self) {
        self.release_all();
        log::debug!("GlContext: Released all resources");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::gl::api::GlObjectKind;
    use crate::graphics::gl::recording::{GlCall, GlProfile, RecordingGl};
    use ren3d_core::renderer::api::command::PrimitiveTopology;
    use ren3d_core::renderer::api::core::ContextKind;
    use ren3d_core::renderer::api::resource::{
        BufferUsage, ShaderKind, VertexAttribute, VertexAttributeFormat, VertexAttributeSource,
    };

    fn caps(kind: ContextKind) -> DeviceCapabilities {
        let mut caps = DeviceCapabilities::baseline(kind);
        caps.vao_available = kind == ContextKind::Core;
        caps.uint32_index_available = kind != ContextKind::Es;
        caps.npot_available = true;
        caps
    }

    fn context_with(caps: DeviceCapabilities) -> (Rc<RecordingGl>, GlContext) {
        let recording = Rc::new(RecordingGl::new(GlProfile::new(3, 2, caps.is_es())));
        let gl: Rc<dyn GlApi> = recording.clone();
        let context = GlContext::new(gl, caps).unwrap();
        (recording, context)
    }

    fn context(kind: ContextKind) -> (Rc<RecordingGl>, GlContext) {
        context_with(caps(kind))
    }

    fn stage(context: &mut GlContext) -> ShaderStageId {
        let vertex = context
            .create_shader(&ShaderDescriptor {
                kind: ShaderKind::Vertex,
                source: "uniform mat4 u_mvp;\nvoid main() {}",
            })
            .unwrap();
        let fragment = context
            .create_shader(&ShaderDescriptor {
                kind: ShaderKind::Fragment,
                source: "uniform vec4 u_tint;\nvoid main() {}",
            })
            .unwrap();
        context
            .create_shader_stage(&ShaderStageDescriptor {
                vertex_shader: vertex,
                fragment_shader: fragment,
                input_bindings: &[],
            })
            .unwrap()
    }

    fn vertex_input(context: &mut GlContext, index_bytes: usize) -> VertexInputId {
        let vertices = context
            .create_buffer(&BufferDescriptor {
                kind: BufferKind::Vertex,
                usage: BufferUsage::StaticDraw,
                size: 64,
                data: None,
            })
            .unwrap();
        let indices = context
            .create_buffer(&BufferDescriptor {
                kind: BufferKind::Index,
                usage: BufferUsage::StaticDraw,
                size: index_bytes,
                data: None,
            })
            .unwrap();
        let attributes = [VertexAttribute {
            location: 0,
            source: VertexAttributeSource::Buffer {
                format: VertexAttributeFormat::Rg32Sfloat,
                vertex_buffer: vertices,
                offset: 0,
                stride: 8,
            },
        }];
        context
            .create_vertex_input(&VertexInputDescriptor {
                index_buffer: Some(indices),
                attributes: &attributes,
            })
            .unwrap()
    }

    fn triangles(count: usize, depth: usize) -> DrawIndexedCommand {
        DrawIndexedCommand {
            topology: PrimitiveTopology::TriangleList,
            vertex_count: count,
            index_byte_depth: depth,
            index_buffer_offset: 0,
            index_offset: 0,
        }
    }

    #[test]
    fn unchanged_state_never_reaches_the_driver() {
        let (gl, mut context) = context(ContextKind::Core);
        gl.clear_calls();

        context.set_blending(false);
        context.set_depth_write(true);
        context.set_blend_func(BlendFactor::One, BlendFactor::Zero);
        assert!(gl.calls().is_empty());

        context.set_blending(true);
        context.set_blending(true);
        assert_eq!(gl.calls(), vec![GlCall::Enable(glow::BLEND)]);
    }

    #[test]
    fn clear_forces_depth_writes_for_its_duration() {
        let (gl, mut context) = context(ContextKind::Core);
        context.set_depth_write(false);
        gl.clear_calls();

        context.clear(Rgba8::BLACK);

        assert_eq!(
            gl.calls(),
            vec![
                GlCall::ClearColor([0.0, 0.0, 0.0, 1.0]),
                GlCall::DepthMask(true),
                GlCall::Clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT),
                GlCall::DepthMask(false),
            ]
        );
    }

    #[test]
    fn draw_validation_follows_binding_order() {
        let (_gl, mut context) = context(ContextKind::Core);
        assert_eq!(context.draw_indexed(&triangles(3, 2)), Err(LogicError::NoVertexInput));

        let input = vertex_input(&mut context, 6);
        context.bind_vertex_input(Some(input)).unwrap();
        assert_eq!(context.draw_indexed(&triangles(3, 2)), Err(LogicError::NoShaderStage));

        let stage = stage(&mut context);
        context.bind_shader_stage(Some(stage)).unwrap();
        assert_eq!(
            context.draw_indexed(&triangles(3, 3)),
            Err(LogicError::InvalidIndexByteDepth(3))
        );
        assert_eq!(
            context.draw_indexed(&triangles(4, 2)),
            Err(LogicError::IndexRangeOutOfBounds { end: 8, size: 6 })
        );
        assert_eq!(context.draw_indexed(&triangles(3, 2)), Ok(true));
        assert_eq!(context.draw_indexed(&triangles(0, 2)), Ok(false));
    }

    #[test]
    fn overflowing_index_ranges_are_out_of_bounds() {
        // --- 1. ARRANGE ---
        let (_gl, mut context) = context(ContextKind::Core);
        let input = vertex_input(&mut context, 6);
        let stage = stage(&mut context);
        context.bind_vertex_input(Some(input)).unwrap();
        context.bind_shader_stage(Some(stage)).unwrap();

        let draw = DrawIndexedCommand {
            index_offset: usize::MAX,
            ..triangles(3, 2)
        };

        // --- 2. ACT ---
        let result = context.draw_indexed(&draw);

        // --- 3. ASSERT ---
        assert_eq!(
            result,
            Err(LogicError::IndexRangeOutOfBounds {
                end: usize::MAX,
                size: 6
            })
        );
    }

    #[test]
    fn negative_rectangles_are_rejected_before_the_driver() {
        // --- 1. ARRANGE ---
        let (gl, mut context) = context(ContextKind::Compatibility);
        gl.clear_calls();

        // --- 2. ACT ---
        let result = context.set_scissor_box(&ScissorBoxCommand {
            x: 0,
            y: 0,
            width: 16,
            height: -4,
        });

        // --- 3. ASSERT ---
        assert!(matches!(
            result,
            Err(LogicError::RectangleOutOfRange {
                command: CommandKind::ScissorBox,
                height: -4,
                ..
            })
        ));
        assert!(gl.calls().is_empty());
    }

    #[test]
    fn es_rejects_32_bit_indices() {
        let (_gl, mut context) = context(ContextKind::Es);
        let input = vertex_input(&mut context, 64);
        let stage = stage(&mut context);
        context.bind_vertex_input(Some(input)).unwrap();
        context.bind_shader_stage(Some(stage)).unwrap();

        assert_eq!(
            context.draw_indexed(&triangles(3, 4)),
            Err(LogicError::Uint32IndicesUnsupported)
        );
    }

    #[test]
    fn uniforms_require_the_bound_stage_and_matching_kind() {
        let (gl, mut context) = context(ContextKind::Core);
        let stage = stage(&mut context);
        let tint = context.find_uniform(stage, "u_tint", UniformKind::Vec4).unwrap();

        assert_eq!(
            context.set_uniform(tint, UniformValue::Vec4([1.0; 4])),
            Err(LogicError::UniformStageNotBound)
        );
        context.bind_shader_stage(Some(stage)).unwrap();
        assert_eq!(
            context.set_uniform(tint, UniformValue::Float32(1.0)),
            Err(LogicError::UniformKindMismatch {
                expected: UniformKind::Vec4,
                actual: UniformKind::Float32
            })
        );

        gl.clear_calls();
        context.set_uniform(tint, UniformValue::Vec4([0.5; 4])).unwrap();
        let program = context.shader_stages.get(stage).unwrap().name();
        assert_eq!(
            gl.calls(),
            vec![
                GlCall::UseProgram(Some(program)),
                GlCall::Uniform4F32(tint.location, [0.5; 4])
            ]
        );
    }

    #[test]
    fn separate_programs_take_uniforms_without_a_program_switch() {
        // --- 1. ARRANGE ---
        let mut caps = caps(ContextKind::Core);
        caps.sso_available = true;
        let (gl, mut context) = context_with(caps);
        let stage = stage(&mut context);
        let mvp = context.find_uniform(stage, "u_mvp", UniformKind::Mat4).unwrap();
        context.bind_shader_stage(Some(stage)).unwrap();
        gl.clear_calls();

        // --- 2. ACT ---
        context.set_uniform(mvp, UniformValue::Mat4([2.0; 16])).unwrap();

        // --- 3. ASSERT ---
        let program = context.shader_stages.get(stage).unwrap().name();
        assert_eq!(
            gl.calls(),
            vec![GlCall::ProgramUniformMatrix4F32(program, mvp.location, [2.0; 16])]
        );
    }

    #[test]
    fn direct_state_access_keeps_the_vertex_input_bound_across_index_updates() {
        // --- 1. ARRANGE ---
        let mut caps = caps(ContextKind::Core);
        caps.dsa_available = true;
        let (gl, mut context) = context_with(caps);
        let input = vertex_input(&mut context, 6);
        let stage = stage(&mut context);
        context.bind_vertex_input(Some(input)).unwrap();
        context.bind_shader_stage(Some(stage)).unwrap();
        context.draw_indexed(&triangles(3, 2)).unwrap();
        let indices = context.vertex_inputs.get(input).unwrap().index_buffer().unwrap();
        gl.clear_calls();

        // --- 2. ACT ---
        context.update_buffer(indices, 0, &[0; 6]).unwrap();
        context.draw_indexed(&triangles(3, 2)).unwrap();

        // --- 3. ASSERT ---
        assert_eq!(gl.count(|call| matches!(call, GlCall::BindVertexArray(_))), 0);
        assert_eq!(gl.count(|call| matches!(call, GlCall::NamedBufferSubData { .. })), 1);
    }

    #[test]
    fn destroying_bound_resources_unbinds_them() {
        let (_gl, mut context) = context(ContextKind::Core);
        let input = vertex_input(&mut context, 6);
        let stage = stage(&mut context);
        context.bind_vertex_input(Some(input)).unwrap();
        context.bind_shader_stage(Some(stage)).unwrap();

        context.destroy_vertex_input(input);
        context.destroy_vertex_input(input);

        assert_eq!(context.draw_indexed(&triangles(3, 2)), Err(LogicError::NoVertexInput));
        assert!(matches!(
            context.bind_vertex_input(Some(input)),
            Err(LogicError::UnknownResource { .. })
        ));
    }

    #[test]
    fn drop_releases_resources_in_dependency_order() {
        let (gl, mut context) = context(ContextKind::Core);
        let input = vertex_input(&mut context, 6);
        let _stage = stage(&mut context);
        context.bind_vertex_input(Some(input)).unwrap();
        assert!(gl.total_live_objects() > 0);

        drop(context);

        assert_eq!(gl.live_objects(GlObjectKind::Buffer), 0);
        assert_eq!(gl.live_objects(GlObjectKind::Program), 0);
        // The fallback VAO of a core profile goes last, with the context itself.
        assert_eq!(gl.total_live_objects(), 0);
        let deletes: Vec<GlObjectKind> = gl
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                GlCall::DeleteObject(kind, _) => Some(kind),
                _ => None,
            })
            .collect();
        let program_at = deletes.iter().position(|k| *k == GlObjectKind::Program).unwrap();
        let buffer_at = deletes.iter().position(|k| *k == GlObjectKind::Buffer).unwrap();
        assert!(program_at < buffer_at);
    }
}
