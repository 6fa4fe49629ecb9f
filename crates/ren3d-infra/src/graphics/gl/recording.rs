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

//! A headless [`GlApi`] that simulates a driver and records every call.
//!
//! [`RecordingGl`] answers queries from a configurable [`GlProfile`], hands out
//! object names, tracks which objects are alive and appends one [`GlCall`] per
//! state-changing call. Failures can be injected to exercise allocation and
//! device-loss paths. It backs the test suites and the demo binary.

use super::api::{GlApi, GlName, GlObjectKind, GlVersion};
use ren3d_core::renderer::DeviceKind;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::num::NonZeroU32;

/// Driver behaviour simulated by a [`RecordingGl`].
#[derive(Debug, Clone, PartialEq)]
pub struct GlProfile {
    /// Reported context version.
    pub version: GlVersion,
    /// Advertised extensions.
    pub extensions: HashSet<String>,
    /// `GL_VENDOR`.
    pub vendor: String,
    /// `GL_RENDERER`.
    pub renderer: String,
    /// `GL_MAX_TEXTURE_SIZE`.
    pub max_texture_size: i32,
    /// `GL_MAX_VIEWPORT_DIMS`.
    pub max_viewport_dims: [i32; 2],
    /// `GL_MAX_VERTEX_ATTRIBS`.
    pub max_vertex_attribs: i32,
    /// `GL_MAX_SAMPLES`.
    pub max_samples: i32,
    /// `GL_MAX_TEXTURE_MAX_ANISOTROPY`.
    pub max_anisotropy: f32,
    /// Whether the headless surface accepts swap interval changes.
    pub swap_control: bool,
    /// Optional entry points the loader fails to resolve.
    pub unresolved_entry_points: HashSet<String>,
}

impl GlProfile {
    /// A typical driver for each device kind.
    pub fn for_kind(kind: DeviceKind) -> Self {
        match kind {
            DeviceKind::Gl2_0 => Self::new(2, 0, false)
                .with_extension("GL_ARB_vertex_array_object")
                .with_extension("GL_ARB_framebuffer_object")
                .with_extension("GL_EXT_texture_filter_anisotropic"),
            DeviceKind::Gl3_2Core => {
                Self::new(3, 2, false).with_extension("GL_EXT_texture_filter_anisotropic")
            }
            DeviceKind::Gles2_0 => Self::new(2, 0, true),
        }
    }

    /// A driver of the given version with no extensions.
    pub fn new(major: u32, minor: u32, is_embedded: bool) -> Self {
        Self {
            version: GlVersion {
                major,
                minor,
                is_embedded,
            },
            extensions: HashSet::new(),
            vendor: String::from("ren3d"),
            renderer: String::from("headless"),
            max_texture_size: 8192,
            max_viewport_dims: [8192, 8192],
            max_vertex_attribs: 16,
            max_samples: if is_embedded { 0 } else { 8 },
            max_anisotropy: 16.0,
            swap_control: true,
            unresolved_entry_points: HashSet::new(),
        }
    }

    /// Adds an advertised extension.
    pub fn with_extension(mut self, name: &str) -> Self {
        self.extensions.insert(name.to_owned());
        self
    }

    /// Removes an advertised extension.
    pub fn without_extension(mut self, name: &str) -> Self {
        self.extensions.remove(name);
        self
    }

    /// Makes the optional entry point `name` unresolvable.
    pub fn without_entry_point(mut self, name: &str) -> Self {
        self.unresolved_entry_points.insert(name.to_owned());
        self
    }

    /// Replaces the reported version.
    pub fn with_version(mut self, major: u32, minor: u32) -> Self {
        self.version.major = major;
        self.version.minor = minor;
        self
    }

    fn version_string(&self) -> String {
        if self.version.is_embedded {
            format!("OpenGL ES {}.{} ren3d-headless", self.version.major, self.version.minor)
        } else {
            format!("{}.{} ren3d-headless", self.version.major, self.version.minor)
        }
    }
}

/// Calls after which an injected error code becomes pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorTrigger {
    /// `glBufferData` / `glBufferStorage`.
    BufferAllocation,
    /// `glTexImage2D`.
    TexImage2d,
    /// `glRenderbufferStorageMultisample`.
    RenderbufferStorage,
    /// `glDrawElements`.
    DrawElements,
}

/// One recorded call.
#[derive(Debug, Clone, PartialEq)]
pub enum GlCall {
    CreateObject(GlObjectKind, GlName),
    DeleteObject(GlObjectKind, GlName),
    Enable(u32),
    Disable(u32),
    Viewport([i32; 4]),
    DepthRange(f32, f32),
    Scissor([i32; 4]),
    ClearColor([f32; 4]),
    Clear(u32),
    DepthMask(bool),
    BlendFunc(u32, u32),
    CullFace(u32),
    FrontFace(u32),
    PixelStore(u32, i32),
    NamedBufferSubData {
        buffer: GlName,
        offset: i32,
        len: usize,
    },
    TextureSubImage2d {
        texture: GlName,
        level: i32,
        width: i32,
        height: i32,
        len: usize,
    },
    GenerateTextureMipmap(GlName),
    VertexArrayElementBuffer(GlName, Option<GlName>),
    ProgramUniform1I32(GlName, u32, i32),
    ProgramUniform1F32(GlName, u32, f32),
    ProgramUniform2F32(GlName, u32, [f32; 2]),
    ProgramUniform4F32(GlName, u32, [f32; 4]),
    ProgramUniformMatrix4F32(GlName, u32, [f32; 16]),
    BindBuffer(u32, Option<GlName>),
    BufferData {
        target: u32,
        size: i32,
        usage: u32,
    },
    BufferStorage {
        target: u32,
        size: i32,
        flags: u32,
    },
    BufferSubData {
        target: u32,
        offset: i32,
        len: usize,
    },
    ActiveTexture(u32),
    BindTexture(u32, Option<GlName>),
    TexImage2d {
        level: i32,
        internal_format: i32,
        width: i32,
        height: i32,
        has_data: bool,
    },
    TexSubImage2d {
        level: i32,
        width: i32,
        height: i32,
        len: usize,
    },
    TexParameterI32(u32, i32),
    TexParameterF32(u32, f32),
    GenerateMipmap(u32),
    BindSampler(u32, Option<GlName>),
    SamplerParameterI32(GlName, u32, i32),
    SamplerParameterF32(GlName, u32, f32),
    ShaderSource(GlName),
    CompileShader(GlName),
    AttachShader(GlName, GlName),
    DetachShader(GlName, GlName),
    BindAttribLocation(GlName, u32, String),
    LinkProgram(GlName),
    UseProgram(Option<GlName>),
    Uniform1I32(u32, i32),
    Uniform1F32(u32, f32),
    Uniform2F32(u32, [f32; 2]),
    Uniform4F32(u32, [f32; 4]),
    UniformMatrix4F32(u32, [f32; 16]),
    BindVertexArray(Option<GlName>),
    EnableVertexAttribArray(u32),
    DisableVertexAttribArray(u32),
    VertexAttribPointer {
        index: u32,
        size: i32,
        data_type: u32,
        normalized: bool,
        stride: i32,
        offset: i32,
    },
    VertexAttrib4F32(u32, [f32; 4]),
    DrawElements {
        mode: u32,
        count: i32,
        element_type: u32,
        offset: i32,
    },
    BindFramebuffer(u32, Option<GlName>),
    BindRenderbuffer(Option<GlName>),
    RenderbufferStorageMultisample {
        samples: i32,
        internal_format: u32,
        width: i32,
        height: i32,
    },
    FramebufferRenderbuffer {
        target: u32,
        attachment: u32,
        renderbuffer: Option<GlName>,
    },
    BlitFramebuffer {
        src: [i32; 4],
        dst: [i32; 4],
        mask: u32,
        filter: u32,
    },
    SwapInterval(i32),
    SwapBuffers,
}

#[derive(Debug, Default)]
struct ProgramState {
    attached: Vec<GlName>,
    uniforms: HashMap<String, u32>,
}

#[derive(Debug, Default)]
struct SimulatedState {
    calls: Vec<GlCall>,
    live: HashMap<GlName, GlObjectKind>,
    sources: HashMap<GlName, String>,
    programs: HashMap<GlName, ProgramState>,
    failing_allocations: HashSet<GlObjectKind>,
    injected_errors: HashMap<ErrorTrigger, u32>,
    fail_next_link: bool,
}

/// A simulated driver. See the module documentation.
#[derive(Debug)]
pub struct RecordingGl {
    profile: GlProfile,
    next_name: Cell<u32>,
    pending_error: Cell<u32>,
    sticky_error: Cell<Option<u32>>,
    state: RefCell<SimulatedState>,
}

impl RecordingGl {
    /// Creates a driver that behaves as `profile`.
    pub fn new(profile: GlProfile) -> Self {
        Self {
            profile,
            next_name: Cell::new(1),
            pending_error: Cell::new(glow::NO_ERROR),
            sticky_error: Cell::new(None),
            state: RefCell::new(SimulatedState::default()),
        }
    }

    /// The simulated profile.
    pub fn profile(&self) -> &GlProfile {
        &self.profile
    }

    /// A copy of every call recorded so far.
    pub fn calls(&self) -> Vec<GlCall> {
        self.state.borrow().calls.clone()
    }

    /// Recorded calls matching `predicate`.
    pub fn calls_matching(&self, predicate: impl Fn(&GlCall) -> bool) -> Vec<GlCall> {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|call| predicate(call))
            .cloned()
            .collect()
    }

    /// Number of recorded calls matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&GlCall) -> bool) -> usize {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|call| predicate(call))
            .count()
    }

    /// Forgets every recorded call. Object bookkeeping is kept.
    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    /// Number of live objects of `kind`.
    pub fn live_objects(&self, kind: GlObjectKind) -> usize {
        self.state
            .borrow()
            .live
            .values()
            .filter(|live| **live == kind)
            .count()
    }

    /// Number of live objects of any kind.
    pub fn total_live_objects(&self) -> usize {
        self.state.borrow().live.len()
    }

    /// Makes every later allocation of `kind` fail until [`RecordingGl::restore_allocations`].
    pub fn fail_allocations(&self, kind: GlObjectKind) {
        self.state.borrow_mut().failing_allocations.insert(kind);
    }

    /// Lets allocations of `kind` succeed again.
    pub fn restore_allocations(&self, kind: GlObjectKind) {
        self.state.borrow_mut().failing_allocations.remove(&kind);
    }

    /// Makes `code` pending right after the next call matching `trigger`.
    pub fn inject_error(&self, trigger: ErrorTrigger, code: u32) {
        self.state.borrow_mut().injected_errors.insert(trigger, code);
    }

    /// Makes every later `glGetError` return `code`, as a driver without a
    /// current context does.
    pub fn stick_error(&self, code: u32) {
        self.sticky_error.set(Some(code));
    }

    /// Makes the next `glLinkProgram` fail.
    pub fn fail_next_link(&self) {
        self.state.borrow_mut().fail_next_link = true;
    }

    /// Appends a call to the log. Used by headless surfaces sharing this driver.
    pub fn record(&self, call: GlCall) {
        self.state.borrow_mut().calls.push(call);
    }

    fn trigger(&self, trigger: ErrorTrigger) {
        let injected = self.state.borrow_mut().injected_errors.remove(&trigger);
        if let Some(code) = injected {
            self.pending_error.set(code);
        }
    }

    fn allocate_name(&self) -> GlName {
        let raw = self.next_name.get();
        self.next_name.set(raw + 1);
        // Names start at 1 and only grow.
        NonZeroU32::new(raw).unwrap_or(NonZeroU32::MIN)
    }
}

/// Collects `uniform <type> <name>;` declarations in declaration order.
fn declared_uniforms(source: &str) -> Vec<String> {
    source
        .split(';')
        .filter_map(|statement| {
            let mut tokens = statement.split_whitespace().skip_while(|t| *t != "uniform");
            tokens.next()?;
            let name = tokens.last()?;
            let name = name.split('[').next().unwrap_or(name);
            (!name.is_empty()).then(|| name.to_owned())
        })
        .collect()
}

impl GlApi for RecordingGl {
    fn version(&self) -> GlVersion {
        self.profile.version
    }

    fn has_extension(&self, name: &str) -> bool {
        self.profile.extensions.contains(name)
    }

    fn has_entry_point(&self, name: &str) -> bool {
        !self.profile.unresolved_entry_points.contains(name)
    }

    fn get_string(&self, name: u32) -> String {
        match name {
            glow::VENDOR => self.profile.vendor.clone(),
            glow::RENDERER => self.profile.renderer.clone(),
            glow::VERSION => self.profile.version_string(),
            _ => String::new(),
        }
    }

    fn get_integer(&self, name: u32) -> i32 {
        match name {
            glow::MAX_TEXTURE_SIZE => self.profile.max_texture_size,
            glow::MAX_VERTEX_ATTRIBS => self.profile.max_vertex_attribs,
            glow::MAX_SAMPLES => self.profile.max_samples,
            _ => 0,
        }
    }

    fn get_integers(&self, name: u32, out: &mut [i32]) {
        if name == glow::MAX_VIEWPORT_DIMS {
            for (slot, value) in out.iter_mut().zip(self.profile.max_viewport_dims) {
                *slot = value;
            }
        } else {
            out.fill(0);
        }
    }

    fn get_float(&self, name: u32) -> f32 {
        match name {
            super::conversions::MAX_TEXTURE_MAX_ANISOTROPY => self.profile.max_anisotropy,
            _ => 0.0,
        }
    }

    fn get_error(&self) -> u32 {
        match self.sticky_error.get() {
            Some(code) => code,
            None => self.pending_error.replace(glow::NO_ERROR),
        }
    }

    fn create_object(&self, kind: GlObjectKind) -> Result<GlName, String> {
        if self.state.borrow().failing_allocations.contains(&kind) {
            return Err(format!("simulated allocation failure for {kind:?}"));
        }
        let name = self.allocate_name();
        let mut state = self.state.borrow_mut();
        state.live.insert(name, kind);
        if kind == GlObjectKind::Program {
            state.programs.insert(name, ProgramState::default());
        }
        state.calls.push(GlCall::CreateObject(kind, name));
        Ok(name)
    }

    fn delete_object(&self, kind: GlObjectKind, name: GlName) {
        let mut state = self.state.borrow_mut();
        if state.live.remove(&name).is_some() {
            state.sources.remove(&name);
            state.programs.remove(&name);
        } else {
            log::warn!("RecordingGl: deleting unknown {kind:?} {name}");
        }
        state.calls.push(GlCall::DeleteObject(kind, name));
    }

    fn enable(&self, capability: u32) {
        self.record(GlCall::Enable(capability));
    }

    fn disable(&self, capability: u32) {
        self.record(GlCall::Disable(capability));
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.record(GlCall::Viewport([x, y, width, height]));
    }

    fn depth_range(&self, near: f32, far: f32) {
        self.record(GlCall::DepthRange(near, far));
    }

    fn scissor(&self, x: i32, y: i32, width: i32, height: i32) {
        self.record(GlCall::Scissor([x, y, width, height]));
    }

    fn clear_color(&self, red: f32, green: f32, blue: f32, alpha: f32) {
        self.record(GlCall::ClearColor([red, green, blue, alpha]));
    }

    fn clear(&self, mask: u32) {
        self.record(GlCall::Clear(mask));
    }

    fn depth_mask(&self, enabled: bool) {
        self.record(GlCall::DepthMask(enabled));
    }

    fn blend_func(&self, src: u32, dst: u32) {
        self.record(GlCall::BlendFunc(src, dst));
    }

    fn cull_face(&self, mode: u32) {
        self.record(GlCall::CullFace(mode));
    }

    fn front_face(&self, mode: u32) {
        self.record(GlCall::FrontFace(mode));
    }

    fn pixel_store_i32(&self, parameter: u32, value: i32) {
        self.record(GlCall::PixelStore(parameter, value));
    }

    fn bind_buffer(&self, target: u32, buffer: Option<GlName>) {
        self.record(GlCall::BindBuffer(target, buffer));
    }

    fn buffer_data_size(&self, target: u32, size: i32, usage: u32) {
        self.record(GlCall::BufferData {
            target,
            size,
            usage,
        });
        self.trigger(ErrorTrigger::BufferAllocation);
    }

    fn buffer_storage(&self, target: u32, size: i32, flags: u32) {
        self.record(GlCall::BufferStorage {
            target,
            size,
            flags,
        });
        self.trigger(ErrorTrigger::BufferAllocation);
    }

    fn buffer_sub_data(&self, target: u32, offset: i32, data: &[u8]) {
        self.record(GlCall::BufferSubData {
            target,
            offset,
            len: data.len(),
        });
    }

    fn active_texture(&self, unit: u32) {
        self.record(GlCall::ActiveTexture(unit));
    }

    fn bind_texture(&self, target: u32, texture: Option<GlName>) {
        self.record(GlCall::BindTexture(target, texture));
    }

    fn tex_image_2d(
        &self,
        _target: u32,
        level: i32,
        internal_format: i32,
        width: i32,
        height: i32,
        _format: u32,
        _ty: u32,
        pixels: Option<&[u8]>,
    ) {
        self.record(GlCall::TexImage2d {
            level,
            internal_format,
            width,
            height,
            has_data: pixels.is_some(),
        });
        self.trigger(ErrorTrigger::TexImage2d);
    }

    fn tex_sub_image_2d(
        &self,
        _target: u32,
        level: i32,
        _x_offset: i32,
        _y_offset: i32,
        width: i32,
        height: i32,
        _format: u32,
        _ty: u32,
        pixels: &[u8],
    ) {
        self.record(GlCall::TexSubImage2d {
            level,
            width,
            height,
            len: pixels.len(),
        });
    }

    fn tex_parameter_i32(&self, _target: u32, parameter: u32, value: i32) {
        self.record(GlCall::TexParameterI32(parameter, value));
    }

    fn tex_parameter_f32(&self, _target: u32, parameter: u32, value: f32) {
        self.record(GlCall::TexParameterF32(parameter, value));
    }

    fn generate_mipmap(&self, target: u32) {
        self.record(GlCall::GenerateMipmap(target));
    }

    fn bind_sampler(&self, unit: u32, sampler: Option<GlName>) {
        self.record(GlCall::BindSampler(unit, sampler));
    }

    fn sampler_parameter_i32(&self, sampler: GlName, parameter: u32, value: i32) {
        self.record(GlCall::SamplerParameterI32(sampler, parameter, value));
    }

    fn sampler_parameter_f32(&self, sampler: GlName, parameter: u32, value: f32) {
        self.record(GlCall::SamplerParameterF32(sampler, parameter, value));
    }

    fn shader_source(&self, shader: GlName, source: &str) {
        let mut state = self.state.borrow_mut();
        state.sources.insert(shader, source.to_owned());
        state.calls.push(GlCall::ShaderSource(shader));
    }

    fn compile_shader(&self, shader: GlName) {
        self.record(GlCall::CompileShader(shader));
    }

    fn shader_compile_status(&self, shader: GlName) -> bool {
        self.state
            .borrow()
            .sources
            .get(&shader)
            .is_some_and(|source| !source.contains("#error"))
    }

    fn shader_info_log(&self, shader: GlName) -> String {
        match self.state.borrow().sources.get(&shader) {
            Some(source) if source.contains("#error") => {
                String::from("0:1(1): error: #error directive encountered")
            }
            Some(_) => String::new(),
            None => String::from("error: shader has no source"),
        }
    }

    fn attach_shader(&self, program: GlName, shader: GlName) {
        let mut state = self.state.borrow_mut();
        if let Some(entry) = state.programs.get_mut(&program) {
            entry.attached.push(shader);
        }
        state.calls.push(GlCall::AttachShader(program, shader));
    }

    fn detach_shader(&self, program: GlName, shader: GlName) {
        let mut state = self.state.borrow_mut();
        if let Some(entry) = state.programs.get_mut(&program) {
            entry.attached.retain(|attached| *attached != shader);
        }
        state.calls.push(GlCall::DetachShader(program, shader));
    }

    fn bind_attrib_location(&self, program: GlName, index: u32, name: &str) {
        self.record(GlCall::BindAttribLocation(program, index, name.to_owned()));
    }

    fn link_program(&self, program: GlName) {
        let mut state = self.state.borrow_mut();
        state.calls.push(GlCall::LinkProgram(program));
        if std::mem::take(&mut state.fail_next_link) {
            state.programs.remove(&program);
            return;
        }

        let attached = state
            .programs
            .get(&program)
            .map(|entry| entry.attached.clone())
            .unwrap_or_default();
        let mut uniforms = HashMap::new();
        for shader in attached {
            if let Some(source) = state.sources.get(&shader) {
                for name in declared_uniforms(source) {
                    let next = uniforms.len() as u32;
                    uniforms.entry(name).or_insert(next);
                }
            }
        }
        if let Some(entry) = state.programs.get_mut(&program) {
            entry.uniforms = uniforms;
        }
    }

    fn program_link_status(&self, program: GlName) -> bool {
        self.state.borrow().programs.contains_key(&program)
    }

    fn program_info_log(&self, program: GlName) -> String {
        if self.program_link_status(program) {
            String::new()
        } else {
            String::from("error: simulated link failure")
        }
    }

    fn use_program(&self, program: Option<GlName>) {
        self.record(GlCall::UseProgram(program));
    }

    fn uniform_location(&self, program: GlName, name: &str) -> Option<u32> {
        self.state
            .borrow()
            .programs
            .get(&program)
            .and_then(|entry| entry.uniforms.get(name).copied())
    }

    fn uniform_1_i32(&self, location: u32, value: i32) {
        self.record(GlCall::Uniform1I32(location, value));
    }

    fn uniform_1_f32(&self, location: u32, value: f32) {
        self.record(GlCall::Uniform1F32(location, value));
    }

    fn uniform_2_f32(&self, location: u32, value: [f32; 2]) {
        self.record(GlCall::Uniform2F32(location, value));
    }

    fn uniform_4_f32(&self, location: u32, value: [f32; 4]) {
        self.record(GlCall::Uniform4F32(location, value));
    }

    fn uniform_matrix_4_f32(&self, location: u32, value: &[f32; 16]) {
        self.record(GlCall::UniformMatrix4F32(location, *value));
    }

    fn bind_vertex_array(&self, vertex_array: Option<GlName>) {
        self.record(GlCall::BindVertexArray(vertex_array));
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        self.record(GlCall::EnableVertexAttribArray(index));
    }

    fn disable_vertex_attrib_array(&self, index: u32) {
        self.record(GlCall::DisableVertexAttribArray(index));
    }

    fn vertex_attrib_pointer(
        &self,
        index: u32,
        size: i32,
        data_type: u32,
        normalized: bool,
        stride: i32,
        offset: i32,
    ) {
        self.record(GlCall::VertexAttribPointer {
            index,
            size,
            data_type,
            normalized,
            stride,
            offset,
        });
    }

    fn vertex_attrib_4_f32(&self, index: u32, value: [f32; 4]) {
        self.record(GlCall::VertexAttrib4F32(index, value));
    }

    fn draw_elements(&self, mode: u32, count: i32, element_type: u32, offset: i32) {
        self.record(GlCall::DrawElements {
            mode,
            count,
            element_type,
            offset,
        });
        self.trigger(ErrorTrigger::DrawElements);
    }

    fn named_buffer_sub_data(&self, buffer: GlName, offset: i32, data: &[u8]) {
        self.record(GlCall::NamedBufferSubData {
            buffer,
            offset,
            len: data.len(),
        });
    }

    fn texture_sub_image_2d(
        &self,
        texture: GlName,
        level: i32,
        _x_offset: i32,
        _y_offset: i32,
        width: i32,
        height: i32,
        _format: u32,
        _ty: u32,
        pixels: &[u8],
    ) {
        self.record(GlCall::TextureSubImage2d {
            texture,
            level,
            width,
            height,
            len: pixels.len(),
        });
    }

    fn generate_texture_mipmap(&self, texture: GlName) {
        self.record(GlCall::GenerateTextureMipmap(texture));
    }

    fn vertex_array_element_buffer(&self, vertex_array: GlName, buffer: Option<GlName>) {
        self.record(GlCall::VertexArrayElementBuffer(vertex_array, buffer));
    }

    fn program_uniform_1_i32(&self, program: GlName, location: u32, value: i32) {
        self.record(GlCall::ProgramUniform1I32(program, location, value));
    }

    fn program_uniform_1_f32(&self, program: GlName, location: u32, value: f32) {
        self.record(GlCall::ProgramUniform1F32(program, location, value));
    }

    fn program_uniform_2_f32(&self, program: GlName, location: u32, value: [f32; 2]) {
        self.record(GlCall::ProgramUniform2F32(program, location, value));
    }

    fn program_uniform_4_f32(&self, program: GlName, location: u32, value: [f32; 4]) {
        self.record(GlCall::ProgramUniform4F32(program, location, value));
    }

    fn program_uniform_matrix_4_f32(&self, program: GlName, location: u32, value: &[f32; 16]) {
        self.record(GlCall::ProgramUniformMatrix4F32(program, location, *value));
    }

    fn bind_framebuffer(&self, target: u32, framebuffer: Option<GlName>) {
        self.record(GlCall::BindFramebuffer(target, framebuffer));
    }

    fn bind_renderbuffer(&self, renderbuffer: Option<GlName>) {
        self.record(GlCall::BindRenderbuffer(renderbuffer));
    }

    fn renderbuffer_storage_multisample(
        &self,
        samples: i32,
        internal_format: u32,
        width: i32,
        height: i32,
    ) {
        self.record(GlCall::RenderbufferStorageMultisample {
            samples,
            internal_format,
            width,
            height,
        });
        self.trigger(ErrorTrigger::RenderbufferStorage);
    }

    fn framebuffer_renderbuffer(&self, target: u32, attachment: u32, renderbuffer: Option<GlName>) {
        self.record(GlCall::FramebufferRenderbuffer {
            target,
            attachment,
            renderbuffer,
        });
    }

    fn check_framebuffer_status(&self, _target: u32) -> u32 {
        glow::FRAMEBUFFER_COMPLETE
    }

    fn blit_framebuffer(&self, src: [i32; 4], dst: [i32; 4], mask: u32, filter: u32) {
        self.record(GlCall::BlitFramebuffer {
            src,
            dst,
            mask,
            filter,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_declarations_are_collected_in_order() {
        let source =
            "uniform mat4 u_model_view;\nuniform highp float u_shading[2];\nvoid main() {}";
        assert_eq!(
            declared_uniforms(source),
            vec![String::from("u_model_view"), String::from("u_shading")]
        );
    }

    #[test]
    fn names_are_tracked_until_deleted() {
        let gl = RecordingGl::new(GlProfile::for_kind(DeviceKind::Gl3_2Core));

        let first = gl.create_object(GlObjectKind::Buffer).unwrap();
        let second = gl.create_object(GlObjectKind::Texture).unwrap();
        assert_ne!(first, second);
        assert_eq!(gl.total_live_objects(), 2);

        gl.delete_object(GlObjectKind::Buffer, first);
        assert_eq!(gl.live_objects(GlObjectKind::Buffer), 0);
        assert_eq!(gl.live_objects(GlObjectKind::Texture), 1);
    }

    #[test]
    fn injected_errors_fire_once_after_their_trigger() {
        let gl = RecordingGl::new(GlProfile::for_kind(DeviceKind::Gl2_0));
        gl.inject_error(ErrorTrigger::TexImage2d, glow::OUT_OF_MEMORY);

        assert_eq!(gl.get_error(), glow::NO_ERROR, "not triggered yet");
        gl.tex_image_2d(glow::TEXTURE_2D, 0, 0, 1, 1, 0, 0, None);
        assert_eq!(gl.get_error(), glow::OUT_OF_MEMORY);
        assert_eq!(gl.get_error(), glow::NO_ERROR);
    }

    #[test]
    fn sticky_errors_never_clear() {
        // --- 1. ARRANGE ---
        let gl = RecordingGl::new(GlProfile::for_kind(DeviceKind::Gl3_2Core));
        gl.stick_error(glow::INVALID_OPERATION);

        // --- 2. ACT ---
        let codes: Vec<u32> = (0..3).map(|_| gl.get_error()).collect();

        // --- 3. ASSERT ---
        assert_eq!(codes, vec![glow::INVALID_OPERATION; 3]);
    }
}
