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

//! [`GlApi`] on top of a live `glow` context.
//!
//! Every GL call is `unsafe` in `glow` because the driver cannot check that the
//! context is current or that object names are alive. Those invariants are
//! upheld one level up: the context is current on the thread that owns the
//! device, and names only ever come from the RAII owners in the managers.

use super::api::{GlApi, GlName, GlObjectKind, GlVersion};
use glow::HasContext;
use std::ffi::c_void;

type NamedBufferSubData = unsafe extern "system" fn(u32, isize, isize, *const c_void);
type TextureSubImage2d =
    unsafe extern "system" fn(u32, i32, i32, i32, i32, i32, u32, u32, *const c_void);
type GenerateTextureMipmap = unsafe extern "system" fn(u32);
type VertexArrayElementBuffer = unsafe extern "system" fn(u32, u32);
type ProgramUniform1i = unsafe extern "system" fn(u32, i32, i32);
type ProgramUniform1f = unsafe extern "system" fn(u32, i32, f32);
type ProgramUniformNfv = unsafe extern "system" fn(u32, i32, i32, *const f32);
type ProgramUniformMatrix4fv = unsafe extern "system" fn(u32, i32, i32, u8, *const f32);

// Entry points `glow` 0.13 does not wrap, resolved through the same loader.
#[derive(Default)]
struct ExtraEntryPoints {
    named_buffer_sub_data: Option<NamedBufferSubData>,
    texture_sub_image_2d: Option<TextureSubImage2d>,
    generate_texture_mipmap: Option<GenerateTextureMipmap>,
    vertex_array_element_buffer: Option<VertexArrayElementBuffer>,
    program_uniform_1i: Option<ProgramUniform1i>,
    program_uniform_1f: Option<ProgramUniform1f>,
    program_uniform_2fv: Option<ProgramUniformNfv>,
    program_uniform_4fv: Option<ProgramUniformNfv>,
    program_uniform_matrix_4fv: Option<ProgramUniformMatrix4fv>,
}

/// # Safety
/// `T` must be an `extern "system"` function pointer type matching the
/// native signature of `name`.
unsafe fn resolve<T: Copy>(loader: &mut dyn FnMut(&str) -> *const c_void, name: &str) -> Option<T> {
    debug_assert_eq!(std::mem::size_of::<T>(), std::mem::size_of::<*const c_void>());
    let pointer = loader(name);
    if pointer.is_null() {
        None
    } else {
        Some(std::mem::transmute_copy::<*const c_void, T>(&pointer))
    }
}

impl ExtraEntryPoints {
    unsafe fn load(loader: &mut dyn FnMut(&str) -> *const c_void) -> Self {
        Self {
            named_buffer_sub_data: resolve(loader, "glNamedBufferSubData"),
            texture_sub_image_2d: resolve(loader, "glTextureSubImage2D"),
            generate_texture_mipmap: resolve(loader, "glGenerateTextureMipmap"),
            vertex_array_element_buffer: resolve(loader, "glVertexArrayElementBuffer"),
            program_uniform_1i: resolve(loader, "glProgramUniform1i"),
            program_uniform_1f: resolve(loader, "glProgramUniform1f"),
            program_uniform_2fv: resolve(loader, "glProgramUniform2fv"),
            program_uniform_4fv: resolve(loader, "glProgramUniform4fv"),
            program_uniform_matrix_4fv: resolve(loader, "glProgramUniformMatrix4fv"),
        }
    }

    fn contains(&self, name: &str) -> bool {
        match name {
            "glNamedBufferSubData" => self.named_buffer_sub_data.is_some(),
            "glTextureSubImage2D" => self.texture_sub_image_2d.is_some(),
            "glGenerateTextureMipmap" => self.generate_texture_mipmap.is_some(),
            "glVertexArrayElementBuffer" => self.vertex_array_element_buffer.is_some(),
            "glProgramUniform1i" => self.program_uniform_1i.is_some(),
            "glProgramUniform1f" => self.program_uniform_1f.is_some(),
            "glProgramUniform2fv" => self.program_uniform_2fv.is_some(),
            "glProgramUniform4fv" => self.program_uniform_4fv.is_some(),
            "glProgramUniformMatrix4fv" => self.program_uniform_matrix_4fv.is_some(),
            _ => false,
        }
    }
}

/// A `glow::Context` behind the [`GlApi`] boundary.
pub struct GlowApi {
    gl: glow::Context,
    extra: ExtraEntryPoints,
}

impl std::fmt::Debug for GlowApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlowApi")
            .field("version", &self.version())
            .finish()
    }
}

impl GlowApi {
    /// Wraps an existing `glow` context.
    ///
    /// No optional entry points are resolved, so the device never selects the
    /// direct-state-access or separate-program paths.
    pub fn new(gl: glow::Context) -> Self {
        Self {
            gl,
            extra: ExtraEntryPoints::default(),
        }
    }

    /// Loads GL entry points through the host's loader (e.g. `SDL_GL_GetProcAddress`).
    ///
    /// # Safety
    /// A context must be current on the calling thread and `loader` must
    /// return valid function pointers (or null) for it.
    pub unsafe fn from_loader_function<F>(mut loader: F) -> Self
    where
        F: FnMut(&str) -> *const c_void,
    {
        let gl = glow::Context::from_loader_function(&mut loader);
        let extra = ExtraEntryPoints::load(&mut loader);
        Self { gl, extra }
    }

    /// Returns the wrapped context.
    pub fn into_inner(self) -> glow::Context {
        self.gl
    }
}

fn missing(name: &str) {
    log::error!("GlowApi: {name} was called but never resolved");
}

fn buffer(name: Option<GlName>) -> Option<glow::Buffer> {
    name.map(glow::NativeBuffer)
}

fn texture(name: Option<GlName>) -> Option<glow::Texture> {
    name.map(glow::NativeTexture)
}

fn program(name: Option<GlName>) -> Option<glow::Program> {
    name.map(glow::NativeProgram)
}

fn location(location: u32) -> glow::UniformLocation {
    glow::NativeUniformLocation(location)
}

impl GlApi for GlowApi {
    fn version(&self) -> GlVersion {
        let version = self.gl.version();
        GlVersion {
            major: version.major,
            minor: version.minor,
            is_embedded: version.is_embedded,
        }
    }

    fn has_extension(&self, name: &str) -> bool {
        self.gl.supported_extensions().contains(name)
    }

    fn has_entry_point(&self, name: &str) -> bool {
        self.extra.contains(name)
    }

    fn get_string(&self, name: u32) -> String {
        unsafe { self.gl.get_parameter_string(name) }
    }

    fn get_integer(&self, name: u32) -> i32 {
        unsafe { self.gl.get_parameter_i32(name) }
    }

    fn get_integers(&self, name: u32, out: &mut [i32]) {
        unsafe { self.gl.get_parameter_i32_slice(name, out) }
    }

    fn get_float(&self, name: u32) -> f32 {
        unsafe { self.gl.get_parameter_f32(name) }
    }

    fn get_error(&self) -> u32 {
        unsafe { self.gl.get_error() }
    }

    fn create_object(&self, kind: GlObjectKind) -> Result<GlName, String> {
        unsafe {
            match kind {
                GlObjectKind::Buffer => self.gl.create_buffer().map(|o| o.0),
                GlObjectKind::Texture => self.gl.create_texture().map(|o| o.0),
                GlObjectKind::Sampler => self.gl.create_sampler().map(|o| o.0),
                GlObjectKind::VertexShader => {
                    self.gl.create_shader(glow::VERTEX_SHADER).map(|o| o.0)
                }
                GlObjectKind::FragmentShader => {
                    self.gl.create_shader(glow::FRAGMENT_SHADER).map(|o| o.0)
                }
                GlObjectKind::Program => self.gl.create_program().map(|o| o.0),
                GlObjectKind::VertexArray => self.gl.create_vertex_array().map(|o| o.0),
                GlObjectKind::Framebuffer => self.gl.create_framebuffer().map(|o| o.0),
                GlObjectKind::Renderbuffer => self.gl.create_renderbuffer().map(|o| o.0),
            }
        }
    }

    fn delete_object(&self, kind: GlObjectKind, name: GlName) {
        unsafe {
            match kind {
                GlObjectKind::Buffer => self.gl.delete_buffer(glow::NativeBuffer(name)),
                GlObjectKind::Texture => self.gl.delete_texture(glow::NativeTexture(name)),
                GlObjectKind::Sampler => self.gl.delete_sampler(glow::NativeSampler(name)),
                GlObjectKind::VertexShader | GlObjectKind::FragmentShader => {
                    self.gl.delete_shader(glow::NativeShader(name))
                }
                GlObjectKind::Program => self.gl.delete_program(glow::NativeProgram(name)),
                GlObjectKind::VertexArray => {
                    self.gl.delete_vertex_array(glow::NativeVertexArray(name))
                }
                GlObjectKind::Framebuffer => {
                    self.gl.delete_framebuffer(glow::NativeFramebuffer(name))
                }
                GlObjectKind::Renderbuffer => {
                    self.gl.delete_renderbuffer(glow::NativeRenderbuffer(name))
                }
            }
        }
    }

    fn enable(&self, capability: u32) {
        unsafe { self.gl.enable(capability) }
    }

    fn disable(&self, capability: u32) {
        unsafe { self.gl.disable(capability) }
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { self.gl.viewport(x, y, width, height) }
    }

    fn depth_range(&self, near: f32, far: f32) {
        unsafe { self.gl.depth_range_f32(near, far) }
    }

    fn scissor(&self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { self.gl.scissor(x, y, width, height) }
    }

    fn clear_color(&self, red: f32, green: f32, blue: f32, alpha: f32) {
        unsafe { self.gl.clear_color(red, green, blue, alpha) }
    }

    fn clear(&self, mask: u32) {
        unsafe { self.gl.clear(mask) }
    }

    fn depth_mask(&self, enabled: bool) {
        unsafe { self.gl.depth_mask(enabled) }
    }

    fn blend_func(&self, src: u32, dst: u32) {
        unsafe { self.gl.blend_func(src, dst) }
    }

    fn cull_face(&self, mode: u32) {
        unsafe { self.gl.cull_face(mode) }
    }

    fn front_face(&self, mode: u32) {
        unsafe { self.gl.front_face(mode) }
    }

    fn pixel_store_i32(&self, parameter: u32, value: i32) {
        unsafe { self.gl.pixel_store_i32(parameter, value) }
    }

    fn bind_buffer(&self, target: u32, name: Option<GlName>) {
        unsafe { self.gl.bind_buffer(target, buffer(name)) }
    }

    fn buffer_data_size(&self, target: u32, size: i32, usage: u32) {
        unsafe { self.gl.buffer_data_size(target, size, usage) }
    }

    fn buffer_storage(&self, target: u32, size: i32, flags: u32) {
        unsafe { self.gl.buffer_storage(target, size, None, flags) }
    }

    fn buffer_sub_data(&self, target: u32, offset: i32, data: &[u8]) {
        unsafe { self.gl.buffer_sub_data_u8_slice(target, offset, data) }
    }

    fn active_texture(&self, unit: u32) {
        unsafe { self.gl.active_texture(unit) }
    }

    fn bind_texture(&self, target: u32, name: Option<GlName>) {
        unsafe { self.gl.bind_texture(target, texture(name)) }
    }

    fn tex_image_2d(
        &self,
        target: u32,
        level: i32,
        internal_format: i32,
        width: i32,
        height: i32,
        format: u32,
        ty: u32,
        pixels: Option<&[u8]>,
    ) {
        unsafe {
            self.gl.tex_image_2d(
                target,
                level,
                internal_format,
                width,
                height,
                0,
                format,
                ty,
                pixels,
            )
        }
    }

    fn tex_sub_image_2d(
        &self,
        target: u32,
        level: i32,
        x_offset: i32,
        y_offset: i32,
        width: i32,
        height: i32,
        format: u32,
        ty: u32,
        pixels: &[u8],
    ) {
        unsafe {
            self.gl.tex_sub_image_2d(
                target,
                level,
                x_offset,
                y_offset,
                width,
                height,
                format,
                ty,
                glow::PixelUnpackData::Slice(pixels),
            )
        }
    }

    fn tex_parameter_i32(&self, target: u32, parameter: u32, value: i32) {
        unsafe { self.gl.tex_parameter_i32(target, parameter, value) }
    }

    fn tex_parameter_f32(&self, target: u32, parameter: u32, value: f32) {
        unsafe { self.gl.tex_parameter_f32(target, parameter, value) }
    }

    fn generate_mipmap(&self, target: u32) {
        unsafe { self.gl.generate_mipmap(target) }
    }

    fn bind_sampler(&self, unit: u32, sampler: Option<GlName>) {
        unsafe { self.gl.bind_sampler(unit, sampler.map(glow::NativeSampler)) }
    }

    fn sampler_parameter_i32(&self, sampler: GlName, parameter: u32, value: i32) {
        unsafe {
            self.gl
                .sampler_parameter_i32(glow::NativeSampler(sampler), parameter, value)
        }
    }

    fn sampler_parameter_f32(&self, sampler: GlName, parameter: u32, value: f32) {
        unsafe {
            self.gl
                .sampler_parameter_f32(glow::NativeSampler(sampler), parameter, value)
        }
    }

    fn shader_source(&self, shader: GlName, source: &str) {
        unsafe { self.gl.shader_source(glow::NativeShader(shader), source) }
    }

    fn compile_shader(&self, shader: GlName) {
        unsafe { self.gl.compile_shader(glow::NativeShader(shader)) }
    }

    fn shader_compile_status(&self, shader: GlName) -> bool {
        unsafe { self.gl.get_shader_compile_status(glow::NativeShader(shader)) }
    }

    fn shader_info_log(&self, shader: GlName) -> String {
        unsafe { self.gl.get_shader_info_log(glow::NativeShader(shader)) }
    }

    fn attach_shader(&self, program: GlName, shader: GlName) {
        unsafe {
            self.gl
                .attach_shader(glow::NativeProgram(program), glow::NativeShader(shader))
        }
    }

    fn detach_shader(&self, program: GlName, shader: GlName) {
        unsafe {
            self.gl
                .detach_shader(glow::NativeProgram(program), glow::NativeShader(shader))
        }
    }

    fn bind_attrib_location(&self, program: GlName, index: u32, name: &str) {
        unsafe {
            self.gl
                .bind_attrib_location(glow::NativeProgram(program), index, name)
        }
    }

    fn link_program(&self, program: GlName) {
        unsafe { self.gl.link_program(glow::NativeProgram(program)) }
    }

    fn program_link_status(&self, program: GlName) -> bool {
        unsafe { self.gl.get_program_link_status(glow::NativeProgram(program)) }
    }

    fn program_info_log(&self, program: GlName) -> String {
        unsafe { self.gl.get_program_info_log(glow::NativeProgram(program)) }
    }

    fn use_program(&self, name: Option<GlName>) {
        unsafe { self.gl.use_program(program(name)) }
    }

    fn uniform_location(&self, program: GlName, name: &str) -> Option<u32> {
        unsafe {
            self.gl
                .get_uniform_location(glow::NativeProgram(program), name)
                .map(|location| location.0)
        }
    }

    fn uniform_1_i32(&self, index: u32, value: i32) {
        unsafe { self.gl.uniform_1_i32(Some(&location(index)), value) }
    }

    fn uniform_1_f32(&self, index: u32, value: f32) {
        unsafe { self.gl.uniform_1_f32(Some(&location(index)), value) }
    }

    fn uniform_2_f32(&self, index: u32, [x, y]: [f32; 2]) {
        unsafe { self.gl.uniform_2_f32(Some(&location(index)), x, y) }
    }

    fn uniform_4_f32(&self, index: u32, [x, y, z, w]: [f32; 4]) {
        unsafe { self.gl.uniform_4_f32(Some(&location(index)), x, y, z, w) }
    }

    fn uniform_matrix_4_f32(&self, index: u32, value: &[f32; 16]) {
        unsafe {
            self.gl
                .uniform_matrix_4_f32_slice(Some(&location(index)), false, value)
        }
    }

    fn bind_vertex_array(&self, vertex_array: Option<GlName>) {
        unsafe {
            self.gl
                .bind_vertex_array(vertex_array.map(glow::NativeVertexArray))
        }
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        unsafe { self.gl.enable_vertex_attrib_array(index) }
    }

    fn disable_vertex_attrib_array(&self, index: u32) {
        unsafe { self.gl.disable_vertex_attrib_array(index) }
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
        unsafe {
            self.gl
                .vertex_attrib_pointer_f32(index, size, data_type, normalized, stride, offset)
        }
    }

    fn vertex_attrib_4_f32(&self, index: u32, [x, y, z, w]: [f32; 4]) {
        unsafe { self.gl.vertex_attrib_4_f32(index, x, y, z, w) }
    }

    fn draw_elements(&self, mode: u32, count: i32, element_type: u32, offset: i32) {
        unsafe { self.gl.draw_elements(mode, count, element_type, offset) }
    }

    fn named_buffer_sub_data(&self, buffer: GlName, offset: i32, data: &[u8]) {
        match self.extra.named_buffer_sub_data {
            Some(f) => unsafe {
                f(buffer.get(), offset as isize, data.len() as isize, data.as_ptr().cast())
            },
            None => missing("glNamedBufferSubData"),
        }
    }

    fn texture_sub_image_2d(
        &self,
        texture: GlName,
        level: i32,
        x_offset: i32,
        y_offset: i32,
        width: i32,
        height: i32,
        format: u32,
        ty: u32,
        pixels: &[u8],
    ) {
        match self.extra.texture_sub_image_2d {
            Some(f) => unsafe {
                f(
                    texture.get(),
                    level,
                    x_offset,
                    y_offset,
                    width,
                    height,
                    format,
                    ty,
                    pixels.as_ptr().cast(),
                )
            },
            None => missing("glTextureSubImage2D"),
        }
    }

    fn generate_texture_mipmap(&self, texture: GlName) {
        match self.extra.generate_texture_mipmap {
            Some(f) => unsafe { f(texture.get()) },
            None => missing("glGenerateTextureMipmap"),
        }
    }

    fn vertex_array_element_buffer(&self, vertex_array: GlName, buffer: Option<GlName>) {
        match self.extra.vertex_array_element_buffer {
            Some(f) => unsafe { f(vertex_array.get(), buffer.map_or(0, GlName::get)) },
            None => missing("glVertexArrayElementBuffer"),
        }
    }

    fn program_uniform_1_i32(&self, program: GlName, location: u32, value: i32) {
        match self.extra.program_uniform_1i {
            Some(f) => unsafe { f(program.get(), location as i32, value) },
            None => missing("glProgramUniform1i"),
        }
    }

    fn program_uniform_1_f32(&self, program: GlName, location: u32, value: f32) {
        match self.extra.program_uniform_1f {
            Some(f) => unsafe { f(program.get(), location as i32, value) },
            None => missing("glProgramUniform1f"),
        }
    }

    fn program_uniform_2_f32(&self, program: GlName, location: u32, value: [f32; 2]) {
        match self.extra.program_uniform_2fv {
            Some(f) => unsafe { f(program.get(), location as i32, 1, value.as_ptr()) },
            None => missing("glProgramUniform2fv"),
        }
    }

    fn program_uniform_4_f32(&self, program: GlName, location: u32, value: [f32; 4]) {
        match self.extra.program_uniform_4fv {
            Some(f) => unsafe { f(program.get(), location as i32, 1, value.as_ptr()) },
            None => missing("glProgramUniform4fv"),
        }
    }

    fn program_uniform_matrix_4_f32(&self, program: GlName, location: u32, value: &[f32; 16]) {
        match self.extra.program_uniform_matrix_4fv {
            Some(f) => unsafe { f(program.get(), location as i32, 1, 0, value.as_ptr()) },
            None => missing("glProgramUniformMatrix4fv"),
        }
    }

    fn bind_framebuffer(&self, target: u32, framebuffer: Option<GlName>) {
        unsafe {
            self.gl
                .bind_framebuffer(target, framebuffer.map(glow::NativeFramebuffer))
        }
    }

    fn bind_renderbuffer(&self, renderbuffer: Option<GlName>) {
        unsafe {
            self.gl.bind_renderbuffer(
                glow::RENDERBUFFER,
                renderbuffer.map(glow::NativeRenderbuffer),
            )
        }
    }

    fn renderbuffer_storage_multisample(
        &self,
        samples: i32,
        internal_format: u32,
        width: i32,
        height: i32,
    ) {
        unsafe {
            self.gl.renderbuffer_storage_multisample(
                glow::RENDERBUFFER,
                samples,
                internal_format,
                width,
                height,
            )
        }
    }

    fn framebuffer_renderbuffer(&self, target: u32, attachment: u32, renderbuffer: Option<GlName>) {
        unsafe {
            self.gl.framebuffer_renderbuffer(
                target,
                attachment,
                glow::RENDERBUFFER,
                renderbuffer.map(glow::NativeRenderbuffer),
            )
        }
    }

    fn check_framebuffer_status(&self, target: u32) -> u32 {
        unsafe { self.gl.check_framebuffer_status(target) }
    }

    fn blit_framebuffer(&self, src: [i32; 4], dst: [i32; 4], mask: u32, filter: u32) {
        unsafe {
            self.gl.blit_framebuffer(
                src[0], src[1], src[2], src[3], dst[0], dst[1], dst[2], dst[3], mask, filter,
            )
        }
    }
}
