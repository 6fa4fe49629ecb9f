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

//! The native call boundary.
//!
//! [`GlApi`] is the subset of OpenGL the renderer uses, expressed with safe
//! signatures over raw `GLenum` tokens and non-zero object names. Every
//! manager, the context and the device execute through `&dyn GlApi`, which
//! lets the same code paths run against a live driver ([`super::GlowApi`])
//! or the headless [`super::RecordingGl`].

use std::fmt;
use std::num::NonZeroU32;

/// A native object name. Zero ("no object") is expressed as `Option::None`.
pub type GlName = NonZeroU32;

/// The kinds of native objects the renderer allocates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlObjectKind {
    /// Buffer object.
    Buffer,
    /// Texture object.
    Texture,
    /// Sampler object.
    Sampler,
    /// Shader object of type `GL_VERTEX_SHADER`.
    VertexShader,
    /// Shader object of type `GL_FRAGMENT_SHADER`.
    FragmentShader,
    /// Program object.
    Program,
    /// Vertex array object.
    VertexArray,
    /// Framebuffer object.
    Framebuffer,
    /// Renderbuffer object.
    Renderbuffer,
}

/// Context version as reported by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlVersion {
    /// Major version.
    pub major: u32,
    /// Minor version.
    pub minor: u32,
    /// `true` for OpenGL ES contexts.
    pub is_embedded: bool,
}

impl GlVersion {
    /// Returns `true` when this version is `major.minor` or newer.
    pub fn at_least(&self, major: u32, minor: u32) -> bool {
        (self.major, self.minor) >= (major, minor)
    }
}

/// The OpenGL entry points the renderer relies on.
///
/// Implementations must be used from the thread that owns the context.
/// Methods mirror their GL namesakes; only deviations are documented.
pub trait GlApi {
    /// Context version.
    fn version(&self) -> GlVersion;
    /// Whether the context advertises `name` (e.g. `"GL_ARB_sampler_objects"`).
    fn has_extension(&self, name: &str) -> bool;
    /// Whether the optional entry point `name` (e.g. `"glProgramUniform1i"`)
    /// resolved. The direct-state-access and separate-program methods below
    /// may only be called when their entry points did.
    fn has_entry_point(&self, name: &str) -> bool;
    fn get_string(&self, name: u32) -> String;
    fn get_integer(&self, name: u32) -> i32;
    /// Fills `out` from a multi-valued integer query such as `GL_MAX_VIEWPORT_DIMS`.
    fn get_integers(&self, name: u32, out: &mut [i32]);
    fn get_float(&self, name: u32) -> f32;
    fn get_error(&self) -> u32;

    /// Allocates one object of `kind`.
    fn create_object(&self, kind: GlObjectKind) -> Result<GlName, String>;
    /// Releases an object previously returned by [`GlApi::create_object`].
    fn delete_object(&self, kind: GlObjectKind, name: GlName);

    // --- Fixed-function state ---
    fn enable(&self, capability: u32);
    fn disable(&self, capability: u32);
    fn viewport(&self, x: i32, y: i32, width: i32, height: i32);
    fn depth_range(&self, near: f32, far: f32);
    fn scissor(&self, x: i32, y: i32, width: i32, height: i32);
    fn clear_color(&self, red: f32, green: f32, blue: f32, alpha: f32);
    fn clear(&self, mask: u32);
    fn depth_mask(&self, enabled: bool);
    fn blend_func(&self, src: u32, dst: u32);
    fn cull_face(&self, mode: u32);
    fn front_face(&self, mode: u32);
    fn pixel_store_i32(&self, parameter: u32, value: i32);

    // --- Buffers ---
    fn bind_buffer(&self, target: u32, buffer: Option<GlName>);
    fn buffer_data_size(&self, target: u32, size: i32, usage: u32);
    fn buffer_storage(&self, target: u32, size: i32, flags: u32);
    fn buffer_sub_data(&self, target: u32, offset: i32, data: &[u8]);

    // --- Textures ---
    fn active_texture(&self, unit: u32);
    fn bind_texture(&self, target: u32, texture: Option<GlName>);
    #[allow(clippy::too_many_arguments)]
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
    );
    #[allow(clippy::too_many_arguments)]
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
    );
    fn tex_parameter_i32(&self, target: u32, parameter: u32, value: i32);
    fn tex_parameter_f32(&self, target: u32, parameter: u32, value: f32);
    fn generate_mipmap(&self, target: u32);

    // --- Samplers ---
    fn bind_sampler(&self, unit: u32, sampler: Option<GlName>);
    fn sampler_parameter_i32(&self, sampler: GlName, parameter: u32, value: i32);
    fn sampler_parameter_f32(&self, sampler: GlName, parameter: u32, value: f32);

    // --- Shaders and programs ---
    fn shader_source(&self, shader: GlName, source: &str);
    fn compile_shader(&self, shader: GlName);
    fn shader_compile_status(&self, shader: GlName) -> bool;
    fn shader_info_log(&self, shader: GlName) -> String;
    fn attach_shader(&self, program: GlName, shader: GlName);
    fn detach_shader(&self, program: GlName, shader: GlName);
    fn bind_attrib_location(&self, program: GlName, index: u32, name: &str);
    fn link_program(&self, program: GlName);
    fn program_link_status(&self, program: GlName) -> bool;
    fn program_info_log(&self, program: GlName) -> String;
    fn use_program(&self, program: Option<GlName>);
    /// Location of an active uniform, `None` when the program has no such uniform.
    fn uniform_location(&self, program: GlName, name: &str) -> Option<u32>;
    fn uniform_1_i32(&self, location: u32, value: i32);
    fn uniform_1_f32(&self, location: u32, value: f32);
    fn uniform_2_f32(&self, location: u32, value: [f32; 2]);
    fn uniform_4_f32(&self, location: u32, value: [f32; 4]);
    /// Column-major, never transposed.
    fn uniform_matrix_4_f32(&self, location: u32, value: &[f32; 16]);

    // --- Vertex arrays ---
    fn bind_vertex_array(&self, vertex_array: Option<GlName>);
    fn enable_vertex_attrib_array(&self, index: u32);
    fn disable_vertex_attrib_array(&self, index: u32);
    fn vertex_attrib_pointer(
        &self,
        index: u32,
        size: i32,
        data_type: u32,
        normalized: bool,
        stride: i32,
        offset: i32,
    );
    fn vertex_attrib_4_f32(&self, index: u32, value: [f32; 4]);

    // --- Drawing ---
    fn draw_elements(&self, mode: u32, count: i32, element_type: u32, offset: i32);

    // --- Direct state access ---
    fn named_buffer_sub_data(&self, buffer: GlName, offset: i32, data: &[u8]);
    #[allow(clippy::too_many_arguments)]
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
    );
    fn generate_texture_mipmap(&self, texture: GlName);
    fn vertex_array_element_buffer(&self, vertex_array: GlName, buffer: Option<GlName>);

    // --- Separate programs ---
    fn program_uniform_1_i32(&self, program: GlName, location: u32, value: i32);
    fn program_uniform_1_f32(&self, program: GlName, location: u32, value: f32);
    fn program_uniform_2_f32(&self, program: GlName, location: u32, value: [f32; 2]);
    fn program_uniform_4_f32(&self, program: GlName, location: u32, value: [f32; 4]);
    fn program_uniform_matrix_4_f32(&self, program: GlName, location: u32, value: &[f32; 16]);

    // --- Framebuffers ---
    fn bind_framebuffer(&self, target: u32, framebuffer: Option<GlName>);
    fn bind_renderbuffer(&self, renderbuffer: Option<GlName>);
    fn renderbuffer_storage_multisample(
        &self,
        samples: i32,
        internal_format: u32,
        width: i32,
        height: i32,
    );
    fn framebuffer_renderbuffer(&self, target: u32, attachment: u32, renderbuffer: Option<GlName>);
    fn check_framebuffer_status(&self, target: u32) -> u32;
    /// `src` and `dst` are `[x0, y0, x1, y1]`.
    fn blit_framebuffer(&self, src: [i32; 4], dst: [i32; 4], mask: u32, filter: u32);
}

/// The drawable the context presents to, provided by the host's windowing glue.
pub trait GlSurface {
    /// Size of the default framebuffer in pixels.
    fn drawable_size(&self) -> (u32, u32);
    /// Whether [`GlSurface::set_swap_interval`] can succeed.
    fn supports_swap_control(&self) -> bool;
    /// 0 disables vertical sync, 1 enables it.
    fn set_swap_interval(&mut self, interval: i32) -> Result<(), String>;
    /// Presents the back buffer.
    fn swap_buffers(&mut self) -> Result<(), String>;
}

impl fmt::Debug for dyn GlApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let version = self.version();
        f.debug_struct("GlApi")
            .field("major", &version.major)
            .field("minor", &version.minor)
            .field("is_embedded", &version.is_embedded)
            .finish()
    }
}

impl fmt::Debug for dyn GlSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlSurface")
            .field("drawable_size", &self.drawable_size())
            .finish()
    }
}
