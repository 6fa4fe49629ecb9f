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

//! One-shot capability probe of a freshly created context.
//!
//! Optional features that are missing degrade to "unavailable". Only a context
//! below the requested baseline (wrong family, version too old, no vertex
//! attributes) is rejected.

use super::api::{GlApi, GlSurface};
use super::conversions::{CONTEXT_LOST, MAX_TEXTURE_MAX_ANISOTROPY};
use ren3d_core::math::Extent2D;
use ren3d_core::renderer::api::core::{
    ContextKind, DeviceCapabilities, DeviceKind, ABSOLUTE_MAX_TEXTURE_DIMENSION,
    MAX_VERTEX_INPUT_LOCATIONS,
};
use ren3d_core::renderer::error::DeviceError;

const DSA_ENTRY_POINTS: [&str; 4] = [
    "glNamedBufferSubData",
    "glTextureSubImage2D",
    "glGenerateTextureMipmap",
    "glVertexArrayElementBuffer",
];

const SSO_ENTRY_POINTS: [&str; 5] = [
    "glProgramUniform1i",
    "glProgramUniform1f",
    "glProgramUniform2fv",
    "glProgramUniform4fv",
    "glProgramUniformMatrix4fv",
];

// A driver without a current context reports the same error forever.
const MAX_PENDING_ERRORS: usize = 8;

/// Queries `gl` once and builds the capability record for a `kind` device.
pub fn probe(
    gl: &dyn GlApi,
    surface: &dyn GlSurface,
    kind: DeviceKind,
) -> Result<DeviceCapabilities, DeviceError> {
    let version = gl.version();
    let unsupported = |details: String| {
        log::error!("Capability probe rejected the context: {details}");
        DeviceError::UnsupportedContext {
            requested: kind,
            details,
        }
    };

    if version.is_embedded != kind.is_embedded() {
        return Err(unsupported(format!(
            "context is {} but {kind} was requested",
            if version.is_embedded { "OpenGL ES" } else { "desktop OpenGL" }
        )));
    }
    let (major, minor) = kind.required_version();
    if !version.at_least(major, minor) {
        return Err(unsupported(format!(
            "context version {}.{} is below {major}.{minor}",
            version.major, version.minor
        )));
    }

    let context_kind = match kind {
        DeviceKind::Gl2_0 => ContextKind::Compatibility,
        DeviceKind::Gl3_2Core => ContextKind::Core,
        DeviceKind::Gles2_0 => ContextKind::Es,
    };
    let has = |name: &str| gl.has_extension(name);
    let desktop = context_kind != ContextKind::Es;

    let mut caps = DeviceCapabilities::baseline(context_kind);

    // --- Limits ---
    let max_vertex_attribs = gl.get_integer(glow::MAX_VERTEX_ATTRIBS);
    if max_vertex_attribs < 1 {
        return Err(unsupported(String::from(
            "no vertex attributes, shaders are unusable",
        )));
    }
    caps.max_vertex_input_locations = (max_vertex_attribs as u32).min(MAX_VERTEX_INPUT_LOCATIONS);
    caps.max_texture_dimension = (gl.get_integer(glow::MAX_TEXTURE_SIZE).max(1) as u32)
        .min(ABSOLUTE_MAX_TEXTURE_DIMENSION);
    let mut viewport = [0_i32; 2];
    gl.get_integers(glow::MAX_VIEWPORT_DIMS, &mut viewport);
    caps.max_viewport_size = Extent2D::new(viewport[0].max(1) as u32, viewport[1].max(1) as u32);

    // --- Vertex arrays ---
    caps.vao_available = match context_kind {
        ContextKind::Core => true,
        ContextKind::Compatibility => {
            version.at_least(3, 0) || has("GL_ARB_vertex_array_object")
        }
        ContextKind::Es => has("GL_OES_vertex_array_object"),
    };

    // --- Framebuffers ---
    caps.framebuffer_objects_available = match context_kind {
        ContextKind::Core | ContextKind::Es => true,
        ContextKind::Compatibility => {
            version.at_least(3, 0)
                || has("GL_ARB_framebuffer_object")
                || has("GL_EXT_framebuffer_object")
        }
    };
    caps.mipmap_generation_available = caps.framebuffer_objects_available;

    let multisample_blit = match context_kind {
        ContextKind::Core => true,
        ContextKind::Compatibility => {
            version.at_least(3, 0)
                || has("GL_ARB_framebuffer_object")
                || (has("GL_EXT_framebuffer_multisample") && has("GL_EXT_framebuffer_blit"))
        }
        ContextKind::Es => false,
    };
    if multisample_blit {
        caps.max_msaa_samples = gl.get_integer(glow::MAX_SAMPLES).max(1) as u32;
        caps.msaa_available = caps.max_msaa_samples > 1;
    }

    // --- Textures and samplers ---
    caps.npot_available =
        desktop || has("GL_OES_texture_npot") || has("GL_ARB_texture_non_power_of_two");
    caps.sampler_objects_available =
        desktop && (version.at_least(3, 3) || has("GL_ARB_sampler_objects"));
    caps.anisotropy_available = has("GL_EXT_texture_filter_anisotropic")
        || has("GL_ARB_texture_filter_anisotropic")
        || (desktop && version.at_least(4, 6));
    if caps.anisotropy_available {
        caps.max_anisotropy = gl.get_float(MAX_TEXTURE_MAX_ANISOTROPY).max(1.0);
    }

    // --- Everything else ---
    caps.uint32_index_available = desktop || has("GL_OES_element_index_uint");
    caps.buffer_storage_available =
        desktop && (version.at_least(4, 4) || has("GL_ARB_buffer_storage"));
    let resolved = |names: &[&str]| names.iter().all(|name| gl.has_entry_point(name));
    caps.dsa_available = desktop
        && (version.at_least(4, 5) || has("GL_ARB_direct_state_access"))
        && resolved(&DSA_ENTRY_POINTS);
    caps.sso_available = desktop
        && (version.at_least(4, 1) || has("GL_ARB_separate_shader_objects"))
        && resolved(&SSO_ENTRY_POINTS);
    caps.vsync_available = surface.supports_swap_control();

    // Queries on unknown tokens may leave an error behind; it must not leak into later checks.
    drain_errors(gl)?;

    log::info!(
        "Probed {kind} context {}.{}: vao={}, samplers={}, msaa={}x{}, anisotropy={}, \
         buffer_storage={}, dsa={}, sso={}",
        version.major,
        version.minor,
        caps.vao_available,
        caps.sampler_objects_available,
        caps.msaa_available,
        caps.max_msaa_samples,
        caps.max_anisotropy,
        caps.buffer_storage_available,
        caps.dsa_available,
        caps.sso_available,
    );

    Ok(caps)
}

fn drain_errors(gl: &dyn GlApi) -> Result<(), DeviceError> {
    for _ in 0..MAX_PENDING_ERRORS {
        match gl.get_error() {
            glow::NO_ERROR => return Ok(()),
            CONTEXT_LOST => {
                log::error!("Capability probe: context lost while probing");
                return Err(DeviceError::ContextLost);
            }
            code => log::debug!("Capability probe: discarded native error 0x{code:04X}"),
        }
    }
    log::warn!("Capability probe: native errors still pending after {MAX_PENDING_ERRORS} reads");
    Ok(())
}
