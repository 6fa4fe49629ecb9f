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

//! One manager per resource kind.
//!
//! Each manager validates descriptors against the probed capabilities, owns
//! the native objects through [`super::object::GlObject`] and hands out typed
//! ids. Managers also cache what is natively bound for their kind so the
//! context can skip redundant binds.

pub mod buffer;
pub mod mipmap;
pub mod registry;
pub mod sampler;
pub mod shader;
pub mod shader_stage;
pub mod texture;
pub mod vertex_input;

pub use self::buffer::{BufferManager, GlBuffer};
pub use self::registry::Registry;
pub use self::sampler::{GlSampler, SamplerManager};
pub use self::shader::{GlShader, ShaderManager};
pub use self::shader_stage::{GlShaderStage, ShaderStageManager};
pub use self::texture::{GlTexture, TextureManager};
pub use self::vertex_input::{GlVertexInput, LocationMask, VertexInputManager};

use super::api::GlApi;
use super::conversions::CONTEXT_LOST;
use ren3d_core::renderer::api::resource::ResourceKind;
use ren3d_core::renderer::error::{AllocationError, DeviceError, RenderError, ValidationError};

/// Reads the error flag after an allocating call.
///
/// Callers still hold the freshly created [`super::object::GlObject`], so
/// returning early releases it.
pub(crate) fn check_allocation(gl: &dyn GlApi, resource: ResourceKind) -> Result<(), RenderError> {
    match gl.get_error() {
        glow::NO_ERROR => Ok(()),
        glow::OUT_OF_MEMORY => {
            log::warn!("Driver ran out of memory while allocating a {resource}");
            Err(AllocationError::new(resource, "out of memory").into())
        }
        CONTEXT_LOST => {
            log::error!("Context lost while allocating a {resource}");
            Err(DeviceError::ContextLost.into())
        }
        code => Err(AllocationError::new(resource, format!("native error 0x{code:04X}")).into()),
    }
}

/// Converts a byte size or offset to the `GLsizei` / `GLintptr` the driver takes.
pub(crate) fn to_gl_size(
    value: usize,
    resource: ResourceKind,
    field: &'static str,
) -> Result<i32, ValidationError> {
    i32::try_from(value).map_err(|_| {
        ValidationError::new(resource, field, format!("{value} does not fit a native size"))
    })
}
