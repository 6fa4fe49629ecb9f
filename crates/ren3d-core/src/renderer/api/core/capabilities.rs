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

//! The probed record of what the active native context can do.
//!
//! A [`DeviceCapabilities`] value is produced once while a device is being
//! constructed and then handed by value to every manager. Code paths that can
//! use an optional feature branch on the corresponding flag.

use crate::math::Extent2D;

/// Largest texture side the renderer ever accepts, whatever the driver reports.
pub const ABSOLUTE_MAX_TEXTURE_DIMENSION: u32 = 65_536;

/// Upper bound for vertex input locations (width of the enabled-locations bitset).
pub const MAX_VERTEX_INPUT_LOCATIONS: u32 = 32;

/// Profile family of the native context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextKind {
    /// Desktop compatibility profile.
    Compatibility,
    /// Desktop core profile. Vertex array objects are mandatory.
    Core,
    /// OpenGL ES.
    Es,
}

/// Everything the renderer needs to know about the active context.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceCapabilities {
    /// Profile family.
    pub context_kind: ContextKind,
    /// Largest texture side, clamped to [`ABSOLUTE_MAX_TEXTURE_DIMENSION`].
    pub max_texture_dimension: u32,
    /// Largest viewport.
    pub max_viewport_size: Extent2D,
    /// Number of usable vertex input locations, clamped to [`MAX_VERTEX_INPUT_LOCATIONS`].
    pub max_vertex_input_locations: u32,
    /// Anisotropic filtering is available.
    pub anisotropy_available: bool,
    /// Maximum anisotropy degree (1.0 when unavailable).
    pub max_anisotropy: f32,
    /// Non-power-of-two textures are available.
    pub npot_available: bool,
    /// The driver can generate mipmaps.
    pub mipmap_generation_available: bool,
    /// Sampler objects are available.
    pub sampler_objects_available: bool,
    /// Framebuffer objects are available.
    pub framebuffer_objects_available: bool,
    /// Multisampled renderbuffers and framebuffer blits are available.
    pub msaa_available: bool,
    /// Maximum sample count (1 when unavailable).
    pub max_msaa_samples: u32,
    /// Vertex array objects are available.
    pub vao_available: bool,
    /// Immutable buffer storage is available.
    pub buffer_storage_available: bool,
    /// Direct state access is available.
    pub dsa_available: bool,
    /// Separate shader objects are available.
    pub sso_available: bool,
    /// 32-bit element indices are available.
    pub uint32_index_available: bool,
    /// The surface can change its swap interval.
    pub vsync_available: bool,
}

impl DeviceCapabilities {
    /// The most conservative record for a context kind: every optional feature
    /// off and minimal limits. Probes start from here and enable what they find.
    pub fn baseline(context_kind: ContextKind) -> Self {
        Self {
            context_kind,
            max_texture_dimension: 64,
            max_viewport_size: Extent2D::new(64, 64),
            max_vertex_input_locations: 8,
            anisotropy_available: false,
            max_anisotropy: 1.0,
            npot_available: false,
            mipmap_generation_available: false,
            sampler_objects_available: false,
            framebuffer_objects_available: false,
            msaa_available: false,
            max_msaa_samples: 1,
            vao_available: false,
            buffer_storage_available: false,
            dsa_available: false,
            sso_available: false,
            uint32_index_available: false,
            vsync_available: false,
        }
    }

    /// Returns `true` on OpenGL ES contexts.
    pub fn is_es(&self) -> bool {
        self.context_kind == ContextKind::Es
    }
}

/// Number of mip levels of a full chain for a `width` x `height` texture:
/// `floor(log2(max(width, height))) + 1`, or 0 for an empty size.
pub fn max_mipmap_count(width: u32, height: u32) -> u32 {
    let largest = width.max(height);
    if largest == 0 {
        0
    } else {
        u32::BITS - largest.leading_zeros()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mipmap_count_covers_the_full_chain() {
        assert_eq!(max_mipmap_count(1, 1), 1);
        assert_eq!(max_mipmap_count(256, 256), 9);
        assert_eq!(max_mipmap_count(320, 200), 9);
        assert_eq!(max_mipmap_count(65_536, 1), 17);
        assert_eq!(max_mipmap_count(0, 0), 0);
    }

    #[test]
    fn baseline_disables_every_optional_feature() {
        let caps = DeviceCapabilities::baseline(ContextKind::Es);
        assert!(caps.is_es());
        assert!(!caps.vao_available);
        assert!(!caps.msaa_available);
        assert_eq!(caps.max_msaa_samples, 1);
    }
}
