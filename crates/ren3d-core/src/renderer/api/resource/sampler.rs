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

//! Defines texture sampling state.

/// Defines the filtering mode for texture sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterMode {
    /// Point sampling. Returns the value of the nearest texel.
    Nearest,
    /// Linear interpolation of the four nearest texels.
    Linear,
}

/// Defines the filtering mode between mipmap levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MipmapMode {
    /// Mipmaps are not sampled.
    None,
    /// Use the nearest mipmap level.
    Nearest,
    /// Linearly interpolate between the two nearest mipmap levels.
    Linear,
}

/// Defines how texture coordinates are handled when sampling outside the `[0, 1]` range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressMode {
    /// Coordinates are clamped to the edge.
    ClampToEdge,
    /// Coordinates wrap around.
    Repeat,
    /// Coordinates wrap around, mirroring at each integer boundary.
    MirrorRepeat,
}

/// A complete set of sampling parameters. Used both to create and to update a sampler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerDescriptor {
    /// Magnification filter.
    pub mag_filter: FilterMode,
    /// Minification filter.
    pub min_filter: FilterMode,
    /// Filtering between mip levels.
    pub mipmap_mode: MipmapMode,
    /// Horizontal address mode.
    pub address_mode_u: AddressMode,
    /// Vertical address mode.
    pub address_mode_v: AddressMode,
    /// Anisotropy degree, at least 1.0. Clamped to the device maximum.
    pub anisotropy: f32,
}

impl Default for SamplerDescriptor {
    fn default() -> Self {
        Self {
            mag_filter: FilterMode::Nearest,
            min_filter: FilterMode::Nearest,
            mipmap_mode: MipmapMode::None,
            address_mode_u: AddressMode::Repeat,
            address_mode_v: AddressMode::Repeat,
            anisotropy: 1.0,
        }
    }
}

resource_id! {
    /// An opaque handle to a sampler resource.
    SamplerId => Sampler
}
