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

//! Translation of renderer enums into native GL tokens.
//!
//! Every `match` is total. Adding a variant to a core enum fails to compile
//! here until the new token is chosen.

use super::api::GlObjectKind;
use ren3d_core::renderer::api::command::{BlendFactor, PrimitiveTopology};
use ren3d_core::renderer::api::resource::{
    AddressMode, BufferKind, BufferUsage, FilterMode, MipmapMode, PixelFormat, ShaderKind,
    VertexAttributeFormat,
};
use ren3d_core::renderer::error::LogicError;

// Tokens from GL 4.4 / 4.6 and EXT_texture_filter_anisotropic, kept local so
// the values do not depend on which generator produced the binding.
pub(crate) const TEXTURE_MAX_ANISOTROPY: u32 = 0x84FE;
pub(crate) const MAX_TEXTURE_MAX_ANISOTROPY: u32 = 0x84FF;
pub(crate) const DYNAMIC_STORAGE_BIT: u32 = 0x0100;
pub(crate) const CONTEXT_LOST: u32 = 0x0507;

/// A local extension trait to convert renderer types into GL tokens.
/// This avoids Rust's orphan rules while keeping an idiomatic `.into_gl()` syntax.
pub trait IntoGl<T> {
    /// Consumes self and converts it into its GL counterpart.
    fn into_gl(self) -> T;
}

// --- Fixed-function state ---

impl IntoGl<u32> for BlendFactor {
    fn into_gl(self) -> u32 {
        match self {
            BlendFactor::Zero => glow::ZERO,
            BlendFactor::One => glow::ONE,
            BlendFactor::SrcColor => glow::SRC_COLOR,
            BlendFactor::OneMinusSrcColor => glow::ONE_MINUS_SRC_COLOR,
            BlendFactor::SrcAlpha => glow::SRC_ALPHA,
            BlendFactor::OneMinusSrcAlpha => glow::ONE_MINUS_SRC_ALPHA,
            BlendFactor::DstAlpha => glow::DST_ALPHA,
            BlendFactor::OneMinusDstAlpha => glow::ONE_MINUS_DST_ALPHA,
        }
    }
}

impl IntoGl<u32> for PrimitiveTopology {
    fn into_gl(self) -> u32 {
        match self {
            PrimitiveTopology::PointList => glow::POINTS,
            PrimitiveTopology::LineList => glow::LINES,
            PrimitiveTopology::LineStrip => glow::LINE_STRIP,
            PrimitiveTopology::TriangleList => glow::TRIANGLES,
            PrimitiveTopology::TriangleStrip => glow::TRIANGLE_STRIP,
        }
    }
}

// --- Buffers ---

impl IntoGl<u32> for BufferKind {
    fn into_gl(self) -> u32 {
        match self {
            BufferKind::Index => glow::ELEMENT_ARRAY_BUFFER,
            BufferKind::Vertex => glow::ARRAY_BUFFER,
        }
    }
}

impl IntoGl<u32> for BufferUsage {
    fn into_gl(self) -> u32 {
        match self {
            BufferUsage::StreamDraw => glow::STREAM_DRAW,
            BufferUsage::StaticDraw => glow::STATIC_DRAW,
            BufferUsage::DynamicDraw => glow::DYNAMIC_DRAW,
        }
    }
}

/// Element type for an index byte depth.
pub fn index_element_type(byte_depth: usize) -> Result<u32, LogicError> {
    match byte_depth {
        1 => Ok(glow::UNSIGNED_BYTE),
        2 => Ok(glow::UNSIGNED_SHORT),
        4 => Ok(glow::UNSIGNED_INT),
        other => Err(LogicError::InvalidIndexByteDepth(other)),
    }
}

// --- Shaders ---

impl IntoGl<GlObjectKind> for ShaderKind {
    fn into_gl(self) -> GlObjectKind {
        match self {
            ShaderKind::Vertex => GlObjectKind::VertexShader,
            ShaderKind::Fragment => GlObjectKind::FragmentShader,
        }
    }
}

// --- Sampling ---

impl IntoGl<i32> for AddressMode {
    fn into_gl(self) -> i32 {
        (match self {
            AddressMode::ClampToEdge => glow::CLAMP_TO_EDGE,
            AddressMode::Repeat => glow::REPEAT,
            AddressMode::MirrorRepeat => glow::MIRRORED_REPEAT,
        }) as i32
    }
}

impl IntoGl<i32> for FilterMode {
    fn into_gl(self) -> i32 {
        (match self {
            FilterMode::Nearest => glow::NEAREST,
            FilterMode::Linear => glow::LINEAR,
        }) as i32
    }
}

/// Minification filter and mipmap mode combine into a single GL token.
impl IntoGl<i32> for (FilterMode, MipmapMode) {
    fn into_gl(self) -> i32 {
        (match self {
            (FilterMode::Nearest, MipmapMode::None) => glow::NEAREST,
            (FilterMode::Linear, MipmapMode::None) => glow::LINEAR,
            (FilterMode::Nearest, MipmapMode::Nearest) => glow::NEAREST_MIPMAP_NEAREST,
            (FilterMode::Nearest, MipmapMode::Linear) => glow::NEAREST_MIPMAP_LINEAR,
            (FilterMode::Linear, MipmapMode::Nearest) => glow::LINEAR_MIPMAP_NEAREST,
            (FilterMode::Linear, MipmapMode::Linear) => glow::LINEAR_MIPMAP_LINEAR,
        }) as i32
    }
}

// --- Textures ---

/// Client-side `format` / `type` pair of a pixel upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TexelLayout {
    pub format: u32,
    pub ty: u32,
}

impl IntoGl<TexelLayout> for PixelFormat {
    fn into_gl(self) -> TexelLayout {
        match self {
            PixelFormat::Rgb8Unorm => TexelLayout {
                format: glow::RGB,
                ty: glow::UNSIGNED_BYTE,
            },
            PixelFormat::Rgba8Unorm => TexelLayout {
                format: glow::RGBA,
                ty: glow::UNSIGNED_BYTE,
            },
        }
    }
}

/// Internal format for a pixel format. ES 2.0 requires it to equal the client format.
pub fn internal_format(format: PixelFormat, is_es: bool) -> i32 {
    let token = match (format, is_es) {
        (PixelFormat::Rgb8Unorm, false) => glow::RGB8,
        (PixelFormat::Rgba8Unorm, false) => glow::RGBA8,
        (PixelFormat::Rgb8Unorm, true) => glow::RGB,
        (PixelFormat::Rgba8Unorm, true) => glow::RGBA,
    };
    token as i32
}

// --- Vertex attributes ---

/// Arguments of `glVertexAttribPointer` for an attribute format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeLayout {
    pub components: i32,
    pub data_type: u32,
    pub normalized: bool,
}

impl IntoGl<AttributeLayout> for VertexAttributeFormat {
    fn into_gl(self) -> AttributeLayout {
        let (components, data_type, normalized) = match self {
            VertexAttributeFormat::Rgba8Unorm => (4, glow::UNSIGNED_BYTE, true),
            VertexAttributeFormat::Rg32Sfloat => (2, glow::FLOAT, false),
            VertexAttributeFormat::Rgb32Sfloat => (3, glow::FLOAT, false),
            VertexAttributeFormat::Rgba32Sfloat => (4, glow::FLOAT, false),
        };
        AttributeLayout {
            components,
            data_type,
            normalized,
        }
    }
}
