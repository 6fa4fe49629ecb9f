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

//! The closed set of recordable commands.

use crate::math::Rgba8;
use crate::renderer::api::resource::{
    SamplerId, ShaderStageId, TextureId, UniformId, UniformValue, VertexInputId,
};

/// Blend equation factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    /// `0`.
    Zero,
    /// `1`.
    One,
    /// Source color.
    SrcColor,
    /// `1 - source color`.
    OneMinusSrcColor,
    /// Source alpha.
    SrcAlpha,
    /// `1 - source alpha`.
    OneMinusSrcAlpha,
    /// Destination alpha.
    DstAlpha,
    /// `1 - destination alpha`.
    OneMinusDstAlpha,
}

/// How indices are assembled into primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveTopology {
    /// Each index is a point.
    PointList,
    /// Each pair of indices is a line.
    LineList,
    /// Consecutive indices form a connected line.
    LineStrip,
    /// Each triple of indices is a triangle.
    TriangleList,
    /// Each index after the second completes a triangle with the two before it.
    TriangleStrip,
}

/// Clears the color and depth attachments. The color is sticky until the next clear.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClearCommand {
    /// Clear color.
    pub color: Rgba8,
}

/// Sets the viewport rectangle and the depth range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportCommand {
    /// Left edge in pixels.
    pub x: i32,
    /// Bottom edge in pixels.
    pub y: i32,
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
    /// Near end of the depth range, in `0.0..=1.0`.
    pub min_depth: f32,
    /// Far end of the depth range, in `0.0..=1.0`.
    pub max_depth: f32,
}

/// Enables or disables the scissor test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScissorEnableCommand {
    /// New state.
    pub enabled: bool,
}

/// Sets the scissor rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScissorBoxCommand {
    /// Left edge in pixels.
    pub x: i32,
    /// Bottom edge in pixels.
    pub y: i32,
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
}

/// Enables or disables back-face culling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CullingCommand {
    /// New state.
    pub enabled: bool,
}

/// Enables or disables the depth test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthTestCommand {
    /// New state.
    pub enabled: bool,
}

/// Enables or disables depth writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthWriteCommand {
    /// New state.
    pub enabled: bool,
}

/// Enables or disables blending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlendingCommand {
    /// New state.
    pub enabled: bool,
}

/// Sets the blend factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlendingFuncCommand {
    /// Source factor.
    pub src_factor: BlendFactor,
    /// Destination factor.
    pub dst_factor: BlendFactor,
}

/// Binds a texture to the single texture unit, or unbinds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindTextureCommand {
    /// Texture to bind.
    pub texture: Option<TextureId>,
}

/// Binds a sampler, or unbinds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindSamplerCommand {
    /// Sampler to bind.
    pub sampler: Option<SamplerId>,
}

/// Binds a vertex input, or unbinds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindVertexInputCommand {
    /// Vertex input to bind.
    pub vertex_input: Option<VertexInputId>,
}

/// Binds a shader stage, or unbinds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindShaderStageCommand {
    /// Shader stage to bind.
    pub shader_stage: Option<ShaderStageId>,
}

/// Stores a value in a uniform of the bound shader stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SetUniformCommand {
    /// Target uniform. Its stage must be the bound one.
    pub uniform: UniformId,
    /// Value whose kind must match the uniform's.
    pub value: UniformValue,
}

/// Draws indexed primitives with the current bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawIndexedCommand {
    /// Primitive assembly.
    pub topology: PrimitiveTopology,
    /// Number of indices to draw.
    pub vertex_count: usize,
    /// Size of one index: 1, 2 or 4 bytes.
    pub index_byte_depth: usize,
    /// Byte offset into the index buffer.
    pub index_buffer_offset: usize,
    /// Index of the first index to draw, added to `index_buffer_offset`.
    pub index_offset: usize,
}

impl DrawIndexedCommand {
    /// Byte range of the index buffer the draw reads, `None` when it does
    /// not fit in `usize`.
    pub fn index_byte_range(&self) -> Option<std::ops::Range<usize>> {
        let start = self
            .index_offset
            .checked_mul(self.index_byte_depth)?
            .checked_add(self.index_buffer_offset)?;
        let len = self.vertex_count.checked_mul(self.index_byte_depth)?;
        Some(start..start.checked_add(len)?)
    }
}

/// A recorded command. Resources are referenced by id only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// See [`ClearCommand`].
    Clear(ClearCommand),
    /// See [`ViewportCommand`].
    Viewport(ViewportCommand),
    /// See [`ScissorEnableCommand`].
    ScissorEnable(ScissorEnableCommand),
    /// See [`ScissorBoxCommand`].
    ScissorBox(ScissorBoxCommand),
    /// See [`CullingCommand`].
    Culling(CullingCommand),
    /// See [`DepthTestCommand`].
    DepthTest(DepthTestCommand),
    /// See [`DepthWriteCommand`].
    DepthWrite(DepthWriteCommand),
    /// See [`BlendingCommand`].
    Blending(BlendingCommand),
    /// See [`BlendingFuncCommand`].
    BlendingFunc(BlendingFuncCommand),
    /// See [`BindTextureCommand`].
    BindTexture(BindTextureCommand),
    /// See [`BindSamplerCommand`].
    BindSampler(BindSamplerCommand),
    /// See [`BindVertexInputCommand`].
    BindVertexInput(BindVertexInputCommand),
    /// See [`BindShaderStageCommand`].
    BindShaderStage(BindShaderStageCommand),
    /// See [`SetUniformCommand`].
    SetUniform(SetUniformCommand),
    /// See [`DrawIndexedCommand`].
    DrawIndexed(DrawIndexedCommand),
}

/// Payload-free tag of a [`Command`], for logs and errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// [`Command::Clear`].
    Clear,
    /// [`Command::Viewport`].
    Viewport,
    /// [`Command::ScissorEnable`].
    ScissorEnable,
    /// [`Command::ScissorBox`].
    ScissorBox,
    /// [`Command::Culling`].
    Culling,
    /// [`Command::DepthTest`].
    DepthTest,
    /// [`Command::DepthWrite`].
    DepthWrite,
    /// [`Command::Blending`].
    Blending,
    /// [`Command::BlendingFunc`].
    BlendingFunc,
    /// [`Command::BindTexture`].
    BindTexture,
    /// [`Command::BindSampler`].
    BindSampler,
    /// [`Command::BindVertexInput`].
    BindVertexInput,
    /// [`Command::BindShaderStage`].
    BindShaderStage,
    /// [`Command::SetUniform`].
    SetUniform,
    /// [`Command::DrawIndexed`].
    DrawIndexed,
}

macro_rules! command_variants {
    ($($variant:ident($payload:ident)),+ $(,)?) => {
        impl Command {
            /// Returns the payload-free tag of this command.
            pub const fn kind(&self) -> CommandKind {
                match self {
                    $(Command::$variant(_) => CommandKind::$variant,)+
                }
            }
        }

        $(
            impl From<$payload> for Command {
                fn from(command: $payload) -> Self {
                    Command::$variant(command)
                }
            }
        )+
    };
}

command_variants! {
    Clear(ClearCommand),
    Viewport(ViewportCommand),
    ScissorEnable(ScissorEnableCommand),
    ScissorBox(ScissorBoxCommand),
    Culling(CullingCommand),
    DepthTest(DepthTestCommand),
    DepthWrite(DepthWriteCommand),
    Blending(BlendingCommand),
    BlendingFunc(BlendingFuncCommand),
    BindTexture(BindTextureCommand),
    BindSampler(BindSamplerCommand),
    BindVertexInput(BindVertexInputCommand),
    BindShaderStage(BindShaderStageCommand),
    SetUniform(SetUniformCommand),
    DrawIndexed(DrawIndexedCommand),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payloads_convert_into_their_variant() {
        let command: Command = DepthTestCommand { enabled: true }.into();
        assert_eq!(command.kind(), CommandKind::DepthTest);
        assert_eq!(
            command,
            Command::DepthTest(DepthTestCommand { enabled: true })
        );
    }

    #[test]
    fn index_byte_range_combines_both_offsets() {
        let draw = DrawIndexedCommand {
            topology: PrimitiveTopology::TriangleList,
            vertex_count: 6,
            index_byte_depth: 2,
            index_buffer_offset: 8,
            index_offset: 3,
        };
        assert_eq!(draw.index_byte_range(), Some(14..26));
    }

    #[test]
    fn index_byte_range_overflow_is_none() {
        // --- 1. ARRANGE ---
        let draw = DrawIndexedCommand {
            topology: PrimitiveTopology::TriangleList,
            vertex_count: usize::MAX / 2 + 1,
            index_byte_depth: 2,
            index_buffer_offset: 0,
            index_offset: 0,
        };
        let shifted = DrawIndexedCommand {
            vertex_count: 1,
            index_buffer_offset: usize::MAX,
            index_offset: 1,
            ..draw
        };

        // --- 2. ACT ---
        let ranges = (draw.index_byte_range(), shifted.index_byte_range());

        // --- 3. ASSERT ---
        assert_eq!(ranges, (None, None));
    }
}
