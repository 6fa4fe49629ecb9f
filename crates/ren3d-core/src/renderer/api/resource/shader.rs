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

//! Shaders, shader stages (linked programs) and their uniforms.

/// The pipeline slot a shader is compiled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderKind {
    /// Vertex shader.
    Vertex,
    /// Fragment shader.
    Fragment,
}

/// A descriptor used to create a [`ShaderId`].
#[derive(Debug, Clone)]
pub struct ShaderDescriptor<'a> {
    /// The slot the shader is compiled for.
    pub kind: ShaderKind,
    /// GLSL source. Must not be empty.
    pub source: &'a str,
}

resource_id! {
    /// An opaque handle to a compiled shader.
    ShaderId => Shader
}

/// Binds a named vertex shader input to a vertex input location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShaderInputBinding<'a> {
    /// Attribute name in the vertex shader source.
    pub name: &'a str,
    /// Vertex input location it reads from.
    pub location: u32,
}

/// A descriptor used to create a [`ShaderStageId`].
#[derive(Debug, Clone)]
pub struct ShaderStageDescriptor<'a> {
    /// A shader of kind [`ShaderKind::Vertex`].
    pub vertex_shader: ShaderId,
    /// A shader of kind [`ShaderKind::Fragment`].
    pub fragment_shader: ShaderId,
    /// Attribute locations to bind before linking. Locations must be unique.
    pub input_bindings: &'a [ShaderInputBinding<'a>],
}

resource_id! {
    /// An opaque handle to a linked shader stage.
    ShaderStageId => ShaderStage
}

/// Type of a uniform variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniformKind {
    /// `int`.
    Int32,
    /// `float`.
    Float32,
    /// `vec2`.
    Vec2,
    /// `vec4`.
    Vec4,
    /// `mat4`, column-major.
    Mat4,
    /// `sampler2D`, set to a texture unit.
    Sampler2d,
}

/// A value to store in a uniform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    /// `int`.
    Int32(i32),
    /// `float`.
    Float32(f32),
    /// `vec2`.
    Vec2([f32; 2]),
    /// `vec4`.
    Vec4([f32; 4]),
    /// `mat4`, column-major.
    Mat4([f32; 16]),
    /// `sampler2D` texture unit.
    Sampler2d(i32),
}

impl UniformValue {
    /// The kind of uniform this value can be stored in.
    pub const fn kind(&self) -> UniformKind {
        match self {
            UniformValue::Int32(_) => UniformKind::Int32,
            UniformValue::Float32(_) => UniformKind::Float32,
            UniformValue::Vec2(_) => UniformKind::Vec2,
            UniformValue::Vec4(_) => UniformKind::Vec4,
            UniformValue::Mat4(_) => UniformKind::Mat4,
            UniformValue::Sampler2d(_) => UniformKind::Sampler2d,
        }
    }
}

/// A typed handle to a uniform of a shader stage.
///
/// Obtained from [`crate::RenderDevice::find_uniform`]; valid as long as its
/// stage is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformId {
    /// The stage the uniform belongs to.
    pub stage: ShaderStageId,
    /// Native uniform location.
    pub location: u32,
    /// Declared kind.
    pub kind: UniformKind,
}
