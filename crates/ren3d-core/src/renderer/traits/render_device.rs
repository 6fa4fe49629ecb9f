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

use crate::renderer::api::*;
use crate::renderer::error::RenderError;
use std::fmt::Debug;

/// The device-independent rendering interface the game talks to.
///
/// A device owns one native context and every resource created through it.
/// It is bound to the thread that owns that context, so implementations are
/// usually neither `Send` nor `Sync`.
///
/// Resource destruction is idempotent: destroying an unknown or already
/// destroyed id is a no-op. Destroying a resource that is currently bound
/// unbinds it.
pub trait RenderDevice: Debug {
    /// Driver strings and the kind the device was created as.
    fn info(&self) -> &DeviceInfo;

    /// The capability record probed at construction.
    fn capabilities(&self) -> &DeviceCapabilities;

    /// Counters of the most recently presented frame. All zero until the
    /// first [`RenderDevice::present`].
    fn stats(&self) -> RenderStats;

    /// Creates a new buffer.
    /// ## Arguments
    /// * `descriptor` - Kind, usage hint, size and optional initial contents.
    /// ## Errors
    /// * `RenderError::Validation` - If the size is zero or the initial data does not fit.
    /// * `RenderError::Allocation` - If the driver could not provide the storage.
    fn create_buffer(&mut self, descriptor: &BufferDescriptor<'_>) -> Result<BufferId, RenderError>;

    /// Writes `data` into a buffer at `offset`.
    /// ## Errors
    /// * `RenderError::Logic` - If the id is unknown or the write exceeds the buffer.
    fn update_buffer(&mut self, id: BufferId, offset: usize, data: &[u8])
        -> Result<(), RenderError>;

    /// Destroys a buffer.
    fn destroy_buffer(&mut self, id: BufferId);

    /// Creates a new 2D texture.
    /// ## Errors
    /// * `RenderError::Validation` - If a dimension, the mipmap count or the
    ///   initial data is invalid.
    /// * `RenderError::Allocation` - If the driver could not provide the storage.
    fn create_texture_2d(
        &mut self,
        descriptor: &Texture2dDescriptor<'_>,
    ) -> Result<TextureId, RenderError>;

    /// Replaces the contents of one mip level. `data` must cover the whole level.
    fn update_texture_2d(
        &mut self,
        id: TextureId,
        mip_level: u32,
        data: &[u8],
    ) -> Result<(), RenderError>;

    /// Regenerates levels `1..mipmap_count` from level 0.
    fn generate_mipmaps(&mut self, id: TextureId) -> Result<(), RenderError>;

    /// Destroys a texture.
    fn destroy_texture_2d(&mut self, id: TextureId);

    /// Creates a new sampler.
    fn create_sampler(&mut self, descriptor: &SamplerDescriptor) -> Result<SamplerId, RenderError>;

    /// Replaces the whole sampling state of a sampler.
    fn update_sampler(
        &mut self,
        id: SamplerId,
        descriptor: &SamplerDescriptor,
    ) -> Result<(), RenderError>;

    /// Destroys a sampler.
    fn destroy_sampler(&mut self, id: SamplerId);

    /// Compiles a shader.
    /// ## Errors
    /// * `RenderError::Validation` - On empty source or compile failure, carrying the native log.
    fn create_shader(&mut self, descriptor: &ShaderDescriptor<'_>) -> Result<ShaderId, RenderError>;

    /// Destroys a shader. Stages already linked from it stay valid.
    fn destroy_shader(&mut self, id: ShaderId);

    /// Links a vertex and a fragment shader into a stage.
    /// ## Errors
    /// * `RenderError::Validation` - On kind mismatch, bad input bindings or link failure.
    fn create_shader_stage(
        &mut self,
        descriptor: &ShaderStageDescriptor<'_>,
    ) -> Result<ShaderStageId, RenderError>;

    /// Looks up a uniform of a stage by name.
    /// ## Errors
    /// * `RenderError::Logic` - If the stage is unknown.
    /// * `RenderError::Validation` - If the stage has no active uniform of that name.
    fn find_uniform(
        &self,
        stage: ShaderStageId,
        name: &str,
        kind: UniformKind,
    ) -> Result<UniformId, RenderError>;

    /// Destroys a shader stage. Its uniform ids become invalid.
    fn destroy_shader_stage(&mut self, id: ShaderStageId);

    /// Creates a vertex input.
    /// ## Errors
    /// * `RenderError::Validation` - On duplicate or out-of-range locations or mismatched buffers.
    fn create_vertex_input(
        &mut self,
        descriptor: &VertexInputDescriptor<'_>,
    ) -> Result<VertexInputId, RenderError>;

    /// Destroys a vertex input.
    fn destroy_vertex_input(&mut self, id: VertexInputId);

    /// Replays every command of every enabled buffer of `queue`, in order,
    /// then recycles the queue's buffers.
    ///
    /// ## Errors
    /// * `RenderError::Logic` - For a malformed command. Commands before it
    ///   have been executed.
    /// * `RenderError::Device` - For a native failure, reported ahead of a
    ///   malformed command that follows it. The device must be dropped.
    fn submit_commands(&mut self, queue: &mut CommandQueue) -> Result<(), RenderError>;

    /// Resolves the offscreen target when multisampling and swaps the surface.
    fn present(&mut self) -> Result<(), RenderError>;

    /// Whether vertical sync is currently enabled.
    fn is_vsync(&self) -> bool;

    /// Enables or disables vertical sync. A no-op when the surface cannot swap-control.
    fn set_vsync(&mut self, enabled: bool) -> Result<(), RenderError>;

    /// The anti-aliasing actually in effect, after degradation.
    fn anti_aliasing(&self) -> AntiAliasing;

    /// Requests a new anti-aliasing mode. Degrades to none when unsupported.
    fn set_anti_aliasing(&mut self, anti_aliasing: AntiAliasing) -> Result<(), RenderError>;
}
