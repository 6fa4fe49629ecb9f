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

//! The OpenGL [`RenderDevice`].

use super::api::{GlApi, GlSurface};
use super::context::GlContext;
use super::conversions::CONTEXT_LOST;
use super::msaa::MsaaTarget;
use super::probe::probe;
use ren3d_core::renderer::api::command::{Command, CommandQueue};
use ren3d_core::renderer::api::core::{
    AntiAliasing, DeviceCapabilities, DeviceCreateParams, DeviceInfo, RenderStats,
};
use ren3d_core::renderer::api::resource::{
    BufferDescriptor, BufferId, SamplerDescriptor, SamplerId, ShaderDescriptor, ShaderId,
    ShaderStageDescriptor, ShaderStageId, Texture2dDescriptor, TextureId, UniformId, UniformKind,
    VertexInputDescriptor, VertexInputId,
};
use ren3d_core::renderer::error::{DeviceError, LogicError, RenderError};
use ren3d_core::renderer::traits::RenderDevice;
use std::rc::Rc;

/// A render device on one native OpenGL context.
///
/// The device, its context and every resource live on the thread that owns
/// the native context.
#[derive(Debug)]
pub struct GlDevice {
    // Dropped before the context, which still owns the default-framebuffer state.
    msaa: Option<MsaaTarget>,
    context: GlContext,
    surface: Box<dyn GlSurface>,
    gl: Rc<dyn GlApi>,
    info: DeviceInfo,
    caps: DeviceCapabilities,
    anti_aliasing: AntiAliasing,
    vsync: bool,
    // Counters of the frame being recorded.
    stats: RenderStats,
    last_frame: RenderStats,
}

impl GlDevice {
    /// Probes `gl`, builds the context and applies the requested presentation
    /// settings. Unsupported anti-aliasing or vsync requests degrade silently.
    ///
    /// ## Errors
    /// * `DeviceError::UnsupportedContext` - If the context is below the baseline of `params.kind`.
    /// * `RenderError::Allocation` - If the initial native objects could not be allocated.
    pub fn new(
        gl: Rc<dyn GlApi>,
        surface: Box<dyn GlSurface>,
        params: &DeviceCreateParams,
    ) -> Result<Self, RenderError> {
        let caps = probe(gl.as_ref(), surface.as_ref(), params.kind)?;
        let info = DeviceInfo {
            kind: params.kind,
            vendor: gl.get_string(glow::VENDOR),
            renderer: gl.get_string(glow::RENDERER),
            version: gl.get_string(glow::VERSION),
        };
        log::info!(
            "GlDevice: Created {} device on \"{}\" by \"{}\" ({})",
            info.kind,
            info.renderer,
            info.vendor,
            info.version
        );

        let context = GlContext::new(Rc::clone(&gl), caps)?;
        let mut device = Self {
            msaa: None,
            context,
            surface,
            gl,
            info,
            caps,
            anti_aliasing: AntiAliasing::NONE,
            vsync: false,
            stats: RenderStats::default(),
            last_frame: RenderStats::default(),
        };
        device.set_anti_aliasing(params.anti_aliasing)?;
        device.set_vsync(params.vsync)?;
        Ok(device)
    }

    /// The context holding every manager of this device.
    pub fn context(&self) -> &GlContext {
        &self.context
    }

    fn execute(&mut self, command: &Command) -> Result<(), LogicError> {
        let context = &mut self.context;
        match command {
            Command::Clear(clear) => context.clear(clear.color),
            Command::Viewport(viewport) => context.set_viewport(viewport)?,
            Command::ScissorEnable(scissor) => context.set_scissor_enabled(scissor.enabled),
            Command::ScissorBox(scissor) => context.set_scissor_box(scissor)?,
            Command::Culling(culling) => context.set_culling(culling.enabled),
            Command::DepthTest(depth) => context.set_depth_test(depth.enabled),
            Command::DepthWrite(depth) => context.set_depth_write(depth.enabled),
            Command::Blending(blending) => context.set_blending(blending.enabled),
            Command::BlendingFunc(func) => {
                context.set_blend_func(func.src_factor, func.dst_factor)
            }
            Command::BindTexture(bind) => context.bind_texture(bind.texture)?,
            Command::BindSampler(bind) => context.bind_sampler(bind.sampler)?,
            Command::BindVertexInput(bind) => context.bind_vertex_input(bind.vertex_input)?,
            Command::BindShaderStage(bind) => context.bind_shader_stage(bind.shader_stage)?,
            Command::SetUniform(set) => context.set_uniform(set.uniform, set.value)?,
            Command::DrawIndexed(draw) => {
                if context.draw_indexed(draw)? {
                    self.stats.draw_calls += 1;
                    self.stats.indices_submitted += draw.vertex_count as u64;
                }
            }
        }
        Ok(())
    }

    fn replay(&mut self, queue: &CommandQueue) -> Result<(), RenderError> {
        for command in queue.commands() {
            if let Err(err) = self.execute(command) {
                log::error!("GlDevice: {:?} command rejected: {}", command.kind(), err);
                // A native error left by earlier commands takes precedence.
                self.check_native_error("submit_commands")?;
                return Err(err.into());
            }
            self.stats.commands_executed += 1;
        }
        self.check_native_error("submit_commands")
    }

    fn check_native_error(&self, operation: &'static str) -> Result<(), RenderError> {
        let err = match self.gl.get_error() {
            glow::NO_ERROR => return Ok(()),
            glow::OUT_OF_MEMORY => DeviceError::OutOfMemory { operation },
            CONTEXT_LOST => DeviceError::ContextLost,
            code => DeviceError::Native { operation, code },
        };
        log::error!("GlDevice: {err}");
        Err(err.into())
    }
}

impl RenderDevice for GlDevice {
    fn info(&self) -> &DeviceInfo {
        &self.info
    }

    fn capabilities(&self) -> &DeviceCapabilities {
        &self.caps
    }

    fn stats(&self) -> RenderStats {
        self.last_frame
    }

    fn create_buffer(
        &mut self,
        descriptor: &BufferDescriptor<'_>,
    ) -> Result<BufferId, RenderError> {
        self.context.create_buffer(descriptor)
    }

    fn update_buffer(
        &mut self,
        id: BufferId,
        offset: usize,
        data: &[u8],
    ) -> Result<(), RenderError> {
        self.context.update_buffer(id, offset, data)
    }

    fn destroy_buffer(&mut self, id: BufferId) {
        self.context.destroy_buffer(id);
    }

    fn create_texture_2d(
        &mut self,
        descriptor: &Texture2dDescriptor<'_>,
    ) -> Result<TextureId, RenderError> {
        self.context.create_texture_2d(descriptor)
    }

    fn update_texture_2d(
        &mut self,
        id: TextureId,
        mip_level: u32,
        data: &[u8],
    ) -> Result<(), RenderError> {
        self.context.update_texture_2d(id, mip_level, data)
    }

    fn generate_mipmaps(&mut self, id: TextureId) -> Result<(), RenderError> {
        self.context.generate_mipmaps(id)
    }

    fn destroy_texture_2d(&mut self, id: TextureId) {
        self.context.destroy_texture_2d(id);
    }

    fn create_sampler(
        &mut self,
        descriptor: &SamplerDescriptor,
    ) -> Result<SamplerId, RenderError> {
        self.context.create_sampler(descriptor)
    }

    fn update_sampler(
        &mut self,
        id: SamplerId,
        descriptor: &SamplerDescriptor,
    ) -> Result<(), RenderError> {
        self.context.update_sampler(id, descriptor)
    }

    fn destroy_sampler(&mut self, id: SamplerId) {
        self.context.destroy_sampler(id);
    }

    fn create_shader(
        &mut self,
        descriptor: &ShaderDescriptor<'_>,
    ) -> Result<ShaderId, RenderError> {
        self.context.create_shader(descriptor)
    }

    fn destroy_shader(&mut self, id: ShaderId) {
        self.context.destroy_shader(id);
    }

    fn create_shader_stage(
        &mut self,
        descriptor: &ShaderStageDescriptor<'_>,
    ) -> Result<ShaderStageId, RenderError> {
        self.context.create_shader_stage(descriptor)
    }

    fn find_uniform(
        &self,
        stage: ShaderStageId,
        name: &str,
        kind: UniformKind,
    ) -> Result<UniformId, RenderError> {
        self.context.find_uniform(stage, name, kind)
    }

    fn destroy_shader_stage(&mut self, id: ShaderStageId) {
        self.context.destroy_shader_stage(id);
    }

    fn create_vertex_input(
        &mut self,
        descriptor: &VertexInputDescriptor<'_>,
    ) -> Result<VertexInputId, RenderError> {
        self.context.create_vertex_input(descriptor)
    }

    fn destroy_vertex_input(&mut self, id: VertexInputId) {
        self.context.destroy_vertex_input(id);
    }

    /// The queue is recycled whether or not replay succeeded.
    fn submit_commands(&mut self, queue: &mut CommandQueue) -> Result<(), RenderError> {
        let result = self.replay(queue);
        queue.recycle();
        result
    }

    fn present(&mut self) -> Result<(), RenderError> {
        if let Some(msaa) = &self.msaa {
            msaa.resolve(self.context.is_scissor_enabled());
        }
        self.surface.swap_buffers().map_err(|details| {
            log::error!("GlDevice: Failed to swap buffers: {details}");
            DeviceError::Surface(details)
        })?;
        self.check_native_error("present")?;

        let frame_number = self.stats.frame_number + 1;
        self.last_frame = RenderStats {
            frame_number,
            ..self.stats
        };
        self.stats = RenderStats {
            frame_number,
            ..RenderStats::default()
        };
        log::trace!(
            "GlDevice: Presented frame {} ({} draw call(s))",
            frame_number,
            self.last_frame.draw_calls
        );
        Ok(())
    }

    fn is_vsync(&self) -> bool {
        self.vsync
    }

    fn set_vsync(&mut self, enabled: bool) -> Result<(), RenderError> {
        if !self.caps.vsync_available {
            if enabled {
                log::warn!("GlDevice: Surface has no swap control, vsync stays off");
            }
            return Ok(());
        }
        self.surface
            .set_swap_interval(i32::from(enabled))
            .map_err(DeviceError::Surface)?;
        self.vsync = enabled;
        Ok(())
    }

    fn anti_aliasing(&self) -> AntiAliasing {
        self.anti_aliasing
    }

    fn set_anti_aliasing(&mut self, anti_aliasing: AntiAliasing) -> Result<(), RenderError> {
        // The old target goes first so only one is ever allocated.
        self.msaa = None;
        self.anti_aliasing = AntiAliasing::NONE;
        if !anti_aliasing.wants_msaa() {
            return Ok(());
        }
        if !(self.caps.framebuffer_objects_available && self.caps.msaa_available) {
            log::warn!(
                "GlDevice: {}x MSAA requested but unsupported, anti-aliasing disabled",
                anti_aliasing.value
            );
            return Ok(());
        }

        let samples = anti_aliasing.value.min(self.caps.max_msaa_samples);
        if samples < anti_aliasing.value {
            log::warn!(
                "GlDevice: {}x MSAA requested, clamped to {}x",
                anti_aliasing.value,
                samples
            );
        }
        let (width, height) = self.surface.drawable_size();
        let target = MsaaTarget::new(&self.gl, width, height, samples)?;
        log::info!("GlDevice: Rendering through a {samples}x MSAA target");
        self.msaa = Some(target);
        self.anti_aliasing = AntiAliasing::msaa(samples);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::gl::headless::HeadlessSurface;
    use crate::graphics::gl::recording::{ErrorTrigger, GlCall, GlProfile, RecordingGl};
    use ren3d_core::math::Extent2D;
    use ren3d_core::renderer::api::command::{
        CommandBufferParams, CullingCommand, DepthTestCommand, ScissorBoxCommand, ViewportCommand,
    };
    use ren3d_core::renderer::api::command::CommandKind;
    use ren3d_core::renderer::api::core::DeviceKind;

    fn device_with(
        profile: GlProfile,
        params: &DeviceCreateParams,
    ) -> (Rc<RecordingGl>, GlDevice) {
        let recording = Rc::new(RecordingGl::new(profile));
        let surface = HeadlessSurface::new(Rc::clone(&recording), Extent2D::new(320, 200));
        let gl: Rc<dyn GlApi> = recording.clone();
        let device = GlDevice::new(gl, Box::new(surface), params).unwrap();
        (recording, device)
    }

    fn submit(device: &mut GlDevice, commands: &[Command]) -> Result<(), RenderError> {
        let mut queue = CommandQueue::new();
        let mut buffer = queue.acquire(CommandBufferParams::default());
        let mut writer = buffer.begin_write();
        for command in commands {
            writer.write(*command);
        }
        writer.end_write();
        queue.enqueue(buffer);
        device.submit_commands(&mut queue)
    }

    #[test]
    fn device_info_comes_from_driver_strings() {
        let params = DeviceCreateParams::default();
        let (_gl, device) = device_with(GlProfile::for_kind(DeviceKind::Gl3_2Core), &params);

        assert_eq!(device.info().kind, DeviceKind::Gl3_2Core);
        assert_eq!(device.info().renderer, "headless");
        assert!(device.info().version.starts_with("3.2"));
    }

    fn gl2_params() -> DeviceCreateParams {
        DeviceCreateParams {
            kind: DeviceKind::Gl2_0,
            ..DeviceCreateParams::default()
        }
    }

    #[test]
    fn stats_report_the_last_presented_frame() {
        // --- 1. ARRANGE ---
        let (_gl, mut device) = device_with(GlProfile::for_kind(DeviceKind::Gl2_0), &gl2_params());
        let commands: [Command; 2] = [
            CullingCommand { enabled: true }.into(),
            DepthTestCommand { enabled: true }.into(),
        ];

        // --- 2. ACT ---
        submit(&mut device, &commands).unwrap();
        let before_present = device.stats();
        device.present().unwrap();
        let first = device.stats();
        submit(&mut device, &commands[..1]).unwrap();
        let while_recording = device.stats();
        device.present().unwrap();
        let second = device.stats();

        // --- 3. ASSERT ---
        assert_eq!(before_present, RenderStats::default(), "nothing presented yet");
        assert_eq!(first.frame_number, 1);
        assert_eq!(first.commands_executed, 2);
        // A later frame replaces the snapshot only once it is presented.
        assert_eq!(while_recording, first);
        assert_eq!(second.frame_number, 2);
        assert_eq!(second.commands_executed, 1);
    }

    #[test]
    fn rejected_command_drains_pending_native_errors() {
        // --- 1. ARRANGE ---
        let (gl, mut device) = device_with(GlProfile::for_kind(DeviceKind::Gl2_0), &gl2_params());
        gl.inject_error(ErrorTrigger::BufferAllocation, glow::INVALID_OPERATION);
        gl.buffer_data_size(glow::ARRAY_BUFFER, 4, glow::STATIC_DRAW);

        // --- 2. ACT ---
        let err = submit(
            &mut device,
            &[
                CullingCommand { enabled: true }.into(),
                ViewportCommand {
                    x: 0,
                    y: 0,
                    width: -1,
                    height: 1,
                    min_depth: 0.0,
                    max_depth: 1.0,
                }
                .into(),
            ],
        )
        .unwrap_err();

        // --- 3. ASSERT ---
        assert_eq!(
            err,
            RenderError::Device(DeviceError::Native {
                operation: "submit_commands",
                code: glow::INVALID_OPERATION,
            })
        );
        assert_eq!(gl.get_error(), glow::NO_ERROR);
    }

    #[test]
    fn viewport_and_scissor_respect_the_viewport_limit() {
        // --- 1. ARRANGE ---
        let mut profile = GlProfile::for_kind(DeviceKind::Gl2_0);
        profile.max_viewport_dims = [1024, 512];
        let (gl, mut device) = device_with(profile, &gl2_params());
        gl.clear_calls();

        // --- 2. ACT ---
        let viewport = submit(
            &mut device,
            &[ViewportCommand {
                x: 0,
                y: 0,
                width: 1024,
                height: 513,
                min_depth: 0.0,
                max_depth: 1.0,
            }
            .into()],
        );
        let scissor = submit(
            &mut device,
            &[ScissorBoxCommand {
                x: 0,
                y: 0,
                width: 2048,
                height: 16,
            }
            .into()],
        );
        let fitting = submit(
            &mut device,
            &[ScissorBoxCommand {
                x: 0,
                y: 0,
                width: 1024,
                height: 512,
            }
            .into()],
        );

        // --- 3. ASSERT ---
        assert_eq!(
            viewport,
            Err(RenderError::Logic(LogicError::RectangleOutOfRange {
                command: CommandKind::Viewport,
                width: 1024,
                height: 513,
                max: Extent2D::new(1024, 512),
            }))
        );
        assert!(matches!(
            scissor,
            Err(RenderError::Logic(LogicError::RectangleOutOfRange {
                command: CommandKind::ScissorBox,
                ..
            }))
        ));
        assert_eq!(fitting, Ok(()));
        assert_eq!(gl.calls(), vec![GlCall::Scissor([0, 0, 1024, 512])]);
    }

    #[test]
    fn vsync_is_a_no_op_without_swap_control() {
        let mut profile = GlProfile::for_kind(DeviceKind::Gl2_0);
        profile.swap_control = false;
        let params = DeviceCreateParams {
            vsync: true,
            ..gl2_params()
        };

        let (gl, mut device) = device_with(profile, &params);
        device.set_vsync(true).unwrap();

        assert!(!device.is_vsync());
        assert_eq!(gl.count(|call| matches!(call, GlCall::SwapInterval(_))), 0);
    }

    #[test]
    fn native_out_of_memory_is_a_device_error() {
        let (gl, mut device) = device_with(
            GlProfile::for_kind(DeviceKind::Gl3_2Core),
            &DeviceCreateParams::default(),
        );
        gl.inject_error(ErrorTrigger::BufferAllocation, glow::OUT_OF_MEMORY);
        gl.buffer_data_size(glow::ARRAY_BUFFER, 4, glow::STATIC_DRAW);

        let err = submit(&mut device, &[CullingCommand { enabled: true }.into()]).unwrap_err();

        assert_eq!(
            err,
            RenderError::Device(DeviceError::OutOfMemory {
                operation: "submit_commands"
            })
        );
    }

    #[test]
    fn msaa_clamps_to_the_device_maximum() {
        let params = DeviceCreateParams {
            anti_aliasing: AntiAliasing::msaa(16),
            ..DeviceCreateParams::default()
        };

        let (gl, device) = device_with(GlProfile::for_kind(DeviceKind::Gl3_2Core), &params);

        assert_eq!(device.anti_aliasing(), AntiAliasing::msaa(8));
        assert_eq!(gl.live_objects(crate::graphics::gl::api::GlObjectKind::Framebuffer), 1);
    }
}
