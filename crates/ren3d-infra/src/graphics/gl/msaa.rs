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

use super::api::{GlApi, GlObjectKind};
use super::object::GlObject;
use super::resources::{check_allocation, to_gl_size};
use ren3d_core::renderer::api::resource::ResourceKind;
use ren3d_core::renderer::error::{AllocationError, RenderError};
use std::rc::Rc;

/// Offscreen multisampled framebuffer resolved into the default one on present.
#[derive(Debug)]
pub struct MsaaTarget {
    gl: Rc<dyn GlApi>,
    framebuffer: GlObject,
    // Kept alive for as long as the framebuffer references them.
    _color: GlObject,
    _depth: GlObject,
    width: i32,
    height: i32,
    samples: u32,
}

impl MsaaTarget {
    /// Allocates a `samples`-sample color + depth target of `width` x `height`
    /// and leaves it bound for drawing.
    pub fn new(
        gl: &Rc<dyn GlApi>,
        width: u32,
        height: u32,
        samples: u32,
    ) -> Result<Self, RenderError> {
        let width = to_gl_size(width as usize, ResourceKind::Framebuffer, "width")?;
        let height = to_gl_size(height as usize, ResourceKind::Framebuffer, "height")?;
        let sample_count = to_gl_size(samples as usize, ResourceKind::Framebuffer, "samples")?;

        let framebuffer =
            GlObject::create(gl, GlObjectKind::Framebuffer, ResourceKind::Framebuffer)?;
        let color = GlObject::create(gl, GlObjectKind::Renderbuffer, ResourceKind::Framebuffer)?;
        let depth = GlObject::create(gl, GlObjectKind::Renderbuffer, ResourceKind::Framebuffer)?;

        gl.bind_framebuffer(glow::FRAMEBUFFER, Some(framebuffer.name()));
        let attachments = [
            (&color, glow::RGBA8, glow::COLOR_ATTACHMENT0),
            (&depth, glow::DEPTH_COMPONENT24, glow::DEPTH_ATTACHMENT),
        ];
        for (renderbuffer, internal_format, attachment) in attachments {
            gl.bind_renderbuffer(Some(renderbuffer.name()));
            gl.renderbuffer_storage_multisample(sample_count, internal_format, width, height);
            if let Err(err) = check_allocation(gl.as_ref(), ResourceKind::Framebuffer) {
                gl.bind_renderbuffer(None);
                gl.bind_framebuffer(glow::FRAMEBUFFER, None);
                return Err(err);
            }
            gl.framebuffer_renderbuffer(glow::FRAMEBUFFER, attachment, Some(renderbuffer.name()));
        }
        gl.bind_renderbuffer(None);

        let status = gl.check_framebuffer_status(glow::FRAMEBUFFER);
        if status != glow::FRAMEBUFFER_COMPLETE {
            gl.bind_framebuffer(glow::FRAMEBUFFER, None);
            return Err(AllocationError::new(
                ResourceKind::Framebuffer,
                format!("framebuffer incomplete (status 0x{status:04X})"),
            )
            .into());
        }

        log::debug!(
            "GlMsaaTarget: Created {}x{} target with {} samples",
            width,
            height,
            samples
        );
        Ok(Self {
            gl: Rc::clone(gl),
            framebuffer,
            _color: color,
            _depth: depth,
            width,
            height,
            samples,
        })
    }

    pub fn samples(&self) -> u32 {
        self.samples
    }

    pub fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    pub fn bind_for_drawing(&self) {
        self.gl.bind_framebuffer(glow::FRAMEBUFFER, Some(self.framebuffer.name()));
    }

    /// Blits the color attachment into the default framebuffer, then rebinds
    /// this target. The scissor test clips blits, so it is lifted meanwhile.
    pub fn resolve(&self, scissor_enabled: bool) {
        let gl = self.gl.as_ref();
        gl.bind_framebuffer(glow::READ_FRAMEBUFFER, Some(self.framebuffer.name()));
        gl.bind_framebuffer(glow::DRAW_FRAMEBUFFER, None);
        if scissor_enabled {
            gl.disable(glow::SCISSOR_TEST);
        }

        let rect = [0, 0, self.width, self.height];
        gl.blit_framebuffer(rect, rect, glow::COLOR_BUFFER_BIT, glow::NEAREST);

        if scissor_enabled {
            gl.enable(glow::SCISSOR_TEST);
        }
        self.bind_for_drawing();
    }
}

impl Drop for MsaaTarget {
    fn drop(&mut self) {
        // Never leave a deleted framebuffer bound.
        self.gl.bind_framebuffer(glow::FRAMEBUFFER, None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::gl::recording::{ErrorTrigger, GlCall, GlProfile, RecordingGl};
    use ren3d_core::renderer::DeviceKind;

    fn driver() -> (Rc<RecordingGl>, Rc<dyn GlApi>) {
        let recording = Rc::new(RecordingGl::new(GlProfile::for_kind(DeviceKind::Gl3_2Core)));
        let gl: Rc<dyn GlApi> = recording.clone();
        (recording, gl)
    }

    #[test]
    fn allocates_color_and_depth_attachments() {
        let (recording, gl) = driver();

        let target = MsaaTarget::new(&gl, 320, 200, 4).unwrap();

        assert_eq!(target.samples(), 4);
        assert_eq!(recording.live_objects(GlObjectKind::Renderbuffer), 2);
        assert_eq!(
            recording.count(|call| matches!(
                call,
                GlCall::RenderbufferStorageMultisample { samples: 4, width: 320, height: 200, .. }
            )),
            2
        );
    }

    #[test]
    fn storage_failure_releases_every_object() {
        let (recording, gl) = driver();
        recording.inject_error(ErrorTrigger::RenderbufferStorage, glow::OUT_OF_MEMORY);

        let err = MsaaTarget::new(&gl, 320, 200, 4).unwrap_err();

        assert!(matches!(err, RenderError::Allocation(_)));
        assert_eq!(recording.total_live_objects(), 0);
    }

    #[test]
    fn resolve_lifts_the_scissor_around_the_blit() {
        let (recording, gl) = driver();
        let target = MsaaTarget::new(&gl, 64, 32, 2).unwrap();
        recording.clear_calls();

        target.resolve(true);

        let calls = recording.calls();
        let blit = calls
            .iter()
            .position(|call| matches!(call, GlCall::BlitFramebuffer { .. }))
            .unwrap();
        assert_eq!(calls[blit - 1], GlCall::Disable(glow::SCISSOR_TEST));
        assert_eq!(calls[blit + 1], GlCall::Enable(glow::SCISSOR_TEST));
        assert_eq!(
            calls[blit],
            GlCall::BlitFramebuffer {
                src: [0, 0, 64, 32],
                dst: [0, 0, 64, 32],
                mask: glow::COLOR_BUFFER_BIT,
                filter: glow::NEAREST,
            }
        );
    }
}
