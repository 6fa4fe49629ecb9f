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

use super::registry::Registry;
use crate::graphics::gl::api::{GlApi, GlName, GlObjectKind};
use crate::graphics::gl::conversions::{IntoGl, TEXTURE_MAX_ANISOTROPY};
use crate::graphics::gl::object::GlObject;
use ren3d_core::renderer::api::core::DeviceCapabilities;
use ren3d_core::renderer::api::resource::{
    MipmapMode, ResourceKind, SamplerDescriptor, SamplerId,
};
use ren3d_core::renderer::error::{LogicError, RenderError, ValidationError};
use std::rc::Rc;

/// Native parameter values for one sampling state.
///
/// Written either to a sampler object or, when those are unavailable, to the
/// texture being sampled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct SamplingParams {
    integers: [(u32, i32); 4],
    anisotropy: Option<f32>,
}

impl SamplingParams {
    /// `allow_mipmaps` is `false` for textures whose level chain would be
    /// incomplete under a mipmapped minification filter.
    pub(crate) fn new(
        descriptor: &SamplerDescriptor,
        caps: &DeviceCapabilities,
        allow_mipmaps: bool,
    ) -> Self {
        let mipmap_mode = if allow_mipmaps {
            descriptor.mipmap_mode
        } else {
            MipmapMode::None
        };
        Self {
            integers: [
                (glow::TEXTURE_MIN_FILTER, (descriptor.min_filter, mipmap_mode).into_gl()),
                (glow::TEXTURE_MAG_FILTER, descriptor.mag_filter.into_gl()),
                (glow::TEXTURE_WRAP_S, descriptor.address_mode_u.into_gl()),
                (glow::TEXTURE_WRAP_T, descriptor.address_mode_v.into_gl()),
            ],
            anisotropy: caps
                .anisotropy_available
                .then_some(descriptor.anisotropy),
        }
    }

    pub(crate) fn write_to_sampler(&self, gl: &dyn GlApi, sampler: GlName) {
        for (parameter, value) in self.integers {
            gl.sampler_parameter_i32(sampler, parameter, value);
        }
        if let Some(anisotropy) = self.anisotropy {
            gl.sampler_parameter_f32(sampler, TEXTURE_MAX_ANISOTROPY, anisotropy);
        }
    }

    /// Writes to the texture currently bound to `GL_TEXTURE_2D`.
    pub(crate) fn write_to_bound_texture(&self, gl: &dyn GlApi) {
        for (parameter, value) in self.integers {
            gl.tex_parameter_i32(glow::TEXTURE_2D, parameter, value);
        }
        if let Some(anisotropy) = self.anisotropy {
            gl.tex_parameter_f32(glow::TEXTURE_2D, TEXTURE_MAX_ANISOTROPY, anisotropy);
        }
    }
}

/// Sampling state, backed by a native sampler object when the context has them.
#[derive(Debug)]
pub struct GlSampler {
    object: Option<GlObject>,
    descriptor: SamplerDescriptor,
}

impl GlSampler {
    /// The native sampler, `None` when sampling state is emulated.
    pub fn name(&self) -> Option<GlName> {
        self.object.as_ref().map(GlObject::name)
    }

    /// The normalized descriptor currently in effect.
    pub fn descriptor(&self) -> &SamplerDescriptor {
        &self.descriptor
    }
}

/// Owns samplers. Sampler objects are only ever bound to texture unit 0.
#[derive(Debug)]
pub struct SamplerManager {
    gl: Rc<dyn GlApi>,
    caps: DeviceCapabilities,
    samplers: Registry<SamplerId, GlSampler>,
    bound: Option<GlName>,
}

impl SamplerManager {
    pub fn new(gl: Rc<dyn GlApi>, caps: DeviceCapabilities) -> Self {
        Self {
            gl,
            caps,
            samplers: Registry::new(),
            bound: None,
        }
    }

    /// Whether sampling state lives in native sampler objects.
    pub fn is_native(&self) -> bool {
        self.caps.sampler_objects_available
    }

    fn normalize(
        &self,
        descriptor: &SamplerDescriptor,
    ) -> Result<SamplerDescriptor, ValidationError> {
        if !descriptor.anisotropy.is_finite() || descriptor.anisotropy < 1.0 {
            return Err(ValidationError::new(
                ResourceKind::Sampler,
                "anisotropy",
                format!("must be a finite value >= 1 (got {})", descriptor.anisotropy),
            ));
        }
        let anisotropy = if self.caps.anisotropy_available {
            descriptor.anisotropy.min(self.caps.max_anisotropy)
        } else {
            1.0
        };
        Ok(SamplerDescriptor {
            anisotropy,
            ..*descriptor
        })
    }

    pub fn create(&mut self, descriptor: &SamplerDescriptor) -> Result<SamplerId, RenderError> {
        let descriptor = self.normalize(descriptor)?;
        let object = if self.caps.sampler_objects_available {
            let object = GlObject::create(&self.gl, GlObjectKind::Sampler, ResourceKind::Sampler)?;
            SamplingParams::new(&descriptor, &self.caps, true)
                .write_to_sampler(self.gl.as_ref(), object.name());
            Some(object)
        } else {
            None
        };

        let id = self.samplers.insert(GlSampler { object, descriptor });
        log::debug!(
            "GlSamplerManager: Created sampler {:?} ({})",
            id,
            if self.is_native() { "native" } else { "emulated" }
        );
        Ok(id)
    }

    /// Replaces the sampling state of `id`.
    pub fn update(
        &mut self,
        id: SamplerId,
        descriptor: &SamplerDescriptor,
    ) -> Result<(), RenderError> {
        let descriptor = self.normalize(descriptor)?;
        let sampler = self.samplers.get_mut(id)?;
        if sampler.descriptor == descriptor {
            return Ok(());
        }
        sampler.descriptor = descriptor;
        if let Some(name) = sampler.object.as_ref().map(GlObject::name) {
            SamplingParams::new(&descriptor, &self.caps, true)
                .write_to_sampler(self.gl.as_ref(), name);
        }
        Ok(())
    }

    pub fn get(&self, id: SamplerId) -> Result<&GlSampler, LogicError> {
        self.samplers.get(id)
    }

    /// Binds `id` (or nothing) to texture unit 0 natively. A no-op when emulated.
    pub fn bind_native(&mut self, id: Option<SamplerId>) -> Result<(), LogicError> {
        if !self.is_native() {
            return Ok(());
        }
        let name = match id {
            Some(id) => self.samplers.get(id)?.name(),
            None => None,
        };
        if self.bound != name {
            self.gl.bind_sampler(0, name);
            self.bound = name;
        }
        Ok(())
    }

    pub fn destroy(&mut self, id: SamplerId) -> bool {
        let Some(sampler) = self.samplers.remove(id) else {
            return false;
        };
        // Deleting a bound sampler object reverts the unit to texture parameters.
        if sampler.name().is_some() && sampler.name() == self.bound {
            self.bound = None;
        }
        log::debug!("GlSamplerManager: Destroyed sampler {:?}", id);
        true
    }

    pub fn len(&self) -> usize {
        self.samplers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samplers.is_empty()
    }

    pub fn clear(&mut self) {
        self.samplers.clear();
        self.bound = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::gl::recording::{GlCall, GlProfile, RecordingGl};
    use approx::assert_relative_eq;
    use ren3d_core::renderer::api::core::ContextKind;
    use ren3d_core::renderer::api::resource::FilterMode;

    fn manager(native: bool, anisotropy: Option<f32>) -> (Rc<RecordingGl>, SamplerManager) {
        let recording = Rc::new(RecordingGl::new(GlProfile::new(3, 3, false)));
        let mut caps = DeviceCapabilities::baseline(ContextKind::Core);
        caps.sampler_objects_available = native;
        if let Some(max) = anisotropy {
            caps.anisotropy_available = true;
            caps.max_anisotropy = max;
        }
        let gl: Rc<dyn GlApi> = recording.clone();
        (recording, SamplerManager::new(gl, caps))
    }

    #[test]
    fn anisotropy_is_clamped_to_the_device_maximum() {
        let (_gl, mut samplers) = manager(true, Some(8.0));
        let id = samplers
            .create(&SamplerDescriptor {
                anisotropy: 16.0,
                ..Default::default()
            })
            .unwrap();

        assert_relative_eq!(samplers.get(id).unwrap().descriptor().anisotropy, 8.0);
    }

    #[test]
    fn anisotropy_is_ignored_when_unavailable() {
        let (gl, mut samplers) = manager(true, None);
        let id = samplers
            .create(&SamplerDescriptor {
                anisotropy: 4.0,
                ..Default::default()
            })
            .unwrap();

        assert_relative_eq!(samplers.get(id).unwrap().descriptor().anisotropy, 1.0);
        assert_eq!(gl.count(|call| matches!(call, GlCall::SamplerParameterF32(..))), 0);
    }

    #[test]
    fn anisotropy_below_one_is_rejected() {
        let (_gl, mut samplers) = manager(true, Some(16.0));
        let err = samplers
            .create(&SamplerDescriptor {
                anisotropy: 0.5,
                ..Default::default()
            })
            .unwrap_err();

        assert!(matches!(
            err,
            RenderError::Validation(ValidationError { field: "anisotropy", .. })
        ));
    }

    #[test]
    fn emulated_samplers_allocate_nothing() {
        let (gl, mut samplers) = manager(false, None);
        let id = samplers.create(&SamplerDescriptor::default()).unwrap();

        assert!(samplers.get(id).unwrap().name().is_none());
        assert_eq!(gl.total_live_objects(), 0);
        samplers.bind_native(Some(id)).unwrap();
        assert_eq!(gl.count(|call| matches!(call, GlCall::BindSampler(..))), 0);
    }

    #[test]
    fn native_updates_rewrite_parameters_only_on_change() {
        let (gl, mut samplers) = manager(true, None);
        let id = samplers.create(&SamplerDescriptor::default()).unwrap();
        gl.clear_calls();

        samplers.update(id, &SamplerDescriptor::default()).unwrap();
        assert!(gl.calls().is_empty());

        let linear = SamplerDescriptor {
            mag_filter: FilterMode::Linear,
            ..Default::default()
        };
        samplers.update(id, &linear).unwrap();
        assert!(gl.calls().contains(&GlCall::SamplerParameterI32(
            samplers.get(id).unwrap().name().unwrap(),
            glow::TEXTURE_MAG_FILTER,
            glow::LINEAR as i32
        )));
    }
}
