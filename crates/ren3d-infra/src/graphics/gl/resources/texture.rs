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

use super::mipmap;
use super::registry::Registry;
use super::sampler::SamplingParams;
use super::check_allocation;
use crate::graphics::gl::api::{GlApi, GlName, GlObjectKind};
use crate::graphics::gl::conversions::{internal_format, IntoGl, TexelLayout};
use crate::graphics::gl::object::GlObject;
use ren3d_core::renderer::api::core::{
    max_mipmap_count, DeviceCapabilities, ABSOLUTE_MAX_TEXTURE_DIMENSION,
};
use ren3d_core::renderer::api::resource::{
    mip_level_size, PixelFormat, ResourceKind, SamplerDescriptor, Texture2dDescriptor, TextureId,
};
use ren3d_core::renderer::error::{LogicError, RenderError, ValidationError};
use std::rc::Rc;

/// A native 2D texture plus its creation parameters.
#[derive(Debug)]
pub struct GlTexture {
    object: GlObject,
    pixel_format: PixelFormat,
    width: u32,
    height: u32,
    mipmap_count: u32,
    // Level 0 kept on the CPU when mipmaps have to be generated there.
    shadow: Option<Vec<u8>>,
    // Sampling parameters last written to the texture object itself.
    applied: Option<SamplingParams>,
}

impl GlTexture {
    pub fn name(&self) -> GlName {
        self.object.name()
    }

    pub fn pixel_format(&self) -> PixelFormat {
        self.pixel_format
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn mipmap_count(&self) -> u32 {
        self.mipmap_count
    }
}

/// Owns 2D textures and caches the texture bound to unit 0.
#[derive(Debug)]
pub struct TextureManager {
    gl: Rc<dyn GlApi>,
    caps: DeviceCapabilities,
    textures: Registry<TextureId, GlTexture>,
    bound: Option<GlName>,
}

impl TextureManager {
    pub fn new(gl: Rc<dyn GlApi>, caps: DeviceCapabilities) -> Self {
        Self {
            gl,
            caps,
            textures: Registry::new(),
            bound: None,
        }
    }

    fn validate(&self, descriptor: &Texture2dDescriptor<'_>) -> Result<(), ValidationError> {
        let limit = self.caps.max_texture_dimension.min(ABSOLUTE_MAX_TEXTURE_DIMENSION);
        for (field, side) in [("width", descriptor.width), ("height", descriptor.height)] {
            if side == 0 || side > limit {
                return Err(ValidationError::new(
                    ResourceKind::Texture2d,
                    field,
                    format!("{side} is outside 1..={limit}"),
                ));
            }
            if !self.caps.npot_available && !side.is_power_of_two() {
                return Err(ValidationError::new(
                    ResourceKind::Texture2d,
                    field,
                    format!("{side} is not a power of two and the device lacks NPOT support"),
                ));
            }
        }

        let max_levels = max_mipmap_count(descriptor.width, descriptor.height);
        if descriptor.mipmap_count == 0 || descriptor.mipmap_count > max_levels {
            return Err(ValidationError::new(
                ResourceKind::Texture2d,
                "mipmap_count",
                format!("{} is outside 1..={max_levels}", descriptor.mipmap_count),
            ));
        }

        if let Some(data) = descriptor.data {
            let expected = descriptor
                .pixel_format
                .image_size(descriptor.width, descriptor.height);
            if data.len() != expected {
                return Err(ValidationError::new(
                    ResourceKind::Texture2d,
                    "data",
                    format!("level 0 needs {expected} bytes, got {}", data.len()),
                ));
            }
        }
        Ok(())
    }

    // ES 2.0 has no GL_TEXTURE_MAX_LEVEL, so a partial chain is incomplete
    // under a mipmapped minification filter.
    fn allows_mipmaps(&self, width: u32, height: u32, mipmap_count: u32) -> bool {
        !self.caps.is_es() || mipmap_count == max_mipmap_count(width, height)
    }

    fn bind_name(&mut self, name: Option<GlName>) {
        if self.bound != name {
            self.gl.bind_texture(glow::TEXTURE_2D, name);
            self.bound = name;
        }
    }

    pub fn create(
        &mut self,
        descriptor: &Texture2dDescriptor<'_>,
    ) -> Result<TextureId, RenderError> {
        self.validate(descriptor)?;

        let object = GlObject::create(&self.gl, GlObjectKind::Texture, ResourceKind::Texture2d)?;
        self.bind_name(Some(object.name()));

        let layout: TexelLayout = descriptor.pixel_format.into_gl();
        let internal = internal_format(descriptor.pixel_format, self.caps.is_es());
        for level in 0..descriptor.mipmap_count {
            let (width, height) = mip_level_size(descriptor.width, descriptor.height, level);
            self.gl.tex_image_2d(
                glow::TEXTURE_2D,
                level as i32,
                internal,
                width as i32,
                height as i32,
                layout.format,
                layout.ty,
                if level == 0 { descriptor.data } else { None },
            );
        }
        if let Err(err) = check_allocation(self.gl.as_ref(), ResourceKind::Texture2d) {
            // Deleting the bound texture reverts the binding to zero.
            self.bound = None;
            return Err(err);
        }

        if !self.caps.is_es() {
            self.gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MAX_LEVEL,
                descriptor.mipmap_count as i32 - 1,
            );
        }
        let params = SamplingParams::new(
            &SamplerDescriptor::default(),
            &self.caps,
            self.allows_mipmaps(descriptor.width, descriptor.height, descriptor.mipmap_count),
        );
        params.write_to_bound_texture(self.gl.as_ref());

        let needs_shadow =
            !self.caps.mipmap_generation_available && descriptor.mipmap_count > 1;
        let shadow = needs_shadow.then(|| {
            descriptor.data.map(<[u8]>::to_vec).unwrap_or_else(|| {
                vec![0; descriptor.pixel_format.image_size(descriptor.width, descriptor.height)]
            })
        });

        let id = self.textures.insert(GlTexture {
            object,
            pixel_format: descriptor.pixel_format,
            width: descriptor.width,
            height: descriptor.height,
            mipmap_count: descriptor.mipmap_count,
            shadow,
            applied: Some(params),
        });
        log::debug!(
            "GlTextureManager: Created texture {:?}, {}x{} {:?}, {} level(s)",
            id,
            descriptor.width,
            descriptor.height,
            descriptor.pixel_format,
            descriptor.mipmap_count
        );
        Ok(id)
    }

    /// Replaces one whole mip level.
    pub fn update(
        &mut self,
        id: TextureId,
        mip_level: u32,
        data: &[u8],
    ) -> Result<(), RenderError> {
        let texture = self.textures.get(id)?;
        if mip_level >= texture.mipmap_count {
            return Err(ValidationError::new(
                ResourceKind::Texture2d,
                "mip_level",
                format!("{mip_level} is beyond the {} allocated level(s)", texture.mipmap_count),
            )
            .into());
        }
        let (width, height) = mip_level_size(texture.width, texture.height, mip_level);
        let expected = texture.pixel_format.image_size(width, height);
        if data.len() != expected {
            return Err(ValidationError::new(
                ResourceKind::Texture2d,
                "data",
                format!("level {mip_level} needs {expected} bytes, got {}", data.len()),
            )
            .into());
        }

        let name = texture.name();
        let layout: TexelLayout = texture.pixel_format.into_gl();
        if self.caps.dsa_available {
            self.gl.texture_sub_image_2d(
                name,
                mip_level as i32,
                0,
                0,
                width as i32,
                height as i32,
                layout.format,
                layout.ty,
                data,
            );
        } else {
            self.bind_name(Some(name));
            self.gl.tex_sub_image_2d(
                glow::TEXTURE_2D,
                mip_level as i32,
                0,
                0,
                width as i32,
                height as i32,
                layout.format,
                layout.ty,
                data,
            );
        }

        if mip_level == 0 {
            if let Some(shadow) = self.textures.get_mut(id)?.shadow.as_mut() {
                shadow.copy_from_slice(data);
            }
        }
        Ok(())
    }

    /// Regenerates levels `1..mipmap_count`, natively or on the CPU.
    pub fn generate_mipmaps(&mut self, id: TextureId) -> Result<(), RenderError> {
        let texture = self.textures.get(id)?;
        if texture.mipmap_count <= 1 {
            return Ok(());
        }
        let name = texture.name();

        if self.caps.dsa_available {
            self.gl.generate_texture_mipmap(name);
            return Ok(());
        }
        if self.caps.mipmap_generation_available {
            self.bind_name(Some(name));
            self.gl.generate_mipmap(glow::TEXTURE_2D);
            return Ok(());
        }

        let layout: TexelLayout = texture.pixel_format.into_gl();
        let chain = match texture.shadow.as_deref() {
            Some(base) => mipmap::build_chain(
                base,
                texture.width,
                texture.height,
                texture.pixel_format.bytes_per_pixel(),
                texture.mipmap_count,
            ),
            None => return Ok(()),
        };

        self.bind_name(Some(name));
        for (index, (pixels, width, height)) in chain.iter().enumerate() {
            self.gl.tex_sub_image_2d(
                glow::TEXTURE_2D,
                index as i32 + 1,
                0,
                0,
                *width as i32,
                *height as i32,
                layout.format,
                layout.ty,
                pixels,
            );
        }
        log::debug!(
            "GlTextureManager: Generated {} mip level(s) of {:?} on the CPU",
            chain.len(),
            id
        );
        Ok(())
    }

    /// Binds `id` (or nothing) to unit 0 unless it is already bound.
    pub fn bind_native(&mut self, id: Option<TextureId>) -> Result<(), LogicError> {
        let name = match id {
            Some(id) => Some(self.textures.get(id)?.name()),
            None => None,
        };
        self.bind_name(name);
        Ok(())
    }

    /// Emulates a sampler by writing its state into the texture object.
    ///
    /// Parameters are only written when they differ from what the texture
    /// already holds. Returns whether anything was written.
    pub fn apply_sampling(
        &mut self,
        id: TextureId,
        descriptor: &SamplerDescriptor,
    ) -> Result<bool, LogicError> {
        let texture = self.textures.get(id)?;
        let params = SamplingParams::new(
            descriptor,
            &self.caps,
            self.allows_mipmaps(texture.width, texture.height, texture.mipmap_count),
        );
        if texture.applied == Some(params) {
            return Ok(false);
        }

        let name = texture.name();
        self.bind_name(Some(name));
        params.write_to_bound_texture(self.gl.as_ref());
        self.textures.get_mut(id)?.applied = Some(params);
        Ok(true)
    }

    pub fn get(&self, id: TextureId) -> Result<&GlTexture, LogicError> {
        self.textures.get(id)
    }

    pub fn destroy(&mut self, id: TextureId) -> bool {
        let Some(texture) = self.textures.remove(id) else {
            return false;
        };
        if self.bound == Some(texture.name()) {
            self.bound = None;
        }
        log::debug!("GlTextureManager: Destroyed texture {:?}", id);
        true
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    pub fn clear(&mut self) {
        self.textures.clear();
        self.bound = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::gl::recording::{ErrorTrigger, GlCall, GlProfile, RecordingGl};
    use ren3d_core::renderer::api::core::ContextKind;
    use ren3d_core::renderer::api::resource::{FilterMode, MipmapMode};

    fn caps(kind: ContextKind) -> DeviceCapabilities {
        let mut caps = DeviceCapabilities::baseline(kind);
        caps.max_texture_dimension = ABSOLUTE_MAX_TEXTURE_DIMENSION;
        caps.npot_available = kind != ContextKind::Es;
        caps.mipmap_generation_available = true;
        caps
    }

    fn manager(caps: DeviceCapabilities) -> (Rc<RecordingGl>, TextureManager) {
        let recording = Rc::new(RecordingGl::new(GlProfile::new(3, 2, caps.is_es())));
        let gl: Rc<dyn GlApi> = recording.clone();
        (recording, TextureManager::new(gl, caps))
    }

    fn rgba(width: u32, height: u32, mipmap_count: u32) -> Texture2dDescriptor<'static> {
        Texture2dDescriptor {
            pixel_format: PixelFormat::Rgba8Unorm,
            width,
            height,
            mipmap_count,
            data: None,
        }
    }

    #[test]
    fn oversized_texture_is_rejected_without_a_handle() {
        let (gl, mut textures) = manager(caps(ContextKind::Core));

        let err = textures.create(&rgba(65_537, 4, 1)).unwrap_err();

        assert!(matches!(err, RenderError::Validation(ValidationError { field: "width", .. })));
        assert_eq!(gl.total_live_objects(), 0);
    }

    #[test]
    fn npot_is_rejected_without_support() {
        let (_gl, mut textures) = manager(caps(ContextKind::Es));
        let err = textures.create(&rgba(64, 48, 1)).unwrap_err();
        assert!(matches!(err, RenderError::Validation(ValidationError { field: "height", .. })));
    }

    #[test]
    fn mipmap_count_is_bounded_by_the_full_chain() {
        let (_gl, mut textures) = manager(caps(ContextKind::Core));
        assert!(textures.create(&rgba(16, 4, 5)).is_ok());
        let err = textures.create(&rgba(16, 4, 6)).unwrap_err();
        assert!(matches!(
            err,
            RenderError::Validation(ValidationError { field: "mipmap_count", .. })
        ));
    }

    #[test]
    fn every_level_is_allocated() {
        let (gl, mut textures) = manager(caps(ContextKind::Core));
        let pixels = vec![0_u8; 8 * 8 * 4];
        textures
            .create(&Texture2dDescriptor {
                data: Some(&pixels),
                ..rgba(8, 8, 4)
            })
            .unwrap();

        let levels: Vec<(i32, i32, bool)> = gl
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                GlCall::TexImage2d {
                    level,
                    width,
                    has_data,
                    ..
                } => Some((level, width, has_data)),
                _ => None,
            })
            .collect();
        assert_eq!(levels, vec![(0, 8, true), (1, 4, false), (2, 2, false), (3, 1, false)]);
        assert!(gl.calls().contains(&GlCall::TexParameterI32(glow::TEXTURE_MAX_LEVEL, 3)));
    }

    #[test]
    fn allocation_failure_releases_the_handle() {
        let (gl, mut textures) = manager(caps(ContextKind::Core));
        gl.inject_error(ErrorTrigger::TexImage2d, glow::OUT_OF_MEMORY);

        let err = textures.create(&rgba(64, 64, 1)).unwrap_err();

        assert!(matches!(err, RenderError::Allocation(_)));
        assert_eq!(gl.live_objects(GlObjectKind::Texture), 0);
    }

    #[test]
    fn cpu_mipmaps_upload_every_extra_level() {
        let mut caps = caps(ContextKind::Compatibility);
        caps.mipmap_generation_available = false;
        let (gl, mut textures) = manager(caps);
        let id = textures.create(&rgba(4, 4, 3)).unwrap();
        gl.clear_calls();

        textures.generate_mipmaps(id).unwrap();

        assert_eq!(gl.count(|call| matches!(call, GlCall::GenerateMipmap(_))), 0);
        let uploads = gl.calls_matching(|call| matches!(call, GlCall::TexSubImage2d { .. }));
        assert_eq!(
            uploads,
            vec![
                GlCall::TexSubImage2d {
                    level: 1,
                    width: 2,
                    height: 2,
                    len: 16,
                },
                GlCall::TexSubImage2d {
                    level: 2,
                    width: 1,
                    height: 1,
                    len: 4,
                },
            ]
        );
    }

    #[test]
    fn direct_state_access_updates_by_name() {
        // --- 1. ARRANGE ---
        let mut caps = caps(ContextKind::Core);
        caps.dsa_available = true;
        let (gl, mut textures) = manager(caps);
        let id = textures.create(&rgba(4, 4, 3)).unwrap();
        let name = textures.get(id).unwrap().name();
        textures.bind_native(None).unwrap();
        gl.clear_calls();

        // --- 2. ACT ---
        textures.update(id, 0, &[0; 64]).unwrap();
        textures.generate_mipmaps(id).unwrap();

        // --- 3. ASSERT ---
        assert_eq!(
            gl.calls(),
            vec![
                GlCall::TextureSubImage2d {
                    texture: name,
                    level: 0,
                    width: 4,
                    height: 4,
                    len: 64,
                },
                GlCall::GenerateTextureMipmap(name),
            ],
            "nothing is bound on the direct path"
        );
    }

    #[test]
    fn level_updates_must_cover_the_level() {
        let (_gl, mut textures) = manager(caps(ContextKind::Core));
        let id = textures.create(&rgba(4, 4, 2)).unwrap();

        assert!(textures.update(id, 1, &[0; 16]).is_ok());
        assert!(matches!(
            textures.update(id, 1, &[0; 15]),
            Err(RenderError::Validation(ValidationError { field: "data", .. }))
        ));
        assert!(matches!(
            textures.update(id, 2, &[0; 4]),
            Err(RenderError::Validation(ValidationError { field: "mip_level", .. }))
        ));
    }

    #[test]
    fn emulated_sampling_is_written_once_per_change() {
        let (_gl, mut textures) = manager(caps(ContextKind::Compatibility));
        let id = textures.create(&rgba(4, 4, 1)).unwrap();
        let linear = SamplerDescriptor {
            min_filter: FilterMode::Linear,
            mag_filter: FilterMode::Linear,
            ..Default::default()
        };

        assert!(!textures.apply_sampling(id, &SamplerDescriptor::default()).unwrap());
        assert!(textures.apply_sampling(id, &linear).unwrap());
        assert!(!textures.apply_sampling(id, &linear).unwrap());
    }

    #[test]
    fn es_partial_chains_drop_the_mipmap_filter() {
        let (gl, mut textures) = manager(caps(ContextKind::Es));
        let id = textures.create(&rgba(8, 8, 2)).unwrap();
        gl.clear_calls();

        let trilinear = SamplerDescriptor {
            min_filter: FilterMode::Linear,
            mipmap_mode: MipmapMode::Linear,
            ..Default::default()
        };
        textures.apply_sampling(id, &trilinear).unwrap();

        assert!(gl
            .calls()
            .contains(&GlCall::TexParameterI32(glow::TEXTURE_MIN_FILTER, glow::LINEAR as i32)));
    }

    #[test]
    fn destroying_the_bound_texture_resets_the_cache() {
        let (gl, mut textures) = manager(caps(ContextKind::Core));
        let id = textures.create(&rgba(4, 4, 1)).unwrap();
        assert!(textures.destroy(id));
        assert!(!textures.destroy(id));

        let other = textures.create(&rgba(4, 4, 1)).unwrap();
        gl.clear_calls();
        textures.bind_native(Some(other)).unwrap();
        assert!(gl.calls().is_empty(), "creation left the new texture bound");
        textures.bind_native(None).unwrap();
        assert_eq!(gl.calls(), vec![GlCall::BindTexture(glow::TEXTURE_2D, None)]);
    }
}
