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
use crate::graphics::gl::api::{GlApi, GlName};
use crate::graphics::gl::conversions::IntoGl;
use crate::graphics::gl::object::GlObject;
use ren3d_core::renderer::api::resource::{ResourceKind, ShaderDescriptor, ShaderId, ShaderKind};
use ren3d_core::renderer::error::{LogicError, RenderError, ValidationError};
use std::rc::Rc;

/// A compiled shader object.
#[derive(Debug)]
pub struct GlShader {
    object: GlObject,
    kind: ShaderKind,
}

impl GlShader {
    pub fn name(&self) -> GlName {
        self.object.name()
    }

    pub fn kind(&self) -> ShaderKind {
        self.kind
    }
}

/// Compiles and owns shaders.
#[derive(Debug)]
pub struct ShaderManager {
    gl: Rc<dyn GlApi>,
    shaders: Registry<ShaderId, GlShader>,
}

impl ShaderManager {
    pub fn new(gl: Rc<dyn GlApi>) -> Self {
        Self {
            gl,
            shaders: Registry::new(),
        }
    }

    /// Compiles `descriptor.source`. A compile failure carries the driver log.
    pub fn create(&mut self, descriptor: &ShaderDescriptor<'_>) -> Result<ShaderId, RenderError> {
        if descriptor.source.trim().is_empty() {
            return Err(
                ValidationError::new(ResourceKind::Shader, "source", "source is empty").into(),
            );
        }

        let object = GlObject::create(&self.gl, descriptor.kind.into_gl(), ResourceKind::Shader)?;
        self.gl.shader_source(object.name(), descriptor.source);
        self.gl.compile_shader(object.name());
        if !self.gl.shader_compile_status(object.name()) {
            let log = self.gl.shader_info_log(object.name());
            log::warn!("{:?} shader failed to compile: {}", descriptor.kind, log.trim_end());
            return Err(ValidationError::new(ResourceKind::Shader, "source", log).into());
        }

        let id = self.shaders.insert(GlShader {
            object,
            kind: descriptor.kind,
        });
        log::debug!("GlShaderManager: Compiled {:?} shader {:?}", descriptor.kind, id);
        Ok(id)
    }

    pub fn get(&self, id: ShaderId) -> Result<&GlShader, LogicError> {
        self.shaders.get(id)
    }

    pub fn destroy(&mut self, id: ShaderId) -> bool {
        let destroyed = self.shaders.remove(id).is_some();
        if destroyed {
            log::debug!("GlShaderManager: Destroyed shader {:?}", id);
        }
        destroyed
    }

    pub fn len(&self) -> usize {
        self.shaders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shaders.is_empty()
    }

    pub fn clear(&mut self) {
        self.shaders.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::gl::api::GlObjectKind;
    use crate::graphics::gl::recording::{GlProfile, RecordingGl};
    use ren3d_core::renderer::DeviceKind;

    fn manager() -> (Rc<RecordingGl>, ShaderManager) {
        let recording = Rc::new(RecordingGl::new(GlProfile::for_kind(DeviceKind::Gl2_0)));
        let gl: Rc<dyn GlApi> = recording.clone();
        (recording, ShaderManager::new(gl))
    }

    #[test]
    fn compiles_into_the_matching_object_kind() {
        let (gl, mut shaders) = manager();
        let id = shaders
            .create(&ShaderDescriptor {
                kind: ShaderKind::Fragment,
                source: "void main() { gl_FragColor = vec4(1.0); }",
            })
            .unwrap();

        assert_eq!(shaders.get(id).unwrap().kind(), ShaderKind::Fragment);
        assert_eq!(gl.live_objects(GlObjectKind::FragmentShader), 1);
    }

    #[test]
    fn compile_failure_carries_the_log_and_frees_the_object() {
        let (gl, mut shaders) = manager();
        let err = shaders
            .create(&ShaderDescriptor {
                kind: ShaderKind::Vertex,
                source: "#error broken\nvoid main() {}",
            })
            .unwrap_err();

        match err {
            RenderError::Validation(ValidationError { field, reason, .. }) => {
                assert_eq!(field, "source");
                assert!(reason.contains("#error"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(gl.total_live_objects(), 0);
    }

    #[test]
    fn blank_source_is_rejected() {
        let (gl, mut shaders) = manager();
        let err = shaders
            .create(&ShaderDescriptor {
                kind: ShaderKind::Vertex,
                source: "  \n",
            })
            .unwrap_err();

        assert!(matches!(err, RenderError::Validation(ValidationError { field: "source", .. })));
        assert_eq!(gl.total_live_objects(), 0);
    }
}
