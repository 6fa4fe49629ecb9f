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
use super::shader::ShaderManager;
use crate::graphics::gl::api::{GlApi, GlName, GlObjectKind};
use crate::graphics::gl::object::GlObject;
use ren3d_core::renderer::api::core::DeviceCapabilities;
use ren3d_core::renderer::api::resource::{
    ResourceKind, ShaderId, ShaderKind, ShaderStageDescriptor, ShaderStageId, UniformId,
    UniformKind,
};
use ren3d_core::renderer::error::{LogicError, RenderError, ValidationError};
use std::collections::HashSet;
use std::rc::Rc;

/// A linked program.
///
/// The shaders are detached after linking, so destroying them does not
/// affect the stage.
#[derive(Debug)]
pub struct GlShaderStage {
    program: GlObject,
    vertex_shader: ShaderId,
    fragment_shader: ShaderId,
}

impl GlShaderStage {
    pub fn name(&self) -> GlName {
        self.program.name()
    }

    pub fn vertex_shader(&self) -> ShaderId {
        self.vertex_shader
    }

    pub fn fragment_shader(&self) -> ShaderId {
        self.fragment_shader
    }
}

/// Links and owns shader stages, and caches the program in use.
#[derive(Debug)]
pub struct ShaderStageManager {
    gl: Rc<dyn GlApi>,
    caps: DeviceCapabilities,
    stages: Registry<ShaderStageId, GlShaderStage>,
    current: Option<GlName>,
}

impl ShaderStageManager {
    pub fn new(gl: Rc<dyn GlApi>, caps: DeviceCapabilities) -> Self {
        Self {
            gl,
            caps,
            stages: Registry::new(),
            current: None,
        }
    }

    fn shader_for_slot(
        shaders: &ShaderManager,
        id: ShaderId,
        expected: ShaderKind,
        field: &'static str,
    ) -> Result<GlName, RenderError> {
        let shader = shaders.get(id)?;
        if shader.kind() != expected {
            return Err(ValidationError::new(
                ResourceKind::ShaderStage,
                field,
                format!("{id:?} is a {:?} shader, expected {expected:?}", shader.kind()),
            )
            .into());
        }
        Ok(shader.name())
    }

    fn validate_bindings(
        &self,
        descriptor: &ShaderStageDescriptor<'_>,
    ) -> Result<(), ValidationError> {
        let mut locations = HashSet::new();
        for binding in descriptor.input_bindings {
            let invalid = |reason: String| {
                ValidationError::new(ResourceKind::ShaderStage, "input_bindings", reason)
            };
            if binding.name.is_empty() {
                return Err(invalid(format!("location {} has an empty name", binding.location)));
            }
            if binding.location >= self.caps.max_vertex_input_locations {
                return Err(invalid(format!(
                    "location {} of '{}' is not below {}",
                    binding.location, binding.name, self.caps.max_vertex_input_locations
                )));
            }
            if !locations.insert(binding.location) {
                return Err(invalid(format!("location {} is bound twice", binding.location)));
            }
        }
        Ok(())
    }

    /// Links the two shaders. Input bindings are applied before linking.
    pub fn create(
        &mut self,
        descriptor: &ShaderStageDescriptor<'_>,
        shaders: &ShaderManager,
    ) -> Result<ShaderStageId, RenderError> {
        let vertex = Self::shader_for_slot(
            shaders,
            descriptor.vertex_shader,
            ShaderKind::Vertex,
            "vertex_shader",
        )?;
        let fragment = Self::shader_for_slot(
            shaders,
            descriptor.fragment_shader,
            ShaderKind::Fragment,
            "fragment_shader",
        )?;
        self.validate_bindings(descriptor)?;

        let program = GlObject::create(&self.gl, GlObjectKind::Program, ResourceKind::ShaderStage)?;
        let name = program.name();
        self.gl.attach_shader(name, vertex);
        self.gl.attach_shader(name, fragment);
        for binding in descriptor.input_bindings {
            self.gl.bind_attrib_location(name, binding.location, binding.name);
        }
        self.gl.link_program(name);
        self.gl.detach_shader(name, vertex);
        self.gl.detach_shader(name, fragment);

        if !self.gl.program_link_status(name) {
            let log = self.gl.program_info_log(name);
            log::warn!("Shader stage failed to link: {}", log.trim_end());
            return Err(ValidationError::new(ResourceKind::ShaderStage, "shaders", log).into());
        }

        let id = self.stages.insert(GlShaderStage {
            program,
            vertex_shader: descriptor.vertex_shader,
            fragment_shader: descriptor.fragment_shader,
        });
        log::debug!(
            "GlShaderStageManager: Linked stage {:?} from {:?} + {:?}",
            id,
            descriptor.vertex_shader,
            descriptor.fragment_shader
        );
        Ok(id)
    }

    /// Resolves an active uniform of `stage`.
    ///
    /// The driver is not asked for the uniform's type; `kind` is recorded in
    /// the id and checked against every value set through it.
    pub fn find_uniform(
        &self,
        stage: ShaderStageId,
        name: &str,
        kind: UniformKind,
    ) -> Result<UniformId, RenderError> {
        let program = self.stages.get(stage)?.name();
        let location = self.gl.uniform_location(program, name).ok_or_else(|| {
            ValidationError::new(
                ResourceKind::ShaderStage,
                "uniform",
                format!("{stage:?} has no active uniform named '{name}'"),
            )
        })?;
        Ok(UniformId {
            stage,
            location,
            kind,
        })
    }

    pub fn get(&self, id: ShaderStageId) -> Result<&GlShaderStage, LogicError> {
        self.stages.get(id)
    }

    /// Makes `id` (or no program) current unless it already is.
    pub fn bind_native(&mut self, id: Option<ShaderStageId>) -> Result<(), LogicError> {
        let name = match id {
            Some(id) => Some(self.stages.get(id)?.name()),
            None => None,
        };
        if self.current != name {
            self.gl.use_program(name);
            self.current = name;
        }
        Ok(())
    }

    pub fn destroy(&mut self, id: ShaderStageId) -> bool {
        let Some(stage) = self.stages.remove(id) else {
            return false;
        };
        // A program in use is only released once it stops being current.
        if self.current == Some(stage.name()) {
            self.gl.use_program(None);
            self.current = None;
        }
        log::debug!("GlShaderStageManager: Destroyed stage {:?}", id);
        true
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn clear(&mut self) {
        if self.current.take().is_some() {
            self.gl.use_program(None);
        }
        self.stages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::gl::recording::{GlCall, GlProfile, RecordingGl};
    use ren3d_core::renderer::api::core::ContextKind;
    use ren3d_core::renderer::api::resource::{ShaderDescriptor, ShaderInputBinding};

    const VERTEX: &str = "attribute vec4 a_position;\nuniform mat4 u_mvp;\n\
        void main() { gl_Position = u_mvp * a_position; }";
    const FRAGMENT: &str = "uniform vec4 u_tint;\nvoid main() { gl_FragColor = u_tint; }";

    struct Fixture {
        gl: Rc<RecordingGl>,
        shaders: ShaderManager,
        stages: ShaderStageManager,
        vertex: ShaderId,
        fragment: ShaderId,
    }

    fn fixture() -> Fixture {
        let recording = Rc::new(RecordingGl::new(GlProfile::new(2, 1, false)));
        let gl: Rc<dyn GlApi> = recording.clone();
        let mut shaders = ShaderManager::new(Rc::clone(&gl));
        let vertex = shaders
            .create(&ShaderDescriptor {
                kind: ShaderKind::Vertex,
                source: VERTEX,
            })
            .unwrap();
        let fragment = shaders
            .create(&ShaderDescriptor {
                kind: ShaderKind::Fragment,
                source: FRAGMENT,
            })
            .unwrap();
        let stages =
            ShaderStageManager::new(gl, DeviceCapabilities::baseline(ContextKind::Compatibility));
        Fixture {
            gl: recording,
            shaders,
            stages,
            vertex,
            fragment,
        }
    }

    #[test]
    fn links_with_bindings_and_detaches_shaders() {
        let mut f = fixture();
        let bindings = [ShaderInputBinding {
            name: "a_position",
            location: 0,
        }];
        let stage = f
            .stages
            .create(
                &ShaderStageDescriptor {
                    vertex_shader: f.vertex,
                    fragment_shader: f.fragment,
                    input_bindings: &bindings,
                },
                &f.shaders,
            )
            .unwrap();
        let program = f.stages.get(stage).unwrap().name();

        let calls = f.gl.calls();
        let bind_at = calls
            .iter()
            .position(|c| *c == GlCall::BindAttribLocation(program, 0, String::from("a_position")))
            .unwrap();
        let link_at = calls.iter().position(|c| *c == GlCall::LinkProgram(program)).unwrap();
        assert!(bind_at < link_at);
        assert_eq!(f.gl.count(|c| matches!(c, GlCall::DetachShader(p, _) if *p == program)), 2);
    }

    #[test]
    fn swapped_slots_are_rejected() {
        let mut f = fixture();
        let err = f
            .stages
            .create(
                &ShaderStageDescriptor {
                    vertex_shader: f.fragment,
                    fragment_shader: f.vertex,
                    input_bindings: &[],
                },
                &f.shaders,
            )
            .unwrap_err();

        assert!(matches!(
            err,
            RenderError::Validation(ValidationError { field: "vertex_shader", .. })
        ));
        assert_eq!(f.gl.live_objects(GlObjectKind::Program), 0);
    }

    #[test]
    fn duplicate_or_out_of_range_locations_are_rejected() {
        let mut f = fixture();
        let binding = |name, location| ShaderInputBinding { name, location };
        let duplicate = [binding("a", 1), binding("b", 1)];
        let out_of_range = [binding("a", 8)];

        for bindings in [&duplicate[..], &out_of_range[..]] {
            let err = f
                .stages
                .create(
                    &ShaderStageDescriptor {
                        vertex_shader: f.vertex,
                        fragment_shader: f.fragment,
                        input_bindings: bindings,
                    },
                    &f.shaders,
                )
                .unwrap_err();
            assert!(matches!(
                err,
                RenderError::Validation(ValidationError { field: "input_bindings", .. })
            ));
        }
    }

    #[test]
    fn link_failure_is_a_validation_error() {
        let mut f = fixture();
        f.gl.fail_next_link();

        let err = f
            .stages
            .create(
                &ShaderStageDescriptor {
                    vertex_shader: f.vertex,
                    fragment_shader: f.fragment,
                    input_bindings: &[],
                },
                &f.shaders,
            )
            .unwrap_err();

        assert!(matches!(err, RenderError::Validation(ValidationError { field: "shaders", .. })));
        assert_eq!(f.gl.live_objects(GlObjectKind::Program), 0);
    }

    #[test]
    fn uniforms_resolve_to_typed_ids() {
        let mut f = fixture();
        let stage = f
            .stages
            .create(
                &ShaderStageDescriptor {
                    vertex_shader: f.vertex,
                    fragment_shader: f.fragment,
                    input_bindings: &[],
                },
                &f.shaders,
            )
            .unwrap();

        let tint = f.stages.find_uniform(stage, "u_tint", UniformKind::Vec4).unwrap();
        assert_eq!(tint.stage, stage);
        assert_eq!(tint.kind, UniformKind::Vec4);
        assert_ne!(
            tint.location,
            f.stages.find_uniform(stage, "u_mvp", UniformKind::Mat4).unwrap().location
        );
        assert!(matches!(
            f.stages.find_uniform(stage, "u_missing", UniformKind::Float32),
            Err(RenderError::Validation(_))
        ));
    }

    #[test]
    fn program_binds_are_cached() {
        let mut f = fixture();
        let stage = f
            .stages
            .create(
                &ShaderStageDescriptor {
                    vertex_shader: f.vertex,
                    fragment_shader: f.fragment,
                    input_bindings: &[],
                },
                &f.shaders,
            )
            .unwrap();
        f.gl.clear_calls();

        f.stages.bind_native(Some(stage)).unwrap();
        f.stages.bind_native(Some(stage)).unwrap();
        assert_eq!(f.gl.count(|c| matches!(c, GlCall::UseProgram(Some(_)))), 1);

        let program = f.stages.get(stage).unwrap().name();
        f.gl.clear_calls();
        assert!(f.stages.destroy(stage));
        assert_eq!(
            f.gl.calls(),
            vec![
                GlCall::UseProgram(None),
                GlCall::DeleteObject(GlObjectKind::Program, program)
            ]
        );
    }
}
