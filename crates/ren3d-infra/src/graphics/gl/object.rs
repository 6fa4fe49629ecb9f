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

use super::api::{GlApi, GlName, GlObjectKind};
use ren3d_core::renderer::api::resource::ResourceKind;
use ren3d_core::renderer::error::AllocationError;
use std::fmt;
use std::rc::Rc;

/// Sole owner of one native object. Dropping it deletes the object.
pub struct GlObject {
    gl: Rc<dyn GlApi>,
    kind: GlObjectKind,
    name: GlName,
}

impl GlObject {
    /// Allocates an object of `kind` on behalf of a `resource`.
    pub fn create(
        gl: &Rc<dyn GlApi>,
        kind: GlObjectKind,
        resource: ResourceKind,
    ) -> Result<Self, AllocationError> {
        let name = gl
            .create_object(kind)
            .map_err(|details| AllocationError::new(resource, details))?;
        log::trace!("Created native {kind:?} {name}");
        Ok(Self {
            gl: Rc::clone(gl),
            kind,
            name,
        })
    }

    /// The native name.
    pub fn name(&self) -> GlName {
        self.name
    }

    /// The native object kind.
    pub fn kind(&self) -> GlObjectKind {
        self.kind
    }
}

impl fmt::Debug for GlObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlObject")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .finish()
    }
}

impl Drop for GlObject {
    fn drop(&mut self) {
        log::trace!("Deleting native {:?} {}", self.kind, self.name);
        self.gl.delete_object(self.kind, self.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::gl::recording::{GlProfile, RecordingGl};
    use ren3d_core::renderer::DeviceKind;

    #[test]
    fn drop_releases_the_name() {
        let recording = Rc::new(RecordingGl::new(GlProfile::for_kind(DeviceKind::Gl3_2Core)));
        let gl: Rc<dyn GlApi> = recording.clone();

        let object = GlObject::create(&gl, GlObjectKind::Texture, ResourceKind::Texture2d).unwrap();
        assert_eq!(recording.live_objects(GlObjectKind::Texture), 1);

        drop(object);
        assert_eq!(recording.live_objects(GlObjectKind::Texture), 0);
    }

    #[test]
    fn native_failure_is_an_allocation_error() {
        let recording = Rc::new(RecordingGl::new(GlProfile::for_kind(DeviceKind::Gl3_2Core)));
        recording.fail_allocations(GlObjectKind::Buffer);
        let gl: Rc<dyn GlApi> = recording.clone();

        let err = GlObject::create(&gl, GlObjectKind::Buffer, ResourceKind::Buffer).unwrap_err();
        assert_eq!(err.resource, ResourceKind::Buffer);
        assert_eq!(recording.total_live_objects(), 0);
    }
}
