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

use ren3d_core::renderer::api::resource::ResourceId;
use ren3d_core::renderer::error::LogicError;
use std::collections::HashMap;

/// Id-keyed storage for one resource kind.
///
/// Ids grow monotonically and are never reused, so a stale id can only ever
/// miss. Ids start at 1.
#[derive(Debug)]
pub struct Registry<I: ResourceId, E> {
    entries: HashMap<I, E>,
    next_id: usize,
}

impl<I: ResourceId, E> Registry<I, E> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            next_id: 1,
        }
    }

    pub fn insert(&mut self, entry: E) -> I {
        let id = I::from_raw(self.next_id);
        self.next_id += 1;
        self.entries.insert(id, entry);
        id
    }

    pub fn get(&self, id: I) -> Result<&E, LogicError> {
        self.entries.get(&id).ok_or(unknown(id))
    }

    pub fn get_mut(&mut self, id: I) -> Result<&mut E, LogicError> {
        self.entries.get_mut(&id).ok_or(unknown(id))
    }

    pub fn contains(&self, id: I) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn remove(&mut self, id: I) -> Option<E> {
        self.entries.remove(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (I, &E)> + '_ {
        self.entries.iter().map(|(id, entry)| (*id, entry))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (I, &mut E)> + '_ {
        self.entries.iter_mut().map(|(id, entry)| (*id, entry))
    }

    /// Drops every entry, releasing their native objects.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<I: ResourceId, E> Default for Registry<I, E> {
    fn default() -> Self {
        Self::new()
    }
}

fn unknown<I: ResourceId>(id: I) -> LogicError {
    LogicError::UnknownResource {
        resource: I::KIND,
        id: id.raw(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ren3d_core::renderer::api::resource::{BufferId, ResourceKind};

    #[test]
    fn ids_are_never_reused() {
        let mut registry: Registry<BufferId, &str> = Registry::new();
        let first = registry.insert("a");
        registry.remove(first);
        let second = registry.insert("b");

        assert_ne!(first, second);
        assert_eq!(
            registry.get(first),
            Err(LogicError::UnknownResource {
                resource: ResourceKind::Buffer,
                id: first.0
            })
        );
        assert_eq!(registry.get(second), Ok(&"b"));
    }
}
