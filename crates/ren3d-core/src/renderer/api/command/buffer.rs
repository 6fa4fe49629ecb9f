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

//! Append-only command storage with write sessions.

use super::kinds::Command;

/// Parameters for a newly created [`CommandBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandBufferParams {
    /// Number of commands the buffer can hold before its first growth.
    pub initial_capacity: usize,
}

impl Default for CommandBufferParams {
    fn default() -> Self {
        Self {
            initial_capacity: 64,
        }
    }
}

/// A growable, append-only sequence of commands.
///
/// Commands are appended through a [`CommandWriter`] obtained from
/// [`CommandBuffer::begin_write`]. While the writer is alive the buffer is
/// mutably borrowed, so it can be neither read nor enqueued.
#[derive(Debug, Clone)]
pub struct CommandBuffer {
    commands: Vec<Command>,
    enabled: bool,
}

impl CommandBuffer {
    /// Creates an empty, enabled buffer.
    pub fn new(params: CommandBufferParams) -> Self {
        Self {
            commands: Vec::with_capacity(params.initial_capacity.max(1)),
            enabled: true,
        }
    }

    /// Opens a write session.
    pub fn begin_write(&mut self) -> CommandWriter<'_> {
        CommandWriter {
            buffer: self,
            written: 0,
        }
    }

    /// The recorded commands, in write order.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Iterates the recorded commands in write order.
    pub fn iter(&self) -> std::slice::Iter<'_, Command> {
        self.commands.iter()
    }

    /// Number of recorded commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns `true` when nothing is recorded.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Number of commands the buffer can hold without growing.
    pub fn capacity(&self) -> usize {
        self.commands.capacity()
    }

    /// Disabled buffers stay in their queue but are skipped on replay.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enables or disables the buffer.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Drops every command, keeps the capacity and re-enables the buffer.
    pub fn reset(&mut self) {
        self.commands.clear();
        self.enabled = true;
    }

    fn push(&mut self, command: Command) {
        if self.commands.len() == self.commands.capacity() {
            let additional = self.commands.capacity().max(1);
            self.commands.reserve_exact(additional);
            log::trace!(
                "CommandBuffer: grown to {} commands",
                self.commands.capacity()
            );
        }
        self.commands.push(command);
    }
}

impl Default for CommandBuffer {
    fn default() -> Self {
        Self::new(CommandBufferParams::default())
    }
}

impl<'a> IntoIterator for &'a CommandBuffer {
    type Item = &'a Command;
    type IntoIter = std::slice::Iter<'a, Command>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An open write session on a [`CommandBuffer`].
#[derive(Debug)]
pub struct CommandWriter<'a> {
    buffer: &'a mut CommandBuffer,
    written: usize,
}

impl CommandWriter<'_> {
    /// Appends a command, doubling the buffer's capacity when it is full.
    pub fn write<T: Into<Command>>(&mut self, command: T) -> &mut Self {
        self.buffer.push(command.into());
        self.written += 1;
        self
    }

    /// Number of commands appended during this session.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Closes the session and returns the number of commands it appended.
    pub fn end_write(self) -> usize {
        self.written
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::api::command::{CullingCommand, DepthWriteCommand};

    #[test]
    fn growth_doubles_capacity_and_preserves_order() {
        // --- 1. ARRANGE ---
        let mut buffer = CommandBuffer::new(CommandBufferParams {
            initial_capacity: 2,
        });

        // --- 2. ACT ---
        let mut writer = buffer.begin_write();
        for i in 0..5 {
            writer.write(DepthWriteCommand { enabled: i % 2 == 0 });
        }
        let written = writer.end_write();

        // --- 3. ASSERT ---
        assert_eq!(written, 5);
        assert_eq!(buffer.len(), 5);
        assert!(buffer.capacity() >= 8, "2 -> 4 -> 8");
        let states: Vec<bool> = buffer
            .iter()
            .map(|command| match command {
                Command::DepthWrite(c) => c.enabled,
                other => panic!("unexpected command {other:?}"),
            })
            .collect();
        assert_eq!(states, vec![true, false, true, false, true]);
    }

    #[test]
    fn reset_keeps_capacity_and_reenables() {
        let mut buffer = CommandBuffer::new(CommandBufferParams {
            initial_capacity: 4,
        });
        buffer
            .begin_write()
            .write(CullingCommand { enabled: true })
            .write(CullingCommand { enabled: false });
        buffer.set_enabled(false);
        let capacity = buffer.capacity();

        buffer.reset();

        assert!(buffer.is_empty());
        assert!(buffer.is_enabled());
        assert_eq!(buffer.capacity(), capacity);
    }

    #[test]
    fn zero_initial_capacity_still_accepts_writes() {
        let mut buffer = CommandBuffer::new(CommandBufferParams {
            initial_capacity: 0,
        });
        buffer.begin_write().write(CullingCommand { enabled: true });
        assert_eq!(buffer.len(), 1);
    }
}
