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

//! The submission unit: an ordered batch of command buffers plus a recycling pool.

use super::buffer::{CommandBuffer, CommandBufferParams};
use super::kinds::Command;

/// An ordered collection of [`CommandBuffer`]s submitted to a device as one batch.
///
/// Buffers are replayed in enqueue order and, inside a buffer, in write order.
/// After a submission the device calls [`CommandQueue::recycle`], which resets
/// every enqueued buffer and keeps it for the next [`CommandQueue::acquire`].
#[derive(Debug, Default)]
pub struct CommandQueue {
    enqueued: Vec<CommandBuffer>,
    pool: Vec<CommandBuffer>,
}

impl CommandQueue {
    /// Creates an empty queue with an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hands out a recycled buffer when one is pooled, or a new one.
    ///
    /// A recycled buffer keeps the capacity it grew to; `params` only applies
    /// to newly created buffers.
    pub fn acquire(&mut self, params: CommandBufferParams) -> CommandBuffer {
        match self.pool.pop() {
            Some(buffer) => buffer,
            None => {
                log::trace!(
                    "CommandQueue: creating a buffer with capacity {}",
                    params.initial_capacity
                );
                CommandBuffer::new(params)
            }
        }
    }

    /// Appends a recorded buffer to the batch.
    pub fn enqueue(&mut self, buffer: CommandBuffer) {
        self.enqueued.push(buffer);
    }

    /// The enqueued buffers, in enqueue order, including disabled ones.
    pub fn buffers(&self) -> &[CommandBuffer] {
        &self.enqueued
    }

    /// Mutable access to the enqueued buffers, e.g. to disable one late.
    pub fn buffers_mut(&mut self) -> &mut [CommandBuffer] {
        &mut self.enqueued
    }

    /// Every command of every enabled buffer, in replay order.
    pub fn commands(&self) -> impl Iterator<Item = &Command> + '_ {
        self.enqueued
            .iter()
            .filter(|buffer| buffer.is_enabled())
            .flat_map(CommandBuffer::iter)
    }

    /// Number of commands that a replay would execute.
    pub fn command_count(&self) -> usize {
        self.enqueued
            .iter()
            .filter(|buffer| buffer.is_enabled())
            .map(CommandBuffer::len)
            .sum()
    }

    /// Number of enqueued buffers.
    pub fn len(&self) -> usize {
        self.enqueued.len()
    }

    /// Returns `true` when no buffer is enqueued.
    pub fn is_empty(&self) -> bool {
        self.enqueued.is_empty()
    }

    /// Number of buffers waiting in the pool.
    pub fn pooled(&self) -> usize {
        self.pool.len()
    }

    /// Resets every enqueued buffer and moves it to the pool.
    pub fn recycle(&mut self) {
        for mut buffer in self.enqueued.drain(..) {
            buffer.reset();
            self.pool.push(buffer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::api::command::{BlendingCommand, CommandKind, CullingCommand};

    fn recorded(queue: &mut CommandQueue, commands: &[Command]) -> CommandBuffer {
        let mut buffer = queue.acquire(CommandBufferParams::default());
        let mut writer = buffer.begin_write();
        for command in commands {
            writer.write(*command);
        }
        writer.end_write();
        buffer
    }

    #[test]
    fn replay_order_follows_enqueue_then_write_order() {
        // --- 1. ARRANGE ---
        let mut queue = CommandQueue::new();
        let first = recorded(
            &mut queue,
            &[
                CullingCommand { enabled: true }.into(),
                BlendingCommand { enabled: true }.into(),
            ],
        );
        let second = recorded(&mut queue, &[CullingCommand { enabled: false }.into()]);

        // --- 2. ACT ---
        queue.enqueue(first);
        queue.enqueue(second);

        // --- 3. ASSERT ---
        let replay: Vec<Command> = queue.commands().copied().collect();
        assert_eq!(
            replay,
            vec![
                CullingCommand { enabled: true }.into(),
                BlendingCommand { enabled: true }.into(),
                CullingCommand { enabled: false }.into(),
            ]
        );
        assert_eq!(queue.command_count(), 3);
    }

    #[test]
    fn disabled_buffers_are_skipped_but_kept() {
        let mut queue = CommandQueue::new();
        let mut skipped = recorded(&mut queue, &[CullingCommand { enabled: true }.into()]);
        skipped.set_enabled(false);
        let kept = recorded(&mut queue, &[BlendingCommand { enabled: true }.into()]);
        queue.enqueue(skipped);
        queue.enqueue(kept);

        let kinds: Vec<CommandKind> = queue.commands().map(Command::kind).collect();

        assert_eq!(kinds, vec![CommandKind::Blending]);
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn recycled_buffers_come_back_empty_with_their_capacity() {
        let mut queue = CommandQueue::new();
        let mut buffer = queue.acquire(CommandBufferParams {
            initial_capacity: 1,
        });
        {
            let mut writer = buffer.begin_write();
            for _ in 0..10 {
                writer.write(CullingCommand { enabled: true });
            }
        }
        let grown = buffer.capacity();
        queue.enqueue(buffer);

        queue.recycle();
        assert!(queue.is_empty());
        assert_eq!(queue.pooled(), 1);

        let reused = queue.acquire(CommandBufferParams {
            initial_capacity: 1,
        });
        assert!(reused.is_empty());
        assert_eq!(reused.capacity(), grown);
        assert_eq!(queue.pooled(), 0);
    }
}
