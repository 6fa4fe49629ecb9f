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

//! A fixed-size worker pool for background work (asset decoding, mipmap
//! preparation, …) that must stay off the rendering thread.
//!
//! Tasks are fire-and-forget closures. Each spawn returns a [`TaskHandle`]
//! whose [`TaskHandle::wait`] blocks until the task finished and yields its
//! result. There is no cancellation and no timeout. Dropping the pool stops
//! accepting work, lets queued and running tasks finish and joins the workers.

use crossbeam_channel::{Receiver, Sender};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Errors reported by the task pool.
#[derive(Debug)]
pub enum TaskError {
    /// The pool was shut down before the task could be queued.
    ShutDown,
    /// The task panicked. Carries the panic message when it was a string.
    Panicked(String),
    /// The task was dropped without running (its worker died).
    Lost,
    /// A worker thread could not be spawned.
    Spawn(std::io::Error),
}

impl fmt::Display for TaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskError::ShutDown => write!(f, "The task pool is shut down"),
            TaskError::Panicked(message) => write!(f, "Task panicked: {message}"),
            TaskError::Lost => write!(f, "Task was dropped before completion"),
            TaskError::Spawn(e) => write!(f, "Failed to spawn a worker thread: {e}"),
        }
    }
}

impl std::error::Error for TaskError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TaskError::Spawn(e) => Some(e),
            _ => None,
        }
    }
}

/// A handle to the result of a spawned task.
#[derive(Debug)]
pub struct TaskHandle<T> {
    outcome: Receiver<Result<T, String>>,
}

impl<T> TaskHandle<T> {
    /// Returns `true` once the task has finished, successfully or not.
    pub fn is_finished(&self) -> bool {
        !self.outcome.is_empty()
    }

    /// Blocks until the task has finished and returns its result.
    pub fn wait(self) -> Result<T, TaskError> {
        match self.outcome.recv() {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(message)) => Err(TaskError::Panicked(message)),
            Err(_) => Err(TaskError::Lost),
        }
    }
}

/// A pool of worker threads fed through a shared `crossbeam-channel` queue.
#[derive(Debug)]
pub struct TaskPool {
    sender: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

impl TaskPool {
    /// Starts a pool with `worker_count` threads, or one per available core when zero.
    pub fn new(worker_count: usize) -> Result<Self, TaskError> {
        let worker_count = if worker_count == 0 {
            thread::available_parallelism()
                .map(|count| count.get())
                .unwrap_or(1)
        } else {
            worker_count
        };

        let (sender, receiver) = crossbeam_channel::unbounded::<Job>();
        let mut pool = Self {
            sender: Some(sender),
            workers: Vec::with_capacity(worker_count),
        };

        for index in 0..worker_count {
            let receiver = receiver.clone();
            let worker = thread::Builder::new()
                .name(format!("ren3d-worker-{index}"))
                .spawn(move || {
                    for job in receiver.iter() {
                        job();
                    }
                    log::trace!("TaskPool: worker {index} exiting");
                })
                .map_err(TaskError::Spawn)?;
            pool.workers.push(worker);
        }

        log::debug!("TaskPool: started {worker_count} workers");
        Ok(pool)
    }

    /// Number of worker threads still owned by the pool.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Returns `true` while the pool accepts new tasks.
    pub fn is_running(&self) -> bool {
        self.sender.is_some()
    }

    /// Queues a task.
    ///
    /// A panic inside the task is caught on the worker and reported by
    /// [`TaskHandle::wait`]; the worker keeps serving the queue.
    pub fn spawn<F, T>(&self, task: F) -> Result<TaskHandle<T>, TaskError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let sender = self.sender.as_ref().ok_or(TaskError::ShutDown)?;
        let (outcome_tx, outcome_rx) = crossbeam_channel::bounded(1);

        let job: Job = Box::new(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(task)).map_err(|payload| {
                payload
                    .downcast_ref::<&str>()
                    .map(|message| (*message).to_owned())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| String::from("non-string panic payload"))
            });
            // The handle may already be gone; the task stays fire-and-forget.
            let _ = outcome_tx.send(outcome);
        });

        sender.send(job).map_err(|_| TaskError::ShutDown)?;
        Ok(TaskHandle { outcome: outcome_rx })
    }

    /// Queues every task, then waits for all of them.
    ///
    /// Every task runs to completion even if an earlier one failed; the first
    /// failure is returned.
    pub fn add_and_wait<I, F>(&self, tasks: I) -> Result<(), TaskError>
    where
        I: IntoIterator<Item = F>,
        F: FnOnce() + Send + 'static,
    {
        let handles = tasks
            .into_iter()
            .map(|task| self.spawn(task))
            .collect::<Result<Vec<_>, _>>()?;

        let mut first_error = None;
        for handle in handles {
            if let Err(e) = handle.wait() {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Stops accepting tasks, drains the queue and joins every worker.
    pub fn shutdown(&mut self) {
        if self.sender.take().is_none() {
            return;
        }
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                log::warn!("TaskPool: a worker thread terminated abnormally");
            }
        }
        log::debug!("TaskPool: shut down");
    }
}

impl Drop for TaskPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}
