//
// Copyright (c) The radiusd Contributors
//
// SPDX-License-Identifier: MIT
//

use std::future::Future;
use std::pin::Pin;

use tokio::task;
use tracing::error;

/// A handle which can be used to manipulate the task created by
/// [`Task::spawn`]. Dropping this handle cancels the task unless
/// [`Task::detach`] was called.
#[derive(Debug)]
pub struct Task<T> {
    join_handle: task::JoinHandle<T>,
    detached: bool,
}

impl<T> Task<T> {
    /// Spawns a new asynchronous task, returning a handle for it.
    pub fn spawn<Fut>(future: Fut) -> Task<T>
    where
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        Task {
            join_handle: task::spawn(future),
            detached: false,
        }
    }

    /// Spawns a supervised task that restarts if it panics, which is what we
    /// want for the UDP receive loops: a single malformed datagram must never
    /// be allowed to bring the listener down.
    pub fn spawn_supervised<F, Fut>(spawn_fn: F) -> Task<()>
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let join_handle = tokio::spawn(async move {
            loop {
                let worker_task = Task::spawn(spawn_fn());
                match worker_task.await {
                    Ok(_) => break,
                    Err(error) if error.is_panic() => {
                        error!("task panicked, restarting...");
                        continue;
                    }
                    Err(error) => {
                        error!(%error, "task failed");
                        break;
                    }
                }
            }
        });
        Task {
            join_handle,
            detached: false,
        }
    }

    /// Detach the task so it keeps running after this handle is dropped.
    pub fn detach(&mut self) {
        self.detached = true;
    }
}

impl<T> Future for Task<T> {
    type Output = Result<T, task::JoinError>;

    fn poll(
        mut self: Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Self::Output> {
        Pin::new(&mut self.join_handle).poll(cx)
    }
}

impl<T> Drop for Task<T> {
    fn drop(&mut self) {
        if !self.detached {
            self.join_handle.abort();
        }
    }
}
