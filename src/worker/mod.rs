//! # Worker Pool (C6)
//!
//! A fixed-size pool of cooperative workers draining the task store and
//! dispatching by `task_type` to a registered `TaskHandler`. See
//! `pool::WorkerPool`.

pub mod pool;

pub use pool::{TaskHandler, WorkerPool};
