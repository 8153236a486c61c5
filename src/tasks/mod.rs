//! # Reader abstractions.
//!
//! - [`Task`] - trait for async, cancelable, re-runnable readers
//! - [`TaskFn`] - closure-backed implementation
//! - [`TaskRef`] - shared reference to a task (`Arc<dyn Task>`)

mod task;
mod task_fn;

pub use task::{Task, TaskRef};
pub use task_fn::TaskFn;
