//! Runtime core: supervision of queue readers.
//!
//! The public API from this module is [`Supervisor`], the free functions
//! [`supervise`] / [`schedule_reader`], and the [`ReaderHandle`] they return.
//!
//! Internal modules:
//! - [`runner`]: one execution of a reader, panic capture, cleanup;
//! - [`actor`]: the respawn loop for one reader/cleanup pair;
//! - [`handle`]: cancellation and join for a supervised reader;
//! - [`supervisor`]: wiring (config, event bus, runtime token).

mod actor;
mod handle;
mod runner;
mod supervisor;

use std::sync::Arc;

pub use handle::ReaderHandle;
pub use supervisor::{Supervisor, schedule_reader, supervise};

/// Shared cleanup action, run after every completed execution of a reader.
pub type CleanupRef = Arc<dyn Fn() + Send + Sync + 'static>;
