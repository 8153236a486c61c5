//! Runtime events: types and broadcast bus.
//!
//! Groups the event **data model** and the **bus** used to observe supervised
//! readers and drain loops.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: the supervisory actor (reader lifecycle) and
//!   [`MicroBatchDrainer`](crate::MicroBatchDrainer) when a bus is attached
//!   (batches, heartbeats).
//! - **Consumers**: whoever calls [`Bus::subscribe`]; the crate itself only logs.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
