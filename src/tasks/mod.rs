//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Cache Prune: Removes render results older than the configured age

mod cleanup;

pub use cleanup::spawn_prune_task;
