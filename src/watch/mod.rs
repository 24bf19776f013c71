// src/watch/mod.rs

//! File watching and change detection.
//!
//! This module is responsible for:
//! - Binding each task's source patterns to that task ([`binding`]).
//! - Wiring up a cross-platform filesystem watcher (`notify`).
//! - Optionally filtering out events that leave a task's content unchanged
//!   ([`hash`], [`cache`]).
//!
//! It does **not** know about scheduling; it only turns filesystem changes
//! into task-level triggers.

pub mod binding;
pub mod cache;
pub mod event_handler;
pub mod hash;
pub mod watcher;

pub use binding::{WatchBinding, WatchTable};
pub use event_handler::{process_file_change, WatchContext};
pub use hash::{compute_aggregate_hash, compute_file_hash, HashFilter};
pub use watcher::{spawn_watcher, WatcherHandle};
