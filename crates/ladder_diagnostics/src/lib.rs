//! Run log for the ladder verification environment.
//!
//! This crate provides structured [`Record`]s with severity levels and cycle
//! stamps, the thread-safe [`Log`] that accumulates them for one test run,
//! named [`Scope`] handles that components receive at construction, and a
//! [`TextRenderer`] for human-readable output.
//!
//! Writing a record never unwinds. [`Log::write`] returns a [`Disposition`]
//! telling the caller whether the run should be abandoned; the caller decides
//! what to do with it.

#![warn(missing_docs)]

pub mod record;
pub mod renderer;
pub mod scope;
pub mod severity;
pub mod sink;

pub use record::Record;
pub use renderer::TextRenderer;
pub use scope::Scope;
pub use severity::Severity;
pub use sink::{Disposition, Log, ABORT_FLOOR};
