//! Purpose: Library root for the modpipe plugin-dispatch framework.
//! Exports: `core` (dispatch machinery), `modules` (builtin catalog),
//! `dispatch` (embedder front end), plus the primary types at the root.
//! Role: Resolve a slash-delimited module path, normalize whatever input the
//! caller has into a lazy byte-chunk stream, run the module's transform, and
//! hand the result back in the shape the caller asked for.

pub mod core;
pub mod dispatch;
pub mod modules;

pub use crate::core::{Chunks, Error, ErrorKind, Input};
pub use crate::dispatch::{invoke, CallOptions, Dispatcher, Output};
