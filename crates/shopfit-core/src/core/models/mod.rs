//! Value types describing a workshop, the tools placed in it, and candidate layouts.
//!
//! Everything here is plain data. Tools are shared between layouts through `Arc<Tool>`
//! and never mutated during a run; a [`layout::Layout`] is an immutable snapshot.

pub mod catalog;
pub mod geometry;
pub mod layout;
pub mod tool;
pub mod workshop;
