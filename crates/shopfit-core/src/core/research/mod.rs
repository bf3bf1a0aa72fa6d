//! Research parameters: clearance findings, project workflow patterns, and mobile-tool
//! clearance pairs, loaded from versioned TOML or taken from the built-in dataset.
//!
//! Loading is lenient per entry. An entry that fails to deserialize is recorded as a
//! [`data::SkippedRecord`] and the rest of the document is still used.

pub mod builtin;
pub mod data;
pub mod records;
pub mod units;
