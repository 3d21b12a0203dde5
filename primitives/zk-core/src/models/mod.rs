//! High-level models built on the core types.

pub mod note;
