//! Domain models for list distribution.

pub mod list;
