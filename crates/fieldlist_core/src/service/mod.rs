//! Use-case services over the distribution engine.

pub mod export;
pub mod upload;
