//! Core type definitions used across the DealerChat workspace.

pub mod id;

pub use id::*;
