//! Optimistic persistence of overlay edits.

pub mod backend;
pub mod queue;
