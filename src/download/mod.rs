//! Retry plumbing around engine-facing operations

pub mod retry;

pub use retry::*;
