//! Utility modules for permalink handling.

pub mod log;
pub mod slug;
