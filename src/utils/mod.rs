//! Utility modules.

pub mod globs;
pub mod slug;
