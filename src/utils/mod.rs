//! Shared utilities.

pub mod date;
pub mod fs;
pub mod slug;
