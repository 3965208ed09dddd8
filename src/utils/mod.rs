//! Utility functions and helpers.

pub mod date;
pub mod log;
pub mod url;
