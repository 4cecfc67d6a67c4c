// Utility functions

pub mod format;

pub use format::*;
