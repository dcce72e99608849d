//! Reporting utilities: recovery error and formatted terminal output.

pub mod format;

pub use format::*;
