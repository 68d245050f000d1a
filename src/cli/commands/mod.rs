//! Command implementations.

pub mod enums;
pub mod run;
pub mod version;
