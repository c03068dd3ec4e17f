//! Command implementations for the Runset CLI.

pub mod classes;
pub mod labels;
pub mod launch;
