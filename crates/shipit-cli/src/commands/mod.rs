//! Command implementations.
//!
//! - [`zip`] - package a functions directory
//! - [`deps`] - print the dependency closure of an entry file

pub mod deps;
pub(crate) mod utils;
pub mod zip;

pub use deps::execute as deps_execute;
pub use zip::execute as zip_execute;
