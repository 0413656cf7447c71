//! WyldMUD Core - Fundamental types and utilities

mod error;
mod types;
mod refgen;

pub use error::*;
pub use types::*;
pub use refgen::*;
