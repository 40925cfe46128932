//! Common utility for extended `std` types
//!
//! These are left public for convenience.
//!
//! For example, prettier formatting for scientific numbers and checked
//! operations on slices of cross section data are useful everywhere.
#![doc = include_str!("../readme.md")]

// Alias for the format! macro
pub use std::format as f;

// Modules
mod error;
mod slice_ext;
mod value_ext;

// Flatten
pub use error::{Error, Result};
pub use slice_ext::SliceExt;
pub use value_ext::ValueExt;
