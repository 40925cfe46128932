//! Multigroup material cross sections
#![doc = include_str!("../readme.md")]

mod error;
mod material;

#[doc(inline)]
pub use material::{Material, MaterialData};

#[doc(inline)]
pub use error::{Error, Result};
