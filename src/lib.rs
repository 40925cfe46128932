//! `critmc` is a multigroup Monte Carlo toolkit for estimating the
//! multiplication factor of simple cartesian systems
//!
#![doc = include_str!("../readme.md")]
#![deny(missing_docs, missing_debug_implementations)]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

// Re-exports of toolkit crates.
#[doc(inline)]
pub use critmc_utils as utils;

#[cfg(feature = "geometry")]
#[cfg_attr(docsrs, doc(cfg(feature = "geometry")))]
#[doc(inline)]
pub use critmc_geometry as geometry;

#[cfg(feature = "material")]
#[cfg_attr(docsrs, doc(cfg(feature = "material")))]
#[doc(inline)]
pub use critmc_material as material;

#[cfg(feature = "transport")]
#[cfg_attr(docsrs, doc(cfg(feature = "transport")))]
#[doc(inline)]
pub use critmc_transport as transport;
