//! Core foundation layer.
//!
//! Bottom layer of the crate with no internal dependencies; every
//! other layer depends on core.
//!
//! # Contents
//!
//! - [`types`]: Poses, twists, time-indexed history
//! - [`math`]: Angular arithmetic
//! - [`polygon`]: Point-in-polygon predicate for area queries

pub mod math;
pub mod polygon;
pub mod types;
