//! Localization orchestration layer.
//!
//! Ties the estimation, vision, and transform layers into a single
//! per-tick context object.
//!
//! # Contents
//!
//! - [`localizer`]: tick entry point, camera routing, diagnostics

pub mod localizer;

pub use localizer::{
    CameraFrame, Diagnostics, Localizer, LocalizerConfig, OdometryInput, TickInput,
};
