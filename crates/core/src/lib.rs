//! # Chromap Core
//!
//! Canonical color-map model and color primitives for the Chromap
//! conversion engine.
//!
//! This crate provides:
//! - `ColorEntry` / `ColorMap`: the canonical in-memory model
//! - Hex ⇄ RGB conversion with output-path clamping
//! - CSS/X11 named-color lookup and single-token color resolution
//! - Non-strict label template expansion

pub mod color;
pub mod error;
pub mod label;
pub mod model;
pub mod named;

pub use error::{Error, Result};
pub use model::{ColorEntry, ColorMap};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::color::{clamp_channel, hex_to_rgb, rgb_to_hex};
    pub use crate::error::{Error, Result};
    pub use crate::label::expand_template;
    pub use crate::model::{ColorEntry, ColorMap};
    pub use crate::named::{named_to_rgb, resolve_color_token};
}
