//! Lumeq Core — masked robust contrast equalization for single-channel float images.
//!
//! The crate normalizes illumination over the valid region of an image using two
//! power-mean scale estimates followed by a saturating `tanh` compression.
//! No decoding, display, or framework dependencies.

pub mod equalize;
pub mod error;
pub mod image;
pub mod mask;
pub mod params;
pub mod processor;

// Re-exports for convenience.
pub use equalize::{ContrastEqualizer, EqualizationStats, equalize};
pub use error::{EqualizeError, Result};
pub use crate::image::FloatImage;
pub use mask::{Mask, Region};
pub use params::EqualizationParams;
pub use processor::ImageProcessor;
