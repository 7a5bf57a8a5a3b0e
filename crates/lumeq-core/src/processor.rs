//! In-place filter seam.
//!
//! Each filter is an independent transformation over a [`FloatImage`]; callers
//! compose them with [`FloatImage::process_inline`].

use crate::error::Result;
use crate::image::FloatImage;

/// A filter that rewrites an image in place.
///
/// Implementations must leave the image untouched when they return an error.
pub trait ImageProcessor {
    fn process(&self, image: &mut FloatImage) -> Result<()>;
}
