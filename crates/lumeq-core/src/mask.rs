//! Binary validity masks and the region selector used by the equalizer.
//!
//! A valid cell contributes to statistics and keeps a non-zero output; an
//! invalid cell is excluded from statistics and zeroed.

use std::borrow::Cow;

use crate::error::{EqualizeError, Result};
use crate::image::FloatImage;

/// Same-sized boolean grid marking which pixels take part in equalization.
///
/// Dimensions and cells are only set together through the constructors, so
/// `cells.len() == width * height` always holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: u32,
    height: u32,
    cells: Vec<bool>,
}

impl Mask {
    /// Every cell valid.
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![true; width as usize * height as usize],
        }
    }

    /// Every cell invalid.
    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![false; width as usize * height as usize],
        }
    }

    /// Wrap a row-major cell buffer.
    pub fn from_cells(width: u32, height: u32, cells: Vec<bool>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if cells.len() != expected {
            return Err(EqualizeError::PixelCount {
                expected,
                actual: cells.len(),
            });
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Build a mask by evaluating `f(x, y)` for every cell.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> bool) -> Self {
        let mut cells = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                cells.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            cells,
        }
    }

    /// Interpret a float image as a mask: a cell is valid only where the pixel is exactly `1.0`.
    pub fn from_float_image(image: &FloatImage) -> Self {
        Self {
            width: image.width,
            height: image.height,
            cells: image.pixels.iter().map(|&v| v == 1.0).collect(),
        }
    }

    /// Interpret an 8-bit grayscale buffer as a mask: any non-zero value is valid.
    pub fn from_luma8(buffer: &image::GrayImage) -> Self {
        let (width, height) = buffer.dimensions();
        Self {
            width,
            height,
            cells: buffer.as_raw().iter().map(|&v| v != 0).collect(),
        }
    }

    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Whether `(x, y)` is valid. Panics when out of bounds.
    #[inline]
    pub fn is_valid(&self, x: u32, y: u32) -> bool {
        self.cells[y as usize * self.width as usize + x as usize]
    }

    /// Row-major cell slice.
    #[inline]
    pub fn cells(&self) -> &[bool] {
        &self.cells
    }

    /// Number of valid cells.
    pub fn valid_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }
}

/// Which pixels an equalization call covers.
#[derive(Debug, Clone, Copy, Default)]
pub enum Region<'a> {
    /// No mask supplied: the whole image is valid.
    #[default]
    Full,
    /// Only cells marked valid in the mask.
    Masked(&'a Mask),
}

impl<'a> Region<'a> {
    /// Resolve to a concrete mask for an image of `dimensions`.
    ///
    /// `Full` becomes an owned all-valid mask; `Masked` is borrowed after its
    /// dimensions and cell count are checked against the image.
    pub fn resolve(self, dimensions: (u32, u32)) -> Result<Cow<'a, Mask>> {
        let mask = match self {
            Self::Full => return Ok(Cow::Owned(Mask::full(dimensions.0, dimensions.1))),
            Self::Masked(mask) => mask,
        };
        if mask.dimensions() != dimensions {
            return Err(EqualizeError::DimensionMismatch {
                image: dimensions,
                mask: mask.dimensions(),
            });
        }
        let expected = dimensions.0 as usize * dimensions.1 as usize;
        if mask.cells.len() != expected {
            return Err(EqualizeError::PixelCount {
                expected,
                actual: mask.cells.len(),
            });
        }
        Ok(Cow::Borrowed(mask))
    }
}

impl<'a> From<Option<&'a Mask>> for Region<'a> {
    fn from(mask: Option<&'a Mask>) -> Self {
        mask.map_or(Self::Full, Self::Masked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_float_image_only_exact_one_is_valid() {
        let img = FloatImage::from_pixels(4, 1, vec![1.0, 0.999, 0.0, 2.0]).unwrap();
        let mask = Mask::from_float_image(&img);
        assert_eq!(mask.cells(), &[true, false, false, false]);
        assert_eq!(mask.valid_count(), 1);
    }

    #[test]
    fn test_from_luma8_nonzero_is_valid() {
        let buffer = image::GrayImage::from_raw(3, 1, vec![0, 1, 255]).unwrap();
        let mask = Mask::from_luma8(&buffer);
        assert_eq!(mask.cells(), &[false, true, true]);
    }

    #[test]
    fn test_from_fn_is_row_major() {
        let mask = Mask::from_fn(3, 2, |x, y| x == 2 && y == 1);
        assert!(mask.is_valid(2, 1));
        assert!(mask.cells()[5]);
        assert_eq!(mask.valid_count(), 1);
    }

    #[test]
    fn test_from_cells_rejects_wrong_length() {
        assert!(Mask::from_cells(2, 2, vec![true; 3]).is_err());
    }

    #[test]
    fn test_full_region_resolves_to_all_valid() {
        let mask = Region::Full.resolve((3, 2)).unwrap();
        assert_eq!(mask.valid_count(), 6);
        assert!(matches!(mask, Cow::Owned(_)));
    }

    #[test]
    fn test_masked_region_checks_dimensions() {
        let mask = Mask::full(2, 3);
        let err = Region::Masked(&mask).resolve((3, 2)).unwrap_err();
        assert!(matches!(err, EqualizeError::DimensionMismatch { image: (3, 2), mask: (2, 3) }));
        assert!(matches!(Region::Masked(&mask).resolve((2, 3)).unwrap(), Cow::Borrowed(_)));
    }

    #[test]
    fn test_masked_region_rejects_cell_count_not_matching_dimensions() {
        // A 2x2 cell buffer labelled 1x9 must not reach the equalizer.
        let mask = Mask {
            width: 1,
            height: 9,
            cells: vec![true, false, true, false],
        };
        let err = Region::Masked(&mask).resolve((1, 9)).unwrap_err();
        assert!(matches!(err, EqualizeError::PixelCount { expected: 9, actual: 4 }));
    }

    #[test]
    fn test_constructors_keep_cells_consistent_with_dimensions() {
        let img = FloatImage::filled(4, 3, 1.0);
        let buffer = image::GrayImage::new(5, 2);
        for mask in [
            Mask::full(3, 7),
            Mask::empty(2, 5),
            Mask::from_fn(6, 4, |x, _| x % 2 == 0),
            Mask::from_float_image(&img),
            Mask::from_luma8(&buffer),
        ] {
            let (w, h) = mask.dimensions();
            assert_eq!(mask.cells().len(), w as usize * h as usize);
            assert!(Region::Masked(&mask).resolve((w, h)).is_ok());
        }
    }

    #[test]
    fn test_region_from_option() {
        let mask = Mask::empty(1, 1);
        assert!(matches!(Region::from(None), Region::Full));
        assert!(matches!(Region::from(Some(&mask)), Region::Masked(_)));
    }
}
