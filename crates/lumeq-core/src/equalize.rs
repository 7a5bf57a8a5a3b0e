//! Masked robust contrast equalization.
//!
//! Normalizes illumination over the valid region of an image in three passes:
//!
//! ```text
//! d1  = mean(|I|^α)^(1/α)                      over valid pixels
//! d2  = mean(min(τ, |I / d1|)^α)^(1/α)          over valid pixels
//! out = τ · tanh(I / d1 / d2 / τ)  if valid, 0 otherwise
//! ```
//!
//! Both divisors are power means, so the result is invariant to a positive
//! rescaling of the input. The `min(τ, ·)` clamp keeps residual outliers from
//! dominating the second estimate, and the final `tanh` bounds every valid
//! output inside `(-τ, τ)`.
//!
//! Both statistics are gathered before the first write, so a failure at any
//! stage leaves the caller's image exactly as it was. Accumulation runs in `f64`
//! in fixed row-major order on the calling thread, which makes repeated calls
//! bit-identical.

use serde::{Deserialize, Serialize};

use crate::error::{EqualizeError, Result};
use crate::image::FloatImage;
use crate::mask::{Mask, Region};
use crate::params::EqualizationParams;
use crate::processor::ImageProcessor;

/// Scale estimates produced by one equalization call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EqualizationStats {
    /// Number of mask cells that contributed to the statistics.
    pub valid_pixels: usize,
    /// First-pass power-mean divisor.
    pub first_divisor: f32,
    /// Second-pass clamped power-mean divisor, measured after dividing by `first_divisor`.
    pub second_divisor: f32,
}

/// Equalize `image` in place over `region`.
///
/// # Errors
/// - [`EqualizeError::InvalidParameter`] when `alpha` or `tau` is not finite and positive
/// - [`EqualizeError::EmptyImage`] / [`EqualizeError::PixelCount`] for a malformed image
/// - [`EqualizeError::DimensionMismatch`] when the mask size differs from the image
/// - [`EqualizeError::DegenerateMask`] when no cell is valid
/// - [`EqualizeError::DegenerateScale`] when a divisor is zero or not finite
pub fn equalize(
    image: &mut FloatImage,
    region: Region<'_>,
    params: &EqualizationParams,
) -> Result<EqualizationStats> {
    params.validate()?;
    check_image(image)?;
    let mask = region.resolve(image.dimensions())?;

    match equalize_masked(image, &mask, params) {
        Ok(stats) => {
            tracing::debug!(
                valid_pixels = stats.valid_pixels,
                first_divisor = stats.first_divisor,
                second_divisor = stats.second_divisor,
                "contrast equalization applied"
            );
            Ok(stats)
        }
        Err(e) => {
            tracing::warn!("contrast equalization skipped: {e}");
            Err(e)
        }
    }
}

fn check_image(image: &FloatImage) -> Result<()> {
    let expected = image.width as usize * image.height as usize;
    if expected == 0 {
        return Err(EqualizeError::EmptyImage);
    }
    if image.pixels.len() != expected {
        return Err(EqualizeError::PixelCount {
            expected,
            actual: image.pixels.len(),
        });
    }
    Ok(())
}

fn equalize_masked(
    image: &mut FloatImage,
    mask: &Mask,
    params: &EqualizationParams,
) -> Result<EqualizationStats> {
    let valid_pixels = mask.valid_count();
    if valid_pixels == 0 {
        return Err(EqualizeError::DegenerateMask);
    }

    let EqualizationParams { alpha, tau } = *params;

    let first = power_mean(
        valid_values(image, mask).map(|v| f64::from(v).abs()),
        valid_pixels,
        alpha,
    );
    let first = checked_divisor(1, first)?;

    // Pixel values as pass 1 would have left them, rounded to f32.
    let second = power_mean(
        valid_values(image, mask).map(|v| f64::from(v / first).abs().min(tau)),
        valid_pixels,
        alpha,
    );
    let second = checked_divisor(2, second)?;

    let bound = below(tau as f32);
    for (px, &valid) in image.pixels.iter_mut().zip(mask.cells()) {
        *px = if valid {
            let v = f64::from(*px / first / second);
            ((tau * (v / tau).tanh()) as f32).clamp(-bound, bound)
        } else {
            0.0
        };
    }

    Ok(EqualizationStats {
        valid_pixels,
        first_divisor: first,
        second_divisor: second,
    })
}

fn valid_values<'a>(image: &'a FloatImage, mask: &'a Mask) -> impl Iterator<Item = f32> + 'a {
    image
        .pixels
        .iter()
        .zip(mask.cells())
        .filter_map(|(&v, &valid)| valid.then_some(v))
}

/// `(Σ xᵢ^α / n)^(1/α)`, rounded to the image precision.
fn power_mean(values: impl Iterator<Item = f64>, count: usize, alpha: f64) -> f32 {
    let sum: f64 = values.map(|v| v.powf(alpha)).sum();
    (sum / count as f64).powf(1.0 / alpha) as f32
}

fn checked_divisor(pass: u8, divisor: f32) -> Result<f32> {
    if divisor.is_finite() && divisor > 0.0 {
        Ok(divisor)
    } else {
        Err(EqualizeError::DegenerateScale { pass, divisor })
    }
}

/// Largest `f32` strictly below a positive `x`.
///
/// `tanh` rounds to exactly `1.0` for large arguments; clamping here keeps
/// outputs strictly inside `(-tau, tau)`.
fn below(x: f32) -> f32 {
    if x > 0.0 {
        f32::from_bits(x.to_bits() - 1)
    } else {
        0.0
    }
}

/// Reusable equalizer holding its parameters and an optional mask.
#[derive(Debug, Clone, Default)]
pub struct ContrastEqualizer {
    params: EqualizationParams,
    mask: Option<Mask>,
}

impl ContrastEqualizer {
    /// Default parameters, no mask.
    pub fn new() -> Self {
        Self::default()
    }

    /// Custom parameters, no mask.
    pub fn with_params(params: EqualizationParams) -> Result<Self> {
        params.validate()?;
        Ok(Self { params, mask: None })
    }

    /// Attach a mask; subsequent calls only equalize its valid cells.
    pub fn with_mask(mut self, mask: Mask) -> Self {
        self.mask = Some(mask);
        self
    }

    pub fn set_mask(&mut self, mask: Mask) {
        self.mask = Some(mask);
    }

    pub fn clear_mask(&mut self) {
        self.mask = None;
    }

    pub fn mask(&self) -> Option<&Mask> {
        self.mask.as_ref()
    }

    pub fn params(&self) -> &EqualizationParams {
        &self.params
    }

    /// Equalize `image` in place. See [`equalize`].
    pub fn equalize(&self, image: &mut FloatImage) -> Result<EqualizationStats> {
        equalize(image, Region::from(self.mask.as_ref()), &self.params)
    }
}

impl ImageProcessor for ContrastEqualizer {
    fn process(&self, image: &mut FloatImage) -> Result<()> {
        self.equalize(image).map(|_| ())
    }
}
