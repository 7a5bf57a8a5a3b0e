//! Error type shared by every operation in the crate.

/// Failures surfaced by image construction, configuration, and equalization.
///
/// Every variant is raised before any pixel of the caller's image is written.
#[derive(Debug, thiserror::Error)]
pub enum EqualizeError {
    #[error("mask is {}x{} but image is {}x{}", .mask.0, .mask.1, .image.0, .image.1)]
    DimensionMismatch {
        image: (u32, u32),
        mask: (u32, u32),
    },
    #[error("image has no pixels")]
    EmptyImage,
    #[error("pixel buffer holds {actual} values, expected {expected}")]
    PixelCount { expected: usize, actual: usize },
    #[error("invalid parameter {name}: {value} (must be finite and > 0)")]
    InvalidParameter {
        name: &'static str,
        value: f64,
    },
    #[error("degenerate mask: no valid pixels")]
    DegenerateMask,
    #[error("degenerate scale estimate in pass {pass}: divisor {divisor}")]
    DegenerateScale { pass: u8, divisor: f32 },
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, EqualizeError>;
