use thiserror::Error;

#[derive(Error, Debug)]
pub enum SedError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Invalid radius: {0} (must be positive and finite)")]
    InvalidRadius(f64),

    #[error("Center ({row}, {col}) outside frame of {width}x{height}")]
    CenterOutOfRange {
        row: f64,
        col: f64,
        height: usize,
        width: usize,
    },

    #[error("Expected {expected} entries (one per navigation index), got {actual}")]
    NavigationMismatch { expected: usize, actual: usize },

    #[error("Frame shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("Beam refinement did not converge after {iterations} iterations (last candidate: {row}, {col})")]
    NotConverged {
        iterations: usize,
        row: usize,
        col: usize,
    },

    #[error("Affine matrix is singular")]
    SingularMatrix,

    #[error("Unsupported interpolation order: {0} (expected 0, 1 or 3)")]
    UnsupportedInterpolation(u8),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Empty frame stack")]
    EmptyStack,

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, SedError>;
