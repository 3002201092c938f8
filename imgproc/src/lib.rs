pub mod draw;
pub mod warp;

pub use draw::*;
pub use warp::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    Nearest,
    Linear,
}

/// What a resampling read outside the source image returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderMode {
    /// Fill with a constant value.
    Constant(u8),
    /// Clamp to the nearest edge pixel.
    Replicate,
}
