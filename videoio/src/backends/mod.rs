//! Frame source/sink backends.

pub mod gif;
pub mod image_sequence;

pub use gif::GifCapture;
pub use image_sequence::{ImageSequenceCapture, PngSequenceWriter};
