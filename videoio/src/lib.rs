//! Frame sequence input/output.
//!
//! Decoding containers is a collaborator concern: the stabilizer only
//! needs an ordered, index-addressable frame sequence. Backends cover
//! directories of numbered images and animated GIFs; anything needing
//! system codec libraries stays behind an external conversion step.

use image::GrayImage;
use std::fmt::Debug;
use std::ops::Index;
use std::path::Path;

pub mod backends;

pub type Result<T> = std::result::Result<T, VideoError>;

#[derive(Debug, thiserror::Error)]
pub enum VideoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Unsupported input: {0}")]
    UnsupportedFormat(String),

    #[error("End of stream")]
    EndOfStream,
}

/// Generic interface for frame sources.
pub trait VideoCapture: Send + Debug {
    fn is_opened(&self) -> bool;
    fn read(&mut self) -> Result<GrayImage>;
}

/// Generic interface for frame sinks.
pub trait VideoWriter: Send + Debug {
    fn write(&mut self, frame: &GrayImage) -> Result<()>;
}

/// An ordered, immutable sequence of decoded frames. Presentation order
/// is load-bearing: every per-frame array downstream is indexed the
/// same way.
#[derive(Debug, Clone, Default)]
pub struct Video {
    frames: Vec<GrayImage>,
}

impl Video {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_frames(frames: Vec<GrayImage>) -> Self {
        Self { frames }
    }

    pub fn push(&mut self, frame: GrayImage) {
        self.frames.push(frame);
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Width and height of the first frame, or `None` when empty.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.frames.first().map(|f| f.dimensions())
    }

    pub fn get(&self, index: usize) -> Option<&GrayImage> {
        self.frames.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GrayImage> {
        self.frames.iter()
    }

    pub fn frames(&self) -> &[GrayImage] {
        &self.frames
    }

    /// Mutable frame access, for overlay observers drawing on copies.
    pub fn frames_mut(&mut self) -> &mut [GrayImage] {
        &mut self.frames
    }

    pub fn into_frames(self) -> Vec<GrayImage> {
        self.frames
    }
}

impl Index<usize> for Video {
    type Output = GrayImage;

    fn index(&self, index: usize) -> &GrayImage {
        &self.frames[index]
    }
}

/// Open a frame source for `path`: a directory of numbered images or an
/// animated GIF file.
pub fn open_capture<P: AsRef<Path>>(path: P) -> Result<Box<dyn VideoCapture>> {
    let path = path.as_ref();

    if path.is_dir() {
        return Ok(Box::new(backends::ImageSequenceCapture::new(path)?));
    }

    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("gif") => {
            Ok(Box::new(backends::GifCapture::new(path)?))
        }
        _ => Err(VideoError::UnsupportedFormat(format!(
            "{}: expected a directory of images or a .gif file",
            path.display()
        ))),
    }
}

/// Drain a capture into an in-memory `Video`.
pub fn read_video<P: AsRef<Path>>(path: P) -> Result<Video> {
    let mut capture = open_capture(path)?;
    let mut video = Video::new();
    loop {
        match capture.read() {
            Ok(frame) => video.push(frame),
            Err(VideoError::EndOfStream) => break,
            Err(e) => return Err(e),
        }
    }
    Ok(video)
}

/// Write every frame as a numbered PNG under `directory`.
pub fn write_video<P: AsRef<Path>>(video: &Video, directory: P, prefix: &str) -> Result<()> {
    let mut writer = backends::PngSequenceWriter::new(directory.as_ref(), prefix)?;
    for frame in video.iter() {
        writer.write(frame)?;
    }
    Ok(())
}
