use crate::{Result, VideoCapture, VideoError, VideoWriter};
use image::GrayImage;
use std::fs;
use std::path::{Path, PathBuf};

const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "bmp", "tiff"];

/// Reads frames from a directory of image files, sorted by file name.
/// Zero-padded numbering keeps presentation order stable.
#[derive(Debug)]
pub struct ImageSequenceCapture {
    paths: Vec<PathBuf>,
    current_idx: usize,
}

impl ImageSequenceCapture {
    pub fn new<P: AsRef<Path>>(directory: P) -> Result<Self> {
        let directory = directory.as_ref();
        let mut paths: Vec<PathBuf> = fs::read_dir(directory)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| {
                p.extension()
                    .and_then(|e| e.to_str())
                    .map(|ext| {
                        IMAGE_EXTENSIONS
                            .iter()
                            .any(|known| ext.eq_ignore_ascii_case(known))
                    })
                    .unwrap_or(false)
            })
            .collect();

        if paths.is_empty() {
            return Err(VideoError::Backend(format!(
                "no image files in {}",
                directory.display()
            )));
        }

        paths.sort();

        Ok(Self {
            paths,
            current_idx: 0,
        })
    }
}

impl VideoCapture for ImageSequenceCapture {
    fn is_opened(&self) -> bool {
        !self.paths.is_empty()
    }

    fn read(&mut self) -> Result<GrayImage> {
        let Some(path) = self.paths.get(self.current_idx) else {
            return Err(VideoError::EndOfStream);
        };
        self.current_idx += 1;

        let img = image::open(path)
            .map_err(|e| VideoError::Backend(format!("failed to decode {}: {e}", path.display())))?;
        Ok(img.into_luma8())
    }
}

/// Writes frames as zero-padded numbered PNGs.
#[derive(Debug)]
pub struct PngSequenceWriter {
    directory: PathBuf,
    prefix: String,
    frame_count: usize,
}

impl PngSequenceWriter {
    pub fn new(directory: &Path, prefix: &str) -> Result<Self> {
        if !directory.exists() {
            fs::create_dir_all(directory)?;
        }

        Ok(Self {
            directory: directory.to_path_buf(),
            prefix: prefix.to_string(),
            frame_count: 0,
        })
    }
}

impl VideoWriter for PngSequenceWriter {
    fn write(&mut self, frame: &GrayImage) -> Result<()> {
        let filename = format!("{}_{:06}.png", self.prefix, self.frame_count);
        let path = self.directory.join(filename);

        frame
            .save(&path)
            .map_err(|e| VideoError::Backend(format!("failed to save frame: {e}")))?;
        self.frame_count += 1;
        Ok(())
    }
}
