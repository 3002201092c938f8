pub mod descriptor;
pub mod fast;
pub mod matcher;
pub mod orb;
pub mod ransac;

pub use descriptor::*;
pub use fast::*;
pub use matcher::*;
pub use orb::*;
pub use ransac::*;

use image::GrayImage;
use vstab_core::KeyPoints;

/// Runtime capability interface for keypoint detection and description.
///
/// Any detector that yields keypoints with fixed-length binary
/// descriptors fits here; the pipeline selects a concrete detector at
/// configuration time. The two returned collections are index-aligned:
/// `descriptors[i]` describes `keypoints[i]`.
pub trait FeatureDetector: Send + Sync {
    fn detect_and_describe(&self, image: &GrayImage) -> (KeyPoints, Descriptors);
}

/// Concrete detectors selectable at configuration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorKind {
    /// Oriented multi-scale FAST with steered BRIEF descriptors.
    Orb,
}

pub fn create_detector(kind: DetectorKind, seed: u64) -> Box<dyn FeatureDetector> {
    match kind {
        DetectorKind::Orb => Box::new(Orb::new(seed)),
    }
}
