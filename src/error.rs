use vstab_videoio::VideoError;

pub type Result<T> = std::result::Result<T, StabError>;

#[derive(Debug, thiserror::Error)]
pub enum StabError {
    /// Too few matches to fit a homography for one frame pair.
    /// Recovered locally by substituting identity; never aborts a run.
    #[error("insufficient correspondences: found {found}, need at least {needed}")]
    InsufficientCorrespondences { found: usize, needed: usize },

    /// The fitted transform is non-invertible or wildly implausible.
    /// Recovered locally the same way.
    #[error("degenerate transform for frame pair")]
    DegenerateTransform,

    /// No rectangle is valid across every warped frame. Fatal to the
    /// cropping stage only; callers may keep the uncropped output.
    #[error("no valid crop region common to all frames")]
    NoValidCropRegion,

    #[error(transparent)]
    Video(#[from] VideoError),
}
