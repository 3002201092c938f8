//! Offline batch video stabilization.
//!
//! The pipeline estimates pairwise planar homographies from feature
//! correspondences, accumulates them into per-frame transforms anchored
//! at frame 0, smooths the induced centre trajectory to separate
//! intentional motion from jitter, re-renders every frame along the
//! smoothed path, and solves the crop window valid across the whole
//! sequence.

pub use vstab_core as core;
pub use vstab_features as features;
pub use vstab_imgproc as imgproc;
pub use vstab_videoio as videoio;

pub mod config;
pub mod crop;
pub mod error;
pub mod estimate;
pub mod pipeline;
pub mod render;
pub mod trajectory;

pub use config::StabConfig;
pub use crop::{apply_crop, compute_crop, CropRect};
pub use error::{Result, StabError};
pub use pipeline::{stabilize, StabOutput};
