//! Pairwise motion estimation: correspondences and robust transforms
//! for every adjacent frame pair, then accumulation into the global
//! chain.

use nalgebra::Point2;
use rayon::prelude::*;
use vstab_core::geometry::{self, Transform};
use vstab_features::{match_with_ratio_test, estimate_homography, FeatureDetector, PointPair};
use vstab_videoio::Video;

use crate::config::StabConfig;
use crate::error::{Result, StabError};

/// Minimal correspondence count for a homography.
const MIN_CORRESPONDENCES: usize = 4;

/// Everything the pairwise stage produces: one transform per adjacent
/// pair (mapping frame `i+1` coordinates into frame `i` space) and the
/// surviving correspondences, kept for debug overlays.
#[derive(Debug, Clone)]
pub struct PairwiseMotion {
    pub transforms: Vec<Transform>,
    pub correspondences: Vec<Vec<PointPair>>,
}

/// Extract correspondences between two adjacent frames.
///
/// Descriptors of frame `i` are matched against their two nearest
/// neighbours in frame `i+1`; only unambiguous matches survive the
/// ratio test. An empty result is a valid outcome (featureless frames),
/// not an error.
pub fn extract_correspondences(
    detector: &dyn FeatureDetector,
    current: &image::GrayImage,
    next: &image::GrayImage,
    ratio_threshold: f32,
) -> Vec<PointPair> {
    let (kps_current, desc_current) = detector.detect_and_describe(current);
    let (kps_next, desc_next) = detector.detect_and_describe(next);

    if desc_current.is_empty() || desc_next.is_empty() {
        return Vec::new();
    }

    let good = match_with_ratio_test(&desc_current, &desc_next, ratio_threshold);

    good.iter()
        .map(|m| PointPair {
            src: (kps_next.keypoints[m.train_idx].x, kps_next.keypoints[m.train_idx].y),
            dst: (
                kps_current.keypoints[m.query_idx].x,
                kps_current.keypoints[m.query_idx].y,
            ),
        })
        .collect()
}

/// Fit the robust planar transform for one frame pair.
///
/// Fails with `InsufficientCorrespondences` or `DegenerateTransform`;
/// both are local conditions the caller recovers from with identity.
pub fn estimate_pair_transform(pairs: &[PointPair], config: &StabConfig) -> Result<Transform> {
    if pairs.len() < MIN_CORRESPONDENCES {
        return Err(StabError::InsufficientCorrespondences {
            found: pairs.len(),
            needed: MIN_CORRESPONDENCES,
        });
    }

    let result = estimate_homography(pairs, &config.ransac_config());
    let model = result.model.ok_or(StabError::DegenerateTransform)?;

    if geometry::is_degenerate(&model) {
        return Err(StabError::DegenerateTransform);
    }

    Ok(geometry::normalize(&model))
}

/// Estimate transforms for all `N-1` adjacent pairs, in parallel.
///
/// Pairs are independent, so each worker owns one result slot and the
/// collected vector comes back in frame order. Per-pair failures are
/// recovered here: a bad pair contributes identity ("no detected
/// motion"), never aborts the run.
pub fn estimate_pairwise(video: &Video, detector: &dyn FeatureDetector, config: &StabConfig) -> PairwiseMotion {
    let n = video.len();
    if n < 2 {
        return PairwiseMotion {
            transforms: Vec::new(),
            correspondences: Vec::new(),
        };
    }

    let results: Vec<(Transform, Vec<PointPair>)> = (0..n - 1)
        .into_par_iter()
        .map(|i| {
            let pairs =
                extract_correspondences(detector, &video[i], &video[i + 1], config.ratio_threshold);
            let transform = match estimate_pair_transform(&pairs, config) {
                Ok(t) => t,
                Err(e) => {
                    log::warn!("frame pair {i}->{}: {e}; substituting identity", i + 1);
                    Transform::identity()
                }
            };
            (transform, pairs)
        })
        .collect();

    let mut transforms = Vec::with_capacity(n - 1);
    let mut correspondences = Vec::with_capacity(n - 1);
    for (t, c) in results {
        transforms.push(t);
        correspondences.push(c);
    }

    PairwiseMotion {
        transforms,
        correspondences,
    }
}

/// Accumulated per-frame transforms, identity-anchored at frame 0.
pub fn accumulate_transforms(pairwise: &[Transform]) -> Vec<Transform> {
    geometry::accumulate(pairwise)
}

/// The reference point tracked through the transform chain: the frame
/// centre.
pub fn frame_center(width: u32, height: u32) -> Point2<f64> {
    Point2::new(width as f64 / 2.0, height as f64 / 2.0)
}
