//! End-to-end stabilization: ordered frames in, stabilized frames plus
//! the raw and smoothed trajectories out.

use nalgebra::Point2;
use vstab_core::geometry::Transform;
use vstab_features::create_detector;
use vstab_videoio::Video;

use crate::config::StabConfig;
use crate::estimate::{accumulate_transforms, estimate_pairwise, frame_center};
use crate::render::{
    correction_transforms, overlay_correspondences, overlay_trajectories, transform_video,
};
use crate::trajectory::{extract_trajectory, smooth_trajectory_adaptive};

/// Everything the pipeline exposes to rendering/display collaborators:
/// the stabilized (uncropped) frames, both trajectories for optional
/// visualization, and the per-frame corrections the crop solver needs.
#[derive(Debug, Clone)]
pub struct StabOutput {
    pub video: Video,
    pub trajectory: Vec<Point2<f64>>,
    pub smoothed: Vec<Point2<f64>>,
    pub corrections: Vec<Transform>,
}

/// Run the full motion-estimation and motion-smoothing pipeline.
///
/// Per-pair estimation failures are recovered inside the pairwise stage
/// (identity substitution), so this never fails on bad frame content.
/// Zero- and one-frame inputs short-circuit to a no-op.
pub fn stabilize(video: &Video, config: &StabConfig) -> StabOutput {
    let n = video.len();

    if n <= 1 {
        log::info!("{n} frame(s): nothing to stabilize");
        let center = video
            .dimensions()
            .map(|(w, h)| frame_center(w, h))
            .unwrap_or_else(|| Point2::new(0.0, 0.0));
        let trajectory = vec![center; n];
        return StabOutput {
            video: video.clone(),
            trajectory: trajectory.clone(),
            smoothed: trajectory,
            corrections: vec![Transform::identity(); n],
        };
    }

    // Dimensions come from frame 0; the container guarantees order.
    let (width, height) = video.dimensions().expect("non-empty video");

    log::info!("estimating transformations for {n} frames");
    let detector = create_detector(config.detector, config.seed);
    let pairwise = estimate_pairwise(video, detector.as_ref(), config);
    let accumulated = accumulate_transforms(&pairwise.transforms);

    log::info!("extracting motion");
    let trajectory = extract_trajectory(frame_center(width, height), &accumulated);

    log::info!("smoothing motion");
    let budget = config.crop_budget * f64::from(width.min(height));
    let (smoothed, radius) =
        smooth_trajectory_adaptive(&trajectory, config.smoothing_radius, budget);
    if radius < config.smoothing_radius {
        log::info!(
            "smoothing radius reduced to {radius} (bound {}) to respect the crop budget",
            config.smoothing_radius
        );
    }

    log::info!("transforming frames");
    let corrections = correction_transforms(&accumulated, &trajectory, &smoothed);
    let mut warped = transform_video(video, &corrections);

    if config.debug {
        overlay_correspondences(&mut warped, &pairwise.correspondences);
        overlay_trajectories(&mut warped, &trajectory, &smoothed);
    }

    StabOutput {
        video: warped,
        trajectory,
        smoothed,
        corrections,
    }
}
