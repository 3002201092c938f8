//! Correction transforms, frame warping, and debug overlays.

use nalgebra::Point2;
use rayon::prelude::*;
use vstab_core::geometry::{normalize, translation, Transform};
use vstab_features::PointPair;
use vstab_imgproc::{draw_arrow, draw_circle, warp_perspective};
use vstab_videoio::Video;

/// Per-frame correction: the accumulated transform shifted so the
/// reference point lands on the smoothed trajectory instead of the raw
/// one.
pub fn correction_transforms(
    accumulated: &[Transform],
    raw: &[Point2<f64>],
    smoothed: &[Point2<f64>],
) -> Vec<Transform> {
    accumulated
        .iter()
        .zip(raw.iter().zip(smoothed.iter()))
        .map(|(acc, (r, s))| normalize(&(translation(s.x - r.x, s.y - r.y) * acc)))
        .collect()
}

/// Resample every frame through its correction transform, in parallel.
/// Output frames keep the input dimensions; uncovered regions get the
/// black border fill the crop solver accounts for.
pub fn transform_video(video: &Video, corrections: &[Transform]) -> Video {
    let frames: Vec<image::GrayImage> = video
        .frames()
        .par_iter()
        .zip(corrections.par_iter())
        .map(|(frame, correction)| {
            // Inverse mapping: the warp samples source pixels per
            // destination pixel. Corrections are built from
            // non-degenerate homographies, so the inverse exists.
            let dst_to_src = correction.try_inverse().unwrap_or_else(Transform::identity);
            warp_perspective(frame, &dst_to_src, frame.width(), frame.height())
        })
        .collect();

    Video::from_frames(frames)
}

const ARROW_VALUE: u8 = 255;
const RAW_TRACE_VALUE: u8 = 230;
const SMOOTH_TRACE_VALUE: u8 = 90;

/// Debug overlay: an arrow from each source point to its matched
/// destination on the frame where the match originated. Drawn on the
/// output copies only, after all numeric stages have finished.
pub fn overlay_correspondences(video: &mut Video, correspondences: &[Vec<PointPair>]) {
    for (frame, pairs) in video.frames_mut().iter_mut().zip(correspondences.iter()) {
        for pair in pairs {
            let from = (pair.dst.0.round() as i32, pair.dst.1.round() as i32);
            let to = (pair.src.0.round() as i32, pair.src.1.round() as i32);
            draw_arrow(frame, from, to, ARROW_VALUE);
        }
    }
}

/// Debug overlay: growing traces of the raw (light) and smoothed (dark)
/// trajectories. Frame `j` shows every trajectory point up to `j`.
pub fn overlay_trajectories(video: &mut Video, raw: &[Point2<f64>], smoothed: &[Point2<f64>]) {
    let frames = video.frames_mut();
    for j in 0..frames.len() {
        for i in 0..=j.min(raw.len().saturating_sub(1)) {
            let r = (raw[i].x.round() as i32, raw[i].y.round() as i32);
            let s = (smoothed[i].x.round() as i32, smoothed[i].y.round() as i32);
            draw_circle(&mut frames[j], r, 2, RAW_TRACE_VALUE);
            draw_circle(&mut frames[j], s, 2, SMOOTH_TRACE_VALUE);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    #[test]
    fn identity_corrections_reproduce_input() {
        let mut frame = GrayImage::new(12, 10);
        frame.put_pixel(6, 5, Luma([210]));
        let video = Video::from_frames(vec![frame.clone(), frame]);

        let corrections = vec![Transform::identity(); 2];
        let warped = transform_video(&video, &corrections);

        assert_eq!(warped.len(), 2);
        for i in 0..2 {
            assert_eq!(warped[i].get_pixel(6, 5)[0], 210);
            assert_eq!(warped[i].get_pixel(0, 0)[0], 0);
        }
    }

    #[test]
    fn correction_moves_reference_onto_smoothed_point() {
        use vstab_core::geometry::map_point;

        let acc = translation(-4.0, 0.0);
        let raw = vec![Point2::new(16.0, 20.0)];
        let smoothed = vec![Point2::new(18.0, 20.0)];

        let corrections = correction_transforms(&[acc], &raw, &smoothed);
        // The point that raw-maps to `raw[0]` must now land on
        // `smoothed[0]`.
        let source = Point2::new(20.0, 20.0);
        let mapped = map_point(&corrections[0], &source);
        assert!((mapped.x - 18.0).abs() < 1e-9);
        assert!((mapped.y - 20.0).abs() < 1e-9);
    }

    #[test]
    fn overlays_do_not_resize_video() {
        let video_frames = vec![GrayImage::new(32, 32); 3];
        let mut video = Video::from_frames(video_frames);
        let raw = vec![Point2::new(16.0, 16.0); 3];
        let smoothed = raw.clone();

        overlay_trajectories(&mut video, &raw, &smoothed);
        overlay_correspondences(
            &mut video,
            &[vec![PointPair {
                src: (4.0, 4.0),
                dst: (8.0, 8.0),
            }]],
        );

        assert_eq!(video.len(), 3);
        assert_eq!(video.dimensions(), Some((32, 32)));
    }
}
