//! Crop/fit solving: the largest axis-aligned rectangle free of
//! warp-induced border fill in every stabilized frame.

use nalgebra::Point2;
use vstab_core::geometry::{map_point, Transform};
use vstab_videoio::Video;

use crate::error::{Result, StabError};

/// Axis-aligned rectangle in output coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    pub fn full_frame(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }
}

/// Conservative interval of output coordinates covered by one warped
/// frame: the axis-aligned rectangle inscribed in the projected frame
/// quadrilateral.
fn covered_interval(correction: &Transform, width: f64, height: f64) -> (f64, f64, f64, f64) {
    let tl = map_point(correction, &Point2::new(0.0, 0.0));
    let tr = map_point(correction, &Point2::new(width, 0.0));
    let bl = map_point(correction, &Point2::new(0.0, height));
    let br = map_point(correction, &Point2::new(width, height));

    let left = tl.x.max(bl.x);
    let right = tr.x.min(br.x);
    let top = tl.y.max(tr.y);
    let bottom = bl.y.min(br.y);

    (left, right, top, bottom)
}

/// Intersect the covered intervals of all frames with the output
/// canvas. The result is valid for every frame simultaneously; an empty
/// intersection is a reportable failure, not a silent fallback.
pub fn compute_crop(corrections: &[Transform], width: u32, height: u32) -> Result<CropRect> {
    let w = width as f64;
    let h = height as f64;

    let mut left = 0.0f64;
    let mut right = w;
    let mut top = 0.0f64;
    let mut bottom = h;

    for correction in corrections {
        let (l, r, t, b) = covered_interval(correction, w, h);
        left = left.max(l);
        right = right.min(r);
        top = top.max(t);
        bottom = bottom.min(b);
    }

    // Snap away sub-micro: estimation dust must not shave a pixel off
    // an exact boundary.
    const EPS: f64 = 1e-6;
    let x0 = (left - EPS).ceil();
    let y0 = (top - EPS).ceil();
    let x1 = (right + EPS).floor();
    let y1 = (bottom + EPS).floor();

    if x1 - x0 < 1.0 || y1 - y0 < 1.0 {
        return Err(StabError::NoValidCropRegion);
    }

    Ok(CropRect {
        x: x0 as u32,
        y: y0 as u32,
        width: (x1 - x0) as u32,
        height: (y1 - y0) as u32,
    })
}

/// Cut every frame down to the common rectangle.
pub fn apply_crop(video: &Video, rect: CropRect) -> Video {
    let frames = video
        .iter()
        .map(|frame| {
            image::imageops::crop_imm(frame, rect.x, rect.y, rect.width, rect.height).to_image()
        })
        .collect();
    Video::from_frames(frames)
}
