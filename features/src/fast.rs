//! FAST-9 corner detection.
//!
//! A pixel is a corner when at least 9 of the 12 sampled circle
//! positions are all brighter or all darker than the centre by the
//! threshold. Corners are ranked by their contiguity score so callers
//! get the strongest responses first.

use image::GrayImage;
use vstab_core::{KeyPoint, KeyPoints};

const CIRCLE_OFFSETS: [(i32, i32); 12] = [
    (-3, 0),
    (-2, 1),
    (-1, 2),
    (0, 3),
    (1, 2),
    (2, 1),
    (3, 0),
    (2, -1),
    (1, -2),
    (0, -3),
    (-1, -2),
    (-2, -1),
];

pub fn fast_detect(image: &GrayImage, threshold: u8, max_keypoints: usize) -> KeyPoints {
    let width = image.width() as i32;
    let height = image.height() as i32;
    let mut keypoints = Vec::new();

    for y in 3..height - 3 {
        for x in 3..width - 3 {
            let p = image.get_pixel(x as u32, y as u32)[0];

            let mut brighter = 0u32;
            let mut darker = 0u32;

            for &(dx, dy) in &CIRCLE_OFFSETS {
                let val = image.get_pixel((x + dx) as u32, (y + dy) as u32)[0];
                if val > p.saturating_add(threshold) {
                    brighter += 1;
                } else if val < p.saturating_sub(threshold) {
                    darker += 1;
                }
            }

            if brighter >= 9 || darker >= 9 {
                let kp = KeyPoint::new(x as f64, y as f64)
                    .with_response(brighter.max(darker) as f64);
                keypoints.push(kp);
            }
        }
    }

    keypoints.sort_by(|a, b| {
        b.response
            .partial_cmp(&a.response)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    keypoints.truncate(max_keypoints);

    KeyPoints { keypoints }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn detects_corner_of_bright_square() {
        let mut img = GrayImage::new(32, 32);
        for y in 10..22 {
            for x in 10..22 {
                img.put_pixel(x, y, Luma([255]));
            }
        }

        let kps = fast_detect(&img, 20, 100);
        assert!(!kps.is_empty());
        // All detections sit on or near the square's boundary.
        for kp in kps.iter() {
            assert!(kp.x >= 7.0 && kp.x <= 24.0);
            assert!(kp.y >= 7.0 && kp.y <= 24.0);
        }
    }

    #[test]
    fn flat_image_has_no_corners() {
        let img = GrayImage::new(32, 32);
        let kps = fast_detect(&img, 20, 100);
        assert!(kps.is_empty());
    }

    #[test]
    fn respects_keypoint_budget() {
        let mut img = GrayImage::new(64, 64);
        for y in 0..64 {
            for x in 0..64 {
                let v = if (x / 8 + y / 8) % 2 == 0 { 255 } else { 0 };
                img.put_pixel(x, y, Luma([v]));
            }
        }
        let kps = fast_detect(&img, 20, 10);
        assert!(kps.len() <= 10);
    }
}
