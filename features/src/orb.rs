//! Oriented multi-scale FAST detection with steered BRIEF descriptors.

use crate::descriptor::{Descriptor, Descriptors};
use crate::fast::fast_detect;
use crate::FeatureDetector;
use image::GrayImage;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use vstab_core::{KeyPoint, KeyPoints};

const DESCRIPTOR_BITS: usize = 256;

pub struct Orb {
    n_features: usize,
    scale_factor: f32,
    n_levels: usize,
    patch_size: i32,
    fast_threshold: u8,
    /// BRIEF test pairs in patch coordinates, rotated per keypoint.
    pattern: Vec<(f32, f32, f32, f32)>,
}

impl Orb {
    /// The seed fixes the BRIEF sampling pattern so descriptors are
    /// comparable across runs.
    pub fn new(seed: u64) -> Self {
        let patch_size = 31;
        Self {
            n_features: 500,
            scale_factor: 1.2,
            n_levels: 4,
            patch_size,
            fast_threshold: 20,
            pattern: generate_brief_pattern(patch_size, seed),
        }
    }

    pub fn with_n_features(mut self, n: usize) -> Self {
        self.n_features = n;
        self
    }

    pub fn with_n_levels(mut self, n: usize) -> Self {
        self.n_levels = n;
        self
    }

    pub fn with_fast_threshold(mut self, threshold: u8) -> Self {
        self.fast_threshold = threshold;
        self
    }

    /// Detect keypoints with FAST across an image pyramid, reporting
    /// coordinates at full resolution.
    pub fn detect(&self, image: &GrayImage) -> KeyPoints {
        let mut all_keypoints = Vec::new();
        let mut scale = 1.0f32;

        for level in 0..self.n_levels {
            let scaled = if level == 0 {
                image.clone()
            } else {
                downscale(image, scale)
            };
            if scaled.width() < 8 || scaled.height() < 8 {
                break;
            }

            let kps = fast_detect(&scaled, self.fast_threshold, self.n_features * 2);
            for kp in kps.keypoints {
                all_keypoints.push(
                    KeyPoint::new(kp.x * scale as f64, kp.y * scale as f64)
                        .with_size(self.patch_size as f64 * scale as f64)
                        .with_octave(level as i32)
                        .with_response(kp.response),
                );
            }

            scale *= self.scale_factor;
        }

        all_keypoints.sort_by(|a, b| {
            b.response
                .partial_cmp(&a.response)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        all_keypoints.truncate(self.n_features);

        KeyPoints {
            keypoints: all_keypoints,
        }
    }

    /// Orientation from the intensity centroid of the patch around each
    /// keypoint.
    pub fn compute_orientations(&self, image: &GrayImage, keypoints: &mut KeyPoints) {
        let half_patch = self.patch_size / 2;

        for kp in &mut keypoints.keypoints {
            let cx = kp.x as i32;
            let cy = kp.y as i32;

            let mut m01 = 0.0f64;
            let mut m10 = 0.0f64;

            for dy in -half_patch..half_patch {
                for dx in -half_patch..half_patch {
                    let px = cx + dx;
                    let py = cy + dy;
                    if px >= 0
                        && px < image.width() as i32
                        && py >= 0
                        && py < image.height() as i32
                    {
                        let intensity = image.get_pixel(px as u32, py as u32)[0] as f64;
                        m01 += intensity * dy as f64;
                        m10 += intensity * dx as f64;
                    }
                }
            }

            kp.angle = m01.atan2(m10).to_degrees();
        }
    }

    fn describe_one(&self, image: &GrayImage, kp: &KeyPoint) -> Option<Descriptor> {
        let width = image.width() as i32;
        let height = image.height() as i32;
        let cx = kp.x as i32;
        let cy = kp.y as i32;

        let half_patch = self.patch_size / 2;
        if cx < half_patch
            || cx >= width - half_patch
            || cy < half_patch
            || cy >= height - half_patch
        {
            return None;
        }

        let angle_rad = kp.angle.to_radians();
        let cos_a = angle_rad.cos() as f32;
        let sin_a = angle_rad.sin() as f32;

        let mut data = vec![0u8; DESCRIPTOR_BITS / 8];

        for (i, &(x1, y1, x2, y2)) in self.pattern.iter().enumerate() {
            let rx1 = cos_a * x1 - sin_a * y1;
            let ry1 = sin_a * x1 + cos_a * y1;
            let rx2 = cos_a * x2 - sin_a * y2;
            let ry2 = sin_a * x2 + cos_a * y2;

            let px1 = (cx as f32 + rx1).round() as i32;
            let py1 = (cy as f32 + ry1).round() as i32;
            let px2 = (cx as f32 + rx2).round() as i32;
            let py2 = (cy as f32 + ry2).round() as i32;

            let v1 = sample(image, px1, py1);
            let v2 = sample(image, px2, py2);

            if v1 < v2 {
                data[i / 8] |= 1 << (i % 8);
            }
        }

        Some(Descriptor::new(data))
    }
}

impl FeatureDetector for Orb {
    fn detect_and_describe(&self, image: &GrayImage) -> (KeyPoints, Descriptors) {
        let mut keypoints = self.detect(image);
        self.compute_orientations(image, &mut keypoints);

        // Keypoints too close to the border get no descriptor; drop them
        // so the two collections stay index-aligned.
        let mut kept = KeyPoints::with_capacity(keypoints.len());
        let mut descriptors = Descriptors::with_capacity(keypoints.len());
        for kp in keypoints.iter() {
            if let Some(desc) = self.describe_one(image, kp) {
                kept.push(*kp);
                descriptors.push(desc);
            }
        }

        (kept, descriptors)
    }
}

fn generate_brief_pattern(patch_size: i32, seed: u64) -> Vec<(f32, f32, f32, f32)> {
    let mut rng = StdRng::seed_from_u64(seed);
    let half = patch_size as f32 / 2.0;

    (0..DESCRIPTOR_BITS)
        .map(|_| {
            (
                rng.gen_range(-half..half),
                rng.gen_range(-half..half),
                rng.gen_range(-half..half),
                rng.gen_range(-half..half),
            )
        })
        .collect()
}

fn sample(image: &GrayImage, x: i32, y: i32) -> u8 {
    if x >= 0 && x < image.width() as i32 && y >= 0 && y < image.height() as i32 {
        image.get_pixel(x as u32, y as u32)[0]
    } else {
        0
    }
}

fn downscale(image: &GrayImage, scale: f32) -> GrayImage {
    let new_width = ((image.width() as f32 / scale) as u32).max(1);
    let new_height = ((image.height() as f32 / scale) as u32).max(1);
    image::imageops::resize(
        image,
        new_width,
        new_height,
        image::imageops::FilterType::Triangle,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn textured_image(seed: u64) -> GrayImage {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut img = GrayImage::new(128, 128);
        for _ in 0..60 {
            let x0 = rng.gen_range(0..112u32);
            let y0 = rng.gen_range(0..112u32);
            let w = rng.gen_range(4..16u32);
            let h = rng.gen_range(4..16u32);
            let v = rng.gen_range(0..=255u8);
            for y in y0..(y0 + h).min(128) {
                for x in x0..(x0 + w).min(128) {
                    img.put_pixel(x, y, Luma([v]));
                }
            }
        }
        img
    }

    #[test]
    fn keypoints_and_descriptors_stay_aligned() {
        let img = textured_image(1);
        let orb = Orb::new(0).with_n_features(200);
        let (kps, descs) = orb.detect_and_describe(&img);
        assert_eq!(kps.len(), descs.len());
        assert!(!kps.is_empty());
        for d in descs.iter() {
            assert_eq!(d.size(), DESCRIPTOR_BITS / 8);
        }
    }

    #[test]
    fn same_seed_gives_same_descriptors() {
        let img = textured_image(2);
        let a = Orb::new(9).detect_and_describe(&img);
        let b = Orb::new(9).detect_and_describe(&img);
        assert_eq!(a.0.len(), b.0.len());
        for (da, db) in a.1.iter().zip(b.1.iter()) {
            assert_eq!(da.data, db.data);
        }
    }

    #[test]
    fn blank_image_yields_empty_output() {
        let img = GrayImage::new(64, 64);
        let (kps, descs) = Orb::new(0).detect_and_describe(&img);
        assert!(kps.is_empty());
        assert!(descs.is_empty());
    }
}
