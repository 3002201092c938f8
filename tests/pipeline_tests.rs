//! End-to-end pipeline scenarios on synthetic sequences.

use image::{GrayImage, Luma};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use vstab::trajectory::delta_variance;
use vstab::{apply_crop, compute_crop, stabilize, CropRect, StabConfig};
use vstab_videoio::Video;

const WIDTH: u32 = 240;
const HEIGHT: u32 = 160;
const MARGIN: u32 = 20;

/// A wide, distinctively textured backdrop: random gray rectangles on a
/// mid-gray field, so corners are plentiful and descriptors unambiguous.
fn textured_backdrop(seed: u64) -> GrayImage {
    let full_w = WIDTH + 2 * MARGIN;
    let mut rng = StdRng::seed_from_u64(seed);
    let mut img = GrayImage::from_pixel(full_w, HEIGHT, Luma([128]));

    for _ in 0..120 {
        let x0 = rng.gen_range(0..full_w - 12);
        let y0 = rng.gen_range(0..HEIGHT - 12);
        let w = rng.gen_range(4..12);
        let h = rng.gen_range(4..12);
        let v = rng.gen_range(0..=255u8);
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                img.put_pixel(x, y, Luma([v]));
            }
        }
    }

    img
}

/// Frame `i` views the backdrop shifted right by `offset_per_frame * i`
/// pixels: pure horizontal camera translation, no content change.
fn translated_sequence(n: usize, offset_per_frame: i64) -> Video {
    let backdrop = textured_backdrop(99);
    let mut frames = Vec::with_capacity(n);

    for i in 0..n {
        let mut frame = GrayImage::new(WIDTH, HEIGHT);
        for y in 0..HEIGHT {
            for x in 0..WIDTH {
                let sx = x as i64 + MARGIN as i64 - offset_per_frame * i as i64;
                let v = backdrop.get_pixel(sx as u32, y)[0];
                frame.put_pixel(x, y, Luma([v]));
            }
        }
        frames.push(frame);
    }

    Video::from_frames(frames)
}

#[test]
fn translation_sequence_recovers_motion_and_crop() {
    let n = 5;
    let video = translated_sequence(n, 2);
    let config = StabConfig::default().with_seed(4);

    let output = stabilize(&video, &config);

    assert_eq!(output.trajectory.len(), n);
    assert_eq!(output.smoothed.len(), n);
    assert_eq!(output.corrections.len(), n);
    assert_eq!(output.video.len(), n);

    // Accumulated motion: frame i maps into frame 0 space by shifting
    // content back, i.e. a translation of -2i pixels.
    for (i, c) in output.corrections.iter().enumerate() {
        assert!(
            (c[(0, 2)] + 2.0 * i as f64).abs() < 0.75,
            "frame {i}: tx = {}, expected {}",
            c[(0, 2)],
            -2.0 * i as f64
        );
        assert!(c[(1, 2)].abs() < 0.75, "frame {i}: ty = {}", c[(1, 2)]);
    }

    // The raw trajectory is a straight horizontal line.
    let y0 = output.trajectory[0].y;
    for (i, p) in output.trajectory.iter().enumerate() {
        assert!((p.y - y0).abs() < 0.75, "frame {i}: y = {}", p.y);
        let expected_x = output.trajectory[0].x - 2.0 * i as f64;
        assert!((p.x - expected_x).abs() < 0.75, "frame {i}: x = {}", p.x);
    }

    // Crop loses the total drift: about 2*(N-1) columns, no rows.
    let rect = compute_crop(&output.corrections, WIDTH, HEIGHT).unwrap();
    let expected_width = WIDTH - 2 * (n as u32 - 1);
    assert!(
        rect.width >= expected_width - 2 && rect.width <= expected_width + 2,
        "crop width {} not near {expected_width}",
        rect.width
    );
    assert!(rect.height >= HEIGHT - 2);

    let cropped = apply_crop(&output.video, rect);
    assert_eq!(cropped.dimensions(), Some((rect.width, rect.height)));
    assert_eq!(cropped.len(), n);
}

#[test]
fn identity_sequence_round_trips() {
    let frame = {
        let backdrop = textured_backdrop(7);
        image::imageops::crop_imm(&backdrop, MARGIN, 0, WIDTH, HEIGHT).to_image()
    };
    let video = Video::from_frames(vec![frame; 4]);
    let config = StabConfig::default().with_seed(1);

    let output = stabilize(&video, &config);

    // No motion: the crop solver keeps the full frame.
    let rect = compute_crop(&output.corrections, WIDTH, HEIGHT).unwrap();
    assert_eq!(rect, CropRect::full_frame(WIDTH, HEIGHT));

    // Warped output matches the input within interpolation tolerance.
    for i in 0..video.len() {
        for y in (0..HEIGHT).step_by(7) {
            for x in (0..WIDTH).step_by(7) {
                let a = video[i].get_pixel(x, y)[0] as i32;
                let b = output.video[i].get_pixel(x, y)[0] as i32;
                assert!(
                    (a - b).abs() <= 2,
                    "frame {i} pixel ({x}, {y}): {a} vs {b}"
                );
            }
        }
    }
}

#[test]
fn jittery_pan_is_smoother_after_stabilization() {
    // A pan with alternating jitter: +3, +1, +3, +1, ... pixels.
    let backdrop = textured_backdrop(23);
    let mut frames = Vec::new();
    let mut offset = 0i64;
    for i in 0..8 {
        let mut frame = GrayImage::new(WIDTH, HEIGHT);
        for y in 0..HEIGHT {
            for x in 0..WIDTH {
                let sx = (x as i64 + MARGIN as i64 - offset) as u32;
                frame.put_pixel(x, y, *backdrop.get_pixel(sx, y));
            }
        }
        frames.push(frame);
        offset += if i % 2 == 0 { 3 } else { 1 };
    }

    let video = Video::from_frames(frames);
    let config = StabConfig::default().with_seed(2).with_smoothing_radius(3);
    let output = stabilize(&video, &config);

    assert!(delta_variance(&output.smoothed) < delta_variance(&output.trajectory));
}
