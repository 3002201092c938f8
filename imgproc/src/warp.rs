//! Projective image warping with inverse mapping.
//!
//! `warp_perspective` takes the matrix that maps *destination*
//! coordinates to *source* coordinates and samples the source for every
//! destination pixel, row-parallel.

use crate::{BorderMode, Interpolation};
use image::GrayImage;
use nalgebra::{Matrix3, Point2};
use rayon::prelude::*;
use vstab_core::geometry::map_point;

fn sample_pixel(img: &GrayImage, x: isize, y: isize, border: BorderMode) -> f32 {
    let width = img.width() as isize;
    let height = img.height() as isize;

    match border {
        BorderMode::Constant(v) => {
            if x < 0 || x >= width || y < 0 || y >= height {
                v as f32
            } else {
                img.as_raw()[(y * width + x) as usize] as f32
            }
        }
        BorderMode::Replicate => {
            let ix = x.clamp(0, width - 1);
            let iy = y.clamp(0, height - 1);
            img.as_raw()[(iy * width + ix) as usize] as f32
        }
    }
}

fn get_pixel_bilinear(img: &GrayImage, x: f32, y: f32, border: BorderMode) -> f32 {
    let x0 = x.floor() as isize;
    let y0 = y.floor() as isize;
    let x1 = x0 + 1;
    let y1 = y0 + 1;

    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let v00 = sample_pixel(img, x0, y0, border);
    let v10 = sample_pixel(img, x1, y0, border);
    let v01 = sample_pixel(img, x0, y1, border);
    let v11 = sample_pixel(img, x1, y1, border);

    let v0 = v00 * (1.0 - fx) + v10 * fx;
    let v1 = v01 * (1.0 - fx) + v11 * fx;

    v0 * (1.0 - fy) + v1 * fy
}

fn get_pixel_nearest(img: &GrayImage, x: f32, y: f32, border: BorderMode) -> f32 {
    sample_pixel(img, x.round() as isize, y.round() as isize, border)
}

fn interpolate_sample(
    src: &GrayImage,
    x: f32,
    y: f32,
    interpolation: Interpolation,
    border: BorderMode,
) -> f32 {
    match interpolation {
        Interpolation::Nearest => get_pixel_nearest(src, x, y, border),
        Interpolation::Linear => get_pixel_bilinear(src, x, y, border),
    }
}

pub fn warp_perspective_ex(
    src: &GrayImage,
    dst_to_src: &Matrix3<f64>,
    width: u32,
    height: u32,
    interpolation: Interpolation,
    border: BorderMode,
) -> GrayImage {
    let mut dst = GrayImage::new(width, height);

    dst.as_mut()
        .par_chunks_mut(width as usize)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, out) in row.iter_mut().enumerate() {
                let src_pt = map_point(dst_to_src, &Point2::new(x as f64, y as f64));
                let val = interpolate_sample(
                    src,
                    src_pt.x as f32,
                    src_pt.y as f32,
                    interpolation,
                    border,
                );
                *out = val.clamp(0.0, 255.0) as u8;
            }
        });

    dst
}

/// Warp with bilinear interpolation and black border fill, the policy
/// the stabilization renderer uses.
pub fn warp_perspective(
    src: &GrayImage,
    dst_to_src: &Matrix3<f64>,
    width: u32,
    height: u32,
) -> GrayImage {
    warp_perspective_ex(
        src,
        dst_to_src,
        width,
        height,
        Interpolation::Linear,
        BorderMode::Constant(0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use vstab_core::geometry::translation;

    #[test]
    fn identity_warp_preserves_pixels() {
        let mut img = GrayImage::new(7, 7);
        img.put_pixel(5, 4, Luma([180]));
        let out = warp_perspective(&img, &Matrix3::identity(), 7, 7);
        assert_eq!(out.get_pixel(5, 4)[0], 180);
    }

    #[test]
    fn translation_warp_moves_content() {
        let mut img = GrayImage::new(8, 8);
        img.put_pixel(2, 2, Luma([255]));

        // dst(x, y) samples src(x - 2, y - 1): content moves by (+2, +1).
        let dst_to_src = translation(-2.0, -1.0);
        let out = warp_perspective_ex(
            &img,
            &dst_to_src,
            8,
            8,
            Interpolation::Nearest,
            BorderMode::Constant(0),
        );
        assert_eq!(out.get_pixel(4, 3)[0], 255);
        assert_eq!(out.get_pixel(2, 2)[0], 0);
    }

    #[test]
    fn out_of_bounds_reads_use_border_fill() {
        let mut img = GrayImage::new(4, 4);
        for y in 0..4 {
            for x in 0..4 {
                img.put_pixel(x, y, Luma([200]));
            }
        }

        // Shift content right by 2: leftmost columns come from outside.
        let out = warp_perspective(&img, &translation(-2.0, 0.0), 4, 4);
        assert_eq!(out.get_pixel(0, 0)[0], 0);
        assert_eq!(out.get_pixel(3, 0)[0], 200);
    }

    #[test]
    fn replicate_border_clamps_to_edge() {
        let mut img = GrayImage::new(4, 4);
        img.put_pixel(0, 0, Luma([99]));
        let v = sample_pixel(&img, -3, -3, BorderMode::Replicate);
        assert_eq!(v, 99.0);
    }
}
