//! Drawing primitives for debug overlays.
//!
//! These are observational only: the pipeline draws on copies of frames
//! after the numeric stages have finished.

use image::{GrayImage, Luma};

/// Bresenham line.
pub fn draw_line(img: &mut GrayImage, p1: (i32, i32), p2: (i32, i32), value: u8) {
    let (mut x0, mut y0) = p1;
    let (x1, y1) = p2;

    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        put_pixel_safe(img, x0, y0, value);
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

/// Line with a small two-stroke head at `p2`.
pub fn draw_arrow(img: &mut GrayImage, p1: (i32, i32), p2: (i32, i32), value: u8) {
    draw_line(img, p1, p2, value);

    let dx = (p2.0 - p1.0) as f64;
    let dy = (p2.1 - p1.1) as f64;
    let len = (dx * dx + dy * dy).sqrt();
    if len < 1.0 {
        return;
    }

    let head = 4.0f64.min(len * 0.3);
    let angle = dy.atan2(dx);
    for side in [-1.0, 1.0] {
        let a = angle + std::f64::consts::PI + side * 0.5;
        let hx = p2.0 + (head * a.cos()).round() as i32;
        let hy = p2.1 + (head * a.sin()).round() as i32;
        draw_line(img, p2, (hx, hy), value);
    }
}

/// Midpoint circle outline.
pub fn draw_circle(img: &mut GrayImage, center: (i32, i32), radius: i32, value: u8) {
    let (cx, cy) = center;
    let mut x = radius;
    let mut y = 0;
    let mut err = 1 - radius;

    while x >= y {
        for (px, py) in [
            (cx + x, cy + y),
            (cx - x, cy + y),
            (cx + x, cy - y),
            (cx - x, cy - y),
            (cx + y, cy + x),
            (cx - y, cy + x),
            (cx + y, cy - x),
            (cx - y, cy - x),
        ] {
            put_pixel_safe(img, px, py, value);
        }
        y += 1;
        if err < 0 {
            err += 2 * y + 1;
        } else {
            x -= 1;
            err += 2 * (y - x) + 1;
        }
    }
}

fn put_pixel_safe(img: &mut GrayImage, x: i32, y: i32, value: u8) {
    if x >= 0 && x < img.width() as i32 && y >= 0 && y < img.height() as i32 {
        img.put_pixel(x as u32, y as u32, Luma([value]));
    }
}
