use std::f32::consts::PI;

use crate::contour::FlatContour;
use crate::image::RgbImage;
use crate::tracker::{HorizonEstimate, TrackedLine};
use crate::types::Vector2f;

const LINE_COLOR: [u8; 3] = [255, 0, 0];
const REGION_TINT: [u8; 3] = [40, 120, 255];

/// Lower bound on sin(angle) in the edge projection. Tracked angles this
/// close to 0 or pi would otherwise blow up the division below.
pub const MIN_SIN_ANGLE: f32 = 1e-3;

/// Draw the current estimate into the output frame.
pub fn draw(estimate: &HorizonEstimate, frame: &mut RgbImage) {
    match estimate {
        HorizonEstimate::Line(line) => draw_line(line, frame),
        HorizonEstimate::Region(region) => draw_region(region, frame),
    }
}

/// Intersect the polar line with the left and right frame columns. The
/// angle is clamped away from 0 and pi first, so the result is always
/// finite; a clamped line simply projects far outside the frame and draws
/// nothing.
pub fn line_endpoints(line: &TrackedLine, width: usize) -> (Vector2f, Vector2f) {
    let angle = line.angle.clamp(MIN_SIN_ANGLE, PI - MIN_SIN_ANGLE);
    let sin = angle.sin();
    let cos = angle.cos();
    let x1 = width as f32 - 1.0;
    let y0 = line.offset / sin;
    let y1 = (line.offset - x1 * cos) / sin;
    (Vector2f::new(0.0, y0), Vector2f::new(x1, y1))
}

fn draw_line(line: &TrackedLine, frame: &mut RgbImage) {
    let (a, b) = line_endpoints(line, frame.width);
    draw_segment(frame, a, b, LINE_COLOR);
}

/// Translucent fill of the flattened sky region plus its boundary drawn in
/// per-pixel inverse color. Only pixels inside the region mask are touched.
fn draw_region(region: &FlatContour, frame: &mut RgbImage) {
    let points = &region.points;
    if points.len() < 2 {
        return;
    }
    let x_left = points[0].x.ceil().max(0.0) as usize;
    let x_right = points[points.len() - 1].x.floor() as usize;
    let x_right = x_right.min(frame.width.saturating_sub(1));
    for x in x_left..=x_right {
        let boundary = match boundary_y_at(points, x as f32) {
            Some(y) if y >= 0.0 => y,
            _ => continue,
        };
        let y_end = (boundary.floor() as usize).min(frame.height.saturating_sub(1));
        for y in 0..=y_end {
            let p = frame.pixel(x, y);
            frame.set_pixel(x, y, blend(p, REGION_TINT));
        }
    }
    // Inversion is not idempotent, so each segment leaves its end vertex to
    // the next one and the last vertex is handled on its own.
    for pair in points.windows(2) {
        invert_segment(frame, pair[0], pair[1]);
    }
    if let Some(last) = points.last() {
        invert_cell(frame, last.x.round() as i64, last.y.round() as i64);
    }
}

/// Lowest boundary crossing of the given column, interpolated along the
/// span segments.
fn boundary_y_at(points: &[Vector2f], x: f32) -> Option<f32> {
    let mut best: Option<f32> = None;
    for pair in points.windows(2) {
        let (p, q) = (pair[0], pair[1]);
        if x < p.x.min(q.x) || x > p.x.max(q.x) {
            continue;
        }
        let y = if p.x == q.x {
            p.y.max(q.y)
        } else {
            p.y + (x - p.x) / (q.x - p.x) * (q.y - p.y)
        };
        best = Some(best.map_or(y, |b: f32| b.max(y)));
    }
    best
}

/// 40% tint blend, in integer arithmetic.
fn blend(old: [u8; 3], tint: [u8; 3]) -> [u8; 3] {
    let mut out = [0u8; 3];
    for c in 0..3 {
        out[c] = ((3 * u16::from(old[c]) + 2 * u16::from(tint[c])) / 5) as u8;
    }
    out
}

pub fn draw_segment(frame: &mut RgbImage, a: Vector2f, b: Vector2f, color: [u8; 3]) {
    let (w, h) = (frame.width as i64, frame.height as i64);
    bresenham(a, b, |x, y| {
        if x >= 0 && y >= 0 && x < w && y < h {
            frame.set_pixel(x as usize, y as usize, color);
        }
    });
}

/// Invert every cell from `a` up to but not including `b`.
fn invert_segment(frame: &mut RgbImage, a: Vector2f, b: Vector2f) {
    let end = (b.x.round() as i64, b.y.round() as i64);
    bresenham(a, b, |x, y| {
        if (x, y) != end {
            invert_cell(frame, x, y);
        }
    });
}

fn invert_cell(frame: &mut RgbImage, x: i64, y: i64) {
    if x >= 0 && y >= 0 && x < frame.width as i64 && y < frame.height as i64 {
        let p = frame.pixel(x as usize, y as usize);
        frame.set_pixel(x as usize, y as usize, [255 - p[0], 255 - p[1], 255 - p[2]]);
    }
}

/// Integer Bresenham walk from `a` to `b`, calling `plot` on every cell.
/// Coordinates may lie outside the frame; callers bounds-check in `plot`.
fn bresenham(a: Vector2f, b: Vector2f, mut plot: impl FnMut(i64, i64)) {
    let mut x0 = a.x.round() as i64;
    let mut y0 = a.y.round() as i64;
    let x1 = b.x.round() as i64;
    let y1 = b.y.round() as i64;
    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        plot(x0, y0);
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
