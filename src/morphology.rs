use crate::image::Image;

/// Grayscale 3x3 dilation. Border pixels are handled by clamping the
/// neighborhood to the image, which matches replicated-border semantics.
pub fn dilate(src: &Image, dst: &mut Image) {
    neighborhood_3x3(src, dst, u8::max);
}

/// Grayscale 3x3 erosion.
pub fn erode(src: &Image, dst: &mut Image) {
    neighborhood_3x3(src, dst, u8::min);
}

fn neighborhood_3x3(src: &Image, dst: &mut Image, pick: impl Fn(u8, u8) -> u8) {
    let w = src.width as i32;
    let h = src.height as i32;
    dst.reset(src.width, src.height);
    for y in 0..h {
        for x in 0..w {
            let mut value = src.value_i32(x, y);
            for dy in -1..=1 {
                for dx in -1..=1 {
                    let xi = (x + dx).clamp(0, w - 1);
                    let yi = (y + dy).clamp(0, h - 1);
                    value = pick(value, src.value_i32(xi, yi));
                }
            }
            dst.data[(y * w + x) as usize] = value;
        }
    }
}

/// Normalized box filter, run as two separable passes with replicated
/// borders. `ksize` must be odd; a kernel of 1 copies the input.
pub fn box_blur(src: &Image, dst: &mut Image, scratch: &mut Image, ksize: usize) {
    assert!(ksize % 2 == 1, "box filter kernel must be odd");
    blur_pass(src, scratch, ksize, false);
    blur_pass(scratch, dst, ksize, true);
}

fn blur_pass(src: &Image, dst: &mut Image, ksize: usize, vertical: bool) {
    let w = src.width;
    let h = src.height;
    dst.reset(w, h);
    let r = (ksize / 2) as i32;
    let half = (ksize / 2) as u32;
    // `outer` scans the axis perpendicular to the kernel, `inner` along it.
    let (outer_len, inner_len) = if vertical { (w, h) } else { (h, w) };
    let clamp_max = inner_len as i32 - 1;
    for outer in 0..outer_len {
        let at = |inner: i32| -> u32 {
            let inner = inner.clamp(0, clamp_max) as usize;
            let (x, y) = if vertical { (outer, inner) } else { (inner, outer) };
            src.value(x, y) as u32
        };
        let mut sum = 0;
        for i in -r..=r {
            sum += at(i);
        }
        for inner in 0..inner_len {
            let value = ((sum + half) / ksize as u32) as u8;
            let (x, y) = if vertical { (outer, inner) } else { (inner, outer) };
            dst.data[y * w + x] = value;
            sum += at(inner as i32 + r + 1);
            sum -= at(inner as i32 - r);
        }
    }
}
