use image::{Rgba, RgbaImage};

/// Copy `src` into `canvas` with its top-left corner at (dx, dy).
///
/// Atlas cells are disjoint, so this is a plain pixel copy; pixels falling
/// outside the canvas are dropped.
pub fn blit_rgba(src: &RgbaImage, canvas: &mut RgbaImage, dx: u32, dy: u32) {
    let (cw, ch) = canvas.dimensions();
    let (sw, sh) = src.dimensions();
    for yy in 0..sh {
        if dy + yy >= ch {
            break;
        }
        for xx in 0..sw {
            if dx + xx >= cw {
                break;
            }
            canvas.put_pixel(dx + xx, dy + yy, *src.get_pixel(xx, yy));
        }
    }
}

/// Standard alpha-over blend of `src` onto `dst` (non-premultiplied RGBA).
///
/// A fully opaque source replaces the destination exactly; a fully
/// transparent source leaves it untouched.
pub fn over(dst: Rgba<u8>, src: Rgba<u8>) -> Rgba<u8> {
    let sa = src[3] as u32;
    let da = dst[3] as u32;
    let out_a = sa + da * (255 - sa) / 255;
    if out_a == 0 {
        return Rgba([0, 0, 0, 0]);
    }
    let mut out = [0u8; 4];
    for c in 0..3 {
        let sc = src[c] as u32;
        let dc = dst[c] as u32;
        out[c] = ((sc * sa + dc * da * (255 - sa) / 255) / out_a) as u8;
    }
    out[3] = out_a as u8;
    Rgba(out)
}

/// Alpha-over `layer` onto `canvas`, anchored at the canvas origin.
/// Layers larger than the canvas are clipped, never resized.
pub fn overlay_rgba(canvas: &mut RgbaImage, layer: &RgbaImage) {
    let (cw, ch) = canvas.dimensions();
    let (lw, lh) = layer.dimensions();
    for y in 0..lh.min(ch) {
        for x in 0..lw.min(cw) {
            let blended = over(*canvas.get_pixel(x, y), *layer.get_pixel(x, y));
            canvas.put_pixel(x, y, blended);
        }
    }
}
