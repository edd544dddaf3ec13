use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use part_atlas_core::compose::{LayerStack, flatten_layers};
use part_atlas_core::error::AtlasError;
use std::io::Cursor;

const SIZE: u32 = 1024;

fn png_bytes(img: RgbaImage) -> Vec<u8> {
    let mut buf = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

/// Opaque background everywhere.
fn background() -> Vec<u8> {
    png_bytes(RgbaImage::from_pixel(SIZE, SIZE, Rgba([20, 40, 200, 255])))
}

/// Semi-transparent body covering the left half.
fn body() -> Vec<u8> {
    let mut img = RgbaImage::new(SIZE, SIZE);
    for y in 0..SIZE {
        for x in 0..SIZE / 2 {
            img.put_pixel(x, y, Rgba([220, 30, 30, 128]));
        }
    }
    png_bytes(img)
}

/// Semi-transparent head covering the top-left quadrant.
fn head() -> Vec<u8> {
    let mut img = RgbaImage::new(SIZE, SIZE);
    for y in 0..SIZE / 2 {
        for x in 0..SIZE / 2 {
            img.put_pixel(x, y, Rgba([30, 200, 30, 64]));
        }
    }
    png_bytes(img)
}

/// Reference alpha-over, non-premultiplied integer math.
fn over_px(dst: [u8; 4], src: [u8; 4]) -> [u8; 4] {
    let sa = src[3] as u32;
    let da = dst[3] as u32;
    let out_a = sa + da * (255 - sa) / 255;
    if out_a == 0 {
        return [0, 0, 0, 0];
    }
    let mut out = [0u8; 4];
    for c in 0..3 {
        let sc = src[c] as u32;
        let dc = dst[c] as u32;
        out[c] = ((sc * sa + dc * da * (255 - sa) / 255) / out_a) as u8;
    }
    out[3] = out_a as u8;
    out
}

#[test]
fn composite_matches_alpha_over_bottom_to_top() {
    let (bg, body, head) = (background(), body(), head());
    let out = flatten_layers(
        SIZE,
        SIZE,
        &LayerStack {
            background: &bg,
            body: &body,
            head: &head,
        },
    )
    .unwrap();

    let img = image::load_from_memory(&out).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (SIZE, SIZE));

    // covered only by the background: exact background value
    assert_eq!(img.get_pixel(SIZE - 1, SIZE - 1), &Rgba([20, 40, 200, 255]));

    // covered by background + body only
    let bg_body = over_px([20, 40, 200, 255], [220, 30, 30, 128]);
    assert_eq!(img.get_pixel(0, SIZE - 1), &Rgba(bg_body));

    // covered by all three, blended bottom-to-top
    let all = over_px(bg_body, [30, 200, 30, 64]);
    assert_eq!(img.get_pixel(0, 0), &Rgba(all));
}

#[test]
fn output_is_canvas_sized_regardless_of_inputs() {
    let big = png_bytes(RgbaImage::from_pixel(64, 64, Rgba([1, 2, 3, 255])));
    let out = flatten_layers(
        16,
        16,
        &LayerStack {
            background: &big,
            body: &big,
            head: &big,
        },
    )
    .unwrap();
    let img = image::load_from_memory(&out).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (16, 16));
}

#[test]
fn undecodable_layer_fails_the_whole_request() {
    let (bg, body) = (background(), body());
    let result = flatten_layers(
        SIZE,
        SIZE,
        &LayerStack {
            background: &bg,
            body: &body,
            head: b"not a png",
        },
    );
    match result {
        Err(AtlasError::DecodeFailed { layer, .. }) => assert_eq!(layer, "head"),
        other => panic!("expected DecodeFailed, got {other:?}"),
    }
}

#[test]
fn zero_canvas_is_invalid() {
    let bg = background();
    let result = flatten_layers(
        0,
        16,
        &LayerStack {
            background: &bg,
            body: &bg,
            head: &bg,
        },
    );
    assert!(matches!(result, Err(AtlasError::InvalidInput(_))));
}
