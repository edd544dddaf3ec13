use crate::compositing::overlay_rgba;
use crate::error::{AtlasError, Result};
use image::{ImageFormat, RgbaImage};
use std::io::Cursor;

/// The three raw layer buffers of one composite request, in fixed
/// bottom-to-top order. Ephemeral; lives only for one call.
pub struct LayerStack<'a> {
    pub background: &'a [u8],
    pub body: &'a [u8],
    pub head: &'a [u8],
}

impl<'a> LayerStack<'a> {
    fn layers(&self) -> [(&'static str, &'a [u8]); 3] {
        [
            ("background", self.background),
            ("body", self.body),
            ("head", self.head),
        ]
    }
}

/// Composites background, then body, then head onto a transparent canvas of
/// exactly `width x height` and returns PNG bytes.
///
/// All three buffers must decode; any failure aborts the whole request with
/// no partial output. Inputs are expected to already match the canvas size;
/// oversized layers are clipped at the canvas bounds, never resized.
pub fn flatten_layers(width: u32, height: u32, stack: &LayerStack) -> Result<Vec<u8>> {
    if width == 0 || height == 0 {
        return Err(AtlasError::InvalidInput(format!(
            "canvas must be non-empty, got {width}x{height}"
        )));
    }

    // decode all three up front so a bad top layer can't leave a partial blend
    let mut decoded = Vec::with_capacity(3);
    for (name, bytes) in stack.layers() {
        let img = image::load_from_memory(bytes).map_err(|e| AtlasError::DecodeFailed {
            layer: name,
            reason: e.to_string(),
        })?;
        decoded.push(img.to_rgba8());
    }

    let mut canvas = RgbaImage::new(width, height);
    for layer in &decoded {
        overlay_rgba(&mut canvas, layer);
    }

    let mut buf = Vec::new();
    canvas.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    Ok(buf)
}
