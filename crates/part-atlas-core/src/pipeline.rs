use crate::compositing::blit_rgba;
use crate::config::{AtlasConfig, OutputFormat};
use crate::error::Result;
use crate::grid::GridLayout;
use crate::keymap::KeyToFrame;
use crate::model::{AtlasIndex, FrameRecord, Rect};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, RgbaImage};
use std::io::Cursor;
use tracing::{info, instrument};

/// In-memory eligible part image, keyed by its availability key
/// (`"<type>/<relative-path>"`). The sequence order given to
/// [`build_atlas`] is canonical and is preserved through packing,
/// frame-id assignment and the semantic key tree.
pub struct InputImage {
    pub key: String,
    pub image: DynamicImage,
}

/// Output of an atlas build: the page pixels and both index artifacts.
pub struct AtlasOutput {
    pub rgba: RgbaImage,
    pub index: AtlasIndex,
    pub key_to_frame: KeyToFrame,
}

#[instrument(skip_all)]
/// Packs `inputs` into one grid atlas page and builds both indexes.
///
/// Each input at ordinal `i` lands in grid cell `(i / tilesPerRow,
/// i % tilesPerRow)` and receives frame id `part-i`; a single iteration
/// order drives placement, the frame index and the key tree, so rebuilding
/// from the same sequence yields byte-identical artifacts.
pub fn build_atlas(inputs: &[InputImage], cfg: &AtlasConfig) -> Result<AtlasOutput> {
    cfg.validate()?;
    let grid = GridLayout::new(inputs.len())?;
    let size = cfg.part_size;
    let (page_w, page_h) = grid.page_size(size);

    // transparent background
    let mut canvas = RgbaImage::new(page_w, page_h);
    let mut index = AtlasIndex::new();
    let mut key_to_frame = KeyToFrame::new();

    for (i, input) in inputs.iter().enumerate() {
        let cell = grid.cell(i);
        let (x, y) = grid.origin(cell, size);
        blit_rgba(&input.image.to_rgba8(), &mut canvas, x, y);

        let frame_id = AtlasIndex::frame_id(i);
        index.frames.insert(
            frame_id.clone(),
            FrameRecord {
                frame: Rect::new(x, y, size, size),
            },
        );
        key_to_frame.insert(&input.key, &frame_id)?;
    }

    info!(
        parts = inputs.len(),
        tiles_per_row = grid.tiles_per_row(),
        tiles_per_col = grid.tiles_per_col(),
        page_w,
        page_h,
        "atlas packed"
    );

    Ok(AtlasOutput {
        rgba: canvas,
        index,
        key_to_frame,
    })
}

/// Encodes the atlas page in the configured format. JPEG flattens away the
/// alpha channel and applies the configured fixed quality.
pub fn encode_page(rgba: &RgbaImage, cfg: &AtlasConfig) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    match cfg.format {
        OutputFormat::Png => {
            rgba.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
        }
        OutputFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgba8(rgba.clone()).to_rgb8();
            let encoder = JpegEncoder::new_with_quality(&mut buf, cfg.jpeg_quality);
            rgb.write_with_encoder(encoder)?;
        }
    }
    Ok(buf)
}
