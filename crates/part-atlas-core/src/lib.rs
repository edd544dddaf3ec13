//! Core library for building packed character-part atlases and for
//! runtime layer compositing.
//!
//! - Build path: availability set from part catalogs, deterministic
//!   `ceil(sqrt(N))` grid packing of fixed-size square parts, frame index
//!   (`part-N` ids) and semantic key tree (`type -> gender -> path`).
//! - Runtime path: fetch background/body/head concurrently, alpha-over
//!   blend bottom-to-top, archive the PNG.
//!
//! Quick example:
//! ```ignore
//! use image::ImageReader;
//! use part_atlas_core::{AtlasConfig, InputImage, build_atlas};
//! # fn main() -> anyhow::Result<()> {
//! let img = ImageReader::open("fire/man/head.png")?.decode()?;
//! let inputs = vec![InputImage { key: "fire/man/head.png".into(), image: img }];
//! let out = build_atlas(&inputs, &AtlasConfig::default())?;
//! println!("frames: {}", out.index.len());
//! # Ok(()) }
//! ```

pub mod catalog;
pub mod compose;
pub mod compositing;
pub mod config;
pub mod error;
pub mod export;
pub mod grid;
pub mod keymap;
pub mod model;
pub mod pipeline;
pub mod runtime;

pub use catalog::*;
pub use compose::*;
pub use config::*;
pub use error::*;
pub use export::*;
pub use grid::*;
pub use keymap::*;
pub use model::*;
pub use pipeline::*;

/// Convenience prelude for common types and functions.
pub mod prelude {
    pub use crate::catalog::{PartCollection, PartDescriptor, PartGroup, PartImage, availability_set};
    pub use crate::compose::{LayerStack, flatten_layers};
    pub use crate::config::{AtlasConfig, AtlasConfigBuilder, OutputFormat};
    pub use crate::error::{AtlasError, Result};
    pub use crate::grid::{GridCell, GridLayout};
    pub use crate::keymap::{GENDERS, KeyToFrame, SHARED_BACKGROUND};
    pub use crate::model::{AtlasIndex, FrameRecord, Meta, Rect};
    pub use crate::pipeline::{AtlasOutput, InputImage, build_atlas, encode_page};
    pub use crate::runtime::{ArtifactStore, ComposeSpec, Layer, LayerSource, compose_and_store};
}
