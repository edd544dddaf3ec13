use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Axis-aligned rectangle (pixels). `x,y` is top-left; `w,h` are sizes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
    /// Inclusive right edge coordinate (`x + w - 1`).
    pub fn right(&self) -> u32 {
        self.x + self.w.saturating_sub(1)
    }
    /// Inclusive bottom edge coordinate (`y + h - 1`).
    pub fn bottom(&self) -> u32 {
        self.y + self.h.saturating_sub(1)
    }
    /// Returns true if `other` overlaps `self` (inclusive edges).
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x <= other.right()
            && other.x <= self.right()
            && self.y <= other.bottom()
            && other.y <= self.bottom()
    }
}

/// One placed part within the atlas image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameRecord {
    pub frame: Rect,
}

/// Atlas-level metadata. `scale` is always 1; kept for consumers that expect
/// a TexturePacker-style `meta` block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meta {
    pub scale: u32,
}

/// Per-cell rectangle index of the atlas.
///
/// Frame ids are `"part-0"`, `"part-1"`, ... assigned in the canonical input
/// order; each maps to the pixel rectangle of its grid cell. Replaced
/// wholesale on every rebuild.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtlasIndex {
    pub frames: BTreeMap<String, FrameRecord>,
    pub meta: Meta,
}

impl AtlasIndex {
    pub fn new() -> Self {
        Self {
            frames: BTreeMap::new(),
            meta: Meta { scale: 1 },
        }
    }

    /// Synthetic frame id for the item at ordinal position `index`.
    pub fn frame_id(index: usize) -> String {
        format!("part-{index}")
    }

    pub fn contains(&self, frame_id: &str) -> bool {
        self.frames.contains_key(frame_id)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl Default for AtlasIndex {
    fn default() -> Self {
        Self::new()
    }
}
