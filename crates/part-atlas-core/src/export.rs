use crate::error::{AtlasError, Result};
use crate::keymap::KeyToFrame;
use crate::model::AtlasIndex;

/// Pretty-printed JSON for the atlas index artifact:
/// `{ "frames": { "part-N": { "frame": {x,y,w,h} } }, "meta": { "scale": 1 } }`.
pub fn atlas_index_json(index: &AtlasIndex) -> Result<String> {
    serde_json::to_string_pretty(index).map_err(|e| AtlasError::Encode(e.to_string()))
}

/// Pretty-printed JSON for the semantic key tree artifact:
/// `{ "Type": { "Gender": { "relative/path.png": "part-N" } } }`.
pub fn key_to_frame_json(tree: &KeyToFrame) -> Result<String> {
    serde_json::to_string_pretty(tree).map_err(|e| AtlasError::Encode(e.to_string()))
}
