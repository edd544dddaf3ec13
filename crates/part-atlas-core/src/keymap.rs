use crate::error::{AtlasError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// Sentinel filename for shared background assets stored without a gender
/// subfolder. Such assets are fanned out to both gender keys.
pub const SHARED_BACKGROUND: &str = "Background.png";

/// The two gender keys every lookup consumer expects.
pub const GENDERS: [&str; 2] = ["Man", "Woman"];

/// Nested semantic lookup: `type -> gender -> relativePath -> frameId`.
///
/// Serializes transparently as the nested mapping, in deterministic
/// (BTreeMap) order. Replaced wholesale on every rebuild.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyToFrame(BTreeMap<String, BTreeMap<String, BTreeMap<String, String>>>);

impl KeyToFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps an availability key `"<type>/<gender-or-shared>/<rest...>"` to a
    /// frame id.
    ///
    /// The type and the second path segment are capitalized (first letter
    /// uppercased, rest unchanged); the relative path is everything after
    /// the type segment, gender folder included. A second segment equal to
    /// [`SHARED_BACKGROUND`] is inserted under both `Man` and `Woman` with
    /// the same frame id. Collisions overwrite last-wins with a warning.
    pub fn insert(&mut self, key: &str, frame_id: &str) -> Result<()> {
        let Some((kind, relative)) = key.split_once('/') else {
            return Err(AtlasError::InvalidInput(format!(
                "key `{key}` has no path after the type segment"
            )));
        };
        if relative.is_empty() {
            return Err(AtlasError::InvalidInput(format!(
                "key `{key}` has an empty path after the type segment"
            )));
        }
        let kind = capitalize(kind);
        let second = relative.split('/').next().unwrap_or(relative);
        let gender = capitalize(second);

        if gender == SHARED_BACKGROUND {
            // Shared asset: one file, both gender keys, same frame id.
            for g in GENDERS {
                self.put(&kind, g, relative, frame_id);
            }
        } else {
            self.put(&kind, &gender, relative, frame_id);
        }
        Ok(())
    }

    fn put(&mut self, kind: &str, gender: &str, relative: &str, frame_id: &str) {
        let slot = self
            .0
            .entry(kind.to_string())
            .or_default()
            .entry(gender.to_string())
            .or_default();
        if let Some(prev) = slot.insert(relative.to_string(), frame_id.to_string()) {
            warn!(kind, gender, relative, %prev, new = frame_id, "key collision, overwriting");
        }
    }

    pub fn get(&self, kind: &str, gender: &str, relative: &str) -> Option<&str> {
        self.0
            .get(kind)?
            .get(gender)?
            .get(relative)
            .map(String::as_str)
    }

    /// Iterates every `(type, gender, relativePath, frameId)` leaf.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &str, &str)> {
        self.0.iter().flat_map(|(kind, genders)| {
            genders.iter().flat_map(move |(gender, paths)| {
                paths.iter().map(move |(relative, frame_id)| {
                    (
                        kind.as_str(),
                        gender.as_str(),
                        relative.as_str(),
                        frame_id.as_str(),
                    )
                })
            })
        })
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// First letter uppercased, rest unchanged.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
