use serde::Deserialize;
use std::collections::HashSet;
use tracing::debug;

/// One declared image file belonging to a part.
#[derive(Debug, Clone, Deserialize)]
pub struct PartImage {
    pub path: String,
}

/// One character-template part (a body-part slot and its image files).
/// Descriptors without `images` are legal in the source data and contribute
/// nothing to the availability set.
#[derive(Debug, Clone, Deserialize)]
pub struct PartDescriptor {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub images: Option<Vec<PartImage>>,
}

/// A group of parts as stored in the catalog JSON (each catalog file is an
/// array of these).
#[derive(Debug, Clone, Deserialize)]
pub struct PartGroup {
    #[serde(default)]
    pub parts: Vec<PartDescriptor>,
}

/// All part groups declared for one elemental type (man and woman catalogs
/// for the same type can both feed the same collection, or arrive as
/// separate collections with the same `kind`).
#[derive(Debug, Clone)]
pub struct PartCollection {
    /// Elemental type tag, e.g. `fire`, as it appears in image keys.
    pub kind: String,
    pub groups: Vec<PartGroup>,
}

/// Builds the availability set: `"<type>/<relative-path>"` for every image
/// declared by some part descriptor. Membership only; duplicates collapse.
pub fn availability_set(collections: &[PartCollection]) -> HashSet<String> {
    let mut available = HashSet::new();
    for collection in collections {
        for group in &collection.groups {
            for part in &group.parts {
                let Some(images) = &part.images else {
                    debug!(
                        kind = %collection.kind,
                        part = part.name.as_deref().unwrap_or("<unnamed>"),
                        "catalog entry has no images, skipped"
                    );
                    continue;
                };
                for image in images {
                    available.insert(format!("{}/{}", collection.kind, image.path));
                }
            }
        }
    }
    available
}
