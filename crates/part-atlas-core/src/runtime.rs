use crate::compose::{LayerStack, flatten_layers};
use crate::error::Result;
use std::future::Future;
use tracing::{info, instrument};

/// The three named sub-resources of a composite request, bottom to top.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Background,
    Body,
    Head,
}

impl Layer {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Background => "background",
            Self::Body => "body",
            Self::Head => "head",
        }
    }
}

/// External source of raw layer bytes (object storage, asset host, disk).
/// Fetches for one request are issued concurrently by the orchestrator.
pub trait LayerSource {
    fn fetch(&self, layer: Layer) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

/// External archival target for successful composites.
pub trait ArtifactStore {
    fn put(&self, key: &str, bytes: &[u8]) -> impl Future<Output = Result<()>> + Send;
}

/// One composite request: fixed canvas size plus the archival key for the
/// successful result.
#[derive(Debug, Clone)]
pub struct ComposeSpec {
    pub width: u32,
    pub height: u32,
    pub archive_key: String,
}

#[instrument(skip_all, fields(key = %spec.archive_key))]
/// Runtime composite path: fan out the three layer fetches, join, blend
/// bottom-to-top, then archive the PNG and return it.
///
/// Fails atomically: if any fetch or decode fails, nothing is composited
/// and nothing is written to the store. The blend itself is CPU-bound and
/// does not suspend; suspension only happens at the join and the store
/// write.
pub async fn compose_and_store<S, A>(source: &S, store: &A, spec: &ComposeSpec) -> Result<Vec<u8>>
where
    S: LayerSource,
    A: ArtifactStore,
{
    let (background, body, head) = tokio::try_join!(
        source.fetch(Layer::Background),
        source.fetch(Layer::Body),
        source.fetch(Layer::Head),
    )?;

    let png = flatten_layers(
        spec.width,
        spec.height,
        &LayerStack {
            background: &background,
            body: &body,
            head: &head,
        },
    )?;

    store.put(&spec.archive_key, &png).await?;
    info!(
        width = spec.width,
        height = spec.height,
        bytes = png.len(),
        "composite archived"
    );
    Ok(png)
}
