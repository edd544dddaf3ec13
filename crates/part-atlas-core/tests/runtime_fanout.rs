use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use part_atlas_core::error::{AtlasError, Result};
use part_atlas_core::runtime::{ArtifactStore, ComposeSpec, Layer, LayerSource, compose_and_store};
use std::io::Cursor;
use std::sync::Mutex;

fn tiny_png(color: [u8; 4]) -> Vec<u8> {
    let mut buf = Vec::new();
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, Rgba(color)))
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

struct StubSource {
    fail: Option<Layer>,
}

impl LayerSource for StubSource {
    async fn fetch(&self, layer: Layer) -> Result<Vec<u8>> {
        if self.fail == Some(layer) {
            return Err(AtlasError::SourceFetchFailed {
                layer: layer.as_str(),
                reason: "stub failure".into(),
            });
        }
        Ok(tiny_png(match layer {
            Layer::Background => [0, 0, 255, 255],
            Layer::Body => [255, 0, 0, 128],
            Layer::Head => [0, 255, 0, 64],
        }))
    }
}

#[derive(Default)]
struct RecordingStore {
    puts: Mutex<Vec<(String, usize)>>,
}

impl ArtifactStore for RecordingStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<()> {
        self.puts.lock().unwrap().push((key.to_string(), bytes.len()));
        Ok(())
    }
}

fn spec() -> ComposeSpec {
    ComposeSpec {
        width: 8,
        height: 8,
        archive_key: "test.png".into(),
    }
}

#[tokio::test]
async fn successful_request_composites_and_archives() {
    let source = StubSource { fail: None };
    let store = RecordingStore::default();

    let png = compose_and_store(&source, &store, &spec()).await.unwrap();
    let img = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (8, 8));
    // opaque background means the result is opaque too
    assert_eq!(img.get_pixel(0, 0)[3], 255);

    let puts = store.puts.lock().unwrap();
    assert_eq!(puts.len(), 1);
    assert_eq!(puts[0], ("test.png".to_string(), png.len()));
}

#[tokio::test]
async fn failed_head_fetch_fails_atomically() {
    let source = StubSource {
        fail: Some(Layer::Head),
    };
    let store = RecordingStore::default();

    let result = compose_and_store(&source, &store, &spec()).await;
    match result {
        Err(AtlasError::SourceFetchFailed { layer, .. }) => assert_eq!(layer, "head"),
        other => panic!("expected SourceFetchFailed, got {other:?}"),
    }
    // no partial composite reaches the store
    assert!(store.puts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn failed_background_fetch_fails_atomically() {
    let source = StubSource {
        fail: Some(Layer::Background),
    };
    let store = RecordingStore::default();

    assert!(compose_and_store(&source, &store, &spec()).await.is_err());
    assert!(store.puts.lock().unwrap().is_empty());
}
