use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use globset::{Glob, GlobSetBuilder};
use image::{DynamicImage, ImageReader};
use part_atlas_core::catalog::{PartCollection, PartGroup, availability_set};
use part_atlas_core::config::{AtlasConfig, OutputFormat};
use part_atlas_core::error::AtlasError;
use part_atlas_core::export::{atlas_index_json, key_to_frame_json};
use part_atlas_core::pipeline::{InputImage, build_atlas, encode_page};
use part_atlas_core::runtime::{ArtifactStore, ComposeSpec, Layer, LayerSource, compose_and_store};
use serde::Deserialize;
use tracing::{info, warn};
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(
    name = "part-atlas",
    about = "Build a character-part spritesheet atlas, or composite layers into one image",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Show progress bars (disable with --no-progress or --quiet)
    #[arg(long, default_value_t = true, action=ArgAction::Set, global=true, help_heading = "Logging/UX")]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, global=true, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(
        short,
        long,
        default_value_t = false,
        global = true,
        help_heading = "Logging/UX"
    )]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the atlas image plus both JSON indexes from part catalogs
    Build(BuildArgs),
    /// Composite background/body/head layers onto a fixed-size canvas
    Compose(ComposeArgs),
}

#[derive(Parser, Debug, Clone)]
struct BuildArgs {
    /// Directory of part images (enumerated recursively; listing order is canonical)
    #[arg(help_heading = "Input/Output")]
    input: PathBuf,
    /// Directory of part-descriptor JSON catalogs (`<type>-<gender>-parts.json`)
    #[arg(short, long, help_heading = "Input/Output")]
    catalog: PathBuf,
    /// Output directory
    #[arg(short, long, default_value = "spritesheet", help_heading = "Input/Output")]
    out_dir: PathBuf,
    /// Atlas base name (files will be name.png/name.json)
    #[arg(short, long, default_value = "spritesheet", help_heading = "Input/Output")]
    name: String,
    /// YAML config file path (overrides build options)
    #[arg(long, help_heading = "Input/Output")]
    config: Option<PathBuf>,
    /// Include patterns (glob). If set, only files matching any pattern are considered
    #[arg(long, help_heading = "Input/Output")]
    include: Vec<String>,
    /// Exclude patterns (glob). Files matching any pattern will be ignored
    #[arg(long, help_heading = "Input/Output")]
    exclude: Vec<String>,

    /// Square cell edge in pixels
    #[arg(long, default_value_t = 128, help_heading = "Atlas")]
    part_size: u32,
    /// Page format: png | jpeg
    #[arg(long, default_value = "png", help_heading = "Atlas")]
    format: String,
    /// JPEG quality (only used with --format jpeg)
    #[arg(long, default_value_t = 60, help_heading = "Atlas")]
    jpeg_quality: u8,

    /// Compute everything but do not write files
    #[arg(long, default_value_t = false, help_heading = "Export")]
    dry_run: bool,
}

#[derive(Parser, Debug, Clone)]
struct ComposeArgs {
    /// Background layer image
    background: PathBuf,
    /// Body layer image
    body: PathBuf,
    /// Head layer image
    head: PathBuf,
    /// Output file path
    #[arg(short, long, default_value = "composite.png")]
    out: PathBuf,
    /// Canvas width
    #[arg(long, default_value_t = 1024)]
    width: u32,
    /// Canvas height
    #[arg(long, default_value_t = 1024)]
    height: u32,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    match &cli.command {
        Commands::Build(args) => run_build(args, cli.progress && !cli.quiet),
        Commands::Compose(args) => run_compose(args),
    }
}

fn run_build(args: &BuildArgs, show_progress: bool) -> anyhow::Result<()> {
    let cfg = merge_config(args)?;

    let collections = load_catalogs(&args.catalog)?;
    let available = availability_set(&collections);
    info!(
        collections = collections.len(),
        available = available.len(),
        "catalogs loaded"
    );

    let eligible = gather_eligible(&args.input, &available, &args.include, &args.exclude)?;
    let inputs = load_images_with_progress(&args.input, &eligible, show_progress)?;
    info!(count = inputs.len(), "eligible part images loaded");

    let out = build_atlas(&inputs, &cfg)?;
    let page = encode_page(&out.rgba, &cfg)?;
    let index_json = atlas_index_json(&out.index)?;
    let tree_json = key_to_frame_json(&out.key_to_frame)?;

    if args.dry_run {
        info!(
            frames = out.index.len(),
            page_bytes = page.len(),
            "dry run, nothing written"
        );
        return Ok(());
    }

    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create out_dir {}", args.out_dir.display()))?;

    let page_path = args
        .out_dir
        .join(format!("{}.{}", args.name, cfg.format.extension()));
    write_atomic(&page_path, &page)?;
    info!(?page_path, "wrote atlas page");

    let index_path = args.out_dir.join(format!("{}.json", args.name));
    write_atomic(&index_path, index_json.as_bytes())?;
    info!(?index_path, frames = out.index.len(), "wrote atlas index");

    let tree_path = args.out_dir.join("key-to-frame.json");
    write_atomic(&tree_path, tree_json.as_bytes())?;
    info!(?tree_path, "wrote key-to-frame index");

    Ok(())
}

/// Filesystem-backed layer source for the compose subcommand.
struct FileLayers {
    background: PathBuf,
    body: PathBuf,
    head: PathBuf,
}

impl FileLayers {
    fn path(&self, layer: Layer) -> &Path {
        match layer {
            Layer::Background => &self.background,
            Layer::Body => &self.body,
            Layer::Head => &self.head,
        }
    }
}

impl LayerSource for FileLayers {
    async fn fetch(&self, layer: Layer) -> part_atlas_core::error::Result<Vec<u8>> {
        tokio::fs::read(self.path(layer))
            .await
            .map_err(|e| AtlasError::SourceFetchFailed {
                layer: layer.as_str(),
                reason: format!("{}: {e}", self.path(layer).display()),
            })
    }
}

/// Archives composites into a directory with an atomic full-replace write.
struct DirStore {
    dir: PathBuf,
}

impl ArtifactStore for DirStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> part_atlas_core::error::Result<()> {
        write_atomic(&self.dir.join(key), bytes)
            .map_err(|e| AtlasError::PersistenceWriteFailed(e.to_string()))
    }
}

fn run_compose(args: &ComposeArgs) -> anyhow::Result<()> {
    let source = FileLayers {
        background: args.background.clone(),
        body: args.body.clone(),
        head: args.head.clone(),
    };
    let dir = args
        .out
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."))
        .to_path_buf();
    let key = args
        .out
        .file_name()
        .and_then(|s| s.to_str())
        .context("output path has no file name")?
        .to_string();
    fs::create_dir_all(&dir).with_context(|| format!("create out dir {}", dir.display()))?;

    let spec = ComposeSpec {
        width: args.width,
        height: args.height,
        archive_key: key,
    };
    let rt = tokio::runtime::Runtime::new().context("start tokio runtime")?;
    let png = rt.block_on(compose_and_store(&source, &DirStore { dir }, &spec))?;
    info!(out = ?args.out, bytes = png.len(), "composite written");
    Ok(())
}

/// Loads every `*.json` catalog in `dir`; the elemental type is the file
/// name prefix up to the first `-` (e.g. `fire-man-parts.json` -> `fire`).
fn load_catalogs(dir: &Path) -> anyhow::Result<Vec<PartCollection>> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("read catalog dir {}", dir.display()))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("json"))
        .collect();
    entries.sort();

    let mut collections = Vec::with_capacity(entries.len());
    for path in entries {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .context("invalid catalog file name")?;
        let kind = stem.split('-').next().unwrap_or(stem).to_string();
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("read catalog {}", path.display()))?;
        let groups: Vec<PartGroup> = serde_json::from_str(&raw)
            .with_context(|| format!("parse catalog {}", path.display()))?;
        collections.push(PartCollection { kind, groups });
    }
    if collections.is_empty() {
        anyhow::bail!("no catalog files found in {}", dir.display());
    }
    Ok(collections)
}

/// Enumerates part images under `root` in file-name-sorted order (the
/// canonical build order) and keeps the ones present in the availability
/// set. Unlisted files are skipped with a log line, never an error.
fn gather_eligible(
    root: &Path,
    available: &std::collections::HashSet<String>,
    include: &[String],
    exclude: &[String],
) -> anyhow::Result<Vec<String>> {
    let inc_set = build_globset(include)?;
    let exc_set = build_globset(exclude)?;

    let mut keys = Vec::new();
    for entry in WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let p = entry.path();
        if !p.is_file() || !is_image(p) {
            continue;
        }
        let rel = p
            .strip_prefix(root)
            .unwrap_or(p)
            .to_string_lossy()
            .replace('\\', "/");
        if let Some(ex) = &exc_set {
            if ex.is_match(&rel) {
                continue;
            }
        }
        if let Some(inc) = &inc_set {
            if !inc.is_match(&rel) {
                continue;
            }
        }
        if available.contains(&rel) {
            keys.push(rel);
        } else {
            info!(file = %rel, "skipping file not listed in any catalog");
        }
    }
    Ok(keys)
}

fn build_globset(patterns: &[String]) -> anyhow::Result<Option<globset::GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut b = GlobSetBuilder::new();
    for pat in patterns {
        b.add(Glob::new(pat)?);
    }
    Ok(Some(b.build()?))
}

fn is_image(p: &Path) -> bool {
    matches!(
        p.extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_ascii_lowercase()),
        Some(ext) if matches!(ext.as_str(), "png" | "jpg" | "jpeg")
    )
}

fn load_images_with_progress(
    root: &Path,
    keys: &[String],
    progress: bool,
) -> anyhow::Result<Vec<InputImage>> {
    use indicatif::{ProgressBar, ProgressStyle};
    let bar = if progress {
        let b = ProgressBar::new(keys.len() as u64);
        b.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} loading {pos}/{len} [{elapsed_precise}] {wide_msg}",
            )
            .unwrap(),
        );
        Some(b)
    } else {
        None
    };
    let mut list = Vec::with_capacity(keys.len());
    for key in keys {
        if let Some(b) = &bar {
            b.set_message(key.clone());
        }
        let path = root.join(key);
        let image = load_image(&path).with_context(|| format!("decode {}", path.display()))?;
        list.push(InputImage {
            key: key.clone(),
            image,
        });
        if let Some(b) = &bar {
            b.inc(1);
        }
    }
    if let Some(b) = &bar {
        b.finish_and_clear();
    }
    Ok(list)
}

fn load_image(p: &Path) -> anyhow::Result<DynamicImage> {
    let img = ImageReader::open(p)?.with_guessed_format()?.decode()?;
    Ok(img)
}

/// Full-replace write: stage into a sibling temp file, then rename over the
/// target so a failed write never clobbers a prior artifact.
fn write_atomic(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    let file_name = path
        .file_name()
        .and_then(|s| s.to_str())
        .context("invalid output path")?;
    let tmp = path.with_file_name(format!("{file_name}.tmp"));
    fs::write(&tmp, bytes).with_context(|| format!("write {}", tmp.display()))?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e).with_context(|| format!("replace {}", path.display()));
    }
    Ok(())
}

fn merge_config(args: &BuildArgs) -> anyhow::Result<AtlasConfig> {
    let format: OutputFormat = args
        .format
        .parse()
        .map_err(|_| anyhow::anyhow!("unknown format: {}", args.format))?;
    let mut cfg = AtlasConfig {
        part_size: args.part_size,
        format,
        jpeg_quality: args.jpeg_quality,
    };
    if let Some(path) = &args.config {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let y: YamlConfig = serde_yaml::from_str(&raw)
            .with_context(|| format!("parse config {}", path.display()))?;
        cfg = y.into_atlas_config(cfg);
    }
    cfg.validate()?;
    if cfg.format == OutputFormat::Png && cfg.jpeg_quality != 60 {
        warn!("jpeg_quality is ignored when format is png");
    }
    Ok(cfg)
}

#[derive(Debug, Deserialize, Default)]
struct YamlConfig {
    part_size: Option<u32>,
    format: Option<String>,
    jpeg_quality: Option<u8>,
}

impl YamlConfig {
    fn into_atlas_config(self, mut cfg: AtlasConfig) -> AtlasConfig {
        if let Some(v) = self.part_size {
            cfg.part_size = v;
        }
        if let Some(v) = self.format {
            cfg.format = v.parse().unwrap_or(cfg.format);
        }
        if let Some(v) = self.jpeg_quality {
            cfg.jpeg_quality = v;
        }
        cfg
    }
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .try_init();
}
