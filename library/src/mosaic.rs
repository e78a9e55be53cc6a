use crate::compositor::{composite, IconCache, IconSource};
use crate::error::{MosaicError, Result};
use crate::icon_catalog::{IconCatalog, LoadOptions, DEFAULT_CHUNK_SIZE};
use crate::img::Img;
use crate::tiler::{tile, PlacementPlan};
use image::RgbaImage;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

/// Optional resize applied to the target image before tiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resize {
    Exact { width: u32, height: u32 },
    /// Keep the aspect ratio, fix the width.
    Width(u32),
    /// Keep the aspect ratio, fix the height.
    Height(u32),
}

impl Resize {
    pub fn from_dimensions(width: Option<u32>, height: Option<u32>) -> Option<Self> {
        match (width, height) {
            (Some(width), Some(height)) => Some(Resize::Exact { width, height }),
            (Some(width), None) => Some(Resize::Width(width)),
            (None, Some(height)) => Some(Resize::Height(height)),
            (None, None) => None,
        }
    }

    pub fn target_size(&self, [width, height]: [u32; 2]) -> [u32; 2] {
        let scaled = |len: u32, num: u32, den: u32| {
            ((len as f64 * num as f64 / den.max(1) as f64).round() as u32).max(1)
        };
        match *self {
            Resize::Exact { width, height } => [width, height],
            Resize::Width(w) => [w, scaled(w, height, width)],
            Resize::Height(h) => [scaled(h, width, height), h],
        }
    }
}

#[derive(Debug, Clone)]
pub struct MosaicConfig {
    pub icon_dir: PathBuf,
    pub input: PathBuf,
    pub output: PathBuf,
    /// Worker threads for each parallel phase, 0 lets rayon decide.
    pub threads: usize,
    pub chunk_size: usize,
    pub resize: Option<Resize>,
    /// Where to dump the placement plan as JSON, if anywhere.
    pub plan_output: Option<PathBuf>,
}

impl MosaicConfig {
    pub fn new(icon_dir: impl Into<PathBuf>) -> Self {
        MosaicConfig {
            icon_dir: icon_dir.into(),
            input: PathBuf::from("in.png"),
            output: PathBuf::from("out.png"),
            threads: 0,
            chunk_size: DEFAULT_CHUNK_SIZE,
            resize: None,
            plan_output: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MosaicReport {
    pub icons: usize,
    pub placements: usize,
    pub width: u32,
    pub height: u32,
}

pub fn generate(config: &MosaicConfig) -> Result<MosaicReport> {
    generate_with::<RgbaImage>(config)
}

/// Build the catalog, tile the target, then render and save the mosaic.
/// Nothing is written unless every step before it succeeded.
pub fn generate_with<I: Img>(config: &MosaicConfig) -> Result<MosaicReport> {
    let catalog = IconCatalog::build_with::<I>(
        &config.icon_dir,
        LoadOptions {
            threads: config.threads,
            chunk_size: config.chunk_size,
        },
    )?;

    let mut target = I::read(&config.input).map_err(|source| MosaicError::Decode {
        path: config.input.clone(),
        source,
    })?;
    let [width, height] = target.img_size();
    info!("Loaded image is {}x{}", width, height);
    if let Some(resize) = config.resize {
        let [width, height] = resize.target_size(target.img_size());
        target = target.resized(width, height);
        info!("Resized image to {}x{}", width, height);
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build()?;
    let plan = pool.install(|| tile(&target, &catalog))?;

    let mut icons = IconCache::<I>::new(catalog.dir());
    render_and_save::<I, _>(&plan, &mut icons, config)?;

    Ok(MosaicReport {
        icons: catalog.len(),
        placements: plan.placements.len(),
        width: plan.width,
        height: plan.height,
    })
}

/// Composite `plan`, then write the plan (if asked for) and the mosaic.
/// A failed composite leaves no file behind.
fn render_and_save<I: Img, S: IconSource<I>>(plan: &PlacementPlan, icons: &mut S, config: &MosaicConfig) -> Result<()> {
    let mosaic: I = composite(plan, icons)?;

    if let Some(path) = &config.plan_output {
        write_plan(plan, path)?;
        info!("Wrote placement plan to {}", path.display());
    }
    mosaic
        .save_to(&config.output)
        .map_err(|source| MosaicError::Encode {
            path: config.output.clone(),
            source,
        })?;
    info!("Saved {}", config.output.display());
    Ok(())
}

pub fn write_plan(plan: &PlacementPlan, path: impl AsRef<Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(plan)?;
    fs::write(path.as_ref(), json).map_err(|source| MosaicError::WritePlan {
        path: path.as_ref().to_path_buf(),
        source,
    })
}
