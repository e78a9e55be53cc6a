use crate::color::{color_to_rgb8, default_transparency, reduce, PixelRegion};
use crate::error::{MosaicError, Result};
use crate::icon_catalog::IconCatalog;
use crate::img::Img;
use crate::matcher::nearest;
use crate::progress::Progress;
use log::{debug, info};
use rayon::prelude::*;
use serde::{Serialize, Serializer};
use std::ffi::OsString;

/// One grid cell: which icon goes where, in target pixel coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Placement {
    /// File name of the icon, as stored in the catalog.
    #[serde(serialize_with = "serialize_lossy")]
    pub icon: OsString,
    pub x: u32,
    pub y: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlacementPlan {
    pub width: u32,
    pub height: u32,
    pub icon_size: u32,
    pub placements: Vec<Placement>,
}

fn serialize_lossy<S: Serializer>(name: &OsString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&name.to_string_lossy())
}

/// Top-left corners `(x, y)` of the cells covering `width` x `height`,
/// column by column.
pub fn grid_origins(width: u32, height: u32, icon_size: u32) -> Vec<(u32, u32)> {
    let step = icon_size.max(1) as usize;
    (0..width)
        .step_by(step)
        .flat_map(|col| (0..height).step_by(step).map(move |row| (col, row)))
        .collect()
}

/// Pick an icon for every cell of `target`.
///
/// Edge cells of images whose size is not a multiple of the icon size are
/// averaged over the part that lies inside the image.
pub fn tile<I: Img>(target: &I, catalog: &IconCatalog) -> Result<PlacementPlan> {
    let icon_size = catalog.icon_size();
    if icon_size == 0 {
        return Err(MosaicError::EmptyRegion { x: 0, y: 0 });
    }
    let [width, height] = target.img_size();
    let cells = grid_origins(width, height, icon_size);
    info!("Matching {} cells against {} icons", cells.len(), catalog.len());

    let progress = Progress::new("Matching cells", cells.len());
    let placements = cells
        .par_iter()
        .map(|&(x, y)| -> Result<Placement> {
            let placement = place_cell(target, catalog, x, y)?;
            progress.inc();
            Ok(placement)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(PlacementPlan {
        width,
        height,
        icon_size,
        placements,
    })
}

fn place_cell<I: Img>(target: &I, catalog: &IconCatalog, x: u32, y: u32) -> Result<Placement> {
    let size = catalog.icon_size();
    let region = PixelRegion::clipped(target, x, y, size, size)?;
    let color = reduce(&region, default_transparency())?;
    let found = nearest(catalog, &color)?;
    debug!(
        "cell ({}, {}) {:?} -> {} (distance {:.1})",
        x,
        y,
        color_to_rgb8(&color),
        found.entry.name.to_string_lossy(),
        found.distance
    );
    Ok(Placement {
        icon: found.entry.name.clone(),
        x,
        y,
    })
}
