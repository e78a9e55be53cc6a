use crate::error::{MosaicError, Result};
use crate::img::Img;
use crate::tiler::PlacementPlan;
use image::Rgba;
use std::collections::hash_map::{Entry, HashMap};
use std::ffi::{OsStr, OsString};
use std::path::PathBuf;

pub const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Resolves an icon identifier to its pixels.
pub trait IconSource<I: Img> {
    fn icon(&mut self, name: &OsStr) -> Result<&I>;
}

/// Reads icons from a directory, decoding each one at most once.
pub struct IconCache<I: Img> {
    dir: PathBuf,
    icons: HashMap<OsString, I>,
}

impl<I: Img> IconCache<I> {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        IconCache {
            dir: dir.into(),
            icons: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.icons.len()
    }
    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }
}

impl<I: Img> IconSource<I> for IconCache<I> {
    fn icon(&mut self, name: &OsStr) -> Result<&I> {
        match self.icons.entry(name.to_os_string()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let path = self.dir.join(name);
                let icon = I::read(&path).map_err(|source| MosaicError::Decode { path, source })?;
                Ok(entry.insert(icon))
            }
        }
    }
}

impl<I: Img> IconSource<I> for HashMap<OsString, I> {
    fn icon(&mut self, name: &OsStr) -> Result<&I> {
        self.get(name).ok_or_else(|| MosaicError::MissingIcon {
            name: name.to_string_lossy().into_owned(),
        })
    }
}

/// Paste every placement of `plan` onto a white canvas of the plan's size.
pub fn composite<I: Img, S: IconSource<I>>(plan: &PlacementPlan, icons: &mut S) -> Result<I> {
    let mut canvas = I::blank(plan.width, plan.height, BACKGROUND);
    for placement in &plan.placements {
        let icon = icons.icon(&placement.icon)?;
        canvas.paste(icon, placement.x, placement.y);
    }
    Ok(canvas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiler::Placement;
    use image::RgbaImage;

    fn plan(width: u32, height: u32, placements: &[(&str, u32, u32)]) -> PlacementPlan {
        PlacementPlan {
            width,
            height,
            icon_size: 2,
            placements: placements
                .iter()
                .map(|&(icon, x, y)| Placement { icon: icon.into(), x, y })
                .collect(),
        }
    }

    #[test]
    fn pastes_icons_at_their_offsets() {
        let mut icons = HashMap::new();
        icons.insert(OsString::from("a"), RgbaImage::from_pixel(2, 2, Rgba([255, 0, 0, 255])));
        icons.insert(OsString::from("b"), RgbaImage::from_pixel(2, 2, Rgba([0, 255, 0, 255])));

        let canvas: RgbaImage = composite(&plan(4, 2, &[("a", 0, 0), ("b", 2, 0)]), &mut icons).unwrap();

        assert_eq!(*canvas.get_pixel(1, 1), Rgba([255, 0, 0, 255]));
        assert_eq!(*canvas.get_pixel(2, 0), Rgba([0, 255, 0, 255]));
    }

    #[test]
    fn transparent_icon_pixels_leave_white_background() {
        let mut icon = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255]));
        icon.put_pixel(0, 0, Rgba([0, 0, 0, 0]));
        let mut icons = HashMap::new();
        icons.insert(OsString::from("a"), icon);

        let canvas: RgbaImage = composite(&plan(2, 2, &[("a", 0, 0)]), &mut icons).unwrap();

        assert_eq!(*canvas.get_pixel(0, 0), BACKGROUND);
        assert_eq!(*canvas.get_pixel(1, 0), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn edge_icons_are_clipped_by_the_canvas() {
        let mut icons = HashMap::new();
        icons.insert(OsString::from("a"), RgbaImage::from_pixel(2, 2, Rgba([9, 9, 9, 255])));

        let canvas: RgbaImage = composite(&plan(3, 3, &[("a", 2, 2)]), &mut icons).unwrap();

        assert_eq!(canvas.dimensions(), (3, 3));
        assert_eq!(*canvas.get_pixel(2, 2), Rgba([9, 9, 9, 255]));
    }

    #[test]
    fn unknown_icon_is_an_error() {
        let mut icons: HashMap<OsString, RgbaImage> = HashMap::new();
        let result: Result<RgbaImage> = composite(&plan(2, 2, &[("nope", 0, 0)]), &mut icons);
        assert!(matches!(result, Err(MosaicError::MissingIcon { .. })));
    }

    #[test]
    fn cache_decodes_each_icon_once() {
        let dir = tempfile::tempdir().unwrap();
        RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 255]))
            .save(dir.path().join("a.png"))
            .unwrap();
        let mut cache = IconCache::<RgbaImage>::new(dir.path());

        let canvas: RgbaImage = composite(&plan(4, 4, &[("a.png", 0, 0), ("a.png", 2, 2)]), &mut cache).unwrap();

        assert_eq!(cache.len(), 1);
        assert_eq!(*canvas.get_pixel(3, 3), Rgba([1, 2, 3, 255]));
        assert_eq!(*canvas.get_pixel(3, 0), BACKGROUND);
    }
}
