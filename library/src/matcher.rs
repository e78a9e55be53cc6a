use crate::color::{channel_distance, Color, ColorComponent};
use crate::error::{MosaicError, Result};
use crate::icon_catalog::{IconCatalog, IconEntry};

#[derive(Debug, Clone, Copy)]
pub struct Match<'a> {
    pub entry: &'a IconEntry,
    /// Manhattan distance on the 8-bit scale.
    pub distance: ColorComponent,
}

/// Closest icon to `target`. On equal distances the entry that comes first
/// in the catalog wins, so the same catalog always yields the same mosaic.
pub fn nearest<'a>(catalog: &'a IconCatalog, target: &Color) -> Result<Match<'a>> {
    catalog
        .entries()
        .iter()
        .fold(None, |best: Option<Match<'a>>, entry| {
            let distance = channel_distance(&entry.color, target);
            match best {
                Some(best) if best.distance <= distance => Some(best),
                _ => Some(Match { entry, distance }),
            }
        })
        .ok_or_else(|| MosaicError::EmptyCatalog {
            path: catalog.dir().to_path_buf(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::color_from_rgb8;
    use crate::icon_catalog::ICON_SIZE;

    fn catalog(icons: &[((u8, u8, u8), &str)]) -> IconCatalog {
        let entries = icons
            .iter()
            .map(|&((r, g, b), name)| IconEntry {
                name: name.into(),
                path: format!("icons/{}", name).into(),
                color: color_from_rgb8(r, g, b),
            })
            .collect();
        IconCatalog::from_entries("icons", ICON_SIZE, entries).unwrap()
    }

    #[test]
    fn picks_the_closest_color() {
        let catalog = catalog(&[((0, 0, 0), "black.png"), ((255, 255, 255), "white.png")]);
        let found = nearest(&catalog, &color_from_rgb8(10, 10, 10)).unwrap();
        assert_eq!(found.entry.name, "black.png");
        assert!((found.distance - 30.).abs() < 1e-9);
    }

    #[test]
    fn ties_go_to_the_first_entry() {
        let catalog = catalog(&[((0, 0, 0), "a.png"), ((0, 0, 0), "b.png")]);
        for _ in 0..10 {
            let found = nearest(&catalog, &color_from_rgb8(0, 0, 0)).unwrap();
            assert_eq!(found.entry.name, "a.png");
        }
    }

    #[test]
    fn equal_distance_different_colors_keep_first() {
        // both are 10 away from (10, 10, 10)
        let catalog = catalog(&[((20, 10, 10), "first.png"), ((0, 10, 10), "second.png")]);
        let found = nearest(&catalog, &color_from_rgb8(10, 10, 10)).unwrap();
        assert_eq!(found.entry.name, "first.png");
    }

    #[test]
    fn empty_catalog_has_no_match() {
        let catalog = catalog(&[]);
        assert!(matches!(
            nearest(&catalog, &color_from_rgb8(0, 0, 0)),
            Err(MosaicError::EmptyCatalog { .. })
        ));
    }
}
