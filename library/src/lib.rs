//! Recreate an image as a mosaic of small square icons.
//!
//! Every icon is reduced to its average colour once, then the target image is
//! cut into icon-sized cells and each cell is replaced with the icon whose
//! colour is closest to the cell's own average.

pub mod color;
pub mod compositor;
pub mod error;
pub mod icon_catalog;
pub mod img;
pub mod matcher;
pub mod mosaic;
pub mod progress;
pub mod tiler;

pub use color::{Color, PixelRegion};
pub use compositor::{composite, IconCache, IconSource};
pub use error::{MosaicError, Result};
pub use icon_catalog::{IconCatalog, IconCatalogReader, IconEntry, LoadOptions, ICON_SIZE};
pub use img::Img;
pub use matcher::nearest;
pub use mosaic::{generate, generate_with, write_plan, MosaicConfig, MosaicReport, Resize};
pub use tiler::{tile, Placement, PlacementPlan};
