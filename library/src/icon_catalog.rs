use crate::color::{color_to_rgb8, default_transparency, reduce_image, Color};
use crate::error::{MosaicError, Result};
use crate::img::Img;
use crate::progress::Progress;
use log::{debug, info};
use rayon::prelude::*;
use std::collections::HashSet;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};

/// Side length every icon must have.
pub const ICON_SIZE: u32 = 32;
pub const DEFAULT_CHUNK_SIZE: usize = 10;

#[derive(Debug, Clone)]
pub struct IconEntry {
    /// File name inside the icon directory, byte for byte.
    pub name: OsString,
    pub path: PathBuf,
    pub color: Color,
}

/// Lists the icons of a directory; the actual decoding happens in chunks so
/// it can be spread over a worker pool.
pub struct IconCatalogReader {
    dir: PathBuf,
    remaining_read_icons: Vec<PathBuf>,
    icon_size: u32,
}

impl IconCatalogReader {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        Self::with_icon_size(dir, ICON_SIZE)
    }

    pub fn with_icon_size(dir: impl AsRef<Path>, icon_size: u32) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        let read_dir_error = |source| MosaicError::ReadDir { path: dir.clone(), source };
        let mut remaining_read_icons = Vec::new();
        for entry in fs::read_dir(&dir).map_err(read_dir_error)? {
            let path = entry.map_err(read_dir_error)?.path();
            // follows symlinks, so a dangling one is reported instead of skipped
            let metadata = fs::metadata(&path).map_err(|source| MosaicError::Metadata {
                path: path.clone(),
                source,
            })?;
            if metadata.is_file() {
                remaining_read_icons.push(path);
            }
        }
        // read_dir order is platform dependent, the tie-break in matching is not
        remaining_read_icons.sort();

        Ok(IconCatalogReader {
            dir,
            remaining_read_icons,
            icon_size,
        })
    }

    pub fn len(&self) -> usize {
        self.remaining_read_icons.len()
    }
    pub fn is_empty(&self) -> bool {
        self.remaining_read_icons.is_empty()
    }

    pub fn split(&self, chunk_size: usize) -> Vec<IconCatalogReaderChunk<'_>> {
        let origin = &*self;
        self.remaining_read_icons
            .chunks(chunk_size.max(1))
            .map(|c| IconCatalogReaderChunk {
                origin,
                remaining_read_icons: c,
                icon_size: self.icon_size,
                entries: Vec::with_capacity(c.len()),
            })
            .collect()
    }

    /// Merge processed chunks, in chunk order, into the final catalog.
    pub fn build_split<'a>(&'a self, chunks: Vec<IconCatalogReaderChunk<'a>>) -> Result<IconCatalog> {
        let mut entries = Vec::with_capacity(self.len());
        for mut chunk in chunks {
            assert!(std::ptr::eq(self, chunk.origin));
            debug_assert!(chunk.is_empty(), "chunk merged before being processed");
            entries.append(&mut chunk.entries);
        }
        IconCatalog::from_entries(&self.dir, self.icon_size, entries)
    }
}

pub struct IconCatalogReaderChunk<'a> {
    origin: &'a IconCatalogReader,
    remaining_read_icons: &'a [PathBuf],
    icon_size: u32,

    entries: Vec<IconEntry>,
}

impl<'a> IconCatalogReaderChunk<'a> {
    /// Return the amount of icons remaining to be processed
    pub fn len(&self) -> usize {
        self.remaining_read_icons.len()
    }
    pub fn is_empty(&self) -> bool {
        self.remaining_read_icons.is_empty()
    }

    /// Decode and reduce the next icon. `Ok(false)` once the chunk is drained.
    pub fn process_icon<I: Img>(&mut self, progress: &Progress) -> Result<bool> {
        let remaining = self.remaining_read_icons;
        let (path, rest) = match remaining.split_first() {
            Some(next) => next,
            None => return Ok(false),
        };
        self.remaining_read_icons = rest;

        // The decoded icon (and its file handle) is dropped before the next one is opened.
        let icon = I::read(path).map_err(|source| MosaicError::Decode {
            path: path.clone(),
            source,
        })?;
        let [width, height] = icon.img_size();
        if width != self.icon_size || height != self.icon_size {
            return Err(MosaicError::IconSize {
                path: path.clone(),
                width,
                height,
                expected: self.icon_size,
            });
        }
        let color = reduce_image(&icon, default_transparency())?;
        debug!("{} -> {:?}", path.display(), color_to_rgb8(&color));
        progress.inc();

        self.entries.push(IconEntry {
            name: icon_name(path),
            path: path.clone(),
            color,
        });
        Ok(true)
    }

    pub fn process_all<I: Img>(&mut self, progress: &Progress) -> Result<()> {
        while self.process_icon::<I>(progress)? {}
        Ok(())
    }
}

fn icon_name(path: &Path) -> OsString {
    path.file_name()
        .unwrap_or_else(|| path.as_os_str())
        .to_os_string()
}

#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    /// Worker threads, 0 lets rayon decide.
    pub threads: usize,
    pub chunk_size: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions {
            threads: 0,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Representative colour of every icon, in file name order.
#[derive(Debug, Clone)]
pub struct IconCatalog {
    dir: PathBuf,
    icon_size: u32,
    entries: Vec<IconEntry>,
}

impl IconCatalog {
    pub fn build<I: Img>(dir: impl AsRef<Path>) -> Result<Self> {
        Self::build_with::<I>(dir, LoadOptions::default())
    }

    pub fn build_with<I: Img>(dir: impl AsRef<Path>, options: LoadOptions) -> Result<Self> {
        let reader = IconCatalogReader::open(&dir)?;
        if reader.is_empty() {
            return Err(MosaicError::EmptyCatalog {
                path: dir.as_ref().to_path_buf(),
            });
        }
        info!("Loading {} icons", reader.len());

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.threads)
            .build()?;
        let progress = Progress::new("Loading icons", reader.len());
        let mut chunks = reader.split(options.chunk_size);
        pool.install(|| {
            chunks
                .par_iter_mut()
                .try_for_each(|chunk| chunk.process_all::<I>(&progress))
        })?;

        let catalog = reader.build_split(chunks)?;
        info!("Loaded {} icons", catalog.len());
        Ok(catalog)
    }

    pub fn from_entries(dir: impl AsRef<Path>, icon_size: u32, entries: Vec<IconEntry>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(entries.len());
        if let Some(duplicate) = entries.iter().find(|e| !seen.insert(e.name.as_os_str())) {
            return Err(MosaicError::DuplicateIcon {
                name: duplicate.name.to_string_lossy().into_owned(),
            });
        }
        Ok(IconCatalog {
            dir: dir.as_ref().to_path_buf(),
            icon_size,
            entries,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
    pub fn icon_size(&self) -> u32 {
        self.icon_size
    }
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    pub fn entries(&self) -> &[IconEntry] {
        &self.entries
    }
    pub fn get(&self, name: impl AsRef<OsStr>) -> Option<&IconEntry> {
        let name = name.as_ref();
        self.entries.iter().find(|e| e.name.as_os_str() == name)
    }
}
