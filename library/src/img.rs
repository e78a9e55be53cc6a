use image::{ImageError, Rgba, RgbaImage};
use std::path::Path;

/// Everything the mosaic pipeline needs from an image backend.
pub trait Img: Sized + Send + Sync {
    fn read(path: impl AsRef<Path>) -> Result<Self, ImageError>;
    fn blank(width: u32, height: u32, background: Rgba<u8>) -> Self;

    fn img_size(&self) -> [u32; 2];
    fn rgba_at(&self, x: u32, y: u32) -> Rgba<u8>;

    /// Paste `icon` with its top-left corner at `(x, y)`, using the icon's
    /// alpha channel as mask. Parts falling outside `self` are dropped.
    fn paste(&mut self, icon: &Self, x: u32, y: u32);
    fn resized(&self, width: u32, height: u32) -> Self;

    fn save_to(&self, path: impl AsRef<Path>) -> Result<(), ImageError>;
}

impl Img for RgbaImage {
    fn read(path: impl AsRef<Path>) -> Result<Self, ImageError> {
        Ok(image::io::Reader::open(path)?
            .with_guessed_format()?
            .decode()?
            .into_rgba8())
    }
    fn blank(width: u32, height: u32, background: Rgba<u8>) -> Self {
        RgbaImage::from_pixel(width, height, background)
    }

    fn img_size(&self) -> [u32; 2] {
        [self.width(), self.height()]
    }
    fn rgba_at(&self, x: u32, y: u32) -> Rgba<u8> {
        *self.get_pixel(x, y)
    }

    fn paste(&mut self, icon: &Self, x: u32, y: u32) {
        let (width, height) = self.dimensions();
        for (ix, iy, src) in icon.enumerate_pixels() {
            let (cx, cy) = match (x.checked_add(ix), y.checked_add(iy)) {
                (Some(cx), Some(cy)) if cx < width && cy < height => (cx, cy),
                _ => continue,
            };
            let mask = src.0[3];
            if mask == 0 {
                continue;
            }
            let dst = self.get_pixel_mut(cx, cy);
            if mask == u8::MAX {
                *dst = *src;
                continue;
            }
            for (d, s) in dst.0.iter_mut().zip(src.0.iter()) {
                *d = blend_band(*d, *s, mask);
            }
        }
    }
    fn resized(&self, width: u32, height: u32) -> Self {
        image::imageops::resize(self, width, height, image::imageops::FilterType::Gaussian)
    }

    fn save_to(&self, path: impl AsRef<Path>) -> Result<(), ImageError> {
        self.save(path)
    }
}

/// `dst + (src - dst) * mask / 255`, rounded to nearest.
fn blend_band(dst: u8, src: u8, mask: u8) -> u8 {
    let (dst, src, mask) = (u32::from(dst), u32::from(src), u32::from(mask));
    let blended = dst * (255 - mask) + src * mask;
    ((blended + 127) / 255) as u8
}
