use crate::error::{MosaicError, Result};
use crate::img::Img;
use image::Rgba;
use palette::Srgb;

pub type ColorComponent = f64;
/// Mean colour of a region, components normalised to `[0, 1]`.
pub type Color = Srgb<ColorComponent>;
pub type TransparencyColor = Srgb<u8>;

const MAX_CHANNEL: i64 = 255;

/// Background that fully transparent pixels are replaced with.
pub fn default_transparency() -> TransparencyColor {
    Srgb::new(255, 255, 255)
}

pub fn color_from_rgb8(red: u8, green: u8, blue: u8) -> Color {
    let max = MAX_CHANNEL as ColorComponent;
    Srgb::new(
        ColorComponent::from(red) / max,
        ColorComponent::from(green) / max,
        ColorComponent::from(blue) / max,
    )
}

pub fn color_to_rgb8(color: &Color) -> [u8; 3] {
    let to_u8 = |c: ColorComponent| (c * MAX_CHANNEL as ColorComponent).round().max(0.).min(255.) as u8;
    [to_u8(color.red), to_u8(color.green), to_u8(color.blue)]
}

/// Sum of absolute channel differences, on the 8-bit scale.
pub fn channel_distance(a: &Color, b: &Color) -> ColorComponent {
    ((a.red - b.red).abs() + (a.green - b.green).abs() + (a.blue - b.blue).abs())
        * MAX_CHANNEL as ColorComponent
}

/// Read-only view over a rectangle of an image.
#[derive(Debug)]
pub struct PixelRegion<'a, I: Img> {
    image: &'a I,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
}

impl<'a, I: Img> PixelRegion<'a, I> {
    /// The exact rectangle; it must be non-empty and lie inside the image.
    pub fn new(image: &'a I, x: u32, y: u32, width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(MosaicError::EmptyRegion { x, y });
        }
        let [image_width, image_height] = image.img_size();
        let fits = |start: u32, len: u32, max: u32| start.checked_add(len).map_or(false, |end| end <= max);
        if !fits(x, width, image_width) || !fits(y, height, image_height) {
            return Err(MosaicError::RegionOutOfBounds { x, y, width, height });
        }
        Ok(PixelRegion { image, x, y, width, height })
    }

    /// The rectangle cut down to the image extent.
    pub fn clipped(image: &'a I, x: u32, y: u32, width: u32, height: u32) -> Result<Self> {
        let [image_width, image_height] = image.img_size();
        let width = width.min(image_width.saturating_sub(x));
        let height = height.min(image_height.saturating_sub(y));
        Self::new(image, x, y, width, height)
    }

    pub fn whole(image: &'a I) -> Result<Self> {
        let [width, height] = image.img_size();
        Self::new(image, 0, 0, width, height)
    }

    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    pub fn origin(&self) -> (u32, u32) {
        (self.x, self.y)
    }

    pub fn pixels(&self) -> impl Iterator<Item = Rgba<u8>> + '_ {
        (self.y..self.y + self.height)
            .flat_map(move |y| (self.x..self.x + self.width).map(move |x| self.image.rgba_at(x, y)))
    }
}

/// Average colour of `region`, with transparent pixels seen over `transparency`.
pub fn reduce<I: Img>(region: &PixelRegion<'_, I>, transparency: TransparencyColor) -> Result<Color> {
    let area = region.area();
    if area == 0 {
        let (x, y) = region.origin();
        return Err(MosaicError::EmptyRegion { x, y });
    }
    let background = [transparency.red, transparency.green, transparency.blue];
    let mut totals = [0i64; 3];
    for pixel in region.pixels() {
        for (total, channel) in totals.iter_mut().zip(effective_rgb(pixel, background).iter()) {
            *total += channel;
        }
    }

    let denominator = area as ColorComponent * MAX_CHANNEL as ColorComponent;
    Ok(Srgb::new(
        totals[0] as ColorComponent / denominator,
        totals[1] as ColorComponent / denominator,
        totals[2] as ColorComponent / denominator,
    ))
}

pub fn reduce_image<I: Img>(image: &I, transparency: TransparencyColor) -> Result<Color> {
    reduce(&PixelRegion::whole(image)?, transparency)
}

fn effective_rgb(pixel: Rgba<u8>, background: [u8; 3]) -> [i64; 3] {
    let [red, green, blue, alpha] = pixel.0;
    match alpha {
        0 => background.map(i64::from),
        u8::MAX => [red, green, blue].map(i64::from),
        _ => {
            let alpha = i64::from(alpha);
            let blend = |channel: u8, bg: u8| {
                let channel = i64::from(channel);
                channel + ((MAX_CHANNEL - channel) * (i64::from(bg) - alpha)).div_euclid(MAX_CHANNEL)
            };
            [
                blend(red, background[0]),
                blend(green, background[1]),
                blend(blue, background[2]),
            ]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    #[test]
    fn uniform_opaque_icon_keeps_its_color() {
        let icon = RgbaImage::from_pixel(32, 32, Rgba([12, 200, 99, 255]));
        let color = reduce_image(&icon, default_transparency()).unwrap();
        assert_eq!(color.into_components(), color_from_rgb8(12, 200, 99).into_components());
    }

    #[test]
    fn fully_transparent_region_is_the_transparency_color() {
        let icon = RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 0]));
        let color = reduce_image(&icon, Srgb::new(40, 50, 60)).unwrap();
        assert_eq!(color.into_components(), color_from_rgb8(40, 50, 60).into_components());
    }

    #[test]
    fn single_pixel_is_not_averaged() {
        let image = RgbaImage::from_pixel(1, 1, Rgba([0, 100, 255, 128]));
        let color = reduce_image(&image, default_transparency()).unwrap();
        // 0 + 255 * 127 / 255, 100 + 155 * 127 / 255, 255 + 0
        assert_eq!(color_to_rgb8(&color), [127, 177, 255]);
    }

    #[test]
    fn partial_alpha_over_dark_background_floors_toward_negative() {
        let image = RgbaImage::from_pixel(1, 1, Rgba([10, 10, 10, 200]));
        let color = reduce_image(&image, Srgb::new(0, 0, 0)).unwrap();
        // 10 + floor(245 * (0 - 200) / 255) = 10 - 193
        let (red, green, blue) = color.into_components();
        for channel in [red, green, blue].iter() {
            assert!((channel * 255. + 183.).abs() < 1e-9, "got {}", channel * 255.);
        }
    }

    #[test]
    fn opaque_pixels_ignore_any_background() {
        let image = RgbaImage::from_pixel(2, 2, Rgba([30, 60, 90, 255]));
        let color = reduce_image(&image, Srgb::new(0, 0, 0)).unwrap();
        assert_eq!(color.into_components(), color_from_rgb8(30, 60, 90).into_components());
    }

    #[test]
    fn averages_mixed_pixels() {
        let mut image = RgbaImage::from_pixel(2, 1, Rgba([0, 0, 0, 255]));
        image.put_pixel(1, 0, Rgba([0, 0, 0, 0]));
        let color = reduce_image(&image, default_transparency()).unwrap();
        assert_eq!(color.into_components(), (0.5, 0.5, 0.5));
    }

    #[test]
    fn region_only_reads_its_rectangle() {
        let mut image = RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255]));
        for y in 2..4 {
            for x in 2..4 {
                image.put_pixel(x, y, Rgba([0, 0, 255, 255]));
            }
        }
        let region = PixelRegion::new(&image, 2, 2, 2, 2).unwrap();
        let color = reduce(&region, default_transparency()).unwrap();
        assert_eq!(color.into_components(), color_from_rgb8(0, 0, 255).into_components());
    }

    #[test]
    fn empty_region_is_rejected() {
        let image = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255]));
        assert!(matches!(
            PixelRegion::new(&image, 1, 1, 0, 3),
            Err(MosaicError::EmptyRegion { x: 1, y: 1 })
        ));
        assert!(matches!(
            PixelRegion::clipped(&image, 4, 0, 2, 2),
            Err(MosaicError::EmptyRegion { x: 4, y: 0 })
        ));
    }

    #[test]
    fn region_past_the_edge_is_rejected_unless_clipped() {
        let image = RgbaImage::from_pixel(5, 3, Rgba([0, 0, 0, 255]));
        assert!(matches!(
            PixelRegion::new(&image, 4, 0, 2, 2),
            Err(MosaicError::RegionOutOfBounds { .. })
        ));
        let clipped = PixelRegion::clipped(&image, 4, 2, 32, 32).unwrap();
        assert_eq!(clipped.area(), 1);
    }

    #[test]
    fn distance_is_manhattan_on_8_bit_scale() {
        let target = color_from_rgb8(10, 10, 10);
        let black = color_from_rgb8(0, 0, 0);
        let white = color_from_rgb8(255, 255, 255);
        assert!((channel_distance(&black, &target) - 30.).abs() < 1e-9);
        assert!((channel_distance(&white, &target) - 735.).abs() < 1e-9);
    }
}
