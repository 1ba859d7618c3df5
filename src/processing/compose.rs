use image::{imageops, Rgba, RgbaImage};
use crate::core::BgColor;

/// Composites `cutout` over a canvas filled with `background`.
///
/// Alpha "over" with the background as the destination, via `Pixel::blend`.
pub fn over_background(cutout: &RgbaImage, background: BgColor) -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(cutout.width(), cutout.height(), Rgba(background.rgba()));
    imageops::overlay(&mut canvas, cutout, 0, 0);
    canvas
}
