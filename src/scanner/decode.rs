use image::{DynamicImage, RgbaImage};

/// Opaque decode function: raw pixels plus dimensions in, payload or
/// nothing out.
pub trait QrDecoder: Send + Sync {
    fn decode(&self, data: &[u8], width: u32, height: u32) -> Option<String>;
}

/// Production decoder: grayscale conversion through `image`, symbol
/// detection and decode through `rqrr`.
pub struct RqrrDecoder;

impl QrDecoder for RqrrDecoder {
    fn decode(&self, data: &[u8], width: u32, height: u32) -> Option<String> {
        if width == 0 || height == 0 {
            return None;
        }
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|p| p.checked_mul(4));
        if expected != Some(data.len()) {
            return None;
        }

        let rgba = RgbaImage::from_raw(width, height, data.to_vec())?;
        let luma = DynamicImage::ImageRgba8(rgba).into_luma8();

        let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
            width as usize,
            height as usize,
            |x, y| luma.get_pixel(x as u32, y as u32).0[0],
        );

        let grids = prepared.detect_grids();
        let grid = grids.first()?;
        grid.decode().ok().map(|(_, content)| content)
    }
}
