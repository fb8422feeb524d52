//! Picture preparation for embedding

use docx_rs::Pic;
use image::GenericImageView;
use log::warn;
use std::io::Cursor;

/// EMUs per pixel at 96 DPI.
const EMU_PER_PIXEL: u32 = 9525;
/// Text width of a default Letter/A4 page (6 inches).
const MAX_WIDTH_EMU: u32 = 5_486_400;

/// Rendered size in EMUs, scaled down to the page width when wider.
pub fn dimensions_emu(width_px: u32, height_px: u32) -> (u32, u32) {
    let width = width_px.saturating_mul(EMU_PER_PIXEL);
    let height = height_px.saturating_mul(EMU_PER_PIXEL);
    if width > MAX_WIDTH_EMU {
        let ratio = height as f64 / width as f64;
        (MAX_WIDTH_EMU, (MAX_WIDTH_EMU as f64 * ratio) as u32)
    } else {
        (width, height)
    }
}

/// Build an embeddable picture. PNG and JPEG go in as-is, other decodable formats are
/// re-encoded as PNG. Returns `None` for data the image decoder cannot read.
pub fn picture(data: &[u8], name: &str) -> Option<Pic> {
    let format = match image::guess_format(data) {
        Ok(format) => format,
        Err(e) => {
            warn!("Cannot embed {name}: unknown image format ({e})");
            return None;
        }
    };
    let decoded = match image::load_from_memory(data) {
        Ok(decoded) => decoded,
        Err(e) => {
            warn!("Cannot embed {name}: {e}");
            return None;
        }
    };

    let (w, h) = decoded.dimensions();
    let (width, height) = dimensions_emu(w, h);

    match format {
        image::ImageFormat::Png | image::ImageFormat::Jpeg => {
            Some(Pic::new(data).size(width, height))
        }
        _ => {
            let mut buffer = Vec::new();
            match decoded.write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png) {
                Ok(()) => Some(Pic::new(&buffer).size(width, height)),
                Err(e) => {
                    warn!("Cannot embed {name}: PNG conversion failed ({e})");
                    None
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_images_keep_pixel_size() {
        assert_eq!(dimensions_emu(100, 50), (952_500, 476_250));
    }

    #[test]
    fn wide_images_are_capped() {
        let (w, h) = dimensions_emu(1152, 576);
        assert_eq!(w, MAX_WIDTH_EMU);
        assert_eq!(h, MAX_WIDTH_EMU / 2);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(picture(b"definitely not an image", "x.png").is_none());
    }
}
