//! Cover-art preparation
//!
//! Each image may carry artwork next to it (png/jpg/bmp, any case of
//! extension). The artwork is resized to the family's cover geometry
//! and re-encoded as JPEG into `<stem>.img`; missing artwork is a
//! logged skip, not an error. The geometry itself is validated against
//! the menu's fixed decode buffer.

use crate::catalog::RomImage;
use crate::exceptions::{Result, RomPackError};
use crate::pack::defaults::{
    COVER_MAX_HEIGHT, COVER_MAX_PIXELS, COVER_MAX_WIDTH, COVER_MIN_HEIGHT, COVER_MIN_WIDTH,
};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use log::{debug, info};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Artwork extensions probed next to the image, in priority order.
const COVER_EXTENSIONS: &[&str] = &[
    "png", "PNG", "Png", "jpg", "JPG", "Jpg", "jpeg", "JPEG", "Jpeg", "bmp", "BMP", "Bmp",
];

/// Re-encodes artwork to the firmware cover format.
pub trait CoverEncoder {
    fn encode(&self, source: &Path, dest: &Path, width: u32, height: u32, quality: u8)
    -> Result<()>;
}

/// JPEG cover encoder with Lanczos resampling.
#[derive(Debug)]
pub struct JpegCoverEncoder;

impl CoverEncoder for JpegCoverEncoder {
    fn encode(
        &self,
        source: &Path,
        dest: &Path,
        width: u32,
        height: u32,
        quality: u8,
    ) -> Result<()> {
        let img = image::open(source)
            .map_err(|e| RomPackError::Artwork(source.to_path_buf(), e.to_string()))?
            .resize_exact(width, height, FilterType::Lanczos3)
            .into_rgb8();
        let file = File::create(dest)?;
        let mut encoder = JpegEncoder::new_with_quality(BufWriter::new(file), quality);
        encoder
            .encode_image(&img)
            .map_err(|e| RomPackError::Artwork(source.to_path_buf(), e.to_string()))?;
        Ok(())
    }
}

/// Clamp the requested cover geometry into the supported window and
/// reject anything over the decode-buffer pixel budget.
pub fn clamp_cover_geometry(width: u32, height: u32) -> Result<(u32, u32)> {
    let width = width.clamp(COVER_MIN_WIDTH, COVER_MAX_WIDTH);
    let height = height.clamp(COVER_MIN_HEIGHT, COVER_MAX_HEIGHT);
    if width * height > COVER_MAX_PIXELS {
        return Err(RomPackError::Config(format!(
            "cover art {width}x{height} will overflow the decode buffer"
        )));
    }
    Ok((width, height))
}

/// First existing artwork file next to the image, if any.
fn find_artwork(image: &RomImage) -> Option<PathBuf> {
    let base = image.path.with_file_name(&image.stem);
    COVER_EXTENSIONS
        .iter()
        .map(|ext| base.with_extension(ext))
        .find(|candidate| candidate.exists())
}

/// Encode the cover for one image and record its byte length. Returns
/// false when the image has no artwork.
pub fn prepare_cover(
    encoder: &dyn CoverEncoder,
    image: &mut RomImage,
    width: u32,
    height: u32,
    quality: u8,
) -> Result<bool> {
    let dest = image.cover_path();
    match find_artwork(image) {
        Some(source) => {
            info!("Packing {} Cover> {} ...", image.name, dest.display());
            encoder.encode(&source, &dest, width, height, quality)?;
            image.art_size = std::fs::metadata(&dest)?.len();
            Ok(true)
        }
        None => {
            // A stale .img from a removed source still counts
            if let Ok(meta) = std::fs::metadata(&dest) {
                image.art_size = meta.len();
                return Ok(true);
            }
            debug!("{}: no artwork", image.name);
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pack::family::Family;
    use std::fs;

    fn image_at(dir: &Path, stem: &str) -> RomImage {
        RomImage {
            family: Family::GameBoy,
            name: stem.to_string(),
            stem: stem.to_string(),
            path: dir.join(format!("{stem}.gb")),
            extension: "gb".to_string(),
            publish: true,
            save_enabled: false,
            size: 0,
            art_size: 0,
            packed: None,
        }
    }

    struct FakeEncoder;

    impl CoverEncoder for FakeEncoder {
        fn encode(
            &self,
            _source: &Path,
            dest: &Path,
            _width: u32,
            _height: u32,
            _quality: u8,
        ) -> Result<()> {
            fs::write(dest, b"jpeg")?;
            Ok(())
        }
    }

    #[test]
    fn test_geometry_clamps_into_window() {
        assert_eq!(clamp_cover_geometry(10, 500).unwrap(), (64, 136));
        assert_eq!(clamp_cover_geometry(128, 96).unwrap(), (128, 96));
    }

    #[test]
    fn test_geometry_over_pixel_budget_is_fatal() {
        assert!(clamp_cover_geometry(180, 136).is_err());
    }

    #[test]
    fn test_missing_artwork_is_a_skip() {
        let tmp = tempfile::tempdir().unwrap();
        let mut image = image_at(tmp.path(), "Game");
        assert!(!prepare_cover(&FakeEncoder, &mut image, 128, 96, 90).unwrap());
        assert_eq!(image.art_size, 0);
    }

    #[test]
    fn test_artwork_is_encoded_and_measured() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("Game.png"), b"png").unwrap();
        let mut image = image_at(tmp.path(), "Game");

        assert!(prepare_cover(&FakeEncoder, &mut image, 128, 96, 90).unwrap());
        assert_eq!(image.art_size, 4);
        assert!(tmp.path().join("Game.img").exists());
    }

    #[test]
    fn test_uppercase_extension_is_found() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("Game.JPG"), b"jpg").unwrap();
        let mut image = image_at(tmp.path(), "Game");
        assert!(prepare_cover(&FakeEncoder, &mut image, 128, 96, 90).unwrap());
    }
}
