//! Slice a TSX tileset image into one PNG per tile

use celeste_core::{CoreError, TsxTileset};
use image::GenericImageView;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Directory created next to the TSX when no output is given
pub const DEFAULT_OUTPUT_DIR: &str = "tiles_out";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(transparent)]
    Tileset(#[from] CoreError),

    #[error("Failed to create {path}: {source}")]
    OutputDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to load image {path}: {source}")]
    ImageLoad {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("Failed to write {path}: {source}")]
    TileWrite {
        path: PathBuf,
        source: image::ImageError,
    },
}

/// What an extraction run read and wrote
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractReport {
    pub tsx: PathBuf,
    pub image: PathBuf,
    pub tile_width: u32,
    pub tile_height: u32,
    pub columns: u32,
    pub tile_count: u32,
    pub output_dir: PathBuf,
    pub written: u32,
    /// First tile index that did not fit inside the image
    pub stopped_at: Option<u32>,
}

/// `tile_0042.png`
pub fn tile_file_name(index: u32) -> String {
    format!("tile_{:04}.png", index)
}

/// Output directory used when none is given on the command line
pub fn default_output_dir(tsx: &Path) -> PathBuf {
    tsx.parent()
        .unwrap_or_else(|| Path::new(""))
        .join(DEFAULT_OUTPUT_DIR)
}

/// Write every tile of `tsx` into `output` (or `<tsx dir>/tiles_out`).
///
/// Spacing and margin are ignored; tiles are written row-major until the
/// first one that leaves the image.
pub fn extract_tiles(tsx: &Path, output: Option<&Path>) -> Result<ExtractReport, ExtractError> {
    let output_dir = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output_dir(tsx));
    std::fs::create_dir_all(&output_dir).map_err(|source| ExtractError::OutputDir {
        path: output_dir.clone(),
        source,
    })?;

    let tileset = TsxTileset::load(tsx)?;
    let sheet = image::open(&tileset.image).map_err(|source| ExtractError::ImageLoad {
        path: tileset.image.clone(),
        source,
    })?;
    let (image_width, image_height) = sheet.dimensions();

    let layout = tileset.layout.unpadded();
    let columns = layout.columns_for(image_width);
    let tile_count = layout
        .tile_count
        .unwrap_or_else(|| columns.saturating_mul(image_height / layout.tile_height.max(1)));

    let rects = layout.tile_rects(image_width, image_height);
    let mut written = 0;
    for (index, rect) in rects.iter().enumerate() {
        let tile = sheet
            .view(rect.x, rect.y, rect.width, rect.height)
            .to_image();
        let path = output_dir.join(tile_file_name(index as u32));
        tile.save(&path)
            .map_err(|source| ExtractError::TileWrite { path, source })?;
        written += 1;
    }

    Ok(ExtractReport {
        tsx: tsx.to_path_buf(),
        image: tileset.image,
        tile_width: layout.tile_width,
        tile_height: layout.tile_height,
        columns,
        tile_count,
        output_dir,
        written,
        stopped_at: (written < tile_count).then_some(written),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn write_tileset(dir: &Path, attrs: &str, width: u32, height: u32) -> PathBuf {
        let mut sheet = RgbaImage::new(width, height);
        for (x, y, pixel) in sheet.enumerate_pixels_mut() {
            *pixel = Rgba([(x / 8) as u8, (y / 8) as u8, 0, 255]);
        }
        sheet.save(dir.join("sheet.png")).unwrap();
        let tsx = dir.join("set.tsx");
        std::fs::write(
            &tsx,
            format!(
                r#"<tileset name="set" tilewidth="8" tileheight="8" {}><image source="sheet.png"/></tileset>"#,
                attrs
            ),
        )
        .unwrap();
        tsx
    }

    #[test]
    fn test_tile_file_name() {
        assert_eq!(tile_file_name(7), "tile_0007.png");
        assert_eq!(tile_file_name(12345), "tile_12345.png");
    }

    #[test]
    fn test_extract_derives_grid_from_image() {
        let dir = tempfile::tempdir().unwrap();
        let tsx = write_tileset(dir.path(), "", 24, 16);

        let report = extract_tiles(&tsx, None).unwrap();
        assert_eq!(report.columns, 3);
        assert_eq!(report.tile_count, 6);
        assert_eq!(report.written, 6);
        assert_eq!(report.stopped_at, None);
        assert_eq!(report.output_dir, dir.path().join(DEFAULT_OUTPUT_DIR));

        let tile = image::open(report.output_dir.join("tile_0004.png"))
            .unwrap()
            .to_rgba8();
        assert_eq!(tile.dimensions(), (8, 8));
        assert_eq!(tile.get_pixel(0, 0), &Rgba([1, 1, 0, 255]));
    }

    #[test]
    fn test_extract_stops_at_out_of_bounds_tile() {
        let dir = tempfile::tempdir().unwrap();
        let tsx = write_tileset(dir.path(), r#"tilecount="10" columns="2""#, 16, 32);
        let out = dir.path().join("custom");

        let report = extract_tiles(&tsx, Some(&out)).unwrap();
        assert_eq!(report.written, 8);
        assert_eq!(report.stopped_at, Some(8));
        assert!(out.join("tile_0007.png").is_file());
        assert!(!out.join("tile_0008.png").exists());
    }

    #[test]
    fn test_huge_tilecount_writes_what_fits() {
        let dir = tempfile::tempdir().unwrap();
        let tsx = write_tileset(dir.path(), r#"tilecount="4000000000" columns="1""#, 8, 16);

        let report = extract_tiles(&tsx, None).unwrap();
        assert_eq!(report.tile_count, 4_000_000_000);
        assert_eq!(report.written, 2);
        assert_eq!(report.stopped_at, Some(2));
    }

    #[test]
    fn test_missing_image_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let tsx = dir.path().join("set.tsx");
        std::fs::write(
            &tsx,
            r#"<tileset tilewidth="8" tileheight="8"><image source="nope.png"/></tileset>"#,
        )
        .unwrap();
        assert!(matches!(
            extract_tiles(&tsx, None),
            Err(ExtractError::ImageLoad { .. })
        ));
    }
}
