//! Sliced tile images shared by the game, the editor and the inspector

use image::{GenericImage, GenericImageView, RgbaImage};
use std::path::{Path, PathBuf};

use crate::{CoreError, TilesetLayout, TsxTileset, TILE_SIZE};

/// Columns used when the tile source does not define any
const LOOSE_TILE_COLUMNS: u32 = 8;
/// Atlas file looked up inside the fallback directory
const ATLAS_FILE: &str = "tilemap.png";

/// Where a palette was loaded from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaletteSource {
    Tsx(PathBuf),
    Directory(PathBuf),
    Atlas(PathBuf),
}

impl std::fmt::Display for PaletteSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaletteSource::Tsx(p) => write!(f, "TSX {}", p.display()),
            PaletteSource::Directory(p) => write!(f, "tile directory {}", p.display()),
            PaletteSource::Atlas(p) => write!(f, "atlas {}", p.display()),
        }
    }
}

/// Ordered list of equally sized tile images; blueprint frames index into it
#[derive(Debug, Clone)]
pub struct Palette {
    pub tile_width: u32,
    pub tile_height: u32,
    pub columns: u32,
    pub tiles: Vec<RgbaImage>,
    pub source: PaletteSource,
}

impl Palette {
    /// Slice the image referenced by a TSX file
    pub fn from_tsx(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let tileset = TsxTileset::load(path)?;
        let image = image::open(&tileset.image)?.to_rgba8();
        let tiles = slice(&image, &tileset.layout);
        if tiles.is_empty() {
            return Err(CoreError::EmptyPalette);
        }
        Ok(Self {
            tile_width: tileset.layout.tile_width,
            tile_height: tileset.layout.tile_height,
            columns: tileset
                .layout
                .columns_for(image.width())
                .min(tiles.len() as u32),
            tiles,
            source: PaletteSource::Tsx(path.to_path_buf()),
        })
    }

    /// Load every PNG in `dir`, sorted by file name ignoring case.
    ///
    /// The first image fixes the tile size; images of another size are skipped.
    pub fn from_directory(dir: impl AsRef<Path>) -> Result<Self, CoreError> {
        let dir = dir.as_ref();
        let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| {
                p.is_file()
                    && p.extension()
                        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
                    && p.file_name().is_some_and(|n| n != ATLAS_FILE)
            })
            .collect();
        files.sort_by_key(|p| {
            p.file_name()
                .map(|n| n.to_string_lossy().to_lowercase())
                .unwrap_or_default()
        });

        let mut tiles: Vec<RgbaImage> = Vec::with_capacity(files.len());
        for file in files {
            let tile = image::open(&file)?.to_rgba8();
            match tiles.first() {
                Some(first) if first.dimensions() != tile.dimensions() => continue,
                _ => tiles.push(tile),
            }
        }
        let (tile_width, tile_height) = tiles
            .first()
            .map(|t| t.dimensions())
            .ok_or(CoreError::EmptyPalette)?;
        Ok(Self {
            tile_width,
            tile_height,
            columns: LOOSE_TILE_COLUMNS.min(tiles.len() as u32).max(1),
            tiles,
            source: PaletteSource::Directory(dir.to_path_buf()),
        })
    }

    /// Slice a single atlas image on an 8x8 pixel grid
    pub fn from_atlas(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let image = image::open(path)?.to_rgba8();
        let layout = TilesetLayout::new(TILE_SIZE, TILE_SIZE);
        let tiles = slice(&image, &layout);
        if tiles.is_empty() {
            return Err(CoreError::EmptyPalette);
        }
        Ok(Self {
            tile_width: TILE_SIZE,
            tile_height: TILE_SIZE,
            columns: layout.columns_for(image.width()),
            tiles,
            source: PaletteSource::Atlas(path.to_path_buf()),
        })
    }

    /// Try the TSX, then loose PNGs in `fallback_dir`, then `fallback_dir/tilemap.png`.
    ///
    /// Returns the palette with the reasons earlier sources were rejected.
    pub fn load_default(
        tsx: Option<&Path>,
        fallback_dir: &Path,
    ) -> Result<(Self, Vec<String>), CoreError> {
        let mut rejected = Vec::new();
        if let Some(tsx) = tsx {
            match Self::from_tsx(tsx) {
                Ok(palette) => return Ok((palette, rejected)),
                Err(e) => rejected.push(format!("TSX {}: {}", tsx.display(), e)),
            }
        }
        match Self::from_directory(fallback_dir) {
            Ok(palette) => return Ok((palette, rejected)),
            Err(e) => rejected.push(format!("tile directory {}: {}", fallback_dir.display(), e)),
        }
        let atlas = fallback_dir.join(ATLAS_FILE);
        match Self::from_atlas(&atlas) {
            Ok(palette) => Ok((palette, rejected)),
            Err(_) => Err(CoreError::EmptyPalette),
        }
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn rows(&self) -> u32 {
        (self.tiles.len() as u32).div_ceil(self.columns.max(1))
    }

    pub fn tile(&self, index: u32) -> Option<&RgbaImage> {
        self.tiles.get(index as usize)
    }

    /// Pack every tile into one row-major image `columns` tiles wide
    pub fn atlas_image(&self) -> RgbaImage {
        let columns = self.columns.max(1);
        let mut atlas = RgbaImage::new(columns * self.tile_width, self.rows() * self.tile_height);
        for (i, tile) in self.tiles.iter().enumerate() {
            let i = i as u32;
            let x = (i % columns) * self.tile_width;
            let y = (i / columns) * self.tile_height;
            // Sizes match by construction, copy_from only fails on overflow
            let _ = atlas.copy_from(tile, x, y);
        }
        atlas
    }
}

fn slice(image: &RgbaImage, layout: &TilesetLayout) -> Vec<RgbaImage> {
    layout
        .tile_rects(image.width(), image.height())
        .into_iter()
        .map(|r| image.view(r.x, r.y, r.width, r.height).to_image())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    /// 4x2 tiles of 8px, each tile filled with its own index as the red channel
    fn write_sheet(path: &Path) {
        let mut sheet = RgbaImage::new(32, 16);
        for (x, y, px) in sheet.enumerate_pixels_mut() {
            let index = (y / 8) * 4 + x / 8;
            *px = Rgba([index as u8, 0, 0, 255]);
        }
        sheet.save(path).unwrap();
    }

    #[test]
    fn test_from_tsx() {
        let dir = tempfile::tempdir().unwrap();
        write_sheet(&dir.path().join("sheet.png"));
        let tsx = dir.path().join("b.tsx");
        std::fs::write(
            &tsx,
            r#"<tileset tilewidth="8" tileheight="8" tilecount="6"><image source="sheet.png"/></tileset>"#,
        )
        .unwrap();

        let palette = Palette::from_tsx(&tsx).unwrap();
        assert_eq!(palette.len(), 6);
        assert_eq!(palette.columns, 4);
        assert_eq!(palette.rows(), 2);
        assert_eq!(palette.tile(5).unwrap().get_pixel(0, 0)[0], 5);
    }

    #[test]
    fn test_from_tsx_with_huge_declared_counts() {
        let dir = tempfile::tempdir().unwrap();
        write_sheet(&dir.path().join("sheet.png"));
        let tsx = dir.path().join("b.tsx");
        std::fs::write(
            &tsx,
            r#"<tileset tilewidth="8" tileheight="8" tilecount="4000000000" columns="4000000000"><image source="sheet.png"/></tileset>"#,
        )
        .unwrap();

        let palette = Palette::from_tsx(&tsx).unwrap();
        assert_eq!(palette.len(), 4);
        assert_eq!(palette.columns, 4);
        assert_eq!(palette.atlas_image().dimensions(), (32, 8));
    }

    #[test]
    fn test_from_directory_sorted_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        for (name, value) in [("b.png", 2u8), ("A.png", 1), ("c.PNG", 3)] {
            RgbaImage::from_pixel(8, 8, Rgba([value, 0, 0, 255]))
                .save_with_format(dir.path().join(name), image::ImageFormat::Png)
                .unwrap();
        }
        RgbaImage::new(16, 16)
            .save(dir.path().join("d_big.png"))
            .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let palette = Palette::from_directory(dir.path()).unwrap();
        let reds: Vec<u8> = palette.tiles.iter().map(|t| t.get_pixel(0, 0)[0]).collect();
        assert_eq!(reds, vec![1, 2, 3]);
        assert_eq!(palette.columns, 3);
    }

    #[test]
    fn test_load_default_falls_back_to_atlas() {
        let dir = tempfile::tempdir().unwrap();
        write_sheet(&dir.path().join("tilemap.png"));

        let (palette, rejected) =
            Palette::load_default(Some(&dir.path().join("missing.tsx")), dir.path()).unwrap();
        assert_eq!(palette.source, PaletteSource::Atlas(dir.path().join("tilemap.png")));
        assert_eq!(palette.len(), 8);
        assert_eq!(rejected.len(), 2);
    }

    #[test]
    fn test_load_default_empty() {
        let dir = tempfile::tempdir().unwrap();
        let err = Palette::load_default(None, dir.path()).unwrap_err();
        assert!(matches!(err, CoreError::EmptyPalette));
    }

    #[test]
    fn test_atlas_image_layout() {
        let dir = tempfile::tempdir().unwrap();
        write_sheet(&dir.path().join("tilemap.png"));
        let mut palette = Palette::from_atlas(dir.path().join("tilemap.png")).unwrap();
        palette.tiles.truncate(5);

        let atlas = palette.atlas_image();
        assert_eq!(atlas.dimensions(), (32, 16));
        assert_eq!(atlas.get_pixel(0, 8)[0], 4);
        // Unused slots stay transparent
        assert_eq!(atlas.get_pixel(8, 8)[3], 0);
    }
}
