//! TSX tileset descriptors
//!
//! Only the attributes needed to slice the referenced image are read:
//! `tilewidth`, `tileheight`, `spacing`, `margin`, `tilecount`, `columns` and
//! the `<image source>` path (resolved relative to the TSX file).

use std::path::{Path, PathBuf};

use crate::CoreError;

/// Pixel rectangle of one tile inside the tileset image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Grid geometry of a tileset image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TilesetLayout {
    pub tile_width: u32,
    pub tile_height: u32,
    pub spacing: u32,
    pub margin: u32,
    /// Declared tile count, `None` to derive it from the image
    pub tile_count: Option<u32>,
    /// Declared column count, `None` to derive it from the image
    pub columns: Option<u32>,
}

impl TilesetLayout {
    pub fn new(tile_width: u32, tile_height: u32) -> Self {
        Self {
            tile_width,
            tile_height,
            spacing: 0,
            margin: 0,
            tile_count: None,
            columns: None,
        }
    }

    /// Same layout with spacing and margin ignored
    pub fn unpadded(self) -> Self {
        Self {
            spacing: 0,
            margin: 0,
            ..self
        }
    }

    /// Columns used for an image `image_width` pixels wide
    pub fn columns_for(&self, image_width: u32) -> u32 {
        match self.columns {
            Some(columns) if columns > 0 => columns,
            _ => fit(image_width, self.tile_width, self.spacing, self.margin),
        }
    }

    /// Rows that fit in an image `image_height` pixels tall
    pub fn rows_for(&self, image_height: u32) -> u32 {
        fit(image_height, self.tile_height, self.spacing, self.margin)
    }

    /// Row-major tile rectangles, stopping at the first tile that leaves the image
    pub fn tile_rects(&self, image_width: u32, image_height: u32) -> Vec<TileRect> {
        if self.tile_width == 0 || self.tile_height == 0 {
            return Vec::new();
        }
        let columns = self.columns_for(image_width);
        let rows = self.rows_for(image_height);
        let count = match self.tile_count {
            Some(count) if count > 0 => count,
            _ => columns.saturating_mul(rows),
        };
        // Declared counts are not trusted for the allocation
        let fits = fit(image_width, self.tile_width, self.spacing, self.margin).saturating_mul(rows);

        let mut rects = Vec::with_capacity(count.min(fits) as usize);
        for index in 0..count {
            let (col, row) = (index % columns, index / columns);
            let Some(x) = offset(self.margin, col, self.tile_width, self.spacing) else {
                break;
            };
            let Some(y) = offset(self.margin, row, self.tile_height, self.spacing) else {
                break;
            };
            let right = x.checked_add(self.tile_width);
            let bottom = y.checked_add(self.tile_height);
            if !matches!((right, bottom), (Some(r), Some(b)) if r <= image_width && b <= image_height)
            {
                break;
            }
            rects.push(TileRect {
                x,
                y,
                width: self.tile_width,
                height: self.tile_height,
            });
        }
        rects
    }
}

/// Tiles of `tile` pixels that fit along `extent`, at least one
fn fit(extent: u32, tile: u32, spacing: u32, margin: u32) -> u32 {
    let available = extent
        .saturating_add(spacing)
        .saturating_sub(margin.saturating_mul(2));
    (available / tile.saturating_add(spacing).max(1)).max(1)
}

/// Pixel offset of grid slot `slot`, `None` past `u32::MAX`
fn offset(margin: u32, slot: u32, tile: u32, spacing: u32) -> Option<u32> {
    tile.checked_add(spacing)
        .and_then(|step| step.checked_mul(slot))
        .and_then(|step| step.checked_add(margin))
}

/// A parsed `.tsx` file
#[derive(Debug, Clone, PartialEq)]
pub struct TsxTileset {
    pub name: String,
    pub layout: TilesetLayout,
    /// Image path, already joined with the TSX directory
    pub image: PathBuf,
}

impl TsxTileset {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let xml = std::fs::read_to_string(path)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        Self::parse(&xml, base_dir).map_err(|e| match e {
            CoreError::MissingImage(_) => CoreError::MissingImage(path.to_path_buf()),
            other => other,
        })
    }

    /// Parse TSX markup; `base_dir` is the directory the image path is relative to
    pub fn parse(xml: &str, base_dir: &Path) -> Result<Self, CoreError> {
        let doc = roxmltree::Document::parse(xml)?;
        let root = doc.root_element();
        if root.tag_name().name() != "tileset" {
            return Err(CoreError::InvalidFormat(format!(
                "expected <tileset> root, found <{}>",
                root.tag_name().name()
            )));
        }

        let required = |name: &str| -> Result<u32, CoreError> {
            attr_u32(root, name)?.ok_or_else(|| {
                CoreError::InvalidFormat(format!("<tileset> is missing the {} attribute", name))
            })
        };
        let layout = TilesetLayout {
            tile_width: required("tilewidth")?,
            tile_height: required("tileheight")?,
            spacing: attr_u32(root, "spacing")?.unwrap_or(0),
            margin: attr_u32(root, "margin")?.unwrap_or(0),
            tile_count: attr_u32(root, "tilecount")?.filter(|c| *c > 0),
            columns: attr_u32(root, "columns")?.filter(|c| *c > 0),
        };

        let source = root
            .children()
            .find(|n| n.has_tag_name("image"))
            .and_then(|n| n.attribute("source"))
            .ok_or_else(|| CoreError::MissingImage(base_dir.to_path_buf()))?;

        Ok(Self {
            name: root.attribute("name").unwrap_or_default().to_string(),
            layout,
            image: base_dir.join(source),
        })
    }
}

fn attr_u32(node: roxmltree::Node, name: &str) -> Result<Option<u32>, CoreError> {
    let Some(raw) = node.attribute(name) else {
        return Ok(None);
    };
    let value: i64 = raw.trim().parse().map_err(|_| {
        CoreError::InvalidFormat(format!("attribute {}=\"{}\" is not an integer", name, raw))
    })?;
    Ok(u32::try_from(value).ok())
}
