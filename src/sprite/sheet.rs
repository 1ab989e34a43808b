use image::RgbaImage;

use super::{Bounds, new_canvas};
use crate::error::SpritePrepError;

/// Copy a fixed rectangle out of an image.
///
/// Any part of the region that lies outside the source comes out fully
/// transparent, so the result is always `region.width`x`region.height`.
pub fn crop_region(image: &RgbaImage, region: Bounds) -> Result<RgbaImage, SpritePrepError> {
    let mut out = new_canvas(region.width, region.height)?;
    image::imageops::replace(&mut out, image, -i64::from(region.x), -i64::from(region.y));
    Ok(out)
}

/// Uniform grid layout of a sprite sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetGrid {
    pub columns: u32,
    pub rows: u32,
}

impl SheetGrid {
    pub fn new(columns: u32, rows: u32) -> Self {
        Self { columns, rows }
    }

    pub fn frame_count(&self) -> u32 {
        self.columns.saturating_mul(self.rows)
    }

    /// Rectangle of the 1-based, row-major frame `index` in a
    /// `width`x`height` sheet.
    ///
    /// Frame edges are `k * width / columns`, so frames tile the sheet exactly
    /// even when the width is not a multiple of the column count.
    pub fn frame_rect(
        &self,
        index: u32,
        width: u32,
        height: u32,
    ) -> Result<Bounds, SpritePrepError> {
        if self.columns == 0 || self.rows == 0 || self.columns > width || self.rows > height {
            return Err(SpritePrepError::InvalidGrid {
                width,
                height,
                columns: self.columns,
                rows: self.rows,
            });
        }
        if index == 0 || index > self.frame_count() {
            return Err(SpritePrepError::InvalidFrame {
                index,
                columns: self.columns,
                rows: self.rows,
            });
        }

        let col = (index - 1) % self.columns;
        let row = (index - 1) / self.columns;

        let x0 = edge(col, width, self.columns);
        let x1 = edge(col + 1, width, self.columns);
        let y0 = edge(row, height, self.rows);
        let y1 = edge(row + 1, height, self.rows);

        Ok(Bounds {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        })
    }
}

/// `k * total / parts` without overflowing u32
fn edge(k: u32, total: u32, parts: u32) -> u32 {
    let value = u64::from(k) * u64::from(total) / u64::from(parts);
    // k <= parts, so the result never exceeds `total`
    u32::try_from(value).unwrap_or(total)
}

/// Extract one frame from a sprite sheet
pub fn slice_frame(
    sheet: &RgbaImage,
    grid: SheetGrid,
    index: u32,
) -> Result<RgbaImage, SpritePrepError> {
    let (width, height) = sheet.dimensions();
    let rect = grid.frame_rect(index, width, height)?;
    Ok(image::imageops::crop_imm(sheet, rect.x, rect.y, rect.width, rect.height).to_image())
}
