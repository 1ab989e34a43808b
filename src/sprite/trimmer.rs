use image::RgbaImage;

use super::{Bounds, TrimInfo};

/// Find the bounding box of all pixels with non-zero alpha
pub fn content_bounds(image: &RgbaImage) -> Option<Bounds> {
    let (width, height) = image.dimensions();

    let mut min_x = width;
    let mut min_y = height;
    let mut max_x = 0u32;
    let mut max_y = 0u32;
    let mut found = false;

    for (x, y, pixel) in image.enumerate_pixels() {
        if pixel[3] > 0 {
            found = true;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
    }

    // Fully transparent (or empty) image
    if !found {
        return None;
    }

    Some(Bounds {
        x: min_x,
        y: min_y,
        width: max_x - min_x + 1,
        height: max_y - min_y + 1,
    })
}

/// Trim transparent borders from an image, keeping `padding` pixels of border
/// where the source has room for it.
///
/// Returns `None` when the image has no visible content.
pub fn trim_sprite(image: &RgbaImage, padding: u32) -> Option<(RgbaImage, TrimInfo)> {
    let (width, height) = image.dimensions();
    let bounds = content_bounds(image)?.pad(padding, width, height);

    let trimmed =
        image::imageops::crop_imm(image, bounds.x, bounds.y, bounds.width, bounds.height)
            .to_image();

    let trim_info = TrimInfo {
        offset_x: bounds.x,
        offset_y: bounds.y,
        source_width: width,
        source_height: height,
        trimmed_width: bounds.width,
        trimmed_height: bounds.height,
    };

    Some((trimmed, trim_info))
}
