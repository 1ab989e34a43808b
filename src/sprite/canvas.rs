use image::RgbaImage;
use serde::Deserialize;

use crate::cli::Anchor;
use crate::error::SpritePrepError;

/// How big the target canvas of an alignment pass should be
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanvasSize {
    /// Exact canvas dimensions
    Fixed(u32, u32),
    /// Largest sprite dimensions seen in the batch
    BatchMax {
        /// Use the larger of width and height on both sides
        #[serde(default)]
        square: bool,
        /// Extra pixels added to each side length
        #[serde(default)]
        grow: u32,
    },
}

impl CanvasSize {
    /// Resolve to concrete dimensions given the batch maximum `(w, h)`
    pub fn resolve(&self, batch_max: (u32, u32)) -> (u32, u32) {
        match *self {
            CanvasSize::Fixed(w, h) => (w, h),
            CanvasSize::BatchMax { square, grow } => {
                let (w, h) = batch_max;
                let (w, h) = if square {
                    let side = w.max(h);
                    (side, side)
                } else {
                    (w, h)
                };
                (w.saturating_add(grow), h.saturating_add(grow))
            }
        }
    }

    /// True when the canvas depends on a measuring pass over the batch
    pub fn needs_measure(&self) -> bool {
        matches!(self, CanvasSize::BatchMax { .. })
    }
}

impl std::str::FromStr for CanvasSize {
    type Err = String;

    /// Accepts `max`, a single side (`227`), or `WIDTHxHEIGHT` (`201x180`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("max") {
            return Ok(CanvasSize::BatchMax {
                square: false,
                grow: 0,
            });
        }

        let parse_side = |v: &str| {
            v.trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| format!("invalid canvas size: {}", s))
        };

        match s.split_once(['x', 'X']) {
            Some((w, h)) => Ok(CanvasSize::Fixed(parse_side(w)?, parse_side(h)?)),
            None => {
                let side = parse_side(s)?;
                Ok(CanvasSize::Fixed(side, side))
            }
        }
    }
}

/// Where a sprite lands on its canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Placement {
    pub anchor: Anchor,
    /// Gap between the sprite and the canvas bottom (bottom anchor only)
    pub bottom_margin: u32,
}

impl Placement {
    pub fn bottom(bottom_margin: u32) -> Self {
        Self {
            anchor: Anchor::Bottom,
            bottom_margin,
        }
    }

    /// Top-left offset of a `sprite`-sized image on a `canvas`-sized canvas.
    ///
    /// Offsets are floor-divided and may be negative when the sprite is
    /// larger than the canvas.
    pub fn offset(&self, canvas: (u32, u32), sprite: (u32, u32)) -> (i64, i64) {
        let dx = i64::from(canvas.0) - i64::from(sprite.0);
        let dy = i64::from(canvas.1) - i64::from(sprite.1);
        let x = dx.div_euclid(2);
        let y = match self.anchor {
            Anchor::Bottom => dy - i64::from(self.bottom_margin),
            Anchor::Center => dy.div_euclid(2),
        };
        (x, y)
    }
}

/// Paste `sprite` onto a fresh, fully transparent canvas.
///
/// Pixels that fall outside the canvas are clipped.
pub fn place_on_canvas(
    sprite: &RgbaImage,
    canvas: (u32, u32),
    placement: Placement,
) -> Result<RgbaImage, SpritePrepError> {
    let mut out = new_canvas(canvas.0, canvas.1)?;
    let (x, y) = placement.offset(canvas, sprite.dimensions());
    image::imageops::replace(&mut out, sprite, x, y);
    Ok(out)
}

/// Allocate a fully transparent image, refusing sizes beyond the `image`
/// crate's default allocation limit.
pub fn new_canvas(width: u32, height: u32) -> Result<RgbaImage, SpritePrepError> {
    let limit = image::Limits::default().max_alloc.unwrap_or(u64::MAX);
    let bytes = u64::from(width)
        .checked_mul(u64::from(height))
        .and_then(|n| n.checked_mul(4));

    match bytes {
        Some(n) if n <= limit && usize::try_from(n).is_ok() => Ok(RgbaImage::new(width, height)),
        _ => Err(SpritePrepError::CanvasTooLarge {
            width,
            height,
            limit,
        }),
    }
}

/// True when a `sprite`-sized image placed on `canvas` would lose pixels
pub fn is_clipped(canvas: (u32, u32), sprite: (u32, u32), placement: Placement) -> bool {
    let (x, y) = placement.offset(canvas, sprite);
    x < 0
        || y < 0
        || x + i64::from(sprite.0) > i64::from(canvas.0)
        || y + i64::from(sprite.1) > i64::from(canvas.1)
}
