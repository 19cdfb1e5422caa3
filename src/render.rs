//! CPU raster primitives for the immediate overlay surface.
//!
//! This module contains:
//! - the [`DrawContext`] trait the immediate backend paints through
//! - [`PixelCanvas`], an RGBA8 buffer implementing it
//! - a compact 5x7 glyph table used to rasterize overlay text
//! - conversion of the canvas into a Bevy [`Image`]

use bevy::{
    color::{Color, ColorToPacked},
    image::Image,
    render::{
        render_asset::RenderAssetUsages,
        render_resource::{Extent3d, TextureDimension, TextureFormat},
    },
};

use crate::constants::{GLYPH_CELL_HEIGHT, GLYPH_CELL_WIDTH};

/// Canvas-style drawing operations used by the immediate backend.
pub trait DrawContext {
    /// Reset a rectangle to fully transparent pixels.
    fn clear_rect(&mut self, x: u32, y: u32, width: u32, height: u32);

    /// Draw `text` with its top-left corner at (`x`, `y`).
    fn fill_text(&mut self, text: &str, x: u32, y: u32, color: Color);
}

/// RGBA8 pixel buffer with a fixed glyph size.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelCanvas {
    width: u32,
    height: u32,
    glyph_scale: u32,
    pixels: Vec<u8>,
}

impl PixelCanvas {
    /// Transparent canvas; glyphs are scaled to fill rows of `font_size` pixels.
    pub fn new(width: u32, height: u32, font_size: f32) -> Self {
        Self {
            width,
            height,
            glyph_scale: glyph_scale_for(font_size),
            pixels: vec![0; (width as usize) * (height as usize) * 4],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// RGBA of one pixel, `None` outside the canvas.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let offset = self.offset(x, y)?;
        let mut rgba = [0; 4];
        rgba.copy_from_slice(&self.pixels[offset..offset + 4]);
        Some(rgba)
    }

    /// True when any pixel inside the rectangle is not transparent.
    pub fn has_ink(&self, x: u32, y: u32, width: u32, height: u32) -> bool {
        let x_end = x.saturating_add(width).min(self.width);
        let y_end = y.saturating_add(height).min(self.height);
        (y..y_end).any(|py| {
            (x..x_end).any(|px| self.pixel(px, py).is_some_and(|rgba| rgba[3] != 0))
        })
    }

    /// Width in pixels that `text` occupies when drawn.
    pub fn text_width(&self, text: &str) -> u32 {
        text.chars().count() as u32 * GLYPH_CELL_WIDTH * self.glyph_scale
    }

    /// Copy the buffer into a Bevy image asset.
    pub fn to_image(&self) -> Image {
        Image::new(
            Extent3d {
                width: self.width.max(1),
                height: self.height.max(1),
                depth_or_array_layers: 1,
            },
            TextureDimension::D2,
            if self.pixels.is_empty() {
                vec![0; 4]
            } else {
                self.pixels.clone()
            },
            TextureFormat::Rgba8UnormSrgb,
            RenderAssetUsages::MAIN_WORLD | RenderAssetUsages::RENDER_WORLD,
        )
    }

    fn offset(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| ((y as usize) * (self.width as usize) + (x as usize)) * 4)
    }

    fn put(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if let Some(offset) = self.offset(x, y) {
            self.pixels[offset..offset + 4].copy_from_slice(&rgba);
        }
    }

    fn draw_glyph(&mut self, rows: &[u8; 7], x: u32, y: u32, rgba: [u8; 4]) {
        let scale = self.glyph_scale;
        for (gy, bits) in rows.iter().enumerate() {
            for gx in 0..5u32 {
                if bits & (0b1_0000 >> gx) == 0 {
                    continue;
                }
                for sy in 0..scale {
                    for sx in 0..scale {
                        self.put(x + gx * scale + sx, y + gy as u32 * scale + sy, rgba);
                    }
                }
            }
        }
    }
}

impl DrawContext for PixelCanvas {
    fn clear_rect(&mut self, x: u32, y: u32, width: u32, height: u32) {
        let x_end = x.saturating_add(width).min(self.width);
        let y_end = y.saturating_add(height).min(self.height);
        for py in y..y_end {
            for px in x..x_end {
                self.put(px, py, [0; 4]);
            }
        }
    }

    fn fill_text(&mut self, text: &str, x: u32, y: u32, color: Color) {
        let rgba = color.to_srgba().to_u8_array();
        let advance = GLYPH_CELL_WIDTH * self.glyph_scale;
        let mut pen_x = x;
        for ch in text.chars() {
            if let Some(rows) = glyph(ch) {
                self.draw_glyph(rows, pen_x, y, rgba);
            }
            pen_x = pen_x.saturating_add(advance);
        }
    }
}

/// Integer glyph scale so one glyph cell fits a row of `font_size` pixels.
pub fn glyph_scale_for(font_size: f32) -> u32 {
    ((font_size / GLYPH_CELL_HEIGHT as f32).floor() as u32).max(1)
}

/// 5x7 bitmap of `ch`, one byte per row, bit 4 is the leftmost column.
/// Lowercase letters share the uppercase shapes. Unknown characters draw
/// nothing.
fn glyph(ch: char) -> Option<&'static [u8; 7]> {
    let index = match ch.to_ascii_uppercase() {
        c @ '0'..='9' => c as usize - '0' as usize,
        c @ 'A'..='Z' => 10 + c as usize - 'A' as usize,
        '(' => 36,
        ')' => 37,
        '/' => 38,
        '.' => 39,
        '-' => 40,
        ':' => 41,
        _ => return None,
    };
    GLYPHS.get(index)
}

#[rustfmt::skip]
const GLYPHS: [[u8; 7]; 42] = [
    [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E], // 0
    [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E], // 1
    [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F], // 2
    [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E], // 3
    [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02], // 4
    [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E], // 5
    [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E], // 6
    [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08], // 7
    [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E], // 8
    [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C], // 9
    [0x0E, 0x11, 0x11, 0x11, 0x1F, 0x11, 0x11], // A
    [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E], // B
    [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E], // C
    [0x1C, 0x12, 0x11, 0x11, 0x11, 0x12, 0x1C], // D
    [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F], // E
    [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10], // F
    [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F], // G
    [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11], // H
    [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E], // I
    [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C], // J
    [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11], // K
    [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F], // L
    [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11], // M
    [0x11, 0x11, 0x19, 0x15, 0x13, 0x11, 0x11], // N
    [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E], // O
    [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10], // P
    [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D], // Q
    [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11], // R
    [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E], // S
    [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04], // T
    [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E], // U
    [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04], // V
    [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A], // W
    [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11], // X
    [0x11, 0x11, 0x11, 0x0A, 0x04, 0x04, 0x04], // Y
    [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F], // Z
    [0x02, 0x04, 0x08, 0x08, 0x08, 0x04, 0x02], // (
    [0x08, 0x04, 0x02, 0x02, 0x02, 0x04, 0x08], // )
    [0x00, 0x01, 0x02, 0x04, 0x08, 0x10, 0x00], // /
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C], // .
    [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00], // -
    [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00], // :
];
