//! CPU pixel surfaces and color types.
//!
//! A `Surface` is a tightly packed 2D pixel buffer in one of a few native
//! formats. Textures wrap one, and the software renderer draws into one.

use bytemuck::{Pod, Zeroable};
use crate::error::{Error, Result};
use crate::math::Rect;

// ============================================================================
// COLORS
// ============================================================================

/// 8-bit RGBA color
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Pod, Zeroable)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgba(0, 0, 0, 255);
    pub const WHITE: Color = Color::rgba(255, 255, 255, 255);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// Decode a packed `0xAARRGGBB` value
    pub const fn from_argb(argb: u32) -> Self {
        Self {
            a: (argb >> 24) as u8,
            r: (argb >> 16) as u8,
            g: (argb >> 8) as u8,
            b: argb as u8,
        }
    }

    /// Encode as packed `0xAARRGGBB`
    pub const fn to_argb(self) -> u32 {
        (self.a as u32) << 24 | (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }

    /// Build from normalized components, clamped to [0, 1]
    pub fn from_unit(r: f32, g: f32, b: f32, a: f32) -> Self {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0 + 0.5) as u8;
        Self::rgba(q(r), q(g), q(b), q(a))
    }

    pub fn is_opaque(self) -> bool {
        self.a == 255
    }
}

/// Normalized floating-point RGBA color
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct FColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl FColor {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

impl From<Color> for FColor {
    fn from(c: Color) -> Self {
        Self {
            r: c.r as f32 / 255.0,
            g: c.g as f32 / 255.0,
            b: c.b as f32 / 255.0,
            a: c.a as f32 / 255.0,
        }
    }
}

// ============================================================================
// PIXEL FORMATS
// ============================================================================

/// Native pixel layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// 32-bit, packed `0xAARRGGBB` (little-endian bytes B, G, R, A)
    Argb8888,
    /// 32-bit, packed `0xAABBGGRR` (little-endian bytes R, G, B, A)
    Abgr8888,
    /// 16-bit, 5-6-5, no alpha
    Rgb565,
}

impl PixelFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Argb8888 | PixelFormat::Abgr8888 => 4,
            PixelFormat::Rgb565 => 2,
        }
    }

    /// Encode a color to this format's packed value
    pub fn pack(self, c: Color) -> u32 {
        match self {
            PixelFormat::Argb8888 => c.to_argb(),
            PixelFormat::Abgr8888 => {
                (c.a as u32) << 24 | (c.b as u32) << 16 | (c.g as u32) << 8 | c.r as u32
            }
            PixelFormat::Rgb565 => {
                ((c.r as u32 >> 3) << 11) | ((c.g as u32 >> 2) << 5) | (c.b as u32 >> 3)
            }
        }
    }

    /// Decode a packed value of this format
    pub fn unpack(self, raw: u32) -> Color {
        match self {
            PixelFormat::Argb8888 => Color::from_argb(raw),
            PixelFormat::Abgr8888 => Color::rgba(raw as u8, (raw >> 8) as u8, (raw >> 16) as u8, (raw >> 24) as u8),
            PixelFormat::Rgb565 => {
                let r = ((raw >> 11) & 0x1f) as u8;
                let g = ((raw >> 5) & 0x3f) as u8;
                let b = (raw & 0x1f) as u8;
                Color::rgb((r << 3) | (r >> 2), (g << 2) | (g >> 4), (b << 3) | (b >> 2))
            }
        }
    }
}

// ============================================================================
// SURFACE
// ============================================================================

/// Owned 2D pixel buffer
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    width: u32,
    height: u32,
    format: PixelFormat,
    pixels: Vec<u8>,
}

impl Surface {
    /// Allocate a zero-filled surface
    ///
    /// # Errors
    ///
    /// `InvalidParams` for a zero dimension.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidParams(format!("surface size {}x{}", width, height)));
        }
        let size = width as usize * height as usize * format.bytes_per_pixel();
        Ok(Self {
            width,
            height,
            format,
            pixels: vec![0; size],
        })
    }

    /// Build a surface from existing packed pixel bytes
    pub fn from_pixels(width: u32, height: u32, format: PixelFormat, pixels: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * format.bytes_per_pixel();
        if width == 0 || height == 0 || pixels.len() != expected {
            return Err(Error::InvalidParams(format!(
                "{} bytes for a {}x{} {:?} surface (expected {})",
                pixels.len(), width, height, format, expected
            )));
        }
        Ok(Self { width, height, format, pixels })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Bytes per row
    pub fn pitch(&self) -> usize {
        self.width as usize * self.format.bytes_per_pixel()
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width as i32, self.height as i32)
    }

    /// Packed value at (x, y); the caller guarantees bounds
    #[inline]
    pub fn read_raw(&self, x: u32, y: u32) -> u32 {
        let bpp = self.format.bytes_per_pixel();
        let offset = (y as usize * self.width as usize + x as usize) * bpp;
        let bytes = &self.pixels[offset..offset + bpp];
        match bpp {
            4 => u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            _ => u16::from_le_bytes([bytes[0], bytes[1]]) as u32,
        }
    }

    /// Store a packed value at (x, y); the caller guarantees bounds
    #[inline]
    pub fn write_raw(&mut self, x: u32, y: u32, raw: u32) {
        let bpp = self.format.bytes_per_pixel();
        let offset = (y as usize * self.width as usize + x as usize) * bpp;
        match bpp {
            4 => self.pixels[offset..offset + 4].copy_from_slice(&raw.to_le_bytes()),
            _ => self.pixels[offset..offset + 2].copy_from_slice(&(raw as u16).to_le_bytes()),
        }
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> Option<Color> {
        (x < self.width && y < self.height).then(|| self.format.unpack(self.read_raw(x, y)))
    }

    /// Write one pixel; out-of-bounds writes are ignored
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Color) {
        if x < self.width && y < self.height {
            let raw = self.format.pack(color);
            self.write_raw(x, y, raw);
        }
    }

    pub fn fill(&mut self, color: Color) {
        let bounds = self.bounds();
        self.fill_rect(&bounds, color);
    }

    /// Fill the part of `rect` inside the surface
    pub fn fill_rect(&mut self, rect: &Rect, color: Color) {
        let Some(clipped) = rect.intersect(&self.bounds()) else {
            return;
        };
        let raw = self.format.pack(color);
        for y in clipped.y..clipped.bottom() {
            for x in clipped.x..clipped.right() {
                self.write_raw(x as u32, y as u32, raw);
            }
        }
    }

    /// Copy `src` over this whole surface, nearest-sampled and format-converted
    pub fn blit_scaled(&mut self, src: &Surface) {
        for y in 0..self.height {
            let sy = (y as u64 * src.height as u64 / self.height as u64) as u32;
            for x in 0..self.width {
                let sx = (x as u64 * src.width as u64 / self.width as u64) as u32;
                let color = src.format.unpack(src.read_raw(sx, sy));
                let raw = self.format.pack(color);
                self.write_raw(x, y, raw);
            }
        }
    }
}

#[cfg(test)]
#[path = "surface_tests.rs"]
mod tests;
