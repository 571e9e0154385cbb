//! Textures and the render target (color + depth buffers)

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::types::Color;
use crate::error::{Error, Result};

/// Layout of one texel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextureFormat {
    /// Three channels, red-green-blue
    Rgb,
    /// One channel
    Depth,
}

impl TextureFormat {
    pub const fn components(self) -> usize {
        match self {
            TextureFormat::Rgb => 3,
            TextureFormat::Depth => 1,
        }
    }
}

/// Flat row-major image
#[derive(Debug, Clone)]
pub struct Texture<T> {
    pub width: usize,
    pub height: usize,
    pub format: TextureFormat,
    pub data: Vec<T>,
}

impl<T: Copy> Texture<T> {
    pub fn new(width: usize, height: usize, format: TextureFormat, fill: T) -> Self {
        Self {
            width,
            height,
            format,
            data: vec![fill; width * height * format.components()],
        }
    }

    /// Index of the first component of texel (x, y)
    fn offset(&self, x: usize, y: usize) -> Result<usize> {
        if x < self.width && y < self.height {
            Ok((y * self.width + x) * self.format.components())
        } else {
            Err(Error::IndexOutOfRange {
                x,
                y,
                width: self.width,
                height: self.height,
            })
        }
    }

    /// Components of texel (x, y)
    pub fn texel(&self, x: usize, y: usize) -> Result<&[T]> {
        let i = self.offset(x, y)?;
        Ok(&self.data[i..i + self.format.components()])
    }

    pub fn texel_mut(&mut self, x: usize, y: usize) -> Result<&mut [T]> {
        let i = self.offset(x, y)?;
        let n = self.format.components();
        Ok(&mut self.data[i..i + n])
    }
}

/// Storage precision of a color channel
pub trait Channel: Copy + Default {
    fn from_unit(v: f64) -> Self;
    fn to_unit(self) -> f64;
}

/// 0-255, clamped and rounded
impl Channel for u8 {
    fn from_unit(v: f64) -> Self {
        (v.clamp(0.0, 1.0) * 255.0).round() as u8
    }
    fn to_unit(self) -> f64 {
        self as f64 / 255.0
    }
}

/// Unclamped, keeps HDR values
impl Channel for f32 {
    fn from_unit(v: f64) -> Self {
        v as f32
    }
    fn to_unit(self) -> f64 {
        self as f64
    }
}

impl Channel for f64 {
    fn from_unit(v: f64) -> Self {
        v
    }
    fn to_unit(self) -> f64 {
        self
    }
}

/// Framebuffer for software rendering
///
/// The color buffer is row-major RGB (`COMPONENTS` values per pixel, row 0
/// at the top). The depth buffer holds one `f64` per pixel; smaller is
/// nearer.
#[derive(Debug, Clone)]
pub struct RenderTarget<C: Channel = u8> {
    color: Texture<C>,
    depth: Texture<f64>,
}

impl<C: Channel> RenderTarget<C> {
    pub const COMPONENTS: usize = 3;
    /// Depth of an empty pixel; every finite depth is nearer
    pub const FAR_DEPTH: f64 = f64::INFINITY;

    /// Black color buffer, depth at `FAR_DEPTH`
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            color: Texture::new(width, height, TextureFormat::Rgb, C::from_unit(0.0)),
            depth: Texture::new(width, height, TextureFormat::Depth, Self::FAR_DEPTH),
        }
    }

    pub fn width(&self) -> usize {
        self.color.width
    }

    pub fn height(&self) -> usize {
        self.color.height
    }

    pub fn clear(&mut self, color: Color, depth: f64) {
        let texel = [C::from_unit(color.r), C::from_unit(color.g), C::from_unit(color.b)];
        for px in self.color.data.chunks_exact_mut(Self::COMPONENTS) {
            px.copy_from_slice(&texel);
        }
        self.depth.data.fill(depth);
    }

    /// Clear to `color` with every depth reset to `FAR_DEPTH`
    pub fn clear_color(&mut self, color: Color) {
        self.clear(color, Self::FAR_DEPTH);
    }

    pub fn get_pixel(&self, x: usize, y: usize) -> Result<Color> {
        let t = self.color.texel(x, y)?;
        Ok(Color::new(t[0].to_unit(), t[1].to_unit(), t[2].to_unit()))
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, color: Color) -> Result<()> {
        let t = self.color.texel_mut(x, y)?;
        t[0] = C::from_unit(color.r);
        t[1] = C::from_unit(color.g);
        t[2] = C::from_unit(color.b);
        Ok(())
    }

    pub fn get_depth(&self, x: usize, y: usize) -> Result<f64> {
        Ok(self.depth.texel(x, y)?[0])
    }

    pub fn set_depth(&mut self, x: usize, y: usize, depth: f64) -> Result<()> {
        self.depth.texel_mut(x, y)?[0] = depth;
        Ok(())
    }

    pub fn color_buffer(&self) -> &[C] {
        &self.color.data
    }

    pub fn depth_buffer(&self) -> &[f64] {
        &self.depth.data
    }

    pub fn color_texture(&self) -> &Texture<C> {
        &self.color
    }

    /// Opaque RGBA8 copy of the color buffer (display surfaces want this)
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.width() * self.height() * 4);
        for px in self.color.data.chunks_exact(Self::COMPONENTS) {
            let c = Color::new(px[0].to_unit(), px[1].to_unit(), px[2].to_unit());
            out.extend_from_slice(&c.to_bytes());
        }
        out
    }

    /// Encode the color buffer as a PNG file
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut rgb = Vec::with_capacity(self.width() * self.height() * 3);
        for px in self.color.data.chunks_exact(Self::COMPONENTS) {
            let c = Color::new(px[0].to_unit(), px[1].to_unit(), px[2].to_unit());
            rgb.extend_from_slice(&c.to_rgb8());
        }

        let path = path.as_ref();
        image::save_buffer(
            path,
            &rgb,
            self.width() as u32,
            self.height() as u32,
            image::ExtendedColorType::Rgb8,
        )?;
        log::info!("Wrote {}x{} frame to {}", self.width(), self.height(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_target_is_black_and_far() {
        let rt: RenderTarget = RenderTarget::new(4, 3);
        assert_eq!(rt.color_buffer().len(), 4 * 3 * 3);
        assert!(rt.color_buffer().iter().all(|&c| c == 0));
        assert!(rt.depth_buffer().iter().all(|&d| d == f64::INFINITY));
    }

    #[test]
    fn test_clear_sets_every_pixel() {
        let mut rt: RenderTarget<f64> = RenderTarget::new(2, 2);
        rt.clear(Color::new(0.25, 0.5, 1.0), 0.75);
        for y in 0..2 {
            for x in 0..2 {
                assert_eq!(rt.get_pixel(x, y).unwrap(), Color::new(0.25, 0.5, 1.0));
                assert_eq!(rt.get_depth(x, y).unwrap(), 0.75);
            }
        }
    }

    #[test]
    fn test_out_of_range_access() {
        let mut rt: RenderTarget = RenderTarget::new(2, 2);
        assert!(matches!(
            rt.set_pixel(2, 0, Color::WHITE),
            Err(Error::IndexOutOfRange { x: 2, y: 0, width: 2, height: 2 })
        ));
        assert!(rt.get_depth(0, 5).is_err());
        assert!(rt.set_depth(1, 1, 0.5).is_ok());
    }

    #[test]
    fn test_row_major_layout() {
        let mut rt: RenderTarget = RenderTarget::new(3, 2);
        rt.set_pixel(1, 1, Color::RED).unwrap();
        let i = (1 * 3 + 1) * 3;
        assert_eq!(&rt.color_buffer()[i..i + 3], &[255, 0, 0]);
        assert_eq!(&rt.to_rgba8()[(1 * 3 + 1) * 4..(1 * 3 + 1) * 4 + 4], &[255, 0, 0, 255]);
    }

    #[test]
    fn test_u8_channel_quantizes() {
        let mut rt: RenderTarget<u8> = RenderTarget::new(1, 1);
        rt.set_pixel(0, 0, Color::new(2.0, 0.5, -1.0)).unwrap();
        let c = rt.get_pixel(0, 0).unwrap();
        assert_eq!(c.r, 1.0);
        assert_eq!(c.b, 0.0);
        assert!((c.g - 128.0 / 255.0).abs() < 1e-12);
    }
}
