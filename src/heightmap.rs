pub mod io;

use crate::bmp::{Bmp, ColorMode};
use serde::{Deserialize, Serialize};

pub type HeightmapPrecision = f32;
pub type HeightmapData = Vec<Vec<HeightmapPrecision>>;

/// A grid of terrain heights in the range `0.0..=depth`, indexed as
/// `data[x][y]`.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Heightmap {
    pub data: HeightmapData,
    pub width: usize,
    pub height: usize,
    pub depth: HeightmapPrecision,
}

impl Heightmap {
    pub fn new(
        data: HeightmapData,
        width: usize,
        height: usize,
        depth: HeightmapPrecision,
    ) -> Heightmap {
        Heightmap {
            data,
            width,
            height,
            depth,
        }
    }

    /// Builds a heightmap from a bitmap. Color images are collapsed to a
    /// single channel first, averaging the channels as raw data rather
    /// than weighting them perceptually.
    pub fn from_bmp(bmp: &Bmp, depth: HeightmapPrecision) -> Heightmap {
        let mut bmp = bmp.clone();
        if bmp.color_mode() != ColorMode::Bw {
            bmp.convert_to(ColorMode::Bw, true);
        }

        let width = bmp.width();
        let height = bmp.height();
        let pixels = bmp.pixel_buffer();

        let mut data: HeightmapData = Vec::with_capacity(width);
        for x in 0..width {
            let mut column = Vec::with_capacity(height);
            for y in 0..height {
                let value = pixels[y * width + x] as HeightmapPrecision / 255.0 * depth;
                column.push(value);
            }
            data.push(column);
        }

        Heightmap::new(data, width, height, depth)
    }

    /// Quantizes the heightmap back into a black-and-white bitmap.
    pub fn to_bmp(&self) -> Bmp {
        let mut bmp = Bmp::with_size(self.width, self.height, ColorMode::Bw);
        for x in 0..self.width {
            for y in 0..self.height {
                let value = (self.data[x][y] / self.depth * 255.0).round() as u8;
                bmp.set_pixel(x, y, value, 0, 0, 0);
            }
        }
        bmp
    }

    /// Flat row-major byte view, used for image previews.
    pub fn to_u8(&self) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(self.width * self.height);

        for y in 0..self.height {
            for x in 0..self.width {
                let mut value = self.data[x][y];
                let u8_max: HeightmapPrecision = 255.0;
                value = value / (self.depth / u8_max);
                buffer.push(value.round() as u8);
            }
        }

        buffer
    }

    pub fn set(&mut self, x: usize, y: usize, z: HeightmapPrecision) {
        self.data[x][y] = z;
    }

    pub fn get(&self, x: usize, y: usize) -> HeightmapPrecision {
        self.data[x][y]
    }
}
