pub mod io;

/// Color layout of the pixel buffer.
///
/// `Bw` is a special case: the BMP format has no real single-channel mode,
/// so a black-and-white image keeps one byte per pixel in memory but is
/// written as three identical bytes per pixel on disk.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ColorMode {
    Bw,
    Rgb,
    Rgba,
}

impl ColorMode {
    /// Bytes per pixel in the on-disk scanline.
    pub fn file_channels(&self) -> usize {
        match self {
            ColorMode::Bw => 3,
            ColorMode::Rgb => 3,
            ColorMode::Rgba => 4,
        }
    }

    /// Bytes per pixel in the in-memory buffer.
    pub fn buffer_channels(&self) -> usize {
        match self {
            ColorMode::Bw => 1,
            ColorMode::Rgb => 3,
            ColorMode::Rgba => 4,
        }
    }

    pub fn bit_depth(&self) -> u16 {
        (self.file_channels() * 8) as u16
    }
}

/// An uncompressed Windows bitmap.
///
/// The pixel buffer is row-major, top-to-bottom, left-to-right, with no
/// scanline padding (padding exists only in the file). It is absent until
/// the image is sized with [`Bmp::reinitialize`] or filled by
/// [`io::read`].
#[derive(Debug, PartialEq, Clone)]
pub struct Bmp {
    width: usize,
    height: usize,
    color_mode: ColorMode,
    pixels: Option<Vec<u8>>,
}

impl Bmp {
    /// An uninitialized image with zero dimensions and no buffer.
    pub fn new() -> Bmp {
        Bmp {
            width: 0,
            height: 0,
            color_mode: ColorMode::Bw,
            pixels: None,
        }
    }

    pub fn with_size(width: usize, height: usize, color_mode: ColorMode) -> Bmp {
        let mut bmp = Bmp::new();
        bmp.reinitialize(width, height, color_mode);
        bmp
    }

    /// Allocates a fresh zero-filled pixel buffer for the given geometry,
    /// discarding any previous buffer.
    ///
    /// Panics on zero width or height.
    pub fn reinitialize(&mut self, width: usize, height: usize, color_mode: ColorMode) {
        if width == 0 || height == 0 {
            panic!("Bad image dimensions: {}x{}!", width, height);
        }

        self.width = width;
        self.height = height;
        self.color_mode = color_mode;
        self.pixels = Some(vec![0; width * height * color_mode.buffer_channels()]);
    }

    pub fn is_initialized(&self) -> bool {
        self.pixels.is_some()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn color_mode(&self) -> ColorMode {
        self.color_mode
    }

    /// Size of the pixel buffer in bytes, 0 while uninitialized.
    pub fn size(&self) -> usize {
        self.pixels.as_ref().map_or(0, Vec::len)
    }

    pub fn pixel_buffer(&self) -> &[u8] {
        self.pixels.as_deref().expect("Image not initialized!")
    }

    pub fn pixel_buffer_mut(&mut self) -> &mut [u8] {
        self.pixels.as_deref_mut().expect("Image not initialized!")
    }

    /// Buffer offset of pixel (x, y).
    ///
    /// Panics when the coordinates are outside the image.
    pub fn pixel_index(&self, x: usize, y: usize) -> usize {
        if x >= self.width || y >= self.height {
            panic!(
                "Pixel coordinates ({}, {}) out of range for {}x{} image!",
                x, y, self.width, self.height
            );
        }

        self.color_mode.buffer_channels() * (y * self.width + x)
    }

    /// The channel bytes of pixel (x, y): one for `Bw`, three for `Rgb`,
    /// four for `Rgba`.
    pub fn pixel(&self, x: usize, y: usize) -> &[u8] {
        let idx = self.pixel_index(x, y);
        &self.pixel_buffer()[idx..idx + self.color_mode.buffer_channels()]
    }

    /// Sets a pixel. Only the channels of the current color mode are
    /// written: `Bw` uses `r` alone, `Rgb` ignores `a`.
    pub fn set_pixel(&mut self, x: usize, y: usize, r: u8, g: u8, b: u8, a: u8) {
        let idx = self.pixel_index(x, y);
        let color_mode = self.color_mode;
        let pixels = self.pixel_buffer_mut();

        match color_mode {
            ColorMode::Bw => {
                pixels[idx] = r;
            }
            ColorMode::Rgb => {
                pixels[idx] = r;
                pixels[idx + 1] = g;
                pixels[idx + 2] = b;
            }
            ColorMode::Rgba => {
                pixels[idx] = r;
                pixels[idx + 1] = g;
                pixels[idx + 2] = b;
                pixels[idx + 3] = a;
            }
        }
    }

    /// Converts the pixel buffer to another color mode, reallocating it
    /// with the new channel count. Converting to the current mode is a
    /// no-op.
    ///
    /// Collapsing color to `Bw` uses the luma weights 0.3/0.59/0.11 unless
    /// `is_non_color_data` is set, in which case the channels hold raw
    /// values (e.g. heights) and a plain average is taken instead. Both
    /// truncate. The alpha channel never survives the trip to `Bw`.
    pub fn convert_to(&mut self, target: ColorMode, is_non_color_data: bool) {
        let old = self.pixels.take().expect("Image not initialized!");
        let num_px = self.width * self.height;

        match (self.color_mode, target) {
            (from, to) if from == to => {
                self.pixels = Some(old);
            }
            (ColorMode::Bw, ColorMode::Rgb) => {
                self.reinitialize(self.width, self.height, ColorMode::Rgb);
                let pixels = self.pixel_buffer_mut();
                for i in 0..num_px {
                    pixels[i * 3] = old[i];
                    pixels[i * 3 + 1] = old[i];
                    pixels[i * 3 + 2] = old[i];
                }
            }
            (ColorMode::Bw, ColorMode::Rgba) => {
                self.reinitialize(self.width, self.height, ColorMode::Rgba);
                let pixels = self.pixel_buffer_mut();
                for i in 0..num_px {
                    pixels[i * 4] = old[i];
                    pixels[i * 4 + 1] = old[i];
                    pixels[i * 4 + 2] = old[i];
                    pixels[i * 4 + 3] = 0xFF;
                }
            }
            (ColorMode::Rgb, ColorMode::Rgba) => {
                self.reinitialize(self.width, self.height, ColorMode::Rgba);
                let pixels = self.pixel_buffer_mut();
                for i in 0..num_px {
                    pixels[i * 4] = old[i * 3];
                    pixels[i * 4 + 1] = old[i * 3 + 1];
                    pixels[i * 4 + 2] = old[i * 3 + 2];
                    pixels[i * 4 + 3] = 0xFF;
                }
            }
            (ColorMode::Rgba, ColorMode::Rgb) => {
                self.reinitialize(self.width, self.height, ColorMode::Rgb);
                let pixels = self.pixel_buffer_mut();
                for i in 0..num_px {
                    pixels[i * 3] = old[i * 4];
                    pixels[i * 3 + 1] = old[i * 4 + 1];
                    pixels[i * 3 + 2] = old[i * 4 + 2];
                }
            }
            (from @ (ColorMode::Rgb | ColorMode::Rgba), ColorMode::Bw) => {
                let channels = from.buffer_channels();
                self.reinitialize(self.width, self.height, ColorMode::Bw);
                let pixels = self.pixel_buffer_mut();
                for i in 0..num_px {
                    let px = &old[i * channels..i * channels + channels];
                    pixels[i] = grayscale(px[0], px[1], px[2], is_non_color_data);
                }
            }
            // Unreachable: every distinct pair is covered above.
            (from, to) => panic!("Unsupported conversion {:?} -> {:?}!", from, to),
        }
    }
}

impl Default for Bmp {
    fn default() -> Self {
        Bmp::new()
    }
}

fn grayscale(r: u8, g: u8, b: u8, is_non_color_data: bool) -> u8 {
    if is_non_color_data {
        // Truncating average, not a rounded one.
        ((r as u16 + g as u16 + b as u16) as f64 * 0.33333333) as u8
    } else {
        (r as f64 * 0.3 + g as f64 * 0.59 + b as f64 * 0.11) as u8
    }
}
