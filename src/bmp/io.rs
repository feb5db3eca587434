use crate::bmp::{Bmp, ColorMode};
use log::debug;
use std::fs::{self, File};
use std::io::{self, BufReader, Read, Seek, SeekFrom};

const SIGNATURE: u16 = 0x4D42; // "BM"
const PIXEL_ARRAY_OFFSET: u32 = 0x36;
const INFO_HEADER_SIZE: u32 = 0x28;
const PRINT_RESOLUTION: u32 = 0xB13; // pixels/meter, both axes
const PADDING_FILLER: [u8; 4] = [0x69; 4];

#[derive(Debug)]
pub enum BmpIoError {
    NotInitialized,
    BadSignature(u16),
    UnsupportedBitDepth(u16),
    BadDimensions(u32, u32),
    Io(io::Error),
}

impl From<io::Error> for BmpIoError {
    fn from(err: io::Error) -> Self {
        BmpIoError::Io(err)
    }
}

fn put_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn put_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn read_u16(reader: &mut impl Read) -> io::Result<u16> {
    let mut buf = [0; 2];
    reader.read_exact(&mut buf)?;
    Ok(u16::from_le_bytes(buf))
}

fn read_u32(reader: &mut impl Read) -> io::Result<u32> {
    let mut buf = [0; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

/// Number of filler bytes after each on-disk scanline. Rows are aligned
/// to 4 bytes, so 4-channel scanlines never get any.
pub fn padding_size(width: usize, color_mode: ColorMode) -> usize {
    (4 - (width * color_mode.file_channels()) % 4) % 4
}

/// Serializes the image as an uncompressed BMP file.
pub fn write(bmp: &Bmp, path: &str) -> Result<(), BmpIoError> {
    if !bmp.is_initialized() {
        return Err(BmpIoError::NotInitialized);
    }

    let width = bmp.width();
    let height = bmp.height();
    let color_mode = bmp.color_mode();
    let padding = padding_size(width, color_mode);
    let raw_size = (width * color_mode.file_channels() + padding) * height;

    let mut data = Vec::with_capacity(PIXEL_ARRAY_OFFSET as usize + raw_size);

    // File header
    put_u16(&mut data, SIGNATURE);
    put_u32(&mut data, PIXEL_ARRAY_OFFSET + raw_size as u32);
    put_u16(&mut data, 0); // reserved
    put_u16(&mut data, 0); // reserved
    put_u32(&mut data, PIXEL_ARRAY_OFFSET);

    // Info header
    put_u32(&mut data, INFO_HEADER_SIZE);
    put_u32(&mut data, width as u32);
    put_u32(&mut data, height as u32);
    put_u16(&mut data, 1); // planes
    put_u16(&mut data, color_mode.bit_depth());
    put_u32(&mut data, 0); // no compression
    put_u32(&mut data, raw_size as u32);
    put_u32(&mut data, PRINT_RESOLUTION);
    put_u32(&mut data, PRINT_RESOLUTION);
    put_u32(&mut data, 0); // palette size
    put_u32(&mut data, 0); // all colors important

    // Scanlines are stored bottom-to-top, channels swizzled to B-G-R[-A].
    let pixels = bmp.pixel_buffer();
    for y in (0..height).rev() {
        for x in 0..width {
            let idx = bmp.pixel_index(x, y);
            match color_mode {
                ColorMode::Bw => {
                    data.push(pixels[idx]);
                    data.push(pixels[idx]);
                    data.push(pixels[idx]);
                }
                ColorMode::Rgb => {
                    data.push(pixels[idx + 2]);
                    data.push(pixels[idx + 1]);
                    data.push(pixels[idx]);
                }
                ColorMode::Rgba => {
                    data.push(pixels[idx + 2]);
                    data.push(pixels[idx + 1]);
                    data.push(pixels[idx]);
                    data.push(pixels[idx + 3]);
                }
            }
        }
        if padding > 0 {
            data.extend_from_slice(&PADDING_FILLER[..padding]);
        }
    }

    fs::write(path, &data)?;
    debug!("wrote {} ({} bytes)", path, data.len());
    Ok(())
}

/// Reads an uncompressed 24- or 32-bit BMP file into a fresh image.
pub fn read(path: &str) -> Result<Bmp, BmpIoError> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let signature = read_u16(&mut reader)?;
    if signature != SIGNATURE {
        return Err(BmpIoError::BadSignature(signature));
    }

    let _file_size = read_u32(&mut reader)?;
    let _reserved = read_u32(&mut reader)?;
    let pixel_array_offset = read_u32(&mut reader)?;

    let _info_header_size = read_u32(&mut reader)?;
    let width = read_u32(&mut reader)?;
    let height = read_u32(&mut reader)?;
    let _planes = read_u16(&mut reader)?;

    // A black-and-white image round-trips as 24-bit gray; there is no
    // single-channel mode to map back to.
    let bit_depth = read_u16(&mut reader)?;
    let color_mode = match bit_depth {
        24 => ColorMode::Rgb,
        32 => ColorMode::Rgba,
        other => return Err(BmpIoError::UnsupportedBitDepth(other)),
    };

    let _compression = read_u32(&mut reader)?;
    let _raw_size = read_u32(&mut reader)?;
    let _print_resolution_x = read_u32(&mut reader)?;
    let _print_resolution_y = read_u32(&mut reader)?;
    let _palette_size = read_u32(&mut reader)?;
    let _important_colors = read_u32(&mut reader)?;

    if width == 0 || height == 0 {
        return Err(BmpIoError::BadDimensions(width, height));
    }

    reader.seek(SeekFrom::Start(pixel_array_offset as u64))?;

    let width = width as usize;
    let height = height as usize;
    let mut bmp = Bmp::with_size(width, height, color_mode);
    let channels = color_mode.buffer_channels();
    let padding = padding_size(width, color_mode);
    let mut skipped = [0; 4];

    for y in (0..height).rev() {
        for x in 0..width {
            let idx = bmp.pixel_index(x, y);
            let mut chunk = [0; 4];
            reader.read_exact(&mut chunk[..channels])?;

            // File order is B-G-R[-A].
            let pixels = bmp.pixel_buffer_mut();
            pixels[idx] = chunk[2];
            pixels[idx + 1] = chunk[1];
            pixels[idx + 2] = chunk[0];
            if channels == 4 {
                pixels[idx + 3] = chunk[3];
            }
        }
        if padding > 0 {
            reader.read_exact(&mut skipped[..padding])?;
        }
    }

    debug!(
        "read {} ({}x{}, {:?})",
        path,
        bmp.width(),
        bmp.height(),
        bmp.color_mode()
    );
    Ok(bmp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> String {
        let mut path: PathBuf = std::env::temp_dir();
        path.push(format!("terrain_bmp_test_{}_{}", std::process::id(), name));
        path.to_str().unwrap().to_string()
    }

    fn random_image(width: usize, height: usize, color_mode: ColorMode) -> Bmp {
        let mut rng = rand::thread_rng();
        let mut bmp = Bmp::with_size(width, height, color_mode);
        for byte in bmp.pixel_buffer_mut() {
            *byte = rng.gen();
        }
        bmp
    }

    #[test]
    fn test_padding_size() {
        assert_eq!(padding_size(5, ColorMode::Rgb), 1); // 15 bytes -> pad 1
        assert_eq!(padding_size(4, ColorMode::Rgb), 0);
        assert_eq!(padding_size(5, ColorMode::Bw), 1);
        assert_eq!(padding_size(5, ColorMode::Rgba), 0);
        assert_eq!(padding_size(333, ColorMode::Rgba), 0);
    }

    #[test]
    fn test_write_not_initialized() {
        let path = temp_path("uninit.bmp");
        let result = write(&Bmp::new(), &path);
        assert!(matches!(result, Err(BmpIoError::NotInitialized)));
    }

    #[test]
    fn test_read_missing_file() {
        let result = read("/nonexistent/terrain.bmp");
        assert!(matches!(result, Err(BmpIoError::Io(_))));
    }

    #[test]
    fn test_read_bad_signature() {
        let path = temp_path("bad_signature.bmp");
        fs::write(&path, b"PNG junk, certainly not a bitmap").unwrap();
        let result = read(&path);
        fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(BmpIoError::BadSignature(_))));
    }

    #[test]
    fn test_read_unsupported_bit_depth() {
        // Valid headers except for a 16-bit depth field.
        let bmp = Bmp::with_size(2, 2, ColorMode::Rgb);
        let path = temp_path("depth16.bmp");
        write(&bmp, &path).unwrap();
        let mut data = fs::read(&path).unwrap();
        data[28] = 16;
        fs::write(&path, &data).unwrap();
        let result = read(&path);
        fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(BmpIoError::UnsupportedBitDepth(16))));
    }

    #[test]
    fn test_header_layout() {
        let mut bmp = Bmp::with_size(5, 3, ColorMode::Rgb);
        bmp.set_pixel(0, 2, 10, 20, 30, 0); // bottom-left in file order
        let path = temp_path("header.bmp");
        write(&bmp, &path).unwrap();
        let data = fs::read(&path).unwrap();
        fs::remove_file(&path).unwrap();

        let raw_size = (5 * 3 + 1) * 3; // one padding byte per row
        assert_eq!(data.len(), 0x36 + raw_size);
        assert_eq!(&data[0..2], b"BM");
        assert_eq!(u32::from_le_bytes(data[2..6].try_into().unwrap()), data.len() as u32);
        assert_eq!(u32::from_le_bytes(data[10..14].try_into().unwrap()), 0x36);
        assert_eq!(u32::from_le_bytes(data[14..18].try_into().unwrap()), 0x28);
        assert_eq!(u32::from_le_bytes(data[18..22].try_into().unwrap()), 5);
        assert_eq!(u32::from_le_bytes(data[22..26].try_into().unwrap()), 3);
        assert_eq!(u16::from_le_bytes(data[26..28].try_into().unwrap()), 1);
        assert_eq!(u16::from_le_bytes(data[28..30].try_into().unwrap()), 24);
        assert_eq!(u32::from_le_bytes(data[34..38].try_into().unwrap()), raw_size as u32);
        assert_eq!(u32::from_le_bytes(data[38..42].try_into().unwrap()), 0xB13);

        // First stored row is the image's last, in B-G-R order.
        assert_eq!(&data[0x36..0x36 + 3], &[30, 20, 10]);
    }

    #[test]
    fn test_round_trip_rgb() {
        // Width 5 forces scanline padding.
        let bmp = random_image(5, 7, ColorMode::Rgb);
        let path = temp_path("round_trip_rgb.bmp");
        write(&bmp, &path).unwrap();
        let read_back = read(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(read_back, bmp);
    }

    #[test]
    fn test_round_trip_rgba() {
        let bmp = random_image(6, 4, ColorMode::Rgba);
        let path = temp_path("round_trip_rgba.bmp");
        write(&bmp, &path).unwrap();
        let read_back = read(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(read_back, bmp);
    }

    #[test]
    fn test_bw_comes_back_as_gray_rgb() {
        let mut bmp = Bmp::with_size(3, 1, ColorMode::Bw);
        bmp.set_pixel(0, 0, 0, 0, 0, 0);
        bmp.set_pixel(1, 0, 128, 0, 0, 0);
        bmp.set_pixel(2, 0, 255, 0, 0, 0);
        let path = temp_path("bw.bmp");
        write(&bmp, &path).unwrap();
        let read_back = read(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(read_back.color_mode(), ColorMode::Rgb);
        assert_eq!(read_back.pixel(1, 0), &[128, 128, 128]);
        assert_eq!(read_back.pixel(2, 0), &[255, 255, 255]);
    }
}
