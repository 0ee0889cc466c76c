use std::{fs, fs::File, io::BufWriter, path::Path};

use depthcloud_image::{Image, ImageSize};
use png::{BitDepth, ColorType, Decoder, Encoder};

use crate::{
    conv_utils::{convert_buf_u16_u8, convert_buf_u8_u16},
    error::IoError,
};

/// Read a PNG image with three channels (rgb8).
///
/// # Arguments
///
/// * `file_path` - The path to the PNG file.
///
/// # Returns
///
/// A RGB image with three channels (rgb8).
pub fn read_image_png_rgb8(file_path: impl AsRef<Path>) -> Result<Image<u8, 3>, IoError> {
    let (buf, size) = read_png_impl(file_path, ColorType::Rgb, BitDepth::Eight, "rgb8")?;
    Ok(Image::new(size, buf)?)
}

/// Read a PNG image with a single 16-bit channel (mono16).
///
/// This is the usual container for depth maps where each sample is a distance
/// in millimeters.
///
/// # Arguments
///
/// * `file_path` - The path to the PNG file.
///
/// # Returns
///
/// A grayscale image with a single channel (mono16).
pub fn read_image_png_mono16(file_path: impl AsRef<Path>) -> Result<Image<u16, 1>, IoError> {
    let (buf, size) = read_png_impl(file_path, ColorType::Grayscale, BitDepth::Sixteen, "mono16")?;
    Ok(Image::new(size, convert_buf_u8_u16(buf))?)
}

// utility function to read the png file
fn read_png_impl(
    file_path: impl AsRef<Path>,
    color_type: ColorType,
    bit_depth: BitDepth,
    expected: &'static str,
) -> Result<(Vec<u8>, ImageSize), IoError> {
    // verify the file exists
    let file_path = file_path.as_ref();
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    // verify the file extension
    match file_path.extension() {
        Some(extension) if extension == "png" => {}
        _ => return Err(IoError::InvalidFileExtension(file_path.to_path_buf())),
    }

    let file = fs::File::open(file_path)?;
    let mut reader = Decoder::new(file)
        .read_info()
        .map_err(|e| IoError::PngDecodeError(e.to_string()))?;

    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e| IoError::PngDecodeError(e.to_string()))?;

    if info.color_type != color_type || info.bit_depth != bit_depth {
        return Err(IoError::UnsupportedPngFormat {
            color_type: format!("{:?}", info.color_type),
            bit_depth: info.bit_depth as u8,
            expected,
        });
    }

    buf.truncate(info.buffer_size());

    log::debug!(
        "decoded {} ({}x{} {})",
        file_path.display(),
        info.width,
        info.height,
        expected
    );

    Ok((
        buf,
        ImageSize {
            width: info.width as usize,
            height: info.height as usize,
        },
    ))
}

/// Writes the given PNG _(rgb8)_ data to the given file path.
///
/// # Arguments
///
/// - `file_path` - The path to the PNG image.
/// - `image` - The image containing the PNG image data.
pub fn write_image_png_rgb8(
    file_path: impl AsRef<Path>,
    image: &Image<u8, 3>,
) -> Result<(), IoError> {
    write_png_impl(
        file_path,
        image.as_slice(),
        image.size(),
        BitDepth::Eight,
        ColorType::Rgb,
    )
}

/// Writes the given PNG _(grayscale 16-bit)_ data to the given file path.
///
/// # Arguments
///
/// - `file_path` - The path to the PNG image.
/// - `image` - The image containing the PNG image data.
pub fn write_image_png_mono16(
    file_path: impl AsRef<Path>,
    image: &Image<u16, 1>,
) -> Result<(), IoError> {
    let image_buf = convert_buf_u16_u8(image.as_slice());

    write_png_impl(
        file_path,
        &image_buf,
        image.size(),
        BitDepth::Sixteen,
        ColorType::Grayscale,
    )
}

fn write_png_impl(
    file_path: impl AsRef<Path>,
    image_data: &[u8],
    image_size: ImageSize,
    depth: BitDepth,
    color_type: ColorType,
) -> Result<(), IoError> {
    let file = File::create(file_path)?;

    let mut encoder = Encoder::new(
        BufWriter::new(file),
        image_size.width as u32,
        image_size.height as u32,
    );
    encoder.set_color(color_type);
    encoder.set_depth(depth);

    let mut writer = encoder
        .write_header()
        .map_err(|e| IoError::PngEncodingError(e.to_string()))?;
    writer
        .write_image_data(image_data)
        .map_err(|e| IoError::PngEncodingError(e.to_string()))?;
    writer
        .finish()
        .map_err(|e| IoError::PngEncodingError(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_write_png_rgb8() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("color.png");

        let image = Image::<u8, 3>::new([2, 2].into(), (0..12).collect())?;
        write_image_png_rgb8(&file_path, &image)?;

        let image_back = read_image_png_rgb8(&file_path)?;
        assert_eq!(image_back.size(), image.size());
        assert_eq!(image_back.as_slice(), image.as_slice());

        Ok(())
    }

    #[test]
    fn read_write_png_mono16() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("depth.png");

        let image = Image::<u16, 1>::new([3, 1].into(), vec![0, 1000, 65535])?;
        write_image_png_mono16(&file_path, &image)?;

        let image_back = read_image_png_mono16(&file_path)?;
        assert_eq!(image_back.size(), image.size());
        assert_eq!(image_back.as_slice(), &[0, 1000, 65535]);

        Ok(())
    }

    #[test]
    fn read_png_wrong_layout() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("color.png");

        let image = Image::<u8, 3>::from_size_val([2, 2].into(), 7)?;
        write_image_png_rgb8(&file_path, &image)?;

        let res = read_image_png_mono16(&file_path);
        assert!(matches!(res, Err(IoError::UnsupportedPngFormat { .. })));

        Ok(())
    }

    #[test]
    fn read_png_missing_or_bad_extension() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;

        let missing = tmp_dir.path().join("missing.png");
        assert!(matches!(
            read_image_png_rgb8(&missing),
            Err(IoError::FileDoesNotExist(_))
        ));

        let not_png = tmp_dir.path().join("color.jpg");
        std::fs::write(&not_png, b"not an image")?;
        assert!(matches!(
            read_image_png_rgb8(&not_png),
            Err(IoError::InvalidFileExtension(_))
        ));

        Ok(())
    }
}
