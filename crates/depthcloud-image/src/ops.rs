use crate::{Image, ImageError};

/// Convert an RGB image to BGR by swapping the red and blue channels.
///
/// # Arguments
///
/// * `src` - The input RGB image.
/// * `dst` - The output BGR image.
///
/// Precondition: the input and output images must have the same size.
///
/// Example:
///
/// ```
/// use depthcloud_image::{Image, ImageSize};
/// use depthcloud_image::ops::bgr_from_rgb;
///
/// let size = ImageSize { width: 1, height: 1 };
/// let rgb = Image::<u8, 3>::new(size, vec![10, 20, 30]).unwrap();
/// let mut bgr = Image::<u8, 3>::from_size_val(size, 0).unwrap();
///
/// bgr_from_rgb(&rgb, &mut bgr).unwrap();
/// assert_eq!(bgr.as_slice(), &[30, 20, 10]);
/// ```
pub fn bgr_from_rgb<T>(src: &Image<T, 3>, dst: &mut Image<T, 3>) -> Result<(), ImageError>
where
    T: Copy,
{
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    dst.pixels_mut()
        .zip(src.pixels())
        .for_each(|(dst_pixel, src_pixel)| {
            dst_pixel
                .iter_mut()
                .zip(src_pixel.iter().rev())
                .for_each(|(d, s)| *d = *s);
        });

    Ok(())
}

/// Normalize a single channel image to the range [0, 1] using its min and max values.
///
/// A constant image maps to zero everywhere.
pub fn normalize_min_max<T>(src: &Image<T, 1>) -> Result<Image<f32, 1>, ImageError>
where
    T: Copy + num_traits::NumCast,
{
    let src = src.cast::<f32>()?;

    let (min, max) = src
        .as_slice()
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });

    let range = max - min;

    let data = src
        .as_slice()
        .iter()
        .map(|&v| {
            if range > f32::EPSILON {
                (v - min) / range
            } else {
                0.0
            }
        })
        .collect();

    Image::new(src.size(), data)
}

// piecewise linear approximation of the jet colormap for a value in [0, 1]
fn jet(value: f32) -> [u8; 3] {
    let channel = |offset: f32| -> u8 {
        let c = (1.5 - (4.0 * value - offset).abs()).clamp(0.0, 1.0);
        (c * 255.0) as u8
    };
    [channel(3.0), channel(2.0), channel(1.0)]
}

/// Colorize a depth map with the jet colormap for visual inspection.
///
/// The depth is min-max normalized, quantized to 8 bits and mapped through the
/// jet colormap: the nearest values become dark blue and the farthest dark red.
///
/// # Arguments
///
/// * `depth` - The depth map.
///
/// # Returns
///
/// An RGB image of the same size as the depth map.
pub fn colorize_depth<T>(depth: &Image<T, 1>) -> Result<Image<u8, 3>, ImageError>
where
    T: Copy + num_traits::NumCast,
{
    let normalized = normalize_min_max(depth)?;

    let data = normalized
        .as_slice()
        .iter()
        .flat_map(|&v| {
            // quantize first so the colors match an 8-bit lookup table
            let gray = (v * 255.0) as u8;
            jet(gray as f32 / 255.0)
        })
        .collect();

    Image::new(depth.size(), data)
}
