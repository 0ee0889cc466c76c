use std::path::{Path, PathBuf};

use depthcloud_image::{ops::bgr_from_rgb, Image};

use crate::{
    error::IoError,
    png::{read_image_png_mono16, read_image_png_rgb8},
};

/// A single RGB-D capture.
#[derive(Debug, Clone)]
pub struct RgbdFrame {
    /// Depth map with one sample per pixel, in millimeters.
    pub depth: Image<u16, 1>,
    /// Color image in BGR channel order, if the source has one.
    pub color: Option<Image<u8, 3>>,
    /// Optional per-pixel unit normals in camera space.
    pub normals: Option<Image<f32, 3>>,
}

/// A source of RGB-D frames.
///
/// Implementations may block while waiting on the device or the file system.
pub trait FrameSource {
    /// Acquire the next frame.
    fn grab(&mut self) -> Result<RgbdFrame, IoError>;
}

/// A frame source backed by PNG files on disk.
///
/// The depth map is read from a 16-bit grayscale PNG and the color image from an
/// 8-bit RGB PNG, reordered to BGR as a live sensor pipeline would deliver it.
///
/// Example:
///
/// ```no_run
/// use depthcloud_io::frame::{FileFrameSource, FrameSource};
///
/// let mut source = FileFrameSource::new("depth.png").with_color("color.png");
/// let frame = source.grab().unwrap();
/// assert!(frame.color.is_some());
/// ```
#[derive(Debug, Clone)]
pub struct FileFrameSource {
    depth_path: PathBuf,
    color_path: Option<PathBuf>,
}

impl FileFrameSource {
    /// Create a source reading the depth map from `depth_path`.
    pub fn new(depth_path: impl AsRef<Path>) -> Self {
        Self {
            depth_path: depth_path.as_ref().to_path_buf(),
            color_path: None,
        }
    }

    /// Read the color image from `color_path`.
    pub fn with_color(mut self, color_path: impl AsRef<Path>) -> Self {
        self.color_path = Some(color_path.as_ref().to_path_buf());
        self
    }
}

impl FrameSource for FileFrameSource {
    fn grab(&mut self) -> Result<RgbdFrame, IoError> {
        let depth = read_image_png_mono16(&self.depth_path)?;

        let color = match &self.color_path {
            Some(color_path) => {
                let rgb = read_image_png_rgb8(color_path)?;
                let mut bgr = Image::from_size_val(rgb.size(), 0u8)?;
                bgr_from_rgb(&rgb, &mut bgr)?;
                Some(bgr)
            }
            None => {
                log::warn!("no color image for {}", self.depth_path.display());
                None
            }
        };

        Ok(RgbdFrame {
            depth,
            color,
            normals: None,
        })
    }
}
