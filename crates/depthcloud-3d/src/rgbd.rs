use depthcloud_image::{Image, ImageError, ImageSize};
use glam::DVec3;

use crate::{
    camera::CameraIntrinsics,
    pointcloud::{PointCloud, PointCloudError},
};

/// Error types for the RGB-D module.
#[derive(Debug, thiserror::Error)]
pub enum RgbdError {
    /// A color or normal map is not aligned with the depth map.
    #[error("The {what} size {got} does not match the depth size {expected}")]
    ShapeMismatch {
        /// Which input is misaligned.
        what: &'static str,
        /// Size of the depth map.
        expected: ImageSize,
        /// Size of the misaligned input.
        got: ImageSize,
    },

    /// A focal length is zero.
    #[error("Invalid focal length fx={fx} fy={fy}")]
    InvalidFocalLength {
        /// Focal length along x.
        fx: f64,
        /// Focal length along y.
        fy: f64,
    },

    /// Failed to assemble the point cloud.
    #[error(transparent)]
    PointCloud(#[from] PointCloudError),

    /// Failed to create an image.
    #[error(transparent)]
    Image(#[from] ImageError),
}

fn check_size(what: &'static str, expected: ImageSize, got: ImageSize) -> Result<(), RgbdError> {
    if expected != got {
        return Err(RgbdError::ShapeMismatch {
            what,
            expected,
            got,
        });
    }
    Ok(())
}

fn check_focal_length(intrinsics: &CameraIntrinsics) -> Result<(), RgbdError> {
    if intrinsics.fx == 0.0 || intrinsics.fy == 0.0 {
        return Err(RgbdError::InvalidFocalLength {
            fx: intrinsics.fx,
            fy: intrinsics.fy,
        });
    }
    Ok(())
}

#[inline]
fn back_project(intrinsics: &CameraIntrinsics, u: usize, v: usize, depth: f64) -> [f64; 3] {
    [
        (u as f64 - intrinsics.cx) / intrinsics.fx * depth,
        (v as f64 - intrinsics.cy) / intrinsics.fy * depth,
        depth,
    ]
}

#[inline]
fn nan_to_zero(v: f32) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v as f64
    }
}

/// Back-project a depth map into a point cloud in the camera frame.
///
/// Every pixel produces exactly one point, in row-major order, so the point cloud
/// holds `height * width` points. A pixel at row `v`, column `u` with depth `d`
/// becomes `((u - cx) / fx * d, (v - cy) / fy * d, d)`, in the depth units.
///
/// The color image is taken in the channel order delivered by the sensor
/// pipeline (BGR): channel 2 becomes the first color field, channel 1 the second
/// and channel 0 the third. Normal components that are NaN are set to zero.
///
/// The schema of the result is decided by which of `color` and `normals` are given.
///
/// # Arguments
///
/// * `intrinsics` - The camera intrinsics.
/// * `depth` - The depth map.
/// * `color` - Optional color image aligned with the depth map.
/// * `normals` - Optional normal map aligned with the depth map.
///
/// # Errors
///
/// Fails before producing any point if `color` or `normals` are not the size of
/// `depth`, or if a focal length is zero.
///
/// Example:
///
/// ```
/// use depthcloud_3d::camera::CameraIntrinsics;
/// use depthcloud_3d::rgbd::rgbd_to_pointcloud;
/// use depthcloud_image::{Image, ImageSize};
///
/// let intrinsics = CameraIntrinsics::new(400.0, 400.0, 320.0, 240.0, 640.0, 480.0).unwrap();
/// let depth = Image::<u16, 1>::from_size_val(ImageSize { width: 2, height: 2 }, 1000).unwrap();
///
/// let pointcloud = rgbd_to_pointcloud(&intrinsics, &depth, None, None).unwrap();
/// assert_eq!(pointcloud.len(), 4);
/// assert_eq!(pointcloud.points()[0], [-800.0, -600.0, 1000.0]);
/// ```
pub fn rgbd_to_pointcloud<D>(
    intrinsics: &CameraIntrinsics,
    depth: &Image<D, 1>,
    color: Option<&Image<u8, 3>>,
    normals: Option<&Image<f32, 3>>,
) -> Result<PointCloud, RgbdError>
where
    D: Copy + Into<f64>,
{
    check_focal_length(intrinsics)?;
    if let Some(color) = color {
        check_size("color", depth.size(), color.size())?;
    }
    if let Some(normals) = normals {
        check_size("normals", depth.size(), normals.size())?;
    }

    let (width, height) = (depth.width(), depth.height());
    let depth_data = depth.as_slice();

    let mut points = Vec::with_capacity(width * height);
    for v in 0..height {
        for u in 0..width {
            let d: f64 = depth_data[v * width + u].into();
            points.push(back_project(intrinsics, u, v, d));
        }
    }

    // NOTE: the sensor order is bgr, the fields are written as red, green, blue
    let colors = color.map(|color| {
        color
            .pixels()
            .map(|px| [px[2], px[1], px[0]])
            .collect::<Vec<_>>()
    });

    let normals = normals.map(|normals| {
        normals
            .pixels()
            .map(|px| [nan_to_zero(px[0]), nan_to_zero(px[1]), nan_to_zero(px[2])])
            .collect::<Vec<_>>()
    });

    let pointcloud = PointCloud::new(points, colors, normals)?;

    log::debug!(
        "back-projected {}x{} depth map into {} points ({:?})",
        width,
        height,
        pointcloud.len(),
        pointcloud.schema()
    );

    Ok(pointcloud)
}

/// Estimate per-pixel surface normals from a depth map.
///
/// The normal at a pixel is the cross product of the central differences of its
/// back-projected horizontal and vertical neighbours, oriented toward the camera.
/// Pixels on the border, or with a non-positive depth at the pixel or one of its
/// four neighbours, get NaN components.
///
/// # Arguments
///
/// * `intrinsics` - The camera intrinsics.
/// * `depth` - The depth map.
///
/// # Returns
///
/// A normal map with the size of the depth map.
pub fn estimate_normals<D>(
    intrinsics: &CameraIntrinsics,
    depth: &Image<D, 1>,
) -> Result<Image<f32, 3>, RgbdError>
where
    D: Copy + Into<f64>,
{
    check_focal_length(intrinsics)?;

    let (width, height) = (depth.width(), depth.height());
    let depth_data = depth.as_slice();

    let point_at = |u: usize, v: usize| -> Option<DVec3> {
        let d: f64 = depth_data[v * width + u].into();
        (d > 0.0).then(|| DVec3::from_array(back_project(intrinsics, u, v, d)))
    };

    let mut data = vec![f32::NAN; width * height * 3];

    for v in 1..height.saturating_sub(1) {
        for u in 1..width.saturating_sub(1) {
            let (Some(center), Some(left), Some(right), Some(top), Some(bottom)) = (
                point_at(u, v),
                point_at(u - 1, v),
                point_at(u + 1, v),
                point_at(u, v - 1),
                point_at(u, v + 1),
            ) else {
                continue;
            };

            let Some(normal) = (right - left).cross(bottom - top).try_normalize() else {
                continue;
            };

            // face the camera, which sits at the origin
            let normal = if normal.dot(center) > 0.0 {
                -normal
            } else {
                normal
            };

            let idx = (v * width + u) * 3;
            data[idx] = normal.x as f32;
            data[idx + 1] = normal.y as f32;
            data[idx + 2] = normal.z as f32;
        }
    }

    Ok(Image::new(depth.size(), data)?)
}
