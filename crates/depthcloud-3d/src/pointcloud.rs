use glam::DVec3;

use crate::pose::CameraPose;

/// Error types for the point cloud module.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PointCloudError {
    /// An optional column does not have one entry per point.
    #[error("Number of {what} ({got}) does not match the number of points ({expected})")]
    LengthMismatch {
        /// Name of the offending column.
        what: &'static str,
        /// Number of points.
        expected: usize,
        /// Number of entries in the column.
        got: usize,
    },
}

/// The per-vertex layout of a point cloud.
///
/// The layout is fixed for a whole point cloud: either every point carries a
/// normal (resp. a color) or none does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointSchema {
    /// Position only.
    Xyz,
    /// Position and normal.
    XyzNormal,
    /// Position and color.
    XyzColor,
    /// Position, normal and color.
    XyzNormalColor,
}

impl PointSchema {
    /// Select the schema from the optional columns that are present.
    pub fn new(has_normals: bool, has_colors: bool) -> Self {
        match (has_normals, has_colors) {
            (false, false) => PointSchema::Xyz,
            (true, false) => PointSchema::XyzNormal,
            (false, true) => PointSchema::XyzColor,
            (true, true) => PointSchema::XyzNormalColor,
        }
    }

    /// Whether the points carry a normal.
    pub fn has_normals(&self) -> bool {
        matches!(self, PointSchema::XyzNormal | PointSchema::XyzNormalColor)
    }

    /// Whether the points carry a color.
    pub fn has_colors(&self) -> bool {
        matches!(self, PointSchema::XyzColor | PointSchema::XyzNormalColor)
    }

    /// Number of floating point fields per point.
    pub fn num_float_fields(&self) -> usize {
        if self.has_normals() {
            6
        } else {
            3
        }
    }

    /// Number of byte fields per point.
    pub fn num_byte_fields(&self) -> usize {
        if self.has_colors() {
            3
        } else {
            0
        }
    }
}

/// A view on a single point of a [`PointCloud`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointRecord {
    /// The position of the point.
    pub position: [f64; 3],
    /// The normal of the point, if the cloud has normals.
    pub normal: Option<[f64; 3]>,
    /// The color of the point, if the cloud has colors.
    pub color: Option<[u8; 3]>,
}

/// A point cloud with points, colors, and normals.
#[derive(Debug, Clone, PartialEq)]
pub struct PointCloud {
    // The points in the point cloud.
    points: Vec<[f64; 3]>,
    // The colors of the points.
    colors: Option<Vec<[u8; 3]>>,
    // The normals of the points.
    normals: Option<Vec<[f64; 3]>>,
}

impl PointCloud {
    /// Create a new point cloud from points, colors (optional), and normals (optional).
    ///
    /// # Errors
    ///
    /// Returns [`PointCloudError::LengthMismatch`] if colors or normals do not
    /// have exactly one entry per point.
    pub fn new(
        points: Vec<[f64; 3]>,
        colors: Option<Vec<[u8; 3]>>,
        normals: Option<Vec<[f64; 3]>>,
    ) -> Result<Self, PointCloudError> {
        if let Some(colors) = &colors {
            check_len("colors", points.len(), colors.len())?;
        }
        if let Some(normals) = &normals {
            check_len("normals", points.len(), normals.len())?;
        }

        Ok(Self {
            points,
            colors,
            normals,
        })
    }

    /// Get the number of points in the point cloud.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the point cloud is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The per-vertex layout of the point cloud.
    pub fn schema(&self) -> PointSchema {
        PointSchema::new(self.normals.is_some(), self.colors.is_some())
    }

    /// Get as reference the points in the point cloud.
    pub fn points(&self) -> &[[f64; 3]] {
        &self.points
    }

    /// Get as reference the colors of the points in the point cloud.
    pub fn colors(&self) -> Option<&[[u8; 3]]> {
        self.colors.as_deref()
    }

    /// Get as reference the normals of the points in the point cloud.
    pub fn normals(&self) -> Option<&[[f64; 3]]> {
        self.normals.as_deref()
    }

    /// Iterate over the points in storage order.
    pub fn records(&self) -> impl Iterator<Item = PointRecord> + '_ {
        self.points.iter().enumerate().map(move |(i, &position)| PointRecord {
            position,
            normal: self.normals.as_ref().map(|normals| normals[i]),
            color: self.colors.as_ref().map(|colors| colors[i]),
        })
    }

    /// Get the minimum bound of the point cloud.
    pub fn get_min_bound(&self) -> DVec3 {
        self.points
            .iter()
            .map(|&p| DVec3::from_array(p))
            .reduce(|a, b| a.min(b))
            .unwrap_or(DVec3::ZERO)
    }

    /// Get the maximum bound of the point cloud.
    pub fn get_max_bound(&self) -> DVec3 {
        self.points
            .iter()
            .map(|&p| DVec3::from_array(p))
            .reduce(|a, b| a.max(b))
            .unwrap_or(DVec3::ZERO)
    }

    /// Express the point cloud in the frame given by `pose`.
    ///
    /// Positions are rotated and translated, normals only rotated. Colors and
    /// the schema are kept.
    pub fn transform(&self, pose: &CameraPose) -> PointCloud {
        let points = self
            .points
            .iter()
            .map(|p| pose.transform_point(p))
            .collect();
        let normals = self
            .normals
            .as_ref()
            .map(|normals| normals.iter().map(|n| pose.rotate_vector(n)).collect());

        PointCloud {
            points,
            colors: self.colors.clone(),
            normals,
        }
    }
}

fn check_len(what: &'static str, expected: usize, got: usize) -> Result<(), PointCloudError> {
    if expected != got {
        return Err(PointCloudError::LengthMismatch {
            what,
            expected,
            got,
        });
    }
    Ok(())
}
