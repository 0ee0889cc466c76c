use glam::{DAffine3, DMat3, DVec3};

/// A rigid camera pose given as a 3x4 matrix `[R | t]`.
///
/// The translation is expressed in the units of the points it is applied to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    transform: DAffine3,
}

impl CameraPose {
    /// Create a pose from a row-major rotation matrix and a translation vector.
    ///
    /// PRECONDITION: `rotation` is orthonormal.
    pub fn new(rotation: [[f64; 3]; 3], translation: [f64; 3]) -> Self {
        // glam matrices are column-major
        let rotation = DMat3::from_cols_array_2d(&rotation).transpose();
        Self {
            transform: DAffine3::from_mat3_translation(rotation, DVec3::from_array(translation)),
        }
    }

    /// The identity pose.
    pub fn identity() -> Self {
        Self {
            transform: DAffine3::IDENTITY,
        }
    }

    /// Create a pose from the 12 values of a 3x4 matrix in row-major order.
    ///
    /// Example:
    ///
    /// ```
    /// use depthcloud_3d::pose::CameraPose;
    ///
    /// let pose = CameraPose::from_row_major([
    ///     1.0, 0.0, 0.0, 0.5,
    ///     0.0, 1.0, 0.0, 0.0,
    ///     0.0, 0.0, 1.0, 0.0,
    /// ]);
    /// assert_eq!(pose.translation(), [0.5, 0.0, 0.0]);
    /// ```
    pub fn from_row_major(m: [f64; 12]) -> Self {
        Self::new(
            [[m[0], m[1], m[2]], [m[4], m[5], m[6]], [m[8], m[9], m[10]]],
            [m[3], m[7], m[11]],
        )
    }

    /// The rotation part of the pose, row-major.
    pub fn rotation(&self) -> [[f64; 3]; 3] {
        self.transform.matrix3.transpose().to_cols_array_2d()
    }

    /// The translation part of the pose.
    pub fn translation(&self) -> [f64; 3] {
        self.transform.translation.to_array()
    }

    /// Rotate a vector, ignoring the translation.
    pub fn rotate_vector(&self, v: &[f64; 3]) -> [f64; 3] {
        self.transform
            .transform_vector3(DVec3::from_array(*v))
            .to_array()
    }

    /// Apply the full rigid transform to a point.
    pub fn transform_point(&self, p: &[f64; 3]) -> [f64; 3] {
        self.transform
            .transform_point3(DVec3::from_array(*p))
            .to_array()
    }
}

impl Default for CameraPose {
    fn default() -> Self {
        Self::identity()
    }
}
