use std::{collections::BTreeMap, fs::File, io::BufReader, path::Path, str::FromStr};

use serde::{Deserialize, Serialize};

/// Error types for the camera module.
#[derive(Debug, thiserror::Error)]
pub enum CameraError {
    /// The camera name is not in the registry.
    #[error("Unknown camera model: {0}")]
    UnknownCamera(String),

    /// The focal lengths must be strictly positive.
    #[error("Invalid focal length fx={fx} fy={fy}, expected positive values")]
    InvalidFocalLength {
        /// Focal length along x.
        fx: f64,
        /// Focal length along y.
        fy: f64,
    },

    /// Failed to read a camera profiles file.
    #[error("Failed to read camera profiles. {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse a camera profiles file.
    #[error("Failed to parse camera profiles. {0}")]
    Json(#[from] serde_json::Error),
}

fn default_scale() -> f64 {
    1.0
}

/// The intrinsic parameters of a pinhole RGB-D camera.
///
/// Focal lengths and principal point are in pixels. The resolution is kept as a
/// floating point value since [`CameraIntrinsics::rescale`] scales it by an
/// arbitrary factor together with the other fields.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraIntrinsics {
    /// Focal length along x in pixels.
    pub fx: f64,
    /// Focal length along y in pixels.
    pub fy: f64,
    /// Principal point x coordinate in pixels.
    pub cx: f64,
    /// Principal point y coordinate in pixels.
    pub cy: f64,
    /// Nominal image width.
    pub img_w: f64,
    /// Nominal image height.
    pub img_h: f64,
    /// Scale factor applied to the base calibration.
    #[serde(default = "default_scale")]
    pub scale: f64,
}

impl CameraIntrinsics {
    /// Create new intrinsics with a scale of 1.0.
    ///
    /// # Errors
    ///
    /// Returns [`CameraError::InvalidFocalLength`] if `fx` or `fy` is not positive.
    pub fn new(
        fx: f64,
        fy: f64,
        cx: f64,
        cy: f64,
        img_w: f64,
        img_h: f64,
    ) -> Result<Self, CameraError> {
        let intrinsics = Self {
            fx,
            fy,
            cx,
            cy,
            img_w,
            img_h,
            scale: 1.0,
        };
        intrinsics.validate()?;
        Ok(intrinsics)
    }

    /// Check that the focal lengths are strictly positive.
    pub fn validate(&self) -> Result<(), CameraError> {
        // written so that NaN fails as well
        if !(self.fx > 0.0 && self.fy > 0.0) {
            return Err(CameraError::InvalidFocalLength {
                fx: self.fx,
                fy: self.fy,
            });
        }
        Ok(())
    }

    /// Return a copy with every linear field multiplied by `factor`.
    ///
    /// Focal lengths, principal point and resolution are all scaled and `scale`
    /// is set to `factor`. The factor is not validated.
    ///
    /// Example:
    ///
    /// ```
    /// use depthcloud_3d::camera::CameraIntrinsics;
    ///
    /// let k = CameraIntrinsics::new(400.0, 400.0, 320.0, 240.0, 640.0, 480.0).unwrap();
    /// let half = k.rescale(0.5);
    /// assert_eq!(half.fx, 200.0);
    /// assert_eq!(half.img_w, 320.0);
    /// assert_eq!(half.scale, 0.5);
    /// ```
    pub fn rescale(&self, factor: f64) -> Self {
        Self {
            fx: self.fx * factor,
            fy: self.fy * factor,
            cx: self.cx * factor,
            cy: self.cy * factor,
            img_w: self.img_w * factor,
            img_h: self.img_h * factor,
            scale: factor,
        }
    }
}

/// The camera models with a built-in calibration.
///
/// All calibrations are given for a 640x480 image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraModel {
    /// Orbbec Astra.
    OrbbecAstra,
    /// Orbbec Astra, second calibration.
    OrbbecAstraV2,
    /// Orbbec Astra Pro.
    OrbbecAstraPro,
    /// Orbbec Persee.
    OrbbecPersee,
    /// Intel RealSense D435.
    RealSenseD435,
}

impl CameraModel {
    /// Every built-in camera model.
    pub const ALL: [CameraModel; 5] = [
        CameraModel::OrbbecAstra,
        CameraModel::OrbbecAstraV2,
        CameraModel::OrbbecAstraPro,
        CameraModel::OrbbecPersee,
        CameraModel::RealSenseD435,
    ];

    /// The registry name of the model.
    pub fn name(&self) -> &'static str {
        match self {
            CameraModel::OrbbecAstra => "OrbbecAstra",
            CameraModel::OrbbecAstraV2 => "OrbbecAstraV2",
            CameraModel::OrbbecAstraPro => "OrbbecAstraPro",
            CameraModel::OrbbecPersee => "OrbbecPersee",
            CameraModel::RealSenseD435 => "RealSenseD435",
        }
    }

    /// The base calibration of the model at 640x480.
    pub fn intrinsics(&self) -> CameraIntrinsics {
        let (fx, fy, cx, cy) = match self {
            CameraModel::OrbbecAstra => (570.342, 570.342, 320.0, 240.0),
            CameraModel::OrbbecAstraV2 => (
                581.1102688880432,
                576.1734668524375,
                305.7483731000336,
                244.8215753417885,
            ),
            CameraModel::OrbbecAstraPro | CameraModel::OrbbecPersee => {
                (553.797, 553.722, 320.0, 240.0)
            }
            CameraModel::RealSenseD435 => (
                387.4065246582031,
                387.4065246582031,
                318.5951843261719,
                241.4065399169922,
            ),
        };

        CameraIntrinsics {
            fx,
            fy,
            cx,
            cy,
            img_w: 640.0,
            img_h: 480.0,
            scale: 1.0,
        }
    }
}

impl FromStr for CameraModel {
    type Err = CameraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CameraModel::ALL
            .into_iter()
            .find(|model| model.name() == s)
            .ok_or_else(|| CameraError::UnknownCamera(s.to_string()))
    }
}

/// A read-only table of named camera calibrations.
///
/// Built once at start-up and handed to whoever needs to resolve a camera name.
///
/// Example:
///
/// ```
/// use depthcloud_3d::camera::CameraRegistry;
///
/// let registry = CameraRegistry::builtin();
/// let intrinsics = registry.resolve_scaled("RealSenseD435", 0.5).unwrap();
/// assert_eq!(intrinsics.img_w, 320.0);
/// assert!(registry.resolve("Kinect").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CameraRegistry {
    profiles: BTreeMap<String, CameraIntrinsics>,
}

impl CameraRegistry {
    /// A registry holding the built-in [`CameraModel`] calibrations.
    pub fn builtin() -> Self {
        let profiles = CameraModel::ALL
            .into_iter()
            .map(|model| (model.name().to_string(), model.intrinsics()))
            .collect();
        Self { profiles }
    }

    /// Extend the registry with the profiles of a JSON file.
    ///
    /// The file holds an object mapping camera names to intrinsics, e.g.
    /// `{"MyCam": {"fx": 500, "fy": 500, "cx": 320, "cy": 240, "img_w": 640, "img_h": 480}}`.
    /// Profiles from the file replace registered profiles with the same name.
    pub fn with_profiles_file(self, path: impl AsRef<Path>) -> Result<Self, CameraError> {
        let reader = BufReader::new(File::open(path)?);
        let profiles: BTreeMap<String, CameraIntrinsics> = serde_json::from_reader(reader)?;
        self.with_profiles(profiles)
    }

    /// Extend the registry with the profiles of a JSON string.
    pub fn with_profiles_json(self, json: &str) -> Result<Self, CameraError> {
        let profiles: BTreeMap<String, CameraIntrinsics> = serde_json::from_str(json)?;
        self.with_profiles(profiles)
    }

    fn with_profiles(
        mut self,
        profiles: BTreeMap<String, CameraIntrinsics>,
    ) -> Result<Self, CameraError> {
        for (name, intrinsics) in profiles {
            intrinsics.validate()?;
            log::debug!("registering camera profile {name}");
            self.profiles.insert(name, intrinsics);
        }
        Ok(self)
    }

    /// Look up the base intrinsics of a camera.
    ///
    /// # Errors
    ///
    /// Returns [`CameraError::UnknownCamera`] if the name is not registered.
    pub fn resolve(&self, name: &str) -> Result<CameraIntrinsics, CameraError> {
        self.profiles
            .get(name)
            .copied()
            .ok_or_else(|| CameraError::UnknownCamera(name.to_string()))
    }

    /// Look up a camera and rescale its intrinsics by `scale`.
    pub fn resolve_scaled(&self, name: &str, scale: f64) -> Result<CameraIntrinsics, CameraError> {
        Ok(self.resolve(name)?.rescale(scale))
    }

    /// The registered camera names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }
}
