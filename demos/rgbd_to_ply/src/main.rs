use argh::FromArgs;
use std::path::PathBuf;

use depthcloud::{
    image::ops::colorize_depth,
    io::{
        frame::{FileFrameSource, FrameSource},
        png::write_image_png_rgb8,
    },
    k3d::{
        camera::CameraRegistry,
        io::{ply::write_ply_ascii, poses::read_camera_poses},
        rgbd::{estimate_normals, rgbd_to_pointcloud},
    },
};

#[derive(FromArgs)]
/// Convert a depth PNG and an optional color PNG into an ASCII PLY point cloud
struct Args {
    /// path to the 16-bit depth PNG
    #[argh(option)]
    depth: PathBuf,

    /// path to the 8-bit RGB color PNG
    #[argh(option)]
    color: Option<PathBuf>,

    /// name of the camera profile
    #[argh(option, default = "String::from(\"RealSenseD435\")")]
    camera: String,

    /// scale applied to the camera intrinsics
    #[argh(option, default = "1.0")]
    scale: f64,

    /// JSON file with extra camera profiles
    #[argh(option)]
    profiles: Option<PathBuf>,

    /// output path without the .ply suffix
    #[argh(option)]
    output: PathBuf,

    /// estimate normals from the depth map
    #[argh(switch)]
    estimate_normals: bool,

    /// trajectory file with one 3x4 pose per line, translation in millimeters
    #[argh(option)]
    poses: Option<PathBuf>,

    /// index of the pose to apply, requires --poses
    #[argh(option, default = "0")]
    pose_index: usize,

    /// write a JET colorized depth map to this PNG
    #[argh(option)]
    depth_vis: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
#[error("{stage} failed: {source}")]
struct AppError {
    stage: &'static str,
    source: Box<dyn std::error::Error>,
}

trait Stage<T> {
    fn stage(self, stage: &'static str) -> Result<T, AppError>;
}

impl<T, E: std::error::Error + 'static> Stage<T> for Result<T, E> {
    fn stage(self, stage: &'static str) -> Result<T, AppError> {
        self.map_err(|e| AppError {
            stage,
            source: Box::new(e),
        })
    }
}

fn run(args: Args) -> Result<(), AppError> {
    let mut registry = CameraRegistry::builtin();
    if let Some(profiles) = &args.profiles {
        registry = registry.with_profiles_file(profiles).stage("camera")?;
    }
    let intrinsics = registry
        .resolve_scaled(&args.camera, args.scale)
        .stage("camera")?;
    log::info!("camera {}: {:?}", args.camera, intrinsics);

    let mut source = FileFrameSource::new(&args.depth);
    if let Some(color) = &args.color {
        source = source.with_color(color);
    }
    let mut frame = source.grab().stage("frame")?;
    log::info!(
        "grabbed frame {} (color: {})",
        frame.depth.size(),
        frame.color.is_some()
    );

    if let Some(depth_vis) = &args.depth_vis {
        let vis = colorize_depth(&frame.depth).stage("frame")?;
        write_image_png_rgb8(depth_vis, &vis).stage("write")?;
        log::info!("wrote depth visualization to {}", depth_vis.display());
    }

    if args.estimate_normals && frame.normals.is_none() {
        frame.normals = Some(estimate_normals(&intrinsics, &frame.depth).stage("normals")?);
    }

    let pose = match &args.poses {
        Some(path) => {
            let poses = read_camera_poses(path).stage("pose")?;
            let num_poses = poses.len();
            let pose = poses.into_iter().nth(args.pose_index).ok_or_else(|| AppError {
                stage: "pose",
                source: format!("index {} out of {num_poses} poses", args.pose_index).into(),
            })?;
            Some(pose)
        }
        None => None,
    };

    let mut pointcloud = rgbd_to_pointcloud(
        &intrinsics,
        &frame.depth,
        frame.color.as_ref(),
        frame.normals.as_ref(),
    )
    .stage("build")?;

    if let Some(pose) = pose {
        pointcloud = pointcloud.transform(&pose);
    }

    let path = write_ply_ascii(&args.output, &pointcloud).stage("write")?;
    println!("Wrote #{} points to {}", pointcloud.len(), path.display());

    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Args = argh::from_env();

    if let Err(e) = run(args) {
        log::error!("{e}");
        return Err(e.into());
    }

    Ok(())
}
