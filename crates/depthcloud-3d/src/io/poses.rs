use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use crate::pose::CameraPose;

/// Error types for the camera pose reader.
#[derive(Debug, thiserror::Error)]
pub enum PoseError {
    /// Error reading the file
    #[error("error reading pose file")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error {0}")]
    ParseError(String),
}

/// Read a camera trajectory file, one pose per line.
///
/// Each non-empty line holds the 12 whitespace separated values of a 3x4
/// `[R | t]` matrix in row-major order. The translation must be in the units
/// of the point cloud it is applied to, millimeters for back-projected depth
/// maps; the PLY writer converts to meters afterwards.
///
/// # Arguments
///
/// * `path` - The path to the trajectory file.
///
/// # Returns
///
/// The poses in file order.
pub fn read_camera_poses(path: impl AsRef<Path>) -> Result<Vec<CameraPose>, PoseError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let poses = reader
        .lines()
        .enumerate()
        .filter_map(|(line_number, line)| match line {
            Ok(line) if line.trim().is_empty() => None,
            Ok(line) => Some(parse_pose_line(&line, line_number + 1)),
            Err(e) => Some(Err(PoseError::from(e))),
        })
        .collect::<Result<Vec<_>, _>>()?;

    log::debug!("read {} camera poses", poses.len());

    Ok(poses)
}

fn parse_pose_line(line: &str, line_number: usize) -> Result<CameraPose, PoseError> {
    let values = line
        .split_whitespace()
        .map(|s| {
            s.parse::<f64>()
                .map_err(|e| PoseError::ParseError(format!("line {line_number}: {s}: {e}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let m: [f64; 12] = values.as_slice().try_into().map_err(|_| {
        PoseError::ParseError(format!(
            "line {line_number}: expected 12 values, found {}",
            values.len()
        ))
    })?;

    Ok(CameraPose::from_row_major(m))
}
