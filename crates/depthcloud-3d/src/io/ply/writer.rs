use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use super::{properties::vertex_properties, PlyError, PlyFormat};
use crate::pointcloud::{PointCloud, PointSchema};

/// Scale applied to positions on write, from millimeters to meters.
pub const MILLIMETERS_TO_METERS: f64 = 0.001;

const HEADER_COMMENT: &str = "generated by depthcloud";

fn write_header<W: Write>(
    writer: &mut W,
    vertex_count: usize,
    schema: PointSchema,
) -> Result<(), PlyError> {
    writeln!(writer, "ply")?;
    writeln!(writer, "format {} 1.0", PlyFormat::Ascii.keyword())?;
    writeln!(writer, "comment {HEADER_COMMENT}")?;
    writeln!(writer, "element vertex {vertex_count}")?;
    for property in vertex_properties(schema) {
        writeln!(
            writer,
            "property {} {}",
            property.data_type.name(),
            property.name
        )?;
    }
    // no faces, the declaration keeps mesh viewers happy
    writeln!(writer, "element face 0")?;
    writeln!(writer, "property list uchar int vertex_indices")?;
    writeln!(writer, "end_header")?;
    Ok(())
}

/// Serialize a point cloud as ASCII PLY into a writer.
///
/// Positions are converted from millimeters to meters. When the point cloud has
/// normals the x coordinate of the position is negated; without normals it is
/// written as is. Coordinates and normals are written with six decimals in a
/// ten character wide field, colors as integers. NaN normal components are
/// written as zero.
///
/// # Arguments
///
/// * `writer` - The destination of the PLY data.
/// * `pointcloud` - The point cloud to serialize.
pub fn write_ply_ascii_to<W: Write>(
    writer: &mut W,
    pointcloud: &PointCloud,
) -> Result<(), PlyError> {
    let schema = pointcloud.schema();
    write_header(writer, pointcloud.len(), schema)?;

    let flip_x = schema.has_normals();

    for record in pointcloud.records() {
        let [x, y, z] = record.position.map(|c| c * MILLIMETERS_TO_METERS);
        let x = if flip_x { -x } else { x };
        write!(writer, "{x:10.6} {y:10.6} {z:10.6}")?;

        if let Some(normal) = record.normal {
            let [nx, ny, nz] = normal.map(|c| if c.is_nan() { 0.0 } else { c });
            write!(writer, " {nx:10.6} {ny:10.6} {nz:10.6}")?;
        }

        if let Some([r, g, b]) = record.color {
            write!(writer, " {r} {g} {b}")?;
        }

        writeln!(writer)?;
    }

    Ok(())
}

/// Write a point cloud to `<path_stem>.ply` in ASCII PLY format.
///
/// The `.ply` suffix is appended to `path_stem`, so `out/cloud` becomes
/// `out/cloud.ply` and `out/cloud.v2` becomes `out/cloud.v2.ply`.
///
/// # Arguments
///
/// * `path_stem` - The output path without the `.ply` suffix.
/// * `pointcloud` - The point cloud to write.
///
/// # Returns
///
/// The path of the written file.
///
/// # Errors
///
/// Any I/O failure aborts the write and is returned; a partially written file
/// may be left behind.
///
/// Example:
///
/// ```no_run
/// use depthcloud_3d::io::ply::write_ply_ascii;
/// use depthcloud_3d::pointcloud::PointCloud;
///
/// let pointcloud = PointCloud::new(vec![[1000.0, 2000.0, 3000.0]], None, None).unwrap();
/// let path = write_ply_ascii("/tmp/cloud", &pointcloud).unwrap();
/// assert!(path.ends_with("cloud.ply"));
/// ```
pub fn write_ply_ascii(
    path_stem: impl AsRef<Path>,
    pointcloud: &PointCloud,
) -> Result<PathBuf, PlyError> {
    let mut path = path_stem.as_ref().as_os_str().to_owned();
    path.push(".ply");
    let path = PathBuf::from(path);

    let mut writer = BufWriter::new(File::create(&path)?);
    write_ply_ascii_to(&mut writer, pointcloud)?;
    writer.flush()?;

    log::info!(
        "wrote {} points ({:?}) to {}",
        pointcloud.len(),
        pointcloud.schema(),
        path.display()
    );

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_string(pointcloud: &PointCloud) -> Result<String, Box<dyn std::error::Error>> {
        let mut buf = Vec::new();
        write_ply_ascii_to(&mut buf, pointcloud)?;
        Ok(String::from_utf8(buf)?)
    }

    fn body(ply: &str) -> Vec<Vec<&str>> {
        ply.lines()
            .skip_while(|line| *line != "end_header")
            .skip(1)
            .map(|line| line.split_whitespace().collect())
            .collect()
    }

    #[test]
    fn test_header_xyz_color() -> Result<(), Box<dyn std::error::Error>> {
        let pointcloud = PointCloud::new(vec![[0.0; 3]; 4], Some(vec![[1, 2, 3]; 4]), None)?;
        let ply = to_string(&pointcloud)?;
        let header = ply.lines().take(13).collect::<Vec<_>>();
        assert_eq!(
            header,
            [
                "ply",
                "format ascii 1.0",
                "comment generated by depthcloud",
                "element vertex 4",
                "property float x",
                "property float y",
                "property float z",
                "property uchar red",
                "property uchar green",
                "property uchar blue",
                "element face 0",
                "property list uchar int vertex_indices",
                "end_header",
            ]
        );
        assert_eq!(body(&ply).len(), 4);

        Ok(())
    }

    #[test]
    fn test_header_normals_before_colors() -> Result<(), Box<dyn std::error::Error>> {
        let pointcloud = PointCloud::new(
            vec![[0.0; 3]],
            Some(vec![[1, 2, 3]]),
            Some(vec![[0.0, 0.0, 1.0]]),
        )?;
        let ply = to_string(&pointcloud)?;
        let properties = ply
            .lines()
            .filter_map(|line| line.strip_prefix("property "))
            .collect::<Vec<_>>();
        assert_eq!(
            properties,
            [
                "float x",
                "float y",
                "float z",
                "float nx",
                "float ny",
                "float nz",
                "uchar red",
                "uchar green",
                "uchar blue",
                "list uchar int vertex_indices",
            ]
        );

        Ok(())
    }

    #[test]
    fn test_unit_conversion_without_normals() -> Result<(), Box<dyn std::error::Error>> {
        let pointcloud = PointCloud::new(vec![[1000.0, 2000.0, 3000.0]], None, None)?;
        let ply = to_string(&pointcloud)?;
        assert_eq!(body(&ply), [["1.000000", "2.000000", "3.000000"]]);

        Ok(())
    }

    #[test]
    fn test_unit_conversion_with_normals() -> Result<(), Box<dyn std::error::Error>> {
        let pointcloud = PointCloud::new(
            vec![[1000.0, 2000.0, 3000.0]],
            None,
            Some(vec![[0.5, -0.5, 0.0]]),
        )?;
        let ply = to_string(&pointcloud)?;
        assert_eq!(
            body(&ply),
            [[
                "-1.000000",
                "2.000000",
                "3.000000",
                "0.500000",
                "-0.500000",
                "0.000000"
            ]]
        );

        Ok(())
    }

    #[test]
    fn test_nan_normals_written_as_zero() -> Result<(), Box<dyn std::error::Error>> {
        let pointcloud = PointCloud::new(
            vec![[1000.0, 0.0, 1000.0]],
            None,
            Some(vec![[f64::NAN, 0.0, 1.0]]),
        )?;
        let ply = to_string(&pointcloud)?;
        assert!(!ply.contains("NaN"));
        assert_eq!(
            body(&ply),
            [[
                "-1.000000",
                "0.000000",
                "1.000000",
                "0.000000",
                "0.000000",
                "1.000000"
            ]]
        );

        Ok(())
    }

    #[test]
    fn test_fixed_width_line() -> Result<(), Box<dyn std::error::Error>> {
        let pointcloud = PointCloud::new(
            vec![[-800.0, -600.0, 1000.0]],
            Some(vec![[255, 128, 0]]),
            None,
        )?;
        let ply = to_string(&pointcloud)?;
        let line = ply.lines().last().ok_or("empty output")?;
        assert_eq!(line, " -0.800000  -0.600000   1.000000 255 128 0");

        Ok(())
    }

    #[test]
    fn test_write_ply_ascii_appends_suffix() -> Result<(), Box<dyn std::error::Error>> {
        let tmp_dir = tempfile::tempdir()?;
        let stem = tmp_dir.path().join("cloud.v2");

        let pointcloud = PointCloud::new(vec![[0.0, 0.0, 500.0]; 3], None, None)?;
        let path = write_ply_ascii(&stem, &pointcloud)?;

        assert_eq!(path, tmp_dir.path().join("cloud.v2.ply"));
        let content = std::fs::read_to_string(&path)?;
        assert!(content.starts_with("ply\nformat ascii 1.0\n"));
        assert_eq!(body(&content).len(), 3);

        Ok(())
    }

    #[test]
    fn test_write_ply_ascii_io_error() -> Result<(), Box<dyn std::error::Error>> {
        let tmp_dir = tempfile::tempdir()?;
        let stem = tmp_dir.path().join("missing").join("cloud");

        let pointcloud = PointCloud::new(vec![[0.0; 3]], None, None)?;
        let res = write_ply_ascii(&stem, &pointcloud);
        assert!(matches!(res, Err(PlyError::Io(_))));

        Ok(())
    }
}
