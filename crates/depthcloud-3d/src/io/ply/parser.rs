use std::io::BufRead;
use std::path::Path;

use super::{
    properties::{schema_from_properties, PlyDataType, PlyFormat, PlyPropertyDefinition},
    PlyError,
};
use crate::pointcloud::{PointCloud, PointSchema};

/// The parsed header of a PLY file.
#[derive(Debug, Clone, PartialEq)]
pub struct PlyHeader {
    /// Encoding of the body.
    pub format: PlyFormat,
    /// Number of vertices declared by `element vertex`.
    pub vertex_count: usize,
    /// Scalar properties of the vertex element, in declaration order.
    pub properties: Vec<PlyPropertyDefinition>,
}

impl PlyHeader {
    /// The point schema described by the vertex properties.
    pub fn schema(&self) -> Result<PointSchema, PlyError> {
        schema_from_properties(&self.properties)
    }
}

/// Parse a PLY header, leaving the reader at the first body byte.
///
/// Only the properties of the `vertex` element are kept; other elements and
/// list properties are skipped.
pub fn read_ply_header<R: BufRead>(reader: &mut R) -> Result<PlyHeader, PlyError> {
    let mut line = String::new();
    let mut format = None;
    let mut vertex_count = None;
    let mut in_vertex_element = false;
    let mut properties = Vec::new();

    reader.read_line(&mut line)?;
    if line.trim() != "ply" {
        return Err(PlyError::MalformedHeader("missing ply magic".to_string()));
    }

    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Err(PlyError::MalformedHeader("missing end_header".to_string()));
        }
        let parts = line.split_whitespace().collect::<Vec<_>>();

        match parts.as_slice() {
            ["end_header"] => break,
            ["format", keyword, _version] => format = Some(PlyFormat::parse(keyword)?),
            ["comment", ..] | ["obj_info", ..] | [] => {}
            ["element", name, count] => {
                in_vertex_element = *name == "vertex";
                if in_vertex_element {
                    let count = count.parse::<usize>().map_err(|e| {
                        PlyError::MalformedHeader(format!("vertex count {count}: {e}"))
                    })?;
                    vertex_count = Some(count);
                }
            }
            ["property", "list", ..] => {
                if in_vertex_element {
                    return Err(PlyError::UnsupportedProperty(line.trim().to_string()));
                }
            }
            ["property", data_type, name] => {
                if in_vertex_element {
                    properties.push(PlyPropertyDefinition {
                        name: name.to_string(),
                        data_type: PlyDataType::parse(data_type)?,
                    });
                }
            }
            _ => return Err(PlyError::MalformedHeader(line.trim().to_string())),
        }
    }

    let format = format.ok_or_else(|| PlyError::MalformedHeader("missing format".to_string()))?;
    let vertex_count = vertex_count
        .ok_or_else(|| PlyError::MalformedHeader("missing vertex element".to_string()))?;

    Ok(PlyHeader {
        format,
        vertex_count,
        properties,
    })
}

fn parse_values<T: std::str::FromStr>(
    parts: &[&str],
    line_number: usize,
) -> Result<[T; 3], PlyError>
where
    T::Err: std::fmt::Display,
{
    let mut values = parts.iter().map(|s| {
        s.parse::<T>()
            .map_err(|e| PlyError::ParseError(format!("line {line_number}: {s}: {e}")))
    });

    let mut next = || {
        values.next().unwrap_or_else(|| {
            Err(PlyError::ParseError(format!(
                "line {line_number}: missing value"
            )))
        })
    };

    Ok([next()?, next()?, next()?])
}

/// Read an ASCII PLY point cloud written by [`super::write_ply_ascii`].
///
/// Values are returned as stored in the file, no unit conversion is undone.
///
/// # Arguments
///
/// * `path` - The path to the PLY file.
///
/// # Returns
///
/// A `PointCloud` with the columns declared by the header.
pub fn read_ply_ascii(path: impl AsRef<Path>) -> Result<PointCloud, PlyError> {
    let file = std::fs::File::open(path)?;
    let mut reader = std::io::BufReader::new(file);
    let header = read_ply_header(&mut reader)?;

    if header.format != PlyFormat::Ascii {
        return Err(PlyError::UnsupportedProperty(format!(
            "format {}",
            header.format.keyword()
        )));
    }

    let schema = header.schema()?;
    let num_fields = schema.num_float_fields() + schema.num_byte_fields();

    // the declared count is untrusted, grow as lines are read
    let mut points = Vec::new();
    let mut colors = Vec::new();
    let mut normals = Vec::new();

    let mut line = String::new();
    for line_number in 0..header.vertex_count {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Err(PlyError::ParseError(format!(
                "expected {} vertices, found {line_number}",
                header.vertex_count
            )));
        }

        let parts = line.split_whitespace().collect::<Vec<_>>();
        if parts.len() != num_fields {
            return Err(PlyError::ParseError(format!(
                "line {line_number}: expected {num_fields} values, found {}",
                parts.len()
            )));
        }

        points.push(parse_values::<f64>(&parts[0..3], line_number)?);
        if schema.has_normals() {
            normals.push(parse_values::<f64>(&parts[3..6], line_number)?);
        }
        if schema.has_colors() {
            let offset = schema.num_float_fields();
            colors.push(parse_values::<u8>(&parts[offset..offset + 3], line_number)?);
        }
    }

    let colors = schema.has_colors().then_some(colors);
    let normals = schema.has_normals().then_some(normals);

    PointCloud::new(points, colors, normals)
        .map_err(|e| PlyError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::ply::write_ply_ascii;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_header_basic() -> Result<(), PlyError> {
        let header_text = "ply\nformat ascii 1.0\ncomment test\nelement vertex 10\nproperty float x\nproperty float y\nproperty float z\nend_header\n";
        let mut reader = std::io::BufReader::new(header_text.as_bytes());
        let header = read_ply_header(&mut reader)?;
        assert_eq!(header.format, PlyFormat::Ascii);
        assert_eq!(header.vertex_count, 10);
        assert_eq!(header.properties.len(), 3);
        assert_eq!(header.properties[0].name, "x");
        assert_eq!(header.properties[0].data_type, PlyDataType::Float32);
        assert_eq!(header.schema()?, PointSchema::Xyz);
        Ok(())
    }

    #[test]
    fn test_parse_header_skips_faces() -> Result<(), PlyError> {
        let header_text = "ply\nformat binary_little_endian 1.0\nelement vertex 5\nproperty float x\nproperty float y\nproperty float z\nproperty float nx\nproperty float ny\nproperty float nz\nproperty uchar red\nproperty uchar green\nproperty uchar blue\nelement face 0\nproperty list uchar int vertex_indices\nend_header\n";
        let mut reader = std::io::BufReader::new(header_text.as_bytes());
        let header = read_ply_header(&mut reader)?;
        assert_eq!(header.format, PlyFormat::BinaryLittleEndian);
        assert_eq!(header.vertex_count, 5);
        assert_eq!(header.properties.len(), 9);
        assert_eq!(header.schema()?, PointSchema::XyzNormalColor);
        Ok(())
    }

    #[test]
    fn test_parse_header_malformed() {
        let cases = [
            "format ascii 1.0\nend_header\n",
            "ply\nformat ascii 1.0\nelement vertex 3\nproperty float x\n",
            "ply\nelement vertex 3\nend_header\n",
            "ply\nformat ascii 1.0\nend_header\n",
            "ply\nformat ascii 1.0\nelement vertex many\nend_header\n",
        ];
        for header_text in cases {
            let mut reader = std::io::BufReader::new(header_text.as_bytes());
            assert!(
                matches!(
                    read_ply_header(&mut reader),
                    Err(PlyError::MalformedHeader(_))
                ),
                "{header_text}"
            );
        }
    }

    #[test]
    fn test_parse_header_unsupported_type() {
        let header_text =
            "ply\nformat ascii 1.0\nelement vertex 1\nproperty half x\nend_header\n";
        let mut reader = std::io::BufReader::new(header_text.as_bytes());
        assert!(matches!(
            read_ply_header(&mut reader),
            Err(PlyError::UnsupportedProperty(_))
        ));
    }

    #[test]
    fn test_write_read_roundtrip() -> Result<(), Box<dyn std::error::Error>> {
        let tmp_dir = tempfile::tempdir()?;
        let pointcloud = PointCloud::new(
            vec![[1000.0, -2000.0, 3000.0], [0.0, 0.0, 250.0]],
            Some(vec![[255, 0, 10], [1, 2, 3]]),
            Some(vec![[0.0, 0.0, -1.0], [0.6, 0.8, 0.0]]),
        )?;

        let path = write_ply_ascii(tmp_dir.path().join("cloud"), &pointcloud)?;

        let mut reader = std::io::BufReader::new(std::fs::File::open(&path)?);
        let header = read_ply_header(&mut reader)?;
        assert_eq!(header.vertex_count, pointcloud.len());
        assert_eq!(header.schema()?, pointcloud.schema());

        let read_back = read_ply_ascii(&path)?;
        assert_eq!(read_back.schema(), PointSchema::XyzNormalColor);
        assert_eq!(read_back.colors(), pointcloud.colors());

        // meters, x negated because the cloud has normals
        let p0 = read_back.points()[0];
        assert_relative_eq!(p0[0], -1.0);
        assert_relative_eq!(p0[1], -2.0);
        assert_relative_eq!(p0[2], 3.0);
        let n1 = read_back.normals().ok_or("missing normals")?[1];
        assert_relative_eq!(n1[0], 0.6);
        assert_relative_eq!(n1[1], 0.8);

        Ok(())
    }

    #[test]
    fn test_read_truncated_body() -> Result<(), Box<dyn std::error::Error>> {
        let tmp_dir = tempfile::tempdir()?;
        let path = tmp_dir.path().join("short.ply");
        std::fs::write(
            &path,
            "ply\nformat ascii 1.0\nelement vertex 2\nproperty float x\nproperty float y\nproperty float z\nend_header\n0.1 0.2 0.3\n",
        )?;

        assert!(matches!(read_ply_ascii(&path), Err(PlyError::ParseError(_))));

        Ok(())
    }

    #[test]
    fn test_read_huge_vertex_count() -> Result<(), Box<dyn std::error::Error>> {
        let tmp_dir = tempfile::tempdir()?;
        let path = tmp_dir.path().join("huge.ply");
        std::fs::write(
            &path,
            format!(
                "ply\nformat ascii 1.0\nelement vertex {}\nproperty float x\nproperty float y\nproperty float z\nend_header\n0.1 0.2 0.3\n",
                usize::MAX
            ),
        )?;

        assert!(matches!(read_ply_ascii(&path), Err(PlyError::ParseError(_))));

        Ok(())
    }
}
