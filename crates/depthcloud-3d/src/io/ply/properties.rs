use super::PlyError;
use crate::pointcloud::PointSchema;

/// The encoding of the PLY body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlyFormat {
    /// Whitespace separated text, one element per line.
    Ascii,
    /// Packed little endian binary.
    BinaryLittleEndian,
    /// Packed big endian binary.
    BinaryBigEndian,
}

impl PlyFormat {
    /// The keyword used on the `format` header line.
    pub fn keyword(&self) -> &'static str {
        match self {
            PlyFormat::Ascii => "ascii",
            PlyFormat::BinaryLittleEndian => "binary_little_endian",
            PlyFormat::BinaryBigEndian => "binary_big_endian",
        }
    }

    pub(crate) fn parse(keyword: &str) -> Result<Self, PlyError> {
        match keyword {
            "ascii" => Ok(PlyFormat::Ascii),
            "binary_little_endian" => Ok(PlyFormat::BinaryLittleEndian),
            "binary_big_endian" => Ok(PlyFormat::BinaryBigEndian),
            _ => Err(PlyError::MalformedHeader(format!(
                "unknown format {keyword}"
            ))),
        }
    }
}

/// Scalar types of a PLY property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlyDataType {
    /// 32-bit float
    Float32,
    /// 64-bit float
    Float64,
    /// 8-bit signed integer
    Int8,
    /// 8-bit unsigned integer
    UInt8,
    /// 16-bit signed integer
    Int16,
    /// 16-bit unsigned integer
    UInt16,
    /// 32-bit signed integer
    Int32,
    /// 32-bit unsigned integer
    UInt32,
}

impl PlyDataType {
    /// The name written in the header.
    pub fn name(&self) -> &'static str {
        match self {
            PlyDataType::Float32 => "float",
            PlyDataType::Float64 => "double",
            PlyDataType::Int8 => "char",
            PlyDataType::UInt8 => "uchar",
            PlyDataType::Int16 => "short",
            PlyDataType::UInt16 => "ushort",
            PlyDataType::Int32 => "int",
            PlyDataType::UInt32 => "uint",
        }
    }

    pub(crate) fn parse(type_str: &str) -> Result<Self, PlyError> {
        match type_str {
            "float" | "float32" => Ok(PlyDataType::Float32),
            "double" | "float64" => Ok(PlyDataType::Float64),
            "char" | "int8" => Ok(PlyDataType::Int8),
            "uchar" | "uint8" => Ok(PlyDataType::UInt8),
            "short" | "int16" => Ok(PlyDataType::Int16),
            "ushort" | "uint16" => Ok(PlyDataType::UInt16),
            "int" | "int32" => Ok(PlyDataType::Int32),
            "uint" | "uint32" => Ok(PlyDataType::UInt32),
            _ => Err(PlyError::UnsupportedProperty(type_str.to_string())),
        }
    }
}

/// A scalar property of the vertex element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlyPropertyDefinition {
    /// Property name, e.g. `x` or `red`.
    pub name: String,
    /// Property type.
    pub data_type: PlyDataType,
}

impl PlyPropertyDefinition {
    fn new(name: &str, data_type: PlyDataType) -> Self {
        Self {
            name: name.to_string(),
            data_type,
        }
    }
}

const POSITION: [&str; 3] = ["x", "y", "z"];
const NORMAL: [&str; 3] = ["nx", "ny", "nz"];
const COLOR: [&str; 3] = ["red", "green", "blue"];

/// The vertex properties declared for a point schema, in file order.
///
/// Positions come first, then normals, then colors.
pub fn vertex_properties(schema: PointSchema) -> Vec<PlyPropertyDefinition> {
    let mut properties = POSITION
        .iter()
        .map(|name| PlyPropertyDefinition::new(name, PlyDataType::Float32))
        .collect::<Vec<_>>();

    if schema.has_normals() {
        properties.extend(
            NORMAL
                .iter()
                .map(|name| PlyPropertyDefinition::new(name, PlyDataType::Float32)),
        );
    }

    if schema.has_colors() {
        properties.extend(
            COLOR
                .iter()
                .map(|name| PlyPropertyDefinition::new(name, PlyDataType::UInt8)),
        );
    }

    properties
}

/// Recover the point schema from a vertex property list.
///
/// Only the layouts produced by [`vertex_properties`] are recognized.
pub fn schema_from_properties(
    properties: &[PlyPropertyDefinition],
) -> Result<PointSchema, PlyError> {
    let names = properties
        .iter()
        .map(|p| p.name.as_str())
        .collect::<Vec<_>>();

    let has_normals = names.len() >= 6 && names[3..6] == NORMAL;
    let has_colors = names.ends_with(&COLOR);
    let schema = PointSchema::new(has_normals, has_colors);

    if properties != vertex_properties(schema).as_slice() {
        return Err(PlyError::UnsupportedProperty(names.join(" ")));
    }

    Ok(schema)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_properties() {
        let names = |schema| {
            vertex_properties(schema)
                .into_iter()
                .map(|p| p.name)
                .collect::<Vec<_>>()
        };

        assert_eq!(names(PointSchema::Xyz), ["x", "y", "z"]);
        assert_eq!(
            names(PointSchema::XyzNormalColor),
            ["x", "y", "z", "nx", "ny", "nz", "red", "green", "blue"]
        );

        let properties = vertex_properties(PointSchema::XyzColor);
        assert_eq!(properties[2].data_type, PlyDataType::Float32);
        assert_eq!(properties[3].data_type, PlyDataType::UInt8);
    }

    #[test]
    fn test_schema_from_properties() -> Result<(), PlyError> {
        for schema in [
            PointSchema::Xyz,
            PointSchema::XyzNormal,
            PointSchema::XyzColor,
            PointSchema::XyzNormalColor,
        ] {
            assert_eq!(schema_from_properties(&vertex_properties(schema))?, schema);
        }

        // colors before normals is not a layout we write
        let mut properties = vertex_properties(PointSchema::XyzColor);
        properties.extend(vertex_properties(PointSchema::XyzNormal).split_off(3));
        assert!(matches!(
            schema_from_properties(&properties),
            Err(PlyError::UnsupportedProperty(_))
        ));

        Ok(())
    }

    #[test]
    fn test_data_type_names() -> Result<(), PlyError> {
        for data_type in [
            PlyDataType::Float32,
            PlyDataType::Float64,
            PlyDataType::Int8,
            PlyDataType::UInt8,
            PlyDataType::Int16,
            PlyDataType::UInt16,
            PlyDataType::Int32,
            PlyDataType::UInt32,
        ] {
            assert_eq!(PlyDataType::parse(data_type.name())?, data_type);
        }
        assert_eq!(PlyDataType::parse("uint8")?, PlyDataType::UInt8);
        assert!(PlyDataType::parse("half").is_err());

        Ok(())
    }
}
