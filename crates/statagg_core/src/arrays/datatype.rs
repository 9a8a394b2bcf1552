use std::fmt;

/// Identifier for a data type without any associated metadata.
///
/// Used in function signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataTypeId {
    Int32,
    Int64,
    Float32,
    Float64,
    Struct,
}

impl fmt::Display for DataTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int32 => write!(f, "Int32"),
            Self::Int64 => write!(f, "Int64"),
            Self::Float32 => write!(f, "Float32"),
            Self::Float64 => write!(f, "Float64"),
            Self::Struct => write!(f, "Struct"),
        }
    }
}

/// Metadata for a struct type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructTypeMeta {
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataType {
    Int64,
    Float64,
    Struct(StructTypeMeta),
}

impl DataType {
    pub const fn datatype_id(&self) -> DataTypeId {
        match self {
            Self::Int64 => DataTypeId::Int64,
            Self::Float64 => DataTypeId::Float64,
            Self::Struct(_) => DataTypeId::Struct,
        }
    }

    /// Get the struct fields if this is a struct type.
    pub fn struct_fields(&self) -> Option<&[Field]> {
        match self {
            Self::Struct(meta) => Some(&meta.fields),
            _ => None,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Struct(meta) => {
                write!(f, "Struct {{")?;
                for (idx, field) in meta.fields.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, " {}: {}", field.name, field.datatype)?;
                }
                write!(f, " }}")
            }
            other => write!(f, "{}", other.datatype_id()),
        }
    }
}

/// A named, typed field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub datatype: DataType,
    pub nullable: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, datatype: DataType, nullable: bool) -> Self {
        Field {
            name: name.into(),
            datatype,
            nullable,
        }
    }
}
