//! Quantity descriptors and the element types they declare

use std::fmt;

use serde::Serialize;

/// On-disk element type of a quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    /// Signed int (1 byte)
    I8,
    /// Unsigned int (1 byte)
    U8,
    /// Signed int (2 bytes)
    I16,
    /// Unsigned int (2 bytes)
    U16,
    /// Signed int (4 bytes)
    I32,
    /// Unsigned int (4 bytes)
    U32,
    /// Signed int (8 bytes)
    I64,
    /// Unsigned int (8 bytes)
    U64,
    /// Single precision float (4 bytes)
    F32,
    /// Double precision float (8 bytes)
    F64,
}

impl ElementKind {
    /// Size in bytes of one element
    pub const fn width(self) -> usize {
        match self {
            Self::I8 | Self::U8 => 1,
            Self::I16 | Self::U16 => 2,
            Self::I32 | Self::U32 | Self::F32 => 4,
            Self::I64 | Self::U64 | Self::F64 => 8,
        }
    }

    /// Look up a type tag as written in the `.info` companion (case-insensitive)
    pub fn from_tag(tag: &str) -> Option<Self> {
        let kind = match tag.to_ascii_lowercase().as_str() {
            "double" => Self::F64,
            "float" => Self::F32,
            "longlong" => Self::I64,
            "ulonglong" => Self::U64,
            "int" | "long" => Self::I32,
            "uint" | "ulong" => Self::U32,
            "short" => Self::I16,
            "ushort" => Self::U16,
            "char" => Self::I8,
            "uchar" => Self::U8,
            _ => return None,
        };
        Some(kind)
    }

    pub const fn is_float(self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::I8 => "i8",
            Self::U8 => "u8",
            Self::I16 => "i16",
            Self::U16 => "u16",
            Self::I32 => "i32",
            Self::U32 => "u32",
            Self::I64 => "i64",
            Self::U64 => "u64",
            Self::F32 => "f32",
            Self::F64 => "f64",
        };
        f.pad(name)
    }
}

/// Byte order of the values in the data region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ByteOrder {
    #[default]
    LittleEndian,
    BigEndian,
}

impl ByteOrder {
    /// Parse the `File.ByteOrder` attribute (case-insensitive)
    pub fn from_attribute(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "littleendian" => Some(Self::LittleEndian),
            "bigendian" => Some(Self::BigEndian),
            _ => None,
        }
    }

    /// Byte-order flag as stored in the binary ERG header
    pub const fn header_flag(self) -> u8 {
        match self {
            Self::LittleEndian => 0,
            Self::BigEndian => 1,
        }
    }
}

/// One declared column of an ERG file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Quantity {
    /// Name, unique within the file
    pub name: String,
    /// Physical unit, empty when none is declared
    pub unit: String,
    /// Type tag exactly as declared (e.g. `Double`)
    pub type_tag: String,
    /// Decoded element type
    pub kind: ElementKind,
    /// Byte offset from the start of the record payload
    pub offset: usize,
}

impl Quantity {
    /// Size in bytes of one element
    pub fn width(&self) -> usize {
        self.kind.width()
    }
}
