//! Fixture writer for ERG data files and their `.info` companions
//!
//! Values are deterministic: record `r` of quantity `i` holds
//! `r + i / 2`, which every supported type represents exactly for the
//! record counts used here.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use erg::ByteOrder;

/// One `File.At.<n>` entry
#[derive(Debug, Clone)]
pub struct Field {
    /// `None` for padding entries
    pub name: Option<String>,
    pub tag: String,
    pub unit: String,
}

impl Field {
    pub fn new(name: &str, tag: &str, unit: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            tag: tag.to_string(),
            unit: unit.to_string(),
        }
    }

    pub fn padding(bytes: usize) -> Self {
        Self {
            name: None,
            tag: format!("{bytes} Bytes"),
            unit: String::new(),
        }
    }

    fn width(&self) -> usize {
        match self.tag.to_ascii_lowercase().as_str() {
            "double" | "longlong" | "ulonglong" => 8,
            "float" | "int" | "uint" | "long" | "ulong" => 4,
            "short" | "ushort" => 2,
            "char" | "uchar" => 1,
            padding => padding
                .trim_end_matches("bytes")
                .trim()
                .parse()
                .unwrap_or(0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Erg,
    Fortran,
}

/// Where the companion is written relative to the data file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompanionName {
    /// `run.erg.info`
    Appended,
    /// `run.info`
    Stem,
    None,
}

#[derive(Debug, Clone)]
pub struct Fixture {
    pub fields: Vec<Field>,
    pub format: Format,
    pub order: ByteOrder,
    pub records: usize,
    pub companion: CompanionName,
    /// Extra companion lines appended verbatim
    pub extra_info: String,
}

/// The twelve quantities of the reference recording
pub fn sample_fields() -> Vec<Field> {
    vec![
        Field::new("Data_8", "Double", "s"),
        Field::new("Data_1", "Float", "m"),
        Field::new("Data_2", "Float", "rad/s"),
        Field::new("Data_3", "Float", "Nm"),
        Field::new("Data_4", "Float", ""),
        Field::new("UserOut_00", "Float", ""),
        Field::new("UserOut_01", "Float", ""),
        Field::new("UserOut_02", "Float", ""),
        Field::new("Data_5", "Float", "m/s"),
        Field::new("Data_6", "Float", "m/s"),
        Field::new("Data_7", "Float", "m/s^2"),
        Field::new("Data_9", "Float", ""),
    ]
}

pub const SAMPLE_NAMES: [&str; 12] = [
    "Data_8",
    "Data_1",
    "Data_2",
    "Data_3",
    "Data_4",
    "UserOut_00",
    "UserOut_01",
    "UserOut_02",
    "Data_5",
    "Data_6",
    "Data_7",
    "Data_9",
];

pub const SAMPLE_UNITS: [&str; 12] = [
    "s", "m", "rad/s", "Nm", "", "", "", "", "m/s", "m/s", "m/s^2", "",
];

/// Expected value of quantity `index` (padding not counted) at `record`
pub fn value(record: usize, index: usize) -> f64 {
    record as f64 + index as f64 / 2.0
}

impl Fixture {
    pub fn new(fields: Vec<Field>, records: usize) -> Self {
        Self {
            fields,
            format: Format::Erg,
            order: ByteOrder::LittleEndian,
            records,
            companion: CompanionName::Appended,
            extra_info: String::new(),
        }
    }

    pub fn sample(records: usize) -> Self {
        Self::new(sample_fields(), records)
    }

    pub fn format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    pub fn order(mut self, order: ByteOrder) -> Self {
        self.order = order;
        self
    }

    pub fn companion(mut self, companion: CompanionName) -> Self {
        self.companion = companion;
        self
    }

    pub fn extra_info(mut self, lines: &str) -> Self {
        self.extra_info = lines.to_string();
        self
    }

    pub fn payload_size(&self) -> usize {
        self.fields.iter().map(Field::width).sum()
    }

    /// Write `<dir>/<name>` and its companion, returning the data path
    pub fn write(&self, dir: &Path, name: &str) -> PathBuf {
        let data_path = dir.join(name);
        fs::write(&data_path, self.data()).expect("write data file");

        let info_path = match self.companion {
            CompanionName::Appended => {
                let mut path = data_path.as_os_str().to_owned();
                path.push(".info");
                Some(PathBuf::from(path))
            }
            CompanionName::Stem => Some(data_path.with_extension("info")),
            CompanionName::None => None,
        };
        if let Some(info_path) = info_path {
            fs::write(info_path, self.info()).expect("write companion");
        }
        data_path
    }

    pub fn info(&self) -> String {
        let format = match self.format {
            Format::Erg => "erg",
            Format::Fortran => "FORTRAN_Binary_Data",
        };
        let order = match self.order {
            ByteOrder::LittleEndian => "LittleEndian",
            ByteOrder::BigEndian => "BigEndian",
        };

        let mut text = format!(
            "#INFOFILE1.1 - Do not remove this line!\n\
             File.Format = {format}\n\
             File.ByteOrder = {order}\n"
        );
        for (position, field) in self.fields.iter().enumerate() {
            let n = position + 1;
            if let Some(name) = &field.name {
                text.push_str(&format!("File.At.{n}.Name = {name}\n"));
            }
            text.push_str(&format!("File.At.{n}.Type = {}\n", field.tag));
        }
        for field in &self.fields {
            if let Some(name) = &field.name {
                if !field.unit.is_empty() {
                    text.push_str(&format!("Quantity.{name}.Unit = {}\n", field.unit));
                }
            }
        }
        text.push_str(&self.extra_info);
        text
    }

    pub fn data(&self) -> Vec<u8> {
        let payload = self.payload_size();
        let mut data = match self.format {
            Format::Erg => {
                let mut header = Vec::with_capacity(16 + payload * self.records);
                header.extend_from_slice(b"CM-ERG\0\0");
                header.push(1);
                header.push(self.order.header_flag());
                header.extend_from_slice(&self.u16_bytes(payload as u16));
                header.extend_from_slice(&[0; 4]);
                header
            }
            Format::Fortran => Vec::with_capacity((payload + 8) * self.records),
        };

        for record in 0..self.records {
            if self.format == Format::Fortran {
                data.extend_from_slice(&self.u32_bytes(payload as u32));
            }
            let mut index = 0;
            for field in &self.fields {
                if field.name.is_none() {
                    data.extend(std::iter::repeat_n(0xAAu8, field.width()));
                    continue;
                }
                self.encode(&mut data, &field.tag, value(record, index));
                index += 1;
            }
            if self.format == Format::Fortran {
                data.extend_from_slice(&self.u32_bytes(payload as u32));
            }
        }
        data
    }

    fn encode(&self, out: &mut Vec<u8>, tag: &str, value: f64) {
        let big = self.order == ByteOrder::BigEndian;
        macro_rules! push {
            ($v:expr) => {
                if big {
                    out.extend_from_slice(&$v.to_be_bytes())
                } else {
                    out.extend_from_slice(&$v.to_le_bytes())
                }
            };
        }
        match tag.to_ascii_lowercase().as_str() {
            "double" => push!(value),
            "float" => push!(value as f32),
            "longlong" => push!(value as i64),
            "ulonglong" => push!(value as u64),
            "int" | "long" => push!(value as i32),
            "uint" | "ulong" => push!(value as u32),
            "short" => push!(value as i16),
            "ushort" => push!(value as u16),
            "char" => push!(value as i8),
            "uchar" => push!(value as u8),
            other => panic!("fixture cannot encode {other}"),
        }
    }

    fn u16_bytes(&self, value: u16) -> [u8; 2] {
        match self.order {
            ByteOrder::LittleEndian => value.to_le_bytes(),
            ByteOrder::BigEndian => value.to_be_bytes(),
        }
    }

    fn u32_bytes(&self, value: u32) -> [u8; 4] {
        match self.order {
            ByteOrder::LittleEndian => value.to_le_bytes(),
            ByteOrder::BigEndian => value.to_be_bytes(),
        }
    }
}
