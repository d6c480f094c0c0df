use crate::pool::StringPool;
use crate::{Error, Result};

/// The kinds of data a typed value record can carry.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum ValueType {
    /// Contains no data.
    Null = 0x00,
    /// A reference to another resource table entry.
    Reference = 0x01,
    /// An attribute resource identifier.
    Attribute = 0x02,
    /// An index into the containing resource table's global string pool.
    String = 0x03,
    /// A single-precision floating point number.
    Float = 0x04,
    /// A complex number encoding a dimension value, such as "100in".
    Dimension = 0x05,
    /// A complex number encoding a fraction of a container.
    Fraction = 0x06,
    IntDec = 0x10,
    IntHex = 0x11,
    IntBoolean = 0x12,
    IntColorArgb8 = 0x1c,
    IntColorRgb8 = 0x1d,
    IntColorArgb4 = 0x1e,
    IntColorRgb4 = 0x1f,
}

impl ValueType {
    pub fn from_u8(ty: u8) -> Option<Self> {
        Some(match ty {
            x if x == Self::Null as u8 => Self::Null,
            x if x == Self::Reference as u8 => Self::Reference,
            x if x == Self::Attribute as u8 => Self::Attribute,
            x if x == Self::String as u8 => Self::String,
            x if x == Self::Float as u8 => Self::Float,
            x if x == Self::Dimension as u8 => Self::Dimension,
            x if x == Self::Fraction as u8 => Self::Fraction,
            x if x == Self::IntDec as u8 => Self::IntDec,
            x if x == Self::IntHex as u8 => Self::IntHex,
            x if x == Self::IntBoolean as u8 => Self::IntBoolean,
            x if x == Self::IntColorArgb8 as u8 => Self::IntColorArgb8,
            x if x == Self::IntColorRgb8 as u8 => Self::IntColorRgb8,
            x if x == Self::IntColorArgb4 as u8 => Self::IntColorArgb4,
            x if x == Self::IntColorRgb4 as u8 => Self::IntColorRgb4,
            _ => return None,
        })
    }
}

const COMPLEX_MANTISSA_MASK: u32 = 0xffff_ff00;
const COMPLEX_RADIX_SHIFT: u32 = 4;
const COMPLEX_RADIX_MASK: u32 = 0x3;
const COMPLEX_UNIT_MASK: u32 = 0xf;

const DIMENSION_UNITS: [&str; 6] = ["px", "dp", "sp", "pt", "in", "mm"];
const FRACTION_UNITS: [&str; 2] = ["%", "%p"];

const MANTISSA_MULT: f64 = 1.0 / 256.0;
const RADIX_MULTS: [f64; 4] = [
    MANTISSA_MULT,
    1.0 / (1 << 7) as f64 * MANTISSA_MULT,
    1.0 / (1 << 15) as f64 * MANTISSA_MULT,
    1.0 / (1 << 23) as f64 * MANTISSA_MULT,
];

/// The 8-byte typed value record. `size` is always 8 and `res0` always 0,
/// so only the type tag and the four data bytes are carried; the data
/// bytes are kept verbatim so an edit can be compared bit-exactly against
/// the bytes on disk.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ResourceValue {
    pub data_type: u8,
    pub data: [u8; 4],
}

impl ResourceValue {
    /// On-disk size of the record, including the size/res0/type prefix.
    pub const SIZE: u16 = 8;

    pub fn new(data_type: u8, data: [u8; 4]) -> Self {
        Self { data_type, data }
    }

    pub fn int_value(&self) -> u32 {
        u32::from_le_bytes(self.data)
    }

    pub fn float_value(&self) -> f32 {
        f32::from_bits(self.int_value())
    }

    /// Booleans are read permissively: any nonzero byte pattern is true.
    /// The canonical encoding of true differs across platform versions.
    pub fn bool_value(&self) -> bool {
        self.data.iter().any(|&b| b != 0)
    }

    fn complex_to_float(&self) -> f32 {
        let value = self.int_value();
        let mantissa = (value & COMPLEX_MANTISSA_MASK) as i32;
        let radix = ((value >> COMPLEX_RADIX_SHIFT) & COMPLEX_RADIX_MASK) as usize;
        (mantissa as f64 * RADIX_MULTS[radix]) as f32
    }

    fn dimension_unit(&self) -> &'static str {
        DIMENSION_UNITS
            .get((self.int_value() & COMPLEX_UNIT_MASK) as usize)
            .copied()
            .unwrap_or("")
    }

    fn fraction_unit(&self) -> &'static str {
        FRACTION_UNITS
            .get((self.int_value() & COMPLEX_UNIT_MASK) as usize)
            .copied()
            .unwrap_or("")
    }

    pub fn type_name(&self) -> String {
        match ValueType::from_u8(self.data_type) {
            Some(ty) => format!("{:?}", ty),
            None => format!("Unknown({:#x})", self.data_type),
        }
    }

    /// Renders the value for human-readable output. String-typed values
    /// look up the given pool; an absent pool or index renders empty.
    pub fn format(&self, pool: Option<&StringPool>) -> String {
        match ValueType::from_u8(self.data_type) {
            Some(ValueType::Null) => String::new(),
            Some(ValueType::Reference) => {
                if self.int_value() == 0 {
                    "@null".to_string()
                } else {
                    format!("@{:#010x}", self.int_value())
                }
            }
            Some(ValueType::Attribute) => format!("?{:#010x}", self.int_value()),
            Some(ValueType::String) => pool
                .and_then(|p| p.get(self.int_value() as i32))
                .unwrap_or_default()
                .to_string(),
            Some(ValueType::Float) => format!("{}", self.float_value()),
            Some(ValueType::Dimension) => {
                format!("{:.2}{}", self.complex_to_float(), self.dimension_unit())
            }
            Some(ValueType::Fraction) => {
                format!("{:.2}{}", self.complex_to_float() * 100.0, self.fraction_unit())
            }
            Some(ValueType::IntDec) => format!("{}", self.int_value() as i32),
            Some(ValueType::IntHex) => format!("{:#x}", self.int_value()),
            Some(ValueType::IntBoolean) => format!("{}", self.bool_value()),
            Some(ValueType::IntColorArgb8) | Some(ValueType::IntColorArgb4) => {
                format!("#{:08x}", self.int_value())
            }
            Some(ValueType::IntColorRgb8) | Some(ValueType::IntColorRgb4) => {
                format!("#{:06x}", self.int_value())
            }
            None => {
                tracing::warn!("unknown value data type {:#x}", self.data_type);
                format!("{:#x}", self.int_value())
            }
        }
    }
}

/// Derives the typed-value kind from an edit pattern name. Only boolean
/// and ARGB8 color resources can be patched.
pub fn type_from_pattern(name: &str) -> Result<ValueType> {
    if name.starts_with("R.bool.") {
        Ok(ValueType::IntBoolean)
    } else if name.starts_with("R.color.") {
        Ok(ValueType::IntColorArgb8)
    } else {
        Err(Error::Argument(format!("unsupported resource pattern {name}")))
    }
}

/// Encodes a replacement value as the full 8-byte record `{size=8, res0=0,
/// dataType, data}`. The first four bytes double as the guard the patcher
/// compares against the bytes on disk before overwriting the data field.
pub fn encode_patch(name: &str, value: &str) -> Result<[u8; 8]> {
    let ty = type_from_pattern(name)?;
    let data = match ty {
        ValueType::IntBoolean => parse_bool(value)?,
        ValueType::IntColorArgb8 => parse_color(value)?,
        _ => unreachable!(),
    };
    let mut out = [0u8; 8];
    out[..2].copy_from_slice(&ResourceValue::SIZE.to_le_bytes());
    out[2] = 0; // res0
    out[3] = ty as u8;
    out[4..].copy_from_slice(&data.to_le_bytes());
    Ok(out)
}

fn parse_bool(value: &str) -> Result<u32> {
    match value {
        "true" => Ok(0xffff_ffff),
        "false" => Ok(0),
        _ => Err(Error::Argument(format!("expected true or false, got {value}"))),
    }
}

fn parse_color(value: &str) -> Result<u32> {
    let digits = value
        .strip_prefix('#')
        .filter(|d| d.len() == 8)
        .ok_or_else(|| Error::Argument(format!("expected #AARRGGBB, got {value}")))?;
    u32::from_str_radix(digits, 16)
        .map_err(|_| Error::Argument(format!("expected #AARRGGBB, got {value}")))
}
