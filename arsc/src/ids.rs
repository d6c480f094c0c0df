//! Resource identifier arithmetic and the reserved names used inside
//! complex `attr` entries.
//!
//! A resource identifier packs `(package, type, entry)` into 32 bits as
//! `((package + 1) << 24) | (((type + 1) & 0xff) << 16) | (entry & 0xffff)`;
//! zero is reserved.

pub const ENTRY_FLAG_COMPLEX: u16 = 0x0001;
pub const ENTRY_FLAG_PUBLIC: u16 = 0x0002;

pub fn is_complex_entry(flags: u16) -> bool {
    flags & ENTRY_FLAG_COMPLEX != 0
}

pub fn is_public_entry(flags: u16) -> bool {
    flags & ENTRY_FLAG_PUBLIC != 0
}

pub fn make_id(package: u32, ty: u32, entry: u32) -> u32 {
    ((package.wrapping_add(1) & 0xff) << 24) | ((ty.wrapping_add(1) & 0xff) << 16) | (entry & 0xffff)
}

pub fn get_package(id: u32) -> u32 {
    (id >> 24).wrapping_sub(1)
}

pub fn get_type(id: u32) -> u32 {
    ((id >> 16) & 0xff).wrapping_sub(1)
}

pub fn get_entry(id: u32) -> u32 {
    id & 0xffff
}

/// Internal ids carry reserved names such as [`ATTR_TYPE`] and the plural
/// quantities; their type byte is zero.
pub fn is_internal_id(id: u32) -> bool {
    (id & 0xffff_0000) != 0 && (id & 0x00ff_0000) == 0
}

/// Array entries name their elements by index with the top half `0x0002`.
pub fn is_array_id(id: u32) -> bool {
    (id & 0xffff_0000) == 0x0200_0000
}

// Special values for 'name' when defining attribute resources.

/// Holds the attribute's type code.
pub const ATTR_TYPE: u32 = 0x0100_0000;
/// For integral attributes, the minimum value it can hold.
pub const ATTR_MIN: u32 = 0x0100_0001;
/// For integral attributes, the maximum value it can hold.
pub const ATTR_MAX: u32 = 0x0100_0002;
/// Localization of this resource can be encouraged or required.
pub const ATTR_L10N: u32 = 0x0100_0003;
// Plural quantity names.
pub const ATTR_OTHER: u32 = 0x0100_0004;
pub const ATTR_ZERO: u32 = 0x0100_0005;
pub const ATTR_ONE: u32 = 0x0100_0006;
pub const ATTR_TWO: u32 = 0x0100_0007;
pub const ATTR_FEW: u32 = 0x0100_0008;
pub const ATTR_MANY: u32 = 0x0100_0009;

// Bit mask of allowed types, for use with ATTR_TYPE.
pub const ATTR_TYPE_ANY: u32 = 0x0000_ffff;
pub const ATTR_TYPE_REFERENCE: u32 = 1;
pub const ATTR_TYPE_STRING: u32 = 1 << 1;
pub const ATTR_TYPE_INTEGER: u32 = 1 << 2;
pub const ATTR_TYPE_BOOLEAN: u32 = 1 << 3;
pub const ATTR_TYPE_COLOR: u32 = 1 << 4;
pub const ATTR_TYPE_FLOAT: u32 = 1 << 5;
pub const ATTR_TYPE_DIMENSION: u32 = 1 << 6;
pub const ATTR_TYPE_FRACTION: u32 = 1 << 7;
pub const ATTR_TYPE_ENUM: u32 = 1 << 16;
pub const ATTR_TYPE_FLAGS: u32 = 1 << 17;

// Enum of localization modes, for use with ATTR_L10N.
pub const ATTR_L10N_NOT_REQUIRED: u32 = 0;
pub const ATTR_L10N_SUGGESTED: u32 = 1;

const ALLOWED_TYPE_NAMES: [(u32, &str); 8] = [
    (ATTR_TYPE_REFERENCE, "reference"),
    (ATTR_TYPE_STRING, "string"),
    (ATTR_TYPE_INTEGER, "integer"),
    (ATTR_TYPE_BOOLEAN, "boolean"),
    (ATTR_TYPE_COLOR, "color"),
    (ATTR_TYPE_FLOAT, "float"),
    (ATTR_TYPE_DIMENSION, "dimension"),
    (ATTR_TYPE_FRACTION, "fraction"),
];

/// Renders an `ATTR_TYPE` bitmask as `|`-joined names, with the `any`,
/// `enum` and `flags` special cases.
pub fn format_allowed_types(mask: u32) -> String {
    match mask {
        ATTR_TYPE_ANY => "any".to_string(),
        ATTR_TYPE_ENUM => "enum".to_string(),
        ATTR_TYPE_FLAGS => "flags".to_string(),
        _ => {
            let mut out = String::new();
            for (bit, name) in ALLOWED_TYPE_NAMES {
                if mask & bit != 0 {
                    if !out.is_empty() {
                        out.push('|');
                    }
                    out.push_str(name);
                }
            }
            out
        }
    }
}

/// Name for one of the plural quantity ids, if it is one.
pub fn quantity_name(id: u32) -> Option<&'static str> {
    Some(match id {
        ATTR_OTHER => "other",
        ATTR_ZERO => "zero",
        ATTR_ONE => "one",
        ATTR_TWO => "two",
        ATTR_FEW => "few",
        ATTR_MANY => "many",
        _ => return None,
    })
}
