/// A decoded string pool: the shared, indexed table of strings that the
/// rest of the file references by integer index, plus the span styles that
/// annotate rich-text strings.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct StringPool {
    strings: Vec<String>,
    styles: Vec<Style>,
}

impl StringPool {
    pub const SORTED_FLAG: u32 = 1 << 0;
    pub const UTF8_FLAG: u32 = 1 << 8;

    pub fn new(strings: Vec<String>, styles: Vec<Style>) -> Self {
        Self { strings, styles }
    }

    /// Looks up a string by pool index. Indices of `-1` and out-of-range
    /// indices are absent, not errors; the format uses `-1` pervasively to
    /// mean "no string".
    pub fn get(&self, index: i32) -> Option<&str> {
        if index < 0 {
            return None;
        }
        self.strings.get(index as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    pub fn styles(&self) -> &[Style] {
        &self.styles
    }
}

/// One span style record. `name` is the pool index of the XML tag that
/// defined the span; `first_char`/`last_char` delimit the character range
/// the span applies to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Style {
    pub name: u32,
    pub first_char: u32,
    pub last_char: u32,
}

impl Style {
    /// Sentinel name value terminating an array of spans.
    pub const END: u32 = 0xFFFF_FFFF;
}
