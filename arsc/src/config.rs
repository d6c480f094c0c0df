use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Read;

/// The 32-byte tuple of device qualifiers that selects which entries of a
/// resource type apply. Two configurations are equal iff all fields are.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ResourceConfig {
    pub mcc: u16,
    pub mnc: u16,
    /// Two-character language code, empty when unset.
    pub language: String,
    /// Two-character country code, empty when unset.
    pub country: String,
    pub orientation: u8,
    pub touchscreen: u8,
    pub density: u16,
    pub keyboard: u8,
    pub navigation: u8,
    pub input_flags: u8,
    pub screen_width: u16,
    pub screen_height: u16,
    pub sdk_version: u16,
    pub minor_version: u16,
    pub screen_layout: u8,
    pub ui_mode: u8,
}

impl ResourceConfig {
    /// Reads the fixed 32-byte configuration block. The leading size field
    /// is consumed but newer trailing fields beyond 32 bytes are left to
    /// the caller's header-padding skip.
    pub fn read(r: &mut (impl Read + ?Sized)) -> std::io::Result<Self> {
        let _size = r.read_u32::<LittleEndian>()?;
        let mcc = r.read_u16::<LittleEndian>()?;
        let mnc = r.read_u16::<LittleEndian>()?;
        let language = read_packed_chars(r)?;
        let country = read_packed_chars(r)?;
        let orientation = r.read_u8()?;
        let touchscreen = r.read_u8()?;
        let density = r.read_u16::<LittleEndian>()?;
        let keyboard = r.read_u8()?;
        let navigation = r.read_u8()?;
        let input_flags = r.read_u8()?;
        let _input_pad = r.read_u8()?;
        let screen_width = r.read_u16::<LittleEndian>()?;
        let screen_height = r.read_u16::<LittleEndian>()?;
        let sdk_version = r.read_u16::<LittleEndian>()?;
        let minor_version = r.read_u16::<LittleEndian>()?;
        let screen_layout = r.read_u8()?;
        let ui_mode = r.read_u8()?;
        let _pad1 = r.read_u8()?;
        let _pad2 = r.read_u8()?;
        Ok(Self {
            mcc,
            mnc,
            language,
            country,
            orientation,
            touchscreen,
            density,
            keyboard,
            navigation,
            input_flags,
            screen_width,
            screen_height,
            sdk_version,
            minor_version,
            screen_layout,
            ui_mode,
        })
    }

    /// True for the default configuration that matches every device.
    pub fn is_default(&self) -> bool {
        self.language.is_empty()
            && self.country.is_empty()
            && (self.mcc as u32
                | self.mnc as u32
                | self.orientation as u32
                | self.touchscreen as u32
                | self.density as u32
                | self.keyboard as u32
                | self.navigation as u32
                | self.input_flags as u32
                | self.screen_width as u32
                | self.screen_height as u32
                | self.sdk_version as u32
                | self.screen_layout as u32
                | self.ui_mode as u32)
                == 0
    }

    pub fn density_qualifier(&self) -> String {
        match self.density {
            0xffff => "nodpi".to_string(),
            120 => "ldpi".to_string(),
            160 => "mdpi".to_string(),
            240 => "hdpi".to_string(),
            320 => "xhdpi".to_string(),
            other => other.to_string(),
        }
    }

    pub fn orientation_qualifier(&self) -> String {
        match self.orientation {
            1 => "port".to_string(),
            2 => "land".to_string(),
            other => other.to_string(),
        }
    }
}

fn read_packed_chars(r: &mut (impl Read + ?Sized)) -> std::io::Result<String> {
    let mut raw = [0u8; 2];
    r.read_exact(&mut raw)?;
    Ok(raw
        .iter()
        .filter(|&&b| b != 0)
        .map(|&b| b as char)
        .collect())
}
