// color.rs
use std::fmt;
use std::str::FromStr;

use rand::Rng;

use crate::error::ParseColorError;

/// 24-bit RGB color sent to bulbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Color {
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Builds a color from the low 24 bits of `value`.
    pub const fn from_u32(value: u32) -> Self {
        Self::new(
            ((value >> 16) & 0xFF) as u8,
            ((value >> 8) & 0xFF) as u8,
            (value & 0xFF) as u8,
        )
    }

    /// Each channel is drawn from `0..255`, so 255 itself never comes up.
    pub fn random() -> Self {
        let mut rng = rand::thread_rng();
        Self::new(
            rng.gen_range(0..255),
            rng.gen_range(0..255),
            rng.gen_range(0..255),
        )
    }

    /// Parses `text` as a base-16 number rather than as fixed-width digit
    /// pairs: `"00FF"` is pure blue, not red with a trailing `FF`.
    pub fn from_hex(text: &str) -> Result<Self, ParseColorError> {
        // from_str_radix tolerates a leading sign, hex colors don't.
        if text.is_empty() || !text.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ParseColorError::InvalidDigit(text.to_string()));
        }

        let value = u32::from_str_radix(text, 16).map_err(|source| ParseColorError::Overflow {
            input: text.to_string(),
            source,
        })?;

        Ok(Self::from_u32(value))
    }

    pub fn to_hex(&self) -> String {
        format!("{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
    }
}

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.to_hex())
    }
}
