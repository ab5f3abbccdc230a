//! RGB colours with a fixed table of named colours.
//!
//! Colours are written either as `#RRGGBB` or as one of the names in
//! [`NAMED_COLORS`]. When rendering, the first table entry whose value matches
//! exactly wins, so canonical names are listed before their aliases
//! (`cyan` before `aqua`, `gray` before `grey`).

use std::fmt;

/// A 24-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Name → value table consulted by [`Color::parse`] and [`Color::name`].
pub const NAMED_COLORS: &[(&str, Color)] = &[
    ("black", Color::rgb(0x00, 0x00, 0x00)),
    ("white", Color::rgb(0xFF, 0xFF, 0xFF)),
    ("red", Color::rgb(0xFF, 0x00, 0x00)),
    ("lime", Color::rgb(0x00, 0xFF, 0x00)),
    ("blue", Color::rgb(0x00, 0x00, 0xFF)),
    ("yellow", Color::rgb(0xFF, 0xFF, 0x00)),
    ("cyan", Color::rgb(0x00, 0xFF, 0xFF)),
    ("magenta", Color::rgb(0xFF, 0x00, 0xFF)),
    ("silver", Color::rgb(0xC0, 0xC0, 0xC0)),
    ("gray", Color::rgb(0x80, 0x80, 0x80)),
    ("maroon", Color::rgb(0x80, 0x00, 0x00)),
    ("olive", Color::rgb(0x80, 0x80, 0x00)),
    ("green", Color::rgb(0x00, 0x80, 0x00)),
    ("purple", Color::rgb(0x80, 0x00, 0x80)),
    ("teal", Color::rgb(0x00, 0x80, 0x80)),
    ("navy", Color::rgb(0x00, 0x00, 0x80)),
    ("orange", Color::rgb(0xFF, 0xA5, 0x00)),
    ("brown", Color::rgb(0xA5, 0x2A, 0x2A)),
    ("pink", Color::rgb(0xFF, 0xC0, 0xCB)),
    // Aliases: never chosen when rendering.
    ("aqua", Color::rgb(0x00, 0xFF, 0xFF)),
    ("fuchsia", Color::rgb(0xFF, 0x00, 0xFF)),
    ("grey", Color::rgb(0x80, 0x80, 0x80)),
];

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Packs the colour as `0xRRGGBB`.
    pub fn packed(self) -> u32 {
        (u32::from(self.r) << 16) | (u32::from(self.g) << 8) | u32::from(self.b)
    }

    /// Parses `#RRGGBB` or a table name (case-insensitive).
    ///
    /// Returns `None` when the text is neither.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if let Some(hex) = text.strip_prefix('#') {
            if hex.len() != 6 || !hex.is_ascii() {
                return None;
            }
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
            return Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?));
        }
        NAMED_COLORS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(text))
            .map(|(_, color)| *color)
    }

    /// Returns the canonical table name for this exact value, if any.
    pub fn name(self) -> Option<&'static str> {
        NAMED_COLORS
            .iter()
            .find(|(_, color)| *color == self)
            .map(|(name, _)| *name)
    }

    /// Formats as `#RRGGBB` regardless of any table name.
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => f.write_str(&self.to_hex()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_literal() {
        assert_eq!(Color::parse("#1A2b3C"), Some(Color::rgb(0x1A, 0x2B, 0x3C)));
    }

    #[test]
    fn test_parse_name_is_case_insensitive() {
        assert_eq!(Color::parse("White"), Some(Color::rgb(0xFF, 0xFF, 0xFF)));
    }

    #[test]
    fn test_parse_rejects_short_hex_and_unknown_names() {
        assert_eq!(Color::parse("#FFF"), None);
        assert_eq!(Color::parse("#GGGGGG"), None);
        assert_eq!(Color::parse("chartreuse-ish"), None);
    }

    #[test]
    fn test_display_prefers_canonical_name() {
        assert_eq!(Color::rgb(0x00, 0xFF, 0xFF).to_string(), "cyan");
        assert_eq!(Color::rgb(0x80, 0x80, 0x80).to_string(), "gray");
    }

    #[test]
    fn test_display_falls_back_to_hex() {
        assert_eq!(Color::rgb(0x12, 0x34, 0x56).to_string(), "#123456");
    }

    #[test]
    fn test_packed_orders_channels() {
        assert_eq!(Color::rgb(0x01, 0x02, 0x03).packed(), 0x010203);
    }
}
