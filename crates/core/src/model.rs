//! Canonical color-map model.
//!
//! Every codec parses into [`ColorMap`] and serializes out of it. Entries
//! keep their file order: downstream ramp rendering interprets consecutive
//! pairs as interpolation segments, so the model never re-sorts.

use crate::color::rgb_to_hex;
use crate::error::Result;

/// A single color point: a ramp stop or a role color.
///
/// Ramp members carry a defined `value`; role colors (background,
/// foreground, nodata) may not, and a `None` value never participates in
/// ramp ordering or pairing.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorEntry {
    /// Position on the ramp axis, `None` for role-only or recovered entries.
    pub value: Option<f64>,
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    /// Passed through verbatim; no range is enforced beyond the source.
    pub opacity: Option<f64>,
    /// Free text, independent of opacity.
    pub label: Option<String>,
}

impl ColorEntry {
    pub const fn new(value: Option<f64>, red: u8, green: u8, blue: u8) -> Self {
        Self {
            value,
            red,
            green,
            blue,
            opacity: None,
            label: None,
        }
    }

    /// Build an entry from a hex color string, tolerating a leading `#`.
    pub fn from_hex(
        value: Option<f64>,
        hex: &str,
        opacity: Option<f64>,
        label: Option<String>,
    ) -> Result<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let (red, green, blue) = crate::color::hex_to_rgb(hex)?;
        Ok(Self {
            value,
            red,
            green,
            blue,
            opacity,
            label,
        })
    }

    /// Whether this entry has a position on the ramp axis.
    pub const fn has_value(&self) -> bool {
        self.value.is_some()
    }

    /// The color as six lowercase hex digits, no leading `#`.
    pub fn color_hex(&self) -> String {
        rgb_to_hex(self.red as i64, self.green as i64, self.blue as i64)
    }

    pub const fn color_tuple(&self) -> (u8, u8, u8) {
        (self.red, self.green, self.blue)
    }
}

/// The canonical aggregate: an ordered ramp plus optional role colors.
///
/// A parse operation partitions every recognized color record into exactly
/// one of {ramp entry, background, foreground, nodata}; only records the
/// grammar defines as ignorable (comments, blank lines) are dropped.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColorMap {
    /// Ramp entries, in source order.
    pub entries: Vec<ColorEntry>,
    pub background: Option<ColorEntry>,
    pub foreground: Option<ColorEntry>,
    pub nodata: Option<ColorEntry>,
}

impl ColorMap {
    /// A map with ramp entries only and no role colors.
    pub fn new(entries: Vec<ColorEntry>) -> Self {
        Self {
            entries,
            ..Self::default()
        }
    }

    /// Number of ramp entries (role colors not counted).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
