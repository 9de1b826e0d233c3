//! # Chromap Codecs
//!
//! Parsers and serializers between the canonical color-map model and the
//! three supported raster-styling formats.
//!
//! Each codec is independent: it depends only on the model and the color
//! primitives in `chromap_core`, never on another codec. The main entry
//! points are [`parse_str`] / [`parse_bytes`] and [`serialize_str`], with
//! [`read_color_map`] / [`write_color_map`] as the file-level front door.
//!
//! ## Usage
//!
//! ```ignore
//! use chromap_codecs::{parse_str, serialize_str, Format, SerializeOptions};
//!
//! let parsed = parse_str(&cpt_text, Format::Cpt)?;
//! let sld = serialize_str(&parsed.map, Format::Sld, &SerializeOptions::default());
//! ```

pub mod cpt;
pub mod geocss;
pub mod sld;

use std::fmt;
use std::fs;
use std::path::Path;

use chromap_core::{ColorMap, Result};

pub use cpt::CptOptions;
pub use geocss::GeocssOptions;
pub use sld::SldOptions;

/// A supported color-map file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// Tabular ramp color-table format.
    Cpt,
    /// Styled Layer Descriptor XML.
    Sld,
    /// GeoCSS styling language.
    Geocss,
}

impl Format {
    pub const ALL: &[Format] = &[Self::Cpt, Self::Sld, Self::Geocss];

    /// Human-readable name, also accepted by [`Format::from_name`].
    pub fn name(&self) -> &'static str {
        match self {
            Self::Cpt => "cpt",
            Self::Sld => "sld",
            Self::Geocss => "geocss",
        }
    }

    /// The canonical file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Cpt => "cpt",
            Self::Sld => "sld",
            Self::Geocss => "css",
        }
    }

    /// Parse a format name, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "cpt" => Some(Self::Cpt),
            "sld" => Some(Self::Sld),
            "geocss" | "css" => Some(Self::Geocss),
            _ => None,
        }
    }

    /// Sniff the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        Self::from_name(ext)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The color-map type carried by SLD and GeoCSS styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMapType {
    #[default]
    Ramp,
    Intervals,
    Values,
}

impl ColorMapType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ramp => "ramp",
            Self::Intervals => "intervals",
            Self::Values => "values",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "ramp" => Some(Self::Ramp),
            "intervals" => Some(Self::Intervals),
            "values" => Some(Self::Values),
            _ => None,
        }
    }
}

impl fmt::Display for ColorMapType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A non-fatal problem recorded while parsing.
///
/// The record involved was recovered (typically as a valueless entry) or
/// skipped rather than aborting the file; callers that care can inspect the
/// warnings on the returned [`Parsed`].
#[derive(Debug, Clone, PartialEq)]
pub enum ParseWarning {
    /// A position token failed numeric parsing; the entry was kept valueless.
    BadValue { line: usize, token: String },
    /// An opacity token failed numeric parsing; the entry keeps no opacity.
    BadOpacity { line: usize, token: String },
    /// The final ramp line's upper bound had no parseable value, so its
    /// trailing entry was not emitted.
    MissingUpperBound { line: usize },
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadValue { line, token } => {
                write!(f, "line {line}: unparseable value {token:?}, entry kept without one")
            }
            Self::BadOpacity { line, token } => {
                write!(f, "line {line}: unparseable opacity {token:?}, dropped")
            }
            Self::MissingUpperBound { line } => {
                write!(f, "line {line}: last ramp line has no parseable upper value, trailing entry skipped")
            }
        }
    }
}

/// A successfully parsed color map plus any recovery warnings.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed {
    pub map: ColorMap,
    pub warnings: Vec<ParseWarning>,
}

/// Serializer options for every format, bundled for format-generic calls.
#[derive(Debug, Clone, Default)]
pub struct SerializeOptions {
    pub cpt: CptOptions,
    pub sld: SldOptions,
    pub geocss: GeocssOptions,
}

/// Parse in-memory text in the given format.
pub fn parse_str(text: &str, format: Format) -> Result<Parsed> {
    match format {
        Format::Cpt => cpt::parse_cpt(text),
        Format::Sld => sld::parse_sld(text),
        Format::Geocss => geocss::parse_geocss(text),
    }
}

/// Parse raw bytes, tolerating legacy encodings.
///
/// Strict UTF-8 first; anything else is decoded as windows-1252, the
/// encoding legacy SLD exports actually ship in.
pub fn parse_bytes(bytes: &[u8], format: Format) -> Result<Parsed> {
    parse_str(&decode_text(bytes), format)
}

/// Serialize a color map into the given format.
pub fn serialize_str(map: &ColorMap, format: Format, options: &SerializeOptions) -> String {
    match format {
        Format::Cpt => cpt::serialize_cpt(map, &options.cpt),
        Format::Sld => sld::serialize_sld(map, &options.sld),
        Format::Geocss => geocss::serialize_geocss(map, &options.geocss),
    }
}

/// Read and parse a color-map file.
pub fn read_color_map(path: &Path, format: Format) -> Result<Parsed> {
    let bytes = fs::read(path)?;
    parse_bytes(&bytes, format)
}

/// Serialize a color map and write it to a file.
pub fn write_color_map(
    path: &Path,
    format: Format,
    map: &ColorMap,
    options: &SerializeOptions,
) -> Result<()> {
    fs::write(path, serialize_str(map, format, options))?;
    Ok(())
}

fn decode_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            let (text, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            text.into_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn format_from_extension() {
        assert_eq!(Format::from_path(&PathBuf::from("style.cpt")), Some(Format::Cpt));
        assert_eq!(Format::from_path(&PathBuf::from("style.SLD")), Some(Format::Sld));
        assert_eq!(Format::from_path(&PathBuf::from("style.css")), Some(Format::Geocss));
        assert_eq!(Format::from_path(&PathBuf::from("style.geocss")), Some(Format::Geocss));
        assert_eq!(Format::from_path(&PathBuf::from("style.tif")), None);
        assert_eq!(Format::from_path(&PathBuf::from("style")), None);
    }

    #[test]
    fn format_from_name() {
        assert_eq!(Format::from_name("CPT"), Some(Format::Cpt));
        assert_eq!(Format::from_name("css"), Some(Format::Geocss));
        assert_eq!(Format::from_name("xml"), None);
    }

    #[test]
    fn color_map_type_round_trips_names() {
        for &t in &[ColorMapType::Ramp, ColorMapType::Intervals, ColorMapType::Values] {
            assert_eq!(ColorMapType::from_name(t.as_str()), Some(t));
        }
    }

    #[test]
    fn decode_prefers_utf8() {
        assert_eq!(decode_text("héllo".as_bytes()), "héllo");
    }

    #[test]
    fn decode_falls_back_to_windows_1252() {
        // 0xe9 is é in windows-1252 but not valid UTF-8 on its own.
        assert_eq!(decode_text(&[b'h', 0xe9, b'l']), "hél");
    }
}
