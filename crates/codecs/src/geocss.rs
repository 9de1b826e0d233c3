//! GeoCSS codec.
//!
//! Parsing does not require well-formed CSS: the text is scanned for
//! `color-map-entry(...)` expressions and everything else is ignored. The
//! grammar has no background/foreground/nodata construct, so every match is
//! a ramp entry.
//!
//! Serialization emits a header comment, one rule block with the raster
//! directives, and one `color-map-entry(#hex, value[, opacity][, label])`
//! line per ramp entry with a defined value.

use std::sync::OnceLock;

use regex::Regex;

use chromap_core::label::expand_template;
use chromap_core::{ColorEntry, ColorMap, Error, Result};

use crate::{ColorMapType, Parsed, ParseWarning};

/// Options for GeoCSS serialization.
#[derive(Debug, Clone)]
pub struct GeocssOptions {
    /// Emitted as an `@title` header line when present.
    pub title: Option<String>,
    /// Emitted as an `@abstract` header line when present.
    pub description: Option<String>,
    pub color_map_type: ColorMapType,
    /// The `raster-channels` directive value.
    pub raster_channels: String,
    /// When set (and `with_labels` is on), entry labels are generated from
    /// this template instead of the entries' own labels.
    pub label_template: Option<String>,
    /// Emit an opacity argument on every entry, defaulting to 1.0.
    pub with_opacity: bool,
    /// Emit label arguments.
    pub with_labels: bool,
    /// When present, adds the `raster-label-fi`/`raster-label-name`
    /// feature-info directives.
    pub info_label: Option<String>,
}

impl Default for GeocssOptions {
    fn default() -> Self {
        Self {
            title: None,
            description: None,
            color_map_type: ColorMapType::default(),
            raster_channels: "auto".to_string(),
            label_template: None,
            with_opacity: false,
            with_labels: false,
            info_label: None,
        }
    }
}

const ENTRY_PREFIX: &str = "color-map-entry(";

fn entry_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // The argument list closes at the first `)` on the same line; an
    // unterminated call must not swallow entries on later lines.
    PATTERN.get_or_init(|| Regex::new(r"color-map-entry\([^)\n]*\)").expect("valid pattern"))
}

/// Parse GeoCSS text into a color map.
pub fn parse_geocss(text: &str) -> Result<Parsed> {
    let mut entries = Vec::new();
    let mut warnings = Vec::new();

    for found in entry_pattern().find_iter(text) {
        let line = 1 + text[..found.start()].bytes().filter(|&b| b == b'\n').count();
        let inner = &found.as_str()[ENTRY_PREFIX.len()..found.as_str().len() - 1];
        let args: Vec<&str> = inner.split(',').map(|a| strip_quotes(a.trim())).collect();

        if args.is_empty() || args[0].is_empty() {
            return Err(Error::Format {
                line,
                reason: "color-map-entry with no arguments".to_string(),
            });
        }

        let value = parse_arg_number(args.get(1), line, false, &mut warnings);
        let opacity = parse_arg_number(args.get(2), line, true, &mut warnings);
        let label = args.get(3).map(|l| l.to_string());
        entries.push(ColorEntry::from_hex(value, args[0], opacity, label)?);
    }

    Ok(Parsed {
        map: ColorMap::new(entries),
        warnings,
    })
}

fn strip_quotes(arg: &str) -> &str {
    arg.strip_prefix('"')
        .and_then(|a| a.strip_suffix('"'))
        .unwrap_or(arg)
}

fn parse_arg_number(
    raw: Option<&&str>,
    line: usize,
    is_opacity: bool,
    warnings: &mut Vec<ParseWarning>,
) -> Option<f64> {
    let raw = *raw?;
    match raw.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            let token = raw.to_string();
            warnings.push(if is_opacity {
                ParseWarning::BadOpacity { line, token }
            } else {
                ParseWarning::BadValue { line, token }
            });
            None
        }
    }
}

/// Serialize a color map as GeoCSS.
pub fn serialize_geocss(map: &ColorMap, options: &GeocssOptions) -> String {
    let mut out = String::new();

    if options.title.is_some() || options.description.is_some() {
        out.push_str("/*\n");
        if let Some(title) = &options.title {
            out.push_str(&format!("* @title {title}\n"));
        }
        if let Some(description) = &options.description {
            out.push_str(&format!("* @abstract {description}\n"));
        }
        out.push_str("*/\n\n");
    }

    out.push_str("* {\n");
    out.push_str(&format!("  raster-channels: {};\n", options.raster_channels));
    if let Some(info_label) = &options.info_label {
        out.push_str("  raster-label-fi: add;\n");
        out.push_str(&format!("  raster-label-name: \"{info_label}\";\n"));
    }
    out.push_str(&format!(
        "  raster-color-map-type: {};\n",
        options.color_map_type
    ));
    out.push_str("  raster-color-map:\n");

    for entry in &map.entries {
        // The grammar ties every entry to a position; role-style entries
        // without one have no representation here.
        let Some(value) = entry.value else { continue };
        out.push_str(&format!("    color-map-entry(#{}, {value}", entry.color_hex()));
        if entry.opacity.is_some() || options.with_opacity {
            let opacity = entry.opacity.map_or_else(|| "1.0".to_string(), |o| o.to_string());
            out.push_str(&format!(", {opacity}"));
        }
        if options.with_labels {
            if let Some(label) = rendered_label(entry, options.label_template.as_deref()) {
                out.push_str(&format!(", \"{label}\""));
            }
        }
        out.push_str(")\n");
    }

    out.push_str("}\n");
    out
}

fn rendered_label(entry: &ColorEntry, template: Option<&str>) -> Option<String> {
    match (template, entry.value) {
        (Some(template), Some(value)) => Some(expand_template(template, value)),
        _ => entry.label.clone(),
    }
}
