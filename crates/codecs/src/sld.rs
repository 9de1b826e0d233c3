//! SLD (Styled Layer Descriptor) codec.
//!
//! Parsing reads any element whose *local* name is `ColorMapEntry`, so
//! `<ColorMapEntry/>`, `<sld:ColorMapEntry/>` and any other prefix are
//! treated uniformly. Entries are sorted into roles by their `label`
//! attribute (exact match); everything else lands on the ramp in document
//! order.
//!
//! Serialization emits the fixed StyledLayerDescriptor envelope around a
//! single `ColorMap` element. Role colors are not re-emitted; see
//! DESIGN.md.

use chromap_core::label::expand_template;
use chromap_core::{ColorEntry, ColorMap, Error, Result};

use crate::{ColorMapType, Parsed, ParseWarning};

/// Labels that classify an entry as the nodata role.
const NODATA_LABELS: [&str; 4] = ["No Data", "NaN", "nan", "nodata"];
const BACKGROUND_LABEL: &str = "Background";
const FOREGROUND_LABEL: &str = "Foreground";

/// Options for SLD serialization.
#[derive(Debug, Clone, Default)]
pub struct SldOptions {
    /// Emitted as the `UserStyle` `Title` element when present.
    pub title: Option<String>,
    /// Emitted as the `UserStyle` `Abstract` element when present.
    pub description: Option<String>,
    pub color_map_type: ColorMapType,
    /// When set (and `with_labels` is on), entry labels are generated from
    /// this template instead of the entries' own labels.
    pub label_template: Option<String>,
    /// Emit an `opacity` attribute on every entry, defaulting to 1.0.
    pub with_opacity: bool,
    /// Emit `label` attributes.
    pub with_labels: bool,
}

/// Parse an SLD document into a color map.
pub fn parse_sld(text: &str) -> Result<Parsed> {
    let doc = roxmltree::Document::parse(text).map_err(|e| Error::Xml(e.to_string()))?;
    let mut entries = Vec::new();
    let mut warnings = Vec::new();
    let mut background = None;
    let mut foreground = None;
    let mut nodata = None;

    let color_map_entries = doc
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "ColorMapEntry");

    for node in color_map_entries {
        let line = doc.text_pos_at(node.range().start).row as usize;
        let hex = node.attribute("color").ok_or(Error::MissingAttribute {
            element: "ColorMapEntry",
            attribute: "color",
        })?;
        let value = parse_attr_number(node.attribute("quantity"), line, false, &mut warnings);
        let opacity = parse_attr_number(node.attribute("opacity"), line, true, &mut warnings);
        let label = node.attribute("label").map(str::to_string);

        let entry = ColorEntry::from_hex(value, hex, opacity, label.clone())?;
        match label.as_deref() {
            Some(l) if NODATA_LABELS.contains(&l) => nodata = Some(entry),
            Some(BACKGROUND_LABEL) => background = Some(entry),
            Some(FOREGROUND_LABEL) => foreground = Some(entry),
            _ => entries.push(entry),
        }
    }

    Ok(Parsed {
        map: ColorMap {
            entries,
            background,
            foreground,
            nodata,
        },
        warnings,
    })
}

fn parse_attr_number(
    raw: Option<&str>,
    line: usize,
    is_opacity: bool,
    warnings: &mut Vec<ParseWarning>,
) -> Option<f64> {
    let raw = raw?;
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

/// Serialize a color map as an SLD document.
///
/// The `extended` attribute is set when the ramp exceeds the 255-entry
/// limit of non-extended color maps.
pub fn serialize_sld(map: &ColorMap, options: &SldOptions) -> String {
    let extended = map.entries.len() > 255;

    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str("<StyledLayerDescriptor version=\"1.0.0\"\n");
    out.push_str("    xmlns=\"http://www.opengis.net/sld\"\n");
    out.push_str("    xmlns:ogc=\"http://www.opengis.net/ogc\"\n");
    out.push_str("    xmlns:xlink=\"http://www.w3.org/1999/xlink\"\n");
    out.push_str("    xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\"\n");
    out.push_str("    xsi:schemaLocation=\"http://www.opengis.net/sld http://schemas.opengis.net/sld/1.0.0/StyledLayerDescriptor.xsd\">\n");
    out.push_str("  <NamedLayer>\n");
    out.push_str("    <Name></Name>\n");
    out.push_str("    <UserStyle>\n");
    if let Some(title) = &options.title {
        out.push_str(&format!("      <Title>{}</Title>\n", xml_escape(title)));
    }
    if let Some(description) = &options.description {
        out.push_str(&format!(
            "      <Abstract>{}</Abstract>\n",
            xml_escape(description)
        ));
    }
    out.push_str("      <FeatureTypeStyle>\n");
    out.push_str("        <Rule>\n");
    out.push_str("          <RasterSymbolizer>\n");
    out.push_str("            <Opacity>1.0</Opacity>\n");
    out.push_str(&format!(
        "            <ColorMap type=\"{}\" extended=\"{}\">\n",
        options.color_map_type, extended
    ));

    for entry in &map.entries {
        out.push_str(&format!(
            "              <ColorMapEntry color=\"#{}\"",
            entry.color_hex()
        ));
        if let Some(value) = entry.value {
            out.push_str(&format!(" quantity=\"{value}\""));
        }
        if entry.opacity.is_some() || options.with_opacity {
            let opacity = entry.opacity.map_or_else(|| "1.0".to_string(), |o| o.to_string());
            out.push_str(&format!(" opacity=\"{opacity}\""));
        }
        if options.with_labels {
            if let Some(label) = rendered_label(entry, options.label_template.as_deref()) {
                out.push_str(&format!(" label=\"{}\"", xml_escape(&label)));
            }
        }
        out.push_str("/>\n");
    }

    out.push_str("            </ColorMap>\n");
    out.push_str("          </RasterSymbolizer>\n");
    out.push_str("        </Rule>\n");
    out.push_str("      </FeatureTypeStyle>\n");
    out.push_str("    </UserStyle>\n");
    out.push_str("  </NamedLayer>\n");
    out.push_str("</StyledLayerDescriptor>\n");
    out
}

/// The label to emit for an entry: template expansion when a template is
/// configured and the entry has a value, else the entry's own label.
fn rendered_label(entry: &ColorEntry, template: Option<&str>) -> Option<String> {
    match (template, entry.value) {
        (Some(template), Some(value)) => Some(expand_template(template, value)),
        _ => entry.label.clone(),
    }
}

fn xml_escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
