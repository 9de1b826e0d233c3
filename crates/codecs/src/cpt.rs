//! CPT (color palette table) codec.
//!
//! A CPT file is line-oriented. Lines are classified by their first
//! character: `#` starts a comment, `B`/`F`/`N` set the background,
//! foreground and nodata role colors, and anything else is a ramp line
//! packing a lower value+color and an upper value+color:
//!
//! ```text
//! 0      black     0.125  red            # named pair
//! 0.125  31/40/79  0.25   38/60/106      # slash-triple pair
//! 0      black     0.125  31 40 79       # named lower, triple upper
//! 0      31 40 79  0.125  38 60 106      # decimal triples
//! ```
//!
//! The grammar is ambiguous at the token level, so each line is first
//! classified into a tagged [`LineLayout`] by token count, which fixes
//! where every value and color block sits. Ramp lines yield their lower
//! entry in file order; the last line is re-read once in upper-bound mode
//! for the trailing entry, so N ramp lines produce N+1 entries — unless
//! the last upper value fails to parse, in which case the trailing entry
//! is skipped with a warning (see DESIGN.md).

use chromap_core::named::resolve_color_token;
use chromap_core::{ColorEntry, ColorMap, Error, Result};

use crate::{Parsed, ParseWarning};

/// Options for CPT serialization.
#[derive(Debug, Clone, Default)]
pub struct CptOptions {
    /// Emitted as a `# Title: ...` comment when present.
    pub title: Option<String>,
    /// Emitted as a `# Description: ...` comment when present.
    pub description: Option<String>,
}

/// Which bound of a ramp line is being read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    Lower,
    Upper,
}

/// The recognized ramp-line shapes, resolved by token count alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineLayout {
    /// 4 tokens: `value color value color`, single-token colors
    /// (slash triple or named).
    Compact,
    /// 6 tokens: `value color value r g b`, single-token lower color,
    /// decimal-triple upper color.
    MixedUpperTriple,
    /// 8 tokens: `value r g b value r g b`, decimal triples on both bounds.
    Expanded,
}

impl LineLayout {
    fn classify(token_count: usize, line: usize) -> Result<Self> {
        match token_count {
            4 => Ok(Self::Compact),
            6 => Ok(Self::MixedUpperTriple),
            8 => Ok(Self::Expanded),
            count => Err(Error::TokenCount { line, count }),
        }
    }

    /// Index of the value token for the requested bound.
    fn value_index(self, bound: Bound) -> usize {
        match (self, bound) {
            (_, Bound::Lower) => 0,
            (Self::Compact | Self::MixedUpperTriple, Bound::Upper) => 2,
            (Self::Expanded, Bound::Upper) => 4,
        }
    }

    /// Whether the color block for the bound spans three decimal tokens.
    fn color_is_triple(self, bound: Bound) -> bool {
        matches!(
            (self, bound),
            (Self::Expanded, _) | (Self::MixedUpperTriple, Bound::Upper)
        )
    }
}

/// Parse CPT text into a color map.
pub fn parse_cpt(text: &str) -> Result<Parsed> {
    let mut entries = Vec::new();
    let mut warnings = Vec::new();
    let mut background = None;
    let mut foreground = None;
    let mut nodata = None;
    let mut last_ramp: Option<(usize, &str)> = None;

    for (idx, raw) in text.lines().enumerate() {
        let lineno = idx + 1;
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        match line.as_bytes()[0] {
            b'#' => {}
            b'B' => background = Some(parse_role_line(line, lineno)?),
            b'F' => foreground = Some(parse_role_line(line, lineno)?),
            b'N' => nodata = Some(parse_role_line(line, lineno)?),
            _ => {
                if let Some(entry) = parse_ramp_line(line, lineno, Bound::Lower, &mut warnings)? {
                    entries.push(entry);
                }
                last_ramp = Some((lineno, line));
            }
        }
    }

    // The upper bound of every line i equals the lower bound of line i+1,
    // so only the last line's upper bound adds information.
    if let Some((lineno, line)) = last_ramp {
        if let Some(entry) = parse_ramp_line(line, lineno, Bound::Upper, &mut warnings)? {
            entries.push(entry);
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

/// Parse a `B`/`F`/`N` line. The leading letter is a role marker, not a
/// value; the remainder is a standalone color record.
fn parse_role_line(line: &str, lineno: usize) -> Result<ColorEntry> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let (r, g, b) = parse_color_record(&tokens[1..], lineno)?;
    Ok(ColorEntry::new(None, r, g, b))
}

/// Resolve a standalone color record: one token (hex, slash triple or
/// named color) or three decimal tokens.
fn parse_color_record(tokens: &[&str], lineno: usize) -> Result<(u8, u8, u8)> {
    match tokens {
        [single] => resolve_color_token(single),
        [r, g, b] => parse_decimal_triple(r, g, b, lineno),
        _ => Err(Error::Format {
            line: lineno,
            reason: format!("expected a color record, got {} tokens", tokens.len()),
        }),
    }
}

fn parse_decimal_triple(r: &str, g: &str, b: &str, lineno: usize) -> Result<(u8, u8, u8)> {
    let channel = |tok: &str| -> Result<u8> {
        tok.parse().map_err(|_| Error::Format {
            line: lineno,
            reason: format!("invalid color component {tok:?}"),
        })
    };
    Ok((channel(r)?, channel(g)?, channel(b)?))
}

/// Read one bound of a ramp line.
///
/// Returns `Ok(None)` only in upper-bound mode when the value token does
/// not parse: with no usable position there is no meaningful second color
/// block, so the trailing entry is dropped rather than invented.
fn parse_ramp_line(
    line: &str,
    lineno: usize,
    bound: Bound,
    warnings: &mut Vec<ParseWarning>,
) -> Result<Option<ColorEntry>> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let layout = LineLayout::classify(tokens.len(), lineno)?;
    let value_idx = layout.value_index(bound);
    let color_idx = value_idx + 1;

    let value = tokens[value_idx].parse::<f64>().ok();
    if value.is_none() {
        if bound == Bound::Upper {
            warnings.push(ParseWarning::MissingUpperBound { line: lineno });
            return Ok(None);
        }
        warnings.push(ParseWarning::BadValue {
            line: lineno,
            token: tokens[value_idx].to_string(),
        });
    }

    let (r, g, b) = if layout.color_is_triple(bound) {
        parse_decimal_triple(
            tokens[color_idx],
            tokens[color_idx + 1],
            tokens[color_idx + 2],
            lineno,
        )?
    } else {
        resolve_color_token(tokens[color_idx])?
    };

    Ok(Some(ColorEntry::new(value, r, g, b)))
}

/// Serialize a color map as CPT.
///
/// Each adjacent pair of ramp entries becomes one tab-separated line, so an
/// N-entry ramp yields exactly N−1 data lines. Role colors follow as
/// `B`/`F`/`N` lines.
pub fn serialize_cpt(map: &ColorMap, options: &CptOptions) -> String {
    let mut out = String::new();
    if let Some(title) = &options.title {
        out.push_str(&format!("# Title: {title}\n"));
    }
    if let Some(description) = &options.description {
        out.push_str(&format!("# Description: {description}\n"));
    }

    for pair in map.entries.windows(2) {
        let (lower, upper) = (&pair[0], &pair[1]);
        out.push_str(&format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\n",
            fmt_value(lower.value),
            lower.red,
            lower.green,
            lower.blue,
            fmt_value(upper.value),
            upper.red,
            upper.green,
            upper.blue,
        ));
    }

    if let Some(bg) = &map.background {
        out.push_str(&format!("B\t{}\t{}\t{}\n", bg.red, bg.green, bg.blue));
    }
    if let Some(fg) = &map.foreground {
        out.push_str(&format!("F\t{}\t{}\t{}\n", fg.red, fg.green, fg.blue));
    }
    if let Some(nan) = &map.nodata {
        out.push_str(&format!("N\t{}\t{}\t{}\n", nan.red, nan.green, nan.blue));
    }
    out
}

// A valueless entry still needs a value slot on its data line; `nan` reads
// back as a float, keeping the N-entries-to-N-1-lines shape intact.
fn fmt_value(value: Option<f64>) -> String {
    value.map_or_else(|| "nan".to_string(), |v| v.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Parsed {
        parse_cpt(text).unwrap()
    }

    #[test]
    fn expanded_layout() {
        let parsed = parse("0 31 40 79 0.125 38 60 106\n");
        assert!(parsed.warnings.is_empty());
        let entries = &parsed.map.entries;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].value, Some(0.0));
        assert_eq!(entries[0].color_tuple(), (31, 40, 79));
        assert_eq!(entries[1].value, Some(0.125));
        assert_eq!(entries[1].color_tuple(), (38, 60, 106));
    }

    #[test]
    fn compact_layout_slash_triples() {
        let parsed = parse("0.125 31/40/79 0.25 38/60/106\n");
        let entries = &parsed.map.entries;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].color_tuple(), (31, 40, 79));
        assert_eq!(entries[1].value, Some(0.25));
        assert_eq!(entries[1].color_tuple(), (38, 60, 106));
    }

    #[test]
    fn compact_layout_named_pair() {
        let parsed = parse("0 black 0.125 red\n");
        let entries = &parsed.map.entries;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].color_tuple(), (0, 0, 0));
        assert_eq!(entries[1].color_tuple(), (255, 0, 0));
    }

    #[test]
    fn mixed_named_lower_triple_upper() {
        let parsed = parse("0 black 0.125 31 40 79\n");
        let entries = &parsed.map.entries;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].color_tuple(), (0, 0, 0));
        assert_eq!(entries[1].value, Some(0.125));
        assert_eq!(entries[1].color_tuple(), (31, 40, 79));
    }

    #[test]
    fn multi_line_ramp_yields_n_plus_one_entries() {
        let parsed = parse("0 0/0/0 0.125 255/0/0\n0.125 255/0/0 1 0/0/255\n");
        let entries = &parsed.map.entries;
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].value, Some(0.0));
        assert_eq!(entries[1].value, Some(0.125));
        assert_eq!(entries[2].value, Some(1.0));
        assert_eq!(entries[2].color_tuple(), (0, 0, 255));
    }

    #[test]
    fn comments_and_blank_lines_are_ignored() {
        let parsed = parse("# a comment\n\n0 black 1 white\n# trailing\n");
        assert_eq!(parsed.map.entries.len(), 2);
    }

    #[test]
    fn role_lines_set_role_colors() {
        let parsed = parse("0 black 1 white\nB 0 0 0\nF 255 255 255\nN 128 128 128\n");
        let map = &parsed.map;
        assert_eq!(map.entries.len(), 2);
        assert_eq!(map.background.as_ref().unwrap().color_tuple(), (0, 0, 0));
        assert_eq!(map.foreground.as_ref().unwrap().color_tuple(), (255, 255, 255));
        assert_eq!(map.nodata.as_ref().unwrap().color_tuple(), (128, 128, 128));
        assert!(map.nodata.as_ref().unwrap().value.is_none());
    }

    #[test]
    fn role_line_accepts_single_token_colors() {
        let parsed = parse("0 black 1 white\nN 31/40/79\nB white\n");
        assert_eq!(parsed.map.nodata.as_ref().unwrap().color_tuple(), (31, 40, 79));
        assert_eq!(parsed.map.background.as_ref().unwrap().color_tuple(), (255, 255, 255));
    }

    #[test]
    fn token_count_outside_layouts_is_an_error() {
        assert!(matches!(
            parse_cpt("0 black 1 white extra\n"),
            Err(Error::TokenCount { line: 1, count: 5 })
        ));
        assert!(matches!(
            parse_cpt("0 black 1\n"),
            Err(Error::TokenCount { line: 1, count: 3 })
        ));
    }

    #[test]
    fn unknown_named_color_is_an_error() {
        assert!(matches!(
            parse_cpt("0 mauve99 1 white\n"),
            Err(Error::UnknownColorName(_))
        ));
    }

    #[test]
    fn out_of_range_component_is_an_error_not_a_clamp() {
        assert!(parse_cpt("0 300 0 0 1 0 0 0\n").is_err());
    }

    #[test]
    fn bad_lower_value_recovers_as_valueless() {
        let parsed = parse("x black 1 white\n");
        assert_eq!(parsed.map.entries.len(), 2);
        assert!(parsed.map.entries[0].value.is_none());
        assert_eq!(
            parsed.warnings,
            vec![ParseWarning::BadValue {
                line: 1,
                token: "x".into()
            }]
        );
    }

    #[test]
    fn bad_upper_value_skips_trailing_entry() {
        // 2 lines would normally yield 3 entries; the broken upper bound
        // of the last line drops the trailing one.
        let parsed = parse("0 black 0.5 white\n0.5 white x black\n");
        assert_eq!(parsed.map.entries.len(), 2);
        assert!(parsed
            .warnings
            .contains(&ParseWarning::MissingUpperBound { line: 2 }));
    }

    #[test]
    fn later_role_line_overwrites_earlier() {
        let parsed = parse("0 black 1 white\nN 0 0 0\nN 1 1 1\n");
        assert_eq!(parsed.map.nodata.as_ref().unwrap().color_tuple(), (1, 1, 1));
    }

    #[test]
    fn serializes_adjacent_pairs_tab_separated() {
        let map = ColorMap::new(vec![
            ColorEntry::new(Some(0.0), 0, 0, 0),
            ColorEntry::new(Some(0.125), 255, 0, 0),
            ColorEntry::new(Some(1.0), 0, 0, 255),
        ]);
        let out = serialize_cpt(&map, &CptOptions::default());
        assert_eq!(
            out,
            "0\t0\t0\t0\t0.125\t255\t0\t0\n0.125\t255\t0\t0\t1\t0\t0\t255\n"
        );
    }

    #[test]
    fn serializes_role_lines_and_comments() {
        let mut map = ColorMap::new(vec![
            ColorEntry::new(Some(0.0), 0, 0, 0),
            ColorEntry::new(Some(1.0), 255, 255, 255),
        ]);
        map.background = Some(ColorEntry::new(None, 1, 2, 3));
        map.nodata = Some(ColorEntry::new(None, 9, 9, 9));
        let options = CptOptions {
            title: Some("Elevation".into()),
            description: Some("Test ramp".into()),
        };
        let out = serialize_cpt(&map, &options);
        assert!(out.starts_with("# Title: Elevation\n# Description: Test ramp\n"));
        assert!(out.contains("B\t1\t2\t3\n"));
        assert!(out.ends_with("N\t9\t9\t9\n"));
        assert!(!out.contains("F\t"));
    }

    #[test]
    fn round_trip_preserves_entries() {
        let map = ColorMap::new(vec![
            ColorEntry::new(Some(0.0), 0, 0, 0),
            ColorEntry::new(Some(0.125), 255, 0, 0),
            ColorEntry::new(Some(1.0), 0, 0, 255),
        ]);
        let out = serialize_cpt(&map, &CptOptions::default());
        let reparsed = parse(&out);
        assert_eq!(reparsed.map.entries, map.entries);
    }

    #[test]
    fn single_entry_map_serializes_no_data_lines() {
        let map = ColorMap::new(vec![ColorEntry::new(Some(0.0), 0, 0, 0)]);
        assert_eq!(serialize_cpt(&map, &CptOptions::default()), "");
    }
}
