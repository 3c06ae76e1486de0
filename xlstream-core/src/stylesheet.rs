//! Content-addressed style tables and the shared style part.
//!
//! The format stores styles as four id-indexed arrays (number formats, fonts,
//! fills, borders) plus a fifth array of combined cell formats referencing the
//! other four. [`StyleTables`] interns each fragment by its canonical XML
//! encoding: identical fragments always map to the same id, ids are assigned
//! in first-seen order and never reassigned. One instance lives for exactly
//! one serialization run.

#[cfg(feature = "fast-hash")]
use hashbrown::HashMap;
#[cfg(not(feature = "fast-hash"))]
use std::collections::HashMap;

use std::fmt::Write as _;
use std::io::Write;

use crate::error::{Result, XlstreamError};
use crate::style::{BorderKind, HorizAlign, ResolvedStyle, VertAlign};
use crate::writer::escape_xml;

/// Number format strings with reserved ids, and helpers around them.
pub mod formats {
    pub const GENERAL: &str = "General";
    pub const NUMBER_WHOLE: &str = "0";
    pub const NUMBER_FRAC: &str = "0.00";
    pub const NUMBER_WHOLE_THOU_SEP: &str = "#,##0";
    pub const NUMBER_FRAC_THOU_SEP: &str = "#,##0.00";
    pub const PERCENT_WHOLE: &str = "0%";
    pub const PERCENT_FRAC: &str = "0.00%";
    pub const SCIENTIFIC: &str = "0.00E+00";
    /// Locale-specific date-only format, e.g. "31/01/2024" in the UK. A
    /// sentinel rather than a concrete pattern so that a literal "d/m/yyyy"
    /// custom format stays representable.
    pub const LOCALE_DATE: &str = "<LD>";
    /// Locale-specific date-time format, e.g. "31/01/2024 21:59" in the UK.
    pub const LOCALE_DATE_TIME: &str = "<LDT>";
    pub const TEXT: &str = "@";
    /// GBP accounting format, a ready-made non-builtin helper.
    pub const ACCOUNTING_GBP: &str =
        "_-[$\u{a3}-809]* #,##0.00_-;\\-[$\u{a3}-809]* #,##0.00_-;_-[$\u{a3}-809]* \"-\"??_-;_-@_-";

    /// Reserved id for a built-in format string, if it has one.
    /// Formats without a reserved id are interned at 164 and up.
    pub fn builtin_id(format: &str) -> Option<u32> {
        match format {
            GENERAL => Some(0),
            NUMBER_WHOLE => Some(1),
            NUMBER_FRAC => Some(2),
            NUMBER_WHOLE_THOU_SEP => Some(3),
            NUMBER_FRAC_THOU_SEP => Some(4),
            PERCENT_WHOLE => Some(9),
            PERCENT_FRAC => Some(10),
            SCIENTIFIC => Some(11),
            LOCALE_DATE => Some(14),
            "mm-dd-yy" => Some(14),
            "d-mmm-yy" => Some(15),
            "d-mmm" => Some(16),
            "mmm-yy" => Some(17),
            "h:mm AM/PM" => Some(18),
            "h:mm:ss AM/PM" => Some(19),
            "h:mm" => Some(20),
            "h:mm:ss" => Some(21),
            LOCALE_DATE_TIME => Some(22),
            "m/d/yy h:mm" => Some(22),
            "mm:ss" => Some(45),
            "[h]:mm:ss" => Some(46),
            TEXT => Some(49),
            _ => None,
        }
    }
}

/// First id available for custom number formats; 0-163 are reserved.
const NUM_FMT_BASE: u32 = 164;

/// Excel expects this fill at slot 1 whether or not anything uses it.
const GRAY125_FILL: &str = "<fill><patternFill patternType=\"gray125\"/></fill>";

/// Interning tables for the five style arrays, scoped to one serialization
/// run.
#[derive(Debug, Default)]
pub struct StyleTables {
    num_fmts: HashMap<String, u32>,
    fonts: HashMap<String, u32>,
    fills: HashMap<String, u32>,
    borders: HashMap<String, u32>,
    xfs: HashMap<String, u32>,
}

impl StyleTables {
    /// Seed the tables from the workbook default style, which occupies slot 0
    /// of every array. Fails if the default asks for a fill or border, which
    /// the format cannot express at workbook scope.
    pub fn seed(default: &ResolvedStyle) -> Result<Self> {
        if !default.fill_color.is_empty() {
            return Err(XlstreamError::UnsupportedDefaultStyle("a fill"));
        }
        if default.border_left != BorderKind::None
            || default.border_right != BorderKind::None
            || default.border_top != BorderKind::None
            || default.border_bottom != BorderKind::None
        {
            return Err(XlstreamError::UnsupportedDefaultStyle("a border"));
        }
        if !default.border_left_color.is_empty()
            || !default.border_right_color.is_empty()
            || !default.border_top_color.is_empty()
            || !default.border_bottom_color.is_empty()
        {
            return Err(XlstreamError::UnsupportedDefaultStyle("a border color"));
        }

        let mut tables = StyleTables::default();
        tables.fonts.insert(font_fragment(default), 0);
        tables.fills.insert(fill_fragment(""), 0);
        tables.fills.insert(GRAY125_FILL.to_string(), 1);
        tables.borders.insert(border_fragment(default), 0);
        // slot 0 of the combined table always references ids 0 across the
        // board; a non-General default number format resolves per cell
        tables.xfs.insert(
            xf_fragment(0, 0, 0, 0, default.horizontal, default.vertical, default.wrap),
            0,
        );
        Ok(tables)
    }

    fn intern(table: &mut HashMap<String, u32>, fragment: String, base: u32) -> u32 {
        if let Some(&id) = table.get(&fragment) {
            return id;
        }
        let id = base + table.len() as u32;
        table.insert(fragment, id);
        id
    }

    /// Intern a number format string, preferring its reserved built-in id.
    pub fn intern_number_format(&mut self, format: &str) -> u32 {
        formats::builtin_id(format)
            .unwrap_or_else(|| Self::intern(&mut self.num_fmts, format.to_string(), NUM_FMT_BASE))
    }

    pub fn intern_font(&mut self, style: &ResolvedStyle) -> u32 {
        Self::intern(&mut self.fonts, font_fragment(style), 0)
    }

    pub fn intern_fill(&mut self, fill_color: &str) -> u32 {
        Self::intern(&mut self.fills, fill_fragment(fill_color), 0)
    }

    pub fn intern_border(&mut self, style: &ResolvedStyle) -> u32 {
        Self::intern(&mut self.borders, border_fragment(style), 0)
    }

    /// Intern the combined cell format for a fully resolved style and return
    /// the id rows and cells reference via `s="..."`.
    pub fn map_style(&mut self, style: &ResolvedStyle) -> u32 {
        let num_fmt_id = self.intern_number_format(&style.number_format);
        let font_id = self.intern_font(style);
        let fill_id = self.intern_fill(&style.fill_color);
        let border_id = self.intern_border(style);
        let xf = xf_fragment(
            num_fmt_id,
            font_id,
            fill_id,
            border_id,
            style.horizontal,
            style.vertical,
            style.wrap,
        );
        Self::intern(&mut self.xfs, xf, 0)
    }

    /// Custom number formats in id order.
    pub fn number_formats(&self) -> Vec<(u32, &str)> {
        ordered(&self.num_fmts)
    }

    /// Font fragments in id order.
    pub fn fonts(&self) -> Vec<(u32, &str)> {
        ordered(&self.fonts)
    }

    /// Fill fragments in id order.
    pub fn fills(&self) -> Vec<(u32, &str)> {
        ordered(&self.fills)
    }

    /// Border fragments in id order.
    pub fn borders(&self) -> Vec<(u32, &str)> {
        ordered(&self.borders)
    }

    /// Combined cell formats in id order.
    pub fn cell_formats(&self) -> Vec<(u32, &str)> {
        ordered(&self.xfs)
    }

    /// Write the complete style part. Called once, after every sheet has
    /// contributed its fragments.
    pub fn write_xml<W: Write>(&self, out: &mut W) -> Result<()> {
        let mut xml = String::with_capacity(2048);
        xml.push_str(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
             <styleSheet xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\">\n",
        );

        let num_fmts = self.number_formats();
        if !num_fmts.is_empty() {
            let _ = writeln!(xml, "<numFmts count=\"{}\">", num_fmts.len());
            for (id, format) in num_fmts {
                let _ = writeln!(
                    xml,
                    "<numFmt numFmtId=\"{}\" formatCode=\"{}\"/>",
                    id,
                    escape_xml(format)
                );
            }
            xml.push_str("</numFmts>\n");
        }

        for (name, entries) in [
            ("fonts", self.fonts()),
            ("fills", self.fills()),
            ("borders", self.borders()),
        ] {
            let _ = writeln!(xml, "<{} count=\"{}\">", name, entries.len());
            for (_, fragment) in entries {
                xml.push_str(fragment);
                xml.push('\n');
            }
            let _ = writeln!(xml, "</{name}>");
        }

        xml.push_str(
            "<cellStyleXfs count=\"1\"><xf numFmtId=\"0\" fontId=\"0\" fillId=\"0\" borderId=\"0\"/></cellStyleXfs>\n",
        );

        let xfs = self.cell_formats();
        let _ = writeln!(xml, "<cellXfs count=\"{}\">", xfs.len());
        for (_, fragment) in xfs {
            xml.push_str(fragment);
            xml.push('\n');
        }
        xml.push_str("</cellXfs>\n");

        xml.push_str(
            "<cellStyles count=\"1\"><cellStyle name=\"Normal\" xfId=\"0\" builtinId=\"0\"/></cellStyles>\n\
             <dxfs count=\"0\"/>\n\
             <tableStyles count=\"0\" defaultTableStyle=\"TableStyleMedium2\" defaultPivotStyle=\"PivotStyleLight16\"/>\n\
             </styleSheet>",
        );

        out.write_all(xml.as_bytes())?;
        Ok(())
    }
}

fn ordered(table: &HashMap<String, u32>) -> Vec<(u32, &str)> {
    let mut entries: Vec<(u32, &str)> = table.iter().map(|(k, &v)| (v, k.as_str())).collect();
    entries.sort_unstable_by_key(|&(id, _)| id);
    entries
}

/// Normalize a 6-digit RGB color to 8-digit ARGB, upper-cased.
fn argb(color: &str) -> String {
    let upper = color.to_ascii_uppercase();
    if upper.len() == 6 {
        format!("FF{upper}")
    } else {
        upper
    }
}

/// Font size with at most one decimal place, e.g. "11" or "11.5".
fn format_font_size(size: f64) -> String {
    let rounded = (size * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        format!("{rounded:.1}")
    }
}

fn font_fragment(s: &ResolvedStyle) -> String {
    let mut xml = String::from("<font>");
    let _ = write!(
        xml,
        "<name val=\"{}\"/><sz val=\"{}\"/>",
        escape_xml(&s.font_name),
        format_font_size(s.font_size)
    );
    if s.color.is_empty() {
        xml.push_str("<color theme=\"1\"/>");
    } else {
        let _ = write!(xml, "<color rgb=\"{}\"/>", argb(&s.color));
    }
    if s.bold {
        xml.push_str("<b/>");
    }
    if s.italic {
        xml.push_str("<i/>");
    }
    xml.push_str("</font>");
    xml
}

fn fill_fragment(fill_color: &str) -> String {
    if fill_color.is_empty() {
        "<fill><patternFill patternType=\"none\"/></fill>".to_string()
    } else {
        format!(
            "<fill><patternFill patternType=\"solid\"><fgColor rgb=\"{}\"/><bgColor indexed=\"64\"/></patternFill></fill>",
            argb(fill_color)
        )
    }
}

fn border_edge(xml: &mut String, name: &str, kind: BorderKind, color: &str) {
    if kind == BorderKind::None {
        let _ = write!(xml, "<{name}/>");
        return;
    }
    let _ = write!(xml, "<{name} style=\"{}\">", kind.as_str());
    if color.is_empty() {
        xml.push_str("<color auto=\"1\"/>");
    } else {
        let _ = write!(xml, "<color rgb=\"{}\"/>", argb(color));
    }
    let _ = write!(xml, "</{name}>");
}

fn border_fragment(s: &ResolvedStyle) -> String {
    let mut xml = String::from("<border>");
    border_edge(&mut xml, "left", s.border_left, &s.border_left_color);
    border_edge(&mut xml, "right", s.border_right, &s.border_right_color);
    border_edge(&mut xml, "top", s.border_top, &s.border_top_color);
    border_edge(&mut xml, "bottom", s.border_bottom, &s.border_bottom_color);
    xml.push_str("<diagonal/></border>");
    xml
}

/// A combined cell format. Apply flags are only written when the referenced
/// id is non-zero (or alignment is non-default), which is how the format
/// marks "differs from the base".
fn xf_fragment(
    num_fmt_id: u32,
    font_id: u32,
    fill_id: u32,
    border_id: u32,
    horizontal: HorizAlign,
    vertical: VertAlign,
    wrap: bool,
) -> String {
    let mut xml = format!(
        "<xf numFmtId=\"{num_fmt_id}\" fontId=\"{font_id}\" fillId=\"{fill_id}\" borderId=\"{border_id}\" xfId=\"0\""
    );
    if num_fmt_id != 0 {
        xml.push_str(" applyNumberFormat=\"1\"");
    }
    if font_id != 0 {
        xml.push_str(" applyFont=\"1\"");
    }
    if fill_id != 0 {
        xml.push_str(" applyFill=\"1\"");
    }
    if border_id != 0 {
        xml.push_str(" applyBorder=\"1\"");
    }
    if horizontal != HorizAlign::Auto || vertical != VertAlign::Bottom || wrap {
        xml.push_str(" applyAlignment=\"1\"><alignment");
        if horizontal != HorizAlign::Auto {
            let _ = write!(xml, " horizontal=\"{}\"", horizontal.as_str());
        }
        if vertical != VertAlign::Bottom {
            let _ = write!(xml, " vertical=\"{}\"", vertical.as_str());
        }
        if wrap {
            xml.push_str(" wrapText=\"1\"");
        }
        xml.push_str("/></xf>");
    } else {
        xml.push_str("/>");
    }
    xml
}
