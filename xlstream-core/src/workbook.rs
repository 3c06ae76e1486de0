//! Workbook model and package assembly.
//!
//! The model (workbook, sheets, columns, their style layers) is built fully
//! before serialization and is read-only while it runs. Serialization-scoped
//! state — the style interning tables and each sheet's cursor — is created
//! fresh per save and discarded afterwards, so style ids can never leak
//! between runs.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Cursor, Seek, Write};

use chrono::{DateTime, Utc};
use zip::write::{ExtendedFileOptions, FileOptions};
use zip::{CompressionMethod, ZipWriter};

use crate::coords::cell_ref;
use crate::error::Result;
use crate::streaming::{ColDefault, SheetWriter};
use crate::style::{ResolvedStyle, Style};
use crate::stylesheet::StyleTables;
use crate::writer;

/// Default column width when none is set, in character units.
const DEFAULT_COL_WIDTH: f64 = 8.7265625;

/// Compression level for saving workbooks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CompressionLevel {
    /// No compression - fastest saves, largest files
    None,
    /// Fast compression (deflate level 1) - good balance
    #[default]
    Fast,
    /// Default compression (deflate level 6) - smaller files, slower
    Default,
    /// Best compression (deflate level 9) - smallest files, slowest
    Best,
}

/// Column settings, addressed by 1-based index on the sheet.
#[derive(Clone, Debug, Default)]
pub struct Column {
    /// Display width; written with `customWidth` when set.
    pub width: Option<f64>,
    /// Column-level style default for cells and fillers in this column.
    pub style: Option<Style>,
}

/// Callback that drives a sheet's [`SheetWriter`] during serialization.
pub type SheetFn = Box<dyn Fn(&mut SheetWriter<'_>) -> Result<()>>;

/// One sheet of the workbook. Rows are not stored; they are produced lazily
/// by the `write_sheet` callback, which is invoked exactly once per save.
pub struct Sheet {
    /// Sheet name. Duplicates get numeric suffixes at save time.
    pub name: String,
    /// Sparse column settings keyed by 1-based column index.
    pub columns: BTreeMap<u32, Column>,
    /// Freeze this many rows at the top.
    pub freeze_rows: Option<u32>,
    /// Freeze this many columns on the left.
    pub freeze_cols: Option<u32>,
    /// Sheet-level style default, one cascade layer above the workbook's.
    pub style: Option<Style>,
    /// Produces the sheet's rows at save time.
    pub write_sheet: SheetFn,
}

impl Sheet {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Sheet {
            name: name.into(),
            columns: BTreeMap::new(),
            freeze_rows: None,
            freeze_cols: None,
            style: None,
            write_sheet: Box::new(|_| Ok(())),
        }
    }

    /// Set the row-producing callback.
    pub fn with_writer<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut SheetWriter<'_>) -> Result<()> + 'static,
    {
        self.write_sheet = Box::new(f);
        self
    }

    /// Set the sheet-level style default.
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = Some(style);
        self
    }

    /// Column settings for a 1-based index, created empty on first access.
    pub fn column_mut(&mut self, index: u32) -> &mut Column {
        self.columns.entry(index).or_default()
    }
}

/// A workbook: document metadata, the default style, and its sheets.
pub struct Workbook {
    /// Written to docProps/core.xml as dc:creator.
    pub creator: String,
    /// Written to docProps/core.xml as cp:lastModifiedBy.
    pub last_modified_by: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    pub sheets: Vec<Sheet>,
    /// Index of the sheet selected when the file opens.
    pub active_sheet: Option<usize>,
    /// Default style for every cell in the workbook, unless overridden by a
    /// sheet, column, row or cell style. Every attribute must be set.
    pub style: Style,
    pub compression: CompressionLevel,
}

impl Workbook {
    pub fn new() -> Self {
        let now = Utc::now();
        Workbook {
            creator: String::new(),
            last_modified_by: String::new(),
            created_at: now,
            modified_at: now,
            sheets: Vec::new(),
            active_sheet: None,
            style: Style::workbook_default(),
            compression: CompressionLevel::default(),
        }
    }

    /// Append a sheet.
    pub fn add_sheet(&mut self, sheet: Sheet) {
        self.sheets.push(sheet);
    }

    /// Save the workbook to a file.
    pub fn save(&self, path: &str) -> Result<()> {
        let file = File::create(path)?;
        self.save_to_writer(BufWriter::with_capacity(1024 * 1024, file))
    }

    /// Save the workbook to an in-memory byte vector.
    pub fn save_to_bytes(&self) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        self.write_package(&mut zip)?;
        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }

    /// Save the workbook to any writer that implements Write + Seek.
    pub fn save_to_writer<W: Write + Seek>(&self, writer: W) -> Result<()> {
        let mut zip = ZipWriter::new(writer);
        self.write_package(&mut zip)?;
        zip.finish()?;
        Ok(())
    }

    fn file_options(&self) -> FileOptions<'static, ExtendedFileOptions> {
        match self.compression {
            CompressionLevel::None => {
                FileOptions::default().compression_method(CompressionMethod::Stored)
            }
            CompressionLevel::Fast => FileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .compression_level(Some(1)),
            CompressionLevel::Default => FileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .compression_level(Some(6)),
            CompressionLevel::Best => FileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .compression_level(Some(9)),
        }
    }

    fn write_package<W: Write + Seek>(&self, zip: &mut ZipWriter<W>) -> Result<()> {
        let options = self.file_options();

        // fail fast, before any entry is written: the workbook default is the
        // cascade's base case and must be complete and expressible
        let default = self.style.finalize()?;
        let mut tables = StyleTables::seed(&default)?;

        // an empty workbook still gets one sheet; names are deduplicated into
        // a local list so the model itself stays untouched
        let fallback_sheet;
        let sheets: Vec<&Sheet> = if self.sheets.is_empty() {
            fallback_sheet = Sheet::new("Sheet");
            vec![&fallback_sheet]
        } else {
            self.sheets.iter().collect()
        };
        let names = dedup_names(&sheets);

        for (i, sheet) in sheets.iter().enumerate() {
            zip.start_file(format!("xl/worksheets/sheet{}.xml", i + 1), options.clone())?;
            self.write_sheet_part(zip, sheet, i, &default, &mut tables)?;
        }

        zip.start_file("xl/styles.xml", options.clone())?;
        tables.write_xml(zip)?;

        writer::write_static_parts(zip, &options, self, &names)?;
        Ok(())
    }

    fn write_sheet_part<W: Write + Seek>(
        &self,
        zip: &mut ZipWriter<W>,
        sheet: &Sheet,
        index: usize,
        default: &ResolvedStyle,
        tables: &mut StyleTables,
    ) -> Result<()> {
        let mut xml = String::with_capacity(1024);
        xml.push_str(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
             <worksheet xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\" xmlns:r=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships\">\n\
             <dimension ref=\"A1\"/>\n",
        );
        write_sheet_views(&mut xml, sheet, self.active_sheet == Some(index));
        xml.push_str("<sheetFormatPr defaultRowHeight=\"14.5\"/>\n");

        let sheet_style = match &sheet.style {
            Some(s) => s.resolve_over(default),
            None => default.clone(),
        };
        let sheet_style_id = tables.map_style(&sheet_style);

        // column declarations and the column defaults the sheet writer uses
        // for fillers and unstyled cells
        let mut col_defaults = BTreeMap::new();
        if !sheet.columns.is_empty() {
            xml.push_str("<cols>\n");
            for (&idx, column) in &sheet.columns {
                let resolved = match &column.style {
                    Some(s) => s.resolve_over(&sheet_style),
                    None => sheet_style.clone(),
                };
                let style_id = tables.map_style(&resolved);
                let _ = write!(
                    xml,
                    "<col min=\"{idx}\" max=\"{idx}\" width=\"{}\"",
                    format_width(column.width.unwrap_or(DEFAULT_COL_WIDTH))
                );
                // width is mandatory; without it the style has no effect
                if column.width.is_some() {
                    xml.push_str(" customWidth=\"1\"");
                }
                if style_id != 0 {
                    let _ = write!(xml, " style=\"{style_id}\"");
                }
                xml.push_str("/>\n");
                col_defaults.insert(idx, ColDefault { style: resolved, style_id });
            }
            xml.push_str("</cols>\n");
        }

        xml.push_str("<sheetData>");
        zip.write_all(xml.as_bytes())?;

        let mut sw =
            SheetWriter::new(&mut *zip, tables, sheet_style, sheet_style_id, col_defaults);
        (sheet.write_sheet)(&mut sw)?;
        sw.finish()?;

        zip.write_all(
            b"</sheetData>\n\
              <pageMargins left=\"0.7\" right=\"0.7\" top=\"0.75\" bottom=\"0.75\" header=\"0.3\" footer=\"0.3\"/>\n\
              </worksheet>",
        )?;
        Ok(())
    }
}

impl Default for Workbook {
    fn default() -> Self {
        Self::new()
    }
}

fn write_sheet_views(xml: &mut String, sheet: &Sheet, selected: bool) {
    xml.push_str("<sheetViews><sheetView workbookViewId=\"0\"");
    if selected {
        xml.push_str(" tabSelected=\"1\"");
    }
    if sheet.freeze_rows.is_none() && sheet.freeze_cols.is_none() {
        xml.push_str("/></sheetViews>\n");
        return;
    }
    let top_left = cell_ref(
        sheet.freeze_rows.unwrap_or(0) + 1,
        sheet.freeze_cols.unwrap_or(0) + 1,
    );
    let active_pane = match (sheet.freeze_rows, sheet.freeze_cols) {
        (None, _) => "topRight",
        (_, None) => "bottomLeft",
        _ => "bottomRight",
    };
    let _ = write!(
        xml,
        "><pane state=\"frozen\" topLeftCell=\"{top_left}\" activePane=\"{active_pane}\""
    );
    if let Some(cols) = sheet.freeze_cols {
        let _ = write!(xml, " xSplit=\"{cols}\"");
    }
    if let Some(rows) = sheet.freeze_rows {
        let _ = write!(xml, " ySplit=\"{rows}\"");
    }
    let _ = write!(
        xml,
        "/><selection pane=\"{active_pane}\" activeCell=\"{top_left}\" sqref=\"{top_left}\"/></sheetView></sheetViews>\n"
    );
}

/// Column width with at most three decimals, e.g. "8.727" or "20".
fn format_width(width: f64) -> String {
    let formatted = format!("{width:.3}");
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

/// Duplicate sheet names get numeric suffixes, skipping suffixes that would
/// collide with names already in use.
fn dedup_names(sheets: &[&Sheet]) -> Vec<String> {
    let mut names: Vec<String> = sheets.iter().map(|s| s.name.clone()).collect();
    let originals = names.clone();
    for i in 0..names.len() {
        if originals.iter().filter(|n| **n == originals[i]).count() < 2 {
            continue;
        }
        let mut suffix = 1u32;
        loop {
            let candidate = format!("{}{}", originals[i], suffix);
            if !names.contains(&candidate) {
                names[i] = candidate;
                break;
            }
            suffix += 1;
        }
    }
    names
}
