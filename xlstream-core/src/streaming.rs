//! Streaming sheet emission: a forward-only cursor over rows and cells.
//!
//! Rows are written the moment they close and cells the moment they are
//! added, so memory stays O(1) per cell no matter how large the sheet grows.
//! The price is ordering: the cursor only moves forward. Skipped rows and
//! columns are covered by empty fillers; addressing behind the cursor is a
//! caller bug surfaced as an ordering error, and the whole run must be
//! discarded when it happens.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io::Write;

use crate::cell::{date_to_serial, datetime_to_serial, CellValue};
use crate::coords::push_cell_ref;
use crate::error::{Result, XlstreamError};
use crate::style::{ResolvedStyle, Style};
use crate::stylesheet::StyleTables;
use crate::writer::escape_xml;

/// A column's resolved default, precomputed once per sheet so fillers and
/// unstyled cells don't re-run the cascade.
pub(crate) struct ColDefault {
    pub(crate) style: ResolvedStyle,
    pub(crate) style_id: u32,
}

/// Per-sheet streaming writer handed to the sheet callback.
///
/// Create rows with [`start_row`](Self::start_row) and friends, then emit
/// cells with the [`add_cell`](Self::add_cell) family. Both cursors are
/// 1-based and monotonically non-decreasing for the lifetime of the sheet.
pub struct SheetWriter<'a> {
    out: &'a mut dyn Write,
    tables: &'a mut StyleTables,
    /// Workbook default with the sheet override applied.
    sheet_style: ResolvedStyle,
    sheet_style_id: u32,
    cols: BTreeMap<u32, ColDefault>,
    row: u32,
    col: u32,
    row_open: bool,
    /// Raw override of the currently open row, kept for the cell cascade.
    row_style: Option<Style>,
    /// Scratch buffer reused for every emitted line.
    buf: String,
}

impl<'a> SheetWriter<'a> {
    pub(crate) fn new(
        out: &'a mut dyn Write,
        tables: &'a mut StyleTables,
        sheet_style: ResolvedStyle,
        sheet_style_id: u32,
        cols: BTreeMap<u32, ColDefault>,
    ) -> Self {
        SheetWriter {
            out,
            tables,
            sheet_style,
            sheet_style_id,
            cols,
            row: 1,
            col: 1,
            row_open: false,
            row_style: None,
            buf: String::with_capacity(256),
        }
    }

    /// Current cursor row (1-based).
    pub fn row(&self) -> u32 {
        self.row
    }

    /// Current cursor column (1-based).
    pub fn col(&self) -> u32 {
        self.col
    }

    /// Open the next row with no overrides.
    pub fn start_row(&mut self) -> Result<()> {
        self.start_row_opts(None, None, None)
    }

    /// Open a specific row, emitting empty fillers for any skipped rows.
    pub fn start_row_at(&mut self, row: u32) -> Result<()> {
        self.start_row_opts(Some(row), None, None)
    }

    /// Open a row with full control: target row (`None` for the next one), a
    /// row-level style override, and a custom height in points.
    pub fn start_row_opts(
        &mut self,
        row: Option<u32>,
        style: Option<&Style>,
        height: Option<f64>,
    ) -> Result<()> {
        if self.row_open {
            self.close_row()?;
        }
        let target = row.unwrap_or(self.row);
        if target < self.row {
            return Err(XlstreamError::RowOutOfOrder {
                requested: target,
                current: self.row,
            });
        }
        while self.row < target {
            self.buf.clear();
            let _ = write!(self.buf, "<row r=\"{}\"/>", self.row);
            self.out.write_all(self.buf.as_bytes())?;
            self.row += 1;
        }

        // row style cascade: workbook -> sheet -> row override
        let style_id = match style {
            Some(s) => {
                let resolved = s.resolve_over(&self.sheet_style);
                self.tables.map_style(&resolved)
            }
            None => self.sheet_style_id,
        };
        self.buf.clear();
        let _ = write!(self.buf, "<row r=\"{}\"", self.row);
        if style_id != 0 {
            let _ = write!(self.buf, " s=\"{style_id}\" customFormat=\"1\"");
        }
        if let Some(h) = height {
            let _ = write!(self.buf, " ht=\"{h}\" customHeight=\"1\"");
        }
        self.buf.push('>');
        self.out.write_all(self.buf.as_bytes())?;

        self.row_open = true;
        self.col = 1;
        self.row_style = style.cloned();
        Ok(())
    }

    /// Write a cell in the next column, opening a row first if none is open.
    pub fn add_cell<V: Into<CellValue>>(&mut self, value: V) -> Result<()> {
        self.put_cell(None, None, value.into(), None)
    }

    pub fn add_cell_styled<V: Into<CellValue>>(&mut self, value: V, style: &Style) -> Result<()> {
        self.put_cell(None, None, value.into(), Some(style))
    }

    /// Write a cell at a specific column of the current row, filling any
    /// skipped columns.
    pub fn add_cell_at<V: Into<CellValue>>(&mut self, col: u32, value: V) -> Result<()> {
        self.put_cell(None, Some(col), value.into(), None)
    }

    pub fn add_cell_at_styled<V: Into<CellValue>>(
        &mut self,
        col: u32,
        value: V,
        style: &Style,
    ) -> Result<()> {
        self.put_cell(None, Some(col), value.into(), Some(style))
    }

    /// Write a cell at a specific row and column, starting rows (and emitting
    /// fillers) as needed.
    pub fn add_cell_rc<V: Into<CellValue>>(&mut self, row: u32, col: u32, value: V) -> Result<()> {
        self.put_cell(Some(row), Some(col), value.into(), None)
    }

    pub fn add_cell_rc_styled<V: Into<CellValue>>(
        &mut self,
        row: u32,
        col: u32,
        value: V,
        style: &Style,
    ) -> Result<()> {
        self.put_cell(Some(row), Some(col), value.into(), Some(style))
    }

    /// Close any open row. The package assembler calls this exactly once
    /// after the sheet callback returns; omitting it truncates the sheet.
    pub fn finish(&mut self) -> Result<()> {
        if self.row_open {
            self.close_row()?;
        }
        Ok(())
    }

    fn close_row(&mut self) -> Result<()> {
        self.out.write_all(b"</row>")?;
        self.row += 1;
        self.col = 1;
        self.row_open = false;
        self.row_style = None;
        Ok(())
    }

    /// The style id a filler cell in `col` carries: the column default
    /// (workbook -> sheet -> column), precomputed at sheet start.
    fn filler_style_id(&self, col: u32) -> u32 {
        match self.cols.get(&col) {
            Some(c) => c.style_id,
            None => self.sheet_style_id,
        }
    }

    fn put_cell(
        &mut self,
        row: Option<u32>,
        col: Option<u32>,
        value: CellValue,
        style: Option<&Style>,
    ) -> Result<()> {
        match row {
            Some(r) if self.row_open && r == self.row => {}
            Some(r) => self.start_row_opts(Some(r), None, None)?,
            None if !self.row_open => self.start_row_opts(None, None, None)?,
            None => {}
        }

        let target = col.unwrap_or(self.col);
        if target < self.col {
            return Err(XlstreamError::CellOutOfOrder {
                requested: target,
                current: self.col,
            });
        }
        while self.col < target {
            let filler_id = self.filler_style_id(self.col);
            self.buf.clear();
            self.buf.push_str("<c r=\"");
            push_cell_ref(&mut self.buf, self.row, self.col);
            if filler_id != 0 {
                let _ = write!(self.buf, "\" s=\"{filler_id}\"/>");
            } else {
                self.buf.push_str("\"/>");
            }
            self.out.write_all(self.buf.as_bytes())?;
            self.col += 1;
        }

        // full cascade: workbook -> sheet -> column -> row -> cell; when no
        // row or cell override exists the id was already interned per column
        let style_id = if self.row_style.is_none() && style.is_none() {
            self.filler_style_id(target)
        } else {
            let base = match self.cols.get(&target) {
                Some(c) => &c.style,
                None => &self.sheet_style,
            };
            let resolved = match (style, &self.row_style) {
                (Some(cs), Some(rs)) => cs.or(rs).resolve_over(base),
                (Some(cs), None) => cs.resolve_over(base),
                (None, Some(rs)) => rs.resolve_over(base),
                (None, None) => base.clone(),
            };
            self.tables.map_style(&resolved)
        };

        self.buf.clear();
        self.buf.push_str("<c r=\"");
        push_cell_ref(&mut self.buf, self.row, target);
        self.buf.push('"');
        if style_id != 0 {
            let _ = write!(self.buf, " s=\"{style_id}\"");
        }
        match &value {
            CellValue::String(s) => {
                self.buf.push_str(" t=\"inlineStr\"><is><t");
                let boundary_space = s
                    .chars()
                    .next()
                    .map(|c| c.is_ascii_whitespace())
                    .unwrap_or(false)
                    || s.chars()
                        .last()
                        .map(|c| c.is_ascii_whitespace())
                        .unwrap_or(false);
                if boundary_space {
                    self.buf.push_str(" xml:space=\"preserve\"");
                }
                self.buf.push('>');
                self.buf.push_str(&escape_xml(s));
                self.buf.push_str("</t></is></c>");
            }
            CellValue::Number(n) => {
                let mut num = ryu::Buffer::new();
                self.buf.push_str("><v>");
                self.buf.push_str(num.format(*n));
                self.buf.push_str("</v></c>");
            }
            CellValue::Int(i) => {
                let mut num = itoa::Buffer::new();
                self.buf.push_str("><v>");
                self.buf.push_str(num.format(*i));
                self.buf.push_str("</v></c>");
            }
            CellValue::Bool(b) => {
                self.buf.push_str(" t=\"b\"><v>");
                self.buf.push(if *b { '1' } else { '0' });
                self.buf.push_str("</v></c>");
            }
            CellValue::Date(d) => {
                let mut num = itoa::Buffer::new();
                self.buf.push_str("><v>");
                self.buf.push_str(num.format(date_to_serial(*d)));
                self.buf.push_str("</v></c>");
            }
            CellValue::DateTime(dt) => {
                let mut num = ryu::Buffer::new();
                self.buf.push_str("><v>");
                self.buf.push_str(num.format(datetime_to_serial(*dt)));
                self.buf.push_str("</v></c>");
            }
        }
        self.out.write_all(self.buf.as_bytes())?;
        self.col = target + 1;
        Ok(())
    }
}
