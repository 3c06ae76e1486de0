//! xlstream - streaming producer for xlsx spreadsheets.
//!
//! Build an in-memory workbook model (sheets, columns, cascading style
//! layers), then stream it out as a conformant zip-of-XML package. There is
//! no reference document and no Office dependency, and rows are written the
//! moment they are produced: memory stays flat however large the sheet.
//!
//! Styles cascade workbook -> sheet -> column -> row -> cell; every attribute
//! is independently optional and the first set value wins, cell highest.
//! Resolved styles are deduplicated into the shared style part, so a million
//! identically-styled cells cost one style table entry.
//!
//! # Quick start
//! ```no_run
//! use xlstream_core::{Result, Sheet, Style, Workbook};
//!
//! fn main() -> Result<()> {
//!     let mut wb = Workbook::new();
//!     wb.add_sheet(Sheet::new("Report").with_writer(|sw| {
//!         sw.start_row_opts(None, Some(&Style::new().with_bold(true)), None)?;
//!         sw.add_cell("Name")?;
//!         sw.add_cell("Total")?;
//!         sw.start_row()?;
//!         sw.add_cell("Widgets")?;
//!         sw.add_cell(1234)?;
//!         Ok(())
//!     }));
//!     wb.save("report.xlsx")
//! }
//! ```

pub mod cell;
pub mod coords;
pub mod error;
pub mod streaming;
pub mod style;
pub mod stylesheet;
pub mod workbook;
mod writer;

pub use cell::CellValue;
pub use error::{Result, XlstreamError};
pub use streaming::SheetWriter;
pub use style::{BorderKind, HorizAlign, ResolvedStyle, Style, VertAlign};
pub use stylesheet::{formats, StyleTables};
pub use workbook::{Column, CompressionLevel, Sheet, Workbook};
