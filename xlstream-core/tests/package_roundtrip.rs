use std::io::{Cursor, Read};

use xlstream_core::{
    formats, BorderKind, HorizAlign, Sheet, Style, Workbook, XlstreamError,
};
use zip::ZipArchive;

/// Pull one part out of a saved package as text.
fn read_part(bytes: &[u8], name: &str) -> String {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut part = archive.by_name(name).unwrap();
    let mut text = String::new();
    part.read_to_string(&mut text).unwrap();
    text
}

fn part_names(bytes: &[u8]) -> Vec<String> {
    let archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    archive.file_names().map(str::to_string).collect()
}

#[test]
fn test_package_has_every_part() {
    let mut wb = Workbook::new();
    wb.add_sheet(Sheet::new("One"));
    wb.add_sheet(Sheet::new("Two"));
    let bytes = wb.save_to_bytes().unwrap();
    let names = part_names(&bytes);
    for expected in [
        "[Content_Types].xml",
        "_rels/.rels",
        "docProps/core.xml",
        "docProps/app.xml",
        "xl/workbook.xml",
        "xl/_rels/workbook.xml.rels",
        "xl/styles.xml",
        "xl/theme/theme1.xml",
        "xl/worksheets/sheet1.xml",
        "xl/worksheets/sheet2.xml",
    ] {
        assert!(names.iter().any(|n| n == expected), "missing {expected}");
    }
}

#[test]
fn test_basic_sheet_contents() {
    let mut wb = Workbook::new();
    wb.add_sheet(Sheet::new("Test sheet").with_writer(|sw| {
        sw.start_row()?;
        sw.add_cell("Foo")?;
        sw.add_cell("Bar")?;
        sw.add_cell(123)?;
        sw.add_cell(true)?;
        Ok(())
    }));
    let bytes = wb.save_to_bytes().unwrap();

    let sheet = read_part(&bytes, "xl/worksheets/sheet1.xml");
    assert!(sheet.contains("<c r=\"A1\" t=\"inlineStr\"><is><t>Foo</t></is></c>"));
    assert!(sheet.contains("<c r=\"B1\" t=\"inlineStr\"><is><t>Bar</t></is></c>"));
    assert!(sheet.contains("<c r=\"C1\"><v>123</v></c>"));
    assert!(sheet.contains("<c r=\"D1\" t=\"b\"><v>1</v></c>"));
    // nothing styled, so no cell carries a style attribute
    assert!(!sheet.contains(" s=\""));

    let workbook = read_part(&bytes, "xl/workbook.xml");
    assert!(workbook.contains("<sheet name=\"Test sheet\" sheetId=\"1\" r:id=\"rId1\"/>"));
}

#[test]
fn test_sparse_addressing_fills_gaps() {
    let mut wb = Workbook::new();
    wb.add_sheet(Sheet::new("Sparse").with_writer(|sw| sw.add_cell_rc(7, 4, "X")));
    let bytes = wb.save_to_bytes().unwrap();
    let sheet = read_part(&bytes, "xl/worksheets/sheet1.xml");
    for filler_row in 1..=6 {
        assert!(sheet.contains(&format!("<row r=\"{filler_row}\"/>")));
    }
    assert!(sheet.contains("<c r=\"A7\"/><c r=\"B7\"/><c r=\"C7\"/>"));
    assert!(sheet.contains("<c r=\"D7\" t=\"inlineStr\"><is><t>X</t></is></c>"));
}

#[test]
fn test_styles_deduplicate_across_sheets() {
    let mut wb = Workbook::new();
    for name in ["First", "Second"] {
        wb.add_sheet(Sheet::new(name).with_writer(|sw| {
            sw.add_cell_styled("header", &Style::new().with_bold(true))?;
            Ok(())
        }));
    }
    let bytes = wb.save_to_bytes().unwrap();
    let styles = read_part(&bytes, "xl/styles.xml");
    // one default font plus exactly one bold font, shared by both sheets
    assert!(styles.contains("<fonts count=\"2\">"));
    assert_eq!(styles.matches("<b/>").count(), 1);
    assert!(styles.contains("<cellXfs count=\"2\">"));

    // both sheets reference the same interned id
    let first = read_part(&bytes, "xl/worksheets/sheet1.xml");
    let second = read_part(&bytes, "xl/worksheets/sheet2.xml");
    assert!(first.contains("<c r=\"A1\" s=\"1\""));
    assert!(second.contains("<c r=\"A1\" s=\"1\""));
}

#[test]
fn test_column_styles_and_widths() {
    let mut wb = Workbook::new();
    let mut sheet = Sheet::new("Cols");
    sheet.column_mut(1).width = Some(11.0);
    sheet.column_mut(1).style = Some(Style::new().with_number_format(formats::LOCALE_DATE));
    sheet.column_mut(3).width = Some(20.0);
    wb.add_sheet(sheet.with_writer(|sw| {
        sw.start_row()?;
        sw.add_cell(chrono::NaiveDate::from_ymd_opt(2024, 1, 31).unwrap())?;
        Ok(())
    }));
    let bytes = wb.save_to_bytes().unwrap();
    let sheet_xml = read_part(&bytes, "xl/worksheets/sheet1.xml");
    assert!(sheet_xml.contains("<col min=\"1\" max=\"1\" width=\"11\" customWidth=\"1\" style=\"1\"/>"));
    assert!(sheet_xml.contains("<col min=\"3\" max=\"3\" width=\"20\" customWidth=\"1\"/>"));
    // the date cell inherits the column's format id via the interned style
    assert!(sheet_xml.contains("<c r=\"A1\" s=\"1\"><v>45322</v></c>"));

    let styles = read_part(&bytes, "xl/styles.xml");
    // <LD> maps to the reserved locale date id, no custom numFmt needed
    assert!(!styles.contains("<numFmts"));
    assert!(styles.contains("numFmtId=\"14\""));
}

#[test]
fn test_row_styles_and_heights() {
    let mut wb = Workbook::new();
    wb.add_sheet(Sheet::new("Rows").with_writer(|sw| {
        sw.start_row_opts(
            None,
            Some(
                &Style::new()
                    .with_fill("008800")
                    .with_color("FFFFFF")
                    .with_border_bottom(BorderKind::Medium),
            ),
            Some(32.0),
        )?;
        sw.add_cell("Header")?;
        Ok(())
    }));
    let bytes = wb.save_to_bytes().unwrap();
    let sheet = read_part(&bytes, "xl/worksheets/sheet1.xml");
    assert!(sheet.contains("<row r=\"1\" s=\"1\" customFormat=\"1\" ht=\"32\" customHeight=\"1\">"));

    let styles = read_part(&bytes, "xl/styles.xml");
    assert!(styles.contains("<fgColor rgb=\"FF008800\"/>"));
    assert!(styles.contains("<color rgb=\"FFFFFFFF\"/>"));
    assert!(styles.contains("<bottom style=\"medium\">"));
}

#[test]
fn test_sheet_default_style_cascades() {
    let mut wb = Workbook::new();
    wb.add_sheet(
        Sheet::new("Styled")
            .with_style(
                Style::new()
                    .with_font("Arial")
                    .with_font_size(14.0)
                    .with_horizontal(HorizAlign::Right),
            )
            .with_writer(|sw| {
                sw.start_row()?;
                sw.add_cell("x")?;
                Ok(())
            }),
    );
    let bytes = wb.save_to_bytes().unwrap();
    let styles = read_part(&bytes, "xl/styles.xml");
    assert!(styles.contains("<name val=\"Arial\"/><sz val=\"14\"/>"));
    assert!(styles.contains("horizontal=\"right\""));
    let sheet = read_part(&bytes, "xl/worksheets/sheet1.xml");
    // row and cell both resolve to the sheet default's interned id
    assert!(sheet.contains("<row r=\"1\" s=\"1\" customFormat=\"1\">"));
    assert!(sheet.contains("<c r=\"A1\" s=\"1\""));
}

#[test]
fn test_freeze_panes() {
    let mut wb = Workbook::new();
    let mut sheet = Sheet::new("Frozen");
    sheet.freeze_rows = Some(1);
    sheet.freeze_cols = Some(2);
    wb.add_sheet(sheet);
    wb.active_sheet = Some(0);
    let bytes = wb.save_to_bytes().unwrap();
    let sheet_xml = read_part(&bytes, "xl/worksheets/sheet1.xml");
    assert!(sheet_xml.contains("tabSelected=\"1\""));
    assert!(sheet_xml.contains(
        "<pane state=\"frozen\" topLeftCell=\"C2\" activePane=\"bottomRight\" xSplit=\"2\" ySplit=\"1\"/>"
    ));
    let workbook = read_part(&bytes, "xl/workbook.xml");
    assert!(workbook.contains("activeTab=\"0\""));
}

#[test]
fn test_duplicate_sheet_names_are_suffixed() {
    let mut wb = Workbook::new();
    wb.add_sheet(Sheet::new("Data"));
    wb.add_sheet(Sheet::new("Data"));
    let bytes = wb.save_to_bytes().unwrap();
    let workbook = read_part(&bytes, "xl/workbook.xml");
    assert!(workbook.contains("<sheet name=\"Data1\""));
    assert!(workbook.contains("<sheet name=\"Data2\""));
}

#[test]
fn test_empty_workbook_gets_default_sheet() {
    let wb = Workbook::new();
    let bytes = wb.save_to_bytes().unwrap();
    let workbook = read_part(&bytes, "xl/workbook.xml");
    assert!(workbook.contains("<sheet name=\"Sheet\" sheetId=\"1\""));
    assert!(part_names(&bytes).iter().any(|n| n == "xl/worksheets/sheet1.xml"));
}

#[test]
fn test_custom_number_format_interned_at_164() {
    let mut wb = Workbook::new();
    wb.add_sheet(Sheet::new("Fmt").with_writer(|sw| {
        sw.add_cell_styled(
            1234.5,
            &Style::new().with_number_format(formats::ACCOUNTING_GBP),
        )
    }));
    let bytes = wb.save_to_bytes().unwrap();
    let styles = read_part(&bytes, "xl/styles.xml");
    assert!(styles.contains("<numFmts count=\"1\">"));
    assert!(styles.contains("numFmtId=\"164\""));
    assert!(styles.contains("applyNumberFormat=\"1\""));
}

#[test]
fn test_ordering_error_aborts_save() {
    let mut wb = Workbook::new();
    wb.add_sheet(Sheet::new("Bad").with_writer(|sw| {
        sw.add_cell_at(5, "x")?;
        sw.add_cell_at(2, "y")?;
        Ok(())
    }));
    let err = wb.save_to_bytes().unwrap_err();
    assert!(matches!(err, XlstreamError::CellOutOfOrder { .. }));
}

#[test]
fn test_doc_props_metadata() {
    let mut wb = Workbook::new();
    wb.creator = "alice".to_string();
    wb.last_modified_by = "bob & co".to_string();
    wb.add_sheet(Sheet::new("Meta"));
    let bytes = wb.save_to_bytes().unwrap();
    let core = read_part(&bytes, "docProps/core.xml");
    assert!(core.contains("<dc:creator>alice</dc:creator>"));
    assert!(core.contains("<cp:lastModifiedBy>bob &amp; co</cp:lastModifiedBy>"));
    let app = read_part(&bytes, "docProps/app.xml");
    assert!(app.contains("<vt:lpstr>Meta</vt:lpstr>"));
}

#[test]
fn test_save_to_file() {
    let mut wb = Workbook::new();
    wb.add_sheet(Sheet::new("Disk").with_writer(|sw| sw.add_cell("on disk")));
    let temp = tempfile::NamedTempFile::new().unwrap();
    let path = temp.path().to_str().unwrap();
    wb.save(path).unwrap();
    let bytes = std::fs::read(path).unwrap();
    let sheet = read_part(&bytes, "xl/worksheets/sheet1.xml");
    assert!(sheet.contains("on disk"));
}

#[test]
fn test_large_sheet_streams() {
    // a few hundred thousand cells; this is the streaming path's whole reason
    // to exist, so make sure it holds together end to end
    let mut wb = Workbook::new();
    wb.add_sheet(Sheet::new("Big").with_writer(|sw| {
        for row in 0..20_000 {
            sw.start_row()?;
            for _ in 0..10 {
                sw.add_cell(row)?;
            }
        }
        Ok(())
    }));
    let bytes = wb.save_to_bytes().unwrap();
    let sheet = read_part(&bytes, "xl/worksheets/sheet1.xml");
    assert!(sheet.contains("<row r=\"20000\">"));
    assert!(sheet.contains("<c r=\"J20000\"><v>19999</v></c>"));
}
