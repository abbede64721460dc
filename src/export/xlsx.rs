use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::fs::File;
use std::io::Write as _;
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::ExportError;
use crate::table::{CellValue, Table};

const NS_MAIN: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Data" sheetId="1" r:id="rId1"/></sheets></workbook>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#;

/// Spreadsheet archive with a single sheet named "Data": header row first,
/// then one row per table row. Text lands as inline strings, numbers as
/// native numbers, empty cells are omitted.
pub(super) fn write(table: &Table, path: &Path) -> Result<(), ExportError> {
    let file = File::create(path)?;
    let mut archive = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (name, content) in [
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", ROOT_RELS),
        ("xl/workbook.xml", WORKBOOK),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS),
    ] {
        archive.start_file(name, options)?;
        archive.write_all(content.as_bytes())?;
    }

    archive.start_file("xl/worksheets/sheet1.xml", options)?;
    archive.write_all(&sheet_xml(table)?)?;
    archive.finish()?;
    Ok(())
}

fn sheet_xml(table: &Table) -> Result<Vec<u8>, ExportError> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;

    let mut worksheet = BytesStart::new("worksheet");
    worksheet.push_attribute(("xmlns", NS_MAIN));
    writer.write_event(Event::Start(worksheet))?;
    writer.write_event(Event::Start(BytesStart::new("sheetData")))?;

    let header: Vec<CellValue> = table
        .columns()
        .iter()
        .map(|name| CellValue::Text(name.clone()))
        .collect();
    write_sheet_row(&mut writer, 0, &header)?;
    for (index, row) in table.rows().iter().enumerate() {
        write_sheet_row(&mut writer, index + 1, row)?;
    }

    writer.write_event(Event::End(BytesEnd::new("sheetData")))?;
    writer.write_event(Event::End(BytesEnd::new("worksheet")))?;
    Ok(writer.into_inner())
}

fn write_sheet_row(
    writer: &mut Writer<Vec<u8>>,
    index: usize,
    cells: &[CellValue],
) -> Result<(), ExportError> {
    let reference = (index + 1).to_string();
    let mut row = BytesStart::new("row");
    row.push_attribute(("r", reference.as_str()));
    writer.write_event(Event::Start(row))?;

    for (column, cell) in cells.iter().enumerate() {
        let reference = format!("{}{}", column_name(column), index + 1);
        match cell {
            CellValue::Empty => {}
            CellValue::Number(_) => {
                let mut c = BytesStart::new("c");
                c.push_attribute(("r", reference.as_str()));
                c.push_attribute(("t", "n"));
                writer.write_event(Event::Start(c))?;
                writer.write_event(Event::Start(BytesStart::new("v")))?;
                writer.write_event(Event::Text(BytesText::new(&cell.to_string())))?;
                writer.write_event(Event::End(BytesEnd::new("v")))?;
                writer.write_event(Event::End(BytesEnd::new("c")))?;
            }
            CellValue::Text(text) => {
                let mut c = BytesStart::new("c");
                c.push_attribute(("r", reference.as_str()));
                c.push_attribute(("t", "inlineStr"));
                writer.write_event(Event::Start(c))?;
                writer.write_event(Event::Start(BytesStart::new("is")))?;
                writer.write_event(Event::Start(BytesStart::new("t")))?;
                writer.write_event(Event::Text(BytesText::new(text)))?;
                writer.write_event(Event::End(BytesEnd::new("t")))?;
                writer.write_event(Event::End(BytesEnd::new("is")))?;
                writer.write_event(Event::End(BytesEnd::new("c")))?;
            }
        }
    }

    writer.write_event(Event::End(BytesEnd::new("row")))?;
    Ok(())
}

/// 0-based column index to spreadsheet letters: 0 -> A, 25 -> Z, 26 -> AA.
fn column_name(index: usize) -> String {
    let mut name = String::new();
    let mut index = index + 1;
    while index > 0 {
        index -= 1;
        name.insert(0, (b'A' + (index % 26) as u8) as char);
        index /= 26;
    }
    name
}
