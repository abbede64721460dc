use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::fs::File;
use std::io::Write as _;
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::ExportError;
use crate::table::Table;

const NS_W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

/// Word archive with a title paragraph and one table: header row first,
/// then every data row, all values coerced to text.
pub(super) fn write(table: &Table, path: &Path) -> Result<(), ExportError> {
    let title = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("output");
    let title = format!("Extracted Data: {title}");

    let file = File::create(path)?;
    let mut archive = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    archive.start_file("[Content_Types].xml", options)?;
    archive.write_all(CONTENT_TYPES.as_bytes())?;
    archive.start_file("_rels/.rels", options)?;
    archive.write_all(ROOT_RELS.as_bytes())?;
    archive.start_file("word/document.xml", options)?;
    archive.write_all(&document_xml(table, &title)?)?;
    archive.finish()?;
    Ok(())
}

fn document_xml(table: &Table, title: &str) -> Result<Vec<u8>, ExportError> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;

    let mut document = BytesStart::new("w:document");
    document.push_attribute(("xmlns:w", NS_W));
    writer.write_event(Event::Start(document))?;
    writer.write_event(Event::Start(BytesStart::new("w:body")))?;

    write_paragraph(&mut writer, title)?;

    writer.write_event(Event::Start(BytesStart::new("w:tbl")))?;
    writer.write_event(Event::Start(BytesStart::new("w:tblGrid")))?;
    for _ in table.columns() {
        writer.write_event(Event::Empty(BytesStart::new("w:gridCol")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("w:tblGrid")))?;

    let header: Vec<String> = table.columns().to_vec();
    write_table_row(&mut writer, header.iter().map(String::as_str))?;
    for row in table.rows() {
        let cells: Vec<String> = row.iter().map(|cell| cell.to_string()).collect();
        write_table_row(&mut writer, cells.iter().map(String::as_str))?;
    }

    writer.write_event(Event::End(BytesEnd::new("w:tbl")))?;
    writer.write_event(Event::End(BytesEnd::new("w:body")))?;
    writer.write_event(Event::End(BytesEnd::new("w:document")))?;
    Ok(writer.into_inner())
}

fn write_paragraph(writer: &mut Writer<Vec<u8>>, text: &str) -> Result<(), ExportError> {
    writer.write_event(Event::Start(BytesStart::new("w:p")))?;
    writer.write_event(Event::Start(BytesStart::new("w:r")))?;
    writer.write_event(Event::Start(BytesStart::new("w:t")))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new("w:t")))?;
    writer.write_event(Event::End(BytesEnd::new("w:r")))?;
    writer.write_event(Event::End(BytesEnd::new("w:p")))?;
    Ok(())
}

fn write_table_row<'a>(
    writer: &mut Writer<Vec<u8>>,
    cells: impl Iterator<Item = &'a str>,
) -> Result<(), ExportError> {
    writer.write_event(Event::Start(BytesStart::new("w:tr")))?;
    for cell in cells {
        writer.write_event(Event::Start(BytesStart::new("w:tc")))?;
        write_paragraph(writer, cell)?;
        writer.write_event(Event::End(BytesEnd::new("w:tc")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("w:tr")))?;
    Ok(())
}
