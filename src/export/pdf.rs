//! Minimal paginated PDF writer: a title line and an auto-laid-out table
//! with equal column widths, header repeated on every page. The object and
//! xref layout is emitted directly; only the Type1 Helvetica base font is
//! used, so text outside the printable ASCII range is replaced.

use std::fs;
use std::path::Path;

use super::ExportError;
use crate::table::{Row, Table};

const PAGE_WIDTH: f64 = 595.0; // A4 portrait, points
const PAGE_HEIGHT: f64 = 842.0;
const MARGIN: f64 = 40.0;
const TITLE_SIZE: f64 = 14.0;
const BODY_SIZE: f64 = 7.0;
const ROW_HEIGHT: f64 = 10.0;
const TITLE_GAP: f64 = 16.0;

pub(super) fn write(table: &Table, path: &Path) -> Result<(), ExportError> {
    let title = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("output");
    let title = format!("Extracted Data: {title}");
    fs::write(path, render(table, &title))?;
    Ok(())
}

fn body_capacity(first_page: bool) -> usize {
    let top = if first_page {
        PAGE_HEIGHT - MARGIN - TITLE_SIZE - TITLE_GAP
    } else {
        PAGE_HEIGHT - MARGIN - BODY_SIZE
    };
    // One row height goes to the repeated header line
    (((top - ROW_HEIGHT) - MARGIN) / ROW_HEIGHT) as usize
}

fn render(table: &Table, title: &str) -> Vec<u8> {
    let columns = table.column_count().max(1);
    let column_width = (PAGE_WIDTH - 2.0 * MARGIN) / columns as f64;
    let max_chars = ((column_width / (BODY_SIZE * 0.55)) as usize).max(1);

    let rows = table.rows();
    let mut chunks: Vec<&[Row]> = Vec::new();
    let first = rows.len().min(body_capacity(true));
    chunks.push(&rows[..first]);
    let mut position = first;
    while position < rows.len() {
        let end = (position + body_capacity(false)).min(rows.len());
        chunks.push(&rows[position..end]);
        position = end;
    }

    // Object ids: 1 catalog, 2 page tree, 3 font, then page/content pairs.
    let page_count = chunks.len();
    let mut objects: Vec<(usize, Vec<u8>)> = Vec::with_capacity(3 + 2 * page_count);
    objects.push((1, b"<< /Type /Catalog /Pages 2 0 R >>".to_vec()));
    let kids: Vec<String> = (0..page_count).map(|i| format!("{} 0 R", 4 + 2 * i)).collect();
    objects.push((
        2,
        format!(
            "<< /Type /Pages /Kids [{}] /Count {page_count} >>",
            kids.join(" ")
        )
        .into_bytes(),
    ));
    objects.push((
        3,
        b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_vec(),
    ));

    for (index, chunk) in chunks.iter().enumerate() {
        let stream = page_stream(
            table,
            (index == 0).then_some(title),
            chunk,
            column_width,
            max_chars,
        );
        let page = format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] \
             /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
            5 + 2 * index
        );
        objects.push((4 + 2 * index, page.into_bytes()));
        let content = format!("<< /Length {} >>\nstream\n{stream}endstream", stream.len());
        objects.push((5 + 2 * index, content.into_bytes()));
    }

    let mut out = Vec::new();
    out.extend_from_slice(b"%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (id, body) in &objects {
        offsets.push(out.len());
        out.extend_from_slice(format!("{id} 0 obj\n").as_bytes());
        out.extend_from_slice(body);
        out.extend_from_slice(b"\nendobj\n");
    }
    let xref_offset = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
    out.extend_from_slice(b"0000000000 65535 f \n");
    for offset in offsets {
        out.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n",
            objects.len() + 1
        )
        .as_bytes(),
    );
    out
}

fn page_stream(
    table: &Table,
    title: Option<&str>,
    rows: &[Row],
    column_width: f64,
    max_chars: usize,
) -> String {
    let mut stream = String::new();
    let mut y = PAGE_HEIGHT - MARGIN;
    match title {
        Some(title) => {
            y -= TITLE_SIZE;
            stream.push_str(&text_op(MARGIN, y, TITLE_SIZE, title, usize::MAX));
            y -= TITLE_GAP;
        }
        None => y -= BODY_SIZE,
    }

    for (column, name) in table.columns().iter().enumerate() {
        let x = MARGIN + column as f64 * column_width;
        stream.push_str(&text_op(x, y, BODY_SIZE, name, max_chars));
    }
    y -= ROW_HEIGHT;

    for row in rows {
        for (column, cell) in row.iter().enumerate() {
            let text = cell.to_string();
            if text.is_empty() {
                continue;
            }
            let x = MARGIN + column as f64 * column_width;
            stream.push_str(&text_op(x, y, BODY_SIZE, &text, max_chars));
        }
        y -= ROW_HEIGHT;
    }
    stream
}

fn text_op(x: f64, y: f64, size: f64, text: &str, max_chars: usize) -> String {
    let text: String = text
        .chars()
        .take(max_chars)
        .flat_map(|c| match c {
            '(' => vec!['\\', '('],
            ')' => vec!['\\', ')'],
            '\\' => vec!['\\', '\\'],
            ' '..='~' => vec![c],
            _ => vec!['?'],
        })
        .collect();
    format!("BT /F1 {size} Tf {x:.1} {y:.1} Td ({text}) Tj ET\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::CellValue;
    use pretty_assertions::assert_eq;

    fn table_with_rows(count: usize) -> Table {
        Table::new(
            vec!["Attribute".to_string(), "Value".to_string()],
            (0..count)
                .map(|i| {
                    vec![
                        CellValue::Text(format!("attr{i}")),
                        CellValue::Number(i as f64),
                    ]
                })
                .collect(),
        )
    }

    fn count_pages(document: &[u8]) -> usize {
        let text = String::from_utf8_lossy(document);
        text.matches("<< /Type /Page /Parent").count()
    }

    #[test]
    fn document_frame_is_well_formed() {
        let document = render(&table_with_rows(3), "Extracted Data: skus");
        assert!(document.starts_with(b"%PDF-"));
        let text = String::from_utf8_lossy(&document);
        assert!(text.trim_end().ends_with("%%EOF"));
        assert!(text.contains("startxref"));
        assert!(text.contains("/BaseFont /Helvetica"));
    }

    #[test]
    fn long_tables_paginate_with_repeated_headers() {
        let rows = 200;
        let document = render(&table_with_rows(rows), "t");
        let expected = {
            let mut remaining = rows - body_capacity(true).min(rows);
            let mut pages = 1;
            while remaining > 0 {
                remaining -= body_capacity(false).min(remaining);
                pages += 1;
            }
            pages
        };
        assert_eq!(count_pages(&document), expected);
        let text = String::from_utf8_lossy(&document);
        assert_eq!(text.matches("(Attribute)").count(), expected);
        assert!(text.contains(&format!("/Count {expected}")));
    }

    #[test]
    fn empty_table_still_renders_one_page() {
        let document = render(&table_with_rows(0), "t");
        assert_eq!(count_pages(&document), 1);
    }

    #[test]
    fn parentheses_and_backslashes_are_escaped() {
        let op = text_op(0.0, 0.0, 7.0, r"a(b)c\d", usize::MAX);
        assert!(op.contains(r"(a\(b\)c\\d)"));
    }

    #[test]
    fn cells_are_truncated_to_the_column_budget() {
        let op = text_op(0.0, 0.0, 7.0, "abcdefghij", 4);
        assert!(op.contains("(abcd)"));
    }
}
