use std::fs;
use std::path::Path;

use super::ExportError;
use crate::table::Table;

/// Tab separated text: one header line, one line per row, no trailing
/// newline.
pub(super) fn render(table: &Table) -> String {
    let mut lines = Vec::with_capacity(table.row_count() + 1);
    lines.push(table.columns().join("\t"));
    for row in table.rows() {
        lines.push(
            row.iter()
                .map(|cell| cell.to_string())
                .collect::<Vec<_>>()
                .join("\t"),
        );
    }
    lines.join("\n")
}

pub(super) fn write(table: &Table, path: &Path) -> Result<(), ExportError> {
    fs::write(path, render(table))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::CellValue;
    use pretty_assertions::assert_eq;

    #[test]
    fn renders_exact_tabbed_layout() {
        let table = Table::new(
            vec!["Name".to_string(), "Value".to_string()],
            vec![
                vec![
                    CellValue::Text("x".to_string()),
                    CellValue::Text("1".to_string()),
                ],
                vec![
                    CellValue::Text("y".to_string()),
                    CellValue::Text("2".to_string()),
                ],
            ],
        );
        assert_eq!(render(&table), "Name\tValue\nx\t1\ny\t2");
    }

    #[test]
    fn empty_cells_render_as_empty_fields() {
        let table = Table::new(
            vec!["a".to_string(), "b".to_string()],
            vec![vec![CellValue::Empty, CellValue::Number(2.0)]],
        );
        assert_eq!(render(&table), "a\tb\n\t2");
    }
}
