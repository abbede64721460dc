//! Export pipeline: serializes the full table (all columns, original row
//! order, never the filtered or selected subset) into one of four formats.

mod docx;
mod pdf;
mod text;
mod xlsx;

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::table::Table;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("{0}")]
    Xml(#[from] quick_xml::Error),
}

/// Target file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Xlsx,
    Docx,
    Pdf,
    Text,
}

impl ExportFormat {
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Docx => "docx",
            Self::Pdf => "pdf",
            Self::Text => "txt",
        }
    }

    /// Parses a user supplied format name. Unknown names yield `None` and
    /// must be surfaced to the user before anything is written.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "xlsx" | "excel" | "spreadsheet" => Some(Self::Xlsx),
            "docx" | "word" | "document" => Some(Self::Docx),
            "pdf" => Some(Self::Pdf),
            "txt" | "text" | "plain" => Some(Self::Text),
            _ => None,
        }
    }
}

/// Tab separated rendering of the full table, shared with the clipboard.
pub fn to_tsv(table: &Table) -> String {
    text::render(table)
}

/// Serializes `table` into `<filename_base or "output">.<ext>` inside
/// `output_dir` and returns the written path.
pub fn write(
    table: &Table,
    filename_base: &str,
    output_dir: &Path,
    format: ExportFormat,
) -> Result<PathBuf, ExportError> {
    let base = if filename_base.trim().is_empty() {
        "output"
    } else {
        filename_base
    };
    let path = output_dir.join(format!("{base}.{}", format.extension()));
    match format {
        ExportFormat::Xlsx => xlsx::write(table, &path)?,
        ExportFormat::Docx => docx::write(table, &path)?,
        ExportFormat::Pdf => pdf::write(table, &path)?,
        ExportFormat::Text => text::write(table, &path)?,
    }
    info!("Exported {} rows to {}", table.row_count(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::CellValue;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_covers_supported_names_and_rejects_the_rest() {
        assert_eq!(ExportFormat::parse("xlsx"), Some(ExportFormat::Xlsx));
        assert_eq!(ExportFormat::parse("Excel"), Some(ExportFormat::Xlsx));
        assert_eq!(ExportFormat::parse("word"), Some(ExportFormat::Docx));
        assert_eq!(ExportFormat::parse("PDF"), Some(ExportFormat::Pdf));
        assert_eq!(ExportFormat::parse(" txt "), Some(ExportFormat::Text));
        assert_eq!(ExportFormat::parse("csv"), None);
        assert_eq!(ExportFormat::parse(""), None);
    }

    #[test]
    fn extension_matches_format() {
        for (format, ext) in [
            (ExportFormat::Xlsx, "xlsx"),
            (ExportFormat::Docx, "docx"),
            (ExportFormat::Pdf, "pdf"),
            (ExportFormat::Text, "txt"),
        ] {
            assert_eq!(format.extension(), ext);
            assert_eq!(ExportFormat::parse(ext), Some(format));
        }
    }

    #[test]
    fn output_name_falls_back_to_output() {
        let dir = tempfile::tempdir().unwrap();
        let table = Table::new(
            vec!["A".to_string()],
            vec![vec![CellValue::Text("x".to_string())]],
        );
        let path = write(&table, "", dir.path(), ExportFormat::Text).unwrap();
        assert_eq!(path.file_name().unwrap(), "output.txt");
        // The uploaded filename is used verbatim as the base
        let path = write(&table, "skus.xlsx", dir.path(), ExportFormat::Text).unwrap();
        assert_eq!(path.file_name().unwrap(), "skus.xlsx.txt");
    }
}
