use rayon::prelude::*;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;

/// A single cell. Everything the backend sends is folded into these three
/// shapes; `Display` is the one canonical stringification used by filtering,
/// rendering and export alike.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "serde_json::Value")]
pub enum CellValue {
    Text(String),
    Number(f64),
    Empty,
}

impl From<serde_json::Value> for CellValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => CellValue::Empty,
            serde_json::Value::String(s) => CellValue::Text(s),
            serde_json::Value::Number(n) => match n.as_f64() {
                Some(f) => CellValue::Number(f),
                None => CellValue::Text(n.to_string()),
            },
            serde_json::Value::Bool(b) => CellValue::Text(b.to_string()),
            // Nested arrays/objects are not table data, keep them readable
            other => CellValue::Text(other.to_string()),
        }
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Text(s) => serializer.serialize_str(s),
            CellValue::Number(n) => serializer.serialize_f64(*n),
            CellValue::Empty => serializer.serialize_unit(),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Number(n) => {
                if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{n}")
                }
            }
            CellValue::Empty => Ok(()),
        }
    }
}

pub type Row = Vec<CellValue>;

/// The full extracted dataset. Row order defines the global index used as
/// the selection key and must stay stable while filters come and go.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    /// Builds a table, forcing every row to the column count.
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|row| Self::normalize_row(row, width))
            .collect();
        Table { columns, rows }
    }

    fn normalize_row(mut row: Row, width: usize) -> Row {
        row.resize(width, CellValue::Empty);
        row
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Replaces all rows, keeping the column list.
    pub fn replace_rows(&mut self, rows: Vec<Row>) {
        let width = self.columns.len();
        self.rows = rows
            .into_iter()
            .map(|row| Self::normalize_row(row, width))
            .collect();
    }

    /// Overwrites one row in place. Out of range indices are ignored.
    pub fn set_row(&mut self, index: usize, row: Row) {
        let width = self.columns.len();
        if let Some(slot) = self.rows.get_mut(index) {
            *slot = Self::normalize_row(row, width);
        }
    }
}

/// The active view predicate. Never part of the table, never mutates it.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Filter {
    #[default]
    Off,
    /// Row visible iff any cell contains the term, case-insensitive.
    Contains(String),
    /// Row visible iff cell 0 matches `attribute` and cell 1 matches `value`;
    /// an empty term matches everything.
    Fields { attribute: String, value: String },
}

impl Filter {
    pub fn is_active(&self) -> bool {
        match self {
            Filter::Off => false,
            Filter::Contains(term) => !term.trim().is_empty(),
            Filter::Fields { attribute, value } => {
                !attribute.trim().is_empty() || !value.trim().is_empty()
            }
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Filter::Off => String::new(),
            Filter::Contains(term) => format!("search \"{term}\""),
            Filter::Fields { attribute, value } => {
                let mut parts = Vec::new();
                if !attribute.is_empty() {
                    parts.push(format!("attribute \"{attribute}\""));
                }
                if !value.is_empty() {
                    parts.push(format!("value \"{value}\""));
                }
                parts.join(", ")
            }
        }
    }
}

fn cell_matches(cell: Option<&CellValue>, term: &str) -> bool {
    match cell {
        Some(cell) => cell.to_string().to_lowercase().contains(term),
        None => false,
    }
}

/// Projects the table through the filter into an ordered list of global row
/// indices. Pure and order preserving: the result is always a subsequence of
/// `0..row_count`.
pub fn visible_rows(table: &Table, filter: &Filter) -> Vec<usize> {
    if !filter.is_active() {
        return (0..table.row_count()).collect();
    }
    let mut matches: Vec<usize> = match filter {
        Filter::Off => (0..table.row_count()).collect(),
        Filter::Contains(term) => {
            let term = term.trim().to_lowercase();
            table
                .rows()
                .par_iter()
                .enumerate()
                .filter(|(_, row)| row.iter().any(|c| c.to_string().to_lowercase().contains(&term)))
                .map(|(index, _)| index)
                .collect()
        }
        Filter::Fields { attribute, value } => {
            let attribute = attribute.trim().to_lowercase();
            let value = value.trim().to_lowercase();
            table
                .rows()
                .par_iter()
                .enumerate()
                .filter(|(_, row)| {
                    (attribute.is_empty() || cell_matches(row.first(), &attribute))
                        && (value.is_empty() || cell_matches(row.get(1), &value))
                })
                .map(|(index, _)| index)
                .collect()
        }
    };
    matches.sort_unstable();
    matches
}

/// Tri-state over the visible row set, driving the header mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectStatus {
    All,
    Partial,
    None,
}

/// Set of selected global row indices. Indices always reference the
/// unfiltered table, so a selection survives any change of search term.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    picked: HashSet<usize>,
}

impl Selection {
    pub fn toggle(&mut self, index: usize, selected: bool) {
        if selected {
            self.picked.insert(index);
        } else {
            self.picked.remove(&index);
        }
    }

    pub fn contains(&self, index: usize) -> bool {
        self.picked.contains(&index)
    }

    /// Header checkbox semantics: checking unions the visible rows into the
    /// selection (hidden selected rows stay selected), unchecking clears the
    /// whole selection, hidden rows included.
    pub fn set_all_visible(&mut self, visible: &[usize], selected: bool) {
        if selected {
            self.picked.extend(visible.iter().copied());
        } else {
            self.picked.clear();
        }
    }

    pub fn status(&self, visible: &[usize]) -> SelectStatus {
        let all = !visible.is_empty() && visible.iter().all(|index| self.picked.contains(index));
        if all {
            SelectStatus::All
        } else if !self.picked.is_empty() && self.picked.len() < visible.len() {
            SelectStatus::Partial
        } else {
            SelectStatus::None
        }
    }

    /// Ascending global indices; the canonical selection order used both for
    /// request assembly and the positional merge.
    pub fn ordered(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = self.picked.iter().copied().collect();
        indices.sort_unstable();
        indices
    }

    pub fn len(&self) -> usize {
        self.picked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.picked.is_empty()
    }

    pub fn clear(&mut self) {
        self.picked.clear();
    }
}
