use derive_setters::Setters;
use thiserror::Error;

/// Top level error type of the event loop. Backend and export failures are
/// recovered where they happen (popup or status line) and never bubble up,
/// so only terminal, filesystem and session parsing errors appear here.
#[derive(Error, Debug)]
pub enum XrevError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

/// Inputs the controller can hand to the model. One message per user intent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Message {
    Quit,
    MoveUp,
    MoveDown,
    MovePageUp,
    MovePageDown,
    MoveBeginning,
    MoveEnd,
    ToggleSelect,
    ToggleSelectAll,
    Search,
    FilterAttribute,
    FilterValue,
    ClearFilter,
    RefinePrompt,
    Reprocess,
    Export,
    CopyRow,
    CopyTable,
    Help,
    Exit,
    Resize(u16, u16),
    RawKey(ratatui::crossterm::event::KeyEvent),
}

/// What the command line at the bottom is currently collecting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CmdMode {
    SearchTable,
    FilterAttribute,
    FilterValue,
    RefinePrompt,
    ExportFormat,
}

impl CmdMode {
    pub fn label(&self) -> &'static str {
        match self {
            CmdMode::SearchTable => "search",
            CmdMode::FilterAttribute => "attribute",
            CmdMode::FilterValue => "value",
            CmdMode::RefinePrompt => "refine",
            CmdMode::ExportFormat => "export (xlsx|docx|pdf|txt)",
        }
    }
}

#[derive(Debug, Clone, Setters)]
#[setters(prefix = "with_")]
pub struct Config {
    /// Base url of the extraction backend, no trailing slash.
    pub backend_url: String,
    /// Display name shown in the header bar.
    pub user: String,
    /// Directory export files are written into.
    pub output_dir: String,
    /// Crossterm event poll timeout in milliseconds.
    pub event_poll_time: u64,
    /// Widest a column may render before truncation.
    pub max_column_width: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            backend_url: "http://localhost:5000".to_string(),
            user: "User".to_string(),
            output_dir: ".".to_string(),
            event_poll_time: 100,
            max_column_width: 40,
        }
    }
}

pub const HELP_TEXT: &str = "\
xrev key bindings

  Up/k Down/j  move cursor
  PgUp/PgDn    move one page
  g / G        first / last row
  space        select / deselect row
  a            select all visible rows (again: clear selection)
  /            search all cells
  f            filter by attribute (first column)
  v            filter by value (second column)
  x            clear search and filters
  p            refine selected rows with a prompt
  R            re-process the uploaded file
  e            export table (xlsx|docx|pdf|txt)
  y / Y        copy row / table to clipboard
  ?            this help
  Esc          close popup / cancel input
  q            quit";
