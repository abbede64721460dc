use arboard::Clipboard;
use ratatui::crossterm::event::KeyEvent;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::client::{ApiClient, ChatTurn};
use crate::domain::{CmdMode, Config, HELP_TEXT, Message, XrevError};
use crate::export::{self, ExportFormat};
use crate::inputter::{InputResult, Inputter};
use crate::refine;
use crate::table::{Filter, Row, Selection, Table, visible_rows};

#[derive(Debug, PartialEq)]
pub enum Status {
    Ready,
    Quitting,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Modus {
    Table,
    Missing,
    Popup,
    CmdInput,
}

/// The state the upload step hands over; stands in for navigation state.
/// All three fields must be present for the review screen to open.
#[derive(Debug, Default, Deserialize)]
pub struct SessionState {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub columns: Option<Vec<String>>,
    #[serde(default)]
    pub rows: Option<Vec<Row>>,
}

impl SessionState {
    pub fn load(path: &Path) -> Result<Self, XrevError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

pub struct Model {
    config: Config,
    pub status: Status,
    modus: Modus,
    previous_modus: Modus,
    api: ApiClient,
    filename: Option<String>,
    table: Option<Table>,
    filter: Filter,
    visible: Vec<usize>,
    selection: Selection,
    chat: Vec<ChatTurn>,
    prompt: String,
    cursor: usize,
    offset: usize,
    view_height: usize,
    error: String,
    status_message: String,
    popup_message: String,
    input: Inputter,
    last_input: InputResult,
    cmd_mode: Option<CmdMode>,
    active_cmdinput: bool,
    clipboard: Option<Clipboard>,
}

impl Model {
    pub fn init(config: Config, session: SessionState) -> Self {
        let api = ApiClient::new(config.backend_url.clone());
        let (filename, table) = match (session.filename, session.columns, session.rows) {
            (Some(filename), Some(columns), Some(rows)) => {
                (Some(filename), Some(Table::new(columns, rows)))
            }
            _ => (None, None),
        };
        let modus = if table.is_some() {
            Modus::Table
        } else {
            warn!("No file or extraction results in the session state");
            Modus::Missing
        };
        let mut model = Self {
            config,
            status: Status::Ready,
            modus,
            previous_modus: modus,
            api,
            filename,
            table,
            filter: Filter::Off,
            visible: Vec::new(),
            selection: Selection::default(),
            chat: Vec::new(),
            prompt: String::new(),
            cursor: 0,
            offset: 0,
            view_height: 24,
            error: String::new(),
            status_message: String::new(),
            popup_message: String::new(),
            input: Inputter::default(),
            last_input: InputResult::default(),
            cmd_mode: None,
            active_cmdinput: false,
            clipboard: None,
        };
        model.refresh_visible();
        if let Some(table) = &model.table {
            let message = format!(
                "Loaded {} rows from {}",
                table.row_count(),
                model.filename.as_deref().unwrap_or("?")
            );
            model.set_status_message(message);
        }
        model
    }

    pub fn update(&mut self, message: Message) -> Result<(), XrevError> {
        match self.modus {
            Modus::Table => match message {
                Message::Quit => self.quit(),
                Message::MoveUp => self.move_cursor_up(1),
                Message::MoveDown => self.move_cursor_down(1),
                Message::MovePageUp => self.move_cursor_up(self.view_height),
                Message::MovePageDown => self.move_cursor_down(self.view_height),
                Message::MoveBeginning => self.move_cursor_to(0),
                Message::MoveEnd => self.move_cursor_to(self.visible.len().saturating_sub(1)),
                Message::ToggleSelect => self.toggle_current(),
                Message::ToggleSelectAll => self.toggle_select_all(),
                Message::Search => self.enter_cmd_mode(CmdMode::SearchTable),
                Message::FilterAttribute => self.enter_cmd_mode(CmdMode::FilterAttribute),
                Message::FilterValue => self.enter_cmd_mode(CmdMode::FilterValue),
                Message::ClearFilter => self.clear_filter(),
                Message::RefinePrompt => self.enter_refine_prompt(),
                Message::Reprocess => self.reprocess(),
                Message::Export => self.enter_cmd_mode(CmdMode::ExportFormat),
                Message::CopyRow => self.copy_row(),
                Message::CopyTable => self.copy_table(),
                Message::Help => self.show_popup(HELP_TEXT),
                Message::Exit => {}
                Message::Resize(width, height) => self.resize(width, height),
                Message::RawKey(_) => {}
            },
            Modus::Missing => match message {
                Message::Quit | Message::Exit => self.quit(),
                Message::Resize(width, height) => self.resize(width, height),
                _ => {}
            },
            Modus::Popup => match message {
                Message::Quit => self.quit(),
                Message::Exit | Message::Help => self.close_popup(),
                Message::Resize(width, height) => self.resize(width, height),
                _ => {}
            },
            Modus::CmdInput => {
                if let Message::RawKey(key) = message {
                    self.raw_input(key);
                } else if let Message::Resize(width, height) = message {
                    self.resize(width, height);
                }
            }
        }
        Ok(())
    }

    // -------------------- view accessors ---------------------- //

    pub fn raw_keyevents(&self) -> bool {
        self.active_cmdinput
    }

    pub fn is_missing(&self) -> bool {
        self.table.is_none()
    }

    pub fn user(&self) -> &str {
        &self.config.user
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    pub fn table(&self) -> Option<&Table> {
        self.table.as_ref()
    }

    pub fn visible(&self) -> &[usize] {
        &self.visible
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn view_height(&self) -> usize {
        self.view_height
    }

    pub fn error(&self) -> &str {
        &self.error
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    pub fn chat_turns(&self) -> usize {
        self.chat.len()
    }

    pub fn max_column_width(&self) -> usize {
        self.config.max_column_width
    }

    pub fn popup(&self) -> Option<&str> {
        (self.modus == Modus::Popup).then_some(self.popup_message.as_str())
    }

    pub fn cmdline(&self) -> Option<(CmdMode, &InputResult)> {
        match (self.active_cmdinput, self.cmd_mode) {
            (true, Some(mode)) => Some((mode, &self.last_input)),
            _ => None,
        }
    }

    // -------------------- control handling -------------------- //

    pub fn quit(&mut self) {
        self.status = Status::Quitting;
    }

    fn resize(&mut self, _width: u16, height: u16) {
        // Header, borders, table header, status and command line
        self.view_height = (height as usize).saturating_sub(6).max(1);
        self.clamp_viewport();
    }

    fn refresh_visible(&mut self) {
        self.visible = match &self.table {
            Some(table) => visible_rows(table, &self.filter),
            None => Vec::new(),
        };
        self.clamp_viewport();
    }

    fn clamp_viewport(&mut self) {
        if self.visible.is_empty() {
            self.cursor = 0;
            self.offset = 0;
            return;
        }
        self.cursor = self.cursor.min(self.visible.len() - 1);
        if self.cursor < self.offset {
            self.offset = self.cursor;
        }
        let height = self.view_height.max(1);
        if self.cursor >= self.offset + height {
            self.offset = self.cursor + 1 - height;
        }
    }

    fn move_cursor_up(&mut self, step: usize) {
        self.cursor = self.cursor.saturating_sub(step);
        self.clamp_viewport();
    }

    fn move_cursor_down(&mut self, step: usize) {
        if !self.visible.is_empty() {
            self.cursor = (self.cursor + step).min(self.visible.len() - 1);
        }
        self.clamp_viewport();
    }

    fn move_cursor_to(&mut self, position: usize) {
        self.cursor = position;
        self.clamp_viewport();
    }

    fn toggle_current(&mut self) {
        if let Some(&index) = self.visible.get(self.cursor) {
            let selected = !self.selection.contains(index);
            self.selection.toggle(index, selected);
            debug!("Row {index} selected: {selected}");
        }
    }

    /// Header checkbox behavior: if everything visible is selected the whole
    /// selection is cleared (hidden rows included), otherwise the visible
    /// rows are added to it.
    fn toggle_select_all(&mut self) {
        use crate::table::SelectStatus;
        let select = self.selection.status(&self.visible) != SelectStatus::All;
        self.selection.set_all_visible(&self.visible, select);
        self.set_status_message(format!("{} rows selected", self.selection.len()));
    }

    fn enter_cmd_mode(&mut self, mode: CmdMode) {
        if self.table.is_none() {
            return;
        }
        self.previous_modus = self.modus;
        self.modus = Modus::CmdInput;
        self.cmd_mode = Some(mode);
        self.active_cmdinput = true;
        self.input.clear();
        match mode {
            CmdMode::SearchTable => {
                if let Filter::Contains(term) = &self.filter {
                    self.input.prefill(term);
                }
            }
            CmdMode::FilterAttribute => {
                if let Filter::Fields { attribute, .. } = &self.filter {
                    self.input.prefill(attribute);
                }
            }
            CmdMode::FilterValue => {
                if let Filter::Fields { value, .. } = &self.filter {
                    self.input.prefill(value);
                }
            }
            CmdMode::RefinePrompt => self.input.prefill(&self.prompt),
            CmdMode::ExportFormat => {}
        }
        self.last_input = self.input.snapshot();
    }

    fn raw_input(&mut self, key: KeyEvent) {
        self.last_input = self.input.read(key);
        if !self.last_input.finished {
            return;
        }
        self.active_cmdinput = false;
        self.modus = self.previous_modus;
        let canceled = self.last_input.canceled;
        let text = self.last_input.input.clone();
        let mode = self.cmd_mode.take();
        self.input.clear();
        self.last_input = self.input.snapshot();
        if canceled {
            return;
        }
        match mode {
            Some(CmdMode::SearchTable) => self.apply_search(text),
            Some(CmdMode::FilterAttribute) => self.apply_field_filter(text, true),
            Some(CmdMode::FilterValue) => self.apply_field_filter(text, false),
            Some(CmdMode::RefinePrompt) => self.run_refine(text),
            Some(CmdMode::ExportFormat) => self.run_export(&text),
            None => {}
        }
    }

    // -------------------- filtering -------------------- //

    fn apply_search(&mut self, term: String) {
        self.filter = if term.trim().is_empty() {
            Filter::Off
        } else {
            Filter::Contains(term)
        };
        self.refresh_visible();
        self.report_filter();
    }

    fn apply_field_filter(&mut self, term: String, is_attribute: bool) {
        let (mut attribute, mut value) = match &self.filter {
            Filter::Fields { attribute, value } => (attribute.clone(), value.clone()),
            _ => (String::new(), String::new()),
        };
        if is_attribute {
            attribute = term;
        } else {
            value = term;
        }
        self.filter = if attribute.trim().is_empty() && value.trim().is_empty() {
            Filter::Off
        } else {
            Filter::Fields { attribute, value }
        };
        self.refresh_visible();
        self.report_filter();
    }

    fn clear_filter(&mut self) {
        self.filter = Filter::Off;
        self.refresh_visible();
        self.set_status_message("Filter cleared");
    }

    fn report_filter(&mut self) {
        let total = self.table.as_ref().map_or(0, Table::row_count);
        if self.filter.is_active() {
            self.set_status_message(format!("{} of {total} rows match", self.visible.len()));
        } else {
            self.set_status_message(format!("{total} rows"));
        }
    }

    // -------------------- refinement -------------------- //

    fn enter_refine_prompt(&mut self) {
        if self.table.is_none() {
            return;
        }
        if self.selection.is_empty() {
            self.show_popup("Select at least one row to refine.");
            return;
        }
        self.enter_cmd_mode(CmdMode::RefinePrompt);
    }

    fn run_refine(&mut self, prompt: String) {
        self.prompt = prompt;
        let Some(table) = self.table.as_ref() else {
            return;
        };
        if let Err(warning) = refine::validate(&self.selection, &self.prompt) {
            warn!("Refine blocked: {warning}");
            self.show_popup(warning);
            return;
        }
        let request = refine::build_request(table, &self.selection, &self.chat, &self.prompt);
        let ordered = self.selection.ordered();
        match self.api.refine(&request) {
            Ok(response) => {
                self.apply_refine_success(ordered, request.chat_history, response.rows);
            }
            Err(err) => self.refine_failed(&err.to_string()),
        }
    }

    /// Commit point of a successful refinement: reconcile, advance the chat
    /// log to its speculative version, drop selection and prompt.
    fn apply_refine_success(&mut self, ordered: Vec<usize>, chat: Vec<ChatTurn>, rows: Vec<Row>) {
        if let Some(table) = self.table.as_mut() {
            let plan = refine::plan(table.row_count(), rows);
            refine::apply(table, &ordered, plan);
        }
        self.chat = chat;
        self.selection.clear();
        self.prompt.clear();
        self.refresh_visible();
        self.show_popup("Attributes refined successfully.");
    }

    /// A failed call must leave table, selection, prompt and chat log
    /// exactly as they were; only the popup changes.
    fn refine_failed(&mut self, message: &str) {
        error!("Refine failed: {message}");
        self.show_popup(&format!("Error refining attributes: {message}"));
    }

    // -------------------- reprocess -------------------- //

    fn reprocess(&mut self) {
        let Some(filename) = self.filename.clone() else {
            return;
        };
        match self.api.process(&filename) {
            Ok(response) => self.apply_reprocess_success(response.columns, response.rows),
            Err(err) => self.apply_reprocess_failure(err.to_string()),
        }
    }

    fn apply_reprocess_success(&mut self, columns: Vec<String>, rows: Vec<Row>) {
        let table = Table::new(columns, rows);
        info!("Re-processed into {} rows", table.row_count());
        self.set_status_message(format!("Re-processed: {} rows", table.row_count()));
        self.table = Some(table);
        self.error.clear();
        self.reset_view_state();
    }

    fn apply_reprocess_failure(&mut self, message: String) {
        error!("Re-processing failed: {message}");
        self.table = Some(Table::new(Vec::new(), Vec::new()));
        self.error = message;
        self.reset_view_state();
    }

    /// A wholesale table swap invalidates every global index and any active
    /// view state derived from the old rows.
    fn reset_view_state(&mut self) {
        self.selection.clear();
        self.filter = Filter::Off;
        self.cursor = 0;
        self.offset = 0;
        self.refresh_visible();
    }

    // -------------------- export -------------------- //

    fn run_export(&mut self, input: &str) {
        let Some(table) = self.table.as_ref() else {
            return;
        };
        let Some(format) = ExportFormat::parse(input) else {
            self.show_popup(&format!("Unsupported export format: {input}"));
            return;
        };
        let base = self.filename.as_deref().unwrap_or("output");
        let directory = PathBuf::from(&self.config.output_dir);
        match export::write(table, base, &directory, format) {
            Ok(path) => self.set_status_message(format!("Exported to {}", path.display())),
            Err(err) => {
                error!("Export failed: {err}");
                self.show_popup(&format!("Export failed: {err}"));
            }
        }
    }

    // -------------------- clipboard -------------------- //

    fn wrap_cell_content(content: &str) -> String {
        let needs_escaping = content.contains('"');
        let needs_wrapping = content.chars().any(|c| c == ' ' || c == '\t' || c == ',');
        let mut out = content.to_string();
        if needs_escaping {
            out = out.replace('"', "\"\"");
        }
        if needs_wrapping || needs_escaping {
            out = format!("\"{out}\"");
        }
        out
    }

    fn copy_row(&mut self) {
        let Some(&index) = self.visible.get(self.cursor) else {
            return;
        };
        let Some(row) = self.table.as_ref().and_then(|t| t.row(index)) else {
            return;
        };
        let content = row
            .iter()
            .map(|cell| Self::wrap_cell_content(&cell.to_string()))
            .collect::<Vec<String>>()
            .join(",");
        self.clipboard_copy(content, "row");
    }

    fn copy_table(&mut self) {
        let Some(table) = self.table.as_ref() else {
            return;
        };
        let content = export::to_tsv(table);
        self.clipboard_copy(content, "table");
    }

    fn clipboard_copy(&mut self, content: String, what: &str) {
        if self.clipboard.is_none() {
            match Clipboard::new() {
                Ok(clipboard) => self.clipboard = Some(clipboard),
                Err(err) => {
                    error!("Clipboard unavailable: {err:?}");
                    self.set_status_message("Clipboard unavailable");
                    return;
                }
            }
        }
        if let Some(clipboard) = self.clipboard.as_mut() {
            match clipboard.set_text(content) {
                Ok(()) => self.set_status_message(format!("Copied {what} to clipboard")),
                Err(err) => {
                    error!("Error copying to clipboard: {err:?}");
                    self.set_status_message("Copy failed");
                }
            }
        }
    }

    // -------------------- popups and status -------------------- //

    fn show_popup(&mut self, message: &str) {
        if self.modus != Modus::Popup {
            self.previous_modus = self.modus;
        }
        self.modus = Modus::Popup;
        self.popup_message = message.to_string();
    }

    fn close_popup(&mut self) {
        self.modus = self.previous_modus;
        self.popup_message.clear();
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::CellValue;
    use pretty_assertions::assert_eq;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn row(a: &str, b: &str) -> Row {
        vec![text(a), text(b)]
    }

    fn session() -> SessionState {
        SessionState {
            filename: Some("skus.xlsx".to_string()),
            columns: Some(vec!["Attribute".to_string(), "Value".to_string()]),
            rows: Some(vec![
                row("Engine", "V8"),
                row("Mileage", "120000"),
                row("Fuel", "Diesel"),
                row("Transmission", "manual"),
            ]),
        }
    }

    fn model() -> Model {
        Model::init(Config::default(), session())
    }

    #[test]
    fn incomplete_session_renders_placeholder() {
        let state = SessionState {
            filename: Some("skus.xlsx".to_string()),
            columns: None,
            rows: Some(Vec::new()),
        };
        let model = Model::init(Config::default(), state);
        assert!(model.is_missing());
        assert!(model.table().is_none());
    }

    #[test]
    fn session_json_with_missing_fields_parses() {
        let state: SessionState = serde_json::from_str(r#"{"filename": "a.pdf"}"#).unwrap();
        assert_eq!(state.filename.as_deref(), Some("a.pdf"));
        assert!(state.columns.is_none());
    }

    #[test]
    fn selection_survives_filter_changes() {
        let mut model = model();
        model.update(Message::ToggleSelect).unwrap(); // global index 0
        model.apply_search("diesel".to_string());
        assert_eq!(model.visible(), &[2]);
        assert!(model.selection().contains(0));
        model.apply_search(String::new());
        assert_eq!(model.visible().len(), 4);
    }

    #[test]
    fn select_all_only_affects_visible_rows_but_clear_drops_everything() {
        let mut model = model();
        model.update(Message::ToggleSelect).unwrap(); // index 0 stays hidden below
        model.apply_search("m".to_string()); // Mileage, Transmission
        assert_eq!(model.visible(), &[1, 3]);
        model.update(Message::ToggleSelectAll).unwrap();
        assert_eq!(model.selection().len(), 3);
        // All visible are selected, so the next toggle clears the whole set
        model.update(Message::ToggleSelectAll).unwrap();
        assert!(model.selection().is_empty());
    }

    #[test]
    fn refine_with_empty_selection_warns_without_any_request() {
        let mut model = model();
        model.update(Message::RefinePrompt).unwrap();
        assert_eq!(model.popup(), Some("Select at least one row to refine."));
        assert_eq!(model.chat_turns(), 0);
    }

    #[test]
    fn refine_with_blank_prompt_is_blocked() {
        let mut model = model();
        model.update(Message::ToggleSelect).unwrap();
        model.run_refine("   ".to_string());
        assert_eq!(model.popup(), Some("Enter a refinement prompt."));
        assert_eq!(model.chat_turns(), 0);
    }

    #[test]
    fn failed_refine_changes_nothing_but_the_popup() {
        let mut model = model();
        model.update(Message::ToggleSelect).unwrap();
        model.prompt = "normalize units".to_string();
        let table_before = model.table().unwrap().clone();
        let selected_before = model.selection().ordered();

        model.refine_failed("backend returned status 500");

        assert_eq!(model.table().unwrap(), &table_before);
        assert_eq!(model.selection().ordered(), selected_before);
        assert_eq!(model.prompt, "normalize units");
        assert_eq!(model.chat_turns(), 0);
        assert_eq!(
            model.popup(),
            Some("Error refining attributes: backend returned status 500")
        );
    }

    #[test]
    fn successful_refine_merges_commits_chat_and_clears_selection() {
        let mut model = model();
        model.selection.toggle(2, true);
        model.prompt = "expand abbreviations".to_string();
        let chat = vec![ChatTurn::user("expand abbreviations")];

        model.apply_refine_success(vec![2], chat, vec![row("Fuel type", "Diesel (B7)")]);

        let table = model.table().unwrap();
        assert_eq!(table.row(2).unwrap(), &row("Fuel type", "Diesel (B7)"));
        assert_eq!(table.row(0).unwrap(), &row("Engine", "V8"));
        assert!(model.selection().is_empty());
        assert_eq!(model.prompt, "");
        assert_eq!(model.chat_turns(), 1);
        assert_eq!(model.popup(), Some("Attributes refined successfully."));
    }

    #[test]
    fn full_answer_replaces_the_table() {
        let mut model = model();
        model.selection.toggle(0, true);
        let replacement: Vec<Row> = (0..5).map(|i| row("new", &i.to_string())).collect();
        model.apply_refine_success(vec![0], Vec::new(), replacement.clone());
        assert_eq!(model.table().unwrap().rows(), &replacement[..]);
    }

    #[test]
    fn reprocess_success_resets_selection_filter_and_error() {
        let mut model = model();
        model.update(Message::ToggleSelect).unwrap();
        model.apply_search("engine".to_string());
        model.error = "old error".to_string();

        model.apply_reprocess_success(
            vec!["A".to_string()],
            vec![vec![text("fresh")], vec![text("rows")]],
        );

        assert_eq!(model.table().unwrap().row_count(), 2);
        assert!(model.selection().is_empty());
        assert_eq!(model.filter(), &Filter::Off);
        assert_eq!(model.error(), "");
        assert_eq!(model.visible(), &[0, 1]);
    }

    #[test]
    fn reprocess_failure_clears_the_table_and_surfaces_the_error() {
        let mut model = model();
        model.update(Message::ToggleSelect).unwrap();
        model.apply_reprocess_failure("could not reach backend: refused".to_string());
        assert_eq!(model.table().unwrap().row_count(), 0);
        assert!(model.selection().is_empty());
        assert_eq!(model.error(), "could not reach backend: refused");
    }

    #[test]
    fn unknown_export_format_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default().with_output_dir(dir.path().display().to_string());
        let mut model = Model::init(config, session());
        model.run_export("csv");
        assert_eq!(model.popup(), Some("Unsupported export format: csv"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn export_writes_the_full_unfiltered_table() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default().with_output_dir(dir.path().display().to_string());
        let mut model = Model::init(config, session());
        model.apply_search("diesel".to_string()); // filter must not leak into the export
        model.run_export("txt");
        let content = std::fs::read_to_string(dir.path().join("skus.xlsx.txt")).unwrap();
        assert_eq!(content.lines().count(), 5); // header + all four rows
    }

    #[test]
    fn cursor_paging_stays_in_bounds() {
        let mut model = model();
        model.update(Message::Resize(80, 10)).unwrap();
        model.update(Message::MoveEnd).unwrap();
        assert_eq!(model.cursor(), 3);
        model.update(Message::MovePageDown).unwrap();
        assert_eq!(model.cursor(), 3);
        model.update(Message::MoveBeginning).unwrap();
        assert_eq!(model.cursor(), 0);
    }

    #[test]
    fn help_popup_opens_and_escape_closes_it() {
        let mut model = model();
        model.update(Message::Help).unwrap();
        assert!(model.popup().is_some());
        model.update(Message::Exit).unwrap();
        assert!(model.popup().is_none());
    }

    #[test]
    fn csv_quoting_for_clipboard_rows() {
        assert_eq!(Model::wrap_cell_content("plain"), "plain");
        assert_eq!(Model::wrap_cell_content("a b"), "\"a b\"");
        assert_eq!(Model::wrap_cell_content("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
