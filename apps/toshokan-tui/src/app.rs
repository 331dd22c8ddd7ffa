//! Application state and main render loop

use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, List, ListItem, ListState, Paragraph, Row, Table, TableState},
    Frame,
};

use toshokan_core::{
    Command, EditField, EditKind, Focus, OpenTarget, Outcome, Session, TagFilter, ToshokanError,
};

use crate::keybindings::{self, Action};
use crate::widgets::{EditForm, ModeIndicator};

/// What the event loop should do after a key press
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    None,
    Quit,
    /// Hand `path` to the viewer or editor
    Launch { target: OpenTarget, path: PathBuf },
}

/// Main application state
pub struct App {
    session: Session,
    /// Selection in the tag panel; kept by value so tag edits cannot shift it
    selected_tag: TagFilter,
    /// Index into the library table
    selected_row: usize,
    /// Active field of the open edit
    field_index: usize,
    /// Destination of `e`
    export_path: PathBuf,
    /// Status message
    pub status_message: Option<String>,
    /// Whether to show the help overlay
    pub show_help: bool,
}

impl App {
    pub fn new(session: Session, export_path: PathBuf) -> Self {
        Self {
            session,
            selected_tag: TagFilter::All,
            selected_row: 0,
            field_index: 0,
            export_path,
            status_message: None,
            show_help: false,
        }
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    /// The tag selection driving the library table.
    ///
    /// A tag that no entry carries any more stays selected and shows an
    /// empty view.
    fn current_filter(&self) -> TagFilter {
        self.selected_tag.clone()
    }

    /// Position of the selection in the tag panel, if it is still listed.
    fn selected_tag_index(&self) -> Option<usize> {
        self.session
            .tag_filters()
            .iter()
            .position(|filter| filter == &self.selected_tag)
    }

    fn selected_id(&self) -> Option<String> {
        self.session
            .view(&self.current_filter())
            .get(self.selected_row)
            .map(|row| row.id.to_string())
    }

    /// Keep the row selection inside the view after the catalog changed.
    fn clamp_selection(&mut self) {
        let rows = self.session.view(&self.current_filter()).len();
        self.selected_row = self.selected_row.min(rows.saturating_sub(1));
    }

    fn select_id(&mut self, id: &str) {
        if let Some(pos) = self
            .session
            .view(&self.current_filter())
            .iter()
            .position(|row| row.id == id)
        {
            self.selected_row = pos;
        }
        self.clamp_selection();
    }

    /// Run a command; failures go to the status line.
    fn dispatch(&mut self, command: Command) -> Option<Outcome> {
        match self.session.execute(command) {
            Ok(outcome) => Some(outcome),
            Err(err) => {
                match &err {
                    ToshokanError::Interaction(_) | ToshokanError::Edit(_) => {
                        tracing::debug!(error = %err, "command rejected")
                    }
                    _ => tracing::warn!(error = %err, "command failed"),
                }
                self.set_status(err.to_string());
                None
            }
        }
    }

    // === Rendering ===

    /// Render the application
    pub fn render(&self, frame: &mut Frame) {
        let size = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Status bar
                Constraint::Min(0),    // Panels
                Constraint::Length(1), // Hotkeys
                Constraint::Length(1), // Message line
            ])
            .split(size);

        self.render_status_bar(frame, chunks[0]);

        let panels = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 4), Constraint::Ratio(3, 4)])
            .split(chunks[1]);
        self.render_tags(frame, panels[0]);
        self.render_library(frame, panels[1]);

        self.render_hotkeys(frame, chunks[2]);
        self.render_message_line(frame, chunks[3]);

        if let Some(edit) = self.session.interaction().edit() {
            let height = (edit.kind.fields().len() as u16) * 3 + 2;
            let popup = centered_rect_height(70, height, size);
            frame.render_widget(EditForm::new(edit, self.field_index), popup);
        }

        if self.show_help {
            self.render_help_overlay(frame, size);
        }
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let indicator = ModeIndicator::new(self.session.interaction());
        let width = indicator.text().len() as u16 + 1;
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(width), Constraint::Min(0)])
            .split(area);

        let filter = self.current_filter();
        let shown = self.session.view(&filter).len();
        let mut spans = vec![
            Span::styled(
                format!(" {} ", self.session.tag_label(&filter)),
                Style::default().fg(Color::Cyan),
            ),
            Span::raw(format!(
                "| {shown}/{} entries | {} ",
                self.session.catalog().len(),
                self.session.paths().library.display()
            )),
        ];
        if self.session.has_unsaved_changes() {
            spans.push(Span::styled(
                "| UNSAVED (r retries) ",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ));
        }
        let info = Line::from(spans);

        frame.render_widget(indicator, cols[0]);
        frame.render_widget(
            Paragraph::new(info).style(Style::default().bg(Color::DarkGray)),
            cols[1],
        );
    }

    fn panel_block(&self, title: &'static str, panel: Focus) -> Block<'static> {
        let focused = self.session.interaction().focus() == panel;
        let border = if focused {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(border)
    }

    fn highlight(&self, panel: Focus) -> Style {
        if self.session.interaction().focus() == panel {
            Style::default()
                .bg(Color::Green)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().bg(Color::DarkGray)
        }
    }

    fn render_tags(&self, frame: &mut Frame, area: Rect) {
        let items: Vec<ListItem> = self
            .session
            .tag_filters()
            .iter()
            .map(|filter| {
                let style = if filter.is_pseudo() {
                    Style::default().fg(Color::Cyan)
                } else {
                    Style::default()
                };
                ListItem::new(Span::styled(
                    self.session.tag_label(filter).to_string(),
                    style,
                ))
            })
            .collect();

        let list = List::new(items)
            .block(self.panel_block("Tags", Focus::Tags))
            .highlight_style(self.highlight(Focus::Tags));
        let mut state = ListState::default().with_selected(self.selected_tag_index());
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn render_library(&self, frame: &mut Frame, area: Rect) {
        let view = self.session.view(&self.current_filter());
        let rows: Vec<Row> = view
            .iter()
            .map(|row| {
                let entry = row.entry;
                let marker = if entry.read {
                    Cell::from(entry.read_marker()).style(Style::default().fg(Color::Green))
                } else {
                    Cell::from(entry.read_marker()).style(Style::default().fg(Color::DarkGray))
                };
                Row::new(vec![
                    marker,
                    Cell::from(entry.title.clone()),
                    Cell::from(entry.authors.clone()),
                    Cell::from(entry.year.clone()),
                ])
            })
            .collect();

        let header = Row::new(vec!["R", "Title", "Authors", "Year"])
            .style(Style::default().add_modifier(Modifier::BOLD));
        let widths = [
            Constraint::Length(1),
            Constraint::Percentage(60),
            Constraint::Percentage(30),
            Constraint::Length(6),
        ];
        let table = Table::new(rows, widths)
            .header(header)
            .block(self.panel_block("Library", Focus::Library))
            .row_highlight_style(self.highlight(Focus::Library));

        let selected = (!view.is_empty()).then_some(self.selected_row);
        let mut state = TableState::default().with_selected(selected);
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn render_hotkeys(&self, frame: &mut Frame, area: Rect) {
        let text = if self.session.interaction().is_editing() {
            keybindings::EDIT_HOTKEYS
        } else {
            keybindings::HOTKEYS
        };
        frame.render_widget(
            Paragraph::new(text).style(Style::default().fg(Color::Gray)),
            area,
        );
    }

    fn render_message_line(&self, frame: &mut Frame, area: Rect) {
        let content = self
            .status_message
            .clone()
            .unwrap_or_else(|| "Press ? for help".to_string());
        frame.render_widget(Paragraph::new(content), area);
    }

    fn render_help_overlay(&self, frame: &mut Frame, area: Rect) {
        let help_text = r#"
Toshokan - Help

Panels:
  Tab       - Switch focus between tags and library
  j/k       - Move down/up in the focused panel

Library (focused):
  Enter     - Open document in the viewer
  n         - Edit notes
  b         - Edit bibliography record
  m         - Toggle read
  t         - Edit tags
  M / E     - Edit title, authors and year (renames files)

Anywhere:
  r         - Rescan the library
  e         - Export the view's bibliography
  ?         - Toggle this help
  q / Esc   - Quit

While editing:
  Enter     - Save
  Esc       - Cancel
  Tab/Up/Down - Next/previous field
  Ctrl-U    - Clear field
"#;

        let block = Block::default()
            .title("Help")
            .borders(Borders::ALL)
            .style(Style::default().bg(Color::Black));

        let help_area = centered_rect(60, 80, area);
        frame.render_widget(ratatui::widgets::Clear, help_area);
        let paragraph = Paragraph::new(help_text).block(block);
        frame.render_widget(paragraph, help_area);
    }

    // === Input ===

    /// Handle a key press
    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> AppAction {
        if keybindings::is_interrupt(code, modifiers) {
            return AppAction::Quit;
        }
        if self.show_help {
            self.show_help = false;
            return AppAction::None;
        }
        if self.session.interaction().is_editing() {
            self.handle_edit_key(code, modifiers);
            return AppAction::None;
        }
        match keybindings::idle_action(code) {
            Some(action) => self.handle_action(action),
            None => AppAction::None,
        }
    }

    fn handle_action(&mut self, action: Action) -> AppAction {
        match action {
            Action::Quit => return AppAction::Quit,
            Action::ToggleHelp => self.show_help = true,
            Action::MoveUp => self.navigate(-1),
            Action::MoveDown => self.navigate(1),
            Action::SwitchFocus => {
                self.dispatch(Command::SwitchFocus);
            }
            Action::Refresh => {
                if let Some(Outcome::Refreshed(report)) = self.dispatch(Command::Refresh) {
                    self.clamp_selection();
                    self.set_status(format!(
                        "Refreshed: {} added, {} removed, {} placeholder(s)",
                        report.added.len(),
                        report.removed.len(),
                        report.placeholders.len()
                    ));
                }
            }
            Action::Export => {
                let command = Command::Export {
                    filter: self.current_filter(),
                    destination: self.export_path.clone(),
                };
                if let Some(Outcome::Exported(report)) = self.dispatch(command) {
                    self.set_status(format!(
                        "Exported {} record(s) to {} ({} without bibliography)",
                        report.written,
                        self.export_path.display(),
                        report.missing.len()
                    ));
                }
            }
            Action::ToggleRead => {
                if let Some(id) = self.require_selection() {
                    if self.dispatch(Command::ToggleRead { id }).is_some() {
                        self.clamp_selection();
                    }
                }
            }
            Action::EditTags => self.begin_edit(EditKind::Tags),
            Action::EditMetadata => self.begin_edit(EditKind::Metadata),
            Action::OpenDocument => return self.open(OpenTarget::Document),
            Action::OpenNotes => return self.open(OpenTarget::Notes),
            Action::OpenBibliography => return self.open(OpenTarget::Bibliography),
        }
        AppAction::None
    }

    fn require_selection(&mut self) -> Option<String> {
        let id = self.selected_id();
        if id.is_none() {
            self.set_status("No entry selected");
        }
        id
    }

    fn begin_edit(&mut self, kind: EditKind) {
        if let Some(id) = self.require_selection() {
            if self.dispatch(Command::BeginEdit { id, kind }).is_some() {
                self.field_index = 0;
                self.status_message = None;
            }
        }
    }

    fn open(&mut self, target: OpenTarget) -> AppAction {
        let Some(id) = self.require_selection() else {
            return AppAction::None;
        };
        match self.dispatch(Command::Open { id, target }) {
            Some(Outcome::Launch { target, path }) => AppAction::Launch { target, path },
            _ => AppAction::None,
        }
    }

    fn navigate(&mut self, delta: isize) {
        match self.session.interaction().focus() {
            Focus::Tags => {
                let filters = self.session.tag_filters();
                let current = self.selected_tag_index().unwrap_or(0);
                let next = step(current, delta, filters.len());
                if let Some(filter) = filters.get(next) {
                    if filter != &self.selected_tag {
                        self.selected_tag = filter.clone();
                        self.selected_row = 0;
                    }
                }
            }
            Focus::Library => {
                let count = self.session.view(&self.current_filter()).len();
                self.selected_row = step(self.selected_row, delta, count);
            }
        }
    }

    fn active_field(&self) -> Option<(EditField, String)> {
        let edit = self.session.interaction().edit()?;
        let field = *edit.kind.fields().get(self.field_index)?;
        Some((field, edit.draft.get(field).to_string()))
    }

    fn handle_edit_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        let field_count = self
            .session
            .interaction()
            .edit()
            .map_or(1, |edit| edit.kind.fields().len());
        let Some((field, mut value)) = self.active_field() else {
            return;
        };

        match code {
            KeyCode::Esc => {
                if self.dispatch(Command::CancelEdit).is_some() {
                    self.set_status("Edit cancelled");
                }
            }
            KeyCode::Enter => {
                if let Some(Outcome::Saved { id }) = self.dispatch(Command::SaveEdit) {
                    self.select_id(&id);
                    self.set_status(format!("Saved {id}"));
                }
            }
            KeyCode::Tab | KeyCode::Down => {
                self.field_index = (self.field_index + 1) % field_count;
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.field_index = (self.field_index + field_count - 1) % field_count;
            }
            KeyCode::Backspace => {
                value.pop();
                self.dispatch(Command::EditField { field, value });
            }
            KeyCode::Char('u') if modifiers.contains(KeyModifiers::CONTROL) => {
                self.dispatch(Command::EditField {
                    field,
                    value: String::new(),
                });
            }
            KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => {
                value.push(c);
                self.dispatch(Command::EditField { field, value });
            }
            _ => {}
        }
    }
}

/// Move `current` by `delta` within `0..count`, stopping at the ends.
fn step(current: usize, delta: isize, count: usize) -> usize {
    if count == 0 {
        return 0;
    }
    current.saturating_add_signed(delta).min(count - 1)
}

/// Helper function to create a centered rect
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Like [`centered_rect`] but with a fixed height in rows.
fn centered_rect_height(percent_x: u16, height: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(height.min(r.height)),
            Constraint::Min(0),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
