//! Application state and main render loop

use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};
use tokio::runtime::Runtime;

use todo_core::item::is_blank;
use todo_core::view::Source;
use todo_core::{
    Applied, Deadline, Reconciler, RemoteStore, SlotStorage, SyncPath, TodoError, TodoId,
};

use crate::keybindings::{normal_mode_action, Action};
use crate::mode::{Field, Mode};
use crate::palette::Palette;

/// Contents of the new-todo form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InsertForm {
    pub text: String,
    pub date: String,
    pub field: Field,
}

impl InsertForm {
    fn focused_mut(&mut self) -> &mut String {
        match self.field {
            Field::Text => &mut self.text,
            Field::Date => &mut self.date,
        }
    }

    /// Parsed date; an empty field means no date
    fn deadline(&self) -> Result<Option<Deadline>, String> {
        if is_blank(&self.date) {
            return Ok(None);
        }
        self.date
            .parse()
            .map(Some)
            .map_err(|e: todo_core::item::ParseDeadlineError| e.to_string())
    }
}

/// Destructive action waiting for confirmation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pending {
    Delete(TodoId),
    ClearCompleted,
}

/// Main application state
pub struct App<R, S> {
    /// Current mode (NORMAL, INSERT, EDIT, CONFIRM)
    pub mode: Mode,
    /// Selected row index
    pub selected: usize,
    /// New-todo form
    pub form: InsertForm,
    /// Status message
    pub status_message: Option<String>,
    /// Whether to show the help overlay
    pub show_help: bool,
    pending: Option<Pending>,
    reconciler: Reconciler<R, S>,
    runtime: Runtime,
}

impl<R: RemoteStore, S: SlotStorage> App<R, S> {
    /// Create a new application around a reconciler
    pub fn new(reconciler: Reconciler<R, S>) -> std::io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        Ok(Self {
            mode: Mode::Normal,
            selected: 0,
            form: InsertForm::default(),
            status_message: None,
            show_help: false,
            pending: None,
            reconciler,
            runtime,
        })
    }

    pub fn reconciler(&self) -> &Reconciler<R, S> {
        &self.reconciler
    }

    pub fn pending(&self) -> Option<&Pending> {
        self.pending.as_ref()
    }

    fn selected_id(&self) -> Option<TodoId> {
        self.reconciler
            .view()
            .items()
            .get(self.selected)
            .map(|item| item.id.clone())
    }

    fn clamp_selection(&mut self) {
        let len = self.reconciler.view().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    // ==================== Operations ====================

    /// Load the list, preferring the server
    pub fn load(&mut self) {
        let result = self.runtime.block_on(self.reconciler.load());
        match result {
            Ok(_) => {
                let count = self.reconciler.view().len();
                let from = match self.reconciler.view().source() {
                    Source::Remote => "server",
                    Source::Cache => "local cache",
                    Source::Empty => "nowhere",
                };
                self.status_message = Some(format!("Loaded {} item(s) from {}", count, from));
            }
            Err(e) => self.report_error(e),
        }
        self.clamp_selection();
    }

    fn submit_form(&mut self) {
        let date = match self.form.deadline() {
            Ok(date) => date,
            Err(e) => {
                self.status_message = Some(e);
                return;
            }
        };

        let text = self.form.text.clone();
        let result = self.runtime.block_on(self.reconciler.create(&text, date));
        match result {
            Ok(applied) if applied.path == SyncPath::Skipped => {
                self.status_message = Some("Todo text is empty".to_string());
            }
            Ok(applied) => {
                self.form = InsertForm::default();
                self.mode = Mode::Normal;
                self.selected = self.reconciler.view().len().saturating_sub(1);
                self.report(&applied, "Added");
            }
            Err(e) => self.report_error(e),
        }
    }

    fn toggle_selected(&mut self) {
        let Some(id) = self.selected_id() else {
            return;
        };
        let result = self.runtime.block_on(self.reconciler.toggle(&id));
        match result {
            Ok(applied) => self.report(&applied, "Updated"),
            Err(e) => self.report_error(e),
        }
    }

    fn commit_edit(&mut self) {
        self.mode = Mode::Normal;
        let result = self.runtime.block_on(self.reconciler.commit_edit());
        match result {
            Ok(applied) if applied.path == SyncPath::Skipped => {
                self.status_message = Some("No changes".to_string());
            }
            Ok(applied) => self.report(&applied, "Saved"),
            Err(e) => self.report_error(e),
        }
    }

    fn run_pending(&mut self, pending: Pending) {
        let result = match &pending {
            Pending::Delete(id) => self.runtime.block_on(self.reconciler.delete(id)),
            Pending::ClearCompleted => self.runtime.block_on(self.reconciler.clear_completed()),
        };
        match result {
            Ok(applied) => {
                let removed = applied.changes.len();
                self.status_message = Some(format!("Removed {} item(s)", removed));
            }
            Err(e) => self.report_error(e),
        }
        self.clamp_selection();
    }

    fn toggle_theme(&mut self) {
        match self.reconciler.toggle_theme() {
            Ok(theme) => self.status_message = Some(format!("{} theme", theme)),
            Err(e) => self.report_error(e),
        }
    }

    fn report(&mut self, applied: &Applied, verb: &str) {
        self.status_message = Some(match applied.path {
            SyncPath::Remote => verb.to_string(),
            SyncPath::Local => format!("{} locally (server unreachable)", verb),
            SyncPath::Skipped => "No changes".to_string(),
        });
    }

    fn report_error(&mut self, err: TodoError) {
        tracing::error!("{}", err);
        self.status_message = Some(format!("Error: {}", err));
    }

    // ==================== Rendering ====================

    /// Render the application
    pub fn render(&self, frame: &mut Frame) {
        let size = frame.area();
        let palette = Palette::for_theme(self.reconciler.theme());

        let form_height = if self.mode == Mode::Insert { 4 } else { 0 };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),           // Status bar
                Constraint::Min(0),              // List
                Constraint::Length(form_height), // New-todo form
                Constraint::Length(1),           // Message line
            ])
            .split(size);

        frame.render_widget(Block::default().style(palette.base()), size);
        self.render_status_bar(frame, chunks[0], &palette);
        self.render_list(frame, chunks[1], &palette);
        if self.mode == Mode::Insert {
            self.render_form(frame, chunks[2], &palette);
        }
        self.render_message_line(frame, chunks[3], &palette);

        if self.show_help {
            self.render_help_overlay(frame, size, &palette);
        }
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let view = self.reconciler.view();
        let done = view.items().iter().filter(|item| item.completed).count();
        let source = match view.source() {
            Source::Remote => "online",
            Source::Cache => "offline",
            Source::Empty => "-",
        };

        let line = Line::from(vec![
            Span::styled(
                format!("[{}]", self.mode.short_code()),
                Style::default()
                    .fg(Palette::mode_color(self.mode))
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!(" {}/{} done | {} | ? for help", done, view.len(), source)),
        ]);

        let bar = Paragraph::new(line)
            .style(Style::default().fg(palette.background).bg(palette.accent));
        frame.render_widget(bar, area);
    }

    fn render_list(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let rows = self.reconciler.rows();
        let items: Vec<ListItem> = rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let check = if row.completed { "[x]" } else { "[ ]" };
                let marker = if row.local_only { "*" } else { " " };
                let cursor = if row.editing { "_" } else { "" };
                ListItem::new(format!(
                    "{} {}{}{}  ({})",
                    check, marker, row.text, cursor, row.date_label
                ))
                .style(palette.row(row.completed, i == self.selected))
            })
            .collect();

        let mut state = ListState::default();
        if !rows.is_empty() {
            state.select(Some(self.selected));
        }

        let list = List::new(items).block(
            Block::default()
                .title("Todos")
                .borders(Borders::ALL)
                .style(palette.base()),
        );
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn render_form(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let field_style = |field: Field| {
            if self.form.field == field {
                Style::default().fg(palette.accent).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(palette.muted)
            }
        };

        let lines = vec![
            Line::from(vec![
                Span::styled("Text: ", field_style(Field::Text)),
                Span::raw(self.form.text.as_str()),
            ]),
            Line::from(vec![
                Span::styled("Date: ", field_style(Field::Date)),
                Span::raw(self.form.date.as_str()),
            ]),
        ];

        let form = Paragraph::new(lines).block(
            Block::default()
                .title("New todo (Tab switches field, Enter adds)")
                .borders(Borders::ALL)
                .style(palette.base()),
        );
        frame.render_widget(form, area);
    }

    fn render_message_line(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let content = match (&self.mode, &self.pending) {
            (Mode::Confirm, Some(Pending::Delete(_))) => "Delete this todo? (y/n)".to_string(),
            (Mode::Confirm, Some(Pending::ClearCompleted)) => {
                "Delete all completed todos? (y/n)".to_string()
            }
            _ => self
                .status_message
                .clone()
                .unwrap_or_else(|| "a: add | e: edit | space: toggle | d: delete".to_string()),
        };

        let style = if self.mode == Mode::Confirm {
            palette.base().fg(palette.warning)
        } else {
            palette.base()
        };
        frame.render_widget(Paragraph::new(content).style(style), area);
    }

    fn render_help_overlay(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let help_text = format!(
            r#"
Todo TUI {} - Help

Navigation:
  j/k     - Move up/down
  ?       - Toggle this help
  q       - Quit

Items:
  a/i     - Add a todo (Tab moves to the date field)
  e/Enter - Edit the selected todo
            Enter saves, Esc cancels, Up/Down saves and moves
  Space/x - Toggle completion
  d       - Delete the selected todo
  C       - Clear completed todos

Other:
  t       - Switch light/dark theme
  r       - Reload from the server

Items marked * exist only on this machine.
"#,
            todo_core::version()
        );

        let block = Block::default()
            .title("Help")
            .borders(Borders::ALL)
            .style(palette.base());

        let help_area = centered_rect(70, 85, area);
        frame.render_widget(Clear, help_area);
        let paragraph = Paragraph::new(help_text).block(block);
        frame.render_widget(paragraph, help_area);
    }

    // ==================== Input ====================

    /// Handle a key press, returns true if app should quit
    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        if modifiers.contains(KeyModifiers::CONTROL) {
            if code == KeyCode::Char('c') {
                return true;
            }
            // Control chords are never text
            if self.mode.takes_text() {
                return false;
            }
        }

        match self.mode {
            Mode::Normal => self.handle_normal_key(code),
            Mode::Insert => self.handle_insert_key(code),
            Mode::Edit => self.handle_edit_key(code),
            Mode::Confirm => self.handle_confirm_key(code),
        }
    }

    fn handle_normal_key(&mut self, code: KeyCode) -> bool {
        let Some(action) = normal_mode_action(code) else {
            return false;
        };

        match action {
            Action::Quit => return true,
            Action::ToggleHelp => self.show_help = !self.show_help,
            Action::Cancel => self.show_help = false,
            Action::MoveDown => self.navigate_down(),
            Action::MoveUp => self.navigate_up(),
            Action::NewTodo => {
                self.mode = Mode::Insert;
                self.form = InsertForm::default();
                self.status_message = None;
            }
            Action::Edit => {
                if let Some(id) = self.selected_id() {
                    if self.reconciler.begin_edit(&id) {
                        self.mode = Mode::Edit;
                    }
                }
            }
            Action::Toggle => self.toggle_selected(),
            Action::Delete => {
                if let Some(id) = self.selected_id() {
                    self.pending = Some(Pending::Delete(id));
                    self.mode = Mode::Confirm;
                }
            }
            Action::ClearCompleted => {
                self.pending = Some(Pending::ClearCompleted);
                self.mode = Mode::Confirm;
            }
            Action::ToggleTheme => self.toggle_theme(),
            Action::Reload => self.load(),
        }
        false
    }

    fn navigate_down(&mut self) {
        let len = self.reconciler.view().len();
        if len > 0 && self.selected + 1 < len {
            self.selected += 1;
        }
    }

    fn navigate_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn handle_insert_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Esc => {
                self.mode = Mode::Normal;
                self.form = InsertForm::default();
                self.status_message = None;
            }
            KeyCode::Tab | KeyCode::BackTab => self.form.field = self.form.field.next(),
            KeyCode::Enter => self.submit_form(),
            KeyCode::Backspace => {
                self.form.focused_mut().pop();
            }
            KeyCode::Char(c) => self.form.focused_mut().push(c),
            _ => {}
        }
        false
    }

    fn handle_edit_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Esc => {
                self.reconciler.cancel_edit();
                self.mode = Mode::Normal;
                self.status_message = Some("Edit cancelled".to_string());
            }
            KeyCode::Enter => self.commit_edit(),
            // Leaving the row commits, like losing focus
            KeyCode::Up => {
                self.commit_edit();
                self.navigate_up();
            }
            KeyCode::Down => {
                self.commit_edit();
                self.navigate_down();
            }
            KeyCode::Backspace => {
                if let Some(buffer) = self.reconciler.edit_buffer_mut() {
                    buffer.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Some(buffer) = self.reconciler.edit_buffer_mut() {
                    buffer.push(c);
                }
            }
            _ => {}
        }
        false
    }

    fn handle_confirm_key(&mut self, code: KeyCode) -> bool {
        self.mode = Mode::Normal;
        let Some(pending) = self.pending.take() else {
            return false;
        };

        match code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => self.run_pending(pending),
            _ => self.status_message = Some("Cancelled".to_string()),
        }
        false
    }
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

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};
    use todo_core::{InMemoryRemote, MemoryStorage, Theme};

    type TestApp = App<InMemoryRemote, MemoryStorage>;

    fn app_with(remote: InMemoryRemote) -> TestApp {
        let mut app = App::new(Reconciler::new(remote, MemoryStorage::new())).unwrap();
        app.load();
        app
    }

    fn press(app: &mut TestApp, code: KeyCode) -> bool {
        app.handle_key(code, KeyModifiers::NONE)
    }

    fn type_text(app: &mut TestApp, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn add(app: &mut TestApp, text: &str) {
        press(app, KeyCode::Char('a'));
        type_text(app, text);
        press(app, KeyCode::Enter);
    }

    fn screen(app: &TestApp) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal.draw(|f| app.render(f)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_add_todo_online() {
        let mut app = app_with(InMemoryRemote::new());
        add(&mut app, "Buy milk");

        assert_eq!(app.mode, Mode::Normal);
        assert_eq!(app.status_message.as_deref(), Some("Added"));
        let remote = app.reconciler().remote().items();
        assert_eq!(remote.len(), 1);
        assert_eq!(remote[0].text, "Buy milk");

        let screen = screen(&app);
        assert!(screen.contains("Buy milk"));
        assert!(screen.contains("No date"));
    }

    #[test]
    fn test_add_todo_offline() {
        let mut app = app_with(InMemoryRemote::unreachable());
        add(&mut app, "Offline task");

        let item = &app.reconciler().view().items()[0];
        assert!(item.id.is_local());
        assert!(app.status_message.as_deref().unwrap().contains("locally"));
        assert!(screen(&app).contains("*Offline task"));
    }

    #[test]
    fn test_add_with_date() {
        let mut app = app_with(InMemoryRemote::new());
        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "Dentist");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "2025-08-15");
        press(&mut app, KeyCode::Enter);

        assert!(screen(&app).contains("(2025-08-15)"));
    }

    #[test]
    fn test_invalid_date_keeps_form_open() {
        let mut app = app_with(InMemoryRemote::new());
        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "Dentist");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "soon");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.mode, Mode::Insert);
        assert!(app.reconciler().view().is_empty());
        assert_eq!(app.form.text, "Dentist");
    }

    #[test]
    fn test_blank_text_is_rejected() {
        let mut app = app_with(InMemoryRemote::new());
        add(&mut app, "   ");

        assert_eq!(app.mode, Mode::Insert);
        assert_eq!(app.reconciler().remote().calls(), 1);
        assert!(app.reconciler().view().is_empty());
    }

    #[test]
    fn test_toggle_selected() {
        let mut app = app_with(InMemoryRemote::new());
        add(&mut app, "Buy milk");
        press(&mut app, KeyCode::Char(' '));

        assert!(app.reconciler().view().items()[0].completed);
        assert!(app.reconciler().remote().items()[0].completed);
    }

    #[test]
    fn test_edit_commit_and_cancel() {
        let mut app = app_with(InMemoryRemote::new());
        add(&mut app, "Buy milk");

        press(&mut app, KeyCode::Char('e'));
        assert_eq!(app.mode, Mode::Edit);
        for _ in 0..4 {
            press(&mut app, KeyCode::Backspace);
        }
        type_text(&mut app, "bread");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.mode, Mode::Normal);
        assert_eq!(app.reconciler().view().items()[0].text, "Buy bread");

        press(&mut app, KeyCode::Char('e'));
        type_text(&mut app, "!!!");
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.reconciler().view().items()[0].text, "Buy bread");
        assert!(app.reconciler().editing().is_none());
    }

    #[test]
    fn test_moving_away_commits_edit() {
        let mut app = app_with(InMemoryRemote::new());
        add(&mut app, "first");
        add(&mut app, "second");
        app.selected = 0;

        press(&mut app, KeyCode::Char('e'));
        type_text(&mut app, " item");
        press(&mut app, KeyCode::Down);

        assert_eq!(app.mode, Mode::Normal);
        assert_eq!(app.selected, 1);
        assert_eq!(app.reconciler().view().items()[0].text, "first item");
    }

    #[test]
    fn test_delete_asks_first() {
        let mut app = app_with(InMemoryRemote::new());
        add(&mut app, "Buy milk");

        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.mode, Mode::Confirm);
        assert!(screen(&app).contains("Delete this todo? (y/n)"));
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.reconciler().view().len(), 1);

        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('y'));
        assert!(app.reconciler().view().is_empty());
        assert!(app.reconciler().remote().items().is_empty());
        assert!(app.pending().is_none());
    }

    #[test]
    fn test_clear_completed() {
        let mut app = app_with(InMemoryRemote::new());
        add(&mut app, "done");
        add(&mut app, "open");
        app.selected = 0;
        press(&mut app, KeyCode::Char('x'));

        press(&mut app, KeyCode::Char('C'));
        assert_eq!(app.pending(), Some(&Pending::ClearCompleted));
        press(&mut app, KeyCode::Char('y'));

        let texts: Vec<_> = app
            .reconciler()
            .view()
            .items()
            .iter()
            .map(|i| i.text.clone())
            .collect();
        assert_eq!(texts, ["open"]);
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn test_theme_toggle_persists() {
        let mut app = app_with(InMemoryRemote::new());
        assert_eq!(app.reconciler().theme(), Theme::Light);
        press(&mut app, KeyCode::Char('t'));
        assert_eq!(app.reconciler().theme(), Theme::Dark);
        assert_eq!(
            app.reconciler().cache().storage().read("theme").unwrap().as_deref(),
            Some("dark")
        );
    }

    #[test]
    fn test_help_and_quit() {
        let mut app = app_with(InMemoryRemote::new());
        press(&mut app, KeyCode::Char('?'));
        assert!(screen(&app).contains("Help"));
        press(&mut app, KeyCode::Esc);
        assert!(!app.show_help);

        assert!(press(&mut app, KeyCode::Char('q')));
        assert!(app.handle_key(KeyCode::Char('c'), KeyModifiers::CONTROL));
    }

    #[test]
    fn test_control_chords_are_not_typed() {
        let mut app = app_with(InMemoryRemote::new());
        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "Buy");
        assert!(!app.handle_key(KeyCode::Char('u'), KeyModifiers::CONTROL));
        assert_eq!(app.form.text, "Buy");

        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('e'));
        app.handle_key(KeyCode::Char('w'), KeyModifiers::CONTROL);
        assert_eq!(app.reconciler().editing().unwrap().buffer, "Buy");
        assert!(app.handle_key(KeyCode::Char('c'), KeyModifiers::CONTROL));
    }
}
