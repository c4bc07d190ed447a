use std::mem;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::{Local, NaiveDate};
use crossterm::event::KeyCode;
use open::that as open_path;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap};
use ratatui::Frame;
use tokio::runtime::Handle;
use tracing::{error, info};

use crate::api::TeacherClient;
use crate::config::Settings;
use crate::export::save_export;
use crate::models::ExportFormat;

use super::dispatch::Dispatcher;
use super::forms::{ConfirmDelete, FilterField, FilterForm, TeacherField};
use super::helpers::{centered_rect, describe_criteria, statistics_lines, surface_error};
use super::routes::Route;
use super::screens::{Effect, FormScreen, HomeScreen, ListScreen, NoticeKind};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// How long a notice stays in the footer.
const NOTICE_TTL: Duration = Duration::from_secs(4);

/// Screen currently on display, one per route.
enum Screen {
    Home(HomeScreen),
    List(ListScreen),
    Form(FormScreen),
}

/// Modal overlays of the list screen.
enum Mode {
    Normal,
    Searching(String),
    Filtering(FilterForm),
    ConfirmDelete(ConfirmDelete),
}

/// Footer notice plus the moment it appeared.
struct StatusMessage {
    text: String,
    kind: NoticeKind,
    shown_at: Instant,
}

fn notice_style(kind: NoticeKind) -> Style {
    match kind {
        NoticeKind::Success => Style::default().fg(Color::Green),
        NoticeKind::Error => Style::default().fg(Color::Red),
    }
}

/// Central application state shared across the TUI.
pub struct App {
    dispatcher: Dispatcher,
    screen: Screen,
    mode: Mode,
    route: Route,
    status: Option<StatusMessage>,
    export_dir: PathBuf,
    last_export: Option<PathBuf>,
}

impl App {
    /// Build the app and open `start`. Requests run on `handle`.
    pub fn new(client: Arc<TeacherClient>, handle: Handle, settings: &Settings, start: Route) -> Self {
        let (home, _) = HomeScreen::open();
        let mut app = Self {
            dispatcher: Dispatcher::new(client, handle),
            screen: Screen::Home(home),
            mode: Mode::Normal,
            route: Route::Home,
            status: None,
            export_dir: settings.export_dir.clone(),
            last_export: None,
        };
        app.navigate(start);
        app
    }

    pub fn route(&self) -> Route {
        self.route
    }

    /// Current footer notice, if any.
    pub fn status_text(&self) -> Option<&str> {
        self.status.as_ref().map(|status| status.text.as_str())
    }

    /// Path of the most recent export written to disk.
    pub fn last_export(&self) -> Option<&PathBuf> {
        self.last_export.as_ref()
    }

    /// Apply finished requests, pick up store changes and expire old notices.
    pub fn tick(&mut self) {
        for completion in self.dispatcher.drain() {
            if !self.dispatcher.is_current(&completion) {
                continue;
            }
            let effects = match &mut self.screen {
                Screen::Home(home) => home.on_completion(completion),
                Screen::List(list) => list.on_completion(completion),
                Screen::Form(form) => form.on_completion(completion),
            };
            self.apply(effects);
        }

        if let Screen::List(list) = &mut self.screen {
            list.sync_store();
        }

        if self
            .status
            .as_ref()
            .is_some_and(|status| status.shown_at.elapsed() >= NOTICE_TTL)
        {
            self.status = None;
        }
    }

    fn navigate(&mut self, route: Route) {
        info!(%route, "navigate");
        self.dispatcher.teardown();
        self.mode = Mode::Normal;
        let (screen, effects) = match route {
            Route::Home => {
                let (home, effects) = HomeScreen::open();
                (Screen::Home(home), effects)
            }
            Route::Teachers => {
                let subscription = self.dispatcher.client().store().subscribe();
                let (list, effects) = ListScreen::open(subscription);
                (Screen::List(list), effects)
            }
            Route::AddTeacher => {
                let (form, effects) = FormScreen::open(None);
                (Screen::Form(form), effects)
            }
            Route::EditTeacher(id) => {
                let (form, effects) = FormScreen::open(Some(id));
                (Screen::Form(form), effects)
            }
        };
        // Replacing the screen drops the old one and any store subscription.
        self.screen = screen;
        self.route = route;
        self.apply(effects);
    }

    fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Request(request) => self.dispatcher.dispatch(request),
                Effect::Navigate(route) => self.navigate(route),
                Effect::Notify(text, kind) => self.set_status(text, kind),
                Effect::Download(format, bytes) => self.save_download(format, &bytes),
            }
        }
    }

    fn save_download(&mut self, format: ExportFormat, bytes: &[u8]) {
        match save_export(&self.export_dir, format, bytes) {
            Ok(path) => {
                info!(path = %path.display(), "export saved");
                self.last_export = Some(path);
            }
            Err(err) => {
                error!("failed to save export: {err:#}");
                self.set_status(
                    format!("Failed to save export: {}", surface_error(&err)),
                    NoticeKind::Error,
                );
            }
        }
    }

    fn open_last_export(&mut self) {
        match self.last_export.clone() {
            None => self.set_status("Nothing exported yet.", NoticeKind::Error),
            Some(path) => {
                if let Err(err) = open_path(&path) {
                    self.set_status(format!("Failed to open export: {err}"), NoticeKind::Error);
                } else {
                    self.set_status(format!("Opened {}.", path.display()), NoticeKind::Success);
                }
            }
        }
    }

    fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::Searching(query) => self.handle_search(code, query),
            Mode::Filtering(form) => self.handle_filter(code, form),
            Mode::ConfirmDelete(confirm) => self.handle_confirm_delete(code, confirm),
        };
        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        let mut effects = Vec::new();
        let mut next_mode = Mode::Normal;

        match &mut self.screen {
            Screen::Home(home) => match code {
                KeyCode::Char('q') | KeyCode::Esc => *exit = true,
                KeyCode::Char('t') | KeyCode::Enter => effects.push(Effect::Navigate(Route::Teachers)),
                KeyCode::Char('a') | KeyCode::Char('+') => {
                    effects.push(Effect::Navigate(Route::AddTeacher))
                }
                KeyCode::Char('s') => effects.push(Effect::Navigate(Route::Home)),
                KeyCode::Char('p') => effects.extend(home.export(ExportFormat::Pdf)),
                KeyCode::Char('x') => effects.extend(home.export(ExportFormat::Excel)),
                KeyCode::Char('o') => self.open_last_export(),
                _ => {}
            },
            Screen::List(list) => match code {
                KeyCode::Char('q') => *exit = true,
                KeyCode::Esc | KeyCode::Char('h') => effects.push(Effect::Navigate(Route::Home)),
                KeyCode::Up => list.move_selection(-1),
                KeyCode::Down => list.move_selection(1),
                KeyCode::PageUp => list.move_selection(-10),
                KeyCode::PageDown => list.move_selection(10),
                KeyCode::Home => list.select_first(),
                KeyCode::End => list.select_last(),
                KeyCode::Char('f') | KeyCode::Char('/') => {
                    next_mode = Mode::Searching(list.filters.search_term.clone());
                }
                KeyCode::Char('r') => next_mode = Mode::Filtering(list.filters.clone()),
                KeyCode::Char('c') => effects.extend(list.clear_filters()),
                KeyCode::Char('l') => effects.extend(list.load()),
                KeyCode::Char('+') | KeyCode::Char('a') => {
                    effects.push(Effect::Navigate(Route::AddTeacher))
                }
                KeyCode::Char('e') | KeyCode::Enter => match list.current().and_then(|t| t.id) {
                    Some(id) => effects.push(Effect::Navigate(Route::EditTeacher(id))),
                    None => effects.push(Effect::Notify(
                        "No teacher selected to edit.".into(),
                        NoticeKind::Error,
                    )),
                },
                KeyCode::Char('-') | KeyCode::Char('d') => {
                    match list.current().and_then(ConfirmDelete::from_teacher) {
                        Some(confirm) => next_mode = Mode::ConfirmDelete(confirm),
                        None => effects.push(Effect::Notify(
                            "No teacher selected to delete.".into(),
                            NoticeKind::Error,
                        )),
                    }
                }
                KeyCode::Char('p') => effects.extend(list.export(ExportFormat::Pdf)),
                KeyCode::Char('x') => effects.extend(list.export(ExportFormat::Excel)),
                KeyCode::Char('o') => self.open_last_export(),
                _ => {}
            },
            Screen::Form(screen) => match code {
                KeyCode::Esc => effects.extend(screen.cancel()),
                KeyCode::Tab | KeyCode::Down => screen.form.next_field(),
                KeyCode::BackTab | KeyCode::Up => screen.form.previous_field(),
                KeyCode::Backspace => screen.form.backspace(),
                KeyCode::Enter => effects.extend(screen.submit(Self::today())),
                KeyCode::Char(ch) => {
                    screen.form.push_char(ch);
                }
                _ => {}
            },
        }

        self.apply(effects);
        Ok(next_mode)
    }

    fn handle_search(&mut self, code: KeyCode, mut query: String) -> Mode {
        let Screen::List(list) = &mut self.screen else {
            return Mode::Normal;
        };
        match code {
            KeyCode::Esc => Mode::Normal,
            KeyCode::Enter => {
                let effects = list.search(&query);
                self.apply(effects);
                Mode::Normal
            }
            KeyCode::Backspace => {
                query.pop();
                Mode::Searching(query)
            }
            KeyCode::Char(ch) if !ch.is_control() => {
                query.push(ch);
                Mode::Searching(query)
            }
            _ => Mode::Searching(query),
        }
    }

    fn handle_filter(&mut self, code: KeyCode, mut form: FilterForm) -> Mode {
        let Screen::List(list) = &mut self.screen else {
            return Mode::Normal;
        };
        match code {
            KeyCode::Esc => Mode::Normal,
            KeyCode::Enter => {
                list.filters = form;
                let effects = list.apply_filters();
                self.apply(effects);
                Mode::Normal
            }
            KeyCode::Tab | KeyCode::Down => {
                form.next_field();
                Mode::Filtering(form)
            }
            KeyCode::BackTab | KeyCode::Up => {
                form.previous_field();
                Mode::Filtering(form)
            }
            KeyCode::Backspace => {
                form.backspace();
                Mode::Filtering(form)
            }
            KeyCode::Char(ch) => {
                form.push_char(ch);
                Mode::Filtering(form)
            }
            _ => Mode::Filtering(form),
        }
    }

    fn handle_confirm_delete(&mut self, code: KeyCode, confirm: ConfirmDelete) -> Mode {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", NoticeKind::Success);
                Mode::Normal
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                if let Screen::List(list) = &mut self.screen {
                    let effects = list.delete(confirm.id);
                    self.apply(effects);
                }
                Mode::Normal
            }
            _ => Mode::ConfirmDelete(confirm),
        }
    }

    /// Ctrl-R: clear the teacher form.
    pub(crate) fn handle_ctrl_r(&mut self) {
        if let Screen::Form(screen) = &mut self.screen {
            screen.reset();
        }
    }

    /// Ctrl-X: dismiss the current notice.
    pub(crate) fn handle_ctrl_x(&mut self) {
        self.clear_status();
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: NoticeKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
            shown_at: Instant::now(),
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    pub fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        match &self.screen {
            Screen::Home(home) => self.draw_home(frame, content_area, home),
            Screen::List(list) => self.draw_list(frame, content_area, list),
            Screen::Form(form) => self.draw_form(frame, content_area, form),
        }

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::Searching(query) => self.draw_search_bar(frame, area, query),
            Mode::Filtering(form) => self.draw_filter_form(frame, area, form),
            Mode::ConfirmDelete(confirm) => self.draw_confirm_delete(frame, area, confirm),
            Mode::Normal => {}
        }
    }

    fn draw_home(&self, frame: &mut Frame, area: Rect, home: &HomeScreen) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(1)])
            .split(area);

        let stats = Paragraph::new(statistics_lines(home.statistics.as_ref(), home.loading))
            .block(Block::default().borders(Borders::ALL).title("Statistics"));
        frame.render_widget(stats, chunks[0]);

        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let mut lines = vec![
            Line::from(Span::styled(
                "Teacher Management",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(vec![Span::styled("[t]", key_style), Span::raw(" Browse teachers")]),
            Line::from(vec![Span::styled("[a]", key_style), Span::raw(" Add a teacher")]),
            Line::from(vec![Span::styled("[p]", key_style), Span::raw(" Export to PDF")]),
            Line::from(vec![Span::styled("[x]", key_style), Span::raw(" Export to Excel")]),
        ];
        if let Some(path) = &self.last_export {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!("Last export: {}", path.display()),
                Style::default().fg(Color::Gray),
            )));
        }
        let menu = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .block(Block::default().borders(Borders::ALL).title("Home"));
        frame.render_widget(menu, chunks[1]);
    }

    fn draw_list(&self, frame: &mut Frame, area: Rect, list: &ListScreen) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(1)])
            .split(area);

        let header = Paragraph::new(Line::from(vec![
            Span::styled(
                describe_criteria(&list.filters.criteria()),
                Style::default().fg(Color::Gray),
            ),
            Span::raw(format!(
                "  •  showing {} of {}",
                list.displayed().len(),
                list.teachers.len()
            )),
        ]))
        .block(Block::default().borders(Borders::ALL).title("Teachers"));
        frame.render_widget(header, chunks[0]);

        if list.loading && list.teachers.is_empty() {
            let message = Paragraph::new("Loading teachers...")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(message, chunks[1]);
            return;
        }

        if list.displayed().is_empty() {
            let text = if list.filtered.is_some() {
                "No teachers match the current filters."
            } else {
                "No teachers yet. Press '+' to add one."
            };
            let message = Paragraph::new(text)
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(message, chunks[1]);
            return;
        }

        let header_style = Style::default().add_modifier(Modifier::BOLD);
        let header = Row::new(
            ["ID", "Full Name", "Age", "Date of Birth", "Classes"]
                .into_iter()
                .map(|title| Cell::from(title).style(header_style)),
        );
        let rows = list.displayed().iter().map(|teacher| {
            Row::new(vec![
                Cell::from(teacher.id.map(|id| id.to_string()).unwrap_or_default()),
                Cell::from(teacher.full_name.clone()),
                Cell::from(teacher.age.map(|age| age.to_string()).unwrap_or_default()),
                Cell::from(teacher.date_of_birth.to_string()),
                Cell::from(teacher.number_of_classes.to_string()),
            ])
        });
        let table = Table::new(
            rows,
            [
                Constraint::Length(6),
                Constraint::Min(20),
                Constraint::Length(5),
                Constraint::Length(14),
                Constraint::Length(8),
            ],
        )
        .header(header)
        .block(Block::default().borders(Borders::ALL))
        .row_highlight_style(Style::default().fg(Color::Yellow))
        .highlight_symbol("▶ ");

        let mut state = TableState::default();
        state.select(Some(list.selected));
        frame.render_stateful_widget(table, chunks[1], &mut state);
    }

    fn draw_form(&self, frame: &mut Frame, area: Rect, screen: &FormScreen) {
        let popup_area = centered_rect(70, 60, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(screen.title()).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        if screen.loading {
            let message = Paragraph::new("Loading...").alignment(Alignment::Center);
            frame.render_widget(message, inner);
            return;
        }

        let today = Self::today();
        let mut lines = Vec::new();
        for field in TeacherField::ALL {
            lines.push(screen.form.build_line(field, today));
            match screen.form.visible_error(field, today) {
                Some(err) => lines.push(Line::from(Span::styled(
                    format!("  {err}"),
                    Style::default().fg(Color::Red),
                ))),
                None => lines.push(Line::from("")),
            }
        }
        lines.push(Line::from(""));
        let hint_style = if screen.form.is_valid(today) {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::Gray)
        };
        lines.push(Line::from(Span::styled(
            "Enter to save • Tab to switch • Ctrl-R to reset • Esc to cancel",
            hint_style,
        )));

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let active = screen.form.active;
        let row = TeacherField::ALL
            .iter()
            .position(|field| *field == active)
            .unwrap_or(0) as u16;
        let prefix = format!("{}: ", active.label()).chars().count() as u16;
        frame.set_cursor_position((
            inner.x + prefix + screen.form.value_len(active) as u16,
            inner.y + row * 2,
        ));
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let mut status_spans = Vec::new();
        if let Some(status) = &self.status {
            status_spans.push(Span::styled(status.text.clone(), notice_style(status.kind)));
        }
        let pending = self.dispatcher.pending();
        if pending > 0 {
            if !status_spans.is_empty() {
                status_spans.push(Span::raw("  "));
            }
            status_spans.push(Span::styled(
                format!("({pending} working...)"),
                Style::default().fg(Color::DarkGray),
            ));
        }
        let status_line = Line::from(status_spans);

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_search_bar(&self, frame: &mut Frame, area: Rect, query: &str) {
        let height = 3u16.min(area.height);
        let popup_area = Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height,
        };
        frame.render_widget(Clear, popup_area);

        let block = Block::default().borders(Borders::ALL).title("Search");
        let paragraph = Paragraph::new(Span::raw(format!("Search: {query}")))
            .block(block.clone())
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);

        let inner = block.inner(popup_area);
        let cursor_x = inner.x + "Search: ".len() as u16 + query.chars().count() as u16;
        frame.set_cursor_position((cursor_x, inner.y));
    }

    fn draw_filter_form(&self, frame: &mut Frame, area: Rect, form: &FilterForm) {
        let popup_area = centered_rect(50, 40, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Range Filter").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines: Vec<Line> = FilterField::ALL
            .iter()
            .map(|field| form.build_line(*field))
            .collect();
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Enter to apply • Tab to switch • Esc to cancel",
            Style::default().fg(Color::Gray),
        )));
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);

        let row = FilterField::ALL
            .iter()
            .position(|field| *field == form.active)
            .unwrap_or(0) as u16;
        let prefix = format!("{}: ", form.active.label()).len() as u16;
        frame.set_cursor_position((
            inner.x + prefix + form.value_len(form.active) as u16,
            inner.y + row,
        ));
    }

    fn draw_confirm_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmDelete) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Delete Teacher").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!(
                "Are you sure you want to delete {} (#{})?",
                confirm.full_name, confirm.id
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let keys: &[(&str, &str)] = match (&self.screen, &self.mode) {
            (_, Mode::Searching(_)) => &[("[Enter]", "Search"), ("[Esc]", "Cancel")],
            (_, Mode::Filtering(_)) => &[
                ("[Tab]", "Next"),
                ("[Enter]", "Apply"),
                ("[Esc]", "Cancel"),
            ],
            (_, Mode::ConfirmDelete(_)) => &[("[y]", "Delete"), ("[n]", "Keep")],
            (Screen::Home(_), _) => &[
                ("[t]", "Teachers"),
                ("[a]", "Add"),
                ("[p]", "PDF"),
                ("[x]", "Excel"),
                ("[o]", "Open Export"),
                ("[s]", "Refresh"),
                ("[q]", "Quit"),
            ],
            (Screen::List(_), _) => &[
                ("[↑↓]", "Select"),
                ("[f]", "Search"),
                ("[r]", "Range"),
                ("[c]", "Clear"),
                ("[+]", "Add"),
                ("[e]", "Edit"),
                ("[-]", "Delete"),
                ("[p]", "PDF"),
                ("[x]", "Excel"),
                ("[h]", "Home"),
                ("[q]", "Quit"),
            ],
            (Screen::Form(_), _) => &[
                ("[Tab]", "Next Field"),
                ("[Enter]", "Save"),
                ("[Ctrl-R]", "Reset"),
                ("[Esc]", "Cancel"),
            ],
        };

        let mut spans = Vec::with_capacity(keys.len() * 2);
        for (key, label) in keys {
            spans.push(Span::styled(key.to_string(), key_style));
            spans.push(Span::raw(format!(" {label}   ")));
        }
        Line::from(spans)
    }
}
