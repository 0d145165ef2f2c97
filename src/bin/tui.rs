use std::time::Duration;

use anyhow::Result;
use crossterm::{event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind}, execute, terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen}};
use ratatui::{backend::CrosstermBackend, Frame, Terminal, widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap}, layout::{Constraint, Direction, Layout, Rect}, style::{Color, Modifier, Style}};

use todo_api::client::{Board, LoadState, TodoClient, Transport, UreqTransport};
use todo_api::domain::todo::Todo;

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let api_url = std::env::var("API_URL").unwrap_or_else(|_| "http://localhost:3001".to_string());
    let mut board = Board::new(TodoClient::new(&api_url), UreqTransport::new());
    // A failed load is shown in the error panel.
    let _ = board.load();

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let res = run_app(&mut terminal, App::new(board));

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    res
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode { View, Create, Edit }

#[derive(Clone, Copy, PartialEq, Eq)]
enum Filter { All, Pending, Done }

impl Filter {
    fn label(self) -> &'static str {
        match self { Filter::All => "All", Filter::Pending => "Pending", Filter::Done => "Done" }
    }

    fn includes(self, todo: &Todo) -> bool {
        match self { Filter::All => true, Filter::Pending => !todo.completed, Filter::Done => todo.completed }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ActiveField { Title, Description }

struct App<T: Transport> {
    board: Board<T>,
    selected: usize,
    list_state: ListState,
    mode: Mode,
    filter: Filter,
    field: ActiveField,
    draft_title: String,
    draft_desc: String,
}

impl<T: Transport> App<T> {
    fn new(board: Board<T>) -> Self {
        Self { board, selected: 0, list_state: ListState::default(), mode: Mode::View, filter: Filter::All, field: ActiveField::Title, draft_title: String::new(), draft_desc: String::new() }
    }

    fn visible(&self) -> Vec<&Todo> {
        self.board.todos().iter().filter(|t| self.filter.includes(t)).collect()
    }

    fn current(&self) -> Option<Todo> {
        self.visible().get(self.selected).map(|t| (*t).clone())
    }

    fn clamp_selection(&mut self) {
        let len = self.visible().len();
        if len == 0 { self.selected = 0; self.list_state.select(None); }
        else { if self.selected >= len { self.selected = len - 1; } self.list_state.select(Some(self.selected)); }
    }

    fn clear_draft(&mut self) {
        self.mode = Mode::View;
        self.field = ActiveField::Title;
        self.draft_title.clear();
        self.draft_desc.clear();
    }

    fn draft_description(&self) -> Option<&str> {
        let desc = self.draft_desc.trim();
        if desc.is_empty() { None } else { Some(desc) }
    }

    fn active_draft(&mut self) -> &mut String {
        match self.field { ActiveField::Title => &mut self.draft_title, ActiveField::Description => &mut self.draft_desc }
    }

    /// Returns false when the user asked to quit.
    fn on_key(&mut self, code: KeyCode) -> bool {
        if self.board.notice().is_some() {
            self.board.dismiss_notice();
            return true;
        }
        if matches!(self.board.state(), LoadState::Unreachable(_)) {
            match code {
                KeyCode::Char('q') => return false,
                KeyCode::Char('r') => { let _ = self.board.retry(); }
                _ => {}
            }
            self.clamp_selection();
            return true;
        }
        match self.mode {
            Mode::View => match code {
                KeyCode::Char('q') => return false,
                KeyCode::Up => { if self.selected > 0 { self.selected -= 1; } }
                KeyCode::Down => { if self.selected + 1 < self.visible().len() { self.selected += 1; } }
                KeyCode::Enter | KeyCode::Char(' ') => {
                    if let Some(todo) = self.current() { let _ = self.board.toggle(todo.id); }
                }
                KeyCode::Char('n') => { self.clear_draft(); self.mode = Mode::Create; }
                KeyCode::Char('e') => {
                    if let Some(todo) = self.current() {
                        self.clear_draft();
                        self.mode = Mode::Edit;
                        self.draft_title = todo.title;
                        self.draft_desc = todo.description.unwrap_or_default();
                    }
                }
                KeyCode::Char('d') => {
                    if let Some(todo) = self.current() { let _ = self.board.delete(todo.id); }
                }
                KeyCode::Char('f') => {
                    self.filter = match self.filter { Filter::All => Filter::Pending, Filter::Pending => Filter::Done, Filter::Done => Filter::All };
                }
                KeyCode::Char('r') => { let _ = self.board.load(); }
                _ => {}
            },
            Mode::Create | Mode::Edit => match code {
                KeyCode::Esc => self.clear_draft(),
                KeyCode::Enter => {
                    let title = self.draft_title.trim().to_string();
                    // Blank titles never leave the client; the server would reject them anyway.
                    if !title.is_empty() {
                        let desc = self.draft_description().map(str::to_string);
                        match self.mode {
                            Mode::Create => {
                                if self.board.create(&title, desc.as_deref()).is_ok() { self.selected = 0; }
                            }
                            _ => {
                                if let Some(todo) = self.current() { let _ = self.board.edit(todo.id, &title, desc.as_deref()); }
                            }
                        }
                    }
                    self.clear_draft();
                }
                KeyCode::Backspace => { self.active_draft().pop(); }
                KeyCode::Tab => { self.field = match self.field { ActiveField::Title => ActiveField::Description, ActiveField::Description => ActiveField::Title }; }
                KeyCode::Char(c) => self.active_draft().push(c),
                _ => {}
            },
        }
        self.clamp_selection();
        true
    }
}

fn run_app<T: Transport>(terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>, mut app: App<T>) -> Result<()> {
    let tick_rate = Duration::from_millis(200);
    app.clamp_selection();
    loop {
        terminal.draw(|f| draw(f, &mut app))?;
        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                // Only act on key presses; ignore repeats and releases to prevent duplicate input
                if key.kind != KeyEventKind::Press { continue; }
                if !app.on_key(key.code) { break; }
            }
        }
    }
    Ok(())
}

fn draw<T: Transport>(f: &mut Frame, app: &mut App<T>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1), Constraint::Length(3)])
        .split(f.size());

    let header = Paragraph::new("Enter: toggle  n: new  e: edit  d: delete  f: filter  r: reload  q: quit")
        .block(Block::default().borders(Borders::ALL).title("todos"));
    f.render_widget(header, chunks[0]);

    match app.board.state().clone() {
        LoadState::Unreachable(message) => {
            let panel = Paragraph::new(format!("{message}\n\nPress r to retry, q to quit."))
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: true })
                .block(Block::default().borders(Borders::ALL).title("connection error"));
            f.render_widget(panel, chunks[1]);
        }
        LoadState::Loading => {
            f.render_widget(Paragraph::new("Loading...").block(Block::default().borders(Borders::ALL)), chunks[1]);
        }
        LoadState::Ready => draw_list(f, app, chunks[1]),
    }

    let field_label = match app.field { ActiveField::Title => "Title", ActiveField::Description => "Desc" };
    let draft = match app.field { ActiveField::Title => &app.draft_title, ActiveField::Description => &app.draft_desc };
    let (footer_title, footer_text) = match app.mode {
        Mode::View => ("info", format!("API_URL={}  |  Filter=[{}]  |  {} items", app.board.server(), app.filter.label(), app.board.todos().len())),
        Mode::Create => ("create", format!("{field_label}: {draft}_  |  (Tab to switch, Enter to save, Esc to cancel)")),
        Mode::Edit => ("edit", format!("{field_label}: {draft}_  |  (Tab to switch, Enter to save, Esc to cancel)")),
    };
    f.render_widget(Paragraph::new(footer_text).block(Block::default().borders(Borders::ALL).title(footer_title)), chunks[2]);

    if let Some(notice) = app.board.notice() {
        let area = centered(f.size(), 60, 5);
        f.render_widget(Clear, area);
        let popup = Paragraph::new(format!("{notice}\n\n(press any key)"))
            .style(Style::default().fg(Color::Yellow))
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title("error"));
        f.render_widget(popup, area);
    }
}

fn draw_list<T: Transport>(f: &mut Frame, app: &mut App<T>, area: Rect) {
    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let visible = app.visible();
    let items: Vec<ListItem> = visible
        .iter()
        .map(|t| ListItem::new(format!("{} {}", if t.completed { "[x]" } else { "[ ]" }, t.title)))
        .collect();
    let detail = visible.get(app.selected).map(|t| {
        let desc = t.description.clone().unwrap_or_else(|| "(no description)".to_string());
        format!(
            "Title:\n{}\n\nStatus: {}\nCreated: {}\n\nDescription:\n{}",
            t.title,
            if t.completed { "Done" } else { "Pending" },
            t.created_at.format("%Y-%m-%d %H:%M"),
            desc
        )
    });
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(format!("items [{}]", app.filter.label())))
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD | Modifier::REVERSED))
        .highlight_symbol(">> ");
    f.render_stateful_widget(list, middle[0], &mut app.list_state);

    let details = Paragraph::new(detail.unwrap_or_default())
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("details"));
    f.render_widget(details, middle[1]);
}

fn centered(area: Rect, width_pct: u16, height: u16) -> Rect {
    let width = (u32::from(area.width) * u32::from(width_pct) / 100) as u16;
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width,
        height: height.min(area.height),
    }
}
