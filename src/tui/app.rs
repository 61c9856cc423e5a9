use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};
use rusqlite::Connection;
use std::time::Duration;

use crate::cli::handlers::{complete_habit, Ctx};
use crate::config::AppConfig;
use crate::db::repository::{HabitRepo, LogRepo};
use crate::engine::{Clock, SystemClock};
use crate::models::{DashboardStats, Day, Habit, HabitToday};
use crate::tui::events::{Event, EventHandler};
use crate::tui::theme;
use crate::tui::widgets::{habits, header, statusbar, streak, weekly};

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Dashboard,
    Stats,
    Help,
}

pub struct App<'a, C: Clock> {
    ctx: Ctx<'a, C>,
    pub view: View,
    pub focus_idx: usize,
    pub should_quit: bool,
    /// Last action result; the bool marks an error.
    pub message: Option<(String, bool)>,

    // Snapshot, refreshed after every change
    pub today: Day,
    pub habits: Vec<Habit>,
    pub today_flags: Vec<HabitToday>,
    pub stats: DashboardStats,
}

impl<'a, C: Clock> App<'a, C> {
    pub fn new(conn: &'a Connection, config: &'a AppConfig, clock: C) -> Self {
        let ctx = Ctx::new(conn, config, clock);
        let today = ctx.engine.today();
        App {
            ctx,
            view: View::Dashboard,
            focus_idx: 0,
            should_quit: false,
            message: None,
            today,
            habits: Vec::new(),
            today_flags: Vec::new(),
            stats: DashboardStats::default(),
        }
    }

    pub fn load(&mut self) -> Result<()> {
        let engine = &self.ctx.engine;
        self.today = engine.today();
        self.habits = HabitRepo::list_active(self.ctx.conn)?;

        let window = engine.window();
        let start = window.first().copied().unwrap_or(self.today);
        let recent = LogRepo::for_active_in_range(self.ctx.conn, start, self.today)?;
        let all = LogRepo::for_active_all(self.ctx.conn)?;

        self.today_flags = engine.today_overview(&self.habits, &recent);
        self.stats = engine.dashboard_stats(&self.habits, &recent, &all);

        if self.focus_idx >= self.habits.len() {
            self.focus_idx = self.habits.len().saturating_sub(1);
        }
        Ok(())
    }

    /// Reload when the UTC day has changed since the last load.
    pub fn tick(&mut self) {
        if self.ctx.engine.today() != self.today {
            log::debug!("day rolled over, reloading");
            if let Err(e) = self.load() {
                self.message = Some((format!("✗ {}", e), true));
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        // Only handle actual key presses — ignore release/repeat events from some terminals
        if key.kind != KeyEventKind::Press {
            return;
        }
        match self.view {
            View::Dashboard => self.handle_dashboard_key(key),
            View::Stats => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Char('s')) {
                    self.view = View::Dashboard;
                }
            }
            View::Help => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
                    self.view = View::Dashboard;
                }
            }
        }
    }

    fn handle_dashboard_key(&mut self, key: KeyEvent) {
        self.message = None;
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.should_quit = true;
            }
            KeyCode::Char('?') => {
                self.view = View::Help;
            }
            KeyCode::Char('s') => {
                self.view = View::Stats;
            }
            KeyCode::Char('r') => {
                if let Err(e) = self.load() {
                    self.message = Some((format!("✗ {}", e), true));
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.focus_idx = self.focus_idx.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.focus_idx + 1 < self.habits.len() {
                    self.focus_idx += 1;
                }
            }
            KeyCode::Char('m') | KeyCode::Enter => self.mark_focused_done(),
            _ => {}
        }
    }

    fn mark_focused_done(&mut self) {
        let Some(habit) = self.habits.get(self.focus_idx).cloned() else {
            return;
        };
        self.message = Some(match complete_habit(&self.ctx, &habit, None) {
            Ok(_) => (format!("✓ {} done for today", habit.title), false),
            Err(e) => (format!("✗ {}", e), true),
        });
        if let Err(e) = self.load() {
            self.message = Some((format!("✗ {}", e), true));
        }
    }

    pub fn draw(&self, frame: &mut Frame) {
        match self.view {
            View::Dashboard => self.draw_dashboard(frame),
            View::Stats => self.draw_stats(frame),
            View::Help => {
                self.draw_dashboard(frame);
                self.draw_help_overlay(frame);
            }
        }
    }

    fn draw_dashboard(&self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(theme::base()), area);

        let outer_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5), // header
                Constraint::Min(0),    // body
                Constraint::Length(1), // status bar
            ])
            .split(area);

        header::render(frame, outer_chunks[0], self.today, &self.stats);
        statusbar::render(frame, outer_chunks[2], self.message.as_ref());

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(outer_chunks[1]);

        habits::render(
            frame,
            columns[0],
            &self.habits,
            &self.today_flags,
            self.focus_idx,
        );

        let right_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(7), Constraint::Min(0)])
            .split(columns[1]);

        let bar_width = self.ctx.config.display.bar_width;
        streak::render(frame, right_chunks[0], &self.stats, bar_width);
        weekly::render(frame, right_chunks[1], &self.stats, bar_width);
    }

    fn draw_stats(&self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(theme::base()), area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Min(0)])
            .split(area);

        let title = Paragraph::new(Line::from(vec![
            Span::styled("  Stats  ", theme::accent().add_modifier(Modifier::BOLD)),
            Span::styled("  [Esc] back", theme::dim()),
        ]));
        frame.render_widget(title, chunks[0]);

        weekly::render(frame, chunks[1], &self.stats, self.ctx.config.display.bar_width);
    }

    fn draw_help_overlay(&self, frame: &mut Frame) {
        let area = frame.area();
        let popup_area = Rect {
            x: area.width / 4,
            y: area.height / 4,
            width: area.width / 2,
            height: area.height / 2,
        };
        frame.render_widget(Clear, popup_area);

        let bindings = [
            ("  [m] / Enter  ", "Mark focused habit done"),
            ("  [↑ ↓] [j k]  ", "Navigate habits"),
            ("  [s]          ", "Stats view"),
            ("  [r]          ", "Reload from disk"),
            ("  [?]          ", "Toggle help"),
            ("  [Esc] [q]    ", "Quit"),
        ];

        let mut help_text = vec![
            Line::from(Span::styled(
                "  Keybindings",
                theme::accent().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];
        for (key, label) in bindings {
            help_text.push(Line::from(vec![
                Span::styled(key, theme::accent()),
                Span::styled(label, theme::dim()),
            ]));
        }

        let block = Block::default()
            .title(Span::styled(" Help ", theme::accent()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::accent())
            .style(theme::surface());

        frame.render_widget(Paragraph::new(help_text).block(block), popup_area);
    }
}

/// Run the TUI event loop.
pub fn run(conn: Connection, config: AppConfig) -> Result<()> {
    let mut app = App::new(&conn, &config, SystemClock);
    app.load()?;

    let mut terminal = ratatui::init();
    let events = EventHandler::new(Duration::from_secs(30));

    let result: Result<()> = loop {
        if let Err(e) = terminal.draw(|frame| app.draw(frame)) {
            break Err(e.into());
        }

        match events.next() {
            Ok(Event::Key(key)) => {
                app.handle_key(key);
                if app.should_quit {
                    break Ok(());
                }
            }
            Ok(Event::Resize) => {}
            Ok(Event::Tick) => app.tick(),
            Err(e) => break Err(e.into()),
        }
    };

    ratatui::restore();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::engine::FixedClock;
    use crossterm::event::KeyModifiers;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn clock() -> FixedClock {
        FixedClock::at_day("2024-05-10".parse().unwrap())
    }

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        HabitRepo::create(&conn, "Read", "", clock().now()).unwrap();
        HabitRepo::create(&conn, "Run", "", clock().now()).unwrap();
        conn
    }

    #[test]
    fn marking_updates_snapshot() {
        let conn = setup();
        let config = AppConfig::default();
        let mut app = App::new(&conn, &config, clock());
        app.load().unwrap();
        assert_eq!(app.stats.total_habits, 2);
        assert_eq!(app.stats.completed_today, 0);

        app.handle_key(press(KeyCode::Char('m')));
        assert_eq!(app.stats.completed_today, 1);
        assert_eq!(app.stats.completion_percentage_today, 50);
        assert!(app.today_flags[0].completed_today);
        assert!(matches!(app.message, Some((_, false))));

        app.handle_key(press(KeyCode::Enter));
        assert!(matches!(app.message, Some((_, true))));
        assert_eq!(app.stats.total_completions, 1);
    }

    #[test]
    fn navigation_stays_in_bounds() {
        let conn = setup();
        let config = AppConfig::default();
        let mut app = App::new(&conn, &config, clock());
        app.load().unwrap();

        app.handle_key(press(KeyCode::Up));
        assert_eq!(app.focus_idx, 0);
        for _ in 0..5 {
            app.handle_key(press(KeyCode::Down));
        }
        assert_eq!(app.focus_idx, 1);
    }

    #[test]
    fn views_toggle_and_quit() {
        let conn = setup();
        let config = AppConfig::default();
        let mut app = App::new(&conn, &config, clock());
        app.handle_key(press(KeyCode::Char('s')));
        assert_eq!(app.view, View::Stats);
        app.handle_key(press(KeyCode::Esc));
        assert_eq!(app.view, View::Dashboard);
        app.handle_key(press(KeyCode::Char('?')));
        assert_eq!(app.view, View::Help);
        app.handle_key(press(KeyCode::Char('?')));
        app.handle_key(press(KeyCode::Esc));
        assert!(app.should_quit);
    }
}
