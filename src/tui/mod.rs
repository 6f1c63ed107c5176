//! TUI module - day-by-day plan view with ratatui

use std::io::{stdout, Stdout};
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Tabs, Wrap},
};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::links::{tiktok_search_url, youtube_embed_url, Platform};
use crate::session::{run_effect, Action, LoadPhase, Session};

type Tui = Terminal<CrosstermBackend<Stdout>>;

const TICK: Duration = Duration::from_secs(1);

/// App state for TUI
pub struct App {
    session: Session,
    tx: UnboundedSender<Action>,
    rx: UnboundedReceiver<Action>,
    selected: usize,
    show_timer: bool,
    /// Link shown after pressing `v`
    link: Option<String>,
    should_quit: bool,
}

impl App {
    pub fn new(session: Session) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            session,
            tx,
            rx,
            selected: 0,
            show_timer: false,
            link: None,
            should_quit: false,
        }
    }

    /// Run the TUI application. Must be called inside a tokio runtime.
    pub fn run(&mut self) -> Result<()> {
        let mut terminal = init_terminal()?;
        let result = self.event_loop(&mut terminal);
        restore_terminal()?;
        result
    }

    fn event_loop(&mut self, terminal: &mut Tui) -> Result<()> {
        self.dispatch(Action::Load);
        let mut last_tick = Instant::now();

        while !self.should_quit {
            terminal.draw(|frame| self.render(frame))?;
            self.handle_events()?;

            self.drain_actions();

            if last_tick.elapsed() >= TICK {
                last_tick += TICK;
                self.dispatch(Action::Tick);
            }
        }
        Ok(())
    }

    /// Apply what background tasks sent back
    fn drain_actions(&mut self) {
        while let Ok(action) = self.rx.try_recv() {
            self.dispatch(action);
        }
        self.clamp_selection();
    }

    /// Apply an action; AI calls run on a background task and report back
    /// through the channel.
    fn dispatch(&mut self, action: Action) {
        if let Some(effect) = self.session.dispatch(action) {
            let generator = self.session.generator();
            let tx = self.tx.clone();
            tokio::spawn(async move {
                let action = run_effect(generator.as_ref(), effect).await;
                let _ = tx.send(action);
            });
        }
    }

    fn current_day(&self) -> usize {
        self.session.state().nav.current()
    }

    fn exercise_count(&self) -> usize {
        self.session
            .plan()
            .and_then(|p| p.day(self.current_day()))
            .map_or(0, |d| d.exercises.len())
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        let state = self.session.state();

        match (&state.plan, &state.phase) {
            (Some(_), _) => self.render_plan(frame, area),
            (None, LoadPhase::Failed(message)) => render_error(frame, area, message),
            (None, _) => render_loading(frame, area),
        }

        if self.show_timer {
            self.render_timer(frame, area);
        }
    }

    fn render_plan(&self, frame: &mut Frame, area: Rect) {
        let Some(plan) = self.session.plan() else {
            return;
        };
        let state = self.session.state();
        let day_index = self.current_day();
        let Some(day) = plan.day(day_index) else {
            return;
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(4),
                Constraint::Min(6),
                Constraint::Length(3),
            ])
            .split(area);

        // Header
        let watch = &state.stopwatch;
        let watch_style = if watch.is_running() {
            Style::default().fg(Color::Red).bold()
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let header = Paragraph::new(Line::from(vec![
            Span::styled("WEEKFIT", Style::default().fg(Color::Red).bold()),
            Span::raw("  weekly hypertrophy plan    "),
            Span::styled(format!("⏱ {}", watch.header_time()), watch_style),
        ]))
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(header, chunks[0]);

        // Day tabs
        let titles: Vec<String> = plan.days.iter().map(|d| d.short_name().to_uppercase()).collect();
        let tabs = Tabs::new(titles)
            .select(day_index)
            .highlight_style(Style::default().fg(Color::White).bg(Color::Red).bold())
            .block(Block::default().borders(Borders::ALL).title("Days"));
        frame.render_widget(tabs, chunks[1]);

        // Focus
        let focus = Paragraph::new(vec![
            Line::from(Span::styled(day.focus.clone(), Style::default().fg(Color::White).bold())),
            Line::from(Span::styled(day.description.clone(), Style::default().fg(Color::DarkGray))),
        ])
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(day.day_name.clone()));
        frame.render_widget(focus, chunks[2]);

        // Exercises
        let rows: Vec<Row> = day
            .exercises
            .iter()
            .enumerate()
            .map(|(i, e)| {
                let done = self.session.is_completed(e.id);
                let swapping = self.session.is_swapping(e.id);
                let name = if swapping { "Swapping...".to_string() } else { e.name.clone() };
                let style = if swapping {
                    Style::default().fg(Color::Yellow)
                } else if done {
                    Style::default().fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT)
                } else {
                    Style::default()
                };
                Row::new(vec![
                    Cell::from(format!("{}", i + 1)),
                    Cell::from(name),
                    Cell::from(e.sets.clone()),
                    Cell::from(e.reps.clone()),
                    Cell::from(e.rest_time.clone()),
                    Cell::from(if done { "[x]" } else { "[ ]" }),
                ])
                .style(style)
            })
            .collect();

        let (done, total) = self.session.day_progress(day_index);
        let table = Table::new(
            rows,
            [
                Constraint::Length(3),
                Constraint::Min(24),
                Constraint::Length(6),
                Constraint::Length(8),
                Constraint::Length(6),
                Constraint::Length(4),
            ],
        )
        .header(
            Row::new(vec!["#", "Exercise", "Sets", "Reps", "Rest", "Done"])
                .style(Style::default().bold()),
        )
        .row_highlight_style(Style::default().bg(Color::DarkGray))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Exercises {}/{}", done, total)),
        );

        let mut table_state = TableState::default().with_selected(Some(self.selected));
        frame.render_stateful_widget(table, chunks[3], &mut table_state);

        // Footer
        let footer = match (&state.notice, &self.link) {
            (Some(notice), _) => {
                Paragraph::new(notice.clone()).style(Style::default().fg(Color::Yellow))
            }
            (None, Some(link)) => {
                Paragraph::new(link.clone()).style(Style::default().fg(Color::Cyan))
            }
            (None, None) => Paragraph::new(
                "q: quit | ←/→: day | ↑/↓: exercise | space: done | s: swap | v: video | t: timer | n: new plan",
            )
            .style(Style::default().fg(Color::DarkGray)),
        };
        frame.render_widget(footer.block(Block::default().borders(Borders::ALL)), chunks[4]);
    }

    fn render_timer(&self, frame: &mut Frame, area: Rect) {
        let watch = &self.session.state().stopwatch;
        let popup = centered(area, 36, 9);
        let label = if watch.is_running() { "space: pause" } else { "space: start" };

        let body = Paragraph::new(vec![
            Line::default(),
            Line::from(Span::styled(watch.full_time(), Style::default().fg(Color::White).bold())),
            Line::default(),
            Line::from(Span::styled(
                format!("{} | r: reset | esc: close", label),
                Style::default().fg(Color::DarkGray),
            )),
        ])
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red))
                .title("Total time"),
        );

        frame.render_widget(Clear, popup);
        frame.render_widget(body, popup);
    }

    fn handle_events(&mut self) -> Result<()> {
        if event::poll(Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            if self.show_timer {
                self.handle_timer_key(key.code);
            } else if self.session.plan().is_some() {
                self.handle_plan_key(key.code);
            } else {
                match key.code {
                    KeyCode::Char('q') => self.should_quit = true,
                    KeyCode::Char('r') => self.dispatch(Action::Load),
                    _ => {}
                }
            }
        }
        Ok(())
    }

    fn handle_timer_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char(' ') | KeyCode::Char('p') => self.dispatch(Action::ToggleStopwatch),
            KeyCode::Char('r') => self.dispatch(Action::ResetStopwatch),
            KeyCode::Esc | KeyCode::Char('t') => self.show_timer = false,
            _ => {}
        }
    }

    fn handle_plan_key(&mut self, code: KeyCode) {
        let day = self.current_day();
        self.link = None;

        match code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Left | KeyCode::Char('h') => self.dispatch(Action::PrevDay),
            KeyCode::Right | KeyCode::Char('l') => self.dispatch(Action::NextDay),
            KeyCode::Char(c @ '1'..='9') => {
                let index = c as usize - '1' as usize;
                self.dispatch(Action::JumpTo(index));
            }
            KeyCode::Up | KeyCode::Char('k') => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.exercise_count() {
                    self.selected += 1;
                }
            }
            KeyCode::Char(' ') | KeyCode::Enter => self.dispatch(Action::ToggleComplete {
                day,
                exercise: self.selected,
            }),
            KeyCode::Char('s') => self.dispatch(Action::Swap {
                day,
                exercise: self.selected,
            }),
            KeyCode::Char('v') => {
                self.link = self
                    .session
                    .plan()
                    .and_then(|p| p.exercise(day, self.selected))
                    .map(|e| {
                        format!(
                            "{}  |  {}",
                            tiktok_search_url(&e.search_term, Platform::Desktop),
                            youtube_embed_url(&e.search_term)
                        )
                    });
            }
            KeyCode::Char('n') => self.dispatch(Action::Regenerate),
            KeyCode::Char('t') => self.show_timer = true,
            KeyCode::Char('p') => self.dispatch(Action::ToggleStopwatch),
            KeyCode::Esc => self.dispatch(Action::DismissNotice),
            _ => {}
        }

        if self.current_day() != day {
            self.selected = 0;
        }
        self.clamp_selection();
    }

    /// Keep the cursor inside the current day, also after a new plan arrives
    fn clamp_selection(&mut self) {
        self.selected = self.selected.min(self.exercise_count().saturating_sub(1));
    }
}

fn render_loading(frame: &mut Frame, area: Rect) {
    let body = Paragraph::new(vec![
        Line::from(Span::styled(
            "BUILDING YOUR TRAINING PLAN",
            Style::default().fg(Color::White).bold(),
        )),
        Line::from(Span::styled(
            "Asking the coach for this week's workouts...",
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(body, centered(area, 60, 6));
}

fn render_error(frame: &mut Frame, area: Rect, message: &str) {
    let body = Paragraph::new(vec![
        Line::from(Span::styled("Something went wrong.", Style::default().fg(Color::Red).bold())),
        Line::default(),
        Line::from(message.to_string()),
        Line::default(),
        Line::from(Span::styled("r: try again | q: quit", Style::default().fg(Color::DarkGray))),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(body, centered(area, 70, 10));
}

/// Fixed-size rect in the middle of `area`, shrunk to fit
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn init_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    Ok(terminal)
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::Database;
    use crate::ai::GeminiClient;
    use crate::plan::WeeklyPlan;
    use crate::plan::tests::day;

    fn offline_app() -> App {
        let db = Database::open_in_memory().unwrap();
        App::new(Session::new(db, Arc::new(GeminiClient::new(None))))
    }

    #[test]
    fn test_selection_clamped_when_plan_arrives() {
        let mut app = offline_app();
        app.selected = 4;

        let plan = WeeklyPlan {
            days: vec![
                day("Monday", "CHEST", &["Bench Press", "Fly"]),
                day("Tuesday", "BACK", &["Row", "Pulldown"]),
            ],
        };
        app.tx.send(Action::PlanArrived(Ok(plan))).unwrap();
        app.drain_actions();

        assert!(app.session.plan().is_some());
        assert_eq!(app.selected, 1);
    }

    #[test]
    fn test_selection_zero_without_plan() {
        let mut app = offline_app();
        app.selected = 3;
        app.drain_actions();
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn test_centered_fits() {
        let area = Rect::new(0, 0, 100, 40);
        assert_eq!(centered(area, 60, 6), Rect::new(20, 17, 60, 6));
        assert_eq!(centered(Rect::new(0, 0, 20, 4), 60, 6), Rect::new(0, 0, 20, 4));
    }
}
