//! App state and main loop: input handling and drawing the published model.
//! Fetching happens in the [`DashboardSession`]; the app only reads.

use std::{io, time::Duration};

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::Color,
    Terminal,
};
use tokio::time::sleep;

use crate::dashboard::DashboardModel;
use crate::history::Channel;
use crate::registry::{step_selection, Selection};
use crate::session::DashboardSession;
use crate::ui::{
    agents::draw_agents,
    cpu::{draw_cpu_info, draw_cpu_times, draw_per_core_bars, per_core_rows},
    disk::draw_disk,
    header::draw_header,
    io::draw_io_spark,
    mem::draw_mem,
    swap::draw_swap,
};

const FRAME_INTERVAL: Duration = Duration::from_millis(100);

pub struct App {
    session: DashboardSession,
    should_quit: bool,
    pub per_core_scroll: usize,
    per_core_page: usize,
}

impl App {
    pub fn new(session: DashboardSession) -> Self {
        Self {
            session,
            should_quit: false,
            per_core_scroll: 0,
            per_core_page: 1,
        }
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        // Terminal setup
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        // Main loop
        let res = self.event_loop(&mut terminal).await;

        // Teardown
        disable_raw_mode()?;
        let backend = terminal.backend_mut();
        execute!(backend, DisableMouseCapture, LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        self.session.stop().await;
        res
    }

    async fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
    ) -> anyhow::Result<()> {
        loop {
            // Input (non-blocking)
            while event::poll(Duration::from_millis(10))? {
                if let Event::Key(k) = event::read()? {
                    if k.kind == KeyEventKind::Press {
                        self.handle_key(k.code);
                    }
                }
            }
            if self.should_quit {
                break;
            }

            let model = self.session.model();
            let status = self.session.status();
            terminal.draw(|f| self.draw(f, &model, &status))?;

            sleep(FRAME_INTERVAL).await;
        }
        Ok(())
    }

    fn handle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab | KeyCode::Right => self.step(true),
            KeyCode::BackTab | KeyCode::Left => self.step(false),
            KeyCode::Char('a') | KeyCode::Char('A') => self.session.select(Selection::All),
            KeyCode::Up => self.per_core_scroll = self.per_core_scroll.saturating_sub(1),
            KeyCode::Down => self.per_core_scroll = self.per_core_scroll.saturating_add(1),
            KeyCode::PageUp => {
                self.per_core_scroll = self.per_core_scroll.saturating_sub(self.per_core_page)
            }
            KeyCode::PageDown => {
                self.per_core_scroll = self.per_core_scroll.saturating_add(self.per_core_page)
            }
            KeyCode::Home => self.per_core_scroll = 0,
            _ => {}
        }
    }

    fn step(&mut self, forward: bool) {
        let model = self.session.model();
        let next = step_selection(&model.agents, &model.selection, forward);
        self.per_core_scroll = 0;
        self.session.select(next);
    }

    fn draw(
        &mut self,
        f: &mut ratatui::Frame<'_>,
        model: &DashboardModel,
        status: &crate::dashboard::TickStatus,
    ) {
        let area = f.area();

        // Root rows: header, top (agents + cpu info), per-core + times, memory, swap, disk, io
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),  // header
                Constraint::Length(8),  // agents + cpu info
                Constraint::Min(6),     // per-core + times
                Constraint::Length(3),  // memory
                Constraint::Length(3),  // swap
                Constraint::Length(3),  // disk
                Constraint::Length(5),  // io
            ])
            .split(area);

        draw_header(f, rows[0], self.session.source(), model, status);

        let focus = model.focus();
        let metrics = focus.map(|(_, m)| m);

        let top = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(rows[1]);
        draw_agents(f, top[0], model);
        draw_cpu_info(f, top[1], metrics);

        let mid = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(rows[2]);
        let cores = metrics.map_or(0, |m| m.cpu.cores.len());
        self.per_core_page = per_core_rows(mid[0]).max(1);
        self.per_core_scroll = self
            .per_core_scroll
            .min(cores.saturating_sub(self.per_core_page));
        draw_per_core_bars(f, mid[0], metrics, self.per_core_scroll);
        draw_cpu_times(f, mid[1], metrics);

        draw_mem(f, rows[3], metrics);
        draw_swap(f, rows[4], metrics);
        draw_disk(f, rows[5], metrics);

        let io = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rows[6]);
        let (reads, writes) = match focus {
            Some((id, _)) => (
                model.history(id, Channel::ReadBytes),
                model.history(id, Channel::WriteBytes),
            ),
            None => (&[][..], &[][..]),
        };
        draw_io_spark(f, io[0], Channel::ReadBytes.label(), reads, Color::Blue);
        draw_io_spark(f, io[1], Channel::WriteBytes.label(), writes, Color::Green);
    }
}
