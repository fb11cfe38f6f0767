//! Top header: source, selection and tick status.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders},
};

use crate::dashboard::{DashboardModel, TickState, TickStatus};

pub fn draw_header(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    source: &str,
    model: &DashboardModel,
    status: &TickStatus,
) {
    let updated = status
        .last_applied_at
        .map(|t| t.with_timezone(&chrono::Local).format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "never".into());
    let (state, color) = match (&status.state, &status.last_error) {
        (TickState::Skipped, Some(e)) => (format!("stale ({})", e.kind()), Color::Yellow),
        (TickState::Fetching, _) if model.snapshot.is_none() => ("connecting...".into(), Color::Gray),
        _ => ("live".into(), Color::Green),
    };
    let title = format!(
        "dgos — {source} | view: {} | {} agent(s) | updated {updated} | {state}  (tab: next agent, a: all, q: quit)",
        model.selection,
        model.agents.len(),
    );
    f.render_widget(
        Block::default()
            .title(title)
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(color)),
        area,
    );
}
