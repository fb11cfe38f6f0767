//! Swap gauge.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Gauge},
};
use crate::types::AgentMetrics;
use crate::ui::util::{human, pct};

pub fn draw_swap(f: &mut ratatui::Frame<'_>, area: Rect, m: Option<&AgentMetrics>) {
    let (used, total, p) = if let Some(mm) = m {
        let s = &mm.memory.swap;
        (s.used, s.total, pct(s.usage))
    } else { (0, 0, 0) };

    let g = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Swap"))
        .gauge_style(Style::default().fg(Color::Yellow))
        .percent(p)
        .label(format!("{} / {}", human(used), human(total)));
    f.render_widget(g, area);
}
