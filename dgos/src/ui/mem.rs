//! Memory gauge.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Gauge},
};
use crate::types::AgentMetrics;
use crate::ui::util::{human, pct};

pub fn draw_mem(f: &mut ratatui::Frame<'_>, area: Rect, m: Option<&AgentMetrics>) {
    let (label, p) = if let Some(mm) = m {
        let v = &mm.memory.virtual_mem;
        (
            format!(
                "{} / {}  (cached {}, available {})",
                human(v.used),
                human(v.total),
                human(v.cached),
                human(v.available)
            ),
            pct(v.usage),
        )
    } else {
        ("-".into(), 0)
    };

    let g = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Memory"))
        .gauge_style(Style::default().fg(Color::Magenta))
        .percent(p)
        .label(label);
    f.render_widget(g, area);
}
