//! Disk usage gauge.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Gauge},
};
use crate::types::AgentMetrics;
use crate::ui::util::{human, pct};

pub fn draw_disk(f: &mut ratatui::Frame<'_>, area: Rect, m: Option<&AgentMetrics>) {
    let (label, p) = if let Some(mm) = m {
        let d = &mm.disk;
        let used = d.total.saturating_sub(d.free);
        (
            format!(
                "{} / {}  (free {}, {} reads / {} writes)",
                human(used),
                human(d.total),
                human(d.free),
                d.io.read_count,
                d.io.write_count
            ),
            pct(d.usage),
        )
    } else {
        ("-".into(), 0)
    };

    let color = if p < 70 { Color::Green } else if p < 90 { Color::Yellow } else { Color::Red };
    let g = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Disk"))
        .gauge_style(Style::default().fg(color))
        .percent(p)
        .label(label);
    f.render_widget(g, area);
}
