//! Disk I/O sparklines, fed from the bounded history.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Sparkline},
};

use crate::history::{rates, HistorySample};
use crate::ui::util::human;

pub fn draw_io_spark(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    label: &str,
    samples: &[HistorySample],
    color: Color,
) {
    // cumulative counters -> bytes/s between ticks
    let per_sec: Vec<u64> = rates(samples).into_iter().map(|r| r.round() as u64).collect();
    let now = per_sec.last().copied().unwrap_or(0);
    let peak = per_sec.iter().copied().max().unwrap_or(0);
    let total = samples.last().map(|s| s.value).unwrap_or(0);

    let max_points = area.width.saturating_sub(2) as usize;
    let start = per_sec.len().saturating_sub(max_points);
    let title = format!(
        "Disk {label} — now: {}/s | peak: {}/s | total: {}",
        human(now),
        human(peak),
        human(total)
    );

    let spark = Sparkline::default()
        .block(Block::default().borders(Borders::ALL).title(title))
        .data(&per_sec[start..])
        .style(Style::default().fg(color));
    f.render_widget(spark, area);
}
