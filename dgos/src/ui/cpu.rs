//! CPU panes: per-core bars, load/info summary and the per-core times table.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Row, Table},
};

use crate::types::AgentMetrics;
use crate::ui::util::{load_color, pct};

/// Number of per-core rows that fit in `area` once borders are removed.
pub fn per_core_rows(area: Rect) -> usize {
    area.height.saturating_sub(2) as usize
}

pub fn draw_per_core_bars(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    m: Option<&AgentMetrics>,
    scroll: usize,
) {
    let title = match m {
        Some(mm) => format!("Per-core (avg {:>5.1}%)", mm.cpu.average_usage()),
        None => "Per-core".into(),
    };
    f.render_widget(Block::default().borders(Borders::ALL).title(title), area);
    let Some(mm) = m else { return; };

    let inner = Rect { x: area.x + 1, y: area.y + 1, width: area.width.saturating_sub(2), height: area.height.saturating_sub(2) };
    if inner.height == 0 { return; }

    // cores are sorted by index, so row i is core (scroll + i)
    let start = scroll.min(mm.cpu.cores.len().saturating_sub(1));
    let visible: Vec<_> = mm.cpu.cores.iter().skip(start).take(inner.height as usize).collect();
    let constraints: Vec<Constraint> = visible.iter().map(|_| Constraint::Length(1)).collect();
    let vchunks = Layout::default().direction(Direction::Vertical).constraints(constraints).split(inner);

    for (core, rect) in visible.iter().zip(vchunks.iter()) {
        let hchunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(12), Constraint::Min(6)])
            .split(*rect);
        let fg = load_color(core.usage);

        let label = format!("cpu{:<3}{:>5.1}%", core.core, core.usage);
        let line = Line::from(Span::styled(label, Style::default().fg(fg).add_modifier(Modifier::BOLD)));
        f.render_widget(Paragraph::new(line), hchunks[0]);

        let g = Gauge::default()
            .percent(pct(core.usage))
            .label("")
            .gauge_style(Style::default().fg(fg));
        f.render_widget(g, hchunks[1]);
    }
}

pub fn draw_cpu_info(f: &mut ratatui::Frame<'_>, area: Rect, m: Option<&AgentMetrics>) {
    let block = Block::default().borders(Borders::ALL).title("CPU info");
    let Some(mm) = m else {
        f.render_widget(block, area);
        return;
    };
    let info = &mm.cpu.info;
    let load = &mm.cpu.load;
    let lines = vec![
        Line::from(format!("Physical cores  {}", info.physical_cores)),
        Line::from(format!("Logical cores   {}", info.logical_cores)),
        Line::from(format!("Processes       {}", info.process_count)),
        Line::from(format!("Threads         {}", info.thread_count)),
        Line::from(format!(
            "Load avg        {:.2} / {:.2} / {:.2}",
            load.one_min, load.five_min, load.fifteen_min
        )),
    ];
    f.render_widget(Paragraph::new(lines).block(block), area);
}

pub fn draw_cpu_times(f: &mut ratatui::Frame<'_>, area: Rect, m: Option<&AgentMetrics>) {
    let block = Block::default().borders(Borders::ALL).title("CPU times (s)");
    let rows: Vec<Row> = m
        .map(|mm| {
            mm.cpu
                .times
                .iter()
                .map(|t| {
                    Row::new(vec![
                        format!("cpu{}", t.core),
                        format!("{:.2}", t.user),
                        format!("{:.2}", t.system),
                        format!("{:.2}", t.idle),
                        format!("{:.2}", t.iowait),
                        format!("{:.2}", t.irq),
                    ])
                })
                .collect()
        })
        .unwrap_or_default();

    let widths = [
        Constraint::Length(6),
        Constraint::Min(9),
        Constraint::Min(9),
        Constraint::Min(9),
        Constraint::Min(9),
        Constraint::Min(9),
    ];
    let header = Row::new(vec!["Core", "User", "System", "Idle", "I/O wait", "IRQ"])
        .style(Style::default().add_modifier(Modifier::BOLD));
    let table = Table::new(rows, widths).header(header).block(block).column_spacing(1);
    f.render_widget(table, area);
}
