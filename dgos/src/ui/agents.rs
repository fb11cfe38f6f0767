//! Agent table: one row per agent in the current view.

use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Row, Table},
};

use crate::dashboard::DashboardModel;
use crate::registry::Selection;
use crate::ui::util::{load_color, truncate_middle};

pub fn draw_agents(f: &mut ratatui::Frame<'_>, area: Rect, model: &DashboardModel) {
    let title = match &model.selection {
        Selection::All => "Agents".to_string(),
        Selection::Agent(_) => format!("Agents (1 of {})", model.agents.len()),
    };
    let block = Block::default().borders(Borders::ALL).title(title);

    let rows: Vec<Row> = model
        .view
        .as_deref()
        .map(|view| {
            view.agents
                .iter()
                .map(|(id, m)| {
                    let cpu = m.cpu.average_usage();
                    Row::new(vec![
                        truncate_middle(id.as_str(), 14),
                        truncate_middle(&m.hostname, 16),
                        format!("{cpu:>5.1}%"),
                        format!("{:>5.1}%", m.memory.virtual_mem.usage),
                        format!("{:>5.1}%", m.disk.usage),
                    ])
                    .style(Style::default().fg(load_color(cpu)))
                })
                .collect()
        })
        .unwrap_or_default();

    let widths = [
        Constraint::Length(14),
        Constraint::Min(10),
        Constraint::Length(7),
        Constraint::Length(7),
        Constraint::Length(7),
    ];
    let header = Row::new(vec!["Agent", "Host", "CPU", "Mem", "Disk"])
        .style(Style::default().add_modifier(Modifier::BOLD));
    f.render_widget(Table::new(rows, widths).header(header).block(block), area);
}
