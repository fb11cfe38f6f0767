//! Small UI helpers: human-readable sizes, percentages, truncation.

pub fn human(b: u64) -> String {
    const K: f64 = 1024.0;
    let b = b as f64;
    if b < K { return format!("{b:.0}B"); }
    let kb = b / K;
    if kb < K { return format!("{kb:.1}KB"); }
    let mb = kb / K;
    if mb < K { return format!("{mb:.1}MB"); }
    let gb = mb / K;
    if gb < K { return format!("{gb:.1}GB"); }
    let tb = gb / K;
    format!("{tb:.2}TB")
}

/// Gauge percentage from a reported 0..100 value.
pub fn pct(usage: f64) -> u16 {
    usage.clamp(0.0, 100.0).round() as u16
}

pub fn truncate_middle(s: &str, max: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= max { return s.to_string(); }
    if max <= 3 { return "...".into(); }
    let keep = max - 3;
    let left = keep / 2;
    let right = keep - left;
    let head: String = chars[..left].iter().collect();
    let tail: String = chars[chars.len() - right..].iter().collect();
    format!("{head}...{tail}")
}

/// Color bucket shared by per-core bars and the agent table.
pub fn load_color(usage: f64) -> ratatui::style::Color {
    use ratatui::style::Color;
    match usage {
        x if x < 60.0 => Color::Green,
        x if x < 80.0 => Color::Yellow,
        _ => Color::Red,
    }
}
