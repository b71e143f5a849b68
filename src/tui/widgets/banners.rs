//! Banner Widget
//!
//! One line per banner, coloured by level.

use crate::session::{Banner, BannerLevel};
use crate::tui::theme::{Icons, Theme};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Render the banner strip
pub fn render_banners(frame: &mut Frame, area: Rect, banners: &[Banner]) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Theme::border());

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let max_chars = (inner.width as usize).saturating_sub(2);
    let lines: Vec<Line> = banners
        .iter()
        .map(|banner| {
            let style = Theme::banner(banner.level());
            Line::from(vec![
                Span::styled(format!("{} ", marker(banner.level())), style),
                Span::styled(truncate_string(&banner.text(), max_chars), style),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

fn marker(level: BannerLevel) -> &'static str {
    match level {
        BannerLevel::Info | BannerLevel::Success => Icons::DOT,
        BannerLevel::Warning | BannerLevel::Error => "!",
    }
}

/// Truncate a string to at most `max_chars` characters
fn truncate_string(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else if max_chars > 3 {
        let kept: String = s.chars().take(max_chars - 3).collect();
        format!("{}...", kept)
    } else {
        s.chars().take(max_chars).collect()
    }
}
