use ratatui::{
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::models::{DashboardStats, Day};
use crate::tui::theme;

pub fn render(frame: &mut Frame, area: Rect, today: Day, stats: &DashboardStats) {
    let date_str = today.date().format("%A, %b %d, %Y").to_string();

    let title_line = Line::from(vec![
        Span::styled("  habitual  ", theme::accent().add_modifier(Modifier::BOLD)),
        Span::styled(date_str, theme::dim()),
    ]);

    let summary_line = Line::from(vec![
        Span::styled(
            format!("{}/{} done today", stats.completed_today, stats.total_habits),
            theme::ratio(stats.completed_today, stats.total_habits),
        ),
        Span::styled("  ·  ", theme::dim()),
        Span::styled(
            format!("{}%", stats.completion_percentage_today),
            theme::bold(),
        ),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::accent())
        .style(theme::base());

    let paragraph = Paragraph::new(vec![title_line, Line::from(""), summary_line])
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}
