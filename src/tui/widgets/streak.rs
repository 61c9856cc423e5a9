use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::models::DashboardStats;
use crate::tui::theme;
use crate::utils::format::{format_days, progress_bar};

pub fn render(frame: &mut Frame, area: Rect, stats: &DashboardStats, bar_width: usize) {
    let block = Block::default()
        .title(Span::styled(" Streak ", theme::accent()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border(false))
        .style(theme::surface());

    // Bar fills against the best run so far
    let bar = progress_bar(
        stats.current_streak,
        stats.longest_streak.max(1),
        bar_width,
    );

    let streak_line = Line::from(vec![
        Span::styled("  ", theme::dim()),
        Span::styled(bar, theme::green()),
        Span::styled(
            format!("  {}", format_days(stats.current_streak)),
            theme::green().add_modifier(Modifier::BOLD),
        ),
    ]);

    let mut dots = vec![Span::styled("  ", theme::dim())];
    for bucket in &stats.weekly_progress {
        let dot = if bucket.completed == 0 {
            "○"
        } else if bucket.completed >= bucket.total {
            "●"
        } else {
            "◑"
        };
        dots.push(Span::styled(dot, theme::ratio(bucket.completed, bucket.total)));
        dots.push(Span::styled(" ", theme::dim()));
    }

    let meta_line = Line::from(vec![Span::styled(
        format!(
            "  Best: {}  ·  Perfect days: {}/{}",
            format_days(stats.longest_streak),
            stats.perfect_days(),
            stats.weekly_progress.len()
        ),
        theme::dim(),
    )]);

    let text = vec![
        Line::from(""),
        streak_line,
        Line::from(""),
        Line::from(dots),
        meta_line,
    ];
    frame.render_widget(Paragraph::new(text).block(block), area);
}
