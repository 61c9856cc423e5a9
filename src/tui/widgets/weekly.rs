use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::models::DashboardStats;
use crate::tui::theme;
use crate::utils::format::progress_bar;

/// One bar per day of the progress window, oldest at the top.
pub fn render(frame: &mut Frame, area: Rect, stats: &DashboardStats, bar_width: usize) {
    let block = Block::default()
        .title(Span::styled(
            format!(" Last {} Days ", stats.weekly_progress.len()),
            theme::accent(),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border(false))
        .style(theme::surface());

    let mut lines = vec![Line::from("")];
    for bucket in &stats.weekly_progress {
        lines.push(Line::from(vec![
            Span::styled(format!("  {}  ", bucket.day), theme::dim()),
            Span::styled(
                progress_bar(bucket.completed, bucket.total, bar_width),
                theme::ratio(bucket.completed, bucket.total),
            ),
            Span::styled(
                format!("  {}/{}", bucket.completed, bucket.total),
                theme::dim(),
            ),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("  All-time completions: ", theme::dim()),
        Span::styled(stats.total_completions.to_string(), theme::bold()),
    ]));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
