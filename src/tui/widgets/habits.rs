use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem},
    Frame,
};

use crate::models::{Habit, HabitToday};
use crate::tui::theme;
use crate::utils::format::fit_width;

pub fn render(
    frame: &mut Frame,
    area: Rect,
    habits: &[Habit],
    today: &[HabitToday],
    focused_idx: usize,
) {
    let block = Block::default()
        .title(Span::styled(" Habits ", theme::accent()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border(true))
        .style(theme::surface());

    if habits.is_empty() {
        let empty = List::new(vec![
            ListItem::new(Line::from("")),
            ListItem::new(Line::from(Span::styled(
                "  No habits yet — `habitual add <title>`",
                theme::dim(),
            ))),
        ])
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let title_width = (area.width as usize).saturating_sub(20).max(8);

    let items: Vec<ListItem> = habits
        .iter()
        .zip(today)
        .enumerate()
        .map(|(i, (habit, status))| {
            let is_focused = i == focused_idx;

            let (icon, icon_style, label) = if status.completed_today {
                ("●", theme::green(), "done")
            } else {
                ("○", theme::dim(), "pending")
            };

            let name_style = if is_focused {
                theme::accent().add_modifier(Modifier::BOLD)
            } else {
                theme::bold()
            };

            let cursor = if is_focused { "▸ " } else { "  " };

            ListItem::new(Line::from(vec![
                Span::styled(cursor, theme::accent()),
                Span::styled(fit_width(&habit.title, title_width), name_style),
                Span::styled(" ", theme::dim()),
                Span::styled(icon, icon_style),
                Span::styled(format!("  {}", label), theme::dim()),
            ]))
        })
        .collect();

    let list = List::new(items).block(block);
    frame.render_widget(list, area);
}
