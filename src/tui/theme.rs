use ratatui::style::{Color, Modifier, Style};

pub const BG: Color = Color::Rgb(16, 18, 20);
pub const SURFACE: Color = Color::Rgb(24, 28, 31);
pub const BORDER: Color = Color::Rgb(48, 56, 60);
pub const TEXT: Color = Color::Rgb(218, 224, 226);
pub const TEXT_DIM: Color = Color::Rgb(112, 124, 128);
pub const ACCENT: Color = Color::Rgb(104, 170, 196);
pub const GREEN: Color = Color::Rgb(96, 164, 110);
pub const AMBER: Color = Color::Rgb(214, 152, 72);
pub const RED: Color = Color::Rgb(186, 88, 72);

pub fn base() -> Style {
    Style::default().fg(TEXT).bg(BG)
}

pub fn surface() -> Style {
    Style::default().fg(TEXT).bg(SURFACE)
}

pub fn border(focused: bool) -> Style {
    if focused {
        accent()
    } else {
        Style::default().fg(BORDER)
    }
}

pub fn dim() -> Style {
    Style::default().fg(TEXT_DIM)
}

pub fn accent() -> Style {
    Style::default().fg(ACCENT)
}

pub fn green() -> Style {
    Style::default().fg(GREEN)
}

pub fn amber() -> Style {
    Style::default().fg(AMBER)
}

pub fn red() -> Style {
    Style::default().fg(RED)
}

pub fn bold() -> Style {
    Style::default().fg(TEXT).add_modifier(Modifier::BOLD)
}

/// Color for a day's share of completed habits.
pub fn ratio(completed: u32, total: u32) -> Style {
    if total > 0 && completed >= total {
        green().add_modifier(Modifier::BOLD)
    } else if completed > 0 {
        amber()
    } else {
        dim()
    }
}
