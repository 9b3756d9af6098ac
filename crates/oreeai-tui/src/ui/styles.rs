use ratatui::style::{Color, Modifier, Style};

use oreeai_core::models::{EngagementTier, ReplyStatus, Sentiment};

// Color palette
pub const PRIMARY: Color = Color::Rgb(64, 128, 192);
pub const SECONDARY: Color = Color::Rgb(96, 160, 96);
pub const ACCENT: Color = Color::Rgb(192, 160, 64);
pub const ERROR: Color = Color::Rgb(192, 64, 64);
pub const MUTED: Color = Color::Rgb(128, 128, 128);
pub const HIGHLIGHT: Color = Color::Rgb(48, 48, 64);

// Styles
pub fn title_style() -> Style {
    Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD)
}

pub fn selected_style() -> Style {
    Style::default().bg(HIGHLIGHT).add_modifier(Modifier::BOLD)
}

pub fn list_item_style() -> Style {
    Style::default().fg(Color::White)
}

pub fn muted_style() -> Style {
    Style::default().fg(MUTED)
}

pub fn highlight_style() -> Style {
    Style::default().fg(ACCENT)
}

pub fn success_style() -> Style {
    Style::default().fg(SECONDARY)
}

pub fn error_style() -> Style {
    Style::default().fg(ERROR)
}

pub fn tab_style(selected: bool) -> Style {
    if selected {
        Style::default()
            .fg(PRIMARY)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    } else {
        Style::default().fg(Color::White)
    }
}

pub fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(PRIMARY)
    } else {
        Style::default().fg(MUTED)
    }
}

pub fn search_style() -> Style {
    Style::default().fg(ACCENT)
}

pub fn status_bar_style() -> Style {
    Style::default().bg(Color::Rgb(32, 32, 40)).fg(Color::White)
}

pub fn help_key_style() -> Style {
    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
}

pub fn help_desc_style() -> Style {
    Style::default().fg(Color::White)
}

pub fn stat_value_style() -> Style {
    Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
}

pub fn sentiment_style(sentiment: Sentiment) -> Style {
    match sentiment {
        Sentiment::Positive => success_style(),
        Sentiment::Neutral => muted_style(),
        Sentiment::Negative => error_style(),
    }
}

pub fn reply_status_style(status: ReplyStatus) -> Style {
    match status {
        ReplyStatus::Unread => highlight_style().add_modifier(Modifier::BOLD),
        ReplyStatus::Read => list_item_style(),
        ReplyStatus::Archived => muted_style(),
    }
}

pub fn lead_status_style(status: &str) -> Style {
    match status {
        "responded" => success_style(),
        "active" | "new" => highlight_style(),
        "inactive" | "unknown" => muted_style(),
        _ => list_item_style(),
    }
}

pub fn engagement_style(tier: EngagementTier) -> Style {
    match tier {
        EngagementTier::High => success_style(),
        EngagementTier::Good => Style::default().fg(PRIMARY),
        EngagementTier::Fair => highlight_style(),
        EngagementTier::Low => muted_style(),
    }
}
