use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, AppState, LoginFocus, Tab};
use crate::form::FormState;

use super::styles;
use super::tabs::{companies, dashboard, leads, replies, settings};

const LOGO: [&str; 3] = [
    "   ╔═╗╦═╗╔═╗╔═╗  ╔═╗╦",
    "   ║ ║╠╦╝║╣ ║╣   ╠═╣║",
    "   ╚═╝╩╚═╚═╝╚═╝  ╩ ╩╩",
];

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(3), // Tabs
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_tabs(frame, app, chunks[1]);
    render_main_content(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    match app.state {
        AppState::ShowingHelp => render_help_overlay(frame),
        AppState::LoggingIn => render_login_overlay(frame, app),
        AppState::ConfirmingQuit => render_quit_overlay(frame),
        AppState::EditingForm => {
            if let Some(ref form) = app.form {
                render_form_overlay(frame, form);
            }
        }
        AppState::Normal | AppState::Searching | AppState::Quitting => {}
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = "  OreeAI Outreach";
    let right = match app.user_label() {
        Some(user) => format!("{}  [?] Help", user),
        None => "[?] Help".to_string(),
    };

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(
            (area.width as usize).saturating_sub(title.chars().count() + right.chars().count() + 2),
        )),
        Span::styled(right, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(title_line).block(block), area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::raw(" ")];
    for (i, tab) in Tab::ALL.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        let label = format!("[{}] {}", i + 1, tab.title());
        if *tab == app.current_tab {
            spans.push(Span::styled(label, styles::tab_style(true)));
        } else {
            spans.push(Span::styled(label, styles::muted_style()));
        }
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    match app.current_tab {
        Tab::Dashboard => dashboard::render(frame, app, area),
        Tab::Leads => leads::render(frame, app, area),
        Tab::Companies => companies::render(frame, app, area),
        Tab::Replies => replies::render(frame, app, area),
        Tab::Settings => settings::render(frame, app, area),
    }
}

fn tab_shortcuts(tab: Tab) -> &'static str {
    match tab {
        Tab::Dashboard => "[u]pdate | [q]uit",
        Tab::Leads => "[s]tatus [a]dd [/]search [ ] page | [u]pdate [q]uit",
        Tab::Companies => "[r]esearch [f]ilter [c]lear [a]dd [/]search | [u]pdate [q]uit",
        Tab::Replies => "[r]ead [x] archive [z] unread [s]tatus [ ] page | [u]pdate [q]uit",
        Tab::Settings => "[e]dit ICP [p]rofile | [u]pdate [q]uit",
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let left_text = if app.state == AppState::Searching {
        format!(" Search: {}▌ ", app.search_query)
    } else if let Some(ref msg) = app.status_message {
        format!(" {} ", msg)
    } else if app.is_loading() {
        " Loading... ".to_string()
    } else {
        String::new()
    };

    let left_style = if app.state == AppState::Searching {
        styles::search_style()
    } else {
        styles::muted_style()
    };

    let right_text = format!(" {} ", tab_shortcuts(app.current_tab));
    let padding_len = (area.width as usize)
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.chars().count());

    let status_line = Line::from(vec![
        Span::styled(left_text, left_style),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    frame.render_widget(
        Paragraph::new(status_line).style(styles::status_bar_style()),
        area,
    );
}

fn logo_lines() -> Vec<Line<'static>> {
    LOGO.iter()
        .map(|l| Line::from(Span::styled(*l, styles::title_style())))
        .collect()
}

fn help_line(key: &'static str, desc: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<10}", key), styles::help_key_style()),
        Span::styled(desc, styles::help_desc_style()),
    ])
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(56, 30, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = logo_lines();
    lines.push(Line::from(Span::styled(
        format!("   version {}", env!("CARGO_PKG_VERSION")),
        styles::muted_style(),
    )));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(" Navigation", styles::highlight_style())));
    lines.push(help_line("1-5", "Switch tabs"));
    lines.push(help_line("←/→", "Previous/next tab"));
    lines.push(help_line("Tab", "Switch focus (list ↔ detail)"));
    lines.push(help_line("↑/↓ j/k", "Navigate list or scroll detail"));
    lines.push(help_line("Enter", "Load full details"));
    lines.push(help_line("Esc", "Go back / clear search"));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(" Actions", styles::highlight_style())));
    lines.push(help_line("/", "Search"));
    lines.push(help_line("u", "Update data from the server"));
    lines.push(help_line("a", "Add lead or company"));
    lines.push(help_line("[ ]", "Previous/next page"));
    lines.push(help_line("L", "Log out"));
    lines.push(help_line("q", "Quit"));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(" Replies", styles::highlight_style())));
    lines.push(help_line("r/x/z", "Mark read / archive / unread"));
    lines.push(help_line("s", "Cycle status filter"));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(" Settings", styles::highlight_style())));
    lines.push(help_line("e/p", "Edit ICP / company profile"));
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("       Press ", styles::muted_style()),
        Span::styled("?", styles::help_key_style()),
        Span::styled(" or ", styles::muted_style()),
        Span::styled("Esc", styles::help_key_style()),
        Span::styled(" to close", styles::muted_style()),
    ]));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn input_line(
    label: &str,
    value: &str,
    focused: bool,
    width: usize,
) -> Line<'static> {
    let style = if focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    // keep the tail visible while typing
    let shown: String = {
        let count = value.chars().count();
        value.chars().skip(count.saturating_sub(width)).collect()
    };
    let cursor = if focused { "▌" } else { "" };
    Line::from(vec![
        Span::styled(format!("  {:<10}[", label), styles::muted_style()),
        Span::styled(format!("{:<width$}{}", shown, cursor, width = width), style),
        Span::styled("]", styles::muted_style()),
    ])
}

fn render_login_overlay(frame: &mut Frame, app: &App) {
    let height = if app.login_error.is_some() { 14 } else { 12 };
    let area = centered_rect_fixed(52, height, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = logo_lines();
    lines.push(Line::from(""));

    lines.push(input_line(
        "Email:",
        &app.login_email,
        app.login_focus == LoginFocus::Email,
        28,
    ));
    let masked = "*".repeat(app.login_password.chars().count().min(28));
    lines.push(input_line(
        "Password:",
        &masked,
        app.login_focus == LoginFocus::Password,
        28,
    ));

    lines.push(Line::from(""));
    if app.login_focus == LoginFocus::Button {
        lines.push(Line::from(vec![
            Span::raw("               ["),
            Span::styled(" ▶ Login ◀ ", styles::selected_style()),
            Span::raw("]"),
        ]));
    } else {
        lines.push(Line::from(vec![
            Span::raw("               ["),
            Span::styled("   Login   ", styles::list_item_style()),
            Span::raw("]"),
        ]));
    }

    if let Some(ref error) = app.login_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(format!(" {}", error), styles::error_style())));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_form_overlay(frame: &mut Frame, form: &FormState) {
    let label_width = form
        .fields
        .iter()
        .map(|f| f.label.chars().count())
        .max()
        .unwrap_or(10);
    let value_width = 36;
    let width = (label_width + value_width + 10) as u16;
    let extra = if form.error.is_some() { 2 } else { 0 };
    let height = (form.fields.len() + 6 + extra) as u16;
    let area = centered_rect_fixed(width, height, frame.area());
    frame.render_widget(Clear, area);

    let visible_rows = area.height.saturating_sub(6 + extra as u16) as usize;
    let offset = form.selection.saturating_sub(visible_rows.saturating_sub(1));

    let mut lines = vec![Line::from("")];
    for (i, field) in form.fields.iter().enumerate().skip(offset).take(visible_rows.max(1)) {
        let focused = i == form.selection;
        let style = if focused {
            styles::selected_style()
        } else {
            styles::list_item_style()
        };
        let count = field.value.chars().count();
        let shown: String = field.value.chars().skip(count.saturating_sub(value_width)).collect();
        let cursor = if focused { "▌" } else { "" };
        lines.push(Line::from(vec![
            Span::styled(
                format!(" {:<w$} ", field.label, w = label_width),
                styles::muted_style(),
            ),
            Span::styled("[", styles::muted_style()),
            Span::styled(format!("{:<w$}{}", shown, cursor, w = value_width), style),
            Span::styled("]", styles::muted_style()),
        ]));
    }

    if let Some(ref error) = form.error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(format!(" {}", error), styles::error_style())));
    }

    lines.push(Line::from(""));
    let footer = if form.submitting {
        Line::from(Span::styled(" Saving...", styles::highlight_style()))
    } else {
        Line::from(vec![
            Span::styled(" Enter", styles::help_key_style()),
            Span::styled(" next  ", styles::muted_style()),
            Span::styled("Ctrl+S", styles::help_key_style()),
            Span::styled(" save  ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" cancel", styles::muted_style()),
        ])
    };
    lines.push(footer);

    let block = Block::default()
        .title(format!(" {} ", form.title()))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(46, 9, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = logo_lines();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "   Are you sure you want to quit?",
        styles::highlight_style(),
    )));
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("   Press ", styles::muted_style()),
        Span::styled("[Y]", styles::help_key_style()),
        Span::styled(" to quit, ", styles::muted_style()),
        Span::styled("[N]", styles::help_key_style()),
        Span::styled(" to cancel", styles::muted_style()),
    ]));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
