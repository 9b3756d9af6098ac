use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use oreeai_core::models::{RepliesResult, Reply};
use oreeai_core::utils::format::initials;
use oreeai_core::utils::{format_timestamp, truncate};

use super::{field_line, wrap_text};
use crate::app::{App, Focus};
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    render_reply_list(frame, app, chunks[0]);
    render_reply_detail(frame, app, chunks[1]);
}

fn render_reply_list(frame: &mut Frame, app: &App, area: Rect) {
    let focused = matches!(app.focus, Focus::List);

    let header = Row::new([
        Cell::from("From"),
        Cell::from("Subject"),
        Cell::from("Sentiment"),
        Cell::from("Status"),
        Cell::from("When"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = app
        .replies
        .page
        .items
        .iter()
        .map(|reply| {
            Row::new(vec![
                Cell::from(reply.lead_name.clone()),
                Cell::from(truncate(&reply.subject, 48)),
                Cell::from(Span::styled(
                    reply.sentiment.as_str(),
                    styles::sentiment_style(reply.sentiment),
                )),
                Cell::from(Span::styled(
                    reply.status.as_str(),
                    styles::reply_status_style(reply.status),
                )),
                Cell::from(format_timestamp(&reply.timestamp)),
            ])
            .style(styles::list_item_style())
        })
        .collect();

    let widths = [
        Constraint::Percentage(24),
        Constraint::Fill(1),
        Constraint::Length(10),
        Constraint::Length(9),
        Constraint::Length(18),
    ];

    let filter = app
        .reply_filter
        .status
        .map(|s| s.as_str())
        .unwrap_or("all");

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(list_title(&app.replies, filter))
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(focused)),
        )
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    if !app.replies.page.items.is_empty() {
        state.select(Some(app.reply_selection));
    }

    frame.render_stateful_widget(table, area, &mut state);
}

fn list_title(replies: &RepliesResult, filter: &str) -> String {
    let page = &replies.page;
    let counts = match replies.stats {
        Some(stats) => format!(
            " - {} unread, {} positive",
            stats.unread, stats.positive
        ),
        None => String::new(),
    };
    format!(
        " Replies ({}){} - status: {} - page {}/{} ",
        page.total,
        counts,
        filter,
        page.page,
        page.total_pages.max(1)
    )
}

fn render_reply_detail(frame: &mut Frame, app: &App, area: Rect) {
    let focused = matches!(app.focus, Focus::Detail);
    let width = (area.width as usize).saturating_sub(4);

    let lines = match app.selected_reply() {
        Some(reply) => detail_lines(reply, width),
        None => vec![Line::from(Span::styled(
            "No reply selected",
            styles::muted_style(),
        ))],
    };

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .title(" Reply ")
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(focused)),
        )
        .scroll((app.detail_scroll, 0));

    frame.render_widget(paragraph, area);
}

fn detail_lines(reply: &Reply, width: usize) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(vec![
            Span::styled(format!(" {} ", initials(&reply.lead_name)), styles::selected_style()),
            Span::raw(" "),
            Span::styled(reply.subject.clone(), styles::title_style()),
        ]),
        Line::from(""),
        field_line("From", reply.lead_name.clone()),
    ];
    if !reply.lead_email.is_empty() {
        lines.push(field_line("Email", reply.lead_email.clone()));
    }
    lines.push(field_line("Received", format_timestamp(&reply.timestamp)));
    lines.push(Line::from(vec![
        Span::styled(format!("{:<14}", "Sentiment:"), styles::muted_style()),
        Span::styled(reply.sentiment.as_str(), styles::sentiment_style(reply.sentiment)),
    ]));
    lines.push(Line::from(vec![
        Span::styled(format!("{:<14}", "Status:"), styles::muted_style()),
        Span::styled(reply.status.as_str(), styles::reply_status_style(reply.status)),
    ]));
    lines.push(Line::from(""));

    if reply.preview.trim().is_empty() {
        lines.push(Line::from(Span::styled("(no preview)", styles::muted_style())));
    } else {
        lines.extend(wrap_text(&reply.preview, width).into_iter().map(Line::from));
    }
    lines
}
