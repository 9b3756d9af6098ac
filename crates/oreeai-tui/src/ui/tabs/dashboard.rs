use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use oreeai_core::models::DashboardStats;
use oreeai_core::utils::{format_timestamp, truncate};

use crate::app::App;
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(10), Constraint::Min(5)])
        .split(area);

    match &app.dashboard {
        Some(dashboard) => render_stats(frame, &dashboard.stats, chunks[0]),
        None => {
            let block = Block::default()
                .title(" Overview ")
                .borders(Borders::ALL)
                .border_style(styles::border_style(false));
            let text = if app.is_loading() { "Loading..." } else { "No data" };
            frame.render_widget(
                Paragraph::new(Span::styled(text, styles::muted_style())).block(block),
                chunks[0],
            );
        }
    }

    render_recent_replies(frame, app, chunks[1]);
}

fn stat_cards(stats: &DashboardStats) -> [(&'static str, String); 8] {
    [
        ("Total Leads", stats.total_leads.to_string()),
        ("Active Leads", stats.active_leads.to_string()),
        ("Companies", stats.companies.to_string()),
        ("Response Rate", format!("{}%", stats.response_rate)),
        ("Emails Sent", stats.total_emails.to_string()),
        ("Pending Replies", stats.pending_replies.to_string()),
        ("Avg Engagement", format!("{}%", stats.avg_engagement)),
        ("Last 7 Days", format!("{}%", stats.last_7_days_performance)),
    ]
}

fn render_stats(frame: &mut Frame, stats: &DashboardStats, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Length(5)])
        .split(area);

    let cards = stat_cards(stats);
    for (row, chunk) in cards.chunks(4).zip(rows.iter()) {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 4); 4])
            .split(*chunk);

        for ((label, value), col) in row.iter().zip(cols.iter()) {
            let lines = vec![
                Line::from(""),
                Line::from(Span::styled(value.clone(), styles::stat_value_style())).centered(),
            ];
            let card = Paragraph::new(lines).block(
                Block::default()
                    .title(format!(" {} ", label))
                    .title_style(styles::muted_style())
                    .borders(Borders::ALL)
                    .border_style(styles::border_style(false)),
            );
            frame.render_widget(card, *col);
        }
    }
}

fn render_recent_replies(frame: &mut Frame, app: &App, area: Rect) {
    let replies = app
        .dashboard
        .as_ref()
        .map(|d| d.recent_replies.as_slice())
        .unwrap_or_default();

    let header = Row::new([
        Cell::from("From"),
        Cell::from("Subject"),
        Cell::from("Sentiment"),
        Cell::from("Status"),
        Cell::from("Received"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = replies
        .iter()
        .map(|reply| {
            Row::new(vec![
                Cell::from(reply.lead_name.clone()),
                Cell::from(truncate(&reply.subject, 60)),
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
        Constraint::Percentage(22),
        Constraint::Fill(1),
        Constraint::Length(10),
        Constraint::Length(9),
        Constraint::Length(18),
    ];

    let title = if replies.is_empty() {
        " Recent Replies - none yet ".to_string()
    } else {
        format!(" Recent Replies ({}) ", replies.len())
    };

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .title(title)
            .title_style(styles::muted_style())
            .borders(Borders::ALL)
            .border_style(styles::border_style(true)),
    );

    frame.render_widget(table, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stat_cards_format_percentages() {
        let stats = DashboardStats {
            total_leads: 12,
            response_rate: 58,
            last_7_days_performance: 7,
            ..Default::default()
        };
        let cards = stat_cards(&stats);
        assert_eq!(cards[0], ("Total Leads", "12".to_string()));
        assert_eq!(cards[3].1, "58%");
        assert_eq!(cards[7].1, "7%");
    }
}
