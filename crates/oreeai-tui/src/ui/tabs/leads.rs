use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use oreeai_core::models::Lead;
use oreeai_core::research::{content_sequence, lead_research, research_sections};

use super::{field_line, heading, section_lines, sequence_lines, wrap_text};
use crate::app::{App, Focus};
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    render_lead_list(frame, app, chunks[0]);
    render_lead_detail(frame, app, chunks[1]);
}

fn render_lead_list(frame: &mut Frame, app: &App, area: Rect) {
    let focused = matches!(app.focus, Focus::List);

    let header = Row::new([
        Cell::from("Name"),
        Cell::from("Company"),
        Cell::from("Status"),
        Cell::from("Sent"),
        Cell::from("Rate"),
        Cell::from("Last email"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = app
        .leads
        .items
        .iter()
        .map(|lead| {
            Row::new(vec![
                Cell::from(Line::from(vec![
                    Span::styled(
                        if lead.has_metadata() { "● " } else { "  " },
                        styles::success_style(),
                    ),
                    Span::raw(lead.name.clone()),
                ])),
                Cell::from(lead.company.clone()),
                Cell::from(Span::styled(
                    lead.status.clone(),
                    styles::lead_status_style(&lead.status),
                )),
                Cell::from(lead.emails_sent.to_string()),
                Cell::from(format!("{}%", lead.response_rate)),
                Cell::from(lead.last_email.clone()),
            ])
            .style(styles::list_item_style())
        })
        .collect();

    let widths = [
        Constraint::Percentage(26),
        Constraint::Fill(1),
        Constraint::Length(10),
        Constraint::Length(5),
        Constraint::Length(5),
        Constraint::Length(12),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(list_title(app))
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(focused)),
        )
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    if !app.leads.items.is_empty() {
        state.select(Some(app.lead_selection));
    }

    frame.render_stateful_widget(table, area, &mut state);
}

fn list_title(app: &App) -> String {
    let page = &app.leads;
    let mut title = format!(
        " Leads ({}) - status: {} - page {}/{} ",
        page.total,
        app.lead_status_label(),
        page.page,
        page.total_pages.max(1)
    );
    if !app.lead_filter.search.is_empty() {
        title.push_str(&format!("- \"{}\" ", app.lead_filter.search));
    }
    title
}

fn render_lead_detail(frame: &mut Frame, app: &App, area: Rect) {
    let focused = matches!(app.focus, Focus::Detail);
    let width = (area.width as usize).saturating_sub(4);

    let lines = match app.lead_for_detail() {
        Some(lead) => detail_lines(lead, width),
        None => vec![Line::from(Span::styled("No lead selected", styles::muted_style()))],
    };

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .title(" Details - [Enter] load research (● = researched) ")
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(focused)),
        )
        .wrap(Wrap { trim: false })
        .scroll((app.detail_scroll, 0));

    frame.render_widget(paragraph, area);
}

fn detail_lines(lead: &Lead, width: usize) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(lead.name.clone(), styles::title_style())),
        Line::from(""),
        field_line("Email", lead.email.clone()),
        field_line("Company", lead.company.clone()),
    ];
    if let Some(title) = lead.job_title() {
        lines.push(field_line("Job title", title));
    }
    lines.push(Line::from(vec![
        Span::styled(format!("{:<14}", "Status:"), styles::muted_style()),
        Span::styled(lead.status.clone(), styles::lead_status_style(&lead.status)),
    ]));
    lines.push(field_line("Emails sent", lead.emails_sent.to_string()));
    lines.push(field_line("Response rate", format!("{}%", lead.response_rate)));
    lines.push(field_line("Last email", lead.last_email.clone()));
    if let Some(source) = &lead.source {
        lines.push(field_line("Source", source.clone()));
    }
    if let Some(next) = &lead.next_action {
        lines.push(field_line("Next action", next.clone()));
    }
    if let Some(notes) = lead.notes.as_deref().filter(|n| !n.trim().is_empty()) {
        lines.push(Line::from(""));
        lines.push(heading("Notes"));
        lines.extend(wrap_text(notes, width).into_iter().map(Line::from));
    }

    lines.push(Line::from(""));
    let metadata = lead.metadata.as_ref();
    match lead_research(metadata) {
        Some(research) => {
            lines.push(heading("Research"));
            lines.push(Line::from(""));
            lines.extend(section_lines(&research_sections(Some(&research)), width));
        }
        None => lines.push(Line::from(Span::styled(
            "No research yet",
            styles::muted_style(),
        ))),
    }

    if let Some(sequence) = content_sequence(metadata) {
        lines.push(heading("Outreach Sequence"));
        lines.push(Line::from(""));
        lines.extend(sequence_lines(&sequence, width));
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn text(lines: &[Line]) -> String {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_detail_lines_show_research_and_sequence() {
        let mut lead = Lead::from_raw(&json!({
            "id": 1,
            "email": "ana@acme.com",
            "first_name": "Ana",
            "status": "active",
        }));
        lead.metadata = Some(json!({
            "research": { "summary": "Runs platform team" },
            "content_sequence": { "emails": [{ "subject": "Quick question", "body": "Hi Ana" }] },
        }));

        let rendered = text(&detail_lines(&lead, 60));
        assert!(rendered.contains("ana@acme.com"));
        assert!(rendered.contains("Runs platform team"));
        assert!(rendered.contains("Quick question"));
        assert!(!rendered.contains("No research yet"));
    }

    #[test]
    fn test_detail_lines_without_metadata() {
        let lead = Lead::from_raw(&json!({ "id": 2, "email": "bo@globex.com" }));
        let rendered = text(&detail_lines(&lead, 60));
        assert!(rendered.contains("No research yet"));
        assert!(!rendered.contains("Outreach Sequence"));
    }
}
