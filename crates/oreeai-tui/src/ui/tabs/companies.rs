use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use oreeai_core::models::{Company, CompanyFilter, CompanyStatus, Lead, ResearchFilter};
use oreeai_core::research::{company_research, research_sections};

use super::{field_line, heading, section_lines};
use crate::app::{App, Focus};
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    render_company_list(frame, app, chunks[0]);
    render_company_detail(frame, app, chunks[1]);
}

fn render_company_list(frame: &mut Frame, app: &App, area: Rect) {
    let focused = matches!(app.focus, Focus::List);
    let companies = app.visible_companies();

    let header = Row::new([
        Cell::from("Name"),
        Cell::from("Industry"),
        Cell::from("Size"),
        Cell::from("Leads"),
        Cell::from("Engagement"),
        Cell::from("Status"),
        Cell::from("R"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = companies
        .iter()
        .map(|company| {
            let tier = company.engagement_tier();
            Row::new(vec![
                Cell::from(company.name.clone()),
                Cell::from(company.industry.clone()),
                Cell::from(company.size.to_string()),
                Cell::from(company.leads.to_string()),
                Cell::from(Span::styled(
                    format!("{:>3}% {}", company.engagement, tier.label()),
                    styles::engagement_style(tier),
                )),
                Cell::from(Span::styled(company.status.as_str(), status_style(company.status))),
                Cell::from(if company.research_status { "✓" } else { "" }),
            ])
            .style(styles::list_item_style())
        })
        .collect();

    let widths = [
        Constraint::Percentage(28),
        Constraint::Fill(1),
        Constraint::Length(6),
        Constraint::Length(5),
        Constraint::Length(11),
        Constraint::Length(8),
        Constraint::Length(1),
    ];

    let title = format!(
        " Companies ({}/{}){} - [r]esearch [f]ilter [c]lear ",
        companies.len(),
        app.companies.len(),
        filter_summary(&app.company_filter)
    );

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(focused)),
        )
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    if !companies.is_empty() {
        state.select(Some(app.company_selection));
    }

    frame.render_stateful_widget(table, area, &mut state);
}

fn status_style(status: CompanyStatus) -> ratatui::style::Style {
    match status {
        CompanyStatus::Active => styles::success_style(),
        CompanyStatus::Inactive => styles::muted_style(),
    }
}

/// " - size 10-50, researched" style suffix for the list title.
fn filter_summary(filter: &CompanyFilter) -> String {
    if !filter.is_active() {
        return String::new();
    }
    let mut parts = Vec::new();
    if !filter.search.trim().is_empty() {
        parts.push(format!("\"{}\"", filter.search.trim()));
    }
    match (filter.size_min, filter.size_max) {
        (Some(min), Some(max)) => parts.push(format!("size {}-{}", min, max)),
        (Some(min), None) => parts.push(format!("size >= {}", min)),
        (None, Some(max)) => parts.push(format!("size <= {}", max)),
        (None, None) => {}
    }
    if filter.research != ResearchFilter::All {
        parts.push(filter.research.label().to_lowercase());
    }
    format!(" - {}", parts.join(", "))
}

fn render_company_detail(frame: &mut Frame, app: &App, area: Rect) {
    let focused = matches!(app.focus, Focus::Detail);
    let width = (area.width as usize).saturating_sub(4);

    let lines = match app.selected_company() {
        Some(selected) => match app.selected_company_detail() {
            Some(detail) => detail_lines(&detail.company, Some(detail.leads.as_slice()), width),
            None => detail_lines(selected, None, width),
        },
        None => vec![Line::from(Span::styled(
            "No company selected",
            styles::muted_style(),
        ))],
    };

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .title(" Details - [Enter] load leads ")
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(focused)),
        )
        .wrap(Wrap { trim: false })
        .scroll((app.detail_scroll, 0));

    frame.render_widget(paragraph, area);
}

/// `leads` is `None` until the detail has been loaded.
fn detail_lines(company: &Company, leads: Option<&[Lead]>, width: usize) -> Vec<Line<'static>> {
    let tier = company.engagement_tier();
    let mut lines = vec![
        Line::from(Span::styled(company.name.clone(), styles::title_style())),
        Line::from(""),
        field_line("Industry", company.industry.clone()),
        field_line("Size", company.size.to_string()),
    ];
    if let Some(website) = &company.website {
        lines.push(field_line("Website", website.clone()));
    }
    lines.push(field_line("Status", company.status.to_string()));
    lines.push(Line::from(vec![
        Span::styled(format!("{:<14}", "Engagement:"), styles::muted_style()),
        Span::styled(
            format!("{}% ({})", company.engagement, tier.label()),
            styles::engagement_style(tier),
        ),
    ]));
    lines.push(field_line(
        "Researched",
        if company.research_status { "yes" } else { "no" },
    ));
    lines.push(Line::from(""));

    match leads {
        Some(leads) => {
            lines.push(heading(format!("Leads ({})", leads.len())));
            if leads.is_empty() {
                lines.push(Line::from(Span::styled(
                    "  No leads matched",
                    styles::muted_style(),
                )));
            }
            for lead in leads {
                lines.push(Line::from(vec![
                    Span::raw("  "),
                    Span::raw(lead.name.clone()),
                    Span::styled(format!("  {}", lead.email), styles::muted_style()),
                    Span::raw("  "),
                    Span::styled(lead.status.clone(), styles::lead_status_style(&lead.status)),
                ]));
            }
        }
        None => lines.push(field_line("Leads", company.leads.to_string())),
    }
    lines.push(Line::from(""));

    match company_research(company.metadata.as_ref()) {
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

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_summary() {
        assert_eq!(filter_summary(&CompanyFilter::default()), "");

        let filter = CompanyFilter {
            size_min: Some(10),
            size_max: Some(50),
            research: ResearchFilter::Researched,
            ..Default::default()
        };
        assert_eq!(filter_summary(&filter), " - size 10-50, researched");

        let filter = CompanyFilter {
            search: "acme".into(),
            size_max: Some(5),
            ..Default::default()
        };
        assert_eq!(filter_summary(&filter), " - \"acme\", size <= 5");
    }
}
