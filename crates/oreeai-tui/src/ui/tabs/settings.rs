use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use oreeai_core::models::icp::ICP_FIELDS;
use oreeai_core::models::{IcpForm, IcpSettings, TenantProfile};
use oreeai_core::utils::format::format_phone;

use super::{field_line, heading};
use crate::app::App;
use crate::ui::styles;

const ICP_LABEL_WIDTH: usize = 34;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    render_icp(frame, app, chunks[0]);
    render_profile(frame, app, chunks[1]);
}

fn render_icp(frame: &mut Frame, app: &App, area: Rect) {
    let lines = match &app.icp_settings {
        Some(settings) => icp_lines(settings),
        None => vec![
            Line::from(Span::styled(
                "No ideal customer profile saved yet.",
                styles::muted_style(),
            )),
            Line::from(""),
            Line::from(vec![
                Span::raw("Press "),
                Span::styled("[e]", styles::help_key_style()),
                Span::raw(" to define one."),
            ]),
        ],
    };

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .title(" Ideal Customer Profile - [e]dit ")
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(true)),
        )
        .wrap(Wrap { trim: false })
        .scroll((app.detail_scroll, 0));

    frame.render_widget(paragraph, area);
}

/// Filled-in ICP fields only; blanks are skipped.
fn icp_lines(settings: &IcpSettings) -> Vec<Line<'static>> {
    let form = IcpForm::from_settings(settings);
    let lines: Vec<Line<'static>> = ICP_FIELDS
        .iter()
        .filter_map(|&(label, key)| {
            let value = form.field(key)?;
            if value.trim().is_empty() {
                return None;
            }
            Some(Line::from(vec![
                Span::styled(
                    format!("{:<width$}", label, width = ICP_LABEL_WIDTH),
                    styles::muted_style(),
                ),
                Span::raw(value),
            ]))
        })
        .collect();

    if lines.is_empty() {
        return vec![Line::from(Span::styled(
            "All criteria are empty.",
            styles::muted_style(),
        ))];
    }
    lines
}

fn render_profile(frame: &mut Frame, app: &App, area: Rect) {
    let lines = match &app.tenant_profile {
        Some(profile) => profile_lines(profile),
        None => vec![Line::from(Span::styled(
            "Profile unavailable",
            styles::muted_style(),
        ))],
    };

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(" Company Profile - [p] edit ")
            .title_style(styles::muted_style())
            .borders(Borders::ALL)
            .border_style(styles::border_style(false)),
    );

    frame.render_widget(paragraph, area);
}

fn profile_lines(profile: &TenantProfile) -> Vec<Line<'static>> {
    let show = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());
    vec![
        heading(profile.display_name().to_string()),
        Line::from(""),
        field_line("Email", show(&profile.email)),
        field_line("Industry", show(&profile.industry)),
        field_line("Website", show(&profile.website)),
        field_line(
            "Phone",
            profile
                .phone
                .as_deref()
                .map(format_phone)
                .unwrap_or_else(|| "-".to_string()),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icp_lines_skip_blank_fields() {
        let settings = IcpSettings {
            person_titles: vec!["CTO".into()],
            include_similar_titles: true,
            ..Default::default()
        };
        let lines = icp_lines(&settings);
        let rendered: Vec<String> = lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect();
        assert!(rendered.iter().any(|l| l.contains("CTO")));
        assert!(rendered.len() < ICP_FIELDS.len());
    }

    #[test]
    fn test_profile_lines_fallbacks() {
        let lines = profile_lines(&TenantProfile::default());
        let first: String = lines[0].spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(first, "Your company");
        assert_eq!(lines.len(), 6);
    }
}
