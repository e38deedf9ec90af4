// ui/sidebar.rs

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget, Wrap},
};
use strum::IntoEnumIterator;

use crate::{context::Context, role::Role};

use super::constants::{TAGLINE, TITLE};

pub fn render_sidebar(
    buffer: &mut Buffer,
    context: &Context,
    cursor: usize,
    focused: bool,
    area: Rect,
) {
    let [title_area, roles_area, info_area] = Layout::vertical([
        Constraint::Length(8),
        Constraint::Length(Role::iter().count() as u16 + 2),
        Constraint::Min(0),
    ])
    .areas(area);

    render_title(buffer, title_area);
    render_roles(buffer, context, cursor, focused, roles_area);
    render_info(buffer, context, info_area);
}

fn render_title(buffer: &mut Buffer, area: Rect) {
    let mut lines: Vec<Line> = TITLE
        .lines()
        .map(|line| Line::styled(line, Style::default().fg(Color::Green)))
        .collect();
    lines.push(Line::styled(TAGLINE, Style::default().fg(Color::DarkGray)));

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .render(area, buffer);
}

// One line per role, radio-button style; the selection is always a catalog role.
fn render_roles(buffer: &mut Buffer, context: &Context, cursor: usize, focused: bool, area: Rect) {
    let active = context.role.role();

    let lines: Vec<Line> = Role::iter()
        .enumerate()
        .map(|(index, role)| {
            let marker = if Some(role) == active { "(•)" } else { "( )" };
            let style = if focused && index == cursor {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else if Some(role) == active {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::White)
            };
            Line::from(vec![
                Span::styled(format!("F{} ", index + 1), Style::default().fg(Color::Gray)),
                Span::styled(format!("{marker} {} {role}", role.icon()), style),
            ])
        })
        .collect();

    let border_color = if focused { Color::Yellow } else { Color::DarkGray };
    Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(border_color))
                .title(" Choose your role "),
        )
        .render(area, buffer);
}

fn render_info(buffer: &mut Buffer, context: &Context, area: Rect) {
    let role = context.role.definition();
    let lines = vec![
        Line::from(vec![
            Span::styled("Role: ", Style::default().fg(Color::Yellow)),
            Span::raw(format!("{} {}", role.icon, role.name)),
        ]),
        Line::from(vec![
            Span::styled("Model: ", Style::default().fg(Color::Yellow)),
            Span::raw(context.model.to_string()),
        ]),
        Line::from(vec![
            Span::styled("Chat: ", Style::default().fg(Color::Yellow)),
            Span::raw(context.conversation.short()),
        ]),
        Line::from(vec![
            Span::styled("Messages: ", Style::default().fg(Color::Yellow)),
            Span::raw(context.messages.len().to_string()),
        ]),
        Line::raw(""),
        Line::styled("Ctrl+R starts a new chat", Style::default().fg(Color::DarkGray)),
    ];

    Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" Session "),
        )
        .wrap(Wrap { trim: true })
        .render(area, buffer);
}
