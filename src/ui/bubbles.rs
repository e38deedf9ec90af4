// ui/bubbles.rs

use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

use crate::{
    message::{Message, Speaker},
    role::RoleDefinition,
};

const ASSISTANT_NAME: &str = "TechPal";

// Bubbles take at most this share of the chat width.
const BUBBLE_WIDTH_PERCENT: usize = 80;

fn bubble_width(area_width: u16) -> usize {
    (area_width as usize * BUBBLE_WIDTH_PERCENT / 100).max(10)
}

// Headers name the speaker only; the role may have changed since the message was sent.
fn header_line(message: &Message) -> Line<'static> {
    match message.speaker {
        Speaker::User => Line::from(Span::styled(
            "You ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Right),
        Speaker::Assistant => Line::from(Span::styled(
            format!(" {ASSISTANT_NAME}"),
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Left),
    }
}

/// Lay out the conversation as speaker-tagged bubbles, wrapped to `area_width`.
///
/// User messages sit on the right, assistant replies on the left. Each bubble
/// is followed by an empty spacer line.
pub fn message_lines(messages: &[Message], area_width: u16) -> Vec<Line<'static>> {
    let width = bubble_width(area_width);
    let mut lines = Vec::new();

    for message in messages {
        let (alignment, style) = match message.speaker {
            Speaker::User => (Alignment::Right, Style::default().fg(Color::White)),
            Speaker::Assistant => (Alignment::Left, Style::default().fg(Color::Gray)),
        };

        lines.push(header_line(message));
        for paragraph in message.content.lines() {
            if paragraph.is_empty() {
                lines.push(Line::raw(""));
                continue;
            }
            for wrapped in textwrap::wrap(paragraph, width) {
                lines.push(
                    Line::from(Span::styled(format!(" {wrapped} "), style)).alignment(alignment),
                );
            }
        }
        lines.push(Line::raw(""));
    }

    lines
}

/// Intro shown above an empty conversation.
pub fn greeting_lines(role: &RoleDefinition, area_width: u16) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        format!(" {} {ASSISTANT_NAME}", role.icon),
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD),
    ))];
    for wrapped in textwrap::wrap(role.greeting, bubble_width(area_width)) {
        lines.push(Line::from(Span::styled(
            format!(" {wrapped} "),
            Style::default().fg(Color::Yellow),
        )));
    }
    lines
}
