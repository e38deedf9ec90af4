// ui/chat.rs

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, BorderType, Borders, Paragraph, Widget},
};
use strum::IntoEnumIterator;
use tui_textarea::TextArea;

use crate::{app::Action, context::Context, role::Role};

use super::{
    Component,
    bubbles::{greeting_lines, message_lines},
    constants::{BUSY_HINTS, INPUT_HINTS, MIN_HEIGHT, MIN_WIDTH, SIDEBAR_HINTS},
    sidebar::render_sidebar,
    spinner::spinner_frame,
    utils::center_rect,
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    #[default]
    Input,
    Roles,
}

/// The single TechPal screen: role sidebar, chat bubbles and the input box.
#[derive(Debug)]
pub struct ChatScreen {
    focus: Focus,
    cursor: usize,
    input: TextArea<'static>,
    // First visible line; `None` follows the newest message.
    scroll: Option<usize>,
    max_scroll: usize,
    page: usize,
}

impl Default for ChatScreen {
    fn default() -> Self {
        Self::new()
    }
}

fn new_input() -> TextArea<'static> {
    let mut input = TextArea::default();
    input.set_placeholder_text("Enter your query and let TechPal handle it! ⚡");
    input.set_cursor_line_style(Style::default());
    input
}

impl ChatScreen {
    pub fn new() -> Self {
        Self {
            focus: Focus::Input,
            cursor: 0,
            input: new_input(),
            scroll: None,
            max_scroll: 0,
            page: 1,
        }
    }

    pub fn input_text(&self) -> String {
        self.input.lines().join("\n")
    }

    pub fn clear_input(&mut self) {
        self.input = new_input();
    }

    pub fn follow_latest(&mut self) {
        self.scroll = None;
    }

    fn scroll_up(&mut self, lines: usize) {
        let current = self.scroll.unwrap_or(self.max_scroll);
        self.scroll = Some(current.saturating_sub(lines));
    }

    fn scroll_down(&mut self, lines: usize) {
        let current = self.scroll.unwrap_or(self.max_scroll);
        let next = current.saturating_add(lines);
        self.scroll = if next >= self.max_scroll { None } else { Some(next) };
    }

    fn select_role_at(&mut self, index: usize) -> Option<Action> {
        let role = Role::iter().nth(index)?;
        self.cursor = index;
        Some(Action::SelectRole(role))
    }

    fn on_roles_key(&mut self, key: KeyEvent) -> Option<Action> {
        let count = Role::iter().count();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                let index = if self.cursor == 0 { count - 1 } else { self.cursor - 1 };
                self.select_role_at(index)
            }
            KeyCode::Down | KeyCode::Char('j') => self.select_role_at((self.cursor + 1) % count),
            KeyCode::Enter | KeyCode::Tab | KeyCode::Esc => {
                self.focus = Focus::Input;
                None
            }
            KeyCode::Char(c) => c
                .to_digit(10)
                .and_then(|digit| self.select_role_at((digit as usize).checked_sub(1)?)),
            _ => None,
        }
    }

    fn on_input_key(&mut self, key: KeyEvent, context: &Context) -> Option<Action> {
        match key.code {
            KeyCode::Tab => {
                self.focus = Focus::Roles;
                self.cursor = context
                    .role
                    .role()
                    .and_then(|active| Role::iter().position(|role| role == active))
                    .unwrap_or(0);
                None
            }
            // Input stays locked until the pending reply lands.
            _ if context.busy => None,
            KeyCode::Enter if key.modifiers.contains(KeyModifiers::ALT) => {
                self.input.insert_newline();
                None
            }
            KeyCode::Enter => {
                let text = self.input_text();
                if text.trim().is_empty() {
                    return None;
                }
                self.clear_input();
                self.follow_latest();
                Some(Action::Submit(text))
            }
            _ => {
                self.input.input(key);
                None
            }
        }
    }

    fn render_chat(&mut self, buffer: &mut Buffer, context: &Context, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(format!(" Chat {} ", context.conversation.short()));
        let inner = block.inner(area);
        block.render(area, buffer);

        let role = context.role.definition();
        let mut lines = greeting_lines(&role, inner.width);
        lines.push(ratatui::text::Line::raw(""));
        lines.extend(message_lines(context.messages, inner.width));

        // Lines are already wrapped, so the window is sliced here rather than
        // scrolled by the paragraph, whose offset is only a u16.
        let height = inner.height as usize;
        self.page = height.max(1);
        self.max_scroll = lines.len().saturating_sub(height);
        let offset = self.scroll.unwrap_or(self.max_scroll).min(self.max_scroll);
        let visible: Vec<_> = lines.into_iter().skip(offset).take(height).collect();

        Paragraph::new(visible).render(inner, buffer);

        if context.busy && inner.height > 0 {
            let spinner_area = Rect::new(inner.x, inner.bottom() - 1, inner.width, 1);
            Paragraph::new(spinner_frame(context.spinner))
                .style(Style::default().fg(Color::Green))
                .alignment(Alignment::Center)
                .render(spinner_area, buffer);
        }
    }

    fn render_input(&mut self, buffer: &mut Buffer, context: &Context, area: Rect) {
        let (title, color) = if context.busy {
            (" Waiting for TechPal… ", Color::DarkGray)
        } else if self.focus == Focus::Input {
            (" Your question ", Color::Yellow)
        } else {
            (" Your question ", Color::DarkGray)
        };
        self.input.set_block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(color))
                .title(title),
        );
        (&self.input).render(area, buffer);
    }

    fn render_hints(&self, buffer: &mut Buffer, context: &Context, area: Rect) {
        let hints = if context.busy {
            BUSY_HINTS
        } else {
            match self.focus {
                Focus::Input => INPUT_HINTS,
                Focus::Roles => SIDEBAR_HINTS,
            }
        };
        Paragraph::new(hints)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .render(area, buffer);
    }
}

impl Component for ChatScreen {
    fn on_key(&mut self, key: KeyEvent, context: &Context) -> Option<Action> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') if ctrl => return Some(Action::Quit),
            KeyCode::Char('r') if ctrl => {
                // Reset is refused while a request is in flight.
                return (!context.busy).then_some(Action::Reset);
            }
            KeyCode::Esc if context.busy => return Some(Action::Stop),
            KeyCode::F(n @ 1..=4) => return self.select_role_at(n as usize - 1),
            KeyCode::PageUp => {
                self.scroll_up(self.page);
                return None;
            }
            KeyCode::PageDown => {
                self.scroll_down(self.page);
                return None;
            }
            _ => {}
        }

        match self.focus {
            Focus::Roles => self.on_roles_key(key),
            Focus::Input => self.on_input_key(key, context),
        }
    }

    fn render(&mut self, area: Rect, buffer: &mut Buffer, context: &Context) {
        if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
            Paragraph::new("Terminal too small. Please resize.")
                .style(Style::default().fg(Color::Red))
                .alignment(Alignment::Center)
                .render(
                    center_rect(area, Constraint::Percentage(100), Constraint::Length(1)),
                    buffer,
                );
            return;
        }

        let [sidebar_area, main_area] =
            Layout::horizontal([Constraint::Length(40), Constraint::Min(0)]).areas(area);
        let [chat_area, input_area, hints_area] = Layout::vertical([
            Constraint::Min(0),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .areas(main_area);

        render_sidebar(
            buffer,
            context,
            self.cursor,
            self.focus == Focus::Roles,
            sidebar_area,
        );
        self.render_chat(buffer, context, chat_area);
        self.render_input(buffer, context, input_area);
        self.render_hints(buffer, context, hints_area);
    }
}
