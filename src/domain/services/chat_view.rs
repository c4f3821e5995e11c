#[cfg(test)]
#[path = "chat_view_test.rs"]
mod tests;

use ratatui::style::Color;
use ratatui::style::Modifier;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::text::Span;

use super::FAILED_EXCHANGE_TEXT;
use crate::domain::models::Message;
use crate::domain::models::Role;

const CONTENT_INDENT: &str = "  ";

fn header_style(message: &Message) -> Style {
    let colour = match message.role {
        Role::Human => Color::Cyan,
        Role::Ai if message.content == FAILED_EXCHANGE_TEXT => Color::Red,
        Role::Ai => Color::Green,
    };

    return Style {
        fg: Some(colour),
        ..Style::default()
    }
    .add_modifier(Modifier::BOLD);
}

/// Lays out the current session's messages, plus an optional transient
/// notice, as wrapped terminal lines.
#[derive(Default)]
pub struct ChatView {
    lines: Vec<Line<'static>>,
}

impl ChatView {
    pub fn set_messages(&mut self, messages: &[Message], notice: Option<&str>, width: usize) {
        let content_width = width.saturating_sub(CONTENT_INDENT.len()).max(1);
        let mut lines: Vec<Line<'static>> = vec![];

        for message in messages {
            if !lines.is_empty() {
                lines.push(Line::from(""));
            }

            lines.push(Line::from(Span::styled(
                message.role.display_name(),
                header_style(message),
            )));
            for line in message.as_string_lines(content_width) {
                lines.push(Line::from(format!("{CONTENT_INDENT}{line}")));
            }
        }

        if let Some(notice) = notice {
            if !lines.is_empty() {
                lines.push(Line::from(""));
            }

            let style = Style {
                fg: Some(Color::DarkGray),
                ..Style::default()
            };
            for line in Message::ai(notice).as_string_lines(width.max(1)) {
                lines.push(Line::from(Span::styled(line, style)));
            }
        }

        self.lines = lines;
    }

    pub fn lines(&self) -> &[Line<'static>] {
        return &self.lines;
    }

    pub fn len(&self) -> usize {
        return self.lines.len();
    }
}
