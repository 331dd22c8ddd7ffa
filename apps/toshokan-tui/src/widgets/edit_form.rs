//! Popup form for an open edit.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};

use toshokan_core::{EditKind, EditSession};

/// One line per field of the edit; the active field gets a cursor.
pub struct EditForm<'a> {
    edit: &'a EditSession,
    active: usize,
}

impl<'a> EditForm<'a> {
    pub fn new(edit: &'a EditSession, active: usize) -> Self {
        Self { edit, active }
    }

    fn title(&self) -> String {
        let kind = match self.edit.kind {
            EditKind::Tags => "Edit tags",
            EditKind::Metadata => "Edit metadata",
        };
        format!(" {kind}: {} ", self.edit.target)
    }

    fn lines(&self) -> Vec<Line<'a>> {
        let mut lines = Vec::new();
        for (i, field) in self.edit.kind.fields().iter().enumerate() {
            let value = self.edit.draft.get(*field);
            let active = i == self.active;
            let label_style = if active {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            lines.push(Line::from(Span::styled(field.label(), label_style)));
            let mut value_line = vec![Span::raw(format!("  {value}"))];
            if active {
                value_line.push(Span::styled(
                    "_",
                    Style::default().add_modifier(Modifier::SLOW_BLINK),
                ));
            }
            lines.push(Line::from(value_line));
            lines.push(Line::default());
        }
        lines
    }
}

impl Widget for EditForm<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(self.title())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green))
            .style(Style::default().bg(Color::Black));
        Clear.render(area, buf);
        Paragraph::new(self.lines())
            .block(block)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}
