//! Mode indicator badge for the status bar.

use ratatui::{
    style::{Color, Modifier, Style},
    widgets::Widget,
};

use toshokan_core::{EditKind, Focus, Interaction, Modal};

/// Shows which panel has focus, or which edit is open.
///
/// Color coding:
/// - Library: Blue
/// - Tags: Magenta
/// - Editing tags: Green
/// - Editing metadata: Yellow
pub struct ModeIndicator<'a> {
    interaction: &'a Interaction,
}

impl<'a> ModeIndicator<'a> {
    pub fn new(interaction: &'a Interaction) -> Self {
        Self { interaction }
    }

    pub fn mode_color(interaction: &Interaction) -> Color {
        match (interaction.modal(), interaction.focus()) {
            (Modal::Editing(edit), _) if edit.kind == EditKind::Tags => Color::Green,
            (Modal::Editing(_), _) => Color::Yellow,
            (Modal::Idle, Focus::Library) => Color::Blue,
            (Modal::Idle, Focus::Tags) => Color::Magenta,
        }
    }

    fn style(&self) -> Style {
        Style::default()
            .fg(Color::White)
            .bg(Self::mode_color(self.interaction))
            .add_modifier(Modifier::BOLD)
    }

    /// Badge text.
    pub fn text(&self) -> String {
        format!("[{}]", self.interaction.display_name())
    }
}

impl Widget for ModeIndicator<'_> {
    fn render(self, area: ratatui::prelude::Rect, buf: &mut ratatui::prelude::Buffer) {
        let text = self.text();
        // Only render if we have space
        if area.width >= text.len() as u16 && area.height >= 1 {
            buf.set_string(area.x, area.y, &text, self.style());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_colors() {
        let interaction = Interaction::new();
        assert_eq!(ModeIndicator::mode_color(&interaction), Color::Blue);
        assert_eq!(ModeIndicator::new(&interaction).text(), "[LIBRARY]");
    }
}
