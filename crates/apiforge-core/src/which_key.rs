use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::ui::centered_rect;

/// One key in the leader menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhichKeyEntry {
    pub key: String,
    pub description: String,
}

impl WhichKeyEntry {
    pub fn action(key: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            description: description.into(),
        }
    }
}

/// Leader menu popup. Hub keys are listed first, the active tool's keys
/// below a divider.
#[derive(Debug, Default)]
pub struct WhichKey {
    pub visible: bool,
    pub title: String,
    hub: Vec<WhichKeyEntry>,
    tool: Vec<WhichKeyEntry>,
}

impl WhichKey {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(
        &mut self,
        title: impl Into<String>,
        hub: Vec<WhichKeyEntry>,
        tool: Vec<WhichKeyEntry>,
    ) {
        self.visible = true;
        self.title = title.into();
        self.hub = hub;
        self.tool = tool;
    }

    pub fn hide(&mut self) {
        *self = Self::default();
    }

    fn build_lines(&self) -> Vec<Line<'static>> {
        let key_width = self
            .hub
            .iter()
            .chain(&self.tool)
            .map(|e| e.key.chars().count())
            .max()
            .unwrap_or(1);

        let entry_line = |e: &WhichKeyEntry| {
            Line::from(vec![
                Span::styled(
                    format!(" {:>key_width$} ", e.key),
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                ),
                Span::styled("→ ", Style::default().fg(Color::DarkGray)),
                Span::raw(e.description.clone()),
            ])
        };

        let mut lines: Vec<Line<'static>> = self.hub.iter().map(entry_line).collect();
        if !self.tool.is_empty() {
            if !lines.is_empty() {
                lines.push(Line::from(Span::styled(
                    " ─────",
                    Style::default().fg(Color::DarkGray),
                )));
            }
            lines.extend(self.tool.iter().map(entry_line));
        }
        lines
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        if !self.visible {
            return;
        }
        let lines = self.build_lines();
        if lines.is_empty() {
            return;
        }

        let content_width = lines.iter().map(|l| l.width()).max().unwrap_or(10);
        let width = (content_width as u16 + 4)
            .max(self.title.len() as u16 + 6)
            .min(area.width.saturating_sub(4));
        let height = (lines.len() as u16 + 2).min(area.height.saturating_sub(4));
        let popup_area = centered_rect(width, height, area);

        frame.render_widget(Clear, popup_area);
        let block = Block::default()
            .title(format!(" {} ", self.title))
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Blue));
        frame.render_widget(Paragraph::new(lines).block(block), popup_area);
    }
}

/// Leader keys owned by the hub.
pub fn hub_leader_entries() -> Vec<WhichKeyEntry> {
    vec![
        WhichKeyEntry::action("w", "Save"),
        WhichKeyEntry::action("q", "Quit"),
        WhichKeyEntry::action("?", "Help"),
    ]
}
