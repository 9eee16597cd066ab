use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::ui::centered_rect;

/// A single entry in the help popup.
#[derive(Debug, Clone)]
pub struct HelpEntry {
    /// The key or key combination (e.g., "j/k", "<Space>w", "dd").
    pub key: String,
    pub description: String,
    /// Section header this entry belongs to.
    pub section: Option<String>,
}

impl HelpEntry {
    pub fn new(key: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            description: description.into(),
            section: None,
        }
    }

    pub fn with_section(
        section: impl Into<String>,
        key: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            description: description.into(),
            section: Some(section.into()),
        }
    }
}

/// The help popup state.
#[derive(Debug, Default)]
pub struct HelpPopup {
    pub visible: bool,
    title: String,
    entries: Vec<HelpEntry>,
    scroll: u16,
}

impl HelpPopup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, title: impl Into<String>, entries: Vec<HelpEntry>) {
        self.visible = true;
        self.title = title.into();
        self.entries = entries;
        self.scroll = 0;
    }

    pub fn hide(&mut self) {
        self.visible = false;
        self.entries.clear();
        self.title.clear();
        self.scroll = 0;
    }

    pub fn scroll_down(&mut self) {
        self.scroll = self.scroll.saturating_add(1);
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    /// Render the help popup centered on screen.
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        if !self.visible || self.entries.is_empty() {
            return;
        }

        let lines = self.build_lines();

        let popup_width = (area.width.saturating_sub(8)).min(60);
        let popup_height = (area.height.saturating_sub(6)).min(lines.len() as u16 + 2);
        let popup_area = centered_rect(popup_width, popup_height, area);

        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(format!(" {} ", self.title))
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL);

        let max_scroll = (lines.len() as u16).saturating_sub(popup_height.saturating_sub(2));
        let scroll = self.scroll.min(max_scroll);

        let paragraph = Paragraph::new(lines).block(block).scroll((scroll, 0));
        frame.render_widget(paragraph, popup_area);
    }

    /// Build display lines from entries, inserting section headers.
    fn build_lines(&self) -> Vec<Line<'static>> {
        let mut lines: Vec<Line<'static>> = Vec::new();
        let mut current_section: Option<&str> = None;
        let key_width = self
            .entries
            .iter()
            .map(|e| e.key.chars().count())
            .max()
            .unwrap_or(0);

        for entry in &self.entries {
            if let Some(ref section) = entry.section {
                if current_section != Some(section.as_str()) {
                    if !lines.is_empty() {
                        lines.push(Line::from(""));
                    }
                    lines.push(Line::from(Span::styled(
                        format!(" {}", section),
                        Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
                    )));
                    current_section = Some(section.as_str());
                }
            }

            lines.push(Line::from(vec![
                Span::styled(
                    format!("  {:>key_width$} ", entry.key),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw("  "),
                Span::raw(entry.description.clone()),
            ]));
        }

        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            " Esc/q/?  close    j/k  scroll",
            Style::default().add_modifier(Modifier::DIM),
        )));

        lines
    }
}

/// Global keybind help entries, appended after the active tool's entries.
pub fn global_help_entries() -> Vec<HelpEntry> {
    vec![
        HelpEntry::with_section("Navigation", "j / k", "Move down / up"),
        HelpEntry::with_section("Navigation", "gg / G", "Go to top / bottom"),
        HelpEntry::with_section("Navigation", "Tab / ]", "Next tab"),
        HelpEntry::with_section("Navigation", "S-Tab / [", "Previous tab"),
        HelpEntry::with_section("Navigation", "gt / gT", "Next / previous tab"),
        HelpEntry::with_section("Leader (Space)", "<Space>", "Open leader menu"),
        HelpEntry::with_section("Leader (Space)", "<Space>w", "Save"),
        HelpEntry::with_section("Leader (Space)", "<Space>q", "Quit"),
        HelpEntry::with_section("Other", ":w / :wa", "Save / save all"),
        HelpEntry::with_section("Other", ":q / :wq", "Quit / save all and quit"),
        HelpEntry::with_section("Other", ":q!", "Quit, discarding changes"),
        HelpEntry::with_section("Other", "?", "This help"),
        HelpEntry::with_section("Other", "Ctrl-c", "Force quit"),
    ]
}
