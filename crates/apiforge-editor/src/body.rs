use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};
use unicode_width::UnicodeWidthStr;

use crate::form::SectionView;
use crate::model::BodyFormat;

/// The Body tab: format selector plus a multi-line text editor.
#[derive(Debug, Clone)]
pub struct BodyEditor {
    pub format: BodyFormat,
    pub lines: Vec<String>,
    pub cursor_row: usize,
    /// Byte offset within the current line.
    pub cursor_col: usize,
    pub editing: bool,
    pub dirty: bool,
}

impl Default for BodyEditor {
    fn default() -> Self {
        Self {
            format: BodyFormat::None,
            lines: vec![String::new()],
            cursor_row: 0,
            cursor_col: 0,
            editing: false,
            dirty: false,
        }
    }
}

impl BodyEditor {
    pub fn load(&mut self, body: &str, format: BodyFormat) {
        *self = Self::default();
        self.format = format;
        if !body.is_empty() {
            // split keeps a trailing empty line, so text() gives the body back unchanged
            self.lines = body.split('\n').map(str::to_string).collect();
        }
    }

    /// The body as a single string.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn cycle_format(&mut self, permitted: bool) -> bool {
        if !permitted {
            return false;
        }
        self.format = self.format.next();
        self.dirty = true;
        true
    }

    pub fn start_edit(&mut self, permitted: bool) -> bool {
        self.editing = permitted;
        permitted
    }

    pub fn stop_edit(&mut self) {
        self.editing = false;
    }

    // ── Editing ──────────────────────────────────────────────────────

    pub fn insert_char(&mut self, c: char) {
        if let Some(line) = self.lines.get_mut(self.cursor_row) {
            line.insert(self.cursor_col, c);
            self.cursor_col += c.len_utf8();
            self.dirty = true;
        }
    }

    /// Insert a block of text at the cursor (for bracketed paste).
    pub fn insert_text(&mut self, text: &str) {
        for c in text.chars() {
            if c == '\n' {
                self.insert_newline();
            } else if c != '\r' {
                self.insert_char(c);
            }
        }
    }

    pub fn insert_newline(&mut self) {
        let tail = self.lines[self.cursor_row].split_off(self.cursor_col);
        self.lines.insert(self.cursor_row + 1, tail);
        self.cursor_row += 1;
        self.cursor_col = 0;
        self.dirty = true;
    }

    pub fn backspace(&mut self) {
        if self.cursor_col > 0 {
            let line = &mut self.lines[self.cursor_row];
            let prev = line[..self.cursor_col]
                .chars()
                .last()
                .map(|c| c.len_utf8())
                .unwrap_or(0);
            self.cursor_col -= prev;
            line.remove(self.cursor_col);
            self.dirty = true;
        } else if self.cursor_row > 0 {
            // Merge with previous line
            let current = self.lines.remove(self.cursor_row);
            self.cursor_row -= 1;
            self.cursor_col = self.lines[self.cursor_row].len();
            self.lines[self.cursor_row].push_str(&current);
            self.dirty = true;
        }
    }

    pub fn delete(&mut self) {
        let line_len = self.lines[self.cursor_row].len();
        if self.cursor_col < line_len {
            self.lines[self.cursor_row].remove(self.cursor_col);
            self.dirty = true;
        } else if self.cursor_row + 1 < self.lines.len() {
            let next = self.lines.remove(self.cursor_row + 1);
            self.lines[self.cursor_row].push_str(&next);
            self.dirty = true;
        }
    }

    // ── Cursor ───────────────────────────────────────────────────────

    pub fn cursor_left(&mut self) {
        let line = &self.lines[self.cursor_row];
        let prev = line[..self.cursor_col]
            .chars()
            .last()
            .map(|c| c.len_utf8())
            .unwrap_or(0);
        self.cursor_col -= prev;
    }

    pub fn cursor_right(&mut self) {
        let line = &self.lines[self.cursor_row];
        let next = line[self.cursor_col..]
            .chars()
            .next()
            .map(|c| c.len_utf8())
            .unwrap_or(0);
        self.cursor_col += next;
    }

    pub fn cursor_up(&mut self) {
        if self.cursor_row > 0 {
            self.cursor_row -= 1;
            self.clamp_col();
        }
    }

    pub fn cursor_down(&mut self) {
        if self.cursor_row + 1 < self.lines.len() {
            self.cursor_row += 1;
            self.clamp_col();
        }
    }

    pub fn goto_top(&mut self) {
        self.cursor_row = 0;
        self.cursor_col = 0;
    }

    pub fn goto_bottom(&mut self) {
        self.cursor_row = self.lines.len() - 1;
        self.cursor_col = self.lines[self.cursor_row].len();
    }

    /// Keep the column inside the line and on a char boundary.
    fn clamp_col(&mut self) {
        let line = &self.lines[self.cursor_row];
        let mut col = self.cursor_col.min(line.len());
        while !line.is_char_boundary(col) {
            col -= 1;
        }
        self.cursor_col = col;
    }
}

impl SectionView for BodyEditor {
    fn render(&self, frame: &mut Frame, area: Rect, focused: bool) {
        if area.height == 0 {
            return;
        }

        let format_line = Line::from(vec![
            Span::styled("Format: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                self.format.label(),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::styled("  (f to change)", Style::default().fg(Color::DarkGray)),
        ]);
        frame.render_widget(Paragraph::new(format_line), Rect { height: 1, ..area });

        if self.format == BodyFormat::None || area.height < 2 {
            return;
        }

        let text_area = Rect {
            y: area.y + 1,
            height: area.height - 1,
            ..area
        };
        let gutter: u16 = 4;
        let visible = text_area.height as usize;
        let scroll = self.cursor_row.saturating_sub(visible.saturating_sub(1));

        let lines: Vec<Line> = self
            .lines
            .iter()
            .enumerate()
            .skip(scroll)
            .take(visible)
            .map(|(i, l)| {
                Line::from(vec![
                    Span::styled(format!("{:>3} ", i + 1), Style::default().fg(Color::DarkGray)),
                    Span::raw(l.clone()),
                ])
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), text_area);

        if focused && self.editing {
            let before = self.lines[self.cursor_row][..self.cursor_col].width() as u16;
            let x = text_area.x + gutter + before;
            let y = text_area.y + (self.cursor_row - scroll) as u16;
            if x < text_area.x + text_area.width {
                frame.set_cursor_position((x, y));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_and_text() {
        let mut body = BodyEditor::default();
        body.load("{\n  \"a\": 1\n}", BodyFormat::Json);
        assert_eq!(body.lines.len(), 3);
        assert_eq!(body.text(), "{\n  \"a\": 1\n}");
        assert!(!body.dirty);

        body.load("", BodyFormat::None);
        assert_eq!(body.lines, vec![String::new()]);
    }

    #[test]
    fn test_trailing_newline_survives_load() {
        let mut body = BodyEditor::default();
        body.load("{}\n", BodyFormat::Json);
        assert_eq!(body.lines, vec!["{}".to_string(), String::new()]);
        assert_eq!(body.text(), "{}\n");

        body.load("a\n\n", BodyFormat::Raw);
        assert_eq!(body.text(), "a\n\n");
    }

    #[test]
    fn test_body_editing() {
        let mut body = BodyEditor::default();
        body.insert_char('{');
        body.insert_newline();
        body.insert_char('}');
        assert_eq!(body.lines, vec!["{", "}"]);
        assert_eq!(body.cursor_row, 1);
        assert_eq!(body.cursor_col, 1);

        body.backspace();
        assert_eq!(body.lines, vec!["{", ""]);
        body.backspace(); // merge lines
        assert_eq!(body.lines, vec!["{"]);
        assert!(body.dirty);
    }

    #[test]
    fn test_newline_splits_line() {
        let mut body = BodyEditor::default();
        body.insert_text("ab");
        body.cursor_left();
        body.insert_newline();
        assert_eq!(body.lines, vec!["a", "b"]);
    }

    #[test]
    fn test_delete_joins_next_line() {
        let mut body = BodyEditor::default();
        body.insert_text("a\r\nb");
        body.goto_top();
        body.cursor_right();
        body.delete();
        assert_eq!(body.lines, vec!["ab"]);
    }

    #[test]
    fn test_vertical_moves_respect_char_boundaries() {
        let mut body = BodyEditor::default();
        body.insert_text("é\nabc");
        assert_eq!(body.cursor_col, 3);
        body.cursor_up();
        assert_eq!(body.cursor_col, 2);
        body.cursor_down();
        body.cursor_left();
        body.cursor_up();
        // col 1 falls inside 'é'; clamped back to 0
        assert_eq!(body.cursor_col, 0);
    }

    #[test]
    fn test_format_cycle_requires_permission() {
        let mut body = BodyEditor::default();
        assert!(!body.cycle_format(false));
        assert_eq!(body.format, BodyFormat::None);
        assert!(body.cycle_format(true));
        assert_eq!(body.format, BodyFormat::Json);
    }
}
