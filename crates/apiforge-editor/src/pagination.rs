use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};
use unicode_width::UnicodeWidthStr;

use crate::form::SectionView;
use crate::model::Pagination;

/// Which URL is focused when paginating by response URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlField {
    Previous,
    Next,
}

/// The Pagination tab.
#[derive(Debug, Clone)]
pub struct PaginationEditor {
    pub pagination: Pagination,
    pub field: UrlField,
    pub cursor: usize,
    pub editing: bool,
    pub dirty: bool,
}

impl Default for PaginationEditor {
    fn default() -> Self {
        Self {
            pagination: Pagination::None,
            field: UrlField::Previous,
            cursor: 0,
            editing: false,
            dirty: false,
        }
    }
}

impl PaginationEditor {
    pub fn load(&mut self, pagination: &Pagination) {
        *self = Self::default();
        self.pagination = pagination.clone();
    }

    /// None → by URL → by page number → None.
    pub fn cycle_type(&mut self, permitted: bool) -> bool {
        if !permitted {
            return false;
        }
        self.pagination = match self.pagination {
            Pagination::None => Pagination::ByUrl {
                prev_url: String::new(),
                next_url: String::new(),
            },
            Pagination::ByUrl { .. } => Pagination::ByPageNumber,
            Pagination::ByPageNumber => Pagination::None,
        };
        self.editing = false;
        self.field = UrlField::Previous;
        self.dirty = true;
        true
    }

    pub fn toggle_field(&mut self) {
        self.field = match self.field {
            UrlField::Previous => UrlField::Next,
            UrlField::Next => UrlField::Previous,
        };
        self.cursor = self.url().map(|u| u.len()).unwrap_or(0);
    }

    fn url(&self) -> Option<&String> {
        match &self.pagination {
            Pagination::ByUrl { prev_url, next_url } => Some(match self.field {
                UrlField::Previous => prev_url,
                UrlField::Next => next_url,
            }),
            _ => None,
        }
    }

    fn url_mut(&mut self) -> Option<&mut String> {
        let field = self.field;
        match &mut self.pagination {
            Pagination::ByUrl { prev_url, next_url } => Some(match field {
                UrlField::Previous => prev_url,
                UrlField::Next => next_url,
            }),
            _ => None,
        }
    }

    /// Only URL pagination has editable fields.
    pub fn start_edit(&mut self, permitted: bool) -> bool {
        if !permitted {
            return false;
        }
        let Some(len) = self.url().map(|u| u.len()) else {
            return false;
        };
        self.cursor = len;
        self.editing = true;
        true
    }

    pub fn stop_edit(&mut self) {
        self.editing = false;
    }

    pub fn insert_char(&mut self, c: char) {
        if !self.editing {
            return;
        }
        let cursor = self.cursor;
        if let Some(url) = self.url_mut() {
            url.insert(cursor, c);
            self.cursor += c.len_utf8();
            self.dirty = true;
        }
    }

    pub fn backspace(&mut self) {
        if !self.editing || self.cursor == 0 {
            return;
        }
        let cursor = self.cursor;
        if let Some(url) = self.url_mut() {
            let prev = url[..cursor]
                .chars()
                .last()
                .map(|c| c.len_utf8())
                .unwrap_or(0);
            url.remove(cursor - prev);
            self.cursor -= prev;
            self.dirty = true;
        }
    }

    fn url_line(&self, label: &str, value: &str, field: UrlField, focused: bool) -> Line<'static> {
        let active = focused && self.field == field;
        let label_style = if active {
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let value_span = if value.is_empty() {
            Span::styled("https://mock-api.example.com?page=2", Style::default().fg(Color::DarkGray))
        } else if active && self.editing {
            Span::styled(value.to_string(), Style::default().fg(Color::Yellow))
        } else {
            Span::raw(value.to_string())
        };
        Line::from(vec![Span::styled(format!("{label:<14}"), label_style), value_span])
    }
}

impl SectionView for PaginationEditor {
    fn render(&self, frame: &mut Frame, area: Rect, focused: bool) {
        if area.height == 0 {
            return;
        }

        let mut lines = vec![
            Line::from(vec![
                Span::styled("Type: ", Style::default().fg(Color::DarkGray)),
                Span::styled(
                    self.pagination.label(),
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                ),
                Span::styled("  (p to change)", Style::default().fg(Color::DarkGray)),
            ]),
            Line::from(""),
        ];

        match &self.pagination {
            Pagination::None => lines.push(Line::from(Span::styled(
                "Results are fetched in a single request.",
                Style::default().fg(Color::DarkGray),
            ))),
            Pagination::ByUrl { prev_url, next_url } => {
                lines.push(self.url_line("Previous URL", prev_url, UrlField::Previous, focused));
                lines.push(self.url_line("Next URL", next_url, UrlField::Next, focused));
            }
            Pagination::ByPageNumber => lines.push(Line::from(Span::styled(
                "Bind the table's page number into a query param, e.g. page = {{Table1.pageNo}}",
                Style::default().fg(Color::DarkGray),
            ))),
        }

        frame.render_widget(Paragraph::new(lines), area);

        if focused && self.editing {
            if let Some(url) = self.url() {
                let row = match self.field {
                    UrlField::Previous => 2,
                    UrlField::Next => 3,
                };
                let x = area.x + 14 + url[..self.cursor].width() as u16;
                let y = area.y + row;
                if x < area.x + area.width && y < area.y + area.height {
                    frame.set_cursor_position((x, y));
                }
            }
        }
    }
}
