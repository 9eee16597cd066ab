use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::model::KeyValue;

/// Which field is being edited in a key-value row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KvField {
    Key,
    Value,
}

/// Text shown on the "add row" line. Only rendered when rows may be appended.
pub const ADD_ROW_LABEL: &str = "+ Add more";

const SELECTED_BG: Color = Color::Gray;

/// Editing state of an editable key-value list (action headers or params).
///
/// Every mutating operation takes `permitted`; when it is false the call is a
/// no-op and returns `false`.
#[derive(Debug, Clone)]
pub struct KeyValueList {
    /// Field name in the form, e.g. `actionConfiguration.headers`.
    pub name: String,
    pub rows: Vec<KeyValue>,
    pub selected: usize,
    pub editing: bool,
    pub editing_field: KvField,
    /// Byte offset of the cursor within the edited field.
    pub cursor: usize,
    pub dirty: bool,
}

impl KeyValueList {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
            selected: 0,
            editing: false,
            editing_field: KvField::Key,
            cursor: 0,
            dirty: false,
        }
    }

    /// Replace the rows (on load), resetting selection and edit state.
    pub fn set_rows(&mut self, rows: Vec<KeyValue>) {
        self.rows = rows;
        self.selected = 0;
        self.editing = false;
        self.editing_field = KvField::Key;
        self.cursor = 0;
        self.dirty = false;
    }

    // ── Navigation ───────────────────────────────────────────────────

    pub fn move_down(&mut self, n: usize) {
        if !self.rows.is_empty() {
            self.selected = (self.selected + n).min(self.rows.len() - 1);
        }
    }

    pub fn move_up(&mut self, n: usize) {
        self.selected = self.selected.saturating_sub(n);
    }

    pub fn goto_top(&mut self) {
        self.selected = 0;
    }

    pub fn goto_bottom(&mut self) {
        self.selected = self.rows.len().saturating_sub(1);
    }

    // ── Row operations ───────────────────────────────────────────────

    /// Append an empty row at the end and select it.
    pub fn push_row(&mut self, permitted: bool) -> bool {
        if !permitted {
            return false;
        }
        self.rows.push(KeyValue::default());
        self.selected = self.rows.len() - 1;
        self.dirty = true;
        true
    }

    /// Insert an empty row below the selection and select it.
    pub fn insert_below(&mut self, permitted: bool) -> bool {
        if !permitted {
            return false;
        }
        let idx = if self.rows.is_empty() {
            0
        } else {
            self.selected + 1
        };
        self.rows.insert(idx, KeyValue::default());
        self.selected = idx;
        self.dirty = true;
        true
    }

    pub fn delete_row(&mut self, permitted: bool) -> bool {
        if !permitted || self.rows.is_empty() {
            return false;
        }
        self.rows.remove(self.selected);
        if self.selected >= self.rows.len() && !self.rows.is_empty() {
            self.selected = self.rows.len() - 1;
        }
        self.editing = false;
        self.dirty = true;
        true
    }

    // ── Inline editing ───────────────────────────────────────────────

    fn field(&self) -> Option<&String> {
        let row = self.rows.get(self.selected)?;
        Some(match self.editing_field {
            KvField::Key => &row.key,
            KvField::Value => &row.value,
        })
    }

    fn field_mut(&mut self) -> Option<&mut String> {
        let editing_field = self.editing_field;
        let row = self.rows.get_mut(self.selected)?;
        Some(match editing_field {
            KvField::Key => &mut row.key,
            KvField::Value => &mut row.value,
        })
    }

    /// Start editing the selected row's current field, cursor at the end.
    pub fn start_edit(&mut self, permitted: bool) -> bool {
        if !permitted {
            return false;
        }
        let Some(len) = self.field().map(|f| f.len()) else {
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
        if let Some(field) = self.field_mut() {
            field.insert(cursor, c);
            self.cursor += c.len_utf8();
            self.dirty = true;
        }
    }

    pub fn backspace(&mut self) {
        if !self.editing || self.cursor == 0 {
            return;
        }
        let cursor = self.cursor;
        if let Some(field) = self.field_mut() {
            let prev = field[..cursor]
                .chars()
                .last()
                .map(|c| c.len_utf8())
                .unwrap_or(0);
            field.remove(cursor - prev);
            self.cursor -= prev;
            self.dirty = true;
        }
    }

    pub fn cursor_left(&mut self) {
        if let Some(field) = self.field() {
            let prev = field[..self.cursor]
                .chars()
                .last()
                .map(|c| c.len_utf8())
                .unwrap_or(0);
            self.cursor -= prev;
        }
    }

    pub fn cursor_right(&mut self) {
        if let Some(field) = self.field() {
            let next = field[self.cursor..]
                .chars()
                .next()
                .map(|c| c.len_utf8())
                .unwrap_or(0);
            self.cursor += next;
        }
    }

    /// Switch between the key and value field, cursor at the end.
    pub fn toggle_field(&mut self) {
        self.editing_field = match self.editing_field {
            KvField::Key => KvField::Value,
            KvField::Value => KvField::Key,
        };
        self.cursor = self.field().map(|f| f.len()).unwrap_or(0);
    }
}

// ── Rendering ────────────────────────────────────────────────────────

/// How a key-value list is drawn.
#[derive(Debug, Clone, Copy)]
pub struct KvRenderOptions<'a> {
    /// Placeholder shown in empty value cells.
    pub placeholder: &'a str,
    /// Whether the "add row" affordance is shown.
    pub push_fields: bool,
    pub focused: bool,
}

/// Render an editable key-value list into `area`.
pub fn render_key_value_list(
    frame: &mut Frame,
    area: Rect,
    list: &KeyValueList,
    options: KvRenderOptions<'_>,
) {
    if area.height == 0 || area.width == 0 {
        return;
    }

    let (key_width, value_width) = column_widths(area.width);
    let visible_lines = area.height as usize;
    let scroll_offset = if list.selected >= visible_lines {
        list.selected - visible_lines + 1
    } else {
        0
    };

    let lines = build_lines(list, options, key_width, value_width, scroll_offset, visible_lines);
    frame.render_widget(Paragraph::new(lines), area);

    if options.focused && list.editing {
        if let Some(field) = list.field() {
            let before = field[..list.cursor].width() as u16;
            let x = match list.editing_field {
                KvField::Key => area.x + before,
                KvField::Value => area.x + key_width + SEPARATOR.len() as u16 + before,
            };
            let y = area.y + (list.selected - scroll_offset) as u16;
            if x < area.x + area.width {
                frame.set_cursor_position((x, y));
            }
        }
    }
}

const SEPARATOR: &str = " = ";

fn column_widths(total: u16) -> (u16, u16) {
    let available = total.saturating_sub(SEPARATOR.len() as u16);
    let key_width = available / 3;
    (key_width, available.saturating_sub(key_width))
}

fn build_lines(
    list: &KeyValueList,
    options: KvRenderOptions<'_>,
    key_width: u16,
    value_width: u16,
    scroll_offset: usize,
    visible_lines: usize,
) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = Vec::new();

    if list.rows.is_empty() && !options.push_fields {
        lines.push(Line::from(Span::styled(
            "  No entries.",
            Style::default().fg(Color::DarkGray),
        )));
        return lines;
    }

    for (i, row) in list
        .rows
        .iter()
        .enumerate()
        .skip(scroll_offset)
        .take(visible_lines)
    {
        let is_selected = options.focused && i == list.selected;
        let is_editing = is_selected && list.editing;

        let cell_style = |field: KvField, empty: bool, base: Color| {
            if is_editing && list.editing_field == field {
                Style::default().fg(Color::Yellow).bg(Color::DarkGray)
            } else if is_selected {
                Style::default().fg(Color::Black).bg(SELECTED_BG)
            } else if empty {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default().fg(base)
            }
        };

        let key_text = if row.key.is_empty() { "Key" } else { row.key.as_str() };
        let value_text = if row.value.is_empty() {
            options.placeholder
        } else {
            row.value.as_str()
        };

        let sep_style = if is_selected {
            Style::default().fg(Color::Black).bg(SELECTED_BG)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        lines.push(Line::from(vec![
            Span::styled(
                truncate_or_pad(key_text, key_width as usize),
                cell_style(KvField::Key, row.key.is_empty(), Color::Cyan),
            ),
            Span::styled(SEPARATOR, sep_style),
            Span::styled(
                truncate_or_pad(value_text, value_width as usize),
                cell_style(KvField::Value, row.value.is_empty(), Color::White),
            ),
        ]));
    }

    if options.push_fields && lines.len() < visible_lines {
        lines.push(Line::from(vec![
            Span::styled(ADD_ROW_LABEL, Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD)),
            Span::styled("  (a)", Style::default().fg(Color::DarkGray)),
        ]));
    }

    lines
}

/// Fit `s` into exactly `width` display columns.
pub(crate) fn truncate_or_pad(s: &str, width: usize) -> String {
    let mut result = String::new();
    let mut current_width = 0;
    for c in s.chars() {
        let cw = c.width().unwrap_or(0);
        if current_width + cw > width {
            break;
        }
        result.push(c);
        current_width += cw;
    }
    result.push_str(&" ".repeat(width - current_width));
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_with(rows: &[(&str, &str)]) -> KeyValueList {
        let mut list = KeyValueList::new("actionConfiguration.headers");
        list.set_rows(rows.iter().map(|(k, v)| KeyValue::new(*k, *v)).collect());
        list
    }

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn options(push_fields: bool) -> KvRenderOptions<'static> {
        KvRenderOptions {
            placeholder: "Value",
            push_fields,
            focused: true,
        }
    }

    #[test]
    fn test_push_requires_permission() {
        let mut list = list_with(&[]);
        assert!(!list.push_row(false));
        assert!(list.rows.is_empty());
        assert!(!list.dirty);

        assert!(list.push_row(true));
        assert!(list.push_row(true));
        assert_eq!(list.rows.len(), 2);
        assert_eq!(list.selected, 1);
        assert!(list.dirty);
    }

    #[test]
    fn test_delete_requires_permission() {
        let mut list = list_with(&[("A", "1"), ("B", "2")]);
        list.move_down(1);
        assert!(!list.delete_row(false));
        assert_eq!(list.rows.len(), 2);

        assert!(list.delete_row(true));
        assert_eq!(list.rows, vec![KeyValue::new("A", "1")]);
        assert_eq!(list.selected, 0);
    }

    #[test]
    fn test_insert_below_selection() {
        let mut list = list_with(&[("A", "1"), ("C", "3")]);
        assert!(list.insert_below(true));
        assert_eq!(list.selected, 1);
        assert_eq!(list.rows[1], KeyValue::default());
        assert_eq!(list.rows[2].key, "C");
    }

    #[test]
    fn test_navigation_clamps() {
        let mut list = list_with(&[("A", "1"), ("B", "2"), ("C", "3")]);
        list.move_down(10);
        assert_eq!(list.selected, 2);
        list.move_up(1);
        assert_eq!(list.selected, 1);
        list.goto_top();
        assert_eq!(list.selected, 0);
        list.goto_bottom();
        assert_eq!(list.selected, 2);
    }

    #[test]
    fn test_edit_key_and_value() {
        let mut list = list_with(&[]);
        list.push_row(true);
        assert!(list.start_edit(true));
        for c in "Accept".chars() {
            list.insert_char(c);
        }
        list.toggle_field();
        for c in "*/*x".chars() {
            list.insert_char(c);
        }
        list.backspace();
        list.stop_edit();

        assert_eq!(list.rows[0], KeyValue::new("Accept", "*/*"));
        assert!(!list.editing);
    }

    #[test]
    fn test_edit_refused_without_permission() {
        let mut list = list_with(&[("A", "1")]);
        assert!(!list.start_edit(false));
        list.insert_char('x');
        assert_eq!(list.rows[0].key, "A");
    }

    #[test]
    fn test_cursor_moves_over_multibyte() {
        let mut list = list_with(&[("é", "")]);
        list.start_edit(true);
        assert_eq!(list.cursor, 2);
        list.cursor_left();
        assert_eq!(list.cursor, 0);
        list.cursor_right();
        assert_eq!(list.cursor, 2);
        list.backspace();
        assert_eq!(list.rows[0].key, "");
    }

    #[test]
    fn test_add_row_line_only_when_pushable() {
        let list = list_with(&[("A", "")]);
        let with_push = build_lines(&list, options(true), 10, 20, 0, 10);
        assert_eq!(with_push.len(), 2);
        assert!(text(&with_push[1]).starts_with(ADD_ROW_LABEL));

        let without_push = build_lines(&list, options(false), 10, 20, 0, 10);
        assert_eq!(without_push.len(), 1);
        assert!(!without_push.iter().any(|l| text(l).contains(ADD_ROW_LABEL)));
    }

    #[test]
    fn test_placeholder_for_empty_value() {
        let list = list_with(&[("A", "")]);
        let lines = build_lines(&list, options(false), 5, 10, 0, 10);
        assert_eq!(text(&lines[0]), "A     = Value     ");
    }

    #[test]
    fn test_truncate_or_pad() {
        assert_eq!(truncate_or_pad("abc", 5), "abc  ");
        assert_eq!(truncate_or_pad("abcdef", 3), "abc");
        // Wide chars never split past the width
        assert_eq!(truncate_or_pad("日本語", 5), "日本 ");
    }
}
