use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::model::HttpMethod;

fn method_color(method: &str) -> Color {
    match HttpMethod::from_str(method) {
        Some(HttpMethod::Get) => Color::Green,
        Some(HttpMethod::Post) => Color::Yellow,
        Some(HttpMethod::Put) => Color::Blue,
        Some(HttpMethod::Patch) => Color::Rgb(255, 165, 0), // orange
        Some(HttpMethod::Delete) => Color::Red,
        Some(HttpMethod::Head) => Color::Cyan,
        Some(HttpMethod::Options) | None => Color::Magenta,
    }
}

/// The line above the tab strip: method selector, action name, path, plugin.
#[derive(Debug, Clone, Copy)]
pub struct InfoFields<'a> {
    pub action_name: &'a str,
    pub plugin_id: &'a str,
    pub method: &'a str,
    pub path: &'a str,
    pub options: &'a [String],
    pub change_permitted: bool,
}

impl InfoFields<'_> {
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        frame.render_widget(Paragraph::new(self.line()), area);
    }

    fn line(&self) -> Line<'static> {
        let method_style = Style::default()
            .fg(Color::Black)
            .bg(method_color(self.method))
            .add_modifier(Modifier::BOLD);

        let path = if self.path.is_empty() {
            Span::styled("/path", Style::default().fg(Color::DarkGray))
        } else {
            Span::raw(self.path.to_string())
        };

        let mut spans = vec![
            Span::styled(format!(" {} ", self.method), method_style),
            Span::raw(" "),
            Span::styled(
                self.action_name.to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            path,
            Span::styled(
                format!("  [{}]", self.plugin_id),
                Style::default().fg(Color::DarkGray),
            ),
        ];
        if self.change_permitted && self.options.len() > 1 {
            spans.push(Span::styled(
                "  m: method",
                Style::default().fg(Color::DarkGray),
            ));
        } else if !self.change_permitted {
            spans.push(Span::styled(
                "  read-only",
                Style::default().fg(Color::Red).add_modifier(Modifier::DIM),
            ));
        }
        Line::from(spans)
    }
}

/// The option following `current` in `options`, wrapping. Unknown or empty
/// options leave the method unchanged.
pub fn next_method_option(options: &[String], current: &str) -> Option<String> {
    if options.is_empty() {
        return None;
    }
    let next = match options.iter().position(|o| o.eq_ignore_ascii_case(current)) {
        Some(idx) => (idx + 1) % options.len(),
        None => 0,
    };
    Some(options[next].clone())
}

/// One line per hint message. No messages, no lines.
pub fn hint_lines(messages: &[String]) -> Vec<Line<'static>> {
    messages
        .iter()
        .map(|m| {
            Line::from(vec![
                Span::styled(" i ", Style::default().fg(Color::Black).bg(Color::Cyan)),
                Span::raw(" "),
                Span::styled(m.clone(), Style::default().fg(Color::Cyan)),
            ])
        })
        .collect()
}

pub fn render_hint_messages(frame: &mut Frame, area: Rect, messages: &[String]) {
    let lines = hint_lines(messages);
    if lines.is_empty() || area.height == 0 {
        return;
    }
    frame.render_widget(Paragraph::new(lines), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_messages_no_lines() {
        assert!(hint_lines(&[]).is_empty());
        assert_eq!(hint_lines(&["Use {{ }} bindings".to_string()]).len(), 1);
    }

    #[test]
    fn test_next_method_option_wraps() {
        let options = HttpMethod::options();
        assert_eq!(next_method_option(&options, "GET").as_deref(), Some("POST"));
        assert_eq!(next_method_option(&options, "options").as_deref(), Some("GET"));
        assert_eq!(next_method_option(&options, "BREW").as_deref(), Some("GET"));
        assert_eq!(next_method_option(&[], "GET"), None);
    }

    #[test]
    fn test_read_only_marker() {
        let options = HttpMethod::options();
        let info = InfoFields {
            action_name: "getUsers",
            plugin_id: "restapi-plugin",
            method: "GET",
            path: "/users",
            options: &options,
            change_permitted: false,
        };
        let text: String = info.line().spans.iter().map(|s| s.content.as_ref()).collect();
        assert!(text.contains("getUsers"));
        assert!(text.contains("read-only"));
        assert!(!text.contains("m: method"));
    }
}
