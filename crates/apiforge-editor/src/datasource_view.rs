use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::kv_editor::truncate_or_pad;
use crate::model::KeyValue;

/// Read-only listing of the headers/params inherited from the datasource,
/// followed by auto-generated headers.
#[derive(Debug, Clone, Copy)]
pub struct DatasourceConfigView<'a> {
    /// "header" or "param".
    pub attribute_name: &'a str,
    pub data: &'a [KeyValue],
    pub autogenerated: &'a [KeyValue],
}

impl DatasourceConfigView<'_> {
    /// Lines needed to show everything (0 when there is nothing to show).
    pub fn height(&self) -> u16 {
        self.build_lines(1).len() as u16
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        if area.height == 0 {
            return;
        }
        let lines = self.build_lines(area.width.saturating_sub(3) / 3);
        frame.render_widget(Paragraph::new(lines), area);
    }

    fn build_lines(&self, key_width: u16) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        if self.data.is_empty() && self.autogenerated.is_empty() {
            return lines;
        }

        let muted = Style::default().fg(Color::DarkGray);
        let heading = Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::ITALIC);

        if !self.data.is_empty() {
            lines.push(Line::from(Span::styled(
                format!("Inherited {}s from datasource", self.attribute_name),
                heading,
            )));
            for entry in self.data {
                lines.push(entry_line(entry, key_width, muted, None));
            }
        }

        if !self.autogenerated.is_empty() {
            lines.push(Line::from(Span::styled(
                format!("Auto-generated {}s", self.attribute_name),
                heading,
            )));
            for entry in self.autogenerated {
                lines.push(entry_line(entry, key_width, muted, Some("auto")));
            }
        }

        lines
    }
}

fn entry_line(entry: &KeyValue, key_width: u16, style: Style, tag: Option<&str>) -> Line<'static> {
    let mut spans = vec![
        Span::styled(truncate_or_pad(&entry.key, key_width as usize), style),
        Span::styled(" = ", style),
        Span::styled(entry.value.clone(), style),
    ];
    if let Some(tag) = tag {
        spans.push(Span::styled(format!("  [{tag}]"), style.add_modifier(Modifier::DIM)));
    }
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_sources_render_nothing() {
        let view = DatasourceConfigView {
            attribute_name: "param",
            data: &[],
            autogenerated: &[],
        };
        assert_eq!(view.height(), 0);
    }

    #[test]
    fn test_sections_and_rows() {
        let data = [KeyValue::new("X-Tenant", "acme")];
        let auto = [KeyValue::new("content-type", "application/json")];
        let view = DatasourceConfigView {
            attribute_name: "header",
            data: &data,
            autogenerated: &auto,
        };
        let lines = view.build_lines(12);
        let text: Vec<String> = lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect();
        assert_eq!(text.len(), 4);
        assert_eq!(text[0], "Inherited headers from datasource");
        assert_eq!(text[1], "X-Tenant     = acme");
        assert_eq!(text[2], "Auto-generated headers");
        assert!(text[3].ends_with("[auto]"));
    }
}
