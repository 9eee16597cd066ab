use std::collections::HashMap;

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::model::Datasource;

/// Resolves the datasource behind a form.
pub trait AuthLookup {
    fn datasource(&self, form_name: &str) -> Option<&Datasource>;
}

/// Datasources keyed by the name of the form (action) that uses them.
#[derive(Debug, Clone, Default)]
pub struct FormDatasources {
    by_form: HashMap<String, Datasource>,
}

impl FormDatasources {
    pub fn insert(&mut self, form_name: impl Into<String>, datasource: Datasource) {
        self.by_form.insert(form_name.into(), datasource);
    }

    pub fn clear(&mut self) {
        self.by_form.clear();
    }
}

impl AuthLookup for FormDatasources {
    fn datasource(&self, form_name: &str) -> Option<&Datasource> {
        self.by_form.get(form_name)
    }
}

/// The Authentication tab. Authentication lives on the datasource, so the
/// panel only needs the form name to find it.
pub fn render_authentication(
    frame: &mut Frame,
    area: Rect,
    form_name: &str,
    lookup: &dyn AuthLookup,
) {
    if area.height == 0 {
        return;
    }
    frame.render_widget(Paragraph::new(auth_lines(form_name, lookup)), area);
}

fn auth_lines(form_name: &str, lookup: &dyn AuthLookup) -> Vec<Line<'static>> {
    let muted = Style::default().fg(Color::DarkGray);

    let Some(ds) = lookup.datasource(form_name) else {
        return vec![
            Line::from(Span::styled(
                "This action does not use a saved datasource.",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Save the URL as a datasource to share authentication across actions.",
                muted,
            )),
        ];
    };

    vec![
        Line::from(vec![
            Span::styled("Datasource  ", muted),
            Span::styled(ds.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(format!("  {}", ds.url), muted),
        ]),
        Line::from(vec![
            Span::styled("Auth type   ", muted),
            Span::styled(ds.auth.label(), Style::default().fg(Color::Cyan)),
        ]),
        Line::from(Span::styled(format!("            {}", ds.auth.describe()), muted)),
        Line::from(""),
        Line::from(Span::styled(
            "Authentication is configured on the datasource and applies to all of its actions.",
            muted,
        )),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AuthConfig;

    fn text(lines: &[Line]) -> String {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_without_datasource() {
        let lookup = FormDatasources::default();
        let out = text(&auth_lines("getUsers", &lookup));
        assert!(out.contains("does not use a saved datasource"));
    }

    #[test]
    fn test_with_datasource() {
        let mut lookup = FormDatasources::default();
        lookup.insert(
            "getUsers",
            Datasource {
                name: "Users API".to_string(),
                auth: AuthConfig::Basic {
                    username: "admin".to_string(),
                },
                ..Default::default()
            },
        );
        let out = text(&auth_lines("getUsers", &lookup));
        assert!(out.contains("Users API"));
        assert!(out.contains("Basic"));
        assert!(out.contains("Username: admin"));

        // Other forms are unaffected
        assert!(text(&auth_lines("other", &lookup)).contains("does not use"));
    }
}
