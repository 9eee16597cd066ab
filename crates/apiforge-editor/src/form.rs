//! The tabbed action editor form.
//!
//! The form is stateless: every render derives the tab strip, the badge counts
//! and the active panel from its props. The current tab is owned by the caller
//! (see [`TabSelection`]) and passed in; selecting a tab writes back to it.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::auth::{AuthLookup, render_authentication};
use crate::counts::{get_headers_count, get_params_count};
use crate::datasource_view::DatasourceConfigView;
use crate::form_values::{FormValues, data_tree_path};
use crate::info::{InfoFields, hint_lines, render_hint_messages};
use crate::kv_editor::{KeyValueList, KvRenderOptions, render_key_value_list};
use crate::model::Action;
use crate::tabs::{EditorTab, TabBadges, TabSelection, VISIBLE_TABS};

/// A caller-supplied panel rendered verbatim inside a tab.
pub trait SectionView {
    fn render(&self, frame: &mut Frame, area: Rect, focused: bool);
}

/// Inputs of the form.
#[derive(Clone, Copy)]
pub struct ActionEditorProps<'a> {
    pub http_method_options: &'a [String],
    pub action: &'a Action,
    /// Key into the form store; also used to look up the datasource.
    pub form_name: &'a str,
    pub is_change_permitted: bool,
    pub body_ui: &'a dyn SectionView,
    pub pagination_ui: &'a dyn SectionView,
    pub data_test_id: Option<&'a str>,
}

/// State the form reads but does not own.
#[derive(Clone, Copy)]
pub struct FormContext<'a> {
    pub current_tab: EditorTab,
    /// Editable field arrays bound to `actionConfiguration.headers` /
    /// `actionConfiguration.queryParameters`.
    pub headers_field: &'a KeyValueList,
    pub params_field: &'a KeyValueList,
    pub datasources: &'a dyn AuthLookup,
}

/// One tab in the strip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabStripEntry {
    pub tab: EditorTab,
    pub title: &'static str,
    pub test_id: String,
    pub badge: Option<usize>,
    pub active: bool,
}

impl TabStripEntry {
    pub fn label(&self) -> String {
        match self.badge {
            Some(n) if n > 0 => format!("{} ({n})", self.title),
            _ => self.title.to_string(),
        }
    }
}

/// Everything the form decides for one render, independent of drawing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormLayout {
    pub test_id: Option<String>,
    pub hint_messages: Vec<String>,
    pub strip: Vec<TabStripEntry>,
    /// The single visible panel. `None` when the current tab is not one of
    /// the strip's tabs (Settings forced from elsewhere).
    pub active_panel: Option<EditorTab>,
    pub can_push_rows: bool,
    pub headers_path: String,
    pub params_path: String,
}

pub struct ActionEditorForm<'a> {
    props: ActionEditorProps<'a>,
    ctx: FormContext<'a>,
    values: FormValues,
}

impl<'a> ActionEditorForm<'a> {
    pub fn new(props: ActionEditorProps<'a>, ctx: FormContext<'a>) -> Self {
        let datasource = ctx.datasources.datasource(props.form_name);
        let values = FormValues::derive(props.action, datasource);
        Self { props, ctx, values }
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn badges(&self) -> TabBadges {
        let v = &self.values;
        TabBadges {
            headers: get_headers_count(
                &v.action_headers,
                &v.datasource_headers,
                &v.auto_generated_headers,
            ),
            params: get_params_count(&v.action_params, &v.datasource_headers),
        }
    }

    pub fn layout(&self) -> FormLayout {
        let badges = self.badges();
        let current = self.ctx.current_tab;

        let strip = VISIBLE_TABS
            .iter()
            .map(|&tab| TabStripEntry {
                tab,
                title: tab.title(),
                test_id: tab.test_id(),
                badge: badges.badge_for(tab),
                active: tab == current,
            })
            .collect();

        let name = &self.props.action.name;
        FormLayout {
            test_id: self.props.data_test_id.map(str::to_string),
            hint_messages: self.props.action.messages.clone(),
            strip,
            active_panel: current.is_visible().then_some(current),
            can_push_rows: self.props.is_change_permitted,
            headers_path: data_tree_path(name, "headers"),
            params_path: data_tree_path(name, "queryParameters"),
        }
    }

    /// Make `tab` the current tab of this form in the caller's store.
    pub fn select_tab(selection: &mut TabSelection, form_name: &str, tab: EditorTab) -> EditorTab {
        selection.select(form_name, tab);
        tracing::debug!(form = form_name, tab = tab.id(), "tab selected");
        selection.current(form_name)
    }

    // ── Rendering ────────────────────────────────────────────────────

    pub fn render(&self, frame: &mut Frame, area: Rect, focused: bool) {
        if area.height == 0 || area.width == 0 {
            return;
        }
        let layout = self.layout();
        let action = self.props.action;

        // Header: info fields, hints, tab strip
        let hints_height = hint_lines(&layout.hint_messages).len() as u16;
        let header_height = (2 + hints_height).min(area.height);

        let info = InfoFields {
            action_name: &action.name,
            plugin_id: &action.plugin_id,
            method: action.config.http_method.as_str(),
            path: &action.config.path,
            options: self.props.http_method_options,
            change_permitted: self.props.is_change_permitted,
        };
        info.render(frame, Rect { height: 1, ..area });

        if hints_height > 0 && area.height > 1 {
            let hints_area = Rect {
                y: area.y + 1,
                height: hints_height.min(area.height - 1),
                ..area
            };
            render_hint_messages(frame, hints_area, &layout.hint_messages);
        }

        if header_height < 2 + hints_height {
            return;
        }
        let strip_area = Rect {
            y: area.y + 1 + hints_height,
            height: 1,
            ..area
        };
        frame.render_widget(Paragraph::new(strip_line(&layout.strip, focused)), strip_area);

        let panel_area = Rect {
            y: area.y + header_height + 1,
            height: area.height.saturating_sub(header_height + 1),
            ..area
        };
        if panel_area.height == 0 {
            return;
        }

        if let Some(tab) = layout.active_panel {
            self.render_panel(frame, panel_area, tab, focused, &layout);
        }
    }

    fn render_panel(
        &self,
        frame: &mut Frame,
        area: Rect,
        tab: EditorTab,
        focused: bool,
        layout: &FormLayout,
    ) {
        match tab {
            EditorTab::Headers => {
                let ds_view = DatasourceConfigView {
                    attribute_name: "header",
                    data: &self.values.datasource_headers,
                    autogenerated: &self.values.auto_generated_headers,
                };
                self.render_key_values(frame, area, ds_view, self.ctx.headers_field, focused, layout);
            }
            EditorTab::Params => {
                let ds_view = DatasourceConfigView {
                    attribute_name: "param",
                    data: &self.values.datasource_params,
                    autogenerated: &[],
                };
                self.render_key_values(frame, area, ds_view, self.ctx.params_field, focused, layout);
            }
            EditorTab::Body => self.props.body_ui.render(frame, area, focused),
            EditorTab::Pagination => self.props.pagination_ui.render(frame, area, focused),
            EditorTab::Authentication => {
                render_authentication(frame, area, self.props.form_name, self.ctx.datasources)
            }
            EditorTab::Settings => {}
        }
    }

    fn render_key_values(
        &self,
        frame: &mut Frame,
        area: Rect,
        ds_view: DatasourceConfigView<'_>,
        field: &KeyValueList,
        focused: bool,
        layout: &FormLayout,
    ) {
        let ds_height = ds_view.height().min(area.height / 2);
        if ds_height > 0 {
            ds_view.render(frame, Rect { height: ds_height, ..area });
        }
        let list_area = Rect {
            y: area.y + ds_height,
            height: area.height - ds_height,
            ..area
        };
        render_key_value_list(
            frame,
            list_area,
            field,
            KvRenderOptions {
                placeholder: "Value",
                push_fields: layout.can_push_rows,
                focused,
            },
        );
    }
}

/// The tab strip as a single line: `Headers (2) │ Params │ Body …`.
fn strip_line(strip: &[TabStripEntry], focused: bool) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = vec![Span::raw(" ")];
    for (i, entry) in strip.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" │ ", Style::default().fg(Color::DarkGray)));
        }
        let style = if entry.active && focused {
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else if entry.active {
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(entry.label(), style));
    }
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::FormDatasources;
    use crate::body::BodyEditor;
    use crate::model::{BodyFormat, Datasource, HttpMethod, KeyValue};
    use crate::pagination::PaginationEditor;
    use ratatui::{Terminal, backend::TestBackend};

    struct Fixture {
        action: Action,
        headers: KeyValueList,
        params: KeyValueList,
        datasources: FormDatasources,
        body: BodyEditor,
        pagination: PaginationEditor,
        options: Vec<String>,
    }

    impl Fixture {
        fn new() -> Self {
            let mut action = Action {
                id: 1,
                name: "getUsers".to_string(),
                plugin_id: "restapi-plugin".to_string(),
                datasource_id: None,
                messages: Vec::new(),
                config: Default::default(),
            };
            action.config.headers = vec![KeyValue::new("A", "1")];
            let mut headers = KeyValueList::new("actionConfiguration.headers");
            headers.set_rows(action.config.headers.clone());
            Self {
                action,
                headers,
                params: KeyValueList::new("actionConfiguration.queryParameters"),
                datasources: FormDatasources::default(),
                body: BodyEditor::default(),
                pagination: PaginationEditor::default(),
                options: HttpMethod::options(),
            }
        }

        fn form(&self, tab: EditorTab, permitted: bool) -> ActionEditorForm<'_> {
            ActionEditorForm::new(
                ActionEditorProps {
                    http_method_options: &self.options,
                    action: &self.action,
                    form_name: &self.action.name,
                    is_change_permitted: permitted,
                    body_ui: &self.body,
                    pagination_ui: &self.pagination,
                    data_test_id: Some("t--action-form"),
                },
                FormContext {
                    current_tab: tab,
                    headers_field: &self.headers,
                    params_field: &self.params,
                    datasources: &self.datasources,
                },
            )
        }
    }

    fn draw(form: &ActionEditorForm<'_>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal
            .draw(|frame| form.render(frame, frame.area(), true))
            .unwrap();
        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer.cell((x, y)).map(|c| c.symbol()).unwrap_or(" "));
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn test_strip_never_contains_settings() {
        let fx = Fixture::new();
        for tab in EditorTab::ALL {
            let layout = fx.form(tab, true).layout();
            assert_eq!(layout.strip.len(), 5);
            assert!(layout.strip.iter().all(|e| e.tab != EditorTab::Settings));
        }
        assert!(!draw(&fx.form(EditorTab::Headers, true)).contains("Settings"));
    }

    #[test]
    fn test_exactly_one_active_panel() {
        let fx = Fixture::new();
        for tab in VISIBLE_TABS {
            let layout = fx.form(tab, true).layout();
            assert_eq!(layout.active_panel, Some(tab));
            let active: Vec<_> = layout.strip.iter().filter(|e| e.active).collect();
            assert_eq!(active.len(), 1);
            assert_eq!(active[0].tab, tab);
        }
    }

    #[test]
    fn test_forced_settings_shows_no_panel() {
        let fx = Fixture::new();
        let layout = fx.form(EditorTab::Settings, true).layout();
        assert_eq!(layout.active_panel, None);
        assert!(layout.strip.iter().all(|e| !e.active));
    }

    #[test]
    fn test_select_tab_updates_store() {
        let fx = Fixture::new();
        let mut selection = TabSelection::default();
        let tab = ActionEditorForm::select_tab(&mut selection, "getUsers", EditorTab::Pagination);
        assert_eq!(tab, EditorTab::Pagination);
        assert_eq!(selection.current("getUsers"), EditorTab::Pagination);

        let layout = fx.form(selection.current("getUsers"), true).layout();
        assert_eq!(layout.active_panel, Some(EditorTab::Pagination));
    }

    #[test]
    fn test_badges_from_all_sources() {
        let mut fx = Fixture::new();
        fx.action.config.body_format = BodyFormat::Json;
        fx.action.config.headers.push(KeyValue::new("", "x"));
        fx.action.config.query_parameters = vec![KeyValue::new("page", "1")];
        fx.datasources.insert(
            "getUsers",
            Datasource {
                headers: vec![KeyValue::new("X-Tenant", "acme")],
                query_parameters: vec![KeyValue::new("version", "2"), KeyValue::new(" ", "")],
                ..Default::default()
            },
        );

        let form = fx.form(EditorTab::Headers, true);
        // A + X-Tenant + auto content-type; the blank row is skipped
        // Params: page + X-Tenant; datasource query parameters are not counted
        assert_eq!(form.badges(), TabBadges { headers: 3, params: 2 });

        let layout = form.layout();
        assert_eq!(layout.strip[0].label(), "Headers (3)");
        assert_eq!(layout.strip[1].label(), "Params (2)");
        assert_eq!(layout.strip[2].badge, None);
    }

    #[test]
    fn test_params_badge_counts_datasource_headers() {
        let mut fx = Fixture::new();
        fx.action.config.headers.clear();
        fx.datasources.insert(
            "getUsers",
            Datasource {
                headers: vec![KeyValue::new("H1", "a"), KeyValue::new("H2", "b")],
                ..Default::default()
            },
        );

        let form = fx.form(EditorTab::Headers, true);
        assert_eq!(form.badges(), TabBadges { headers: 2, params: 2 });
        let out = draw(&form);
        assert!(out.contains("Headers (2)"));
        assert!(out.contains("Params (2)"));
    }

    #[test]
    fn test_zero_badge_renders_plain_title() {
        let mut fx = Fixture::new();
        fx.action.config.headers.clear();
        let layout = fx.form(EditorTab::Body, true).layout();
        assert_eq!(layout.strip[0].badge, Some(0));
        assert_eq!(layout.strip[0].label(), "Headers");
    }

    #[test]
    fn test_no_add_control_without_permission() {
        let fx = Fixture::new();
        for tab in [EditorTab::Headers, EditorTab::Params] {
            assert!(!fx.form(tab, false).layout().can_push_rows);
            assert!(!draw(&fx.form(tab, false)).contains("+ Add more"));
            assert!(draw(&fx.form(tab, true)).contains("+ Add more"));
        }
    }

    #[test]
    fn test_no_hints_no_hint_entries() {
        let mut fx = Fixture::new();
        assert!(fx.form(EditorTab::Headers, true).layout().hint_messages.is_empty());

        fx.action.messages = vec!["Use {{ }} to bind data".to_string()];
        let out = draw(&fx.form(EditorTab::Headers, true));
        assert!(out.contains("Use {{ }} to bind data"));
    }

    #[test]
    fn test_data_tree_paths() {
        let fx = Fixture::new();
        let layout = fx.form(EditorTab::Headers, true).layout();
        assert_eq!(layout.headers_path, "getUsers.config.headers");
        assert_eq!(layout.params_path, "getUsers.config.queryParameters");
        assert_eq!(layout.test_id.as_deref(), Some("t--action-form"));
    }

    #[test]
    fn test_panels_render_their_content() {
        let mut fx = Fixture::new();
        fx.body.load("{}", BodyFormat::Json);
        assert!(draw(&fx.form(EditorTab::Body, true)).contains("Format: JSON"));
        assert!(draw(&fx.form(EditorTab::Pagination, true)).contains("Type: None"));
        assert!(
            draw(&fx.form(EditorTab::Authentication, true))
                .contains("does not use a saved datasource")
        );
    }
}
