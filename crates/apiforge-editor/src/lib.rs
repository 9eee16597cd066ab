pub mod auth;
pub mod body;
pub mod counts;
pub mod datasource_view;
pub mod form;
pub mod form_values;
pub mod info;
pub mod kv_editor;
pub mod model;
pub mod pagination;
pub mod tabs;

use apiforge_core::config::Config;
use apiforge_core::help_popup::HelpEntry;
use apiforge_core::keybinds::{Action, InputMode, KeyState, process_normal_key};
use apiforge_core::tool::Tool;
use apiforge_core::ui::tool_block;
use apiforge_core::which_key::WhichKeyEntry;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
};
use rusqlite::Connection;
use std::collections::HashSet;

use auth::FormDatasources;
use body::BodyEditor;
use form::{ActionEditorForm, ActionEditorProps, FormContext};
use kv_editor::{KeyValueList, KvField};
use model::HttpMethod;
use pagination::PaginationEditor;
use tabs::{EditorTab, TabSelection, VISIBLE_TABS};

const READ_ONLY_STATUS: &str = "read-only: changes are not permitted";
const UNSAVED_RELOAD_STATUS: &str = "unsaved changes: :wa to save them or :q! to discard";

/// Startup options for the editor tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorOptions {
    pub read_only: bool,
    pub default_tab: EditorTab,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            read_only: false,
            default_tab: EditorTab::Headers,
        }
    }
}

impl EditorOptions {
    /// Options from the user config. Unknown or hidden default tabs fall back
    /// to Headers.
    pub fn from_config(config: &Config) -> Self {
        let default_tab = match config.default_tab.as_deref() {
            Some(id) => match EditorTab::from_id(id).filter(EditorTab::is_visible) {
                Some(tab) => tab,
                None => {
                    tracing::warn!(tab = id, "ignoring unknown default tab");
                    EditorTab::Headers
                }
            },
            None => EditorTab::Headers,
        };
        Self {
            read_only: config.read_only,
            default_tab,
        }
    }
}

/// The action editor: one tabbed form per saved action.
pub struct ActionEditorTool {
    actions: Vec<model::Action>,
    /// Index of the action being edited.
    active: usize,
    tabs: TabSelection,
    datasources: FormDatasources,
    headers: KeyValueList,
    params: KeyValueList,
    body: BodyEditor,
    pagination: PaginationEditor,
    method_options: Vec<String>,
    /// Set when the method changed since the last save.
    method_dirty: bool,
    /// Actions left with unsaved edits when switching away.
    unsaved: HashSet<i64>,
    change_permitted: bool,
    mode: InputMode,
    key_state: KeyState,
    status: Option<String>,
    conn: Connection,
}

impl ActionEditorTool {
    pub fn new(conn: Connection, options: EditorOptions) -> anyhow::Result<Self> {
        model::init_db(&conn)?;
        let mut tabs = TabSelection::new(options.default_tab);
        tabs.load(&conn)?;

        let mut tool = Self {
            actions: Vec::new(),
            active: 0,
            tabs,
            datasources: FormDatasources::default(),
            headers: KeyValueList::new("actionConfiguration.headers"),
            params: KeyValueList::new("actionConfiguration.queryParameters"),
            body: BodyEditor::default(),
            pagination: PaginationEditor::default(),
            method_options: HttpMethod::options(),
            method_dirty: false,
            unsaved: HashSet::new(),
            change_permitted: !options.read_only,
            mode: InputMode::Normal,
            key_state: KeyState::default(),
            status: None,
            conn,
        };
        tool.reload()?;
        Ok(tool)
    }

    /// Reload actions and their datasources from the database. In-memory
    /// edits are replaced by what is on disk.
    fn reload(&mut self) -> anyhow::Result<()> {
        self.actions = model::list_actions(&self.conn)?;
        self.unsaved.clear();
        self.datasources.clear();
        for action in &self.actions {
            if let Some(id) = action.datasource_id {
                if let Some(ds) = model::load_datasource(&self.conn, id)? {
                    self.datasources.insert(action.name.clone(), ds);
                }
            }
        }
        if self.active >= self.actions.len() {
            self.active = self.actions.len().saturating_sub(1);
        }
        self.load_active();
        tracing::debug!(count = self.actions.len(), "actions loaded");
        Ok(())
    }

    /// Populate the editors from the active action.
    fn load_active(&mut self) {
        let Some(action) = self.actions.get(self.active) else {
            self.headers.set_rows(Vec::new());
            self.params.set_rows(Vec::new());
            self.body = BodyEditor::default();
            self.pagination = PaginationEditor::default();
            return;
        };
        let config = &action.config;
        self.headers.set_rows(config.headers.clone());
        self.params.set_rows(config.query_parameters.clone());
        self.body.load(&config.body, config.body_format);
        self.pagination.load(&config.pagination);
        self.method_dirty = false;
    }

    /// Copy editor state back into the active action so the form renders
    /// (and counts) what the user sees.
    fn sync_active(&mut self) {
        let Some(action) = self.actions.get_mut(self.active) else {
            return;
        };
        let config = &mut action.config;
        config.headers = self.headers.rows.clone();
        config.query_parameters = self.params.rows.clone();
        config.body = self.body.text();
        config.body_format = self.body.format;
        config.pagination = self.pagination.pagination.clone();
    }

    fn active_name(&self) -> Option<&str> {
        self.actions.get(self.active).map(|a| a.name.as_str())
    }

    pub fn current_tab(&self) -> EditorTab {
        match self.active_name() {
            Some(name) => self.tabs.current(name),
            None => EditorTab::Headers,
        }
    }

    pub fn is_dirty(&self) -> bool {
        let kept = self
            .actions
            .get(self.active)
            .is_some_and(|a| self.unsaved.contains(&a.id));
        kept || self.method_dirty
            || self.headers.dirty
            || self.params.dirty
            || self.body.dirty
            || self.pagination.dirty
    }

    fn select_tab(&mut self, tab: EditorTab) {
        let Some(name) = self.active_name().map(str::to_string) else {
            return;
        };
        ActionEditorForm::select_tab(&mut self.tabs, &name, tab);
        if let Err(e) = self.tabs.save(&self.conn, &name) {
            tracing::warn!(form = %name, error = %e, "failed to persist tab selection");
            self.status = Some(format!("Could not save tab: {e}"));
        }
    }

    /// Move to another action. Unsaved changes are kept in memory.
    fn switch_action(&mut self, forward: bool) {
        if self.actions.len() < 2 {
            return;
        }
        self.sync_active();
        if self.is_dirty() {
            self.unsaved.insert(self.actions[self.active].id);
        }
        let len = self.actions.len();
        self.active = if forward {
            (self.active + 1) % len
        } else {
            (self.active + len - 1) % len
        };
        self.load_active();
        self.status = None;
    }

    fn active_list_mut(&mut self) -> Option<&mut KeyValueList> {
        match self.current_tab() {
            EditorTab::Headers => Some(&mut self.headers),
            EditorTab::Params => Some(&mut self.params),
            _ => None,
        }
    }

    /// Run a change-gated operation; note the refusal in the status line.
    fn gated(&mut self, op: impl FnOnce(&mut Self, bool) -> bool) -> bool {
        let permitted = self.change_permitted;
        let done = op(self, permitted);
        if !permitted {
            self.status = Some(READ_ONLY_STATUS.to_string());
        } else if done {
            self.sync_active();
        }
        done
    }

    fn enter_insert(&mut self, started: bool) {
        if started {
            self.mode = InputMode::Insert;
        }
    }

    fn cycle_method(&mut self) {
        if !self.change_permitted {
            self.status = Some(READ_ONLY_STATUS.to_string());
            return;
        }
        let Some(action) = self.actions.get_mut(self.active) else {
            return;
        };
        let current = action.config.http_method.as_str();
        if let Some(next) = info::next_method_option(&self.method_options, current)
            .and_then(|m| HttpMethod::from_str(&m))
        {
            action.config.http_method = next;
            self.method_dirty = true;
        }
    }

    /// Delete the active action and its stored tab selection.
    fn delete_active(&mut self) {
        if !self.change_permitted {
            self.status = Some(READ_ONLY_STATUS.to_string());
            return;
        }
        let Some((id, name)) = self.actions.get(self.active).map(|a| (a.id, a.name.clone())) else {
            return;
        };
        if let Err(e) = model::delete_action(&self.conn, id) {
            tracing::warn!(action = %name, error = %e, "delete failed");
            self.status = Some(format!("Delete failed: {e:#}"));
            return;
        }
        tracing::info!(action = %name, "action deleted");
        self.tabs.forget(&name);
        self.unsaved.remove(&id);
        self.actions.remove(self.active);
        if self.active >= self.actions.len() {
            self.active = self.actions.len().saturating_sub(1);
        }
        self.load_active();
        self.status = Some(format!("Deleted {name}"));
    }

    fn save_with_status(&mut self) {
        match Tool::save(self) {
            Ok(()) => {}
            Err(e) => {
                tracing::warn!(error = %e, "save failed");
                self.status = Some(format!("Save failed: {e:#}"));
            }
        }
    }

    // ── Normal mode ──────────────────────────────────────────────────

    /// Keys that only mean something on one tab, checked before the shared
    /// keymap. Returns true when the key was consumed.
    fn handle_tab_key(&mut self, key: KeyEvent) -> bool {
        if self.key_state.leader_active || self.key_state.pending_key.is_some() {
            return false;
        }
        if key.modifiers != KeyModifiers::NONE && key.modifiers != KeyModifiers::SHIFT {
            return false;
        }
        match (self.current_tab(), key.code) {
            (_, KeyCode::Char('}')) => self.switch_action(true),
            (_, KeyCode::Char('{')) => self.switch_action(false),
            (EditorTab::Body, KeyCode::Char('f')) => {
                self.gated(|t, ok| t.body.cycle_format(ok));
            }
            (EditorTab::Pagination, KeyCode::Char('p')) => {
                self.gated(|t, ok| t.pagination.cycle_type(ok));
            }
            _ => return false,
        }
        true
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> Action {
        if self.handle_tab_key(key) {
            return Action::None;
        }

        let action = process_normal_key(key, &mut self.key_state);
        let tab = self.current_tab();
        match action {
            Action::NextTab => self.select_tab(tab.next()),
            Action::PrevTab => self.select_tab(tab.prev()),
            Action::JumpTab(n) => {
                if let Some(&target) = VISIBLE_TABS.get(n) {
                    self.select_tab(target);
                }
            }
            Action::MoveDown(n) => match tab {
                EditorTab::Body => (0..n).for_each(|_| self.body.cursor_down()),
                EditorTab::Pagination => self.pagination.toggle_field(),
                _ => {
                    if let Some(list) = self.active_list_mut() {
                        list.move_down(n);
                    }
                }
            },
            Action::MoveUp(n) => match tab {
                EditorTab::Body => (0..n).for_each(|_| self.body.cursor_up()),
                EditorTab::Pagination => self.pagination.toggle_field(),
                _ => {
                    if let Some(list) = self.active_list_mut() {
                        list.move_up(n);
                    }
                }
            },
            Action::GotoTop => match tab {
                EditorTab::Body => self.body.goto_top(),
                _ => {
                    if let Some(list) = self.active_list_mut() {
                        list.goto_top();
                    }
                }
            },
            Action::GotoBottom => match tab {
                EditorTab::Body => self.body.goto_bottom(),
                _ => {
                    if let Some(list) = self.active_list_mut() {
                        list.goto_bottom();
                    }
                }
            },
            Action::Add | Action::AddBelow if matches!(tab, EditorTab::Headers | EditorTab::Params) => {
                let below = action == Action::AddBelow;
                let added = self.gated(|t, ok| match t.active_list_mut() {
                    Some(list) if below => list.insert_below(ok),
                    Some(list) => list.push_row(ok),
                    None => false,
                });
                if added {
                    let started = self.active_list_mut().is_some_and(|l| l.start_edit(true));
                    self.enter_insert(started);
                }
            }
            Action::Delete => {
                self.gated(|t, ok| t.active_list_mut().is_some_and(|l| l.delete_row(ok)));
            }
            Action::Edit | Action::Confirm => {
                let started = match tab {
                    EditorTab::Headers | EditorTab::Params => {
                        self.gated(|t, ok| t.active_list_mut().is_some_and(|l| l.start_edit(ok)))
                    }
                    EditorTab::Body => self.gated(|t, ok| t.body.start_edit(ok)),
                    EditorTab::Pagination => self.gated(|t, ok| t.pagination.start_edit(ok)),
                    EditorTab::Authentication | EditorTab::Settings => false,
                };
                self.enter_insert(started);
            }
            Action::Cycle => self.cycle_method(),
            Action::Save => self.save_with_status(),
            // These bubble up to the hub
            Action::Quit
            | Action::LeaderKey
            | Action::LeaderSequence(_)
            | Action::SetMode(InputMode::Command)
            | Action::Help => return action,
            _ => {}
        }
        Action::None
    }

    // ── Insert mode ──────────────────────────────────────────────────

    fn handle_insert_key(&mut self, key: KeyEvent) -> Action {
        if key.code == KeyCode::Esc {
            self.stop_editing();
            return Action::SetMode(InputMode::Normal);
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            if key.code == KeyCode::Char('s') {
                self.stop_editing();
                self.save_with_status();
            }
            return Action::None;
        }

        match self.current_tab() {
            EditorTab::Headers | EditorTab::Params => {
                let Some(list) = self.active_list_mut() else {
                    return Action::None;
                };
                match key.code {
                    KeyCode::Tab | KeyCode::BackTab => list.toggle_field(),
                    KeyCode::Enter => {
                        if list.editing_field == KvField::Key {
                            list.toggle_field();
                        } else {
                            self.stop_editing();
                            return Action::SetMode(InputMode::Normal);
                        }
                    }
                    KeyCode::Char(c) => list.insert_char(c),
                    KeyCode::Backspace => list.backspace(),
                    KeyCode::Left => list.cursor_left(),
                    KeyCode::Right => list.cursor_right(),
                    _ => {}
                }
            }
            EditorTab::Body => match key.code {
                KeyCode::Enter => self.body.insert_newline(),
                KeyCode::Tab => self.body.insert_text("  "),
                KeyCode::Char(c) => self.body.insert_char(c),
                KeyCode::Backspace => self.body.backspace(),
                KeyCode::Delete => self.body.delete(),
                KeyCode::Left => self.body.cursor_left(),
                KeyCode::Right => self.body.cursor_right(),
                KeyCode::Up => self.body.cursor_up(),
                KeyCode::Down => self.body.cursor_down(),
                _ => {}
            },
            EditorTab::Pagination => match key.code {
                KeyCode::Tab | KeyCode::BackTab => self.pagination.toggle_field(),
                KeyCode::Enter => {
                    self.stop_editing();
                    return Action::SetMode(InputMode::Normal);
                }
                KeyCode::Char(c) => self.pagination.insert_char(c),
                KeyCode::Backspace => self.pagination.backspace(),
                _ => {}
            },
            EditorTab::Authentication | EditorTab::Settings => {
                self.stop_editing();
                return Action::SetMode(InputMode::Normal);
            }
        }
        self.sync_active();
        Action::None
    }

    fn stop_editing(&mut self) {
        self.headers.stop_edit();
        self.params.stop_edit();
        self.body.stop_edit();
        self.pagination.stop_edit();
        self.mode = InputMode::Normal;
        self.sync_active();
    }
}

impl Tool for ActionEditorTool {
    fn name(&self) -> &str {
        "Actions"
    }

    fn description(&self) -> &str {
        "Tabbed API action editor"
    }

    fn mode(&self) -> InputMode {
        self.mode
    }

    fn init_db(&self, conn: &Connection) -> anyhow::Result<()> {
        model::init_db(conn)
    }

    fn which_key_entries(&self) -> Vec<WhichKeyEntry> {
        vec![
            WhichKeyEntry::action("n", "Next action"),
            WhichKeyEntry::action("p", "Previous action"),
            WhichKeyEntry::action("r", "Reload from disk"),
            WhichKeyEntry::action("d", "Delete action"),
        ]
    }

    fn help_entries(&self) -> Vec<HelpEntry> {
        vec![
            HelpEntry::with_section("Action editor", "Tab / ]", "Next tab"),
            HelpEntry::with_section("Action editor", "S-Tab / [", "Previous tab"),
            HelpEntry::with_section("Action editor", "1-5", "Jump to tab"),
            HelpEntry::with_section("Action editor", "{ / }", "Previous / next action"),
            HelpEntry::with_section("Action editor", "m", "Cycle HTTP method"),
            HelpEntry::with_section("Action editor", "<Space>d", "Delete action"),
            HelpEntry::with_section("Action editor", "Ctrl-s", "Save action"),
            HelpEntry::with_section("Headers & Params", "a / o", "Append / insert row"),
            HelpEntry::with_section("Headers & Params", "dd", "Delete row"),
            HelpEntry::with_section("Headers & Params", "e / i", "Edit row"),
            HelpEntry::with_section("Headers & Params", "Tab (insert)", "Switch key / value"),
            HelpEntry::with_section("Body", "f", "Cycle body format"),
            HelpEntry::with_section("Pagination", "p", "Cycle pagination type"),
            HelpEntry::with_section("Pagination", "j / k", "Switch URL field"),
        ]
    }

    fn handle_key(&mut self, key: KeyEvent) -> Action {
        match self.mode {
            InputMode::Normal => self.handle_normal_key(key),
            InputMode::Insert => self.handle_insert_key(key),
            // Command mode is handled by the hub
            InputMode::Command => Action::None,
        }
    }

    fn handle_leader_action(&mut self, key: char) -> Option<Action> {
        match key {
            'n' => self.switch_action(true),
            'p' => self.switch_action(false),
            'd' => self.delete_active(),
            'r' if self.has_unsaved() => {
                self.status = Some(UNSAVED_RELOAD_STATUS.to_string());
            }
            'r' => {
                if let Err(e) = self.reload() {
                    tracing::warn!(error = %e, "reload failed");
                    self.status = Some(format!("Reload failed: {e:#}"));
                }
            }
            _ => return None,
        }
        Some(Action::None)
    }

    fn paste(&mut self, text: &str) {
        if self.mode != InputMode::Insert {
            return;
        }
        match self.current_tab() {
            EditorTab::Body => self.body.insert_text(text),
            EditorTab::Pagination => text
                .chars()
                .filter(|c| !c.is_control())
                .for_each(|c| self.pagination.insert_char(c)),
            _ => {
                if let Some(list) = self.active_list_mut() {
                    text.chars()
                        .filter(|c| !c.is_control())
                        .for_each(|c| list.insert_char(c));
                }
            }
        }
        self.sync_active();
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let Some(action) = self.actions.get(self.active) else {
            let block = tool_block("Actions", true);
            let inner = block.inner(area);
            frame.render_widget(block, area);
            let hint = Line::from(Span::styled(
                "No actions yet. Enable seed_demo in config.json to create a few.",
                Style::default().fg(Color::DarkGray),
            ));
            frame.render_widget(Paragraph::new(hint), inner);
            return;
        };

        let title = format!(
            "{} ({}/{}){}",
            action.name,
            self.active + 1,
            self.actions.len(),
            if self.is_dirty() { " [+]" } else { "" }
        );
        let block = tool_block(&title, true);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let form = ActionEditorForm::new(
            ActionEditorProps {
                http_method_options: &self.method_options,
                action,
                form_name: &action.name,
                is_change_permitted: self.change_permitted,
                body_ui: &self.body,
                pagination_ui: &self.pagination,
                data_test_id: Some("t--action-form-REST_API"),
            },
            FormContext {
                current_tab: self.tabs.current(&action.name),
                headers_field: &self.headers,
                params_field: &self.params,
                datasources: &self.datasources,
            },
        );
        form.render(frame, inner, true);
    }

    fn save(&mut self) -> anyhow::Result<()> {
        self.sync_active();
        let Some(action) = self.actions.get(self.active) else {
            return Ok(());
        };
        if !self.is_dirty() {
            return Ok(());
        }
        if !self.change_permitted {
            anyhow::bail!("action '{}' is read-only", action.name);
        }
        model::save_action(&self.conn, action)?;
        tracing::info!(action = %action.name, "action saved");
        self.status = Some(format!("Saved {}", action.name));

        self.unsaved.remove(&action.id);
        self.method_dirty = false;
        self.headers.dirty = false;
        self.params.dirty = false;
        self.body.dirty = false;
        self.pagination.dirty = false;
        Ok(())
    }

    fn save_all(&mut self) -> anyhow::Result<()> {
        self.sync_active();
        if !self.has_unsaved() {
            return Ok(());
        }
        if !self.change_permitted {
            anyhow::bail!("actions are read-only");
        }
        let active_id = self.actions.get(self.active).map(|a| a.id);
        let mut saved = 0;
        for action in &self.actions {
            if Some(action.id) != active_id && self.unsaved.contains(&action.id) {
                model::save_action(&self.conn, action)?;
                tracing::info!(action = %action.name, "action saved");
                saved += 1;
            }
        }
        self.unsaved.retain(|id| Some(*id) == active_id);

        if self.is_dirty() {
            Tool::save(self)?;
            saved += 1;
        }
        self.status = Some(match saved {
            1 => "Saved 1 action".to_string(),
            n => format!("Saved {n} actions"),
        });
        Ok(())
    }

    fn has_unsaved(&self) -> bool {
        self.is_dirty() || !self.unsaved.is_empty()
    }

    fn status(&self) -> Option<String> {
        if let Some(status) = &self.status {
            return Some(status.clone());
        }
        if !self.change_permitted {
            return Some(READ_ONLY_STATUS.to_string());
        }
        self.is_dirty().then(|| "unsaved changes (Ctrl-s to save)".to_string())
    }

    fn reset_key_state(&mut self) {
        self.key_state.reset();
    }

    fn on_focus(&mut self) {
        if self.has_unsaved() {
            return;
        }
        if let Err(e) = self.reload() {
            tracing::warn!(error = %e, "reload on focus failed");
        }
    }
}
