use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use rusqlite::Connection;

use apiforge_core::{
    help_popup::{self, HelpPopup},
    keybinds::{Action, InputMode},
    tool::Tool,
    ui,
    which_key::{self, WhichKey},
};

/// The main application state.
pub struct App {
    /// Registered tools. The first one is active on startup.
    tools: Vec<Box<dyn Tool>>,
    /// Index of the active tool.
    active_tool: usize,
    /// Whether the app should quit.
    pub should_quit: bool,
    /// Current global input mode.
    mode: InputMode,
    which_key: WhichKey,
    help_popup: HelpPopup,
    /// Command-line input buffer.
    command_input: String,
    /// Command-line cursor position.
    command_cursor: usize,
    /// Result of the last command (`:w`, unknown commands), shown in the
    /// status bar until the next key press.
    message: Option<String>,
}

impl App {
    /// Create a new App with the given tools.
    pub fn new(tools: Vec<Box<dyn Tool>>) -> Self {
        let mut app = Self {
            tools,
            active_tool: 0,
            should_quit: false,
            mode: InputMode::Normal,
            which_key: WhichKey::new(),
            help_popup: HelpPopup::new(),
            command_input: String::new(),
            command_cursor: 0,
            message: None,
        };
        if let Some(tool) = app.tools.first_mut() {
            tool.on_focus();
        }
        app
    }

    fn active(&mut self) -> Option<&mut Box<dyn Tool>> {
        self.tools.get_mut(self.active_tool)
    }

    /// Reset pending key state of the active tool.
    /// Called when the hub takes over input for overlays.
    fn reset_tool_key_state(&mut self) {
        if let Some(tool) = self.active() {
            tool.reset_key_state();
        }
    }

    /// Initialize all tool databases.
    pub fn init_db(&self, conn: &Connection) -> Result<()> {
        for tool in &self.tools {
            tool.init_db(conn)?;
        }
        Ok(())
    }

    /// Tick the active tool (called every ~50ms).
    pub fn tick(&mut self) {
        if let Some(tool) = self.active() {
            tool.tick();
        }
    }

    /// Handle a terminal event.
    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Paste(text) => {
                if let Some(tool) = self.active() {
                    tool.paste(&text);
                }
            }
            _ => {}
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        // Ctrl-c always quits
        if key.code == KeyCode::Char('c') && key.modifiers == KeyModifiers::CONTROL {
            tracing::info!("force quit");
            self.should_quit = true;
            return;
        }

        self.message = None;

        if self.which_key.visible {
            self.handle_which_key_input(key);
            return;
        }

        if self.help_popup.visible {
            self.handle_help_key(key);
            return;
        }

        if self.mode == InputMode::Command {
            self.handle_command_key(key);
            return;
        }

        if let Some(tool) = self.active() {
            let action = tool.handle_key(key);
            self.process_action(action);
        }
    }

    /// Process an action returned by a tool.
    fn process_action(&mut self, action: Action) {
        match action {
            Action::Quit => {
                self.quit(false);
            }
            Action::LeaderKey => {
                self.show_leader_menu();
            }
            Action::LeaderSequence(c) => {
                self.handle_leader_sequence(c);
            }
            Action::SetMode(mode) => {
                self.mode = mode;
                if mode == InputMode::Command {
                    self.command_input.clear();
                    self.command_cursor = 0;
                }
            }
            Action::Save => {
                self.save_active();
            }
            Action::Help => {
                self.show_help();
            }
            _ => {}
        }
    }

    /// Show the leader key which-key menu.
    fn show_leader_menu(&mut self) {
        self.reset_tool_key_state();
        let (title, tool_entries) = match self.tools.get(self.active_tool) {
            Some(tool) => (format!("Leader · {}", tool.name()), tool.which_key_entries()),
            None => ("Leader".to_string(), Vec::new()),
        };
        self.which_key
            .show(title, which_key::hub_leader_entries(), tool_entries);
    }

    /// Handle a key press after the leader key.
    fn handle_leader_sequence(&mut self, c: char) {
        match c {
            'w' => self.save_active(),
            'q' => self.quit(false),
            '?' => self.show_help(),
            _ => {
                let action = self.active().and_then(|tool| tool.handle_leader_action(c));
                if let Some(action) = action {
                    self.process_action(action);
                }
            }
        }
    }

    /// Handle input while which-key is visible.
    fn handle_which_key_input(&mut self, key: KeyEvent) {
        self.which_key.hide();
        self.reset_tool_key_state();
        if let KeyCode::Char(c) = key.code {
            self.handle_leader_sequence(c);
        }
    }

    fn save_active(&mut self) {
        let result = match self.active() {
            Some(tool) => tool.save(),
            None => Ok(()),
        };
        self.report_save(result);
    }

    fn save_all(&mut self) {
        let result = self.tools.iter_mut().try_for_each(|tool| tool.save_all());
        self.report_save(result);
    }

    fn report_save(&mut self, result: Result<()>) {
        if let Err(e) = result {
            tracing::warn!(error = %e, "save failed");
            self.message = Some(format!("Save failed: {e:#}"));
        }
    }

    /// Quit unless a tool still holds unsaved edits. `force` discards them.
    fn quit(&mut self, force: bool) {
        if !force && self.tools.iter().any(|t| t.has_unsaved()) {
            self.message = Some("No write since last change (add ! to override)".to_string());
            return;
        }
        if force {
            tracing::info!("quit, discarding unsaved changes");
        }
        self.should_quit = true;
    }

    /// Handle command-mode key events.
    fn handle_command_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.mode = InputMode::Normal;
                self.command_input.clear();
                self.command_cursor = 0;
            }
            KeyCode::Enter => {
                let cmd = self.command_input.trim().to_string();
                self.mode = InputMode::Normal;
                self.command_input.clear();
                self.command_cursor = 0;
                self.execute_command(&cmd);
            }
            KeyCode::Char(c) => {
                self.command_input.insert(self.command_cursor, c);
                self.command_cursor += c.len_utf8();
            }
            KeyCode::Backspace => {
                if self.command_cursor > 0 {
                    let prev = self.command_input[..self.command_cursor]
                        .char_indices()
                        .next_back()
                        .map(|(i, _)| i)
                        .unwrap_or(0);
                    self.command_input.drain(prev..self.command_cursor);
                    self.command_cursor = prev;
                } else {
                    // Backspace on an empty line leaves command mode, like vim
                    self.mode = InputMode::Normal;
                }
            }
            KeyCode::Left => {
                if self.command_cursor > 0 {
                    let prev = self.command_input[..self.command_cursor]
                        .char_indices()
                        .next_back()
                        .map(|(i, _)| i)
                        .unwrap_or(0);
                    self.command_cursor = prev;
                }
            }
            KeyCode::Right => {
                if self.command_cursor < self.command_input.len() {
                    let next = self.command_input[self.command_cursor..]
                        .char_indices()
                        .nth(1)
                        .map(|(i, _)| self.command_cursor + i)
                        .unwrap_or(self.command_input.len());
                    self.command_cursor = next;
                }
            }
            _ => {}
        }
    }

    /// Execute a command-mode command.
    fn execute_command(&mut self, cmd: &str) {
        tracing::debug!(cmd, "command");
        match cmd {
            "" => {}
            "q" | "quit" | "qa" | "qall" => self.quit(false),
            "q!" | "quit!" | "qa!" | "qall!" => self.quit(true),
            "w" | "write" => {
                self.save_active();
            }
            "wa" | "wall" => {
                self.save_all();
            }
            "wq" | "x" | "wqa" | "xa" => {
                self.save_all();
                // Stay open when the save failed so the edits are not lost
                if self.message.is_none() {
                    self.quit(false);
                }
            }
            other => {
                self.message = Some(format!("Not an editor command: {other}"));
            }
        }
    }

    /// Show the help popup with global + tool-specific keybinds.
    fn show_help(&mut self) {
        self.reset_tool_key_state();
        let mut entries = Vec::new();
        let mut title = "Help".to_string();

        if let Some(tool) = self.tools.get(self.active_tool) {
            entries.extend(tool.help_entries());
            title = format!("{} Help", tool.name());
        }
        entries.extend(help_popup::global_help_entries());

        self.help_popup.show(title, entries);
    }

    /// Handle key events while the help popup is visible.
    fn handle_help_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => {
                self.help_popup.hide();
                self.reset_tool_key_state();
            }
            KeyCode::Char('j') | KeyCode::Down => {
                self.help_popup.scroll_down();
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.help_popup.scroll_up();
            }
            KeyCode::Char('d') if key.modifiers == KeyModifiers::CONTROL => {
                for _ in 0..10 {
                    self.help_popup.scroll_down();
                }
            }
            KeyCode::Char('u') if key.modifiers == KeyModifiers::CONTROL => {
                for _ in 0..10 {
                    self.help_popup.scroll_up();
                }
            }
            _ => {}
        }
    }

    /// Render the entire application.
    pub fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        let (tab_area, content_area, status_area) = ui::standard_layout(area);

        let tool_names: Vec<&str> = self.tools.iter().map(|t| t.name()).collect();
        if !tool_names.is_empty() {
            ui::render_tab_bar(frame, tab_area, &tool_names, self.active_tool);
        }

        let tool = self.tools.get(self.active_tool);
        if let Some(tool) = tool {
            tool.render(frame, content_area);
        }

        // Status bar or command line
        if self.mode == InputMode::Command {
            ui::render_command_line(frame, status_area, &self.command_input, self.command_cursor);
        } else {
            let tool_name = tool.map(|t| t.name()).unwrap_or("apiforge");
            let mode = tool.map(|t| t.mode()).unwrap_or(self.mode);
            let info = self
                .message
                .clone()
                .or_else(|| tool.and_then(|t| t.status()))
                .unwrap_or_else(|| "Space: leader  ?:help  :q: quit".to_string());
            ui::render_status_bar(frame, status_area, mode, tool_name, &info);
        }

        // Overlays (rendered last, on top)
        self.which_key.render(frame, area);
        self.help_popup.render(frame, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::layout::Rect;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Records what the hub asks of it.
    #[derive(Default)]
    struct Recorder {
        saves: Rc<Cell<usize>>,
        fail_save: bool,
        leader: Rc<Cell<Option<char>>>,
        pending: Rc<Cell<bool>>,
    }

    impl Tool for Recorder {
        fn name(&self) -> &str {
            "Recorder"
        }
        fn description(&self) -> &str {
            "test tool"
        }
        fn mode(&self) -> InputMode {
            InputMode::Normal
        }
        fn init_db(&self, _conn: &Connection) -> Result<()> {
            Ok(())
        }
        fn which_key_entries(&self) -> Vec<which_key::WhichKeyEntry> {
            Vec::new()
        }
        fn handle_key(&mut self, key: KeyEvent) -> Action {
            match key.code {
                KeyCode::Char(':') => Action::SetMode(InputMode::Command),
                KeyCode::Char(' ') => Action::LeaderKey,
                KeyCode::Char('?') => Action::Help,
                _ => Action::None,
            }
        }
        fn handle_leader_action(&mut self, key: char) -> Option<Action> {
            self.leader.set(Some(key));
            Some(Action::None)
        }
        fn render(&self, _frame: &mut Frame, _area: Rect) {}
        fn save(&mut self) -> Result<()> {
            self.saves.set(self.saves.get() + 1);
            if self.fail_save {
                anyhow::bail!("disk full");
            }
            self.pending.set(false);
            Ok(())
        }
        fn has_unsaved(&self) -> bool {
            self.pending.get()
        }
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn command(app: &mut App, cmd: &str) {
        app.handle_event(key(KeyCode::Char(':')));
        for c in cmd.chars() {
            app.handle_event(key(KeyCode::Char(c)));
        }
        app.handle_event(key(KeyCode::Enter));
    }

    #[test]
    fn test_write_command_saves() {
        let recorder = Recorder::default();
        let saves = recorder.saves.clone();
        let mut app = App::new(vec![Box::new(recorder)]);

        command(&mut app, "w");
        assert_eq!(saves.get(), 1);
        assert!(!app.should_quit);
        assert_eq!(app.mode, InputMode::Normal);

        command(&mut app, "wq");
        assert_eq!(saves.get(), 2);
        assert!(app.should_quit);
    }

    #[test]
    fn test_failed_save_keeps_app_open() {
        let recorder = Recorder {
            fail_save: true,
            ..Default::default()
        };
        let mut app = App::new(vec![Box::new(recorder)]);
        command(&mut app, "wq");
        assert!(!app.should_quit);
        assert!(app.message.as_deref().is_some_and(|m| m.contains("disk full")));
    }

    #[test]
    fn test_unknown_command_reported() {
        let mut app = App::new(vec![Box::new(Recorder::default())]);
        command(&mut app, "frobnicate");
        assert_eq!(
            app.message.as_deref(),
            Some("Not an editor command: frobnicate")
        );
        command(&mut app, "q");
        assert!(app.should_quit);
    }

    #[test]
    fn test_leader_menu_delegates_unknown_keys() {
        let recorder = Recorder::default();
        let leader = recorder.leader.clone();
        let saves = recorder.saves.clone();
        let mut app = App::new(vec![Box::new(recorder)]);

        app.handle_event(key(KeyCode::Char(' ')));
        assert!(app.which_key.visible);
        app.handle_event(key(KeyCode::Char('n')));
        assert!(!app.which_key.visible);
        assert_eq!(leader.get(), Some('n'));

        app.handle_event(key(KeyCode::Char(' ')));
        app.handle_event(key(KeyCode::Char('w')));
        assert_eq!(saves.get(), 1);
    }

    #[test]
    fn test_help_toggles() {
        let mut app = App::new(vec![Box::new(Recorder::default())]);
        app.handle_event(key(KeyCode::Char('?')));
        assert!(app.help_popup.visible);
        app.handle_event(key(KeyCode::Esc));
        assert!(!app.help_popup.visible);
    }

    #[test]
    fn test_quit_refused_with_unsaved_edits() {
        let recorder = Recorder::default();
        recorder.pending.set(true);
        let pending = recorder.pending.clone();
        let mut app = App::new(vec![Box::new(recorder)]);

        command(&mut app, "q");
        assert!(!app.should_quit);
        assert!(app.message.as_deref().is_some_and(|m| m.contains("No write")));

        app.handle_event(key(KeyCode::Char(' ')));
        app.handle_event(key(KeyCode::Char('q')));
        assert!(!app.should_quit);
        assert!(pending.get());

        command(&mut app, "q!");
        assert!(app.should_quit);
    }

    #[test]
    fn test_write_all_then_quit() {
        let recorder = Recorder::default();
        recorder.pending.set(true);
        let pending = recorder.pending.clone();
        let saves = recorder.saves.clone();
        let mut app = App::new(vec![Box::new(recorder)]);

        command(&mut app, "wa");
        assert_eq!(saves.get(), 1);
        assert!(!pending.get());
        assert!(!app.should_quit);

        pending.set(true);
        command(&mut app, "wq");
        assert_eq!(saves.get(), 2);
        assert!(app.should_quit);
    }

    #[test]
    fn test_ctrl_c_quits() {
        let mut app = App::new(vec![Box::new(Recorder::default())]);
        app.handle_event(Event::Key(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL,
        )));
        assert!(app.should_quit);
    }
}
