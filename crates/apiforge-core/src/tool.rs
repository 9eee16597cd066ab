use crate::help_popup::HelpEntry;
use crate::keybinds::{Action, InputMode};
use crate::which_key::WhichKeyEntry;
use crossterm::event::KeyEvent;
use ratatui::{Frame, layout::Rect};
use rusqlite::Connection;

/// The trait every apiforge tool must implement.
/// Tools are embedded views inside the hub, like neovim buffers.
pub trait Tool {
    /// The display name of the tool (e.g., "Actions").
    fn name(&self) -> &str;

    /// Short description for the dashboard and tab bar.
    fn description(&self) -> &str;

    /// The tool's current input mode (for status bar display).
    fn mode(&self) -> InputMode;

    /// Initialize the tool's database tables if they don't exist.
    fn init_db(&self, conn: &Connection) -> anyhow::Result<()>;

    /// Which-key entries for this tool, shown in the leader menu.
    fn which_key_entries(&self) -> Vec<WhichKeyEntry>;

    /// Help entries specific to this tool (shown alongside global keybinds).
    fn help_entries(&self) -> Vec<HelpEntry> {
        Vec::new()
    }

    /// Handle a key event. Returns an Action describing what happened.
    fn handle_key(&mut self, key: KeyEvent) -> Action;

    /// Handle a leader sequence the hub does not own (`<Space><c>`).
    fn handle_leader_action(&mut self, key: char) -> Option<Action> {
        let _ = key;
        None
    }

    /// Bracketed paste while the tool has focus.
    fn paste(&mut self, text: &str) {
        let _ = text;
    }

    /// Render the tool's UI into the given area.
    fn render(&self, frame: &mut Frame, area: Rect);

    /// Persist pending changes of the current view (`:w`).
    fn save(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Persist every pending change the tool holds (`:wa`, `:wq`).
    fn save_all(&mut self) -> anyhow::Result<()> {
        self.save()
    }

    /// Whether the tool holds edits that are not on disk yet.
    /// The hub refuses a plain `:q` while this is true.
    fn has_unsaved(&self) -> bool {
        false
    }

    /// One-line status shown in the status bar (last save, errors, ...).
    fn status(&self) -> Option<String> {
        None
    }

    /// Periodic tick from the event loop (~50ms).
    fn tick(&mut self) {}

    /// Reset any pending key state (leader, multi-key sequences).
    /// Called by the hub when it takes over input (overlays open/close).
    fn reset_key_state(&mut self) {}

    /// Called when the tool becomes the active view.
    fn on_focus(&mut self) {}

    /// Called when the tool loses focus.
    fn on_blur(&mut self) {}
}
