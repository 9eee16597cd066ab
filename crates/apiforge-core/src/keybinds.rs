use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Input modes, modeled after vim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Default mode. Navigation and actions via keybinds.
    #[default]
    Normal,
    /// Text input mode. Entered with `i`, `e`, `a`, `o`. Exited with `Esc`.
    Insert,
    /// Command-line mode. Entered with `:`. Supports `:q`, `:w`, etc.
    Command,
}

impl InputMode {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Insert => "INSERT",
            Self::Command => "COMMAND",
        }
    }
}

/// Actions that can result from processing a key event.
/// Tools and the hub return these to signal what should happen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// No-op: the key was consumed but nothing happens.
    None,
    /// Quit the hub.
    Quit,
    /// Switch to a specific input mode.
    SetMode(InputMode),
    /// Move selection down by N items.
    MoveDown(usize),
    /// Move selection up by N items.
    MoveUp(usize),
    /// Jump to top of list.
    GotoTop,
    /// Jump to bottom of list.
    GotoBottom,
    /// Confirm/select/toggle the current item.
    Confirm,
    /// Delete the current item.
    Delete,
    /// Append a new item.
    Add,
    /// Insert a new item below the current one.
    AddBelow,
    /// Begin editing the current item.
    Edit,
    /// Next tab within the active tool.
    NextTab,
    /// Previous tab within the active tool.
    PrevTab,
    /// Jump to a tab by index (0-based).
    JumpTab(usize),
    /// Cycle the current selector (e.g. HTTP method) forward.
    Cycle,
    /// Persist the tool's pending changes.
    Save,
    /// Open which-key leader menu.
    LeaderKey,
    /// A leader key sequence was completed with this key.
    LeaderSequence(char),
    /// Show help.
    Help,
}

/// Pending key state for multi-key sequences like `gg`, `dd`, `gt`, `gT`.
#[derive(Debug, Default, Clone)]
pub struct KeyState {
    /// Whether the leader key (Space) was just pressed.
    pub leader_active: bool,
    /// Pending first key of a two-key sequence (e.g., 'g' for gg/gt/gT, 'd' for dd).
    pub pending_key: Option<char>,
}

impl KeyState {
    pub fn reset(&mut self) {
        self.leader_active = false;
        self.pending_key = None;
    }
}

/// Process a key event in Normal mode, accounting for multi-key sequences.
pub fn process_normal_key(key: KeyEvent, state: &mut KeyState) -> Action {
    if state.leader_active {
        state.leader_active = false;
        return match key.code {
            KeyCode::Char('q') => Action::Quit,
            KeyCode::Char(c) => Action::LeaderSequence(c),
            _ => Action::None,
        };
    }

    if let Some(pending) = state.pending_key.take() {
        return match (pending, key.code) {
            ('g', KeyCode::Char('g')) => Action::GotoTop,
            ('g', KeyCode::Char('t')) => Action::NextTab,
            ('g', KeyCode::Char('T')) => Action::PrevTab,
            ('d', KeyCode::Char('d')) => Action::Delete,
            _ => Action::None,
        };
    }

    match key.code {
        KeyCode::Char(' ') => {
            state.leader_active = true;
            Action::LeaderKey
        }
        KeyCode::Char('s') if key.modifiers == KeyModifiers::CONTROL => Action::Save,
        KeyCode::Char('j') | KeyCode::Down => Action::MoveDown(1),
        KeyCode::Char('k') | KeyCode::Up => Action::MoveUp(1),
        KeyCode::Char('G') => Action::GotoBottom,
        KeyCode::Char('g') => {
            state.pending_key = Some('g');
            Action::None
        }
        KeyCode::Char('d') => {
            state.pending_key = Some('d');
            Action::None
        }
        KeyCode::Tab | KeyCode::Char(']') => Action::NextTab,
        KeyCode::BackTab | KeyCode::Char('[') => Action::PrevTab,
        KeyCode::Char(c @ '1'..='9') => Action::JumpTab((c as u8 - b'1') as usize),
        KeyCode::Enter => Action::Confirm,
        KeyCode::Char('a') => Action::Add,
        KeyCode::Char('o') => Action::AddBelow,
        KeyCode::Char('e') | KeyCode::Char('i') => Action::Edit,
        KeyCode::Char('m') => Action::Cycle,
        KeyCode::Char(':') => Action::SetMode(InputMode::Command),
        KeyCode::Char('?') => Action::Help,
        _ => Action::None,
    }
}
