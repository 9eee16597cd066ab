use std::collections::HashMap;

use anyhow::Result;
use rusqlite::Connection;

use crate::model;

// ── Tab identifiers ──────────────────────────────────────────────────

/// Every tab an action editor knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditorTab {
    Headers,
    Params,
    Body,
    Pagination,
    Authentication,
    /// Owned by the settings view; never part of this editor's strip.
    Settings,
}

/// The tabs shown in the editor's strip, in display order.
pub const VISIBLE_TABS: [EditorTab; 5] = [
    EditorTab::Headers,
    EditorTab::Params,
    EditorTab::Body,
    EditorTab::Pagination,
    EditorTab::Authentication,
];

impl EditorTab {
    pub const ALL: [EditorTab; 6] = [
        EditorTab::Headers,
        EditorTab::Params,
        EditorTab::Body,
        EditorTab::Pagination,
        EditorTab::Authentication,
        EditorTab::Settings,
    ];

    /// Stable identifier, used for persistence and test ids.
    pub fn id(&self) -> &'static str {
        match self {
            EditorTab::Headers => "HEADERS",
            EditorTab::Params => "PARAMS",
            EditorTab::Body => "BODY",
            EditorTab::Pagination => "PAGINATION",
            EditorTab::Authentication => "AUTHENTICATION",
            EditorTab::Settings => "SETTINGS",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.id().eq_ignore_ascii_case(id))
    }

    pub fn title(&self) -> &'static str {
        match self {
            EditorTab::Headers => "Headers",
            EditorTab::Params => "Params",
            EditorTab::Body => "Body",
            EditorTab::Pagination => "Pagination",
            EditorTab::Authentication => "Authentication",
            EditorTab::Settings => "Settings",
        }
    }

    pub fn test_id(&self) -> String {
        format!("t--api-editor-{}", self.id())
    }

    pub fn is_visible(&self) -> bool {
        VISIBLE_TABS.contains(self)
    }

    /// Next visible tab, wrapping. Settings moves to the first visible tab.
    pub fn next(self) -> Self {
        match VISIBLE_TABS.iter().position(|t| *t == self) {
            Some(idx) => VISIBLE_TABS[(idx + 1) % VISIBLE_TABS.len()],
            None => VISIBLE_TABS[0],
        }
    }

    /// Previous visible tab, wrapping. Settings moves to the last visible tab.
    pub fn prev(self) -> Self {
        match VISIBLE_TABS.iter().position(|t| *t == self) {
            Some(0) | None => VISIBLE_TABS[VISIBLE_TABS.len() - 1],
            Some(idx) => VISIBLE_TABS[idx - 1],
        }
    }
}

// ── Badges ───────────────────────────────────────────────────────────

/// Counts attached to tabs in the strip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TabBadges {
    pub headers: usize,
    pub params: usize,
}

impl TabBadges {
    /// The badge for a tab; tabs without a count source have none.
    pub fn badge_for(&self, tab: EditorTab) -> Option<usize> {
        match tab {
            EditorTab::Headers => Some(self.headers),
            EditorTab::Params => Some(self.params),
            EditorTab::Body
            | EditorTab::Pagination
            | EditorTab::Authentication
            | EditorTab::Settings => None,
        }
    }
}

// ── Selection store ──────────────────────────────────────────────────

/// Current tab per form, owned by the parent controller and handed to each
/// form render. Forms never hold their own selection.
#[derive(Debug, Clone)]
pub struct TabSelection {
    selected: HashMap<String, EditorTab>,
    default_tab: EditorTab,
}

impl Default for TabSelection {
    fn default() -> Self {
        Self::new(EditorTab::Headers)
    }
}

impl TabSelection {
    pub fn new(default_tab: EditorTab) -> Self {
        Self {
            selected: HashMap::new(),
            default_tab,
        }
    }

    /// The current tab for a form; the default when nothing was selected yet.
    pub fn current(&self, form_name: &str) -> EditorTab {
        self.selected
            .get(form_name)
            .copied()
            .unwrap_or(self.default_tab)
    }

    /// Record a selection. Any tab is accepted, including Settings when
    /// another view forces it.
    pub fn select(&mut self, form_name: &str, tab: EditorTab) {
        self.selected.insert(form_name.to_string(), tab);
    }

    /// Drop the stored selection for a form (e.g. after the action is deleted).
    pub fn forget(&mut self, form_name: &str) {
        self.selected.remove(form_name);
    }

    /// Restore stored selections. Unknown tab ids are skipped.
    pub fn load(&mut self, conn: &Connection) -> Result<()> {
        for (form_name, tab_id) in model::load_tab_state(conn)? {
            match EditorTab::from_id(&tab_id) {
                Some(tab) => {
                    self.selected.insert(form_name, tab);
                }
                None => tracing::warn!(form = %form_name, tab = %tab_id, "ignoring unknown stored tab"),
            }
        }
        Ok(())
    }

    /// Persist the selection of one form.
    pub fn save(&self, conn: &Connection, form_name: &str) -> Result<()> {
        model::save_tab_state(conn, form_name, self.current(form_name).id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apiforge_core::db::open_memory_db;

    #[test]
    fn test_visible_tabs_exclude_settings() {
        assert_eq!(VISIBLE_TABS.len(), EditorTab::ALL.len() - 1);
        assert!(!VISIBLE_TABS.contains(&EditorTab::Settings));
        assert!(!EditorTab::Settings.is_visible());
    }

    #[test]
    fn test_ids_roundtrip() {
        for tab in EditorTab::ALL {
            assert_eq!(EditorTab::from_id(tab.id()), Some(tab));
        }
        assert_eq!(EditorTab::from_id("body"), Some(EditorTab::Body));
        assert_eq!(EditorTab::from_id("RESPONSE"), None);
        assert_eq!(EditorTab::Headers.test_id(), "t--api-editor-HEADERS");
    }

    #[test]
    fn test_cycling_skips_settings() {
        let mut tab = EditorTab::Headers;
        for _ in 0..VISIBLE_TABS.len() {
            tab = tab.next();
            assert_ne!(tab, EditorTab::Settings);
        }
        assert_eq!(tab, EditorTab::Headers);
        assert_eq!(EditorTab::Headers.prev(), EditorTab::Authentication);
        assert_eq!(EditorTab::Settings.next(), EditorTab::Headers);
        assert_eq!(EditorTab::Settings.prev(), EditorTab::Authentication);
    }

    #[test]
    fn test_badges_only_on_headers_and_params() {
        let badges = TabBadges {
            headers: 3,
            params: 0,
        };
        assert_eq!(badges.badge_for(EditorTab::Headers), Some(3));
        assert_eq!(badges.badge_for(EditorTab::Params), Some(0));
        assert_eq!(badges.badge_for(EditorTab::Body), None);
        assert_eq!(badges.badge_for(EditorTab::Authentication), None);
    }

    #[test]
    fn test_selection_is_per_form() {
        let mut selection = TabSelection::default();
        assert_eq!(selection.current("a"), EditorTab::Headers);

        selection.select("a", EditorTab::Body);
        assert_eq!(selection.current("a"), EditorTab::Body);
        assert_eq!(selection.current("b"), EditorTab::Headers);

        selection.forget("a");
        assert_eq!(selection.current("a"), EditorTab::Headers);
    }

    #[test]
    fn test_selection_persists() {
        let conn = open_memory_db().unwrap();
        model::init_db(&conn).unwrap();

        let mut selection = TabSelection::default();
        selection.select("getUsers", EditorTab::Pagination);
        selection.save(&conn, "getUsers").unwrap();
        model::save_tab_state(&conn, "stale", "RESPONSE").unwrap();

        let mut restored = TabSelection::new(EditorTab::Params);
        restored.load(&conn).unwrap();
        assert_eq!(restored.current("getUsers"), EditorTab::Pagination);
        assert_eq!(restored.current("stale"), EditorTab::Params);
    }
}
