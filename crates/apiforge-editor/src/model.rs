use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

// ── Key-value entries ────────────────────────────────────────────────

/// One header or query-parameter row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Which collection a stored key-value row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Header,
    Param,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Header => "header",
            EntryKind::Param => "param",
        }
    }
}

// ── HTTP method ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 7] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Patch,
        HttpMethod::Delete,
        HttpMethod::Head,
        HttpMethod::Options,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
    }

    /// The method options offered by the editor's method selector.
    pub fn options() -> Vec<String> {
        Self::ALL.iter().map(|m| m.as_str().to_string()).collect()
    }
}

// ── Body ─────────────────────────────────────────────────────────────

/// Body encoding chosen in the Body tab. Drives the auto-generated
/// content-type header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyFormat {
    None,
    Json,
    FormUrlEncoded,
    Multipart,
    Raw,
}

impl BodyFormat {
    pub const ALL: [BodyFormat; 5] = [
        BodyFormat::None,
        BodyFormat::Json,
        BodyFormat::FormUrlEncoded,
        BodyFormat::Multipart,
        BodyFormat::Raw,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BodyFormat::None => "none",
            BodyFormat::Json => "json",
            BodyFormat::FormUrlEncoded => "form-urlencoded",
            BodyFormat::Multipart => "multipart",
            BodyFormat::Raw => "raw",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == s)
    }

    pub fn label(&self) -> &'static str {
        match self {
            BodyFormat::None => "NONE",
            BodyFormat::Json => "JSON",
            BodyFormat::FormUrlEncoded => "FORM_URLENCODED",
            BodyFormat::Multipart => "MULTIPART_FORM_DATA",
            BodyFormat::Raw => "RAW",
        }
    }

    /// The content-type implied by this format, if any.
    pub fn content_type(&self) -> Option<&'static str> {
        match self {
            BodyFormat::None => None,
            BodyFormat::Json => Some("application/json"),
            BodyFormat::FormUrlEncoded => Some("application/x-www-form-urlencoded"),
            BodyFormat::Multipart => Some("multipart/form-data"),
            BodyFormat::Raw => Some("text/plain"),
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

// ── Pagination ───────────────────────────────────────────────────────

/// How the action pages through results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Pagination {
    #[default]
    None,
    /// Previous/next URLs taken from the response (bindings allowed).
    ByUrl { prev_url: String, next_url: String },
    /// Page number bound into the params by the user.
    ByPageNumber,
}

impl Pagination {
    pub fn label(&self) -> &'static str {
        match self {
            Pagination::None => "None",
            Pagination::ByUrl { .. } => "Paginate with response URL",
            Pagination::ByPageNumber => "Paginate with table page number",
        }
    }
}

// ── Authentication ───────────────────────────────────────────────────

/// Where an API key is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyLocation {
    Header,
    Query,
}

/// Datasource-level authentication. Secrets are never stored here, only the
/// shape of the scheme.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthConfig {
    #[default]
    None,
    Basic { username: String },
    BearerToken,
    ApiKey { key_name: String, location: ApiKeyLocation },
    #[serde(rename = "OAUTH2")]
    OAuth2 { grant_type: String },
}

impl AuthConfig {
    pub fn label(&self) -> &'static str {
        match self {
            AuthConfig::None => "None",
            AuthConfig::Basic { .. } => "Basic",
            AuthConfig::BearerToken => "Bearer token",
            AuthConfig::ApiKey { .. } => "API key",
            AuthConfig::OAuth2 { .. } => "OAuth 2.0",
        }
    }

    /// One-line description of the configured scheme.
    pub fn describe(&self) -> String {
        match self {
            AuthConfig::None => "Requests are sent without authentication".to_string(),
            AuthConfig::Basic { username } => format!("Username: {username}"),
            AuthConfig::BearerToken => "Authorization: Bearer ••••••".to_string(),
            AuthConfig::ApiKey { key_name, location } => match location {
                ApiKeyLocation::Header => format!("Header {key_name}: ••••••"),
                ApiKeyLocation::Query => format!("Query param {key_name}=••••••"),
            },
            AuthConfig::OAuth2 { grant_type } => format!("Grant type: {grant_type}"),
        }
    }
}

// ── Datasource & action ──────────────────────────────────────────────

/// A saved connection whose headers/params apply to every action using it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Datasource {
    pub id: i64,
    pub name: String,
    pub url: String,
    pub headers: Vec<KeyValue>,
    pub query_parameters: Vec<KeyValue>,
    pub auth: AuthConfig,
}

/// The configurable part of an action, edited through the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionConfig {
    pub http_method: HttpMethod,
    pub path: String,
    pub headers: Vec<KeyValue>,
    pub query_parameters: Vec<KeyValue>,
    pub body: String,
    pub body_format: BodyFormat,
    pub pagination: Pagination,
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self {
            http_method: HttpMethod::Get,
            path: String::new(),
            headers: Vec::new(),
            query_parameters: Vec::new(),
            body: String::new(),
            body_format: BodyFormat::None,
            pagination: Pagination::None,
        }
    }
}

/// A configured API call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub id: i64,
    pub name: String,
    pub plugin_id: String,
    pub datasource_id: Option<i64>,
    /// Hints shown above the tab strip (may be empty).
    pub messages: Vec<String>,
    pub config: ActionConfig,
}

// ── Schema ───────────────────────────────────────────────────────────

/// Initialize the database tables for the action editor.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS datasources (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            url TEXT NOT NULL DEFAULT '',
            auth TEXT NOT NULL DEFAULT '{\"type\":\"NONE\"}'
        );

        CREATE TABLE IF NOT EXISTS datasource_entries (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            datasource_id INTEGER NOT NULL REFERENCES datasources(id) ON DELETE CASCADE,
            kind TEXT NOT NULL CHECK(kind IN ('header', 'param')),
            position INTEGER NOT NULL,
            key TEXT NOT NULL DEFAULT '',
            value TEXT NOT NULL DEFAULT ''
        );

        CREATE TABLE IF NOT EXISTS actions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            plugin_id TEXT NOT NULL,
            datasource_id INTEGER REFERENCES datasources(id) ON DELETE SET NULL,
            http_method TEXT NOT NULL DEFAULT 'GET',
            path TEXT NOT NULL DEFAULT '',
            body TEXT NOT NULL DEFAULT '',
            body_format TEXT NOT NULL DEFAULT 'none',
            pagination TEXT NOT NULL DEFAULT '{\"type\":\"NONE\"}',
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );

        CREATE TRIGGER IF NOT EXISTS actions_updated_at
        AFTER UPDATE ON actions
        BEGIN
            UPDATE actions SET updated_at = CURRENT_TIMESTAMP WHERE id = NEW.id;
        END;

        CREATE TABLE IF NOT EXISTS action_entries (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            action_id INTEGER NOT NULL REFERENCES actions(id) ON DELETE CASCADE,
            kind TEXT NOT NULL CHECK(kind IN ('header', 'param')),
            position INTEGER NOT NULL,
            key TEXT NOT NULL DEFAULT '',
            value TEXT NOT NULL DEFAULT ''
        );

        CREATE TABLE IF NOT EXISTS action_messages (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            action_id INTEGER NOT NULL REFERENCES actions(id) ON DELETE CASCADE,
            message TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS editor_tab_state (
            form_name TEXT PRIMARY KEY,
            tab TEXT NOT NULL
        );",
    )?;
    Ok(())
}

// ── Datasources ──────────────────────────────────────────────────────

/// Insert a datasource with its default headers/params. Returns the new ID.
pub fn add_datasource(conn: &Connection, ds: &Datasource) -> Result<i64> {
    let auth = serde_json::to_string(&ds.auth)?;
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT INTO datasources (name, url, auth) VALUES (?1, ?2, ?3)",
        rusqlite::params![ds.name, ds.url, auth],
    )?;
    let id = tx.last_insert_rowid();
    insert_entries(&tx, "datasource_entries", "datasource_id", id, EntryKind::Header, &ds.headers)?;
    insert_entries(
        &tx,
        "datasource_entries",
        "datasource_id",
        id,
        EntryKind::Param,
        &ds.query_parameters,
    )?;
    tx.commit()?;
    Ok(id)
}

/// Load a datasource by ID.
pub fn load_datasource(conn: &Connection, id: i64) -> Result<Option<Datasource>> {
    let row = conn
        .query_row(
            "SELECT id, name, url, auth FROM datasources WHERE id = ?1",
            rusqlite::params![id],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            },
        )
        .optional()?;

    let Some((id, name, url, auth_json)) = row else {
        return Ok(None);
    };

    let auth = serde_json::from_str(&auth_json)
        .with_context(|| format!("Invalid auth config for datasource {id}"))?;

    Ok(Some(Datasource {
        id,
        name,
        url,
        headers: load_entries(conn, "datasource_entries", "datasource_id", id, EntryKind::Header)?,
        query_parameters: load_entries(
            conn,
            "datasource_entries",
            "datasource_id",
            id,
            EntryKind::Param,
        )?,
        auth,
    }))
}

// ── Actions ──────────────────────────────────────────────────────────

/// Create an empty action. Returns the new action's ID.
pub fn add_action(
    conn: &Connection,
    name: &str,
    plugin_id: &str,
    datasource_id: Option<i64>,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO actions (name, plugin_id, datasource_id) VALUES (?1, ?2, ?3)",
        rusqlite::params![name, plugin_id, datasource_id],
    )
    .with_context(|| format!("Failed to create action '{name}'"))?;
    Ok(conn.last_insert_rowid())
}

/// Attach a hint message to an action.
pub fn add_message(conn: &Connection, action_id: i64, message: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO action_messages (action_id, message) VALUES (?1, ?2)",
        rusqlite::params![action_id, message],
    )?;
    Ok(())
}

/// List all actions, ordered by name.
pub fn list_actions(conn: &Connection) -> Result<Vec<Action>> {
    let ids: Vec<i64> = {
        let mut stmt = conn.prepare("SELECT id FROM actions ORDER BY name ASC")?;
        stmt.query_map([], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?
    };

    let mut actions = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(action) = load_action(conn, id)? {
            actions.push(action);
        }
    }
    Ok(actions)
}

/// Load one action with its entries and messages.
pub fn load_action(conn: &Connection, id: i64) -> Result<Option<Action>> {
    let row = conn
        .query_row(
            "SELECT id, name, plugin_id, datasource_id, http_method, path, body, body_format, pagination
             FROM actions WHERE id = ?1",
            rusqlite::params![id],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<i64>>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, String>(6)?,
                    row.get::<_, String>(7)?,
                    row.get::<_, String>(8)?,
                ))
            },
        )
        .optional()?;

    let Some((id, name, plugin_id, datasource_id, method, path, body, body_format, pagination)) =
        row
    else {
        return Ok(None);
    };

    let pagination = serde_json::from_str(&pagination)
        .with_context(|| format!("Invalid pagination config for action '{name}'"))?;

    let messages = {
        let mut stmt =
            conn.prepare("SELECT message FROM action_messages WHERE action_id = ?1 ORDER BY id")?;
        stmt.query_map(rusqlite::params![id], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?
    };

    Ok(Some(Action {
        id,
        name,
        plugin_id,
        datasource_id,
        messages,
        config: ActionConfig {
            http_method: HttpMethod::from_str(&method).unwrap_or(HttpMethod::Get),
            path,
            headers: load_entries(conn, "action_entries", "action_id", id, EntryKind::Header)?,
            query_parameters: load_entries(conn, "action_entries", "action_id", id, EntryKind::Param)?,
            body,
            body_format: BodyFormat::from_str(&body_format).unwrap_or(BodyFormat::None),
            pagination,
        },
    }))
}

/// Persist an action's configuration, replacing all of its key-value rows.
pub fn save_action(conn: &Connection, action: &Action) -> Result<()> {
    let cfg = &action.config;
    let pagination = serde_json::to_string(&cfg.pagination)?;

    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "UPDATE actions
         SET http_method = ?1, path = ?2, body = ?3, body_format = ?4, pagination = ?5
         WHERE id = ?6",
        rusqlite::params![
            cfg.http_method.as_str(),
            cfg.path,
            cfg.body,
            cfg.body_format.as_str(),
            pagination,
            action.id
        ],
    )?;
    tx.execute(
        "DELETE FROM action_entries WHERE action_id = ?1",
        rusqlite::params![action.id],
    )?;
    insert_entries(&tx, "action_entries", "action_id", action.id, EntryKind::Header, &cfg.headers)?;
    insert_entries(
        &tx,
        "action_entries",
        "action_id",
        action.id,
        EntryKind::Param,
        &cfg.query_parameters,
    )?;
    tx.commit()?;
    Ok(())
}

/// Delete an action (entries and messages via CASCADE) and its stored tab.
pub fn delete_action(conn: &Connection, id: i64) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "DELETE FROM editor_tab_state
         WHERE form_name = (SELECT name FROM actions WHERE id = ?1)",
        rusqlite::params![id],
    )?;
    tx.execute("DELETE FROM actions WHERE id = ?1", rusqlite::params![id])?;
    tx.commit()?;
    Ok(())
}

// ── Tab selection ────────────────────────────────────────────────────

/// All stored (form name, tab id) pairs.
pub fn load_tab_state(conn: &Connection) -> Result<Vec<(String, String)>> {
    let mut stmt = conn.prepare("SELECT form_name, tab FROM editor_tab_state")?;
    let rows = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Upsert the selected tab for a form.
pub fn save_tab_state(conn: &Connection, form_name: &str, tab: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO editor_tab_state (form_name, tab) VALUES (?1, ?2)
         ON CONFLICT(form_name) DO UPDATE SET tab = excluded.tab",
        rusqlite::params![form_name, tab],
    )?;
    Ok(())
}

// ── Entry helpers ────────────────────────────────────────────────────

fn insert_entries(
    conn: &Connection,
    table: &str,
    owner_column: &str,
    owner_id: i64,
    kind: EntryKind,
    entries: &[KeyValue],
) -> Result<()> {
    let sql = format!(
        "INSERT INTO {table} ({owner_column}, kind, position, key, value) VALUES (?1, ?2, ?3, ?4, ?5)"
    );
    let mut stmt = conn.prepare(&sql)?;
    for (position, entry) in entries.iter().enumerate() {
        stmt.execute(rusqlite::params![
            owner_id,
            kind.as_str(),
            position as i64,
            entry.key,
            entry.value
        ])?;
    }
    Ok(())
}

fn load_entries(
    conn: &Connection,
    table: &str,
    owner_column: &str,
    owner_id: i64,
    kind: EntryKind,
) -> Result<Vec<KeyValue>> {
    let sql = format!(
        "SELECT key, value FROM {table} WHERE {owner_column} = ?1 AND kind = ?2 ORDER BY position"
    );
    let mut stmt = conn.prepare(&sql)?;
    let entries = stmt
        .query_map(rusqlite::params![owner_id, kind.as_str()], |row| {
            Ok(KeyValue {
                key: row.get(0)?,
                value: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use apiforge_core::db::open_memory_db;

    fn setup() -> Connection {
        let conn = open_memory_db().unwrap();
        init_db(&conn).unwrap();
        conn
    }

    fn sample_datasource() -> Datasource {
        Datasource {
            name: "Users API".to_string(),
            url: "https://api.example.com".to_string(),
            headers: vec![KeyValue::new("X-Tenant", "acme")],
            query_parameters: vec![KeyValue::new("version", "2")],
            auth: AuthConfig::ApiKey {
                key_name: "X-Api-Key".to_string(),
                location: ApiKeyLocation::Header,
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_init_db() {
        let conn = setup();
        // Should be idempotent
        init_db(&conn).unwrap();
    }

    #[test]
    fn test_datasource_roundtrip() {
        let conn = setup();
        let ds = sample_datasource();
        let id = add_datasource(&conn, &ds).unwrap();

        let loaded = load_datasource(&conn, id).unwrap().unwrap();
        assert_eq!(loaded.name, "Users API");
        assert_eq!(loaded.headers, ds.headers);
        assert_eq!(loaded.query_parameters, ds.query_parameters);
        assert_eq!(loaded.auth, ds.auth);

        assert!(load_datasource(&conn, id + 1).unwrap().is_none());
    }

    #[test]
    fn test_new_action_defaults() {
        let conn = setup();
        let id = add_action(&conn, "getUsers", "restapi-plugin", None).unwrap();

        let action = load_action(&conn, id).unwrap().unwrap();
        assert_eq!(action.name, "getUsers");
        assert!(action.messages.is_empty());
        assert_eq!(action.config, ActionConfig::default());
    }

    #[test]
    fn test_duplicate_action_name_rejected() {
        let conn = setup();
        add_action(&conn, "getUsers", "restapi-plugin", None).unwrap();
        assert!(add_action(&conn, "getUsers", "restapi-plugin", None).is_err());
    }

    #[test]
    fn test_save_action_replaces_entries() {
        let conn = setup();
        let id = add_action(&conn, "createUser", "restapi-plugin", None).unwrap();
        let mut action = load_action(&conn, id).unwrap().unwrap();

        action.config.http_method = HttpMethod::Post;
        action.config.path = "/users".to_string();
        action.config.headers = vec![KeyValue::new("A", "1"), KeyValue::new("", "")];
        action.config.query_parameters = vec![KeyValue::new("page", "1")];
        action.config.body = "{\n  \"name\": \"x\"\n}".to_string();
        action.config.body_format = BodyFormat::Json;
        action.config.pagination = Pagination::ByUrl {
            prev_url: "{{prev}}".to_string(),
            next_url: "{{next}}".to_string(),
        };
        save_action(&conn, &action).unwrap();

        let loaded = load_action(&conn, id).unwrap().unwrap();
        assert_eq!(loaded.config, action.config);

        // Second save with fewer rows must not leave stale ones behind
        action.config.headers.truncate(1);
        save_action(&conn, &action).unwrap();
        let loaded = load_action(&conn, id).unwrap().unwrap();
        assert_eq!(loaded.config.headers, vec![KeyValue::new("A", "1")]);
    }

    #[test]
    fn test_messages_in_insertion_order() {
        let conn = setup();
        let id = add_action(&conn, "getUsers", "restapi-plugin", None).unwrap();
        add_message(&conn, id, "first").unwrap();
        add_message(&conn, id, "second").unwrap();

        let action = load_action(&conn, id).unwrap().unwrap();
        assert_eq!(action.messages, vec!["first", "second"]);
    }

    #[test]
    fn test_list_and_delete_actions() {
        let conn = setup();
        let b = add_action(&conn, "b-action", "restapi-plugin", None).unwrap();
        add_action(&conn, "a-action", "restapi-plugin", None).unwrap();
        add_message(&conn, b, "hint").unwrap();
        save_tab_state(&conn, "b-action", "BODY").unwrap();
        save_tab_state(&conn, "a-action", "PARAMS").unwrap();

        let actions = list_actions(&conn).unwrap();
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0].name, "a-action");

        delete_action(&conn, b).unwrap();
        assert_eq!(list_actions(&conn).unwrap().len(), 1);
        let orphans: i64 = conn
            .query_row("SELECT COUNT(*) FROM action_messages", [], |row| row.get(0))
            .unwrap();
        assert_eq!(orphans, 0);
        assert_eq!(
            load_tab_state(&conn).unwrap(),
            vec![("a-action".to_string(), "PARAMS".to_string())]
        );
    }

    #[test]
    fn test_tab_state_upsert() {
        let conn = setup();
        save_tab_state(&conn, "getUsers", "HEADERS").unwrap();
        save_tab_state(&conn, "getUsers", "BODY").unwrap();
        save_tab_state(&conn, "createUser", "PARAMS").unwrap();

        let mut state = load_tab_state(&conn).unwrap();
        state.sort();
        assert_eq!(
            state,
            vec![
                ("createUser".to_string(), "PARAMS".to_string()),
                ("getUsers".to_string(), "BODY".to_string()),
            ]
        );
    }

    #[test]
    fn test_method_parsing() {
        assert_eq!(HttpMethod::from_str("post"), Some(HttpMethod::Post));
        assert_eq!(HttpMethod::from_str("TRACE"), None);
        assert_eq!(HttpMethod::options().len(), 7);
    }

    #[test]
    fn test_body_format_cycle_wraps() {
        assert_eq!(BodyFormat::Raw.next(), BodyFormat::None);
        assert_eq!(BodyFormat::None.next(), BodyFormat::Json);
    }
}
