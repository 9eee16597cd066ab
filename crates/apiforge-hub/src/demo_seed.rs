use anyhow::Result;
use rusqlite::Connection;

use apiforge_editor::model::{
    self, ApiKeyLocation, AuthConfig, BodyFormat, Datasource, HttpMethod, KeyValue, Pagination,
};

/// Seed a datasource and a few actions into an empty database.
pub fn seed_demo_data(conn: &Connection) -> Result<()> {
    model::init_db(conn)?;

    let count: i64 = conn.query_row("SELECT COUNT(*) FROM actions", [], |row| row.get(0))?;
    if count > 0 {
        return Ok(());
    }

    let users_api = model::add_datasource(
        conn,
        &Datasource {
            name: "Users API".to_string(),
            url: "https://api.demo.local".to_string(),
            headers: vec![
                KeyValue::new("accept", "application/json"),
                KeyValue::new("X-Tenant", "acme"),
            ],
            query_parameters: vec![KeyValue::new("version", "2")],
            auth: AuthConfig::ApiKey {
                key_name: "X-Api-Key".to_string(),
                location: ApiKeyLocation::Header,
            },
            ..Default::default()
        },
    )?;

    seed_action(
        conn,
        "getUsers",
        Some(users_api),
        HttpMethod::Get,
        "/users",
        &[],
        &[("page", "{{Table1.pageNo}}"), ("limit", "{{Table1.pageSize}}")],
        ("", BodyFormat::None),
        Pagination::ByPageNumber,
        &["Bind the table's page number into a query param to paginate."],
    )?;

    seed_action(
        conn,
        "createUser",
        Some(users_api),
        HttpMethod::Post,
        "/users",
        &[("Idempotency-Key", "{{ crypto.randomUUID() }}")],
        &[],
        (
            "{\n  \"name\": \"{{NameInput.text}}\",\n  \"email\": \"{{EmailInput.text}}\"\n}",
            BodyFormat::Json,
        ),
        Pagination::None,
        &[],
    )?;

    seed_action(
        conn,
        "listRepos",
        None,
        HttpMethod::Get,
        "https://api.github.com/orgs/rust-lang/repos",
        &[("accept", "application/vnd.github+json"), ("", "")],
        &[("per_page", "30")],
        ("", BodyFormat::None),
        Pagination::ByUrl {
            prev_url: "{{listRepos.data.links.prev}}".to_string(),
            next_url: "{{listRepos.data.links.next}}".to_string(),
        },
        &[
            "This action does not use a datasource.",
            "Use {{ }} to reference widget and query data.",
        ],
    )?;

    tracing::info!("seeded demo actions");
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn seed_action(
    conn: &Connection,
    name: &str,
    datasource_id: Option<i64>,
    method: HttpMethod,
    path: &str,
    headers: &[(&str, &str)],
    params: &[(&str, &str)],
    (body, body_format): (&str, BodyFormat),
    pagination: Pagination,
    messages: &[&str],
) -> Result<()> {
    let id = model::add_action(conn, name, "restapi-plugin", datasource_id)?;
    for message in messages {
        model::add_message(conn, id, message)?;
    }

    let Some(mut action) = model::load_action(conn, id)? else {
        anyhow::bail!("seeded action '{name}' vanished");
    };
    let rows = |pairs: &[(&str, &str)]| -> Vec<KeyValue> {
        pairs.iter().map(|(k, v)| KeyValue::new(*k, *v)).collect()
    };
    action.config.http_method = method;
    action.config.path = path.to_string();
    action.config.headers = rows(headers);
    action.config.query_parameters = rows(params);
    action.config.body = body.to_string();
    action.config.body_format = body_format;
    action.config.pagination = pagination;
    model::save_action(conn, &action)
}
