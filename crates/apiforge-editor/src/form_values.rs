use crate::model::{Action, ActionConfig, Datasource, KeyValue};

/// The key-value collections a form reads, derived from the action and its
/// datasource on every render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    pub action_headers: Vec<KeyValue>,
    pub action_params: Vec<KeyValue>,
    pub auto_generated_headers: Vec<KeyValue>,
    pub datasource_headers: Vec<KeyValue>,
    pub datasource_params: Vec<KeyValue>,
}

impl FormValues {
    pub fn derive(action: &Action, datasource: Option<&Datasource>) -> Self {
        Self {
            action_headers: action.config.headers.clone(),
            action_params: action.config.query_parameters.clone(),
            auto_generated_headers: auto_generated_headers(&action.config),
            datasource_headers: datasource.map(|d| d.headers.clone()).unwrap_or_default(),
            datasource_params: datasource
                .map(|d| d.query_parameters.clone())
                .unwrap_or_default(),
        }
    }
}

/// Headers the editor adds on its own: the content-type implied by the body
/// format, unless the user already set one.
pub fn auto_generated_headers(config: &ActionConfig) -> Vec<KeyValue> {
    let Some(content_type) = config.body_format.content_type() else {
        return Vec::new();
    };

    let user_set = config
        .headers
        .iter()
        .any(|h| h.key.trim().eq_ignore_ascii_case("content-type"));
    if user_set {
        return Vec::new();
    }

    vec![KeyValue::new("content-type", content_type)]
}

/// Dot-path of a config field in the form store, e.g. `getUsers.config.headers`.
pub fn data_tree_path(action_name: &str, field: &str) -> String {
    format!("{action_name}.config.{field}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AuthConfig, BodyFormat};

    fn action(format: BodyFormat, headers: Vec<KeyValue>) -> Action {
        Action {
            id: 1,
            name: "getUsers".to_string(),
            plugin_id: "restapi-plugin".to_string(),
            datasource_id: Some(7),
            messages: Vec::new(),
            config: ActionConfig {
                headers,
                body_format: format,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_content_type_from_body_format() {
        let a = action(BodyFormat::Json, Vec::new());
        assert_eq!(
            auto_generated_headers(&a.config),
            vec![KeyValue::new("content-type", "application/json")]
        );
        let a = action(BodyFormat::None, Vec::new());
        assert!(auto_generated_headers(&a.config).is_empty());
    }

    #[test]
    fn test_user_content_type_suppresses_auto_header() {
        let a = action(
            BodyFormat::Json,
            vec![KeyValue::new("Content-Type", "application/vnd.api+json")],
        );
        assert!(auto_generated_headers(&a.config).is_empty());
    }

    #[test]
    fn test_derive_without_datasource() {
        let a = action(BodyFormat::Raw, vec![KeyValue::new("A", "1")]);
        let values = FormValues::derive(&a, None);
        assert_eq!(values.action_headers, vec![KeyValue::new("A", "1")]);
        assert!(values.datasource_headers.is_empty());
        assert!(values.datasource_params.is_empty());
        assert_eq!(values.auto_generated_headers.len(), 1);
    }

    #[test]
    fn test_derive_with_datasource() {
        let a = action(BodyFormat::None, Vec::new());
        let ds = Datasource {
            id: 7,
            name: "Users API".to_string(),
            url: "https://api.example.com".to_string(),
            headers: vec![KeyValue::new("X-Tenant", "acme")],
            query_parameters: vec![KeyValue::new("version", "2")],
            auth: AuthConfig::None,
        };
        let values = FormValues::derive(&a, Some(&ds));
        assert_eq!(values.datasource_headers, ds.headers);
        assert_eq!(values.datasource_params, ds.query_parameters);
    }

    #[test]
    fn test_data_tree_path() {
        assert_eq!(data_tree_path("getUsers", "headers"), "getUsers.config.headers");
        assert_eq!(
            data_tree_path("getUsers", "queryParameters"),
            "getUsers.config.queryParameters"
        );
    }
}
