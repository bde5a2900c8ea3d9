use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use orderflow_core::config::{AppConfig, LoadOptions};
use toml::Value;

/// (key path, env var) for every reported setting, in display order.
const FIELDS: &[(&str, &str)] = &[
    ("database.url", "ORDERFLOW_DATABASE_URL"),
    ("database.max_connections", "ORDERFLOW_DATABASE_MAX_CONNECTIONS"),
    ("database.timeout_secs", "ORDERFLOW_DATABASE_TIMEOUT_SECS"),
    ("workflow.persist_timeout_secs", "ORDERFLOW_WORKFLOW_PERSIST_TIMEOUT_SECS"),
    ("workflow.default_min_payment_percentage", "ORDERFLOW_WORKFLOW_DEFAULT_MIN_PAYMENT_PERCENTAGE"),
    ("logging.level", "ORDERFLOW_LOGGING_LEVEL"),
    ("logging.format", "ORDERFLOW_LOGGING_FORMAT"),
];

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for (key_path, env_key) in FIELDS {
        lines.push(render_line(
            key_path,
            &field_value(&config, key_path),
            field_source(key_path, Some(*env_key), config_file_doc.as_ref(), config_file_path.as_deref()),
        ));
    }

    lines.join("\n")
}

fn field_value(config: &AppConfig, key_path: &str) -> String {
    match key_path {
        "database.url" => redact_url(&config.database.url),
        "database.max_connections" => config.database.max_connections.to_string(),
        "database.timeout_secs" => config.database.timeout_secs.to_string(),
        "workflow.persist_timeout_secs" => config.workflow.persist_timeout_secs.to_string(),
        "workflow.default_min_payment_percentage" => {
            format!("{}%", config.workflow.default_min_payment_percentage)
        }
        "logging.level" => config.logging.level.clone(),
        "logging.format" => format!("{:?}", config.logging.format),
        _ => "<unknown>".to_string(),
    }
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("orderflow.toml"), PathBuf::from("config/orderflow.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_key: Option<&str>,
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_key {
        if env::var_os(env_key).is_some() {
            return format!("env ({env_key})");
        }
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

/// Hides credentials embedded in a connection URL.
fn redact_url(url: &str) -> String {
    match (url.split_once("://"), url.rfind('@')) {
        (Some((scheme, _)), Some(at)) => format!("{scheme}://***{}", &url[at..]),
        _ => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use toml::Value;

    use super::{contains_path, redact_url};

    #[test]
    fn nested_key_paths_are_found_in_file_documents() {
        let doc: Value = "[workflow]\npersist_timeout_secs = 5\n".parse().expect("toml");
        assert!(contains_path(&doc, "workflow.persist_timeout_secs"));
        assert!(!contains_path(&doc, "workflow.default_min_payment_percentage"));
    }

    #[test]
    fn url_credentials_are_redacted() {
        assert_eq!(redact_url("sqlite://orderflow.db"), "sqlite://orderflow.db");
        assert_eq!(redact_url("sqlite://admin:pw@host/db"), "sqlite://***@host/db");
    }
}
