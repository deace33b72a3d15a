//! Configuration sources read from the process environment.

use std::env;
use std::fs;
#[cfg(not(target_arch = "wasm32"))]
use std::path::Path;

use serde_json::{Map, Value};

/// Reads `var` and interprets it as a configuration object.
///
/// The value may be an inline JSON object, a path to a file holding one, or a
/// `key=value,key=value` list (`true`/`false` become booleans).
pub fn config_object_from_env(var: &str) -> Option<Map<String, Value>> {
    let raw = env::var(var).ok()?;
    parse_config_source(&raw)?.as_object().cloned()
}

/// Firebase web app configuration from `FIREBASE_CONFIG`, as injected by Firebase hosting.
pub fn firebase_config_from_env() -> Option<Value> {
    let raw = env::var("FIREBASE_CONFIG").ok()?;
    parse_config_source(&raw)
}

fn parse_config_source(raw: &str) -> Option<Value> {
    if let Ok(json) = serde_json::from_str::<Value>(raw) {
        if json.is_object() {
            return Some(json);
        }
    }

    if let Some(path) = treat_as_path(raw) {
        if let Ok(contents) = fs::read_to_string(&path) {
            if let Ok(json) = serde_json::from_str::<Value>(&contents) {
                if json.is_object() {
                    return Some(json);
                }
            }
        }
    }

    parse_key_value_config(raw)
}

#[cfg(not(target_arch = "wasm32"))]
fn treat_as_path(raw: &str) -> Option<String> {
    if raw.contains('=') {
        return None;
    }
    let trimmed = raw.trim();
    let path = Path::new(trimmed);
    if path.is_file() {
        Some(trimmed.to_string())
    } else {
        None
    }
}

#[cfg(target_arch = "wasm32")]
fn treat_as_path(_raw: &str) -> Option<String> {
    None
}

fn parse_key_value_config(raw: &str) -> Option<Value> {
    let mut map = Map::new();
    for entry in raw.split(',') {
        let mut parts = entry.splitn(2, '=');
        let key = parts.next()?.trim();
        let value = parts.next()?.trim();
        if key.is_empty() || value.is_empty() {
            continue;
        }
        let value = match value {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            other => Value::String(other.to_string()),
        };
        map.insert(key.to_string(), value);
    }
    if map.is_empty() {
        None
    } else {
        Some(Value::Object(map))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_key_value_configs() {
        let value =
            parse_key_value_config("ampSelectorAttribute=data-x,delayUntilInteractive=true")
                .unwrap();
        let map = value.as_object().unwrap();
        assert_eq!(map["ampSelectorAttribute"], "data-x");
        assert_eq!(map["delayUntilInteractive"], true);
    }

    #[test]
    fn rejects_sources_without_pairs() {
        assert!(parse_config_source("not a config").is_none());
        assert!(parse_config_source("[1, 2]").is_none());
    }

    #[test]
    fn parse_config_source_accepts_files_and_json() {
        let json = parse_config_source("{\"projectId\":\"demo\"}").unwrap();
        assert_eq!(json["projectId"], "demo");

        let mut path = std::env::temp_dir();
        path.push(format!(
            "storefront_analytics_test_{}.json",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        fs::write(&path, "{\"apiKey\":\"foo\"}").unwrap();
        let path_str = path.to_string_lossy().to_string();
        let file_json = parse_config_source(&path_str).unwrap();
        assert_eq!(file_json["apiKey"], "foo");
        let _ = fs::remove_file(path);
    }
}
