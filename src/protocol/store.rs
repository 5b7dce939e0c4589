use std::path::{Path, PathBuf};

use serde_json::{json, Value};

use crate::model::catalog::Catalog;
use crate::model::locale::LocaleCode;
use crate::services::store as service;

/// Handle the `store.*` command family. `None` means the command is not
/// ours; errors come back inside the value under `"__error"` and the
/// dispatcher turns them into error envelopes.
pub fn handle(cmd: &str, payload: &Value) -> Option<Value> {
    match cmd {
        "store.scan" => {
            let dir = match required_str(payload, "dir") {
                Ok(v) => v,
                Err(e) => return Some(json!({ "__error": e })),
            };
            match service::scan(Path::new(dir)) {
                Ok(catalogs) => Some(json!({ "catalogs": catalogs })),
                Err(e) => Some(json!({ "__error": e.to_string() })),
            }
        }

        "store.resolve" => {
            let dir = match required_str(payload, "dir") {
                Ok(v) => v,
                Err(e) => return Some(json!({ "__error": e })),
            };
            let family = match required_str(payload, "family") {
                Ok(v) => v,
                Err(e) => return Some(json!({ "__error": e })),
            };
            let id = match required_str(payload, "id") {
                Ok(v) => v,
                Err(e) => return Some(json!({ "__error": e })),
            };

            let locale = match payload.get("locale").and_then(|v| v.as_str()) {
                None | Some("") => None,
                Some(raw) => match LocaleCode::parse(raw) {
                    Ok(l) => Some(l),
                    Err(e) => return Some(json!({ "__error": e.to_string() })),
                },
            };
            let max_width = payload
                .get("max_width")
                .and_then(|v| v.as_u64())
                .map(|w| w as usize);

            let set = match service::load_set(Path::new(dir), family, locale.as_ref()) {
                Ok(s) => s,
                Err(e) => return Some(json!({ "__error": e.to_string() })),
            };

            match set.resolve(id, max_width) {
                Some(resolved) => Some(json!({
                    "text": resolved.text,
                    "priority": resolved.priority,
                    "origin": resolved.origin,
                    "locale": resolved.language,
                })),
                // A total miss is data, not a failure: the frontend shows
                // the raw id.
                None => Some(json!({ "text": Value::Null })),
            }
        }

        "store.save" => {
            let path = match required_str(payload, "path") {
                Ok(v) => PathBuf::from(v),
                Err(e) => return Some(json!({ "__error": e })),
            };
            let catalog_val = payload.get("catalog").cloned().unwrap_or(Value::Null);
            if catalog_val.is_null() {
                return Some(json!({ "__error": "payload.catalog is required" }));
            }
            let catalog: Catalog = match serde_json::from_value(catalog_val) {
                Ok(c) => c,
                Err(e) => {
                    return Some(json!({ "__error": format!("invalid payload.catalog: {e}") }))
                }
            };

            match service::save_catalog(&path, &catalog) {
                Ok(bytes_written) => Some(json!({ "bytes_written": bytes_written })),
                Err(e) => Some(json!({ "__error": e.to_string() })),
            }
        }

        _ => None,
    }
}

fn required_str<'a>(payload: &'a Value, key: &str) -> Result<&'a str, String> {
    match payload.get(key).and_then(|v| v.as_str()) {
        Some(s) if !s.is_empty() => Ok(s),
        _ => Err(format!("payload.{key} is required")),
    }
}
