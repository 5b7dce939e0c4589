//! Line-oriented JSON protocol: one request object per line on stdin, one
//! response envelope per line on stdout.
//!
//! Request: `{"id": ..., "cmd": "...", "payload": {...}}`.
//! Response: `{"id": ..., "status": "ok", "payload": {...}}` or
//! `{"id": ..., "status": "error", "message": "..."}`.

use serde_json::{json, Value};

use crate::model::catalog::Catalog;
use crate::services::{encoding, qa, select, store as store_service, writer};

mod command;
mod store;

use command::Command;

fn get_cmd(req: &Value) -> &str {
    req.get("cmd").and_then(|v| v.as_str()).unwrap_or("")
}

fn get_id(req: &Value) -> Value {
    req.get("id").cloned().unwrap_or(Value::Null)
}

fn get_payload(req: &Value) -> &Value {
    static EMPTY: Value = Value::Null;
    req.get("payload").unwrap_or(&EMPTY)
}

fn ok(id: Value, payload: Value) -> String {
    json!({
        "id": id,
        "status": "ok",
        "payload": payload
    })
    .to_string()
}

fn err(id: Value, message: impl Into<String>) -> String {
    json!({
        "id": id,
        "status": "error",
        "message": message.into()
    })
    .to_string()
}

/// Materialize a catalog from whichever form the payload carries:
/// the full model (`catalog`), raw XML (`text`), or a file (`path`).
fn catalog_from_payload(payload: &Value) -> Result<Catalog, String> {
    if let Some(catalog_val) = payload.get("catalog") {
        if !catalog_val.is_null() {
            return serde_json::from_value(catalog_val.clone())
                .map_err(|e| format!("invalid payload.catalog: {e}"));
        }
    }

    if let Some(text) = payload.get("text").and_then(|v| v.as_str()) {
        return crate::parsers::ts::parse(text).map_err(|e| e.to_string());
    }

    if let Some(path) = payload.get("path").and_then(|v| v.as_str()) {
        if !path.is_empty() {
            return store_service::load_file(std::path::Path::new(path))
                .map_err(|e| e.to_string());
        }
    }

    Err("payload must carry catalog, text or path".to_string())
}

pub fn handle(input: &str) -> String {
    let req: Value = match serde_json::from_str(input) {
        Ok(v) => v,
        Err(_) => {
            return json!({
                "status": "error",
                "message": "invalid json"
            })
            .to_string();
        }
    };

    let id = get_id(&req);
    let cmd_str = get_cmd(&req);
    let payload = get_payload(&req);

    if let Some(result) = store::handle(cmd_str, payload) {
        return match result.get("__error").and_then(|v| v.as_str()) {
            Some(message) => err(id, message.to_string()),
            None => ok(id, result),
        };
    }

    match Command::from(cmd_str) {
        Command::Ping => ok(id, json!({ "message": "tsuki-core alive" })),

        Command::CatalogParse => {
            let catalog = match catalog_from_payload(payload) {
                Ok(c) => c,
                Err(e) => return err(id, e),
            };
            match serde_json::to_value(&catalog) {
                Ok(v) => ok(id, json!({ "catalog": v })),
                Err(e) => err(id, e.to_string()),
            }
        }

        Command::CatalogRebuild => {
            let catalog_val = payload.get("catalog").cloned().unwrap_or(Value::Null);
            if catalog_val.is_null() {
                return err(id, "payload.catalog is required");
            }
            let catalog: Catalog = match serde_json::from_value(catalog_val) {
                Ok(c) => c,
                Err(e) => return err(id, format!("invalid payload.catalog: {e}")),
            };
            ok(id, json!({ "text": writer::write_ts(&catalog) }))
        }

        Command::CatalogValidate => {
            let catalog = match catalog_from_payload(payload) {
                Ok(c) => c,
                Err(e) => return err(id, e),
            };
            let issues = qa::run(&catalog);

            let coverage = match payload.get("reference") {
                None => None,
                Some(reference_val) => {
                    let reference = match catalog_from_payload(reference_val) {
                        Ok(c) => c,
                        Err(e) => return err(id, format!("invalid reference: {e}")),
                    };
                    Some(qa::coverage(&catalog, &reference))
                }
            };

            match coverage {
                Some(cov) => ok(id, json!({ "issues": issues, "coverage": cov })),
                None => ok(id, json!({ "issues": issues })),
            }
        }

        Command::CatalogLookup => {
            let catalog = match catalog_from_payload(payload) {
                Ok(c) => c,
                Err(e) => return err(id, e),
            };
            let lookup_id = match payload.get("id").and_then(|v| v.as_str()) {
                Some(s) if !s.is_empty() => s,
                _ => return err(id, "payload.id is required"),
            };
            let max_width = payload
                .get("max_width")
                .and_then(|v| v.as_u64())
                .map(|w| w as usize);

            match select::lookup(&catalog, lookup_id, max_width) {
                Some(resolved) => ok(
                    id,
                    json!({
                        "text": resolved.text,
                        "priority": resolved.priority,
                        "origin": resolved.origin,
                    }),
                ),
                None => err(id, format!("id {lookup_id:?} not in catalog")),
            }
        }

        Command::DetectEncoding => {
            let path_str = payload.get("path").and_then(|v| v.as_str()).unwrap_or("");
            if path_str.is_empty() {
                return err(id, "payload.path is required");
            }
            let path = std::path::PathBuf::from(path_str);
            match encoding::detect_from_file(&path) {
                Ok(result) => ok(id, serde_json::to_value(result).unwrap_or(json!({}))),
                Err(e) => err(id, e.to_string()),
            }
        }

        // store.* is dispatched above; reaching here means no handler took it.
        Command::StoreScan | Command::StoreResolve | Command::StoreSave | Command::Unknown => {
            err(id, "unknown command")
        }
    }
}
