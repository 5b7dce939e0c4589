//! Store commands driven end-to-end over a temp directory tree.

use std::fs;

use serde_json::{json, Value};

use tsuki_core::protocol;

const NL: &str = include_str!("../testdata/commonstrings_nl.ts");
const FR_CA: &str = include_str!("../testdata/commonstrings_fr_CA.ts");
const BASE: &str = include_str!("../testdata/commonstrings.ts");
const TH: &str = include_str!("../testdata/commonstrings_th.ts");
const REGIONS: &str = include_str!("../testdata/regions.ts");

fn call(cmd: &str, payload: Value) -> Value {
    let request = json!({ "id": 7, "cmd": cmd, "payload": payload }).to_string();
    serde_json::from_str(&protocol::handle(&request)).expect("response is json")
}

fn ok_payload(response: Value) -> Value {
    assert_eq!(
        response["status"], "ok",
        "expected ok envelope, got: {response}"
    );
    response["payload"].clone()
}

fn seeded_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("commonstrings.ts"), BASE).unwrap();
    fs::write(dir.path().join("commonstrings_nl.ts"), NL).unwrap();
    fs::write(dir.path().join("commonstrings_fr_CA.ts"), FR_CA).unwrap();
    fs::write(dir.path().join("commonstrings_th.ts"), TH).unwrap();
    fs::write(dir.path().join("regions.ts"), REGIONS).unwrap();
    dir
}

#[test]
fn scan_lists_families_and_locales() {
    let dir = seeded_dir();
    fs::write(dir.path().join("commonstrings_ru.ts"), "<TS").unwrap();

    let payload = ok_payload(call("store.scan", json!({ "dir": dir.path() })));
    let catalogs = payload["catalogs"].as_array().unwrap();
    assert_eq!(catalogs.len(), 6);

    let base = catalogs
        .iter()
        .find(|c| c["path"].as_str().unwrap().ends_with("commonstrings.ts"))
        .unwrap();
    assert_eq!(base["family"], "commonstrings");
    assert_eq!(base["locale"], Value::Null);
    assert_eq!(base["messages"], 6);
    assert!(base["error"].is_null());
    assert_eq!(base["fingerprint"].as_str().unwrap().len(), 64);

    let fr_ca = catalogs
        .iter()
        .find(|c| c["locale"] == "fr_CA")
        .expect("fr_CA summary");
    assert_eq!(fr_ca["family"], "commonstrings");
    assert_eq!(fr_ca["messages"], 3);

    // The broken file is reported, not fatal.
    let broken = catalogs.iter().find(|c| c["locale"] == "ru").unwrap();
    assert!(broken["error"].as_str().unwrap().contains("parse error"));

    let regions = catalogs
        .iter()
        .find(|c| c["family"] == "regions")
        .unwrap();
    assert_eq!(regions["locale"], Value::Null);
    assert_eq!(regions["messages"], 4);
}

#[test]
fn resolve_walks_the_locale_chain() {
    let dir = seeded_dir();

    // fr_CA translates "Open"; served from the first catalog in the chain.
    let payload = ok_payload(call(
        "store.resolve",
        json!({
            "dir": dir.path(),
            "family": "commonstrings",
            "locale": "fr_CA",
            "id": "txt_common_button_open",
        }),
    ));
    assert_eq!(payload["text"], "Ouvrir");
    assert_eq!(payload["origin"], "translation");
    assert_eq!(payload["locale"], "fr_ca");

    // fr_CA has no loudspeaker entry and no commonstrings_fr.ts exists;
    // the base catalog serves its English variants, budget applied.
    let payload = ok_payload(call(
        "store.resolve",
        json!({
            "dir": dir.path(),
            "family": "commonstrings",
            "locale": "fr_CA",
            "id": "txt_common_button_loudspeaker_on",
            "max_width": 12,
        }),
    ));
    assert_eq!(payload["text"], "Loudsp. on");
    assert_eq!(payload["locale"], "en");

    // Unknown id: data, not an error; the frontend shows the raw id.
    let payload = ok_payload(call(
        "store.resolve",
        json!({
            "dir": dir.path(),
            "family": "commonstrings",
            "locale": "fr_CA",
            "id": "txt_common_button_nope",
        }),
    ));
    assert!(payload["text"].is_null());
}

#[test]
fn resolve_without_locale_uses_the_base_catalog() {
    let dir = seeded_dir();
    let payload = ok_payload(call(
        "store.resolve",
        json!({
            "dir": dir.path(),
            "family": "regions",
            "id": "txt_region_ES",
        }),
    ));
    assert_eq!(payload["text"], "España");
}

#[test]
fn resolve_missing_family_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let response = call(
        "store.resolve",
        json!({
            "dir": dir.path(),
            "family": "commonstrings",
            "locale": "nl",
            "id": "txt_common_button_open",
        }),
    );
    assert_eq!(response["status"], "error");
    assert!(response["message"].as_str().unwrap().contains("not found"));
}

#[test]
fn resolve_rejects_a_malformed_locale() {
    let dir = seeded_dir();
    let response = call(
        "store.resolve",
        json!({
            "dir": dir.path(),
            "family": "commonstrings",
            "locale": "not a locale",
            "id": "txt_common_button_open",
        }),
    );
    assert_eq!(response["status"], "error");
    assert!(response["message"].as_str().unwrap().contains("invalid locale"));
}

#[test]
fn save_round_trips_through_parse() {
    let dir = seeded_dir();
    let parsed = ok_payload(call("catalog.parse", json!({ "text": TH })));

    let out_path = dir.path().join("exports").join("commonstrings_th.ts");
    let payload = ok_payload(call(
        "store.save",
        json!({ "path": out_path.to_str().unwrap(), "catalog": parsed["catalog"] }),
    ));

    let on_disk = fs::read_to_string(&out_path).unwrap();
    assert_eq!(on_disk.len(), payload["bytes_written"].as_u64().unwrap() as usize);
    assert_eq!(on_disk, TH); // fixture is already canonical, Thai intact

    // And the scan picks the new file up.
    let payload = ok_payload(call(
        "store.scan",
        json!({ "dir": out_path.parent().unwrap() }),
    ));
    assert_eq!(payload["catalogs"][0]["locale"], "th");
}
