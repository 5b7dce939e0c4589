//! Catalog discovery and loading from a directory.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::error::{CoreError, CoreResult};
use crate::model::catalog::Catalog;
use crate::model::locale::{self, LocaleCode};
use crate::services::select::CatalogSet;
use crate::services::{encoding, writer};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CatalogSummary {
    pub path: String,
    pub family: String,
    pub locale: Option<String>,
    pub contexts: usize,
    pub messages: usize,
    /// SHA-256 of the raw bytes; lets the frontend skip unchanged files.
    pub fingerprint: String,
    /// Set when the file could not be read or parsed. The scan itself
    /// never aborts over one bad catalog.
    pub error: Option<String>,
}

/// List every `.ts` catalog in a directory, sorted by file name.
pub fn scan(dir: &Path) -> CoreResult<Vec<CatalogSummary>> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("ts"))
        .collect();
    paths.sort();

    let mut summaries = Vec::with_capacity(paths.len());
    for path in paths {
        summaries.push(summarize(&path));
    }
    Ok(summaries)
}

fn summarize(path: &Path) -> CatalogSummary {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let (family, locale) = locale::split_stem(stem);

    let mut summary = CatalogSummary {
        path: path.to_string_lossy().to_string(),
        family,
        locale: locale.map(|l| l.code()),
        contexts: 0,
        messages: 0,
        fingerprint: String::new(),
        error: None,
    };

    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(e) => {
            summary.error = Some(format!("read failed: {e}"));
            return summary;
        }
    };
    summary.fingerprint = fingerprint(&bytes);

    match load_bytes(&bytes) {
        Ok(catalog) => {
            summary.contexts = catalog.contexts.len();
            summary.messages = catalog.message_count();
        }
        Err(e) => {
            warn!(path = %summary.path, error = %e, "malformed catalog in scan");
            summary.error = Some(e.to_string());
        }
    }

    summary
}

pub fn fingerprint(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

pub fn load_bytes(bytes: &[u8]) -> CoreResult<Catalog> {
    let text = encoding::decode_ts_bytes(bytes)?;
    crate::parsers::ts::parse(&text)
}

pub fn load_file(path: &Path) -> CoreResult<Catalog> {
    let bytes = fs::read(path)?;
    load_bytes(&bytes)
}

/// Load the fallback stack for a family: the locale's chop chain first,
/// the suffix-less base catalog last. Missing candidates are fine and
/// malformed ones are skipped; only an entirely empty result is an error.
pub fn load_set(dir: &Path, family: &str, locale: Option<&LocaleCode>) -> CoreResult<CatalogSet> {
    let mut candidates: Vec<String> = Vec::new();
    if let Some(locale) = locale {
        for step in locale.fallback_chain() {
            candidates.push(locale::file_name(family, Some(&step)));
        }
    }
    candidates.push(locale::file_name(family, None));

    let mut catalogs = Vec::new();
    for name in &candidates {
        let path = dir.join(name);
        if !path.exists() {
            continue;
        }
        match load_file(&path) {
            Ok(catalog) => {
                debug!(path = %path.display(), "loaded catalog");
                catalogs.push(catalog);
            }
            Err(e) => {
                // A broken file must not shadow the rest of the chain.
                warn!(path = %path.display(), error = %e, "skipping malformed catalog");
            }
        }
    }

    if catalogs.is_empty() {
        return Err(CoreError::NotFound(format!(
            "no catalog for family {family:?} in {}",
            dir.display()
        )));
    }
    Ok(CatalogSet::new(catalogs))
}

/// Serialize and write a catalog, atomically: the content lands in a
/// sibling temp file first and is renamed over the target.
pub fn save_catalog(path: &Path, catalog: &Catalog) -> CoreResult<usize> {
    let text = writer::write_ts(catalog);
    write_atomic(path, text.as_bytes())?;
    Ok(text.len())
}

fn write_atomic(path: &Path, bytes: &[u8]) -> CoreResult<()> {
    let tmp = tmp_path(path);

    if let Some(parent) = tmp.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut p = path.to_path_buf();
    let file_name = match path.file_name().and_then(|s| s.to_str()) {
        Some(n) => n.to_string(),
        None => "catalog".to_string(),
    };
    p.set_file_name(format!("{file_name}.tmp"));
    p
}

#[cfg(test)]
mod tests {
    use super::*;

    const NL: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<TS version=\"1.0\" sourcelanguage=\"en\" language=\"nl\">\n  <context>\n    <name>nString</name>\n    <message numerus=\"no\" id=\"txt_common_button_open\">\n      <source>Open</source>\n      <translation variants=\"yes\">\n        <lengthvariant priority=\"1\">Openen</lengthvariant>\n      </translation>\n    </message>\n  </context>\n</TS>\n";

    const BASE: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<TS version=\"1.0\" language=\"en\">\n  <context>\n    <name>nString</name>\n    <message numerus=\"no\" id=\"txt_common_button_open\">\n      <source>Open</source>\n      <translation variants=\"yes\">\n        <lengthvariant priority=\"1\">Open</lengthvariant>\n      </translation>\n    </message>\n    <message numerus=\"no\" id=\"txt_common_button_close\">\n      <source>Close</source>\n      <translation variants=\"yes\">\n        <lengthvariant priority=\"1\">Close</lengthvariant>\n      </translation>\n    </message>\n  </context>\n</TS>\n";

    #[test]
    fn scan_reports_good_and_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("commonstrings_nl.ts"), NL).unwrap();
        fs::write(dir.path().join("commonstrings.ts"), BASE).unwrap();
        fs::write(dir.path().join("broken_ru.ts"), "<TS incomplete").unwrap();
        fs::write(dir.path().join("notes.txt"), "not a catalog").unwrap();

        let summaries = scan(dir.path()).unwrap();
        assert_eq!(summaries.len(), 3);

        let broken = &summaries[0];
        assert_eq!(broken.family, "broken");
        assert_eq!(broken.locale.as_deref(), Some("ru"));
        assert!(broken.error.is_some());

        let base = &summaries[1];
        assert_eq!(base.family, "commonstrings");
        assert!(base.locale.is_none());
        assert_eq!(base.messages, 2);
        assert!(base.error.is_none());
        assert_eq!(base.fingerprint, fingerprint(BASE.as_bytes()));

        let nl = &summaries[2];
        assert_eq!(nl.locale.as_deref(), Some("nl"));
        assert_eq!(nl.contexts, 1);
    }

    #[test]
    fn load_set_walks_chain_and_skips_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("commonstrings_nl.ts"), NL).unwrap();
        fs::write(dir.path().join("commonstrings.ts"), BASE).unwrap();

        // nl_BE chops to nl; nl_BE itself does not exist on disk.
        let locale = LocaleCode::parse("nl_BE").unwrap();
        let set = load_set(dir.path(), "commonstrings", Some(&locale)).unwrap();
        assert_eq!(set.catalogs().len(), 2);

        let resolved = set.resolve("txt_common_button_open", None).unwrap();
        assert_eq!(resolved.text, "Openen");
        // Base-only ids resolve through the last catalog in the stack.
        let resolved = set.resolve("txt_common_button_close", None).unwrap();
        assert_eq!(resolved.text, "Close");
    }

    #[test]
    fn load_set_without_any_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_set(dir.path(), "commonstrings", None);
        assert!(matches!(result, Err(CoreError::NotFound(_))));
    }

    #[test]
    fn save_writes_canonical_output_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = load_bytes(NL.as_bytes()).unwrap();
        let path = dir.path().join("out").join("commonstrings_nl.ts");

        let written = save_catalog(&path, &catalog).unwrap();
        let on_disk = fs::read_to_string(&path).unwrap();
        assert_eq!(on_disk.len(), written);
        assert_eq!(on_disk, NL); // fixture is already in canonical shape
        assert!(!tmp_path(&path).exists());
    }
}
