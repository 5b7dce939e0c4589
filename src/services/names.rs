//! Localized language, region and collation display names.
//!
//! The `regions.ts` / `collations.ts` tables key their entries as
//! `txt_region_GB`, `txt_language_fr`, `txt_collation_en_US`. A missing id
//! yields `None`, never the raw id echoed back.

use crate::model::catalog::Catalog;
use crate::services::select::CatalogSet;

pub const LANGUAGE_ID_PREFIX: &str = "txt_language";
pub const REGION_ID_PREFIX: &str = "txt_region";
pub const COLLATION_ID_PREFIX: &str = "txt_collation";

pub fn language_name(set: &CatalogSet, language: &str) -> Option<String> {
    display_name(set, LANGUAGE_ID_PREFIX, language)
}

pub fn region_name(set: &CatalogSet, region: &str) -> Option<String> {
    display_name(set, REGION_ID_PREFIX, region)
}

pub fn collation_name(set: &CatalogSet, collation: &str) -> Option<String> {
    display_name(set, COLLATION_ID_PREFIX, collation)
}

fn display_name(set: &CatalogSet, prefix: &str, code: &str) -> Option<String> {
    if code.is_empty() {
        return None;
    }
    let id = format!("{prefix}_{code}");
    set.resolve(&id, None).map(|r| r.text)
}

/// All region identifiers a catalog defines, in authored order
/// (`txt_region_GB` -> `GB`). Used to build language-switch pickers.
pub fn regions(catalog: &Catalog) -> Vec<String> {
    ids_with_prefix(catalog, REGION_ID_PREFIX)
}

pub fn languages(catalog: &Catalog) -> Vec<String> {
    ids_with_prefix(catalog, LANGUAGE_ID_PREFIX)
}

pub fn collations(catalog: &Catalog) -> Vec<String> {
    ids_with_prefix(catalog, COLLATION_ID_PREFIX)
}

fn ids_with_prefix(catalog: &Catalog, prefix: &str) -> Vec<String> {
    catalog
        .ids()
        .filter_map(|id| id.strip_prefix(prefix))
        .filter_map(|rest| rest.strip_prefix('_'))
        .filter(|code| !code.is_empty())
        .map(str::to_string)
        .collect()
}
