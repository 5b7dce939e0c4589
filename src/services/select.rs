//! Length-variant selection and id lookup.
//!
//! The width unit is Unicode display columns, not bytes or chars; real font
//! metrics are the consumer's job. A lookup never returns an empty string:
//! when nothing fits the budget the shortest variant wins, and when a
//! catalog knows the id but carries no translation the source text is used.

use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthStr;

use crate::model::catalog::{Catalog, Translation};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    Translation,
    Source,
}

/// The outcome of a lookup: the chosen text and where it came from.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Resolved {
    pub text: String,
    /// Priority of the winning variant; `None` for `variants="no"` texts
    /// and source fallbacks.
    pub priority: Option<u32>,
    pub origin: Origin,
    /// Language of the catalog the text came from.
    pub language: String,
}

pub fn display_width(text: &str) -> usize {
    text.width()
}

/// Pick the best-fitting text of a translation.
///
/// Without a budget the preferred (priority 1) variant wins. With a budget
/// the first variant in ascending priority order that fits wins; when none
/// fits, the shortest fallback is returned anyway so the consumer always
/// has something to render.
pub fn select_variant(translation: &Translation, max_width: Option<usize>) -> Option<(String, Option<u32>)> {
    match translation {
        Translation::Single(text) => Some((text.clone(), None)),
        Translation::Variants(variants) => {
            if variants.is_empty() {
                return None;
            }
            let mut ordered: Vec<_> = variants.iter().collect();
            ordered.sort_by_key(|v| v.priority);

            let chosen = match max_width {
                None => ordered[0],
                Some(budget) => ordered
                    .iter()
                    .find(|v| display_width(&v.text) <= budget)
                    .copied()
                    .unwrap_or(ordered[ordered.len() - 1]),
            };
            Some((chosen.text.clone(), Some(chosen.priority)))
        }
    }
}

/// Look an id up in a single catalog. Empty translations fall back to the
/// message's source text, Qt style. `None` means the catalog does not know
/// the id at all.
pub fn lookup(catalog: &Catalog, id: &str, max_width: Option<usize>) -> Option<Resolved> {
    let msg = catalog.message(id)?;

    if msg.translation.is_empty() {
        return Some(Resolved {
            text: msg.source.clone(),
            priority: None,
            origin: Origin::Source,
            language: catalog.language.clone(),
        });
    }

    let (text, priority) = select_variant(&msg.translation, max_width)?;
    if text.trim().is_empty() {
        // A non-empty translation may still have an empty variant chosen
        // when every non-empty one overflows; prefer the source then.
        let fallback = msg
            .translation
            .variant_texts()
            .into_iter()
            .find(|t| !t.trim().is_empty())
            .unwrap_or(&msg.source)
            .to_string();
        return Some(Resolved {
            text: fallback,
            priority: None,
            origin: Origin::Translation,
            language: catalog.language.clone(),
        });
    }

    Some(Resolved {
        text,
        priority,
        origin: Origin::Translation,
        language: catalog.language.clone(),
    })
}

/// An ordered stack of catalogs, active locale first, base catalog last.
#[derive(Debug, Default, Clone)]
pub struct CatalogSet {
    catalogs: Vec<Catalog>,
}

impl CatalogSet {
    pub fn new(catalogs: Vec<Catalog>) -> Self {
        CatalogSet { catalogs }
    }

    pub fn catalogs(&self) -> &[Catalog] {
        &self.catalogs
    }

    pub fn is_empty(&self) -> bool {
        self.catalogs.is_empty()
    }

    /// Walk the fallback chain once. The first catalog holding a non-empty
    /// translation for the id wins; catalogs that know the id but have
    /// nothing translated fall through. When no catalog has a translation,
    /// the id's source text from the first catalog defining it is returned.
    /// A total miss is `None` and the caller shows the raw id.
    pub fn resolve(&self, id: &str, max_width: Option<usize>) -> Option<Resolved> {
        let mut source_fallback: Option<Resolved> = None;

        for catalog in &self.catalogs {
            match lookup(catalog, id, max_width) {
                None => continue,
                Some(resolved) if resolved.origin == Origin::Translation => {
                    return Some(resolved);
                }
                Some(resolved) => {
                    if source_fallback.is_none() {
                        source_fallback = Some(resolved);
                    }
                }
            }
        }

        source_fallback
    }
}
