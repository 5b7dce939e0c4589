//! Data-integrity checks for parsed catalogs.
//!
//! Issue codes are a stable contract with the frontend; renaming one is a
//! breaking change.

use std::collections::{HashMap, HashSet};

use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::model::catalog::{Catalog, Message, Translation};
use crate::services::params;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct QaIssue {
    pub id: String,
    pub code: String,
    pub severity: Severity,
    pub message: String,
    pub line: usize,
}

impl QaIssue {
    fn error(msg: &Message, code: &str, text: impl Into<String>) -> Self {
        QaIssue {
            id: msg.id.clone(),
            code: code.to_string(),
            severity: Severity::Error,
            message: text.into(),
            line: msg.line,
        }
    }

    fn warning(msg: &Message, code: &str, text: impl Into<String>) -> Self {
        QaIssue {
            id: msg.id.clone(),
            code: code.to_string(),
            severity: Severity::Warning,
            message: text.into(),
            line: msg.line,
        }
    }
}

pub fn run(catalog: &Catalog) -> Vec<QaIssue> {
    let mut issues: Vec<QaIssue> = Vec::new();

    // One context per catalog is the authored convention; more is legal
    // but usually means two files were merged by accident.
    if catalog.contexts.len() > 1 {
        issues.push(QaIssue {
            id: String::new(),
            code: "MULTIPLE_CONTEXTS".to_string(),
            severity: Severity::Warning,
            message: format!("catalog has {} contexts, expected one", catalog.contexts.len()),
            line: 0,
        });
    }

    // id uniqueness is scoped to the whole file, across contexts.
    let mut first_seen: HashMap<&str, usize> = HashMap::new();

    let id_re = Regex::new(r"^txt_[a-z0-9]+(_[A-Za-z0-9]+)*$").unwrap();

    for msg in catalog.contexts.iter().flat_map(|c| c.messages.iter()) {
        if let Some(first_line) = first_seen.get(msg.id.as_str()) {
            issues.push(QaIssue::error(
                msg,
                "DUPLICATE_ID",
                format!("id already defined at line {first_line}"),
            ));
        } else {
            first_seen.insert(&msg.id, msg.line);
        }

        if msg.source.trim().is_empty() {
            issues.push(QaIssue::error(msg, "EMPTY_SOURCE", "message has no source text"));
        }

        if msg.translation.is_empty() {
            issues.push(QaIssue::error(
                msg,
                "NO_TRANSLATION",
                "message has no translation text",
            ));
        }

        if msg.numerus {
            issues.push(QaIssue::warning(
                msg,
                "NUMERUS_RESERVED",
                "numerus=\"yes\" is reserved and not interpreted",
            ));
        }

        if !id_re.is_match(&msg.id) {
            issues.push(QaIssue::warning(
                msg,
                "ID_NAMING",
                "id does not follow the txt_<area>_<type>_<text> convention",
            ));
        }

        check_variants(msg, &mut issues);
        check_placeholders(msg, &mut issues);
    }

    issues
}

fn check_variants(msg: &Message, issues: &mut Vec<QaIssue>) {
    let Translation::Variants(variants) = &msg.translation else {
        return;
    };

    let mut seen: HashSet<u32> = HashSet::new();
    for variant in variants {
        if !seen.insert(variant.priority) {
            issues.push(QaIssue::error(
                msg,
                "DUPLICATE_PRIORITY",
                format!("two variants share priority {}", variant.priority),
            ));
        }
    }

    let ascending = variants.windows(2).all(|w| w[0].priority < w[1].priority);
    if !ascending && seen.len() == variants.len() {
        issues.push(QaIssue::warning(
            msg,
            "UNORDERED_VARIANTS",
            "variants are not authored in ascending priority order",
        ));
    }

    // Higher priority numbers should be the shorter fallbacks.
    let mut sorted: Vec<_> = variants.iter().collect();
    sorted.sort_by_key(|v| v.priority);
    for pair in sorted.windows(2) {
        if display_width(&pair[1].text) > display_width(&pair[0].text) {
            issues.push(QaIssue::warning(
                msg,
                "VARIANT_NOT_SHORTER",
                format!(
                    "variant priority {} is longer than priority {}",
                    pair[1].priority, pair[0].priority
                ),
            ));
        }
    }
}

fn check_placeholders(msg: &Message, issues: &mut Vec<QaIssue>) {
    let expected = params::marker_numbers(&msg.source);
    for text in msg.translation.variant_texts() {
        if text.trim().is_empty() {
            continue;
        }
        let got = params::marker_numbers(text);
        if got != expected {
            issues.push(QaIssue::warning(
                msg,
                "PLACEHOLDER_MISMATCH",
                format!(
                    "translation markers {got:?} do not match source markers {expected:?}"
                ),
            ));
        }
    }
}

fn display_width(text: &str) -> usize {
    unicode_width::UnicodeWidthStr::width(text)
}

/// Comparison of a translated catalog against its reference (engineering
/// English) catalog.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Coverage {
    /// Ids the reference defines but the translated catalog lacks.
    pub missing_ids: Vec<String>,
    /// Ids the translated catalog defines but the reference dropped.
    pub extra_ids: Vec<String>,
    /// Ids present in both whose source text drifted apart, meaning the
    /// translation was made against an outdated string.
    pub stale_sources: Vec<String>,
    pub reference_messages: usize,
    pub translated_messages: usize,
    /// Share of reference ids carrying a non-empty translation.
    pub translated_ratio: f32,
}

pub fn coverage(translated: &Catalog, reference: &Catalog) -> Coverage {
    let mut missing_ids = Vec::new();
    let mut stale_sources = Vec::new();
    let mut covered = 0usize;

    let translated_by_id: HashMap<&str, &Message> = translated
        .contexts
        .iter()
        .flat_map(|c| c.messages.iter())
        .map(|m| (m.id.as_str(), m))
        .collect();
    let reference_ids: HashSet<&str> = reference.ids().collect();

    for ref_msg in reference.contexts.iter().flat_map(|c| c.messages.iter()) {
        match translated_by_id.get(ref_msg.id.as_str()) {
            None => missing_ids.push(ref_msg.id.clone()),
            Some(tr_msg) => {
                if !tr_msg.translation.is_empty() {
                    covered += 1;
                }
                if source_hash(&tr_msg.source) != source_hash(&ref_msg.source) {
                    stale_sources.push(ref_msg.id.clone());
                }
            }
        }
    }

    let extra_ids: Vec<String> = translated
        .ids()
        .filter(|id| !reference_ids.contains(id))
        .map(str::to_string)
        .collect();

    let reference_messages = reference.message_count();
    let translated_ratio = if reference_messages == 0 {
        0.0
    } else {
        covered as f32 / reference_messages as f32
    };

    Coverage {
        missing_ids,
        extra_ids,
        stale_sources,
        reference_messages,
        translated_messages: translated.message_count(),
        translated_ratio,
    }
}

/// Hash of the normalized source text. Normalization forgives whitespace
/// and typographic-quote churn so only real wording changes count as drift.
fn source_hash(source: &str) -> String {
    let mut normalized = source.trim().to_lowercase();
    normalized = normalized.split_whitespace().collect::<Vec<_>>().join(" ");
    for ch in ['\u{201C}', '\u{201D}', '\u{2019}', '\u{2018}', '"', '\''] {
        normalized = normalized.replace(ch, "");
    }

    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    hex::encode(hasher.finalize())
}
