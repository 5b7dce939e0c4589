use serde::{Deserialize, Serialize};

/// One parsed `.ts` catalog file.
///
/// Entries are immutable at consumption time; authoring happens upstream in
/// translator tooling. The model mirrors the file shape closely so the
/// frontend can edit it and send it back through `catalog.rebuild`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Catalog {
    #[serde(default = "default_version")]
    pub version: String,

    /// Target locale code as authored (e.g. `nl`, `fr_ca`).
    #[serde(default)]
    pub language: String,

    #[serde(default)]
    pub source_language: Option<String>,

    /// The corpus has two header shapes; `regions.ts`-style files carry a
    /// `<!DOCTYPE TS>` line, `commonstrings_*.ts` files do not.
    #[serde(default)]
    pub has_doctype: bool,

    #[serde(default)]
    pub contexts: Vec<TsContext>,
}

fn default_version() -> String {
    "1.0".to_string()
}

/// Logical string group within a catalog (e.g. `nString`, `hblanguageswitch`).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TsContext {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub messages: Vec<Message>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: String,

    /// Reserved plural flag; parsed and written back but never interpreted.
    #[serde(default)]
    pub numerus: bool,

    #[serde(default)]
    pub source: String,

    pub translation: Translation,

    /// 1-based line of the `<message>` tag in the input, for diagnostics.
    /// Not part of the file format, so it does not survive a rebuild.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub line: usize,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

/// A `<translation>` element: either a single fixed text (`variants="no"`)
/// or an ordered list of length-ranked alternates (`variants="yes"`).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Translation {
    Single(String),
    Variants(Vec<LengthVariant>),
}

/// One `<lengthvariant>`: priority 1 is the preferred (longest) rendering,
/// higher numbers are progressively shorter fallbacks.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct LengthVariant {
    pub priority: u32,
    pub text: String,
}

impl Catalog {
    /// Find a message by id, searching every context in authored order.
    pub fn message(&self, id: &str) -> Option<&Message> {
        self.contexts
            .iter()
            .flat_map(|c| c.messages.iter())
            .find(|m| m.id == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.contexts
            .iter()
            .flat_map(|c| c.messages.iter())
            .map(|m| m.id.as_str())
    }

    pub fn message_count(&self) -> usize {
        self.contexts.iter().map(|c| c.messages.len()).sum()
    }
}

impl Translation {
    /// All translation texts, in authored order.
    pub fn variant_texts(&self) -> Vec<&str> {
        match self {
            Translation::Single(s) => vec![s.as_str()],
            Translation::Variants(v) => v.iter().map(|lv| lv.text.as_str()).collect(),
        }
    }

    /// The preferred text: the variant with the lowest priority number,
    /// or the single text when there are no variants.
    pub fn preferred(&self) -> Option<&str> {
        match self {
            Translation::Single(s) => Some(s.as_str()),
            Translation::Variants(v) => v
                .iter()
                .min_by_key(|lv| lv.priority)
                .map(|lv| lv.text.as_str()),
        }
    }

    /// True when there is no usable translation text at all.
    pub fn is_empty(&self) -> bool {
        match self {
            Translation::Single(s) => s.trim().is_empty(),
            Translation::Variants(v) => v.iter().all(|lv| lv.text.trim().is_empty()),
        }
    }
}
