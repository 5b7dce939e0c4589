use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// A language/region code such as `nl`, `fr_CA` or `en_US`.
///
/// Stored normalized (language lowercase, region uppercase); catalog files
/// in the wild author both `fr_CA` and `fr_ca`, so comparisons go through
/// the normalized form.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
pub struct LocaleCode {
    pub language: String,
    pub region: Option<String>,
}

impl LocaleCode {
    /// Parse `fr_CA`, `fr-ca` or `nl`.
    pub fn parse(input: &str) -> CoreResult<Self> {
        let trimmed = input.trim();
        let mut parts = trimmed.splitn(2, ['_', '-']);

        let language = parts.next().unwrap_or("");
        if !is_language(language) {
            return Err(CoreError::InvalidLocale(input.to_string()));
        }

        let region = match parts.next() {
            None => None,
            Some(r) if is_region(r) => Some(r.to_ascii_uppercase()),
            Some(_) => return Err(CoreError::InvalidLocale(input.to_string())),
        };

        Ok(LocaleCode {
            language: language.to_ascii_lowercase(),
            region,
        })
    }

    /// Display form, `fr_CA` / `nl`. Also the canonical filename suffix.
    pub fn code(&self) -> String {
        match &self.region {
            Some(r) => format!("{}_{}", self.language, r),
            None => self.language.clone(),
        }
    }

    /// The chop chain for catalog lookup: `fr_CA` yields
    /// `[fr_CA, fr]`; the suffix-less base catalog is the implicit final
    /// step and is handled by the store.
    pub fn fallback_chain(&self) -> Vec<LocaleCode> {
        let mut chain = vec![self.clone()];
        if self.region.is_some() {
            chain.push(LocaleCode {
                language: self.language.clone(),
                region: None,
            });
        }
        chain
    }

    /// Case-insensitive match against an authored attribute value.
    pub fn matches(&self, authored: &str) -> bool {
        LocaleCode::parse(authored).map(|l| l == *self).unwrap_or(false)
    }
}

impl std::fmt::Display for LocaleCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.code())
    }
}

fn is_language(s: &str) -> bool {
    (2..=3).contains(&s.len()) && s.chars().all(|c| c.is_ascii_alphabetic())
}

fn is_region(s: &str) -> bool {
    (2..=3).contains(&s.len()) && s.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Split a catalog file stem into its family and optional locale suffix:
/// `commonstrings_fr_CA` -> (`commonstrings`, `fr_CA`),
/// `regions` -> (`regions`, None).
///
/// The longest parseable suffix wins, so `foo_bar_fr_CA` keeps `foo_bar`
/// as the family.
pub fn split_stem(stem: &str) -> (String, Option<LocaleCode>) {
    let mut search = 0usize;
    while let Some(rel) = stem[search..].find('_') {
        let at = search + rel;
        let (family, suffix) = (&stem[..at], &stem[at + 1..]);
        if !family.is_empty() {
            if let Ok(locale) = LocaleCode::parse(suffix) {
                return (family.to_string(), Some(locale));
            }
        }
        search = at + 1;
    }
    (stem.to_string(), None)
}

/// Canonical file name for a catalog: `commonstrings_fr_CA.ts`,
/// `regions.ts` for the base.
pub fn file_name(family: &str, locale: Option<&LocaleCode>) -> String {
    match locale {
        Some(l) => format!("{}_{}.ts", family, l.code()),
        None => format!("{family}.ts"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_normalizes_case_and_separator() {
        let a = LocaleCode::parse("fr_ca").unwrap();
        let b = LocaleCode::parse("FR-CA").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.code(), "fr_CA");
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(LocaleCode::parse("").is_err());
        assert!(LocaleCode::parse("f").is_err());
        assert!(LocaleCode::parse("french_CANADA").is_err());
        assert!(LocaleCode::parse("fr_CA_x").is_err());
    }

    #[test]
    fn fallback_chain_chops_region() {
        let chain = LocaleCode::parse("fr_CA").unwrap().fallback_chain();
        let codes: Vec<String> = chain.iter().map(|l| l.code()).collect();
        assert_eq!(codes, ["fr_CA", "fr"]);

        let chain = LocaleCode::parse("nl").unwrap().fallback_chain();
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn stem_splitting() {
        assert_eq!(split_stem("regions"), ("regions".to_string(), None));

        let (family, locale) = split_stem("commonstrings_fr_CA");
        assert_eq!(family, "commonstrings");
        assert_eq!(locale.unwrap().code(), "fr_CA");

        let (family, locale) = split_stem("foo_bar_fr_CA");
        assert_eq!(family, "foo_bar");
        assert_eq!(locale.unwrap().code(), "fr_CA");

        // An underscore family alone stays a family.
        let (family, locale) = split_stem("language_list");
        assert_eq!(family, "language_list");
        assert!(locale.is_none());
    }

    #[test]
    fn file_name_round_trip() {
        let locale = LocaleCode::parse("fr_CA").unwrap();
        let name = file_name("commonstrings", Some(&locale));
        assert_eq!(name, "commonstrings_fr_CA.ts");

        let (family, parsed) = split_stem("commonstrings_fr_CA");
        assert_eq!(file_name(&family, parsed.as_ref()), name);
    }
}
