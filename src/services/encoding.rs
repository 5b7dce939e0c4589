use std::fs;
use std::path::Path;

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};
use regex::Regex;
use serde::Serialize;

use crate::error::{CoreError, CoreResult};

#[derive(Debug, Serialize)]
pub struct EncodingCandidate {
    pub name: String,
    pub confidence: f32,
}

#[derive(Debug, Serialize)]
pub struct EncodingDetectionResult {
    pub best: String,
    pub confidence: f32,
    pub candidates: Vec<EncodingCandidate>,
}

/// Decode raw catalog bytes into text.
///
/// Order of authority: UTF-8 BOM, then the encoding declared in the XML
/// prolog, then plain UTF-8, then a chardetng guess for legacy exports.
pub fn decode_ts_bytes(bytes: &[u8]) -> CoreResult<String> {
    // BOM UTF-8 (EF BB BF)
    let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);

    if let Some(declared) = prolog_encoding(bytes) {
        let encoding = Encoding::for_label(declared.as_bytes())
            .ok_or_else(|| CoreError::Encoding(format!("unknown declared encoding {declared:?}")))?;
        let (text, _, had_errors) = encoding.decode(bytes);
        if had_errors {
            return Err(CoreError::Encoding(format!(
                "input is not valid {}",
                encoding.name()
            )));
        }
        return Ok(text.into_owned());
    }

    let (text, _, had_errors) = UTF_8.decode(bytes);
    if !had_errors {
        return Ok(text.into_owned());
    }

    // Legacy export without a usable prolog; take chardetng's word for it.
    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let guessed = detector.guess(None, true);
    let (text, _, had_errors) = guessed.decode(bytes);
    if had_errors {
        return Err(CoreError::Encoding(format!(
            "undecodable input (best guess was {})",
            guessed.name()
        )));
    }
    Ok(text.into_owned())
}

/// The encoding declared in the XML prolog, if any. The prolog is ASCII in
/// every encoding we care about, so sniffing the head as Latin-1 is safe.
fn prolog_encoding(bytes: &[u8]) -> Option<String> {
    let head_len = bytes.len().min(128);
    let head: String = bytes[..head_len].iter().map(|&b| b as char).collect();
    let re = Regex::new(r#"^<\?xml[^>]*encoding\s*=\s*["']([A-Za-z0-9._-]+)["']"#).ok()?;
    re.captures(&head)
        .map(|caps| caps[1].to_ascii_lowercase())
        // declared utf-8 is just the default path
        .filter(|enc| enc != "utf-8" && enc != "utf8")
}

/// Sniff a file's encoding for the frontend's import dialog.
pub fn detect_from_file(path: &Path) -> CoreResult<EncodingDetectionResult> {
    let bytes = fs::read(path)?;

    // BOM UTF-8 (EF BB BF)
    if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        return Ok(EncodingDetectionResult {
            best: "utf-8-sig".into(),
            confidence: 0.99,
            candidates: vec![
                EncodingCandidate {
                    name: "utf-8-sig".into(),
                    confidence: 0.99,
                },
                EncodingCandidate {
                    name: "utf-8".into(),
                    confidence: 0.90,
                },
            ],
        });
    }

    if let Some(declared) = prolog_encoding(&bytes) {
        return Ok(EncodingDetectionResult {
            best: declared.clone(),
            confidence: 0.95,
            candidates: vec![EncodingCandidate {
                name: declared,
                confidence: 0.95,
            }],
        });
    }

    let mut detector = EncodingDetector::new();
    detector.feed(&bytes, true);

    let encoding = detector.guess(None, true);
    let best = encoding.name().to_lowercase();
    let confidence = estimate_confidence(&bytes, encoding);

    let mut candidates = vec![EncodingCandidate {
        name: best.clone(),
        confidence,
    }];

    // Common ambiguities in hand-exported catalogs.
    if best == "utf-8" {
        candidates.push(EncodingCandidate {
            name: "utf-8-sig".into(),
            confidence: (confidence - 0.20).max(0.0),
        });
    } else if best == "windows-1252" {
        candidates.push(EncodingCandidate {
            name: "iso-8859-1".into(),
            confidence: (confidence - 0.03).max(0.0),
        });
    } else if best == "windows-1251" {
        candidates.push(EncodingCandidate {
            name: "koi8-r".into(),
            confidence: (confidence - 0.05).max(0.0),
        });
    }

    Ok(EncodingDetectionResult {
        best,
        confidence,
        candidates,
    })
}

fn estimate_confidence(bytes: &[u8], encoding: &'static Encoding) -> f32 {
    let (_, _, had_errors) = encoding.decode(bytes);

    if had_errors {
        return 0.35;
    }

    let len = bytes.len();
    if len < 64 {
        0.55
    } else if len < 512 {
        0.70
    } else if len < 4096 {
        0.82
    } else {
        0.90
    }
}
