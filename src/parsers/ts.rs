//! Reader for Qt Linguist TS catalogs, built on [`crate::parsers::xml`].
//!
//! Accepts both header shapes found in the wild: the bare
//! `commonstrings_*.ts` form and the `<!DOCTYPE TS>` form of `regions.ts` /
//! `collations.ts`. Indentation style (spaces vs tabs) is irrelevant.

use tracing::warn;

use crate::error::{CoreError, CoreResult};
use crate::model::catalog::{Catalog, LengthVariant, Message, Translation, TsContext};
use crate::parsers::xml::{XmlEvent, XmlReader};

pub fn parse(text: &str) -> CoreResult<Catalog> {
    let mut reader = XmlReader::new(text);
    let mut has_doctype = false;

    // Skip leading prolog/doctype/whitespace until the TS root.
    let root = loop {
        match reader.next_event()? {
            None => return Err(CoreError::parse(1, "empty document")),
            Some(XmlEvent::Prolog { .. }) => {}
            Some(XmlEvent::Doctype { .. }) => has_doctype = true,
            Some(XmlEvent::Text { text, line }) => {
                if !text.trim().is_empty() {
                    return Err(CoreError::parse(line, "text before root element"));
                }
            }
            Some(XmlEvent::Start { name, attrs, self_closing, line }) => {
                if name != "TS" {
                    return Err(CoreError::parse(line, format!("expected <TS>, found <{name}>")));
                }
                if self_closing {
                    return Err(CoreError::parse(line, "empty <TS/> root"));
                }
                break (attrs, line);
            }
            Some(other) => {
                return Err(CoreError::parse(event_line(&other), "unexpected content before <TS>"));
            }
        }
    };

    let (root_attrs, root_line) = root;
    let mut catalog = Catalog {
        version: attr(&root_attrs, "version").unwrap_or("1.0").to_string(),
        language: attr(&root_attrs, "language").unwrap_or("").to_string(),
        source_language: attr(&root_attrs, "sourcelanguage").map(str::to_string),
        has_doctype,
        contexts: Vec::new(),
    };

    // TS children: context elements until </TS>.
    loop {
        match reader.next_event()? {
            None => return Err(CoreError::parse(root_line, "unclosed <TS>")),
            Some(XmlEvent::Text { text, line }) => {
                if !text.trim().is_empty() {
                    return Err(CoreError::parse(line, "stray text inside <TS>"));
                }
            }
            Some(XmlEvent::End { name, line }) => {
                if name == "TS" {
                    return Ok(catalog);
                }
                return Err(CoreError::parse(line, format!("unexpected </{name}>")));
            }
            Some(XmlEvent::Start { name, self_closing, line, .. }) => {
                if name == "context" {
                    if self_closing {
                        continue;
                    }
                    catalog.contexts.push(read_context(&mut reader, line)?);
                } else {
                    warn!(element = %name, line, "skipping unknown element inside <TS>");
                    if !self_closing {
                        skip_element(&mut reader, &name, line)?;
                    }
                }
            }
            Some(other) => {
                return Err(CoreError::parse(event_line(&other), "unexpected content inside <TS>"));
            }
        }
    }
}

fn read_context(reader: &mut XmlReader<'_>, ctx_line: usize) -> CoreResult<TsContext> {
    let mut context = TsContext {
        name: String::new(),
        messages: Vec::new(),
    };

    loop {
        match reader.next_event()? {
            None => return Err(CoreError::parse(ctx_line, "unclosed <context>")),
            Some(XmlEvent::Text { text, line }) => {
                if !text.trim().is_empty() {
                    return Err(CoreError::parse(line, "stray text inside <context>"));
                }
            }
            Some(XmlEvent::End { name, line }) => {
                if name == "context" {
                    return Ok(context);
                }
                return Err(CoreError::parse(line, format!("unexpected </{name}>")));
            }
            Some(XmlEvent::Start { name, attrs, self_closing, line }) => match name.as_str() {
                "name" => {
                    context.name = if self_closing {
                        String::new()
                    } else {
                        read_text_content(reader, "name", line)?
                    };
                }
                "message" => {
                    if self_closing {
                        return Err(CoreError::parse(line, "empty <message/>"));
                    }
                    context.messages.push(read_message(reader, &attrs, line)?);
                }
                _ => {
                    warn!(element = %name, line, "skipping unknown element inside <context>");
                    if !self_closing {
                        skip_element(reader, &name, line)?;
                    }
                }
            },
            Some(other) => {
                return Err(CoreError::parse(event_line(&other), "unexpected content inside <context>"));
            }
        }
    }
}

fn read_message(
    reader: &mut XmlReader<'_>,
    attrs: &[(String, String)],
    msg_line: usize,
) -> CoreResult<Message> {
    let id = attr(attrs, "id")
        .ok_or_else(|| CoreError::parse(msg_line, "<message> without id"))?
        .to_string();
    let numerus = match attr(attrs, "numerus") {
        None | Some("no") => false,
        Some("yes") => true,
        Some(other) => {
            return Err(CoreError::parse(msg_line, format!("bad numerus value {other:?}")));
        }
    };

    let mut source: Option<String> = None;
    let mut translation: Option<Translation> = None;

    loop {
        match reader.next_event()? {
            None => return Err(CoreError::parse(msg_line, "unclosed <message>")),
            Some(XmlEvent::Text { text, line }) => {
                if !text.trim().is_empty() {
                    return Err(CoreError::parse(line, "stray text inside <message>"));
                }
            }
            Some(XmlEvent::End { name, line }) => {
                if name != "message" {
                    return Err(CoreError::parse(line, format!("unexpected </{name}>")));
                }
                let translation = translation.ok_or_else(|| {
                    CoreError::parse(msg_line, format!("message {id:?} has no <translation>"))
                })?;
                return Ok(Message {
                    id,
                    numerus,
                    source: source.unwrap_or_default(),
                    translation,
                    line: msg_line,
                });
            }
            Some(XmlEvent::Start { name, attrs, self_closing, line }) => match name.as_str() {
                "source" => {
                    let text = if self_closing {
                        String::new()
                    } else {
                        read_text_content(reader, "source", line)?
                    };
                    if source.replace(text).is_some() {
                        return Err(CoreError::parse(line, format!("message {id:?} has two <source> elements")));
                    }
                }
                "translation" => {
                    let t = read_translation(reader, &attrs, self_closing, line)?;
                    if translation.replace(t).is_some() {
                        return Err(CoreError::parse(line, format!("message {id:?} has two <translation> elements")));
                    }
                }
                _ => {
                    warn!(element = %name, line, "skipping unknown element inside <message>");
                    if !self_closing {
                        skip_element(reader, &name, line)?;
                    }
                }
            },
            Some(other) => {
                return Err(CoreError::parse(event_line(&other), "unexpected content inside <message>"));
            }
        }
    }
}

fn read_translation(
    reader: &mut XmlReader<'_>,
    attrs: &[(String, String)],
    self_closing: bool,
    tr_line: usize,
) -> CoreResult<Translation> {
    let has_variants = match attr(attrs, "variants") {
        Some("yes") => true,
        None | Some("no") => false,
        Some(other) => {
            return Err(CoreError::parse(tr_line, format!("bad variants value {other:?}")));
        }
    };

    if self_closing {
        return if has_variants {
            Ok(Translation::Variants(Vec::new()))
        } else {
            Ok(Translation::Single(String::new()))
        };
    }

    if !has_variants {
        return Ok(Translation::Single(read_text_content(reader, "translation", tr_line)?));
    }

    let mut variants = Vec::new();
    loop {
        match reader.next_event()? {
            None => return Err(CoreError::parse(tr_line, "unclosed <translation>")),
            Some(XmlEvent::Text { text, line }) => {
                if !text.trim().is_empty() {
                    return Err(CoreError::parse(line, "stray text inside variant translation"));
                }
            }
            Some(XmlEvent::End { name, line }) => {
                if name == "translation" {
                    return Ok(Translation::Variants(variants));
                }
                return Err(CoreError::parse(line, format!("unexpected </{name}>")));
            }
            Some(XmlEvent::Start { name, attrs, self_closing, line }) => {
                if name != "lengthvariant" {
                    warn!(element = %name, line, "skipping unknown element inside <translation>");
                    if !self_closing {
                        skip_element(reader, &name, line)?;
                    }
                    continue;
                }
                let priority: u32 = attr(&attrs, "priority")
                    .ok_or_else(|| CoreError::parse(line, "lengthvariant without priority"))?
                    .parse()
                    .map_err(|_| CoreError::parse(line, "lengthvariant priority is not a number"))?;
                let text = if self_closing {
                    String::new()
                } else {
                    read_text_content(reader, "lengthvariant", line)?
                };
                variants.push(LengthVariant { priority, text });
            }
            Some(other) => {
                return Err(CoreError::parse(event_line(&other), "unexpected content inside <translation>"));
            }
        }
    }
}

/// Consume text up to the matching end tag of a leaf element.
fn read_text_content(reader: &mut XmlReader<'_>, element: &str, start_line: usize) -> CoreResult<String> {
    let mut out = String::new();
    loop {
        match reader.next_event()? {
            None => return Err(CoreError::parse(start_line, format!("unclosed <{element}>"))),
            Some(XmlEvent::Text { text, .. }) => out.push_str(&text),
            Some(XmlEvent::End { name, line }) => {
                if name == element {
                    return Ok(out);
                }
                return Err(CoreError::parse(line, format!("unexpected </{name}>")));
            }
            Some(XmlEvent::Start { name, line, .. }) => {
                return Err(CoreError::parse(line, format!("unexpected <{name}> inside <{element}>")));
            }
            Some(other) => {
                return Err(CoreError::parse(event_line(&other), format!("unexpected content inside <{element}>")));
            }
        }
    }
}

/// Skip an unknown element and everything nested in it.
fn skip_element(reader: &mut XmlReader<'_>, element: &str, start_line: usize) -> CoreResult<()> {
    let mut depth = 1usize;
    loop {
        match reader.next_event()? {
            None => return Err(CoreError::parse(start_line, format!("unclosed <{element}>"))),
            Some(XmlEvent::Start { self_closing: false, .. }) => depth += 1,
            Some(XmlEvent::End { .. }) => {
                depth -= 1;
                if depth == 0 {
                    return Ok(());
                }
            }
            Some(_) => {}
        }
    }
}

fn attr<'a>(attrs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, v)| v.as_str())
}

fn event_line(ev: &XmlEvent) -> usize {
    match ev {
        XmlEvent::Prolog { line, .. }
        | XmlEvent::Doctype { line }
        | XmlEvent::Start { line, .. }
        | XmlEvent::End { line, .. }
        | XmlEvent::Text { line, .. } => *line,
    }
}
