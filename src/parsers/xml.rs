//! Minimal pull reader for the XML subset used by TS catalogs.
//!
//! Handles the prolog, `<!DOCTYPE TS>`, comments, elements with attributes,
//! and text nodes with entity decoding. Every event carries the 1-based
//! line it started on so parse errors point at the offending input.

use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlEvent {
    /// `<?xml ...?>`
    Prolog {
        attrs: Vec<(String, String)>,
        line: usize,
    },
    /// `<!DOCTYPE ...>`
    Doctype { line: usize },
    Start {
        name: String,
        attrs: Vec<(String, String)>,
        self_closing: bool,
        line: usize,
    },
    End { name: String, line: usize },
    /// Raw character data between tags, entities decoded. Whitespace-only
    /// runs are reported too; callers decide whether they are significant.
    Text { text: String, line: usize },
}

pub struct XmlReader<'a> {
    input: &'a [u8],
    src: &'a str,
    pos: usize,
    line: usize,
}

impl<'a> XmlReader<'a> {
    pub fn new(src: &'a str) -> Self {
        XmlReader {
            input: src.as_bytes(),
            src,
            pos: 0,
            line: 1,
        }
    }

    /// Pull the next event; `None` at end of input.
    pub fn next_event(&mut self) -> CoreResult<Option<XmlEvent>> {
        loop {
            if self.pos >= self.input.len() {
                return Ok(None);
            }

            if self.peek() == b'<' {
                if self.starts_with("<!--") {
                    self.skip_comment()?;
                    continue;
                }
                if self.starts_with("<?") {
                    return self.read_prolog().map(Some);
                }
                if self.starts_with("<!") {
                    return self.read_doctype().map(Some);
                }
                if self.starts_with("</") {
                    return self.read_end_tag().map(Some);
                }
                return self.read_start_tag().map(Some);
            }

            return self.read_text().map(Some);
        }
    }

    fn peek(&self) -> u8 {
        self.input[self.pos]
    }

    fn starts_with(&self, pat: &str) -> bool {
        self.src[self.pos..].starts_with(pat)
    }

    fn bump(&mut self) -> u8 {
        let b = self.input[self.pos];
        if b == b'\n' {
            self.line += 1;
        }
        self.pos += 1;
        b
    }

    fn advance(&mut self, n: usize) {
        for _ in 0..n {
            self.bump();
        }
    }

    fn skip_ws(&mut self) {
        while self.pos < self.input.len() && self.peek().is_ascii_whitespace() {
            self.bump();
        }
    }

    fn skip_comment(&mut self) -> CoreResult<()> {
        let start_line = self.line;
        self.advance(4); // "<!--"
        match self.src[self.pos..].find("-->") {
            Some(rel) => {
                self.advance(rel + 3);
                Ok(())
            }
            None => Err(CoreError::parse(start_line, "unterminated comment")),
        }
    }

    fn read_prolog(&mut self) -> CoreResult<XmlEvent> {
        let line = self.line;
        self.advance(2); // "<?"
        // target name ("xml"), then attributes until "?>"
        self.read_name(line)?;
        let attrs = self.read_attrs(line)?;
        self.skip_ws();
        if !self.starts_with("?>") {
            return Err(CoreError::parse(self.line, "malformed xml prolog"));
        }
        self.advance(2);
        Ok(XmlEvent::Prolog { attrs, line })
    }

    fn read_doctype(&mut self) -> CoreResult<XmlEvent> {
        let line = self.line;
        match self.src[self.pos..].find('>') {
            Some(rel) => {
                self.advance(rel + 1);
                Ok(XmlEvent::Doctype { line })
            }
            None => Err(CoreError::parse(line, "unterminated doctype")),
        }
    }

    fn read_end_tag(&mut self) -> CoreResult<XmlEvent> {
        let line = self.line;
        self.advance(2); // "</"
        let name = self.read_name(line)?;
        self.skip_ws();
        if self.pos >= self.input.len() || self.peek() != b'>' {
            return Err(CoreError::parse(line, format!("malformed closing tag </{name}")));
        }
        self.bump();
        Ok(XmlEvent::End { name, line })
    }

    fn read_start_tag(&mut self) -> CoreResult<XmlEvent> {
        let line = self.line;
        self.bump(); // '<'
        let name = self.read_name(line)?;
        let attrs = self.read_attrs(line)?;
        self.skip_ws();

        let self_closing = if self.starts_with("/>") {
            self.advance(2);
            true
        } else if self.pos < self.input.len() && self.peek() == b'>' {
            self.bump();
            false
        } else {
            return Err(CoreError::parse(line, format!("unterminated tag <{name}")));
        };

        Ok(XmlEvent::Start {
            name,
            attrs,
            self_closing,
            line,
        })
    }

    fn read_name(&mut self, line: usize) -> CoreResult<String> {
        self.skip_ws();
        let start = self.pos;
        while self.pos < self.input.len() {
            let b = self.peek();
            if b.is_ascii_alphanumeric() || b == b'_' || b == b'-' || b == b':' || b == b'.' {
                self.bump();
            } else {
                break;
            }
        }
        if self.pos == start {
            return Err(CoreError::parse(line, "expected a name"));
        }
        Ok(self.src[start..self.pos].to_string())
    }

    fn read_attrs(&mut self, line: usize) -> CoreResult<Vec<(String, String)>> {
        let mut attrs = Vec::new();
        loop {
            self.skip_ws();
            if self.pos >= self.input.len() {
                return Err(CoreError::parse(line, "unterminated tag"));
            }
            let b = self.peek();
            if b == b'>' || b == b'/' || b == b'?' {
                return Ok(attrs);
            }

            let name = self.read_name(self.line)?;
            self.skip_ws();
            if self.pos >= self.input.len() || self.peek() != b'=' {
                return Err(CoreError::parse(self.line, format!("attribute {name} without value")));
            }
            self.bump(); // '='
            self.skip_ws();

            let quote = if self.pos < self.input.len() { self.peek() } else { 0 };
            if quote != b'"' && quote != b'\'' {
                return Err(CoreError::parse(self.line, format!("unquoted value for {name}")));
            }
            self.bump();

            let start = self.pos;
            while self.pos < self.input.len() && self.peek() != quote {
                self.bump();
            }
            if self.pos >= self.input.len() {
                return Err(CoreError::parse(line, format!("unterminated value for {name}")));
            }
            let raw = &self.src[start..self.pos];
            self.bump(); // closing quote

            attrs.push((name, decode_entities(raw, line)?));
        }
    }

    fn read_text(&mut self) -> CoreResult<XmlEvent> {
        let line = self.line;
        let start = self.pos;
        while self.pos < self.input.len() && self.peek() != b'<' {
            self.bump();
        }
        let raw = &self.src[start..self.pos];
        Ok(XmlEvent::Text {
            text: decode_entities(raw, line)?,
            line,
        })
    }
}

/// Decode the five predefined entities plus numeric character references.
fn decode_entities(raw: &str, line: usize) -> CoreResult<String> {
    if !raw.contains('&') {
        return Ok(raw.to_string());
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let semi = rest
            .find(';')
            .ok_or_else(|| CoreError::parse(line, "unterminated entity"))?;
        let entity = &rest[1..semi];
        match entity {
            "amp" => out.push('&'),
            "lt" => out.push('<'),
            "gt" => out.push('>'),
            "quot" => out.push('"'),
            "apos" => out.push('\''),
            _ => {
                let code = entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .map(|hex| u32::from_str_radix(hex, 16))
                    .or_else(|| entity.strip_prefix('#').map(|dec| dec.parse::<u32>()))
                    .ok_or_else(|| {
                        CoreError::parse(line, format!("unknown entity &{entity};"))
                    })?
                    .map_err(|_| CoreError::parse(line, format!("bad character reference &{entity};")))?;
                let ch = char::from_u32(code).ok_or_else(|| {
                    CoreError::parse(line, format!("invalid character reference &{entity};"))
                })?;
                out.push(ch);
            }
        }
        rest = &rest[semi + 1..];
    }
    out.push_str(rest);
    Ok(out)
}
