//! HTML fragment parser.
//!
//! Uses quick-xml's streaming reader in a lenient configuration: end tags
//! need not match, stray end tags are ignored and attributes may be
//! unquoted or valueless.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use quick_xml::escape::{resolve_html5_entity, unescape_with};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::warn;

use crate::constants::{is_void_element, MAX_PARSE_DEPTH};
use crate::error::{Error, Result};
use crate::node::{Element, Node};

/// Parser producing a single-rooted [`Node`] tree from HTML markup.
#[derive(Debug, Clone)]
pub struct HtmlParser {
    max_depth: usize,
}

impl Default for HtmlParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Elements still waiting for their end tag, plus finished top-level nodes.
struct TreeBuilder {
    open: Vec<Element>,
    top_level: Vec<Node>,
    text: String,
}

impl TreeBuilder {
    fn new() -> Self {
        TreeBuilder {
            open: Vec::new(),
            top_level: Vec::new(),
            text: String::new(),
        }
    }

    fn attach(&mut self, node: Node) {
        match self.open.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.top_level.push(node),
        }
    }

    /// Emits the pending text run, unless it is only whitespace.
    fn flush_text(&mut self) {
        if self.text.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.text);
        if !text.trim().is_empty() {
            self.attach(Node::Text(text));
        }
    }

    fn close_top(&mut self) {
        if let Some(element) = self.open.pop() {
            self.attach(Node::Element(element));
        }
    }

    /// Closes the innermost open element named `name` and everything opened
    /// inside it. Unknown end tags are ignored.
    fn close(&mut self, name: &str) {
        if let Some(position) = self.open.iter().rposition(|e| e.tag_name == name) {
            while self.open.len() > position {
                self.close_top();
            }
        }
    }

    fn finish(mut self) -> Vec<Node> {
        self.flush_text();
        while !self.open.is_empty() {
            self.close_top();
        }
        self.top_level
    }
}

impl HtmlParser {
    /// Creates a parser with the default nesting limit.
    pub fn new() -> Self {
        HtmlParser {
            max_depth: MAX_PARSE_DEPTH,
        }
    }

    /// Sets the maximum element nesting accepted.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Parses a fragment from a string.
    pub fn parse_str(&self, html: &str) -> Result<Node> {
        let mut reader = Reader::from_str(html);
        self.parse_reader(&mut reader)
    }

    /// Parses a fragment from a file.
    pub fn parse_file<P: AsRef<Path>>(&self, path: P) -> Result<Node> {
        let file = File::open(path)?;
        let mut reader = Reader::from_reader(BufReader::new(file));
        self.parse_reader(&mut reader)
    }

    fn parse_reader<R: BufRead>(&self, reader: &mut Reader<R>) -> Result<Node> {
        let config = reader.config_mut();
        config.trim_text_start = false;
        config.trim_text_end = false;
        config.check_end_names = false;
        config.allow_unmatched_ends = true;
        config.allow_dangling_amp = true;

        let mut builder = TreeBuilder::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(ref e) => {
                    builder.flush_text();
                    let element = parse_element(e, reader)?;
                    if is_void_element(&element.tag_name) {
                        builder.attach(Node::Element(element));
                    } else {
                        if builder.open.len() >= self.max_depth {
                            return Err(Error::DepthLimit(self.max_depth));
                        }
                        builder.open.push(element);
                    }
                }
                Event::Empty(ref e) => {
                    builder.flush_text();
                    let element = parse_element(e, reader)?;
                    builder.attach(Node::Element(element));
                }
                Event::End(ref e) => {
                    builder.flush_text();
                    let name = decode_name(e.name().as_ref(), reader)?;
                    builder.close(&name);
                }
                Event::Text(ref e) => {
                    let raw = std::str::from_utf8(e.as_ref()).map_err(|e| Error::Parse(e.to_string()))?;
                    builder.text.push_str(raw);
                }
                Event::GeneralRef(ref e) => {
                    let name = e.decode().map_err(|e| Error::Parse(e.to_string()))?;
                    push_reference(&mut builder.text, &name);
                }
                Event::CData(ref e) => {
                    builder.text.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
                Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
                Event::Eof => break,
            }
            buf.clear();
        }

        let mut nodes = builder.finish().into_iter();
        let root = nodes
            .next()
            .ok_or_else(|| Error::Parse("fragment contains no element or text".to_string()))?;
        let dropped = nodes.count();
        if dropped > 0 {
            warn!(dropped, "ignoring top-level nodes after the first");
        }
        Ok(root)
    }
}

fn decode_name<R>(raw: &[u8], reader: &Reader<R>) -> Result<String> {
    let name = reader
        .decoder()
        .decode(raw)
        .map_err(|e| Error::Parse(e.to_string()))?;
    Ok(name.to_ascii_lowercase())
}

/// Reads an element's name and attributes. Names are lowercased.
fn parse_element<R>(e: &BytesStart, reader: &Reader<R>) -> Result<Element> {
    let mut element = Element::new(decode_name(e.name().as_ref(), reader)?);

    for attr in e.html_attributes() {
        let attr = attr.map_err(|e| Error::Parse(format!("attribute error: {e}")))?;
        let key = decode_name(attr.key.as_ref(), reader)?;
        let raw = reader
            .decoder()
            .decode(&attr.value)
            .map_err(|e| Error::Parse(e.to_string()))?;
        // A stray `&` keeps the value as written.
        let value = match unescape_with(&raw, resolve_html5_entity) {
            Ok(value) => value.into_owned(),
            Err(_) => raw.to_string(),
        };
        element.attributes.insert(key, value);
    }

    Ok(element)
}

/// Appends the text an entity or character reference stands for. Unknown
/// references are kept as written.
fn push_reference(text: &mut String, name: &str) {
    if let Some(number) = name.strip_prefix('#') {
        if let Some(c) = resolve_char_ref(number) {
            text.push(c);
            return;
        }
    } else if let Some(resolved) = resolve_html5_entity(name) {
        text.push_str(resolved);
        return;
    }
    text.push('&');
    text.push_str(name);
    text.push(';');
}

/// Decimal (`65`) or hexadecimal (`x41`) code point.
fn resolve_char_ref(number: &str) -> Option<char> {
    let code = match number.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => number.parse().ok()?,
    };
    char::from_u32(code).filter(|&c| c != '\0')
}

/// Parses a fragment from a string with the default parser.
pub fn parse_str(html: &str) -> Result<Node> {
    HtmlParser::new().parse_str(html)
}

/// Parses a fragment from a file with the default parser.
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Node> {
    HtmlParser::new().parse_file(path)
}
