//! A small HTML document model: just enough DOM to find asset references,
//! rewrite their attributes, and serialize the result.
//!
//! The parser is tolerant by construction. It never rejects input: unknown
//! markup, stray `<` characters, unmatched close tags, and truncated
//! documents all degrade into text or implicit closes instead of errors.
//! Tag and attribute names are lowercased; attribute values, text, comments,
//! and raw `<script>`/`<style>` bodies keep their original bytes, except
//! that character entities inside attribute values are decoded on parse.

/// Index of a node in the document arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
enum NodeData {
    Document,
    Doctype(String),
    Element(Element),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone)]
struct Element {
    tag: String,
    attrs: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
struct Node {
    children: Vec<NodeId>,
    data: NodeData,
}

/// A parsed HTML document backed by a node arena.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Document {
    /// Parses `html` into a document tree. Total: every input produces a
    /// tree, however malformed.
    pub fn parse(html: &str) -> Document {
        let mut doc = Document {
            nodes: vec![Node {
                children: Vec::new(),
                data: NodeData::Document,
            }],
            root: NodeId(0),
        };
        let mut stack: Vec<NodeId> = vec![doc.root];
        let bytes = html.as_bytes();
        let mut i = 0;

        while i < bytes.len() {
            let parent = stack.last().copied().unwrap_or(doc.root);
            if bytes[i] == b'<' && opens_markup(html, i) {
                if html[i..].starts_with("<!--") {
                    let (body_end, next) = match find_from(html, i + 4, "-->") {
                        Some(at) => (at, at + 3),
                        None => (html.len(), html.len()),
                    };
                    doc.append(parent, NodeData::Comment(html[i + 4..body_end].to_string()));
                    i = next;
                    continue;
                }
                if bytes[i + 1] == b'!' || bytes[i + 1] == b'?' {
                    let (inner_end, next) = match find_byte(bytes, i + 1, b'>') {
                        Some(at) => (at, at + 1),
                        None => (bytes.len(), bytes.len()),
                    };
                    doc.append(parent, NodeData::Doctype(html[i + 1..inner_end].to_string()));
                    i = next;
                    continue;
                }
                if bytes[i + 1] == b'/' {
                    let (tag, next) = scan_end_tag(html, i);
                    if let Some(pos) = stack
                        .iter()
                        .rposition(|id| doc.tag(*id) == Some(tag.as_str()))
                    {
                        // Close the matching element and everything opened
                        // inside it. The document root is never popped.
                        if pos > 0 {
                            stack.truncate(pos);
                        }
                    }
                    i = next;
                    continue;
                }
                if let Some(start) = scan_start_tag(html, i) {
                    let node = doc.append(
                        parent,
                        NodeData::Element(Element {
                            tag: start.tag.clone(),
                            attrs: start.attrs,
                        }),
                    );
                    i = start.next;
                    if !start.self_closing && is_rawtext_tag(&start.tag) {
                        let (body_end, next) = match find_rawtext_close(html, i, &start.tag) {
                            Some((at, after)) => (at, after),
                            None => (html.len(), html.len()),
                        };
                        if body_end > i {
                            doc.append(node, NodeData::Text(html[i..body_end].to_string()));
                        }
                        i = next;
                    } else if !start.self_closing && !is_void_tag(&start.tag) {
                        stack.push(node);
                    }
                    continue;
                }
            }

            // Text run: consume at least one byte, then everything up to the
            // next markup-opening '<'.
            let run_start = i;
            i += 1;
            while i < bytes.len() && !(bytes[i] == b'<' && opens_markup(html, i)) {
                i += 1;
            }
            doc.append(parent, NodeData::Text(html[run_start..i].to_string()));
        }

        doc
    }

    /// Serializes the document back to markup.
    ///
    /// The output is the root element's markup: a doctype and whitespace-only
    /// text between top-level nodes are not part of it. Everything inside the
    /// root element round-trips byte for byte unless an attribute was parsed
    /// through entity decoding or rewritten.
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        for child in &self.nodes[self.root.0].children {
            match &self.nodes[child.0].data {
                NodeData::Doctype(_) => {}
                NodeData::Text(text) if text.trim().is_empty() => {}
                _ => self.write_node(*child, &mut out),
            }
        }
        out
    }

    /// All elements in document order (preorder).
    pub fn elements(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_elements(self.root, &mut out);
        out
    }

    /// Lowercased tag name, for element nodes.
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|el| el.tag.as_str())
    }

    /// Value of attribute `name`, decoded, if the element carries it.
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?
            .attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value.as_str())
    }

    /// Sets attribute `name` to `value`, keeping its position when present
    /// and appending it otherwise. Non-element ids are ignored.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(el) = self.element_mut(id) {
            if let Some(pair) = el.attrs.iter_mut().find(|(n, _)| n == name) {
                pair.1 = value.to_string();
            } else {
                el.attrs.push((name.to_string(), value.to_string()));
            }
        }
    }

    fn append(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            children: Vec::new(),
            data,
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.nodes[id.0].data {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[id.0].data {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    fn collect_elements(&self, id: NodeId, out: &mut Vec<NodeId>) {
        if matches!(self.nodes[id.0].data, NodeData::Element(_)) {
            out.push(id);
        }
        for child in &self.nodes[id.0].children {
            self.collect_elements(*child, out);
        }
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        match &self.nodes[id.0].data {
            NodeData::Document => {
                for child in &self.nodes[id.0].children {
                    self.write_node(*child, out);
                }
            }
            NodeData::Doctype(raw) => {
                out.push('<');
                out.push_str(raw);
                out.push('>');
            }
            NodeData::Text(text) => out.push_str(text),
            NodeData::Comment(text) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
            NodeData::Element(el) => {
                out.push('<');
                out.push_str(&el.tag);
                for (name, value) in &el.attrs {
                    out.push(' ');
                    out.push_str(name);
                    if !value.is_empty() {
                        out.push_str("=\"");
                        if value.contains('"') {
                            out.push_str(&value.replace('"', "&quot;"));
                        } else {
                            out.push_str(value);
                        }
                        out.push('"');
                    }
                }
                out.push('>');
                if is_void_tag(&el.tag) {
                    return;
                }
                for child in &self.nodes[id.0].children {
                    self.write_node(*child, out);
                }
                out.push_str("</");
                out.push_str(&el.tag);
                out.push('>');
            }
        }
    }
}

struct StartTag {
    tag: String,
    attrs: Vec<(String, String)>,
    self_closing: bool,
    next: usize,
}

/// Whether the `<` at `at` begins markup rather than literal text.
fn opens_markup(html: &str, at: usize) -> bool {
    let bytes = html.as_bytes();
    match bytes.get(at + 1).copied() {
        Some(b) if b.is_ascii_alphabetic() => true,
        Some(b'/') => bytes
            .get(at + 2)
            .copied()
            .is_some_and(|b| b.is_ascii_alphabetic()),
        Some(b'!') | Some(b'?') => true,
        _ => false,
    }
}

fn scan_start_tag(html: &str, at: usize) -> Option<StartTag> {
    let bytes = html.as_bytes();
    let mut i = at + 1;
    let tag_start = i;
    while i < bytes.len() && is_tag_byte(bytes[i]) {
        i += 1;
    }
    let tag = html[tag_start..i].to_ascii_lowercase();
    let mut attrs: Vec<(String, String)> = Vec::new();
    let mut self_closing = false;
    loop {
        skip_whitespace(bytes, &mut i);
        if i >= bytes.len() {
            // Unterminated tag at end of input: give up and let the caller
            // treat the '<' as text.
            return None;
        }
        match bytes[i] {
            b'>' => {
                i += 1;
                break;
            }
            b'/' if bytes.get(i + 1) == Some(&b'>') => {
                self_closing = true;
                i += 2;
                break;
            }
            b'/' => {
                i += 1;
            }
            _ => {
                let name_start = i;
                while i < bytes.len() && is_attr_name_byte(bytes[i]) {
                    i += 1;
                }
                if i == name_start {
                    i += 1;
                    continue;
                }
                let name = html[name_start..i].to_ascii_lowercase();
                skip_whitespace(bytes, &mut i);
                let value = if bytes.get(i) == Some(&b'=') {
                    i += 1;
                    skip_whitespace(bytes, &mut i);
                    scan_attr_value(html, &mut i)?
                } else {
                    String::new()
                };
                // First occurrence of a repeated attribute wins.
                if !attrs.iter().any(|(existing, _)| *existing == name) {
                    attrs.push((name, decode_attr_entities(&value)));
                }
            }
        }
    }
    Some(StartTag {
        tag,
        attrs,
        self_closing,
        next: i,
    })
}

fn scan_attr_value(html: &str, i: &mut usize) -> Option<String> {
    let bytes = html.as_bytes();
    match bytes.get(*i).copied() {
        Some(quote @ (b'"' | b'\'')) => {
            let start = *i + 1;
            let mut j = start;
            while j < bytes.len() && bytes[j] != quote {
                j += 1;
            }
            if j >= bytes.len() {
                return None;
            }
            *i = j + 1;
            Some(html[start..j].to_string())
        }
        _ => {
            let start = *i;
            let mut j = *i;
            while j < bytes.len() && !bytes[j].is_ascii_whitespace() && bytes[j] != b'>' {
                j += 1;
            }
            *i = j;
            Some(html[start..j].to_string())
        }
    }
}

fn scan_end_tag(html: &str, at: usize) -> (String, usize) {
    let bytes = html.as_bytes();
    let mut i = at + 2;
    let tag_start = i;
    while i < bytes.len() && is_tag_byte(bytes[i]) {
        i += 1;
    }
    let tag = html[tag_start..i].to_ascii_lowercase();
    while i < bytes.len() && bytes[i] != b'>' {
        i += 1;
    }
    let next = if i < bytes.len() { i + 1 } else { i };
    (tag, next)
}

/// Finds the closing tag of a raw-text element, scanning case-insensitively.
/// Returns the body end and the position just past the close tag.
fn find_rawtext_close(html: &str, from: usize, tag: &str) -> Option<(usize, usize)> {
    let bytes = html.as_bytes();
    let mut i = from;
    while i + tag.len() + 2 <= bytes.len() {
        if bytes[i] == b'<'
            && bytes[i + 1] == b'/'
            && bytes[i + 2..i + 2 + tag.len()].eq_ignore_ascii_case(tag.as_bytes())
        {
            let after = bytes.get(i + 2 + tag.len()).copied();
            let delimited = match after {
                None | Some(b'>') | Some(b'/') => true,
                Some(b) => b.is_ascii_whitespace(),
            };
            if delimited {
                let mut j = i + 2 + tag.len();
                while j < bytes.len() && bytes[j] != b'>' {
                    j += 1;
                }
                let next = if j < bytes.len() { j + 1 } else { j };
                return Some((i, next));
            }
        }
        i += 1;
    }
    None
}

fn decode_attr_entities(src: &str) -> String {
    if !src.contains('&') {
        return src.to_string();
    }
    let mut out = String::with_capacity(src.len());
    let mut rest = src;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        match decode_entity(rest) {
            Some((decoded, len)) => {
                out.push(decoded);
                rest = &rest[len..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Decodes one entity at the start of `src` (which begins with `&`).
/// Unknown or unterminated entities are left to the caller as literal text.
fn decode_entity(src: &str) -> Option<(char, usize)> {
    let semi = src.find(';').filter(|at| *at <= 32)?;
    let body = &src[1..semi];
    let decoded = match body {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        _ => {
            let code = if let Some(hex) = body.strip_prefix("#x").or_else(|| body.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()?
            } else if let Some(dec) = body.strip_prefix('#') {
                dec.parse::<u32>().ok()?
            } else {
                return None;
            };
            char::from_u32(code)?
        }
    };
    Some((decoded, semi + 1))
}

fn is_tag_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b':'
}

fn is_attr_name_byte(b: u8) -> bool {
    !b.is_ascii_whitespace() && !matches!(b, b'=' | b'>' | b'/')
}

fn is_rawtext_tag(tag: &str) -> bool {
    tag == "script" || tag == "style"
}

fn is_void_tag(tag: &str) -> bool {
    matches!(
        tag,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

fn skip_whitespace(bytes: &[u8], i: &mut usize) {
    while *i < bytes.len() && bytes[*i].is_ascii_whitespace() {
        *i += 1;
    }
}

fn find_from(haystack: &str, from: usize, needle: &str) -> Option<usize> {
    haystack[from..].find(needle).map(|at| from + at)
}

fn find_byte(bytes: &[u8], from: usize, needle: u8) -> Option<usize> {
    bytes[from..]
        .iter()
        .position(|b| *b == needle)
        .map(|at| from + at)
}
