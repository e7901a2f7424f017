//! Order-preserving XML tree used for every part of the document package.
//!
//! Names are kept as qualified names (`w:p`, `m:oMath`) exactly as they
//! appear in the source. Attribute order and child order survive a
//! read/write cycle, which is what keeps untouched markup stable.

use crate::error::{Error, Result};
use quick_xml::events::{BytesCData, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

fn xml_err<E: std::fmt::Display>(err: E) -> Error {
    Error::Xml(err.to_string())
}

/// A node in the XML tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    /// Element node
    Element(XmlElement),
    /// Unescaped character data
    Text(String),
    /// CDATA section content
    CData(String),
    /// Comment content (raw)
    Comment(String),
    /// Processing instruction content (raw, without `<?` / `?>`)
    ProcessingInstruction(String),
}

impl XmlNode {
    /// Borrow the element if this node is one.
    pub fn as_element(&self) -> Option<&XmlElement> {
        match self {
            XmlNode::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Whether this node is insignificant whitespace.
    pub fn is_whitespace(&self) -> bool {
        matches!(self, XmlNode::Text(t) if t.trim().is_empty())
    }
}

/// An XML element with ordered attributes and children.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlElement {
    /// Qualified element name
    pub name: String,
    /// Attributes in source order (unescaped values)
    pub attributes: Vec<(String, String)>,
    /// Child nodes in source order
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    /// Create an empty element.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder: add an attribute.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    /// Builder: add a child element.
    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(XmlNode::Element(child));
        self
    }

    /// Builder: add a text node.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(XmlNode::Text(text.into()));
        self
    }

    /// Local part of the name (after the prefix).
    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }

    /// Get an attribute value.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute value. Returns `true` if the stored value changed.
    pub fn set_attr(&mut self, key: &str, value: impl Into<String>) -> bool {
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) if *v == value => false,
            Some((_, v)) => {
                *v = value;
                true
            }
            None => {
                self.attributes.push((key.to_string(), value));
                true
            }
        }
    }

    /// Remove an attribute. Returns `true` if it was present.
    pub fn remove_attr(&mut self, key: &str) -> bool {
        let before = self.attributes.len();
        self.attributes.retain(|(k, _)| k != key);
        before != self.attributes.len()
    }

    /// Iterate over child elements.
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(XmlNode::as_element)
    }

    /// Iterate mutably over child elements.
    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut XmlElement> {
        self.children.iter_mut().filter_map(|n| match n {
            XmlNode::Element(el) => Some(el),
            _ => None,
        })
    }

    /// First child element with the given name.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.elements().find(|e| e.name == name)
    }

    /// First child element with the given name, mutably.
    pub fn child_mut(&mut self, name: &str) -> Option<&mut XmlElement> {
        self.elements_mut().find(|e| e.name == name)
    }

    /// All child elements with the given name.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.elements().filter(move |e| e.name == name)
    }

    /// Depth-first search for the first descendant with the given name.
    pub fn find(&self, name: &str) -> Option<&XmlElement> {
        for el in self.elements() {
            if el.name == name {
                return Some(el);
            }
            if let Some(found) = el.find(name) {
                return Some(found);
            }
        }
        None
    }

    /// Depth-first search for the first descendant with the given name, mutably.
    pub fn find_mut(&mut self, name: &str) -> Option<&mut XmlElement> {
        for el in self.elements_mut() {
            if el.name == name {
                return Some(el);
            }
            if let Some(found) = el.find_mut(name) {
                return Some(found);
            }
        }
        None
    }

    /// Whether any descendant has the given name.
    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Append a child element.
    pub fn push(&mut self, child: XmlElement) {
        self.children.push(XmlNode::Element(child));
    }

    /// Get the child with `name`, inserting it at its schema position if missing.
    ///
    /// `order` lists sibling names in the order the schema requires; names
    /// not in `order` are treated as coming after every listed name.
    pub fn ensure_child(&mut self, name: &str, order: &[&str]) -> &mut XmlElement {
        let pos = match self.children.iter().position(
            |n| matches!(n, XmlNode::Element(e) if e.name == name),
        ) {
            Some(pos) => pos,
            None => {
                let rank = |n: &str| order.iter().position(|o| *o == n).unwrap_or(usize::MAX);
                let target = rank(name);
                let insert_at = self
                    .children
                    .iter()
                    .position(|n| matches!(n, XmlNode::Element(e) if rank(&e.name) > target))
                    .unwrap_or(self.children.len());
                self.children
                    .insert(insert_at, XmlNode::Element(XmlElement::new(name)));
                insert_at
            }
        };
        match &mut self.children[pos] {
            XmlNode::Element(el) => el,
            _ => unreachable!("position points at an element"),
        }
    }

    /// Remove every child element with the given name. Returns the count removed.
    pub fn remove_children(&mut self, name: &str) -> usize {
        let before = self.children.len();
        self.children
            .retain(|n| !matches!(n, XmlNode::Element(e) if e.name == name));
        before - self.children.len()
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    /// Parse a standalone element from a string.
    pub fn parse(xml: &str) -> Result<XmlElement> {
        Ok(XmlDocument::parse(xml.as_bytes())?.root)
    }

    /// Serialize this element (without declaration).
    pub fn to_xml_string(&self) -> Result<String> {
        let mut writer = Writer::new(Vec::new());
        write_element(&mut writer, self)?;
        String::from_utf8(writer.into_inner()).map_err(xml_err)
    }
}

fn collect_text(el: &XmlElement, out: &mut String) {
    for child in &el.children {
        match child {
            XmlNode::Text(t) | XmlNode::CData(t) => out.push_str(t),
            XmlNode::Element(e) => collect_text(e, out),
            _ => {}
        }
    }
}

/// Local part of a qualified name.
pub fn local_name(name: &str) -> &str {
    name.rsplit_once(':').map(|(_, l)| l).unwrap_or(name)
}

/// A parsed XML part: declaration, prolog nodes and the root element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    /// Raw declaration content, e.g. `xml version="1.0" encoding="UTF-8"`
    pub declaration: Option<String>,
    /// Comments and processing instructions before the root
    pub prolog: Vec<XmlNode>,
    /// Root element
    pub root: XmlElement,
}

impl XmlDocument {
    /// Create a document with the standard OOXML declaration.
    pub fn new(root: XmlElement) -> Self {
        Self {
            declaration: Some(
                r#"xml version="1.0" encoding="UTF-8" standalone="yes""#.to_string(),
            ),
            prolog: Vec::new(),
            root,
        }
    }

    /// Parse an XML part.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(data);
        let mut buf = Vec::new();
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut declaration = None;
        let mut prolog = Vec::new();
        let mut root = None;

        loop {
            let event = reader.read_event_into(&mut buf).map_err(xml_err)?;
            match event {
                Event::Decl(d) => {
                    declaration = Some(String::from_utf8_lossy(&d).into_owned());
                }
                Event::Start(e) => stack.push(element_from_start(&e)?),
                Event::Empty(e) => {
                    let el = element_from_start(&e)?;
                    attach(&mut stack, &mut root, XmlNode::Element(el))?;
                }
                Event::End(_) => {
                    let el = stack
                        .pop()
                        .ok_or_else(|| Error::Xml("unbalanced end tag".into()))?;
                    attach(&mut stack, &mut root, XmlNode::Element(el))?;
                }
                Event::Text(t) => {
                    let text = t.unescape().map_err(xml_err)?.into_owned();
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(XmlNode::Text(text));
                    }
                }
                Event::CData(c) => {
                    let text = String::from_utf8_lossy(&c.into_inner()).into_owned();
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(XmlNode::CData(text));
                    }
                }
                Event::Comment(c) => {
                    let node = XmlNode::Comment(String::from_utf8_lossy(&c).into_owned());
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(node),
                        None if root.is_none() => prolog.push(node),
                        None => {}
                    }
                }
                Event::PI(p) => {
                    let node =
                        XmlNode::ProcessingInstruction(String::from_utf8_lossy(&p).into_owned());
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(node),
                        None if root.is_none() => prolog.push(node),
                        None => {}
                    }
                }
                Event::DocType(_) => {}
                Event::Eof => break,
            }
            buf.clear();
        }

        if !stack.is_empty() {
            return Err(Error::Xml(format!(
                "unclosed element <{}>",
                stack.last().map(|e| e.name.as_str()).unwrap_or_default()
            )));
        }
        let root = root.ok_or_else(|| Error::Xml("document has no root element".into()))?;
        Ok(Self {
            declaration,
            prolog,
            root,
        })
    }

    /// Serialize the part back to bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::new(Vec::new());
        if let Some(ref decl) = self.declaration {
            let raw = writer.get_mut();
            raw.extend_from_slice(b"<?");
            raw.extend_from_slice(decl.as_bytes());
            raw.extend_from_slice(b"?>\r\n");
        }
        for node in &self.prolog {
            write_node(&mut writer, node)?;
        }
        write_element(&mut writer, &self.root)?;
        Ok(writer.into_inner())
    }
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    node: XmlNode,
) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => match node {
            XmlNode::Element(el) if root.is_none() => *root = Some(el),
            XmlNode::Element(_) => return Err(Error::Xml("multiple root elements".into())),
            _ => {}
        },
    }
    Ok(())
}

fn element_from_start(e: &BytesStart<'_>) -> Result<XmlElement> {
    let mut el = XmlElement::new(String::from_utf8_lossy(e.name().as_ref()).into_owned());
    for attr in e.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value().map_err(xml_err)?.into_owned();
        el.attributes.push((key, value));
    }
    Ok(el)
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &XmlNode) -> Result<()> {
    match node {
        XmlNode::Element(el) => write_element(writer, el),
        XmlNode::Text(t) => writer
            .write_event(Event::Text(BytesText::new(t)))
            .map_err(xml_err),
        XmlNode::CData(t) => writer
            .write_event(Event::CData(BytesCData::new(t.as_str())))
            .map_err(xml_err),
        XmlNode::Comment(c) => writer
            .write_event(Event::Comment(BytesText::from_escaped(c.as_str())))
            .map_err(xml_err),
        XmlNode::ProcessingInstruction(p) => {
            let raw = writer.get_mut();
            raw.extend_from_slice(b"<?");
            raw.extend_from_slice(p.as_bytes());
            raw.extend_from_slice(b"?>");
            Ok(())
        }
    }
}

fn write_element(writer: &mut Writer<Vec<u8>>, el: &XmlElement) -> Result<()> {
    let mut start = BytesStart::new(el.name.as_str());
    for (key, value) in &el.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }
    if el.children.is_empty() {
        return writer.write_event(Event::Empty(start)).map_err(xml_err);
    }
    writer.write_event(Event::Start(start)).map_err(xml_err)?;
    for child in &el.children {
        write_node(writer, child)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(el.name.as_str())))
        .map_err(xml_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_write_preserves_order() {
        let src = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="urn:w" w:b="2" w:a="1"><w:body><w:p><w:r><w:t xml:space="preserve"> a &amp; b </w:t></w:r></w:p><!--note--></w:body></w:document>"#;
        let doc = XmlDocument::parse(src.as_bytes()).unwrap();
        assert_eq!(doc.root.name, "w:document");
        assert_eq!(doc.root.attributes[1].0, "w:b");
        assert_eq!(doc.root.text_content(), " a & b ");

        let out = String::from_utf8(doc.to_bytes().unwrap()).unwrap();
        assert!(out.starts_with("<?xml version=\"1.0\""));
        assert!(out.contains(r#"w:b="2" w:a="1""#));
        assert!(out.contains("a &amp; b"));
        assert!(out.contains("<!--note-->"));

        let reparsed = XmlDocument::parse(out.as_bytes()).unwrap();
        assert_eq!(reparsed.root, doc.root);
    }

    #[test]
    fn test_malformed_xml_is_error() {
        assert!(XmlDocument::parse(b"<a><b></a>").is_err());
        assert!(XmlDocument::parse(b"").is_err());
    }

    #[test]
    fn test_ensure_child_respects_order() {
        let mut ppr = XmlElement::new("w:pPr").with_child(XmlElement::new("w:jc"));
        let order = ["w:pStyle", "w:spacing", "w:ind", "w:jc"];
        ppr.ensure_child("w:pStyle", &order);
        ppr.ensure_child("w:spacing", &order);
        let names: Vec<_> = ppr.elements().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["w:pStyle", "w:spacing", "w:jc"]);

        // Existing child is returned, not duplicated.
        ppr.ensure_child("w:jc", &order).set_attr("w:val", "center");
        assert_eq!(ppr.children_named("w:jc").count(), 1);
    }

    #[test]
    fn test_set_attr_reports_change() {
        let mut el = XmlElement::new("w:sz");
        assert!(el.set_attr("w:val", "24"));
        assert!(!el.set_attr("w:val", "24"));
        assert!(el.set_attr("w:val", "28"));
        assert_eq!(el.attr("w:val"), Some("28"));
    }
}
