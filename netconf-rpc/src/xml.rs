//! A small owned XML element tree.
//!
//! Requests arrive as text and are parsed once into an [`Element`] tree with
//! every name resolved to its namespace. Everything downstream, from routing
//! to the codec, works on that tree. Rendering back to text goes through
//! [`Display`](fmt::Display), declaring default namespaces only where they
//! change.

use crate::{ns, QName, Status};
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;
use std::fmt;
use tracing::trace;

/// Elements nested deeper than this are rejected while parsing.
pub const MAX_DEPTH: usize = 256;

/// An attribute of an [`Element`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    name: QName,
    value: String,
}

impl Attribute {
    /// Create an attribute.
    pub fn new(name: QName, value: impl Into<String>) -> Self {
        Attribute {
            name,
            value: value.into(),
        }
    }

    /// The attribute name. Unprefixed attributes have no namespace.
    pub fn name(&self) -> &QName {
        &self.name
    }

    /// The unescaped attribute value.
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// An XML element with namespace-resolved names.
///
/// Elements hold either text or child elements. Text interleaved with child
/// elements is concatenated, which is all NETCONF content ever needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    name: QName,
    attributes: Vec<Attribute>,
    children: Vec<Element>,
    text: Option<String>,
}

impl Element {
    /// Create an empty element.
    pub fn new(name: QName) -> Self {
        Element {
            name,
            attributes: Vec::new(),
            children: Vec::new(),
            text: None,
        }
    }

    /// Parse a document and return its root element.
    ///
    /// Fails with `malformed-message` if the document is not well-formed or
    /// nests more than [`MAX_DEPTH`] elements, and with `unknown-namespace` if
    /// it uses an undeclared prefix.
    ///
    /// Leaf text is kept exactly as written. Whitespace-only text between
    /// child elements is dropped.
    pub fn parse(document: &str) -> Result<Element, Status> {
        let mut reader = NsReader::from_str(document);

        let mut stack: Vec<Element> = Vec::new();
        let mut root = None;

        loop {
            let (namespace, event) = reader.read_resolved_event().map_err(malformed)?;
            let namespace = resolved_namespace(namespace);

            match event {
                Event::Start(start) => {
                    check_depth(stack.len())?;
                    let element = open_element(&reader, namespace, &start)?;
                    stack.push(element);
                }
                Event::Empty(start) => {
                    check_depth(stack.len())?;
                    let element = open_element(&reader, namespace, &start)?;
                    close_element(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| Status::malformed_message("unbalanced end tag"))?;
                    close_element(&mut stack, &mut root, element)?;
                }
                Event::Text(text) => {
                    let text = text.unescape().map_err(malformed)?;
                    match stack.last_mut() {
                        Some(parent) => parent.append_text(&text),
                        None if is_whitespace(&text) => {}
                        None => return Err(Status::malformed_message("text outside of root element")),
                    }
                }
                Event::CData(data) => {
                    let data = data.into_inner();
                    let text = std::str::from_utf8(&data).map_err(malformed)?;
                    match stack.last_mut() {
                        Some(parent) => parent.append_text(text),
                        None => return Err(Status::malformed_message("CDATA outside of root element")),
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(Status::malformed_message("unexpected end of document"));
        }

        root.ok_or_else(|| Status::malformed_message("document has no root element"))
    }

    /// The element name.
    pub fn name(&self) -> &QName {
        &self.name
    }

    /// The text content, `None` if the element has none.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// All attributes in document order.
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// The value of the attribute named `name`.
    pub fn attribute(&self, name: &QName) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| &attr.name == name)
            .map(Attribute::value)
    }

    /// Child elements in document order.
    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// Consume the element, returning its children.
    pub fn into_children(self) -> Vec<Element> {
        self.children
    }

    /// The first child named `name`.
    pub fn child(&self, name: &QName) -> Option<&Element> {
        self.children.iter().find(|child| &child.name == name)
    }

    /// All children named `name`.
    pub fn children_named<'a: 'n, 'n>(
        &'a self,
        name: &'n QName,
    ) -> impl Iterator<Item = &'a Element> + 'n {
        self.children.iter().filter(move |child| &child.name == name)
    }

    /// Returns `true` if the element has neither text nor children.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty() && self.text.is_none()
    }

    /// Set the text content.
    #[must_use]
    pub fn with_text(self, text: impl Into<String>) -> Self {
        Element {
            text: Some(text.into()),
            ..self
        }
    }

    /// Append a child element.
    #[must_use]
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Append several child elements.
    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.children.extend(children);
        self
    }

    /// Add an attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: QName, value: impl Into<String>) -> Self {
        self.attributes.push(Attribute::new(name, value));
        self
    }

    /// Append a child element in place.
    pub fn push_child(&mut self, child: Element) {
        self.children.push(child);
    }

    fn append_text(&mut self, text: &str) {
        match &mut self.text {
            Some(existing) => existing.push_str(text),
            None => self.text = Some(text.to_owned()),
        }
    }

    fn write(&self, f: &mut fmt::Formatter<'_>, parent_namespace: &str) -> fmt::Result {
        let local = self.name.local_name();
        write!(f, "<{}", local)?;

        if self.name.namespace() != parent_namespace {
            write!(f, " xmlns=\"{}\"", escape(self.name.namespace()))?;
        }

        for (index, attr) in self.attributes.iter().enumerate() {
            if attr.name.namespace().is_empty() {
                write!(f, " {}=\"{}\"", attr.name.local_name(), escape(&attr.value))?;
            } else if attr.name.namespace() == ns::XML {
                // The `xml` prefix is bound implicitly and must not be declared.
                write!(f, " xml:{}=\"{}\"", attr.name.local_name(), escape(&attr.value))?;
            } else {
                write!(
                    f,
                    " xmlns:a{index}=\"{}\" a{index}:{}=\"{}\"",
                    escape(attr.name.namespace()),
                    attr.name.local_name(),
                    escape(&attr.value),
                )?;
            }
        }

        if self.is_empty() {
            return f.write_str("/>");
        }

        f.write_str(">")?;
        if let Some(text) = &self.text {
            f.write_str(&escape(text))?;
        }
        for child in &self.children {
            child.write(f, self.name.namespace())?;
        }
        write!(f, "</{}>", local)
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write(f, "")
    }
}

fn malformed(err: impl fmt::Display) -> Status {
    trace!("rejecting malformed document: {}", err);
    Status::malformed_message(err.to_string())
}

enum Namespace {
    Unbound,
    Bound(String),
    Unknown(String),
}

fn resolved_namespace(result: ResolveResult<'_>) -> Namespace {
    match result {
        ResolveResult::Unbound => Namespace::Unbound,
        ResolveResult::Bound(namespace) => {
            Namespace::Bound(String::from_utf8_lossy(namespace.as_ref()).into_owned())
        }
        ResolveResult::Unknown(prefix) => Namespace::Unknown(String::from_utf8_lossy(&prefix).into_owned()),
    }
}

fn qualify(namespace: Namespace, local_name: &[u8]) -> Result<QName, Status> {
    let local_name = std::str::from_utf8(local_name).map_err(malformed)?;
    match namespace {
        Namespace::Unbound => Ok(QName::unqualified(local_name)),
        Namespace::Bound(namespace) => Ok(QName::new(namespace, local_name)),
        Namespace::Unknown(prefix) => Err(Status::unknown_namespace(
            local_name,
            format!("undeclared prefix {}", prefix),
        )),
    }
}

fn open_element(
    reader: &NsReader<&[u8]>,
    namespace: Namespace,
    start: &BytesStart<'_>,
) -> Result<Element, Status> {
    let name = qualify(namespace, start.local_name().as_ref())?;
    let mut element = Element::new(name);

    for attr in start.attributes() {
        let attr = attr.map_err(malformed)?;
        if attr.key.as_namespace_binding().is_some() {
            continue;
        }

        let (namespace, local) = reader.resolve_attribute(attr.key);
        let name = qualify(resolved_namespace(namespace), local.as_ref())?;
        let value = attr.unescape_value().map_err(malformed)?;
        element.attributes.push(Attribute::new(name, value));
    }

    Ok(element)
}

fn is_whitespace(text: &str) -> bool {
    text.chars().all(|c| matches!(c, ' ' | '\t' | '\r' | '\n'))
}

fn check_depth(open: usize) -> Result<(), Status> {
    if open >= MAX_DEPTH {
        return Err(Status::malformed_message(format!(
            "document nests deeper than {} elements",
            MAX_DEPTH
        )));
    }
    Ok(())
}

fn close_element(
    stack: &mut [Element],
    root: &mut Option<Element>,
    mut element: Element,
) -> Result<(), Status> {
    if !element.children.is_empty() && element.text.as_deref().is_some_and(is_whitespace) {
        element.text = None;
    }

    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        return Ok(());
    }

    if root.is_some() {
        return Err(Status::malformed_message("document has more than one root element"));
    }

    *root = Some(element);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorTag;

    const RPC: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rpc message-id="101" xmlns="urn:ietf:params:xml:ns:netconf:base:1.0">
  <action xmlns="urn:ietf:params:xml:ns:yang:1">
    <server xmlns="urn:example:data-center">
      <name>server-1</name>
      <reset>
        <reset-at>2020-09-03T16:20:00Z</reset-at>
      </reset>
    </server>
  </action>
</rpc>"#;

    #[test]
    fn parse_resolves_default_namespaces() {
        let rpc = Element::parse(RPC).unwrap();

        assert!(rpc.name().is(ns::NETCONF_BASE, "rpc"));
        assert_eq!(rpc.attribute(&QName::unqualified("message-id")), Some("101"));

        let action = &rpc.children()[0];
        assert!(action.name().is(ns::YANG_1, "action"));

        let server = &action.children()[0];
        assert!(server.name().is("urn:example:data-center", "server"));
        assert_eq!(server.children().len(), 2);
        assert_eq!(server.children()[0].text(), Some("server-1"));
    }

    #[test]
    fn parse_resolves_prefixes() {
        let doc = r#"<nc:rpc xmlns:nc="urn:ietf:params:xml:ns:netconf:base:1.0" nc:message-id="7"><t:make-toast xmlns:t="http://netconfcentral.org/ns/toaster"/></nc:rpc>"#;
        let rpc = Element::parse(doc).unwrap();

        assert!(rpc.name().is(ns::NETCONF_BASE, "rpc"));
        assert_eq!(
            rpc.attribute(&QName::new(ns::NETCONF_BASE, "message-id")),
            Some("7")
        );
        assert!(rpc.children()[0]
            .name()
            .is("http://netconfcentral.org/ns/toaster", "make-toast"));
        assert!(rpc.children()[0].is_empty());
    }

    #[test]
    fn parse_unescapes_text() {
        let element = Element::parse("<a xmlns=\"urn:x\">1 &lt; 2 &amp;&amp; <![CDATA[<raw>]]></a>").unwrap();
        assert_eq!(element.text(), Some("1 < 2 && <raw>"));
    }

    #[test]
    fn leaf_whitespace_is_kept() {
        let doc = "<a xmlns=\"urn:x\">\n  <b> padded\t</b>\n  <c>  </c>\n</a>\n";
        let element = Element::parse(doc).unwrap();

        assert_eq!(element.text(), None);
        assert_eq!(element.children()[0].text(), Some(" padded\t"));
        assert_eq!(element.children()[1].text(), Some("  "));
        assert_eq!(Element::parse(&element.to_string()).unwrap(), element);
    }

    #[test]
    fn nesting_is_limited() {
        let within = format!("{}{}", "<a>".repeat(MAX_DEPTH), "</a>".repeat(MAX_DEPTH));
        assert!(Element::parse(&within).is_ok());

        let depth = 200_000;
        let doc = format!("{}{}", "<a>".repeat(depth), "</a>".repeat(depth));
        let err = Element::parse(&doc).unwrap_err();
        assert_eq!(err.tag(), ErrorTag::MalformedMessage);

        let doc = format!("{}<a/>{}", "<a>".repeat(MAX_DEPTH), "</a>".repeat(MAX_DEPTH));
        let err = Element::parse(&doc).unwrap_err();
        assert_eq!(err.tag(), ErrorTag::MalformedMessage);
    }

    #[test]
    fn xml_namespace_attributes() {
        let element = Element::parse("<a xmlns=\"urn:x\" xml:lang=\"en\"/>").unwrap();
        assert_eq!(element.attribute(&QName::new(ns::XML, "lang")), Some("en"));

        let text = element.to_string();
        assert_eq!(text, "<a xmlns=\"urn:x\" xml:lang=\"en\"/>");
        assert_eq!(Element::parse(&text).unwrap(), element);
    }

    #[test]
    fn malformed_documents() {
        for doc in ["", "<a>", "<a></b>", "<a/><b/>", "text", "<a xmlns=\"urn:x\"></a>trailing"] {
            let err = Element::parse(doc).unwrap_err();
            assert_eq!(err.tag(), ErrorTag::MalformedMessage, "{:?}", doc);
        }
    }

    #[test]
    fn undeclared_prefix() {
        let err = Element::parse("<x:a/>").unwrap_err();
        assert_eq!(err.tag(), ErrorTag::UnknownNamespace);
    }

    #[test]
    fn display_declares_namespaces_where_they_change() {
        let element = Element::new(QName::new(ns::NETCONF_BASE, "rpc-reply"))
            .with_attribute(QName::unqualified("message-id"), "1")
            .with_child(
                Element::new(QName::new("urn:x", "out"))
                    .with_child(Element::new(QName::new("urn:x", "v")).with_text("a<b")),
            )
            .with_child(Element::new(QName::new(ns::NETCONF_BASE, "ok")));

        assert_eq!(
            element.to_string(),
            "<rpc-reply xmlns=\"urn:ietf:params:xml:ns:netconf:base:1.0\" message-id=\"1\">\
             <out xmlns=\"urn:x\"><v>a&lt;b</v></out>\
             <ok/>\
             </rpc-reply>"
        );
    }

    #[test]
    fn display_then_parse() {
        let rpc = Element::parse(RPC).unwrap();
        assert_eq!(Element::parse(&rpc.to_string()).unwrap(), rpc);
    }
}
