//! Owned XML tree built on quick-xml, with namespace-aware navigation.
//!
//! Extraction strategies work against this tree instead of raw parser
//! events, so the XML library is touched in exactly one place.

use quick_xml::NsReader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};

use crate::error::AcquireError;

/// A parsed XML document.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlDocument {
    root: XmlElement,
}

/// One element of the tree: local name, resolved namespace, attributes,
/// concatenated direct text, and child elements in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlElement {
    name: String,
    namespace: Option<String>,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<XmlElement>,
}

impl XmlDocument {
    /// Parse a full document from a string.
    ///
    /// Namespace prefixes are resolved by the reader; elements store the
    /// bound namespace URI. Unbalanced tags, multiple roots, and an empty
    /// document are all reported as malformed XML.
    pub fn parse(xml: &str) -> Result<Self, AcquireError> {
        let mut reader = NsReader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            match reader.read_resolved_event() {
                Ok((ns, Event::Start(ref start))) => {
                    stack.push(element_from_start(&ns, start)?);
                }
                Ok((ns, Event::Empty(ref start))) => {
                    let element = element_from_start(&ns, start)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Ok((_, Event::Text(ref t))) => {
                    if let Some(open) = stack.last_mut() {
                        let text = t
                            .unescape()
                            .map_err(|e| AcquireError::XmlParse(e.to_string()))?;
                        open.text.push_str(&text);
                    }
                }
                Ok((_, Event::CData(ref t))) => {
                    if let Some(open) = stack.last_mut() {
                        open.text.push_str(&String::from_utf8_lossy(t));
                    }
                }
                Ok((_, Event::End(_))) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| AcquireError::XmlParse("unexpected closing tag".into()))?;
                    attach(&mut stack, &mut root, element)?;
                }
                Ok((_, Event::Eof)) => break,
                Ok(_) => {}
                Err(e) => return Err(AcquireError::XmlParse(e.to_string())),
            }
        }

        if !stack.is_empty() {
            return Err(AcquireError::XmlParse("unclosed element at end of input".into()));
        }

        root.map(|root| Self { root })
            .ok_or_else(|| AcquireError::XmlParse("document has no root element".into()))
    }

    /// The document's root element.
    pub fn root(&self) -> &XmlElement {
        &self.root
    }

    /// Namespace URI bound to the root element, if any.
    pub fn root_namespace(&self) -> Option<&str> {
        self.root.namespace()
    }
}

fn element_from_start(
    ns: &ResolveResult<'_>,
    start: &BytesStart<'_>,
) -> Result<XmlElement, AcquireError> {
    let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
    let namespace = match ns {
        ResolveResult::Bound(Namespace(uri)) => Some(String::from_utf8_lossy(uri).into_owned()),
        _ => None,
    };

    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| AcquireError::XmlParse(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| AcquireError::XmlParse(e.to_string()))?
            .into_owned();
        attributes.push((key, value));
    }

    Ok(XmlElement {
        name,
        namespace,
        attributes,
        text: String::new(),
        children: Vec::new(),
    })
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<(), AcquireError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        return Ok(());
    }
    if root.is_some() {
        return Err(AcquireError::XmlParse("multiple root elements".into()));
    }
    *root = Some(element);
    Ok(())
}

impl XmlElement {
    /// Local name, without any namespace prefix.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolved namespace URI, if the element is in a namespace.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Concatenated direct text content, entities unescaped.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Attribute value by local name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Child elements in document order.
    pub fn children(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter()
    }

    /// First direct child with the given local name, any namespace.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Walk a namespaced path: the first step matches any descendant of
    /// `self`, remaining steps match direct children. Anchors are tried in
    /// document order and the first complete walk wins.
    pub fn find_ns(&self, ns: &str, path: &[&str]) -> Option<&XmlElement> {
        let (first, rest) = path.split_first()?;

        self.descendants()
            .filter(|e| e.name == *first && e.namespace.as_deref() == Some(ns))
            .find_map(|anchor| {
                let mut current = anchor;
                for step in rest {
                    current = current
                        .children
                        .iter()
                        .find(|c| c.name == *step && c.namespace.as_deref() == Some(ns))?;
                }
                Some(current)
            })
    }

    /// Preorder traversal of this element and everything below it.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }
}

/// Preorder iterator over an element subtree.
pub struct Descendants<'a> {
    stack: Vec<&'a XmlElement>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a XmlElement;

    fn next(&mut self) -> Option<Self::Item> {
        let element = self.stack.pop()?;
        for child in element.children.iter().rev() {
            self.stack.push(child);
        }
        Some(element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_text_and_attributes() {
        let doc = XmlDocument::parse(r#"<nota id="7"><valor moeda="BRL">10,50</valor></nota>"#)
            .unwrap();

        let root = doc.root();
        assert_eq!(root.name(), "nota");
        assert_eq!(root.attr("id"), Some("7"));

        let valor = root.child("valor").unwrap();
        assert_eq!(valor.text(), "10,50");
        assert_eq!(valor.attr("moeda"), Some("BRL"));
        assert_eq!(valor.attr("missing"), None);
    }

    #[test]
    fn test_namespace_resolution() {
        let xml = r#"<NFe xmlns="http://www.portalfiscal.inf.br/nfe"><infNFe/></NFe>"#;
        let doc = XmlDocument::parse(xml).unwrap();

        assert_eq!(
            doc.root_namespace(),
            Some("http://www.portalfiscal.inf.br/nfe")
        );
        let inf = doc.root().child("infNFe").unwrap();
        assert_eq!(inf.namespace(), Some("http://www.portalfiscal.inf.br/nfe"));
    }

    #[test]
    fn test_prefixed_namespace_uses_local_names() {
        let xml = r#"<n:doc xmlns:n="urn:x"><n:item>a</n:item></n:doc>"#;
        let doc = XmlDocument::parse(xml).unwrap();

        assert_eq!(doc.root().name(), "doc");
        assert_eq!(doc.root().child("item").unwrap().text(), "a");
        assert_eq!(doc.root().child("item").unwrap().namespace(), Some("urn:x"));
    }

    #[test]
    fn test_find_ns_anchors_on_descendants() {
        let ns = "urn:n";
        let xml = format!(
            r#"<root xmlns="{ns}"><wrap><ide><nNF>123</nNF></ide></wrap><ide><nNF>999</nNF></ide></root>"#
        );
        let doc = XmlDocument::parse(&xml).unwrap();

        // First ide in document order wins, even though it is nested.
        let found = doc.root().find_ns(ns, &["ide", "nNF"]).unwrap();
        assert_eq!(found.text(), "123");
    }

    #[test]
    fn test_find_ns_requires_matching_namespace() {
        let xml = r#"<root xmlns="urn:a"><ide><nNF>1</nNF></ide></root>"#;
        let doc = XmlDocument::parse(xml).unwrap();

        assert!(doc.root().find_ns("urn:a", &["ide", "nNF"]).is_some());
        assert!(doc.root().find_ns("urn:b", &["ide", "nNF"]).is_none());
    }

    #[test]
    fn test_descendants_preorder() {
        let doc = XmlDocument::parse("<a><b><c/></b><d/></a>").unwrap();
        let names: Vec<&str> = doc.root().descendants().map(|e| e.name()).collect();
        assert_eq!(names, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_mixed_text_is_concatenated() {
        let doc = XmlDocument::parse("<a>x<b>inner</b>y</a>").unwrap();
        assert_eq!(doc.root().text(), "xy");
        assert_eq!(doc.root().child("b").unwrap().text(), "inner");
    }

    #[test]
    fn test_cdata_text() {
        let doc = XmlDocument::parse("<a><![CDATA[1.234,56]]></a>").unwrap();
        assert_eq!(doc.root().text(), "1.234,56");
    }

    #[test]
    fn test_malformed_documents_are_rejected() {
        assert!(XmlDocument::parse("<a><b></a>").is_err());
        assert!(XmlDocument::parse("<a>").is_err());
        assert!(XmlDocument::parse("").is_err());
        assert!(XmlDocument::parse("just text").is_err());
        assert!(XmlDocument::parse("<a/><b/>").is_err());
    }

    #[test]
    fn test_self_closing_elements() {
        let doc = XmlDocument::parse(r#"<a><b v="1"/></a>"#).unwrap();
        let b = doc.root().child("b").unwrap();
        assert_eq!(b.attr("v"), Some("1"));
        assert_eq!(b.text(), "");
    }
}
