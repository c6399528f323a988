use core_types::DocumentId;

/// Index of a node inside its document's arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// The document node itself.
    pub const ROOT: NodeId = NodeId(0);

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

pub const SVG_NAMESPACE_URI: &str = "http://www.w3.org/2000/svg";
pub const HTML_NAMESPACE_URI: &str = "http://www.w3.org/1999/xhtml";
pub const MATHML_NAMESPACE_URI: &str = "http://www.w3.org/1998/Math/MathML";

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Namespace {
    None,
    Html,
    Svg,
    MathMl,
    Other(String),
}

impl Namespace {
    pub fn from_uri(uri: &str) -> Self {
        match uri {
            "" => Namespace::None,
            SVG_NAMESPACE_URI => Namespace::Svg,
            HTML_NAMESPACE_URI => Namespace::Html,
            MATHML_NAMESPACE_URI => Namespace::MathMl,
            other => Namespace::Other(other.to_string()),
        }
    }

    pub fn uri(&self) -> Option<&str> {
        match self {
            Namespace::None => None,
            Namespace::Html => Some(HTML_NAMESPACE_URI),
            Namespace::Svg => Some(SVG_NAMESPACE_URI),
            Namespace::MathMl => Some(MATHML_NAMESPACE_URI),
            Namespace::Other(uri) => Some(uri),
        }
    }
}

/// Concrete SVG element variants the factory knows about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SvgElementKind {
    /// `<svg>` root container.
    Svg,
    /// `<circle>` shape.
    Circle,
    /// `<desc>` description.
    Desc,
    /// `<foreignObject>` embedded foreign content.
    ForeignObject,
    /// `<title>`.
    Title,
    /// Any other SVG tag.
    Unknown,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Generic,
    Svg(SvgElementKind),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    owner: DocumentId,
    local_name: String,
    prefix: Option<String>,
    namespace: Namespace,
    kind: ElementKind,
    attributes: Vec<(String, String)>,
}

impl Element {
    pub fn new(
        owner: DocumentId,
        local_name: impl Into<String>,
        prefix: Option<&str>,
        namespace: Namespace,
    ) -> Self {
        Self {
            owner,
            local_name: local_name.into(),
            prefix: prefix.map(str::to_string),
            namespace,
            kind: ElementKind::Generic,
            attributes: Vec::new(),
        }
    }

    pub fn svg(
        owner: DocumentId,
        kind: SvgElementKind,
        local_name: &str,
        prefix: Option<&str>,
    ) -> Self {
        Self {
            owner,
            local_name: local_name.to_string(),
            prefix: prefix.map(str::to_string),
            namespace: Namespace::Svg,
            kind: ElementKind::Svg(kind),
            attributes: Vec::new(),
        }
    }

    /// Non-owning back-reference to the document this element belongs to.
    pub fn owner(&self) -> DocumentId {
        self.owner
    }

    pub(crate) fn set_owner(&mut self, owner: DocumentId) {
        self.owner = owner;
    }

    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Qualified name: `prefix:local` when prefixed, otherwise the local name.
    pub fn tag_name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}:{}", self.local_name),
            None => self.local_name.clone(),
        }
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn svg_kind(&self) -> Option<SvgElementKind> {
        match self.kind {
            ElementKind::Svg(kind) => Some(kind),
            ElementKind::Generic => None,
        }
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing an existing value in place.
    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| k == name) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Document,
    Element(Element),
    Text(String),
    Comment(String),
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self, Node::Element(_))
    }

    pub fn can_have_children(&self) -> bool {
        matches!(self, Node::Document | Node::Element(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespace_uri_round_trips_known_values() {
        for ns in [Namespace::Html, Namespace::Svg, Namespace::MathMl] {
            let uri = ns.uri().expect("known namespace has a uri");
            assert_eq!(Namespace::from_uri(uri), ns);
        }
        assert_eq!(Namespace::from_uri(""), Namespace::None);
        assert_eq!(
            Namespace::from_uri("urn:x"),
            Namespace::Other("urn:x".to_string())
        );
    }

    #[test]
    fn tag_name_includes_prefix() {
        let plain = Element::new(DocumentId(1), "item", None, Namespace::None);
        assert_eq!(plain.tag_name(), "item");
        let prefixed = Element::new(DocumentId(1), "item", Some("x"), Namespace::None);
        assert_eq!(prefixed.tag_name(), "x:item");
        assert_eq!(prefixed.local_name(), "item");
    }

    #[test]
    fn set_attribute_replaces_in_place() {
        let mut el = Element::new(DocumentId(1), "a", None, Namespace::None);
        el.set_attribute("x", "1");
        el.set_attribute("y", "2");
        el.set_attribute("x", "3");
        assert_eq!(
            el.attributes(),
            &[
                ("x".to_string(), "3".to_string()),
                ("y".to_string(), "2".to_string())
            ]
        );
        assert_eq!(el.get_attribute("y"), Some("2"));
        assert_eq!(el.get_attribute("z"), None);
    }
}
