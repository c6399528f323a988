//! XML document: an arena of nodes rooted at the document node.
//!
//! The document owns every node exclusively; parent/child links are arena
//! indices and elements refer back to the document only through its
//! `DocumentId`.

use crate::context::BrowsingContext;
use crate::types::{Element, Node, NodeId};
use core_types::DocumentId;
use std::sync::Arc;
use tools::TextSource;

pub const XML_CONTENT_TYPE: &str = "application/xml";

/// Options a document is created from.
#[derive(Clone, Debug, Default)]
pub struct CreateDocumentOptions {
    pub source: TextSource,
    /// Declared character encoding, passed through untouched.
    pub charset: Option<String>,
    /// Content-type header value as received, passed through untouched.
    pub content_type_hint: Option<String>,
}

impl CreateDocumentOptions {
    pub fn new(source: impl Into<TextSource>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }

    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = Some(charset.into());
        self
    }

    pub fn with_content_type_hint(mut self, hint: impl Into<String>) -> Self {
        self.content_type_hint = Some(hint.into());
        self
    }
}

#[derive(Clone, Debug)]
struct NodeData {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    node: Node,
}

#[derive(Debug)]
pub struct Document {
    id: DocumentId,
    context: Arc<BrowsingContext>,
    source: TextSource,
    content_type: &'static str,
    charset: Option<String>,
    content_type_hint: Option<String>,
    nodes: Vec<NodeData>,
}

impl Document {
    /// Create an empty XML document over `source`.
    ///
    /// Without a context a fresh default one is created and owned by the
    /// document.
    pub fn new_xml(context: Option<Arc<BrowsingContext>>, source: TextSource) -> Self {
        let document = Self {
            id: DocumentId::next(),
            context: context.unwrap_or_else(BrowsingContext::new),
            source,
            content_type: XML_CONTENT_TYPE,
            charset: None,
            content_type_hint: None,
            nodes: vec![NodeData {
                parent: None,
                children: Vec::new(),
                node: Node::Document,
            }],
        };
        log::debug!(
            target: "dom.document",
            "created document {:?} in context {:?}",
            document.id,
            document.context.id()
        );
        document
    }

    pub fn empty_xml(context: Option<Arc<BrowsingContext>>) -> Self {
        Self::new_xml(context, TextSource::empty())
    }

    /// Apply per-document creation options (charset and content hints).
    pub fn setup(&mut self, options: &CreateDocumentOptions) {
        self.charset = options.charset.clone();
        self.content_type_hint = options.content_type_hint.clone();
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn context(&self) -> &Arc<BrowsingContext> {
        &self.context
    }

    pub fn source(&self) -> &TextSource {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut TextSource {
        &mut self.source
    }

    pub fn content_type(&self) -> &'static str {
        self.content_type
    }

    pub fn charset(&self) -> Option<&str> {
        self.charset.as_deref()
    }

    pub fn content_type_hint(&self) -> Option<&str> {
        self.content_type_hint.as_deref()
    }

    /// XML documents have no title; always empty.
    pub fn title(&self) -> &str {
        ""
    }

    /// Ignored for XML documents.
    pub fn set_title(&mut self, _title: &str) {}

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Number of nodes, including the document node.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes[NodeId::ROOT.index()].children.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.data(id).node
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        self.node(id).as_element()
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.data_mut(id).node {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.data(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.data(id).children
    }

    /// First child of `id` matching `pred`.
    pub fn find_child(&self, id: NodeId, pred: impl Fn(&Node) -> bool) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&child| pred(self.node(child)))
    }

    pub fn first_element_child(&self, id: NodeId) -> Option<NodeId> {
        self.find_child(id, Node::is_element)
    }

    /// The root element: the first element child of the document node.
    ///
    /// Recomputed on every call.
    pub fn document_element(&self) -> Option<NodeId> {
        self.first_element_child(NodeId::ROOT)
    }

    /// Concatenated text of all descendant text nodes, in document order.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match self.node(id) {
            Node::Text(text) => out.push_str(text),
            Node::Document | Node::Element(_) => {
                for &child in self.children(id) {
                    self.collect_text(child, out);
                }
            }
            Node::Comment(_) => {}
        }
    }

    /// Append `element` as the last child of `parent`.
    ///
    /// Panics if the element was created for another document or `parent`
    /// cannot hold children.
    pub fn append_element(&mut self, parent: NodeId, element: Element) -> NodeId {
        assert_eq!(
            element.owner(),
            self.id,
            "element <{}> belongs to another document",
            element.local_name()
        );
        self.push_child(parent, Node::Element(element))
    }

    /// Append text, merging with a directly preceding text node.
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        if let Some(&last) = self.children(parent).last() {
            if let Node::Text(existing) = &mut self.data_mut(last).node {
                existing.push_str(text);
                return last;
            }
        }
        self.push_child(parent, Node::Text(text.to_string()))
    }

    pub fn append_comment(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.push_child(parent, Node::Comment(text.to_string()))
    }

    fn push_child(&mut self, parent: NodeId, node: Node) -> NodeId {
        assert!(
            self.node(parent).can_have_children(),
            "node {parent:?} cannot have children"
        );
        let Ok(index) = u32::try_from(self.nodes.len()) else {
            panic!("document {:?} exceeds u32::MAX nodes", self.id);
        };
        let id = NodeId(index);
        self.nodes.push(NodeData {
            parent: Some(parent),
            children: Vec::new(),
            node,
        });
        self.data_mut(parent).children.push(id);
        id
    }

    /// Lend the source text out while the tree is mutated.
    ///
    /// Until the lease drops, `source()` reads as empty; the text is put
    /// back on drop, including on early return or unwinding.
    pub fn lease_source(&mut self) -> SourceLease<'_> {
        let source = std::mem::take(&mut self.source);
        SourceLease {
            document: self,
            source,
        }
    }

    /// Clone this document.
    ///
    /// The clone gets a new id, an independent copy of the text source and the
    /// same hosting context. With `deep` the whole subtree is copied and
    /// element owner handles are rewritten to the clone.
    pub fn clone_document(&self, deep: bool) -> Document {
        let mut clone = Document::new_xml(
            Some(Arc::clone(&self.context)),
            TextSource::new(self.source.text()),
        );
        clone.charset = self.charset.clone();
        clone.content_type_hint = self.content_type_hint.clone();
        if deep {
            clone.nodes = self.nodes.clone();
            let owner = clone.id;
            for data in &mut clone.nodes {
                if let Node::Element(element) = &mut data.node {
                    element.set_owner(owner);
                }
            }
        }
        clone
    }

    /// Indented one-line-per-node rendering for diagnostics.
    pub fn outline(&self) -> String {
        let mut out = String::new();
        self.write_outline(NodeId::ROOT, 0, &mut out);
        out
    }

    fn write_outline(&self, id: NodeId, depth: usize, out: &mut String) {
        for _ in 0..depth {
            out.push_str("  ");
        }
        match self.node(id) {
            Node::Document => out.push_str("#document"),
            Node::Element(element) => {
                out.push('<');
                out.push_str(&element.tag_name());
                for (name, value) in element.attributes() {
                    out.push_str(&format!(" {name}=\"{value}\""));
                }
                out.push('>');
            }
            Node::Text(text) => out.push_str(&format!("#text {text:?}")),
            Node::Comment(text) => out.push_str(&format!("#comment {text:?}")),
        }
        out.push('\n');
        for &child in self.children(id) {
            self.write_outline(child, depth + 1, out);
        }
    }

    fn data(&self, id: NodeId) -> &NodeData {
        self.nodes
            .get(id.index())
            .unwrap_or_else(|| panic!("{id:?} is not a node of document {:?}", self.id))
    }

    fn data_mut(&mut self, id: NodeId) -> &mut NodeData {
        let doc = self.id;
        self.nodes
            .get_mut(id.index())
            .unwrap_or_else(|| panic!("{id:?} is not a node of document {doc:?}"))
    }
}

/// Exclusive access to a document with its source text moved out, so the
/// text can be tokenized while nodes are appended. See
/// [`Document::lease_source`].
pub struct SourceLease<'d> {
    document: &'d mut Document,
    source: TextSource,
}

impl SourceLease<'_> {
    pub fn split(&mut self) -> (&mut Document, &str) {
        (&mut *self.document, self.source.text())
    }
}

impl Drop for SourceLease<'_> {
    fn drop(&mut self) {
        self.document.source = std::mem::take(&mut self.source);
    }
}
