//! Document object model for XML documents with SVG foreign content.

pub mod context;
pub mod svg;
pub mod xml;

mod document;
mod entities;
mod types;

pub use crate::context::{BrowsingContext, Configuration};
pub use crate::document::{CreateDocumentOptions, Document, SourceLease, XML_CONTENT_TYPE};
pub use crate::svg::{SvgElementFactory, adjust_tag_name, tag_names};
pub use crate::types::{
    Element, ElementKind, HTML_NAMESPACE_URI, MATHML_NAMESPACE_URI, Namespace, Node, NodeId,
    SVG_NAMESPACE_URI, SvgElementKind,
};
pub use crate::xml::{XmlParseError, XmlParserOptions, XmlTreeBuilder};
