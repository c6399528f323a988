//! Asynchronous document construction.
//!
//! [`load_xml_document`] builds an XML [`Document`](dom::Document) from
//! source text: the document is attached to its browsing context and
//! announced on the context's event bus before the parser runs, so observers
//! can watch it fill in. Parsing yields to the runtime periodically and can be
//! cancelled through a [`CancelHandle`].

mod cancel;
mod parser;
mod pipeline;

pub use cancel::{CancelHandle, CancelSignal, cancel_pair};
pub use dom::CreateDocumentOptions;
pub use parser::{DocumentParser, ParseStatus, XmlDomBuilder};
pub use pipeline::{LoadError, Stage, construct_document, load_xml_document, load_xml_document_with};
