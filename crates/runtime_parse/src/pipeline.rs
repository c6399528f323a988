use crate::cancel::CancelSignal;
use crate::parser::{DocumentParser, ParseStatus, XmlDomBuilder};
use bus::ParseSpan;
use dom::xml::{XmlParseError, XmlParserOptions};
use dom::{BrowsingContext, CreateDocumentOptions, Document};
use std::sync::Arc;
use thiserror::Error;

/// Why a construction did not complete.
///
/// Both variants hand back the partially built document: it stays attached
/// as the context's active document either way.
#[derive(Debug, Error)]
pub enum LoadError<E: std::error::Error + 'static> {
    /// Cancellation was requested before parsing completed.
    #[error("loading document {:?} was cancelled", .0.id())]
    Cancelled(Box<Document>),
    /// The parser failed; its error is forwarded as is.
    #[error("{source}")]
    Parser {
        #[source]
        source: E,
        document: Box<Document>,
    },
}

impl<E: std::error::Error + 'static> LoadError<E> {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, LoadError::Cancelled(_))
    }

    /// The parser's own error, if the parser failed.
    pub fn parser_error(&self) -> Option<&E> {
        match self {
            LoadError::Parser { source, .. } => Some(source),
            LoadError::Cancelled(_) => None,
        }
    }

    /// The partially built document.
    pub fn document(&self) -> &Document {
        match self {
            LoadError::Cancelled(document) | LoadError::Parser { document, .. } => document,
        }
    }

    pub fn into_document(self) -> Document {
        match self {
            LoadError::Cancelled(document) | LoadError::Parser { document, .. } => *document,
        }
    }
}

/// Construction stages, in order. Logged as the pipeline moves through them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Created,
    Attached,
    Parsing,
    Completed,
    Cancelled,
}

fn enter(document: &Document, stage: Stage) {
    log::debug!(
        target: "runtime_parse.pipeline",
        "document {} -> {:?}",
        document.id().0,
        stage
    );
}

/// Load an XML document with default parser options.
pub async fn load_xml_document(
    context: Option<Arc<BrowsingContext>>,
    options: CreateDocumentOptions,
    cancel: &CancelSignal,
) -> Result<Document, LoadError<XmlParseError>> {
    load_xml_document_with(context, options, XmlParserOptions::default(), cancel).await
}

pub async fn load_xml_document_with(
    context: Option<Arc<BrowsingContext>>,
    options: CreateDocumentOptions,
    parser_options: XmlParserOptions,
    cancel: &CancelSignal,
) -> Result<Document, LoadError<XmlParseError>> {
    construct_document(context, options, &XmlDomBuilder, parser_options, cancel).await
}

/// Create a document, attach it to its browsing context, announce it, then
/// parse into it.
///
/// Ordering guarantees:
/// - The context's active document is the new document before the start
///   event is published and before the parser runs.
/// - The start event is published at most once, only when the context's
///   configuration has an event publisher.
/// - End listeners fire only after the parser finished successfully.
///
/// Parser errors are returned unchanged inside [`LoadError::Parser`],
/// alongside the partial document. Neither a failure nor a cancellation
/// detaches the document from the context.
pub async fn construct_document<P>(
    context: Option<Arc<BrowsingContext>>,
    mut options: CreateDocumentOptions,
    parser: &P,
    parser_options: XmlParserOptions,
    cancel: &CancelSignal,
) -> Result<Document, LoadError<P::Error>>
where
    P: DocumentParser + ?Sized,
{
    let source = std::mem::take(&mut options.source);
    let mut document = Document::new_xml(context, source);
    enter(&document, Stage::Created);

    document.setup(&options);
    let context = Arc::clone(document.context());
    context.navigate_to(&document);
    enter(&document, Stage::Attached);

    let span = ParseSpan::new(document.id(), context.id(), document.content_type());
    if let Some(events) = context.configuration().events() {
        events.publish(&span.start_event(&document));
    }

    enter(&document, Stage::Parsing);
    let status = match parser.parse(&mut document, parser_options, cancel).await {
        Ok(status) => status,
        Err(err) => {
            log::warn!(
                target: "runtime_parse.pipeline",
                "document {} failed to parse: {err}",
                document.id().0
            );
            return Err(LoadError::Parser {
                source: err,
                document: Box::new(document),
            });
        }
    };

    if status == ParseStatus::Interrupted || cancel.is_cancelled() {
        enter(&document, Stage::Cancelled);
        log::warn!(
            target: "runtime_parse.pipeline",
            "document {} cancelled with {} nodes built",
            document.id().0,
            document.len()
        );
        return Err(LoadError::Cancelled(Box::new(document)));
    }

    span.fire_end();
    enter(&document, Stage::Completed);
    Ok(document)
}
