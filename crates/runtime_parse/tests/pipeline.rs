use async_trait::async_trait;
use bus::EventBus;
use core_types::DocumentId;
use dom::{
    BrowsingContext, Configuration, Document, Element, Namespace, XML_CONTENT_TYPE,
    XmlParseError, XmlParserOptions,
};
use runtime_parse::{
    CancelSignal, CreateDocumentOptions, DocumentParser, LoadError, ParseStatus, XmlDomBuilder,
    cancel_pair, construct_document, load_xml_document, load_xml_document_with,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// What an observer saw of the document handed to it at publish time.
#[derive(Clone, Debug, PartialEq)]
struct Sighting {
    document: DocumentId,
    active: Option<DocumentId>,
    content_type: &'static str,
    has_root: bool,
    source: String,
}

struct Observed {
    context: Arc<BrowsingContext>,
    sightings: Arc<Mutex<Vec<Sighting>>>,
    ended: Arc<AtomicUsize>,
}

/// A context whose event bus records a [`Sighting`] of every start event.
fn observed_context() -> Observed {
    let bus: Arc<EventBus<Document>> = Arc::new(EventBus::new());
    let context =
        BrowsingContext::with_configuration(Configuration::new().with_events(bus.clone()));
    let sightings = Arc::new(Mutex::new(Vec::new()));
    let ended = Arc::new(AtomicUsize::new(0));

    let seen = Arc::clone(&sightings);
    let end_count = Arc::clone(&ended);
    bus.subscribe(move |event| {
        let document = event.document();
        assert_eq!(document.id(), event.document_id());
        seen.lock().unwrap().push(Sighting {
            document: document.id(),
            active: document.context().active_document(),
            content_type: event.content_type(),
            has_root: document.document_element().is_some(),
            source: document.source().text().to_string(),
        });
        let end_count = Arc::clone(&end_count);
        event.on_end(move |_| {
            end_count.fetch_add(1, Ordering::SeqCst);
        });
    });

    Observed {
        context,
        sightings,
        ended,
    }
}

#[tokio::test]
async fn observers_see_document_already_attached() {
    let observed = observed_context();
    let document = load_xml_document(
        Some(Arc::clone(&observed.context)),
        CreateDocumentOptions::new("<r><c>text</c></r>"),
        &CancelSignal::never(),
    )
    .await
    .expect("load");

    let sightings = observed.sightings.lock().unwrap().clone();
    assert_eq!(
        sightings,
        vec![Sighting {
            document: document.id(),
            active: Some(document.id()),
            content_type: XML_CONTENT_TYPE,
            has_root: false,
            source: "<r><c>text</c></r>".to_string(),
        }]
    );
    assert_eq!(observed.ended.load(Ordering::SeqCst), 1);
    assert_eq!(observed.context.active_document(), Some(document.id()));
    assert!(Arc::ptr_eq(document.context(), &observed.context));
    assert_eq!(
        document.outline(),
        "#document\n  <r>\n    <c>\n      #text \"text\"\n"
    );
}

#[tokio::test]
async fn loads_without_context_or_publisher() {
    let document = load_xml_document(
        None,
        CreateDocumentOptions::new("<svg><circle/></svg>")
            .with_charset("utf-8")
            .with_content_type_hint("image/svg+xml"),
        &CancelSignal::never(),
    )
    .await
    .expect("load");

    assert_eq!(document.context().active_document(), Some(document.id()));
    assert!(document.context().configuration().events().is_none());
    assert_eq!(document.content_type(), XML_CONTENT_TYPE);
    assert_eq!(document.charset(), Some("utf-8"));
    assert_eq!(document.content_type_hint(), Some("image/svg+xml"));
    assert_eq!(document.title(), "");
    assert_eq!(document.outline(), "#document\n  <svg>\n    <circle>\n");
}

#[tokio::test]
async fn cancelled_before_parsing_keeps_document_attached() {
    let observed = observed_context();
    let (handle, signal) = cancel_pair();
    handle.cancel();

    let err = load_xml_document(
        Some(Arc::clone(&observed.context)),
        CreateDocumentOptions::new("<r/>"),
        &signal,
    )
    .await
    .expect_err("cancelled");

    let LoadError::Cancelled(document) = err else {
        panic!("expected cancellation, got {err:?}");
    };
    assert_eq!(observed.context.active_document(), Some(document.id()));
    assert_eq!(document.document_element(), None);
    assert_eq!(observed.sightings.lock().unwrap().len(), 1);
    assert_eq!(observed.ended.load(Ordering::SeqCst), 0);
}

/// Builds one element, then waits for cancellation.
struct StallingParser {
    finish_anyway: bool,
}

#[async_trait]
impl DocumentParser for StallingParser {
    type Error = XmlParseError;

    async fn parse(
        &self,
        document: &mut Document,
        _options: XmlParserOptions,
        cancel: &CancelSignal,
    ) -> Result<ParseStatus, XmlParseError> {
        let element = Element::new(document.id(), "partial", None, Namespace::None);
        document.append_element(document.root(), element);
        cancel.cancelled().await;
        if self.finish_anyway {
            Ok(ParseStatus::Finished)
        } else {
            Ok(ParseStatus::Interrupted)
        }
    }
}

#[tokio::test]
async fn cancel_during_parse_returns_partial_document() {
    for finish_anyway in [false, true] {
        let observed = observed_context();
        let (handle, signal) = cancel_pair();
        let parser = StallingParser { finish_anyway };

        let load = construct_document(
            Some(Arc::clone(&observed.context)),
            CreateDocumentOptions::new("<ignored/>"),
            &parser,
            XmlParserOptions::default(),
            &signal,
        );
        let cancel = async {
            tokio::task::yield_now().await;
            handle.cancel();
        };
        let (result, ()) = tokio::join!(load, cancel);

        let err = result.expect_err("cancelled");
        assert!(err.is_cancelled());
        let LoadError::Cancelled(document) = err else {
            unreachable!();
        };
        assert_eq!(document.outline(), "#document\n  <partial>\n");
        assert_eq!(observed.context.active_document(), Some(document.id()));
        assert_eq!(observed.ended.load(Ordering::SeqCst), 0);
    }
}

#[tokio::test]
async fn parser_errors_pass_through_unchanged() {
    let observed = observed_context();
    let strict = XmlParserOptions {
        is_strict: true,
        ..XmlParserOptions::default()
    };
    let err = load_xml_document_with(
        Some(Arc::clone(&observed.context)),
        CreateDocumentOptions::new("<r><a></r>"),
        strict,
        &CancelSignal::never(),
    )
    .await
    .expect_err("mismatched end tag");

    let inner = err.parser_error().expect("parser error");
    assert!(matches!(
        inner,
        XmlParseError::MismatchedEndTag { expected, found, .. } if expected == "a" && found == "r"
    ));
    assert_eq!(err.to_string(), inner.to_string());
    assert!(!err.is_cancelled());
    assert_eq!(observed.ended.load(Ordering::SeqCst), 0);

    let partial = err.into_document();
    assert_eq!(observed.context.active_document(), Some(partial.id()));
    assert_eq!(partial.outline(), "#document\n  <r>\n    <a>\n");
    assert_eq!(partial.source().text(), "<r><a></r>");
}

#[tokio::test]
async fn later_load_becomes_active() {
    let observed = observed_context();
    let first = load_xml_document(
        Some(Arc::clone(&observed.context)),
        CreateDocumentOptions::new("<a/>"),
        &CancelSignal::never(),
    )
    .await
    .expect("first");
    let second = load_xml_document(
        Some(Arc::clone(&observed.context)),
        CreateDocumentOptions::new("<b/>"),
        &CancelSignal::never(),
    )
    .await
    .expect("second");

    assert_ne!(first.id(), second.id());
    assert_eq!(observed.context.active_document(), Some(second.id()));
    assert_eq!(observed.sightings.lock().unwrap().len(), 2);
    assert_eq!(observed.ended.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn long_documents_yield_and_complete() {
    let body = "<item>x</item>".repeat(500);
    let source = format!("<list>{body}</list>");
    let options = XmlParserOptions {
        yield_interval: 1,
        ..XmlParserOptions::default()
    };
    let parser: &dyn DocumentParser<Error = XmlParseError> = &XmlDomBuilder;
    let document = construct_document(
        None,
        CreateDocumentOptions::new(source),
        parser,
        options,
        &CancelSignal::never(),
    )
    .await
    .expect("load");

    let root = document.document_element().expect("root");
    assert_eq!(document.children(root).len(), 500);
    assert_eq!(document.text_content(root), "x".repeat(500));
}

#[tokio::test]
async fn interleaved_loads_leave_last_navigation_active() {
    let context = BrowsingContext::new();
    let never = CancelSignal::never();
    let a = load_xml_document(
        Some(Arc::clone(&context)),
        CreateDocumentOptions::new(format!("<a>{}</a>", "<i/>".repeat(300))),
        &never,
    );
    let b = load_xml_document(
        Some(Arc::clone(&context)),
        CreateDocumentOptions::new("<b/>"),
        &never,
    );
    // `a` attaches first and yields mid-parse; `b` then attaches and finishes.
    let (a, b) = tokio::join!(a, b);
    let (a, b) = (a.expect("a"), b.expect("b"));
    assert_eq!(context.active_document(), Some(b.id()));
    assert_eq!(a.children(a.document_element().expect("root")).len(), 300);
}
