//! Parse lifecycle notifications.
//!
//! A [`ParseSpan`] lives for one document construction. Before the
//! tree-construction parser consumes any input, the constructing flow
//! publishes a [`ParseStartEvent`] borrowing the span and the document being
//! built, so observers see the attached, still-empty document. Observers may
//! attach end listeners; those run when the flow calls
//! [`ParseSpan::fire_end`] after the parser resolves.
//!
//! The bus is generic over the document type and does not depend on it.

use core_types::{ContextId, DocumentId};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

type EndListener = Box<dyn FnOnce(&ParseEndEvent) + Send>;

/// Lifecycle of one document construction.
pub struct ParseSpan {
    document: DocumentId,
    context: ContextId,
    content_type: &'static str,
    end_listeners: RefCell<Vec<EndListener>>,
    ended: Cell<bool>,
}

impl ParseSpan {
    pub fn new(document: DocumentId, context: ContextId, content_type: &'static str) -> Self {
        Self {
            document,
            context,
            content_type,
            end_listeners: RefCell::new(Vec::new()),
            ended: Cell::new(false),
        }
    }

    pub fn document_id(&self) -> DocumentId {
        self.document
    }

    pub fn context(&self) -> ContextId {
        self.context
    }

    pub fn content_type(&self) -> &'static str {
        self.content_type
    }

    pub fn has_ended(&self) -> bool {
        self.ended.get()
    }

    /// The start notification for this span, borrowing `document`.
    pub fn start_event<'a, D>(&'a self, document: &'a D) -> ParseStartEvent<'a, D> {
        ParseStartEvent {
            span: self,
            document,
        }
    }

    /// Register a listener for the end of parsing.
    ///
    /// Listeners registered after the end has fired run immediately.
    pub fn on_end(&self, listener: impl FnOnce(&ParseEndEvent) + Send + 'static) {
        if self.ended.get() {
            listener(&self.end_event());
            return;
        }
        self.end_listeners.borrow_mut().push(Box::new(listener));
    }

    /// Signal that parsing has ended. Only the first call has an effect.
    pub fn fire_end(&self) {
        if self.ended.replace(true) {
            return;
        }
        let listeners = std::mem::take(&mut *self.end_listeners.borrow_mut());
        log::debug!(
            target: "bus",
            "parse end for document {:?} ({} listeners)",
            self.document,
            listeners.len()
        );
        let end = self.end_event();
        for listener in listeners {
            listener(&end);
        }
    }

    fn end_event(&self) -> ParseEndEvent {
        ParseEndEvent {
            document: self.document,
            context: self.context,
        }
    }
}

impl fmt::Debug for ParseSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseSpan")
            .field("document", &self.document)
            .field("context", &self.context)
            .field("content_type", &self.content_type)
            .field("ended", &self.ended.get())
            .finish()
    }
}

/// "Parsing is starting" notification, carrying the document itself.
pub struct ParseStartEvent<'a, D> {
    span: &'a ParseSpan,
    document: &'a D,
}

impl<'a, D> ParseStartEvent<'a, D> {
    /// The document under construction: attached, not yet parsed.
    pub fn document(&self) -> &'a D {
        self.document
    }

    pub fn document_id(&self) -> DocumentId {
        self.span.document
    }

    pub fn context(&self) -> ContextId {
        self.span.context
    }

    pub fn content_type(&self) -> &'static str {
        self.span.content_type
    }

    pub fn on_end(&self, listener: impl FnOnce(&ParseEndEvent) + Send + 'static) {
        self.span.on_end(listener);
    }
}

impl<D> fmt::Debug for ParseStartEvent<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ParseStartEvent").field(self.span).finish()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParseEndEvent {
    pub document: DocumentId,
    pub context: ContextId,
}

/// Synchronous notification sink.
///
/// `publish` returns only after every interested party has seen the event.
pub trait EventPublisher<D>: Send + Sync {
    fn publish(&self, event: &ParseStartEvent<'_, D>);
}

type Observer<D> = Arc<dyn Fn(&ParseStartEvent<'_, D>) + Send + Sync>;

/// Observer registry that fans a published event out to its subscribers in
/// subscription order.
pub struct EventBus<D: 'static> {
    observers: RwLock<Vec<Observer<D>>>,
}

impl<D: 'static> EventBus<D> {
    pub fn new() -> Self {
        Self {
            observers: RwLock::new(Vec::new()),
        }
    }

    pub fn subscribe(&self, observer: impl Fn(&ParseStartEvent<'_, D>) + Send + Sync + 'static) {
        self.observers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(observer));
    }

    pub fn observer_count(&self) -> usize {
        self.observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl<D: 'static> Default for EventBus<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: 'static> EventPublisher<D> for EventBus<D> {
    fn publish(&self, event: &ParseStartEvent<'_, D>) {
        // Snapshot so observers may subscribe re-entrantly.
        let observers: Vec<Observer<D>> = self
            .observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        log::debug!(
            target: "bus",
            "publish parse start for document {:?} to {} observers",
            event.document_id(),
            observers.len()
        );
        for observer in observers {
            observer(event);
        }
    }
}

impl<D: 'static> fmt::Debug for EventBus<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("observers", &self.observer_count())
            .finish()
    }
}
