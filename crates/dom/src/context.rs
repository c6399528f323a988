//! Hosting (browsing) context a document is attached to.

use crate::Document;
use bus::EventPublisher;
use core_types::{ContextId, DocumentId};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// Per-context settings.
#[derive(Clone, Default)]
pub struct Configuration {
    events: Option<Arc<dyn EventPublisher<Document>>>,
}

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_events(mut self, publisher: Arc<dyn EventPublisher<Document>>) -> Self {
        self.events = Some(publisher);
        self
    }

    /// The configured publisher; `None` means lifecycle events are not published.
    pub fn events(&self) -> Option<&Arc<dyn EventPublisher<Document>>> {
        self.events.as_ref()
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("events", &self.events.is_some())
            .finish()
    }
}

/// Owns the active-document slot.
///
/// The slot holds a handle, not the document: a context never keeps a
/// document alive. Concurrent navigations race and the last writer wins.
#[derive(Debug)]
pub struct BrowsingContext {
    id: ContextId,
    configuration: Configuration,
    active: RwLock<Option<DocumentId>>,
}

impl BrowsingContext {
    /// A fresh context with the default configuration.
    pub fn new() -> Arc<Self> {
        Self::with_configuration(Configuration::default())
    }

    pub fn with_configuration(configuration: Configuration) -> Arc<Self> {
        Arc::new(Self {
            id: ContextId::next(),
            configuration,
            active: RwLock::new(None),
        })
    }

    pub fn id(&self) -> ContextId {
        self.id
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    /// Make `document` the active document of this context.
    pub fn navigate_to(&self, document: &Document) {
        log::debug!(
            target: "dom.context",
            "context {:?} navigates to document {:?}",
            self.id,
            document.id()
        );
        *self.active.write().unwrap_or_else(PoisonError::into_inner) = Some(document.id());
    }

    pub fn active_document(&self) -> Option<DocumentId> {
        *self.active.read().unwrap_or_else(PoisonError::into_inner)
    }
}
