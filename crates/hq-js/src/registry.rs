//! Handle registry
//!
//! Documents and selections created by scripts are owned here, one registry
//! per engine instance. Bridge objects only carry small copyable handles that
//! are resolved back through the registry on every call, so a disposed
//! instance or a handle from another instance fails with an error instead of
//! touching freed state.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use hq_css::Selection;
use hq_dom::Document;

use crate::exception::BridgeError;

static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(1);
static LIVE_DOCUMENTS: AtomicUsize = AtomicUsize::new(0);
static LIVE_SELECTIONS: AtomicUsize = AtomicUsize::new(0);

/// Identity of one engine instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(u64);

impl InstanceId {
    fn next() -> Self {
        Self(NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Reference to a registered document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentHandle {
    instance: InstanceId,
    index: u32,
}

impl DocumentHandle {
    pub fn instance(self) -> InstanceId {
        self.instance
    }
}

/// Reference to a registered selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionHandle {
    instance: InstanceId,
    index: u32,
}

impl SelectionHandle {
    pub fn instance(self) -> InstanceId {
        self.instance
    }
}

/// Number of registered objects
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HandleCounts {
    pub documents: usize,
    pub selections: usize,
}

impl HandleCounts {
    pub fn total(self) -> usize {
        self.documents + self.selections
    }
}

/// Objects still registered across every live engine instance in the process
pub fn live_handles() -> HandleCounts {
    HandleCounts {
        documents: LIVE_DOCUMENTS.load(Ordering::Acquire),
        selections: LIVE_SELECTIONS.load(Ordering::Acquire),
    }
}

#[derive(Default)]
struct RegistryState {
    disposed: bool,
    documents: Vec<Rc<Document>>,
    selections: Vec<Selection>,
}

/// Per-instance owner of script-visible documents and selections
pub struct Registry {
    id: InstanceId,
    state: RefCell<RegistryState>,
}

impl Registry {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            id: InstanceId::next(),
            state: RefCell::new(RegistryState::default()),
        })
    }

    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn is_disposed(&self) -> bool {
        self.state.borrow().disposed
    }

    pub fn counts(&self) -> HandleCounts {
        let state = self.state.borrow();
        HandleCounts {
            documents: state.documents.len(),
            selections: state.selections.len(),
        }
    }

    /// Take ownership of a parsed document
    pub fn adopt(&self, document: Document) -> Result<DocumentHandle, BridgeError> {
        let mut state = self.state.borrow_mut();
        if state.disposed {
            return Err(BridgeError::InstanceDisposed(self.id));
        }
        let index = state.documents.len() as u32;
        state.documents.push(Rc::new(document));
        LIVE_DOCUMENTS.fetch_add(1, Ordering::AcqRel);
        Ok(DocumentHandle {
            instance: self.id,
            index,
        })
    }

    pub fn document(&self, handle: DocumentHandle) -> Result<Rc<Document>, BridgeError> {
        self.check(handle.instance)?;
        self.state
            .borrow()
            .documents
            .get(handle.index as usize)
            .cloned()
            .ok_or(BridgeError::InstanceDisposed(self.id))
    }

    pub fn register(&self, selection: Selection) -> Result<SelectionHandle, BridgeError> {
        let mut state = self.state.borrow_mut();
        if state.disposed {
            return Err(BridgeError::InstanceDisposed(self.id));
        }
        let index = state.selections.len() as u32;
        state.selections.push(selection);
        LIVE_SELECTIONS.fetch_add(1, Ordering::AcqRel);
        Ok(SelectionHandle {
            instance: self.id,
            index,
        })
    }

    /// Run `f` against a registered selection.
    ///
    /// The registry stays borrowed while `f` runs; `f` must not call back
    /// into the registry or into script code.
    pub fn with_selection<R>(
        &self,
        handle: SelectionHandle,
        f: impl FnOnce(&Selection) -> R,
    ) -> Result<R, BridgeError> {
        self.check(handle.instance)?;
        let state = self.state.borrow();
        let selection = state
            .selections
            .get(handle.index as usize)
            .ok_or(BridgeError::InstanceDisposed(self.id))?;
        Ok(f(selection))
    }

    /// Release every document and selection. Later lookups fail with
    /// `InstanceDisposed`. Calling it again does nothing.
    pub fn teardown(&self) {
        let (documents, selections) = {
            let mut state = self.state.borrow_mut();
            if state.disposed {
                return;
            }
            state.disposed = true;
            (
                std::mem::take(&mut state.documents),
                std::mem::take(&mut state.selections),
            )
        };

        LIVE_DOCUMENTS.fetch_sub(documents.len(), Ordering::AcqRel);
        LIVE_SELECTIONS.fetch_sub(selections.len(), Ordering::AcqRel);
        tracing::debug!(
            instance = %self.id,
            documents = documents.len(),
            selections = selections.len(),
            "released bridge handles"
        );
    }

    fn check(&self, instance: InstanceId) -> Result<(), BridgeError> {
        if instance != self.id {
            return Err(BridgeError::ForeignHandle {
                handle: instance,
                current: self.id,
            });
        }
        if self.state.borrow().disposed {
            return Err(BridgeError::InstanceDisposed(self.id));
        }
        Ok(())
    }
}

impl Drop for Registry {
    fn drop(&mut self) {
        self.teardown();
    }
}
