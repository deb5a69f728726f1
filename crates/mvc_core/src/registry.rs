use std::{
    any::Any,
    cell::{Cell, RefCell},
    collections::HashMap,
    fmt,
    rc::Rc,
};

use shared::WindowId;
use tracing::debug;

use crate::{
    binder::DynBinder,
    view::{DynView, View},
};

type CloseHandler = Box<dyn FnOnce(&Window)>;

struct WindowInner {
    id: WindowId,
    view_key: &'static str,
    view: Rc<RefCell<dyn DynView>>,
    binder: Rc<dyn DynBinder>,
    close_handlers: RefCell<Vec<CloseHandler>>,
    closed: Cell<bool>,
}

/// Handle to a live window: its view instance and the binder driving it.
#[derive(Clone)]
pub struct Window {
    inner: Rc<WindowInner>,
}

impl Window {
    pub(crate) fn new(
        id: WindowId,
        view_key: &'static str,
        view: Rc<RefCell<dyn DynView>>,
        binder: Rc<dyn DynBinder>,
    ) -> Self {
        Self {
            inner: Rc::new(WindowInner {
                id,
                view_key,
                view,
                binder,
                close_handlers: RefCell::new(Vec::new()),
                closed: Cell::new(false),
            }),
        }
    }

    pub fn id(&self) -> WindowId {
        self.inner.id
    }

    /// Catalog name of the view shown in this window.
    pub fn view_key(&self) -> &'static str {
        self.inner.view_key
    }

    pub fn view(&self) -> Rc<RefCell<dyn DynView>> {
        Rc::clone(&self.inner.view)
    }

    pub fn binder(&self) -> Rc<dyn DynBinder> {
        Rc::clone(&self.inner.binder)
    }

    /// Runs `f` on the concrete view when it is a `V`.
    pub fn with_view<V: View, R>(&self, f: impl FnOnce(&V) -> R) -> Option<R> {
        let view = self.inner.view.try_borrow().ok()?;
        view.as_any().downcast_ref::<V>().map(f)
    }

    /// The toolkit surface the view exposes.
    pub fn native(&self) -> Option<Rc<dyn Any>> {
        self.inner.view.try_borrow().ok()?.native_surface()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.get()
    }

    pub fn on_closed(&self, handler: impl FnOnce(&Window) + 'static) {
        self.inner.close_handlers.borrow_mut().push(Box::new(handler));
    }

    /// Called by the host when the window closes; close handlers run once.
    pub fn notify_closed(&self) {
        if self.inner.closed.replace(true) {
            return;
        }
        let handlers = std::mem::take(&mut *self.inner.close_handlers.borrow_mut());
        for handler in handlers {
            handler(self);
        }
    }

    pub fn ptr_eq(&self, other: &Window) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for Window {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl fmt::Debug for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Window")
            .field("id", &self.inner.id)
            .field("view", &self.inner.view_key)
            .field("closed", &self.inner.closed.get())
            .finish()
    }
}

/// Live windows per view name, in creation order.
#[derive(Default)]
pub struct ViewInstanceRegistry {
    instances: HashMap<String, Vec<Window>>,
}

fn key_of(view: &str) -> String {
    view.to_ascii_lowercase()
}

impl ViewInstanceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `window` under its view name; a window already present is not added again.
    pub fn add(&mut self, window: &Window) -> bool {
        let list = self.instances.entry(key_of(window.view_key())).or_default();
        if list.iter().any(|existing| existing.id() == window.id()) {
            return false;
        }
        list.push(window.clone());
        debug!(view = window.view_key(), window = %window.id(), count = list.len(), "window registered");
        true
    }

    /// Removes exactly the window `id` of view `view`.
    pub fn remove(&mut self, view: &str, id: WindowId) -> bool {
        let key = key_of(view);
        let Some(list) = self.instances.get_mut(&key) else {
            return false;
        };
        let before = list.len();
        list.retain(|window| window.id() != id);
        let removed = list.len() != before;
        if list.is_empty() {
            self.instances.remove(&key);
        }
        if removed {
            debug!(view, window = %id, "window deregistered");
        }
        removed
    }

    /// Most recently created live window of `view`.
    pub fn latest(&self, view: &str) -> Option<Window> {
        self.instances.get(&key_of(view))?.last().cloned()
    }

    pub fn instances(&self, view: &str) -> Vec<Window> {
        self.instances.get(&key_of(view)).cloned().unwrap_or_default()
    }

    pub fn contains(&self, id: WindowId) -> bool {
        self.instances
            .values()
            .any(|list| list.iter().any(|window| window.id() == id))
    }

    pub fn len(&self) -> usize {
        self.instances.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

#[cfg(test)]
#[path = "tests/registry_tests.rs"]
mod tests;
