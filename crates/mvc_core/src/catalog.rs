use std::{any::TypeId, cell::RefCell, rc::Rc};

use shared::{ModelType, MvcResult};

use crate::{
    action::ActionTable,
    controller::{Controller, ControllerMeta, ControllerRef},
    view::{DynView, View},
};

/// What a bare name is resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Controller,
    View,
    PartialView,
}

type ControllerFactory = Rc<dyn Fn() -> ControllerRef>;
pub(crate) type ViewFactory = fn() -> Rc<RefCell<dyn DynView>>;

pub(crate) struct ControllerEntry {
    pub(crate) meta: Rc<ControllerMeta>,
    type_id: TypeId,
    factory: ControllerFactory,
}

impl ControllerEntry {
    pub(crate) fn create(&self) -> ControllerRef {
        (self.factory)()
    }
}

#[derive(Clone, Copy)]
pub(crate) enum ViewKind {
    View(ViewFactory),
    Partial,
    /// A plain window registered by name only; it has no binder contract.
    Window,
}

pub(crate) struct ViewEntry {
    pub(crate) name: &'static str,
    pub(crate) model: Option<ModelType>,
    pub(crate) kind: ViewKind,
}

fn create_view<V: View + Default>() -> Rc<RefCell<dyn DynView>> {
    Rc::new(RefCell::new(V::default()))
}

/// Controllers and views known to the application, looked up by naming convention.
#[derive(Default)]
pub(crate) struct Catalog {
    controllers: Vec<ControllerEntry>,
    views: Vec<ViewEntry>,
    suffix: String,
}

impl Catalog {
    pub(crate) fn new(suffix: &str) -> Self {
        Self {
            suffix: suffix.to_string(),
            ..Self::default()
        }
    }

    /// Builds the controller's action table once; every instance shares it.
    pub(crate) fn add_controller<C: Controller>(&mut self) -> MvcResult<()> {
        let type_id = TypeId::of::<C>();
        if self.controllers.iter().any(|entry| entry.type_id == type_id) {
            return Ok(());
        }
        let meta = Rc::new(ControllerMeta::derive(C::NAME, &self.suffix, C::view_prefix())?);
        let mut table = ActionTable::<C>::new();
        C::actions(&mut table);
        let table = Rc::new(table);

        let factory_meta = Rc::clone(&meta);
        self.controllers.push(ControllerEntry {
            meta,
            type_id,
            factory: Rc::new(move || ControllerRef::new(Rc::clone(&factory_meta), Rc::clone(&table))),
        });
        Ok(())
    }

    pub(crate) fn add_view<V: View + Default>(&mut self) {
        self.push_view(V::NAME, Some(ModelType::of::<V::Model>()), ViewKind::View(create_view::<V>));
    }

    pub(crate) fn add_partial<P: View>(&mut self) {
        self.push_view(P::NAME, Some(ModelType::of::<P::Model>()), ViewKind::Partial);
    }

    pub(crate) fn add_window(&mut self, name: &'static str) {
        self.push_view(name, None, ViewKind::Window);
    }

    fn push_view(&mut self, name: &'static str, model: Option<ModelType>, kind: ViewKind) {
        self.views.retain(|entry| !entry.name.eq_ignore_ascii_case(name));
        self.views.push(ViewEntry { name, model, kind });
    }

    /// Controller named `name`, with or without the suffix, ignoring case.
    pub(crate) fn controller(&self, name: &str) -> Option<&ControllerEntry> {
        let name = name.trim();
        self.controllers.iter().find(|entry| {
            let type_name = entry.meta.type_name;
            type_name.eq_ignore_ascii_case(name)
                || type_name
                    .get(..type_name.len().saturating_sub(self.suffix.len()))
                    .is_some_and(|base| !base.is_empty() && base.eq_ignore_ascii_case(name))
        })
    }

    pub(crate) fn controller_of(&self, type_id: TypeId) -> Option<&ControllerEntry> {
        self.controllers.iter().find(|entry| entry.type_id == type_id)
    }

    pub(crate) fn view(&self, name: &str, kind: TypeKind) -> Option<&ViewEntry> {
        self.views.iter().find(|entry| {
            let kind_matches = match (kind, entry.kind) {
                (TypeKind::View, ViewKind::View(_) | ViewKind::Window) => true,
                (TypeKind::PartialView, ViewKind::Partial) => true,
                _ => false,
            };
            kind_matches && entry.name.eq_ignore_ascii_case(name)
        })
    }

    pub(crate) fn resolve(&self, name: &str, kind: TypeKind) -> Option<&'static str> {
        match kind {
            TypeKind::Controller => self.controller(name).map(|entry| entry.meta.type_name),
            TypeKind::View | TypeKind::PartialView => self.view(name, kind).map(|entry| entry.name),
        }
    }

    pub(crate) fn controller_count(&self) -> usize {
        self.controllers.len()
    }

    pub(crate) fn view_count(&self) -> usize {
        self.views.len()
    }
}
