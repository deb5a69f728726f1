use std::{any::Any, collections::HashMap, fmt, marker::PhantomData, rc::Rc};

use shared::{ActionMode, CreationMode};

/// Typed key into a [`DataBag`].
pub struct BagKey<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> BagKey<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Clone for BagKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for BagKey<T> {}

impl<T> fmt::Debug for BagKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BagKey({})", self.name)
    }
}

/// Key/value store shared between a controller and the view it drives.
///
/// Values are reference-counted, so cloning a bag to hand it to another
/// window is cheap and both copies see the same values.
#[derive(Clone, Default)]
pub struct DataBag {
    entries: HashMap<&'static str, Rc<dyn Any>>,
}

impl DataBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value stored under `key`, or `None` when it is absent or
    /// was stored with a different type.
    pub fn get<T: 'static>(&self, key: &BagKey<T>) -> Option<&T> {
        self.entries.get(key.name)?.downcast_ref::<T>()
    }

    pub fn get_cloned<T: Clone + 'static>(&self, key: &BagKey<T>) -> Option<T> {
        self.get(key).cloned()
    }

    pub fn insert<T: 'static>(&mut self, key: &BagKey<T>, value: T) {
        self.entries.insert(key.name, Rc::new(value));
    }

    pub fn remove<T: 'static>(&mut self, key: &BagKey<T>) -> bool {
        self.entries.remove(key.name).is_some()
    }

    pub fn contains<T: 'static>(&self, key: &BagKey<T>) -> bool {
        self.get(key).is_some()
    }

    /// Copies every entry of `other` into this bag, replacing same-named entries.
    pub fn merge(&mut self, other: &DataBag) {
        for (name, value) in &other.entries {
            self.entries.insert(name, Rc::clone(value));
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }
}

impl fmt::Debug for DataBag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.keys().collect();
        keys.sort_unstable();
        f.debug_set().entries(keys).finish()
    }
}

/// Per-dispatch state describing how the next view is created and what the
/// dispatch reported back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeBag {
    pub creation: CreationMode,
    pub always_create: bool,
    pub dialog_result: i32,
}

impl ModeBag {
    pub fn new(creation: CreationMode, always_create: bool) -> Self {
        Self {
            creation,
            always_create,
            dialog_result: ActionMode::NOT_A_DIALOG,
        }
    }

    /// The dialog code, or `None` when the dispatch did not end in a modal window.
    pub fn action_mode(&self) -> Option<ActionMode> {
        ActionMode::from_code(self.dialog_result)
    }
}

impl Default for ModeBag {
    fn default() -> Self {
        Self::new(CreationMode::default(), false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COUNT: BagKey<i64> = BagKey::new("count");
    const LABEL: BagKey<String> = BagKey::new("label");
    const COUNT_AS_TEXT: BagKey<String> = BagKey::new("count");

    #[test]
    fn typed_keys_reject_foreign_types() {
        let mut bag = DataBag::new();
        bag.insert(&COUNT, 3);
        assert_eq!(bag.get(&COUNT), Some(&3));
        assert_eq!(bag.get(&COUNT_AS_TEXT), None);
        assert!(bag.remove(&COUNT));
        assert!(bag.is_empty());
    }

    #[test]
    fn clones_share_values_and_merge_overwrites() {
        let mut caller = DataBag::new();
        caller.insert(&LABEL, "before".to_string());
        caller.insert(&COUNT, 1);

        let mut dialog = caller.clone();
        dialog.insert(&LABEL, "after".to_string());
        assert_eq!(caller.get_cloned(&LABEL).as_deref(), Some("before"));

        caller.merge(&dialog);
        assert_eq!(caller.get_cloned(&LABEL).as_deref(), Some("after"));
        assert_eq!(caller.get(&COUNT), Some(&1));
    }

    #[test]
    fn fresh_mode_bag_is_not_a_dialog() {
        let mode = ModeBag::new(CreationMode::Dialog, false);
        assert_eq!(mode.dialog_result, ActionMode::NOT_A_DIALOG);
        assert_eq!(mode.action_mode(), None);
    }
}
