use std::{slice, vec};

use shared::Value;

/// Ordered positional arguments for an action, built explicitly at the call site.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionArgs(Vec<Value>);

/// A record that expands into positional action arguments, in declaration order.
pub trait ParamRecord {
    fn param_values(&self) -> Vec<Value>;
}

impl ActionArgs {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn from_values(values: Vec<Value>) -> Self {
        Self(values)
    }

    pub fn from_record<R: ParamRecord + ?Sized>(record: &R) -> Self {
        Self(record.param_values())
    }

    pub fn push(&mut self, value: impl Into<Value>) {
        self.0.push(value.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    pub fn values(&self) -> &[Value] {
        &self.0
    }

    pub fn into_values(self) -> Vec<Value> {
        self.0
    }

    pub fn iter(&self) -> slice::Iter<'_, Value> {
        self.0.iter()
    }
}

impl From<Vec<Value>> for ActionArgs {
    fn from(values: Vec<Value>) -> Self {
        Self(values)
    }
}

impl FromIterator<Value> for ActionArgs {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for ActionArgs {
    type Item = Value;
    type IntoIter = vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ActionArgs {
    type Item = &'a Value;
    type IntoIter = slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Builds [`ActionArgs`] from anything convertible into a `Value`.
///
/// ```ignore
/// binder.action("Save", args![1, "x"])?;
/// ```
#[macro_export]
macro_rules! args {
    () => {
        $crate::ActionArgs::none()
    };
    ($($value:expr),+ $(,)?) => {
        $crate::ActionArgs::from_values(::std::vec![$($crate::Value::from($value)),+])
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SaveParams {
        id: i64,
        name: &'static str,
    }

    impl ParamRecord for SaveParams {
        fn param_values(&self) -> Vec<Value> {
            vec![Value::from(self.id), Value::from(self.name)]
        }
    }

    #[test]
    fn record_expands_in_declaration_order() {
        let args = ActionArgs::from_record(&SaveParams { id: 1, name: "x" });
        assert_eq!(args, crate::args![1i64, "x"]);
    }

    #[test]
    fn empty_macro_builds_no_arguments() {
        let args = crate::args![];
        assert!(args.is_empty());
        assert_eq!(args, ActionArgs::none());
    }
}
