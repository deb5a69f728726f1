use shared::{FieldValue, MvcError, MvcResult, Value, ValueType};

use crate::{controller::ActionContext, result::ActionResult};

/// Name and parameter types of a callable action; what the resolver matches on.
pub trait ActionSignature {
    fn name(&self) -> &str;
    fn params(&self) -> &[ValueType];
}

type Handler<C> = Box<dyn Fn(&mut C, &mut ActionContext<'_>, Vec<Value>) -> MvcResult<ActionResult>>;

pub struct ActionEntry<C> {
    name: &'static str,
    params: Vec<ValueType>,
    handler: Handler<C>,
}

impl<C> ActionSignature for ActionEntry<C> {
    fn name(&self) -> &str {
        self.name
    }

    fn params(&self) -> &[ValueType] {
        &self.params
    }
}

/// Static action table of one controller type, built once at registration.
pub struct ActionTable<C> {
    entries: Vec<ActionEntry<C>>,
}

impl<C> Default for ActionTable<C> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

fn take_arg<T: FieldValue>(
    cx: &ActionContext<'_>,
    index: usize,
    values: &mut std::vec::IntoIter<Value>,
) -> MvcResult<T> {
    let value = values.next().unwrap_or_default();
    T::from_value(value).map_err(|source| MvcError::ActionParamTypeMismatch {
        controller: cx.controller_name().to_string(),
        action: cx.action_name().to_string(),
        index,
        source,
    })
}

impl<C: 'static> ActionTable<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[ActionEntry<C>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn action0(
        &mut self,
        name: &'static str,
        f: fn(&mut C, &mut ActionContext<'_>) -> MvcResult<ActionResult>,
    ) -> &mut Self {
        self.push(
            name,
            Vec::new(),
            Box::new(move |c: &mut C, cx: &mut ActionContext<'_>, _: Vec<Value>| f(c, cx)),
        )
    }

    pub fn action1<A: FieldValue>(
        &mut self,
        name: &'static str,
        f: fn(&mut C, &mut ActionContext<'_>, A) -> MvcResult<ActionResult>,
    ) -> &mut Self {
        self.push(
            name,
            vec![A::value_type()],
            Box::new(move |c: &mut C, cx: &mut ActionContext<'_>, values: Vec<Value>| {
                let mut values = values.into_iter();
                let a = take_arg::<A>(cx, 0, &mut values)?;
                f(c, cx, a)
            }),
        )
    }

    pub fn action2<A: FieldValue, B: FieldValue>(
        &mut self,
        name: &'static str,
        f: fn(&mut C, &mut ActionContext<'_>, A, B) -> MvcResult<ActionResult>,
    ) -> &mut Self {
        self.push(
            name,
            vec![A::value_type(), B::value_type()],
            Box::new(move |c: &mut C, cx: &mut ActionContext<'_>, values: Vec<Value>| {
                let mut values = values.into_iter();
                let a = take_arg::<A>(cx, 0, &mut values)?;
                let b = take_arg::<B>(cx, 1, &mut values)?;
                f(c, cx, a, b)
            }),
        )
    }

    pub fn action3<A: FieldValue, B: FieldValue, D: FieldValue>(
        &mut self,
        name: &'static str,
        f: fn(&mut C, &mut ActionContext<'_>, A, B, D) -> MvcResult<ActionResult>,
    ) -> &mut Self {
        self.push(
            name,
            vec![A::value_type(), B::value_type(), D::value_type()],
            Box::new(move |c: &mut C, cx: &mut ActionContext<'_>, values: Vec<Value>| {
                let mut values = values.into_iter();
                let a = take_arg::<A>(cx, 0, &mut values)?;
                let b = take_arg::<B>(cx, 1, &mut values)?;
                let d = take_arg::<D>(cx, 2, &mut values)?;
                f(c, cx, a, b, d)
            }),
        )
    }

    fn push(&mut self, name: &'static str, params: Vec<ValueType>, handler: Handler<C>) -> &mut Self {
        self.entries.push(ActionEntry {
            name,
            params,
            handler,
        });
        self
    }

    /// Calls entry `index`, checking arity before converting each argument strictly.
    pub fn invoke(
        &self,
        index: usize,
        controller: &mut C,
        cx: &mut ActionContext<'_>,
        values: Vec<Value>,
    ) -> MvcResult<ActionResult> {
        let entry = self.entries.get(index).ok_or_else(|| MvcError::ActionNotFound {
            controller: cx.controller_name().to_string(),
            action: cx.action_name().to_string(),
            arity: values.len(),
        })?;
        if entry.params.len() != values.len() {
            return Err(MvcError::ActionParamCountMismatch {
                controller: cx.controller_name().to_string(),
                action: entry.name.to_string(),
                expected: entry.params.len(),
                actual: values.len(),
            });
        }
        (entry.handler)(controller, cx, values)
    }
}
