use std::{any::Any, fmt, rc::Rc};

use crate::value::{ConversionError, FieldValue, Value, ValueType};

/// A plain named-property data holder bound to views.
///
/// Property access goes through the static field table returned by
/// [`Model::fields`]; build it with the [`fields!`](crate::fields) macro.
pub trait Model: Any + Clone + Default + fmt::Debug {
    const NAME: &'static str;

    fn fields() -> Vec<Field<Self>>;
}

/// One named property of a model with typed accessors.
pub struct Field<M> {
    name: &'static str,
    ty: ValueType,
    nullable: bool,
    get: Rc<dyn Fn(&M) -> Value>,
    set: Rc<dyn Fn(&mut M, Value) -> Result<(), ConversionError>>,
}

impl<M: 'static> Field<M> {
    pub fn new<T: FieldValue>(name: &'static str, get: fn(&M) -> T, set: fn(&mut M, T)) -> Self {
        Self {
            name,
            ty: T::value_type(),
            nullable: T::NULLABLE,
            get: Rc::new(move |model: &M| get(model).into_value()),
            set: Rc::new(move |model: &mut M, value: Value| {
                set(model, T::from_value(value)?);
                Ok(())
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Underlying type, with optional wrappers removed.
    pub fn value_type(&self) -> ValueType {
        self.ty
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn get(&self, model: &M) -> Value {
        (self.get)(model)
    }

    /// Stores a value that already has the field's exact type.
    pub fn set(&self, model: &mut M, value: Value) -> Result<(), ConversionError> {
        (self.set)(model, value)
    }

    /// Converts `value` to the field's underlying type and stores it.
    ///
    /// Nullable fields take null for null or blank text.
    pub fn assign(&self, model: &mut M, value: Value) -> Result<(), ConversionError> {
        let converted = if value.is_null() || (self.nullable && value.is_blank_text()) {
            if !self.nullable {
                return Err(ConversionError::Null { to: self.ty });
            }
            Value::Null
        } else {
            value.convert_to(self.ty)?
        };
        self.set(model, converted)
    }
}

impl<M> Clone for Field<M> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            ty: self.ty,
            nullable: self.nullable,
            get: Rc::clone(&self.get),
            set: Rc::clone(&self.set),
        }
    }
}

impl<M> fmt::Debug for Field<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .field("nullable", &self.nullable)
            .finish()
    }
}

/// Looks a field up by name, exact match first and then ignoring ASCII case.
pub fn field_named<M: Model>(name: &str) -> Option<Field<M>> {
    let fields = M::fields();
    let exact = fields.iter().position(|field| field.name == name);
    let index = exact.or_else(|| {
        fields
            .iter()
            .position(|field| field.name.eq_ignore_ascii_case(name))
    })?;
    fields.into_iter().nth(index)
}

pub fn model_values<M: Model>(model: &M) -> Vec<(&'static str, Value)> {
    M::fields()
        .iter()
        .map(|field| (field.name(), field.get(model)))
        .collect()
}

/// Builds a model's field table.
///
/// ```ignore
/// fields!(EmpModel {
///     id: i64 => "ID",
///     birthday: Option<NaiveDateTime> => "Birthday",
/// })
/// ```
#[macro_export]
macro_rules! fields {
    ($model:ty { $($field:ident : $ty:ty => $name:literal),* $(,)? }) => {
        vec![$(
            $crate::model::Field::<$model>::new::<$ty>(
                $name,
                |m: &$model| -> $ty { ::std::clone::Clone::clone(&m.$field) },
                |m: &mut $model, v: $ty| m.$field = v,
            )
        ),*]
    };
}
