use std::{
    any::{Any, TypeId},
    fmt,
    hash::{Hash, Hasher},
    rc::Rc,
};

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

use crate::model::{model_values, Model};

const DATE_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

/// Runtime identity of a model type.
#[derive(Debug, Clone, Copy)]
pub struct ModelType {
    id: TypeId,
    name: &'static str,
}

impl ModelType {
    pub fn of<M: Model>() -> Self {
        Self {
            id: TypeId::of::<M>(),
            name: M::NAME,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is<M: Model>(&self) -> bool {
        self.id == TypeId::of::<M>()
    }
}

impl PartialEq for ModelType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ModelType {}

impl Hash for ModelType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Bool,
    Int,
    Float,
    Text,
    DateTime,
    Model(ModelType),
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Bool => f.write_str("bool"),
            ValueType::Int => f.write_str("int"),
            ValueType::Float => f.write_str("float"),
            ValueType::Text => f.write_str("text"),
            ValueType::DateTime => f.write_str("datetime"),
            ValueType::Model(model) => write!(f, "model {model}"),
        }
    }
}

/// A model instance carried inside a [`Value`].
#[derive(Clone)]
pub struct ModelValue {
    ty: ModelType,
    inner: Rc<dyn Any>,
    values: fn(&dyn Any) -> Vec<(&'static str, Value)>,
}

fn erased_values<M: Model>(model: &dyn Any) -> Vec<(&'static str, Value)> {
    model
        .downcast_ref::<M>()
        .map(model_values::<M>)
        .unwrap_or_default()
}

impl ModelValue {
    pub fn new<M: Model>(model: M) -> Self {
        Self {
            ty: ModelType::of::<M>(),
            inner: Rc::new(model),
            values: erased_values::<M>,
        }
    }

    pub fn model_type(&self) -> ModelType {
        self.ty
    }

    pub fn downcast_ref<M: Model>(&self) -> Option<&M> {
        self.inner.downcast_ref::<M>()
    }

    pub fn to_model<M: Model>(&self) -> Option<M> {
        self.downcast_ref::<M>().cloned()
    }

    /// Field values in declaration order.
    pub fn values(&self) -> Vec<(&'static str, Value)> {
        (self.values)(&*self.inner)
    }

    pub fn get(&self, field: &str) -> Option<Value> {
        self.values()
            .into_iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(field))
            .map(|(_, value)| value)
    }

    pub fn same_instance(&self, other: &ModelValue) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for ModelValue {
    fn eq(&self, other: &Self) -> bool {
        self.ty == other.ty && (self.same_instance(other) || self.values() == other.values())
    }
}

impl fmt::Debug for ModelValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (name, value) in self.values() {
            map.entry(&name, &value);
        }
        map.finish()
    }
}

/// Loosely-typed value moved between controls, models and action arguments.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    DateTime(NaiveDateTime),
    Model(ModelValue),
}

impl Value {
    /// Runtime type, or `None` for null (whose type cannot be inferred).
    pub fn value_type(&self) -> Option<ValueType> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(ValueType::Bool),
            Value::Int(_) => Some(ValueType::Int),
            Value::Float(_) => Some(ValueType::Float),
            Value::Text(_) => Some(ValueType::Text),
            Value::DateTime(_) => Some(ValueType::DateTime),
            Value::Model(model) => Some(ValueType::Model(model.model_type())),
        }
    }

    pub fn type_name(&self) -> String {
        self.value_type()
            .map(|ty| ty.to_string())
            .unwrap_or_else(|| "null".to_string())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_blank_text(&self) -> bool {
        matches!(self, Value::Text(text) if text.trim().is_empty())
    }

    /// Display text; null renders as the empty string.
    pub fn as_text(&self) -> String {
        match self {
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }

    /// Converts to `target`, parsing text and widening or narrowing numbers the
    /// way a general change-type routine does. Null never converts.
    pub fn convert_to(&self, target: ValueType) -> Result<Value, ConversionError> {
        if self.value_type() == Some(target) {
            return Ok(self.clone());
        }

        let unsupported = || ConversionError::Unsupported {
            from: self.type_name(),
            to: target,
        };

        match (self, target) {
            (Value::Null, _) => Err(ConversionError::Null { to: target }),
            (Value::Model(_), ValueType::Text) => Err(unsupported()),
            (value, ValueType::Text) => Ok(Value::Text(value.to_string())),

            (Value::Bool(b), ValueType::Int) => Ok(Value::Int(i64::from(*b))),
            (Value::Float(f), ValueType::Int) => float_to_int(*f, target).map(Value::Int),
            (Value::Text(text), ValueType::Int) => text
                .trim()
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| parse_error(text, target)),

            (Value::Bool(b), ValueType::Float) => Ok(Value::Float(if *b { 1.0 } else { 0.0 })),
            (Value::Int(i), ValueType::Float) => Ok(Value::Float(*i as f64)),
            (Value::Text(text), ValueType::Float) => text
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| parse_error(text, target)),

            (Value::Int(i), ValueType::Bool) => Ok(Value::Bool(*i != 0)),
            (Value::Float(f), ValueType::Bool) => Ok(Value::Bool(*f != 0.0)),
            (Value::Text(text), ValueType::Bool) => match text.trim() {
                t if t.eq_ignore_ascii_case("true") => Ok(Value::Bool(true)),
                t if t.eq_ignore_ascii_case("false") => Ok(Value::Bool(false)),
                _ => Err(parse_error(text, target)),
            },

            (Value::Text(text), ValueType::DateTime) => {
                parse_date_time(text.trim()).ok_or_else(|| parse_error(text, target))
            }

            (Value::Model(model), ValueType::Model(expected)) => Err(ConversionError::Mismatch {
                expected: ValueType::Model(expected),
                found: model.model_type().to_string(),
            }),

            _ => Err(unsupported()),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Text(text) => serde_json::Value::String(text.clone()),
            Value::DateTime(at) => serde_json::Value::String(at.format(DATE_TIME_FORMATS[0]).to_string()),
            Value::Model(model) => serde_json::Value::Object(
                model
                    .values()
                    .into_iter()
                    .map(|(name, value)| (name.to_string(), value.to_json()))
                    .collect(),
            ),
        }
    }
}

fn float_to_int(value: f64, target: ValueType) -> Result<i64, ConversionError> {
    let rounded = value.round();
    if !rounded.is_finite() || rounded < i64::MIN as f64 || rounded > i64::MAX as f64 {
        return Err(ConversionError::OutOfRange {
            value: value.to_string(),
            to: target,
        });
    }
    Ok(rounded as i64)
}

fn parse_error(text: &str, target: ValueType) -> ConversionError {
    ConversionError::Parse {
        text: text.to_string(),
        to: target,
    }
}

fn parse_date_time(text: &str) -> Option<Value> {
    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(Value::DateTime)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(text) => f.write_str(text),
            Value::DateTime(at) => write!(f, "{}", at.format(DATE_TIME_FORMATS[0])),
            Value::Model(model) => write!(f, "{}{:?}", model.model_type(), model),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    #[error("null cannot be assigned to {to}")]
    Null { to: ValueType },
    #[error("cannot convert {from} to {to}")]
    Unsupported { from: String, to: ValueType },
    #[error("cannot parse '{text}' as {to}")]
    Parse { text: String, to: ValueType },
    #[error("{value} is out of range for {to}")]
    OutOfRange { value: String, to: ValueType },
    #[error("expected {expected}, found {found}")]
    Mismatch { expected: ValueType, found: String },
}

/// A Rust type that can travel as a [`Value`]: model fields and action parameters.
///
/// `from_value` is strict: it never converts between value types.
pub trait FieldValue: Sized + 'static {
    /// Whether null is an acceptable value (optional wrappers).
    const NULLABLE: bool = false;

    /// Underlying value type, with optional wrappers removed.
    fn value_type() -> ValueType;

    fn from_value(value: Value) -> Result<Self, ConversionError>;

    fn into_value(self) -> Value;
}

fn mismatch<T: FieldValue>(found: &Value) -> ConversionError {
    match found {
        Value::Null => ConversionError::Null {
            to: T::value_type(),
        },
        other => ConversionError::Mismatch {
            expected: T::value_type(),
            found: other.type_name(),
        },
    }
}

macro_rules! scalar_field_value {
    ($ty:ty, $variant:ident, $value_type:expr) => {
        impl FieldValue for $ty {
            fn value_type() -> ValueType {
                $value_type
            }

            fn from_value(value: Value) -> Result<Self, ConversionError> {
                match value {
                    Value::$variant(inner) => Ok(inner),
                    other => Err(mismatch::<Self>(&other)),
                }
            }

            fn into_value(self) -> Value {
                Value::$variant(self)
            }
        }
    };
}

scalar_field_value!(bool, Bool, ValueType::Bool);
scalar_field_value!(i64, Int, ValueType::Int);
scalar_field_value!(f64, Float, ValueType::Float);
scalar_field_value!(String, Text, ValueType::Text);
scalar_field_value!(NaiveDateTime, DateTime, ValueType::DateTime);

impl FieldValue for i32 {
    fn value_type() -> ValueType {
        ValueType::Int
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Int(inner) => i32::try_from(inner).map_err(|_| ConversionError::OutOfRange {
                value: inner.to_string(),
                to: ValueType::Int,
            }),
            other => Err(mismatch::<Self>(&other)),
        }
    }

    fn into_value(self) -> Value {
        Value::Int(i64::from(self))
    }
}

impl<T: FieldValue> FieldValue for Option<T> {
    const NULLABLE: bool = true;

    fn value_type() -> ValueType {
        T::value_type()
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }

    fn into_value(self) -> Value {
        self.map(FieldValue::into_value).unwrap_or(Value::Null)
    }
}

/// Strict extraction of a model from a [`Value`]; used by [`impl_model_value!`].
pub fn model_from_value<M: Model>(value: Value) -> Result<M, ConversionError> {
    match &value {
        Value::Model(model) => model.to_model::<M>().ok_or_else(|| ConversionError::Mismatch {
            expected: ValueType::Model(ModelType::of::<M>()),
            found: model.model_type().to_string(),
        }),
        Value::Null => Err(ConversionError::Null {
            to: ValueType::Model(ModelType::of::<M>()),
        }),
        other => Err(ConversionError::Mismatch {
            expected: ValueType::Model(ModelType::of::<M>()),
            found: other.type_name(),
        }),
    }
}

/// Lets model types be used as action parameters and nested field values.
#[macro_export]
macro_rules! impl_model_value {
    ($($model:ty),+ $(,)?) => {$(
        impl $crate::value::FieldValue for $model {
            fn value_type() -> $crate::value::ValueType {
                $crate::value::ValueType::Model($crate::value::ModelType::of::<$model>())
            }

            fn from_value(
                value: $crate::value::Value,
            ) -> ::std::result::Result<Self, $crate::value::ConversionError> {
                $crate::value::model_from_value::<$model>(value)
            }

            fn into_value(self) -> $crate::value::Value {
                $crate::value::Value::Model($crate::value::ModelValue::new(self))
            }
        }
    )+};
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Value::DateTime(value)
    }
}

impl From<ModelValue> for Value {
    fn from(value: ModelValue) -> Self {
        Value::Model(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}
