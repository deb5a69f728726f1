//! Types shared by the dispatch engine and its hosts: loosely-typed values,
//! the model contract, identifiers, dialog/creation modes and the error taxonomy.

pub mod domain;
pub mod error;
pub mod model;
pub mod value;

pub use domain::{ActionMode, ActionOrigin, ControlId, CreationMode, ToActionFlag, WindowId};
pub use error::{ErrorKind, ErrorReport, MvcError, MvcResult};
pub use model::{Field, Model};
pub use value::{ConversionError, FieldValue, ModelType, ModelValue, Value, ValueType};
