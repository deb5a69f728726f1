use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::value::ConversionError;

pub type MvcResult<T> = Result<T, MvcError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ActionNotFound,
    ActionAmbiguous,
    ActionParamCountMismatch,
    ActionParamTypeMismatch,
    ViewTypeNotFound,
    ViewContractMissing,
    ModelUpdateError,
    ModelRowNotFound,
    ControllerNotFound,
    ControllerNameInvalid,
    ControllerBusy,
    ArgumentError,
    UnknownModelField,
}

impl ErrorKind {
    /// Only per-field update failures are recoverable; everything else is a
    /// configuration or programming defect.
    pub fn is_recoverable(self) -> bool {
        matches!(self, ErrorKind::ModelUpdateError | ErrorKind::ModelRowNotFound)
    }
}

#[derive(Debug, Clone, Error)]
pub enum MvcError {
    #[error("{controller}: no action '{action}' takes {arity} argument(s)")]
    ActionNotFound {
        controller: String,
        action: String,
        arity: usize,
    },
    #[error("{controller}: cannot choose between overloads of '{action}'; every argument needs a concrete, non-null type matching one overload exactly")]
    ActionAmbiguous { controller: String, action: String },
    #[error("{controller}: action '{action}' takes {expected} argument(s), {actual} supplied")]
    ActionParamCountMismatch {
        controller: String,
        action: String,
        expected: usize,
        actual: usize,
    },
    #[error("{controller}: argument {index} of action '{action}' does not match its parameter type: {source}")]
    ActionParamTypeMismatch {
        controller: String,
        action: String,
        index: usize,
        #[source]
        source: ConversionError,
    },
    #[error("view type not found; tried {tried}")]
    ViewTypeNotFound { tried: String },
    #[error("view '{view}' does not satisfy the view contract: {reason}")]
    ViewContractMissing { view: String, reason: String },
    #[error("model field '{field}' could not be updated: {source}")]
    ModelUpdate {
        field: String,
        #[source]
        source: ConversionError,
    },
    #[error("no row with {key} = {value} in the bound data source")]
    ModelRowNotFound { key: String, value: String },
    #[error("controller '{0}' could not be resolved")]
    ControllerNotFound(String),
    #[error("controller type name '{name}' must end with '{suffix}'")]
    ControllerNameInvalid { name: String, suffix: String },
    #[error("controller '{0}' is already executing an action")]
    ControllerBusy(String),
    #[error("invalid argument '{name}': {reason}")]
    Argument { name: String, reason: String },
    #[error("model '{model}' has no field named '{field}'")]
    UnknownModelField { model: String, field: String },
}

impl MvcError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MvcError::ActionNotFound { .. } => ErrorKind::ActionNotFound,
            MvcError::ActionAmbiguous { .. } => ErrorKind::ActionAmbiguous,
            MvcError::ActionParamCountMismatch { .. } => ErrorKind::ActionParamCountMismatch,
            MvcError::ActionParamTypeMismatch { .. } => ErrorKind::ActionParamTypeMismatch,
            MvcError::ViewTypeNotFound { .. } => ErrorKind::ViewTypeNotFound,
            MvcError::ViewContractMissing { .. } => ErrorKind::ViewContractMissing,
            MvcError::ModelUpdate { .. } => ErrorKind::ModelUpdateError,
            MvcError::ModelRowNotFound { .. } => ErrorKind::ModelRowNotFound,
            MvcError::ControllerNotFound(_) => ErrorKind::ControllerNotFound,
            MvcError::ControllerNameInvalid { .. } => ErrorKind::ControllerNameInvalid,
            MvcError::ControllerBusy(_) => ErrorKind::ControllerBusy,
            MvcError::Argument { .. } => ErrorKind::ArgumentError,
            MvcError::UnknownModelField { .. } => ErrorKind::UnknownModelField,
        }
    }

    pub fn is_recoverable(&self) -> bool {
        self.kind().is_recoverable()
    }

    pub fn view_contract(view: impl Into<String>, reason: impl Into<String>) -> Self {
        MvcError::ViewContractMissing {
            view: view.into(),
            reason: reason.into(),
        }
    }

    pub fn argument(name: impl Into<String>, reason: impl Into<String>) -> Self {
        MvcError::Argument {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Serializable form of an [`MvcError`] for hosts that report errors outward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReport {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&MvcError> for ErrorReport {
    fn from(value: &MvcError) -> Self {
        Self {
            kind: value.kind(),
            message: value.to_string(),
        }
    }
}
