use thiserror::Error;

use crate::workflow::payment_gate::GateBlockReason;
use crate::workflow::permissions::StatusAction;
use crate::workflow::registry::RegistryError;
use crate::workflow::transitions::TransitionRejection;
use crate::workflow::validation::ValidationReport;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid status transition from `{from}` to `{to}`: {reason}")]
    InvalidTransition { from: String, to: String, reason: TransitionRejection },
    #[error("status `{status}` blocks this action: {reason}")]
    PaymentGateBlocked { status: String, reason: GateBlockReason },
    #[error("action {action:?} is not permitted while in status `{status}`")]
    ActionNotPermitted { status: String, action: StatusAction },
    #[error(transparent)]
    Validation(#[from] ValidationReport),
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("persistence failure: {0}")]
    Persistence(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

impl From<RegistryError> for ApplicationError {
    fn from(value: RegistryError) -> Self {
        match value {
            RegistryError::Validation(report) => Self::Domain(DomainError::Validation(report)),
            RegistryError::NotFound(id) => Self::Domain(DomainError::InvariantViolation(format!(
                "status `{id}` does not exist in the draft"
            ))),
            other @ (RegistryError::Store(_) | RegistryError::Timeout { .. }) => {
                Self::Persistence(other.to_string())
            }
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => {
                "The request could not be processed. Check inputs and try again."
            }
            Self::ServiceUnavailable { .. } => {
                "Status settings could not be saved right now. Your changes are kept; please retry."
            }
            Self::Internal { .. } => "An unexpected internal error occurred.",
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::BadRequest { correlation_id: id, .. }
            | InterfaceError::ServiceUnavailable { correlation_id: id, .. }
            | InterfaceError::Internal { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        match value {
            ApplicationError::Domain(error) => {
                Self::BadRequest { message: error.to_string(), correlation_id: "unassigned".to_owned() }
            }
            ApplicationError::Persistence(message) => {
                Self::ServiceUnavailable { message, correlation_id: "unassigned".to_owned() }
            }
            ApplicationError::Configuration(message) => {
                Self::Internal { message, correlation_id: "unassigned".to_owned() }
            }
        }
    }
}
