pub mod audit;
pub mod config;
pub mod domain;
pub mod errors;
pub mod notifications;
pub mod workflow;

pub use domain::payment::PaymentState;
pub use domain::status::{
    PaymentMilestone, PaymentRequiredBefore, PaymentType, PaymentValidationRule, StatusCategory,
    StatusConfig, StatusId,
};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use notifications::{InMemoryOutbox, NotificationDispatch, StatusNotification};
pub use workflow::{
    ConfigValidator, PaymentGateEvaluator, PermissionResolver, StatusRegistry, StatusStore,
    TransitionValidator, WorkflowEngine,
};
