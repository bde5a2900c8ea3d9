pub mod defaults;
pub mod engine;
pub mod expiry;
pub mod payment_gate;
pub mod permissions;
pub mod registry;
pub mod store;
pub mod transitions;
pub mod validation;

pub use engine::{AppliedTransition, WorkflowEngine};
pub use payment_gate::{
    GateBlockReason, GateResult, MilestoneEvaluation, PaymentGateEvaluator,
    DEFAULT_MIN_PAYMENT_PERCENTAGE,
};
pub use permissions::{PermissionResolver, PermissionSet, StatusAction, StatusView, VisibilitySet};
pub use registry::{
    CategoryDiff, CommitReport, RegistryError, ReorderDirection, StatusDiff, StatusRegistry,
};
pub use store::{StatusSnapshot, StatusStore, StoreError};
pub use transitions::{TransitionCheck, TransitionRejection, TransitionValidator};
pub use validation::{ConfigValidator, FieldIssue, ValidationReport};
