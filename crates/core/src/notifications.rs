use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::domain::status::StatusConfig;

/// Email request raised when an entity enters a status with `triggersEmail`.
/// Delivery belongs to whoever drains the dispatcher.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusNotification {
    pub status_name: String,
    pub email_template: String,
    pub entity_id: String,
}

impl StatusNotification {
    /// `None` unless `status` triggers email and names a template.
    pub fn for_status(status: &StatusConfig, entity_id: &str) -> Option<Self> {
        if !status.triggers_email {
            return None;
        }
        let template = status.email_template.as_deref().map(str::trim).filter(|t| !t.is_empty())?;
        Some(Self {
            status_name: status.name.clone(),
            email_template: template.to_string(),
            entity_id: entity_id.to_string(),
        })
    }
}

pub trait NotificationDispatch: Send + Sync {
    fn dispatch(&self, notification: StatusNotification);
}

#[derive(Clone, Default)]
pub struct InMemoryOutbox {
    pending: Arc<Mutex<Vec<StatusNotification>>>,
}

impl InMemoryOutbox {
    pub fn pending(&self) -> Vec<StatusNotification> {
        match self.pending.lock() {
            Ok(pending) => pending.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn drain(&self) -> Vec<StatusNotification> {
        match self.pending.lock() {
            Ok(mut pending) => std::mem::take(&mut *pending),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl NotificationDispatch for InMemoryOutbox {
    fn dispatch(&self, notification: StatusNotification) {
        match self.pending.lock() {
            Ok(mut pending) => pending.push(notification),
            Err(poisoned) => poisoned.into_inner().push(notification),
        }
    }
}
