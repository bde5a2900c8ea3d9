use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::status::{StatusCategory, StatusConfig, StatusId};
use crate::workflow::store::{StatusSnapshot, StatusStore, StoreError};
use crate::workflow::validation::{ConfigValidator, FieldIssue, ValidationReport};

pub const DEFAULT_PERSIST_TIMEOUT: Duration = Duration::from_secs(30);
const PLACEHOLDER_NAME: &str = "new_status";
const UNPATCHABLE_FIELDS: &[&str] = &["id", "category"];

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("status `{0}` was not found")]
    NotFound(StatusId),
    #[error(transparent)]
    Validation(ValidationReport),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("persisting status configuration timed out after {seconds}s")]
    Timeout { seconds: u64 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReorderDirection {
    Up,
    Down,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct StatusLists {
    quote: Vec<StatusConfig>,
    order: Vec<StatusConfig>,
}

impl StatusLists {
    fn sorted(mut quote: Vec<StatusConfig>, mut order: Vec<StatusConfig>) -> Self {
        quote.sort_by_key(|status| status.order);
        order.sort_by_key(|status| status.order);
        Self { quote, order }
    }

    fn list(&self, category: StatusCategory) -> &Vec<StatusConfig> {
        match category {
            StatusCategory::Quote => &self.quote,
            StatusCategory::Order => &self.order,
        }
    }

    fn list_mut(&mut self, category: StatusCategory) -> &mut Vec<StatusConfig> {
        match category {
            StatusCategory::Quote => &mut self.quote,
            StatusCategory::Order => &mut self.order,
        }
    }

    fn locate(&self, id: &StatusId) -> Option<(StatusCategory, usize)> {
        StatusCategory::ALL.into_iter().find_map(|category| {
            self.list(category)
                .iter()
                .position(|status| &status.id == id)
                .map(|index| (category, index))
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDiff {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub modified: Vec<String>,
    pub reordered: Vec<String>,
}

impl CategoryDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
            && self.removed.is_empty()
            && self.modified.is_empty()
            && self.reordered.is_empty()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusDiff {
    pub quote: CategoryDiff,
    pub order: CategoryDiff,
}

impl StatusDiff {
    pub fn is_empty(&self) -> bool {
        self.quote.is_empty() && self.order.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitReport {
    pub revision: u64,
    pub diff: StatusDiff,
    /// Temporary ids handed out by `add`, paired with their permanent ids.
    pub assigned_ids: Vec<(StatusId, StatusId)>,
}

/// Editable status configuration for one admin session.
///
/// Every edit lands in the draft. `persist` validates the draft, writes both
/// categories in one store call and only then promotes the draft to
/// committed. A failed persist leaves draft, committed copy and revision
/// untouched, so it can simply be retried.
#[derive(Clone, Debug)]
pub struct StatusRegistry {
    committed: StatusLists,
    draft: StatusLists,
    revision: u64,
    persist_timeout: Duration,
}

impl StatusRegistry {
    pub fn new(snapshot: StatusSnapshot) -> Self {
        let committed = StatusLists::sorted(snapshot.quote, snapshot.order);
        Self {
            draft: committed.clone(),
            committed,
            revision: snapshot.revision,
            persist_timeout: DEFAULT_PERSIST_TIMEOUT,
        }
    }

    pub async fn load<S>(store: &S) -> Result<Self, RegistryError>
    where
        S: StatusStore + ?Sized,
    {
        let snapshot = store.snapshot().await?;
        info!(
            event_name = "workflow.registry.loaded",
            revision = snapshot.revision,
            quote_statuses = snapshot.quote.len(),
            order_statuses = snapshot.order.len(),
            "status configuration loaded"
        );
        Ok(Self::new(snapshot))
    }

    pub fn with_persist_timeout(mut self, timeout: Duration) -> Self {
        self.persist_timeout = timeout;
        self
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Draft statuses of one category, sorted by position.
    pub fn load_all(&self, category: StatusCategory) -> Vec<StatusConfig> {
        self.draft.list(category).clone()
    }

    pub fn statuses(&self, category: StatusCategory) -> &[StatusConfig] {
        self.draft.list(category)
    }

    pub fn committed(&self, category: StatusCategory) -> &[StatusConfig] {
        self.committed.list(category)
    }

    /// Both draft categories, quote statuses first.
    pub fn all_statuses(&self) -> Vec<StatusConfig> {
        self.draft.quote.iter().chain(self.draft.order.iter()).cloned().collect()
    }

    pub fn get(&self, id: &StatusId) -> Option<&StatusConfig> {
        self.draft.locate(id).map(|(category, index)| &self.draft.list(category)[index])
    }

    pub fn find_by_name(&self, category: StatusCategory, name: &str) -> Option<&StatusConfig> {
        self.draft.list(category).iter().find(|status| status.name == name)
    }

    /// The flagged default, or the first active quote status when none is
    /// flagged.
    pub fn default_quote_status(&self) -> Option<&StatusConfig> {
        let quotes = self.draft.list(StatusCategory::Quote);
        quotes
            .iter()
            .find(|status| status.is_default_quote_status && status.is_active)
            .or_else(|| quotes.iter().find(|status| status.is_active))
    }

    pub fn add(&mut self, category: StatusCategory) -> StatusId {
        let list = self.draft.list_mut(category);
        let next_order = list.iter().map(|status| status.order).max().unwrap_or(0) + 1;
        let name = unique_placeholder_name(list);
        let status = StatusConfig::placeholder(category, name, next_order);
        let id = status.id.clone();
        list.push(status);

        info!(
            event_name = "workflow.registry.status_added",
            category = %category,
            status_id = %id,
            order = next_order,
            "status added to draft"
        );
        id
    }

    /// Applies `edit` to the draft copy of `id`. Identity and category are
    /// restored afterwards; a changed `order` re-sorts the list.
    pub fn update<F>(&mut self, id: &StatusId, edit: F) -> Result<(), RegistryError>
    where
        F: FnOnce(&mut StatusConfig),
    {
        let (category, index) = self.locate_or_warn(id, "update")?;
        let list = self.draft.list_mut(category);
        let status = &mut list[index];
        edit(status);
        status.id = id.clone();
        status.category = category;
        list.sort_by_key(|status| status.order);
        Ok(())
    }

    /// Merges a camelCase JSON object into the draft copy of `id`.
    pub fn apply_patch(&mut self, id: &StatusId, patch: &Value) -> Result<(), RegistryError> {
        let (category, index) = self.locate_or_warn(id, "apply_patch")?;
        let current = &self.draft.list(category)[index];
        let patch_issue = |field: &str, message: String| {
            RegistryError::Validation(ValidationReport {
                issues: vec![FieldIssue {
                    category,
                    status: current.name.clone(),
                    field: field.to_string(),
                    message,
                }],
            })
        };

        let Some(fields) = patch.as_object() else {
            return Err(patch_issue("patch", "must be a JSON object".to_string()));
        };
        if let Some(field) = UNPATCHABLE_FIELDS.iter().find(|field| fields.contains_key(**field)) {
            return Err(patch_issue(*field, "cannot be changed through an update".to_string()));
        }

        let base = serde_json::to_value(current)
            .map_err(|error| patch_issue("patch", error.to_string()))?;
        let updated: StatusConfig =
            serde_json::from_value(merge_fields(&base, fields.iter())).map_err(|error| {
                let field = fields
                    .iter()
                    .find(|entry| {
                        serde_json::from_value::<StatusConfig>(merge_fields(&base, [*entry]))
                            .is_err()
                    })
                    .map(|(key, _)| key.as_str())
                    .unwrap_or("patch");
                patch_issue(field, error.to_string())
            })?;

        self.update(id, move |status| *status = updated)
    }

    /// Drops `id` from the draft and closes the position gap. Statuses that
    /// still list its name are caught by validation at persist time.
    pub fn remove(&mut self, id: &StatusId) -> Result<StatusConfig, RegistryError> {
        let (category, index) = self.locate_or_warn(id, "remove")?;
        let list = self.draft.list_mut(category);
        let removed = list.remove(index);
        renumber(list);

        info!(
            event_name = "workflow.registry.status_removed",
            category = %category,
            status_id = %id,
            status_name = %removed.name,
            "status removed from draft"
        );
        Ok(removed)
    }

    /// Swaps `id` with its neighbour. Returns `false` at the list boundary,
    /// where nothing changes.
    pub fn reorder(
        &mut self,
        id: &StatusId,
        direction: ReorderDirection,
    ) -> Result<bool, RegistryError> {
        let (category, index) = self.locate_or_warn(id, "reorder")?;
        let list = self.draft.list_mut(category);
        let neighbour = match direction {
            ReorderDirection::Up if index > 0 => index - 1,
            ReorderDirection::Down if index + 1 < list.len() => index + 1,
            _ => return Ok(false),
        };

        let position = list[index].order;
        list[index].order = list[neighbour].order;
        list[neighbour].order = position;
        list.swap(index, neighbour);
        Ok(true)
    }

    pub fn diff(&self) -> StatusDiff {
        StatusDiff {
            quote: diff_category(&self.committed.quote, &self.draft.quote),
            order: diff_category(&self.committed.order, &self.draft.order),
        }
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.draft != self.committed
    }

    pub fn discard_draft(&mut self) {
        self.draft = self.committed.clone();
    }

    pub fn validate(&self) -> Result<(), ValidationReport> {
        ConfigValidator::validate(&self.draft.quote, &self.draft.order)
    }

    /// Writes the draft of both categories in one atomic store call.
    pub async fn persist<S>(&mut self, store: &S) -> Result<CommitReport, RegistryError>
    where
        S: StatusStore + ?Sized,
    {
        if let Err(report) = self.validate() {
            warn!(
                event_name = "workflow.registry.persist_rejected",
                issues = report.issues.len(),
                "status configuration failed validation"
            );
            return Err(RegistryError::Validation(report));
        }

        let diff = self.diff();
        let mut staged = self.draft.clone();
        let assigned_ids = assign_permanent_ids(&mut staged);

        let write = store.put_all(self.revision, &staged.quote, &staged.order);
        let revision = match tokio::time::timeout(self.persist_timeout, write).await {
            Ok(Ok(revision)) => revision,
            Ok(Err(error)) => {
                warn!(
                    event_name = "workflow.registry.persist_failed",
                    expected_revision = self.revision,
                    error = %error,
                    "status configuration write failed; draft kept for retry"
                );
                return Err(RegistryError::Store(error));
            }
            Err(_) => {
                warn!(
                    event_name = "workflow.registry.persist_timed_out",
                    expected_revision = self.revision,
                    timeout_secs = self.persist_timeout.as_secs(),
                    "status configuration write timed out; draft kept for retry"
                );
                return Err(RegistryError::Timeout { seconds: self.persist_timeout.as_secs() });
            }
        };

        self.committed = staged.clone();
        self.draft = staged;
        self.revision = revision;

        info!(
            event_name = "workflow.registry.persisted",
            revision,
            assigned_ids = assigned_ids.len(),
            "status configuration persisted"
        );
        Ok(CommitReport { revision, diff, assigned_ids })
    }

    fn locate_or_warn(
        &self,
        id: &StatusId,
        operation: &'static str,
    ) -> Result<(StatusCategory, usize), RegistryError> {
        self.draft.locate(id).ok_or_else(|| {
            warn!(
                event_name = "workflow.registry.status_not_found",
                status_id = %id,
                operation,
                "ignoring edit for unknown status"
            );
            RegistryError::NotFound(id.clone())
        })
    }
}

fn unique_placeholder_name(list: &[StatusConfig]) -> String {
    let taken = |candidate: &str| list.iter().any(|status| status.name == candidate);
    if !taken(PLACEHOLDER_NAME) {
        return PLACEHOLDER_NAME.to_string();
    }
    (2..)
        .map(|suffix| format!("{PLACEHOLDER_NAME}_{suffix}"))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| PLACEHOLDER_NAME.to_string())
}

fn renumber(list: &mut [StatusConfig]) {
    for (index, status) in list.iter_mut().enumerate() {
        status.order = index as i32 + 1;
    }
}

fn assign_permanent_ids(lists: &mut StatusLists) -> Vec<(StatusId, StatusId)> {
    let mut assigned = Vec::new();
    for status in lists.quote.iter_mut().chain(lists.order.iter_mut()) {
        if status.id.is_temporary() {
            let permanent = StatusId::generate();
            assigned.push((status.id.clone(), permanent.clone()));
            status.id = permanent;
        }
    }
    assigned
}

fn merge_fields<'a>(
    base: &Value,
    fields: impl IntoIterator<Item = (&'a String, &'a Value)>,
) -> Value {
    let mut merged = base.clone();
    if let Some(target) = merged.as_object_mut() {
        for (key, value) in fields {
            target.insert(key.clone(), value.clone());
        }
    }
    merged
}

fn diff_category(committed: &[StatusConfig], draft: &[StatusConfig]) -> CategoryDiff {
    let before: HashMap<&StatusId, &StatusConfig> =
        committed.iter().map(|status| (&status.id, status)).collect();
    let mut diff = CategoryDiff::default();

    for status in draft {
        match before.get(&status.id) {
            None => diff.added.push(status.name.clone()),
            Some(previous) => {
                if previous.order != status.order {
                    diff.reordered.push(status.name.clone());
                }
                let mut aligned = (*previous).clone();
                aligned.order = status.order;
                if &aligned != status {
                    diff.modified.push(status.name.clone());
                }
            }
        }
    }

    for status in committed {
        if !draft.iter().any(|current| current.id == status.id) {
            diff.removed.push(status.name.clone());
        }
    }

    diff
}
