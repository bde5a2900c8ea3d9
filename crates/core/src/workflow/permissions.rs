use serde::{Deserialize, Serialize};

use crate::domain::status::StatusConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusAction {
    Edit,
    EditAddress,
    Approve,
    Reject,
    AddToCart,
    Ship,
    Cancel,
    Renew,
    Pay,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSet {
    pub can_edit: bool,
    pub can_edit_address: bool,
    pub can_approve: bool,
    pub can_reject: bool,
    pub can_add_to_cart: bool,
    pub can_ship: bool,
    pub can_cancel: bool,
    pub can_renew: bool,
    pub can_be_paid: bool,
}

impl PermissionSet {
    pub fn allows(&self, action: StatusAction) -> bool {
        match action {
            StatusAction::Edit => self.can_edit,
            StatusAction::EditAddress => self.can_edit_address,
            StatusAction::Approve => self.can_approve,
            StatusAction::Reject => self.can_reject,
            StatusAction::AddToCart => self.can_add_to_cart,
            StatusAction::Ship => self.can_ship,
            StatusAction::Cancel => self.can_cancel,
            StatusAction::Renew => self.can_renew,
            StatusAction::Pay => self.can_be_paid,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusView {
    QuotesList,
    OrdersList,
    Customer,
    Admin,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibilitySet {
    pub quotes_list: bool,
    pub orders_list: bool,
    pub customer_view: bool,
    pub admin_view: bool,
    pub show_expiration: bool,
}

impl VisibilitySet {
    pub fn includes(&self, view: StatusView) -> bool {
        match view {
            StatusView::QuotesList => self.quotes_list,
            StatusView::OrdersList => self.orders_list,
            StatusView::Customer => self.customer_view,
            StatusView::Admin => self.admin_view,
        }
    }
}

/// Pure projection of a status' raw flags. UI code asks this instead of
/// reading `allow*` fields directly.
#[derive(Clone, Copy, Debug, Default)]
pub struct PermissionResolver;

impl PermissionResolver {
    pub fn resolve(status: &StatusConfig) -> PermissionSet {
        let granted = |flag: Option<bool>| flag.unwrap_or(false);

        PermissionSet {
            can_edit: granted(status.allow_edit),
            can_edit_address: granted(status.allow_address_edit),
            can_approve: granted(status.allow_approval),
            can_reject: granted(status.allow_rejection),
            can_add_to_cart: granted(status.allow_cart_actions),
            can_ship: granted(status.allow_shipping),
            can_cancel: granted(status.allow_cancellation),
            can_renew: granted(status.allow_renewal),
            can_be_paid: granted(status.can_be_paid),
        }
    }

    pub fn permits(status: &StatusConfig, action: StatusAction) -> bool {
        Self::resolve(status).allows(action)
    }

    pub fn requires_action(status: &StatusConfig) -> bool {
        status.requires_action.unwrap_or(false)
    }

    pub fn resolve_visibility(status: &StatusConfig) -> VisibilitySet {
        if !status.is_active {
            return VisibilitySet::default();
        }

        VisibilitySet {
            quotes_list: status.shows_in_quotes_list,
            orders_list: status.shows_in_orders_list,
            customer_view: status.show_in_customer_view,
            admin_view: status.show_in_admin_view,
            show_expiration: status.show_expiration,
        }
    }

    /// Statuses to render in `view`, sorted by their configured position.
    pub fn visible_in(statuses: &[StatusConfig], view: StatusView) -> Vec<&StatusConfig> {
        let mut visible: Vec<&StatusConfig> = statuses
            .iter()
            .filter(|status| Self::resolve_visibility(status).includes(view))
            .collect();
        visible.sort_by_key(|status| (status.category, status.order));
        visible
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::status::{StatusCategory, StatusConfig};

    use super::{PermissionResolver, PermissionSet, StatusAction, StatusView};

    fn bare_status() -> StatusConfig {
        let mut status = StatusConfig::placeholder(StatusCategory::Order, "processing", 1);
        status.allow_edit = None;
        status.allow_address_edit = None;
        status.allow_approval = None;
        status.allow_rejection = None;
        status.allow_cart_actions = None;
        status.allow_shipping = None;
        status.allow_cancellation = None;
        status.allow_renewal = None;
        status.requires_action = None;
        status.can_be_paid = None;
        status
    }

    #[test]
    fn missing_flags_resolve_to_denied() {
        let status = bare_status();
        assert_eq!(PermissionResolver::resolve(&status), PermissionSet::default());
        assert!(!PermissionResolver::requires_action(&status));
    }

    #[test]
    fn explicit_flags_project_one_to_one() {
        let mut status = bare_status();
        status.allow_shipping = Some(true);
        status.allow_cancellation = Some(true);
        status.can_be_paid = Some(true);
        status.allow_edit = Some(false);

        let permissions = PermissionResolver::resolve(&status);

        assert!(permissions.can_ship);
        assert!(permissions.can_cancel);
        assert!(permissions.can_be_paid);
        assert!(!permissions.can_edit);
        assert!(PermissionResolver::permits(&status, StatusAction::Ship));
        assert!(!PermissionResolver::permits(&status, StatusAction::Renew));
    }

    #[test]
    fn resolve_is_referentially_transparent() {
        let mut status = bare_status();
        status.allow_approval = Some(true);
        status.allow_rejection = Some(true);

        let first = PermissionResolver::resolve(&status);
        let second = PermissionResolver::resolve(&status);

        assert_eq!(first, second);
    }

    #[test]
    fn inactive_statuses_are_hidden_from_every_view() {
        let mut active = StatusConfig::placeholder(StatusCategory::Quote, "sent", 2);
        active.show_in_customer_view = true;
        let mut retired = StatusConfig::placeholder(StatusCategory::Quote, "legacy", 1);
        retired.is_active = false;
        let mut internal = StatusConfig::placeholder(StatusCategory::Quote, "calculating", 3);
        internal.show_in_customer_view = false;

        let statuses = vec![active, retired, internal];
        let names: Vec<&str> = PermissionResolver::visible_in(&statuses, StatusView::Customer)
            .into_iter()
            .map(|status| status.name.as_str())
            .collect();
        assert_eq!(names, vec!["sent"]);

        let admin: Vec<&str> = PermissionResolver::visible_in(&statuses, StatusView::Admin)
            .into_iter()
            .map(|status| status.name.as_str())
            .collect();
        assert_eq!(admin, vec!["sent", "calculating"]);
    }
}
