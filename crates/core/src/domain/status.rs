use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const TEMPORARY_ID_PREFIX: &str = "tmp-";

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StatusId(pub String);

impl StatusId {
    pub fn generate() -> Self {
        Self(format!("status-{}", Uuid::new_v4()))
    }

    pub fn temporary() -> Self {
        Self(format!("{TEMPORARY_ID_PREFIX}{}", Uuid::new_v4()))
    }

    pub fn is_temporary(&self) -> bool {
        self.0.starts_with(TEMPORARY_ID_PREFIX)
    }
}

impl fmt::Display for StatusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCategory {
    Quote,
    Order,
}

impl StatusCategory {
    pub const ALL: [StatusCategory; 2] = [StatusCategory::Quote, StatusCategory::Order];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Quote => "quote",
            Self::Order => "order",
        }
    }

    pub fn other(&self) -> Self {
        match self {
            Self::Quote => Self::Order,
            Self::Order => Self::Quote,
        }
    }
}

impl fmt::Display for StatusCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StatusCategory {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "quote" | "quotes" => Ok(Self::Quote),
            "order" | "orders" => Ok(Self::Order),
            other => Err(format!("unsupported status category `{other}` (expected quote|order)")),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    Prepaid,
    Cod,
    Partial,
    Mixed,
}

/// The lifecycle point by which payment must have been received.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentRequiredBefore {
    Never,
    Processing,
    Shipping,
    Completion,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentValidationRule {
    #[default]
    None,
    Standard,
    Strict,
    Automatic,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMilestone {
    pub percentage: Decimal,
    pub label: String,
    #[serde(default)]
    pub required: bool,
}

/// One configured lifecycle state for a quote or an order.
///
/// Permission flags are optional so that records written before a flag existed
/// keep it absent; `PermissionResolver` treats an absent flag as denied.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusConfig {
    pub id: StatusId,
    pub name: String,
    pub label: String,
    #[serde(default)]
    pub description: String,
    pub category: StatusCategory,

    pub order: i32,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub css_class: String,
    #[serde(default)]
    pub badge_variant: String,
    #[serde(default)]
    pub progress_percentage: u8,

    #[serde(default)]
    pub is_terminal: bool,
    #[serde(default)]
    pub allowed_transitions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_expire_hours: Option<u32>,

    #[serde(default)]
    pub triggers_email: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_template: Option<String>,

    #[serde(default)]
    pub is_default_quote_status: bool,

    #[serde(default)]
    pub shows_in_quotes_list: bool,
    #[serde(default)]
    pub shows_in_orders_list: bool,
    #[serde(default)]
    pub show_in_customer_view: bool,
    #[serde(default)]
    pub show_in_admin_view: bool,
    #[serde(default)]
    pub show_expiration: bool,
    #[serde(default)]
    pub is_successful: bool,
    #[serde(default)]
    pub counts_as_order: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_edit: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_address_edit: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_approval: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_rejection: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_cart_actions: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_shipping: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_cancellation: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_renewal: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires_action: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_be_paid: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_type: Option<PaymentType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_required_before: Option<PaymentRequiredBefore>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_payment_percentage: Option<Decimal>,
    #[serde(default)]
    pub payment_validation_rule: PaymentValidationRule,
    #[serde(default, rename = "allowCOD")]
    pub allow_cod: bool,
    #[serde(default)]
    pub cod_fee_required: bool,
    #[serde(default)]
    pub cod_verification_required: bool,
    #[serde(default, rename = "isCODStatus")]
    pub is_cod_status: bool,
    #[serde(default)]
    pub cod_collection_required: bool,
    #[serde(default)]
    pub cod_remittance_tracking: bool,
    #[serde(default)]
    pub payment_milestones: Vec<PaymentMilestone>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_action_text: Option<String>,
}

impl StatusConfig {
    /// Placeholder used when a status is added: active, no transitions, every
    /// action flag explicitly off.
    pub fn placeholder(category: StatusCategory, name: impl Into<String>, order: i32) -> Self {
        Self {
            id: StatusId::temporary(),
            name: name.into(),
            label: "New Status".to_string(),
            description: String::new(),
            category,
            order,
            color: "gray".to_string(),
            icon: "circle".to_string(),
            is_active: true,
            css_class: String::new(),
            badge_variant: "secondary".to_string(),
            progress_percentage: 0,
            is_terminal: false,
            allowed_transitions: Vec::new(),
            auto_expire_hours: None,
            triggers_email: false,
            email_template: None,
            is_default_quote_status: false,
            shows_in_quotes_list: category == StatusCategory::Quote,
            shows_in_orders_list: category == StatusCategory::Order,
            show_in_customer_view: true,
            show_in_admin_view: true,
            show_expiration: false,
            is_successful: false,
            counts_as_order: false,
            allow_edit: Some(false),
            allow_address_edit: Some(false),
            allow_approval: Some(false),
            allow_rejection: Some(false),
            allow_cart_actions: Some(false),
            allow_shipping: Some(false),
            allow_cancellation: Some(false),
            allow_renewal: Some(false),
            requires_action: Some(false),
            can_be_paid: Some(false),
            payment_type: None,
            payment_required_before: None,
            min_payment_percentage: None,
            payment_validation_rule: PaymentValidationRule::None,
            allow_cod: false,
            cod_fee_required: false,
            cod_verification_required: false,
            is_cod_status: false,
            cod_collection_required: false,
            cod_remittance_tracking: false,
            payment_milestones: Vec::new(),
            customer_message: None,
            customer_action_text: None,
        }
    }

    pub fn allows_transition_to(&self, target: &str) -> bool {
        !self.is_terminal && self.allowed_transitions.iter().any(|name| name == target)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::{
        PaymentMilestone, PaymentRequiredBefore, PaymentType, StatusCategory, StatusConfig,
        StatusId,
    };

    #[test]
    fn status_config_round_trips_through_json() {
        let mut status = StatusConfig::placeholder(StatusCategory::Order, "paid", 2);
        status.payment_type = Some(PaymentType::Partial);
        status.payment_required_before = Some(PaymentRequiredBefore::Shipping);
        status.min_payment_percentage = Some(Decimal::new(505, 1));
        status.allow_cod = true;
        status.payment_milestones = vec![PaymentMilestone {
            percentage: Decimal::new(30, 0),
            label: "Deposit".to_string(),
            required: true,
        }];

        let encoded = serde_json::to_string(&status).expect("serialize");
        let decoded: StatusConfig = serde_json::from_str(&encoded).expect("deserialize");

        assert_eq!(decoded, status);
        assert!(encoded.contains("\"allowCOD\":true"));
        assert!(encoded.contains("\"paymentRequiredBefore\":\"shipping\""));
    }

    #[test]
    fn legacy_record_without_permission_flags_keeps_them_absent() {
        let legacy = json!({
            "id": "status-legacy",
            "name": "pending",
            "label": "Pending",
            "category": "quote",
            "order": 1,
            "isActive": true,
            "minPaymentPercentage": 50
        });

        let status: StatusConfig = serde_json::from_value(legacy).expect("legacy record decodes");

        assert_eq!(status.allow_edit, None);
        assert_eq!(status.can_be_paid, None);
        assert_eq!(status.min_payment_percentage, Some(Decimal::new(50, 0)));
        assert_eq!(status.payment_required_before, None);

        let reencoded = serde_json::to_value(&status).expect("serialize");
        assert!(reencoded.get("allowEdit").is_none());
    }

    #[test]
    fn terminal_status_refuses_listed_transition() {
        let mut status = StatusConfig::placeholder(StatusCategory::Quote, "approved", 1);
        status.allowed_transitions = vec!["pending".to_string()];
        assert!(status.allows_transition_to("pending"));

        status.is_terminal = true;
        assert!(!status.allows_transition_to("pending"));
    }

    #[test]
    fn temporary_ids_are_distinguishable() {
        assert!(StatusId::temporary().is_temporary());
        assert!(!StatusId::generate().is_temporary());
        assert_eq!("Orders".parse::<StatusCategory>(), Ok(StatusCategory::Order));
    }
}
