use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Caller-supplied snapshot of what has actually been paid on an entity.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentState {
    pub percentage_paid: Decimal,
    #[serde(default)]
    pub phone_verified: bool,
    #[serde(default)]
    pub cod_collected: bool,
}

impl PaymentState {
    pub fn paid(percentage_paid: Decimal) -> Self {
        Self { percentage_paid, ..Self::default() }
    }

    pub fn with_phone_verified(mut self, phone_verified: bool) -> Self {
        self.phone_verified = phone_verified;
        self
    }

    pub fn with_cod_collected(mut self, cod_collected: bool) -> Self {
        self.cod_collected = cod_collected;
        self
    }
}
