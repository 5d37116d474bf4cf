//! Wire types for inbound payment provider webhooks.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct PaymentEvent {
    pub event: String,
    #[serde(default)]
    pub data: PaymentEventData,
}

#[derive(Debug, Default, Deserialize)]
pub struct PaymentEventData {
    #[serde(default)]
    pub user_id: String,
}
