use std::fmt;

use payhook_common::AppError;

use crate::extractors;
use crate::models::StoredRecord;

pub const SUBSCRIPTION_CREATED: &str = "BILLING.SUBSCRIPTION.CREATED";
pub const SALE_COMPLETED: &str = "PAYMENT.SALE.COMPLETED";
pub const ORDER_APPROVED: &str = "CHECKOUT.ORDER.APPROVED";

/// Event types this service knows how to store. Everything else lands in
/// `Unrecognized` and is acknowledged without a write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEventKind {
    SubscriptionCreated,
    SaleCompleted,
    OrderApproved,
    Unrecognized(String),
}

type Extractor = fn(&serde_json::Value) -> Result<StoredRecord, AppError>;

impl WebhookEventKind {
    pub fn as_str(&self) -> &str {
        match self {
            WebhookEventKind::SubscriptionCreated => SUBSCRIPTION_CREATED,
            WebhookEventKind::SaleCompleted => SALE_COMPLETED,
            WebhookEventKind::OrderApproved => ORDER_APPROVED,
            WebhookEventKind::Unrecognized(event_type) => event_type,
        }
    }

    fn extractor(&self) -> Option<Extractor> {
        match self {
            WebhookEventKind::SubscriptionCreated => Some(extractors::extract_subscription_created),
            WebhookEventKind::SaleCompleted => Some(extractors::extract_sale_completed),
            WebhookEventKind::OrderApproved => Some(extractors::extract_order_approved),
            WebhookEventKind::Unrecognized(_) => None,
        }
    }

    /// Runs the extractor for this event kind. `Ok(None)` means the event is
    /// not one we store.
    pub fn extract(&self, resource: &serde_json::Value) -> Result<Option<StoredRecord>, AppError> {
        match self.extractor() {
            Some(extract) => extract(resource).map(Some),
            None => Ok(None),
        }
    }
}

impl From<&str> for WebhookEventKind {
    fn from(event_type: &str) -> Self {
        match event_type {
            SUBSCRIPTION_CREATED => WebhookEventKind::SubscriptionCreated,
            SALE_COMPLETED => WebhookEventKind::SaleCompleted,
            ORDER_APPROVED => WebhookEventKind::OrderApproved,
            other => WebhookEventKind::Unrecognized(other.to_string()),
        }
    }
}

impl fmt::Display for WebhookEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
