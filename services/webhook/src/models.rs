use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const UNKNOWN_PURPOSE: &str = "Unknown_Purpose";
pub const UNKNOWN_NAME: &str = "Unknown_Name";
pub const UNKNOWN_SURNAME: &str = "Unknown_Surname";
pub const UNKNOWN_EMAIL: &str = "Unknown_Email";
pub const UNKNOWN_TIME: &str = "Unknown_Time";

// Webhook Models

/// Envelope of an inbound notification once the body has passed validation.
/// Any other envelope fields the platform sends are ignored.
#[derive(Debug, Clone)]
pub struct WebhookEvent {
    pub event_type: String,
    pub resource: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Subscription,
    Payment,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Subscription => "subscription",
            DataType::Payment => "payment",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Record Models

/// A normalized record as it is written to the key-value table.
///
/// The `data_type` tag is flattened next to the variant's own fields, so a
/// stored document reads `{"data_type": "payment", "id": ..., ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "data_type", rename_all = "lowercase")]
pub enum StoredRecord {
    Subscription(SubscriptionRecord),
    Payment(PaymentRecord),
}

impl StoredRecord {
    pub fn id(&self) -> &str {
        match self {
            StoredRecord::Subscription(record) => &record.id,
            StoredRecord::Payment(record) => &record.id,
        }
    }

    pub fn data_type(&self) -> DataType {
        match self {
            StoredRecord::Subscription(_) => DataType::Subscription,
            StoredRecord::Payment(_) => DataType::Payment,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionRecord {
    pub id: String,
    pub purpose: String,
    pub user_name: String,
    pub user_email: String,
    pub create_time: String,
}

/// Both payment paths produce this one shape. Order approvals carry payer
/// details, sale completions do not; the fields are still always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: String,
    pub purpose: String,
    pub user_name: String,
    pub user_email: String,
    pub payer_name: Option<String>,
    pub payer_email: Option<String>,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount_value: Decimal,
    pub amount_currency: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub transaction_fee: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub net_amount: Decimal,
    pub create_time: String,
}

// Response Models

/// Result of a single delivery that did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum WebhookOutcome {
    Processed {
        event_type: String,
        record_id: String,
        data_type: DataType,
    },
    Ignored {
        event_type: String,
    },
}

impl WebhookOutcome {
    pub fn event_type(&self) -> &str {
        match self {
            WebhookOutcome::Processed { event_type, .. } => event_type,
            WebhookOutcome::Ignored { event_type } => event_type,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookAck {
    pub message: String,
    pub event_type: String,
    pub processed: bool,
    pub record_id: Option<String>,
    pub data_type: Option<DataType>,
}

impl From<WebhookOutcome> for WebhookAck {
    fn from(outcome: WebhookOutcome) -> Self {
        match outcome {
            WebhookOutcome::Processed {
                event_type,
                record_id,
                data_type,
            } => Self {
                message: format!("Event type {} processed successfully.", event_type),
                event_type,
                processed: true,
                record_id: Some(record_id),
                data_type: Some(data_type),
            },
            WebhookOutcome::Ignored { event_type } => Self {
                message: format!("Event type {} not processed.", event_type),
                event_type,
                processed: false,
                record_id: None,
                data_type: None,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub service: String,
    pub store: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    fn payment() -> PaymentRecord {
        PaymentRecord {
            id: "I-PAY".to_string(),
            purpose: "mentoring".to_string(),
            user_name: "ana".to_string(),
            user_email: "ana@example.com".to_string(),
            payer_name: None,
            payer_email: None,
            amount_value: Decimal::from_str("10.00").unwrap(),
            amount_currency: "USD".to_string(),
            transaction_fee: Decimal::from_str("0.59").unwrap(),
            net_amount: Decimal::from_str("9.41").unwrap(),
            create_time: UNKNOWN_TIME.to_string(),
        }
    }

    #[test]
    fn test_record_serializes_with_data_type_tag() {
        let value = serde_json::to_value(StoredRecord::Payment(payment())).unwrap();

        assert_eq!(value["data_type"], "payment");
        assert_eq!(value["id"], "I-PAY");
        assert_eq!(value["net_amount"], "9.41");
        assert_eq!(value["amount_value"], "10.00");
        // absent payer details are still part of the record
        assert_eq!(value["payer_name"], json!(null));
    }

    #[test]
    fn test_record_reads_back() {
        let record = StoredRecord::Subscription(SubscriptionRecord {
            id: "I-ABC123".to_string(),
            purpose: UNKNOWN_PURPOSE.to_string(),
            user_name: UNKNOWN_NAME.to_string(),
            user_email: "a@b.com".to_string(),
            create_time: "2024-12-01T00:00:00Z".to_string(),
        });

        let encoded = serde_json::to_string(&record).unwrap();
        let decoded: StoredRecord = serde_json::from_str(&encoded).unwrap();

        assert_eq!(decoded, record);
        assert_eq!(decoded.id(), "I-ABC123");
        assert_eq!(decoded.data_type(), DataType::Subscription);
    }

    #[test]
    fn test_ack_messages() {
        let ack = WebhookAck::from(WebhookOutcome::Ignored {
            event_type: "CUSTOMER.DISPUTE.CREATED".to_string(),
        });
        assert_eq!(ack.message, "Event type CUSTOMER.DISPUTE.CREATED not processed.");
        assert!(!ack.processed);
        assert!(ack.record_id.is_none());

        let ack = WebhookAck::from(WebhookOutcome::Processed {
            event_type: "PAYMENT.SALE.COMPLETED".to_string(),
            record_id: "I-PAY".to_string(),
            data_type: DataType::Payment,
        });
        assert_eq!(ack.message, "Event type PAYMENT.SALE.COMPLETED processed successfully.");
        assert_eq!(ack.data_type, Some(DataType::Payment));
    }
}
