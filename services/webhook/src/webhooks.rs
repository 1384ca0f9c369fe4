use std::sync::Arc;

use axum::http::HeaderMap;
use tracing::Instrument;
use uuid::Uuid;

use payhook_common::AppError;

use crate::events::WebhookEventKind;
use crate::models::WebhookOutcome;
use crate::storage::{save_record, RecordStore};
use crate::validation::{parse_event, validate_content_type};

/// Validate, route, extract and store a single delivery.
///
/// Nothing is written unless validation and extraction both succeed. Store
/// failures are returned as-is; the sender's own redelivery policy is the
/// only retry.
#[derive(Clone)]
pub struct WebhookProcessor {
    store: Arc<dyn RecordStore>,
}

impl WebhookProcessor {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    pub async fn process(&self, headers: &HeaderMap, body: &[u8]) -> Result<WebhookOutcome, AppError> {
        let delivery_id = Uuid::new_v4();
        let span = tracing::info_span!("webhook", %delivery_id, event_type = tracing::field::Empty);

        async move {
            let result = self.process_delivery(headers, body).await;
            if let Err(err) = &result {
                if err.is_client_error() {
                    tracing::warn!(error = %err, "Webhook rejected");
                } else {
                    tracing::error!(error = %err, "Webhook processing failed");
                }
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn process_delivery(&self, headers: &HeaderMap, body: &[u8]) -> Result<WebhookOutcome, AppError> {
        validate_content_type(headers)?;
        let event = parse_event(body)?;

        tracing::Span::current().record("event_type", event.event_type.as_str());

        let kind = WebhookEventKind::from(event.event_type.as_str());
        let Some(record) = kind.extract(&event.resource)? else {
            tracing::info!("Unhandled event type, acknowledging without a write");
            return Ok(WebhookOutcome::Ignored {
                event_type: event.event_type,
            });
        };

        save_record(self.store.as_ref(), &record).await.map_err(|err| {
            tracing::error!(record_id = record.id(), data_type = %record.data_type(), "Failed to save record");
            err
        })?;

        Ok(WebhookOutcome::Processed {
            event_type: event.event_type,
            record_id: record.id().to_string(),
            data_type: record.data_type(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DataType, StoredRecord};
    use crate::storage::MemoryRecordStore;
    use async_trait::async_trait;
    use axum::http::{header::CONTENT_TYPE, HeaderValue};

    struct FailingStore;

    #[async_trait]
    impl RecordStore for FailingStore {
        async fn put(&self, _record: &StoredRecord) -> Result<(), AppError> {
            Err(AppError::Internal("table unavailable".to_string()))
        }

        async fn get(&self, _id: &str) -> Result<Option<StoredRecord>, AppError> {
            Ok(None)
        }

        fn backend(&self) -> &'static str {
            "failing"
        }
    }

    fn json_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }

    fn processor() -> (WebhookProcessor, MemoryRecordStore) {
        let store = MemoryRecordStore::new();
        (WebhookProcessor::new(Arc::new(store.clone())), store)
    }

    #[tokio::test]
    async fn test_processed_subscription() {
        let (processor, store) = processor();
        let body = br#"{"event_type": "BILLING.SUBSCRIPTION.CREATED", "resource": {"id": "I-ABC123", "custom_id": "user_email=a@b.com"}}"#;

        let outcome = processor.process(&json_headers(), body).await.unwrap();

        assert_eq!(
            outcome,
            WebhookOutcome::Processed {
                event_type: "BILLING.SUBSCRIPTION.CREATED".to_string(),
                record_id: "I-ABC123".to_string(),
                data_type: DataType::Subscription,
            }
        );
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn test_wrong_content_type_writes_nothing() {
        let (processor, store) = processor();
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        let body = br#"{"event_type": "BILLING.SUBSCRIPTION.CREATED", "resource": {"id": "I-1"}}"#;

        let err = processor.process(&headers, body).await.unwrap_err();

        assert_eq!(err.status_code(), 400);
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_extraction_failure_writes_nothing() {
        let (processor, store) = processor();
        let body = br#"{"event_type": "PAYMENT.SALE.COMPLETED", "resource": {"amount": {"total": "1.00", "currency": "USD"}}}"#;

        let err = processor.process(&json_headers(), body).await.unwrap_err();

        assert_eq!(err.status_code(), 422);
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_unrecognized_event_is_ignored() {
        let (processor, store) = processor();
        let body = br#"{"event_type": "CUSTOMER.DISPUTE.CREATED", "resource": {}}"#;

        let outcome = processor.process(&json_headers(), body).await.unwrap();

        assert_eq!(outcome.event_type(), "CUSTOMER.DISPUTE.CREATED");
        assert!(matches!(outcome, WebhookOutcome::Ignored { .. }));
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_store_failure_is_server_error() {
        let processor = WebhookProcessor::new(Arc::new(FailingStore));
        let body = br#"{"event_type": "BILLING.SUBSCRIPTION.CREATED", "resource": {"id": "I-1"}}"#;

        let err = processor.process(&json_headers(), body).await.unwrap_err();

        assert_eq!(err.status_code(), 500);
    }
}
