use std::str::FromStr;

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use payhook_common::AppError;

use crate::custom_id::CustomMetadata;
use crate::models::{
    PaymentRecord, StoredRecord, SubscriptionRecord, UNKNOWN_EMAIL, UNKNOWN_NAME,
    UNKNOWN_PURPOSE, UNKNOWN_SURNAME, UNKNOWN_TIME,
};

const DEFAULT_ORDER_CURRENCY: &str = "USD";

// Resource shapes. Everything is optional here; the extractors decide which
// fields are required so the error can name the missing path.

/// Money as the platform sends it: usually a decimal string, occasionally a
/// bare JSON number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Text(String),
    Number(serde_json::Number),
}

impl RawAmount {
    fn to_decimal(&self, field: &str) -> Result<Decimal, AppError> {
        let text = match self {
            RawAmount::Text(text) => text.trim().to_string(),
            RawAmount::Number(number) => number.to_string(),
        };

        Decimal::from_str(&text)
            .or_else(|_| Decimal::from_scientific(&text))
            .map_err(|_| AppError::Extraction(format!("{} is not a valid amount: '{}'", field, text)))
    }

    /// Like `to_decimal`, but a charged amount or fee may not be negative.
    fn to_amount(&self, field: &str) -> Result<Decimal, AppError> {
        let amount = self.to_decimal(field)?;
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(AppError::Extraction(format!("{} must not be negative: '{}'", field, amount)));
        }
        Ok(amount)
    }
}

#[derive(Debug, Deserialize)]
struct MoneyValue {
    value: Option<RawAmount>,
}

#[derive(Debug, Deserialize)]
struct SubscriptionResource {
    id: Option<String>,
    create_time: Option<String>,
    custom_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SaleResource {
    billing_agreement_id: Option<String>,
    amount: Option<SaleAmount>,
    transaction_fee: Option<MoneyValue>,
    custom: Option<String>,
    create_time: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SaleAmount {
    total: Option<RawAmount>,
    currency: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OrderResource {
    id: Option<String>,
    #[serde(default)]
    purchase_units: Vec<PurchaseUnit>,
    payer: Option<Payer>,
    create_time: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PurchaseUnit {
    amount: Option<OrderAmount>,
    payments: Option<UnitPayments>,
    custom_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OrderAmount {
    value: Option<RawAmount>,
    currency_code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UnitPayments {
    #[serde(default)]
    captures: Vec<Capture>,
}

#[derive(Debug, Deserialize)]
struct Capture {
    seller_receivable_breakdown: Option<SellerBreakdown>,
}

#[derive(Debug, Deserialize)]
struct SellerBreakdown {
    paypal_fee: Option<MoneyValue>,
    net_amount: Option<MoneyValue>,
}

#[derive(Debug, Deserialize)]
struct Payer {
    email_address: Option<String>,
    name: Option<PayerName>,
}

#[derive(Debug, Deserialize)]
struct PayerName {
    given_name: Option<String>,
    surname: Option<String>,
}

// Extractors

/// `BILLING.SUBSCRIPTION.CREATED`
pub fn extract_subscription_created(resource: &serde_json::Value) -> Result<StoredRecord, AppError> {
    let resource: SubscriptionResource = decode(resource, "subscription")?;
    let id = required_id(resource.id, "resource.id")?;
    let metadata = parse_metadata(resource.custom_id.as_deref(), &id);

    Ok(StoredRecord::Subscription(SubscriptionRecord {
        purpose: metadata.purpose.unwrap_or_else(|| UNKNOWN_PURPOSE.to_string()),
        user_name: metadata.user_name.unwrap_or_else(|| UNKNOWN_NAME.to_string()),
        user_email: metadata.user_email.unwrap_or_else(|| UNKNOWN_EMAIL.to_string()),
        create_time: resource.create_time.unwrap_or_else(|| UNKNOWN_TIME.to_string()),
        id,
    }))
}

/// `PAYMENT.SALE.COMPLETED`: a recurring charge against a billing agreement.
pub fn extract_sale_completed(resource: &serde_json::Value) -> Result<StoredRecord, AppError> {
    let resource: SaleResource = decode(resource, "sale")?;
    let id = required_id(resource.billing_agreement_id, "resource.billing_agreement_id")?;

    let amount = resource
        .amount
        .ok_or_else(|| missing("resource.amount"))?;
    let amount_value = amount
        .total
        .ok_or_else(|| missing("resource.amount.total"))?
        .to_amount("resource.amount.total")?;
    let amount_currency = amount
        .currency
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| missing("resource.amount.currency"))?;
    let transaction_fee = optional_amount(
        resource.transaction_fee.and_then(|fee| fee.value),
        "resource.transaction_fee.value",
    )?;

    let net_amount = checked_net_amount(amount_value, transaction_fee, "resource.amount.total")?;
    let metadata = parse_metadata(resource.custom.as_deref(), &id);

    Ok(StoredRecord::Payment(PaymentRecord {
        purpose: metadata.purpose.unwrap_or_else(|| UNKNOWN_PURPOSE.to_string()),
        user_name: metadata.user_name.unwrap_or_else(|| UNKNOWN_NAME.to_string()),
        user_email: metadata.user_email.unwrap_or_else(|| UNKNOWN_EMAIL.to_string()),
        payer_name: None,
        payer_email: None,
        amount_value,
        amount_currency,
        transaction_fee,
        net_amount,
        create_time: resource.create_time.unwrap_or_else(|| UNKNOWN_TIME.to_string()),
        id,
    }))
}

/// `CHECKOUT.ORDER.APPROVED`: a one-off checkout order.
pub fn extract_order_approved(resource: &serde_json::Value) -> Result<StoredRecord, AppError> {
    let resource: OrderResource = decode(resource, "order")?;
    let id = required_id(resource.id, "resource.id")?;

    let unit = resource
        .purchase_units
        .into_iter()
        .next()
        .ok_or_else(|| missing("resource.purchase_units"))?;

    let amount = unit
        .amount
        .ok_or_else(|| missing("resource.purchase_units[0].amount"))?;
    let amount_value = amount
        .value
        .ok_or_else(|| missing("resource.purchase_units[0].amount.value"))?
        .to_amount("resource.purchase_units[0].amount.value")?;
    let amount_currency = amount
        .currency_code
        .unwrap_or_else(|| DEFAULT_ORDER_CURRENCY.to_string());

    let breakdown = unit
        .payments
        .and_then(|payments| payments.captures.into_iter().next())
        .and_then(|capture| capture.seller_receivable_breakdown);
    let (fee, reported_net) = match breakdown {
        Some(breakdown) => (
            breakdown.paypal_fee.and_then(|fee| fee.value),
            breakdown.net_amount.and_then(|net| net.value),
        ),
        None => (None, None),
    };
    let transaction_fee = optional_amount(
        fee,
        "resource.purchase_units[0].payments.captures[0].seller_receivable_breakdown.paypal_fee.value",
    )?;
    let net_amount = checked_net_amount(amount_value, transaction_fee, "resource.purchase_units[0].amount.value")?;

    // The computed value is stored; the reported one is only compared.
    if let Some(Ok(reported)) = reported_net.map(|raw| raw.to_decimal("net_amount")) {
        if reported != net_amount {
            tracing::warn!(
                record_id = %id,
                computed = %net_amount,
                reported = %reported,
                "Reported net amount differs from gross minus fee"
            );
        }
    }

    let (payer_name, payer_email) = payer_details(resource.payer);
    let metadata = parse_metadata(unit.custom_id.as_deref(), &id);

    Ok(StoredRecord::Payment(PaymentRecord {
        purpose: metadata.purpose.unwrap_or_else(|| UNKNOWN_PURPOSE.to_string()),
        user_name: metadata.user_name.unwrap_or_else(|| UNKNOWN_NAME.to_string()),
        user_email: metadata.user_email.unwrap_or_else(|| UNKNOWN_EMAIL.to_string()),
        payer_name: Some(payer_name),
        payer_email: Some(payer_email),
        amount_value,
        amount_currency,
        transaction_fee,
        net_amount,
        create_time: resource.create_time.unwrap_or_else(|| UNKNOWN_TIME.to_string()),
        id,
    }))
}

fn decode<T: DeserializeOwned>(resource: &serde_json::Value, kind: &str) -> Result<T, AppError> {
    T::deserialize(resource)
        .map_err(|e| AppError::Extraction(format!("Malformed {} resource: {}", kind, e)))
}

fn missing(field: &str) -> AppError {
    AppError::Extraction(format!("Missing required field: {}", field))
}

fn required_id(id: Option<String>, field: &str) -> Result<String, AppError> {
    id.map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| missing(field))
}

fn optional_amount(raw: Option<RawAmount>, field: &str) -> Result<Decimal, AppError> {
    match raw {
        Some(raw) => raw.to_amount(field),
        None => Ok(Decimal::ZERO),
    }
}

/// Gross minus fee, failing instead of overflowing past `Decimal`'s range.
fn checked_net_amount(gross: Decimal, fee: Decimal, field: &str) -> Result<Decimal, AppError> {
    gross.checked_sub(fee).ok_or_else(|| {
        AppError::Extraction(format!("{} minus the transaction fee is out of range", field))
    })
}

fn payer_details(payer: Option<Payer>) -> (String, String) {
    let Some(payer) = payer else {
        return (
            format!("{} {}", UNKNOWN_NAME, UNKNOWN_SURNAME),
            UNKNOWN_EMAIL.to_string(),
        );
    };

    let (given_name, surname) = match payer.name {
        Some(name) => (name.given_name, name.surname),
        None => (None, None),
    };

    let payer_name = format!(
        "{} {}",
        given_name.as_deref().unwrap_or(UNKNOWN_NAME),
        surname.as_deref().unwrap_or(UNKNOWN_SURNAME),
    );
    let payer_email = payer.email_address.unwrap_or_else(|| UNKNOWN_EMAIL.to_string());

    (payer_name, payer_email)
}

fn parse_metadata(raw: Option<&str>, record_id: &str) -> CustomMetadata {
    let (metadata, skipped) = CustomMetadata::parse_lossy(raw.unwrap_or_default());
    for error in skipped {
        tracing::warn!(record_id, %error, "Skipping custom metadata entry");
    }
    metadata
}
