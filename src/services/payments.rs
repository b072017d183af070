//! Payment lifecycle orchestration.
//!
//! The gateway is the source of truth for every charge and the local store is
//! a best-effort cache of it. All gateway-reported state enters the store
//! through [`PaymentService::reconcile`], whether it arrived from an explicit
//! verify call or an asynchronous webhook, so a charge reaching success
//! always produces exactly one receipt.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::SqlitePool;
use std::str::FromStr;

use crate::db::models::{NewTransaction, TransactionStatus};
use crate::db::queries;
use crate::error::AppError;
use crate::gateway::{self, GatewayResult, PaystackClient};
use crate::render::{self, ReceiptData};
use crate::services::receipts;

/// The only webhook event this service acts on.
pub const WEBHOOK_CHARGE_SUCCESS: &str = "charge.success";

#[derive(Clone)]
pub struct PaymentService {
    pool: SqlitePool,
    gateway: PaystackClient,
}

impl PaymentService {
    pub fn new(pool: SqlitePool, gateway: PaystackClient) -> Self {
        PaymentService { pool, gateway }
    }

    /// Validates the request, initializes the charge with the gateway and
    /// caches the resulting pending transaction. A store failure after the
    /// gateway accepted the charge is logged and swallowed: the caller still
    /// needs the reference and access code it was promised.
    pub async fn initiate(
        &self,
        email: Option<&str>,
        amount: Option<&Value>,
    ) -> Result<GatewayResult, AppError> {
        let email = match email.map(str::trim) {
            Some(email) if !email.is_empty() => email,
            _ => {
                return Err(AppError::Validation(
                    "email and amount required".to_string(),
                ))
            }
        };
        let amount = parse_amount(amount)?;

        let result = self
            .gateway
            .initialize(email, amount, gateway::DEFAULT_CURRENCY)
            .await?;

        if result.ok {
            if let Some(reference) = result.data().and_then(|data| data["reference"].as_str()) {
                let tx = NewTransaction {
                    reference: reference.to_string(),
                    access_code: result
                        .data()
                        .and_then(|data| data["access_code"].as_str())
                        .map(String::from),
                    email: Some(email.to_string()),
                    amount,
                    currency: Some(gateway::DEFAULT_CURRENCY.to_string()),
                    status: TransactionStatus::Pending,
                    channel: None,
                    raw_response: Some(result.body.to_string()),
                };
                if let Err(e) = queries::insert_transaction(&self.pool, &tx).await {
                    tracing::error!(reference, error = %e, "failed to cache initiated transaction");
                } else {
                    tracing::info!(reference, %amount, "payment initiated");
                }
            }
        }

        Ok(result)
    }

    /// Fetches the authoritative state of `reference` from the gateway and
    /// reconciles it into the local record. Returns the gateway result plus
    /// the id of a receipt when this call moved the charge into success.
    pub async fn verify(
        &self,
        reference: &str,
    ) -> Result<(GatewayResult, Option<String>), AppError> {
        let result = self.gateway.verify(reference).await?;

        let receipt_id = match result.data() {
            Some(data) if result.ok => self.reconcile(reference, data, &result.body, false).await,
            _ => None,
        };

        Ok((result, receipt_id))
    }

    /// Applies one verified webhook event. Events other than
    /// `charge.success` are acknowledged without processing. A
    /// `charge.success` for an unseen reference creates the transaction from
    /// the payload alone, covering webhooks that outrun the initiate cache
    /// or the explicit verify call.
    pub async fn process_webhook_event(&self, event: &Value) -> Option<String> {
        if event["event"].as_str() != Some(WEBHOOK_CHARGE_SUCCESS) {
            tracing::debug!(event = ?event["event"].as_str(), "ignoring webhook event");
            return None;
        }

        let data = &event["data"];
        let reference = match data["reference"].as_str() {
            Some(reference) => reference,
            None => {
                tracing::warn!("charge.success event without a reference, ignoring");
                return None;
            }
        };

        self.reconcile(reference, data, event, true).await
    }

    /// The single place a gateway-reported status enters the store. Returns
    /// the id of a receipt when this call moved the charge into success.
    /// Store failures are logged, not surfaced: the gateway result stands on
    /// its own and the next verify or webhook retries the write.
    async fn reconcile(
        &self,
        reference: &str,
        data: &Value,
        raw_payload: &Value,
        create_missing: bool,
    ) -> Option<String> {
        let new_status = match data["status"].as_str() {
            Some(status) => match TransactionStatus::from_str(status) {
                Ok(new_status) => new_status,
                Err(e) => {
                    tracing::warn!(reference, error = %e, "skipping unrecognized gateway status");
                    return None;
                }
            },
            None => return None,
        };
        let channel = data["channel"].as_str();
        let raw = raw_payload.to_string();

        let existing = match queries::get_transaction_by_reference(&self.pool, reference).await {
            Ok(existing) => existing,
            Err(e) => {
                tracing::error!(reference, error = %e, "failed to load transaction for reconciliation");
                return None;
            }
        };

        match existing {
            Some(tx) => {
                if !tx.status.can_transition_to(new_status) {
                    tracing::warn!(
                        reference,
                        from = %tx.status,
                        to = %new_status,
                        "rejected status regression"
                    );
                    return None;
                }

                if let Err(e) =
                    queries::update_transaction_status(&self.pool, reference, new_status, channel, &raw)
                        .await
                {
                    tracing::error!(reference, error = %e, "failed to update reconciled transaction");
                    return None;
                }
                tracing::info!(reference, status = %new_status, "transaction reconciled");

                // A receipt marks the transition into success, never a
                // repeat of it.
                if new_status == TransactionStatus::Success
                    && tx.status != TransactionStatus::Success
                {
                    let receipt = receipt_data(
                        reference,
                        tx.email.as_deref(),
                        tx.amount,
                        tx.currency.as_deref(),
                        channel,
                        data,
                    );
                    self.issue_receipt(&receipt).await
                } else {
                    None
                }
            }
            None if create_missing => {
                let amount = data["amount"]
                    .as_i64()
                    .map(gateway::from_minor_units)
                    .unwrap_or(Decimal::ZERO);
                let tx = NewTransaction {
                    reference: reference.to_string(),
                    access_code: None,
                    email: data["customer"]["email"].as_str().map(String::from),
                    amount,
                    currency: data["currency"].as_str().map(String::from),
                    status: new_status,
                    channel: channel.map(String::from),
                    raw_response: Some(raw),
                };

                match queries::insert_transaction(&self.pool, &tx).await {
                    Ok(created) => {
                        tracing::info!(reference, status = %new_status, "transaction created from webhook");
                        if new_status == TransactionStatus::Success {
                            let receipt = receipt_data(
                                reference,
                                created.email.as_deref(),
                                created.amount,
                                created.currency.as_deref(),
                                channel,
                                data,
                            );
                            self.issue_receipt(&receipt).await
                        } else {
                            None
                        }
                    }
                    Err(e) => {
                        tracing::error!(reference, error = %e, "failed to create transaction from webhook");
                        None
                    }
                }
            }
            None => None,
        }
    }

    async fn issue_receipt(&self, receipt: &ReceiptData<'_>) -> Option<String> {
        let content = render::receipt_content(receipt);
        match receipts::create_receipt(&self.pool, &content).await {
            Ok(id) => {
                tracing::info!(reference = receipt.reference, receipt = %id, "receipt issued");
                Some(id)
            }
            Err(e) => {
                tracing::error!(reference = receipt.reference, error = %e, "failed to store receipt");
                None
            }
        }
    }
}

/// Accepts JSON numbers and numeric strings; everything else is a
/// validation error in the caller's terms.
fn parse_amount(amount: Option<&Value>) -> Result<Decimal, AppError> {
    let value = match amount {
        Some(value) if !value.is_null() => value,
        _ => {
            return Err(AppError::Validation(
                "email and amount required".to_string(),
            ))
        }
    };

    let parsed = match value {
        Value::Number(n) => parse_decimal(&n.to_string()),
        Value::String(s) => parse_decimal(s.trim()),
        _ => None,
    };

    match parsed {
        Some(amount) if amount > Decimal::ZERO => Ok(amount),
        _ => Err(AppError::Validation("invalid amount".to_string())),
    }
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

fn receipt_data<'a>(
    reference: &'a str,
    email: Option<&'a str>,
    amount: Decimal,
    currency: Option<&'a str>,
    channel: Option<&'a str>,
    data: &Value,
) -> ReceiptData<'a> {
    ReceiptData {
        reference,
        email,
        amount,
        currency,
        channel,
        paid_via: paid_via(data),
        status: TransactionStatus::Success.as_str(),
        paid_at: paid_at(data).unwrap_or_else(Utc::now),
        receipt_number: data["receipt_number"]
            .as_str()
            .map(String::from)
            .unwrap_or_else(receipts::generate_token),
    }
}

fn paid_via(data: &Value) -> Option<String> {
    let auth = data.get("authorization")?;
    auth["bank"]
        .as_str()
        .or_else(|| auth["mobile_money_number"].as_str())
        .map(String::from)
}

fn paid_at(data: &Value) -> Option<DateTime<Utc>> {
    let raw = data["paid_at"].as_str().or_else(|| data["paidAt"].as_str())?;
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
