use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Result, SqlitePool};
use std::str::FromStr;

use crate::db::models::{NewTransaction, Receipt, Transaction, TransactionStatus};

// --- Transactions ---

pub async fn insert_transaction(pool: &SqlitePool, tx: &NewTransaction) -> Result<Transaction> {
    let now = Utc::now();
    let row = sqlx::query_as::<_, TransactionRow>(
        r#"
        INSERT INTO transactions (
            reference, access_code, email, amount, currency,
            status, channel, raw_response, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING id, reference, access_code, email, amount, currency,
            status, channel, raw_response, created_at, updated_at
        "#,
    )
    .bind(&tx.reference)
    .bind(&tx.access_code)
    .bind(&tx.email)
    .bind(tx.amount.to_string())
    .bind(&tx.currency)
    .bind(tx.status.as_str())
    .bind(&tx.channel)
    .bind(&tx.raw_response)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;

    row.into_domain()
}

pub async fn get_transaction_by_reference(
    pool: &SqlitePool,
    reference: &str,
) -> Result<Option<Transaction>> {
    let row = sqlx::query_as::<_, TransactionRow>(
        "SELECT * FROM transactions WHERE reference = ?",
    )
    .bind(reference)
    .fetch_optional(pool)
    .await?;

    row.map(TransactionRow::into_domain).transpose()
}

/// Overwrites the gateway-reported fields of one row. The caller is expected
/// to have consulted the transition table first; last writer wins here.
pub async fn update_transaction_status(
    pool: &SqlitePool,
    reference: &str,
    status: TransactionStatus,
    channel: Option<&str>,
    raw_response: &str,
) -> Result<()> {
    sqlx::query(
        "UPDATE transactions SET status = ?, channel = ?, raw_response = ?, updated_at = ? \
         WHERE reference = ?",
    )
    .bind(status.as_str())
    .bind(channel)
    .bind(raw_response)
    .bind(Utc::now())
    .bind(reference)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn list_recent_transactions(
    pool: &SqlitePool,
    limit: i64,
) -> Result<Vec<Transaction>> {
    let rows = sqlx::query_as::<_, TransactionRow>(
        "SELECT * FROM transactions ORDER BY created_at DESC, id DESC LIMIT ?",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(TransactionRow::into_domain).collect()
}

pub async fn delete_pending_transactions(pool: &SqlitePool) -> Result<u64> {
    let result = sqlx::query("DELETE FROM transactions WHERE status = ?")
        .bind(TransactionStatus::Pending.as_str())
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

// --- Receipts ---

pub async fn insert_receipt(pool: &SqlitePool, receipt: &Receipt) -> Result<()> {
    sqlx::query("INSERT INTO receipts (id, content, at, accessed) VALUES (?, ?, ?, ?)")
        .bind(&receipt.id)
        .bind(&receipt.content)
        .bind(receipt.at)
        .bind(receipt.accessed)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn get_receipt(pool: &SqlitePool, id: &str) -> Result<Option<Receipt>> {
    sqlx::query_as::<_, Receipt>("SELECT id, content, at, accessed FROM receipts WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Internal row type for sqlx. SQLite has no decimal column, so amounts are
/// TEXT and re-parsed on the way out; not exposed outside this module.
#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id: i64,
    reference: String,
    access_code: Option<String>,
    email: Option<String>,
    amount: String,
    currency: Option<String>,
    status: String,
    channel: Option<String>,
    raw_response: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TransactionRow {
    fn into_domain(self) -> Result<Transaction> {
        let amount = Decimal::from_str(&self.amount)
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
        let status = TransactionStatus::from_str(&self.status)
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

        Ok(Transaction {
            id: self.id,
            reference: self.reference,
            access_code: self.access_code,
            email: self.email,
            amount,
            currency: self.currency,
            status,
            channel: self.channel,
            raw_response: self.raw_response,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
