//! Receipt issuance: unguessable tokens and snapshot persistence.

use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::rngs::OsRng;
use rand::Rng;
use sqlx::SqlitePool;

use crate::db::models::Receipt;
use crate::db::queries;
use crate::error::AppError;

pub const TOKEN_LEN: usize = 10;

/// With 62^10 possible tokens a collision effectively never happens; the
/// bound exists so a broken RNG cannot spin this into an infinite loop.
const MAX_TOKEN_ATTEMPTS: u32 = 5;

/// 10-character alphanumeric token from the OS entropy source. Used for
/// receipt lookup keys and as fallback receipt numbers.
pub fn generate_token() -> String {
    OsRng
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}

/// Stores `content` under a fresh token and returns the token. A unique-key
/// conflict on insert regenerates the token and retries.
pub async fn create_receipt(pool: &SqlitePool, content: &str) -> Result<String, AppError> {
    for _ in 0..MAX_TOKEN_ATTEMPTS {
        let receipt = Receipt {
            id: generate_token(),
            content: content.to_string(),
            at: Utc::now(),
            accessed: false,
        };

        match queries::insert_receipt(pool, &receipt).await {
            Ok(()) => return Ok(receipt.id),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                tracing::warn!(id = %receipt.id, "receipt token collision, regenerating");
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(AppError::Internal(
        "could not allocate a unique receipt id".to_string(),
    ))
}
