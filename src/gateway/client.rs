//! Outbound HTTP client for the Paystack transaction API.
//!
//! The gateway is the source of truth for every charge. This client never
//! retries: a network failure means the outcome is unknown, and deciding what
//! to do about that belongs to the caller.

use reqwest::Client;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://api.paystack.co";
pub const DEFAULT_CURRENCY: &str = "KES";

const INITIALIZE_TIMEOUT: Duration = Duration::from_secs(15);
const VERIFY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug)]
pub enum GatewayError {
    /// Timeout, connection failure, or any other transport-level error.
    /// The charge may still have succeeded gateway-side.
    #[error("gateway request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("invalid response from gateway: {0}")]
    InvalidResponse(String),

    #[error("amount {0} is not representable in minor units")]
    AmountOutOfRange(Decimal),
}

/// A gateway call that produced an HTTP response, successful or not.
/// `ok` is the gateway's own `status` flag, not the HTTP status.
#[derive(Debug, Clone)]
pub struct GatewayResult {
    pub ok: bool,
    pub http_status: u16,
    pub body: Value,
}

impl GatewayResult {
    /// The `data` object of the gateway envelope, if one is present.
    pub fn data(&self) -> Option<&Value> {
        self.body.get("data").filter(|data| !data.is_null())
    }
}

/// Converts a major-unit amount to the gateway's minor-unit integer
/// representation: `round(amount * 100)`, midpoints away from zero, so
/// 10.005 becomes 1001. Returns `None` when the result does not fit an i64.
pub fn to_minor_units(amount: Decimal) -> Option<i64> {
    amount
        .checked_mul(Decimal::ONE_HUNDRED)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

/// Inverse of [`to_minor_units`], used to recover major-unit amounts from
/// webhook payloads.
pub fn from_minor_units(minor: i64) -> Decimal {
    Decimal::from(minor) / Decimal::ONE_HUNDRED
}

/// HTTP client for the Paystack transaction endpoints.
#[derive(Clone)]
pub struct PaystackClient {
    client: Client,
    base_url: String,
    secret_key: String,
}

impl PaystackClient {
    /// Creates a client against `base_url` authenticating with `secret_key`.
    /// Both are fixed for the life of the client.
    pub fn new(base_url: String, secret_key: String) -> Self {
        PaystackClient {
            client: Client::new(),
            base_url,
            secret_key,
        }
    }

    /// Initializes a charge for `amount` major units of `currency`, converted
    /// to minor units on the wire.
    pub async fn initialize(
        &self,
        email: &str,
        amount: Decimal,
        currency: &str,
    ) -> Result<GatewayResult, GatewayError> {
        let amount_minor =
            to_minor_units(amount).ok_or(GatewayError::AmountOutOfRange(amount))?;
        let url = format!(
            "{}/transaction/initialize",
            self.base_url.trim_end_matches('/')
        );
        let payload = json!({
            "email": email,
            "amount": amount_minor,
            "currency": currency,
            "metadata": { "integration": "lutan-pay" },
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.secret_key)
            .json(&payload)
            .timeout(INITIALIZE_TIMEOUT)
            .send()
            .await?;

        Self::into_result(response).await
    }

    /// Asks the gateway for the authoritative state of one payment attempt.
    pub async fn verify(&self, reference: &str) -> Result<GatewayResult, GatewayError> {
        let url = format!(
            "{}/transaction/verify/{}",
            self.base_url.trim_end_matches('/'),
            reference
        );

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.secret_key)
            .timeout(VERIFY_TIMEOUT)
            .send()
            .await?;

        Self::into_result(response).await
    }

    async fn into_result(response: reqwest::Response) -> Result<GatewayResult, GatewayError> {
        let http_status = response.status().as_u16();
        let body: Value = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
        let ok = body.get("status").and_then(Value::as_bool).unwrap_or(false);

        Ok(GatewayResult {
            ok,
            http_status,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn minor_units_round_midpoint_away_from_zero() {
        assert_eq!(to_minor_units(dec!(100)), Some(10000));
        assert_eq!(to_minor_units(dec!(10.005)), Some(1001));
        assert_eq!(to_minor_units(dec!(9.994)), Some(999));
        assert_eq!(to_minor_units(dec!(9.995)), Some(1000));
        assert_eq!(to_minor_units(dec!(0.01)), Some(1));
        assert_eq!(to_minor_units(dec!(-10.005)), Some(-1001));
    }

    #[test]
    fn minor_units_overflow_is_none() {
        assert_eq!(to_minor_units(Decimal::MAX), None);
    }

    #[test]
    fn minor_units_round_trip() {
        assert_eq!(from_minor_units(10000), dec!(100));
        assert_eq!(from_minor_units(1001), dec!(10.01));
        assert_eq!(from_minor_units(1), dec!(0.01));
    }

    #[tokio::test]
    async fn initialize_sends_minor_units_and_bearer_auth() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/transaction/initialize")
            .match_header("authorization", "Bearer sk_test_abc")
            .match_body(mockito::Matcher::PartialJson(json!({
                "email": "a@b.com",
                "amount": 1001,
                "currency": "KES",
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"status":true,"message":"Authorization URL created","data":{"authorization_url":"https://checkout.example/x","access_code":"ac_1","reference":"ref_1"}}"#,
            )
            .create_async()
            .await;

        let client = PaystackClient::new(server.url(), "sk_test_abc".to_string());
        let result = client
            .initialize("a@b.com", dec!(10.005), DEFAULT_CURRENCY)
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(result.ok);
        assert_eq!(result.http_status, 200);
        assert_eq!(result.data().unwrap()["reference"], "ref_1");
    }

    #[tokio::test]
    async fn gateway_rejection_is_passed_through() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/transaction/initialize")
            .with_status(401)
            .with_header("content-type", "application/json")
            .with_body(r#"{"status":false,"message":"Invalid key"}"#)
            .create_async()
            .await;

        let client = PaystackClient::new(server.url(), "sk_bad".to_string());
        let result = client
            .initialize("a@b.com", dec!(5), DEFAULT_CURRENCY)
            .await
            .unwrap();

        assert!(!result.ok);
        assert_eq!(result.http_status, 401);
        assert_eq!(result.body["message"], "Invalid key");
    }

    #[tokio::test]
    async fn verify_hits_reference_path() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/transaction/verify/ref_42")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"status":true,"data":{"reference":"ref_42","status":"success"}}"#)
            .create_async()
            .await;

        let client = PaystackClient::new(server.url(), "sk_test_abc".to_string());
        let result = client.verify("ref_42").await.unwrap();

        mock.assert_async().await;
        assert!(result.ok);
        assert_eq!(result.data().unwrap()["status"], "success");
    }

    #[tokio::test]
    async fn unreachable_gateway_is_a_request_error() {
        let client = PaystackClient::new("http://127.0.0.1:1".to_string(), "sk".to_string());
        let result = client.verify("ref_1").await;
        assert!(matches!(result, Err(GatewayError::Request(_))));
    }

    #[tokio::test]
    async fn non_json_body_is_an_invalid_response() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/transaction/verify/ref_1")
            .with_status(502)
            .with_body("<html>Bad Gateway</html>")
            .create_async()
            .await;

        let client = PaystackClient::new(server.url(), "sk".to_string());
        let result = client.verify("ref_1").await;
        assert!(matches!(result, Err(GatewayError::InvalidResponse(_))));
    }

    #[test]
    fn out_of_range_amount_is_rejected_before_any_request() {
        let result = to_minor_units(Decimal::MAX);
        assert!(result.is_none());
    }
}
