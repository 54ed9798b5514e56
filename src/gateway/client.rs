// Payment gateway order client
//
// Best-effort integration with the external order-creation endpoint. The
// gateway is treated as fully untrusted: its response body is stored as an
// opaque blob and never used to derive amounts or currencies. When the
// gateway is unreachable the order flow continues with a locally synthesized
// mock order id so the user flow stays unblocked.

use rand::Rng;
use serde::Serialize;
use std::time::Duration;

use crate::gateway::error::GatewayError;

/// Fixed timeout for gateway calls; no retries are performed
const GATEWAY_TIMEOUT: Duration = Duration::from_secs(10);

/// Gateway configuration, read from the environment
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub order_url: String,
    pub key_id: String,
    pub key_secret: String,
}

impl GatewayConfig {
    /// Read gateway settings from environment variables
    ///
    /// Missing values fall back to placeholders; calls against them fail and
    /// the order flow degrades to mock orders, which keeps local development
    /// working without gateway credentials.
    pub fn from_env() -> Self {
        Self {
            order_url: std::env::var("GATEWAY_ORDER_URL")
                .unwrap_or_else(|_| "http://localhost:9/orders".to_string()),
            key_id: std::env::var("GATEWAY_KEY_ID").unwrap_or_else(|_| "key_unset".to_string()),
            key_secret: std::env::var("GATEWAY_KEY_SECRET").unwrap_or_default(),
        }
    }
}

/// Request payload for gateway order creation
///
/// `amount` is in minor currency units (price x 100). `notes` carries local
/// correlation ids (application/booking id, email) for reconciliation.
#[derive(Debug, Clone, Serialize)]
pub struct OrderPayload {
    pub amount: i64,
    pub currency: String,
    pub receipt: String,
    pub notes: serde_json::Value,
}

/// A gateway-side order as returned by the order-creation endpoint
///
/// Only the id is extracted; the full body is retained as an untrusted blob
/// for the Payment record.
#[derive(Debug, Clone)]
pub struct GatewayOrder {
    pub id: String,
    pub raw: serde_json::Value,
}

/// Client for the external payment-order-creation endpoint
#[derive(Clone)]
pub struct GatewayOrderClient {
    http: reqwest::Client,
    config: GatewayConfig,
}

impl GatewayOrderClient {
    /// Create a new client with the fixed gateway timeout
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(GATEWAY_TIMEOUT)
            .build()?;
        Ok(Self { http, config })
    }

    /// Attempt to create an order on the gateway
    ///
    /// Returns `None` on any transport, HTTP or parse failure. The caller is
    /// responsible for falling back to [`mock_order_id`]. No retries.
    pub async fn create_order(&self, payload: &OrderPayload) -> Option<GatewayOrder> {
        let result = self
            .http
            .post(&self.config.order_url)
            .basic_auth(&self.config.key_id, Some(&self.config.key_secret))
            .json(payload)
            .send()
            .await;

        let response = match result {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!("Gateway order creation failed: {}", err);
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::warn!(
                "Gateway order creation returned status {} for receipt {}",
                response.status(),
                payload.receipt
            );
            return None;
        }

        let body: serde_json::Value = match response.json().await {
            Ok(body) => body,
            Err(err) => {
                tracing::warn!("Gateway order response was not valid JSON: {}", err);
                return None;
            }
        };

        match body.get("id").and_then(|id| id.as_str()) {
            Some(id) => Some(GatewayOrder {
                id: id.to_string(),
                raw: body.clone(),
            }),
            None => {
                tracing::warn!("Gateway order response missing id field");
                None
            }
        }
    }

    /// Fetch an order from the gateway by id
    ///
    /// This is the verification hook for the settlement path: whatever
    /// confirms a payment (webhook or poller) must re-read the order here
    /// before a Payment is marked completed. Unlike `create_order` this
    /// propagates errors, since a failed verification must never pass.
    pub async fn fetch_order(&self, order_id: &str) -> Result<GatewayOrder, GatewayError> {
        let url = format!("{}/{}", self.config.order_url, order_id);
        let response = self
            .http
            .get(&url)
            .basic_auth(&self.config.key_id, Some(&self.config.key_secret))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Status(status.as_u16()));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|err| GatewayError::MalformedResponse(err.to_string()))?;

        let id = body
            .get("id")
            .and_then(|id| id.as_str())
            .ok_or_else(|| GatewayError::MalformedResponse("missing id field".to_string()))?
            .to_string();

        Ok(GatewayOrder { id, raw: body })
    }
}

/// Synthesize a local mock order id: `order_mock_<12 hex chars>`
pub fn mock_order_id() -> String {
    format!("order_mock_{}", random_hex(12))
}

/// Build an order receipt: `{prefix}_{id}_{8 hex chars}`
pub fn receipt(prefix: &str, id: i32) -> String {
    format!("{}_{}_{}", prefix, id, random_hex(8))
}

fn random_hex(len: usize) -> String {
    const HEX: &[u8] = b"0123456789abcdef";
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| HEX[rng.gen_range(0..HEX.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_order_id_format() {
        let id = mock_order_id();
        assert!(id.starts_with("order_mock_"));
        let suffix = id.strip_prefix("order_mock_").unwrap();
        assert_eq!(suffix.len(), 12);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_mock_order_ids_are_distinct() {
        assert_ne!(mock_order_id(), mock_order_id());
    }

    #[test]
    fn test_receipt_format() {
        let r = receipt("workshop", 42);
        let parts: Vec<&str> = r.splitn(3, '_').collect();
        assert_eq!(parts[0], "workshop");
        assert_eq!(parts[1], "42");
        assert_eq!(parts[2].len(), 8);
        assert!(parts[2].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_order_payload_serialization() {
        let payload = OrderPayload {
            amount: 50000,
            currency: "INR".to_string(),
            receipt: "workshop_1_deadbeef".to_string(),
            notes: serde_json::json!({ "workshop_id": 1 }),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["amount"], 50000);
        assert_eq!(json["currency"], "INR");
        assert_eq!(json["notes"]["workshop_id"], 1);
    }

    #[tokio::test]
    async fn test_create_order_unreachable_gateway_returns_none() {
        // Port 9 (discard) is refused immediately on loopback
        let client = GatewayOrderClient::new(GatewayConfig {
            order_url: "http://127.0.0.1:9/orders".to_string(),
            key_id: "key".to_string(),
            key_secret: "secret".to_string(),
        })
        .unwrap();

        let payload = OrderPayload {
            amount: 50000,
            currency: "INR".to_string(),
            receipt: "workshop_1_deadbeef".to_string(),
            notes: serde_json::json!({}),
        };

        assert!(client.create_order(&payload).await.is_none());
    }

    #[tokio::test]
    async fn test_fetch_order_unreachable_gateway_is_an_error() {
        let client = GatewayOrderClient::new(GatewayConfig {
            order_url: "http://127.0.0.1:9/orders".to_string(),
            key_id: "key".to_string(),
            key_secret: "secret".to_string(),
        })
        .unwrap();

        assert!(client.fetch_order("order_abc").await.is_err());
    }
}
