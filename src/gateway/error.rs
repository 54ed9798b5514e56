/// Error types for gateway operations
///
/// Only `fetch_order` (the settlement verification hook) surfaces these to
/// callers. `create_order` is best-effort and degrades to the mock fallback
/// instead of returning an error.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Gateway request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Gateway returned status {0}")]
    Status(u16),

    #[error("Malformed gateway response: {0}")]
    MalformedResponse(String),
}
