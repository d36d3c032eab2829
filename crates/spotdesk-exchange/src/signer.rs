//! HMAC-SHA256 request signing.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::credentials::ApiCredentials;
use crate::error::{ExchangeError, ExchangeResult};

type HmacSha256 = Hmac<Sha256>;

/// Url-encode parameters into a query string, preserving their order.
pub fn encode_query(params: &[(&str, String)]) -> ExchangeResult<String> {
    serde_urlencoded::to_string(params).map_err(|e| ExchangeError::Encode(e.to_string()))
}

/// Request signer for authenticated API calls.
pub struct RequestSigner<'a> {
    credentials: &'a ApiCredentials,
}

impl<'a> RequestSigner<'a> {
    pub fn new(credentials: &'a ApiCredentials) -> Self {
        Self { credentials }
    }

    /// HMAC-SHA256 of `message` under the secret key, lowercase hex.
    pub fn sign(&self, message: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.credentials.expose_secret().as_bytes())
            .expect("HMAC can take key of any size");

        mac.update(message.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Build a signed query string.
    ///
    /// Parameters keep their order, `timestamp` is appended last and the
    /// signature of everything before it is appended as `signature`.
    pub fn sign_params(&self, params: &[(&str, String)], timestamp_ms: i64) -> ExchangeResult<String> {
        let mut all_params = params.to_vec();
        all_params.push(("timestamp", timestamp_ms.to_string()));

        let query_string = encode_query(&all_params)?;
        let signature = self.sign(&query_string);
        Ok(format!("{query_string}&signature={signature}"))
    }
}
