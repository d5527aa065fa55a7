//! Request authentication.
//!
//! `AuthPolicy` is built once from the endpoint and credential and then
//! stamps every outgoing `HttpRequest`. Access keys sign the request with
//! HMAC-SHA256 over method, path, date, host and body hash; tokens are sent
//! as a bearer header.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::config::Credential;
use crate::error::ApiError;
use crate::http::HttpRequest;

type HmacSha256 = Hmac<Sha256>;

const SIGNED_HEADERS: &str = "x-ms-date;host;x-ms-content-sha256";

#[derive(Clone)]
enum Scheme {
    SharedKey(Vec<u8>),
    Bearer(String),
}

/// Adds authentication headers to requests.
#[derive(Clone)]
pub struct AuthPolicy {
    scheme: Scheme,
}

impl std::fmt::Debug for AuthPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.scheme {
            Scheme::SharedKey(_) => "SharedKey",
            Scheme::Bearer(_) => "Bearer",
        };
        f.debug_struct("AuthPolicy").field("scheme", &kind).finish()
    }
}

impl AuthPolicy {
    /// Fails for empty credentials and for access keys that are not base64.
    pub fn new(credential: &Credential) -> Result<Self, ApiError> {
        if credential.is_empty() {
            return Err(ApiError::MissingCredential);
        }
        let scheme = match credential {
            Credential::AccessKey(key) => {
                let decoded = BASE64
                    .decode(key.trim())
                    .map_err(|e| {
                        ApiError::InvalidCredential(format!("access key is not base64: {e}"))
                    })?;
                Scheme::SharedKey(decoded)
            }
            Credential::Token(token) => Scheme::Bearer(token.trim().to_string()),
        };
        Ok(Self { scheme })
    }

    pub fn apply(&self, request: &mut HttpRequest) -> Result<(), ApiError> {
        self.apply_at(request, Utc::now())
    }

    /// `apply` with an explicit clock.
    pub fn apply_at(&self, request: &mut HttpRequest, now: DateTime<Utc>) -> Result<(), ApiError> {
        match &self.scheme {
            Scheme::Bearer(token) => {
                request
                    .headers
                    .push(("authorization".to_string(), format!("Bearer {token}")));
            }
            Scheme::SharedKey(key) => {
                let (host, path_and_query) = split_url(&request.url)
                    .ok_or_else(|| ApiError::InvalidEndpoint(request.url.clone()))?;
                let date = rfc1123(now);
                let content_hash =
                    BASE64.encode(Sha256::digest(request.body.as_deref().unwrap_or("").as_bytes()));
                let string_to_sign = format!(
                    "{}\n{path_and_query}\n{date};{host};{content_hash}",
                    request.method.as_str()
                );

                let mut mac = HmacSha256::new_from_slice(key)
                    .map_err(|e| ApiError::InvalidCredential(e.to_string()))?;
                mac.update(string_to_sign.as_bytes());
                let signature = BASE64.encode(mac.finalize().into_bytes());

                request.headers.push(("x-ms-date".to_string(), date));
                request
                    .headers
                    .push(("x-ms-content-sha256".to_string(), content_hash));
                request.headers.push((
                    "authorization".to_string(),
                    format!("HMAC-SHA256 SignedHeaders={SIGNED_HEADERS}&Signature={signature}"),
                ));
            }
        }
        Ok(())
    }
}

pub(crate) fn rfc1123(time: DateTime<Utc>) -> String {
    time.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// `https://host:port/a/b?q` → (`host:port`, `/a/b?q`).
fn split_url(url: &str) -> Option<(&str, &str)> {
    let (_, rest) = url.split_once("://")?;
    match rest.find('/') {
        Some(idx) => Some((&rest[..idx], &rest[idx..])),
        None => Some((rest, "/")),
    }
}
