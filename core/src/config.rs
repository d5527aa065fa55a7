//! Client configuration: endpoint, credential, connection string, options.

use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::error::ApiError;

pub const DEFAULT_API_VERSION: &str = "2023-03-31-preview";

/// How requests are authenticated.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// Base64 shared key of the communication resource; requests are
    /// HMAC-signed.
    AccessKey(String),
    /// A bearer token acquired elsewhere.
    Token(String),
}

impl Credential {
    pub(crate) fn is_empty(&self) -> bool {
        match self {
            Credential::AccessKey(secret) | Credential::Token(secret) => secret.trim().is_empty(),
        }
    }
}

// Secrets stay out of logs and panic messages.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::AccessKey(_) => f.write_str("AccessKey(***)"),
            Credential::Token(_) => f.write_str("Token(***)"),
        }
    }
}

/// Per-client knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    pub api_version: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }
}

/// Prefix `https://` when no scheme is present and drop trailing slashes.
/// The result must parse as an `http` or `https` URL with a host.
pub fn normalize_endpoint(endpoint: &str) -> Result<String, ApiError> {
    let invalid = || ApiError::InvalidEndpoint(endpoint.to_string());
    let trimmed = endpoint.trim();
    if trimmed.is_empty() || trimmed.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let parsed = Url::parse(&with_scheme).map_err(|_| invalid())?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(invalid());
    }
    Ok(with_scheme.trim_end_matches('/').to_string())
}

/// `endpoint=<url>;accesskey=<key>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionString {
    pub endpoint: String,
    pub credential: Credential,
}

impl FromStr for ConnectionString {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut endpoint = None;
        let mut access_key = None;

        for segment in s.split(';').map(str::trim).filter(|seg| !seg.is_empty()) {
            let (key, value) = segment
                .split_once('=')
                .ok_or_else(|| {
                    ApiError::InvalidConnectionString(format!("malformed segment {segment:?}"))
                })?;
            match key.trim().to_ascii_lowercase().as_str() {
                "endpoint" => endpoint = Some(value.trim().to_string()),
                // Base64 keys may end in '=', which split_once leaves intact.
                "accesskey" => access_key = Some(value.trim().to_string()),
                _ => {}
            }
        }

        match (endpoint, access_key) {
            (Some(endpoint), Some(key)) if !endpoint.is_empty() && !key.is_empty() => Ok(Self {
                endpoint,
                credential: Credential::AccessKey(key),
            }),
            _ => Err(ApiError::InvalidConnectionString(
                "expected endpoint=<url>;accesskey=<key>".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_host_gets_https_scheme() {
        assert_eq!(normalize_endpoint("example.com").unwrap(), "https://example.com");
    }

    #[test]
    fn host_starting_with_http_still_gets_scheme() {
        assert_eq!(
            normalize_endpoint("httpgateway.example.com").unwrap(),
            "https://httpgateway.example.com"
        );
        assert_eq!(
            normalize_endpoint("https-proxy.example.com:8443").unwrap(),
            "https://https-proxy.example.com:8443"
        );
    }

    #[test]
    fn non_http_scheme_is_rejected() {
        assert!(matches!(
            normalize_endpoint("ftp://example.com"),
            Err(ApiError::InvalidEndpoint(_))
        ));
        assert!(matches!(
            normalize_endpoint("https://"),
            Err(ApiError::InvalidEndpoint(_))
        ));
    }

    #[test]
    fn existing_scheme_is_kept_and_trailing_slash_dropped() {
        assert_eq!(
            normalize_endpoint("http://localhost:3000/").unwrap(),
            "http://localhost:3000"
        );
        assert_eq!(
            normalize_endpoint("HTTPS://Example.com").unwrap(),
            "HTTPS://Example.com"
        );
    }

    #[test]
    fn empty_or_spaced_endpoint_is_rejected() {
        assert!(matches!(normalize_endpoint(""), Err(ApiError::InvalidEndpoint(_))));
        assert!(matches!(normalize_endpoint("   "), Err(ApiError::InvalidEndpoint(_))));
        assert!(matches!(
            normalize_endpoint("exa mple.com"),
            Err(ApiError::InvalidEndpoint(_))
        ));
    }

    #[test]
    fn connection_string_parses_both_parts() {
        let parsed: ConnectionString =
            "endpoint=https://res.communication.azure.com/;accesskey=c2VjcmV0=="
                .parse()
                .unwrap();
        assert_eq!(parsed.endpoint, "https://res.communication.azure.com/");
        assert_eq!(parsed.credential, Credential::AccessKey("c2VjcmV0==".to_string()));
    }

    #[test]
    fn connection_string_keys_are_case_insensitive() {
        let parsed: ConnectionString = " Endpoint=example.com ; AccessKey=a2V5 ;".parse().unwrap();
        assert_eq!(parsed.endpoint, "example.com");
        assert_eq!(parsed.credential, Credential::AccessKey("a2V5".to_string()));
    }

    #[test]
    fn connection_string_without_key_is_rejected() {
        let err = "endpoint=example.com".parse::<ConnectionString>().unwrap_err();
        assert!(matches!(err, ApiError::InvalidConnectionString(_)));

        let err = "endpoint=example.com;accesskey=".parse::<ConnectionString>().unwrap_err();
        assert!(matches!(err, ApiError::InvalidConnectionString(_)));

        let err = "garbage".parse::<ConnectionString>().unwrap_err();
        assert!(matches!(err, ApiError::InvalidConnectionString(_)));
    }

    #[test]
    fn credential_debug_hides_secret() {
        let rendered = format!("{:?}", Credential::Token("super-secret".to_string()));
        assert!(!rendered.contains("super-secret"));
    }

    #[test]
    fn blank_credentials_count_as_empty() {
        assert!(Credential::AccessKey("  ".to_string()).is_empty());
        assert!(!Credential::Token("t".to_string()).is_empty());
    }
}
