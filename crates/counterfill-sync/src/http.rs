//! HTTP client for the fill-by-INN lookup endpoint.

use chrono::{DateTime, Utc};
use counterfill_core::{ExternalLookupResult, TaxId};
use thiserror::Error;
use tracing::info;

pub const DEFAULT_LOOKUP_PATH: &str = "/admin/counterparties/counterparty/fill-by-inn/";

#[derive(Error, Debug)]
pub enum LookupError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
}

/// A lookup response stamped with its arrival time.
#[derive(Debug, Clone)]
pub struct LookupResponse {
    pub result: ExternalLookupResult,
    pub fetched_at: DateTime<Utc>,
}

/// HTTP client for the registry lookup service.
pub struct LookupClient {
    client: reqwest::Client,
    base_url: String,
    path: String,
}

impl LookupClient {
    /// Create a client for the given base URL, e.g. `http://localhost:8000`
    /// (trailing slash optional).
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            path: DEFAULT_LOOKUP_PATH.to_string(),
        }
    }

    pub fn with_path(mut self, path: &str) -> Self {
        self.path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };
        self
    }

    fn url(&self, tax_id: &TaxId) -> String {
        format!("{}{}?inn={}", self.base_url, self.path, tax_id)
    }

    /// Look up one identifier.
    ///
    /// The service answers a physical-person verdict with `not_found` and may
    /// do so on any status, so a not-found body is returned as `Ok` even for
    /// an error status.
    pub async fn lookup(&self, tax_id: &TaxId) -> Result<LookupResponse, LookupError> {
        let url = self.url(tax_id);
        info!(url = %url, "looking up counterparty");

        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        let result = parse_body(status.as_u16(), &body)?;

        info!(
            status = status.as_u16(),
            not_found = result.not_found,
            years = result.financial_years.len(),
            "lookup complete"
        );
        Ok(LookupResponse {
            result,
            fetched_at: Utc::now(),
        })
    }
}

fn parse_body(status: u16, body: &str) -> Result<ExternalLookupResult, LookupError> {
    let parsed = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .map(ExternalLookupResult::from);
    match parsed {
        Some(result) if (200..300).contains(&status) || result.not_found => Ok(result),
        _ => Err(LookupError::Server {
            status,
            body: body.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use counterfill_core::Field;

    fn inn() -> TaxId {
        TaxId::parse("7701234567").unwrap()
    }

    #[test]
    fn client_trims_trailing_slash() {
        let client = LookupClient::new("http://localhost:8000/".into());
        assert_eq!(client.base_url, "http://localhost:8000");
        assert_eq!(
            client.url(&inn()),
            "http://localhost:8000/admin/counterparties/counterparty/fill-by-inn/?inn=7701234567"
        );
    }

    #[test]
    fn custom_path_gets_leading_slash() {
        let client = LookupClient::new("http://registry".into()).with_path("api/lookup");
        assert_eq!(client.url(&inn()), "http://registry/api/lookup?inn=7701234567");
    }

    #[test]
    fn success_body_parses() {
        let result = parse_body(200, r#"{"address": "Moscow", "is_ip": false}"#).unwrap();
        assert_eq!(result.text(Field::Address), "Moscow");
    }

    #[test]
    fn not_found_body_is_ok_on_any_status() {
        let result = parse_body(404, r#"{"not_found": true, "is_physical": true}"#).unwrap();
        assert!(result.not_found);
        assert!(result.is_physical_person);
    }

    #[test]
    fn error_status_is_server_error() {
        let err = parse_body(500, r#"{"error": "Ошибка: boom"}"#).unwrap_err();
        assert!(matches!(err, LookupError::Server { status: 500, .. }));
    }

    #[test]
    fn non_json_body_is_server_error() {
        let err = parse_body(200, "<html>login</html>").unwrap_err();
        assert!(matches!(err, LookupError::Server { status: 200, .. }));
    }
}
