//! GBP to EUR exchange rate retrieval.
//!
//! A failed fetch is never an error for callers: [`fetch_or_fallback`] swaps in
//! [`FALLBACK_RATE`] and marks the rate so it can be flagged on display.

use crate::display;
use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

pub const FALLBACK_RATE: Decimal = dec!(1.17);
pub const DEFAULT_RATE_URL: &str = "https://api.exchangerate-api.com/v4/latest/GBP";
const TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("exchange rate request failed: {0}")]
    Network(String),
    #[error("exchange rate service returned HTTP {0}")]
    Status(u16),
    #[error("malformed exchange rate response: {0}")]
    Parse(String),
    #[error("exchange rate response has no EUR rate")]
    MissingRate,
    #[error("exchange rate must be positive, got {0}")]
    NonPositive(Decimal),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RateSource {
    Live,
    /// Supplied by the user
    Manual,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExchangeRate {
    pub gbp_to_eur: Decimal,
    pub timestamp: DateTime<FixedOffset>,
    pub source: RateSource,
}

impl ExchangeRate {
    pub fn fallback() -> Self {
        ExchangeRate {
            gbp_to_eur: FALLBACK_RATE,
            timestamp: Utc::now().fixed_offset(),
            source: RateSource::Fallback,
        }
    }

    pub fn manual(gbp_to_eur: Decimal) -> Self {
        ExchangeRate {
            gbp_to_eur,
            timestamp: Utc::now().fixed_offset(),
            source: RateSource::Manual,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.source == RateSource::Fallback
    }

    /// Rate as shown in the form, e.g. "1.1700" or "1.1700 (fallback)"
    pub fn display(&self) -> String {
        match self.source {
            RateSource::Live | RateSource::Manual => display::rate(self.gbp_to_eur),
            RateSource::Fallback => format!("{} (fallback)", display::rate(self.gbp_to_eur)),
        }
    }
}

/// Body of either the estimator's own `/api/exchange-rate` endpoint or the
/// upstream `latest/GBP` endpoint.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RateResponse {
    Estimator {
        gbp_to_eur: Decimal,
        timestamp: String,
    },
    Latest {
        rates: HashMap<String, Decimal>,
        #[serde(default)]
        time_last_updated: Option<i64>,
    },
}

/// Source of live exchange rates
pub trait RateProvider {
    fn fetch(&self) -> Result<ExchangeRate, FetchError>;
}

/// Fetches the rate over HTTP
pub struct HttpRateProvider {
    url: String,
    agent: ureq::Agent,
}

impl HttpRateProvider {
    pub fn new(url: impl Into<String>) -> Self {
        HttpRateProvider {
            url: url.into(),
            agent: ureq::AgentBuilder::new().timeout(TIMEOUT).build(),
        }
    }
}

impl RateProvider for HttpRateProvider {
    fn fetch(&self) -> Result<ExchangeRate, FetchError> {
        log::info!("Fetching exchange rate from {}", self.url);
        let response = self.agent.get(&self.url).call().map_err(|e| match e {
            ureq::Error::Status(code, _) => FetchError::Status(code),
            ureq::Error::Transport(t) => FetchError::Network(t.to_string()),
        })?;
        let body = response
            .into_string()
            .map_err(|e| FetchError::Network(e.to_string()))?;
        parse_rate_response(&body)
    }
}

pub fn parse_rate_response(body: &str) -> Result<ExchangeRate, FetchError> {
    let response: RateResponse =
        serde_json::from_str(body).map_err(|e| FetchError::Parse(e.to_string()))?;

    let (gbp_to_eur, timestamp) = match response {
        RateResponse::Estimator {
            gbp_to_eur,
            timestamp,
        } => (gbp_to_eur, parse_timestamp(&timestamp)?),
        RateResponse::Latest {
            rates,
            time_last_updated,
        } => {
            let rate = rates.get("EUR").copied().ok_or(FetchError::MissingRate)?;
            let timestamp = time_last_updated
                .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
                .unwrap_or_else(Utc::now)
                .fixed_offset();
            (rate, timestamp)
        }
    };

    if gbp_to_eur <= Decimal::ZERO {
        return Err(FetchError::NonPositive(gbp_to_eur));
    }

    Ok(ExchangeRate {
        gbp_to_eur,
        timestamp,
        source: RateSource::Live,
    })
}

/// RFC 3339, or ISO 8601 without an offset (read as UTC).
fn parse_timestamp(s: &str) -> Result<DateTime<FixedOffset>, FetchError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt);
    }
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc().fixed_offset())
        .map_err(|_| FetchError::Parse(format!("invalid timestamp '{}'", s)))
}

/// Fetch the live rate, substituting the fallback on any failure
pub fn fetch_or_fallback(provider: &dyn RateProvider) -> ExchangeRate {
    match provider.fetch() {
        Ok(rate) => {
            log::info!("1 GBP = {:.4} EUR", rate.gbp_to_eur);
            rate
        }
        Err(e) => {
            log::warn!("{}; using fallback rate {:.4}", e, FALLBACK_RATE);
            ExchangeRate::fallback()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    struct Failing;

    impl RateProvider for Failing {
        fn fetch(&self) -> Result<ExchangeRate, FetchError> {
            Err(FetchError::Network("connection refused".to_string()))
        }
    }

    /// Serve a single HTTP response on a local port
    fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 1024];
                let _ = stream.read(&mut buf);
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes());
            }
        });
        format!("http://{}/api/exchange-rate", addr)
    }

    #[test]
    fn parses_estimator_response() {
        let rate = parse_rate_response(
            r#"{"gbp_to_eur": "1.1834", "timestamp": "2024-05-01T10:30:00.123456"}"#,
        )
        .unwrap();
        assert_eq!(rate.gbp_to_eur, dec!(1.1834));
        assert_eq!(rate.timestamp.to_rfc3339(), "2024-05-01T10:30:00.123456+00:00");
        assert_eq!(rate.source, RateSource::Live);
    }

    #[test]
    fn parses_numeric_rate() {
        let rate = parse_rate_response(
            r#"{"gbp_to_eur": 1.19, "timestamp": "2024-05-01T10:30:00+01:00"}"#,
        )
        .unwrap();
        assert_eq!(rate.gbp_to_eur.round_dp(4), dec!(1.19));
    }

    #[test]
    fn parses_upstream_response() {
        let rate = parse_rate_response(
            r#"{"base": "GBP", "time_last_updated": 1714521600, "rates": {"GBP": 1, "EUR": "1.1702", "USD": "1.25"}}"#,
        )
        .unwrap();
        assert_eq!(rate.gbp_to_eur, dec!(1.1702));
        assert_eq!(rate.timestamp.timestamp(), 1714521600);
    }

    #[test]
    fn rejects_bad_bodies() {
        assert!(matches!(parse_rate_response("not json"), Err(FetchError::Parse(_))));
        assert!(matches!(
            parse_rate_response(r#"{"rates": {"USD": "1.25"}}"#),
            Err(FetchError::MissingRate)
        ));
        assert!(matches!(
            parse_rate_response(r#"{"gbp_to_eur": "0", "timestamp": "2024-05-01T10:30:00Z"}"#),
            Err(FetchError::NonPositive(_))
        ));
        assert!(matches!(
            parse_rate_response(r#"{"gbp_to_eur": "1.2", "timestamp": "yesterday"}"#),
            Err(FetchError::Parse(_))
        ));
    }

    #[test]
    fn fallback_on_failure() {
        let rate = fetch_or_fallback(&Failing);
        assert_eq!(rate.gbp_to_eur, FALLBACK_RATE);
        assert!(rate.is_fallback());
        assert_eq!(rate.display(), "1.1700 (fallback)");
    }

    #[test]
    fn http_fetch() {
        let url = serve_once(
            "200 OK",
            r#"{"gbp_to_eur": "1.1650", "timestamp": "2024-05-01T10:30:00Z"}"#,
        );
        let rate = fetch_or_fallback(&HttpRateProvider::new(url));
        assert_eq!(rate.gbp_to_eur, dec!(1.165));
        assert!(!rate.is_fallback());
        assert_eq!(rate.display(), "1.1650");
    }

    #[test]
    fn http_error_status_falls_back() {
        let url = serve_once("500 Internal Server Error", r#"{"error": "boom"}"#);
        let provider = HttpRateProvider::new(url);
        assert!(matches!(provider.fetch(), Err(FetchError::Status(500))));
        assert!(fetch_or_fallback(&provider).is_fallback());
    }

    #[test]
    fn unreachable_host_falls_back() {
        let addr = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();
        let provider = HttpRateProvider::new(format!("http://{}/api/exchange-rate", addr));
        assert!(fetch_or_fallback(&provider).is_fallback());
    }
}
