//! Balance fetching against the Hiro extended API.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use crate::{
    constants::USER_AGENT,
    error::{FetchError, FetchResult},
};

/// Source of address balances.
#[async_trait]
pub trait BalanceFetcher: Send + Sync {
    /// Fetches the balance of `address`, in base units.
    async fn fetch_balance(&self, address: &str) -> FetchResult<u128>;
}

/// Configuration for the [`HiroClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HiroClientConfig {
    /// Base of the API, the request target is `{base_url}/address/{address}/stx`.
    pub base_url: Url,
    /// Value of the `User-Agent` header.
    pub user_agent: String,
    /// Request timeout. `None` keeps the HTTP client default.
    pub timeout: Option<Duration>,
}

impl HiroClientConfig {
    /// Creates a new client configuration with defaults.
    pub fn new(base_url: Url) -> Self {
        Self { base_url, user_agent: USER_AGENT.to_string(), timeout: None }
    }

    /// Sets the request timeout.
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the `User-Agent` header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// [`BalanceFetcher`] backed by a single long-lived HTTP client.
#[derive(Debug, Clone)]
pub struct HiroClient {
    client: reqwest::Client,
    base_url: Url,
}

impl HiroClient {
    /// Creates a new client from the given configuration.
    pub fn new(config: HiroClientConfig) -> FetchResult<Self> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| FetchError::Unknown(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, base_url: config.base_url })
    }

    /// Returns the request target for `address`.
    pub fn balance_url(&self, address: &str) -> String {
        format!("{}/address/{address}/stx", self.base_url.as_str().trim_end_matches('/'))
    }
}

#[async_trait]
impl BalanceFetcher for HiroClient {
    async fn fetch_balance(&self, address: &str) -> FetchResult<u128> {
        let response = self.client.get(self.balance_url(address)).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::HttpStatus { status: status.as_u16(), body });
        }

        let body = response.bytes().await?;
        parse_balance(&body)
    }
}

/// Extracts the `balance` field of a response body.
///
/// The field may be a decimal string or a JSON integer; either way it must be a non-negative
/// integer count of base units.
pub fn parse_balance(body: &[u8]) -> FetchResult<u128> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| FetchError::MalformedResponse(format!("invalid JSON body: {e}")))?;

    let fields = match value {
        Value::Object(fields) => fields,
        other => {
            return Err(FetchError::Unknown(format!(
                "unexpected response shape, expected an object: {other}"
            )));
        }
    };

    match fields.get("balance") {
        None => Err(FetchError::MalformedResponse("missing `balance` field".to_string())),
        Some(Value::String(raw)) => raw.trim().parse::<u128>().map_err(|e| {
            FetchError::MalformedResponse(format!("non-numeric balance {raw:?}: {e}"))
        }),
        // `arbitrary_precision` keeps the number's exact digits.
        Some(Value::Number(number)) => number.to_string().parse::<u128>().map_err(|e| {
            FetchError::MalformedResponse(format!(
                "balance is not a non-negative integer: {number}: {e}"
            ))
        }),
        Some(other) => {
            Err(FetchError::MalformedResponse(format!("unexpected balance value: {other}")))
        }
    }
}
