//! Record store adapter.
//!
//! The ledger lives in a managed Postgres service fronted by a REST
//! gateway. [`RecordStore`] is the narrow interface the engine needs from
//! it: insert a row, fetch a date range, invoke a named aggregation
//! procedure, sign a storage object, and resolve a bearer token to an
//! account email. [`RestStore`] talks to the real gateway; tests provide
//! in-memory implementations.
use async_trait::async_trait;
use reqwest::{StatusCode, Url, header};
use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;

use crate::entry::{LedgerEntry, NewEntry};
use crate::range::DateRange;

/// Table holding the ledger rows.
const ENTRIES_TABLE: &str = "ledger_entries";

/// Signed report URLs stay valid for one hour.
const SIGNED_URL_TTL_SECS: u32 = 3600;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    #[error("gateway returned {status}: {message}")]
    Gateway { status: u16, message: String },
    #[error("invalid store url: {0}")]
    InvalidUrl(String),
    #[error("unexpected gateway payload: {0}")]
    UnexpectedPayload(String),
}

/// The remote relational data source, reduced to what the engine uses.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert one ledger row and return it as stored.
    async fn insert_entry(&self, entry: &NewEntry) -> Result<LedgerEntry, StoreError>;

    /// Fetch all rows with `date` inside the range, newest first.
    async fn entries_in_range(&self, range: &DateRange) -> Result<Vec<LedgerEntry>, StoreError>;

    /// Invoke a named remote aggregation procedure.
    ///
    /// `Ok(None)` means the call went through but produced no result; an
    /// `Err` covers both transport failures and gateway rejections (for
    /// instance a parameter-name mismatch).
    async fn call_procedure(&self, name: &str, params: &Value)
    -> Result<Option<Value>, StoreError>;

    /// Resolve a storage object to a time-limited download URL.
    async fn signed_url(&self, bucket: &str, object: &str) -> Result<String, StoreError>;

    /// Resolve a bearer token to the account email it belongs to.
    ///
    /// `Ok(None)` means the identity endpoint did not recognize the token.
    async fn token_email(&self, token: &str) -> Result<Option<String>, StoreError>;
}

/// [`RecordStore`] implementation against a PostgREST-style gateway.
#[derive(Clone, Debug)]
pub struct RestStore {
    base_url: Url,
    service_key: String,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct SignResponse {
    #[serde(alias = "signedURL", alias = "signed_url")]
    signed_url: String,
}

#[derive(Debug, Deserialize)]
struct AccountResponse {
    email: Option<String>,
}

impl RestStore {
    pub fn new(base_url: &str, service_key: &str) -> Result<Self, StoreError> {
        let base_url =
            Url::parse(base_url).map_err(|err| StoreError::InvalidUrl(err.to_string()))?;
        Ok(Self {
            base_url,
            service_key: service_key.to_string(),
            http: reqwest::Client::new(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, StoreError> {
        self.base_url
            .join(path)
            .map_err(|err| StoreError::InvalidUrl(err.to_string()))
    }

    /// Service-role headers sent on every data-plane request.
    fn service_request(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    async fn gateway_error(response: reqwest::Response) -> StoreError {
        let status = response.status().as_u16();
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "unreadable body".to_string());
        StoreError::Gateway { status, message }
    }
}

#[async_trait]
impl RecordStore for RestStore {
    async fn insert_entry(&self, entry: &NewEntry) -> Result<LedgerEntry, StoreError> {
        let endpoint = self.endpoint(&format!("rest/v1/{ENTRIES_TABLE}"))?;
        let response = self
            .service_request(self.http.post(endpoint))
            .header(header::CONTENT_TYPE, "application/json")
            .header("Prefer", "return=representation")
            .json(&[entry])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::gateway_error(response).await);
        }

        let mut rows: Vec<LedgerEntry> = response.json().await?;
        rows.pop()
            .ok_or_else(|| StoreError::UnexpectedPayload("insert returned no row".to_string()))
    }

    async fn entries_in_range(&self, range: &DateRange) -> Result<Vec<LedgerEntry>, StoreError> {
        let endpoint = self.endpoint(&format!("rest/v1/{ENTRIES_TABLE}"))?;
        let response = self
            .service_request(self.http.get(endpoint).query(&[
                ("select", "*"),
                ("date", &format!("gte.{}", range.start)),
                ("date", &format!("lte.{}", range.end)),
                ("order", "date.desc"),
            ]))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::gateway_error(response).await);
        }

        Ok(response.json().await?)
    }

    async fn call_procedure(
        &self,
        name: &str,
        params: &Value,
    ) -> Result<Option<Value>, StoreError> {
        let endpoint = self.endpoint(&format!("rest/v1/rpc/{name}"))?;
        let response = self
            .service_request(self.http.post(endpoint))
            .json(params)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::gateway_error(response).await);
        }

        let value: Value = response.json().await?;
        Ok((!value.is_null()).then_some(value))
    }

    async fn signed_url(&self, bucket: &str, object: &str) -> Result<String, StoreError> {
        let endpoint = self.endpoint(&format!("storage/v1/object/sign/{bucket}/{object}"))?;
        let response = self
            .service_request(self.http.post(endpoint))
            .json(&json!({ "expiresIn": SIGNED_URL_TTL_SECS }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::gateway_error(response).await);
        }

        let sign: SignResponse = response.json().await?;
        // The gateway answers with a path relative to its own root.
        let url = self
            .base_url
            .join(sign.signed_url.trim_start_matches('/'))
            .map_err(|err| StoreError::InvalidUrl(err.to_string()))?;
        Ok(url.to_string())
    }

    async fn token_email(&self, token: &str) -> Result<Option<String>, StoreError> {
        let endpoint = self.endpoint("auth/v1/user")?;
        let response = self
            .http
            .get(endpoint)
            .header("apikey", &self.service_key)
            .bearer_auth(token)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {
                let account: AccountResponse = response.json().await?;
                Ok(account.email)
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
            _ => Err(Self::gateway_error(response).await),
        }
    }
}
