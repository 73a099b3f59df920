//! API client for the remote data store's REST endpoints.
//!
//! This module provides the `ApiClient` struct for making authenticated
//! requests to fetch and record team, roster, match, and expense data.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{header, Client};
use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

use crate::models::{
    Expense, MatchResult, Member, MemberUpdate, NewExpense, NewMatchResult, NewMember, Team,
    TeamUpdate,
};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
/// 30s allows for slow responses while failing fast enough for good UX.
/// A hung request would otherwise stall every caller coalesced onto it.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Client for the remote data store.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl ApiClient {
    /// Create a new API client for the given base URL.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: None,
        })
    }

    /// Create a new ApiClient with the given API key, sharing the
    /// connection pool.
    pub fn with_key(&self, api_key: String) -> Self {
        Self {
            client: self.client.clone(), // Cheap clone, shares connection pool
            base_url: self.base_url.clone(),
            api_key: Some(api_key),
        }
    }

    fn auth_headers(&self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        if let Some(ref key) = self.api_key {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {}", key))?,
            );
        }
        Ok(headers)
    }

    /// Check if response is successful, returning an error with body if not.
    /// Returns Ok(Some(response)) for success, Ok(None) for rate limit
    /// (should retry), or Err for other errors.
    ///
    /// Only `get` loops on the retry signal. Writes are not idempotent, so
    /// `post`/`patch` surface the first 429 to the caller instead of
    /// resubmitting a request the server may already have applied.
    async fn check_response_for_retry(
        response: reqwest::Response,
    ) -> Result<Option<reqwest::Response>> {
        if response.status().is_success() {
            Ok(Some(response))
        } else if response.status().as_u16() == 429 {
            // Rate limited - signal to retry
            Ok(None)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let response = self
                .client
                .get(&url)
                .headers(self.auth_headers()?)
                .query(query)
                .send()
                .await
                .with_context(|| format!("Failed to send GET request to {}", url))?;

            match Self::check_response_for_retry(response).await? {
                Some(response) => {
                    return response
                        .json()
                        .await
                        .with_context(|| format!("Failed to parse JSON response from {}", url));
                }
                None => {
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(ApiError::RateLimited.into());
                    }
                    warn!(url = %url, retry = retries, backoff_ms, "Rate limited, backing off");
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms *= 2; // Exponential backoff
                }
            }
        }
    }

    async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .headers(self.auth_headers()?)
            .json(body)
            .send()
            .await
            .with_context(|| format!("Failed to send POST request to {}", url))?;

        match Self::check_response_for_retry(response).await? {
            Some(response) => response
                .json()
                .await
                .with_context(|| format!("Failed to parse JSON response from {}", url)),
            None => Err(ApiError::RateLimited.into()),
        }
    }

    async fn patch<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .patch(&url)
            .headers(self.auth_headers()?)
            .json(body)
            .send()
            .await
            .with_context(|| format!("Failed to send PATCH request to {}", url))?;

        match Self::check_response_for_retry(response).await? {
            Some(response) => response
                .json()
                .await
                .with_context(|| format!("Failed to parse JSON response from {}", url)),
            None => Err(ApiError::RateLimited.into()),
        }
    }

    fn team_filter(team_id: Option<i64>) -> Vec<(&'static str, String)> {
        match team_id {
            Some(id) => vec![("team_id", id.to_string())],
            None => Vec::new(),
        }
    }

    // ===== Data Fetching Methods =====

    /// Fetch all teams.
    pub async fn list_teams(&self) -> Result<Vec<Team>> {
        self.get("/rest/v1/teams", &[]).await
    }

    /// Fetch members, optionally filtered to one team.
    pub async fn list_members(&self, team_id: Option<i64>) -> Result<Vec<Member>> {
        self.get("/rest/v1/members", &Self::team_filter(team_id))
            .await
    }

    /// Fetch match results, optionally filtered to one team.
    pub async fn list_match_results(&self, team_id: Option<i64>) -> Result<Vec<MatchResult>> {
        self.get("/rest/v1/match_results", &Self::team_filter(team_id))
            .await
    }

    /// Fetch expenses, optionally filtered to one team.
    pub async fn list_expenses(&self, team_id: Option<i64>) -> Result<Vec<Expense>> {
        self.get("/rest/v1/expenses", &Self::team_filter(team_id))
            .await
    }

    // ===== Write Methods =====

    pub async fn create_match_result(&self, new: &NewMatchResult) -> Result<MatchResult> {
        self.post("/rest/v1/match_results", new).await
    }

    pub async fn create_expense(&self, new: &NewExpense) -> Result<Expense> {
        self.post("/rest/v1/expenses", new).await
    }

    pub async fn create_member(&self, new: &NewMember) -> Result<Member> {
        self.post("/rest/v1/members", new).await
    }

    pub async fn update_team(&self, team_id: i64, update: &TeamUpdate) -> Result<Team> {
        self.patch(&format!("/rest/v1/teams/{}", team_id), update)
            .await
    }

    pub async fn update_member(&self, member_id: i64, update: &MemberUpdate) -> Result<Member> {
        self.patch(&format!("/rest/v1/members/{}", member_id), update)
            .await
    }
}
