//! HTTP client for the Jira Cloud REST v3 API.
//!
//! All requests authenticate with Basic auth (admin email + API token) and
//! every failure path funnels through the error classifier, so callers only
//! ever see a classified `RemoteError`.

use base64::{engine::general_purpose, Engine as _};
use url::Url;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::credentials::SiteCredentials;
use crate::error::{classify, EngineError, RemoteError};

use super::types::{IssueDetail, IssueDetailOptions, SearchPage};

/// Jira fixes comment/worklog sub-resource pages at 100 regardless of the
/// configured search page size.
const SUB_RESOURCE_PAGE_SIZE: u64 = 100;

/// Client bound to a single Jira site.
pub struct JiraClient {
    http: reqwest::Client,
    base_url: String,
    auth_header: String,
    page_size: u64,
}

impl JiraClient {
    pub fn new(credentials: &SiteCredentials, page_size: u64) -> Result<Self, EngineError> {
        let base_url = credentials.base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url)
            .map_err(|e| EngineError::State(format!("invalid site base URL: {}", e)))?;

        let auth_header = format!(
            "Basic {}",
            general_purpose::STANDARD.encode(format!(
                "{}:{}",
                credentials.admin_email, credentials.api_token
            ))
        );

        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            auth_header,
            page_size,
        })
    }

    fn endpoint(&self, path: &str, params: &[(&str, String)]) -> Result<Url, RemoteError> {
        Url::parse_with_params(&format!("{}{}", self.base_url, path), params)
            .map_err(|e| RemoteError::from(classify(None, None, &e.to_string())))
    }

    /// Performs a GET and returns the parsed JSON body.
    ///
    /// Transport failures classify with no status; non-2xx responses classify
    /// with the status and whatever JSON body the server managed to send.
    async fn get_json(&self, url: Url) -> Result<JsonValue, RemoteError> {
        debug!(url = %url, "jira request");
        let resp = self
            .http
            .get(url)
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| RemoteError::from(classify(None, None, &e.to_string())))?;

        let status = resp.status();
        if !status.is_success() {
            let fallback = status
                .canonical_reason()
                .unwrap_or("HTTP error")
                .to_string();
            let body: Option<JsonValue> = resp
                .text()
                .await
                .ok()
                .and_then(|text| serde_json::from_str(&text).ok());
            return Err(classify(Some(status.as_u16()), body.as_ref(), &fallback).into());
        }

        resp.json::<JsonValue>().await.map_err(|e| {
            classify(
                Some(status.as_u16()),
                None,
                &format!("invalid JSON in response body: {}", e),
            )
            .into()
        })
    }

    /// Fetches one page of a token-paginated JQL search.
    pub async fn search(
        &self,
        jql: &str,
        page_token: Option<&str>,
    ) -> Result<SearchPage, RemoteError> {
        let mut params = vec![
            ("jql", jql.to_string()),
            ("maxResults", self.page_size.to_string()),
            ("fields", "*all".to_string()),
        ];
        if let Some(token) = page_token {
            params.push(("nextPageToken", token.to_string()));
        }
        let url = self.endpoint("/rest/api/3/search/jql", &params)?;
        let body = self.get_json(url).await?;

        let issues = body
            .get("issues")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();
        let next_page_token = body
            .get("nextPageToken")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());
        let is_last = body
            .get("isLast")
            .and_then(|v| v.as_bool())
            .unwrap_or(next_page_token.is_none());
        let total = body.get("total").and_then(|v| v.as_u64());

        Ok(SearchPage {
            issues,
            next_page_token,
            is_last,
            total,
        })
    }

    /// Fetches a single issue with rendered fields and changelog, then drains
    /// comment and worklog pages when the embedded lists are truncated.
    pub async fn fetch_issue_detail(
        &self,
        issue_key: &str,
        options: IssueDetailOptions,
    ) -> Result<IssueDetail, RemoteError> {
        let url = self.endpoint(
            &format!("/rest/api/3/issue/{}", issue_key),
            &[("expand", "renderedFields,comment,changelog".to_string())],
        )?;
        let raw = self.get_json(url).await?;

        let comments = if options.include_comments {
            self.embedded_or_drained(&raw, issue_key, "comment", "comments")
                .await?
        } else {
            Vec::new()
        };
        let worklogs = if options.include_worklogs {
            self.embedded_or_drained(&raw, issue_key, "worklog", "worklogs")
                .await?
        } else {
            Vec::new()
        };

        Ok(IssueDetail {
            raw,
            comments,
            worklogs,
        })
    }

    /// Uses the issue's embedded sub-resource list when complete, otherwise
    /// drains the dedicated offset-paginated endpoint. A missing container
    /// says nothing about how many items exist, so it drains too.
    async fn embedded_or_drained(
        &self,
        raw: &JsonValue,
        issue_key: &str,
        field: &str,
        list_key: &str,
    ) -> Result<Vec<JsonValue>, RemoteError> {
        let container = match raw.get("fields").and_then(|f| f.get(field)) {
            Some(c) => c,
            None => return self.drain_offset_pages(issue_key, field, list_key).await,
        };
        let embedded = container
            .get(list_key)
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();
        let total = container
            .get("total")
            .and_then(|v| v.as_u64())
            .unwrap_or(embedded.len() as u64);

        if (embedded.len() as u64) >= total {
            return Ok(embedded);
        }
        self.drain_offset_pages(issue_key, field, list_key).await
    }

    /// Drains every comment on an issue via offset pagination.
    pub async fn fetch_comments(&self, issue_key: &str) -> Result<Vec<JsonValue>, RemoteError> {
        self.drain_offset_pages(issue_key, "comment", "comments")
            .await
    }

    /// Drains every worklog on an issue via offset pagination.
    pub async fn fetch_worklogs(&self, issue_key: &str) -> Result<Vec<JsonValue>, RemoteError> {
        self.drain_offset_pages(issue_key, "worklog", "worklogs")
            .await
    }

    async fn drain_offset_pages(
        &self,
        issue_key: &str,
        resource: &str,
        list_key: &str,
    ) -> Result<Vec<JsonValue>, RemoteError> {
        let mut collected: Vec<JsonValue> = Vec::new();
        let mut start_at: u64 = 0;

        loop {
            let url = self.endpoint(
                &format!("/rest/api/3/issue/{}/{}", issue_key, resource),
                &[
                    ("startAt", start_at.to_string()),
                    ("maxResults", SUB_RESOURCE_PAGE_SIZE.to_string()),
                ],
            )?;
            let body = self.get_json(url).await?;

            let page = body
                .get(list_key)
                .and_then(|v| v.as_array())
                .cloned()
                .unwrap_or_default();
            let total = body.get("total").and_then(|v| v.as_u64()).unwrap_or(0);

            if page.is_empty() {
                break;
            }
            start_at += page.len() as u64;
            collected.extend(page);

            if start_at >= total {
                break;
            }
        }

        Ok(collected)
    }
}
