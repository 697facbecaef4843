//! HTTP client for the task tracker REST API
//!
//! Talks to an Asana-compatible API:
//! - `GET /workspaces/{workspace}/users`
//! - `GET /tasks?assignee=&workspace=&completed_since=`
//!
//! Responses are paged (`limit`/`offset`, `next_page`). Transient failures
//! (timeouts, connection errors, 429 and 5xx) are retried with exponential
//! backoff; everything else fails the call with [`Error::Provider`].
//! A body that is not the expected JSON fails with [`Error::Json`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use super::TaskTracker;
use crate::config::ProviderConfig;
use crate::error::{Error, Result};
use crate::types::{EmployeeDirectoryEntry, TaskRecord};

const PAGE_SIZE: usize = 100;
const MAX_PAGES: usize = 50;
const MAX_RETRIES: usize = 2;
const USER_FIELDS: &str = "name,photo.image_60x60";
const TASK_FIELDS: &str = "name,completed,completed_at,due_on,due_at,projects.name";

/// Per-assignee task listings in flight at once.
const MAX_CONCURRENT_ASSIGNEE_FETCHES: usize = 5;

/// Project name reported for tasks outside any project.
const NO_PROJECT: &str = "No Project";

/// Paged response envelope
#[derive(Debug, Deserialize)]
struct Page<T> {
    data: Vec<T>,
    #[serde(default)]
    next_page: Option<NextPage>,
}

#[derive(Debug, Deserialize)]
struct NextPage {
    offset: String,
}

#[derive(Debug, Deserialize)]
struct ApiUser {
    gid: String,
    name: String,
    #[serde(default)]
    photo: Option<ApiPhoto>,
}

#[derive(Debug, Deserialize)]
struct ApiPhoto {
    image_60x60: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiTask {
    gid: String,
    name: String,
    #[serde(default)]
    completed: bool,
    completed_at: Option<DateTime<Utc>>,
    /// Date-only due date
    due_on: Option<NaiveDate>,
    /// Due date with a time, when set
    due_at: Option<DateTime<Utc>>,
    #[serde(default)]
    projects: Vec<ApiProject>,
}

#[derive(Debug, Deserialize)]
struct ApiProject {
    name: String,
}

impl From<ApiUser> for EmployeeDirectoryEntry {
    fn from(user: ApiUser) -> Self {
        Self {
            id: user.gid,
            name: user.name,
            avatar_url: user.photo.and_then(|p| p.image_60x60),
            role: None,
        }
    }
}

impl ApiTask {
    fn into_record(self, employee_id: &str) -> TaskRecord {
        // A date-only due date is due by the end of that (UTC) day
        let due_at = self.due_at.or_else(|| {
            self.due_on.map(|day| {
                day.and_time(NaiveTime::MIN).and_utc() + chrono::Duration::days(1)
                    - chrono::Duration::milliseconds(1)
            })
        });

        TaskRecord {
            id: self.gid,
            employee_id: employee_id.to_string(),
            completed: self.completed,
            completed_at: self.completed_at,
            due_at,
            name: self.name,
            project_name: self
                .projects
                .into_iter()
                .next()
                .map(|p| p.name)
                .unwrap_or_else(|| NO_PROJECT.to_string()),
        }
    }
}

/// HTTP implementation of [`TaskTracker`]
///
/// Cloning shares the underlying connection pool.
#[derive(Debug, Clone)]
pub struct HttpTaskTracker {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpTaskTracker {
    /// Create a client from configuration
    ///
    /// Returns [`Error::Configuration`] if a credential is missing and
    /// [`Error::Config`] for an unusable timeout. A token that cannot be sent
    /// as a header, or a client that fails to build, is an
    /// [`Error::Provider`]: the tracker is configured but cannot be reached.
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        config.validate()?;

        let access_token = config
            .access_token
            .as_deref()
            .ok_or_else(|| Error::Configuration("provider.access_token is not set".to_string()))?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", access_token))
                .map_err(|e| Error::Provider(format!("invalid access_token: {}", e)))?,
        );

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Provider(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// GET a JSON document, retrying transient failures.
    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let mut delay = Duration::from_millis(500);

        for attempt in 0..=MAX_RETRIES {
            if attempt > 0 {
                tracing::debug!(
                    "Retrying {} (attempt {}/{}), waiting {:?}",
                    path,
                    attempt + 1,
                    MAX_RETRIES + 1,
                    delay
                );
                tokio::time::sleep(delay).await;
                delay = std::cmp::min(delay * 2, Duration::from_secs(30));
            }

            let response = match self.http_client.get(&url).query(query).send().await {
                Ok(response) => response,
                Err(e) if (e.is_timeout() || e.is_connect()) && attempt < MAX_RETRIES => {
                    tracing::warn!("Transient error calling task tracker: {}", e);
                    continue;
                }
                Err(e) => return Err(Error::Provider(format!("HTTP request failed: {}", e))),
            };

            let status = response.status();
            if status.is_success() {
                let body = response
                    .text()
                    .await
                    .map_err(|e| Error::Provider(format!("failed to read response: {}", e)))?;
                return decode(&body);
            }
            if is_retryable_status(status) && attempt < MAX_RETRIES {
                tracing::warn!(%status, path, "Transient task tracker status");
                continue;
            }

            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown".to_string());
            return Err(Error::Provider(format!(
                "API error ({}): {}",
                status, error_text
            )));
        }

        Err(Error::Provider("max retries exceeded".to_string()))
    }

    /// Follow `next_page` offsets and collect every item.
    async fn get_all<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut offset: Option<String> = None;

        for _ in 0..MAX_PAGES {
            let mut page_query = query.to_vec();
            page_query.push(("limit", PAGE_SIZE.to_string()));
            if let Some(offset) = offset.take() {
                page_query.push(("offset", offset));
            }

            let page: Page<T> = self.get_json(path, &page_query).await?;
            items.extend(page.data);

            match page.next_page {
                Some(next) => offset = Some(next.offset),
                None => return Ok(items),
            }
        }

        tracing::warn!(path, pages = MAX_PAGES, "Stopped paging at page limit");
        Ok(items)
    }

    async fn tasks_for_assignee(
        &self,
        user_id: &str,
        workspace_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<TaskRecord>> {
        let query = [
            ("assignee", user_id.to_string()),
            ("workspace", workspace_id.to_string()),
            ("completed_since", since.to_rfc3339()),
            ("opt_fields", TASK_FIELDS.to_string()),
        ];
        let tasks: Vec<ApiTask> = self.get_all("/tasks", &query).await?;
        Ok(tasks.into_iter().map(|t| t.into_record(user_id)).collect())
    }
}

#[async_trait]
impl TaskTracker for HttpTaskTracker {
    async fn list_workspace_users(&self, workspace_id: &str) -> Result<Vec<EmployeeDirectoryEntry>> {
        let path = format!("/workspaces/{}/users", urlencoding::encode(workspace_id));
        let users: Vec<ApiUser> = self
            .get_all(&path, &[("opt_fields", USER_FIELDS.to_string())])
            .await?;
        Ok(users.into_iter().map(EmployeeDirectoryEntry::from).collect())
    }

    async fn list_tasks_grouped_by_assignee(
        &self,
        workspace_id: &str,
        since: DateTime<Utc>,
    ) -> Result<HashMap<String, Vec<TaskRecord>>> {
        // The tasks endpoint needs a single assignee, so group by walking the
        // directory. This listing is separate from any directory the caller
        // fetched alongside it.
        let users = self.list_workspace_users(workspace_id).await?;
        let permits = Arc::new(Semaphore::new(MAX_CONCURRENT_ASSIGNEE_FETCHES));

        let mut fetches = JoinSet::new();
        for user in users {
            let tracker = self.clone();
            let workspace_id = workspace_id.to_string();
            let permits = Arc::clone(&permits);

            fetches.spawn(async move {
                let _permit = permits
                    .acquire_owned()
                    .await
                    .map_err(|e| Error::Provider(format!("fetch limiter closed: {}", e)))?;
                let tasks = tracker
                    .tasks_for_assignee(&user.id, &workspace_id, since)
                    .await?;
                Ok::<_, Error>((user.id, tasks))
            });
        }

        let mut grouped = HashMap::with_capacity(fetches.len());
        while let Some(joined) = fetches.join_next().await {
            let (user_id, tasks) = joined
                .map_err(|e| Error::Provider(format!("task fetch aborted: {}", e)))??;
            grouped.insert(user_id, tasks);
        }
        Ok(grouped)
    }

    async fn list_completed_tasks_for_user(
        &self,
        user_id: &str,
        workspace_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<TaskRecord>> {
        let mut tasks = self.tasks_for_assignee(user_id, workspace_id, since).await?;
        tasks.retain(|t| t.completed);
        Ok(tasks)
    }
}

/// Parse a response body.
fn decode<T: DeserializeOwned>(body: &str) -> Result<T> {
    Ok(serde_json::from_str(body)?)
}

/// Rate limits and server errors are worth retrying
fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}
