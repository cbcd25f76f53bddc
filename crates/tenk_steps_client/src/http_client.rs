//! HTTP client implementation for the 10,000 Steps UK member site.
//!
//! This module provides a reqwest-based implementation of the
//! [`StepsClient`](crate::StepsClient) trait. The site exposes no public
//! API; these are the same endpoints its own browser frontend calls, which
//! shapes a few oddities handled here (cookie sessions, a cache-busting
//! query parameter, and deletes tunnelled through GET).

use crate::{ActivityCatalog, DayRecord, LeaderboardSnapshot, StepsClient, StepsError, WalkHistory};
use async_trait::async_trait;
use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use std::collections::{BTreeMap, HashMap};

/// Production endpoint of the member site.
pub const DEFAULT_BASE_URL: &str = "https://www.members.10000stepsuk.com";

/// Client for the 10,000 Steps UK member site using reqwest.
#[derive(Clone, Debug)]
pub struct ReqwestStepsClient {
    base_url: String,
    client: reqwest::Client,
}

impl ReqwestStepsClient {
    /// Create a new client instance.
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the member site (e.g., "https://www.members.10000stepsuk.com")
    pub fn new(base_url: &str) -> Self {
        // The session survives purely as a cookie handed out by the login
        // POST, so the cookie store carries the whole authentication state.
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .expect("reqwest client build should not fail");
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Log in and establish the session cookie used by every later call.
    ///
    /// The site answers the login POST with 200 and a session cookie no
    /// matter whether the credentials were right; bad credentials only
    /// show up when a later call returns a login page instead of JSON.
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<(), StepsError> {
        let url = format!("{}/sessions", self.base_url);
        tracing::debug!(%url, "POST login");
        let resp = self
            .client
            .post(&url)
            .form(&[("login", username), ("password", password.expose_secret())])
            .send()
            .await?;
        tracing::debug!(status = %resp.status(), "login response");
        Ok(())
    }

    /// Build a full request URL with the frontend's cache-busting parameter.
    fn request_url(&self, path: &str) -> String {
        let stamped = append_cache_buster(path, Utc::now().timestamp_millis());
        format!("{}{}", self.base_url, stamped)
    }

    /// GET a path and decode its JSON body.
    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, StepsError> {
        let url = self.request_url(path);
        tracing::debug!(%url, "GET");
        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        tracing::debug!(%status, body = %body_snippet(&body), "GET response");
        // An expired or rejected session yields an HTML login page with a
        // 200 status, so decoding the body is the real success check.
        serde_json::from_str(&body).map_err(|e| {
            let snippet = body_snippet(&body);
            StepsError::Decode(format!("decoding response: {} - body: {}", e, snippet))
        })
    }

    /// POST a form-encoded body, discarding whatever comes back.
    async fn post_form(&self, path: &str, fields: &[(&str, &str)]) -> Result<(), StepsError> {
        let url = self.request_url(path);
        tracing::debug!(%url, ?fields, "POST");
        let resp = self.client.post(&url).form(fields).send().await?;
        tracing::debug!(status = %resp.status(), "POST response");
        Ok(())
    }
}

/// Append the `ajax.timestamp` parameter the site's frontend adds to dodge
/// intermediary caches, joining with `?` or `&` as the path requires.
fn append_cache_buster(path: &str, epoch_ms: i64) -> String {
    let delimiter = if path.contains('?') { '&' } else { '?' };
    format!("{path}{delimiter}ajax.timestamp={epoch_ms}")
}

fn body_snippet(body: &str) -> String {
    body.chars().take(256).collect()
}

#[async_trait]
impl StepsClient for ReqwestStepsClient {
    async fn get_activity_list(&self) -> Result<ActivityCatalog, StepsError> {
        #[derive(serde::Deserialize)]
        struct Payload {
            data: PayloadData,
        }
        #[derive(serde::Deserialize)]
        struct PayloadData {
            else_used: HashMap<String, serde_json::Value>,
        }
        let payload: Payload = self.get_json("/users/getActivityList").await?;
        Ok(ActivityCatalog {
            names: payload.data.else_used.into_keys().collect(),
        })
    }

    async fn get_walk_history(&self, date: Option<&str>) -> Result<WalkHistory, StepsError> {
        #[derive(serde::Deserialize)]
        struct Payload {
            data: BTreeMap<String, DayRecord>,
        }
        let path = match date {
            Some(date) => format!("/users/logWalkHistory?reloadDate={date}"),
            None => "/users/logWalkHistory".to_string(),
        };
        let payload: Payload = self.get_json(&path).await?;
        Ok(WalkHistory { days: payload.data })
    }

    async fn get_leaderboard(
        &self,
        recalc: bool,
        date_check: Option<&str>,
    ) -> Result<LeaderboardSnapshot, StepsError> {
        // `recalc` is a valueless flag, so the query string is assembled by
        // hand rather than through a serializer that would emit `recalc=`.
        let mut path = String::from("/users/leaderboards");
        if recalc {
            path.push_str("?recalc");
        }
        if let Some(date) = date_check {
            path.push(if path.contains('?') { '&' } else { '?' });
            path.push_str("dateCheck=");
            path.push_str(date);
        }
        self.get_json(&path).await
    }

    async fn add_steps(&self, steps: i64, date: &str) -> Result<(), StepsError> {
        let count = steps.to_string();
        // `units` mirrors `steps` because the frontend submits the raw
        // entry field and the derived step count as separate values.
        self.post_form(
            "/walking_logs.json",
            &[
                ("walking_log[date_string]", date),
                ("walking_log[units]", count.as_str()),
                ("walking_log[steps]", count.as_str()),
                ("walking_log[unit_type]", "steps"),
            ],
        )
        .await?;
        tracing::info!(steps, date, "logged steps");
        Ok(())
    }

    async fn delete_steps(&self, log_id: &str) -> Result<(), StepsError> {
        // Rails-style method tunnelling: the delete is a GET carrying
        // `_method=delete`. A real DELETE request is not accepted.
        let path = format!("/walking_logs/{log_id}?_method=delete");
        let url = self.request_url(&path);
        tracing::debug!(%url, "GET delete");
        let resp = self.client.get(&url).send().await?;
        tracing::debug!(status = %resp.status(), "delete response");
        tracing::info!(log_id, "deleted walking log");
        Ok(())
    }
}
