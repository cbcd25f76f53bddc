//! Minimal `StepsClient` trait and typed records for the 10,000 Steps UK
//! member site's private web API.

use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

pub mod config;
pub mod history;
pub mod http_client;
pub mod leaderboard;

#[derive(Debug, Error)]
pub enum StepsError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("leaderboard reference error: {0}")]
    Reference(String),
}

/// Names of the activity types the site tracks besides plain walking.
/// The server hands them back as a key set, so no particular order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActivityCatalog {
    pub names: Vec<String>,
}

/// One walking-log row. The same id also keys the row inside
/// [`DayRecord::logs`]; a day holds one row per add.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct LogEntry {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(deserialize_with = "deserialize_count")]
    pub steps: i64,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct DayRecord {
    /// Absent entirely for days the member logged nothing.
    #[serde(default)]
    pub logs: HashMap<String, LogEntry>,
}

/// Walk history keyed by `YYYY-MM-DD` date string. The ordered map keeps
/// report output chronological regardless of server-side key order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WalkHistory {
    pub days: BTreeMap<String, DayRecord>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct UserRecord {
    pub first_name: String,
    pub last_name: String,
    pub login: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct TeamRecord {
    pub name: String,
}

/// One per-user aggregate row from the leaderboard payload.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct StatRecord {
    #[serde(deserialize_with = "deserialize_id")]
    pub user_id: String,
    #[serde(deserialize_with = "deserialize_id")]
    pub team_id: String,
    #[serde(deserialize_with = "deserialize_count")]
    pub total: i64,
}

/// Raw leaderboard state as served, before any ranking. Unlike the other
/// endpoints this payload has no `data` envelope. Ids arrive sometimes as
/// JSON numbers and sometimes as strings; they normalize to strings here.
/// All four sections must be present; a body without them fails to decode.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct LeaderboardSnapshot {
    pub users: HashMap<String, UserRecord>,
    pub teams: HashMap<String, TeamRecord>,
    pub statistics: HashMap<String, StatRecord>,
    /// Team membership index. Its key set names every team that must show
    /// up in team rankings, including teams nobody has logged steps for.
    #[serde(rename = "indexUsersByTeam", deserialize_with = "deserialize_id_lists")]
    pub index_users_by_team: HashMap<String, Vec<String>>,
}

fn id_from_value(value: serde_json::Value) -> Result<String, String> {
    match value {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(format!("expected string or number id, got {other}")),
    }
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let value = serde_json::Value::deserialize(deserializer)?;
    id_from_value(value).map_err(D::Error::custom)
}

fn deserialize_count<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| D::Error::custom(format!("expected integer count, got {n}"))),
        serde_json::Value::String(s) => s
            .parse::<i64>()
            .map_err(|_| D::Error::custom(format!("expected integer count, got {s:?}"))),
        other => Err(D::Error::custom(format!(
            "expected number or string count, got {other}"
        ))),
    }
}

fn deserialize_id_lists<'de, D>(deserializer: D) -> Result<HashMap<String, Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let raw: HashMap<String, Vec<serde_json::Value>> = HashMap::deserialize(deserializer)?;
    raw.into_iter()
        .map(|(team_id, members)| {
            let ids = members
                .into_iter()
                .map(|v| id_from_value(v).map_err(D::Error::custom))
                .collect::<Result<Vec<_>, D::Error>>()?;
            Ok((team_id, ids))
        })
        .collect()
}

#[async_trait]
pub trait StepsClient: Send + Sync + 'static {
    /// List the non-walking activity types the site knows about.
    async fn get_activity_list(&self) -> Result<ActivityCatalog, StepsError>;

    /// Fetch walk history, optionally restricted to one `YYYY-MM-DD` date.
    async fn get_walk_history(&self, date: Option<&str>) -> Result<WalkHistory, StepsError>;

    /// Fetch the raw leaderboard. `recalc` asks the server to rebuild its
    /// aggregates; `date_check` scopes the rebuild to one date.
    async fn get_leaderboard(
        &self,
        recalc: bool,
        date_check: Option<&str>,
    ) -> Result<LeaderboardSnapshot, StepsError>;

    /// Record a step count for the given date.
    async fn add_steps(&self, steps: i64, date: &str) -> Result<(), StepsError>;

    /// Remove a single walking-log row by id.
    async fn delete_steps(&self, log_id: &str) -> Result<(), StepsError>;
}
