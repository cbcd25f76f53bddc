//! Subcommand implementations.
//!
//! Every command returns its rendered report instead of printing, which
//! keeps output assembly testable against a stub client.

use tenk_steps_client::history::summarize;
use tenk_steps_client::leaderboard::{Rankings, rank};
use tenk_steps_client::{StepsClient, StepsError};

/// Default date for mutations: local yesterday. Steps for a day are
/// normally logged the morning after.
pub fn yesterday() -> String {
    (chrono::Local::now().date_naive() - chrono::Days::new(1))
        .format("%Y-%m-%d")
        .to_string()
}

pub async fn activities(client: &impl StepsClient) -> Result<String, StepsError> {
    let catalog = client.get_activity_list().await?;
    let mut names = catalog.names;
    names.sort();
    let mut out = String::new();
    for name in names {
        out.push_str(&name);
        out.push('\n');
    }
    Ok(out)
}

pub async fn history(client: &impl StepsClient) -> Result<String, StepsError> {
    let walk_history = client.get_walk_history(None).await?;
    let mut out = String::from("Date       Steps\n---------- -----\n");
    for day in summarize(&walk_history) {
        out.push_str(&format!("{} {}\n", day.date, day.steps));
    }
    Ok(out)
}

pub async fn leaders(client: &impl StepsClient) -> Result<String, StepsError> {
    let snapshot = client.get_leaderboard(false, None).await?;
    Ok(render_leaderboards(&rank(&snapshot)?))
}

pub async fn add(client: &impl StepsClient, steps: i64, date: &str) -> Result<String, StepsError> {
    client.add_steps(steps, date).await?;
    // The site's own frontend refreshes these two views after a new log;
    // without the recalc the leaderboard keeps serving stale totals.
    client.get_walk_history(Some(date)).await?;
    client.get_leaderboard(true, Some(date)).await?;
    Ok(String::new())
}

pub async fn delete(client: &impl StepsClient, date: &str) -> Result<String, StepsError> {
    let walk_history = client.get_walk_history(Some(date)).await?;
    if let Some(day) = walk_history.days.get(date) {
        // Sorted so repeated runs issue the deletes in the same order.
        let mut log_ids: Vec<&str> = day.logs.values().map(|log| log.id.as_str()).collect();
        log_ids.sort_unstable();
        for log_id in log_ids {
            client.delete_steps(log_id).await?;
        }
    }
    client.get_walk_history(Some(date)).await?;
    Ok(String::new())
}

fn render_leaderboards(rankings: &Rankings) -> String {
    let mut out = String::from("Individual Leaderboard\n");
    out.push_str("Rank Total      Name\n");
    out.push_str("---- ---------- ----------\n");
    for entry in &rankings.individuals {
        out.push_str(&format!(
            "{:>4} {:>10} {}\n",
            entry.rank, entry.total, entry.name
        ));
    }
    out.push('\n');
    out.push_str("Team Leaderboard\n");
    out.push_str("Rank Total        Team\n");
    out.push_str("---- ------------ ------------\n");
    for entry in &rankings.teams {
        out.push_str(&format!(
            "{:>4} {:>12} {}\n",
            entry.rank, entry.total, entry.name
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::{BTreeMap, VecDeque};
    use std::sync::Mutex;
    use tenk_steps_client::{
        ActivityCatalog, DayRecord, LeaderboardSnapshot, LogEntry, WalkHistory,
    };

    /// In-memory client that records every call it receives.
    #[derive(Default)]
    struct StubClient {
        catalog: ActivityCatalog,
        histories: Mutex<VecDeque<WalkHistory>>,
        snapshot: LeaderboardSnapshot,
        calls: Mutex<Vec<String>>,
    }

    impl StubClient {
        fn record(&self, call: String) {
            self.calls.lock().expect("calls lock").push(call);
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().expect("calls lock").clone()
        }

        fn push_history(&self, history: WalkHistory) {
            self.histories
                .lock()
                .expect("histories lock")
                .push_back(history);
        }

        fn next_history(&self) -> WalkHistory {
            self.histories
                .lock()
                .expect("histories lock")
                .pop_front()
                .unwrap_or_default()
        }
    }

    #[async_trait]
    impl StepsClient for StubClient {
        async fn get_activity_list(&self) -> Result<ActivityCatalog, StepsError> {
            self.record("activities".into());
            Ok(self.catalog.clone())
        }

        async fn get_walk_history(&self, date: Option<&str>) -> Result<WalkHistory, StepsError> {
            self.record(match date {
                Some(date) => format!("history {date}"),
                None => "history".to_string(),
            });
            Ok(self.next_history())
        }

        async fn get_leaderboard(
            &self,
            recalc: bool,
            date_check: Option<&str>,
        ) -> Result<LeaderboardSnapshot, StepsError> {
            self.record(format!(
                "leaderboard recalc={recalc} date={}",
                date_check.unwrap_or("-")
            ));
            Ok(self.snapshot.clone())
        }

        async fn add_steps(&self, steps: i64, date: &str) -> Result<(), StepsError> {
            self.record(format!("add {steps} {date}"));
            Ok(())
        }

        async fn delete_steps(&self, log_id: &str) -> Result<(), StepsError> {
            self.record(format!("delete {log_id}"));
            Ok(())
        }
    }

    fn history_with(date: &str, entries: &[(&str, i64)]) -> WalkHistory {
        WalkHistory {
            days: BTreeMap::from([(
                date.to_string(),
                DayRecord {
                    logs: entries
                        .iter()
                        .map(|(id, steps)| {
                            (
                                id.to_string(),
                                LogEntry {
                                    id: id.to_string(),
                                    steps: *steps,
                                },
                            )
                        })
                        .collect(),
                },
            )]),
        }
    }

    #[tokio::test]
    async fn activities_report_sorts_names() {
        let stub = StubClient {
            catalog: ActivityCatalog {
                names: vec!["Swimming".into(), "Cycling".into(), "Gardening".into()],
            },
            ..Default::default()
        };
        let report = activities(&stub).await.expect("report");
        assert_eq!(report, "Cycling\nGardening\nSwimming\n");
    }

    #[tokio::test]
    async fn history_report_renders_one_total_per_date() {
        let stub = StubClient::default();
        let mut walk_history = history_with("2024-03-01", &[("101", 4000), ("102", 5250)]);
        walk_history
            .days
            .insert("2024-03-02".to_string(), DayRecord::default());
        stub.push_history(walk_history);

        let report = history(&stub).await.expect("report");
        assert_eq!(
            report,
            concat!(
                "Date       Steps\n",
                "---------- -----\n",
                "2024-03-01 9250\n",
                "2024-03-02 0\n",
            )
        );
        assert_eq!(stub.calls(), vec!["history"]);
    }

    #[tokio::test]
    async fn leaders_report_renders_both_tables() {
        let stub = StubClient {
            snapshot: serde_json::from_value(serde_json::json!({
                "users": {
                    "1": {"first_name": "Amy", "last_name": "Archer", "login": "aarcher"},
                    "2": {"first_name": "Ben", "last_name": "Best", "login": "bbest"},
                    "3": {"first_name": "Cal", "last_name": "Cole", "login": "ccole"},
                },
                "teams": {
                    "10": {"name": "Pacers"},
                    "20": {"name": "Striders"},
                    "30": {"name": "Idlers"},
                },
                "statistics": {
                    "s1": {"user_id": 1, "team_id": 10, "total": 12000},
                    "s2": {"user_id": 2, "team_id": 20, "total": 15000},
                    "s3": {"user_id": 3, "team_id": 10, "total": 15000},
                },
                "indexUsersByTeam": {"10": [1, 3], "20": [2], "30": []},
            }))
            .expect("snapshot fixture"),
            ..Default::default()
        };

        let report = leaders(&stub).await.expect("report");
        assert_eq!(
            report,
            concat!(
                "Individual Leaderboard\n",
                "Rank Total      Name\n",
                "---- ---------- ----------\n",
                "   1      15000 Ben Best (bbest)\n",
                "   2      15000 Cal Cole (ccole)\n",
                "   3      12000 Amy Archer (aarcher)\n",
                "\n",
                "Team Leaderboard\n",
                "Rank Total        Team\n",
                "---- ------------ ------------\n",
                "   1        27000 Pacers\n",
                "   2        15000 Striders\n",
                "   3            0 Idlers\n",
            )
        );
        assert_eq!(stub.calls(), vec!["leaderboard recalc=false date=-"]);
    }

    #[tokio::test]
    async fn add_refreshes_history_and_recalculated_leaderboard() {
        let stub = StubClient::default();
        let report = add(&stub, 9000, "2024-03-01").await.expect("report");
        assert!(report.is_empty());
        assert_eq!(
            stub.calls(),
            vec![
                "add 9000 2024-03-01",
                "history 2024-03-01",
                "leaderboard recalc=true date=2024-03-01",
            ]
        );
    }

    #[tokio::test]
    async fn delete_removes_each_log_then_refetches() {
        let stub = StubClient::default();
        stub.push_history(history_with("2024-03-01", &[("102", 5000), ("101", 4000)]));
        stub.push_history(history_with("2024-03-01", &[]));

        let report = delete(&stub, "2024-03-01").await.expect("report");
        assert!(report.is_empty());
        assert_eq!(
            stub.calls(),
            vec![
                "history 2024-03-01",
                "delete 101",
                "delete 102",
                "history 2024-03-01",
            ]
        );
    }

    #[tokio::test]
    async fn delete_with_nothing_logged_skips_straight_to_refetch() {
        let stub = StubClient::default();
        let report = delete(&stub, "2024-03-01").await.expect("report");
        assert!(report.is_empty());
        assert_eq!(stub.calls(), vec!["history 2024-03-01", "history 2024-03-01"]);
    }

    #[test]
    fn yesterday_is_one_day_back_in_iso_form() {
        let before = chrono::Local::now().date_naive() - chrono::Days::new(1);
        let got = yesterday();
        let after = chrono::Local::now().date_naive() - chrono::Days::new(1);
        let parsed = chrono::NaiveDate::parse_from_str(&got, "%Y-%m-%d").expect("iso date");
        assert!(parsed == before || parsed == after);
    }
}
