//! Walk history summarizing.

use crate::WalkHistory;

/// Total steps for one date, summed across that day's log rows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DailyTotal {
    pub date: String,
    pub steps: i64,
}

/// Collapse a history into one total per date, oldest first. Dates present
/// with no logs still get a row, at zero.
pub fn summarize(history: &WalkHistory) -> Vec<DailyTotal> {
    history
        .days
        .iter()
        .map(|(date, day)| DailyTotal {
            date: date.clone(),
            steps: day.logs.values().map(|log| log.steps).sum(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DayRecord, LogEntry};
    use std::collections::{BTreeMap, HashMap};

    fn day(entries: &[(&str, i64)]) -> DayRecord {
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
                .collect::<HashMap<_, _>>(),
        }
    }

    #[test]
    fn sums_multiple_logs_per_date() {
        let history = WalkHistory {
            days: BTreeMap::from([(
                "2024-03-01".to_string(),
                day(&[("101", 4000), ("102", 5000), ("103", 250)]),
            )]),
        };
        assert_eq!(
            summarize(&history),
            vec![DailyTotal {
                date: "2024-03-01".into(),
                steps: 9250,
            }]
        );
    }

    #[test]
    fn date_with_no_logs_totals_zero() {
        let history = WalkHistory {
            days: BTreeMap::from([("2024-03-02".to_string(), DayRecord::default())]),
        };
        assert_eq!(
            summarize(&history),
            vec![DailyTotal {
                date: "2024-03-02".into(),
                steps: 0,
            }]
        );
    }

    #[test]
    fn dates_come_out_chronological() {
        let history = WalkHistory {
            days: BTreeMap::from([
                ("2024-03-03".to_string(), day(&[("3", 3000)])),
                ("2024-02-28".to_string(), day(&[("1", 1000)])),
                ("2024-03-01".to_string(), day(&[("2", 2000)])),
            ]),
        };
        let summary = summarize(&history);
        let dates: Vec<&str> = summary.iter().map(|d| d.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-02-28", "2024-03-01", "2024-03-03"]);
    }

    #[test]
    fn empty_history_summarizes_to_nothing() {
        assert!(summarize(&WalkHistory::default()).is_empty());
    }
}
