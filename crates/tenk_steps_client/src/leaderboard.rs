//! Leaderboard ranking.
//!
//! Turns a raw [`LeaderboardSnapshot`] into ordered individual and team
//! tables with 1-based ranks.

use crate::{LeaderboardSnapshot, StepsError, UserRecord};
use std::collections::HashMap;

/// One ranked row, for either an individual or a team.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RankedEntry {
    pub rank: u32,
    pub id: String,
    pub name: String,
    pub total: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Rankings {
    pub individuals: Vec<RankedEntry>,
    pub teams: Vec<RankedEntry>,
}

/// Rank a snapshot.
///
/// Every team named by the membership index appears in the team table,
/// including teams nobody has logged steps for yet. Rows order by total
/// descending; ties break by id (lexicographically, ascending) so the same
/// snapshot always ranks the same way.
pub fn rank(snapshot: &LeaderboardSnapshot) -> Result<Rankings, StepsError> {
    // Team totals seed from the membership index rather than from the
    // statistics, which is what keeps step-less teams on the board.
    let mut team_totals: HashMap<&str, i64> = snapshot
        .index_users_by_team
        .keys()
        .map(|team_id| (team_id.as_str(), 0))
        .collect();

    let mut individual_totals: Vec<(&str, i64)> = Vec::with_capacity(snapshot.statistics.len());
    for stat in snapshot.statistics.values() {
        individual_totals.push((stat.user_id.as_str(), stat.total));
        match team_totals.get_mut(stat.team_id.as_str()) {
            Some(total) => *total += stat.total,
            None => {
                return Err(StepsError::Reference(format!(
                    "statistic for user {} names unknown team {}",
                    stat.user_id, stat.team_id
                )));
            }
        }
    }

    let individuals = rank_rows(individual_totals, |user_id| {
        snapshot
            .users
            .get(user_id)
            .map(display_name)
            .ok_or_else(|| StepsError::Reference(format!("statistic names unknown user {user_id}")))
    })?;
    let teams = rank_rows(team_totals.into_iter().collect(), |team_id| {
        snapshot
            .teams
            .get(team_id)
            .map(|team| team.name.clone())
            .ok_or_else(|| {
                StepsError::Reference(format!("membership index names unknown team {team_id}"))
            })
    })?;

    Ok(Rankings { individuals, teams })
}

/// "First Last (login)", the style the site itself shows members as.
fn display_name(user: &UserRecord) -> String {
    format!("{} {} ({})", user.first_name, user.last_name, user.login)
}

fn rank_rows<F>(
    mut totals: Vec<(&str, i64)>,
    mut name_of: F,
) -> Result<Vec<RankedEntry>, StepsError>
where
    F: FnMut(&str) -> Result<String, StepsError>,
{
    totals.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    totals
        .into_iter()
        .enumerate()
        .map(|(i, (id, total))| {
            Ok(RankedEntry {
                rank: i as u32 + 1,
                id: id.to_string(),
                name: name_of(id)?,
                total,
            })
        })
        .collect()
}
