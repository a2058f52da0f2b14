// Week schedule: which teams meet in a given week.

use std::collections::BTreeMap;

use tracing::debug;

use crate::league::results::WeeklyResult;
use crate::odds::markets::{Matchup, TeamRef};

/// Pairings for one week, ordered by matchup id.
///
/// Rows of that week are grouped by `matchup_id`; within a pair, the row that
/// comes first in the results is team1. Groups that are not exactly two rows
/// (byes, partial data) are skipped.
pub fn matchups_for_week(results: &[WeeklyResult], week: u32) -> Vec<Matchup> {
    let mut groups: BTreeMap<u32, Vec<&WeeklyResult>> = BTreeMap::new();
    for row in results.iter().filter(|r| r.week == week) {
        groups.entry(row.matchup_id).or_default().push(row);
    }

    groups
        .into_iter()
        .filter_map(|(matchup_id, rows)| match rows.as_slice() {
            [a, b] => Some(Matchup {
                team1: team_ref(a),
                team2: team_ref(b),
                win_probability: None,
                week: Some(week),
            }),
            _ => {
                debug!(
                    "week {} matchup {} has {} rows, not pricing it",
                    week,
                    matchup_id,
                    rows.len()
                );
                None
            }
        })
        .collect()
}

fn team_ref(row: &WeeklyResult) -> TeamRef {
    TeamRef {
        roster_id: Some(row.roster_id),
        name: Some(row.team_name.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(week: u32, matchup_id: u32, roster_id: u32) -> WeeklyResult {
        WeeklyResult {
            week,
            matchup_id,
            roster_id,
            owner_id: None,
            team_name: format!("Team {roster_id}"),
            points: None,
        }
    }

    #[test]
    fn pairs_by_matchup_id_in_order() {
        let results = vec![
            row(5, 2, 3),
            row(5, 1, 1),
            row(5, 2, 4),
            row(5, 1, 2),
            row(6, 1, 1),
            row(6, 1, 3),
        ];
        let week5 = matchups_for_week(&results, 5);
        assert_eq!(week5.len(), 2);
        assert_eq!(week5[0].team1.roster_id, Some(1));
        assert_eq!(week5[0].team2.roster_id, Some(2));
        assert_eq!(week5[1].team1.roster_id, Some(3));
        assert_eq!(week5[1].team2.roster_id, Some(4));
        assert!(week5.iter().all(|m| m.week == Some(5)));
        assert_eq!(week5[0].team1.name.as_deref(), Some("Team 1"));
    }

    #[test]
    fn byes_are_skipped() {
        let results = vec![row(3, 1, 1), row(3, 1, 2), row(3, 2, 5)];
        let week3 = matchups_for_week(&results, 3);
        assert_eq!(week3.len(), 1);
        assert!(matchups_for_week(&results, 4).is_empty());
    }
}
