use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type ClubId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub home_club_id: ClubId,
    pub away_club_id: ClubId,
    pub home_score: u32,
    pub away_score: u32,
}

impl Match {
    pub fn new(home_club_id: ClubId, away_club_id: ClubId, home_score: u32, away_score: u32) -> Self {
        Self {
            home_club_id,
            away_club_id,
            home_score,
            away_score,
        }
    }

    /// Scores as `(own, opponent)` from `club_id`'s side, or `None` if the
    /// club did not take part.
    pub fn scores_for(&self, club_id: ClubId) -> Option<(u32, u32)> {
        if self.home_club_id == club_id {
            Some((self.home_score, self.away_score))
        } else if self.away_club_id == club_id {
            Some((self.away_score, self.home_score))
        } else {
            None
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AggregateError {
    #[error("match {home_club_id} vs {away_club_id} does not involve club {club_id}")]
    InvalidInput {
        club_id: ClubId,
        home_club_id: ClubId,
        away_club_id: ClubId,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ClubRecord {
    pub played: u64,
    pub wins: u64,
    pub draws: u64,
    pub losses: u64,
    pub goals_for: u64,
    pub goals_against: u64,
    pub avg_goals_for: f64,
}

impl ClubRecord {
    pub fn goal_difference(&self) -> i128 {
        i128::from(self.goals_for) - i128::from(self.goals_against)
    }

    pub fn outcome_slices(&self) -> [(&'static str, u64); 3] {
        [
            ("Wins", self.wins),
            ("Draws", self.draws),
            ("Losses", self.losses),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LeagueOutcomes {
    pub total_matches: u64,
    pub home_wins: u64,
    pub away_wins: u64,
    pub draws: u64,
    pub total_goals: u64,
    pub avg_goals_per_match: f64,
}

impl LeagueOutcomes {
    pub fn outcome_bars(&self) -> [(&'static str, u64); 3] {
        [
            ("Home Win", self.home_wins),
            ("Away Win", self.away_wins),
            ("Draw", self.draws),
        ]
    }
}

/// Aggregates `matches` into a record from `club_id`'s perspective.
///
/// Callers pass only the club's own matches; any match where the club is
/// neither home nor away is rejected instead of being counted as an away game.
pub fn compute_club_record(
    club_id: ClubId,
    matches: &[Match],
) -> Result<ClubRecord, AggregateError> {
    let mut out = ClubRecord::default();
    for m in matches {
        let (own, opp) = m.scores_for(club_id).ok_or(AggregateError::InvalidInput {
            club_id,
            home_club_id: m.home_club_id,
            away_club_id: m.away_club_id,
        })?;
        if own > opp {
            out.wins += 1;
        } else if own == opp {
            out.draws += 1;
        } else {
            out.losses += 1;
        }
        out.played += 1;
        out.goals_for += u64::from(own);
        out.goals_against += u64::from(opp);
    }

    out.avg_goals_for = ratio(out.goals_for, out.played);
    Ok(out)
}

pub fn compute_league_outcome_distribution(matches: &[Match]) -> LeagueOutcomes {
    let mut out = LeagueOutcomes::default();
    for m in matches {
        if m.home_score > m.away_score {
            out.home_wins += 1;
        } else if m.away_score > m.home_score {
            out.away_wins += 1;
        } else {
            out.draws += 1;
        }
        out.total_matches += 1;
        out.total_goals += u64::from(m.home_score) + u64::from(m.away_score);
    }

    out.avg_goals_per_match = ratio(out.total_goals, out.total_matches);
    out
}

fn ratio(sum: u64, n: u64) -> f64 {
    if n == 0 {
        return 0.0;
    }
    sum as f64 / n as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    const C: ClubId = 1;
    const X: ClubId = 2;
    const Y: ClubId = 3;
    const Z: ClubId = 4;

    fn sample() -> Vec<Match> {
        vec![
            Match::new(C, X, 2, 1),
            Match::new(Y, C, 3, 0),
            Match::new(C, Z, 1, 1),
        ]
    }

    #[test]
    fn club_record_mixed_results() {
        let rec = compute_club_record(C, &sample()).unwrap();
        assert_eq!(rec.played, 3);
        assert_eq!((rec.wins, rec.draws, rec.losses), (1, 1, 1));
        assert_eq!(rec.goals_for, 3);
        assert_eq!(rec.goals_against, 5);
        assert!((rec.avg_goals_for - 1.0).abs() < f64::EPSILON);
        assert_eq!(rec.goal_difference(), -2);
    }

    #[test]
    fn club_record_empty_is_all_zero() {
        let rec = compute_club_record(C, &[]).unwrap();
        assert_eq!(rec, ClubRecord::default());
        assert_eq!(rec.avg_goals_for, 0.0);
    }

    #[test]
    fn club_record_rejects_foreign_match() {
        let err = compute_club_record(Z, &[Match::new(X, Y, 1, 0)]).unwrap_err();
        assert_eq!(
            err,
            AggregateError::InvalidInput {
                club_id: Z,
                home_club_id: X,
                away_club_id: Y,
            }
        );
    }

    #[test]
    fn club_record_rejects_foreign_match_among_valid_ones() {
        let mut matches = sample();
        matches.insert(1, Match::new(X, Y, 4, 4));
        assert!(compute_club_record(C, &matches).is_err());
    }

    #[test]
    fn club_record_ignores_order() {
        let mut reversed = sample();
        reversed.reverse();
        assert_eq!(
            compute_club_record(C, &sample()).unwrap(),
            compute_club_record(C, &reversed).unwrap()
        );
    }

    #[test]
    fn league_distribution_counts_outcomes() {
        let out = compute_league_outcome_distribution(&sample());
        assert_eq!(out.total_matches, 3);
        assert_eq!((out.home_wins, out.away_wins, out.draws), (1, 1, 1));
        assert_eq!(out.total_goals, 8);
        assert!((out.avg_goals_per_match - 8.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn league_distribution_empty() {
        let out = compute_league_outcome_distribution(&[]);
        assert_eq!(out, LeagueOutcomes::default());
    }

    #[test]
    fn club_record_goal_sums_do_not_wrap() {
        let big = 3_000_000_000;
        let matches = [Match::new(C, X, big, 0), Match::new(Y, C, 0, big)];
        let rec = compute_club_record(C, &matches).unwrap();
        assert_eq!(rec.goals_for, 6_000_000_000);
        assert_eq!(rec.wins, 2);
        assert_eq!(rec.goal_difference(), 6_000_000_000);
        assert!((rec.avg_goals_for - 3_000_000_000.0).abs() < 1e-3);

        let league = compute_league_outcome_distribution(&matches);
        assert_eq!(league.total_goals, 6_000_000_000);
    }

    #[test]
    fn outcome_labels_follow_chart_order() {
        let rec = compute_club_record(C, &sample()).unwrap();
        let labels: Vec<_> = rec.outcome_slices().iter().map(|(l, _)| *l).collect();
        assert_eq!(labels, ["Wins", "Draws", "Losses"]);
        let bars = compute_league_outcome_distribution(&sample()).outcome_bars();
        assert_eq!(bars[0], ("Home Win", 1));
        assert_eq!(bars[2], ("Draw", 1));
    }
}
