//! Database models for study statistics and the streak tracker.

use crate::types::UserId;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Database response for a study stats row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StudyStatsDBResponse {
    pub id: Uuid,
    pub user_id: UserId,
    pub study_streak: i32,
    pub longest_streak: i32,
    pub last_study_date: Option<NaiveDate>,
    pub total_minutes_studied: i64,
    pub total_tasks_completed: i64,
    pub total_downloads: i64,
    pub weekly_goal: i32,
    pub daily_goal: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Database response for a logged study session
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StudySessionDBResponse {
    pub id: i64,
    pub stats_id: Uuid,
    pub session_date: DateTime<Utc>,
    pub duration_minutes: i32,
    pub subject: Option<String>,
}

/// Streak transition on UTC-day granularity.
///
/// - no prior study day: streak starts at 1
/// - gap of exactly one day: streak continues
/// - larger gap: streak resets to 1
/// - same day: unchanged
pub fn next_streak(last_study_date: Option<NaiveDate>, today: NaiveDate, current: i32) -> i32 {
    match last_study_date {
        None => 1,
        Some(last) => {
            let gap = (today - last).num_days();
            if gap == 1 {
                current + 1
            } else if gap > 1 {
                1
            } else {
                current
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, n).unwrap()
    }

    #[test]
    fn first_session_starts_streak() {
        assert_eq!(next_streak(None, day(1), 0), 1);
    }

    #[test]
    fn consecutive_days_increment() {
        assert_eq!(next_streak(Some(day(1)), day(2), 1), 2);
        assert_eq!(next_streak(Some(day(2)), day(3), 2), 3);
    }

    #[test]
    fn skipped_day_resets() {
        // Day 1 -> streak 1, day 2 -> streak 2, day 4 (gap of 2) -> reset
        assert_eq!(next_streak(Some(day(2)), day(4), 2), 1);
    }

    #[test]
    fn same_day_leaves_streak_unchanged() {
        assert_eq!(next_streak(Some(day(5)), day(5), 3), 3);
    }

    #[test]
    fn streak_across_month_boundary() {
        let last = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();
        let today = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
        assert_eq!(next_streak(Some(last), today, 7), 8);
    }
}
