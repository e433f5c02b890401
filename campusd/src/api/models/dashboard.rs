//! API request/response models for the dashboard aggregator.

use crate::api::models::{news::NewsResponse, tasks::TaskResponse};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::{IntoParams, ToSchema};

/// Aggregate dashboard stats.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DashboardStatsResponse {
    pub study_streak: i32,
    pub longest_streak: i32,
    pub tasks_completed: i64,
    pub minutes_studied: i64,
    pub total_downloads: i64,
    pub today: TodayStats,
    pub pending_tasks: i64,
    pub upcoming_events: Vec<TaskResponse>,
    pub unread_notifications: i64,
    pub recent_news: Vec<NewsResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TodayStats {
    pub tasks: i64,
    pub completed: i64,
    pub classes: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LogSessionRequest {
    /// Session length in minutes, must be positive
    pub duration: i32,
    pub subject: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LogSessionResponse {
    pub study_streak: i32,
    pub longest_streak: i32,
    pub total_minutes_studied: i64,
}

/// Analytics window.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AnalyticsPeriod {
    #[default]
    Week,
    Month,
    Year,
}

impl AnalyticsPeriod {
    pub fn days(self) -> i64 {
        match self {
            AnalyticsPeriod::Week => 7,
            AnalyticsPeriod::Month => 30,
            AnalyticsPeriod::Year => 365,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct AnalyticsQuery {
    pub period: Option<AnalyticsPeriod>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AnalyticsResponse {
    pub period: AnalyticsPeriod,
    pub total_minutes: i64,
    pub average_minutes_per_day: i64,
    /// Minutes studied per UTC day inside the window
    #[schema(value_type = Object)]
    pub daily_minutes: BTreeMap<NaiveDate, i64>,
    pub study_streak: i32,
    pub longest_streak: i32,
    pub weekly_goal: i32,
    pub daily_goal: i32,
}
