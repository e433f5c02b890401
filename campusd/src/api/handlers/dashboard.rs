//! Dashboard aggregator: stats, study-session logging, analytics.

use crate::{
    AppState,
    api::models::{
        dashboard::{
            AnalyticsPeriod, AnalyticsQuery, AnalyticsResponse, DashboardStatsResponse, LogSessionRequest, LogSessionResponse,
            TodayStats,
        },
        news::NewsResponse,
        tasks::TaskResponse,
        users::CurrentUser,
    },
    db::{
        handlers::{News, Notifications, StudyStats, Tasks, Timetables},
        models::timetables::Day,
    },
    errors::{Error, Result},
};
use axum::{
    extract::{Query, State},
    response::Json,
};
use chrono::{Duration, Utc};
use std::collections::BTreeMap;

const UPCOMING_EVENTS_LIMIT: i64 = 5;
const RECENT_NEWS_LIMIT: i64 = 3;

/// Aggregate everything the home screen shows
#[utoipa::path(
    get,
    path = "/dashboard/stats",
    tag = "dashboard",
    summary = "Get dashboard stats",
    responses(
        (status = 200, description = "Dashboard stats", body = DashboardStatsResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_dashboard_stats(State(state): State<AppState>, current_user: CurrentUser) -> Result<Json<DashboardStatsResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let stats = StudyStats::new(&mut conn).get_or_create(current_user.id).await?;

    let now = Utc::now();
    let today_start = now.date_naive().and_hms_opt(0, 0, 0).unwrap().and_utc();
    let tomorrow = today_start + Duration::days(1);
    let next_week = now + Duration::days(7);

    let today_tasks = Tasks::new(&mut conn).count_due_between(current_user.id, today_start, tomorrow).await?;
    let completed_today = Tasks::new(&mut conn)
        .count_completed_between(current_user.id, today_start, tomorrow)
        .await?;
    let pending_tasks = Tasks::new(&mut conn).count_open(current_user.id).await?;
    let today_classes = Timetables::new(&mut conn).count_for_day(current_user.id, Day::today()).await?;
    let upcoming = Tasks::new(&mut conn).upcoming(current_user.id, next_week, UPCOMING_EVENTS_LIMIT).await?;
    let unread_notifications = Notifications::new(&mut conn).count_for_user(current_user.id, true).await?;
    let recent_news = News::new(&mut conn).recent(RECENT_NEWS_LIMIT).await?;

    Ok(Json(DashboardStatsResponse {
        study_streak: stats.study_streak,
        longest_streak: stats.longest_streak,
        tasks_completed: stats.total_tasks_completed,
        minutes_studied: stats.total_minutes_studied,
        total_downloads: stats.total_downloads,
        today: TodayStats {
            tasks: today_tasks,
            completed: completed_today,
            classes: today_classes,
        },
        pending_tasks,
        upcoming_events: upcoming.into_iter().map(TaskResponse::from).collect(),
        unread_notifications,
        recent_news: recent_news.into_iter().map(NewsResponse::from).collect(),
    }))
}

/// Log a study session, advancing the streak
#[utoipa::path(
    post,
    path = "/dashboard/study-sessions",
    tag = "dashboard",
    summary = "Log a study session",
    responses(
        (status = 200, description = "Session logged", body = LogSessionResponse),
        (status = 400, description = "Invalid duration"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn log_study_session(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(data): Json<LogSessionRequest>,
) -> Result<Json<LogSessionResponse>> {
    if data.duration <= 0 {
        return Err(Error::BadRequest {
            message: "Please provide a valid duration in minutes".to_string(),
        });
    }

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let stats = StudyStats::new(&mut tx).log_session(current_user.id, data.duration, data.subject).await?;
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(LogSessionResponse {
        study_streak: stats.study_streak,
        longest_streak: stats.longest_streak,
        total_minutes_studied: stats.total_minutes_studied,
    }))
}

/// Study analytics over a trailing window
#[utoipa::path(
    get,
    path = "/dashboard/analytics",
    tag = "dashboard",
    summary = "Get study analytics",
    params(AnalyticsQuery),
    responses(
        (status = 200, description = "Analytics", body = AnalyticsResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_analytics(
    State(state): State<AppState>,
    Query(query): Query<AnalyticsQuery>,
    current_user: CurrentUser,
) -> Result<Json<AnalyticsResponse>> {
    let period: AnalyticsPeriod = query.period.unwrap_or_default();
    let since = Utc::now() - Duration::days(period.days());

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let stats = StudyStats::new(&mut conn).get_or_create(current_user.id).await?;
    let sessions = StudyStats::new(&mut conn).sessions_since(current_user.id, since).await?;

    let mut daily_minutes: BTreeMap<chrono::NaiveDate, i64> = BTreeMap::new();
    for session in &sessions {
        *daily_minutes.entry(session.session_date.date_naive()).or_default() += i64::from(session.duration_minutes);
    }

    let total_minutes: i64 = daily_minutes.values().sum();
    let average_minutes_per_day = (total_minutes as f64 / period.days() as f64).round() as i64;

    Ok(Json(AnalyticsResponse {
        period,
        total_minutes,
        average_minutes_per_day,
        daily_minutes,
        study_streak: stats.study_streak,
        longest_streak: stats.longest_streak,
        weekly_goal: stats.weekly_goal,
        daily_goal: stats.daily_goal,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{auth_header, create_test_app, create_test_user};
    use serde_json::json;
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_log_session_starts_streak(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let user = create_test_user(&pool).await;
        let (name, value) = auth_header(&user);

        let response = app
            .post("/api/v1/dashboard/study-sessions")
            .add_header(name.clone(), value.clone())
            .json(&json!({ "duration": 45, "subject": "Algorithms" }))
            .await;

        response.assert_status_ok();
        let logged: LogSessionResponse = response.json();
        assert_eq!(logged.study_streak, 1);
        assert_eq!(logged.longest_streak, 1);
        assert_eq!(logged.total_minutes_studied, 45);

        // A second session the same day accumulates minutes, streak unchanged
        let response = app
            .post("/api/v1/dashboard/study-sessions")
            .add_header(name, value)
            .json(&json!({ "duration": 30 }))
            .await;
        let logged: LogSessionResponse = response.json();
        assert_eq!(logged.study_streak, 1);
        assert_eq!(logged.total_minutes_studied, 75);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_log_session_rejects_bad_duration(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let user = create_test_user(&pool).await;
        let (name, value) = auth_header(&user);

        for duration in [0, -10] {
            let response = app
                .post("/api/v1/dashboard/study-sessions")
                .add_header(name.clone(), value.clone())
                .json(&json!({ "duration": duration }))
                .await;
            response.assert_status_bad_request();
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_dashboard_stats_shape(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let user = create_test_user(&pool).await;
        let (name, value) = auth_header(&user);

        app.post("/api/v1/dashboard/study-sessions")
            .add_header(name.clone(), value.clone())
            .json(&json!({ "duration": 60 }))
            .await
            .assert_status_ok();

        app.post("/api/v1/tasks")
            .add_header(name.clone(), value.clone())
            .json(&json!({ "title": "Revise notes" }))
            .await;

        let response = app.get("/api/v1/dashboard/stats").add_header(name, value).await;
        response.assert_status_ok();
        let stats: DashboardStatsResponse = response.json();
        assert_eq!(stats.study_streak, 1);
        assert_eq!(stats.minutes_studied, 60);
        assert_eq!(stats.pending_tasks, 1);
        assert_eq!(stats.unread_notifications, 0);
        assert!(stats.recent_news.is_empty());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_analytics_aggregates_by_day(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let user = create_test_user(&pool).await;
        let (name, value) = auth_header(&user);

        for duration in [30, 45] {
            app.post("/api/v1/dashboard/study-sessions")
                .add_header(name.clone(), value.clone())
                .json(&json!({ "duration": duration }))
                .await
                .assert_status_ok();
        }

        let response = app.get("/api/v1/dashboard/analytics?period=week").add_header(name, value).await;
        response.assert_status_ok();
        let analytics: AnalyticsResponse = response.json();
        assert_eq!(analytics.period, AnalyticsPeriod::Week);
        assert_eq!(analytics.total_minutes, 75);
        // Both sessions land on today's UTC day
        assert_eq!(analytics.daily_minutes.len(), 1);
        assert_eq!(analytics.average_minutes_per_day, (75.0_f64 / 7.0).round() as i64);
    }
}
