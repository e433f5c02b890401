//! OpenAPI documentation for the `/api/v1` surface, served at `/docs`.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "campusd",
        description = "Campus life backend: past question marketplace, wallet, subscriptions, timetable, tasks and study tracking"
    ),
    modifiers(&SecurityAddon),
    paths(
        crate::api::handlers::auth::register,
        crate::api::handlers::auth::login,
        crate::api::handlers::users::get_profile,
        crate::api::handlers::users::update_profile,
        crate::api::handlers::wallets::get_wallet,
        crate::api::handlers::wallets::list_transactions,
        crate::api::handlers::wallets::fund_wallet,
        crate::api::handlers::wallets::withdraw_funds,
        crate::api::handlers::past_questions::create_past_question,
        crate::api::handlers::past_questions::list_past_questions,
        crate::api::handlers::past_questions::my_uploads,
        crate::api::handlers::past_questions::get_past_question,
        crate::api::handlers::past_questions::download_past_question,
        crate::api::handlers::past_questions::rate_past_question,
        crate::api::handlers::subscriptions::get_subscription,
        crate::api::handlers::subscriptions::get_plans,
        crate::api::handlers::subscriptions::subscribe,
        crate::api::handlers::subscriptions::cancel_subscription,
        crate::api::handlers::tasks::list_tasks,
        crate::api::handlers::tasks::create_task,
        crate::api::handlers::tasks::get_task,
        crate::api::handlers::tasks::update_task,
        crate::api::handlers::tasks::delete_task,
        crate::api::handlers::timetables::get_timetable,
        crate::api::handlers::timetables::replace_timetable,
        crate::api::handlers::timetables::add_schedule_item,
        crate::api::handlers::timetables::update_schedule_item,
        crate::api::handlers::timetables::delete_schedule_item,
        crate::api::handlers::timetables::today_schedule,
        crate::api::handlers::news::list_news,
        crate::api::handlers::news::get_categories,
        crate::api::handlers::news::get_news_article,
        crate::api::handlers::news::create_news_article,
        crate::api::handlers::news::update_news_article,
        crate::api::handlers::news::delete_news_article,
        crate::api::handlers::notifications::list_notifications,
        crate::api::handlers::notifications::unread_count,
        crate::api::handlers::notifications::mark_as_read,
        crate::api::handlers::notifications::mark_all_as_read,
        crate::api::handlers::notifications::delete_notification,
        crate::api::handlers::notifications::clear_all_notifications,
        crate::api::handlers::dashboard::get_dashboard_stats,
        crate::api::handlers::dashboard::log_study_session,
        crate::api::handlers::dashboard::get_analytics,
    ),
    tags(
        (name = "auth", description = "Registration and login"),
        (name = "users", description = "Profile management"),
        (name = "wallet", description = "Wallet ledger, funding and withdrawals"),
        (name = "past-questions", description = "Past question marketplace"),
        (name = "subscription", description = "Subscription plans"),
        (name = "tasks", description = "Task management"),
        (name = "timetable", description = "Weekly timetable"),
        (name = "news", description = "Campus news"),
        (name = "notifications", description = "In-app notifications"),
        (name = "dashboard", description = "Dashboard aggregation and study tracking"),
    )
)]
pub struct ApiDoc;
