//! Database record models matching table schemas.
//!
//! Each model struct corresponds to a database table row. Models derive
//! `sqlx::FromRow` for query results and stay distinct from the API models in
//! [`crate::api::models`] so the storage and API representations can evolve
//! independently. Enumerated columns are stored as TEXT and mapped with
//! `sqlx::Type`.

pub mod downloads;
pub mod news;
pub mod notifications;
pub mod past_questions;
pub mod study_stats;
pub mod subscriptions;
pub mod tasks;
pub mod timetables;
pub mod users;
pub mod wallets;
