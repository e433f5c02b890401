//! Repository implementations for database access.
//!
//! Each repository wraps a `&mut PgConnection`, so callers decide whether an
//! operation runs on a plain pool connection or inside a transaction.
//! Multi-step mutations (purchase settlement, withdrawal, plan change with
//! history) must run inside a transaction; handlers begin one on the pool and
//! construct the repositories they need from it.
//!
//! # Available Repositories
//!
//! - [`Users`]: account management and authentication lookups
//! - [`Wallets`]: the wallet ledger; every balance mutation goes through it
//! - [`PastQuestions`]: catalog CRUD, counters and rating aggregation
//! - [`Downloads`]: purchase/download receipts
//! - [`Subscriptions`]: plan state and history
//! - [`StudyStats`]: streaks, study sessions and monotonic counters
//! - [`Tasks`]: task CRUD (implements [`Repository`])
//! - [`Timetables`]: weekly schedule entries
//! - [`News`]: article CRUD and category counts
//! - [`Notifications`]: per-user notification rows

pub mod downloads;
pub mod news;
pub mod notifications;
pub mod past_questions;
pub mod repository;
pub mod study_stats;
pub mod subscriptions;
pub mod tasks;
pub mod timetables;
pub mod users;
pub mod wallets;

pub use downloads::Downloads;
pub use news::News;
pub use notifications::Notifications;
pub use past_questions::PastQuestions;
pub use repository::Repository;
pub use study_stats::StudyStats;
pub use subscriptions::Subscriptions;
pub use tasks::Tasks;
pub use timetables::Timetables;
pub use users::Users;
pub use wallets::Wallets;
