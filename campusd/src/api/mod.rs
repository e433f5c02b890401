//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: Axum route handlers for all API endpoints
//! - **[`models`]**: request/response data structures for API communication
//!
//! The API lives under `/api/v1/*`. Catalog and news reads are public; every
//! other route requires a bearer token. All endpoints are documented with
//! OpenAPI annotations via `utoipa` and served at `/docs`.

pub mod handlers;
pub mod models;
