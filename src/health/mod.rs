//! # Health Evaluation
//!
//! DB health is evaluated independently of business logic so a slow or
//! down database never blocks request handling on the hot path — only
//! the `/health` endpoint pays for the check, and only up to its own
//! timeout. See `db_status::DbHealth`.

pub mod db_status;

pub use db_status::DbHealth;
