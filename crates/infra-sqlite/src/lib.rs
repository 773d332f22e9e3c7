// Ripley Infrastructure - SQLite Adapter
// Implements: OutcomeRepository

mod connection;
mod error;
mod migration;
mod outcome_repository;

pub use connection::create_pool;
pub use migration::run_migrations;
pub use outcome_repository::SqliteOutcomeRepository;

pub(crate) use error::map_sqlx_error;
