//! CLI subcommand implementations.

pub mod admin;
pub mod migrate;

/// Resolve the database URL from the environment.
///
/// Checks `BAZAAR_DATABASE_URL` first, then the generic `DATABASE_URL`.
pub(crate) fn database_url() -> Option<String> {
    std::env::var("BAZAAR_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()
}
