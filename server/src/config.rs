//! Server configuration parsed from environment variables.

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_FLUSH_INTERVAL_MS: u64 = 250;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    /// `None` runs the server purely in memory.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub flush_interval_ms: u64,
    /// Load the bundled sample dataset when no database is configured.
    pub seed_mock_data: bool,
}

impl ServerConfig {
    /// Build typed config from the process environment.
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `DATABASE_URL`: in-memory only when absent or empty
    /// - `DB_MAX_CONNECTIONS`: default 5
    /// - `STATUS_FLUSH_INTERVAL_MS`: default 250
    /// - `SEED_MOCK_DATA`: default `true`
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            port: parse_or(lookup("PORT"), DEFAULT_PORT),
            database_url: lookup("DATABASE_URL").filter(|v| !v.trim().is_empty()),
            db_max_connections: parse_or(lookup("DB_MAX_CONNECTIONS"), DEFAULT_DB_MAX_CONNECTIONS),
            flush_interval_ms: parse_or(lookup("STATUS_FLUSH_INTERVAL_MS"), DEFAULT_FLUSH_INTERVAL_MS),
            seed_mock_data: lookup("SEED_MOCK_DATA").is_none_or(|v| parse_flag(&v)),
        }
    }
}

fn parse_or<T: std::str::FromStr>(raw: Option<String>, default: T) -> T {
    raw.and_then(|v| v.trim().parse::<T>().ok()).unwrap_or(default)
}

/// Anything other than an explicit "off" value counts as enabled.
fn parse_flag(raw: &str) -> bool {
    !matches!(raw.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off")
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
