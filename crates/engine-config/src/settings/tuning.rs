use crate::{error::SettingsError, settings::vars::Vars};
use std::{fmt, time::Duration};

pub const DEFAULT_BATCH_SIZE: usize = 1000;
pub const DEFAULT_CONCURRENT_OPERATIONS: usize = 5;
pub const DEFAULT_QUERY_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_HASH_ROUNDS: u32 = 10;
pub const DEFAULT_CHUNK_PAUSE_MS: u64 = 100;
pub const DEFAULT_FALLBACK_EMAIL_DOMAIN: &str = "dashboardfinanceiro.com";

/// Knobs that shape how a run reads, transforms and writes.
#[derive(Clone, PartialEq)]
pub struct TuningSettings {
    pub batch_size: usize,
    /// Row transforms (password hashing) in flight per entity.
    pub concurrent_operations: usize,
    /// Entities running at once within a dependency wave.
    pub entity_concurrency: usize,
    pub query_timeout: Duration,
    pub hash_rounds: u32,
    pub cipher_key: String,
    pub chunk_pause: Duration,
    pub fallback_email_domain: String,
}

impl Default for TuningSettings {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            concurrent_operations: DEFAULT_CONCURRENT_OPERATIONS,
            entity_concurrency: 1,
            query_timeout: Duration::from_millis(DEFAULT_QUERY_TIMEOUT_MS),
            hash_rounds: DEFAULT_HASH_ROUNDS,
            cipher_key: String::new(),
            chunk_pause: Duration::from_millis(DEFAULT_CHUNK_PAUSE_MS),
            fallback_email_domain: DEFAULT_FALLBACK_EMAIL_DOMAIN.to_string(),
        }
    }
}

impl TuningSettings {
    pub(crate) fn from_vars(vars: &Vars) -> Result<Self, SettingsError> {
        Ok(Self {
            batch_size: vars.bounded_or("BATCH_SIZE", DEFAULT_BATCH_SIZE, 1, 10_000)?,
            concurrent_operations: vars.bounded_or(
                "CONCURRENT_OPERATIONS",
                DEFAULT_CONCURRENT_OPERATIONS,
                1,
                256,
            )?,
            entity_concurrency: vars.bounded_or("ENTITY_CONCURRENCY", 1usize, 1, 6)?,
            query_timeout: Duration::from_millis(vars.bounded_or(
                "QUERY_TIMEOUT",
                DEFAULT_QUERY_TIMEOUT_MS,
                1,
                3_600_000,
            )?),
            hash_rounds: vars.bounded_or("HASH_ROUNDS", DEFAULT_HASH_ROUNDS, 4, 31)?,
            cipher_key: vars.string_or("LEGACY_CIPHER_KEY", ""),
            chunk_pause: Duration::from_millis(vars.parse_or(
                "CHUNK_PAUSE_MS",
                DEFAULT_CHUNK_PAUSE_MS,
            )?),
            fallback_email_domain: vars
                .string_or("FALLBACK_EMAIL_DOMAIN", DEFAULT_FALLBACK_EMAIL_DOMAIN),
        })
    }
}

impl fmt::Debug for TuningSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TuningSettings")
            .field("batch_size", &self.batch_size)
            .field("concurrent_operations", &self.concurrent_operations)
            .field("entity_concurrency", &self.entity_concurrency)
            .field("query_timeout", &self.query_timeout)
            .field("hash_rounds", &self.hash_rounds)
            .field("cipher_key", &"***")
            .field("chunk_pause", &self.chunk_pause)
            .field("fallback_email_domain", &self.fallback_email_domain)
            .finish()
    }
}
