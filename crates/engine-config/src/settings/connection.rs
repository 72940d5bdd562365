use crate::{
    error::SettingsError,
    settings::vars::{Vars, encode_userinfo},
};
use connectors::sql::{postgres::pool::PgPoolOptions, redact_url};
use std::{fmt, time::Duration};

/// How the target connection negotiates TLS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetSsl {
    Disable,
    /// Encrypt, but do not verify the server certificate.
    Require,
    /// Encrypt and verify the certificate chain.
    Verify,
}

impl TargetSsl {
    fn parse(raw: &str) -> Result<Self, SettingsError> {
        match raw.to_ascii_lowercase().as_str() {
            "disable" | "false" | "off" => Ok(TargetSsl::Disable),
            "require" | "true" | "on" => Ok(TargetSsl::Require),
            "verify" | "verify-full" => Ok(TargetSsl::Verify),
            _ => Err(SettingsError::Invalid {
                key: "TARGET_SSL".into(),
                value: raw.to_string(),
                reason: "expected disable, require or verify".into(),
            }),
        }
    }

    fn sslmode(&self) -> &'static str {
        match self {
            TargetSsl::Disable => "disable",
            TargetSsl::Require | TargetSsl::Verify => "require",
        }
    }
}

#[derive(Clone, PartialEq)]
pub struct SourceSettings {
    pub url: String,
    pub pool_size: usize,
}

impl SourceSettings {
    pub(crate) fn from_vars(vars: &Vars) -> Result<Self, SettingsError> {
        let url = match vars.get("SOURCE_URL") {
            Some(url) => url.to_string(),
            None => build_url(
                "mysql",
                vars.required("FDB_HOST")?,
                vars.parse_or("FDB_PORT", 3050u16)?,
                vars.required("FDB_DATABASE")?,
                vars.required("FDB_USER")?,
                vars.get("FDB_PASSWORD"),
            ),
        };
        Ok(Self {
            url,
            pool_size: vars.bounded_or("SOURCE_POOL_SIZE", 5usize, 1, 256)?,
        })
    }
}

impl fmt::Debug for SourceSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceSettings")
            .field("url", &redact_url(&self.url))
            .field("pool_size", &self.pool_size)
            .finish()
    }
}

#[derive(Clone, PartialEq)]
pub struct TargetSettings {
    pub url: String,
    pub pool_size: usize,
    pub connect_timeout: Duration,
    pub ssl: TargetSsl,
}

impl TargetSettings {
    pub(crate) fn from_vars(vars: &Vars) -> Result<Self, SettingsError> {
        let ssl = vars
            .get("TARGET_SSL")
            .map(TargetSsl::parse)
            .transpose()?
            .unwrap_or(TargetSsl::Require);

        let url = match vars.get("TARGET_URL") {
            Some(url) => url.to_string(),
            None => format!(
                "{}?sslmode={}",
                build_url(
                    "postgres",
                    vars.required("DB_HOST")?,
                    vars.parse_or("DB_PORT", 5432u16)?,
                    vars.required("DB_NAME")?,
                    vars.required("DB_USER")?,
                    vars.get("DB_PASSWORD"),
                ),
                ssl.sslmode()
            ),
        };

        Ok(Self {
            url,
            pool_size: vars.bounded_or("TARGET_POOL_SIZE", 20usize, 1, 1024)?,
            connect_timeout: Duration::from_millis(
                vars.bounded_or("TARGET_CONNECT_TIMEOUT", 2000u64, 1, 600_000)?,
            ),
            ssl,
        })
    }

    pub fn pool_options(&self) -> PgPoolOptions {
        PgPoolOptions {
            max_size: self.pool_size,
            connect_timeout: self.connect_timeout,
            accept_invalid_certs: self.ssl != TargetSsl::Verify,
        }
    }
}

impl fmt::Debug for TargetSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetSettings")
            .field("url", &redact_url(&self.url))
            .field("pool_size", &self.pool_size)
            .field("connect_timeout", &self.connect_timeout)
            .field("ssl", &self.ssl)
            .finish()
    }
}

fn build_url(
    scheme: &str,
    host: &str,
    port: u16,
    database: &str,
    user: &str,
    password: Option<&str>,
) -> String {
    let auth = match password {
        Some(pw) => format!("{}:{}", encode_userinfo(user), encode_userinfo(pw)),
        None => encode_userinfo(user),
    };
    format!("{scheme}://{auth}@{host}:{port}/{database}")
}
