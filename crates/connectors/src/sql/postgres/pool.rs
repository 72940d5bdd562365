use crate::{error::ConnectorError, sql::redact_url};
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod, Runtime};
use native_tls::TlsConnector;
use postgres_native_tls::MakeTlsConnector;
use std::time::Duration;
use tokio_postgres::{Config, NoTls, config::SslMode};
use tracing::{info, warn};

/// Sizing and TLS behavior of the target pool.
#[derive(Debug, Clone)]
pub struct PgPoolOptions {
    pub max_size: usize,
    /// Bound on waiting for, and opening, a pooled connection.
    pub connect_timeout: Duration,
    /// Skip server certificate verification when TLS is on.
    pub accept_invalid_certs: bool,
}

impl Default for PgPoolOptions {
    fn default() -> Self {
        Self {
            max_size: 20,
            connect_timeout: Duration::from_millis(2000),
            accept_invalid_certs: true,
        }
    }
}

/// Builds the target pool. TLS follows the URL's `sslmode`.
pub fn build_pool(url: &str, options: &PgPoolOptions) -> Result<Pool, ConnectorError> {
    let mut config = url
        .parse::<Config>()
        .map_err(|e| ConnectorError::InvalidUrl(e.to_string()))?;
    config.connect_timeout(options.connect_timeout);

    let mgr_config = ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    };

    let manager = match config.get_ssl_mode() {
        SslMode::Disable => {
            warn!("Target TLS is disabled");
            Manager::from_config(config, NoTls, mgr_config)
        }
        _ => {
            let connector = TlsConnector::builder()
                .danger_accept_invalid_certs(options.accept_invalid_certs)
                .build()?;
            Manager::from_config(config, MakeTlsConnector::new(connector), mgr_config)
        }
    };

    let pool = Pool::builder(manager)
        .max_size(options.max_size.max(1))
        .wait_timeout(Some(options.connect_timeout))
        .create_timeout(Some(options.connect_timeout))
        .runtime(Runtime::Tokio1)
        .build()
        .map_err(|e| ConnectorError::Pool(e.to_string()))?;

    info!(
        url = %redact_url(url),
        max_size = options.max_size,
        "Target pool configured"
    );
    Ok(pool)
}
