use crate::error::MigrationError;
use connectors::{
    source::SourceReader,
    sql::{mysql::reader::MySqlReader, postgres::writer::PgWriter, redact_url},
    target::TargetWriter,
};
use engine_config::settings::connection::{SourceSettings, TargetSettings};
use std::{sync::Arc, time::Duration};
use tracing::info;

pub fn create_source(
    settings: &SourceSettings,
    query_timeout: Duration,
) -> Result<Arc<dyn SourceReader>, MigrationError> {
    info!(
        url = %redact_url(&settings.url),
        pool_size = settings.pool_size,
        "Creating source pool"
    );
    let reader = MySqlReader::connect(&settings.url, settings.pool_size, query_timeout)?;
    Ok(Arc::new(reader))
}

pub fn create_target(settings: &TargetSettings) -> Result<Arc<dyn TargetWriter>, MigrationError> {
    info!(
        url = %redact_url(&settings.url),
        pool_size = settings.pool_size,
        ssl = ?settings.ssl,
        "Creating target pool"
    );
    let writer = PgWriter::connect(&settings.url, &settings.pool_options())?;
    Ok(Arc::new(writer))
}
