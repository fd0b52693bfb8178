use std::str::FromStr;

use sqlx::postgres::{PgConnectOptions, PgSslMode};
use sqlx::{Connection, PgConnection};

use dbprobe_core::{Error, Result, Settings, redact_connection_string};

use crate::inspection::Inspection;
use crate::postgres::db_error;

/// Open the one connection a command works on.
///
/// TLS is required unless the URL carries its own `sslmode` or the settings
/// turn it off. A refused or rejected connection fails straight away with the
/// driver's error; only a connect that hangs runs into `connect_timeout`.
pub async fn connect(settings: &Settings) -> Result<PgConnection> {
    let mut options = PgConnectOptions::from_str(&settings.database_url).map_err(db_error)?;
    if settings.require_tls && !settings.database_url.contains("sslmode=") {
        options = options.ssl_mode(PgSslMode::Require);
    }

    match tokio::time::timeout(settings.connect_timeout, PgConnection::connect_with(&options)).await
    {
        Ok(connected) => connected.map_err(db_error),
        Err(_) => Err(Error::db(format!(
            "no connection within {}s",
            settings.connect_timeout.as_secs()
        ))),
    }
}

/// Connect, run `inspection`, and close the connection regardless of outcome.
pub async fn run_inspection<I>(settings: &Settings, inspection: &I) -> Result<I::Report>
where
    I: Inspection,
{
    let target = redact_connection_string(&settings.database_url).display_target();
    tracing::info!(event = "connecting", inspection = inspection.name(), target = %target);

    let mut conn = connect(settings).await?;
    tracing::info!(event = "connected", inspection = inspection.name());

    let outcome = inspection.run(&mut conn).await;

    if let Err(err) = conn.close().await {
        tracing::warn!(event = "disconnect_failed", inspection = inspection.name(), error = %err);
    }
    tracing::info!(
        event = "disconnected",
        inspection = inspection.name(),
        success = outcome.is_ok()
    );

    outcome
}
