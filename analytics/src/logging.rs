use crate::config::LoggingConfig;
use sentry::ClientInitGuard;
use sentry::types::{Dsn, ParseDsnError};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the global tracing subscriber, forwarding events to Sentry when a DSN is set.
///
/// The returned guard flushes pending Sentry events on drop and must live until shutdown.
pub fn init(config: Option<&LoggingConfig>) -> Result<Option<ClientInitGuard>, ParseDsnError> {
    let guard = match config {
        Some(config) => {
            let dsn: Dsn = config.sentry_dsn.parse()?;
            Some(sentry::init(sentry::ClientOptions {
                dsn: Some(dsn),
                release: sentry::release_name!(),
                ..Default::default()
            }))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .with(guard.is_some().then(sentry::integrations::tracing::layer))
        .init();

    Ok(guard)
}
