use analytics_api::config::Config as ApiConfig;
use serde::Deserialize;
use std::fs::File;

#[derive(Debug, Deserialize)]
pub struct MetricsConfig {
    pub statsd_host: String,
    pub statsd_port: u16,
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    pub sentry_dsn: String,
}

#[derive(Debug, Deserialize)]
pub struct CommonConfig {
    pub metrics: Option<MetricsConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(flatten)]
    pub common: CommonConfig,
    pub api: ApiConfig,
}

impl Config {
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let config: Config = serde_yaml::from_reader(file)?;
        config.api.validate()?;

        Ok(config)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("could not load config from file: {0}")]
    LoadError(#[from] std::io::Error),
    #[error("could not parse config: {0}")]
    ParseError(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    ValidationError(#[from] analytics_api::config::ValidationError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use analytics_api::config::CountryLookup;
    use request_store::config::{BlobBackend, StoreConfig};
    use std::io::Write;

    fn write_tmp_file(s: &str) -> tempfile::NamedTempFile {
        let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
        write!(tmp, "{}", s).expect("write yaml");

        tmp
    }

    #[test]
    fn full_config() {
        let yaml = r#"
            metrics:
                statsd_host: 127.0.0.1
                statsd_port: 8125
            logging:
                sentry_dsn: "https://key@o0.ingest.sentry.io/0"
            api:
                listener:
                    host: 0.0.0.0
                    port: 8080
                admin_listener:
                    host: 127.0.0.1
                    port: 8081
                auth:
                    secret: change-me
                store:
                    type: blob
                    backend:
                        type: s3
                        bucket: cdn
                        endpoint: "https://account.r2.cloudflarestorage.com"
            "#;
        let tmp = write_tmp_file(yaml);
        let config = Config::from_file(tmp.path()).expect("load config");

        let metrics = config.common.metrics.expect("metrics config");
        assert_eq!(metrics.statsd_port, 8125);
        assert!(config.common.logging.is_some());
        assert_eq!(config.api.listener.port, 8080);
        assert_eq!(config.api.country, CountryLookup::default());
        match config.api.store {
            StoreConfig::Blob { key, backend } => {
                assert_eq!(key, "analytics/requests.json");
                assert!(matches!(backend, BlobBackend::S3 { bucket, .. } if bucket == "cdn"));
            }
            other => panic!("unexpected store: {other:?}"),
        }
    }

    #[test]
    fn minimal_config() {
        let yaml = r#"
            api:
                listener: { host: 127.0.0.1, port: 8080 }
                admin_listener: { host: 127.0.0.1, port: 8081 }
                auth: { secret: s3cret }
                store: { type: table, url: "sqlite:///var/lib/analytics/requests.db" }
            "#;
        let tmp = write_tmp_file(yaml);
        let config = Config::from_file(tmp.path()).expect("load config");
        assert!(config.common.metrics.is_none());
        assert!(config.common.logging.is_none());
        assert!(matches!(config.api.store, StoreConfig::Table { .. }));
    }

    #[test]
    fn invalid_config() {
        let yaml = r#"
            api:
                listener: { host: 127.0.0.1, port: 8080 }
                admin_listener: { host: 127.0.0.1, port: 8081 }
                auth: { secret: "" }
                store: { type: blob, backend: { type: memory } }
            "#;
        let tmp = write_tmp_file(yaml);
        assert!(matches!(
            Config::from_file(tmp.path()),
            Err(ConfigError::ValidationError(_))
        ));

        assert!(matches!(
            Config::from_file(std::path::Path::new("/nonexistent/analytics.yaml")),
            Err(ConfigError::LoadError(_))
        ));
    }
}
