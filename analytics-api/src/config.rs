use request_store::config::StoreConfig;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Port cannot be 0")]
    InvalidPort,

    #[error("Auth secret cannot be empty")]
    EmptySecret,

    #[error("Empty header name for {0}")]
    EmptyHeader(&'static str),

    #[error("Empty allowed origin")]
    EmptyOrigin,
}

/// Analytics API configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    /// Listener for the public API
    pub listener: Listener,
    /// Listener for health and readiness probes
    pub admin_listener: Listener,
    pub auth: AuthConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    /// How the `ipunknown` route determines the country of a request
    #[serde(default)]
    pub country: CountryLookup,
    pub store: StoreConfig,
}

impl Config {
    /// Validates the API configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.listener.validate()?;
        self.admin_listener.validate()?;

        if self.auth.secret.is_empty() {
            return Err(ValidationError::EmptySecret);
        }

        if self.cors.allowed_origins.iter().any(|o| o.is_empty()) {
            return Err(ValidationError::EmptyOrigin);
        }

        match &self.country {
            CountryLookup::Header { header } if header.is_empty() => {
                Err(ValidationError::EmptyHeader("country"))
            }
            CountryLookup::Ipinfo {
                client_ip_header: Some(header),
                ..
            } if header.is_empty() => Err(ValidationError::EmptyHeader("client ip")),
            _ => Ok(()),
        }
    }
}

/// Network listener configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Listener {
    /// Host address to bind to (e.g., "0.0.0.0" or "127.0.0.1")
    pub host: String,
    /// Port number to listen on
    pub port: u16,
}

impl Listener {
    /// Validates the listener configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct AuthConfig {
    /// Shared secret expected verbatim in the `Authorization` header of record requests
    pub secret: String,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct CorsConfig {
    /// Origins allowed to call the API from a browser. Empty allows any origin.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

pub const DEFAULT_COUNTRY_HEADER: &str = "cf-ipcountry";
pub const DEFAULT_IPINFO_URL: &str = "https://ipinfo.io";

fn default_country_header() -> String {
    DEFAULT_COUNTRY_HEADER.into()
}

fn default_lookup_timeout_secs() -> u64 {
    2
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
#[serde(tag = "type")]
pub enum CountryLookup {
    /// Country set by the edge in front of the service, e.g. Cloudflare's `CF-IPCountry`
    Header {
        #[serde(default = "default_country_header")]
        header: String,
    },
    /// Country looked up from the client IP through ipinfo.io
    Ipinfo {
        token: String,
        /// Defaults to [`DEFAULT_IPINFO_URL`]
        url: Option<Url>,
        #[serde(default = "default_lookup_timeout_secs")]
        timeout_secs: u64,
        /// Header carrying the client IP when running behind a proxy. The first
        /// comma-separated entry is used. Falls back to the socket peer address.
        client_ip_header: Option<String>,
    },
}

impl Default for CountryLookup {
    fn default() -> Self {
        CountryLookup::Header {
            header: default_country_header(),
        }
    }
}
