use crate::config::{CountryLookup, DEFAULT_IPINFO_URL};
use crate::errors::ApiError;
use async_trait::async_trait;
use hyper::header::{HeaderMap, HeaderName};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Determines the country a request came from.
#[async_trait]
pub trait CountryResolver: Send + Sync {
    async fn resolve(&self, headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<String>;
}

pub fn build_resolver(lookup: &CountryLookup) -> Result<Arc<dyn CountryResolver>, ApiError> {
    let resolver: Arc<dyn CountryResolver> = match lookup {
        CountryLookup::Header { header } => Arc::new(HeaderCountryResolver::new(header)?),
        CountryLookup::Ipinfo {
            token,
            url,
            timeout_secs,
            client_ip_header,
        } => {
            let url = match url {
                Some(url) => url.clone(),
                None => Url::parse(DEFAULT_IPINFO_URL)?,
            };
            let client = reqwest::Client::builder()
                .timeout(Duration::from_secs(*timeout_secs))
                .build()?;
            let client_ip_header = client_ip_header
                .as_deref()
                .map(|h| HeaderName::from_bytes(h.as_bytes()))
                .transpose()?;

            Arc::new(IpinfoCountryResolver {
                client,
                url,
                token: token.clone(),
                client_ip_header,
            })
        }
    };

    Ok(resolver)
}

/// Reads the country that an edge proxy attached to the request.
pub struct HeaderCountryResolver {
    header: HeaderName,
}

impl HeaderCountryResolver {
    pub fn new(header: &str) -> Result<Self, ApiError> {
        Ok(HeaderCountryResolver {
            header: HeaderName::from_bytes(header.as_bytes())?,
        })
    }
}

#[async_trait]
impl CountryResolver for HeaderCountryResolver {
    async fn resolve(&self, headers: &HeaderMap, _peer: Option<SocketAddr>) -> Option<String> {
        let value = headers.get(&self.header)?.to_str().ok()?.trim();
        (!value.is_empty()).then(|| value.to_string())
    }
}

/// Looks up the country of the client IP with the ipinfo.io `/{ip}/country` endpoint.
pub struct IpinfoCountryResolver {
    client: reqwest::Client,
    url: Url,
    token: String,
    client_ip_header: Option<HeaderName>,
}

impl IpinfoCountryResolver {
    fn client_ip(&self, headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<IpAddr> {
        let from_header = self
            .client_ip_header
            .as_ref()
            .and_then(|name| headers.get(name))
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .and_then(|first| first.trim().parse().ok());

        from_header.or(peer.map(|addr| addr.ip()))
    }

    fn lookup_url(&self, ip: IpAddr) -> Option<Url> {
        let mut url = self.url.clone();
        {
            let mut segments = url.path_segments_mut().ok()?;
            segments.pop_if_empty().push(&ip.to_string()).push("country");
        }
        url.query_pairs_mut().append_pair("token", &self.token);
        Some(url)
    }
}

#[async_trait]
impl CountryResolver for IpinfoCountryResolver {
    async fn resolve(&self, headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<String> {
        let ip = self.client_ip(headers, peer)?;
        let url = self.lookup_url(ip)?;

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, %ip, "Country lookup failed");
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), %ip, "Country lookup rejected");
            return None;
        }

        // The endpoint answers with the bare country code and a trailing newline.
        let body = response.text().await.ok()?;
        let country = body.trim();
        (!country.is_empty()).then(|| country.to_string())
    }
}
