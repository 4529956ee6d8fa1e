//! HTTP access to image resources.

mod response;

pub use response::HeadResponse;

use async_trait::async_trait;
use reqwest::{Client, Proxy};
use tracing::debug;

use crate::config::HttpConfig;
use crate::error::FetchError;

pub const USER_AGENT: &str = concat!("imgacquire/", env!("CARGO_PKG_VERSION"));

/// Browser user agents for impersonate mode.
const IMPERSONATE_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
];

/// Pick the user agent for a config value: crate default, `"impersonate"`, or a literal.
pub fn resolve_user_agent(config: Option<&str>) -> String {
    match config {
        None => USER_AGENT.to_string(),
        Some("impersonate") => {
            let nanos = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.subsec_nanos() as usize)
                .unwrap_or(0);
            IMPERSONATE_USER_AGENTS[nanos % IMPERSONATE_USER_AGENTS.len()].to_string()
        }
        Some(custom) => custom.to_string(),
    }
}

/// Metadata and body access for a remote resource.
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    /// Headers only.
    async fn head(&self, url: &str) -> Result<HeadResponse, FetchError>;

    /// The full body. Non-success statuses are errors.
    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// reqwest-backed fetcher. One request per call, no retries.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Build a client; `proxy` (http, https or socks5 URL) routes every request.
    pub fn new(config: &HttpConfig, proxy: Option<&str>) -> Result<Self, FetchError> {
        let user_agent = resolve_user_agent(config.user_agent.as_deref());
        let mut builder = Client::builder()
            .user_agent(&user_agent)
            .timeout(config.timeout())
            .gzip(true)
            .brotli(true);

        if let Some(proxy) = proxy {
            debug!("Using proxy {}", proxy);
            builder = builder.proxy(Proxy::all(proxy)?);
        }

        let client = builder.build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl ResourceFetcher for HttpClient {
    async fn head(&self, url: &str) -> Result<HeadResponse, FetchError> {
        debug!("HEAD {}", url);
        let response = self.client.head(url).send().await?;
        Ok(HeadResponse::from_header_map(
            response.status(),
            response.headers(),
        ))
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        Ok(response.bytes().await?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_user_agent() {
        assert!(resolve_user_agent(None).starts_with("imgacquire/"));
        assert!(resolve_user_agent(Some("impersonate")).starts_with("Mozilla/5.0"));
        assert_eq!(resolve_user_agent(Some("custom-agent")), "custom-agent");
    }

    #[test]
    fn test_client_builds_from_default_config() {
        assert!(HttpClient::new(&HttpConfig::default(), None).is_ok());
    }

    #[test]
    fn test_client_builds_with_proxy() {
        let config = HttpConfig::default();
        assert!(HttpClient::new(&config, Some("socks5://127.0.0.1:1080")).is_ok());
        assert!(HttpClient::new(&config, Some("http://proxy.test:3128")).is_ok());
    }
}
