use std::future::Future;
use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use bytes::BytesMut;
use reqwest::header::LOCATION;
use reqwest::redirect::Policy;
use reqwest::{Client as ReqwestClient, Response};
use thiserror::Error;
use url::Url;

use crate::config::Config;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("upstream responded with status {0}")]
    Status(u16),

    #[error("fetch timed out")]
    Timeout,

    #[error("could not resolve host: {0}")]
    Resolve(String),

    #[error("host resolves to a private or reserved address")]
    BlockedHost,

    #[error("redirect to unsupported location: {0}")]
    BadRedirect(String),

    #[error("too many redirects")]
    TooManyRedirects,
}

/// Hops followed before giving up, matching reqwest's default policy.
pub const MAX_REDIRECTS: usize = 10;

/// Outbound capability used by the extractor. One call, one GET.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `url` and return its body. Non-2xx responses are errors.
    async fn fetch(&self, url: &Url) -> Result<String, FetchError>;
}

// ── Public helpers ─────────────────────────────────────────────────────────

/// Returns `true` if `ip` is a private, loopback, or link-local address.
pub fn is_private_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            let o = v4.octets();
            matches!(
                o,
                [127, ..]
                    | [10, ..]
                    | [169, 254, ..]
                    | [192, 168, ..]
                    | [0, ..]
                    | [255, 255, 255, 255]
            ) || (o[0] == 172 && (16..=31).contains(&o[1]))
        }
        IpAddr::V6(v6) => {
            v6.is_loopback()
                || v6.is_unspecified()
                || (v6.segments()[0] & 0xfe00 == 0xfc00)
                || (v6.segments()[0] & 0xffc0 == 0xfe80)
                || v6.to_ipv4_mapped().is_some_and(|v4| is_private_ip(IpAddr::V4(v4)))
        }
    }
}

/// Reject hosts that resolve to any private or reserved address.
async fn ensure_public_host(url: &Url) -> Result<(), FetchError> {
    let host = url
        .host_str()
        .ok_or_else(|| FetchError::Resolve("URL has no host".into()))?;
    let port = url.port_or_known_default().unwrap_or(80);

    // IPv6 literals come back bracketed from host_str().
    let host = host.trim_start_matches('[').trim_end_matches(']');
    let addrs = tokio::net::lookup_host((host, port))
        .await
        .map_err(|e| FetchError::Resolve(e.to_string()))?;

    for addr in addrs {
        if is_private_ip(addr.ip()) {
            return Err(FetchError::BlockedHost);
        }
    }
    Ok(())
}

// ── reqwest implementation ─────────────────────────────────────────────────

/// Fetches pages over the network with a browser-like user agent.
///
/// Redirects are followed here rather than inside reqwest so that every hop
/// passes the private-address guard before it is requested.
pub struct HttpFetcher {
    client: ReqwestClient,
    max_body_bytes: usize,
    allow_private_hosts: bool,
}

impl HttpFetcher {
    pub fn new(
        user_agent: &str,
        timeout: Duration,
        max_body_bytes: usize,
        allow_private_hosts: bool,
    ) -> Result<Self, FetchError> {
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .redirect(Policy::none())
            .build()?;

        Ok(Self {
            client,
            max_body_bytes,
            allow_private_hosts,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        Self::new(
            &config.user_agent,
            config.fetch_timeout,
            config.max_body_bytes,
            config.allow_private_hosts,
        )
    }

    /// Send a GET for `url`, following redirects. `check_host` runs before
    /// each hop is requested, the first one included.
    async fn send_following<F, Fut>(
        &self,
        url: &Url,
        check_host: F,
    ) -> Result<Response, FetchError>
    where
        F: Fn(Url) -> Fut,
        Fut: Future<Output = Result<(), FetchError>>,
    {
        let mut current = url.clone();
        let mut hops = 0;

        loop {
            check_host(current.clone()).await?;
            let response = self
                .client
                .get(current.clone())
                .send()
                .await
                .map_err(map_reqwest)?;

            if !response.status().is_redirection() {
                return Ok(response);
            }
            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned);
            let Some(location) = location else {
                // 3xx without a target (e.g. 304) is reported as a bad status.
                return Ok(response);
            };

            hops += 1;
            if hops > MAX_REDIRECTS {
                return Err(FetchError::TooManyRedirects);
            }
            let next = redirect_target(&current, &location)?;
            tracing::debug!(from = %current, to = %next, "Following redirect");
            current = next;
        }
    }
}

/// Resolve a `Location` header against the URL that produced it.
fn redirect_target(base: &Url, location: &str) -> Result<Url, FetchError> {
    let next = base
        .join(location)
        .map_err(|_| FetchError::BadRedirect(location.to_string()))?;
    match next.scheme() {
        "http" | "https" => Ok(next),
        _ => Err(FetchError::BadRedirect(location.to_string())),
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        let mut response = if self.allow_private_hosts {
            self.send_following(url, |_| async { Ok(()) }).await?
        } else {
            self.send_following(url, |hop| async move { ensure_public_host(&hop).await })
                .await?
        };

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        // Bytes past the cap are dropped; the heuristics run on the prefix.
        let mut buf = BytesMut::new();
        while let Some(chunk) = response.chunk().await.map_err(map_reqwest)? {
            let room = self.max_body_bytes - buf.len();
            if chunk.len() >= room {
                buf.extend_from_slice(&chunk[..room]);
                tracing::debug!(url = %url, cap = self.max_body_bytes, "Page body truncated");
                break;
            }
            buf.extend_from_slice(&chunk);
        }

        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

fn map_reqwest(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Request(e)
    }
}

// ── Unit tests ─────────────────────────────────────────────────────────────
