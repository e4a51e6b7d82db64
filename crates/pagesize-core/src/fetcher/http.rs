//! HTTP GET via the curl crate (libcurl): counts body bytes, stores nothing.

use url::Url;

use super::Fetcher;
use crate::config::HttpConfig;
use crate::error::FetchError;

/// Turn a resource identifier into a URL. Bare hosts (`github.com`) get `https://`;
/// identifiers that already carry a scheme are used as given.
pub fn resource_url(id: &str) -> Result<Url, FetchError> {
    let raw = if id.contains("://") {
        id.to_string()
    } else {
        format!("https://{}", id)
    };
    Url::parse(&raw).map_err(|e| FetchError::InvalidUrl {
        id: id.to_string(),
        reason: e.to_string(),
    })
}

/// Blocking fetcher: one `curl::easy::Easy` per request.
#[derive(Debug, Clone, Default)]
pub struct CurlFetcher {
    http: HttpConfig,
}

impl CurlFetcher {
    pub fn new(http: HttpConfig) -> Self {
        Self { http }
    }
}

impl Fetcher for CurlFetcher {
    fn fetch(&self, id: &str) -> Result<u64, FetchError> {
        let url = resource_url(id)?;
        let mut received: u64 = 0;

        let mut easy = curl::easy::Easy::new();
        easy.url(url.as_str())?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.connect_timeout(self.http.connect_timeout())?;
        easy.timeout(self.http.request_timeout())?;

        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                received += data.len() as u64;
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let code = easy.response_code()?;
        if self.http.fail_on_http_error && !(200..300).contains(&code) {
            return Err(FetchError::Http(code));
        }
        tracing::trace!(%url, code, received, "GET complete");
        Ok(received)
    }
}
