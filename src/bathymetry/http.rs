use std::time::Duration;

use crate::error::BathymetryError;

/// Minimal HTTP GET abstraction so downloads can be stubbed in tests.
pub trait HttpClient {
    /// Fetches `url`, returning the response body.
    ///
    /// # Errors
    ///
    /// Returns `BathymetryError::Download` on transport errors or non-success
    /// status codes.
    fn get(&self, url: &str) -> Result<Vec<u8>, BathymetryError>;
}

/// Blocking HTTP client backed by `reqwest`.
#[derive(Clone)]
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
}

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

impl ReqwestClient {
    /// Creates a client with the given request timeout.
    ///
    /// # Errors
    ///
    /// Returns `BathymetryError::Download` if the TLS backend cannot be
    /// initialised.
    pub fn new(timeout: Duration) -> Result<Self, BathymetryError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| BathymetryError::Download {
                url: String::new(),
                reason: format!("failed to create HTTP client: {e}"),
            })?;
        Ok(Self { client })
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &str) -> Result<Vec<u8>, BathymetryError> {
        let fail = |reason: String| BathymetryError::Download {
            url: url.to_string(),
            reason,
        };

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| fail(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(fail(format!("HTTP {}", response.status())));
        }

        response
            .bytes()
            .map(|b| b.to_vec())
            .map_err(|e| fail(format!("failed to read response: {e}")))
    }
}
