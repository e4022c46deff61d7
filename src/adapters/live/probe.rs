//! Live adapter for the `SignalProbe` port: `GET {base}/power`.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use crate::error::{ConfigError, ProbeError};
use crate::ports::probe::{ProbeFuture, SignalProbe};
use crate::signal::SignalState;

/// Path appended to the configured base address.
pub const POWER_PATH: &str = "/power";

/// Upper bound on a single probe, connect included.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(4);

/// Probes the power endpoint over HTTP.
pub struct HttpProbe {
    client: Client,
    url: String,
}

impl HttpProbe {
    /// Creates a probe for `{base_url}/power`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(PROBE_TIMEOUT)
            .connect_timeout(PROBE_TIMEOUT)
            .build()
            .map_err(ConfigError::HttpClient)?;
        Ok(Self { client, url: power_url(base_url) })
    }

    /// The full URL being probed.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn fetch(&self) -> Result<String, ProbeError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|source| ProbeError::Transport { url: self.url.clone(), source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProbeError::Status { url: self.url.clone(), status: status.as_u16() });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProbeError::Body { url: self.url.clone(), reason: e.to_string() })?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| ProbeError::Body { url: self.url.clone(), reason: e.to_string() })
    }
}

impl SignalProbe for HttpProbe {
    fn probe(&self) -> ProbeFuture<'_> {
        Box::pin(async move {
            let state = classify(self.fetch().await);
            debug!(url = %self.url, %state, "probed signal");
            state
        })
    }
}

/// Maps a fetch outcome to a reading, logging failures.
pub(crate) fn classify(result: Result<String, ProbeError>) -> SignalState {
    match result {
        Ok(body) => SignalState::from_body(&body),
        Err(err) => {
            warn!(error = %err, "probe failed");
            SignalState::Unknown
        }
    }
}

fn power_url(base_url: &str) -> String {
    format!("{}{POWER_PATH}", base_url.trim_end_matches('/'))
}
