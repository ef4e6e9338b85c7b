//! Remote telemetry: polls an agent's JSON endpoint over HTTP.

use std::time::Duration;

use reqwest::Client;
use tracing::warn;

use crate::error::{Error, Result};
use crate::types::MetricSample;

pub struct RemoteSampler {
    client: Client,
    url: String,
}

impl RemoteSampler {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(Error::Remote)?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Fetches one sample.
    ///
    /// `Ok(None)` means the server answered 5xx: treated as transient, the
    /// tick carries no data. Timeouts and any other non-2xx status are errors.
    pub async fn fetch(&self) -> Result<Option<MetricSample>> {
        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;
        let status = resp.status();
        if status.is_server_error() {
            warn!(url = %self.url, %status, "remote reported a server error; skipping tick");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(Error::RemoteStatus {
                url: self.url.clone(),
                status,
            });
        }
        let sample = resp
            .json::<MetricSample>()
            .await
            .map_err(|e| self.request_error(e))?;
        Ok(Some(sample))
    }

    fn request_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::RemoteTimeout {
                url: self.url.clone(),
            }
        } else {
            Error::Remote(e)
        }
    }
}
