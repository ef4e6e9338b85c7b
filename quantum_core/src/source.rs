//! Where a tick's sample comes from, chosen once at startup.

use std::future::Future;

use crate::error::Result;
use crate::remote::RemoteSampler;
use crate::sampler::LocalSampler;
use crate::types::MetricSample;

/// Produces one sample per tick.
///
/// `Ok(None)` is a tolerated miss: the scheduler writes nothing for that tick.
pub trait SampleSource {
    fn next_sample(&mut self) -> impl Future<Output = Result<Option<MetricSample>>>;
}

pub enum Source {
    Local(LocalSampler),
    Remote(RemoteSampler),
}

impl SampleSource for Source {
    async fn next_sample(&mut self) -> Result<Option<MetricSample>> {
        match self {
            Source::Local(s) => Ok(Some(s.sample())),
            Source::Remote(r) => r.fetch().await,
        }
    }
}

impl SampleSource for RemoteSampler {
    async fn next_sample(&mut self) -> Result<Option<MetricSample>> {
        self.fetch().await
    }
}
