//! Fixed-interval loop: pull a sample, push it down the link, sleep.

use std::time::Duration;

use tokio::io::AsyncWrite;
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::error::Result;
use crate::session::ProtocolSession;
use crate::source::SampleSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
}

/// Cloneable stop switch for a running scheduler.
#[derive(Clone)]
pub struct Shutdown {
    tx: watch::Sender<bool>,
}

impl Shutdown {
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }
}

pub struct Scheduler<S, T> {
    source: S,
    session: ProtocolSession<T>,
    interval: Duration,
    state: SchedulerState,
    stop_tx: watch::Sender<bool>,
    stop_rx: watch::Receiver<bool>,
}

impl<S, T> Scheduler<S, T>
where
    S: SampleSource,
    T: AsyncWrite + Unpin,
{
    pub fn new(source: S, session: ProtocolSession<T>, interval: Duration) -> Self {
        let (stop_tx, stop_rx) = watch::channel(false);
        Self {
            source,
            session,
            interval,
            state: SchedulerState::Idle,
            stop_tx,
            stop_rx,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn shutdown_handle(&self) -> Shutdown {
        Shutdown {
            tx: self.stop_tx.clone(),
        }
    }

    pub fn session(&self) -> &ProtocolSession<T> {
        &self.session
    }

    /// Runs until shut down (returns `Ok`) or until a source or transport
    /// error, which is returned as-is. There is no retry.
    pub async fn run(&mut self) -> Result<()> {
        self.state = SchedulerState::Running;
        info!(interval_ms = self.interval.as_millis() as u64, "scheduler running");
        let res = self.run_loop().await;
        self.state = SchedulerState::Idle;
        res
    }

    async fn run_loop(&mut self) -> Result<()> {
        let mut stop = self.stop_rx.clone();
        let mut ticks: u64 = 0;
        loop {
            if *stop.borrow() {
                break;
            }

            let next = tokio::select! {
                biased;
                _ = stop.wait_for(|v| *v) => break,
                r = self.source.next_sample() => r?,
            };
            ticks += 1;

            match next {
                Some(sample) => self.session.send(&sample).await?,
                None => debug!(tick = ticks, "no sample this tick"),
            }

            tokio::select! {
                biased;
                _ = stop.wait_for(|v| *v) => break,
                _ = sleep(self.interval) => {}
            }
        }
        info!(ticks, "scheduler stopped");
        Ok(())
    }
}
