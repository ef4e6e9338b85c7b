//! Host telemetry for a serial-attached gauge display.
//!
//! A [`source::SampleSource`] produces one [`types::MetricSample`] per tick, the
//! [`scheduler::Scheduler`] hands it to a [`session::ProtocolSession`], and the
//! session writes one 9-byte frame per metric (see [`protocol`]).

pub mod config;
pub mod error;
pub mod protocol;
pub mod remote;
pub mod sampler;
pub mod scheduler;
pub mod session;
pub mod source;
pub mod transport;
pub mod types;

pub use error::{Error, Result};
