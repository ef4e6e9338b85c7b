//! Serial transport setup.

use tokio_serial::{DataBits, FlowControl, Parity, SerialPortBuilderExt, SerialStream, StopBits};
use tracing::info;

use crate::error::{Error, Result};

/// Line rate the firmware configures on boot.
pub const BAUD_RATE: u32 = 115_200;

/// Opens `path` as 115200 8N1 with no flow control.
pub fn open_serial(path: &str) -> Result<SerialStream> {
    let stream = tokio_serial::new(path, BAUD_RATE)
        .data_bits(DataBits::Eight)
        .parity(Parity::None)
        .stop_bits(StopBits::One)
        .flow_control(FlowControl::None)
        .open_native_async()
        .map_err(|source| Error::Open {
            path: path.to_string(),
            source,
        })?;
    info!(device = path, baud = BAUD_RATE, "serial link open");
    Ok(stream)
}
