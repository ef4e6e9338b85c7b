//! Single-writer session over the serial link.

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use crate::error::{Error, Result};
use crate::protocol::command_frame;
use crate::types::{MetricSample, Register};

/// Upper bound on an identify reply; the firmware prints a short device name.
const MAX_IDENT_LEN: usize = 128;

pub struct ProtocolSession<T> {
    io: T,
}

impl<T> ProtocolSession<T> {
    pub fn new(io: T) -> Self {
        Self { io }
    }

    pub fn get_ref(&self) -> &T {
        &self.io
    }

    pub fn into_inner(self) -> T {
        self.io
    }
}

impl<T: AsyncWrite + Unpin> ProtocolSession<T> {
    /// Writes the five frames of `sample` in register order, then flushes.
    ///
    /// Nothing is read back. A failed write leaves the link in whatever
    /// partial state it reached; the caller decides what happens next.
    pub async fn send(&mut self, sample: &MetricSample) -> Result<()> {
        for (register, value) in sample.commands() {
            let frame = command_frame(register, value);
            self.io.write_all(&frame).await?;
        }
        self.io.flush().await?;
        debug!(
            cpu = sample.cpu,
            mem = sample.mem,
            la1 = sample.la1,
            la5 = sample.la5,
            la15 = sample.la15,
            "sample sent"
        );
        Ok(())
    }
}

impl<T: AsyncRead + AsyncWrite + Unpin> ProtocolSession<T> {
    /// Sends the identify command and returns the device name the firmware prints.
    pub async fn identify(&mut self, timeout: Duration) -> Result<String> {
        self.io.write_all(&command_frame(Register::Identify, 0.0)).await?;
        self.io.flush().await?;
        match tokio::time::timeout(timeout, self.read_line()).await {
            Ok(line) => line,
            Err(_) => Err(Error::IdentifyTimeout(timeout)),
        }
    }

    async fn read_line(&mut self) -> Result<String> {
        let mut buf = Vec::with_capacity(64);
        let mut byte = [0u8; 1];
        loop {
            if self.io.read(&mut byte).await? == 0 {
                return Err(Error::IdentifyEof);
            }
            match byte[0] {
                b'\n' => break,
                b => buf.push(b),
            }
            if buf.len() >= MAX_IDENT_LEN {
                break;
            }
        }
        Ok(String::from_utf8_lossy(&buf).trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::FRAME_WIDTH;

    fn sample() -> MetricSample {
        MetricSample {
            cpu: 50.0,
            mem: 30.0,
            la1: 1.0,
            la5: 2.0,
            la15: 3.0,
        }
    }

    #[tokio::test]
    async fn send_writes_five_ordered_frames() {
        let mut session = ProtocolSession::new(Vec::new());
        session.send(&sample()).await.unwrap();
        let out = session.into_inner();
        assert_eq!(out.len(), 5 * FRAME_WIDTH);
        let frames: Vec<&[u8]> = out.chunks(FRAME_WIDTH).collect();
        assert_eq!(frames[0], &[10, 50, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(frames[1], &[11, 30, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(frames[2], &[12, 1, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(frames[3], &[13, 2, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(frames[4], &[14, 3, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[tokio::test]
    async fn consecutive_sends_do_not_interleave() {
        let mut session = ProtocolSession::new(Vec::new());
        session.send(&sample()).await.unwrap();
        let second = MetricSample {
            cpu: 99.9,
            ..sample()
        };
        session.send(&second).await.unwrap();
        let out = session.into_inner();
        assert_eq!(out.len(), 10 * FRAME_WIDTH);
        let ids: Vec<u8> = out.chunks(FRAME_WIDTH).map(|f| f[0]).collect();
        assert_eq!(ids, vec![10, 11, 12, 13, 14, 10, 11, 12, 13, 14]);
        assert_eq!(out[5 * FRAME_WIDTH + 1], 99);
    }

    #[tokio::test]
    async fn identify_reads_device_name() {
        let (host, mut device) = tokio::io::duplex(64);
        let dev = tokio::spawn(async move {
            let mut cmd = [0u8; FRAME_WIDTH];
            device.read_exact(&mut cmd).await.unwrap();
            assert_eq!(cmd, [0u8; FRAME_WIDTH]);
            device
                .write_all(b"org.liksys.md.hardware.quantum-core\r\n")
                .await
                .unwrap();
            device
        });
        let mut session = ProtocolSession::new(host);
        let name = session.identify(Duration::from_secs(2)).await.unwrap();
        assert_eq!(name, "org.liksys.md.hardware.quantum-core");
        dev.await.unwrap();
    }

    #[tokio::test]
    async fn identify_times_out_on_silent_device() {
        let (host, _device) = tokio::io::duplex(64);
        let mut session = ProtocolSession::new(host);
        let err = session
            .identify(Duration::from_millis(50))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::IdentifyTimeout(_)), "{err}");
    }

    #[tokio::test]
    async fn identify_reports_closed_link() {
        let (host, device) = tokio::io::duplex(64);
        drop(device);
        let mut session = ProtocolSession::new(host);
        // the write itself may fail once the peer is gone
        let err = session
            .identify(Duration::from_millis(200))
            .await
            .unwrap_err();
        assert!(
            matches!(err, Error::IdentifyEof | Error::Transport(_)),
            "{err}"
        );
    }
}
