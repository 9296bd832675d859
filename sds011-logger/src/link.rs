//! Serial link abstraction.
//!
//! One [`SensorLink`] is one physical wire, potentially shared by several
//! addressed sensors. The only read primitive is "the next incoming byte
//! chunk": response framing is fixed-size, so the exchange layer matches
//! chunks against the expected frame shape instead of streaming.

use std::io;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_serial::SerialStream;

/// Largest chunk we ever expect from a sensor in one read.
const READ_BUF_LEN: usize = 64;

/// One duplex byte stream per physical wire.
pub trait SensorLink: Send {
    /// Identifier used in log lines (the device path for real ports).
    fn name(&self) -> &str;

    /// Write one frame to the wire.
    fn send(&mut self, frame: &[u8]) -> impl Future<Output = io::Result<()>> + Send;

    /// Await exactly the next incoming byte chunk.
    fn recv_chunk(&mut self) -> impl Future<Output = io::Result<Vec<u8>>> + Send;
}

/// A [`SensorLink`] over a real serial device.
pub struct SerialLink {
    name: String,
    stream: SerialStream,
}

impl SerialLink {
    /// Open a serial device at the given baud rate, 8N1.
    pub fn open(path: &str, baud_rate: u32) -> tokio_serial::Result<Self> {
        let builder = tokio_serial::new(path, baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One);

        let stream = SerialStream::open(&builder)?;

        Ok(Self {
            name: path.to_string(),
            stream,
        })
    }
}

impl SensorLink for SerialLink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn send(&mut self, frame: &[u8]) -> io::Result<()> {
        self.stream.write_all(frame).await?;
        self.stream.flush().await
    }

    async fn recv_chunk(&mut self) -> io::Result<Vec<u8>> {
        let mut buf = [0u8; READ_BUF_LEN];
        let n = self.stream.read(&mut buf).await?;
        if n == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "serial port closed",
            ));
        }
        Ok(buf[..n].to_vec())
    }
}

/// List device paths whose name contains the given pattern.
pub fn matching_ports(pattern: &str) -> tokio_serial::Result<Vec<String>> {
    let ports = tokio_serial::available_ports()?;
    Ok(ports
        .into_iter()
        .map(|p| p.port_name)
        .filter(|name| name.contains(pattern))
        .collect())
}

#[cfg(test)]
pub(crate) mod mock {
    //! In-memory link with scripted replies, for exercising the exchange
    //! and orchestrator layers without hardware.

    use std::collections::VecDeque;
    use std::io;
    use std::time::Duration;

    use sds011_protocol::SensorAddress;

    use super::SensorLink;

    /// One scripted wire event, queued by a send.
    pub(crate) enum Event {
        /// Deliver these bytes on the next read.
        Chunk(Vec<u8>),
        /// Deliver these bytes after a delay.
        DelayedChunk(Vec<u8>, Duration),
        /// Fail the next read with a transport error.
        TransportError,
    }

    /// A [`SensorLink`] whose replies come from a responder closure.
    ///
    /// Every `send` passes the outgoing frame to the responder and queues
    /// whatever events it returns; `recv_chunk` consumes the queue and
    /// blocks forever once it is empty, leaving timeouts to the caller.
    pub(crate) struct MockLink {
        name: String,
        on_send: Box<dyn FnMut(&[u8]) -> Vec<Event> + Send>,
        pending: VecDeque<Event>,
        pub(crate) sent: Vec<Vec<u8>>,
    }

    impl MockLink {
        pub(crate) fn new(
            name: &str,
            on_send: impl FnMut(&[u8]) -> Vec<Event> + Send + 'static,
        ) -> Self {
            Self {
                name: name.to_string(),
                on_send: Box::new(on_send),
                pending: VecDeque::new(),
                sent: Vec::new(),
            }
        }

        /// A link that answers queries for the given addresses with a valid
        /// measurement frame and stays silent for everything else.
        pub(crate) fn answering(name: &str, responsive: Vec<SensorAddress>) -> Self {
            Self::new(name, move |frame: &[u8]| {
                let addr = SensorAddress([frame[15], frame[16]]);
                if responsive.contains(&addr) {
                    vec![Event::Chunk(measurement_frame(addr, 300, 82))]
                } else {
                    vec![]
                }
            })
        }
    }

    impl SensorLink for MockLink {
        fn name(&self) -> &str {
            &self.name
        }

        async fn send(&mut self, frame: &[u8]) -> io::Result<()> {
            self.sent.push(frame.to_vec());
            let events = (self.on_send)(frame);
            self.pending.extend(events);
            Ok(())
        }

        async fn recv_chunk(&mut self) -> io::Result<Vec<u8>> {
            match self.pending.pop_front() {
                Some(Event::Chunk(chunk)) => Ok(chunk),
                Some(Event::DelayedChunk(chunk, delay)) => {
                    tokio::time::sleep(delay).await;
                    Ok(chunk)
                }
                Some(Event::TransportError) => Err(io::Error::new(
                    io::ErrorKind::BrokenPipe,
                    "wire disconnected",
                )),
                None => std::future::pending().await,
            }
        }
    }

    /// Build a valid 10-byte measurement reply frame.
    pub(crate) fn measurement_frame(addr: SensorAddress, pm25_raw: u16, pm10_raw: u16) -> Vec<u8> {
        let [pm25_lo, pm25_hi] = pm25_raw.to_le_bytes();
        let [pm10_lo, pm10_hi] = pm10_raw.to_le_bytes();
        let mut frame = vec![
            0xAA, 0xC0, pm25_lo, pm25_hi, pm10_lo, pm10_hi, addr.0[0], addr.0[1], 0x00, 0xAB,
        ];
        frame[8] = frame[2..8].iter().fold(0u8, |s, b| s.wrapping_add(*b));
        frame
    }
}
