use std::io::{ErrorKind, Write};

use bytes::BytesMut;
use tracing::trace;

use crate::codec::{encode_request, AddressWidth, Request};
use crate::error::{FrameError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 64;

/// Encodes requests and writes them to any `Write` stream.
///
/// Holds the encode buffer so repeated transactions do not reallocate.
#[derive(Debug)]
pub struct RequestWriter {
    buf: BytesMut,
    width: AddressWidth,
}

impl RequestWriter {
    pub fn new(width: AddressWidth) -> Self {
        Self {
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            width,
        }
    }

    /// Encode a request and write the complete frame (blocking).
    ///
    /// Validation happens before anything touches the stream.
    pub fn send<W: Write>(&mut self, inner: &mut W, request: &Request) -> Result<()> {
        self.buf.clear();
        encode_request(request, self.width, &mut self.buf)?;
        trace!(frame = ?&self.buf[..], "writing request frame");

        let mut offset = 0usize;
        while offset < self.buf.len() {
            match inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }

        loop {
            match inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    pub fn width(&self) -> AddressWidth {
        self.width
    }
}
