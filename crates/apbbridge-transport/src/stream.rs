use std::io::{Read, Write};
use std::time::Duration;

use crate::error::Result;

/// A connected bridge stream implementing Read + Write.
///
/// Wraps whichever socket type the [`Target`](crate::Target) resolved to.
pub struct BridgeStream {
    inner: BridgeStreamInner,
}

enum BridgeStreamInner {
    Tcp(std::net::TcpStream),
    #[cfg(unix)]
    Unix(std::os::unix::net::UnixStream),
}

impl Read for BridgeStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            BridgeStreamInner::Tcp(stream) => stream.read(buf),
            #[cfg(unix)]
            BridgeStreamInner::Unix(stream) => stream.read(buf),
        }
    }
}

impl Write for BridgeStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            BridgeStreamInner::Tcp(stream) => stream.write(buf),
            #[cfg(unix)]
            BridgeStreamInner::Unix(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.inner {
            BridgeStreamInner::Tcp(stream) => stream.flush(),
            #[cfg(unix)]
            BridgeStreamInner::Unix(stream) => stream.flush(),
        }
    }
}

impl BridgeStream {
    /// Wrap a connected TCP stream.
    ///
    /// Nagle is disabled: request frames are tiny and every one of them is
    /// followed by a blocking wait for the response.
    pub fn from_tcp(stream: std::net::TcpStream) -> Result<Self> {
        stream.set_nodelay(true)?;
        Ok(Self {
            inner: BridgeStreamInner::Tcp(stream),
        })
    }

    /// Wrap a connected Unix domain socket stream.
    #[cfg(unix)]
    pub fn from_unix(stream: std::os::unix::net::UnixStream) -> Self {
        Self {
            inner: BridgeStreamInner::Unix(stream),
        }
    }

    /// Set read timeout on the underlying stream.
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        match &self.inner {
            BridgeStreamInner::Tcp(stream) => stream.set_read_timeout(timeout).map_err(Into::into),
            #[cfg(unix)]
            BridgeStreamInner::Unix(stream) => stream.set_read_timeout(timeout).map_err(Into::into),
        }
    }

    /// Set write timeout on the underlying stream.
    pub fn set_write_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        match &self.inner {
            BridgeStreamInner::Tcp(stream) => {
                stream.set_write_timeout(timeout).map_err(Into::into)
            }
            #[cfg(unix)]
            BridgeStreamInner::Unix(stream) => {
                stream.set_write_timeout(timeout).map_err(Into::into)
            }
        }
    }

    /// Human-readable transport type, for logs and diagnostics.
    pub fn kind(&self) -> &'static str {
        match &self.inner {
            BridgeStreamInner::Tcp(_) => "tcp",
            #[cfg(unix)]
            BridgeStreamInner::Unix(_) => "unix",
        }
    }
}

impl std::fmt::Debug for BridgeStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeStream")
            .field("type", &self.kind())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;

    use super::*;

    #[test]
    fn tcp_stream_roundtrip() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let server = std::thread::spawn(move || {
            let (mut conn, _) = listener.accept().unwrap();
            let mut buf = [0u8; 3];
            conn.read_exact(&mut buf).unwrap();
            conn.write_all(&buf).unwrap();
        });

        let tcp = std::net::TcpStream::connect(addr).unwrap();
        let mut stream = BridgeStream::from_tcp(tcp).unwrap();
        assert_eq!(stream.kind(), "tcp");
        stream.write_all(&[0x00, 0x12, 0x34]).unwrap();
        let mut echoed = [0u8; 3];
        stream.read_exact(&mut echoed).unwrap();
        assert_eq!(echoed, [0x00, 0x12, 0x34]);

        server.join().unwrap();
    }

    #[test]
    #[cfg(unix)]
    fn unix_stream_roundtrip() {
        let (left, mut right) = std::os::unix::net::UnixStream::pair().unwrap();
        let mut stream = BridgeStream::from_unix(left);
        assert_eq!(stream.kind(), "unix");

        stream.write_all(&[0xAB]).unwrap();
        let mut buf = [0u8; 1];
        right.read_exact(&mut buf).unwrap();
        assert_eq!(buf, [0xAB]);
    }

    #[test]
    #[cfg(unix)]
    fn read_timeout_surfaces_as_io_error() {
        let (left, _right) = std::os::unix::net::UnixStream::pair().unwrap();
        let mut stream = BridgeStream::from_unix(left);
        stream
            .set_read_timeout(Some(Duration::from_millis(10)))
            .unwrap();
        stream
            .set_write_timeout(Some(Duration::from_millis(10)))
            .unwrap();

        let mut buf = [0u8; 1];
        let err = stream.read(&mut buf).unwrap_err();
        assert!(matches!(
            err.kind(),
            std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
        ));
    }

    #[test]
    #[cfg(unix)]
    fn debug_shows_transport_type() {
        let (a, _b) = std::os::unix::net::UnixStream::pair().unwrap();
        let stream = BridgeStream::from_unix(a);
        assert_eq!(format!("{stream:?}"), "BridgeStream { type: \"unix\" }");
    }
}
