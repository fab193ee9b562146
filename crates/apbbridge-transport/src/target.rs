use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use tracing::debug;

use crate::error::{Result, TransportError};
use crate::stream::BridgeStream;

const TCP_PREFIX: &str = "tcp://";
const UNIX_PREFIX: &str = "unix:";

/// Where the bridge hardware (or its adapter) can be reached.
///
/// Parsed from strings of the form `tcp://host:port` or `unix:/path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A TCP endpoint, `host:port`.
    Tcp(String),
    /// A filesystem-path Unix domain socket.
    Unix(PathBuf),
}

impl Target {
    /// Connect to the target (blocking).
    pub fn connect(&self) -> Result<BridgeStream> {
        match self {
            Target::Tcp(addr) => {
                let stream =
                    std::net::TcpStream::connect(addr.as_str()).map_err(|e| {
                        TransportError::Connect {
                            target: self.to_string(),
                            source: e,
                        }
                    })?;
                debug!(%addr, "connected to tcp bridge");
                BridgeStream::from_tcp(stream)
            }
            #[cfg(unix)]
            Target::Unix(path) => {
                let stream = std::os::unix::net::UnixStream::connect(path).map_err(|e| {
                    TransportError::Connect {
                        target: self.to_string(),
                        source: e,
                    }
                })?;
                debug!(?path, "connected to unix domain socket bridge");
                Ok(BridgeStream::from_unix(stream))
            }
            #[cfg(not(unix))]
            Target::Unix(_) => Err(TransportError::Unsupported(self.to_string())),
        }
    }
}

impl FromStr for Target {
    type Err = TransportError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason| TransportError::InvalidTarget {
            target: s.to_string(),
            reason,
        };

        if let Some(addr) = s.strip_prefix(TCP_PREFIX) {
            let (host, port) = addr.rsplit_once(':').ok_or_else(|| invalid("missing port"))?;
            if host.is_empty() {
                return Err(invalid("missing host"));
            }
            port.parse::<u16>().map_err(|_| invalid("invalid port"))?;
            return Ok(Target::Tcp(addr.to_string()));
        }

        if let Some(path) = s.strip_prefix(UNIX_PREFIX) {
            if path.is_empty() {
                return Err(invalid("missing socket path"));
            }
            return Ok(Target::Unix(PathBuf::from(path)));
        }

        Err(invalid("expected tcp://host:port or unix:/path"))
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Tcp(addr) => write!(f, "{TCP_PREFIX}{addr}"),
            Target::Unix(path) => write!(f, "{UNIX_PREFIX}{}", path.display()),
        }
    }
}
