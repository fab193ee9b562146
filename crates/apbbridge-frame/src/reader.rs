use std::io::{ErrorKind, Read};

use crate::codec::{Status, WORD_SIZE};
use crate::error::{FrameError, Result};

/// Read one status byte (blocking).
pub fn read_status<R: Read>(inner: &mut R) -> Result<Status> {
    let mut byte = [0u8; 1];
    read_exact(inner, &mut byte)?;
    Ok(Status::from_byte(byte[0]))
}

/// Read one big-endian data word (blocking).
pub fn read_word<R: Read>(inner: &mut R) -> Result<u32> {
    let mut word = [0u8; WORD_SIZE];
    read_exact(inner, &mut word)?;
    Ok(u32::from_be_bytes(word))
}

/// Fill `buf` completely, retrying on partial and interrupted reads.
///
/// Returns `Err(FrameError::ConnectionClosed)` when EOF is reached first.
fn read_exact<R: Read>(inner: &mut R, buf: &mut [u8]) -> Result<()> {
    let mut filled = 0usize;
    while filled < buf.len() {
        match inner.read(&mut buf[filled..]) {
            Ok(0) => return Err(FrameError::ConnectionClosed),
            Ok(n) => filled += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(FrameError::Io(err)),
        }
    }
    Ok(())
}
